use std::sync::Arc;

use crate::{
    capabilities::Component,
    container::Container,
    errors::{BuildError, RegistrationError},
    initiator::ContainerInitiator,
    registry::{Object, Registration, Registry},
    shutdown::ShutdownConfig,
    types::{DynError, TypeInfo},
};

//////////////////////////////////////////////////////////////////////
///
/// The container is set up in three steps:
/// 1. The ContainerBuilder where one registers all instances
/// 2. `build` wires every injectable field, then runs the initializers
/// 3. The resulting Container lives until it is stopped

pub struct ContainerBuilder {
    /// Registered instances, in registration order
    pub(crate) registry: Registry,
    pub(crate) shutdown_config: ShutdownConfig,
}
impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerBuilder {
    pub fn new() -> Self {
        ContainerBuilder {
            registry: Registry::new(),
            shutdown_config: ShutdownConfig::default(),
        }
    }

    pub fn with_shutdown_config(mut self, config: ShutdownConfig) -> Self {
        self.shutdown_config = config;
        self
    }
}
impl ContainerBuilder {
    /// Registers an unnamed object
    ///
    /// Fails if an unnamed object of the same concrete type is already registered.
    pub fn add<T: Component>(self, value: T) -> Result<Self, RegistrationError> {
        self.add_object(Object::unnamed(value))
    }

    /// Registers an object under `name`, names are unique across all types
    pub fn add_named<T: Component>(
        self,
        name: impl Into<String>,
        value: T,
    ) -> Result<Self, RegistrationError> {
        self.add_object(Object::named(name, value))
    }

    pub fn add_registration<T: Component>(
        self,
        registration: Registration<T>,
    ) -> Result<Self, RegistrationError> {
        self.add_object(registration.into())
    }

    pub fn add_object(mut self, object: Object) -> Result<Self, RegistrationError> {
        self.registry.insert(object)?;
        Ok(self)
    }

    /// Registers several objects in order, stopping at the first conflict
    pub fn add_all(
        mut self,
        objects: impl IntoIterator<Item = Object>,
    ) -> Result<Self, RegistrationError> {
        for object in objects {
            self.registry.insert(object)?;
        }
        Ok(self)
    }

    /// Registers the product of a fallible constructor
    ///
    /// ```rust
    /// # use wrapp_injector::{Component, ContainerBuilder, Wire};
    /// struct Settings(u16);
    /// impl Wire for Settings {}
    /// impl Component for Settings {}
    ///
    /// let builder = ContainerBuilder::new()
    ///     .add_result("8080".parse::<u16>().map(Settings))
    ///     .unwrap();
    /// ```
    pub fn add_result<T: Component, E: Into<DynError>>(
        self,
        result: Result<T, E>,
    ) -> Result<Self, RegistrationError> {
        match result {
            Ok(value) => self.add(value),
            Err(error) => Err(RegistrationError::Constructor {
                object: TypeInfo::of::<T>(),
                error: Arc::new(error.into()),
            }),
        }
    }

    /// All objects registered so far, in registration order
    pub fn objects(&self) -> &[Object] {
        self.registry.all()
    }

    /// Wires all objects and runs their initializers
    ///
    /// Fails fast: the first wiring or init error is returned and the whole
    /// graph is dropped, no cleaners are run.
    pub fn build(self) -> Result<Container, BuildError> {
        ContainerInitiator::new().initiate(self)
    }
}

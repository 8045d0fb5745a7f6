use std::{any::TypeId, fmt::Debug, sync::Arc};

use crate::{
    capabilities::{Cleaner, Component, Initializer},
    errors::RegistrationError,
    types::{Injectable, ObjectId, TypeInfo, View},
};

/// A value placed under container management
#[derive(Clone)]
pub struct Object {
    name: Option<String>,
    info: TypeInfo,
    component: Arc<dyn Component>,
    views: Vec<View>,
}

impl Object {
    /// Unnamed object, injectable as its concrete type
    pub fn unnamed<T: Component>(value: T) -> Self {
        Registration::new(value).into()
    }

    /// Named object, injectable as its concrete type
    pub fn named<T: Component>(name: impl Into<String>, value: T) -> Self {
        Registration::new(value).named(name).into()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Concrete type of the object
    pub fn info(&self) -> TypeInfo {
        self.info
    }

    /// Name and type, as used in errors and reports
    pub fn id(&self) -> ObjectId {
        ObjectId {
            info: self.info,
            name: self.name.clone(),
        }
    }

    pub fn component(&self) -> &Arc<dyn Component> {
        &self.component
    }

    /// The object seen as `U`, if it exposes that type
    pub fn view<U: ?Sized + Injectable>(&self) -> Option<Arc<U>> {
        self.views
            .iter()
            .find(|view| view.info.type_id == TypeId::of::<U>())
            .and_then(|view| view.downcast::<U>())
    }

    pub fn initializer(&self) -> Option<&dyn Initializer> {
        self.component.as_initializer()
    }

    pub fn cleaner(&self) -> Option<Arc<dyn Cleaner>> {
        self.component.clone().as_cleaner()
    }
}

impl Debug for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let views: Vec<_> = self.views.iter().map(|view| view.info.type_name).collect();
        f.debug_struct("Object")
            .field("name", &self.name)
            .field("type", &self.info.type_name)
            .field("views", &views)
            .finish()
    }
}

/// Typed registration, used to name an object or expose it as further types
///
/// ```rust
/// use std::sync::Arc;
/// use wrapp_injector::{Component, ContainerBuilder, Registration, Wire};
///
/// trait Clock: Send + Sync {}
///
/// struct SystemClock;
/// impl Clock for SystemClock {}
/// impl Wire for SystemClock {}
/// impl Component for SystemClock {}
///
/// let builder = ContainerBuilder::new()
///     .add_registration(Registration::new(SystemClock).expose::<dyn Clock>(|it| it as Arc<dyn Clock>))
///     .unwrap();
/// ```
pub struct Registration<T: Component> {
    name: Option<String>,
    instance: Arc<T>,
    views: Vec<View>,
}

impl<T: Component> Registration<T> {
    pub fn new(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Registers an instance the caller keeps a handle to
    pub fn from_arc(instance: Arc<T>) -> Self {
        Registration {
            name: None,
            views: vec![View::new(instance.clone())],
            instance,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Makes the object injectable as `U` as well, usually a trait object
    pub fn expose<U: ?Sized + Injectable>(mut self, cast: fn(Arc<T>) -> Arc<U>) -> Self {
        let info = TypeInfo::of::<U>();
        if !self.views.iter().any(|view| view.info == info) {
            self.views.push(View::new(cast(self.instance.clone())));
        }
        self
    }
}

impl<T: Component> From<Registration<T>> for Object {
    fn from(registration: Registration<T>) -> Self {
        let Registration {
            name,
            instance,
            views,
        } = registration;
        Object {
            name,
            info: TypeInfo::of::<T>(),
            component: instance,
            views,
        }
    }
}

/// Ordered set of registered objects
#[derive(Default, Debug)]
pub struct Registry {
    objects: Vec<Object>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an object, enforcing name and type uniqueness
    pub fn insert(&mut self, object: Object) -> Result<(), RegistrationError> {
        match object.name() {
            None => {
                if self
                    .objects
                    .iter()
                    .any(|existing| existing.name.is_none() && existing.info == object.info)
                {
                    return Err(RegistrationError::DuplicateType(object.info));
                }
                tracing::debug!("Adding {}", object.info);
            }
            Some("") => return Err(RegistrationError::EmptyName(object.info)),
            Some(name) => {
                if let Some(existing) = self.find_named(name) {
                    return Err(RegistrationError::DuplicateName {
                        name: name.to_string(),
                        existing: existing.info,
                    });
                }
                tracing::debug!("Adding {}: {}", name, object.info);
            }
        }

        self.objects.push(object);
        Ok(())
    }

    pub fn find_named(&self, name: &str) -> Option<&Object> {
        self.objects.iter().find(|o| o.name() == Some(name))
    }

    pub fn all(&self) -> &[Object] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

use std::{fmt::Debug, ops::Deref, sync::Arc, sync::OnceLock};

use crate::types::{address_of, Injectable};

/// Injectable field, filled in once while the container is built
///
/// `T` may be a concrete type or a trait object (`Inject<dyn Mailer>`).
///
/// ### Panics
///
/// Dereferencing panics if the field was never wired, i.e. when it is used
/// before [ContainerBuilder::build](crate::ContainerBuilder::build) succeeded or on an
/// object that was never registered.
pub struct Inject<T: ?Sized + Injectable> {
    once: OnceLock<Arc<T>>,
}

impl<T: ?Sized + Injectable> Inject<T> {
    pub const fn new() -> Self {
        Inject {
            once: OnceLock::new(),
        }
    }

    /// Accesses the injected instance
    ///
    /// # Panics
    /// - When accessed before the field was wired
    pub fn get(&self) -> &Arc<T> {
        self.try_get()
            .expect("Inject field accessed before the container was built")
    }

    pub fn try_get(&self) -> Option<&Arc<T>> {
        self.once.get()
    }

    pub fn is_wired(&self) -> bool {
        self.once.get().is_some()
    }

    /// Sets the instance, returns false if a different instance is already set
    pub(crate) fn set(&self, instance: Arc<T>) -> bool {
        let address = address_of(&instance);
        match self.once.set(instance) {
            Ok(()) => true,
            Err(_) => self
                .once
                .get()
                .is_some_and(|existing| address_of(existing) == address),
        }
    }
}

impl<T: ?Sized + Injectable> Default for Inject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized + Injectable> Deref for Inject<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.get()
    }
}

impl<T: ?Sized + Injectable + Debug> Debug for Inject<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.try_get() {
            Some(instance) => f.debug_tuple("Inject").field(instance).finish(),
            None => f.debug_tuple("Inject").field(&"<unwired>").finish(),
        }
    }
}

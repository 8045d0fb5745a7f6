use std::sync::Arc;

use crate::{
    errors::WireError,
    resolver::Wiring,
    types::{DynError, Injectable},
};

/// Describes which fields of a type are injectable and how they resolve
///
/// Implementations call one [Wiring] method per [Inject](crate::Inject) field,
/// in declaration order:
///
/// ```rust
/// use wrapp_injector::{Inject, Wire, WireError, Wiring};
///
/// struct Logger;
/// struct Database;
///
/// struct Repository {
///     logger: Inject<Logger>,
///     primary: Inject<Database>,
/// }
///
/// impl Wire for Repository {
///     fn wire(&self, wiring: &mut Wiring<'_>) -> Result<(), WireError> {
///         wiring.unnamed("logger", &self.logger)?;
///         wiring.named("primary", "primary-db", &self.primary)?;
///         Ok(())
///     }
/// }
/// ```
pub trait Wire {
    fn wire(&self, _wiring: &mut Wiring<'_>) -> Result<(), WireError> {
        Ok(())
    }
}

/// Called once after the whole graph is wired, in registration order
pub trait Initializer: Send + Sync {
    fn init(&self) -> Result<(), DynError>;
}

/// Called when the container is stopped, concurrently with all other cleaners
///
/// The hook runs on its own detached thread. If it overruns the shutdown budget
/// it is reported as timed out but not interrupted, and nothing waits for it
/// afterwards: neither `stop` nor dropping the runtime.
pub trait Cleaner: Send + Sync {
    fn clean(&self) -> Result<(), DynError>;
}

/// Anything that can be registered on the container
///
/// Capabilities are opt-in: return `Some(self)` from the accessor of each
/// hook the type implements.
///
/// ```rust
/// use std::sync::Arc;
/// use wrapp_injector::{Cleaner, Component, DynError, Wire};
///
/// struct Pool;
/// impl Wire for Pool {}
/// impl Cleaner for Pool {
///     fn clean(&self) -> Result<(), DynError> {
///         Ok(())
///     }
/// }
/// impl Component for Pool {
///     fn as_cleaner(self: Arc<Self>) -> Option<Arc<dyn Cleaner>> {
///         Some(self)
///     }
/// }
/// ```
pub trait Component: Wire + Injectable {
    fn as_initializer(&self) -> Option<&dyn Initializer> {
        None
    }

    fn as_cleaner(self: Arc<Self>) -> Option<Arc<dyn Cleaner>> {
        None
    }
}

//! Wrapp Injector wires an already created set of objects together, runs their
//! initializers and later cleans them up concurrently with a time budget.
//!
//! The lifecycle of a container:
//! 1. [ContainerBuilder]: register instances, unnamed (one per concrete type) or named
//! 2. [ContainerBuilder::build]: fill every [Inject] field of every object, then call the
//!    [Initializer]s in registration order
//! 3. [Container::stop]: call all [Cleaner]s concurrently, each bounded by a timeout
//!
//! Fields are declared injectable by implementing [Wire]:
//!
//! ```rust
//! use std::sync::Arc;
//! use wrapp_injector::{Component, ContainerBuilder, Inject, Wire, WireError, Wiring};
//!
//! struct Logger;
//! impl Wire for Logger {}
//! impl Component for Logger {}
//!
//! #[derive(Default)]
//! struct Mailer {
//!     logger: Inject<Logger>,
//! }
//! impl Wire for Mailer {
//!     fn wire(&self, wiring: &mut Wiring<'_>) -> Result<(), WireError> {
//!         wiring.unnamed("logger", &self.logger)
//!     }
//! }
//! impl Component for Mailer {}
//!
//! let container = ContainerBuilder::new()
//!     .add(Mailer::default())
//!     .and_then(|builder| builder.add(Logger))
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! let mailer = container.get::<Mailer>().unwrap();
//! let logger = container.get::<Logger>().unwrap();
//! assert!(Arc::ptr_eq(mailer.logger.get(), &logger));
//! ```
//!
//! Resolution kinds, per field:
//! - [Wiring::unnamed]: the one unnamed object injectable as the field's type
//! - [Wiring::named]: the object registered under a given name
//! - [Wiring::inline]: a nested struct whose own fields are wired the same way

pub mod builder;
pub mod capabilities;
pub mod container;
pub mod errors;
mod initiator;
pub mod registry;
pub mod resolver;
pub mod shutdown;
#[cfg(unix)]
mod signals;
pub mod types;

pub use builder::ContainerBuilder;
pub use capabilities::{Cleaner, Component, Initializer, Wire};
pub use container::Container;
pub use errors::{
    BuildError, CleanupError, InitError, LookupError, RegistrationError, ResolutionScope,
    ShutdownError, WireError,
};
pub use registry::{Object, Registration};
pub use resolver::{Inject, Wiring};
pub use shutdown::{ShutdownConfig, ShutdownReport};
pub use types::{DynError, Injectable, ObjectId, TypeInfo};

#[cfg(unix)]
pub use tokio::signal::unix::SignalKind;

use std::{fmt, sync::Arc};

use futures_channel::oneshot;
use thiserror::Error;

use crate::types::{DynError, ObjectId, TypeInfo};

/// Errors when registering an object on the [ContainerBuilder](crate::builder::ContainerBuilder)
#[derive(Error, Debug, Clone)]
pub enum RegistrationError {
    /// An unnamed object of the same concrete type is already registered
    #[error("An unnamed object of type '{0}' is already registered")]
    DuplicateType(TypeInfo),
    /// The name is already taken by another object
    #[error("An object named '{name}' is already registered (existing: '{existing}')")]
    DuplicateName { name: String, existing: TypeInfo },
    /// Named objects must have a name
    #[error("Named object of type '{0}' must have a non-empty name")]
    EmptyName(TypeInfo),
    /// The constructor passed to `add_result` failed
    #[error("Constructor for '{object}' failed - error: {error}")]
    Constructor {
        object: TypeInfo,
        error: Arc<DynError>,
    },
}

/// Where a dependency was searched for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionScope {
    /// All unnamed objects, matched by type
    Unnamed,
    /// Only the object registered under this name
    Named(String),
}
impl fmt::Display for ResolutionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionScope::Unnamed => f.write_str("unnamed objects"),
            ResolutionScope::Named(name) => {
                write!(f, "objects named '{name}' only, unnamed objects were not searched")
            }
        }
    }
}

/// Errors while wiring the fields of registered objects
#[derive(Error, Debug, Clone)]
pub enum WireError {
    #[error("No candidates for {owner}.{field} ({required}) in {scope}")]
    MissingDependency {
        owner: String,
        field: &'static str,
        required: TypeInfo,
        scope: ResolutionScope,
    },
    #[error("{count} candidates (instead of 1) for {owner}.{field} ({required}) in {scope}")]
    AmbiguousDependency {
        owner: String,
        field: &'static str,
        required: TypeInfo,
        count: usize,
        scope: ResolutionScope,
    },
    #[error("{owner}.{field} requires '{required}' but '{name}' is a '{actual}' which does not expose it")]
    IncompatibleType {
        owner: String,
        field: &'static str,
        required: TypeInfo,
        name: String,
        actual: TypeInfo,
    },
    #[error("{owner}.{field} was already wired to a different instance")]
    AlreadyWired { owner: String, field: &'static str },
}

/// Errors while running initializers
#[derive(Error, Debug, Clone)]
pub enum InitError {
    #[error("Error initializing provided object '{object}': {error}")]
    InitializationFailure {
        object: ObjectId,
        error: Arc<DynError>,
    },
}

/// Errors of [ContainerBuilder::build](crate::builder::ContainerBuilder::build)
///
/// Whichever variant is returned, the partially wired graph is dropped.
#[derive(Error, Debug, Clone)]
pub enum BuildError {
    #[error(transparent)]
    Wire(#[from] WireError),
    #[error(transparent)]
    Init(#[from] InitError),
}

/// Per object outcome of a failed cleanup
#[derive(Error, Debug, Clone)]
pub enum CleanupError {
    /// The hook did not return within the shutdown budget, it was left running
    #[error("Cleaning '{object}' took more than {max_duration:?}")]
    Timeout {
        object: ObjectId,
        max_duration: std::time::Duration,
    },
    #[error("Error cleaning '{object}': {error}")]
    Failed {
        object: ObjectId,
        error: Arc<DynError>,
    },
    #[error("Cleaning '{object}' panicked")]
    Panicked { object: ObjectId },
}
impl CleanupError {
    pub fn object(&self) -> &ObjectId {
        match self {
            CleanupError::Timeout { object, .. }
            | CleanupError::Failed { object, .. }
            | CleanupError::Panicked { object } => object,
        }
    }
}

/// Errors when arming signal triggered shutdown
#[derive(Error, Debug)]
pub enum ShutdownError {
    #[error("Shutdown signals were already armed for this container")]
    AlreadyArmed,
    #[error("Failed to listen for signal: {0}")]
    Signal(#[from] std::io::Error),
    /// The stop notification was dropped before a report was sent
    #[error("Stop waiter was closed before the container stopped")]
    WaiterClosed,
}
impl From<oneshot::Canceled> for ShutdownError {
    fn from(_: oneshot::Canceled) -> Self {
        Self::WaiterClosed
    }
}

/// Errors of the diagnostic lookups on [Container](crate::container::Container)
#[derive(Error, Debug, Clone)]
pub enum LookupError {
    #[error("Object not found: {name}.{required}")]
    NotFound {
        required: TypeInfo,
        name: String,
    },
}

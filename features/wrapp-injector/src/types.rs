use std::{
    any::{Any, TypeId},
    sync::Arc,
};

/// Error type returned by lifecycle hooks
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// We assume that we are using a multithreaded async runtime
/// So anything injectable needs to be Send + Sync + 'static
pub trait Injectable: Send + Sync + 'static {}
impl<T: ?Sized + Send + Sync + 'static> Injectable for T {}

/// Type Name and Type Id
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct TypeInfo {
    pub type_name: &'static str,
    pub type_id: TypeId,
}
impl std::fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}
impl TypeInfo {
    pub fn of<T: 'static + ?Sized>() -> TypeInfo {
        TypeInfo {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }
}

/// Identifies a registered object in errors and reports
///
/// The type alone is ambiguous once several named objects share it.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct ObjectId {
    pub info: TypeInfo,
    pub name: Option<String>,
}
impl ObjectId {
    pub fn unnamed<T: 'static + ?Sized>() -> ObjectId {
        ObjectId {
            info: TypeInfo::of::<T>(),
            name: None,
        }
    }

    pub fn named<T: 'static + ?Sized>(name: impl Into<String>) -> ObjectId {
        ObjectId {
            info: TypeInfo::of::<T>(),
            name: Some(name.into()),
        }
    }
}
impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name}: {}", self.info),
            None => write!(f, "{}", self.info),
        }
    }
}

/// A registered instance seen as one particular type
///
/// Holds an `Arc<U>` behind `dyn Any`, where `U` may be unsized (`dyn Trait`).
/// Every view of one object points at the same allocation.
#[derive(Clone)]
pub struct View {
    pub info: TypeInfo,
    arc: Arc<dyn Any + Send + Sync>,
}

impl View {
    pub(crate) fn new<U: ?Sized + Injectable>(instance: Arc<U>) -> Self {
        View {
            info: TypeInfo::of::<U>(),
            // Arc<U> is sized even if U is not, so it can live behind Any
            arc: Arc::new(instance),
        }
    }

    /// Returns the viewed instance if this view is of type `U`
    pub fn downcast<U: ?Sized + Injectable>(&self) -> Option<Arc<U>> {
        self.arc.downcast_ref::<Arc<U>>().cloned()
    }
}

/// Address of the instance behind an `Arc`, without pointer metadata
pub(crate) fn address_of<U: ?Sized>(instance: &Arc<U>) -> *const () {
    Arc::as_ptr(instance) as *const ()
}

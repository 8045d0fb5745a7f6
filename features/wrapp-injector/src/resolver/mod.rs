use std::sync::Arc;

use crate::{
    capabilities::Wire,
    errors::{ResolutionScope, WireError},
    registry::{Object, Registry},
    types::{Injectable, TypeInfo},
};

pub mod inject;

pub use inject::Inject;

/// Resolves the injectable fields of one registered object
///
/// Handed to [Wire::wire]. All lookups go against the same registry, so every
/// field resolving to an object receives that very instance.
pub struct Wiring<'a> {
    registry: &'a Registry,
    /// Path of the struct currently being wired, e.g. `app::Service.mid`
    owner: String,
}

impl<'a> Wiring<'a> {
    pub(crate) fn new(registry: &'a Registry, owner: &Object) -> Self {
        Wiring {
            registry,
            owner: owner.info().type_name.to_string(),
        }
    }

    /// Path of the struct whose fields are being wired
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Resolves `cell` to the only unnamed object injectable as `T`
    pub fn unnamed<T: ?Sized + Injectable>(
        &mut self,
        field: &'static str,
        cell: &Inject<T>,
    ) -> Result<(), WireError> {
        let required = TypeInfo::of::<T>();
        tracing::debug!("initializing field {}.{} ({})", self.owner, field, required);

        let candidates: Vec<(&Object, Arc<T>)> = self
            .registry
            .all()
            .iter()
            .filter(|object| object.name().is_none())
            .filter_map(|object| object.view::<T>().map(|view| (object, view)))
            .collect();

        let (object, instance) =
            self.single(field, required, ResolutionScope::Unnamed, candidates)?;
        tracing::debug!(
            "assigning {}.{} ({}) <-> {}",
            self.owner,
            field,
            required,
            object.info()
        );
        self.assign(field, cell, instance)
    }

    /// Resolves `cell` to the object registered as `name`
    ///
    /// Only the name is matched. If that object cannot be seen as `T` the
    /// field cannot hold it and wiring fails.
    pub fn named<T: ?Sized + Injectable>(
        &mut self,
        field: &'static str,
        name: &str,
        cell: &Inject<T>,
    ) -> Result<(), WireError> {
        let required = TypeInfo::of::<T>();
        tracing::debug!("initializing field {}.{} ({} named '{}')", self.owner, field, required, name);

        let candidates: Vec<(&Object, ())> = self
            .registry
            .all()
            .iter()
            .filter(|object| object.name() == Some(name))
            .map(|object| (object, ()))
            .collect();

        let scope = ResolutionScope::Named(name.to_string());
        let (object, ()) = self.single(field, required, scope, candidates)?;
        let instance = object
            .view::<T>()
            .ok_or_else(|| WireError::IncompatibleType {
                owner: self.owner.clone(),
                field,
                required,
                name: name.to_string(),
                actual: object.info(),
            })?;

        tracing::debug!(
            "assigning {}.{} ({}) <-> {} ({})",
            self.owner,
            field,
            required,
            object.info(),
            name
        );
        self.assign(field, cell, instance)
    }

    /// Wires the fields of a nested struct against the same registry
    pub fn inline<C: Wire + ?Sized>(
        &mut self,
        field: &'static str,
        nested: &C,
    ) -> Result<(), WireError> {
        let parent_len = self.owner.len();
        self.owner.push('.');
        self.owner.push_str(field);

        tracing::debug!("initializing inline field {}", self.owner);
        let result = nested.wire(self);
        if result.is_ok() {
            tracing::debug!("initialized inline field {}", self.owner);
        }

        self.owner.truncate(parent_len);
        result
    }

    /// Applies the zero / one / many policy to a list of candidates
    fn single<'r, V>(
        &self,
        field: &'static str,
        required: TypeInfo,
        scope: ResolutionScope,
        mut candidates: Vec<(&'r Object, V)>,
    ) -> Result<(&'r Object, V), WireError> {
        match candidates.len() {
            1 => Ok(candidates.remove(0)),
            0 => Err(WireError::MissingDependency {
                owner: self.owner.clone(),
                field,
                required,
                scope,
            }),
            count => Err(WireError::AmbiguousDependency {
                owner: self.owner.clone(),
                field,
                required,
                count,
                scope,
            }),
        }
    }

    fn assign<T: ?Sized + Injectable>(
        &self,
        field: &'static str,
        cell: &Inject<T>,
        instance: Arc<T>,
    ) -> Result<(), WireError> {
        if !cell.set(instance) {
            return Err(WireError::AlreadyWired {
                owner: self.owner.clone(),
                field,
            });
        }
        Ok(())
    }
}

/// Wires every registered object in registration order
///
/// Stops at the first error. Objects wired before it keep their fields.
pub(crate) fn wire_all(registry: &Registry) -> Result<(), WireError> {
    tracing::debug!("Wiring {} objects", registry.len());
    for object in registry.all() {
        tracing::debug!("initializing fields of {}", object.info());
        let mut wiring = Wiring::new(registry, object);
        object.component().wire(&mut wiring)?;
    }
    Ok(())
}

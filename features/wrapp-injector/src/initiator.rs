use std::sync::Arc;

use crate::{
    builder::ContainerBuilder,
    container::Container,
    errors::{BuildError, InitError},
    registry::Registry,
    resolver::wire_all,
};

/// Takes a populated builder through wiring and initialization
pub(crate) struct ContainerInitiator {
    initialized: usize,
}
impl ContainerInitiator {
    pub(crate) fn new() -> ContainerInitiator {
        ContainerInitiator { initialized: 0 }
    }

    pub fn initiate(mut self, blueprint: ContainerBuilder) -> Result<Container, BuildError> {
        let ContainerBuilder {
            registry,
            shutdown_config,
        } = blueprint;

        tracing::debug!("Initializing {} objects", registry.len());

        if let Err(error) = wire_all(&registry) {
            tracing::error!("Wiring failed: {error}");
            return Err(error.into());
        }

        if let Err(error) = self.initialize_all(&registry) {
            tracing::error!(
                "Initialization aborted after {} initializers: {error}",
                self.initialized
            );
            return Err(error.into());
        }

        tracing::info!(
            "Container ready: {} objects, {} initialized",
            registry.len(),
            self.initialized
        );
        Ok(Container::new(registry, shutdown_config))
    }

    /// Runs the initializers in registration order, stops at the first error
    fn initialize_all(&mut self, registry: &Registry) -> Result<(), InitError> {
        for object in registry.all() {
            let Some(initializer) = object.initializer() else {
                continue;
            };

            tracing::debug!("Initializing {}", object.id());
            initializer
                .init()
                .map_err(|error| InitError::InitializationFailure {
                    object: object.id(),
                    error: Arc::new(error),
                })?;
            self.initialized += 1;
            tracing::debug!("Initialized {}", object.id());
        }

        Ok(())
    }
}

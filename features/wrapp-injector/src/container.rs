use std::{
    any::TypeId,
    fmt::Debug,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, OnceLock, PoisonError,
    },
    time::Duration,
};

use futures::{future::BoxFuture, FutureExt};
use futures_channel::oneshot;

use crate::{
    errors::{LookupError, ShutdownError},
    registry::{Object, Registry},
    shutdown::{self, ShutdownConfig, ShutdownReport},
    types::{Injectable, TypeInfo},
};

/// Container holding the wired and initialized object graph
#[derive(Clone)]
pub struct Container(pub Arc<ContainerInner>);
pub struct ContainerInner {
    registry: Registry,
    config: ShutdownConfig,
    stopped: AtomicBool,
    pub(crate) signals_armed: AtomicBool,
    /// Outcome of the one stop that ran
    report: OnceLock<ShutdownReport>,
    /// Waiters for the stop outcome
    stop_waiters: Mutex<Vec<oneshot::Sender<ShutdownReport>>>,
}
impl Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_struct("Container");
        for object in self.0.registry.all() {
            map.field(object.name().unwrap_or("-"), &object.info().type_name);
        }
        map.field("stopped", &self.is_stopped());
        map.finish()
    }
}

impl Container {
    pub(crate) fn new(registry: Registry, config: ShutdownConfig) -> Self {
        Self(Arc::new(ContainerInner {
            registry,
            config,
            stopped: AtomicBool::new(false),
            signals_armed: AtomicBool::new(false),
            report: OnceLock::new(),
            stop_waiters: Mutex::new(Vec::new()),
        }))
    }

    /// All registered objects, in registration order
    pub fn objects(&self) -> &[Object] {
        self.0.registry.all()
    }

    pub fn len(&self) -> usize {
        self.0.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.registry.is_empty()
    }

    pub fn shutdown_config(&self) -> &ShutdownConfig {
        &self.0.config
    }

    pub fn is_stopped(&self) -> bool {
        self.0.stopped.load(Ordering::SeqCst)
    }

    /// Gets the unnamed object of concrete type `T`
    ///
    /// Only meant for debugging and tests. Objects should reach each other
    /// through injected fields, never through this lookup.
    pub fn get<T: Injectable>(&self) -> Result<Arc<T>, LookupError> {
        self.find(None)
    }

    /// Gets the object of concrete type `T` registered as `name`, see [Container::get]
    pub fn get_named<T: Injectable>(&self, name: &str) -> Result<Arc<T>, LookupError> {
        self.find(Some(name))
    }

    fn find<T: Injectable>(&self, name: Option<&str>) -> Result<Arc<T>, LookupError> {
        self.objects()
            .iter()
            .filter(|object| object.info().type_id == TypeId::of::<T>() && object.name() == name)
            .find_map(Object::view::<T>)
            .ok_or_else(|| LookupError::NotFound {
                required: TypeInfo::of::<T>(),
                name: name.unwrap_or_default().to_string(),
            })
    }

    /// Runs every cleaner concurrently, each bounded by `max_duration`
    ///
    /// Only the first call does anything, later calls log a warning and
    /// return a report with `already_stopped` set. With `exit_process` the
    /// process exits with [ShutdownReport::exit_code] once all cleaners
    /// reported.
    ///
    /// Cleaners exceeding `max_duration` are reported as timed out but keep
    /// running on their own detached thread, which nothing joins. If this future
    /// is dropped before it completes, waiters receive a report with
    /// `interrupted` set.
    pub async fn stop(&self, max_duration: Duration, exit_process: bool) -> ShutdownReport {
        if self.0.stopped.swap(true, Ordering::SeqCst) {
            tracing::warn!("Stop already called");
            return ShutdownReport::already_stopped();
        }

        let mut guard = InterruptedStop {
            container: self,
            armed: true,
        };

        tracing::info!("Stopping container, cleaning with a budget of {max_duration:?}");
        let report = shutdown::clean_all(self.objects(), max_duration, &self.0.config).await;
        guard.armed = false;

        if report.is_clean() {
            tracing::info!("all cleaned ({} objects)", report.cleaned.len());
        } else {
            tracing::warn!(
                "NOT all cleaned ({} cleaned, {} failed)",
                report.cleaned.len(),
                report.failures.len()
            );
        }

        self.publish_report(&report);

        if exit_process {
            tracing::info!("Exiting with status {}", report.exit_code());
            std::process::exit(report.exit_code());
        }
        report
    }

    /// Packages a stop request for later, e.g. for a shutdown hook
    pub fn stopper(
        &self,
        max_duration: Duration,
        exit_process: bool,
    ) -> impl Fn() -> BoxFuture<'static, ShutdownReport> + Send + Sync + 'static {
        let container = self.clone();
        move || {
            let container = container.clone();
            async move { container.stop(max_duration, exit_process).await }.boxed()
        }
    }

    /// Resolves once a stop request has finished, with its report
    pub async fn wait_for_stop(&self) -> Result<ShutdownReport, ShutdownError> {
        let rx = {
            let mut waiters = self
                .0
                .stop_waiters
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(report) = self.0.report.get() {
                return Ok(report.clone());
            }
            let (tx, rx) = oneshot::channel();
            waiters.push(tx);
            rx
        };

        Ok(rx.await?)
    }

    fn publish_report(&self, report: &ShutdownReport) {
        let _ = self.0.report.set(report.clone());

        let waiters = std::mem::take(
            &mut *self
                .0
                .stop_waiters
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        for waiter in waiters {
            // Error just means the waiter was dropped
            let _ = waiter.send(report.clone());
        }
    }
}

/// Publishes an interrupted report if a running stop is dropped
struct InterruptedStop<'a> {
    container: &'a Container,
    armed: bool,
}
impl Drop for InterruptedStop<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::warn!("Stop was dropped before all cleaners reported");
            self.container.publish_report(&ShutdownReport::interrupted());
        }
    }
}

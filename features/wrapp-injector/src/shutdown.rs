use std::{sync::Arc, thread, time::Duration};

use futures::{stream::FuturesUnordered, StreamExt};
use futures_channel::oneshot;
use tokio::time::{Instant, MissedTickBehavior};

use crate::{
    capabilities::Cleaner,
    errors::CleanupError,
    registry::Object,
    types::{DynError, ObjectId},
};

/// Settings of the shutdown coordinator
#[derive(Debug, Clone)]
pub struct ShutdownConfig {
    /// How often a "still cleaning" diagnostic is logged for a running cleaner
    pub progress_interval: Duration,
    /// Whether a signal triggered stop terminates the process afterwards
    pub exit_on_signal: bool,
}
impl Default for ShutdownConfig {
    fn default() -> Self {
        ShutdownConfig {
            progress_interval: Duration::from_secs(1),
            exit_on_signal: true,
        }
    }
}

/// Aggregate outcome of a stop request
#[derive(Debug, Clone, Default)]
pub struct ShutdownReport {
    /// Objects whose cleaner returned Ok within the budget
    pub cleaned: Vec<ObjectId>,
    /// Objects whose cleaner failed, panicked or timed out
    pub failures: Vec<CleanupError>,
    /// True if the container had already been stopped and nothing ran
    pub already_stopped: bool,
    /// True if the stop future was dropped before every cleaner reported
    pub interrupted: bool,
}
impl ShutdownReport {
    pub(crate) fn already_stopped() -> Self {
        ShutdownReport {
            already_stopped: true,
            ..Default::default()
        }
    }

    pub(crate) fn interrupted() -> Self {
        ShutdownReport {
            interrupted: true,
            ..Default::default()
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && !self.interrupted
    }

    /// Process exit status reflecting the outcome
    pub fn exit_code(&self) -> i32 {
        if self.is_clean() {
            0
        } else {
            1
        }
    }
}

/// Runs every cleaner concurrently, each raced against the same deadline
pub(crate) async fn clean_all(
    objects: &[Object],
    max_duration: Duration,
    config: &ShutdownConfig,
) -> ShutdownReport {
    let deadline = Instant::now() + max_duration;
    // interval panics on a zero period
    let progress_interval = config.progress_interval.max(Duration::from_millis(1));

    let mut tasks: FuturesUnordered<_> = objects
        .iter()
        .filter_map(|object| object.cleaner().map(|cleaner| (object.id(), cleaner)))
        .map(|(id, cleaner)| clean_one(id, cleaner, deadline, max_duration, progress_interval))
        .collect();

    tracing::debug!("Cleaning {} objects", tasks.len());

    let mut report = ShutdownReport::default();
    while let Some(outcome) = tasks.next().await {
        match outcome {
            Ok(id) => report.cleaned.push(id),
            Err(error) => report.failures.push(error),
        }
    }
    report
}

/// Runs one cleaner on a detached thread
///
/// A timeout only changes what is reported: the thread keeps running until the
/// hook returns by itself, and nothing joins it.
async fn clean_one(
    object: ObjectId,
    cleaner: Arc<dyn Cleaner>,
    deadline: Instant,
    max_duration: Duration,
    progress_interval: Duration,
) -> Result<ObjectId, CleanupError> {
    tracing::debug!("Cleaning {object}");

    let (tx, mut hook) = oneshot::channel::<Result<(), DynError>>();
    let spawned = thread::Builder::new()
        .name(format!("clean {}", object.info))
        .spawn(move || {
            // A panic drops tx, the receiver sees Canceled
            let _ = tx.send(cleaner.clean());
        });
    if let Err(error) = spawned {
        let error = CleanupError::Failed {
            object,
            error: Arc::new(Box::new(error) as DynError),
        };
        tracing::error!("{error}");
        return Err(error);
    }

    let timeout = tokio::time::sleep_until(deadline);
    tokio::pin!(timeout);

    let mut progress =
        tokio::time::interval_at(Instant::now() + progress_interval, progress_interval);
    progress.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            outcome = &mut hook => {
                return match outcome {
                    Ok(Ok(())) => {
                        tracing::debug!("Cleaned {object}");
                        Ok(object)
                    }
                    Ok(Err(error)) => {
                        let error = CleanupError::Failed { object, error: Arc::new(error) };
                        tracing::error!("{error}");
                        Err(error)
                    }
                    Err(oneshot::Canceled) => {
                        let error = CleanupError::Panicked { object };
                        tracing::error!("{error}");
                        Err(error)
                    }
                };
            }
            _ = &mut timeout => {
                let error = CleanupError::Timeout { object, max_duration };
                tracing::warn!("{error}");
                return Err(error);
            }
            _ = progress.tick() => {
                tracing::info!("Still cleaning {object}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Instant as StdInstant,
    };

    use super::*;
    use crate::capabilities::{Component, Wire};

    struct Counting {
        calls: Arc<AtomicUsize>,
        sleep: Duration,
        fail: bool,
    }
    impl Wire for Counting {}
    impl Cleaner for Counting {
        fn clean(&self) -> Result<(), DynError> {
            thread::sleep(self.sleep);
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err("disk full".into());
            }
            Ok(())
        }
    }
    impl Component for Counting {
        fn as_cleaner(self: Arc<Self>) -> Option<Arc<dyn Cleaner>> {
            Some(self)
        }
    }

    struct Passive;
    impl Wire for Passive {}
    impl Component for Passive {}

    fn counting(calls: &Arc<AtomicUsize>, sleep: Duration, fail: bool) -> Object {
        Object::unnamed(Counting {
            calls: calls.clone(),
            sleep,
            fail,
        })
    }

    #[tokio::test]
    async fn objects_without_cleaner_are_skipped() {
        let report = clean_all(
            &[Object::unnamed(Passive)],
            Duration::from_secs(1),
            &ShutdownConfig::default(),
        )
        .await;

        assert!(report.is_clean());
        assert!(report.cleaned.is_empty());
        assert_eq!(report.exit_code(), 0);
    }

    #[tokio::test]
    async fn failing_cleaner_is_reported() {
        let calls = Arc::new(AtomicUsize::new(0));
        let objects = [counting(&calls, Duration::ZERO, true)];

        let report = clean_all(&objects, Duration::from_secs(5), &ShutdownConfig::default()).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.exit_code(), 1);
        match &report.failures[..] {
            [CleanupError::Failed { object, error }] => {
                assert_eq!(*object, ObjectId::unnamed::<Counting>());
                assert_eq!(error.to_string(), "disk full");
            }
            other => panic!("unexpected failures {other:?}"),
        }
    }

    #[tokio::test]
    async fn timed_out_cleaner_keeps_running() {
        let calls = Arc::new(AtomicUsize::new(0));
        let objects = [counting(&calls, Duration::from_millis(300), false)];
        let config = ShutdownConfig {
            progress_interval: Duration::from_millis(10),
            ..Default::default()
        };

        let report = clean_all(&objects, Duration::from_millis(50), &config).await;

        assert!(matches!(
            &report.failures[..],
            [CleanupError::Timeout { max_duration, .. }] if *max_duration == Duration::from_millis(50)
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        // Not cancelled, the hook still completes in the background
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropping_the_runtime_does_not_wait_for_a_timed_out_cleaner() {
        let calls = Arc::new(AtomicUsize::new(0));
        let objects = [counting(&calls, Duration::from_secs(3), false)];

        let started = StdInstant::now();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let report = runtime.block_on(clean_all(
            &objects,
            Duration::from_millis(50),
            &ShutdownConfig::default(),
        ));
        drop(runtime);

        assert!(matches!(&report.failures[..], [CleanupError::Timeout { .. }]));
        assert!(
            started.elapsed() < Duration::from_secs(1),
            "runtime shutdown waited {:?} for the cleaner",
            started.elapsed()
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn named_objects_are_reported_by_name() {
        let calls = Arc::new(AtomicUsize::new(0));
        let objects = [
            Object::named(
                "primary",
                Counting {
                    calls: calls.clone(),
                    sleep: Duration::ZERO,
                    fail: false,
                },
            ),
            Object::named(
                "replica",
                Counting {
                    calls: calls.clone(),
                    sleep: Duration::ZERO,
                    fail: true,
                },
            ),
        ];

        let report = clean_all(&objects, Duration::from_secs(5), &ShutdownConfig::default()).await;

        assert_eq!(report.cleaned, vec![ObjectId::named::<Counting>("primary")]);
        assert_eq!(
            report.failures.iter().map(CleanupError::object).collect::<Vec<_>>(),
            vec![&ObjectId::named::<Counting>("replica")]
        );
        assert!(report.failures[0].to_string().contains("replica"));
    }
}

use std::{sync::atomic::Ordering, time::Duration};

use futures::{stream::FuturesUnordered, StreamExt};
use tokio::signal::unix::{signal, SignalKind};

use crate::{container::Container, errors::ShutdownError};

impl Container {
    /// Stops the container when one of `signals` is received
    ///
    /// Defaults to SIGINT and SIGTERM when `signals` is empty. The stop
    /// terminates the process unless [ShutdownConfig::exit_on_signal](crate::ShutdownConfig)
    /// is disabled. Can be armed once per container.
    ///
    /// Must be called from within a tokio runtime, the listener is spawned on it.
    pub fn arm_shutdown_signals(
        &self,
        max_duration: Duration,
        signals: impl IntoIterator<Item = SignalKind>,
    ) -> Result<(), ShutdownError> {
        if self.0.signals_armed.swap(true, Ordering::SeqCst) {
            return Err(ShutdownError::AlreadyArmed);
        }

        let mut kinds: Vec<SignalKind> = signals.into_iter().collect();
        if kinds.is_empty() {
            kinds = vec![SignalKind::interrupt(), SignalKind::terminate()];
        }

        // Register all streams up front so no signal is missed after arming
        let streams = match kinds
            .into_iter()
            .map(|kind| signal(kind).map(|stream| (kind, stream)))
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(streams) => streams,
            Err(error) => {
                self.0.signals_armed.store(false, Ordering::SeqCst);
                return Err(error.into());
            }
        };

        let container = self.clone();
        let exit_process = container.shutdown_config().exit_on_signal;
        tokio::spawn(async move {
            let mut received: FuturesUnordered<_> = streams
                .into_iter()
                .map(|(kind, mut stream)| async move { stream.recv().await.map(|()| kind) })
                .collect();

            // A None means that stream closed, wait for the others
            while let Some(received) = received.next().await {
                if let Some(kind) = received {
                    tracing::info!(
                        "Got signal {}, cleaning before exit...",
                        kind.as_raw_value()
                    );
                    container.stop(max_duration, exit_process).await;
                    return;
                }
            }
        });

        tracing::debug!("Shutdown signals armed");
        Ok(())
    }
}

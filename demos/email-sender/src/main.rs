//! Demo: a background email queue that is drained before the process exits.
//!
//! `EmailSender` starts a worker thread in its initializer and, when the
//! container is stopped, waits for the queue to empty. Stop it with Ctrl+C or
//! let `--run-for` elapse.

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    thread,
    time::Duration,
};

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wrapp_injector::{
    Cleaner, Component, ContainerBuilder, DynError, Inject, Initializer, SignalKind, Wire,
    WireError, Wiring,
};

#[derive(Parser, Debug)]
#[command(about = "Queues a few emails and drains them on shutdown")]
struct Args {
    /// Seconds the cleaners get before the shutdown is reported as failed
    #[arg(long, default_value_t = 3)]
    clean_timeout: u64,
    /// Stop on our own after this many seconds
    #[arg(long, default_value_t = 5)]
    run_for: u64,
    /// Emails to queue on startup
    #[arg(long, default_value_t = 10)]
    emails: usize,
}

#[derive(Default)]
struct EmailSender {
    queue: Arc<Mutex<VecDeque<String>>>,
    running: Arc<AtomicBool>,
}

impl EmailSender {
    fn enqueue(&self, email: String) {
        self.queue.lock().unwrap().push_back(email);
    }

    fn pending(&self) -> usize {
        self.queue.lock().unwrap().len()
    }
}

impl Wire for EmailSender {}

impl Initializer for EmailSender {
    fn init(&self) -> Result<(), DynError> {
        self.running.store(true, Ordering::SeqCst);
        let queue = self.queue.clone();
        let running = self.running.clone();
        thread::spawn(move || {
            while running.load(Ordering::SeqCst) {
                let next = queue.lock().unwrap().pop_front();
                if let Some(email) = next {
                    tracing::info!("Sending {email}");
                }
                thread::sleep(Duration::from_millis(200));
            }
        });
        tracing::info!("Email sender initialized");
        Ok(())
    }
}

impl Cleaner for EmailSender {
    fn clean(&self) -> Result<(), DynError> {
        tracing::info!("starting cleanup");
        while self.pending() > 0 {
            tracing::info!("Email queue still not empty ({})", self.pending());
            thread::sleep(Duration::from_millis(500));
        }
        self.running.store(false, Ordering::SeqCst);
        tracing::info!("finished cleaning");
        Ok(())
    }
}

impl Component for EmailSender {
    fn as_initializer(&self) -> Option<&dyn Initializer> {
        Some(self)
    }

    fn as_cleaner(self: Arc<Self>) -> Option<Arc<dyn Cleaner>> {
        Some(self)
    }
}

/// Queues the welcome emails once everything is wired
#[derive(Default)]
struct Onboarding {
    sender: Inject<EmailSender>,
    emails: usize,
}

impl Wire for Onboarding {
    fn wire(&self, wiring: &mut Wiring<'_>) -> Result<(), WireError> {
        wiring.unnamed("sender", &self.sender)
    }
}

impl Initializer for Onboarding {
    fn init(&self) -> Result<(), DynError> {
        for i in 0..self.emails {
            self.sender.enqueue(format!("email {i}"));
        }
        Ok(())
    }
}

impl Component for Onboarding {
    fn as_initializer(&self) -> Option<&dyn Initializer> {
        Some(self)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "email_sender=info,wrapp_injector=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let clean_timeout = Duration::from_secs(args.clean_timeout);

    let container = ContainerBuilder::new()
        .add(EmailSender::default())?
        .add(Onboarding {
            emails: args.emails,
            ..Default::default()
        })?
        .build()?;

    container.arm_shutdown_signals(
        clean_timeout,
        [SignalKind::interrupt(), SignalKind::terminate()],
    )?;

    let stop = container.stopper(clean_timeout, true);
    tokio::time::sleep(Duration::from_secs(args.run_for)).await;
    stop().await;

    Ok(())
}

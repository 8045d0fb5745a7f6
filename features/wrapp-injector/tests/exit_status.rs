//! Stops that end the process, run in a child copy of this test binary

use std::{env, process::Command, sync::Arc, thread, time::Duration};

use wrapp_injector::{Cleaner, Component, ContainerBuilder, DynError, Wire};

const UNIT: Duration = Duration::from_millis(100);
const CHILD: &str = "WRAPP_INJECTOR_EXIT_CHILD";
/// Status of a child that returned from `stop` instead of exiting
const DID_NOT_EXIT: i32 = 42;

struct Quick;
impl Wire for Quick {}
impl Cleaner for Quick {
    fn clean(&self) -> Result<(), DynError> {
        Ok(())
    }
}
impl Component for Quick {
    fn as_cleaner(self: Arc<Self>) -> Option<Arc<dyn Cleaner>> {
        Some(self)
    }
}

struct Stuck;
impl Wire for Stuck {}
impl Cleaner for Stuck {
    fn clean(&self) -> Result<(), DynError> {
        thread::sleep(UNIT * 20);
        Ok(())
    }
}
impl Component for Stuck {
    fn as_cleaner(self: Arc<Self>) -> Option<Arc<dyn Cleaner>> {
        Some(self)
    }
}

/// Re-runs `test` alone in a child process and returns its exit status
fn exit_status_of(test: &str) -> Option<i32> {
    let status = Command::new(env::current_exe().unwrap())
        .args(["--exact", test, "--nocapture", "--test-threads=1"])
        .env(CHILD, "1")
        .status()
        .unwrap();
    status.code()
}

fn in_child() -> bool {
    env::var_os(CHILD).is_some()
}

fn stop_and_exit(builder: ContainerBuilder) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let container = builder.build().unwrap();
    runtime.block_on(container.stop(UNIT / 2, true));
    std::process::exit(DID_NOT_EXIT);
}

#[test]
fn clean_stop_exits_with_zero() {
    if in_child() {
        stop_and_exit(ContainerBuilder::new().add(Quick).unwrap());
    }

    assert_eq!(exit_status_of("clean_stop_exits_with_zero"), Some(0));
}

#[test]
fn timed_out_cleaner_exits_with_one() {
    if in_child() {
        stop_and_exit(
            ContainerBuilder::new()
                .add(Quick)
                .and_then(|builder| builder.add(Stuck))
                .unwrap(),
        );
    }

    assert_eq!(exit_status_of("timed_out_cleaner_exits_with_one"), Some(1));
}

#[cfg(unix)]
#[test]
fn signal_stop_exits_by_default() {
    use wrapp_injector::SignalKind;

    if in_child() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async {
            let container = ContainerBuilder::new().add(Quick).unwrap().build().unwrap();
            container
                .arm_shutdown_signals(UNIT * 10, [SignalKind::user_defined2()])
                .unwrap();

            let status = Command::new("kill")
                .args(["-USR2", &std::process::id().to_string()])
                .status()
                .unwrap();
            assert!(status.success());

            // The listener exits the process before this elapses
            tokio::time::sleep(UNIT * 50).await;
        });
        std::process::exit(DID_NOT_EXIT);
    }

    assert_eq!(exit_status_of("signal_stop_exits_by_default"), Some(0));
}

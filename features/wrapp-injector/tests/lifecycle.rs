use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use wrapp_injector::{
    BuildError, Component, ContainerBuilder, DynError, Inject, InitError, Initializer, ObjectId,
    Wire, WireError, Wiring,
};

type Journal = Arc<Mutex<Vec<&'static str>>>;

struct Step {
    label: &'static str,
    journal: Journal,
    fail: bool,
}
impl Wire for Step {}
impl Initializer for Step {
    fn init(&self) -> Result<(), DynError> {
        self.journal.lock().unwrap().push(self.label);
        if self.fail {
            return Err(format!("{} refused to start", self.label).into());
        }
        Ok(())
    }
}
impl Component for Step {
    fn as_initializer(&self) -> Option<&dyn Initializer> {
        Some(self)
    }
}

fn step(journal: &Journal, label: &'static str, fail: bool) -> Step {
    Step {
        label,
        journal: journal.clone(),
        fail,
    }
}

#[test]
fn initializers_run_in_registration_order() {
    let journal = Journal::default();

    ContainerBuilder::new()
        .add_named("first", step(&journal, "first", false))
        .and_then(|builder| builder.add_named("second", step(&journal, "second", false)))
        .and_then(|builder| builder.add_named("third", step(&journal, "third", false)))
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(*journal.lock().unwrap(), vec!["first", "second", "third"]);
}

#[test]
fn first_failing_initializer_aborts_startup() {
    let journal = Journal::default();

    let err = ContainerBuilder::new()
        .add_named("first", step(&journal, "first", false))
        .and_then(|builder| builder.add_named("second", step(&journal, "second", true)))
        .and_then(|builder| builder.add_named("third", step(&journal, "third", false)))
        .unwrap()
        .build()
        .unwrap_err();

    assert_eq!(*journal.lock().unwrap(), vec!["first", "second"]);
    match err {
        BuildError::Init(InitError::InitializationFailure { object, error }) => {
            assert_eq!(object, ObjectId::named::<Step>("second"));
            assert_eq!(error.to_string(), "second refused to start");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

struct Database {
    connected: AtomicBool,
}
impl Wire for Database {}
impl Initializer for Database {
    fn init(&self) -> Result<(), DynError> {
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }
}
impl Component for Database {
    fn as_initializer(&self) -> Option<&dyn Initializer> {
        Some(self)
    }
}

/// Registered before its dependency, checks it is wired (not necessarily initialized) first
#[derive(Default)]
struct Repository {
    database: Inject<Database>,
    saw_database_connected: AtomicBool,
}
impl Wire for Repository {
    fn wire(&self, wiring: &mut Wiring<'_>) -> Result<(), WireError> {
        wiring.unnamed("database", &self.database)
    }
}
impl Initializer for Repository {
    fn init(&self) -> Result<(), DynError> {
        let connected = self.database.connected.load(Ordering::SeqCst);
        self.saw_database_connected.store(connected, Ordering::SeqCst);
        Ok(())
    }
}
impl Component for Repository {
    fn as_initializer(&self) -> Option<&dyn Initializer> {
        Some(self)
    }
}

#[test]
fn all_fields_are_wired_before_any_initializer_runs() {
    let container = ContainerBuilder::new()
        .add(Repository::default())
        .and_then(|builder| {
            builder.add(Database {
                connected: AtomicBool::new(false),
            })
        })
        .unwrap()
        .build()
        .unwrap();

    let repository = container.get::<Repository>().unwrap();
    // Registration order drives init order, Repository ran first
    assert!(!repository.saw_database_connected.load(Ordering::SeqCst));
    assert!(repository.database.connected.load(Ordering::SeqCst));
}

#[test]
fn wiring_failure_runs_no_initializer() {
    let journal = Journal::default();

    let err = ContainerBuilder::new()
        .add_named("first", step(&journal, "first", false))
        .and_then(|builder| builder.add(Repository::default()))
        .unwrap()
        .build()
        .unwrap_err();

    assert!(matches!(err, BuildError::Wire(_)));
    assert!(journal.lock().unwrap().is_empty());
}

#[test]
fn lookup_of_unregistered_type_fails() {
    let container = ContainerBuilder::new().build().unwrap();

    assert!(container.is_empty());
    assert!(container.get::<Database>().is_err());
    assert!(container.get_named::<Database>("primary").is_err());
}

use async_trait::async_trait;
use scoped_di::{AsyncDispose, Dispose, Injector, Provider, Providers, Token};
use std::sync::{Arc, Mutex};

type Log = Arc<Mutex<Vec<String>>>;

struct Tracked {
    name: &'static str,
    log: Log,
}

impl Dispose for Tracked {
    fn dispose(&self) {
        self.log.lock().unwrap().push(format!("sync:{}", self.name));
    }
}

struct AsyncTracked {
    name: &'static str,
    log: Log,
}

#[async_trait]
impl AsyncDispose for AsyncTracked {
    async fn dispose(&self) {
        tokio::task::yield_now().await;
        self.log.lock().unwrap().push(format!("async:{}", self.name));
    }
}

fn tracked(name: &'static str, deps: Vec<scoped_di::Key>, log: &Log) -> Provider<Tracked> {
    let log = log.clone();
    Provider::factory(deps, move |_| {
        Ok(Tracked {
            name,
            log: log.clone(),
        })
    })
    .disposable()
}

fn async_tracked(name: &'static str, log: &Log) -> Provider<AsyncTracked> {
    let log = log.clone();
    Provider::factory([], move |_| {
        Ok(AsyncTracked {
            name,
            log: log.clone(),
        })
    })
    .async_disposable()
}

#[test]
fn test_sync_disposal_lifo_order() {
    let log: Log = Arc::default();
    let first = Token::<Tracked>::new("first");
    let second = Token::<Tracked>::new("second");
    let third = Token::<Tracked>::new("third");

    let mut providers = Providers::new();
    providers
        .provide(&first, tracked("First", vec![], &log))
        .provide(&second, tracked("Second", vec![first.key()], &log))
        .provide(&third, tracked("Third", vec![second.key()], &log));
    let root = Injector::root(providers);

    // Constructed First, Second, Third
    root.resolve(&third).unwrap();
    root.destroy().unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["sync:Third", "sync:Second", "sync:First"]
    );
}

#[test]
fn test_only_constructed_instances_are_disposed() {
    let log: Log = Arc::default();
    let used = Token::<Tracked>::new("used");
    let unused = Token::<Tracked>::new("unused");

    let mut providers = Providers::new();
    providers
        .provide(&used, tracked("used", vec![], &log))
        .provide(&unused, tracked("unused", vec![], &log));
    let root = Injector::root(providers);

    root.resolve(&used).unwrap();
    root.resolve(&used).unwrap();
    root.destroy().unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["sync:used"]);
}

#[test]
fn test_values_are_never_disposed() {
    let log: Log = Arc::default();
    let supplied = Token::<Tracked>::new("supplied");

    let mut providers = Providers::new();
    providers.provide(
        &supplied,
        Provider::value(Tracked {
            name: "supplied",
            log: log.clone(),
        })
        .disposable(),
    );
    let root = Injector::root(providers);

    root.resolve(&supplied).unwrap();
    root.destroy().unwrap();

    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn test_child_destroy_disposes_only_child_instances() {
    let log: Log = Arc::default();
    let shared = Token::<Tracked>::new("shared");
    let local = Token::<Tracked>::new("local");

    let mut providers = Providers::new();
    providers.provide(&shared, tracked("root", vec![], &log));
    let root = Injector::root(providers);

    let mut overrides = Providers::new();
    overrides.provide(&local, tracked("child", vec![shared.key()], &log));
    let child = root.create_child(overrides).unwrap();

    child.resolve(&local).unwrap();
    child.destroy().unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["sync:child"]);

    root.destroy().unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["sync:child", "sync:root"]);
}

#[tokio::test]
async fn test_async_disposal_runs_before_sync() {
    let log: Log = Arc::default();
    let sync_a = Token::<Tracked>::new("sync-a");
    let async_b = Token::<AsyncTracked>::new("async-b");
    let async_c = Token::<AsyncTracked>::new("async-c");

    let mut providers = Providers::new();
    providers
        .provide(&sync_a, tracked("A", vec![], &log))
        .provide(&async_b, async_tracked("B", &log))
        .provide(&async_c, async_tracked("C", &log));
    let root = Injector::root(providers);

    root.resolve(&sync_a).unwrap();
    root.resolve(&async_b).unwrap();
    root.resolve(&async_c).unwrap();

    root.destroy_async().await.unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["async:C", "async:B", "sync:A"]
    );
}

#[test]
fn test_sync_destroy_skips_async_hooks() {
    let log: Log = Arc::default();
    let async_only = Token::<AsyncTracked>::new("async-only");
    let sync_only = Token::<Tracked>::new("sync-only");

    let mut providers = Providers::new();
    providers
        .provide(&async_only, async_tracked("skipped", &log))
        .provide(&sync_only, tracked("ran", vec![], &log));
    let root = Injector::root(providers);

    root.resolve(&async_only).unwrap();
    root.resolve(&sync_only).unwrap();
    root.destroy().unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["sync:ran"]);
}

#[tokio::test]
async fn test_destroy_async_twice_is_invalid() {
    let root = Injector::root(Providers::new());
    root.destroy_async().await.unwrap();

    assert!(root.destroy_async().await.is_err());
}

#[test]
fn test_descriptor_reports_teardown() {
    let log: Log = Arc::default();
    let svc = Token::<Tracked>::new("svc");

    let mut providers = Providers::new();
    providers.provide(&svc, tracked("svc", vec![], &log));
    let root = Injector::root(providers);

    assert_eq!(
        root.lookup_local(&svc.key()).unwrap().teardown,
        Some(scoped_di::TeardownKind::Sync)
    );
}

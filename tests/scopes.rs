use once_cell::sync::Lazy;
use scoped_di::{
    Dependencies, DiError, DiResult, Injectable, Injector, Key, Provider, Providers, Token,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

trait TasksService: Send + Sync {
    fn source(&self) -> &'static str;
}

struct RealTasks;
impl TasksService for RealTasks {
    fn source(&self) -> &'static str {
        "real"
    }
}

struct MockTasks;
impl TasksService for MockTasks {
    fn source(&self) -> &'static str {
        "mock"
    }
}

static TASKS_TOKEN: Lazy<Token<dyn TasksService>> = Lazy::new(|| Token::new("tasks-service"));

fn app_providers() -> Providers {
    let mut providers = Providers::new();
    providers.provide(
        &TASKS_TOKEN,
        Provider::factory_arc([], |_| Ok(Arc::new(RealTasks) as Arc<dyn TasksService>)),
    );
    providers
}

#[test]
fn test_child_override_is_isolated_from_parent() {
    let root = Injector::root(app_providers());

    let mut overrides = Providers::new();
    overrides.value_arc(&TASKS_TOKEN, Arc::new(MockTasks) as Arc<dyn TasksService>);
    let child = root.create_child(overrides).unwrap();

    assert_eq!(child.resolve(&TASKS_TOKEN).unwrap().source(), "mock");
    assert_eq!(root.resolve(&TASKS_TOKEN).unwrap().source(), "real");
}

#[test]
fn test_child_without_override_shares_parent_instance() {
    let root = Injector::root(app_providers());
    let child = root.create_child(Providers::new()).unwrap();
    let grandchild = child.create_child(Providers::new()).unwrap();

    let from_grandchild = grandchild.resolve(&TASKS_TOKEN).unwrap();
    let from_root = root.resolve(&TASKS_TOKEN).unwrap();

    assert!(Arc::ptr_eq(&from_grandchild, &from_root));
    // Cached where the provider lives
    assert_eq!(root.cached_instances(), 1);
    assert_eq!(child.cached_instances(), 0);
    assert_eq!(grandchild.cached_instances(), 0);
}

#[test]
fn test_sibling_scopes_have_their_own_instances() {
    let request = Token::<String>::new("request-id");
    let counter = Arc::new(AtomicUsize::new(0));
    let root = Injector::root(Providers::new());

    let scope = |root: &Injector| {
        let mut providers = Providers::new();
        let counter = counter.clone();
        providers.factory(&request, [], move |_| {
            Ok(format!("req-{}", counter.fetch_add(1, Ordering::SeqCst)))
        });
        root.create_child(providers).unwrap()
    };

    let first = scope(&root);
    let second = scope(&root);

    let a = first.resolve(&request).unwrap();
    let b = second.resolve(&request).unwrap();
    assert_ne!(a, b);
    assert!(Arc::ptr_eq(&a, &first.resolve(&request).unwrap()));
    assert!(root.try_resolve(&request).unwrap().is_none());
}

#[test]
fn test_dependencies_resolve_from_owning_scope() {
    struct Logger {
        prefix: String,
    }

    struct Service {
        logger: Arc<Logger>,
    }

    impl Injectable for Service {
        fn dependencies() -> Vec<Key> {
            vec![Key::of::<Logger>()]
        }

        fn construct(deps: &Dependencies) -> DiResult<Self> {
            Ok(Service { logger: deps.at(0)? })
        }
    }

    let logger = Token::<Logger>::of();

    let mut providers = Providers::new();
    providers
        .value(&logger, Logger { prefix: "root".into() })
        .class::<Service>();
    let root = Injector::root(providers);

    // The child overrides Logger, but Service is owned by the root and
    // therefore keeps the root's Logger.
    let mut overrides = Providers::new();
    overrides.value(&logger, Logger { prefix: "child".into() });
    let child = root.create_child(overrides).unwrap();

    let service = child.resolve(&Token::<Service>::of()).unwrap();
    assert_eq!(service.logger.prefix, "root");
    assert_eq!(child.resolve(&logger).unwrap().prefix, "child");
}

#[test]
fn test_child_may_override_a_dependency_by_providing_the_dependent_too() {
    let base = Token::<String>::new("base-url");
    let client = Token::<String>::new("client");

    let client_provider = || {
        Provider::factory([base.key()], |deps: &Dependencies| {
            Ok(format!("client for {}", deps.at::<String>(0)?))
        })
    };

    let mut providers = Providers::new();
    providers
        .value(&base, "https://prod".to_string())
        .provide(&client, client_provider());
    let root = Injector::root(providers);

    let mut overrides = Providers::new();
    overrides
        .value(&base, "https://staging".to_string())
        .provide(&client, client_provider());
    let child = root.create_child(overrides).unwrap();

    assert_eq!(*child.resolve(&client).unwrap(), "client for https://staging");
    assert_eq!(*root.resolve(&client).unwrap(), "client for https://prod");
}

#[test]
fn test_alias_in_child_targets_nearest_provider() {
    let logger = Token::<String>::new("logger");
    let legacy = Token::<String>::new("legacy-logger");

    let mut providers = Providers::new();
    providers.value(&logger, "root logger".to_string());
    let root = Injector::root(providers);

    let mut overrides = Providers::new();
    overrides
        .value(&logger, "child logger".to_string())
        .alias(&legacy, &logger);
    let child = root.create_child(overrides).unwrap();

    let via_alias = child.resolve(&legacy).unwrap();
    assert_eq!(*via_alias, "child logger");
    assert!(Arc::ptr_eq(&via_alias, &child.resolve(&logger).unwrap()));
}

#[test]
fn test_hierarchy_accessors() {
    let root = Injector::root(Providers::new());
    let child = root.create_child(Providers::new()).unwrap();
    let grandchild = Injector::child(&child, Providers::new()).unwrap();

    assert!(root.is_root());
    assert!(!child.is_root());
    assert_eq!(grandchild.depth(), 2);
    assert!(grandchild.parent().unwrap().same_scope(&child));
    assert!(child.parent().unwrap().same_scope(&root));
    assert_ne!(root.id(), child.id());
    assert_eq!(root.live_children(), 1);
}

#[test]
fn test_destroy_child_leaves_parent_intact() {
    let root = Injector::root(app_providers());
    let before = root.resolve(&TASKS_TOKEN).unwrap();

    let mut overrides = Providers::new();
    overrides.value_arc(&TASKS_TOKEN, Arc::new(MockTasks) as Arc<dyn TasksService>);
    let child = root.create_child(overrides).unwrap();
    child.resolve(&TASKS_TOKEN).unwrap();

    child.destroy().unwrap();

    assert!(child.is_destroyed());
    assert!(matches!(
        child.resolve(&TASKS_TOKEN),
        Err(DiError::InvalidScope { .. })
    ));
    assert!(Arc::ptr_eq(&before, &root.resolve(&TASKS_TOKEN).unwrap()));
    assert_eq!(root.live_children(), 0);
}

#[test]
fn test_destroy_twice_is_invalid() {
    let root = Injector::root(Providers::new());
    root.destroy().unwrap();

    assert!(matches!(root.destroy(), Err(DiError::InvalidScope { .. })));
}

#[test]
fn test_destroy_refused_while_children_are_live() {
    let root = Injector::root(Providers::new());
    let child = root.create_child(Providers::new()).unwrap();

    let err = root.destroy().unwrap_err();
    assert!(matches!(err, DiError::InvalidScope { ref reason, .. } if reason.contains("child")));
    assert!(!root.is_destroyed());

    child.destroy().unwrap();
    root.destroy().unwrap();
}

#[test]
fn test_dropped_children_do_not_block_destroy() {
    let root = Injector::root(Providers::new());
    {
        let _child = root.create_child(Providers::new()).unwrap();
    }
    root.destroy().unwrap();
}

#[test]
fn test_destroyed_scope_rejects_children_and_registration() {
    let root = Injector::root(Providers::new());
    root.destroy().unwrap();

    assert!(matches!(
        root.create_child(Providers::new()),
        Err(DiError::InvalidScope { .. })
    ));
    assert!(matches!(
        root.register(&Token::<u8>::new("x"), Provider::value(1)),
        Err(DiError::InvalidScope { .. })
    ));
}

#[test]
fn test_child_registration_never_touches_parent() {
    let flag = Token::<bool>::new("flag");
    let root = Injector::root(Providers::new());
    let child = root.create_child(Providers::new()).unwrap();

    child.register(&flag, Provider::value(true)).unwrap();

    assert!(child.contains(&flag));
    assert!(!root.contains(&flag));
    assert!(root.lookup_local(&flag.key()).is_none());
}

#[test]
fn test_class_token_overridden_by_value_in_child() {
    struct Tasks {
        mock: bool,
    }

    impl Injectable for Tasks {
        fn construct(_: &Dependencies) -> DiResult<Self> {
            Ok(Tasks { mock: false })
        }
    }

    let tasks_token = Token::<Tasks>::new("TASKS_TOKEN");

    let mut providers = Providers::new();
    providers.class_as(&tasks_token);
    let root = Injector::root(providers);

    let original = root.resolve(&tasks_token).unwrap();
    assert!(Arc::ptr_eq(&original, &root.resolve(&tasks_token).unwrap()));

    let mock = Arc::new(Tasks { mock: true });
    let child = root
        .create_child({
            let mut overrides = Providers::new();
            overrides.provide(&tasks_token, Provider::value_arc(mock.clone()));
            overrides
        })
        .unwrap();

    let from_child = child.resolve(&tasks_token).unwrap();
    assert!(from_child.mock);
    assert!(Arc::ptr_eq(&from_child, &mock));
    assert!(Arc::ptr_eq(&original, &root.resolve(&tasks_token).unwrap()));
    assert!(!original.mock);
}

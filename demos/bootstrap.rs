//! Application bootstrap with a root injector and per-component child scopes.
//!
//! Run with `RUST_LOG=scoped_di=debug cargo run --example bootstrap` to see
//! the container's own logging.

use std::process::ExitCode;
use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use scoped_di::{
    AsyncDispose, Dependencies, DiResult, Dispose, Injectable, Injector, InjectorConfig, Key,
    Provider, Providers, Token,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

// ----- Services -----

trait TasksService: Send + Sync {
    fn list(&self) -> Vec<String>;
}

struct Database {
    url: String,
}

impl Injectable for Database {
    fn construct(_: &Dependencies) -> DiResult<Self> {
        Ok(Database {
            url: "postgres://localhost/tasks".into(),
        })
    }
}

impl Dispose for Database {
    fn dispose(&self) {
        info!(url = %self.url, "Closing database pool");
    }
}

struct DbTasks {
    db: Arc<Database>,
}

impl TasksService for DbTasks {
    fn list(&self) -> Vec<String> {
        vec![format!("write report (from {})", self.db.url)]
    }
}

struct MockTasks;

impl TasksService for MockTasks {
    fn list(&self) -> Vec<String> {
        vec!["mock task".into()]
    }
}

struct Notifier {
    channel: String,
}

#[async_trait]
impl AsyncDispose for Notifier {
    async fn dispose(&self) {
        info!(channel = %self.channel, "Flushing notifications");
    }
}

// Explicit custom token: the requested type is a trait object
static TASKS_TOKEN: Lazy<Token<dyn TasksService>> = Lazy::new(|| Token::new("tasks-service"));
static NOTIFIER_TOKEN: Lazy<Token<Notifier>> = Lazy::new(|| Token::new("notifier"));

fn app_providers() -> Providers {
    let mut providers = Providers::new();

    // Implicit style: the class is its own token
    providers.provide(&Token::<Database>::of(), Provider::<Database>::class().disposable());

    providers
        .provide(
            &TASKS_TOKEN,
            Provider::factory_arc([Key::of::<Database>()], |deps| {
                Ok(Arc::new(DbTasks { db: deps.at(0)? }) as Arc<dyn TasksService>)
            }),
        )
        .provide(
            &NOTIFIER_TOKEN,
            Provider::factory([], |_| {
                Ok(Notifier {
                    channel: "#tasks".into(),
                })
            })
            .async_disposable(),
        );
    providers
}

async fn run() -> DiResult<()> {
    let root = Injector::root_with_config(app_providers(), InjectorConfig::from_env()?);
    root.validate().into_result()?;

    // A component using the application's providers
    let tasks = root.resolve(&TASKS_TOKEN)?;
    info!(tasks = ?tasks.list(), "Root component");
    root.resolve(&NOTIFIER_TOKEN)?;

    // A component subtree with an overriding provider
    let mut overrides = Providers::new();
    overrides.value_arc(&TASKS_TOKEN, Arc::new(MockTasks) as Arc<dyn TasksService>);
    let component = root.create_child(overrides)?;
    info!(tasks = ?component.resolve(&TASKS_TOKEN)?.list(), "Child component");

    component.destroy()?;
    root.destroy_async().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Bootstrap failed");
            ExitCode::FAILURE
        }
    }
}

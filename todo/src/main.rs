//! Interactive todo list backed by a local JSON file.
//!
//! Reads commands from stdin, one per line, and prints the list after each
//! one. Type `help` for the command list.

use anyhow::Context;
use std::sync::Arc;
use todo::shell::Outcome;
use todo::{Config, Shell, TodoEnvironment, TodoReducer, TodoState, persistence};
use todo_store_core::environment::{SystemClock, TimestampIdGenerator};
use todo_store_runtime::{FileStorage, Store};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    // Logs go to stderr so they never mix with the rendered list
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!(
        path = %config.storage.path.display(),
        key = %config.storage.key,
        rehydrate = config.storage.rehydrate,
        "Starting todo shell"
    );

    let storage = Arc::new(FileStorage::new(config.storage.path.clone()));
    let ids = Arc::new(TimestampIdGenerator::new(Arc::new(SystemClock)));
    let env = TodoEnvironment::new(ids, storage.clone()).with_storage_key(&config.storage.key);

    let state = if config.storage.rehydrate {
        persistence::load_state(storage.as_ref(), &config.storage.key)
    } else {
        TodoState::new()
    };

    let mut shell = Shell::new(Store::new(state, TodoReducer::new(), env));
    println!("{}", shell.render().await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let result = loop {
        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            break Ok(());
        };

        match shell.execute(&line).await {
            Ok(None) => {},
            Ok(Some(Outcome::Render)) => println!("{}", shell.render().await),
            Ok(Some(Outcome::Message(message))) => println!("{message}"),
            Ok(Some(Outcome::Quit)) => break Ok(()),
            Err(error) if error.is_fatal() => {
                tracing::error!(error = %error, "Fatal error, stopping");
                break Err(anyhow::Error::new(error).context(format!("Rejected input: {line}")));
            },
            Err(error) => println!("{error}"),
        }
    };

    shell.shutdown();
    result
}

//! relmap command-line client
//!
//! Materializes a JSON schema into a SQLite database and runs list, get,
//! insert, update and remove against it.

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

mod commands;
mod config;
mod formatter;

use clap::Parser;
use relmap_core::{Adapter, ClientError, Schema, UnknownError};
use relmap_sqlite::SqliteEngine;

use config::Args;
use formatter::{create_formatter, format_error};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("relmap=info")),
        )
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        tracing::error!(error = %e, "command failed");

        let body = match e.downcast_ref::<relmap_core::Error>() {
            Some(error) => ClientError::classify(error).body(),
            None => UnknownError.body(),
        };
        eprintln!("{}", format_error(&body));
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let (config, command) = args.into_config();

    let document = std::fs::read_to_string(&config.schema_path)?;
    let schema = Schema::from_json(&document)?;
    schema.validate()?;

    let engine = SqliteEngine::open(&config.sqlite)?;
    let adapter = Adapter::new(engine);

    let output = commands::execute(&adapter, &schema, command).await?;
    println!("{}", output.render(create_formatter(config.format).as_ref()));

    Ok(())
}

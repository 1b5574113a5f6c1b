//! Command-line arguments and the configuration derived from them.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use relmap_sqlite::SqliteConfig;

use crate::formatter::OutputFormat;

/// Default database file.
pub const DEFAULT_DATABASE: &str = "relmap.db";

/// Database argument that selects a private in-memory database.
pub const IN_MEMORY: &str = ":memory:";

/// Default busy timeout in seconds.
pub const DEFAULT_BUSY_TIMEOUT_SECS: u64 = 5;

/// relmap command-line interface
#[derive(Parser, Debug)]
#[command(name = "relmap")]
#[command(version, about = "Map a JSON schema onto SQLite and query it")]
pub struct Args {
    /// SQLite database file (":memory:" for a throwaway database)
    #[arg(short, long, default_value = DEFAULT_DATABASE)]
    pub database: String,

    /// Schema document (JSON)
    #[arg(short, long)]
    pub schema: PathBuf,

    /// Seconds to wait on a locked database
    #[arg(long, default_value_t = DEFAULT_BUSY_TIMEOUT_SECS)]
    pub busy_timeout: u64,

    /// Output format
    #[arg(long, default_value = "json", value_enum)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Operations.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create missing tables for every type in the schema
    Materialize,

    /// List objects of a type
    List {
        /// Type name
        type_name: String,

        /// Filter as name<op>value, with op one of < > = <= >=
        #[arg(short, long = "filter")]
        filters: Vec<String>,

        /// Relation to embed
        #[arg(short, long = "expand")]
        expands: Vec<String>,

        /// Maximum number of objects
        #[arg(long, default_value_t = relmap_core::DEFAULT_LIMIT)]
        limit: u64,

        /// Objects to skip
        #[arg(long, default_value_t = 0)]
        offset: u64,
    },

    /// Fetch one object by id
    Get {
        /// Type name
        type_name: String,

        /// Object id
        id: i64,

        /// Relation to embed
        #[arg(short, long = "expand")]
        expands: Vec<String>,
    },

    /// Insert an object given as a JSON document
    Insert {
        /// Type name
        type_name: String,

        /// Attributes, e.g. '{"name": "Ann"}'
        data: String,
    },

    /// Update an object; arrays given are replaced
    Update {
        /// Type name
        type_name: String,

        /// Object id
        id: i64,

        /// Attributes, e.g. '{"tags": [1, 2]}'
        data: String,
    },

    /// Delete an object
    Remove {
        /// Type name
        type_name: String,

        /// Object id
        id: i64,
    },
}

/// Settings for one invocation.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Engine configuration.
    pub sqlite: SqliteConfig,
    /// Schema document path.
    pub schema_path: PathBuf,
    /// Output format.
    pub format: OutputFormat,
}

impl Args {
    /// Split the arguments into configuration and the command to run.
    pub fn into_config(self) -> (CliConfig, Command) {
        let sqlite = if self.database == IN_MEMORY {
            SqliteConfig::in_memory()
        } else {
            SqliteConfig::new(&self.database)
        }
        .with_busy_timeout(Duration::from_secs(self.busy_timeout));

        let config = CliConfig {
            sqlite,
            schema_path: self.schema,
            format: self.format,
        };
        (config, self.command)
    }
}

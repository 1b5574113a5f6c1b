//! SQLite storage engine for relmap.
//!
//! [`SqliteEngine`] implements both collaborator traits of `relmap-core`:
//! it renders [`TableSpec`](relmap_core::TableSpec)s as `CREATE TABLE`
//! statements and runs composed statements through `rusqlite`, reporting
//! constraint failures with the column they name.
//!
//! ```no_run
//! use relmap_core::Adapter;
//! use relmap_sqlite::{SqliteConfig, SqliteEngine};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = SqliteEngine::open(&SqliteConfig::new("app.db"))?;
//! let adapter = Adapter::new(engine);
//! # let _ = adapter;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod ddl;
pub mod engine;
pub mod error;

pub use config::SqliteConfig;
pub use engine::SqliteEngine;
pub use error::{Error, Result};

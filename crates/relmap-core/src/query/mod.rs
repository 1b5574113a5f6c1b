//! List queries: filters, expands, composition and reconstruction.
//!
//! A list call is composed into a single [`SelectQuery`](crate::sql::SelectQuery)
//! by [`compose`], executed by the engine, and the flat rows are folded back
//! into nested objects by [`reconstruct`].

mod compose;
mod expand;
mod filter;
mod list;
mod reconstruct;

pub use compose::{compose, expand_column, row_column, side_alias};
pub use expand::{resolve_expands, Expand};
pub use filter::{coerce_literal, ClassifiedFilter, Filter, FilterTarget};
pub use list::{ListQuery, DEFAULT_LIMIT};
pub use reconstruct::reconstruct;

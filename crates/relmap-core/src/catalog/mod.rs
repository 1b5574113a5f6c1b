//! Schema catalog for relmap.
//!
//! The catalog describes the object types a caller maps onto relational tables:
//! their properties, relations and the side tables array properties live in.

mod property;
mod schema;
mod type_def;
mod types;

pub use property::PropertyDef;
pub use schema::Schema;
pub use type_def::{TypeDef, ID_COLUMN, VALUE_COLUMN};
pub use types::{ElementType, PropertyType, ScalarKind};

//! Dependency ordering of type definitions.
//!
//! Tables for referenced types have to exist before the tables that point at
//! them. [`TypeGraph`] walks the references between types depth-first and
//! produces an order in which every type comes after the types it depends on.
//!
//! Self references are ignored (a table may point at itself). A cycle between
//! distinct types has no valid order and fails with [`Error::CycleDetected`]
//! before any table is requested.

use std::collections::HashMap;

use crate::catalog::{Schema, TypeDef};
use crate::error::{Error, Result};

/// Resolution state of one type within a single walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    /// On the current DFS path.
    Visiting,
    /// Already emitted.
    Done,
}

/// Reference graph over the types of a schema.
pub struct TypeGraph<'a> {
    schema: &'a Schema,
}

/// State owned by one resolution run.
struct Walk<'a> {
    schema: &'a Schema,
    marks: HashMap<&'a str, Mark>,
    path: Vec<&'a str>,
    order: Vec<&'a TypeDef>,
}

impl<'a> TypeGraph<'a> {
    /// Create a graph over the given schema.
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// Order every type of the schema, dependencies first.
    ///
    /// Roots are visited in declaration order, so independent types keep
    /// their relative order.
    pub fn resolve(&self) -> Result<Vec<&'a TypeDef>> {
        self.resolve_from(self.schema.types.iter().map(|t| t.name.as_str()))
    }

    /// Order the given types and everything they (transitively) reference.
    pub fn resolve_from<'r>(&self, roots: impl IntoIterator<Item = &'r str>) -> Result<Vec<&'a TypeDef>> {
        let mut walk = Walk {
            schema: self.schema,
            marks: HashMap::new(),
            path: Vec::new(),
            order: Vec::new(),
        };

        for root in roots {
            let type_def = self.schema.require_type(root)?;
            walk.visit(type_def)?;
        }

        tracing::debug!(
            order = ?walk.order.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
            "resolved type order"
        );

        Ok(walk.order)
    }
}

impl<'a> Walk<'a> {
    fn visit(&mut self, type_def: &'a TypeDef) -> Result<()> {
        let name = type_def.name.as_str();
        match self.marks.get(name) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => return Err(self.cycle_error(name)),
            None => {}
        }

        self.marks.insert(name, Mark::Visiting);
        self.path.push(name);

        for dependency in type_def.dependencies() {
            let dependency = self.schema.require_type(dependency)?;
            self.visit(dependency)?;
        }

        self.path.pop();
        self.marks.insert(name, Mark::Done);
        self.order.push(type_def);
        Ok(())
    }

    fn cycle_error(&self, name: &str) -> Error {
        let start = self.path.iter().position(|n| *n == name).unwrap_or(0);
        let mut path: Vec<String> = self.path[start..].iter().map(|n| n.to_string()).collect();
        path.push(name.to_string());
        Error::CycleDetected { path }
    }
}

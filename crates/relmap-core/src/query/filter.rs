//! Filter strings: parsing, classification and literal coercion.
//!
//! A filter is written `name<op>value` with `op` one of `<`, `>`, `=`, `<=`,
//! `>=`. Neither the name nor the value may contain `<`, `>` or `=`.

use serde_json::Value;

use crate::catalog::{ElementType, PropertyType, ScalarKind, TypeDef, ID_COLUMN};
use crate::error::{Error, Result};
use crate::sql::CompareOp;

/// A parsed filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    /// Property name.
    pub name: String,
    /// Comparison operator.
    pub op: CompareOp,
    /// Literal, as written.
    pub value: String,
}

/// Where a filter applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterTarget {
    /// A column of the primary table (or `id`).
    Direct,
    /// The elements of an array property's side table.
    Array,
}

/// A filter checked against a type, with its literal coerced.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedFilter {
    /// Property (or `id`) the filter targets.
    pub name: String,
    /// Operator.
    pub op: CompareOp,
    /// Coerced literal.
    pub value: Value,
    /// Direct or array filter.
    pub target: FilterTarget,
}

fn is_operator_char(c: char) -> bool {
    matches!(c, '<' | '>' | '=')
}

impl Filter {
    /// Parse `name<op>value`.
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = || Error::InvalidFilter(input.to_string());

        let op_start = input.find(is_operator_char).ok_or_else(invalid)?;
        let op_len = input[op_start..]
            .chars()
            .take_while(|c| is_operator_char(*c))
            .count();

        let name = &input[..op_start];
        let op = &input[op_start..op_start + op_len];
        let value = &input[op_start + op_len..];

        if name.is_empty() || value.is_empty() || value.contains(is_operator_char) {
            return Err(invalid());
        }

        let op = CompareOp::from_token(op).ok_or_else(invalid)?;

        Ok(Self {
            name: name.to_string(),
            op,
            value: value.to_string(),
        })
    }

    /// Check the filter against a type and coerce its literal.
    ///
    /// `id` is always a direct filter; any other name must be a declared
    /// property.
    pub fn classify(&self, type_def: &TypeDef) -> Result<ClassifiedFilter> {
        let (target, kind) = if self.name == ID_COLUMN {
            (FilterTarget::Direct, ScalarKind::Integer)
        } else {
            let property = type_def
                .get_property(&self.name)
                .ok_or_else(|| Error::UnknownProperty {
                    type_name: type_def.name.clone(),
                    property: self.name.clone(),
                })?;
            match &property.property_type {
                PropertyType::Scalar(kind) => (FilterTarget::Direct, *kind),
                PropertyType::Reference(_) => (FilterTarget::Direct, ScalarKind::Integer),
                PropertyType::Array(ElementType::Scalar(kind)) => (FilterTarget::Array, *kind),
                PropertyType::Array(ElementType::Reference(_)) => {
                    (FilterTarget::Array, ScalarKind::Integer)
                }
            }
        };

        Ok(ClassifiedFilter {
            name: self.name.clone(),
            op: self.op,
            value: coerce_literal(&self.value, kind),
            target,
        })
    }
}

/// Convert a literal to the JSON value the column holds.
///
/// Literals that do not parse as the declared kind are kept as text and left
/// for the engine to compare.
pub fn coerce_literal(literal: &str, kind: ScalarKind) -> Value {
    let coerced = match kind {
        ScalarKind::Integer => literal.parse::<i64>().ok().map(Value::from),
        ScalarKind::Float => literal
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number),
        ScalarKind::Boolean => match literal {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        ScalarKind::String | ScalarKind::Text | ScalarKind::Date => None,
    };

    coerced.unwrap_or_else(|| Value::String(literal.to_string()))
}

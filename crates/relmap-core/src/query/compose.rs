//! Composition of list queries.
//!
//! One list call becomes one select:
//!
//! ```text
//! SELECT base.id, base.<columns>, side.value AS <array>, target.<field> AS __<expand>.<field>
//! FROM (SELECT * FROM <type> WHERE <filters> ORDER BY id LIMIT n OFFSET m) AS <type>
//! LEFT OUTER JOIN <type>_<array> AS __<array> ON __<array>.<type> = <type>.id
//! LEFT OUTER JOIN <target> AS <target>_<expand> ON <target>_<expand>.id = <fk or side value>
//! ORDER BY <type>.id, __<array>.id
//! ```
//!
//! Pagination applies to the base subquery, so it counts objects rather than
//! joined rows.

use crate::catalog::{ScalarKind, Schema, TypeDef, ID_COLUMN, VALUE_COLUMN};
use crate::error::Result;
use crate::sql::{ColumnRef, Predicate, Projection, SelectQuery, Source};

use super::expand::{resolve_expands, Expand};
use super::filter::{ClassifiedFilter, Filter, FilterTarget};
use super::list::ListQuery;

/// Hidden output column carrying `field` of an expanded relation.
///
/// Declared names cannot contain `.` or start with `_`, so these never
/// collide with base columns or with each other.
pub fn expand_column(property: &str, field: &str) -> String {
    format!("__{}.{}", property, field)
}

/// Alias of the side-table join for an array property.
pub fn side_alias(property: &str) -> String {
    format!("__{}", property)
}

/// Hidden output column carrying the side-table row id of an array element.
pub fn row_column(property: &str) -> String {
    format!("__row_{}", property)
}

/// Alias of the side table inside an array filter's `EXISTS` subquery.
const MATCH_ALIAS: &str = "__match";

/// Build the select for a list call.
pub fn compose(schema: &Schema, type_def: &TypeDef, query: &ListQuery) -> Result<SelectQuery> {
    let filters = query
        .filters
        .iter()
        .map(|f| Filter::parse(f)?.classify(type_def))
        .collect::<Result<Vec<_>>>()?;
    let expands = resolve_expands(schema, type_def, &query.expands)?;

    let base = base_query(type_def, &filters, query.limit, query.offset);
    let composed = SelectQuery::from(Source::derived(base, &type_def.name))
        .select(native_projections(type_def))
        .order_by(ColumnRef::new(&type_def.name, ID_COLUMN));
    let composed = join_arrays(composed, type_def);
    let composed = join_expands(composed, type_def, &expands);

    Ok(composed)
}

/// Filtered, paginated scan of the primary table.
fn base_query(
    type_def: &TypeDef,
    filters: &[ClassifiedFilter],
    limit: u64,
    offset: u64,
) -> SelectQuery {
    let table = type_def.name.as_str();

    let query = filters
        .iter()
        .fold(SelectQuery::from(Source::table(table)), |query, filter| {
            let predicate = match filter.target {
                FilterTarget::Direct => Predicate::Compare {
                    column: ColumnRef::new(table, &filter.name),
                    op: filter.op,
                    value: filter.value.clone(),
                },
                FilterTarget::Array => Predicate::Exists(Box::new(array_match(type_def, filter))),
            };
            query.filter(predicate)
        });

    query
        .order_by(ColumnRef::new(table, ID_COLUMN))
        .paginate(limit, offset)
}

/// `SELECT 1 FROM <side> AS __match WHERE __match.<owner> = <type>.id AND __match.value <op> ?`
fn array_match(type_def: &TypeDef, filter: &ClassifiedFilter) -> SelectQuery {
    SelectQuery::from(Source::aliased(
        type_def.side_table_name(&filter.name),
        MATCH_ALIAS,
    ))
    .select(vec![Projection::One])
    .filter(Predicate::ColumnsEqual(
        ColumnRef::new(MATCH_ALIAS, &type_def.name),
        ColumnRef::new(&type_def.name, ID_COLUMN),
    ))
    .filter(Predicate::Compare {
        column: ColumnRef::new(MATCH_ALIAS, VALUE_COLUMN),
        op: filter.op,
        value: filter.value.clone(),
    })
}

/// `id` and every non-array property of the base row.
fn native_projections(type_def: &TypeDef) -> Vec<Projection> {
    let table = type_def.name.as_str();

    std::iter::once(Projection::column(
        ColumnRef::new(table, ID_COLUMN),
        ID_COLUMN,
        Some(ScalarKind::Integer),
    ))
    .chain(type_def.column_properties().map(|p| {
        Projection::column(
            ColumnRef::new(table, &p.name),
            &p.name,
            Some(p.property_type.storage_kind()),
        )
    }))
    .collect()
}

fn join_arrays(query: SelectQuery, type_def: &TypeDef) -> SelectQuery {
    type_def.array_properties().fold(query, |query, property| {
        let alias = side_alias(&property.name);
        query
            .project(Projection::column(
                ColumnRef::new(&alias, VALUE_COLUMN),
                &property.name,
                Some(property.property_type.storage_kind()),
            ))
            .project(Projection::column(
                ColumnRef::new(&alias, ID_COLUMN),
                row_column(&property.name),
                Some(ScalarKind::Integer),
            ))
            .left_join(
                Source::aliased(type_def.side_table_name(&property.name), &alias),
                ColumnRef::new(&alias, &type_def.name),
                ColumnRef::new(&type_def.name, ID_COLUMN),
            )
            .order_by(ColumnRef::new(&alias, ID_COLUMN))
    })
}

fn join_expands(query: SelectQuery, type_def: &TypeDef, expands: &[Expand<'_>]) -> SelectQuery {
    expands.iter().fold(query, |query, expand| {
        let alias = expand.alias();

        let query = expand.fields().into_iter().fold(query, |query, (field, kind)| {
            query.project(Projection::column(
                ColumnRef::new(&alias, field),
                expand.column(field),
                Some(kind),
            ))
        });

        // To-many relations bridge through the side table joined above.
        let bridge = if expand.to_many {
            ColumnRef::new(side_alias(expand.name()), VALUE_COLUMN)
        } else {
            ColumnRef::new(&type_def.name, expand.name())
        };

        query.left_join(
            Source::aliased(&expand.target.name, &alias),
            ColumnRef::new(&alias, ID_COLUMN),
            bridge,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PropertyDef;
    use crate::error::Error;
    use crate::sql::Statement;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new()
            .with_type(
                TypeDef::new("User")
                    .with_property(PropertyDef::scalar("name", ScalarKind::String))
                    .with_property(PropertyDef::scalar("age", ScalarKind::Integer))
                    .with_property(PropertyDef::reference("owner", "Person").nullable())
                    .with_property(PropertyDef::array_reference("pets", "Pet"))
                    .with_property(PropertyDef::array_scalar("tags", ScalarKind::String)),
            )
            .with_type(TypeDef::new("Pet").with_property(PropertyDef::scalar("name", ScalarKind::String)))
            .with_type(TypeDef::new("Person").with_property(PropertyDef::scalar("age", ScalarKind::Integer)))
    }

    fn render(query: SelectQuery) -> (String, Vec<serde_json::Value>) {
        Statement::Select(query).to_sql()
    }

    #[test]
    fn test_plain_type() {
        let schema = Schema::new()
            .with_type(TypeDef::new("Pet").with_property(PropertyDef::scalar("name", ScalarKind::String)));
        let pet = schema.require_type("Pet").unwrap();

        let (sql, params) = render(compose(&schema, pet, &ListQuery::new()).unwrap());
        assert_eq!(
            sql,
            "SELECT \"Pet\".\"id\" AS \"id\", \"Pet\".\"name\" AS \"name\" \
             FROM (SELECT * FROM \"Pet\" ORDER BY \"Pet\".\"id\" LIMIT 100 OFFSET 0) AS \"Pet\" \
             ORDER BY \"Pet\".\"id\""
        );
        assert!(params.is_empty());
    }

    #[test]
    fn test_direct_filters_and_pagination_in_base() {
        let schema = schema();
        let user = schema.require_type("User").unwrap();
        let query = ListQuery::new()
            .with_filter("age>=18")
            .with_filter("name=Ann")
            .with_limit(5)
            .with_offset(10);

        let composed = compose(&schema, user, &query).unwrap();
        let Source::Derived { query: base, alias } = &composed.from else {
            panic!("expected derived base table");
        };
        assert_eq!(alias, "User");
        assert_eq!(base.limit, Some(5));
        assert_eq!(base.offset, Some(10));
        assert_eq!(base.predicates.len(), 2);
        assert!(composed.limit.is_none());

        let (sql, params) = render(composed);
        assert!(sql.contains(
            "FROM (SELECT * FROM \"User\" WHERE \"User\".\"age\" >= ? AND \"User\".\"name\" = ? \
             ORDER BY \"User\".\"id\" LIMIT 5 OFFSET 10) AS \"User\""
        ));
        assert_eq!(params, vec![json!(18), json!("Ann")]);
    }

    #[test]
    fn test_array_filter_becomes_exists() {
        let schema = schema();
        let user = schema.require_type("User").unwrap();
        let query = ListQuery::new().with_filter("tags=red");

        let (sql, params) = render(compose(&schema, user, &query).unwrap());
        assert!(sql.contains(
            "WHERE EXISTS (SELECT 1 FROM \"User_tags\" AS \"__match\" \
             WHERE \"__match\".\"User\" = \"User\".\"id\" AND \"__match\".\"value\" = ?)"
        ));
        assert_eq!(params, vec![json!("red")]);
    }

    #[test]
    fn test_array_properties_are_joined() {
        let schema = schema();
        let user = schema.require_type("User").unwrap();

        let composed = compose(&schema, user, &ListQuery::new()).unwrap();
        let columns: Vec<String> = composed.output_columns().into_iter().map(|c| c.name).collect();
        assert_eq!(
            columns,
            vec!["id", "name", "age", "owner", "pets", "__row_pets", "tags", "__row_tags"]
        );

        let (sql, _) = render(composed);
        assert!(sql.contains(
            "LEFT OUTER JOIN \"User_pets\" AS \"__pets\" ON \"__pets\".\"User\" = \"User\".\"id\""
        ));
        assert!(sql.contains(
            "LEFT OUTER JOIN \"User_tags\" AS \"__tags\" ON \"__tags\".\"User\" = \"User\".\"id\""
        ));
        assert!(sql.ends_with(
            "ORDER BY \"User\".\"id\", \"__pets\".\"id\", \"__tags\".\"id\""
        ));
    }

    #[test]
    fn test_expand_joins() {
        let schema = schema();
        let user = schema.require_type("User").unwrap();
        let query = ListQuery::new().with_expands(["owner", "pets"]);

        let composed = compose(&schema, user, &query).unwrap();
        let columns: Vec<String> = composed.output_columns().into_iter().map(|c| c.name).collect();
        assert!(columns.ends_with(&[
            "__owner.id".to_string(),
            "__owner.age".to_string(),
            "__pets.id".to_string(),
            "__pets.name".to_string(),
        ]));

        let (sql, _) = render(composed);
        assert!(sql.contains(
            "LEFT OUTER JOIN \"Person\" AS \"Person_owner\" ON \"Person_owner\".\"id\" = \"User\".\"owner\""
        ));
        assert!(sql.contains(
            "LEFT OUTER JOIN \"Pet\" AS \"Pet_pets\" ON \"Pet_pets\".\"id\" = \"__pets\".\"value\""
        ));
    }

    #[test]
    fn test_self_expand_does_not_collide_with_side_table() {
        let schema = Schema::new().with_type(
            TypeDef::new("User")
                .with_property(PropertyDef::scalar("name", ScalarKind::String))
                .with_property(PropertyDef::array_reference("friends", "User")),
        );
        let user = schema.require_type("User").unwrap();

        let (sql, _) = render(compose(&schema, user, &ListQuery::new().with_expand("friends")).unwrap());
        assert!(sql.contains("\"User_friends\" AS \"__friends\""));
        assert!(sql.contains("\"User\" AS \"User_friends\""));
    }

    #[test]
    fn test_invalid_filters_are_rejected() {
        let schema = schema();
        let user = schema.require_type("User").unwrap();

        let malformed = compose(&schema, user, &ListQuery::new().with_filter("age=>1"));
        assert!(matches!(malformed, Err(Error::InvalidFilter(_))));

        let unknown = compose(&schema, user, &ListQuery::new().with_filter("height>1"));
        assert!(matches!(unknown, Err(Error::UnknownProperty { .. })));
    }
}

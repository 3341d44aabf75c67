//! Alias compiler
//!
//! Builds the column projections and view definition that let one resource
//! be served as a renamed/reshaped view of another, with zero data
//! duplication.

use std::collections::BTreeMap;

use crate::model::{AbstractSqlModel, Definition, QueryNode, Table};

use super::errors::{TranslationError, TranslationResult};
use super::translate::FieldAlias;

/// Emit one projection per field declared on `resource_name`.
///
/// Unaliased fields project the identically named field from the target;
/// string-aliased fields project the named target field under the
/// resource's field name; expression-aliased fields project an arbitrary
/// query node under the resource's field name. Unknown alias-map keys are
/// rejected before any projection is built.
pub fn alias_fields(
    table: &Table,
    resource_name: &str,
    aliases: &BTreeMap<String, FieldAlias>,
) -> TranslationResult<Vec<QueryNode>> {
    let nonexistent: Vec<&str> = aliases
        .keys()
        .filter(|field| !table.has_field(field))
        .map(String::as_str)
        .collect();
    if !nonexistent.is_empty() {
        return Err(TranslationError::AliasNonexistentFields(
            nonexistent.join(", "),
        ));
    }

    Ok(table
        .fields
        .iter()
        .map(|field| {
            let field_name = &field.field_name;
            match aliases.get(field_name) {
                Some(FieldAlias::Field(source)) => QueryNode::alias(
                    QueryNode::referenced_field(resource_name, source),
                    field_name,
                ),
                Some(FieldAlias::Expr(node)) => QueryNode::alias(node.clone(), field_name),
                None => QueryNode::referenced_field(resource_name, field_name),
            }
        })
        .collect())
}

/// Build the view definition serving `resource_name` as a projection of
/// `to_resource`: `SELECT <projections> FROM <to_resource> AS <resource>`.
pub fn alias_resource(
    model: &AbstractSqlModel,
    table: &Table,
    resource_name: &str,
    to_resource: &str,
    aliases: &BTreeMap<String, FieldAlias>,
) -> TranslationResult<Definition> {
    if !model.tables.contains_key(to_resource) {
        return Err(TranslationError::AliasUnknownResource(
            to_resource.to_string(),
        ));
    }
    Ok(Definition::new(QueryNode::SelectQuery(vec![
        QueryNode::Select(alias_fields(table, resource_name, aliases)?),
        QueryNode::From(Box::new(QueryNode::alias(
            QueryNode::Resource(to_resource.to_string()),
            resource_name,
        ))),
    ])))
}

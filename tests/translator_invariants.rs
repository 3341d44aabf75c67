//! Translator Invariant Tests
//!
//! Cross-module tests for the model translator:
//! - Generated views project exactly the resource's full field set
//! - Namespacing is idempotent on already-qualified keys
//! - Both versions stay independently addressable in the merged graph
//! - Mis-declared models fail fatally at load time

use std::collections::BTreeMap;

use strata::model::{AbstractSqlModel, Field, QueryNode, RelationshipNode, Table};
use strata::translator::{
    namespace_relationships, translate, FieldAlias, TranslationDefinition, TranslationError,
};

// =============================================================================
// Helper Functions
// =============================================================================

fn person_table(name: &str) -> Table {
    Table::new(
        name,
        "id",
        vec![
            Field::new("id", "Serial").required(),
            Field::new("name", "Short Text"),
            Field::new("age", "Integer"),
        ],
    )
}

fn person_models() -> (AbstractSqlModel, AbstractSqlModel) {
    let from = AbstractSqlModel::new().with_table("person", person_table("person"));
    let to = AbstractSqlModel::new().with_table("person", person_table("person"));
    (from, to)
}

fn alias_definition(field: &str, source: &str) -> TranslationDefinition {
    let mut fields = BTreeMap::new();
    fields.insert(field.to_string(), FieldAlias::Field(source.to_string()));
    TranslationDefinition::aliases(fields)
}

// =============================================================================
// View Generation
// =============================================================================

/// Aliasing `name` to `legal_name` on fields [id, name, age] produces
/// projections `id, legal_name AS name, age`.
#[test]
fn test_alias_view_renames_only_the_aliased_field() {
    let (mut from, to) = person_models();
    let mut definitions = BTreeMap::new();
    definitions.insert("person".to_string(), alias_definition("name", "legal_name"));

    translate(&mut from, &to, "v1", "v2", &definitions).unwrap();

    let definition = from.tables["person"].definition.as_ref().unwrap();
    let QueryNode::SelectQuery(parts) = &definition.abstract_sql else {
        panic!("expected a select query definition");
    };
    assert_eq!(
        parts[0],
        QueryNode::Select(vec![
            QueryNode::referenced_field("person", "id"),
            QueryNode::alias(QueryNode::referenced_field("person", "legal_name"), "name"),
            QueryNode::referenced_field("person", "age"),
        ])
    );
    assert_eq!(
        parts[1],
        QueryNode::From(Box::new(QueryNode::alias(
            QueryNode::Resource("person$v2".into()),
            "person",
        )))
    );
}

/// The generated view projects exactly the resource's declared field set,
/// whatever subset of it is aliased.
#[test]
fn test_alias_view_projects_the_full_field_set() {
    let (mut from, to) = person_models();
    let mut definitions = BTreeMap::new();
    definitions.insert("person".to_string(), alias_definition("age", "years_alive"));

    translate(&mut from, &to, "v1", "v2", &definitions).unwrap();

    let definition = from.tables["person"].definition.as_ref().unwrap();
    let QueryNode::SelectQuery(parts) = &definition.abstract_sql else {
        panic!("expected a select query definition");
    };
    let QueryNode::Select(projections) = &parts[0] else {
        panic!("expected a projection list");
    };
    assert_eq!(projections.len(), from.tables["person$v1"].fields.len());
}

// =============================================================================
// Addressability of Merged Versions
// =============================================================================

#[test]
fn test_both_versions_stay_addressable() {
    let (mut from, to) = person_models();
    translate(&mut from, &to, "v1", "v2", &BTreeMap::new()).unwrap();

    assert!(from.tables.contains_key("person"));
    assert!(from.tables.contains_key("person$v1"));
    assert!(from.tables.contains_key("person$v2"));

    // The translated table and its own-version alias resolve the same way
    assert_eq!(from.tables["person"], from.tables["person$v1"]);
    // The target copy carries no definition of its own
    assert!(from.tables["person$v2"].definition.is_none());
}

#[test]
fn test_relationships_are_merged_under_both_versions() {
    let mut owner = BTreeMap::new();
    owner.insert("owner".to_string(), RelationshipNode::leaf("owner", "id"));
    let mut from = AbstractSqlModel::new()
        .with_table("person", person_table("person"))
        .with_table("owner", person_table("owner"));
    from.relationships
        .insert("person".to_string(), RelationshipNode::branch(owner.clone()));

    let mut to = AbstractSqlModel::new()
        .with_table("person", person_table("person"))
        .with_table("owner", person_table("owner"));
    to.relationships
        .insert("person".to_string(), RelationshipNode::branch(owner));

    translate(&mut from, &to, "v1", "v2", &BTreeMap::new()).unwrap();

    // Target relationships live under the v2 qualifier, ours under v1, and
    // the unqualified originals are kept
    assert!(from.relationships.contains_key("person"));
    let v1 = &from.relationships["person$v1"];
    let v2 = &from.relationships["person$v2"];
    assert_eq!(
        v1.children["owner$v1"].mapping.as_ref().unwrap().table_alias,
        "owner$v1"
    );
    assert_eq!(
        v2.children["owner$v2"].mapping.as_ref().unwrap().table_alias,
        "owner$v2"
    );
}

/// Namespacing a key containing the version separator is a no-op, so
/// re-namespacing a merged graph changes nothing.
#[test]
fn test_namespacing_the_merged_graph_again_is_a_no_op() {
    let mut owner = BTreeMap::new();
    owner.insert("owner".to_string(), RelationshipNode::leaf("owner", "id"));
    let mut from = AbstractSqlModel::new()
        .with_table("person", person_table("person"))
        .with_table("owner", person_table("owner"));
    from.relationships
        .insert("person".to_string(), RelationshipNode::branch(owner));
    let to = from.clone();

    translate(&mut from, &to, "v1", "v2", &BTreeMap::new()).unwrap();

    let qualified = &from.relationships["person$v1"];
    let again = namespace_relationships(&qualified.children, "v1");
    assert_eq!(again, qualified.children);
}

// =============================================================================
// Load-Time Failures
// =============================================================================

/// A table with no definition and no `$v2` twin fails with a missing
/// translation.
#[test]
fn test_missing_translation_is_fatal() {
    let mut from = AbstractSqlModel::new().with_table("person", person_table("person"));
    let to = AbstractSqlModel::new().with_table("robot", person_table("robot"));

    let err = translate(&mut from, &to, "v1", "v2", &BTreeMap::new()).unwrap_err();
    assert_eq!(err, TranslationError::MissingTranslation("person".into()));
}

#[test]
fn test_alias_of_nonexistent_field_is_fatal() {
    let (mut from, to) = person_models();
    let mut definitions = BTreeMap::new();
    definitions.insert("person".to_string(), alias_definition("shoe_size", "size"));

    let err = translate(&mut from, &to, "v1", "v2", &definitions).unwrap_err();
    assert_eq!(
        err,
        TranslationError::AliasNonexistentFields("shoe_size".into())
    );
}

#[test]
fn test_unknown_explicit_target_is_fatal() {
    let (mut from, to) = person_models();
    let mut definitions = BTreeMap::new();
    definitions.insert(
        "person".to_string(),
        TranslationDefinition::aliases(BTreeMap::new()).to_resource("human"),
    );

    let err = translate(&mut from, &to, "v1", "v2", &definitions).unwrap_err();
    assert_eq!(err, TranslationError::UnknownTargetResource("human".into()));
}

// =============================================================================
// Rename Map and Write Targets
// =============================================================================

#[test]
fn test_rename_map_and_modify_targets() {
    let mut from = AbstractSqlModel::new()
        .with_table("person", person_table("person"))
        .with_table("human", person_table("human"));
    let mut renamed_target = person_table("human");
    renamed_target.modify_name = Some("human storage".into());
    let to = AbstractSqlModel::new().with_table("human", renamed_target);

    let mut definitions = BTreeMap::new();
    definitions.insert(
        "person".to_string(),
        TranslationDefinition::aliases(BTreeMap::new()).to_resource("human"),
    );

    let renames = translate(&mut from, &to, "v1", "v2", &definitions).unwrap();
    assert_eq!(renames.get("person"), Some(&"human".to_string()));

    // Writes against the translated resource land where the target's do.
    // The target resolves within the merged graph, so "person" picks up the
    // already-translated "human" table's write target.
    let person = &from.tables["person"];
    assert!(person.modify_fields.is_some());
    assert_eq!(person.modify_name.as_deref(), Some("human"));
}

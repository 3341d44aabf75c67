//! Model type definitions
//!
//! Tables carry an optional `definition` describing how the resource is
//! computed (a view over another resource) and optional `modify_fields` /
//! `modify_name` describing where writes against the resource actually land.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::query::QueryNode;

/// A reference from a field to another resource's field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldReference {
    pub resource: String,
    pub field: String,
}

/// A single field of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub field_name: String,
    pub data_type: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<FieldReference>,
}

impl Field {
    /// Create a field with the given name and data type.
    pub fn new(field_name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            data_type: data_type.into(),
            required: false,
            references: None,
        }
    }

    /// Mark the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Point the field at another resource's field.
    pub fn references(mut self, resource: impl Into<String>, field: impl Into<String>) -> Self {
        self.references = Some(FieldReference {
            resource: resource.into(),
            field: field.into(),
        });
        self
    }
}

/// How the resource is computed when it is not a plain physical table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    pub abstract_sql: QueryNode,
}

impl Definition {
    pub fn new(abstract_sql: QueryNode) -> Self {
        Self { abstract_sql }
    }
}

/// A table-like resource within a vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub id_field: String,
    pub fields: Vec<Field>,
    /// How this resource is computed, when served as a view
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<Definition>,
    /// The fields writes against this resource actually land on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modify_fields: Option<Vec<Field>>,
    /// The table writes against this resource actually land on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modify_name: Option<String>,
}

impl Table {
    /// Create a table with the given name, an `id` primary key, and fields.
    pub fn new(name: impl Into<String>, id_field: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            id_field: id_field.into(),
            fields,
            definition: None,
            modify_fields: None,
            modify_name: None,
        }
    }

    /// Whether the table declares a field with the given name.
    pub fn has_field(&self, field_name: &str) -> bool {
        self.fields.iter().any(|f| f.field_name == field_name)
    }

    /// The fields writes land on: `modify_fields` when set, else `fields`.
    pub fn effective_modify_fields(&self) -> &[Field] {
        self.modify_fields.as_deref().unwrap_or(&self.fields)
    }

    /// The table writes land on: `modify_name` when set, else `name`.
    pub fn effective_modify_name(&self) -> &str {
        self.modify_name.as_deref().unwrap_or(&self.name)
    }
}

/// A node of the relationship tree.
///
/// Leaf nodes carry a join binding; internal nodes name sub-paths. A node
/// may be both at once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationshipNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<RelationshipMapping>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub children: BTreeMap<String, RelationshipNode>,
}

impl RelationshipNode {
    /// A leaf node carrying a join binding.
    pub fn leaf(table_alias: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            mapping: Some(RelationshipMapping {
                table_alias: table_alias.into(),
                field_name: field_name.into(),
            }),
            children: BTreeMap::new(),
        }
    }

    /// An internal node with the given named children.
    pub fn branch(children: BTreeMap<String, RelationshipNode>) -> Self {
        Self {
            mapping: None,
            children,
        }
    }
}

/// The two-element join binding carried by relationship leaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipMapping {
    pub table_alias: String,
    pub field_name: String,
}

/// A versioned schema graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbstractSqlModel {
    pub tables: BTreeMap<String, Table>,
    pub relationships: BTreeMap<String, RelationshipNode>,
    /// Alternate name -> canonical name; total over resource names via the
    /// identity fallback in [`AbstractSqlModel::resolve_synonym`]
    pub synonyms: BTreeMap<String, String>,
    pub rules: Vec<QueryNode>,
}

impl AbstractSqlModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table keyed by its resource name.
    pub fn with_table(mut self, resource_name: impl Into<String>, table: Table) -> Self {
        self.tables.insert(resource_name.into(), table);
        self
    }

    /// Add a synonym.
    pub fn with_synonym(
        mut self,
        synonym: impl Into<String>,
        canonical: impl Into<String>,
    ) -> Self {
        self.synonyms.insert(synonym.into(), canonical.into());
        self
    }

    /// Resolve a name through the synonym table, falling back to the name
    /// itself. The synonym table is loop-free so a single step suffices.
    pub fn resolve_synonym(&self, name: &str) -> String {
        self.synonyms
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_synonym_falls_back_to_identity() {
        let model = AbstractSqlModel::new().with_synonym("canine", "dog");
        assert_eq!(model.resolve_synonym("canine"), "dog");
        assert_eq!(model.resolve_synonym("dog"), "dog");
        assert_eq!(model.resolve_synonym("ferret"), "ferret");
    }

    #[test]
    fn test_effective_modify_fields_prefers_overrides() {
        let mut table = Table::new("pet", "id", vec![Field::new("id", "Serial").required()]);
        assert_eq!(table.effective_modify_fields().len(), 1);
        assert_eq!(table.effective_modify_name(), "pet");

        table.modify_fields = Some(vec![]);
        table.modify_name = Some("pet storage".into());
        assert!(table.effective_modify_fields().is_empty());
        assert_eq!(table.effective_modify_name(), "pet storage");
    }

    #[test]
    fn test_has_field() {
        let table = Table::new(
            "pet",
            "id",
            vec![Field::new("id", "Serial"), Field::new("name", "Short Text")],
        );
        assert!(table.has_field("name"));
        assert!(!table.has_field("owner"));
    }
}

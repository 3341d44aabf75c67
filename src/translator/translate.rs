//! Model translation
//!
//! Merges a source-version model and a target-version model into one
//! addressable, version-qualified graph. The source version's tables become
//! views over the target version's, driven by per-resource translation
//! definitions; tables without a definition fall back to their same-named
//! `$version` twin in the target model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{AbstractSqlModel, Definition, QueryNode};

use super::alias::alias_resource;
use super::errors::{TranslationError, TranslationResult};
use super::namespace::{is_version_qualified, namespace_relationships, version_qualify};

/// How one aliased field of a translated resource is sourced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldAlias {
    /// Project the named target field under this field's name
    Field(String),
    /// Project an arbitrary expression under this field's name
    Expr(QueryNode),
}

/// A per-resource translation supplied to [`translate`].
#[derive(Debug, Clone, PartialEq)]
pub enum TranslationDefinition {
    /// A full view query used verbatim
    Query {
        abstract_sql: QueryNode,
        to_resource: Option<String>,
    },
    /// A field-alias dictionary from which a view is synthesized
    Aliases {
        to_resource: Option<String>,
        fields: BTreeMap<String, FieldAlias>,
    },
}

impl TranslationDefinition {
    /// A full-query definition targeting the implicit `$version` twin.
    pub fn query(abstract_sql: QueryNode) -> Self {
        Self::Query {
            abstract_sql,
            to_resource: None,
        }
    }

    /// A field-alias definition targeting the implicit `$version` twin.
    pub fn aliases(fields: BTreeMap<String, FieldAlias>) -> Self {
        Self::Aliases {
            to_resource: None,
            fields,
        }
    }

    /// Redirect the definition at an explicitly named target resource.
    pub fn to_resource(mut self, target: impl Into<String>) -> Self {
        match &mut self {
            Self::Query { to_resource, .. } | Self::Aliases { to_resource, .. } => {
                *to_resource = Some(target.into());
            }
        }
        self
    }

    fn target(&self) -> Option<&str> {
        match self {
            Self::Query { to_resource, .. } | Self::Aliases { to_resource, .. } => {
                to_resource.as_deref()
            }
        }
    }
}

/// Merge `to` (the newer version) into `from` (the older version), rewriting
/// `from`'s resources as views over `to`'s.
///
/// Returns the rename map: source resources redirected at a differently
/// named target via an explicit `to_resource`.
///
/// Runs once per adjacent version pair at load time. Every error means a
/// mis-declared model and is fatal; nothing here is recoverable at request
/// time.
pub fn translate(
    from: &mut AbstractSqlModel,
    to: &AbstractSqlModel,
    from_version: &str,
    to_version: &str,
    definitions: &BTreeMap<String, TranslationDefinition>,
) -> TranslationResult<BTreeMap<String, String>> {
    let mut resource_renames = BTreeMap::new();

    from.rules = to.rules.clone();

    let from_keys: Vec<String> = from.tables.keys().cloned().collect();
    let nonexistent: Vec<&str> = definitions
        .keys()
        .filter(|key| !from.tables.contains_key(*key))
        .map(String::as_str)
        .collect();
    if !nonexistent.is_empty() {
        return Err(TranslationError::NonexistentTables(nonexistent.join(", ")));
    }

    // Merge the target version's synonyms under version-qualified names
    for (synonym, canonical) in &to.synonyms {
        if is_version_qualified(synonym) {
            from.synonyms.insert(synonym.clone(), canonical.clone());
        } else {
            from.synonyms.insert(
                version_qualify(synonym, to_version),
                version_qualify(canonical, to_version),
            );
        }
    }

    // Merge the target version's relationships, namespaced
    let namespaced = namespace_relationships(&to.relationships, to_version);
    for (key, relationship) in namespaced {
        let key = if is_version_qualified(&key) {
            key
        } else {
            version_qualify(&key, to_version)
        };
        from.relationships.insert(key, relationship);
    }

    // Also namespace our own relationships under the source version so both
    // versions stay independently addressable inside the merged graph
    let own = namespace_relationships(&from.relationships.clone(), from_version);
    for (key, relationship) in own {
        if !is_version_qualified(&key) {
            from.relationships
                .insert(version_qualify(&key, from_version), relationship);
        }
    }

    // Every target table becomes addressable under its qualified key
    for (key, table) in &to.tables {
        let key = if is_version_qualified(key) {
            key.clone()
        } else {
            version_qualify(key, to_version)
        };
        from.tables.insert(key, table.clone());
    }

    for key in &from_keys {
        match definitions.get(key) {
            Some(definition) => {
                let to_resource = match definition.target() {
                    Some(target) => {
                        if !from.tables.contains_key(target) {
                            return Err(TranslationError::UnknownTargetResource(
                                target.to_string(),
                            ));
                        }
                        resource_renames.insert(key.clone(), target.to_string());
                        target.to_string()
                    }
                    None => {
                        let twin = version_qualify(key, to_version);
                        if !from.tables.contains_key(&twin) {
                            return Err(TranslationError::MissingTargetResource(twin));
                        }
                        twin
                    }
                };

                let (modify_fields, modify_name) = {
                    let to_table = &from.tables[&to_resource];
                    (
                        to_table.effective_modify_fields().to_vec(),
                        to_table.effective_modify_name().to_string(),
                    )
                };
                let resolved = match definition {
                    TranslationDefinition::Query { abstract_sql, .. } => {
                        Definition::new(abstract_sql.clone())
                    }
                    TranslationDefinition::Aliases { fields, .. } => {
                        alias_resource(from, &from.tables[key], key, &to_resource, fields)?
                    }
                };

                if let Some(table) = from.tables.get_mut(key) {
                    table.modify_fields = Some(modify_fields);
                    table.modify_name = Some(modify_name);
                    table.definition = Some(resolved);
                }
            }
            None => {
                let twin = version_qualify(key, to_version);
                let modify_fields = match from.tables.get(&twin) {
                    Some(to_table) => to_table.effective_modify_fields().to_vec(),
                    None => return Err(TranslationError::MissingTranslation(key.clone())),
                };

                if let Some(table) = from.tables.get_mut(key) {
                    table.modify_fields = Some(modify_fields);
                    table.definition = Some(Definition::new(QueryNode::Resource(twin)));
                }
            }
        }

        // Also alias the source version so it can be explicitly referenced
        let translated = from.tables[key].clone();
        from.tables
            .insert(version_qualify(key, from_version), translated);
    }

    Ok(resource_renames)
}

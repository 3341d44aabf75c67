//! Relationship namespacing
//!
//! Version-qualifies relationship keys so two versions' graphs can be merged
//! into one namespace while each stays independently addressable.

use std::collections::BTreeMap;

use crate::model::{RelationshipMapping, RelationshipNode};

/// The separator between a resource/relationship name and its version tag.
pub const VERSION_SEPARATOR: char = '$';

/// Whether a key already carries a version qualifier.
pub fn is_version_qualified(key: &str) -> bool {
    key.contains(VERSION_SEPARATOR)
}

/// Append a version qualifier to a key.
pub fn version_qualify(key: &str, version: &str) -> String {
    format!("{key}{VERSION_SEPARATOR}{version}")
}

/// Rewrite a relationship tree with version-qualified keys.
///
/// Builds a new tree bottom-up rather than mutating during traversal. Keys
/// owning a leaf binding and not yet qualified are re-keyed to
/// `key$version`, with the binding's table-alias component qualified the
/// same way; already-qualified keys pass through untouched, so the
/// operation is idempotent. Internal nodes keep their keys and only have
/// their children rewritten.
pub fn namespace_relationships(
    relationships: &BTreeMap<String, RelationshipNode>,
    version: &str,
) -> BTreeMap<String, RelationshipNode> {
    relationships
        .iter()
        .map(|(key, node)| {
            let children = namespace_relationships(&node.children, version);
            match &node.mapping {
                Some(mapping) if !is_version_qualified(key) => {
                    let mapping = RelationshipMapping {
                        table_alias: version_qualify(&mapping.table_alias, version),
                        field_name: mapping.field_name.clone(),
                    };
                    (
                        version_qualify(key, version),
                        RelationshipNode {
                            mapping: Some(mapping),
                            children,
                        },
                    )
                }
                _ => (
                    key.clone(),
                    RelationshipNode {
                        mapping: node.mapping.clone(),
                        children,
                    },
                ),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(entries: Vec<(&str, RelationshipNode)>) -> BTreeMap<String, RelationshipNode> {
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[test]
    fn test_leaf_keys_and_bindings_are_qualified() {
        let rels = tree(vec![(
            "pet",
            RelationshipNode::branch(tree(vec![("owner", RelationshipNode::leaf("owner", "id"))])),
        )]);

        let namespaced = namespace_relationships(&rels, "v1");

        // Internal node keeps its key
        let pet = &namespaced["pet"];
        assert!(pet.mapping.is_none());
        // Leaf is re-keyed and its table alias qualified
        let owner = &pet.children["owner$v1"];
        let mapping = owner.mapping.as_ref().unwrap();
        assert_eq!(mapping.table_alias, "owner$v1");
        assert_eq!(mapping.field_name, "id");
        assert!(!pet.children.contains_key("owner"));
    }

    #[test]
    fn test_already_qualified_keys_are_untouched() {
        let rels = tree(vec![("owner$v1", RelationshipNode::leaf("owner$v1", "id"))]);
        let namespaced = namespace_relationships(&rels, "v1");
        assert_eq!(namespaced, rels);
    }

    #[test]
    fn test_namespacing_is_idempotent() {
        let rels = tree(vec![(
            "pet",
            RelationshipNode::branch(tree(vec![("owner", RelationshipNode::leaf("owner", "id"))])),
        )]);
        let once = namespace_relationships(&rels, "v1");
        let twice = namespace_relationships(&once, "v1");
        assert_eq!(once, twice);
    }
}

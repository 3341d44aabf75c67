//! Abstract SQL query AST
//!
//! The small subset of the abstract SQL grammar the translator emits and
//! rewrites. Anything the translator treats opaquely (computed field
//! expressions supplied by model authors) travels as `Raw`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A node of the abstract SQL AST.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryNode {
    /// A full select query: `[Select, From, ...]`
    SelectQuery(Vec<QueryNode>),
    /// The projection list of a select query
    Select(Vec<QueryNode>),
    /// The source of a select query
    From(Box<QueryNode>),
    /// A named projection or source: `<node> AS <name>`
    Alias { node: Box<QueryNode>, name: String },
    /// A field reference qualified by its resource
    ReferencedField { resource: String, field: String },
    /// A reference to another resource (table or view)
    Resource(String),
    /// SQL NULL
    Null,
    /// An opaque expression node passed through verbatim
    Raw(Value),
}

impl QueryNode {
    /// A `<node> AS <name>` alias node.
    pub fn alias(node: QueryNode, name: impl Into<String>) -> Self {
        QueryNode::Alias {
            node: Box::new(node),
            name: name.into(),
        }
    }

    /// A field reference qualified by the resource it belongs to.
    pub fn referenced_field(resource: impl Into<String>, field: impl Into<String>) -> Self {
        QueryNode::ReferencedField {
            resource: resource.into(),
            field: field.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_wraps_node() {
        let node = QueryNode::alias(QueryNode::referenced_field("pet", "name"), "title");
        match node {
            QueryNode::Alias { node, name } => {
                assert_eq!(name, "title");
                assert_eq!(*node, QueryNode::referenced_field("pet", "name"));
            }
            other => panic!("expected alias node, got {:?}", other),
        }
    }

    #[test]
    fn test_query_node_round_trips_through_json() {
        let node = QueryNode::SelectQuery(vec![
            QueryNode::Select(vec![QueryNode::referenced_field("pet", "id")]),
            QueryNode::From(Box::new(QueryNode::alias(
                QueryNode::Resource("pet$v2".into()),
                "pet",
            ))),
        ]);
        let json = serde_json::to_string(&node).unwrap();
        let back: QueryNode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, node);
    }
}

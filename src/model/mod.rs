//! Abstract SQL model for strata
//!
//! A compiled, versioned schema graph: tables, their relationship tree,
//! synonyms, and rules. Models are built once at load time and are immutable
//! for the process lifetime; the translator merges two adjacent versions of
//! a model into a single version-qualified graph.

mod query;
mod types;

pub use query::QueryNode;
pub use types::{
    AbstractSqlModel, Definition, Field, FieldReference, RelationshipMapping, RelationshipNode,
    Table,
};

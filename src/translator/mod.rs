//! Multi-version model translator
//!
//! Merges an older and a newer version of an abstract SQL model into one
//! version-qualified graph, rewriting the older version's resources as
//! aliased views over the newer one. Runs once per adjacent version pair at
//! load time; every error here means a mis-declared model and is fatal.

mod alias;
mod errors;
mod namespace;
mod translate;

pub use alias::{alias_fields, alias_resource};
pub use errors::{TranslationError, TranslationResult};
pub use namespace::{
    is_version_qualified, namespace_relationships, version_qualify, VERSION_SEPARATOR,
};
pub use translate::{translate, FieldAlias, TranslationDefinition};

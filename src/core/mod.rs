//! Consumed interfaces and request-scoped context
//!
//! The narrow contracts through which the surrounding pipeline (URI parser,
//! permission layer, SQL compiler, transport) talks to the translator and
//! the hook engine.

mod context;
mod tx;

pub use context::{ApiHandle, ModelRegistry, ParsedRequest, RequestContext, Response, StaticModels};
pub use tx::{ReadOnlyView, Transaction, Tx};

//! Request context and version-scoped API handles
//!
//! Context carried through the request lifecycle, the parsed-request surface
//! the hook engine consumes, and the per-version API handle hooks use to
//! issue further requests inside the same transaction.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::model::AbstractSqlModel;

use super::tx::Tx;

/// Context carried for the whole lifetime of one request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Request ID for tracing
    pub request_id: Uuid,

    /// Request URL as received
    pub url: String,

    /// Request body, when any
    pub body: Value,

    /// Free-form state hooks may stash for later stages
    pub custom: HashMap<String, Value>,
}

impl RequestContext {
    /// Create a context for the given URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            url: url.into(),
            body: Value::Null,
            custom: HashMap::new(),
        }
    }

    /// Attach a request body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }
}

/// The structured request produced by the external URI/query parser.
#[derive(Debug, Clone)]
pub struct ParsedRequest {
    /// HTTP verb, upper-case
    pub method: String,
    /// The versioned API namespace addressed
    pub vocabulary: String,
    /// The resource addressed, possibly carrying a `$`-qualifier
    pub resource_name: String,
    /// The parsed OData query options
    pub odata_query: Value,
    /// Write payload, when any
    pub values: Value,
}

impl ParsedRequest {
    pub fn new(
        method: impl Into<String>,
        vocabulary: impl Into<String>,
        resource_name: impl Into<String>,
    ) -> Self {
        Self {
            method: method.into(),
            vocabulary: vocabulary.into(),
            resource_name: resource_name.into(),
            odata_query: Value::Null,
            values: Value::Null,
        }
    }
}

/// The response object `PRERESPOND` hooks may mutate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Value,
}

impl Response {
    pub fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body,
        }
    }
}

/// A version-scoped API client handle bound to the current transaction.
///
/// Built eagerly per version by the hook executor before any hook of that
/// version runs; hooks whose blueprint declares `read_only_tx` receive a
/// handle bound to a read-only view of the same transaction.
#[derive(Clone)]
pub struct ApiHandle {
    vocabulary: String,
    tx: Option<Tx>,
    req: Arc<RequestContext>,
}

impl ApiHandle {
    /// Bind a handle for the given vocabulary to a transaction and request.
    pub fn bind(vocabulary: impl Into<String>, tx: Option<Tx>, req: Arc<RequestContext>) -> Self {
        Self {
            vocabulary: vocabulary.into(),
            tx,
            req,
        }
    }

    /// The vocabulary (API version) this handle addresses.
    pub fn vocabulary(&self) -> &str {
        &self.vocabulary
    }

    /// The transaction requests through this handle run in.
    pub fn transaction(&self) -> Option<&Tx> {
        self.tx.as_ref()
    }

    /// The request this handle was built for.
    pub fn request(&self) -> &Arc<RequestContext> {
        &self.req
    }

    /// Whether writes through this handle are disabled.
    pub fn is_read_only(&self) -> bool {
        self.tx.as_ref().is_some_and(|tx| tx.is_read_only())
    }
}

impl std::fmt::Debug for ApiHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiHandle")
            .field("vocabulary", &self.vocabulary)
            .field("read_only", &self.is_read_only())
            .field("request_id", &self.req.request_id)
            .finish()
    }
}

/// Lookup of compiled models by vocabulary.
pub trait ModelRegistry: Send + Sync {
    fn get_model(&self, vocabulary: &str) -> Option<&AbstractSqlModel>;
}

/// A fixed, load-time-built set of compiled models.
#[derive(Debug, Clone, Default)]
pub struct StaticModels {
    models: BTreeMap<String, AbstractSqlModel>,
}

impl StaticModels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a compiled model under its vocabulary.
    pub fn with_model(mut self, vocabulary: impl Into<String>, model: AbstractSqlModel) -> Self {
        self.models.insert(vocabulary.into(), model);
        self
    }
}

impl ModelRegistry for StaticModels {
    fn get_model(&self, vocabulary: &str) -> Option<&AbstractSqlModel> {
        self.models.get(vocabulary)
    }
}

//! Stage payloads
//!
//! Each stage carries its own concrete payload rather than one loose bag of
//! optional fields: a hook registered for `PRERUN` can rely on a transaction
//! being present without checking.

use std::error::Error;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::core::{ApiHandle, ParsedRequest, RequestContext, Response, Tx};

use super::errors::{HookError, HookResult};
use super::stage::Stage;

/// The query result, shared so post-execution hooks can translate it down
/// through versions in place.
pub type SharedResult = Arc<Mutex<Value>>;

/// The response under assembly, mutable from `PRERESPOND` hooks.
pub type SharedResponse = Arc<Mutex<Response>>;

/// The error a request failed with, as handed to `POSTRUN-ERROR` hooks.
pub type RequestError = Arc<dyn Error + Send + Sync>;

/// The payload a hook callback receives, tagged by stage.
#[derive(Clone)]
pub enum HookArgs {
    Preparse {
        req: Arc<RequestContext>,
    },
    Postparse {
        req: Arc<RequestContext>,
        request: Arc<ParsedRequest>,
        api: ApiHandle,
    },
    Prerun {
        req: Arc<RequestContext>,
        request: Arc<ParsedRequest>,
        api: ApiHandle,
        tx: Tx,
    },
    Postrun {
        req: Arc<RequestContext>,
        request: Arc<ParsedRequest>,
        api: ApiHandle,
        tx: Tx,
        result: SharedResult,
    },
    Prerespond {
        req: Arc<RequestContext>,
        request: Arc<ParsedRequest>,
        api: ApiHandle,
        tx: Tx,
        result: SharedResult,
        response: SharedResponse,
    },
    PostrunError {
        req: Arc<RequestContext>,
        request: Arc<ParsedRequest>,
        api: ApiHandle,
        error: RequestError,
    },
}

impl std::fmt::Debug for HookArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(match self {
            HookArgs::Preparse { .. } => "Preparse",
            HookArgs::Postparse { .. } => "Postparse",
            HookArgs::Prerun { .. } => "Prerun",
            HookArgs::Postrun { .. } => "Postrun",
            HookArgs::Prerespond { .. } => "Prerespond",
            HookArgs::PostrunError { .. } => "PostrunError",
        })
        .finish_non_exhaustive()
    }
}

impl HookArgs {
    /// The stage this payload belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            HookArgs::Preparse { .. } => Stage::Preparse,
            HookArgs::Postparse { .. } => Stage::Postparse,
            HookArgs::Prerun { .. } => Stage::Prerun,
            HookArgs::Postrun { .. } => Stage::Postrun,
            HookArgs::Prerespond { .. } => Stage::Prerespond,
            HookArgs::PostrunError { .. } => Stage::PostrunError,
        }
    }

    /// The request context, present at every stage.
    pub fn req(&self) -> &Arc<RequestContext> {
        match self {
            HookArgs::Preparse { req }
            | HookArgs::Postparse { req, .. }
            | HookArgs::Prerun { req, .. }
            | HookArgs::Postrun { req, .. }
            | HookArgs::Prerespond { req, .. }
            | HookArgs::PostrunError { req, .. } => req,
        }
    }

    /// The version-scoped API handle, absent only at `PREPARSE`.
    pub fn api(&self) -> Option<&ApiHandle> {
        match self {
            HookArgs::Preparse { .. } => None,
            HookArgs::Postparse { api, .. }
            | HookArgs::Prerun { api, .. }
            | HookArgs::Postrun { api, .. }
            | HookArgs::Prerespond { api, .. }
            | HookArgs::PostrunError { api, .. } => Some(api),
        }
    }

    /// The transaction, at the stages that carry one.
    pub fn tx(&self) -> Option<&Tx> {
        match self {
            HookArgs::Prerun { tx, .. }
            | HookArgs::Postrun { tx, .. }
            | HookArgs::Prerespond { tx, .. } => Some(tx),
            _ => None,
        }
    }
}

/// The progressively built per-request state the executor derives stage
/// payloads from.
///
/// The surrounding pipeline fills fields in as the request advances; the
/// executor validates that everything a stage requires is present before
/// any hook of that stage runs.
#[derive(Clone)]
pub struct StageContext {
    pub req: Arc<RequestContext>,
    pub request: Option<Arc<ParsedRequest>>,
    pub tx: Option<Tx>,
    pub result: Option<SharedResult>,
    pub response: Option<SharedResponse>,
    pub error: Option<RequestError>,
}

impl StageContext {
    pub fn new(req: Arc<RequestContext>) -> Self {
        Self {
            req,
            request: None,
            tx: None,
            result: None,
            response: None,
            error: None,
        }
    }

    pub fn with_request(mut self, request: Arc<ParsedRequest>) -> Self {
        self.request = Some(request);
        self
    }

    pub fn with_tx(mut self, tx: Tx) -> Self {
        self.tx = Some(tx);
        self
    }

    pub fn with_result(mut self, result: SharedResult) -> Self {
        self.result = Some(result);
        self
    }

    pub fn with_response(mut self, response: SharedResponse) -> Self {
        self.response = Some(response);
        self
    }

    pub fn with_error(mut self, error: RequestError) -> Self {
        self.error = Some(error);
        self
    }

    /// Derive a context whose transaction is a read-only view.
    pub(crate) fn read_only(&self, tx: Tx) -> Self {
        let mut ctx = self.clone();
        ctx.tx = Some(tx);
        ctx
    }

    /// Build the payload for one stage, bound to the given API handle.
    pub(crate) fn for_stage(&self, stage: Stage, api: Option<ApiHandle>) -> HookResult<HookArgs> {
        let missing = |field| HookError::MissingStagePayload { stage, field };
        let req = self.req.clone();
        let request = || self.request.clone().ok_or(missing("request"));
        let api = || api.clone().ok_or(missing("api"));
        let tx = || self.tx.clone().ok_or(missing("transaction"));

        Ok(match stage {
            Stage::Preparse => HookArgs::Preparse { req },
            Stage::Postparse => HookArgs::Postparse {
                req,
                request: request()?,
                api: api()?,
            },
            Stage::Prerun => HookArgs::Prerun {
                req,
                request: request()?,
                api: api()?,
                tx: tx()?,
            },
            Stage::Postrun => HookArgs::Postrun {
                req,
                request: request()?,
                api: api()?,
                tx: tx()?,
                result: self.result.clone().ok_or(missing("result"))?,
            },
            Stage::Prerespond => HookArgs::Prerespond {
                req,
                request: request()?,
                api: api()?,
                tx: tx()?,
                result: self.result.clone().ok_or(missing("result"))?,
                response: self.response.clone().ok_or(missing("response"))?,
            },
            Stage::PostrunError => HookArgs::PostrunError {
                req,
                request: request()?,
                api: api()?,
                error: self.error.clone().ok_or(missing("error"))?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> StageContext {
        StageContext::new(Arc::new(RequestContext::new("/v1/pet")))
    }

    fn handle(ctx: &StageContext) -> ApiHandle {
        ApiHandle::bind("v1", None, ctx.req.clone())
    }

    #[test]
    fn test_preparse_needs_only_the_request_context() {
        let args = ctx().for_stage(Stage::Preparse, None).unwrap();
        assert_eq!(args.stage(), Stage::Preparse);
        assert!(args.api().is_none());
    }

    #[test]
    fn test_missing_parsed_request_is_reported() {
        let ctx = ctx();
        let err = ctx
            .for_stage(Stage::Postparse, Some(handle(&ctx)))
            .unwrap_err();
        assert!(matches!(
            err,
            HookError::MissingStagePayload {
                stage: Stage::Postparse,
                field: "request",
            }
        ));
    }

    #[test]
    fn test_prerun_requires_a_transaction() {
        let ctx = ctx().with_request(Arc::new(ParsedRequest::new("GET", "v1", "pet")));
        let api = handle(&ctx);
        let err = ctx.for_stage(Stage::Prerun, Some(api)).unwrap_err();
        assert!(matches!(
            err,
            HookError::MissingStagePayload {
                stage: Stage::Prerun,
                field: "transaction",
            }
        ));
    }
}

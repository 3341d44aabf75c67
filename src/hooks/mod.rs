//! Request-lifecycle hook engine
//!
//! Extension callbacks run at six fixed stages of every request, across
//! every API version the request touches, with exactly-once rollback of
//! side effects when the surrounding transaction aborts.

mod args;
mod errors;
mod executor;
mod instance;
mod registry;
mod stage;

pub use args::{HookArgs, RequestError, SharedResponse, SharedResult, StageContext};
pub use errors::{HookError, HookResult};
pub use executor::run_hooks;
pub use instance::{
    rollback_request_hooks, HookBlueprint, HookBlueprints, HookFn, HookInstance,
    InstantiatedHooks, PureHook, RollbackAction, SideEffectHook,
};
pub use registry::{HookRegistry, Method, StageCallbacks, ALL};
pub use stage::Stage;

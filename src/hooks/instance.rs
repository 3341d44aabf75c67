//! Instantiated hooks and rollback
//!
//! Blueprints are immutable and live in the registry; each request gets its
//! own instances. Side-effecting instances own a list of rollback actions
//! that fire at most once when the surrounding transaction aborts.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use futures_util::future::BoxFuture;

use super::args::HookArgs;
use super::errors::HookResult;
use super::stage::Stage;

/// An async hook callback.
pub type HookFn = Arc<dyn Fn(HookArgs) -> BoxFuture<'static, HookResult<()>> + Send + Sync>;

/// A compensation action registered by a side-effecting hook.
pub type RollbackAction = Box<dyn FnOnce() -> BoxFuture<'static, HookResult<()>> + Send>;

/// An immutable hook registration.
#[derive(Clone)]
pub struct HookBlueprint {
    pub(crate) hook_fn: HookFn,
    pub(crate) side_effects: bool,
    pub(crate) read_only_tx: bool,
}

/// The blueprints registered for one (method, vocabulary, resource), by stage.
pub type HookBlueprints = BTreeMap<Stage, Vec<HookBlueprint>>;

/// The per-request instances for one resolved registration, by stage.
pub type InstantiatedHooks = BTreeMap<Stage, Vec<Arc<HookInstance>>>;

/// A hook bound to one request.
pub enum HookInstance {
    /// No compensation needed if the transaction aborts
    Pure(PureHook),
    /// Owns rollback actions fired on transaction abort
    SideEffect(SideEffectHook),
}

impl HookInstance {
    pub(crate) fn from_blueprint(blueprint: &HookBlueprint) -> Arc<Self> {
        let instance = if blueprint.side_effects {
            HookInstance::SideEffect(SideEffectHook {
                hook_fn: blueprint.hook_fn.clone(),
                read_only_tx: blueprint.read_only_tx,
                state: Mutex::new(RollbackState {
                    rolled_back: false,
                    actions: Vec::new(),
                }),
            })
        } else {
            HookInstance::Pure(PureHook {
                hook_fn: blueprint.hook_fn.clone(),
                read_only_tx: blueprint.read_only_tx,
            })
        };
        Arc::new(instance)
    }

    /// Whether this hook wants the read-only transaction view.
    pub fn read_only_tx(&self) -> bool {
        match self {
            HookInstance::Pure(hook) => hook.read_only_tx,
            HookInstance::SideEffect(hook) => hook.read_only_tx,
        }
    }

    /// Run the hook callback with the given stage payload.
    pub async fn run(&self, args: HookArgs) -> HookResult<()> {
        let hook_fn = match self {
            HookInstance::Pure(hook) => &hook.hook_fn,
            HookInstance::SideEffect(hook) => &hook.hook_fn,
        };
        (hook_fn)(args).await
    }

    /// The side-effecting view of this instance, when it has one.
    pub fn as_side_effect(&self) -> Option<&SideEffectHook> {
        match self {
            HookInstance::SideEffect(hook) => Some(hook),
            HookInstance::Pure(_) => None,
        }
    }
}

/// A hook with no compensation requirements.
pub struct PureHook {
    hook_fn: HookFn,
    read_only_tx: bool,
}

/// A hook that may perform actions requiring compensation on abort.
pub struct SideEffectHook {
    hook_fn: HookFn,
    read_only_tx: bool,
    state: Mutex<RollbackState>,
}

struct RollbackState {
    rolled_back: bool,
    actions: Vec<RollbackAction>,
}

impl SideEffectHook {
    /// Register a compensation action.
    ///
    /// Queued until [`SideEffectHook::rollback`] fires; an action registered
    /// after rollback has started executes immediately instead, so no
    /// action is ever silently dropped.
    pub async fn register_rollback(&self, action: RollbackAction) {
        let run_now = {
            let mut state = self.state.lock().unwrap();
            if state.rolled_back {
                Some(action)
            } else {
                state.actions.push(action);
                None
            }
        };
        if let Some(action) = run_now {
            if let Err(err) = action().await {
                tracing::warn!(error = %err, "late rollback action failed");
            }
        }
    }

    /// Fire every queued rollback action, at most once.
    ///
    /// The `rolled_back` flag flips under the lock before any await, so a
    /// racing [`SideEffectHook::register_rollback`] either lands in the
    /// drained queue or runs immediately. Individual action failures are
    /// logged and discarded; rollback itself never fails.
    pub async fn rollback(&self) {
        let actions = {
            let mut state = self.state.lock().unwrap();
            if state.rolled_back {
                return;
            }
            state.rolled_back = true;
            std::mem::take(&mut state.actions)
        };
        for action in actions {
            if let Err(err) = action().await {
                tracing::warn!(error = %err, "rollback action failed");
            }
        }
    }

    /// Whether rollback has already started.
    pub fn rolled_back(&self) -> bool {
        self.state.lock().unwrap().rolled_back
    }
}

/// Bind a resolved set of blueprints to one request.
pub(crate) fn instantiate_hooks(blueprints: &HookBlueprints) -> InstantiatedHooks {
    blueprints
        .iter()
        .map(|(stage, stage_blueprints)| {
            (
                *stage,
                stage_blueprints
                    .iter()
                    .map(HookInstance::from_blueprint)
                    .collect(),
            )
        })
        .collect()
}

/// Roll back every side-effecting hook instance created for one request.
///
/// Flattens all stages of all versions; cross-hook ordering is unspecified
/// but every rollback is awaited to completion.
pub async fn rollback_request_hooks(per_version_hooks: &[(String, InstantiatedHooks)]) {
    for (_, hooks) in per_version_hooks {
        for stage_hooks in hooks.values() {
            for hook in stage_hooks {
                if let HookInstance::SideEffect(side_effect) = hook.as_ref() {
                    side_effect.rollback().await;
                }
            }
        }
    }
}

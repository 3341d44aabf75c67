//! Hook executor
//!
//! Runs one lifecycle stage's hooks across every version a request touches.
//! Versions run strictly in sequence to preserve the result-translation
//! dependency; hooks within one (version, stage) pair run concurrently.

use std::sync::Arc;

use futures_util::future::join_all;

use crate::core::ApiHandle;

use super::args::{HookArgs, StageContext};
use super::errors::{HookError, HookResult};
use super::instance::{HookInstance, InstantiatedHooks};
use super::stage::Stage;

/// Run one stage's hooks for every version the request traverses.
///
/// `per_version_hooks` is ordered oldest to newest. Pre-execution stages
/// visit it in that order; post-execution stages in reverse, since results
/// computed against the newest schema must be translated back down through
/// each intermediate version to the one the client requested.
///
/// Per version, a transaction-bound API handle is built before any hook
/// runs; when the transaction is writable, a second handle over a read-only
/// view of it is built as well, and each hook receives the variant its
/// blueprint asked for. The first failing hook aborts the run.
pub async fn run_hooks(
    stage: Stage,
    per_version_hooks: &[(String, InstantiatedHooks)],
    ctx: &StageContext,
) -> HookResult<()> {
    let mut versions: Vec<(&str, &[Arc<HookInstance>])> = per_version_hooks
        .iter()
        .filter_map(|(version, hooks)| {
            hooks
                .get(&stage)
                .filter(|stage_hooks| !stage_hooks.is_empty())
                .map(|stage_hooks| (version.as_str(), stage_hooks.as_slice()))
        })
        .collect();
    if versions.is_empty() {
        return Ok(());
    }
    if stage.is_post_execution() {
        versions.reverse();
    }

    // A read-only view is only meaningful over a writable transaction
    let read_only_tx = match &ctx.tx {
        Some(tx) if !tx.is_read_only() => Some(tx.clone().as_read_only()),
        _ => None,
    };

    for (version, stage_hooks) in versions {
        let api = ApiHandle::bind(version, ctx.tx.clone(), ctx.req.clone());
        let args = ctx.for_stage(stage, Some(api))?;

        let read_only_args = match &read_only_tx {
            Some(read_only) => {
                let api = ApiHandle::bind(version, Some(read_only.clone()), ctx.req.clone());
                Some(
                    ctx.read_only(read_only.clone())
                        .for_stage(stage, Some(api))?,
                )
            }
            None => None,
        };

        let runs = stage_hooks.iter().map(|hook| {
            let args: HookArgs = match (&read_only_args, hook.read_only_tx()) {
                (Some(read_only_args), true) => read_only_args.clone(),
                _ => args.clone(),
            };
            hook.run(args)
        });
        for result in join_all(runs).await {
            result.map_err(|err| match err {
                failed @ HookError::HookFailed { .. } => failed,
                other => HookError::HookFailed {
                    stage,
                    message: other.to_string(),
                },
            })?;
        }
    }

    Ok(())
}

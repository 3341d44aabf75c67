//! Hook registry and resolver
//!
//! An explicit registry instance, constructed once and injected into the
//! request pipeline. Registrations are validated against the compiled
//! models; resolution merges the wildcard buckets and is memoized on its
//! full argument tuple, with the cache cleared on every registration.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::{Arc, RwLock};

use crate::core::{ModelRegistry, ParsedRequest};
use crate::translator::VERSION_SEPARATOR;

use super::args::HookArgs;
use super::errors::{HookError, HookResult};
use super::instance::{
    instantiate_hooks, HookBlueprint, HookBlueprints, HookFn, InstantiatedHooks,
};
use super::stage::Stage;

/// The wildcard matching every vocabulary or every resource.
pub const ALL: &str = "all";

/// An HTTP verb hooks can be registered for.
///
/// `MERGE` parses to [`Method::Patch`]: the two are the same operation, MERGE
/// being the OData intermediary from before the HTTP spec added PATCH, so
/// they share hook storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    Get,
    Put,
    Post,
    Patch,
    Delete,
    Options,
}

impl Method {
    /// Parse an upper-case verb, normalizing `MERGE` to `PATCH`.
    pub fn parse(method: &str) -> HookResult<Self> {
        match method {
            "GET" => Ok(Method::Get),
            "PUT" => Ok(Method::Put),
            "POST" => Ok(Method::Post),
            "PATCH" | "MERGE" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            "OPTIONS" => Ok(Method::Options),
            other => Err(HookError::UnknownMethod(other.to_string())),
        }
    }
}

/// The stage callbacks of one registration, sharing one set of flags.
///
/// Raw callbacks plus shared `side_effects`/`read_only_tx` flags are the
/// only registration form; flags are supplied to
/// [`HookRegistry::add_hook`] or fixed by the convenience wrappers.
#[derive(Clone, Default)]
pub struct StageCallbacks {
    callbacks: Vec<(Stage, HookFn)>,
}

impl StageCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a callback to a stage. Within a stage, callbacks run in the
    /// order they were attached.
    pub fn on<F, Fut>(mut self, stage: Stage, hook_fn: F) -> Self
    where
        F: Fn(HookArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HookResult<()>> + Send + 'static,
    {
        self.callbacks
            .push((stage, Arc::new(move |args| Box::pin(hook_fn(args)))));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

type BucketKey = (Method, String, String);
type CacheKey = (Method, String, Option<String>, bool);

/// Accumulates hook registrations and resolves them per request.
pub struct HookRegistry {
    models: Arc<dyn ModelRegistry>,
    buckets: RwLock<HashMap<BucketKey, HookBlueprints>>,
    cache: RwLock<HashMap<CacheKey, Arc<HookBlueprints>>>,
}

impl HookRegistry {
    /// Create a registry validating against the given compiled models.
    pub fn new(models: Arc<dyn ModelRegistry>) -> Self {
        Self {
            models,
            buckets: RwLock::new(HashMap::new()),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Register stage callbacks for (method, vocabulary, resource).
    ///
    /// `vocabulary` and `resource` accept the `"all"` wildcard; a wildcard
    /// vocabulary requires a wildcard resource. Named vocabularies must have
    /// a compiled model and named resources must resolve, through the
    /// synonym table, to one of its tables. Callbacks are appended, never
    /// overwritten, and any successful registration invalidates the
    /// resolver cache.
    pub fn add_hook(
        &self,
        method: &str,
        vocabulary: &str,
        resource: &str,
        callbacks: StageCallbacks,
        side_effects: bool,
        read_only_tx: bool,
    ) -> HookResult<()> {
        let method = Method::parse(method)?;
        let resource = if vocabulary == ALL {
            if resource != ALL {
                return Err(HookError::WildcardResourceRequired(resource.to_string()));
            }
            resource.to_string()
        } else {
            let model = self
                .models
                .get_model(vocabulary)
                .ok_or_else(|| HookError::UnknownApiRoot(vocabulary.to_string()))?;
            if resource == ALL {
                resource.to_string()
            } else {
                let canonical = model.resolve_synonym(resource);
                if !model.tables.contains_key(&canonical) {
                    return Err(HookError::UnknownResource(
                        resource.to_string(),
                        vocabulary.to_string(),
                    ));
                }
                canonical
            }
        };

        {
            let mut buckets = self.buckets.write().unwrap();
            let bucket = buckets
                .entry((method, vocabulary.to_string(), resource))
                .or_default();
            for (stage, hook_fn) in callbacks.callbacks {
                bucket.entry(stage).or_default().push(HookBlueprint {
                    hook_fn,
                    side_effects,
                    read_only_tx,
                });
            }
        }
        self.cache.write().unwrap().clear();
        Ok(())
    }

    /// Register side-effecting hooks (rollback-capable, writable tx).
    pub fn add_side_effect_hook(
        &self,
        method: &str,
        vocabulary: &str,
        resource: &str,
        callbacks: StageCallbacks,
    ) -> HookResult<()> {
        self.add_hook(method, vocabulary, resource, callbacks, true, false)
    }

    /// Register pure hooks (no rollback, writable tx).
    pub fn add_pure_hook(
        &self,
        method: &str,
        vocabulary: &str,
        resource: &str,
        callbacks: StageCallbacks,
    ) -> HookResult<()> {
        self.add_hook(method, vocabulary, resource, callbacks, false, false)
    }

    /// Instantiate the hooks applicable to a request.
    ///
    /// `resource_name` is `None` when resolving `PREPARSE` hooks, before the
    /// request has been parsed. `include_all_vocab` excludes the
    /// vocabulary-wildcard buckets when false, used when resolving for a
    /// translated version whose global hooks already ran at the newest one.
    pub fn get_hooks(
        &self,
        method: &str,
        vocabulary: &str,
        resource_name: Option<&str>,
        include_all_vocab: bool,
    ) -> HookResult<InstantiatedHooks> {
        let method = Method::parse(method)?;
        let resource = resource_name.map(|name| {
            // Strip any trailing navigation-property qualifier, then
            // canonicalize through the vocabulary's synonym table
            let stripped = name.split(VERSION_SEPARATOR).next().unwrap_or(name);
            match self.models.get_model(vocabulary) {
                Some(model) => model.resolve_synonym(stripped),
                None => stripped.to_string(),
            }
        });
        let blueprints = self.resolve(method, vocabulary, resource, include_all_vocab);
        Ok(instantiate_hooks(&blueprints))
    }

    /// Instantiate the hooks applicable to a parsed request.
    pub fn get_hooks_for_request(
        &self,
        request: &ParsedRequest,
        include_all_vocab: bool,
    ) -> HookResult<InstantiatedHooks> {
        self.get_hooks(
            &request.method,
            &request.vocabulary,
            Some(&request.resource_name),
            include_all_vocab,
        )
    }

    /// The merged blueprints for the full lookup tuple, memoized.
    fn resolve(
        &self,
        method: Method,
        vocabulary: &str,
        resource: Option<String>,
        include_all_vocab: bool,
    ) -> Arc<HookBlueprints> {
        let cache_key = (
            method,
            vocabulary.to_string(),
            resource.clone(),
            include_all_vocab,
        );
        if let Some(cached) = self.cache.read().unwrap().get(&cache_key) {
            return cached.clone();
        }

        let mut lookups: Vec<(&str, &str)> = Vec::with_capacity(4);
        if let Some(resource) = resource.as_deref() {
            if resource != ALL {
                lookups.push((vocabulary, resource));
            }
        }
        lookups.push((vocabulary, ALL));
        if include_all_vocab && vocabulary != ALL {
            if let Some(resource) = resource.as_deref() {
                if resource != ALL {
                    lookups.push((ALL, resource));
                }
            }
            lookups.push((ALL, ALL));
        }

        let mut merged: HookBlueprints = BTreeMap::new();
        {
            let buckets = self.buckets.read().unwrap();
            for (vocab, res) in lookups {
                let key = (method, vocab.to_string(), res.to_string());
                if let Some(bucket) = buckets.get(&key) {
                    for (stage, blueprints) in bucket {
                        merged
                            .entry(*stage)
                            .or_default()
                            .extend(blueprints.iter().cloned());
                    }
                }
            }
        }

        let merged = Arc::new(merged);
        self.cache
            .write()
            .unwrap()
            .insert(cache_key, merged.clone());
        merged
    }
}

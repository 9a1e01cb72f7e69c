use crate::apply::{apply_to, Injectable};
use crate::config::InjectorOptions;
use crate::errors::InjectError;
use crate::invoke::{invoke_value_with, invoke_with, Invocable};
use crate::metrics::{MetricsSnapshot, ResolutionMetrics};
use crate::parent::{lookup_parent, ParentRef};
use crate::resolver::{self, Resolve, ResolutionContext};
use crate::store::Registry;
use crate::type_key::TypeKey;
use crate::value::Value;
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::trace;

/// Immutable registry produced by [`Injector::freeze`](crate::Injector::freeze).
///
/// All local factories have already been resolved, so local lookups are
/// plain reads and the snapshot can be shared between threads. A factory
/// reached through the parent is resolved once, under a lock, and its
/// product (with any arguments produced on the way) is kept in a separate
/// table so later lookups return the same instance.
pub struct FrozenInjector {
    registry: Registry,
    resolved: RwLock<FxHashMap<TypeKey, Value>>,
    resolving: Mutex<()>,
    parent: Option<ParentRef>,
    options: InjectorOptions,
    metrics: ResolutionMetrics,
}

impl FrozenInjector {
    pub(crate) fn new(
        registry: Registry,
        parent: Option<ParentRef>,
        options: InjectorOptions,
        metrics: ResolutionMetrics,
    ) -> Self {
        Self {
            registry,
            resolved: RwLock::new(FxHashMap::default()),
            resolving: Mutex::new(()),
            parent,
            options,
            metrics,
        }
    }

    pub fn get_raw(&self, key: &TypeKey) -> Result<Option<Value>, InjectError> {
        ResolutionMetrics::record(&self.metrics.lookups);
        if let Some(value) = self.resolved_value(key) {
            ResolutionMetrics::record(&self.metrics.value_hits);
            return Ok(Some(value));
        }
        if let Some(value) = self.registry.lookup(key, &self.options, &self.metrics)? {
            return Ok(Some(value));
        }
        lookup_parent(self.parent.as_ref(), key, &self.metrics)
    }

    pub fn get(&self, key: &TypeKey) -> Result<Option<Value>, InjectError> {
        let Some(raw) = self.get_raw(key)? else {
            ResolutionMetrics::record(&self.metrics.misses);
            return Ok(None);
        };
        if !raw.is_callable() {
            return Ok(Some(raw));
        }

        // Only parent factories get here; run each of them once
        let _guard = self.resolving.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(value) = self.resolved_value(key) {
            return Ok(Some(value));
        }

        let mut scratch = Scratch::new(self);
        let result = resolver::materialize(&mut scratch, key, raw);
        self.commit(scratch.values);
        result.map(Some)
    }

    pub fn get_as<T: ?Sized + 'static>(&self) -> Result<Option<Arc<T>>, InjectError> {
        self.get(&TypeKey::of::<T>())?
            .map(|value| value.try_downcast::<T>())
            .transpose()
    }

    pub fn resolve<T: ?Sized + 'static>(&self) -> Result<Arc<T>, InjectError> {
        self.get_as::<T>()?.ok_or_else(InjectError::missing::<T>)
    }

    pub fn apply<T: Injectable + ?Sized>(&self, target: &mut T) -> Result<(), InjectError> {
        let mut this = self;
        apply_to(&mut this, target)
    }

    pub fn invoke<Args, F: Invocable<Args>>(&self, f: F) -> Result<F::Output, InjectError> {
        let mut this = self;
        invoke_with(&mut this, f)
    }

    pub fn invoke_value(&self, target: &Value) -> Result<Value, InjectError> {
        let mut this = self;
        invoke_value_with(&mut this, target)
    }

    /// Whether `key` has a value in the snapshot, including values resolved
    /// from parent factories since freezing
    pub fn contains(&self, key: &TypeKey) -> bool {
        self.registry.contains(key) || self.resolved_value(key).is_some()
    }

    pub fn value_count(&self) -> usize {
        self.registry.value_count()
    }

    /// Number of values produced from parent factories since freezing
    pub fn resolved_count(&self) -> usize {
        self.resolved
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn options(&self) -> &InjectorOptions {
        &self.options
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn resolved_value(&self, key: &TypeKey) -> Option<Value> {
        self.resolved
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn commit(&self, values: FxHashMap<TypeKey, Value>) {
        if values.is_empty() {
            return;
        }
        trace!(count = values.len(), "Keeping values resolved through parent");
        let mut resolved = self.resolved.write().unwrap_or_else(PoisonError::into_inner);
        for (key, value) in values {
            resolved.entry(key).or_insert(value);
        }
    }
}

impl Resolve for &FrozenInjector {
    fn resolve_key(&mut self, key: &TypeKey) -> Result<Option<Value>, InjectError> {
        self.get(key)
    }
}

/// Memoization buffer for one resolution, committed once it finishes
struct Scratch<'a> {
    frozen: &'a FrozenInjector,
    values: FxHashMap<TypeKey, Value>,
}

impl<'a> Scratch<'a> {
    fn new(frozen: &'a FrozenInjector) -> Self {
        Self {
            frozen,
            values: FxHashMap::default(),
        }
    }
}

impl ResolutionContext for Scratch<'_> {
    fn cached(&self, key: &TypeKey) -> Option<Value> {
        self.values
            .get(key)
            .or_else(|| self.frozen.registry.value(key))
            .cloned()
            .or_else(|| self.frozen.resolved_value(key))
    }

    fn lookup(&self, key: &TypeKey) -> Result<Option<Value>, InjectError> {
        if let Some(value) = self.values.get(key) {
            return Ok(Some(value.clone()));
        }
        self.frozen.get_raw(key)
    }

    fn memoize(&mut self, key: TypeKey, value: Value) {
        self.values.insert(key, value);
    }

    fn options(&self) -> &InjectorOptions {
        &self.frozen.options
    }

    fn metrics(&self) -> &ResolutionMetrics {
        &self.frozen.metrics
    }
}

//! Type-keyed storage shared by the mutable and frozen injectors
//!
//! A [`Registry`] holds three tables:
//! - `values`: concrete instances, in registration order
//! - `factories`: callables producing the value for their key
//! - `capabilities`: declared "concrete type can be viewed as interface" casts
//!
//! Resolution itself lives in [`crate::resolver`]; this module only answers
//! local lookups.

use crate::config::{InjectorOptions, InterfaceResolution};
use crate::errors::InjectError;
use crate::factory::Factory;
use crate::metrics::ResolutionMetrics;
use crate::type_key::TypeKey;
use crate::value::Value;
use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashMap};
use std::sync::Arc;
use tracing::trace;

type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;
type CastFn = dyn Fn(&Value) -> Option<Value> + Send + Sync;

/// A declared conversion from a concrete registration to an interface view
#[derive(Clone)]
pub(crate) struct Capability {
    concrete: TypeKey,
    cast: Arc<CastFn>,
}

impl Capability {
    pub(crate) fn new<C, I>(cast: fn(Arc<C>) -> Arc<I>) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        I: ?Sized + Send + Sync + 'static,
    {
        Self {
            concrete: TypeKey::of::<C>(),
            cast: Arc::new(move |value: &Value| value.downcast::<C>().map(|c| Value::from_arc(cast(c)))),
        }
    }
}

/// Local tables of one injector, without any parent delegation
#[derive(Clone, Default)]
pub(crate) struct Registry {
    values: FxIndexMap<TypeKey, Value>,
    factories: FxHashMap<TypeKey, Arc<Factory>>,
    capabilities: FxHashMap<TypeKey, Vec<Capability>>,
}

impl Registry {
    pub(crate) fn insert_value(&mut self, key: TypeKey, value: Value) {
        self.values.insert(key, value);
    }

    pub(crate) fn insert_factory(&mut self, key: TypeKey, factory: Arc<Factory>) {
        self.factories.insert(key, factory);
    }

    pub(crate) fn insert_capability(&mut self, interface: TypeKey, capability: Capability) {
        let entries = self.capabilities.entry(interface).or_default();
        entries.retain(|existing| existing.concrete != capability.concrete);
        entries.push(capability);
    }

    pub(crate) fn value(&self, key: &TypeKey) -> Option<&Value> {
        self.values.get(key)
    }

    pub(crate) fn factory(&self, key: &TypeKey) -> Option<&Arc<Factory>> {
        self.factories.get(key)
    }

    pub(crate) fn factory_keys(&self) -> Vec<TypeKey> {
        self.factories.keys().copied().collect()
    }

    pub(crate) fn clear_factories(&mut self) {
        self.factories.clear();
    }

    pub(crate) fn value_count(&self) -> usize {
        self.values.len()
    }

    pub(crate) fn factory_count(&self) -> usize {
        self.factories.len()
    }

    pub(crate) fn contains(&self, key: &TypeKey) -> bool {
        self.values.contains_key(key) || self.factories.contains_key(key)
    }

    /// Local part of `GetRaw`: exact value, exact factory (unresolved), then
    /// the interface scan over registered values.
    pub(crate) fn lookup(
        &self,
        key: &TypeKey,
        options: &InjectorOptions,
        metrics: &ResolutionMetrics,
    ) -> Result<Option<Value>, InjectError> {
        if let Some(value) = self.values.get(key) {
            ResolutionMetrics::record(&metrics.value_hits);
            trace!(key = %key, "Found registered value");
            return Ok(Some(value.clone()));
        }

        if let Some(factory) = self.factories.get(key) {
            ResolutionMetrics::record(&metrics.factory_hits);
            trace!(key = %key, "Found registered factory");
            return Ok(Some(Value::from_arc(factory.clone())));
        }

        if key.is_interface() {
            if let Some(value) = self.find_implementor(key, options.interface_resolution)? {
                ResolutionMetrics::record(&metrics.interface_matches);
                return Ok(Some(value));
            }
        }

        Ok(None)
    }

    fn find_implementor(
        &self,
        interface: &TypeKey,
        policy: InterfaceResolution,
    ) -> Result<Option<Value>, InjectError> {
        let Some(capabilities) = self.capabilities.get(interface) else {
            return Ok(None);
        };

        let mut matches = self.values.iter().filter_map(|(registered, value)| {
            capabilities
                .iter()
                .find(|capability| capability.concrete == *registered)
                .and_then(|capability| (capability.cast)(value))
                .map(|view| (*registered, view))
        });

        let Some((first_key, first_view)) = matches.next() else {
            return Ok(None);
        };

        if policy == InterfaceResolution::Unique {
            let others: Vec<TypeKey> = matches.map(|(registered, _)| registered).collect();
            if !others.is_empty() {
                let mut candidates = vec![first_key];
                candidates.extend(others);
                return Err(InjectError::AmbiguousInterface {
                    interface: *interface,
                    candidates,
                });
            }
        }

        trace!(interface = %interface, implementor = %first_key, "Interface satisfied by registered value");
        Ok(Some(first_view))
    }
}

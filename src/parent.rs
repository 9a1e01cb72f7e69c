//! Fallback registries consulted on a local miss
//!
//! A child holds its parent weakly, so the parent must stay usable through
//! a shared reference. Two shapes qualify:
//! - `RwLock<Injector>`: still mutable; the owner registers and resolves
//!   through the write guard while children read through the read guard
//! - [`FrozenInjector`]: immutable, every operation already takes `&self`

use crate::errors::InjectError;
use crate::frozen::FrozenInjector;
use crate::injector::Injector;
use crate::metrics::ResolutionMetrics;
use crate::type_key::TypeKey;
use crate::value::Value;
use std::sync::{PoisonError, RwLock, Weak};
use tracing::trace;

/// A registry a child injector can delegate lookups to.
///
/// Parents answer with `GetRaw` semantics: a factory found on the parent is
/// returned unresolved so the child can resolve and memoize it locally.
pub trait ParentRegistry: Send + Sync {
    fn lookup_raw(&self, key: &TypeKey) -> Result<Option<Value>, InjectError>;
}

impl ParentRegistry for RwLock<Injector> {
    fn lookup_raw(&self, key: &TypeKey) -> Result<Option<Value>, InjectError> {
        self.read()
            .unwrap_or_else(PoisonError::into_inner)
            .get_raw(key)
    }
}

impl ParentRegistry for FrozenInjector {
    fn lookup_raw(&self, key: &TypeKey) -> Result<Option<Value>, InjectError> {
        self.get_raw(key)
    }
}

pub(crate) type ParentRef = Weak<dyn ParentRegistry>;

/// Delegate a local miss to the parent, if one is still alive
pub(crate) fn lookup_parent(
    parent: Option<&ParentRef>,
    key: &TypeKey,
    metrics: &ResolutionMetrics,
) -> Result<Option<Value>, InjectError> {
    let Some(parent) = parent.and_then(Weak::upgrade) else {
        return Ok(None);
    };
    ResolutionMetrics::record(&metrics.parent_lookups);
    trace!(key = %key, "Delegating lookup to parent");
    parent.lookup_raw(key)
}

use crate::config::InjectorOptions;
use crate::errors::InjectError;
use crate::factory::Factory;
use crate::metrics::ResolutionMetrics;
use crate::type_key::TypeKey;
use crate::value::Value;
use std::fmt;
use tracing::{debug, trace, warn};

/// One step of a factory resolution: `factory` needed `requested`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainLink {
    pub factory: TypeKey,
    pub requested: TypeKey,
}

/// Path of nested factory resolutions taken by one top-level lookup
///
/// Only used for loop detection and diagnostics; a fresh chain is started
/// for every top-level `get`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionChain {
    links: Vec<ChainLink>,
}

impl ResolutionChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn links(&self) -> &[ChainLink] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn last_requested(&self) -> Option<TypeKey> {
        self.links.last().map(|link| link.requested)
    }

    /// Whether `key` is currently being produced by a factory on this chain
    fn is_under_construction(&self, key: &TypeKey) -> bool {
        self.links.iter().any(|link| link.factory == *key)
    }

    fn push(&mut self, factory: TypeKey, requested: TypeKey, limit: usize) -> Result<(), InjectError> {
        self.links.push(ChainLink { factory, requested });

        if self.is_under_construction(&requested) {
            return Err(InjectError::DependencyLoop {
                chain: self.clone(),
            });
        }
        if self.links.len() > limit {
            return Err(InjectError::ResolutionTooDeep {
                limit,
                chain: self.clone(),
            });
        }
        Ok(())
    }

    fn pop(&mut self) {
        self.links.pop();
    }
}

impl fmt::Display for ResolutionChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(first) = self.links.first() else {
            return f.write_str("<empty>");
        };
        write!(f, "{}", first.factory)?;
        for link in &self.links {
            write!(f, " -> {}", link.requested)?;
        }
        Ok(())
    }
}

/// Anything that can answer "give me the value for this type".
///
/// Implemented by [`Injector`](crate::Injector) and
/// [`&FrozenInjector`](crate::FrozenInjector); the applicator and invoker are
/// written against it.
pub trait Resolve {
    fn resolve_key(&mut self, key: &TypeKey) -> Result<Option<Value>, InjectError>;
}

/// Storage view the resolution algorithm runs against
pub(crate) trait ResolutionContext {
    /// Value already materialized under exactly this key
    fn cached(&self, key: &TypeKey) -> Option<Value>;

    /// `GetRaw`: value, unresolved factory, interface match, then parent
    fn lookup(&self, key: &TypeKey) -> Result<Option<Value>, InjectError>;

    fn memoize(&mut self, key: TypeKey, value: Value);

    fn options(&self) -> &InjectorOptions;

    fn metrics(&self) -> &ResolutionMetrics;
}

/// `Get`: like `lookup`, but a factory is resolved and its product memoized
pub(crate) fn get<C: ResolutionContext + ?Sized>(
    ctx: &mut C,
    key: &TypeKey,
) -> Result<Option<Value>, InjectError> {
    let Some(raw) = ctx.lookup(key)? else {
        ResolutionMetrics::record(&ctx.metrics().misses);
        trace!(key = %key, "No provider found");
        return Ok(None);
    };
    materialize(ctx, key, raw).map(Some)
}

/// Turn a raw lookup result for `key` into a value: a plain value is
/// returned as is, a factory is resolved with a fresh chain and memoized.
pub(crate) fn materialize<C: ResolutionContext + ?Sized>(
    ctx: &mut C,
    key: &TypeKey,
    raw: Value,
) -> Result<Value, InjectError> {
    let Some(factory) = raw.as_factory() else {
        return Ok(raw);
    };

    let mut chain = ResolutionChain::new();
    let value = resolve_factory(ctx, *key, &factory, &mut chain)?;
    ctx.memoize(*key, value.clone());
    Ok(value)
}

/// Resolve the arguments of `factory` (producing `key`) and call it.
///
/// Every argument obtained on the way, including the products of nested
/// factories, is memoized under its parameter key.
pub(crate) fn resolve_factory<C: ResolutionContext + ?Sized>(
    ctx: &mut C,
    key: TypeKey,
    factory: &Factory,
    chain: &mut ResolutionChain,
) -> Result<Value, InjectError> {
    let mut args = Vec::with_capacity(factory.params().len());

    for &param in factory.params() {
        if let Some(cached) = ctx.cached(&param) {
            args.push(cached);
            continue;
        }

        let raw = ctx
            .lookup(&param)?
            .ok_or(InjectError::MissingDependency {
                key: param,
                required_by: Some(key),
            })?;

        let arg = match raw.as_factory() {
            Some(nested) => {
                let limit = ctx.options().max_resolution_depth;
                if let Err(err) = chain.push(key, param, limit) {
                    if matches!(err, InjectError::DependencyLoop { .. }) {
                        ResolutionMetrics::record(&ctx.metrics().loops_detected);
                    }
                    warn!(error = %err, "Aborting factory resolution");
                    return Err(err);
                }
                let produced = resolve_factory(ctx, param, &nested, chain)?;
                chain.pop();
                produced
            }
            None => raw,
        };

        ctx.memoize(param, arg.clone());
        args.push(arg);
    }

    debug!(key = %key, depth = chain.len(), "Invoking factory");
    ResolutionMetrics::record(&ctx.metrics().factory_invocations);
    factory.call(&args)
}

use crate::apply::{apply_to, Injectable};
use crate::config::InjectorOptions;
use crate::errors::InjectError;
use crate::factory::{Factory, IntoFactory};
use crate::frozen::FrozenInjector;
use crate::invoke::{invoke_value_with, invoke_with, Invocable};
use crate::metrics::{MetricsSnapshot, ResolutionMetrics};
use crate::parent::{lookup_parent, ParentRef, ParentRegistry};
use crate::resolver::{self, Resolve, ResolutionContext};
use crate::store::{Capability, Registry};
use crate::type_key::{interface_of, TypeKey};
use crate::value::Value;
use std::sync::Arc;
use tracing::{debug, trace};

/// Runtime dependency registry
///
/// Maps type keys to instances or factories and uses them to populate
/// [`Injectable`] structs and call functions by parameter type.
///
/// Resolution memoizes factory products back into the registry, so even
/// [`Injector::get`] needs `&mut self`. Share an `Injector` across threads
/// behind a lock, or [`freeze`](Injector::freeze) it once it is built.
/// Either form can serve as the parent of other injectors.
///
/// # Example
///
/// ```rust
/// use depinject::Injector;
/// use std::sync::Arc;
///
/// struct Config { url: String }
/// struct Client { url: String }
///
/// let mut injector = Injector::new();
/// injector.map(Config { url: "db://local".into() });
/// injector.provide(|config: Arc<Config>| Arc::new(Client { url: config.url.clone() }));
///
/// let client = injector.resolve::<Client>().unwrap();
/// assert_eq!(client.url, "db://local");
/// ```
pub struct Injector {
    registry: Registry,
    parent: Option<ParentRef>,
    options: InjectorOptions,
    metrics: ResolutionMetrics,
}

impl Injector {
    /// Create a new empty injector with no parent
    pub fn new() -> Self {
        Self::with_options(InjectorOptions::default())
    }

    pub fn with_options(options: InjectorOptions) -> Self {
        Self {
            registry: Registry::default(),
            parent: None,
            options,
            metrics: ResolutionMetrics::new(),
        }
    }

    /// Register `value` under `key`.
    ///
    /// A callable value (one holding a [`Factory`]) is stored as a factory.
    /// When `key` is itself the callable key the factory is registered under
    /// its output type, otherwise under `key` as given. Any earlier
    /// registration for the same key is replaced.
    pub fn set(&mut self, key: TypeKey, value: Value) -> &mut Self {
        match value.as_factory() {
            Some(factory) => {
                let key = if key.is_callable() { factory.output() } else { key };
                debug!(key = %key, params = factory.params().len(), "Registering factory");
                self.registry.insert_factory(key, factory);
            }
            None => {
                debug!(key = %key, "Registering value");
                self.registry.insert_value(key, value);
            }
        }
        self
    }

    /// Register `value` under its own type
    pub fn map<T: Send + Sync + 'static>(&mut self, value: T) -> &mut Self {
        let value = Value::new(value);
        self.set(value.key(), value)
    }

    /// Register an interface implementation under the interface key
    ///
    /// # Panics
    ///
    /// Panics if `I` is not a trait object type.
    pub fn map_to<I: ?Sized + Send + Sync + 'static>(&mut self, value: Arc<I>) -> &mut Self {
        let key = interface_of::<I>();
        self.set(key, Value::from_arc(value))
    }

    /// Register a factory under the type it produces
    pub fn provide<Args, F: IntoFactory<Args>>(&mut self, factory: F) -> &mut Self {
        self.set(TypeKey::of::<Factory>(), Value::factory(factory.into_factory()))
    }

    /// Declare that a value registered under `C` can satisfy interface `I`.
    ///
    /// Only declared capabilities are considered by the interface scan.
    ///
    /// # Panics
    ///
    /// Panics if `I` is not a trait object type.
    pub fn implements<C, I>(&mut self, cast: fn(Arc<C>) -> Arc<I>) -> &mut Self
    where
        C: ?Sized + Send + Sync + 'static,
        I: ?Sized + Send + Sync + 'static,
    {
        let interface = interface_of::<I>();
        trace!(interface = %interface, concrete = %TypeKey::of::<C>(), "Declaring capability");
        self.registry
            .insert_capability(interface, Capability::new::<C, I>(cast));
        self
    }

    /// Attach a fallback registry consulted on every local miss.
    ///
    /// The parent is either a lockable `RwLock<Injector>`, which its owner
    /// can keep filling and resolving through the write guard, or a
    /// [`FrozenInjector`]. Only a weak reference is kept; once the parent
    /// is dropped lookups behave as if no parent was set.
    ///
    /// ```rust
    /// use depinject::Injector;
    /// use std::sync::{Arc, RwLock};
    ///
    /// let parent = Arc::new(RwLock::new(Injector::new()));
    /// let mut child = Injector::new();
    /// child.set_parent(&parent);
    ///
    /// parent.write().unwrap().map(7u32);
    /// assert_eq!(*child.resolve::<u32>().unwrap(), 7);
    /// ```
    pub fn set_parent<P: ParentRegistry + 'static>(&mut self, parent: &Arc<P>) {
        let parent: ParentRef = Arc::downgrade(parent) as std::sync::Weak<P>;
        self.parent = Some(parent);
    }

    pub fn clear_parent(&mut self) {
        self.parent = None;
    }

    pub fn has_parent(&self) -> bool {
        self.parent
            .as_ref()
            .is_some_and(|parent| parent.strong_count() > 0)
    }

    /// Value for `key` without resolving factories.
    ///
    /// Order: exact value, exact factory (as a callable value), interface
    /// implementor, then the parent's `get_raw`. `Ok(None)` when nothing
    /// matches anywhere.
    pub fn get_raw(&self, key: &TypeKey) -> Result<Option<Value>, InjectError> {
        ResolutionMetrics::record(&self.metrics.lookups);
        if let Some(value) = self.registry.lookup(key, &self.options, &self.metrics)? {
            return Ok(Some(value));
        }
        lookup_parent(self.parent.as_ref(), key, &self.metrics)
    }

    /// Value for `key`, resolving and memoizing factories on the way
    pub fn get(&mut self, key: &TypeKey) -> Result<Option<Value>, InjectError> {
        resolver::get(self, key)
    }

    /// Typed form of [`Injector::get`]
    pub fn get_as<T: ?Sized + 'static>(&mut self) -> Result<Option<Arc<T>>, InjectError> {
        self.get(&TypeKey::of::<T>())?
            .map(|value| value.try_downcast::<T>())
            .transpose()
    }

    /// Like [`Injector::get_as`] but a miss is a `MissingDependency` error
    pub fn resolve<T: ?Sized + 'static>(&mut self) -> Result<Arc<T>, InjectError> {
        self.get_as::<T>()?.ok_or_else(InjectError::missing::<T>)
    }

    /// Populate the injectable fields of `target`
    pub fn apply<T: Injectable + ?Sized>(&mut self, target: &mut T) -> Result<(), InjectError> {
        apply_to(self, target)
    }

    /// Call `f` with every parameter resolved by type
    pub fn invoke<Args, F: Invocable<Args>>(&mut self, f: F) -> Result<F::Output, InjectError> {
        invoke_with(self, f)
    }

    /// Call a type-erased callable; a non-callable value is an error
    pub fn invoke_value(&mut self, target: &Value) -> Result<Value, InjectError> {
        invoke_value_with(self, target)
    }

    /// Resolve every registered factory and return an immutable snapshot
    pub fn freeze(mut self) -> Result<FrozenInjector, InjectError> {
        for key in self.registry.factory_keys() {
            if self.registry.value(&key).is_none() {
                self.get(&key)?;
            }
        }
        self.registry.clear_factories();
        debug!(values = self.registry.value_count(), "Injector frozen");
        Ok(FrozenInjector::new(
            self.registry,
            self.parent,
            self.options,
            self.metrics,
        ))
    }

    /// Whether `key` has a local value or factory
    pub fn contains(&self, key: &TypeKey) -> bool {
        self.registry.contains(key)
    }

    pub fn value_count(&self) -> usize {
        self.registry.value_count()
    }

    pub fn factory_count(&self) -> usize {
        self.registry.factory_count()
    }

    pub fn options(&self) -> &InjectorOptions {
        &self.options
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn reset_metrics(&self) {
        self.metrics.reset();
    }
}

impl Default for Injector {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolutionContext for Injector {
    fn cached(&self, key: &TypeKey) -> Option<Value> {
        self.registry.value(key).cloned()
    }

    fn lookup(&self, key: &TypeKey) -> Result<Option<Value>, InjectError> {
        self.get_raw(key)
    }

    fn memoize(&mut self, key: TypeKey, value: Value) {
        trace!(key = %key, "Memoizing resolved value");
        ResolutionMetrics::record(&self.metrics.memoized);
        self.registry.insert_value(key, value);
    }

    fn options(&self) -> &InjectorOptions {
        &self.options
    }

    fn metrics(&self) -> &ResolutionMetrics {
        &self.metrics
    }
}

impl Resolve for Injector {
    fn resolve_key(&mut self, key: &TypeKey) -> Result<Option<Value>, InjectError> {
        self.get(key)
    }
}

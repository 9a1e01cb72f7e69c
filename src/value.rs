use crate::factory::Factory;
use crate::type_key::TypeKey;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Type-erased, cheaply clonable handle to a registered instance.
///
/// The payload is always an `Arc<T>` for the type named by [`Value::key`],
/// which lets unsized interface values (`Arc<dyn Trait>`) be stored the same
/// way as concrete ones. A value holding a [`Factory`] is callable.
#[derive(Clone)]
pub struct Value {
    key: TypeKey,
    payload: Arc<dyn Any + Send + Sync>,
}

impl Value {
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    pub fn from_arc<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            key: TypeKey::of::<T>(),
            payload: Arc::new(value),
        }
    }

    /// Wrap a factory so it can be passed through [`Injector::set`](crate::Injector::set)
    pub fn factory(factory: Factory) -> Self {
        Self::new(factory)
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn is_callable(&self) -> bool {
        self.key.is_callable()
    }

    pub fn downcast<T: ?Sized + 'static>(&self) -> Option<Arc<T>> {
        self.payload.downcast_ref::<Arc<T>>().cloned()
    }

    /// Like [`Value::downcast`] but reports what was actually stored
    pub fn try_downcast<T: ?Sized + 'static>(&self) -> Result<Arc<T>, crate::InjectError> {
        self.downcast::<T>()
            .ok_or_else(|| crate::InjectError::mismatch::<T>(self.key))
    }

    pub fn as_factory(&self) -> Option<Arc<Factory>> {
        if self.is_callable() {
            self.downcast::<Factory>()
        } else {
            None
        }
    }

    /// Whether both handles refer to the same stored instance
    pub fn ptr_eq(&self, other: &Value) -> bool {
        Arc::ptr_eq(&self.payload, &other.payload)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value").field("key", &self.key).finish()
    }
}

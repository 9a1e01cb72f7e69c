use crate::errors::InjectError;
use crate::resolver::Resolve;
use crate::type_key::TypeKey;
use crate::value::Value;
use std::sync::Arc;
use tracing::debug;

/// A struct whose marked fields can be populated from a registry.
///
/// `inject` hands every marked field to the [`FieldInjector`], in field order.
/// Unlisted fields are never touched. Usually implemented with
/// [`injectable!`](crate::injectable).
pub trait Injectable {
    fn inject(&mut self, fields: &mut FieldInjector<'_>) -> Result<(), InjectError>;
}

impl<T: Injectable + ?Sized> Injectable for Box<T> {
    fn inject(&mut self, fields: &mut FieldInjector<'_>) -> Result<(), InjectError> {
        (**self).inject(fields)
    }
}

/// Field types that can receive a resolved value
pub trait InjectSlot {
    /// Key the field is resolved by
    fn key() -> TypeKey;

    fn fill(&mut self, value: &Value) -> Result<(), InjectError>;
}

impl<T: ?Sized + Send + Sync + 'static> InjectSlot for Option<Arc<T>> {
    fn key() -> TypeKey {
        TypeKey::of::<T>()
    }

    fn fill(&mut self, value: &Value) -> Result<(), InjectError> {
        *self = Some(value.try_downcast::<T>()?);
        Ok(())
    }
}

impl<T: ?Sized + Send + Sync + 'static> InjectSlot for Arc<T> {
    fn key() -> TypeKey {
        TypeKey::of::<T>()
    }

    fn fill(&mut self, value: &Value) -> Result<(), InjectError> {
        *self = value.try_downcast::<T>()?;
        Ok(())
    }
}

/// Resolves and assigns the fields an [`Injectable`] lists
pub struct FieldInjector<'a> {
    resolver: &'a mut dyn Resolve,
    target: &'static str,
    injected: usize,
}

impl<'a> FieldInjector<'a> {
    pub(crate) fn new(resolver: &'a mut dyn Resolve, target: &'static str) -> Self {
        Self {
            resolver,
            target,
            injected: 0,
        }
    }

    /// Resolve the field's type and assign it.
    ///
    /// Fails with `MissingDependency` when nothing provides the type; fields
    /// assigned before the failure keep their new values.
    pub fn field<S: InjectSlot>(&mut self, name: &'static str, slot: &mut S) -> Result<(), InjectError> {
        let key = S::key();
        let value = self
            .resolver
            .resolve_key(&key)?
            .ok_or(InjectError::MissingDependency {
                key,
                required_by: None,
            })?;
        slot.fill(&value)?;
        self.injected += 1;
        debug!(owner = self.target, field = name, key = %key, "Injected field");
        Ok(())
    }

    pub fn injected(&self) -> usize {
        self.injected
    }
}

pub(crate) fn apply_to<R, T>(resolver: &mut R, target: &mut T) -> Result<(), InjectError>
where
    R: Resolve,
    T: Injectable + ?Sized,
{
    let mut fields = FieldInjector::new(resolver, std::any::type_name::<T>());
    target.inject(&mut fields)
}

/// Implement [`Injectable`] for a struct by listing the fields to inject.
///
/// Listed fields must be `Option<Arc<T>>` or `Arc<T>`; everything else in
/// the struct is left alone.
///
/// ```rust
/// use depinject::{injectable, Injector};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Handler {
///     greeting: Option<Arc<String>>,
///     fallback: Option<Arc<String>>,
/// }
///
/// injectable!(Handler { greeting });
///
/// let mut injector = Injector::new();
/// injector.map(String::from("hello"));
///
/// let mut handler = Handler::default();
/// injector.apply(&mut handler).unwrap();
/// assert_eq!(handler.greeting.as_deref().map(String::as_str), Some("hello"));
/// assert!(handler.fallback.is_none());
/// ```
#[macro_export]
macro_rules! injectable {
    ($target:ty { $($field:ident),* $(,)? }) => {
        impl $crate::Injectable for $target {
            #[allow(unused_variables)]
            fn inject(
                &mut self,
                fields: &mut $crate::FieldInjector<'_>,
            ) -> ::std::result::Result<(), $crate::InjectError> {
                $( fields.field(stringify!($field), &mut self.$field)?; )*
                Ok(())
            }
        }
    };
}

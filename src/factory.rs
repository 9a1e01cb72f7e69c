use crate::errors::InjectError;
use crate::type_key::TypeKey;
use crate::value::Value;
use std::fmt;
use std::slice::Iter;
use std::sync::Arc;

type FactoryFn = dyn Fn(&[Value]) -> Result<Value, InjectError> + Send + Sync;

/// A registered callable producing the value for one type.
///
/// The parameter keys are resolved by the registry, in declaration order,
/// before the factory is called.
pub struct Factory {
    output: TypeKey,
    params: Vec<TypeKey>,
    call: Box<FactoryFn>,
}

impl Factory {
    /// Build a factory from a closure taking `Arc`-wrapped dependencies
    ///
    /// # Example
    ///
    /// ```rust
    /// use depinject::Factory;
    /// use std::sync::Arc;
    ///
    /// let factory = Factory::new(|port: Arc<u16>| Arc::new(format!("localhost:{port}")));
    /// assert_eq!(factory.params().len(), 1);
    /// ```
    pub fn new<Args, F: IntoFactory<Args>>(f: F) -> Self {
        f.into_factory()
    }

    /// Build a factory whose signature is only known at runtime
    pub fn from_fn(
        output: TypeKey,
        params: Vec<TypeKey>,
        call: impl Fn(&[Value]) -> Result<Value, InjectError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            output,
            params,
            call: Box::new(call),
        }
    }

    pub fn output(&self) -> TypeKey {
        self.output
    }

    pub fn params(&self) -> &[TypeKey] {
        &self.params
    }

    /// Call the factory with already resolved arguments
    pub fn call(&self, args: &[Value]) -> Result<Value, InjectError> {
        if args.len() != self.params.len() {
            return Err(InjectError::ArityMismatch {
                output: self.output,
                expected: self.params.len(),
                found: args.len(),
            });
        }
        (self.call)(args)
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("output", &self.output)
            .field("params", &self.params)
            .finish()
    }
}

/// Conversion of a closure into a [`Factory`].
///
/// Implemented for `Fn(Arc<A1>, ..., Arc<An>) -> Arc<Out>` with up to eight
/// parameters. `Args` is the tuple of parameter types and only disambiguates
/// the arities.
pub trait IntoFactory<Args> {
    fn into_factory(self) -> Factory;
}

/// Pull the next argument and downcast it to the declared parameter type
pub(crate) fn take_arg<T: ?Sized + 'static>(args: &mut Iter<'_, Value>) -> Result<Arc<T>, InjectError> {
    let value = args.next().ok_or_else(InjectError::missing::<T>)?;
    value.try_downcast::<T>()
}

macro_rules! impl_into_factory {
    ($($arg:ident),*) => {
        impl<Func, Out, $($arg,)*> IntoFactory<($(Arc<$arg>,)*)> for Func
        where
            Func: Fn($(Arc<$arg>),*) -> Arc<Out> + Send + Sync + 'static,
            Out: ?Sized + Send + Sync + 'static,
            $($arg: ?Sized + Send + Sync + 'static,)*
        {
            fn into_factory(self) -> Factory {
                Factory {
                    output: TypeKey::of::<Out>(),
                    params: vec![$(TypeKey::of::<$arg>()),*],
                    call: Box::new(move |args: &[Value]| -> Result<Value, InjectError> {
                        #[allow(unused_mut, unused_variables)]
                        let mut args = args.iter();
                        Ok(Value::from_arc(self($(take_arg::<$arg>(&mut args)?),*)))
                    }),
                }
            }
        }
    };
}

impl_into_factory!();
impl_into_factory!(A1);
impl_into_factory!(A1, A2);
impl_into_factory!(A1, A2, A3);
impl_into_factory!(A1, A2, A3, A4);
impl_into_factory!(A1, A2, A3, A4, A5);
impl_into_factory!(A1, A2, A3, A4, A5, A6);
impl_into_factory!(A1, A2, A3, A4, A5, A6, A7);
impl_into_factory!(A1, A2, A3, A4, A5, A6, A7, A8);

use crate::errors::InjectError;
use crate::factory::take_arg;
use crate::resolver::Resolve;
use crate::type_key::TypeKey;
use crate::value::Value;
use std::sync::Arc;
use tracing::debug;

/// A callable whose parameters can be supplied by type.
///
/// Implemented for `FnOnce(Arc<A1>, ..., Arc<An>) -> R` with up to eight
/// parameters.
pub trait Invocable<Args> {
    type Output;

    /// Parameter keys in declaration order
    fn parameters() -> Vec<TypeKey>;

    fn call_with(self, args: &[Value]) -> Result<Self::Output, InjectError>;
}

macro_rules! impl_invocable {
    ($($arg:ident),*) => {
        impl<Func, Ret, $($arg,)*> Invocable<($(Arc<$arg>,)*)> for Func
        where
            Func: FnOnce($(Arc<$arg>),*) -> Ret,
            $($arg: ?Sized + Send + Sync + 'static,)*
        {
            type Output = Ret;

            fn parameters() -> Vec<TypeKey> {
                vec![$(TypeKey::of::<$arg>()),*]
            }

            #[allow(unused_mut, unused_variables)]
            fn call_with(self, args: &[Value]) -> Result<Ret, InjectError> {
                let mut args = args.iter();
                Ok(self($(take_arg::<$arg>(&mut args)?),*))
            }
        }
    };
}

impl_invocable!();
impl_invocable!(A1);
impl_invocable!(A1, A2);
impl_invocable!(A1, A2, A3);
impl_invocable!(A1, A2, A3, A4);
impl_invocable!(A1, A2, A3, A4, A5);
impl_invocable!(A1, A2, A3, A4, A5, A6);
impl_invocable!(A1, A2, A3, A4, A5, A6, A7);
impl_invocable!(A1, A2, A3, A4, A5, A6, A7, A8);

/// Resolve every key in order; the first miss aborts with `MissingDependency`
fn resolve_all<R: Resolve + ?Sized>(resolver: &mut R, params: &[TypeKey]) -> Result<Vec<Value>, InjectError> {
    params
        .iter()
        .map(|param| {
            resolver
                .resolve_key(param)?
                .ok_or(InjectError::MissingDependency {
                    key: *param,
                    required_by: None,
                })
        })
        .collect()
}

pub(crate) fn invoke_with<R, Args, F>(resolver: &mut R, f: F) -> Result<F::Output, InjectError>
where
    R: Resolve + ?Sized,
    F: Invocable<Args>,
{
    let params = F::parameters();
    let args = resolve_all(resolver, &params)?;
    debug!(
        callable = std::any::type_name::<F>(),
        params = params.len(),
        "Invoking with resolved arguments"
    );
    f.call_with(&args)
}

pub(crate) fn invoke_value_with<R: Resolve + ?Sized>(resolver: &mut R, target: &Value) -> Result<Value, InjectError> {
    let factory = target
        .as_factory()
        .ok_or(InjectError::NotCallable(target.key()))?;
    let args = resolve_all(resolver, factory.params())?;
    debug!(output = %factory.output(), "Invoking callable value");
    factory.call(&args)
}

use crate::errors::InjectError;
use crate::factory::Factory;
use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Broad classification of a type key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Any sized (or non-trait-object) type
    Concrete,
    /// A `dyn Trait` object type, satisfied by concrete types implementing it
    Interface,
    /// The [`Factory`] type itself
    Callable,
}

/// Runtime identity of a type, used as the sole registry lookup key.
///
/// Two keys are equal iff they denote the same type. The type name and kind
/// are carried for diagnostics and for deciding when the interface scan runs.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
    kind: TypeKind,
}

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        let id = TypeId::of::<T>();
        let name = std::any::type_name::<T>();
        let kind = if id == TypeId::of::<Factory>() {
            TypeKind::Callable
        } else if is_trait_object::<T>(name) {
            TypeKind::Interface
        } else {
            TypeKind::Concrete
        };
        Self { id, name, kind }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    pub fn is_callable(&self) -> bool {
        self.kind == TypeKind::Callable
    }
}

// Trait objects are the only `'static` types whose references are fat
// pointers and whose name is spelled `dyn ...`.
fn is_trait_object<T: ?Sized>(name: &str) -> bool {
    std::mem::size_of::<&T>() > std::mem::size_of::<&()>() && name.starts_with("dyn ")
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Returns the key of the interface type `I`.
///
/// This is the type witness used by [`Injector::map_to`](crate::Injector::map_to)
/// and [`Injector::implements`](crate::Injector::implements).
///
/// # Panics
///
/// Panics if `I` is not a trait object type such as `dyn Logger`.
pub fn interface_of<I: ?Sized + 'static>() -> TypeKey {
    match try_interface_of::<I>() {
        Ok(key) => key,
        Err(err) => panic!("interface_of called with a non-interface type: {err}"),
    }
}

/// Non-panicking form of [`interface_of`]
pub fn try_interface_of<I: ?Sized + 'static>() -> Result<TypeKey, InjectError> {
    let key = TypeKey::of::<I>();
    if key.is_interface() {
        Ok(key)
    } else {
        Err(InjectError::NotAnInterface(key.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Speaker: Send + Sync {}

    #[test]
    fn test_kinds() {
        assert_eq!(TypeKey::of::<i32>().kind(), TypeKind::Concrete);
        assert_eq!(TypeKey::of::<String>().kind(), TypeKind::Concrete);
        assert_eq!(TypeKey::of::<str>().kind(), TypeKind::Concrete);
        assert_eq!(TypeKey::of::<[u8]>().kind(), TypeKind::Concrete);
        assert_eq!(TypeKey::of::<dyn Speaker>().kind(), TypeKind::Interface);
        assert_eq!(TypeKey::of::<Factory>().kind(), TypeKind::Callable);
    }

    #[test]
    fn test_trait_objects_with_auto_traits_are_interfaces() {
        assert_eq!(TypeKey::of::<dyn Speaker + Send>().kind(), TypeKind::Interface);
        assert_eq!(TypeKey::of::<dyn Speaker + Send + Sync>().kind(), TypeKind::Interface);
        assert_eq!(TypeKey::of::<dyn std::fmt::Debug + Send>().kind(), TypeKind::Interface);
        assert!(TypeKey::of::<dyn Speaker + Send>().name().starts_with("dyn "));

        // fat pointers that are not trait objects, and sized wrappers of them
        assert_eq!(TypeKey::of::<[u32]>().kind(), TypeKind::Concrete);
        assert_eq!(TypeKey::of::<Box<dyn Speaker + Send>>().kind(), TypeKind::Concrete);
        assert_eq!(TypeKey::of::<&'static dyn Speaker>().kind(), TypeKind::Concrete);
    }

    #[test]
    fn test_equality_follows_type_identity() {
        assert_eq!(TypeKey::of::<u8>(), TypeKey::of::<u8>());
        assert_ne!(TypeKey::of::<u8>(), TypeKey::of::<u16>());
        assert_ne!(TypeKey::of::<dyn Speaker>(), TypeKey::of::<Box<dyn Speaker>>());
    }

    #[test]
    fn test_interface_witness() {
        let key = interface_of::<dyn Speaker>();
        assert!(key.is_interface());
        assert!(key.name().contains("Speaker"));

        let err = try_interface_of::<String>().unwrap_err();
        assert!(matches!(err, InjectError::NotAnInterface(_)));
    }

    #[test]
    #[should_panic(expected = "non-interface")]
    fn test_interface_witness_rejects_concrete_type() {
        interface_of::<Vec<u8>>();
    }
}

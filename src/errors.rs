use crate::resolver::ResolutionChain;
use crate::type_key::TypeKey;
use thiserror::Error;

/// Error type for registry resolution, application and invocation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InjectError {
    /// No value, factory, interface implementor or parent entry for the type
    #[error("value not found for type {key}{}", required_by_suffix(.required_by))]
    MissingDependency {
        key: TypeKey,
        required_by: Option<TypeKey>,
    },

    /// A factory graph revisits a type already under construction
    #[error("dependency loop detected: {chain}")]
    DependencyLoop { chain: ResolutionChain },

    /// More than one registered value satisfies the requested interface
    #[error("ambiguous interface {interface}: satisfied by {}", join_keys(.candidates))]
    AmbiguousInterface {
        interface: TypeKey,
        candidates: Vec<TypeKey>,
    },

    /// A stored value does not have the type its key promises
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: TypeKey, found: TypeKey },

    /// A factory was called with the wrong number of arguments
    #[error("factory for {output} expects {expected} arguments, got {found}")]
    ArityMismatch {
        output: TypeKey,
        expected: usize,
        found: usize,
    },

    /// Invocation target is not a factory
    #[error("value of type {0} is not callable")]
    NotCallable(TypeKey),

    /// Type witness does not name an interface
    #[error("{0} is not an interface type")]
    NotAnInterface(&'static str),

    /// Factory chain grew past the configured limit
    #[error("resolution exceeded {limit} nested factories: {chain}")]
    ResolutionTooDeep {
        limit: usize,
        chain: ResolutionChain,
    },
}

fn required_by_suffix(required_by: &Option<TypeKey>) -> String {
    match required_by {
        Some(owner) => format!(" (required by {})", owner),
        None => String::new(),
    }
}

fn join_keys(keys: &[TypeKey]) -> String {
    keys.iter()
        .map(|key| key.name())
        .collect::<Vec<_>>()
        .join(", ")
}

impl InjectError {
    /// Create a missing dependency error
    pub fn missing<T: ?Sized + 'static>() -> Self {
        InjectError::MissingDependency {
            key: TypeKey::of::<T>(),
            required_by: None,
        }
    }

    /// Create a type mismatch error for a value found under the wrong type
    pub fn mismatch<T: ?Sized + 'static>(found: TypeKey) -> Self {
        InjectError::TypeMismatch {
            expected: TypeKey::of::<T>(),
            found,
        }
    }

    /// Key this error is about, if any
    pub fn key(&self) -> Option<TypeKey> {
        match self {
            InjectError::MissingDependency { key, .. } => Some(*key),
            InjectError::AmbiguousInterface { interface, .. } => Some(*interface),
            InjectError::TypeMismatch { expected, .. } => Some(*expected),
            InjectError::ArityMismatch { output, .. } => Some(*output),
            InjectError::NotCallable(key) => Some(*key),
            InjectError::DependencyLoop { chain } | InjectError::ResolutionTooDeep { chain, .. } => {
                chain.last_requested()
            }
            InjectError::NotAnInterface(_) => None,
        }
    }
}

/// Errors raised while loading [`InjectorOptions`](crate::InjectorOptions)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid injector configuration: {0}")]
    Parse(String),
}

use crate::{InjectError, Injector, TypeKey};
use std::sync::Arc;

#[test]
fn test_missing_dependency_display() {
    let err = InjectError::missing::<u32>();
    assert_eq!(err.to_string(), "value not found for type u32");

    let err = InjectError::MissingDependency {
        key: TypeKey::of::<u32>(),
        required_by: Some(TypeKey::of::<String>()),
    };
    assert_eq!(
        err.to_string(),
        "value not found for type u32 (required by alloc::string::String)"
    );
}

#[test]
fn test_mismatch_helper() {
    let err = InjectError::mismatch::<u8>(TypeKey::of::<i8>());
    assert_eq!(err.to_string(), "type mismatch: expected u8, found i8");
    assert_eq!(err.key(), Some(TypeKey::of::<u8>()));
}

#[test]
fn test_ambiguous_display_lists_candidates() {
    let err = InjectError::AmbiguousInterface {
        interface: TypeKey::of::<dyn std::fmt::Debug + Send + Sync>(),
        candidates: vec![TypeKey::of::<u8>(), TypeKey::of::<u16>()],
    };
    let message = err.to_string();
    assert!(message.starts_with("ambiguous interface dyn core::fmt::Debug"));
    assert!(message.ends_with("satisfied by u8, u16"));
}

#[test]
fn test_not_callable_and_arity_display() {
    assert_eq!(
        InjectError::NotCallable(TypeKey::of::<bool>()).to_string(),
        "value of type bool is not callable"
    );
    assert_eq!(
        InjectError::ArityMismatch {
            output: TypeKey::of::<u8>(),
            expected: 2,
            found: 1,
        }
        .to_string(),
        "factory for u8 expects 2 arguments, got 1"
    );
}

#[test]
fn test_loop_error_message_shows_chain() {
    #[derive(Debug)]
    struct Left;
    struct Right;

    let mut injector = Injector::new();
    injector.provide(|_r: Arc<Right>| Arc::new(Left));
    injector.provide(|_l: Arc<Left>| Arc::new(Right));

    let err = injector.resolve::<Left>().unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("dependency loop detected: "));
    assert!(message.contains("Left -> "));
    assert!(message.ends_with("Left"));
    assert_eq!(err.key().map(|key| key.name().ends_with("Left")), Some(true));
}

#[test]
fn test_not_an_interface_has_no_key() {
    let err = crate::try_interface_of::<u8>().unwrap_err();
    assert_eq!(err, InjectError::NotAnInterface("u8"));
    assert_eq!(err.key(), None);
    assert_eq!(err.to_string(), "u8 is not an interface type");
}

#[test]
fn test_errors_compare_by_value() {
    assert_eq!(InjectError::missing::<u8>(), InjectError::missing::<u8>());
    assert_ne!(InjectError::missing::<u8>(), InjectError::missing::<u16>());
    let cloned = InjectError::NotCallable(TypeKey::of::<u8>()).clone();
    assert_eq!(cloned, InjectError::NotCallable(TypeKey::of::<u8>()));
}

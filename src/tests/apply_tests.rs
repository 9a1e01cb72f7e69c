use crate::{injectable, FieldInjector, InjectError, Injectable, Injector, TypeKey};
use std::sync::Arc;

trait Store: Send + Sync {
    fn name(&self) -> &str;
}

struct MemoryStore;

impl Store for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }
}

#[derive(Debug, PartialEq)]
struct Timeout(u64);

#[derive(Default)]
struct Service {
    label: Option<Arc<String>>,
    store: Option<Arc<dyn Store>>,
    timeout: Option<Arc<Timeout>>,
    untouched: Option<Arc<String>>,
    retries: u32,
}

injectable!(Service { label, store, timeout });

#[test]
fn test_apply_fills_listed_fields() {
    let mut injector = Injector::new();
    injector
        .map(String::from("api"))
        .map(Timeout(30))
        .map_to::<dyn Store>(Arc::new(MemoryStore));

    let mut service = Service {
        retries: 3,
        ..Default::default()
    };
    injector.apply(&mut service).unwrap();

    assert_eq!(service.label.as_deref().map(String::as_str), Some("api"));
    assert_eq!(service.store.as_ref().map(|s| s.name()), Some("memory"));
    assert_eq!(service.timeout.as_deref(), Some(&Timeout(30)));
    assert!(service.untouched.is_none());
    assert_eq!(service.retries, 3);
}

#[test]
fn test_apply_missing_field_keeps_earlier_assignments() {
    let mut injector = Injector::new();
    injector.map(String::from("api"));

    let mut service = Service::default();
    let err = injector.apply(&mut service).unwrap_err();

    assert_eq!(
        err,
        InjectError::MissingDependency {
            key: TypeKey::of::<dyn Store>(),
            required_by: None,
        }
    );
    assert!(service.label.is_some());
    assert!(service.store.is_none());
    assert!(service.timeout.is_none());
}

#[test]
fn test_apply_resolves_factories() {
    let mut injector = Injector::new();
    injector
        .map(Timeout(5))
        .provide(|timeout: Arc<Timeout>| Arc::new(format!("timeout={}", timeout.0)))
        .provide(|| Arc::new(MemoryStore) as Arc<dyn Store>);

    let mut service = Service::default();
    injector.apply(&mut service).unwrap();

    assert_eq!(service.label.as_deref().map(String::as_str), Some("timeout=5"));
    assert!(injector.contains(&TypeKey::of::<String>()));
    assert_eq!(injector.factory_count(), 2);
}

#[test]
fn test_apply_arc_slot_and_boxed_target() {
    struct Worker {
        timeout: Arc<Timeout>,
    }

    injectable!(Worker { timeout });

    let mut injector = Injector::new();
    injector.map(Timeout(10));

    let mut worker = Box::new(Worker {
        timeout: Arc::new(Timeout(0)),
    });
    injector.apply(&mut worker).unwrap();
    assert_eq!(*worker.timeout, Timeout(10));
}

#[test]
fn test_apply_with_no_listed_fields() {
    #[derive(Default)]
    struct Plain {
        value: Option<Arc<String>>,
    }

    injectable!(Plain {});

    let mut injector = Injector::new();
    injector.map(String::from("ignored"));

    let mut plain = Plain::default();
    injector.apply(&mut plain).unwrap();
    assert!(plain.value.is_none());
}

#[test]
fn test_manual_injectable_counts_fields() {
    struct Counted {
        first: Option<Arc<u8>>,
        second: Option<Arc<u16>>,
        seen: usize,
    }

    impl Injectable for Counted {
        fn inject(&mut self, fields: &mut FieldInjector<'_>) -> Result<(), InjectError> {
            fields.field("first", &mut self.first)?;
            fields.field("second", &mut self.second)?;
            self.seen = fields.injected();
            Ok(())
        }
    }

    let mut injector = Injector::new();
    injector.map(1u8).map(2u16);

    let mut counted = Counted {
        first: None,
        second: None,
        seen: 0,
    };
    injector.apply(&mut counted).unwrap();

    assert_eq!(counted.first.as_deref(), Some(&1));
    assert_eq!(counted.second.as_deref(), Some(&2));
    assert_eq!(counted.seen, 2);
}

#[test]
fn test_apply_through_frozen_injector() {
    let mut injector = Injector::new();
    injector
        .map(Timeout(1))
        .map_to::<dyn Store>(Arc::new(MemoryStore))
        .provide(|| Arc::new(String::from("frozen")));
    let frozen = injector.freeze().unwrap();

    let mut service = Service::default();
    frozen.apply(&mut service).unwrap();
    assert_eq!(service.label.as_deref().map(String::as_str), Some("frozen"));
}

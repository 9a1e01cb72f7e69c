//! Shared fixtures for integration tests
//!
//! A small service graph: a `Repository` interface with one concrete
//! implementation, a `Settings` leaf value and a `UserService` built from
//! both by a factory.

#![allow(dead_code)]

use depinject::{injectable, Injector};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub trait Repository: Send + Sync {
    fn find(&self, id: u32) -> Option<String>;
}

#[derive(Debug)]
pub struct InMemoryRepository {
    pub users: Vec<String>,
}

impl Repository for InMemoryRepository {
    fn find(&self, id: u32) -> Option<String> {
        self.users.get(id as usize).cloned()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub greeting: String,
}

pub struct UserService {
    pub settings: Arc<Settings>,
    pub repository: Arc<dyn Repository>,
}

impl UserService {
    pub fn greet(&self, id: u32) -> Option<String> {
        self.repository
            .find(id)
            .map(|name| format!("{}, {}", self.settings.greeting, name))
    }
}

#[derive(Default)]
pub struct Controller {
    pub service: Option<Arc<UserService>>,
    pub settings: Option<Arc<Settings>>,
    pub requests: usize,
}

injectable!(Controller { service, settings });

pub fn repository() -> Arc<dyn Repository> {
    Arc::new(InMemoryRepository {
        users: vec!["ada".to_string(), "grace".to_string()],
    })
}

/// Injector holding settings, the repository interface and a counted
/// `UserService` factory
pub fn service_injector(builds: Arc<AtomicUsize>) -> Injector {
    let mut injector = Injector::new();
    injector
        .map(Settings {
            greeting: "hello".to_string(),
        })
        .map_to::<dyn Repository>(repository())
        .provide(move |settings: Arc<Settings>, repository: Arc<dyn Repository>| {
            builds.fetch_add(1, Ordering::SeqCst);
            Arc::new(UserService {
                settings,
                repository,
            })
        });
    injector
}

pub fn build_count(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}

//! Runtime dependency-resolution registry.
//!
//! An [`Injector`] maps [`TypeKey`]s to concrete instances or to factories
//! producing them, and uses that mapping to:
//! - populate the marked fields of a struct ([`Injector::apply`])
//! - call a function with its parameters supplied by type ([`Injector::invoke`])
//! - lazily build dependency graphs from factories, memoizing every product
//!   and rejecting cycles ([`Injector::get`])
//!
//! Lookups fall back to interface implementors declared with
//! [`Injector::implements`] and then to an optional parent registry
//! (see [`ParentRegistry`]).

pub mod apply;
pub mod config;
pub mod errors;
pub mod factory;
pub mod frozen;
pub mod injector;
pub mod invoke;
pub mod metrics;
pub mod parent;
pub mod resolver;
mod store;
pub mod type_key;
pub mod value;

#[cfg(test)]
mod tests;

pub use apply::{FieldInjector, InjectSlot, Injectable};
pub use config::{InjectorOptions, InterfaceResolution, OptionOverrides};
pub use errors::{ConfigError, InjectError};
pub use factory::{Factory, IntoFactory};
pub use frozen::FrozenInjector;
pub use injector::Injector;
pub use invoke::Invocable;
pub use metrics::{MetricsSnapshot, ResolutionMetrics};
pub use parent::ParentRegistry;
pub use resolver::{ChainLink, Resolve, ResolutionChain};
pub use type_key::{interface_of, try_interface_of, TypeKey, TypeKind};
pub use value::Value;

//! Lazy ghost and lazy virtual proxy source generator for PHP classes.
//!
//! Given reflection metadata about a class, the generator emits the PHP
//! source of a subclass that defers initialization (a ghost) or forwards
//! calls to a lazily created real instance (a virtual proxy).

pub mod config;
pub mod export;
pub mod generator;
pub mod reflection;
pub mod tracing_config;

pub use config::GeneratorConfig;
pub use generator::{GeneratedClass, Ineligibility, LazyKind, LazyProxyGenerator, ProxyError};
pub use reflection::{ClassDescriptor, ClassRegistry, ReflectionProvider};

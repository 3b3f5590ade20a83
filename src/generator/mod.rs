//! Lazy class generation
//!
//! Produces the PHP source of lazy ghosts and lazy virtual proxies for a
//! class described by a [`ReflectionProvider`]. The result is the part of a
//! class declaration that follows its name; callers choose the name and
//! embed the text in their own generated files.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let registry = ClassRegistry::from_json(json)?;
//! let generator = LazyProxyGenerator::new(&registry);
//! let ghost = generator.generate_lazy_ghost_for("App\\Mailer")?;
//! println!("{}", ghost.declare("MailerGhost"));
//! ```

pub mod error;
pub mod ghost;
pub mod proxy;
pub mod templates;

pub use error::{Ineligibility, LazyKind, ProxyError};

use crate::config::GeneratorConfig;
use crate::export::property_scopes::{
    InheritedPropertyScopes, PropertyScopeCache, PropertyScopeSupplier, PropertyScopes,
};
use crate::reflection::{ClassDescriptor, ReflectionProvider};
use std::fmt;
use std::sync::Arc;

/// Generated class text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedClass {
    /// Declare the class `readonly`.
    pub readonly: bool,
    /// Everything after `class Name`: `extends`/`implements` clauses, the
    /// body, and trailing preload hints.
    pub body: String,
}

impl GeneratedClass {
    /// Complete declaration for a class called `name`.
    pub fn declare(&self, name: &str) -> String {
        format!(
            "{}class {}{}",
            if self.readonly { "readonly " } else { "" },
            name,
            self.body
        )
    }
}

impl fmt::Display for GeneratedClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.body)
    }
}

/// Generator for lazy ghosts and lazy virtual proxies
pub struct LazyProxyGenerator<'a> {
    provider: &'a dyn ReflectionProvider,
    scopes: Box<dyn PropertyScopeSupplier + 'a>,
    cache: Arc<PropertyScopeCache>,
    config: GeneratorConfig,
}

impl<'a> LazyProxyGenerator<'a> {
    pub fn new(provider: &'a dyn ReflectionProvider) -> Self {
        Self {
            provider,
            scopes: Box::new(InheritedPropertyScopes::new(provider)),
            cache: Arc::new(PropertyScopeCache::new()),
            config: GeneratorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the property scope source. Already cached classes keep their
    /// previous scopes.
    pub fn with_scope_supplier(mut self, scopes: Box<dyn PropertyScopeSupplier + 'a>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Share a scope cache with other generators.
    pub fn with_cache(mut self, cache: Arc<PropertyScopeCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &Arc<PropertyScopeCache> {
        &self.cache
    }

    fn property_scopes(&self, class: &str) -> Arc<PropertyScopes> {
        self.cache
            .get_or_insert_with(class, || self.scopes.property_scopes(class))
    }

    fn lookup(&self, kind: LazyKind, name: &str) -> Result<&'a ClassDescriptor, ProxyError> {
        self.provider
            .get_class(name)
            .ok_or_else(|| ProxyError::ClassNotFound {
                kind,
                class: crate::reflection::normalize_class_name(name).to_string(),
            })
    }

    /// Look up `class` and generate its ghost.
    pub fn generate_lazy_ghost_for(&self, class: &str) -> Result<GeneratedClass, ProxyError> {
        let class = self.lookup(LazyKind::Ghost, class)?;
        self.generate_lazy_ghost(class)
    }

    /// Look up `class` and `interfaces` and generate their proxy.
    pub fn generate_lazy_proxy_for(
        &self,
        class: Option<&str>,
        interfaces: &[&str],
    ) -> Result<GeneratedClass, ProxyError> {
        let class = class
            .map(|name| self.lookup(LazyKind::Proxy, name))
            .transpose()?;
        let interfaces = interfaces
            .iter()
            .map(|name| self.lookup(LazyKind::Proxy, name))
            .collect::<Result<Vec<_>, _>>()?;
        self.generate_lazy_proxy(class, &interfaces)
    }
}

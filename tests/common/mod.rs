//! Common test helpers for generator tests
//!
//! Builds registries from inline JSON and runs the generators against them,
//! so each test only has to spell out the classes it cares about.

use php_lazy_proxy::{ClassRegistry, GeneratedClass, LazyProxyGenerator, ProxyError};

/// Build a registry from a JSON array of class descriptors.
///
/// Panics if the JSON is invalid.
pub fn registry(json: &str) -> ClassRegistry {
    ClassRegistry::from_json(json).expect("invalid class descriptors")
}

/// Generate a ghost for `class` using the default configuration.
#[allow(dead_code)]
pub fn ghost(json: &str, class: &str) -> Result<GeneratedClass, ProxyError> {
    let registry = registry(json);
    LazyProxyGenerator::new(&registry).generate_lazy_ghost_for(class)
}

/// Generate a proxy for `class` and `interfaces` using the default configuration.
#[allow(dead_code)]
pub fn proxy(
    json: &str,
    class: Option<&str>,
    interfaces: &[&str],
) -> Result<GeneratedClass, ProxyError> {
    let registry = registry(json);
    LazyProxyGenerator::new(&registry).generate_lazy_proxy_for(class, interfaces)
}

/// Text of the method block whose header contains `function name(`.
///
/// Panics when the method is missing.
#[allow(dead_code)]
pub fn method_block<'a>(body: &'a str, name: &str) -> &'a str {
    let needle = format!("function {}(", name);
    let start = body
        .find(&needle)
        .unwrap_or_else(|| panic!("method {} not generated in:\n{}", name, body));
    let start = body[..start].rfind('\n').map_or(0, |i| i + 1);
    let end = body[start..]
        .find("\n    }")
        .map_or(body.len(), |i| start + i + "\n    }".len());
    &body[start..end]
}

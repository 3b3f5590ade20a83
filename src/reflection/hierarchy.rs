//! Inheritance graph navigation
//!
//! Walks parent chains and interface sets through a [`ReflectionProvider`],
//! mirroring how the engine resolves inherited members.
//! Reference: $PHP_SRC_PATH/Zend/zend_inheritance.c

use super::{ClassDescriptor, MethodDescriptor, ReflectionProvider};
use std::collections::HashSet;

/// Parent chain of `class`, nearest first. Unknown parents end the chain.
pub fn ancestors<'a>(
    provider: &'a dyn ReflectionProvider,
    class: &ClassDescriptor,
) -> Vec<&'a ClassDescriptor> {
    let mut chain = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(class.name.to_ascii_lowercase());

    let mut next = class.parent.clone();
    while let Some(name) = next {
        let Some(parent) = provider.get_class(&name) else {
            break;
        };
        if !seen.insert(parent.name.to_ascii_lowercase()) {
            break;
        }
        chain.push(parent);
        next = parent.parent.clone();
    }
    chain
}

/// Every interface implemented by `class` or its ancestors, including
/// interfaces those interfaces extend. `class` itself is not included.
pub fn all_interfaces<'a>(
    provider: &'a dyn ReflectionProvider,
    class: &ClassDescriptor,
) -> Vec<&'a ClassDescriptor> {
    let mut pending: Vec<String> = class.interfaces.clone();
    for ancestor in ancestors(provider, class) {
        pending.extend(ancestor.interfaces.iter().cloned());
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut result = Vec::new();
    let mut i = 0;
    while i < pending.len() {
        let name = pending[i].clone();
        i += 1;
        let Some(iface) = provider.get_class(&name) else {
            continue;
        };
        if !seen.insert(iface.name.to_ascii_lowercase()) {
            continue;
        }
        pending.extend(iface.interfaces.iter().cloned());
        result.push(iface);
    }
    result
}

/// Whether `class` is `type_name` or one of its subtypes.
pub fn is_a(provider: &dyn ReflectionProvider, class: &ClassDescriptor, type_name: &str) -> bool {
    let type_name = super::normalize_class_name(type_name);
    if class.name.eq_ignore_ascii_case(type_name) {
        return true;
    }
    ancestors(provider, class)
        .iter()
        .chain(all_interfaces(provider, class).iter())
        .any(|c| c.name.eq_ignore_ascii_case(type_name))
}

/// Resolve a method by name the way `ReflectionClass::getMethod()` does.
pub fn find_method<'a>(
    provider: &'a dyn ReflectionProvider,
    class: &'a ClassDescriptor,
    name: &str,
) -> Option<&'a MethodDescriptor> {
    if let Some(m) = class.declared_method(name) {
        return Some(m);
    }
    ancestors(provider, class)
        .into_iter()
        .chain(all_interfaces(provider, class))
        .find_map(|c| c.declared_method(name))
}

/// All methods of `class`, declared first, then inherited ones that are not
/// overridden, then methods only known through interfaces.
///
/// Private methods of ancestors are not inherited and are left out.
pub fn collect_methods<'a>(
    provider: &'a dyn ReflectionProvider,
    class: &'a ClassDescriptor,
) -> Vec<&'a MethodDescriptor> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut methods = Vec::new();

    for m in &class.methods {
        if seen.insert(m.name.to_ascii_lowercase()) {
            methods.push(m);
        }
    }
    for ancestor in ancestors(provider, class) {
        for m in ancestor.methods.iter().filter(|m| !m.is_private()) {
            if seen.insert(m.name.to_ascii_lowercase()) {
                methods.push(m);
            }
        }
    }
    for iface in all_interfaces(provider, class) {
        for m in &iface.methods {
            if seen.insert(m.name.to_ascii_lowercase()) {
                methods.push(m);
            }
        }
    }
    methods
}

/// The declaration `method` overrides or implements, as
/// `ReflectionMethod::getPrototype()` reports it.
pub fn prototype<'a>(
    provider: &'a dyn ReflectionProvider,
    method: &MethodDescriptor,
) -> Option<&'a MethodDescriptor> {
    if method.is_private() {
        return None;
    }
    let declaring = provider.get_class(&method.declaring_class)?;
    ancestors(provider, declaring)
        .into_iter()
        .filter_map(|c| c.declared_method(&method.name))
        .find(|m| !m.is_private())
        .or_else(|| {
            all_interfaces(provider, declaring)
                .into_iter()
                .find_map(|c| c.declared_method(&method.name))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflection::ClassRegistry;

    fn registry() -> ClassRegistry {
        ClassRegistry::from_json(
            r#"[
                {"name": "Countable", "kind": "interface", "is_internal": true,
                 "methods": [{"name": "count", "is_abstract": true, "return_type": "int", "tentative_return_type": true}]},
                {"name": "App\\Sized", "kind": "interface", "interfaces": ["Countable"]},
                {"name": "App\\Base", "interfaces": ["App\\Sized"],
                 "methods": [
                    {"name": "count", "return_type": "int"},
                    {"name": "secret", "visibility": "private"}
                 ]},
                {"name": "App\\Child", "parent": "App\\Base",
                 "methods": [{"name": "COUNT", "return_type": "int"}]}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_ancestors_and_interfaces() {
        let registry = registry();
        let child = registry.get_class("App\\Child").unwrap();
        let names: Vec<_> = ancestors(&registry, child).iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["App\\Base"]);

        let ifaces: Vec<_> = all_interfaces(&registry, child)
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(ifaces, ["App\\Sized", "Countable"]);
        assert!(is_a(&registry, child, "\\countable"));
        assert!(!is_a(&registry, child, "Traversable"));
    }

    #[test]
    fn test_collect_methods_skips_overridden_and_private() {
        let registry = registry();
        let child = registry.get_class("App\\Child").unwrap();
        let methods = collect_methods(&registry, child);
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].declaring_class, "App\\Child");
    }

    #[test]
    fn test_prototype_chain() {
        let registry = registry();
        let child = registry.get_class("App\\Child").unwrap();
        let own = child.declared_method("count").unwrap();
        let proto = prototype(&registry, own).unwrap();
        assert_eq!(proto.declaring_class, "App\\Base");
        let proto = prototype(&registry, proto).unwrap();
        assert_eq!(proto.declaring_class, "Countable");
        assert!(prototype(&registry, proto).is_none());
    }
}

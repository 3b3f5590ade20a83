//! Property scopes
//!
//! A lazy object has to read and write properties of the class it stands in
//! for, including private ones declared up the inheritance chain. The scope
//! map tells the runtime which class owns each (possibly mangled) property
//! name. The generated classes embed it as `LAZY_OBJECT_PROPERTY_SCOPES`.

use crate::reflection::hierarchy::ancestors;
use crate::reflection::{PropertyDescriptor, ReflectionProvider, Visibility};
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyScope {
    /// Class declaring the property.
    pub class: String,
    /// Property name as declared.
    pub name: String,
    /// Set to the declaring class for readonly properties.
    pub readonly_scope: Option<String>,
}

/// Property key (plain or mangled) to scope.
pub type PropertyScopes = IndexMap<String, PropertyScope>;

pub trait PropertyScopeSupplier {
    fn property_scopes(&self, class: &str) -> PropertyScopes;
}

/// Builds scopes by walking the class and its ancestors through a
/// [`ReflectionProvider`].
pub struct InheritedPropertyScopes<'a> {
    provider: &'a dyn ReflectionProvider,
}

impl<'a> InheritedPropertyScopes<'a> {
    pub fn new(provider: &'a dyn ReflectionProvider) -> Self {
        Self { provider }
    }
}

impl PropertyScopeSupplier for InheritedPropertyScopes<'_> {
    fn property_scopes(&self, class_name: &str) -> PropertyScopes {
        let mut scopes = PropertyScopes::new();
        let Some(class) = self.provider.get_class(class_name) else {
            return scopes;
        };

        let owner = class.name.as_str();
        let chain = ancestors(self.provider, class);

        // Visible properties: declared ones, then inherited non-private ones
        // that are not redeclared. All are accessed through `owner`.
        let mut visible: Vec<(&str, &PropertyDescriptor)> = Vec::new();
        for (declaring, props) in std::iter::once((owner, &class.properties))
            .chain(chain.iter().map(|a| (a.name.as_str(), &a.properties)))
        {
            for prop in props.iter().filter(|p| !p.is_static) {
                if declaring != owner && prop.visibility == Visibility::Private {
                    continue;
                }
                if visible.iter().any(|(_, p)| p.name == prop.name) {
                    continue;
                }
                visible.push((declaring, prop));
            }
        }

        for (declaring, prop) in visible {
            let scope = PropertyScope {
                class: owner.to_string(),
                name: prop.name.clone(),
                readonly_scope: prop.is_readonly.then(|| declaring.to_string()),
            };
            match prop.visibility {
                Visibility::Private => {
                    scopes.insert(format!("\0{}\0{}", owner, prop.name), scope.clone());
                    scopes.insert(prop.name.clone(), scope);
                }
                Visibility::Protected => {
                    scopes.insert(prop.name.clone(), scope.clone());
                    scopes.insert(format!("\0*\0{}", prop.name), scope);
                }
                Visibility::Public => {
                    scopes.insert(prop.name.clone(), scope);
                }
            }
        }

        for ancestor in chain {
            let owner = ancestor.name.as_str();
            for prop in ancestor
                .properties
                .iter()
                .filter(|p| p.visibility == Visibility::Private && !p.is_static)
            {
                let scope = PropertyScope {
                    class: owner.to_string(),
                    name: prop.name.clone(),
                    readonly_scope: prop.is_readonly.then(|| owner.to_string()),
                };
                scopes.insert(format!("\0{}\0{}", owner, prop.name), scope.clone());
                scopes.entry(prop.name.clone()).or_insert(scope);
            }
        }

        scopes
    }
}

/// Memoized property scopes, keyed by class name.
///
/// Entries are never invalidated: the cache assumes class shapes do not
/// change for as long as it lives. Values are computed outside the lock and
/// published with a single insert, so readers never see a partial entry.
#[derive(Debug, Default)]
pub struct PropertyScopeCache {
    entries: RwLock<HashMap<String, Arc<PropertyScopes>>>,
}

impl PropertyScopeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_insert_with<F>(&self, class: &str, compute: F) -> Arc<PropertyScopes>
    where
        F: FnOnce() -> PropertyScopes,
    {
        let key = class.to_ascii_lowercase();
        if let Some(hit) = self
            .entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
        {
            return Arc::clone(hit);
        }

        let computed = Arc::new(compute());
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        Arc::clone(entries.entry(key).or_insert(computed))
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `strnatcmp()`: digit runs compare by numeric value, everything else bytewise.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if a[i].is_ascii_digit() && b[j].is_ascii_digit() {
            let start_a = i;
            while i < a.len() && a[i].is_ascii_digit() {
                i += 1;
            }
            let start_b = j;
            while j < b.len() && b[j].is_ascii_digit() {
                j += 1;
            }
            let num_a = trim_leading_zeros(&a[start_a..i]);
            let num_b = trim_leading_zeros(&b[start_b..j]);
            let ord = num_a.len().cmp(&num_b.len()).then_with(|| num_a.cmp(num_b));
            if ord != Ordering::Equal {
                return ord;
            }
            continue;
        }
        if a[i] != b[j] {
            return a[i].cmp(&b[j]);
        }
        i += 1;
        j += 1;
    }
    (a.len() - i).cmp(&(b.len() - j))
}

fn trim_leading_zeros(digits: &[u8]) -> &[u8] {
    let first = digits.iter().position(|&d| d != b'0').unwrap_or(digits.len());
    &digits[first..]
}

/// Render a PHP string literal the way `var_export()` does, splitting out NUL
/// bytes and substituting `parent::class` for the proxied class name.
fn export_key(key: &str, parent: &str) -> String {
    let mut parts = Vec::new();
    for (i, segment) in key.split('\0').enumerate() {
        if i > 0 {
            parts.push("\"\\0\"".to_string());
        }
        if !segment.is_empty() {
            parts.push(export_string(segment, parent));
        }
    }
    if parts.is_empty() {
        return "''".to_string();
    }
    parts.join(".")
}

fn export_string(value: &str, parent: &str) -> String {
    if value == parent {
        return "parent::class".to_string();
    }
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn export_scope(scope: &PropertyScope, parent: &str) -> String {
    format!(
        "[{}, {}, {}]",
        export_string(&scope.class, parent),
        export_string(&scope.name, parent),
        scope
            .readonly_scope
            .as_deref()
            .map_or_else(|| "null".to_string(), |s| export_string(s, parent))
    )
}

/// Entries of the scope map, one `key => [class, name, scope],` line each,
/// sorted by key in natural order and indented for a class body constant.
pub fn export_scope_entries(scopes: &PropertyScopes, parent: &str) -> Vec<String> {
    let mut keys: Vec<&String> = scopes.keys().collect();
    keys.sort_by(|a, b| natural_cmp(a, b));
    keys.into_iter()
        .map(|key| {
            format!(
                "        {} => {},",
                export_key(key, parent),
                export_scope(&scopes[key], parent)
            )
        })
        .collect()
}

/// The full array literal assigned to `LAZY_OBJECT_PROPERTY_SCOPES`.
pub fn export_property_scopes(scopes: &PropertyScopes, parent: &str) -> String {
    if scopes.is_empty() {
        return "[]".to_string();
    }
    let mut out = String::from("[\n");
    for line in export_scope_entries(scopes, parent) {
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str("    ]");
    out
}

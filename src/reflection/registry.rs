use super::{ClassDescriptor, ClassKind, STD_CLASS, normalize_class_name};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Source of class descriptors for the generators.
///
/// Lookups follow PHP class-name rules: case-insensitive, with an optional
/// leading namespace separator.
pub trait ReflectionProvider {
    fn get_class(&self, name: &str) -> Option<&ClassDescriptor>;

    fn class_exists(&self, name: &str) -> bool {
        self.get_class(name).is_some()
    }
}

#[derive(Debug)]
pub enum RegistryError {
    Io { path: PathBuf, source: std::io::Error },
    Json { origin: String, source: serde_json::Error },
    Walk(walkdir::Error),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Io { path, source } => {
                write!(f, "Failed to read {}: {}", path.display(), source)
            }
            RegistryError::Json { origin, source } => {
                write!(f, "Invalid class descriptors in {}: {}", origin, source)
            }
            RegistryError::Walk(e) => write!(f, "Failed to scan registry directory: {}", e),
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegistryError::Io { source, .. } => Some(source),
            RegistryError::Json { source, .. } => Some(source),
            RegistryError::Walk(e) => Some(e),
        }
    }
}

/// In-memory reflection provider.
///
/// Holds descriptors keyed by lowercase class name. `stdClass` is always
/// present as an internal class.
#[derive(Debug, Clone)]
pub struct ClassRegistry {
    classes: HashMap<String, ClassDescriptor>,
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassRegistry {
    /// Create a registry containing only the builtin sentinel class
    pub fn new() -> Self {
        let mut registry = Self {
            classes: HashMap::new(),
        };
        registry.register_class(ClassDescriptor {
            name: STD_CLASS.to_string(),
            kind: ClassKind::Class,
            is_internal: true,
            ..Default::default()
        });
        registry
    }

    /// Register a class descriptor
    ///
    /// Methods without a declaring class are attributed to `class`, and
    /// leading namespace separators are stripped from referenced names.
    /// Interface methods are always abstract.
    pub fn register_class(&mut self, mut class: ClassDescriptor) {
        let is_interface = class.is_interface();
        class.name = normalize_class_name(&class.name).to_string();
        class.parent = class
            .parent
            .as_deref()
            .map(|p| normalize_class_name(p).to_string());
        for iface in class.interfaces.iter_mut() {
            *iface = normalize_class_name(iface).to_string();
        }
        for method in class.methods.iter_mut() {
            method.is_abstract |= is_interface;
            if method.declaring_class.is_empty() {
                method.declaring_class = class.name.clone();
            } else {
                method.declaring_class = normalize_class_name(&method.declaring_class).to_string();
            }
        }
        self.classes.insert(class.name.to_ascii_lowercase(), class);
    }

    /// Parse a JSON array of class descriptors
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.load_json(json, "<inline>")?;
        Ok(registry)
    }

    fn load_json(&mut self, json: &str, origin: &str) -> Result<usize, RegistryError> {
        let classes: Vec<ClassDescriptor> =
            serde_json::from_str(json).map_err(|source| RegistryError::Json {
                origin: origin.to_string(),
                source,
            })?;
        let count = classes.len();
        for class in classes {
            self.register_class(class);
        }
        Ok(count)
    }

    /// Load descriptors from a JSON file, or from every `*.json` file below a directory
    pub fn load_path(&mut self, path: &Path) -> Result<usize, RegistryError> {
        let mut files = Vec::new();
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry.map_err(RegistryError::Walk)?;
                let p = entry.path();
                if p.is_file() && p.extension().and_then(|s| s.to_str()) == Some("json") {
                    files.push(p.to_path_buf());
                }
            }
        } else {
            files.push(path.to_path_buf());
        }

        let mut total = 0;
        for file in files {
            let json = std::fs::read_to_string(&file).map_err(|source| RegistryError::Io {
                path: file.clone(),
                source,
            })?;
            let count = self.load_json(&json, &file.display().to_string())?;
            tracing::debug!(path = %file.display(), classes = count, "loaded class descriptors");
            total += count;
        }
        Ok(total)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl ReflectionProvider for ClassRegistry {
    fn get_class(&self, name: &str) -> Option<&ClassDescriptor> {
        self.classes
            .get(&normalize_class_name(name).to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_std_class_is_builtin() {
        let registry = ClassRegistry::new();
        let std = registry.get_class("\\STDCLASS").unwrap();
        assert!(std.is_internal);
        assert_eq!(std.name, "stdClass");
    }

    #[test]
    fn test_declaring_class_filled_in() {
        let registry = ClassRegistry::from_json(
            r#"[{"name": "\\App\\Foo", "parent": "\\App\\Base", "methods": [{"name": "run"}]}]"#,
        )
        .unwrap();
        let foo = registry.get_class("app\\foo").unwrap();
        assert_eq!(foo.name, "App\\Foo");
        assert_eq!(foo.parent.as_deref(), Some("App\\Base"));
        assert_eq!(foo.methods[0].declaring_class, "App\\Foo");
    }

    #[test]
    fn test_interface_methods_are_abstract() {
        let registry = ClassRegistry::from_json(
            r#"[{"name": "App\\Clock", "kind": "interface", "methods": [
                {"name": "now", "return_type": "int"}
            ]}]"#,
        )
        .unwrap();
        let clock = registry.get_class("App\\Clock").unwrap();
        assert!(clock.methods[0].is_abstract);
    }

    #[test]
    fn test_invalid_type_is_reported() {
        let err = ClassRegistry::from_json(
            r#"[{"name": "Foo", "methods": [{"name": "run", "return_type": "A&B|C"}]}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, RegistryError::Json { .. }));
        assert!(err.to_string().contains("<inline>"));
    }
}

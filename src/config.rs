//! Generator configuration

/// Namespace of the PHP runtime support library the generated classes use.
pub const DEFAULT_SUPPORT_NAMESPACE: &str = "Symfony\\Component\\VarExporter";

/// Configuration for proxy generation
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Namespace holding `LazyObjectInterface`, the lazy traits and `Internal\*`
    pub support_namespace: String,
    /// Target runtime accepts `readonly class` declarations for lazy objects
    pub readonly_classes: bool,
    /// The one internal class lazy objects may extend
    pub sentinel_class: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            support_namespace: DEFAULT_SUPPORT_NAMESPACE.to_string(),
            readonly_classes: true,
            sentinel_class: crate::reflection::STD_CLASS.to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Fully-qualified name of a support symbol, with a leading `\`.
    pub fn support_symbol(&self, relative: &str) -> String {
        let ns = self.support_namespace.trim_matches('\\');
        if ns.is_empty() {
            format!("\\{}", relative)
        } else {
            format!("\\{}\\{}", ns, relative)
        }
    }
}

//! Fixed PHP fragments spliced into generated classes.
//!
//! The runtime support traits supply most of a lazy object's behavior; the
//! generator only emits what has to vary per class.

use crate::config::GeneratorConfig;

/// Methods `LazyGhostTrait` defines on every ghost.
pub const GHOST_TRAIT_METHODS: &[&str] = &[
    "createLazyGhost",
    "isLazyObjectInitialized",
    "initializeLazyObject",
    "resetLazyObject",
    "__get",
    "__set",
    "__isset",
    "__unset",
    "__clone",
    "__serialize",
    "__destruct",
];

/// Methods `LazyProxyTrait` defines on every virtual proxy.
pub const PROXY_TRAIT_METHODS: &[&str] = &[
    "createLazyProxy",
    "isLazyObjectInitialized",
    "initializeLazyObject",
    "resetLazyObject",
    "__get",
    "__set",
    "__isset",
    "__unset",
    "__clone",
    "__serialize",
    "__unserialize",
    "__destruct",
];

pub fn is_ghost_trait_method(name: &str) -> bool {
    GHOST_TRAIT_METHODS.iter().any(|m| m.eq_ignore_ascii_case(name))
}

pub fn is_proxy_trait_method(name: &str) -> bool {
    PROXY_TRAIT_METHODS.iter().any(|m| m.eq_ignore_ascii_case(name))
}

const PROXY_GETTER: &str = r#"    public function &__get($name): {type}
    {
        $instance = isset($this->lazyObjectReal) ? $this->lazyObjectReal : $this->initializeLazyObject();
        $propertyScopes = {hydrator}::$propertyScopes[$instance::class] ??= {hydrator}::getPropertyScopes($instance::class);
        $scope = isset($propertyScopes[$name]) ? {registry}::getScope($propertyScopes, $propertyScopes[$name][0], $name) : null;

        if (null === $scope) {
            $value = $instance->$name;

            return $value;
        }
        $accessor = {registry}::$classAccessors[$scope] ??= {registry}::getClassAccessors($scope);

        return $accessor['get']($instance, $name, true);
    }"#;

const PROXY_INITIALIZER: &str = r#"    public function initializeLazyObject(): {type}
    {
        if (isset($this->lazyObjectReal)) {
            return $this->lazyObjectReal;
        }

        if (!$state = {registry}::$states[$this->lazyObjectId] ?? null) {
            return $this;
        }

        return $this->lazyObjectReal = ($state->initializer)();
    }"#;

fn render(template: &str, return_type: &str, config: &GeneratorConfig) -> String {
    template
        .replace("{type}", return_type)
        .replace("{hydrator}", &config.support_symbol("Internal\\Hydrator"))
        .replace("{registry}", &config.support_symbol("Internal\\LazyObjectRegistry"))
}

/// `__get` for proxies whose source declares a narrower return type than `mixed`.
pub fn proxy_getter(return_type: &str, config: &GeneratorConfig) -> String {
    render(PROXY_GETTER, return_type, config)
}

/// `initializeLazyObject` for proxies without a parent class.
pub fn proxy_initializer(return_type: &str, config: &GeneratorConfig) -> String {
    render(PROXY_INITIALIZER, return_type, config)
}

/// Trailing `class_exists()` calls that let a preloader discover the support
/// classes every lazy object needs.
pub fn preload_hints(config: &GeneratorConfig) -> String {
    let mut out = String::from("// Help opcache.preload discover always-needed symbols\n");
    for symbol in [
        "Internal\\Hydrator",
        "Internal\\LazyObjectRegistry",
        "Internal\\LazyObjectState",
    ] {
        out.push_str(&format!(
            "class_exists({}::class);\n",
            config.support_symbol(symbol)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_getter_template_is_filled() {
        let config = GeneratorConfig::default();
        let getter = proxy_getter("?string", &config);
        assert!(getter.starts_with("    public function &__get($name): ?string\n"));
        assert!(getter.ends_with("    }"));
        assert!(!getter.contains("{registry}") && !getter.contains("{hydrator}"));
        assert!(getter.contains("\\Symfony\\Component\\VarExporter\\Internal\\LazyObjectRegistry::getScope("));
    }

    #[test]
    fn test_trait_method_lookup_is_case_insensitive() {
        assert!(is_proxy_trait_method("__UNSERIALIZE"));
        assert!(!is_ghost_trait_method("__unserialize"));
        assert!(is_ghost_trait_method("InitializeLazyObject"));
    }

    #[test]
    fn test_preload_hints() {
        let hints = preload_hints(&GeneratorConfig::default());
        assert_eq!(hints.lines().count(), 4);
        assert!(hints.contains("class_exists(\\Symfony\\Component\\VarExporter\\Internal\\LazyObjectState::class);"));
    }
}

use super::templates::{GHOST_TRAIT_METHODS, preload_hints};
use super::{GeneratedClass, LazyKind, LazyProxyGenerator, ProxyError};
use crate::export::property_scopes::export_property_scopes;
use crate::export::types::{TypeContext, export_optional_type};
use crate::reflection::ClassDescriptor;
use crate::reflection::hierarchy::{ancestors, find_method};

impl LazyProxyGenerator<'_> {
    /// Generate a lazy ghost extending `class`.
    ///
    /// Ghosts initialize themselves in place, so the class must be concrete,
    /// extendable, fully user-defined and leave property reads to the ghost.
    pub fn generate_lazy_ghost(&self, class: &ClassDescriptor) -> Result<GeneratedClass, ProxyError> {
        let kind = LazyKind::Ghost;
        let sentinel = self.config.sentinel_class.as_str();

        if class.is_final {
            return Err(ProxyError::FinalClass {
                kind,
                class: class.name.clone(),
            });
        }
        if !class.is_instantiable_kind() {
            return Err(ProxyError::NotConcrete {
                kind,
                class: class.name.clone(),
            });
        }
        if class.is_internal_non_sentinel(sentinel) {
            return Err(ProxyError::InternalClass {
                kind,
                class: class.name.clone(),
            });
        }

        if let Some(getter) = find_method(self.provider, class, "__get") {
            let ctx = TypeContext::for_class(self.provider, &getter.declaring_class);
            let return_type = export_optional_type(getter.return_type.as_ref(), &ctx, false)
                .unwrap_or_else(|| "mixed".to_string());
            if return_type != "mixed" {
                return Err(ProxyError::IncompatibleGetter {
                    kind,
                    class: class.name.clone(),
                    return_type,
                });
            }
        }

        for name in GHOST_TRAIT_METHODS {
            if let Some(method) = find_method(self.provider, class, name) {
                if method.is_final {
                    return Err(ProxyError::FinalMethod {
                        kind,
                        class: class.name.clone(),
                        method: method.name.clone(),
                    });
                }
            }
        }

        if let Some(internal) = ancestors(self.provider, class)
            .into_iter()
            .find(|a| a.is_internal_non_sentinel(sentinel))
        {
            return Err(ProxyError::InternalAncestor {
                kind,
                class: class.name.clone(),
                ancestor: internal.name.clone(),
            });
        }

        let scopes = self.property_scopes(&class.name);
        let scopes = export_property_scopes(&scopes, &class.name);
        tracing::debug!(class = %class.name, "generating lazy ghost");

        let body = format!(
            " extends \\{class} implements {marker}\n\
             {{\n    use {ghost_trait};\n\n    private int $lazyObjectId;\n\n    \
             private const LAZY_OBJECT_PROPERTY_SCOPES = {scopes};\n}}\n\n{hints}",
            class = class.name,
            marker = self.config.support_symbol("LazyObjectInterface"),
            ghost_trait = self.config.support_symbol("LazyGhostTrait"),
            scopes = scopes,
            hints = preload_hints(&self.config),
        );

        Ok(GeneratedClass {
            readonly: self.config.readonly_classes && class.is_readonly,
            body,
        })
    }
}

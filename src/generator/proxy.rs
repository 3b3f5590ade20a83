use super::templates::{is_proxy_trait_method, preload_hints, proxy_getter, proxy_initializer};
use super::{GeneratedClass, LazyKind, LazyProxyGenerator, ProxyError};
use crate::export::property_scopes::export_scope_entries;
use crate::export::signature::export_method_signature;
use crate::export::types::{TypeContext, export_optional_type, export_type};
use crate::reflection::hierarchy::{ancestors, collect_methods, is_a};
use crate::reflection::{ClassDescriptor, ClassKind, MethodDescriptor};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Return types that may hold the proxy itself whatever the class hierarchy.
const IDENTITY_TYPES: &[&str] = &["static", "object", "mixed"];

impl LazyProxyGenerator<'_> {
    /// Generate a lazy virtual proxy for `class` and/or `interfaces`.
    ///
    /// Without a class the proxy only implements the interfaces, and its real
    /// instance can be any object satisfying all of them.
    pub fn generate_lazy_proxy(
        &self,
        class: Option<&ClassDescriptor>,
        interfaces: &[&ClassDescriptor],
    ) -> Result<GeneratedClass, ProxyError> {
        let kind = LazyKind::Proxy;
        let sentinel = self.config.sentinel_class.as_str();

        if let Some(class) = class {
            if class.kind != ClassKind::Class || !self.provider.class_exists(&class.name) {
                return Err(ProxyError::NotAClass {
                    kind,
                    class: class.name.clone(),
                });
            }
            if class.is_final {
                return Err(ProxyError::FinalClass {
                    kind,
                    class: class.name.clone(),
                });
            }
        }

        let mut reflectors: Vec<&MethodDescriptor> = Vec::new();
        if let Some(class) = class {
            reflectors.extend(
                collect_methods(self.provider, class)
                    .into_iter()
                    .filter(|m| !m.is_private()),
            );
        }
        for iface in interfaces {
            if !iface.is_interface() {
                return Err(ProxyError::NotAnInterface {
                    kind,
                    class: iface.name.clone(),
                });
            }
            reflectors.extend(collect_methods(self.provider, iface));
        }

        let extends_internal = class.is_some_and(|c| {
            c.is_internal_non_sentinel(sentinel)
                || ancestors(self.provider, c)
                    .iter()
                    .any(|a| a.is_internal_non_sentinel(sentinel))
        });
        let mut must_proxy = extends_internal;
        let mut methods: IndexMap<String, String> = IndexMap::new();

        for method in reflectors
            .iter()
            .filter(|m| m.name.eq_ignore_ascii_case("__get"))
        {
            let ctx = TypeContext::for_class(self.provider, &method.declaring_class);
            let return_type = export_optional_type(method.return_type.as_ref(), &ctx, false)
                .unwrap_or_else(|| "mixed".to_string());
            if return_type == "mixed" {
                continue;
            }
            if method.is_final {
                return Err(ProxyError::FinalMethod {
                    kind,
                    class: class.map_or_else(|| method.declaring_class.clone(), |c| c.name.clone()),
                    method: method.name.clone(),
                });
            }
            must_proxy = true;
            methods.insert("__get".to_string(), proxy_getter(&return_type, &self.config));
            break;
        }

        let owner = |method: &MethodDescriptor| {
            class.map_or_else(|| method.declaring_class.clone(), |c| c.name.clone())
        };
        let mut skipped_finals: HashMap<String, &MethodDescriptor> = HashMap::new();

        for method in reflectors.iter().copied() {
            let lc_name = method.name.to_ascii_lowercase();
            if (method.is_static && !method.is_abstract) || methods.contains_key(&lc_name) {
                continue;
            }
            if method.is_final {
                if must_proxy || is_proxy_trait_method(&method.name) {
                    return Err(ProxyError::FinalMethod {
                        kind,
                        class: owner(method),
                        method: method.name.clone(),
                    });
                }
                tracing::debug!(method = %method.name, "leaving final method to inheritance");
                skipped_finals.entry(lc_name).or_insert(method);
                continue;
            }
            if is_proxy_trait_method(&method.name) || (method.is_protected() && !method.is_abstract) {
                continue;
            }
            if let Some(&final_method) = skipped_finals.get(&lc_name) {
                return Err(ProxyError::FinalMethod {
                    kind,
                    class: owner(final_method),
                    method: final_method.name.clone(),
                });
            }

            let exported = export_method_signature(self.provider, method, true);
            let parent_call = if method.is_abstract {
                format!(
                    "throw new \\BadMethodCallException('Cannot forward abstract method \"{}::{}()\".')",
                    method.declaring_class, method.name
                )
            } else {
                format!("parent::{}({})", method.name, exported.args)
            };

            let body = if method.is_static {
                format!("        {};", parent_call)
            } else if method.returns_nothing() {
                format!(
                    "        if (isset($this->lazyObjectReal)) {{\n            \
                     $this->lazyObjectReal->{name}({args});\n        \
                     }} else {{\n            {parent_call};\n        }}",
                    name = method.name,
                    args = exported.args,
                    parent_call = parent_call,
                )
            } else {
                if !must_proxy && !method.is_abstract && !self.may_return_proxy(method, class, interfaces) {
                    tracing::debug!(method = %method.name, "return type cannot alias the proxy, not forwarding");
                    continue;
                }
                format!(
                    "        if (isset($this->lazyObjectReal)) {{\n            \
                     return $this->lazyObjectReal->{name}({args});\n        }}\n\n        \
                     return {parent_call};",
                    name = method.name,
                    args = exported.args,
                    parent_call = parent_call,
                )
            };

            methods.insert(
                lc_name,
                format!("    {}\n    {{\n{}\n    }}", exported.signature, body),
            );
        }

        let mut interface_names: Vec<&str> = Vec::new();
        for iface in interfaces {
            if !interface_names
                .iter()
                .any(|n| n.eq_ignore_ascii_case(&iface.name))
            {
                interface_names.push(&iface.name);
            }
        }

        let mut type_parts: Vec<String> = Vec::new();
        if class.is_some() {
            type_parts.push("parent".to_string());
        }
        type_parts.extend(interface_names.iter().map(|n| format!("\\{}", n)));
        let real_type = if type_parts.is_empty() {
            "object".to_string()
        } else {
            type_parts.join("&")
        };

        let mut bodies: Vec<String> = Vec::with_capacity(methods.len() + 1);
        if class.is_none() {
            bodies.push(proxy_initializer(&real_type, &self.config));
        }
        bodies.extend(methods.into_values());

        let mut implements: Vec<String> = interface_names.iter().map(|n| format!("\\{}", n)).collect();
        implements.push(self.config.support_symbol("LazyObjectInterface"));

        let mut out = String::new();
        if let Some(class) = class {
            out.push_str(&format!(" extends \\{}", class.name));
        }
        out.push_str(&format!(
            " implements {}\n{{\n    use {};\n\n    private int $lazyObjectId;\n    private {} $lazyObjectReal;\n",
            implements.join(", "),
            self.config.support_symbol("LazyProxyTrait"),
            real_type
        ));
        if let Some(class) = class {
            let scopes = self.property_scopes(&class.name);
            out.push_str("\n    private const LAZY_OBJECT_PROPERTY_SCOPES = [\n");
            out.push_str("        'lazyObjectReal' => [self::class, 'lazyObjectReal', null],\n");
            out.push_str(
                "        \"\\0\".self::class.\"\\0lazyObjectReal\" => [self::class, 'lazyObjectReal', null],\n",
            );
            for line in export_scope_entries(&scopes, &class.name) {
                out.push_str(&line);
                out.push('\n');
            }
            out.push_str("    ];\n");
        }
        if !bodies.is_empty() {
            out.push('\n');
            out.push_str(&bodies.join("\n\n"));
            out.push('\n');
        }
        out.push_str("}\n\n");
        out.push_str(&preload_hints(&self.config));

        tracing::debug!(
            class = class.map_or("", |c| c.name.as_str()),
            interfaces = interface_names.len(),
            must_proxy,
            "generated lazy proxy"
        );

        Ok(GeneratedClass {
            readonly: self.config.readonly_classes && class.is_some_and(|c| c.is_readonly),
            body: out,
        })
    }

    /// Whether a call to `method` could hand back the proxy itself, in which
    /// case the call has to go through the real instance.
    fn may_return_proxy(
        &self,
        method: &MethodDescriptor,
        class: Option<&ClassDescriptor>,
        interfaces: &[&ClassDescriptor],
    ) -> bool {
        let Some(return_type) = &method.return_type else {
            return true;
        };
        if return_type
            .named_types()
            .iter()
            .any(|n| IDENTITY_TYPES.iter().any(|t| t.eq_ignore_ascii_case(n)))
        {
            return true;
        }

        let ctx = TypeContext::for_class(self.provider, &method.declaring_class);
        let class_types = export_type(return_type, &ctx, true);
        class_types
            .split(['(', ')', '|', '&'])
            .filter(|name| !name.is_empty())
            .any(|name| {
                class
                    .into_iter()
                    .chain(interfaces.iter().copied())
                    .any(|target| is_a(self.provider, target, name))
            })
    }
}

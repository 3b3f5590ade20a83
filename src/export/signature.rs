//! Signature rendering
//!
//! Re-emits a callable's declaration header and the argument list that
//! forwards its call to another implementation.

use super::default_value::fix_default_expression;
use super::types::{TypeContext, export_type};
use crate::reflection::hierarchy::prototype;
use crate::reflection::{
    FunctionDescriptor, MethodDescriptor, ParameterDescriptor, ReflectionProvider,
};

pub const RETURN_TYPE_WILL_CHANGE: &str = "#[\\ReturnTypeWillChange] ";
pub const SENSITIVE_PARAMETER: &str = "#[\\SensitiveParameter] ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedSignature {
    /// Full declaration header, e.g. `public function foo(int $a): string`.
    pub signature: String,
    /// Argument list that passes every received argument on.
    pub args: String,
}

pub fn export_method_signature(
    provider: &dyn ReflectionProvider,
    method: &MethodDescriptor,
    with_parameter_types: bool,
) -> ExportedSignature {
    let ctx = TypeContext::for_class(provider, &method.declaring_class);
    let (params, args) = export_parameters(&method.parameters, Some(&ctx), with_parameter_types);

    let mut signature = format!(
        "{} {}function {}{}({})",
        method.visibility.as_keyword(),
        if method.is_static { "static " } else { "" },
        if method.returns_reference { "&" } else { "" },
        method.name,
        params,
    );
    if let Some(ret) = &method.return_type {
        signature.push_str(": ");
        signature.push_str(&export_type(ret, &ctx, false));
    }

    if has_tentative_return_type(provider, method) {
        signature.insert_str(0, RETURN_TYPE_WILL_CHANGE);
    }

    ExportedSignature { signature, args }
}

pub fn export_function_signature(
    function: &FunctionDescriptor,
    with_parameter_types: bool,
) -> ExportedSignature {
    let ctx = TypeContext::free();
    let (params, args) = export_parameters(&function.parameters, None, with_parameter_types);

    let name = if function.is_closure {
        ""
    } else {
        function.name.as_str()
    };
    let mut signature = format!(
        "function {}{}({})",
        if function.returns_reference { "&" } else { "" },
        name,
        params
    );
    if let Some(ret) = &function.return_type {
        signature.push_str(": ");
        signature.push_str(&export_type(ret, &ctx, false));
    }
    if function.tentative_return_type {
        signature.insert_str(0, RETURN_TYPE_WILL_CHANGE);
    }

    ExportedSignature { signature, args }
}

/// Walk the prototype chain looking for a tentative return type. An abstract
/// declaration ends the walk.
fn has_tentative_return_type(provider: &dyn ReflectionProvider, method: &MethodDescriptor) -> bool {
    let mut current = Some(method);
    let mut depth = 0;
    while let Some(m) = current {
        if m.tentative_return_type {
            return true;
        }
        if m.is_abstract || depth > 64 {
            break;
        }
        current = prototype(provider, m);
        depth += 1;
    }
    false
}

fn export_parameters(
    parameters: &[ParameterDescriptor],
    scope: Option<&TypeContext>,
    with_types: bool,
) -> (String, String) {
    let free = TypeContext::free();
    let type_ctx = scope.unwrap_or(&free);

    let mut rendered = Vec::with_capacity(parameters.len());
    let mut args = Vec::with_capacity(parameters.len());
    let mut has_by_ref = false;

    for param in parameters {
        let mut out = String::new();
        if param.is_sensitive {
            out.push_str(SENSITIVE_PARAMETER);
        }
        if with_types {
            if let Some(hint) = &param.type_hint {
                out.push_str(&export_type(hint, type_ctx, false));
                out.push(' ');
            }
        }
        if param.by_ref {
            out.push('&');
        }
        if param.is_variadic {
            out.push_str("...");
        }
        out.push('$');
        out.push_str(&param.name);
        if param.is_optional() && !param.is_variadic {
            out.push_str(" = ");
            out.push_str(&export_default(param, scope));
        }
        rendered.push(out);

        has_by_ref |= param.by_ref;
        args.push(format!(
            "{}${}",
            if param.is_variadic { "..." } else { "" },
            param.name
        ));
    }

    let args = match parameters.last() {
        None => "...\\func_get_args()".to_string(),
        Some(_) if !has_by_ref => "...\\func_get_args()".to_string(),
        Some(last) if last.is_variadic => args.join(", "),
        Some(_) => {
            args.push(format!(
                "...\\array_slice(\\func_get_args(), {})",
                parameters.len()
            ));
            args.join(", ")
        }
    };

    (rendered.join(", "), args)
}

fn export_default(param: &ParameterDescriptor, scope: Option<&TypeContext>) -> String {
    let Some(default) = param.default.as_deref() else {
        return "null".to_string();
    };
    let default = default.trim();
    if default == "<default>" || default == "NULL" {
        return "null".to_string();
    }
    if default.contains(['\\', ':', '(', '\0']) {
        return fix_default_expression(default, scope);
    }
    default.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflection::{ClassRegistry, TypeHint, Visibility};

    fn param(name: &str) -> ParameterDescriptor {
        ParameterDescriptor {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_parameter_rendering_order() {
        let registry = ClassRegistry::new();
        let method = MethodDescriptor {
            name: "login".to_string(),
            declaring_class: "App\\Auth".to_string(),
            parameters: vec![
                ParameterDescriptor {
                    type_hint: Some(TypeHint::named("string")),
                    is_sensitive: true,
                    ..param("password")
                },
                ParameterDescriptor {
                    type_hint: Some(TypeHint::nullable("array")),
                    by_ref: true,
                    default: Some("NULL".to_string()),
                    ..param("errors")
                },
                ParameterDescriptor {
                    type_hint: Some(TypeHint::named("int")),
                    is_variadic: true,
                    ..param("flags")
                },
            ],
            return_type: Some(TypeHint::named("bool")),
            ..Default::default()
        };
        let exported = export_method_signature(&registry, &method, true);
        assert_eq!(
            exported.signature,
            "public function login(#[\\SensitiveParameter] string $password, ?array &$errors = null, int ...$flags): bool"
        );
        assert_eq!(exported.args, "$password, $errors, ...$flags");

        let untyped = export_method_signature(&registry, &method, false);
        assert_eq!(
            untyped.signature,
            "public function login(#[\\SensitiveParameter] $password, &$errors = null, ...$flags): bool"
        );
    }

    #[test]
    fn test_forwarding_args() {
        let (_, args) = export_parameters(&[], None, true);
        assert_eq!(args, "...\\func_get_args()");

        let (_, args) = export_parameters(&[param("a"), param("b")], None, true);
        assert_eq!(args, "...\\func_get_args()");

        let by_ref = ParameterDescriptor {
            by_ref: true,
            ..param("a")
        };
        let (_, args) = export_parameters(&[by_ref, param("b")], None, true);
        assert_eq!(args, "$a, $b, ...\\array_slice(\\func_get_args(), 2)");
    }

    #[test]
    fn test_static_protected_by_ref_method() {
        let registry = ClassRegistry::new();
        let method = MethodDescriptor {
            name: "instance".to_string(),
            visibility: Visibility::Protected,
            is_static: true,
            returns_reference: true,
            declaring_class: "App\\Registry".to_string(),
            return_type: Some(TypeHint::named("static")),
            ..Default::default()
        };
        assert_eq!(
            export_method_signature(&registry, &method, true).signature,
            "protected static function &instance(): static"
        );
    }

    #[test]
    fn test_defaults_are_qualified_in_declaring_scope() {
        let registry = ClassRegistry::from_json(
            r#"[
                {"name": "App\\Base"},
                {"name": "App\\Child", "parent": "App\\Base"}
            ]"#,
        )
        .unwrap();
        let method = MethodDescriptor {
            name: "configure".to_string(),
            declaring_class: "App\\Child".to_string(),
            parameters: vec![
                ParameterDescriptor {
                    default: Some("self::MODE | parent::FLAG".to_string()),
                    ..param("mode")
                },
                ParameterDescriptor {
                    default: Some("'plain'".to_string()),
                    ..param("label")
                },
                ParameterDescriptor {
                    default: Some("<default>".to_string()),
                    ..param("extra")
                },
            ],
            ..Default::default()
        };
        assert_eq!(
            export_method_signature(&registry, &method, true).signature,
            "public function configure($mode = \\App\\Child::MODE | \\App\\Base::FLAG, $label = 'plain', $extra = null)"
        );
    }

    #[test]
    fn test_tentative_return_type_from_prototype() {
        let registry = ClassRegistry::from_json(
            r#"[
                {"name": "IteratorAggregate", "kind": "interface", "is_internal": true, "methods": [
                    {"name": "getIterator", "is_abstract": true, "return_type": "Traversable", "tentative_return_type": true}
                ]},
                {"name": "App\\Bag", "interfaces": ["IteratorAggregate"], "methods": [
                    {"name": "getIterator"}
                ]}
            ]"#,
        )
        .unwrap();
        let bag = registry.get_class("App\\Bag").unwrap();
        let exported = export_method_signature(&registry, &bag.methods[0], true);
        assert_eq!(
            exported.signature,
            "#[\\ReturnTypeWillChange] public function getIterator()"
        );
    }

    #[test]
    fn test_abstract_link_stops_prototype_walk() {
        let registry = ClassRegistry::from_json(
            r#"[
                {"name": "Countable", "kind": "interface", "is_internal": true, "methods": [
                    {"name": "count", "is_abstract": true, "tentative_return_type": true}
                ]},
                {"name": "App\\Base", "is_abstract": true, "interfaces": ["Countable"], "methods": [
                    {"name": "count", "is_abstract": true}
                ]},
                {"name": "App\\Child", "parent": "App\\Base", "methods": [
                    {"name": "count", "return_type": "int"}
                ]}
            ]"#,
        )
        .unwrap();
        let child = registry.get_class("App\\Child").unwrap();
        let exported = export_method_signature(&registry, &child.methods[0], true);
        assert_eq!(exported.signature, "public function count(): int");
    }

    #[test]
    fn test_closure_signature() {
        let function = FunctionDescriptor {
            name: "{closure}".to_string(),
            is_closure: true,
            parameters: vec![ParameterDescriptor {
                type_hint: Some(TypeHint::named("self")),
                default: Some("PHP_EOL".to_string()),
                ..param("x")
            }],
            return_type: Some(TypeHint::named("void")),
            ..Default::default()
        };
        let exported = export_function_signature(&function, true);
        assert_eq!(exported.signature, "function (self $x = PHP_EOL): void");
    }
}

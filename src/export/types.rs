//! Type rendering
//!
//! Turns reflected types back into PHP source. Output is canonical: union
//! members are sorted so the same type always renders the same way, whatever
//! order reflection listed them in.

use crate::reflection::{ReflectionProvider, TypeHint};

/// Lexical class scope used to resolve `self` and `parent`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeContext {
    pub class: Option<String>,
    pub parent: Option<String>,
}

impl TypeContext {
    /// Context for code outside any class.
    pub fn free() -> Self {
        Self::default()
    }

    pub fn new(class: impl Into<String>, parent: Option<String>) -> Self {
        Self {
            class: Some(class.into()),
            parent,
        }
    }

    /// Context of `class_name` as declared in `provider`.
    pub fn for_class(provider: &dyn ReflectionProvider, class_name: &str) -> Self {
        match provider.get_class(class_name) {
            Some(class) => Self {
                class: Some(class.name.clone()),
                parent: class
                    .parent
                    .as_deref()
                    .map(|p| provider.get_class(p).map_or(p, |c| c.name.as_str()).to_string()),
            },
            None => Self {
                class: Some(crate::reflection::normalize_class_name(class_name).to_string()),
                parent: None,
            },
        }
    }

    /// Resolve `self`/`parent`. Returns `None` when the keyword has nothing to
    /// resolve to and must be emitted literally.
    pub fn resolve<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        if name.eq_ignore_ascii_case("self") {
            return self.class.as_deref();
        }
        if name.eq_ignore_ascii_case("parent") {
            if self.parent.is_none() {
                tracing::warn!(
                    class = self.class.as_deref().unwrap_or(""),
                    "cannot resolve \"parent\": no parent class, keeping the keyword"
                );
            }
            return self.parent.as_deref();
        }
        Some(name)
    }
}

/// Render `hint` as PHP type syntax.
///
/// With `no_builtin`, builtin names are dropped and class names are left
/// unqualified; an empty string then means nothing but builtins remained.
pub fn export_type(hint: &TypeHint, ctx: &TypeContext, no_builtin: bool) -> String {
    let (members, glue) = match hint {
        TypeHint::Union(types) => (types.as_slice(), Some("|")),
        TypeHint::Intersection(types) => (types.as_slice(), Some("&")),
        TypeHint::Named { .. } => (std::slice::from_ref(hint), None),
    };

    let mut types = Vec::with_capacity(members.len());
    for member in members {
        match member {
            TypeHint::Intersection(_) => {
                let inner = export_type(member, ctx, no_builtin);
                if !inner.is_empty() {
                    types.push(format!("({})", inner));
                }
            }
            TypeHint::Union(_) => {
                let inner = export_type(member, ctx, no_builtin);
                if !inner.is_empty() {
                    types.push(inner);
                }
            }
            TypeHint::Named { name, .. } => {
                if let Some(rendered) = export_name(name, ctx, no_builtin) {
                    types.push(rendered);
                }
            }
        }
    }

    if types.is_empty() {
        return String::new();
    }

    match glue {
        None => {
            let nullable = matches!(hint, TypeHint::Named { name, nullable: true }
                if !name.eq_ignore_ascii_case("mixed") && !name.eq_ignore_ascii_case("null"));
            if nullable && !no_builtin {
                format!("?{}", types[0])
            } else {
                types.swap_remove(0)
            }
        }
        Some(glue) => {
            types.sort();
            types.join(glue)
        }
    }
}

fn export_name(name: &str, ctx: &TypeContext, no_builtin: bool) -> Option<String> {
    let name = crate::reflection::normalize_class_name(name);
    let builtin = TypeHint::is_builtin_name(name);
    if no_builtin && builtin {
        return None;
    }
    let resolved = match ctx.resolve(name) {
        Some(resolved) => resolved,
        None => return Some(name.to_ascii_lowercase()),
    };
    if no_builtin || builtin || name.eq_ignore_ascii_case("static") {
        Some(resolved.to_string())
    } else {
        Some(format!("\\{}", resolved))
    }
}

/// Render an optional annotation. `None` means the owner had no type at all.
pub fn export_optional_type(
    hint: Option<&TypeHint>,
    ctx: &TypeContext,
    no_builtin: bool,
) -> Option<String> {
    hint.map(|h| export_type(h, ctx, no_builtin))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> TypeContext {
        TypeContext::new("App\\Child", Some("App\\Base".to_string()))
    }

    fn render(src: &str) -> String {
        export_type(&TypeHint::parse(src).unwrap(), &ctx(), false)
    }

    #[test]
    fn test_named_types() {
        assert_eq!(render("int"), "int");
        assert_eq!(render("?int"), "?int");
        assert_eq!(render("Foo\\Bar"), "\\Foo\\Bar");
        assert_eq!(render("?Foo"), "?\\Foo");
        assert_eq!(render("static"), "static");
        assert_eq!(render("mixed"), "mixed");
    }

    #[test]
    fn test_nullable_mixed_has_no_marker() {
        let hint = TypeHint::nullable("mixed");
        assert_eq!(export_type(&hint, &ctx(), false), "mixed");
    }

    #[test]
    fn test_self_and_parent_resolve() {
        assert_eq!(render("self"), "\\App\\Child");
        assert_eq!(render("?parent"), "?\\App\\Base");
        assert_eq!(render("self|int"), "\\App\\Child|int");
    }

    #[test]
    fn test_parent_without_parent_stays_literal() {
        let ctx = TypeContext::new("App\\Root", None);
        let hint = TypeHint::named("parent");
        assert_eq!(export_type(&hint, &ctx, false), "parent");
    }

    #[test]
    fn test_union_is_sorted() {
        assert_eq!(render("string|int|Foo"), "\\Foo|int|string");
        assert_eq!(render("Foo|string|int"), render("int|Foo|string"));
    }

    #[test]
    fn test_dnf_type() {
        assert_eq!(render("null|(B&A)"), "(\\A&\\B)|null");
        assert_eq!(render("B&A"), "\\A&\\B");
    }

    #[test]
    fn test_no_builtin_filters() {
        let hint = TypeHint::parse("Foo|int|null").unwrap();
        assert_eq!(export_type(&hint, &ctx(), true), "Foo");
        let hint = TypeHint::parse("int|string").unwrap();
        assert_eq!(export_type(&hint, &ctx(), true), "");
        let hint = TypeHint::parse("?Foo").unwrap();
        assert_eq!(export_type(&hint, &ctx(), true), "Foo");
        let hint = TypeHint::parse("static").unwrap();
        assert_eq!(export_type(&hint, &ctx(), true), "static");
    }

    #[test]
    fn test_named_types_parse_back() {
        let cases = [
            (TypeHint::named("int"), TypeHint::named("int")),
            (TypeHint::nullable("string"), TypeHint::nullable("string")),
            (TypeHint::named("Foo\\Bar"), TypeHint::named("Foo\\Bar")),
            (TypeHint::nullable("\\Foo\\Bar"), TypeHint::nullable("Foo\\Bar")),
            (TypeHint::named("static"), TypeHint::named("static")),
            (TypeHint::nullable("self"), TypeHint::nullable("App\\Child")),
            (TypeHint::named("parent"), TypeHint::named("App\\Base")),
            (TypeHint::nullable("mixed"), TypeHint::named("mixed")),
        ];
        for (hint, expected) in cases {
            let rendered = export_type(&hint, &ctx(), false);
            let parsed = TypeHint::parse(&rendered).unwrap();
            assert_eq!(parsed, expected, "{} rendered as {}", hint, rendered);
        }
    }

    #[test]
    fn test_absent_type() {
        assert_eq!(export_optional_type(None, &ctx(), false), None);
        let hint = TypeHint::named("int");
        assert_eq!(export_optional_type(Some(&hint), &ctx(), true), Some(String::new()));
    }
}

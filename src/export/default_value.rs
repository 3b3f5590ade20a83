//! Default value re-qualification
//!
//! Reflection prints parameter defaults as they were written, so names in
//! them are relative to the declaring class and namespace. Generated proxies
//! live elsewhere; every class or constant reference has to be made absolute
//! before the expression can be reused.

use super::types::TypeContext;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref STRING_LITERAL: Regex =
        Regex::new(r#"(?s)"(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*'"#).unwrap();
    static ref IDENTIFIER: Regex = Regex::new(
        r"([\[( ]|^)([a-zA-Z_\x{7f}-\x{ff}][a-zA-Z0-9_\x{7f}-\x{ff}]*(?:\\[a-zA-Z0-9_\x{7f}-\x{ff}]+)*)"
    )
    .unwrap();
}

/// Rewrite a default expression so that it means the same thing outside its
/// original scope.
///
/// `scope` is the declaring class context for methods, `None` for functions.
pub fn fix_default_expression(expr: &str, scope: Option<&TypeContext>) -> String {
    let mut out = String::with_capacity(expr.len() + 16);
    let mut last = 0;
    for literal in STRING_LITERAL.find_iter(expr) {
        if literal.start() > last {
            out.push_str(&qualify_names(&expr[last..literal.start()], scope));
        }
        out.push_str(&fix_literal(literal.as_str()));
        last = literal.end();
    }
    if last < expr.len() {
        out.push_str(&qualify_names(&expr[last..], scope));
    }
    out
}

fn fix_literal(literal: &str) -> String {
    // Double-quoted strings only come from internal functions and are already resolved.
    if literal.starts_with('"') || !literal.contains('\0') {
        return literal.to_string();
    }
    literal.replace('\0', "'.\"\\0\".'")
}

fn qualify_names(code: &str, scope: Option<&TypeContext>) -> String {
    let mut out = String::with_capacity(code.len() + 8);
    let mut last = 0;
    for caps in IDENTIFIER.captures_iter(code) {
        let whole = caps.get(0).unwrap();
        let name = caps.get(2).unwrap();
        // Named arguments (`foo: 1`) are not references.
        if code[name.end()..].starts_with(": ") {
            continue;
        }
        out.push_str(&code[last..name.start()]);
        out.push_str(&qualify(name.as_str(), scope));
        last = whole.end();
    }
    out.push_str(&code[last..]);
    out
}

fn qualify(name: &str, scope: Option<&TypeContext>) -> String {
    match name {
        "new" | "false" | "true" | "null" => name.to_string(),
        "NULL" => "null".to_string(),
        _ => match scope {
            Some(ctx) => match name {
                "self" => match ctx.resolve("self") {
                    Some(class) => format!("\\{}", class),
                    None => name.to_string(),
                },
                "parent" | "namespace\\parent" => match ctx.resolve("parent") {
                    Some(parent) => format!("\\{}", parent),
                    None => "parent".to_string(),
                },
                _ => format!("\\{}", name),
            },
            None => match name {
                "self" | "parent" => name.to_string(),
                _ => format!("\\{}", name),
            },
        },
    }
}

//! Reflected type descriptors
//!
//! A `TypeHint` is what `ReflectionNamedType`, `ReflectionUnionType` and
//! `ReflectionIntersectionType` describe. Descriptors can be written in PHP
//! type syntax (`?Foo`, `int|string`, `(A&B)|null`) when loading a registry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type names reflection reports as builtin. `static` is absent because
/// reflection treats it as a class type.
const BUILTIN_TYPES: &[&str] = &[
    "array", "bool", "callable", "false", "float", "int", "iterable", "mixed", "never", "null",
    "object", "string", "true", "void",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeHint {
    Named { name: String, nullable: bool },
    Union(Vec<TypeHint>),
    Intersection(Vec<TypeHint>),
}

impl TypeHint {
    pub fn named(name: impl Into<String>) -> Self {
        TypeHint::Named {
            name: name.into(),
            nullable: false,
        }
    }

    pub fn nullable(name: impl Into<String>) -> Self {
        TypeHint::Named {
            name: name.into(),
            nullable: true,
        }
    }

    pub fn parse(s: &str) -> Result<Self, TypeParseError> {
        s.parse()
    }

    pub fn is_builtin_name(name: &str) -> bool {
        BUILTIN_TYPES.iter().any(|b| b.eq_ignore_ascii_case(name))
    }

    /// All named leaves, depth-first.
    pub fn named_types(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            TypeHint::Named { name, .. } => out.push(name),
            TypeHint::Union(types) | TypeHint::Intersection(types) => {
                for t in types {
                    t.collect_names(out);
                }
            }
        }
    }
}

impl fmt::Display for TypeHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeHint::Named { name, nullable } => {
                if *nullable
                    && !name.eq_ignore_ascii_case("mixed")
                    && !name.eq_ignore_ascii_case("null")
                {
                    write!(f, "?")?;
                }
                write!(f, "{}", name)
            }
            TypeHint::Union(types) => {
                for (i, t) in types.iter().enumerate() {
                    if i > 0 {
                        write!(f, "|")?;
                    }
                    match t {
                        TypeHint::Intersection(_) => write!(f, "({})", t)?,
                        _ => write!(f, "{}", t)?,
                    }
                }
                Ok(())
            }
            TypeHint::Intersection(types) => {
                for (i, t) in types.iter().enumerate() {
                    if i > 0 {
                        write!(f, "&")?;
                    }
                    write!(f, "{}", t)?;
                }
                Ok(())
            }
        }
    }
}

impl From<TypeHint> for String {
    fn from(hint: TypeHint) -> Self {
        hint.to_string()
    }
}

impl TryFrom<String> for TypeHint {
    type Error = TypeParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParseError {
    pub input: String,
    pub reason: &'static str,
}

impl fmt::Display for TypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid type \"{}\": {}", self.input, self.reason)
    }
}

impl std::error::Error for TypeParseError {}

impl FromStr for TypeHint {
    type Err = TypeParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let err = |reason| TypeParseError {
            input: input.to_string(),
            reason,
        };
        let s = input.trim();
        if s.is_empty() {
            return Err(err("empty type"));
        }

        if let Some(rest) = s.strip_prefix('?') {
            return Ok(TypeHint::nullable(parse_name(rest).ok_or_else(|| err("bad name"))?));
        }

        let branches = split_top_level(s, '|').ok_or_else(|| err("unbalanced parentheses"))?;
        if branches.len() == 1 {
            return parse_branch(s, false).ok_or_else(|| err("bad type"));
        }

        let mut types = Vec::with_capacity(branches.len());
        for branch in branches {
            types.push(parse_branch(branch, true).ok_or_else(|| err("bad union member"))?);
        }

        // Reflection reports `T|null` as a nullable named type.
        if types.len() == 2 {
            let null_at = types
                .iter()
                .position(|t| matches!(t, TypeHint::Named { name, .. } if name.eq_ignore_ascii_case("null")));
            if let Some(idx) = null_at {
                if let TypeHint::Named { name, .. } = &types[1 - idx] {
                    if !name.eq_ignore_ascii_case("mixed") {
                        return Ok(TypeHint::nullable(name.clone()));
                    }
                }
            }
        }

        Ok(TypeHint::Union(types))
    }
}

/// A union member, a standalone intersection, or a single name.
fn parse_branch(s: &str, in_union: bool) -> Option<TypeHint> {
    let s = s.trim();
    if let Some(inner) = s.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        if !in_union {
            return None;
        }
        return parse_intersection(inner);
    }
    if s.contains('&') {
        // DNF types require parentheses around intersections inside unions.
        if in_union {
            return None;
        }
        return parse_intersection(s);
    }
    parse_name(s).map(TypeHint::named)
}

fn parse_intersection(s: &str) -> Option<TypeHint> {
    let members: Option<Vec<TypeHint>> = s
        .split('&')
        .map(|part| parse_name(part).map(TypeHint::named))
        .collect();
    let members = members?;
    if members.len() < 2 {
        return None;
    }
    Some(TypeHint::Intersection(members))
}

fn parse_name(s: &str) -> Option<String> {
    let name = s.trim();
    let name = name.strip_prefix('\\').unwrap_or(name);
    let valid_start = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || !c.is_ascii());
    let valid_rest = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '\\' || !c.is_ascii());
    if valid_start && valid_rest && !name.ends_with('\\') {
        Some(name.to_string())
    } else {
        None
    }
}

fn split_top_level(s: &str, sep: char) -> Option<Vec<&str>> {
    let mut depth = 0i32;
    let mut start = 0;
    let mut parts = Vec::new();
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            c if c == sep && depth == 0 => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    parts.push(&s[start..]);
    Some(parts)
}

//! Reflection model
//!
//! Descriptor types mirroring what PHP's Reflection API exposes about a class:
//! its kind and modifiers, declared methods and properties, and the types
//! attached to them. Descriptors are plain data; navigation across the
//! inheritance graph goes through a [`ReflectionProvider`].
//!
//! Reference: $PHP_SRC_PATH/ext/reflection/php_reflection.c

pub mod hierarchy;
pub mod registry;
pub mod type_hint;

pub use registry::{ClassRegistry, ReflectionProvider, RegistryError};
pub use type_hint::{TypeHint, TypeParseError};

use serde::{Deserialize, Serialize};

/// Name of the one internal class that lazy objects may extend.
pub const STD_CLASS: &str = "stdClass";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub fn as_keyword(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    Trait,
    Enum,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub type_hint: Option<TypeHint>,
    /// Default value expression as reflection prints it.
    pub default: Option<String>,
    pub is_variadic: bool,
    pub by_ref: bool,
    /// Carries `#[\SensitiveParameter]`.
    pub is_sensitive: bool,
}

impl ParameterDescriptor {
    pub fn is_optional(&self) -> bool {
        self.is_variadic || self.default.is_some()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodDescriptor {
    pub name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_final: bool,
    pub returns_reference: bool,
    /// Filled in by the registry when left empty.
    pub declaring_class: String,
    pub parameters: Vec<ParameterDescriptor>,
    pub return_type: Option<TypeHint>,
    pub tentative_return_type: bool,
}

impl MethodDescriptor {
    pub fn is_protected(&self) -> bool {
        self.visibility == Visibility::Protected
    }

    pub fn is_private(&self) -> bool {
        self.visibility == Visibility::Private
    }

    /// Returns true when the declared return type is exactly `void` or `never`.
    pub fn returns_nothing(&self) -> bool {
        matches!(
            &self.return_type,
            Some(TypeHint::Named { name, .. })
                if name.eq_ignore_ascii_case("void") || name.eq_ignore_ascii_case("never")
        )
    }
}

/// A free function or closure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionDescriptor {
    pub name: String,
    pub parameters: Vec<ParameterDescriptor>,
    pub return_type: Option<TypeHint>,
    pub returns_reference: bool,
    pub tentative_return_type: bool,
    pub is_closure: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyDescriptor {
    pub name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_readonly: bool,
    #[serde(rename = "type")]
    pub type_hint: Option<TypeHint>,
    pub default: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassDescriptor {
    pub name: String,
    pub kind: ClassKind,
    pub is_final: bool,
    pub is_abstract: bool,
    /// Defined by the engine or an extension rather than user code.
    pub is_internal: bool,
    pub is_readonly: bool,
    pub parent: Option<String>,
    /// Directly implemented interfaces, or extended ones for an interface.
    pub interfaces: Vec<String>,
    pub methods: Vec<MethodDescriptor>,
    pub properties: Vec<PropertyDescriptor>,
}

impl ClassDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    /// Whether instances of this class could exist at all.
    pub fn is_instantiable_kind(&self) -> bool {
        self.kind == ClassKind::Class && !self.is_abstract
    }

    /// Internal classes other than `stdClass` cannot back a lazy object.
    pub fn is_internal_non_sentinel(&self, sentinel: &str) -> bool {
        self.is_internal && !self.name.eq_ignore_ascii_case(sentinel)
    }

    /// Method declared directly on this class, by case-insensitive name.
    pub fn declared_method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }
}

/// Strip the leading namespace separator from a class reference.
pub fn normalize_class_name(name: &str) -> &str {
    name.strip_prefix('\\').unwrap_or(name)
}

//! PHP source rendering for reflected types, signatures, default values and
//! property scope maps.

pub mod default_value;
pub mod property_scopes;
pub mod signature;
pub mod types;

pub use default_value::fix_default_expression;
pub use property_scopes::{
    InheritedPropertyScopes, PropertyScope, PropertyScopeCache, PropertyScopeSupplier,
    PropertyScopes,
};
pub use signature::{ExportedSignature, export_function_signature, export_method_signature};
pub use types::{TypeContext, export_optional_type, export_type};

use std::fmt;

/// Which kind of lazy class was being generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LazyKind {
    Ghost,
    Proxy,
}

impl fmt::Display for LazyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LazyKind::Ghost => write!(f, "lazy ghost"),
            LazyKind::Proxy => write!(f, "lazy proxy"),
        }
    }
}

/// Broad reason a class cannot be made lazy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligibility {
    /// Shape of the class or its ancestors (final, abstract, internal).
    Structural,
    /// A member contract the lazy mechanism cannot honor.
    Contract,
    /// The request itself names the wrong kind of thing.
    Request,
}

/// Why a lazy class could not be generated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyError {
    ClassNotFound { kind: LazyKind, class: String },
    NotAClass { kind: LazyKind, class: String },
    NotAnInterface { kind: LazyKind, class: String },
    FinalClass { kind: LazyKind, class: String },
    NotConcrete { kind: LazyKind, class: String },
    InternalClass { kind: LazyKind, class: String },
    InternalAncestor { kind: LazyKind, class: String, ancestor: String },
    IncompatibleGetter { kind: LazyKind, class: String, return_type: String },
    FinalMethod { kind: LazyKind, class: String, method: String },
}

impl ProxyError {
    pub fn category(&self) -> Ineligibility {
        match self {
            ProxyError::ClassNotFound { .. }
            | ProxyError::NotAClass { .. }
            | ProxyError::NotAnInterface { .. } => Ineligibility::Request,
            ProxyError::FinalClass { .. }
            | ProxyError::NotConcrete { .. }
            | ProxyError::InternalClass { .. }
            | ProxyError::InternalAncestor { .. } => Ineligibility::Structural,
            ProxyError::IncompatibleGetter { .. } | ProxyError::FinalMethod { .. } => {
                Ineligibility::Contract
            }
        }
    }

    /// The class the request was about.
    pub fn class(&self) -> &str {
        match self {
            ProxyError::ClassNotFound { class, .. }
            | ProxyError::NotAClass { class, .. }
            | ProxyError::NotAnInterface { class, .. }
            | ProxyError::FinalClass { class, .. }
            | ProxyError::NotConcrete { class, .. }
            | ProxyError::InternalClass { class, .. }
            | ProxyError::InternalAncestor { class, .. }
            | ProxyError::IncompatibleGetter { class, .. }
            | ProxyError::FinalMethod { class, .. } => class,
        }
    }
}

impl fmt::Display for ProxyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyError::ClassNotFound { kind, class } => {
                write!(f, "Cannot generate {}: class \"{}\" does not exist.", kind, class)
            }
            ProxyError::NotAClass { kind, class } => {
                write!(f, "Cannot generate {}: \"{}\" is not a class.", kind, class)
            }
            ProxyError::NotAnInterface { kind, class } => {
                write!(f, "Cannot generate {}: \"{}\" is not an interface.", kind, class)
            }
            ProxyError::FinalClass { kind, class } => {
                write!(f, "Cannot generate {}: class \"{}\" is final.", kind, class)
            }
            ProxyError::NotConcrete { kind, class } => {
                write!(f, "Cannot generate {}: \"{}\" is not a concrete class.", kind, class)
            }
            ProxyError::InternalClass { kind, class } => {
                write!(f, "Cannot generate {}: class \"{}\" is internal.", kind, class)
            }
            ProxyError::InternalAncestor {
                kind,
                class,
                ancestor,
            } => write!(
                f,
                "Cannot generate {}: class \"{}\" extends \"{}\" which is internal.",
                kind, class, ancestor
            ),
            ProxyError::IncompatibleGetter {
                kind,
                class,
                return_type,
            } => write!(
                f,
                "Cannot generate {}: return type of method \"{}::__get()\" should be \"mixed\", \"{}\" given.",
                kind, class, return_type
            ),
            ProxyError::FinalMethod {
                kind,
                class,
                method,
            } => write!(
                f,
                "Cannot generate {}: method \"{}::{}()\" is final.",
                kind, class, method
            ),
        }
    }
}

impl std::error::Error for ProxyError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offender() {
        let err = ProxyError::FinalMethod {
            kind: LazyKind::Proxy,
            class: "Foo".to_string(),
            method: "bar".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot generate lazy proxy: method \"Foo::bar()\" is final."
        );
        assert_eq!(err.category(), Ineligibility::Contract);
        assert_eq!(err.class(), "Foo");

        let err = ProxyError::InternalAncestor {
            kind: LazyKind::Ghost,
            class: "App\\Obj".to_string(),
            ancestor: "ArrayObject".to_string(),
        };
        assert_eq!(err.category(), Ineligibility::Structural);
        assert!(err.to_string().starts_with("Cannot generate lazy ghost:"));
    }
}

use crate::{
    binding::BindingError, compile::CompileError, config::ConfigError, exec::ExecuteError,
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Boundary errors are kept verbatim in `detail`.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
    pub detail: Option<ErrorDetail>,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    /// No projection is registered for the `(source, target)` pair.
    pub fn projection_not_found(source: &str, target: &str) -> Self {
        Self::new(
            ErrorClass::NotFound,
            ErrorOrigin::Registry,
            format!("no projection registered for {source} -> {target}"),
        )
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.class, ErrorClass::NotFound)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorDetail
///
/// Origin-specific error payload carried by [`InternalError`].
///

#[derive(Debug, ThisError)]
pub enum ErrorDetail {
    #[error("{0}")]
    Binding(BindingError),

    #[error("{0}")]
    Compile(CompileError),

    #[error("{0}")]
    Execute(ExecuteError),

    #[error("{0}")]
    Config(ConfigError),
}

impl From<BindingError> for InternalError {
    fn from(err: BindingError) -> Self {
        Self {
            class: binding_class(&err),
            origin: ErrorOrigin::Binding,
            message: err.to_string(),
            detail: Some(ErrorDetail::Binding(err)),
        }
    }
}

impl From<CompileError> for InternalError {
    fn from(err: CompileError) -> Self {
        Self {
            class: compile_class(&err),
            origin: ErrorOrigin::Compile,
            message: err.to_string(),
            detail: Some(ErrorDetail::Compile(err)),
        }
    }
}

impl From<ExecuteError> for InternalError {
    fn from(err: ExecuteError) -> Self {
        let class = match &err {
            ExecuteError::Binding(inner) => binding_class(inner),
            ExecuteError::RowShape(_) | ExecuteError::Materialize { .. } => {
                ErrorClass::TypeMismatch
            }
            ExecuteError::SourceMismatch { .. } | ExecuteError::Adapter(_) => {
                ErrorClass::Unsupported
            }
            ExecuteError::Record(_)
            | ExecuteError::NotALambda
            | ExecuteError::NotARecord
            | ExecuteError::NestedLambda
            | ExecuteError::UnboundVariable { .. }
            | ExecuteError::MissingMember { .. } => ErrorClass::InvariantViolation,
        };

        Self {
            class,
            origin: ErrorOrigin::Execute,
            message: err.to_string(),
            detail: Some(ErrorDetail::Execute(err)),
        }
    }
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self {
            class: ErrorClass::InvalidSpec,
            origin: ErrorOrigin::Config,
            message: err.to_string(),
            detail: Some(ErrorDetail::Config(err)),
        }
    }
}

const fn binding_class(err: &BindingError) -> ErrorClass {
    match err {
        BindingError::EmptyName => ErrorClass::InvalidSpec,
        BindingError::Duplicate { .. } => ErrorClass::Conflict,
        BindingError::Unbound { .. } => ErrorClass::NotFound,
        BindingError::KindMismatch { .. }
        | BindingError::UntypedNull { .. }
        | BindingError::SignatureMismatch { .. } => ErrorClass::TypeMismatch,
    }
}

const fn compile_class(err: &CompileError) -> ErrorClass {
    match err {
        CompileError::UnknownField { .. }
        | CompileError::UnresolvedSource { .. }
        | CompileError::UnmappedField { .. } => ErrorClass::InvalidSpec,
        CompileError::DuplicateMapping { .. } | CompileError::DuplicateProjection { .. } => {
            ErrorClass::Conflict
        }
        CompileError::UnboundParameter { .. } => ErrorClass::NotFound,
        CompileError::KindMismatch { .. } => ErrorClass::TypeMismatch,
        CompileError::PathTooDeep { .. } | CompileError::TooManyFields { .. } => {
            ErrorClass::Unsupported
        }
        CompileError::Expr(_) => ErrorClass::InvariantViolation,
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Conflict,
    NotFound,
    InvalidSpec,
    TypeMismatch,
    Unsupported,
    InvariantViolation,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Conflict => "conflict",
            Self::NotFound => "not_found",
            Self::InvalidSpec => "invalid_spec",
            Self::TypeMismatch => "type_mismatch",
            Self::Unsupported => "unsupported",
            Self::InvariantViolation => "invariant_violation",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Binding,
    Compile,
    Execute,
    Config,
    Registry,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Binding => "binding",
            Self::Compile => "compile",
            Self::Execute => "execute",
            Self::Config => "config",
            Self::Registry => "registry",
        };
        write!(f, "{label}")
    }
}

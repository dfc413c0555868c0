use candid::CandidType;
use derive_more::Display;
use projector_core::{
    binding::BindingError,
    compile::CompileError,
    config::ConfigError,
    error::{ErrorClass, ErrorDetail, ErrorOrigin as CoreErrorOrigin, InternalError},
    exec::ExecuteError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(CandidType, Debug, Deserialize, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        let kind = match &err.detail {
            Some(ErrorDetail::Binding(inner)) => ErrorKind::Binding(inner.into()),
            Some(ErrorDetail::Execute(ExecuteError::Binding(inner))) => {
                ErrorKind::Binding(inner.into())
            }
            Some(ErrorDetail::Compile(CompileError::UnboundParameter { .. })) => {
                ErrorKind::Binding(BindingErrorKind::Unbound)
            }
            Some(ErrorDetail::Config(_)) => ErrorKind::Config,
            _ => match err.class {
                ErrorClass::InvalidSpec => ErrorKind::Projection(ProjectionErrorKind::Invalid),
                ErrorClass::NotFound => ErrorKind::Projection(ProjectionErrorKind::NotFound),
                ErrorClass::Conflict => ErrorKind::Projection(ProjectionErrorKind::Conflict),
                ErrorClass::TypeMismatch => {
                    ErrorKind::Projection(ProjectionErrorKind::TypeMismatch)
                }
                ErrorClass::Unsupported => ErrorKind::Projection(ProjectionErrorKind::Unsupported),
                ErrorClass::InvariantViolation => ErrorKind::Internal,
            },
        };

        Self::new(kind, err.origin.into(), err.message)
    }
}

impl From<BindingError> for Error {
    fn from(err: BindingError) -> Self {
        InternalError::from(err).into()
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        InternalError::from(err).into()
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(CandidType, Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    Projection(ProjectionErrorKind),
    Binding(BindingErrorKind),

    /// Configuration could not be loaded.
    Config,

    /// The caller cannot remediate this.
    Internal,
}

///
/// ProjectionErrorKind
///

#[derive(CandidType, Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ProjectionErrorKind {
    /// Specification is malformed (unknown fields, unresolved paths).
    Invalid,

    /// No projection is registered for the requested shapes.
    NotFound,

    /// A mapping or registration already exists.
    Conflict,

    /// A source or row does not fit the declared field kind.
    TypeMismatch,

    /// Exceeds a configured limit or the adapter cannot serve it.
    Unsupported,
}

///
/// BindingErrorKind
///

#[derive(CandidType, Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum BindingErrorKind {
    /// Name is empty.
    Invalid,

    /// Name was bound twice.
    Duplicate,

    /// Parameter referenced but never bound.
    Unbound,

    /// Bound value or declared kind does not fit the slot.
    TypeMismatch,
}

impl From<&BindingError> for BindingErrorKind {
    fn from(err: &BindingError) -> Self {
        match err {
            BindingError::EmptyName => Self::Invalid,
            BindingError::Duplicate { .. } => Self::Duplicate,
            BindingError::Unbound { .. } => Self::Unbound,
            BindingError::KindMismatch { .. }
            | BindingError::UntypedNull { .. }
            | BindingError::SignatureMismatch { .. } => Self::TypeMismatch,
        }
    }
}

///
/// ErrorOrigin
/// Public origin taxonomy for callers.
///

#[derive(CandidType, Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Binding,
    Compile,
    Config,
    Execute,
    Registry,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Binding => Self::Binding,
            CoreErrorOrigin::Compile => Self::Compile,
            CoreErrorOrigin::Config => Self::Config,
            CoreErrorOrigin::Execute => Self::Execute,
            CoreErrorOrigin::Registry => Self::Registry,
        }
    }
}

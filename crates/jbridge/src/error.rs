use std::{
    borrow::Cow,
    fmt::{self, Display},
};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Result type alias for bridge operations that can fail with a host-level error.
pub type RunResult<T> = Result<T, RunError>;

/// Host exception types raised by the bridge.
///
/// Each variant displays as the host exception class name, so errors render the
/// way host code expects to see them (`MemoryError`, `AttributeError: ...`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, Serialize, Deserialize)]
pub enum ExcType {
    /// Environment missing, registration invariants broken, or a remote call failed.
    RuntimeError,
    /// The remote runtime could not create a persistent reference.
    MemoryError,
    /// Protocol not supported by the value, or no overload matched.
    TypeError,
    AttributeError,
    ValueError,
}

impl ExcType {
    #[must_use]
    pub(crate) fn runtime_error(msg: impl Display) -> RunError {
        SimpleException::new_msg(Self::RuntimeError, msg).into()
    }

    /// Creates the `MemoryError` raised when a persistent reference cannot be acquired.
    #[must_use]
    pub(crate) fn no_memory() -> RunError {
        SimpleException::new(Self::MemoryError, None).into()
    }

    #[must_use]
    pub(crate) fn type_error(msg: impl Display) -> RunError {
        SimpleException::new_msg(Self::TypeError, msg).into()
    }

    /// Creates an AttributeError for when an attribute is not found.
    ///
    /// Matches the host format: `'X' object has no attribute 'name'`.
    #[must_use]
    pub(crate) fn attribute_error(type_name: impl Display, attr: &str) -> RunError {
        SimpleException::new_msg(
            Self::AttributeError,
            format!("'{type_name}' object has no attribute '{attr}'"),
        )
        .into()
    }

    /// Creates an AttributeError for a missing attribute on a type object.
    #[must_use]
    pub(crate) fn attribute_error_type(type_name: impl Display, attr: &str) -> RunError {
        SimpleException::new_msg(
            Self::AttributeError,
            format!("type object '{type_name}' has no attribute '{attr}'"),
        )
        .into()
    }

    #[must_use]
    pub(crate) fn type_error_no_len(type_name: impl Display) -> RunError {
        Self::type_error(format!("object of type '{type_name}' has no len()"))
    }

    #[must_use]
    pub(crate) fn type_error_not_sub(type_name: impl Display) -> RunError {
        Self::type_error(format!("'{type_name}' object is not subscriptable"))
    }

    #[must_use]
    pub(crate) fn type_error_not_sub_assignment(type_name: impl Display) -> RunError {
        Self::type_error(format!("'{type_name}' object does not support item assignment"))
    }

    #[must_use]
    pub(crate) fn type_error_not_callable(type_name: impl Display) -> RunError {
        Self::type_error(format!("'{type_name}' object is not callable"))
    }
}

/// Lightweight representation of a host exception: its type and optional message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimpleException {
    exc_type: ExcType,
    arg: Option<String>,
}

impl SimpleException {
    /// Creates a new exception with the given type and optional argument message.
    #[must_use]
    pub fn new(exc_type: ExcType, arg: Option<String>) -> Self {
        Self { exc_type, arg }
    }

    /// Creates a new exception with the given type and message.
    #[must_use]
    pub fn new_msg(exc_type: ExcType, msg: impl Display) -> Self {
        Self {
            exc_type,
            arg: Some(msg.to_string()),
        }
    }

    #[must_use]
    pub fn exc_type(&self) -> ExcType {
        self.exc_type
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.arg.as_deref()
    }
}

impl Display for SimpleException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.arg {
            Some(arg) => write!(f, "{}: {arg}", self.exc_type),
            None => write!(f, "{}", self.exc_type),
        }
    }
}

/// Errors surfaced to host code by the bridge.
///
/// Three variants:
/// - `Exc`: a host exception raised by a bridge operation (environment missing,
///   remote call failed, out of memory, unknown attribute, ...)
/// - `Conversion`: a value could not be converted between the two runtimes; kept
///   apart from `Exc` so callers can tell "bad value" from "bad call"
/// - `Internal`: a broken bridge invariant, such as a proxy type without a remote
///   class reference; never caused by host code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunError {
    Exc(Box<SimpleException>),
    Conversion(Box<SimpleException>),
    Internal(Cow<'static, str>),
}

impl From<SimpleException> for RunError {
    fn from(exc: SimpleException) -> Self {
        Self::Exc(Box::new(exc))
    }
}

impl RunError {
    /// Creates a host exception error, for use by collaborators outside this crate.
    #[must_use]
    pub fn exception(exc_type: ExcType, msg: impl Display) -> Self {
        SimpleException::new_msg(exc_type, msg).into()
    }

    /// Creates a value-conversion error.
    #[must_use]
    pub fn conversion(exc_type: ExcType, msg: impl Display) -> Self {
        Self::Conversion(Box::new(SimpleException::new_msg(exc_type, msg)))
    }

    #[must_use]
    pub fn internal(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the host exception type this error is raised as.
    ///
    /// Internal errors surface as `RuntimeError`.
    #[must_use]
    pub fn exc_type(&self) -> ExcType {
        match self {
            Self::Exc(exc) | Self::Conversion(exc) => exc.exc_type(),
            Self::Internal(_) => ExcType::RuntimeError,
        }
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Exc(exc) | Self::Conversion(exc) => exc.message(),
            Self::Internal(msg) => Some(msg.as_ref()),
        }
    }

    #[must_use]
    pub fn is_conversion(&self) -> bool {
        matches!(self, Self::Conversion(_))
    }

    /// Returns true if this error is a host exception of `exc_type`.
    #[must_use]
    pub fn is_exception_type(&self, exc_type: ExcType) -> bool {
        match self {
            Self::Exc(exc) => exc.exc_type() == exc_type,
            _ => false,
        }
    }
}

impl Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exc(exc) => write!(f, "{exc}"),
            Self::Conversion(exc) => write!(f, "conversion failed: {exc}"),
            Self::Internal(msg) => write!(f, "RuntimeError: internal error in jbridge: {msg}"),
        }
    }
}

impl std::error::Error for RunError {}

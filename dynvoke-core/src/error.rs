//! # Fault Taxonomy
//!
//! Internally the invocation pipeline is an ordinary `Result` computation over
//! [`Fault`]; only [`crate::executor::execute`] collapses a fault into the
//! string result the public contract requires. Tests can therefore assert on
//! the structured fault through [`crate::executor::try_execute`] instead of
//! probing string content.
use crate::BoxError;
use std::fmt;

/// Everything that can go wrong during a single dynamic call.
#[derive(Debug, thiserror::Error)]
pub enum Fault {
    /// The declared parameter count differs from the supplied array.
    /// Short-circuits before any coercion is attempted.
    #[error("parameter count mismatch: method declares {expected}, request supplied {supplied}")]
    ArityMismatch { expected: usize, supplied: usize },
    /// A scalar conversion, enum member lookup or struct binding failed.
    #[error("cannot coerce parameter {position}: {reason}")]
    Coercion { position: usize, reason: String },
    /// The invocation shim failed: target type mismatch, an unset or
    /// mistyped argument slot, an error returned by the method itself, or
    /// result serialization.
    #[error(transparent)]
    Invocation(#[from] InvocationError),
}

/// An error raised while invoking the target method, tagged with the concrete
/// error type's name so diagnostic traces read like
/// `sample_service::SampleError: the sample service is closed`.
#[derive(Debug)]
pub struct InvocationError {
    type_name: &'static str,
    source: BoxError,
}

impl InvocationError {
    /// Wraps a typed error, recording its `std::any::type_name` before the
    /// type is erased.
    pub fn from_typed<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            type_name: std::any::type_name::<E>(),
            source: Box::new(source),
        }
    }

    /// The recorded name of the concrete error type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Display for InvocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.type_name, self.source)
    }
}

impl std::error::Error for InvocationError {
    // Display already renders the wrapped error, so the chain starts at its
    // cause to keep traces free of duplicate lines.
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.source()
    }
}

/// Failures of the argument downcasts the invocation shim performs. They
/// surface as an [`InvocationError`] when a handler unpacks its
/// [`crate::Args`].
#[derive(Debug, thiserror::Error)]
pub enum ArgBindError {
    #[error("argument {index} was left unset by the coercer")]
    Unset { index: usize },
    #[error("argument {index} is not a '{expected}'")]
    TypeMismatch { index: usize, expected: &'static str },
    #[error("argument index {index} is out of bounds")]
    OutOfBounds { index: usize },
    #[error("target instance is not a '{expected}'")]
    TargetMismatch { expected: &'static str },
}

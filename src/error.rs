//! Error type shared by dispatch, the interpreters and the numeric kernels.

use crate::{DType, Shape};

/// Errors raised while binding a primitive or running a transformation.
///
/// Every error is fatal to the call that produced it. Interpreter scopes
/// entered by that call have already been popped by the time the error
/// reaches the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// An operand's element type is outside what the primitive accepts.
    #[error("primitive '{primitive}' does not support dtype {dtype}")]
    UnsupportedType {
        /// Name of the primitive being evaluated.
        primitive: &'static str,
        /// The offending dtype.
        dtype: DType,
    },

    /// The active interpreter has no rule for the primitive.
    #[error("no {interpreter} rule registered for primitive '{primitive}'")]
    MissingRule {
        /// Name of the primitive being dispatched.
        primitive: &'static str,
        /// Kind of the interpreter that was asked to run it.
        interpreter: &'static str,
    },

    /// A tracer from a higher level reached a lower-level interpreter.
    #[error("can't lift level {from} to {to}")]
    Level {
        /// Level of the tracer.
        from: usize,
        /// Level of the interpreter it was raised to.
        to: usize,
    },

    /// Two distinct interpreters claim the same level.
    #[error("different interpreters at the same level {level}")]
    InterpreterConflict {
        /// The contested level.
        level: usize,
    },

    /// A value without a single concrete element was coerced to `bool`.
    #[error("{aval} can't be unambiguously converted to bool")]
    Ambiguity {
        /// Rendering of the abstract value that was coerced.
        aval: String,
    },

    /// Operand or argument counts disagree.
    #[error("{context}: expected {expected} values, got {actual}")]
    Arity {
        /// What was being counted.
        context: &'static str,
        /// Count required.
        expected: usize,
        /// Count supplied.
        actual: usize,
    },

    /// A tangent does not have the shape and dtype of its primal.
    #[error(
        "tangent {index} has type {tangent_dtype}{tangent_shape}, \
         primal has {primal_dtype}{primal_shape}"
    )]
    TangentMismatch {
        /// Position of the pair in the argument list.
        index: usize,
        /// Shape of the primal.
        primal_shape: Shape,
        /// Dtype of the primal.
        primal_dtype: DType,
        /// Shape of the tangent.
        tangent_shape: Shape,
        /// Dtype of the tangent.
        tangent_dtype: DType,
    },

    /// A kernel rejected the shapes or axis parameters it was given.
    #[error("{primitive}: {message}")]
    Shape {
        /// Name of the primitive being evaluated.
        primitive: &'static str,
        /// Description of the mismatch.
        message: String,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

//! The closed set of primitive operations.

use crate::Shape;
use std::fmt;

/// Primitive operations understood by every interpreter.
///
/// Parameters of the shape primitives travel inside the variant, so a
/// `Primitive` value is the full description of a call apart from its
/// operands.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// Element-wise sum with broadcasting.
    Add,
    /// Element-wise product with broadcasting.
    Mul,
    /// Element-wise negation.
    Neg,
    /// Element-wise sine.
    Sin,
    /// Element-wise cosine.
    Cos,
    /// Element-wise `x > y`.
    Greater,
    /// Element-wise `x < y`.
    Less,
    /// Axis permutation.
    Transpose {
        /// Output axis `i` is input axis `perm[i]`.
        perm: Vec<usize>,
    },
    /// Insert singleton axes, then broadcast.
    Broadcast {
        /// Target shape.
        shape: Shape,
        /// Positions of the inserted axes in the output.
        axes: Vec<usize>,
    },
    /// Sum over axes.
    ReduceSum {
        /// Axes summed away.
        axes: Vec<usize>,
    },
    /// Staged call of a sub-computation. Reserved: no interpreter in this
    /// crate has a rule for it.
    Call,
}

impl Primitive {
    /// The token name, e.g. `"add"` or `"reduce_sum"`.
    pub fn name(&self) -> &'static str {
        match self {
            Primitive::Add => "add",
            Primitive::Mul => "mul",
            Primitive::Neg => "neg",
            Primitive::Sin => "sin",
            Primitive::Cos => "cos",
            Primitive::Greater => "greater",
            Primitive::Less => "less",
            Primitive::Transpose { .. } => "transpose",
            Primitive::Broadcast { .. } => "broadcast",
            Primitive::ReduceSum { .. } => "reduce_sum",
            Primitive::Call => "call",
        }
    }

    /// Number of operands the primitive takes, `None` if variadic.
    pub fn arity(&self) -> Option<usize> {
        match self {
            Primitive::Add
            | Primitive::Mul
            | Primitive::Greater
            | Primitive::Less => Some(2),
            Primitive::Neg
            | Primitive::Sin
            | Primitive::Cos
            | Primitive::Transpose { .. }
            | Primitive::Broadcast { .. }
            | Primitive::ReduceSum { .. } => Some(1),
            Primitive::Call => None,
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Transpose { perm } => write!(f, "transpose[perm={:?}]", perm),
            Primitive::Broadcast { shape, axes } => {
                write!(f, "broadcast[shape={}, axes={:?}]", shape, axes)
            }
            Primitive::ReduceSum { axes } => write!(f, "reduce_sum[axes={:?}]", axes),
            other => f.write_str(other.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(Primitive::Add.name(), "add");
        assert_eq!(Primitive::ReduceSum { axes: vec![0] }.name(), "reduce_sum");
        assert_eq!(Primitive::Call.name(), "call");
    }

    #[test]
    fn test_arity() {
        assert_eq!(Primitive::Mul.arity(), Some(2));
        assert_eq!(Primitive::Less.arity(), Some(2));
        assert_eq!(Primitive::Cos.arity(), Some(1));
        assert_eq!(Primitive::Transpose { perm: vec![1, 0] }.arity(), Some(1));
        assert_eq!(Primitive::Call.arity(), None);
    }

    #[test]
    fn test_display_includes_params() {
        assert_eq!(Primitive::Sin.to_string(), "sin");
        assert_eq!(
            Primitive::Transpose { perm: vec![1, 0] }.to_string(),
            "transpose[perm=[1, 0]]"
        );
        assert_eq!(
            Primitive::Broadcast { shape: Shape::new(vec![2, 3]), axes: vec![0] }
                .to_string(),
            "broadcast[shape=(2, 3), axes=[0]]"
        );
    }
}

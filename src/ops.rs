//! Primitive operations over values.
//!
//! Each function binds one primitive. Operands may be raw arrays, Rust
//! scalars or tracers, in any mix; which interpreter runs the call is
//! decided by [`bind`](crate::trace::bind).

use crate::error::Result;
use crate::trace::{bind, Primitive, Value};
use crate::Shape;

/// Element-wise `x + y` with broadcasting.
pub fn add(x: impl Into<Value>, y: impl Into<Value>) -> Result<Value> {
    bind(&Primitive::Add, &[x.into(), y.into()])
}

/// Element-wise `x * y` with broadcasting.
pub fn mul(x: impl Into<Value>, y: impl Into<Value>) -> Result<Value> {
    bind(&Primitive::Mul, &[x.into(), y.into()])
}

/// Element-wise `-x`.
pub fn neg(x: impl Into<Value>) -> Result<Value> {
    bind(&Primitive::Neg, &[x.into()])
}

/// Element-wise sine.
pub fn sin(x: impl Into<Value>) -> Result<Value> {
    bind(&Primitive::Sin, &[x.into()])
}

/// Element-wise cosine.
pub fn cos(x: impl Into<Value>) -> Result<Value> {
    bind(&Primitive::Cos, &[x.into()])
}

/// Element-wise `x > y`, as booleans.
pub fn greater(x: impl Into<Value>, y: impl Into<Value>) -> Result<Value> {
    bind(&Primitive::Greater, &[x.into(), y.into()])
}

/// Element-wise `x < y`, as booleans.
pub fn less(x: impl Into<Value>, y: impl Into<Value>) -> Result<Value> {
    bind(&Primitive::Less, &[x.into(), y.into()])
}

/// Permute axes: output axis `i` is input axis `perm[i]`.
pub fn transpose(x: impl Into<Value>, perm: &[usize]) -> Result<Value> {
    bind(&Primitive::Transpose { perm: perm.to_vec() }, &[x.into()])
}

/// Insert singleton axes at `axes` (positions in the output) and broadcast
/// the result to `shape`.
///
/// # Examples
///
/// ```
/// # use minijax::{ops, Shape};
/// let y = ops::broadcast(2.0, Shape::new(vec![2, 2]), &[0, 1]).unwrap();
/// assert_eq!(y.shape().as_slice(), &[2, 2]);
/// ```
pub fn broadcast(
    x: impl Into<Value>,
    shape: impl Into<Shape>,
    axes: &[usize],
) -> Result<Value> {
    let primitive = Primitive::Broadcast { shape: shape.into(), axes: axes.to_vec() };
    bind(&primitive, &[x.into()])
}

/// Sum over `axes`, or over every axis when `axes` is `None`.
pub fn reduce_sum(x: impl Into<Value>, axes: Option<&[usize]>) -> Result<Value> {
    let x = x.into();
    let axes = match axes {
        Some(axes) => axes.to_vec(),
        None => (0..x.ndim()).collect(),
    };
    bind(&Primitive::ReduceSum { axes }, &[x])
}

/// Staged call of a sub-computation.
///
/// No interpreter in this crate implements it; binding it always fails
/// with [`Error::MissingRule`](crate::Error::MissingRule).
pub fn call(operands: &[Value]) -> Result<Value> {
    bind(&Primitive::Call, operands)
}

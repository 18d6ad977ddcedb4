//! The evaluation interpreter: level 0, runs primitives on raw arrays.

use crate::error::{Error, Result};
use crate::trace::{Primitive, Value};
use crate::Array;

/// Raw values are already evaluation tracers.
pub(crate) fn pure(value: Value) -> Value {
    value
}

/// Nothing sits below level 0, so lifting is the identity.
pub(crate) fn lift(value: Value) -> Value {
    value
}

/// Run the numeric kernel for `primitive`.
///
/// Operand counts have been checked against [`Primitive::arity`].
pub(crate) fn interp(primitive: &Primitive, operands: Vec<Value>) -> Result<Value> {
    let arrays = operands
        .iter()
        .map(expect_array)
        .collect::<Result<Vec<&Array>>>()?;

    let out = match primitive {
        Primitive::Add => arrays[0].add(arrays[1])?,
        Primitive::Mul => arrays[0].mul(arrays[1])?,
        Primitive::Neg => arrays[0].neg()?,
        Primitive::Sin => arrays[0].sin()?,
        Primitive::Cos => arrays[0].cos()?,
        Primitive::Greater => arrays[0].greater(arrays[1])?,
        Primitive::Less => arrays[0].less(arrays[1])?,
        Primitive::Transpose { perm } => arrays[0].transpose(perm)?,
        Primitive::Broadcast { shape, axes } => arrays[0].broadcast(shape, axes)?,
        Primitive::ReduceSum { axes } => arrays[0].reduce_sum(axes)?,
        Primitive::Call => {
            return Err(Error::MissingRule {
                primitive: primitive.name(),
                interpreter: "eval",
            })
        }
    };
    Ok(Value::Array(out))
}

fn expect_array(value: &Value) -> Result<&Array> {
    match value {
        Value::Array(array) => Ok(array),
        Value::Jvp(_) => Err(Error::Level { from: value.level(), to: 0 }),
    }
}

//! Forward-mode automatic differentiation (jvp).
//!
//! A JVP interpreter carries every value as a (primal, tangent) pair and
//! pushes tangents through each primitive with the rules below. Primals and
//! tangents may themselves be tracers of lower-level interpreters, which is
//! what makes `jvp` of a function that calls `jvp` work.

use crate::error::{Error, Result};
use crate::ops;
use crate::trace::{
    bind, full_raise, new_interpreter, Interpreter, InterpreterKind, Primitive, Value,
};
use crate::Array;
use std::rc::Rc;

/// A value under a JVP interpreter: its primal and tangent.
#[derive(Debug)]
pub struct JvpTracer {
    interpreter: Interpreter,
    primal: Value,
    tangent: Value,
}

impl JvpTracer {
    /// The interpreter that created this tracer.
    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    /// The value being differentiated.
    pub fn primal(&self) -> &Value {
        &self.primal
    }

    /// Its directional derivative.
    pub fn tangent(&self) -> &Value {
        &self.tangent
    }
}

fn new_tracer(interpreter: &Interpreter, primal: Value, tangent: Value) -> Value {
    Value::Jvp(Rc::new(JvpTracer {
        interpreter: interpreter.clone(),
        primal,
        tangent,
    }))
}

/// Pair a constant with a zero tangent.
pub(crate) fn pure(interpreter: &Interpreter, value: Value) -> Value {
    // The zero is a raw array; dispatch raises it to whatever level it meets.
    let zero = Array::zeros(value.shape(), value.dtype());
    new_tracer(interpreter, value, Value::Array(zero))
}

/// Pair a lower-level tracer with a zero tangent at this level.
pub(crate) fn lift(interpreter: &Interpreter, value: Value) -> Value {
    pure(interpreter, value)
}

/// Apply the JVP rule of `primitive` to tracers of `interpreter`.
pub(crate) fn interp(
    interpreter: &Interpreter,
    primitive: &Primitive,
    operands: Vec<Value>,
) -> Result<Value> {
    let (primals, tangents): (Vec<Value>, Vec<Value>) = operands
        .into_iter()
        .map(|operand| split(interpreter, operand))
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .unzip();

    let (primal_out, tangent_out) = jvp_rule(primitive, &primals, &tangents)?;
    Ok(new_tracer(interpreter, primal_out, tangent_out))
}

/// Unpack a tracer of `interpreter` into its primal and tangent.
///
/// Values reach here after [`full_raise`], so anything else is a value
/// from the wrong level.
fn split(interpreter: &Interpreter, value: Value) -> Result<(Value, Value)> {
    match value {
        Value::Jvp(tracer) if tracer.interpreter.same(interpreter) => {
            Ok((tracer.primal.clone(), tracer.tangent.clone()))
        }
        other if other.level() == interpreter.level() => {
            Err(Error::InterpreterConflict { level: other.level() })
        }
        other => Err(Error::Level { from: other.level(), to: interpreter.level() }),
    }
}

/// `(primals, tangents) -> (primal_out, tangent_out)` for each primitive.
///
/// Operand counts have been checked against [`Primitive::arity`].
fn jvp_rule(
    primitive: &Primitive,
    primals: &[Value],
    tangents: &[Value],
) -> Result<(Value, Value)> {
    match primitive {
        Primitive::Add => {
            let (x, y) = (&primals[0], &primals[1]);
            let (x_dot, y_dot) = (&tangents[0], &tangents[1]);
            Ok((ops::add(x, y)?, ops::add(x_dot, y_dot)?))
        }

        Primitive::Mul => {
            // d(xy) = x'y + xy'
            let (x, y) = (&primals[0], &primals[1]);
            let (x_dot, y_dot) = (&tangents[0], &tangents[1]);
            let tangent = ops::add(ops::mul(x_dot, y)?, ops::mul(x, y_dot)?)?;
            Ok((ops::mul(x, y)?, tangent))
        }

        Primitive::Neg => Ok((ops::neg(&primals[0])?, ops::neg(&tangents[0])?)),

        Primitive::Sin => {
            let (x, x_dot) = (&primals[0], &tangents[0]);
            Ok((ops::sin(x)?, ops::mul(ops::cos(x)?, x_dot)?))
        }

        Primitive::Cos => {
            let (x, x_dot) = (&primals[0], &tangents[0]);
            let tangent = ops::mul(ops::neg(ops::sin(x)?)?, x_dot)?;
            Ok((ops::cos(x)?, tangent))
        }

        Primitive::Greater | Primitive::Less => {
            // Not differentiable: the output carries a zero tangent.
            let primal = bind(primitive, primals)?;
            let zero = Array::zeros(primal.shape(), primal.dtype());
            Ok((primal, Value::Array(zero)))
        }

        Primitive::Transpose { perm } => Ok((
            ops::transpose(&primals[0], perm)?,
            ops::transpose(&tangents[0], perm)?,
        )),

        Primitive::Broadcast { shape, axes } => Ok((
            ops::broadcast(&primals[0], shape.clone(), axes)?,
            ops::broadcast(&tangents[0], shape.clone(), axes)?,
        )),

        Primitive::ReduceSum { axes } => Ok((
            ops::reduce_sum(&primals[0], Some(axes.as_slice()))?,
            ops::reduce_sum(&tangents[0], Some(axes.as_slice()))?,
        )),

        Primitive::Call => Err(Error::MissingRule {
            primitive: primitive.name(),
            interpreter: "jvp",
        }),
    }
}

/// Collections of values a function under [`jvp`] may return.
pub trait Outputs: Sized {
    /// Flatten into an ordered list.
    fn into_values(self) -> Vec<Value>;

    /// Rebuild from an ordered list of the same length.
    fn from_values(values: Vec<Value>) -> Result<Self>;
}

impl Outputs for Value {
    fn into_values(self) -> Vec<Value> {
        vec![self]
    }

    fn from_values(values: Vec<Value>) -> Result<Self> {
        let actual = values.len();
        let mut values = values.into_iter();
        match (values.next(), values.next()) {
            (Some(value), None) => Ok(value),
            _ => Err(Error::Arity { context: "jvp outputs", expected: 1, actual }),
        }
    }
}

impl Outputs for Vec<Value> {
    fn into_values(self) -> Vec<Value> {
        self
    }

    fn from_values(values: Vec<Value>) -> Result<Self> {
        Ok(values)
    }
}

impl<const N: usize> Outputs for [Value; N] {
    fn into_values(self) -> Vec<Value> {
        self.into()
    }

    fn from_values(values: Vec<Value>) -> Result<Self> {
        let actual = values.len();
        values.try_into().map_err(|_| Error::Arity {
            context: "jvp outputs",
            expected: N,
            actual,
        })
    }
}

impl Outputs for (Value, Value) {
    fn into_values(self) -> Vec<Value> {
        vec![self.0, self.1]
    }

    fn from_values(values: Vec<Value>) -> Result<Self> {
        let [a, b] = <[Value; 2]>::from_values(values)?;
        Ok((a, b))
    }
}

/// Evaluate `f` at `primals` and push `tangents` through it.
///
/// Returns the outputs of `f` and their tangents, in the same structure
/// `f` returned. `f` is ordinary Rust code over [`Value`]s; host control
/// flow runs eagerly on the concrete values and is not itself traced.
///
/// The JVP interpreter pushed for this call is popped before returning,
/// whether `f` succeeds, fails or panics.
///
/// # Errors
///
/// [`Error::Arity`] if `primals` and `tangents` differ in length,
/// [`Error::TangentMismatch`] if a tangent's shape or dtype differs from
/// its primal's, and any error raised while running `f`.
///
/// # Examples
///
/// ```
/// use minijax::{jvp, ops, Value};
///
/// let (y, y_dot) = jvp(
///     |x: &[Value]| ops::sin(&x[0]),
///     &[Value::from(3.0)],
///     &[Value::from(1.0)],
/// )
/// .unwrap();
/// assert!((y.item().unwrap() - 3.0f64.sin()).abs() < 1e-12);
/// assert!((y_dot.item().unwrap() - 3.0f64.cos()).abs() < 1e-12);
/// ```
pub fn jvp<F, O>(f: F, primals: &[Value], tangents: &[Value]) -> Result<(O, O)>
where
    F: FnOnce(&[Value]) -> Result<O>,
    O: Outputs,
{
    if primals.len() != tangents.len() {
        return Err(Error::Arity {
            context: "jvp tangents",
            expected: primals.len(),
            actual: tangents.len(),
        });
    }
    for (index, (primal, tangent)) in primals.iter().zip(tangents).enumerate() {
        if primal.shape() != tangent.shape() || primal.dtype() != tangent.dtype() {
            return Err(Error::TangentMismatch {
                index,
                primal_shape: primal.shape(),
                primal_dtype: primal.dtype(),
                tangent_shape: tangent.shape(),
                tangent_dtype: tangent.dtype(),
            });
        }
    }

    let scope = new_interpreter(InterpreterKind::Jvp, None);
    let interpreter = scope.interpreter();

    let inputs: Vec<Value> = primals
        .iter()
        .zip(tangents)
        .map(|(primal, tangent)| new_tracer(interpreter, primal.clone(), tangent.clone()))
        .collect();

    let outputs = f(&inputs)?.into_values();

    let mut out_primals = Vec::with_capacity(outputs.len());
    let mut out_tangents = Vec::with_capacity(outputs.len());
    for output in outputs {
        let (primal, tangent) = lower_output(interpreter, output)?;
        out_primals.push(primal);
        out_tangents.push(tangent);
    }
    drop(scope);

    Ok((O::from_values(out_primals)?, O::from_values(out_tangents)?))
}

/// Split an output of the traced function into its primal and tangent.
fn lower_output(interpreter: &Interpreter, output: Value) -> Result<(Value, Value)> {
    split(interpreter, full_raise(interpreter, output)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{
        base_interpreter, dynamic_interpreter, new_dynamic_interpreter, stack_depth,
    };
    use crate::{DType, Shape};
    use approx::assert_abs_diff_eq;

    fn scalar_jvp<F>(f: F, x: f64, t: f64) -> (f64, f64)
    where
        F: FnOnce(&Value) -> Result<Value>,
    {
        let (y, y_dot): (Value, Value) =
            jvp(|xs| f(&xs[0]), &[Value::from(x)], &[Value::from(t)]).unwrap();
        (y.item().unwrap(), y_dot.item().unwrap())
    }

    #[test]
    fn test_jvp_add_mul() {
        // f(x) = x * x + x, f'(x) = 2x + 1
        let (y, dy) = scalar_jvp(|x| ops::add(ops::mul(x, x)?, x), 2.0, 1.0);
        assert_abs_diff_eq!(y, 6.0);
        assert_abs_diff_eq!(dy, 5.0);
    }

    #[test]
    fn test_jvp_neg() {
        let (y, dy) = scalar_jvp(|x| ops::neg(x), 2.0, 3.0);
        assert_abs_diff_eq!(y, -2.0);
        assert_abs_diff_eq!(dy, -3.0);
    }

    #[test]
    fn test_jvp_sin_cos() {
        let (y, dy) = scalar_jvp(|x| ops::sin(x), 0.5, 1.0);
        assert_abs_diff_eq!(y, 0.5f64.sin(), epsilon = 1e-12);
        assert_abs_diff_eq!(dy, 0.5f64.cos(), epsilon = 1e-12);

        let (y, dy) = scalar_jvp(|x| ops::cos(x), 0.5, 2.0);
        assert_abs_diff_eq!(y, 0.5f64.cos(), epsilon = 1e-12);
        assert_abs_diff_eq!(dy, -2.0 * 0.5f64.sin(), epsilon = 1e-12);
    }

    #[test]
    fn test_jvp_comparison_has_zero_tangent() {
        let (y, dy): (Value, Value) = jvp(
            |xs| ops::greater(&xs[0], &xs[1]),
            &[Value::from(2.0), Value::from(1.0)],
            &[Value::from(5.0), Value::from(-7.0)],
        )
        .unwrap();
        assert_eq!(y.as_array().unwrap().dtype(), DType::Bool);
        assert_eq!(y.item(), Some(1.0));
        assert_eq!(dy.item(), Some(0.0));
    }

    #[test]
    fn test_jvp_shape_rules() {
        let x = Value::from(Array::from_vec(
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            Shape::new(vec![2, 3]),
        ));
        let t = Value::from(Array::from_vec(
            vec![1.0, 0.0, 0.0, 0.0, 0.0, 2.0],
            Shape::new(vec![2, 3]),
        ));

        let (y, dy): (Value, Value) = jvp(
            |xs| {
                let xt = ops::transpose(&xs[0], &[1, 0])?;
                let b = ops::broadcast(&xt, Shape::new(vec![4, 3, 2]), &[0])?;
                ops::reduce_sum(&b, Some(&[0, 2][..]))
            },
            &[x],
            &[t],
        )
        .unwrap();

        // Column sums of x, times 4 copies.
        assert_eq!(y.as_array().unwrap().to_vec(), vec![20.0, 28.0, 36.0]);
        assert_eq!(dy.as_array().unwrap().to_vec(), vec![4.0, 0.0, 8.0]);
    }

    #[test]
    fn test_jvp_constant_output() {
        let (y, dy) = scalar_jvp(|_| Ok(Value::from(4.0)), 1.0, 1.0);
        assert_eq!(y, 4.0);
        assert_eq!(dy, 0.0);
    }

    #[test]
    fn test_jvp_multiple_outputs() {
        let ((a, b), (da, db)): ((Value, Value), (Value, Value)) = jvp(
            |xs| Ok((ops::mul(&xs[0], 3.0)?, ops::sin(&xs[0])?)),
            &[Value::from(0.0)],
            &[Value::from(1.0)],
        )
        .unwrap();
        assert_eq!(a.item(), Some(0.0));
        assert_eq!(b.item(), Some(0.0));
        assert_eq!(da.item(), Some(3.0));
        assert_eq!(db.item(), Some(1.0));
    }

    #[test]
    fn test_jvp_arity_error() {
        let result: Result<(Value, Value)> = jvp(
            |xs| Ok(xs[0].clone()),
            &[Value::from(1.0), Value::from(2.0)],
            &[Value::from(1.0)],
        );
        assert_eq!(
            result.unwrap_err(),
            Error::Arity { context: "jvp tangents", expected: 2, actual: 1 }
        );
        assert_eq!(stack_depth(), 1);
    }

    #[test]
    fn test_jvp_tangent_mismatch() {
        let result: Result<(Value, Value)> = jvp(
            |xs| Ok(xs[0].clone()),
            &[Value::from(1.0)],
            &[Value::from(1.0f32)],
        );
        assert!(matches!(result, Err(Error::TangentMismatch { index: 0, .. })));
    }

    #[test]
    fn test_jvp_call_missing_rule() {
        let result: Result<(Value, Value)> =
            jvp(|xs| ops::call(xs), &[Value::from(1.0)], &[Value::from(1.0)]);
        assert_eq!(
            result.unwrap_err(),
            Error::MissingRule { primitive: "call", interpreter: "jvp" }
        );
        assert_eq!(stack_depth(), 1);
    }

    #[test]
    fn test_jvp_restores_stack_on_panic() {
        let _override = new_dynamic_interpreter(base_interpreter());
        let depth = stack_depth();
        let dynamic = dynamic_interpreter().map(|interpreter| interpreter.id());

        let result = std::panic::catch_unwind(|| {
            let _: Result<(Value, Value)> = jvp(
                |_: &[Value]| -> Result<Value> { panic!("failure inside jvp") },
                &[Value::from(1.0)],
                &[Value::from(1.0)],
            );
        });

        assert!(result.is_err());
        assert_eq!(stack_depth(), depth);
        assert_eq!(dynamic_interpreter().map(|interpreter| interpreter.id()), dynamic);
    }

    #[test]
    fn test_interp_rejects_unraised_operands() {
        let stale = {
            let other = new_interpreter(InterpreterKind::Jvp, None);
            other.interpreter().pure(Value::from(1.0))
        };
        let scope = new_interpreter(InterpreterKind::Jvp, None);
        assert_eq!(
            interp(scope.interpreter(), &Primitive::Sin, vec![Value::from(1.0)]).unwrap_err(),
            Error::Level { from: 0, to: 1 }
        );
        assert_eq!(
            interp(scope.interpreter(), &Primitive::Neg, vec![stale]).unwrap_err(),
            Error::InterpreterConflict { level: 1 }
        );
    }

    #[test]
    fn test_output_count_mismatch() {
        assert!(<[Value; 2]>::from_values(vec![Value::from(1.0)]).is_err());
        assert!(Value::from_values(Vec::new()).is_err());
        assert!(<(Value, Value)>::from_values(vec![Value::from(1.0); 2]).is_ok());
    }
}

//! Traced values and the operator syntax that feeds them into dispatch.

use crate::error::Result;
use crate::trace::{AbstractValue, Interpreter, JvpTracer};
use crate::{ops, Array, DType, Shape};
use ndarray::ArrayD;
use std::fmt;
use std::ops::{Add, Mul, Neg};
use std::rc::Rc;

/// A value as seen by dispatch: either a raw array or a tracer owned by a
/// higher-level interpreter.
///
/// Arithmetic operators on `Value` bind the corresponding primitive, so the
/// same expression evaluates eagerly on arrays and differentiates on JVP
/// tracers.
///
/// # Panics
///
/// The operator impls (`+`, `*`, unary `-`) panic if dispatch fails, e.g.
/// on incompatible shapes. Use the functions in [`crate::ops`] to get the
/// error instead.
///
/// # Examples
///
/// ```
/// # use minijax::Value;
/// let x = Value::from(3.0);
/// let y = 2.0 * &x + 1.0;
/// assert_eq!(y.item(), Some(7.0));
/// ```
#[derive(Debug, Clone)]
pub enum Value {
    /// A raw array; at level 0 this is the tracer itself.
    Array(Array),
    /// A (primal, tangent) pair owned by a JVP interpreter.
    Jvp(Rc<JvpTracer>),
}

impl Value {
    /// The interpreter owning this value, `None` for raw arrays.
    pub fn interpreter(&self) -> Option<&Interpreter> {
        match self {
            Value::Array(_) => None,
            Value::Jvp(tracer) => Some(tracer.interpreter()),
        }
    }

    /// Level of the owning interpreter; raw arrays live at level 0.
    pub fn level(&self) -> usize {
        self.interpreter().map_or(0, Interpreter::level)
    }

    /// Returns true if this value is wrapped by an interpreter.
    pub fn is_tracer(&self) -> bool {
        self.interpreter().is_some()
    }

    /// The raw array, if this value is not a tracer.
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(array) => Some(array),
            Value::Jvp(_) => None,
        }
    }

    /// The single element of an untraced one-element value.
    pub fn item(&self) -> Option<f64> {
        self.as_array().and_then(Array::item)
    }

    /// Primal of a JVP tracer.
    pub fn primal(&self) -> Option<&Value> {
        match self {
            Value::Array(_) => None,
            Value::Jvp(tracer) => Some(tracer.primal()),
        }
    }

    /// Tangent of a JVP tracer.
    pub fn tangent(&self) -> Option<&Value> {
        match self {
            Value::Array(_) => None,
            Value::Jvp(tracer) => Some(tracer.tangent()),
        }
    }

    /// True if both values are the very same tracer.
    pub fn same_tracer(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Jvp(a), Value::Jvp(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// The innermost concrete array, following primals down to level 0.
    fn base(&self) -> &Array {
        match self {
            Value::Array(array) => array,
            Value::Jvp(tracer) => tracer.primal().base(),
        }
    }

    /// Abstract value of this value.
    ///
    /// Tracers report the abstract value of their primal, so every value
    /// in this crate is concrete.
    pub fn aval(&self) -> AbstractValue {
        AbstractValue::Concrete(self.base().clone())
    }

    /// Returns the shape.
    pub fn shape(&self) -> Shape {
        self.base().shape()
    }

    /// Returns the dtype.
    pub fn dtype(&self) -> DType {
        self.base().dtype()
    }

    /// Returns the number of dimensions.
    pub fn ndim(&self) -> usize {
        self.base().ndim()
    }

    /// Truth value for host-level control flow.
    ///
    /// Uses the concrete value available now; the branch itself is not
    /// traced.
    pub fn to_bool(&self) -> Result<bool> {
        self.aval().to_bool()
    }

    /// Element-wise `self > other`.
    pub fn gt(&self, other: impl Into<Value>) -> Result<Value> {
        ops::greater(self, other)
    }

    /// Element-wise `self < other`.
    pub fn lt(&self, other: impl Into<Value>) -> Result<Value> {
        ops::less(self, other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Array(array) => write!(f, "{}", array),
            Value::Jvp(tracer) => write!(
                f,
                "JvpTracer(level={}, primal={}, tangent={})",
                tracer.interpreter().level(),
                tracer.primal(),
                tracer.tangent()
            ),
        }
    }
}

impl From<Array> for Value {
    fn from(array: Array) -> Self {
        Value::Array(array)
    }
}

impl From<&Value> for Value {
    fn from(value: &Value) -> Self {
        value.clone()
    }
}

macro_rules! impl_from_raw {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Array(Array::from(value))
                }
            }
        )*
    };
}

impl_from_raw!(
    f64,
    f32,
    i64,
    i32,
    bool,
    ArrayD<f64>,
    ArrayD<f32>,
    ArrayD<i64>,
    ArrayD<i32>,
    ArrayD<bool>
);

fn expect_op(result: Result<Value>) -> Value {
    result.unwrap_or_else(|err| panic!("{}", err))
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $op:path) => {
        impl $trait<Value> for Value {
            type Output = Value;
            fn $method(self, rhs: Value) -> Value {
                expect_op($op(self, rhs))
            }
        }

        impl $trait<&Value> for Value {
            type Output = Value;
            fn $method(self, rhs: &Value) -> Value {
                expect_op($op(self, rhs))
            }
        }

        impl $trait<Value> for &Value {
            type Output = Value;
            fn $method(self, rhs: Value) -> Value {
                expect_op($op(self, rhs))
            }
        }

        impl $trait<&Value> for &Value {
            type Output = Value;
            fn $method(self, rhs: &Value) -> Value {
                expect_op($op(self, rhs))
            }
        }

        impl $trait<f64> for Value {
            type Output = Value;
            fn $method(self, rhs: f64) -> Value {
                expect_op($op(self, rhs))
            }
        }

        impl $trait<f64> for &Value {
            type Output = Value;
            fn $method(self, rhs: f64) -> Value {
                expect_op($op(self, rhs))
            }
        }

        impl $trait<Value> for f64 {
            type Output = Value;
            fn $method(self, rhs: Value) -> Value {
                expect_op($op(self, rhs))
            }
        }

        impl $trait<&Value> for f64 {
            type Output = Value;
            fn $method(self, rhs: &Value) -> Value {
                expect_op($op(self, rhs))
            }
        }
    };
}

impl_binary_op!(Add, add, ops::add);
impl_binary_op!(Mul, mul, ops::mul);

impl Neg for Value {
    type Output = Value;
    fn neg(self) -> Value {
        expect_op(ops::neg(self))
    }
}

impl Neg for &Value {
    type Output = Value;
    fn neg(self) -> Value {
        expect_op(ops::neg(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{new_interpreter, InterpreterKind};

    #[test]
    fn test_operators_on_raw_values() {
        let x = Value::from(3.0);
        let y = Value::from(4.0);
        assert_eq!((&x + &y).item(), Some(7.0));
        assert_eq!((&x * &y).item(), Some(12.0));
        assert_eq!((-&x).item(), Some(-3.0));
        assert_eq!((2.0 * &x).item(), Some(6.0));
        assert_eq!((x.clone() + 1.0).item(), Some(4.0));
        assert_eq!((1.0 + x).item(), Some(4.0));
    }

    #[test]
    fn test_comparison_methods() {
        let x = Value::from(2.0);
        assert!(x.gt(1.5).unwrap().to_bool().unwrap());
        assert!(!x.lt(1.5).unwrap().to_bool().unwrap());
    }

    #[test]
    #[should_panic(expected = "incompatible shapes")]
    fn test_operator_panics_on_error() {
        let a = Value::from(Array::zeros(Shape::new(vec![2]), DType::Float64));
        let b = Value::from(Array::zeros(Shape::new(vec![3]), DType::Float64));
        let _ = a + b;
    }

    #[test]
    fn test_to_bool_ambiguous_for_arrays() {
        let v = Value::from(Array::from_bools(vec![true, true], Shape::new(vec![2])));
        assert!(v.to_bool().is_err());
    }

    #[test]
    fn test_tracer_reports_primal_aval() {
        let scope = new_interpreter(InterpreterKind::Jvp, None);
        let x = Value::from(Array::from_vec(vec![1.0, 2.0], Shape::new(vec![2])));
        let tracer = scope.interpreter().pure(x);
        assert!(tracer.is_tracer());
        assert_eq!(tracer.level(), 1);
        assert_eq!(tracer.shape(), Shape::new(vec![2]));
        assert_eq!(tracer.dtype(), DType::Float64);
        assert_eq!(tracer.item(), None);
        assert_eq!(tracer.tangent().and_then(|t| t.as_array()).map(Array::to_vec),
            Some(vec![0.0, 0.0]));
    }

    #[test]
    fn test_operators_under_jvp() {
        let scope = new_interpreter(InterpreterKind::Jvp, None);
        let x = scope.interpreter().pure(Value::from(3.0));
        let y = &x * &x + 1.0;
        assert!(y.interpreter().unwrap().same(scope.interpreter()));
        assert_eq!(y.primal().and_then(Value::item), Some(10.0));
        assert_eq!(y.tangent().and_then(Value::item), Some(0.0));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from(1.0).to_string(), "Array:float64() [1.0]");
        let scope = new_interpreter(InterpreterKind::Jvp, None);
        let t = scope.interpreter().pure(Value::from(1.0));
        assert_eq!(
            t.to_string(),
            "JvpTracer(level=1, primal=Array:float64() [1.0], tangent=Array:float64() [0.0])"
        );
    }
}

//! Numerical accuracy tests for minijax.
//!
//! Results are compared against reference values within explicit
//! tolerances.

use minijax::{jvp, ops, Array, DType, Result, Shape, Value};
use std::f64::consts::PI;

/// Helper function to check if two values are close within tolerance.
fn assert_close(actual: f64, expected: f64, rtol: f64, atol: f64, msg: &str) {
    let diff = (actual - expected).abs();
    let tolerance = atol + rtol * expected.abs();
    assert!(
        diff <= tolerance,
        "{}: expected {}, got {} (diff: {}, tolerance: {})",
        msg, expected, actual, diff, tolerance
    );
}

/// Helper function to check if two arrays are element-wise close.
fn assert_array_close(actual: &Value, expected: &[f64], rtol: f64, atol: f64, msg: &str) {
    let actual_vec = actual.as_array().expect("raw array").to_vec();
    assert_eq!(actual_vec.len(), expected.len(), "{}: length mismatch", msg);

    for (i, (&a, &e)) in actual_vec.iter().zip(expected.iter()).enumerate() {
        let diff = (a - e).abs();
        let tolerance = atol + rtol * e.abs();
        assert!(
            diff <= tolerance,
            "{} at index {}: expected {}, got {} (diff: {}, tolerance: {})",
            msg, i, e, a, diff, tolerance
        );
    }
}

fn nth_derivative(n: usize, x: &Value) -> Result<Value> {
    if n == 0 {
        return ops::sin(x);
    }
    let (_, tangent): (Value, Value) = jvp(
        |xs| nth_derivative(n - 1, &xs[0]),
        std::slice::from_ref(x),
        &[Value::from(1.0)],
    )?;
    Ok(tangent)
}

// =============================================================================
// UNARY OPERATIONS
// =============================================================================

#[test]
fn test_sin_accuracy() {
    let x = Array::from_vec(
        vec![0.0, PI / 6.0, PI / 4.0, PI / 3.0, PI / 2.0],
        Shape::new(vec![5]),
    );
    let result = ops::sin(x).unwrap();
    let expected = [0.0, 0.5, 0.7071067811865476, 0.8660254037844386, 1.0];
    assert_array_close(&result, &expected, 1e-12, 1e-12, "sin");
}

#[test]
fn test_cos_accuracy() {
    let x = Array::from_vec(vec![0.0, PI / 3.0, PI / 2.0, PI], Shape::new(vec![4]));
    let result = ops::cos(x).unwrap();
    assert_array_close(&result, &[1.0, 0.5, 0.0, -1.0], 1e-12, 1e-12, "cos");
}

#[test]
fn test_float32_rounding() {
    let x = Array::from_vec_with_dtype(vec![0.1, 0.2], Shape::new(vec![2]), DType::Float32);
    let y = ops::add(x.clone(), x).unwrap();
    assert_eq!(y.dtype(), DType::Float32);
    assert_array_close(
        &y,
        &[f64::from(0.2f32), f64::from(0.4f32)],
        0.0,
        0.0,
        "float32 add",
    );
}

// =============================================================================
// DERIVATIVES
// =============================================================================

#[test]
fn test_sin_derivative_tower() {
    let x = Value::from(3.0);
    let expected = [
        3.0f64.sin(),
        -0.9899924966004454,
        -0.1411200080598672,
        0.9899924966004454,
        0.1411200080598672,
    ];
    // jvp at 3.0 yields cos(3.0); deeper derivatives cycle sign.
    for (n, &e) in expected.iter().enumerate() {
        let d = nth_derivative(n, &x).unwrap();
        assert_close(d.item().unwrap(), e, 1e-12, 1e-12, &format!("order {}", n));
    }
}

#[test]
fn test_composite_value_and_tangent() {
    let (y, y_dot): (Value, Value) = jvp(
        |xs| {
            let y = ops::add(ops::mul(2.0, ops::sin(&xs[0])?)?, 1.0)?;
            ops::add(ops::neg(y)?, &xs[0])
        },
        &[Value::from(3.0)],
        &[Value::from(1.0)],
    )
    .unwrap();
    assert_close(y.item().unwrap(), 1.7177599838802657, 1e-14, 0.0, "value");
    assert_close(y_dot.item().unwrap(), 2.979984993200891, 1e-14, 0.0, "tangent");
}

#[test]
fn test_eval_scalar_expression() {
    let a = ops::mul(2.0, ops::sin(2.0).unwrap()).unwrap();
    let b = ops::neg(ops::mul(3.0, ops::cos(1.5).unwrap()).unwrap()).unwrap();
    let c = ops::add(a, b).unwrap();
    assert_close(c.item().unwrap(), 1.6063832486482548, 1e-14, 0.0, "scalar");
}

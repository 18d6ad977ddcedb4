//! Higher-order derivatives by nesting `jvp`.
//!
//! Run with: RUST_LOG=debug cargo run --example higher_order

use minijax::{jvp, ops, Result, Value};

/// Returns the derivative of a scalar function.
fn deriv<F>(f: F) -> impl Fn(&Value) -> Result<Value>
where
    F: Fn(&Value) -> Result<Value>,
{
    move |x: &Value| {
        let (_, t): (Value, Value) =
            jvp(|xs| f(&xs[0]), std::slice::from_ref(x), &[Value::from(1.0)])?;
        Ok(t)
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let x = Value::from(3.0);
    let sin = |x: &Value| ops::sin(x);

    println!("sin(3)     = {}", sin(&x)?);
    println!("sin'(3)    = {}", deriv(sin)(&x)?);
    println!("sin''(3)   = {}", deriv(deriv(sin))(&x)?);
    println!("sin'''(3)  = {}", deriv(deriv(deriv(sin)))(&x)?);
    println!("sin''''(3) = {}", deriv(deriv(deriv(deriv(sin))))(&x)?);

    // Perturbation confusion check: d/dx [x * d/dy (x + y)] = 1
    let outer = |x: &Value| -> Result<Value> {
        let inner = deriv(|y: &Value| ops::add(x, y))(&Value::from(1.0))?;
        ops::mul(x, inner)
    };
    println!("d/dx [x * d/dy (x + y)] at 1 = {}", deriv(outer)(&Value::from(1.0))?);

    Ok(())
}

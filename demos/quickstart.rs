//! Quickstart example demonstrating minijax features.
//!
//! Run with: cargo run --example quickstart

use minijax::{jvp, ops, Array, Result, Shape, Value};

fn main() -> Result<()> {
    let _ = env_logger::try_init();

    println!("=== minijax quickstart ===\n");

    // 1. Eager evaluation
    println!("1. Eager evaluation");
    let c = ops::add(
        ops::mul(2.0, ops::sin(2.0)?)?,
        ops::neg(ops::mul(3.0, ops::cos(1.5)?)?)?,
    )?;
    println!("   2 sin(2) - 3 cos(1.5) = {}", c);
    println!(
        "   (2 > 1.5, 2 < 1.5) = ({}, {})\n",
        ops::greater(2.0, 1.5)?.to_bool()?,
        ops::less(2.0, 1.5)?.to_bool()?
    );

    // 2. Broadcasting and reductions
    println!("2. Broadcasting and reductions");
    let x = Array::from_vec(vec![1.0, 2.0, 3.0], Shape::new(vec![3, 1]));
    let y = Array::from_vec(vec![10.0, 20.0], Shape::new(vec![1, 2]));
    let z = ops::add(x, y)?;
    println!("   (3,1) + (1,2) -> {}", z.shape());
    println!("   sum over axis 1 = {}", ops::reduce_sum(&z, Some(&[1][..]))?);
    println!("   transpose -> {}\n", ops::transpose(&z, &[1, 0])?.shape());

    // 3. Forward-mode derivatives
    println!("3. Forward-mode derivatives");
    let (y, y_dot): (Value, Value) = jvp(
        |xs| {
            let y = ops::sin(&xs[0])? * 2.0 + 1.0;
            Ok(-y + &xs[0])
        },
        &[Value::from(3.0)],
        &[Value::from(1.0)],
    )?;
    println!("   f(x) = -(2 sin x + 1) + x");
    println!("   f(3) = {}, f'(3) = {}\n", y, y_dot);

    // 4. Host control flow
    println!("4. Host control flow");
    let f = |x: &Value| -> Result<Value> {
        if x.gt(0.0)?.to_bool()? {
            Ok(2.0 * x)
        } else {
            Ok(x.clone())
        }
    };
    for x0 in [3.0, -3.0] {
        let (_, t): (Value, Value) =
            jvp(|xs| f(&xs[0]), &[Value::from(x0)], &[Value::from(1.0)])?;
        println!("   f'({}) = {}", x0, t);
    }

    Ok(())
}

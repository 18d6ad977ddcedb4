//! Tracing infrastructure: values, interpreters and transformations.
//!
//! Primitive calls are routed through [`bind`], which selects an
//! interpreter from the levels of the operands. The evaluation interpreter
//! sits at level 0 and computes on arrays; each [`jvp`] call pushes a
//! forward-mode interpreter one level higher for its duration.

pub mod aval;
pub(crate) mod eval;
pub mod interpreter;
pub mod jvp;
pub mod primitive;
pub mod value;

pub use aval::AbstractValue;
pub use interpreter::{
    base_interpreter, bind, dynamic_interpreter, find_top_interpreter,
    full_lower, full_raise, new_dynamic_interpreter, new_interpreter,
    stack_depth, DynamicScope, Interpreter, InterpreterKind, InterpreterScope,
};
pub use jvp::{jvp, JvpTracer, Outputs};
pub use primitive::Primitive;
pub use value::Value;

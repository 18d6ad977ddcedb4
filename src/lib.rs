//! # minijax: composable forward-mode autodiff
//!
//! A small automatic-differentiation engine built from a stack of tracing
//! interpreters. The same primitive calls (`add`, `mul`, `sin`, …) run
//! eagerly on arrays at the bottom of the stack and propagate tangents
//! under `jvp`; nesting `jvp` gives higher-order derivatives without any
//! special casing.
//!
//! ## Key Features
//!
//! - **Primitive dispatch**: every operation binds a [`Primitive`] and is
//!   routed to the highest-level interpreter among its operands
//! - **Forward-mode AD**: [`jvp`] computes Jacobian-vector products
//! - **Composable**: `jvp` of a function that calls `jvp` just works
//! - **NumPy-style arrays**: numeric kernels delegate to `ndarray`
//!
//! ## Quick Start
//!
//! ```rust
//! use minijax::{jvp, ops, Value};
//!
//! // f(x) = 2 sin(x) + 1
//! let (y, y_dot) = jvp(
//!     |x: &[Value]| Ok(2.0 * ops::sin(&x[0])? + 1.0),
//!     &[Value::from(0.0)],
//!     &[Value::from(1.0)],
//! )
//! .unwrap();
//! assert_eq!(y.item(), Some(1.0));
//! assert_eq!(y_dot.item(), Some(2.0));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod array;
pub mod config;
mod dtype;
pub mod error;
mod kernels;
pub mod ops;
pub mod shape;
pub mod trace;

// Public exports
pub use array::{Array, ArrayData};
pub use config::Config;
pub use dtype::{DType, Element};
pub use error::{Error, Result};
pub use shape::Shape;
pub use trace::{jvp, AbstractValue, Outputs, Primitive, Value};

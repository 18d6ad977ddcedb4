//! Interpreter stack and primitive dispatch.
//!
//! Every primitive call goes through [`bind`], which picks the interpreter
//! that should run it from the levels of its operands, raises the operands
//! to that interpreter and hands them to its rule table.
//!
//! The stack is thread-local. It always holds the evaluation interpreter at
//! level 0; everything above it is owned by an [`InterpreterScope`] guard
//! and popped when the guard drops, on success, on `?` and on unwind alike.

use crate::error::{Error, Result};
use crate::trace::{eval, jvp, Primitive, Value};
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

thread_local! {
    static STACK: RefCell<InterpreterStack> = RefCell::new(InterpreterStack::new());
}

/// The semantics an interpreter assigns to primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterpreterKind {
    /// Run primitives on concrete arrays.
    Eval,
    /// Forward-mode differentiation over (primal, tangent) pairs.
    Jvp,
}

impl InterpreterKind {
    /// Short name used in logs and errors.
    pub fn name(self) -> &'static str {
        match self {
            InterpreterKind::Eval => "eval",
            InterpreterKind::Jvp => "jvp",
        }
    }
}

/// Handle to one interpretation context on the stack.
///
/// Cloning the handle does not create a new interpreter; two handles are
/// the same interpreter when their ids match.
#[derive(Clone)]
pub struct Interpreter {
    level: usize,
    id: u64,
    kind: InterpreterKind,
    payload: Option<Rc<dyn Any>>,
}

impl Interpreter {
    /// Nesting depth; higher levels take priority in dispatch.
    #[inline]
    pub fn level(&self) -> usize {
        self.level
    }

    /// Unique id within the thread.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Which rule table this interpreter uses.
    #[inline]
    pub fn kind(&self) -> InterpreterKind {
        self.kind
    }

    /// Opaque data attached when the interpreter was created.
    pub fn payload(&self) -> Option<&Rc<dyn Any>> {
        self.payload.as_ref()
    }

    /// True if both handles refer to the same interpreter.
    #[inline]
    pub fn same(&self, other: &Interpreter) -> bool {
        self.id == other.id
    }

    /// Wrap a value that carries no tracer of this interpreter.
    pub fn pure(&self, value: Value) -> Value {
        match self.kind {
            InterpreterKind::Eval => eval::pure(value),
            InterpreterKind::Jvp => jvp::pure(self, value),
        }
    }

    /// Re-express a tracer of a lower-level interpreter at this level.
    pub fn lift(&self, value: Value) -> Value {
        match self.kind {
            InterpreterKind::Eval => eval::lift(value),
            InterpreterKind::Jvp => jvp::lift(self, value),
        }
    }

    /// Apply `primitive` to operands already raised to this interpreter.
    pub fn interp(&self, primitive: &Primitive, operands: Vec<Value>) -> Result<Value> {
        if let Some(expected) = primitive.arity() {
            if operands.len() != expected {
                return Err(Error::Arity {
                    context: primitive.name(),
                    expected,
                    actual: operands.len(),
                });
            }
        }
        match self.kind {
            InterpreterKind::Eval => eval::interp(primitive, operands),
            InterpreterKind::Jvp => jvp::interp(self, primitive, operands),
        }
    }
}

impl fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interpreter")
            .field("level", &self.level)
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("payload", &self.payload.is_some())
            .finish()
    }
}

struct InterpreterStack {
    interpreters: Vec<Interpreter>,
    dynamic: Option<Interpreter>,
    next_id: u64,
}

impl InterpreterStack {
    fn new() -> Self {
        let base = Interpreter {
            level: 0,
            id: 0,
            kind: InterpreterKind::Eval,
            payload: None,
        };
        Self { interpreters: vec![base], dynamic: None, next_id: 1 }
    }
}

/// Number of interpreters on this thread's stack, the base one included.
pub fn stack_depth() -> usize {
    STACK.with(|stack| stack.borrow().interpreters.len())
}

/// The level-0 evaluation interpreter.
pub fn base_interpreter() -> Interpreter {
    STACK.with(|stack| stack.borrow().interpreters[0].clone())
}

/// The interpreter currently held in the dynamic-override slot.
pub fn dynamic_interpreter() -> Option<Interpreter> {
    STACK.with(|stack| stack.borrow().dynamic.clone())
}

/// Guard for an interpreter pushed with [`new_interpreter`].
///
/// Dropping the guard pops the interpreter.
#[must_use = "the interpreter is popped as soon as the scope is dropped"]
pub struct InterpreterScope {
    interpreter: Interpreter,
}

impl InterpreterScope {
    /// The interpreter this scope owns.
    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }
}

impl Drop for InterpreterScope {
    fn drop(&mut self) {
        let level = self.interpreter.level;
        STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            let owned = stack
                .interpreters
                .get(level)
                .is_some_and(|top| top.same(&self.interpreter));
            if !owned {
                log::error!(
                    "{} interpreter at level {} was already popped",
                    self.interpreter.kind.name(),
                    level
                );
                return;
            }
            if stack.interpreters.len() > level + 1 {
                log::error!(
                    "popping level {} with {} inner interpreters still pushed",
                    level,
                    stack.interpreters.len() - level - 1
                );
            }
            stack.interpreters.truncate(level);
        });
        log::debug!(
            "popped {} interpreter at level {}",
            self.interpreter.kind.name(),
            level
        );
    }
}

/// Push a new interpreter of `kind` one level above the current top.
pub fn new_interpreter(
    kind: InterpreterKind,
    payload: Option<Rc<dyn Any>>,
) -> InterpreterScope {
    let interpreter = STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        let interpreter = Interpreter {
            level: stack.interpreters.len(),
            id: stack.next_id,
            kind,
            payload,
        };
        stack.next_id += 1;
        stack.interpreters.push(interpreter.clone());
        interpreter
    });
    log::debug!(
        "pushed {} interpreter at level {}",
        kind.name(),
        interpreter.level
    );
    InterpreterScope { interpreter }
}

/// Guard for the dynamic-override slot set with [`new_dynamic_interpreter`].
///
/// Dropping the guard restores whatever the slot held before.
#[must_use = "the override is reverted as soon as the scope is dropped"]
pub struct DynamicScope {
    previous: Option<Interpreter>,
}

impl Drop for DynamicScope {
    fn drop(&mut self) {
        let previous = self.previous.take();
        log::debug!(
            "restoring dynamic interpreter to level {:?}",
            previous.as_ref().map(Interpreter::level)
        );
        STACK.with(|stack| stack.borrow_mut().dynamic = previous);
    }
}

/// Let `interpreter` win top-of-stack selection over any operand at a
/// lower level for as long as the returned guard lives.
///
/// Primitives bound from inside the overriding interpreter's own rules are
/// routed back to it as well, so the slot is only meant for interpreters
/// whose rules do not bind again on lower-level values.
pub fn new_dynamic_interpreter(interpreter: Interpreter) -> DynamicScope {
    log::debug!("dynamic interpreter set to level {}", interpreter.level);
    let previous = STACK
        .with(|stack| stack.borrow_mut().dynamic.replace(interpreter));
    DynamicScope { previous }
}

/// Apply `primitive` to `operands` under whichever interpreter should
/// handle them.
///
/// # Examples
///
/// ```
/// # use minijax::trace::{bind, Primitive, Value};
/// let out = bind(&Primitive::Add, &[Value::from(1.0), Value::from(2.0)]).unwrap();
/// assert_eq!(out.item(), Some(3.0));
/// ```
pub fn bind(primitive: &Primitive, operands: &[Value]) -> Result<Value> {
    let interpreter = find_top_interpreter(operands);
    log::trace!(
        "bind {} on {} interpreter at level {}",
        primitive,
        interpreter.kind.name(),
        interpreter.level
    );

    let tracers = operands
        .iter()
        .map(|operand| full_raise(&interpreter, operand.clone()))
        .collect::<Result<Vec<_>>>()
        .inspect_err(|err| log::debug!("bind {} failed: {}", primitive, err))?;

    let out = interpreter
        .interp(primitive, tracers)
        .inspect_err(|err| log::debug!("bind {} failed: {}", primitive, err))?;
    Ok(full_lower(out))
}

/// The interpreter that should handle a call on `operands`: the highest
/// level among their tracers, or the base interpreter, unless the
/// dynamic-override slot holds something higher still.
pub fn find_top_interpreter(operands: &[Value]) -> Interpreter {
    let top = operands
        .iter()
        .filter_map(Value::interpreter)
        .max_by_key(|interpreter| interpreter.level)
        .cloned()
        .unwrap_or_else(base_interpreter);

    match dynamic_interpreter() {
        Some(dynamic) if dynamic.level > top.level => dynamic,
        _ => top,
    }
}

/// Bring `value` to `interpreter`'s level.
pub fn full_raise(interpreter: &Interpreter, value: Value) -> Result<Value> {
    let Some(owner) = value.interpreter() else {
        return Ok(interpreter.pure(value));
    };

    if owner.same(interpreter) {
        Ok(value)
    } else if owner.level < interpreter.level {
        Ok(interpreter.lift(value))
    } else if owner.level > interpreter.level {
        Err(Error::Level { from: owner.level, to: interpreter.level })
    } else {
        Err(Error::InterpreterConflict { level: owner.level })
    }
}

/// Strip wrappers that carry no information beyond their contents.
///
/// A raw array is already the evaluation interpreter's tracer and a JVP
/// tracer always carries a tangent, so both are returned unchanged.
pub fn full_lower(value: Value) -> Value {
    match value {
        Value::Array(array) => Value::Array(array),
        Value::Jvp(tracer) => Value::Jvp(tracer),
    }
}

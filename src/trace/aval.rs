//! Abstract values: what dispatch knows about a value without looking at it.

use crate::error::{Error, Result};
use crate::{Array, DType, Shape};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Shape and dtype of a value, optionally refined by its concrete contents.
///
/// Two abstract values are equal when their shapes and dtypes are equal;
/// a known value does not take part in comparison or hashing.
#[derive(Debug, Clone)]
pub enum AbstractValue {
    /// Only the shape and dtype are known.
    Shaped {
        /// Array shape.
        shape: Shape,
        /// Element type.
        dtype: DType,
    },
    /// The value itself is known.
    Concrete(Array),
}

impl AbstractValue {
    /// An abstract value with unknown contents.
    pub fn shaped(shape: Shape, dtype: DType) -> Self {
        AbstractValue::Shaped { shape, dtype }
    }

    /// Returns the shape.
    pub fn shape(&self) -> Shape {
        match self {
            AbstractValue::Shaped { shape, .. } => shape.clone(),
            AbstractValue::Concrete(array) => array.shape(),
        }
    }

    /// Returns the dtype.
    pub fn dtype(&self) -> DType {
        match self {
            AbstractValue::Shaped { dtype, .. } => *dtype,
            AbstractValue::Concrete(array) => array.dtype(),
        }
    }

    /// Returns the number of dimensions.
    pub fn ndim(&self) -> usize {
        self.shape().ndim()
    }

    /// The concrete contents, if known.
    pub fn concrete(&self) -> Option<&Array> {
        match self {
            AbstractValue::Shaped { .. } => None,
            AbstractValue::Concrete(array) => Some(array),
        }
    }

    /// Forget the contents, keeping shape and dtype.
    pub fn to_shaped(&self) -> AbstractValue {
        AbstractValue::shaped(self.shape(), self.dtype())
    }

    /// A zero array of this shape and dtype.
    pub fn zeros(&self) -> Array {
        Array::zeros(self.shape(), self.dtype())
    }

    /// Truth value for host-level branching.
    ///
    /// Only a concrete value with exactly one element has one; anything
    /// else is ambiguous.
    pub fn to_bool(&self) -> Result<bool> {
        self.concrete()
            .and_then(Array::item)
            .map(|v| v != 0.0)
            .ok_or_else(|| Error::Ambiguity { aval: self.to_string() })
    }
}

impl PartialEq for AbstractValue {
    fn eq(&self, other: &Self) -> bool {
        self.shape() == other.shape() && self.dtype() == other.dtype()
    }
}

impl Eq for AbstractValue {}

impl Hash for AbstractValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.shape().hash(state);
        self.dtype().hash(state);
    }
}

impl fmt::Display for AbstractValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims: Vec<String> =
            self.shape().as_slice().iter().map(|d| d.to_string()).collect();
        write!(f, "{}[{}]", self.dtype(), dims.join(","))
    }
}

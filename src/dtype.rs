//! Element types carried by arrays and abstract values.

use crate::array::ArrayData;
use ndarray::ArrayD;
use std::fmt;

/// Numerical data type for array contents.
///
/// The closed set of element types the evaluation kernels understand.
/// Each dtype is stored with its own Rust element type (see [`Element`]).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DType {
    /// Boolean
    Bool,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 32-bit floating point
    Float32,
    /// 64-bit floating point
    Float64,
}

impl DType {
    /// Returns true if this is a floating-point dtype.
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, DType::Float32 | DType::Float64)
    }

    /// Promotes two dtypes along `bool -> int32 -> int64 -> float32 -> float64`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use minijax::DType;
    /// assert_eq!(DType::promote(DType::Bool, DType::Int32), DType::Int32);
    /// assert_eq!(DType::promote(DType::Int64, DType::Float32), DType::Float32);
    /// ```
    pub fn promote(dtype1: DType, dtype2: DType) -> DType {
        let rank = |d: DType| match d {
            DType::Bool => 0,
            DType::Int32 => 1,
            DType::Int64 => 2,
            DType::Float32 => 3,
            DType::Float64 => 4,
        };

        if rank(dtype1) >= rank(dtype2) {
            dtype1
        } else {
            dtype2
        }
    }

    /// The dtype a transcendental function (`sin`, `cos`) produces for
    /// inputs of this dtype.
    pub fn to_float(self) -> DType {
        if self.is_float() {
            self
        } else {
            crate::config::float_dtype()
        }
    }

    /// The dtype a sum over elements of this dtype produces.
    pub fn sum_dtype(self) -> DType {
        match self {
            DType::Bool => crate::config::int_dtype(),
            other => other,
        }
    }
}

/// Rust element types an [`Array`](crate::Array) can hold, one per [`DType`].
///
/// Integer arithmetic wraps on overflow, as NumPy's fixed-width integers
/// do. Boolean `add` is logical or and `mul` is logical and.
pub trait Element: Copy + PartialOrd + fmt::Debug + 'static {
    /// The dtype of arrays holding this element type.
    const DTYPE: DType;

    /// Additive identity.
    fn zero() -> Self;

    /// Convert from `f64`. Floats become integers by truncation toward
    /// zero, saturating at the integer range.
    fn from_f64(value: f64) -> Self;

    /// Widen to `f64`. Exact except for `int64` magnitudes above 2^53.
    fn to_f64(self) -> f64;

    /// Element-wise sum.
    fn add(self, other: Self) -> Self;

    /// Element-wise product.
    fn mul(self, other: Self) -> Self;

    /// Wrap typed data into array storage.
    fn into_data(data: ArrayD<Self>) -> ArrayData;

    /// Borrow the typed data if `data` holds this element type.
    fn from_data(data: &ArrayData) -> Option<&ArrayD<Self>>;
}

macro_rules! storage_methods {
    ($variant:ident) => {
        fn into_data(data: ArrayD<Self>) -> ArrayData {
            ArrayData::$variant(data)
        }

        fn from_data(data: &ArrayData) -> Option<&ArrayD<Self>> {
            match data {
                ArrayData::$variant(data) => Some(data),
                _ => None,
            }
        }
    };
}

impl Element for bool {
    const DTYPE: DType = DType::Bool;

    fn zero() -> Self {
        false
    }

    fn from_f64(value: f64) -> Self {
        value != 0.0
    }

    fn to_f64(self) -> f64 {
        if self {
            1.0
        } else {
            0.0
        }
    }

    fn add(self, other: Self) -> Self {
        self | other
    }

    fn mul(self, other: Self) -> Self {
        self & other
    }

    storage_methods!(Bool);
}

macro_rules! impl_int_element {
    ($ty:ty, $variant:ident) => {
        impl Element for $ty {
            const DTYPE: DType = DType::$variant;

            fn zero() -> Self {
                0
            }

            fn from_f64(value: f64) -> Self {
                value as $ty
            }

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn add(self, other: Self) -> Self {
                self.wrapping_add(other)
            }

            fn mul(self, other: Self) -> Self {
                self.wrapping_mul(other)
            }

            storage_methods!($variant);
        }
    };
}

macro_rules! impl_float_element {
    ($ty:ty, $variant:ident) => {
        impl Element for $ty {
            const DTYPE: DType = DType::$variant;

            fn zero() -> Self {
                0.0
            }

            fn from_f64(value: f64) -> Self {
                value as $ty
            }

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn add(self, other: Self) -> Self {
                self + other
            }

            fn mul(self, other: Self) -> Self {
                self * other
            }

            storage_methods!($variant);
        }
    };
}

impl_int_element!(i32, Int32);
impl_int_element!(i64, Int64);
impl_float_element!(f32, Float32);
impl_float_element!(f64, Float64);

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DType::Bool => write!(f, "bool"),
            DType::Int32 => write!(f, "int32"),
            DType::Int64 => write!(f, "int64"),
            DType::Float32 => write!(f, "float32"),
            DType::Float64 => write!(f, "float64"),
        }
    }
}

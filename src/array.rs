//! The raw array value, backed by `ndarray`.
//!
//! An [`Array`] is what the evaluation interpreter computes with. It is
//! never wrapped: at level 0 the array itself plays the role of the tracer.

use crate::dtype::Element;
use crate::{config, DType, Shape};
use ndarray::{ArrayD, IxDyn};
use std::fmt;

/// Typed element storage of an [`Array`], one variant per [`DType`].
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    /// `bool` elements.
    Bool(ArrayD<bool>),
    /// `i32` elements.
    Int32(ArrayD<i32>),
    /// `i64` elements.
    Int64(ArrayD<i64>),
    /// `f32` elements.
    Float32(ArrayD<f32>),
    /// `f64` elements.
    Float64(ArrayD<f64>),
}

/// Run `$body` with `$name` bound to the typed `ndarray` inside an
/// [`ArrayData`] reference.
macro_rules! with_data {
    ($data:expr, $name:ident => $body:expr) => {
        match $data {
            ArrayData::Bool($name) => $body,
            ArrayData::Int32($name) => $body,
            ArrayData::Int64($name) => $body,
            ArrayData::Float32($name) => $body,
            ArrayData::Float64($name) => $body,
        }
    };
}

/// Run `$body` with the type alias `$ty` set to the element type of `$dtype`.
macro_rules! for_dtype {
    ($dtype:expr, $ty:ident => $body:expr) => {
        match $dtype {
            DType::Bool => {
                type $ty = bool;
                $body
            }
            DType::Int32 => {
                type $ty = i32;
                $body
            }
            DType::Int64 => {
                type $ty = i64;
                $body
            }
            DType::Float32 => {
                type $ty = f32;
                $body
            }
            DType::Float64 => {
                type $ty = f64;
                $body
            }
        }
    };
}

pub(crate) use {for_dtype, with_data};

fn dtype_of<T: Element>(_: &ArrayD<T>) -> DType {
    T::DTYPE
}

/// A multidimensional numeric array.
///
/// Elements live in an `ndarray::ArrayD` of the dtype's own Rust type, so
/// `int64` values keep full precision and integer arithmetic wraps on
/// overflow.
///
/// # Examples
///
/// ```
/// # use minijax::{Array, DType, Shape};
/// let a = Array::zeros(Shape::new(vec![2, 3]), DType::Float32);
/// assert_eq!(a.shape().as_slice(), &[2, 3]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    data: ArrayData,
}

impl Array {
    /// Convert `f64` data to `dtype`.
    pub fn new(data: ArrayD<f64>, dtype: DType) -> Self {
        for_dtype!(dtype, T => Self::from_ndarray(data.mapv(<T as Element>::from_f64)))
    }

    /// Wrap typed `ndarray` data as is.
    pub fn from_ndarray<T: Element>(data: ArrayD<T>) -> Self {
        Self { data: T::into_data(data) }
    }

    /// Create a new array filled with zeros.
    pub fn zeros(shape: Shape, dtype: DType) -> Self {
        for_dtype!(dtype, T => Self::from_ndarray(ArrayD::from_elem(
            IxDyn(shape.as_slice()),
            <T as Element>::zero(),
        )))
    }

    /// Create a 0-d array holding `value` converted to `dtype`.
    pub fn scalar(value: f64, dtype: DType) -> Self {
        Self::new(ArrayD::from_elem(IxDyn(&[]), value), dtype)
    }

    fn typed_scalar<T: Element>(value: T) -> Self {
        Self::from_ndarray(ArrayD::from_elem(IxDyn(&[]), value))
    }

    /// Create a float array from a flat row-major `Vec<f64>` and shape.
    ///
    /// # Panics
    ///
    /// Panics if the shape size doesn't match the data length.
    ///
    /// # Examples
    ///
    /// ```
    /// # use minijax::{Array, Shape};
    /// let a = Array::from_vec(vec![1.0, 2.0, 3.0, 4.0], Shape::new(vec![2, 2]));
    /// assert_eq!(a.to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
    /// ```
    pub fn from_vec(data: Vec<f64>, shape: Shape) -> Self {
        Self::from_vec_with_dtype(data, shape, config::float_dtype())
    }

    /// Create an array of the given dtype from a flat row-major `Vec<f64>`.
    ///
    /// # Panics
    ///
    /// Panics if the shape size doesn't match the data length.
    pub fn from_vec_with_dtype(data: Vec<f64>, shape: Shape, dtype: DType) -> Self {
        Self::new(shaped(data, &shape), dtype)
    }

    /// Create a boolean array.
    ///
    /// # Panics
    ///
    /// Panics if the shape size doesn't match the data length.
    pub fn from_bools(data: Vec<bool>, shape: Shape) -> Self {
        Self::from_ndarray(shaped(data, &shape))
    }

    /// Returns the shape of this array.
    pub fn shape(&self) -> Shape {
        with_data!(&self.data, data => Shape::from(data.shape()))
    }

    /// Returns the element type of this array.
    #[inline]
    pub fn dtype(&self) -> DType {
        with_data!(&self.data, data => dtype_of(data))
    }

    /// Returns the number of dimensions.
    #[inline]
    pub fn ndim(&self) -> usize {
        with_data!(&self.data, data => data.ndim())
    }

    /// Returns the total number of elements.
    #[inline]
    pub fn size(&self) -> usize {
        with_data!(&self.data, data => data.len())
    }

    /// Borrow the typed storage.
    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    /// Borrow the elements as an `ndarray` of `T`, if `T` is this array's
    /// element type.
    pub fn as_ndarray<T: Element>(&self) -> Option<&ArrayD<T>> {
        T::from_data(&self.data)
    }

    /// Copy the elements into an `ndarray` of `T`, converting through
    /// `f64` when the element types differ.
    pub fn cast<T: Element>(&self) -> ArrayD<T> {
        if let Some(data) = self.as_ndarray::<T>() {
            return data.clone();
        }
        with_data!(&self.data, data => data.mapv(|x| T::from_f64(x.to_f64())))
    }

    /// Copy the elements out in row-major order, widened to `f64`.
    pub fn to_vec(&self) -> Vec<f64> {
        with_data!(&self.data, data => data.iter().map(|x| x.to_f64()).collect())
    }

    /// The single element of a one-element array, widened to `f64`.
    pub fn item(&self) -> Option<f64> {
        if self.size() == 1 {
            self.to_vec().first().copied()
        } else {
            None
        }
    }
}

fn shaped<T>(data: Vec<T>, shape: &Shape) -> ArrayD<T> {
    assert_eq!(
        data.len(),
        shape.size(),
        "Data length must match shape size"
    );
    ArrayD::from_shape_vec(IxDyn(shape.as_slice()), data)
        .expect("length checked above")
}

impl From<f64> for Array {
    fn from(value: f64) -> Self {
        Array::scalar(value, config::float_dtype())
    }
}

/// Converts to [`config::int_dtype`]; with x64 disabled the value is
/// truncated to `i32`, wrapping like a NumPy cast.
impl From<i64> for Array {
    fn from(value: i64) -> Self {
        match config::int_dtype() {
            DType::Int64 => Array::typed_scalar(value),
            _ => Array::typed_scalar(value as i32),
        }
    }
}

macro_rules! impl_from_element {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Array {
                fn from(value: $ty) -> Self {
                    Array::typed_scalar(value)
                }
            }
        )*
    };
}

impl_from_element!(f32, i32, bool);

impl From<ArrayD<f64>> for Array {
    fn from(data: ArrayD<f64>) -> Self {
        Array::new(data, config::float_dtype())
    }
}

macro_rules! impl_from_ndarray {
    ($($ty:ty),*) => {
        $(
            impl From<ArrayD<$ty>> for Array {
                fn from(data: ArrayD<$ty>) -> Self {
                    Array::from_ndarray(data)
                }
            }
        )*
    };
}

impl_from_ndarray!(f32, i32, i64, bool);

impl fmt::Display for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Array:{}{} ", self.dtype(), self.shape())?;
        with_data!(&self.data, data => write!(f, "{:?}", data.iter().collect::<Vec<_>>()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_zeros() {
        let a = Array::zeros(Shape::new(vec![2, 3]), DType::Float32);
        assert_eq!(a.shape().as_slice(), &[2, 3]);
        assert_eq!(a.dtype(), DType::Float32);
        assert_eq!(a.size(), 6);
        assert_eq!(a.ndim(), 2);
        assert!(a.to_vec().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_constructor_rounds_to_dtype() {
        let a = Array::from_vec_with_dtype(
            vec![1.7, -2.2],
            Shape::new(vec![2]),
            DType::Int32,
        );
        assert_eq!(a.to_vec(), vec![1.0, -2.0]);

        let b = Array::from_bools(vec![true, false], Shape::new(vec![2]));
        assert_eq!(b.dtype(), DType::Bool);
        assert_eq!(b.to_vec(), vec![1.0, 0.0]);
    }

    #[test]
    fn test_scalar_conversions() {
        assert_eq!(Array::from(3.0).dtype(), DType::Float64);
        assert_eq!(Array::from(3.0f32).dtype(), DType::Float32);
        assert_eq!(Array::from(3i32).dtype(), DType::Int32);
        assert_eq!(Array::from(3i64).dtype(), DType::Int64);
        assert_eq!(Array::from(true).dtype(), DType::Bool);
        assert!(Array::from(2.5).shape().is_scalar());
        assert_eq!(Array::from(2.5).item(), Some(2.5));
    }

    #[test]
    fn test_item_requires_single_element() {
        let a = Array::from_vec(vec![1.0, 2.0], Shape::new(vec![2]));
        assert_eq!(a.item(), None);
        let b = Array::from_vec(vec![4.0], Shape::new(vec![1, 1]));
        assert_eq!(b.item(), Some(4.0));
    }

    #[test]
    #[should_panic(expected = "Data length must match shape size")]
    fn test_from_vec_length_mismatch() {
        Array::from_vec(vec![1.0, 2.0, 3.0], Shape::new(vec![2, 2]));
    }

    #[test]
    fn test_int64_keeps_full_precision() {
        let big = (1i64 << 53) + 1;
        let a = Array::from_ndarray(ArrayD::from_elem(IxDyn(&[]), big));
        assert_eq!(a.dtype(), DType::Int64);
        assert_eq!(a.as_ndarray::<i64>().unwrap().iter().next(), Some(&big));
        assert!(a.as_ndarray::<f64>().is_none());
    }

    #[test]
    fn test_cast() {
        let a = Array::from_vec(vec![1.5, -2.5], Shape::new(vec![2]));
        assert_eq!(a.cast::<i32>().iter().copied().collect::<Vec<_>>(), vec![1, -2]);
        let b = Array::from_bools(vec![true, false], Shape::new(vec![2]));
        assert_eq!(b.cast::<f32>().iter().copied().collect::<Vec<_>>(), vec![1.0, 0.0]);
        assert_eq!(b.cast::<bool>(), *b.as_ndarray::<bool>().unwrap());
    }

    #[test]
    fn test_display_integers() {
        let a = Array::from(3i32);
        assert_eq!(a.to_string(), "Array:int32() [3]");
    }

    #[test]
    fn test_display() {
        let a = Array::from_vec(vec![1.0, 2.0], Shape::new(vec![2]));
        assert_eq!(a.to_string(), "Array:float64(2,) [1.0, 2.0]");
    }
}

//! Numeric kernels behind the evaluation interpreter.
//!
//! Each kernel is a thin layer over `ndarray` that validates shapes and
//! axis parameters, reports failures as [`Error`] and computes in the
//! element type of the output dtype.

use crate::array::{for_dtype, with_data, ArrayData};
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::shape::is_permutation;
use crate::{Array, DType, Shape};
use ndarray::{ArrayD, Axis, IxDyn, Zip};

impl Array {
    /// Element-wise addition with NumPy broadcasting. Integers wrap on
    /// overflow.
    pub fn add(&self, other: &Array) -> Result<Array> {
        let dtype = DType::promote(self.dtype(), other.dtype());
        for_dtype!(dtype, T => self.zip_with("add", other, <T as Element>::add))
    }

    /// Element-wise multiplication with NumPy broadcasting. Integers wrap
    /// on overflow.
    pub fn mul(&self, other: &Array) -> Result<Array> {
        let dtype = DType::promote(self.dtype(), other.dtype());
        for_dtype!(dtype, T => self.zip_with("mul", other, <T as Element>::mul))
    }

    /// Element-wise `self > other`, producing a bool array.
    pub fn greater(&self, other: &Array) -> Result<Array> {
        let dtype = DType::promote(self.dtype(), other.dtype());
        for_dtype!(dtype, T => self.zip_with("greater", other, |a: T, b: T| a > b))
    }

    /// Element-wise `self < other`, producing a bool array.
    pub fn less(&self, other: &Array) -> Result<Array> {
        let dtype = DType::promote(self.dtype(), other.dtype());
        for_dtype!(dtype, T => self.zip_with("less", other, |a: T, b: T| a < b))
    }

    /// Element-wise negation. Not defined for booleans.
    pub fn neg(&self) -> Result<Array> {
        let out = match self.data() {
            ArrayData::Bool(_) => {
                return Err(Error::UnsupportedType {
                    primitive: "neg",
                    dtype: DType::Bool,
                })
            }
            ArrayData::Int32(data) => Array::from_ndarray(data.mapv(i32::wrapping_neg)),
            ArrayData::Int64(data) => Array::from_ndarray(data.mapv(i64::wrapping_neg)),
            ArrayData::Float32(data) => Array::from_ndarray(data.mapv(|x| -x)),
            ArrayData::Float64(data) => Array::from_ndarray(data.mapv(|x| -x)),
        };
        Ok(out)
    }

    /// Element-wise sine. Integers are converted to the default float
    /// dtype; booleans are rejected.
    pub fn sin(&self) -> Result<Array> {
        self.map_float("sin", f32::sin, f64::sin)
    }

    /// Element-wise cosine. Integers are converted to the default float
    /// dtype; booleans are rejected.
    pub fn cos(&self) -> Result<Array> {
        self.map_float("cos", f32::cos, f64::cos)
    }

    /// Reorder axes so that output axis `i` is input axis `perm[i]`.
    pub fn transpose(&self, perm: &[usize]) -> Result<Array> {
        if !is_permutation(perm, self.ndim()) {
            return Err(Error::Shape {
                primitive: "transpose",
                message: format!(
                    "{:?} is not a permutation of the axes of {}",
                    perm,
                    self.shape()
                ),
            });
        }
        Ok(with_data!(self.data(), data => Array::from_ndarray(
            data.view()
                .permuted_axes(IxDyn(perm))
                .as_standard_layout()
                .into_owned(),
        )))
    }

    /// Insert singleton axes at `axes` (positions in the output), then
    /// broadcast to `shape`.
    pub fn broadcast(&self, shape: &Shape, axes: &[usize]) -> Result<Array> {
        let shape_error = |message: String| Error::Shape {
            primitive: "broadcast",
            message,
        };

        if self.ndim() + axes.len() != shape.ndim() {
            return Err(shape_error(format!(
                "inserting {} axes into {} can't produce {}",
                axes.len(),
                self.shape(),
                shape
            )));
        }

        let mut sorted = axes.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() != axes.len() {
            return Err(shape_error(format!("repeated axis in {:?}", axes)));
        }

        let mut expanded = self.shape().as_slice().to_vec();
        for &axis in &sorted {
            if axis > expanded.len() {
                return Err(shape_error(format!(
                    "axis {} out of range for {} output dimensions",
                    axis,
                    shape.ndim()
                )));
            }
            expanded.insert(axis, 1);
        }

        with_data!(self.data(), data => broadcast_data(data, &sorted, shape).map(Array::from_ndarray))
            .ok_or_else(|| {
                shape_error(format!(
                    "can't broadcast {} to {}",
                    Shape::new(expanded),
                    shape
                ))
            })
    }

    /// Sum over `axes`, removing them from the shape. Booleans are counted
    /// in the default integer dtype.
    pub fn reduce_sum(&self, axes: &[usize]) -> Result<Array> {
        if self.shape().reduced(axes).is_none() {
            return Err(Error::Shape {
                primitive: "reduce_sum",
                message: format!(
                    "invalid axes {:?} for shape {}",
                    axes,
                    self.shape()
                ),
            });
        }

        let mut sorted = axes.to_vec();
        sorted.sort_unstable_by(|a, b| b.cmp(a));

        for_dtype!(self.dtype().sum_dtype(), T => {
            let mut data = self.cast::<T>();
            for &axis in &sorted {
                data = data.fold_axis(Axis(axis), <T as Element>::zero(), |&acc, &x| {
                    Element::add(acc, x)
                });
            }
            Ok(Array::from_ndarray(data))
        })
    }

    fn map_float(
        &self,
        primitive: &'static str,
        op32: fn(f32) -> f32,
        op64: fn(f64) -> f64,
    ) -> Result<Array> {
        match self.dtype() {
            DType::Bool => Err(Error::UnsupportedType { primitive, dtype: DType::Bool }),
            dtype => match dtype.to_float() {
                DType::Float32 => Ok(Array::from_ndarray(self.cast::<f32>().mapv(op32))),
                _ => Ok(Array::from_ndarray(self.cast::<f64>().mapv(op64))),
            },
        }
    }

    /// Broadcast both operands, convert them to `T` and combine them
    /// element by element.
    fn zip_with<T: Element, U: Element>(
        &self,
        primitive: &'static str,
        other: &Array,
        f: impl Fn(T, T) -> U,
    ) -> Result<Array> {
        let incompatible = || Error::Shape {
            primitive,
            message: format!(
                "incompatible shapes {} and {}",
                self.shape(),
                other.shape()
            ),
        };

        let shape = self
            .shape()
            .broadcast_with(&other.shape())
            .ok_or_else(incompatible)?;
        let (lhs, rhs) = (self.cast::<T>(), other.cast::<T>());
        let lhs = lhs
            .broadcast(IxDyn(shape.as_slice()))
            .ok_or_else(incompatible)?;
        let rhs = rhs
            .broadcast(IxDyn(shape.as_slice()))
            .ok_or_else(incompatible)?;

        let data = Zip::from(lhs).and(rhs).map_collect(|&a, &b| f(a, b));
        Ok(Array::from_ndarray(data))
    }
}

fn broadcast_data<T: Element>(
    data: &ArrayD<T>,
    sorted_axes: &[usize],
    shape: &Shape,
) -> Option<ArrayD<T>> {
    let mut view = data.view();
    for &axis in sorted_axes {
        view = view.insert_axis(Axis(axis));
    }
    let out = view.broadcast(IxDyn(shape.as_slice())).map(|v| v.to_owned());
    out
}

//! Shape utilities for n-dimensional arrays.

use std::fmt;

/// Shape of an n-dimensional array.
///
/// Represented as a vector of dimensions. An empty vector represents a scalar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// Create a new shape from dimensions.
    ///
    /// # Examples
    ///
    /// ```
    /// # use minijax::Shape;
    /// let shape = Shape::new(vec![2, 3, 4]);
    /// assert_eq!(shape.ndim(), 3);
    /// assert_eq!(shape.size(), 24);
    /// ```
    pub fn new(dims: Vec<usize>) -> Self {
        Self { dims }
    }

    /// Create a scalar shape (empty dimensions).
    pub fn scalar() -> Self {
        Self { dims: Vec::new() }
    }

    /// Returns the number of dimensions.
    #[inline]
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Returns the total number of elements.
    pub fn size(&self) -> usize {
        self.dims.iter().product()
    }

    /// Returns a slice of the dimensions.
    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.dims
    }

    /// Returns true if this is a scalar shape.
    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.dims.is_empty()
    }

    /// Check if two shapes are broadcast-compatible and return the result shape.
    ///
    /// Following NumPy broadcasting rules: dimensions are compatible if they are equal
    /// or one of them is 1, in which case the other one wins (so `0` against
    /// `1` gives `0`).
    pub fn broadcast_with(&self, other: &Shape) -> Option<Shape> {
        let ndim = self.ndim().max(other.ndim());
        let mut result = Vec::with_capacity(ndim);

        for i in 0..ndim {
            let dim1 = if i < self.ndim() {
                self.dims[self.ndim() - 1 - i]
            } else {
                1
            };
            let dim2 = if i < other.ndim() {
                other.dims[other.ndim() - 1 - i]
            } else {
                1
            };

            if dim1 == dim2 || dim2 == 1 {
                result.push(dim1);
            } else if dim1 == 1 {
                result.push(dim2);
            } else {
                return None;
            }
        }

        result.reverse();
        Some(Shape::new(result))
    }

    /// Shape after removing `axes`, as produced by a sum over them.
    ///
    /// Returns `None` if an axis is out of range or repeated.
    pub fn reduced(&self, axes: &[usize]) -> Option<Shape> {
        let mut seen = vec![false; self.ndim()];
        for &axis in axes {
            if axis >= self.ndim() || seen[axis] {
                return None;
            }
            seen[axis] = true;
        }
        Some(Shape::new(
            self.dims
                .iter()
                .zip(seen)
                .filter(|(_, removed)| !removed)
                .map(|(&dim, _)| dim)
                .collect(),
        ))
    }
}

/// Returns true if `perm` contains every axis in `0..ndim` exactly once.
pub fn is_permutation(perm: &[usize], ndim: usize) -> bool {
    if perm.len() != ndim {
        return false;
    }
    let mut seen = vec![false; ndim];
    for &axis in perm {
        if axis >= ndim || seen[axis] {
            return false;
        }
        seen[axis] = true;
    }
    true
}

/// The permutation that undoes `perm`.
///
/// # Examples
///
/// ```
/// # use minijax::shape::inverse_permutation;
/// assert_eq!(inverse_permutation(&[2, 0, 1]), vec![1, 2, 0]);
/// ```
pub fn inverse_permutation(perm: &[usize]) -> Vec<usize> {
    let mut inverse = vec![0; perm.len()];
    for (i, &axis) in perm.iter().enumerate() {
        inverse[axis] = i;
    }
    inverse
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Shape::new(dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Shape::new(dims.to_vec())
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, dim) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", dim)?;
        }
        if self.dims.len() == 1 {
            write!(f, ",")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_creation() {
        let shape = Shape::new(vec![2, 3, 4]);
        assert_eq!(shape.ndim(), 3);
        assert_eq!(shape.size(), 24);
        assert_eq!(shape.as_slice(), &[2, 3, 4]);
    }

    #[test]
    fn test_scalar_shape() {
        let shape = Shape::scalar();
        assert_eq!(shape.ndim(), 0);
        assert_eq!(shape.size(), 1);
        assert!(shape.is_scalar());
    }

    #[test]
    fn test_broadcast() {
        let s1 = Shape::new(vec![3, 1]);
        let s2 = Shape::new(vec![1, 4]);
        assert_eq!(s1.broadcast_with(&s2), Some(Shape::new(vec![3, 4])));

        let s1 = Shape::new(vec![2, 3]);
        assert_eq!(s1.broadcast_with(&Shape::scalar()), Some(s1.clone()));

        let s2 = Shape::new(vec![4]);
        assert_eq!(s1.broadcast_with(&s2), None);
    }

    #[test]
    fn test_broadcast_empty() {
        let empty = Shape::new(vec![0]);
        let one = Shape::new(vec![1]);
        assert_eq!(empty.broadcast_with(&one), Some(empty.clone()));
        assert_eq!(one.broadcast_with(&empty), Some(empty.clone()));
        assert_eq!(
            Shape::new(vec![3, 1]).broadcast_with(&Shape::new(vec![0])),
            Some(Shape::new(vec![3, 0]))
        );
        assert_eq!(empty.broadcast_with(&Shape::new(vec![2])), None);
    }

    #[test]
    fn test_is_permutation() {
        assert!(is_permutation(&[2, 0, 1], 3));
        assert!(is_permutation(&[], 0));
        assert!(!is_permutation(&[0, 0, 1], 3));
        assert!(!is_permutation(&[0, 1], 3));
        assert!(!is_permutation(&[0, 3, 1], 3));
    }

    #[test]
    fn test_reduced() {
        let shape = Shape::new(vec![2, 3, 4]);
        assert_eq!(shape.reduced(&[1]), Some(Shape::new(vec![2, 4])));
        assert_eq!(shape.reduced(&[0, 1, 2]), Some(Shape::scalar()));
        assert_eq!(shape.reduced(&[3]), None);
        assert_eq!(shape.reduced(&[1, 1]), None);
    }

    #[test]
    fn test_inverse_permutation() {
        let perm = [1, 2, 0];
        let inverse = inverse_permutation(&perm);
        let composed: Vec<usize> = inverse.iter().map(|&i| perm[i]).collect();
        assert_eq!(composed, vec![0, 1, 2]);
    }

    #[test]
    fn test_display() {
        assert_eq!(Shape::new(vec![2, 3, 4]).to_string(), "(2, 3, 4)");
        assert_eq!(Shape::new(vec![5]).to_string(), "(5,)");
        assert_eq!(Shape::scalar().to_string(), "()");
    }
}

use crate::error::{Result, TensorError};
use std::fmt;

/// Dimension sizes of a row-major tensor.
///
/// Layers treat the trailing axis as the feature axis and everything before
/// it as a batch of rows, so most helpers here are about the last axis.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    pub fn new(dims: Vec<usize>) -> Self {
        Shape { dims }
    }

    pub fn from_slice(dims: &[usize]) -> Self {
        Shape::new(dims.to_vec())
    }

    /// Rank.
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Total number of elements; 1 for a scalar shape.
    pub fn numel(&self) -> usize {
        self.dims.iter().product()
    }

    /// Size of axis `i`.
    ///
    /// # Panics
    /// Panics if `i >= ndim()`.
    pub fn dim(&self, i: usize) -> usize {
        self.dims[i]
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// `(rows, cols)` if this is a rank-2 shape.
    pub fn matrix_dims(&self) -> Option<(usize, usize)> {
        match self.dims[..] {
            [rows, cols] => Some((rows, cols)),
            _ => None,
        }
    }

    /// Size of the trailing axis, or `None` for a scalar shape.
    pub fn last_dim(&self) -> Option<usize> {
        self.dims.last().copied()
    }

    /// Number of rows a last-axis operation iterates over. A scalar shape
    /// has no rows.
    pub fn leading_numel(&self) -> usize {
        self.dims
            .split_last()
            .map_or(0, |(_, leading)| leading.iter().product())
    }

    /// This shape with the trailing axis resized to `n`.
    pub fn with_last_dim(&self, n: usize) -> Result<Shape> {
        let (_, leading) = self.dims.split_last().ok_or(TensorError::NoLastAxis)?;
        let mut dims = leading.to_vec();
        dims.push(n);
        Ok(Shape::new(dims))
    }

    /// This shape with the trailing axis removed.
    pub fn without_last_dim(&self) -> Result<Shape> {
        let (_, leading) = self.dims.split_last().ok_or(TensorError::NoLastAxis)?;
        Ok(Shape::from_slice(leading))
    }

    /// Numpy-style broadcast of two shapes.
    ///
    /// Axes are aligned from the right and the shorter shape is padded with
    /// ones. Aligned sizes must match or one of them must be 1.
    pub fn broadcast_shape(a: &Shape, b: &Shape) -> Result<Shape> {
        let ndim = a.ndim().max(b.ndim());
        let padded = |s: &Shape| {
            std::iter::repeat(1)
                .take(ndim - s.ndim())
                .chain(s.dims.iter().copied())
                .collect::<Vec<_>>()
        };

        let dims = padded(a)
            .into_iter()
            .zip(padded(b))
            .map(|(da, db)| match (da, db) {
                _ if da == db => Ok(da),
                (1, other) | (other, 1) => Ok(other),
                _ => Err(TensorError::BroadcastError {
                    a: a.dims.clone(),
                    b: b.dims.clone(),
                }),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Shape::new(dims))
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims: Vec<String> = self.dims.iter().map(|d| d.to_string()).collect();
        write!(f, "[{}]", dims.join(", "))
    }
}

use crate::backend::ComputeBackend;
use crate::error::{Result, TensorError};
use crate::shape::Shape;

/// A dense f32 tensor.
///
/// Holds contiguous, row-major data with an associated shape. Operations
/// that require computation are dispatched to a `ComputeBackend` and act on
/// the last axis, treating every leading axis as a flattened row index.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    data: Vec<f32>,
    shape: Shape,
}

impl Tensor {
    /// Create a new tensor from f32 data and a shape.
    ///
    /// # Errors
    /// Returns `ShapeMismatch` if `data.len() != shape.numel()`.
    pub fn new(data: Vec<f32>, shape: Shape) -> Result<Self> {
        if data.len() != shape.numel() {
            return Err(TensorError::ShapeMismatch {
                expected: shape.dims().to_vec(),
                got: vec![data.len()],
            });
        }
        Ok(Tensor { data, shape })
    }

    /// Create a zero-filled tensor with the given shape.
    pub fn zeros(shape: Shape) -> Self {
        let n = shape.numel();
        Tensor {
            data: vec![0.0; n],
            shape,
        }
    }

    /// Create a tensor by evaluating `f` at every flat (row-major) index.
    pub fn from_fn(shape: Shape, f: impl FnMut(usize) -> f32) -> Self {
        let data = (0..shape.numel()).map(f).collect();
        Tensor { data, shape }
    }

    /// Returns a reference to the tensor's shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the underlying data as an f32 slice.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Returns the underlying data as a mutable f32 slice.
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Number of rows seen by last-axis operations.
    pub fn rows(&self) -> usize {
        self.shape.leading_numel()
    }

    /// Returns row `r` of the tensor viewed as `[rows, last_dim]`.
    pub fn row(&self, r: usize) -> Result<&[f32]> {
        let n = self.last_axis()?;
        let rows = self.rows();
        if r >= rows {
            return Err(TensorError::IndexOutOfRange {
                index: r,
                size: rows,
            });
        }
        Ok(&self.data[r * n..(r + 1) * n])
    }

    /// Addition with last-axis broadcasting.
    ///
    /// `other` must either have the same shape as `self`, or be a 1-D tensor
    /// whose length equals `self`'s trailing axis (added to every row).
    pub fn add(&self, other: &Tensor, backend: &dyn ComputeBackend) -> Result<Tensor> {
        if self.shape == other.shape {
            let data = backend.add(&self.data, &other.data)?;
            return Tensor::new(data, self.shape.clone());
        }

        let broadcast = Shape::broadcast_shape(&self.shape, &other.shape)?;
        if broadcast != self.shape || other.shape.ndim() != 1 {
            return Err(TensorError::BroadcastError {
                a: self.shape.dims().to_vec(),
                b: other.shape.dims().to_vec(),
            });
        }

        let n = self.last_axis()?;
        let data = backend.add_row_bias(&self.data, &other.data, n)?;
        Tensor::new(data, self.shape.clone())
    }

    /// Affine projection along the last axis: `self @ weight + bias`.
    ///
    /// - `self`: shape [..., in]
    /// - `weight`: shape [in, out]
    /// - `bias`: optional shape [out]
    /// - Returns: shape [..., out]
    pub fn linear(
        &self,
        weight: &Tensor,
        bias: Option<&Tensor>,
        backend: &dyn ComputeBackend,
    ) -> Result<Tensor> {
        let in_features = self.last_axis()?;
        let out_features = match weight.shape.matrix_dims() {
            Some((rows, cols)) if rows == in_features => cols,
            _ => {
                return Err(TensorError::ShapeMismatch {
                    expected: vec![in_features, weight.shape.last_dim().unwrap_or(0)],
                    got: weight.shape.dims().to_vec(),
                })
            }
        };
        let rows = self.rows();

        let mut data = backend.matmul(&self.data, &weight.data, rows, in_features, out_features)?;
        if let Some(bias) = bias {
            if bias.shape.dims() != [out_features] {
                return Err(TensorError::ShapeMismatch {
                    expected: vec![out_features],
                    got: bias.shape.dims().to_vec(),
                });
            }
            data = backend.add_row_bias(&data, &bias.data, out_features)?;
        }

        Tensor::new(data, self.shape.with_last_dim(out_features)?)
    }

    /// Element-wise hyperbolic tangent.
    pub fn tanh(&self, backend: &dyn ComputeBackend) -> Result<Tensor> {
        let data = backend.tanh(&self.data)?;
        Tensor::new(data, self.shape.clone())
    }

    /// Softmax over the last axis.
    pub fn softmax_last(&self, backend: &dyn ComputeBackend) -> Result<Tensor> {
        let n = self.last_axis()?;
        let data = backend.softmax(&self.data, n)?;
        Tensor::new(data, self.shape.clone())
    }

    /// Log-softmax over the last axis.
    pub fn log_softmax_last(&self, backend: &dyn ComputeBackend) -> Result<Tensor> {
        let n = self.last_axis()?;
        let data = backend.log_softmax(&self.data, n)?;
        Tensor::new(data, self.shape.clone())
    }

    /// Picks index `i` of the last axis, dropping that axis.
    ///
    /// For a tensor of shape [..., n] the result has shape [...].
    pub fn select_last(&self, i: usize) -> Result<Tensor> {
        let n = self.last_axis()?;
        if i >= n {
            return Err(TensorError::IndexOutOfRange { index: i, size: n });
        }
        let data = self.data.chunks_exact(n).map(|row| row[i]).collect();
        Tensor::new(data, self.shape.without_last_dim()?)
    }

    /// Multiplies every row by the matching entry of `scales`.
    ///
    /// `scales` must have shape [...] when `self` has shape [..., n].
    pub fn scale_rows(&self, scales: &Tensor, backend: &dyn ComputeBackend) -> Result<Tensor> {
        let n = self.last_axis()?;
        let expected = self.shape.without_last_dim()?;
        if scales.shape != expected {
            return Err(TensorError::ShapeMismatch {
                expected: expected.dims().to_vec(),
                got: scales.shape.dims().to_vec(),
            });
        }
        let data = backend.scale_rows(&self.data, &scales.data, n)?;
        Tensor::new(data, self.shape.clone())
    }

    fn last_axis(&self) -> Result<usize> {
        self.shape
            .last_dim()
            .ok_or(TensorError::NoLastAxis)
    }
}

use std::fmt::Debug;

use crate::error::Result;

/// Trait for pluggable compute backends.
///
/// All operations work on f32 slices. Data is passed in as slices and
/// returned as owned vectors. Row-wise operations treat the input as a
/// row-major matrix whose row length is given by `n`.
pub trait ComputeBackend: Send + Sync + Debug {
    /// Returns the name of this backend (e.g., "cpu").
    fn name(&self) -> &str;

    /// Matrix multiplication: C = A @ B.
    ///
    /// - `a`: row-major data of shape [m, k]
    /// - `b`: row-major data of shape [k, n]
    /// - Returns: row-major data of shape [m, n]
    fn matmul(&self, a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Result<Vec<f32>>;

    /// Element-wise addition: result[i] = a[i] + b[i].
    fn add(&self, a: &[f32], b: &[f32]) -> Result<Vec<f32>>;

    /// Adds `bias` (length `n`) to every row of `x`.
    fn add_row_bias(&self, x: &[f32], bias: &[f32], n: usize) -> Result<Vec<f32>>;

    /// Multiplies every element of row `r` of `x` by `scales[r]`.
    fn scale_rows(&self, x: &[f32], scales: &[f32], n: usize) -> Result<Vec<f32>>;

    /// Softmax over rows of `n` elements.
    ///
    /// For each row: result[i] = exp(x[i] - max(x)) / sum(exp(x[j] - max(x)))
    fn softmax(&self, x: &[f32], n: usize) -> Result<Vec<f32>>;

    /// Log-softmax over rows of `n` elements.
    ///
    /// For each row: result[i] = (x[i] - max(x)) - ln(sum(exp(x[j] - max(x))))
    fn log_softmax(&self, x: &[f32], n: usize) -> Result<Vec<f32>>;

    /// Hyperbolic tangent: result[i] = tanh(x[i]).
    fn tanh(&self, x: &[f32]) -> Result<Vec<f32>>;
}

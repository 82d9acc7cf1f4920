use fl_tensor::{ComputeBackend, Tensor};

use crate::error::{NnError, Result};

/// Trait for layers that map tensors of shape `[..., input_dim]` to tensors
/// of shape `[..., output_dim]`.
///
/// Implementations hold their learned parameters; `forward` never mutates
/// them.
pub trait Encoder: Send + Sync {
    /// Size of the last dimension of an input.
    fn input_dim(&self) -> usize;

    /// Size of the last dimension of an output.
    fn output_dim(&self) -> usize;

    /// Run the layer on `input` using the given compute backend.
    fn forward(&self, input: &Tensor, backend: &dyn ComputeBackend) -> Result<Tensor>;

    /// All learned parameter tensors, in a stable order.
    fn parameters(&self) -> Vec<&Tensor>;

    /// Mutable access to the learned parameters, in the same order as
    /// `parameters`. This is the hook an external optimizer uses.
    fn parameters_mut(&mut self) -> Vec<&mut Tensor>;

    /// Total number of learned scalars.
    fn num_parameters(&self) -> usize {
        self.parameters().iter().map(|p| p.shape().numel()).sum()
    }
}

/// Rejects inputs that are scalars or whose trailing dimension is not
/// `expected`.
pub(crate) fn check_input(input: &Tensor, expected: usize) -> Result<()> {
    match input.shape().last_dim() {
        Some(d) if d == expected => Ok(()),
        _ => Err(NnError::InputShape {
            expected,
            got: input.shape().dims().to_vec(),
        }),
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TensorError {
    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch { expected: Vec<usize>, got: Vec<usize> },
    #[error("cannot broadcast shapes {a:?} and {b:?}")]
    BroadcastError { a: Vec<usize>, b: Vec<usize> },
    /// A last-axis operation was applied to a 0-dimensional tensor.
    #[error("scalar tensor has no last axis")]
    NoLastAxis,
    #[error("{op}: {len} elements do not split into rows of {n}")]
    RowLength { op: &'static str, len: usize, n: usize },
    #[error("index {index} out of range for axis of size {size}")]
    IndexOutOfRange { index: usize, size: usize },
}

pub type Result<T> = std::result::Result<T, TensorError>;

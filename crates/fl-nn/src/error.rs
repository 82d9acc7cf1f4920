use thiserror::Error;

#[derive(Error, Debug)]
pub enum NnError {
    #[error("invalid layer configuration: {0}")]
    InvalidConfig(String),
    #[error("input shape mismatch: expected trailing dimension {expected}, got shape {got:?}")]
    InputShape { expected: usize, got: Vec<usize> },
    #[error("tensor error: {0}")]
    Tensor(#[from] fl_tensor::TensorError),
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NnError>;

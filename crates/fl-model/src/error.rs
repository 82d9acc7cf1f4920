use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("missing metric key: {0}")]
    MissingKey(String),
    #[error("type mismatch for metric '{key}': expected {expected}, got {got}")]
    TypeMismatch {
        key: String,
        expected: String,
        got: String,
    },
    #[error("cannot aggregate an empty list of batch metrics")]
    EmptyMetrics,
    #[error("batch contains no examples")]
    EmptyBatch,
    #[error("invalid model configuration: {0}")]
    InvalidConfig(String),
    #[error("layer error: {0}")]
    Nn(#[from] fl_nn::NnError),
    #[error("tensor error: {0}")]
    Tensor(#[from] fl_tensor::TensorError),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;

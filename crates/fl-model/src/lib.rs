//! `fl-model` - The contract between trainable models and the code that
//! drives them.
//!
//! A driver calls [`Model::build`] once, then repeatedly pulls batches from
//! [`Model::sampler`], runs [`Model::batch_train`] or [`Model::batch_eval`],
//! folds evaluation output with [`Model::aggregate`] and picks checkpoints
//! with [`Model::compare`]. [`BigramLm`] is a small language model wired
//! through the whole contract.

pub mod bigram;
pub mod error;
pub mod evaluate;
pub mod metrics;
pub mod model;

pub use bigram::{BigramBatch, BigramLm, BigramLmConfig, Vocab};
pub use error::{ModelError, Result};
pub use evaluate::evaluate;
pub use metrics::{required_loss, MetricValue, Metrics, LOSS_KEY};
pub use model::Model;

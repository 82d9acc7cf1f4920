//! `fl-nn` - Neural network layers for the fl training framework.
//!
//! Layers own their parameters as `fl_tensor::Tensor`s and run their forward
//! pass on a caller-supplied `ComputeBackend`. Parameters are only ever
//! changed from outside, through `Encoder::parameters_mut`.

pub mod encoder;
pub mod error;
pub mod linear;
pub mod mos;

pub use encoder::Encoder;
pub use error::{NnError, Result};
pub use linear::Linear;
pub use mos::{MixtureOfSoftmax, MosConfig};

//! `fl-tensor` - Tensor library with pluggable compute backends for the fl
//! training framework.
//!
//! [`Tensor`] owns contiguous row-major f32 data and hands the arithmetic to
//! a [`ComputeBackend`]; [`CpuBackend`] is the only backend so far. Every
//! tensor-level operation works along the last axis, with all leading axes
//! flattened into rows.

pub mod backend;
pub mod cpu;
pub mod error;
pub mod shape;
pub mod tensor;

pub use backend::ComputeBackend;
pub use cpu::CpuBackend;
pub use error::{Result, TensorError};
pub use shape::Shape;
pub use tensor::Tensor;

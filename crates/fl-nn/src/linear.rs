use fl_tensor::{ComputeBackend, Shape, Tensor};
use rand::Rng;

use crate::encoder::{check_input, Encoder};
use crate::error::{NnError, Result};

/// A learned affine projection: `y = x @ weight + bias`.
///
/// Weight is stored as [in_features, out_features] so that rows of the input
/// multiply straight through without a transpose.
#[derive(Debug, Clone)]
pub struct Linear {
    weight: Tensor,
    bias: Tensor,
}

impl Linear {
    /// Create a projection with weights and bias drawn from
    /// `U(-1/sqrt(in_features), 1/sqrt(in_features))`.
    pub fn new<R: Rng>(in_features: usize, out_features: usize, rng: &mut R) -> Result<Self> {
        if in_features == 0 || out_features == 0 {
            return Err(NnError::InvalidConfig(format!(
                "linear projection needs non-zero sizes, got {} -> {}",
                in_features, out_features
            )));
        }

        let bound = 1.0 / (in_features as f32).sqrt();
        let weight = Tensor::from_fn(Shape::new(vec![in_features, out_features]), |_| {
            rng.gen_range(-bound..bound)
        });
        let bias = Tensor::from_fn(Shape::new(vec![out_features]), |_| {
            rng.gen_range(-bound..bound)
        });

        Ok(Linear { weight, bias })
    }

    /// Build a projection from explicit parameters.
    ///
    /// - `weight`: shape [in_features, out_features], both non-zero
    /// - `bias`: shape [out_features]
    pub fn from_weights(weight: Tensor, bias: Tensor) -> Result<Self> {
        let dims = weight.shape().dims();
        if dims.len() != 2 || dims[0] == 0 || dims[1] == 0 {
            return Err(NnError::InvalidConfig(format!(
                "linear weight must be a non-empty 2D tensor, got {}",
                weight.shape()
            )));
        }
        if bias.shape().dims() != [dims[1]] {
            return Err(NnError::InvalidConfig(format!(
                "linear bias shape {} does not match output size {}",
                bias.shape(),
                dims[1]
            )));
        }
        Ok(Linear { weight, bias })
    }

    /// Weight tensor, shape [in_features, out_features].
    pub fn weight(&self) -> &Tensor {
        &self.weight
    }

    /// Bias tensor, shape [out_features].
    pub fn bias(&self) -> &Tensor {
        &self.bias
    }
}

impl Encoder for Linear {
    fn input_dim(&self) -> usize {
        self.weight.shape().dim(0)
    }

    fn output_dim(&self) -> usize {
        self.weight.shape().dim(1)
    }

    fn forward(&self, input: &Tensor, backend: &dyn ComputeBackend) -> Result<Tensor> {
        check_input(input, self.input_dim())?;
        Ok(input.linear(&self.weight, Some(&self.bias), backend)?)
    }

    fn parameters(&self) -> Vec<&Tensor> {
        vec![&self.weight, &self.bias]
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        vec![&mut self.weight, &mut self.bias]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fl_tensor::CpuBackend;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn t(data: Vec<f32>, dims: &[usize]) -> Tensor {
        Tensor::new(data, Shape::from_slice(dims)).unwrap()
    }

    #[test]
    fn test_random_init_within_bound() {
        let mut rng = StdRng::seed_from_u64(7);
        let layer = Linear::new(4, 3, &mut rng).unwrap();
        assert_eq!(layer.input_dim(), 4);
        assert_eq!(layer.output_dim(), 3);
        assert_eq!(layer.num_parameters(), 4 * 3 + 3);
        assert!(layer.weight().data().iter().all(|w| w.abs() <= 0.5));
    }

    #[test]
    fn test_same_seed_same_weights() {
        let a = Linear::new(3, 2, &mut StdRng::seed_from_u64(1)).unwrap();
        let b = Linear::new(3, 2, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(a.weight(), b.weight());
        assert_eq!(a.bias(), b.bias());
    }

    #[test]
    fn test_zero_sizes_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            Linear::new(0, 3, &mut rng),
            Err(NnError::InvalidConfig(_))
        ));
        assert!(matches!(
            Linear::new(3, 0, &mut rng),
            Err(NnError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_weights_forward() {
        let backend = CpuBackend::new();
        let layer = Linear::from_weights(
            t(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]),
            t(vec![1.0, -1.0], &[2]),
        )
        .unwrap();
        let y = layer.forward(&t(vec![1.0, 1.0], &[1, 2]), &backend).unwrap();
        assert_eq!(y.data(), &[5.0, 5.0]);
    }

    #[test]
    fn test_from_weights_bad_bias() {
        let result = Linear::from_weights(
            t(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]),
            t(vec![1.0, 2.0, 3.0], &[3]),
        );
        assert!(matches!(result, Err(NnError::InvalidConfig(_))));
    }

    #[test]
    fn test_input_shape_mismatch() {
        let backend = CpuBackend::new();
        let layer = Linear::new(3, 2, &mut StdRng::seed_from_u64(0)).unwrap();
        let x = t(vec![1.0, 2.0], &[1, 2]);
        assert!(matches!(
            layer.forward(&x, &backend),
            Err(NnError::InputShape { expected: 3, .. })
        ));
    }

    #[test]
    fn test_parameters_mut_updates_forward() {
        let backend = CpuBackend::new();
        let mut layer = Linear::from_weights(
            t(vec![1.0], &[1, 1]),
            t(vec![0.0], &[1]),
        )
        .unwrap();
        for p in layer.parameters_mut() {
            p.data_mut().iter_mut().for_each(|v| *v += 1.0);
        }
        let y = layer.forward(&t(vec![3.0], &[1, 1]), &backend).unwrap();
        assert_eq!(y.data(), &[7.0]);
    }
}

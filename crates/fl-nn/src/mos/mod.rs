pub mod config;

pub use config::MosConfig;

use fl_tensor::{ComputeBackend, Tensor};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::encoder::{check_input, Encoder};
use crate::error::{NnError, Result};
use crate::linear::Linear;

/// Mixture-of-softmax output layer for language modeling.
///
/// Maps `[..., input_size]` to `[..., output_size]` by blending `k`
/// tanh-activated projections of the input. The blend weights come from a
/// per-input softmax gate over the `k` components:
///
/// ```text
/// weights  = softmax(gate(x))                       [..., k]
/// cand_i   = tanh(components[i](x))                 [..., output_size]
/// out      = sum_i weights[..., i] * cand_i         [..., output_size]
/// out      = softmax(out) | log_softmax(out) | out  (final activation)
/// ```
#[derive(Debug, Clone)]
pub struct MixtureOfSoftmax {
    input_size: usize,
    output_size: usize,
    /// Projection producing the gate logits, input_size -> k.
    gate: Linear,
    /// One projection per mixture component, input_size -> output_size.
    components: Vec<Linear>,
    use_activation: bool,
    take_log: bool,
}

impl MixtureOfSoftmax {
    /// Create a layer with freshly initialized parameters.
    ///
    /// Equivalent to `from_config` with seed 0.
    pub fn new(
        input_size: usize,
        output_size: usize,
        mixture_count: usize,
        use_activation: bool,
        take_log: bool,
    ) -> Result<Self> {
        let config = MosConfig::new(input_size, output_size)
            .with_mixture_count(mixture_count)
            .with_activation(use_activation)
            .with_log_output(take_log);
        Self::from_config(&config)
    }

    /// Create a layer from a configuration, seeding initialization with
    /// `config.seed`.
    pub fn from_config(config: &MosConfig) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(config.seed);
        Self::with_rng(config, &mut rng)
    }

    /// Create a layer from a configuration, drawing initial parameters from
    /// `rng`.
    pub fn with_rng<R: Rng>(config: &MosConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;

        let gate = Linear::new(config.input_size, config.mixture_count, &mut *rng)?;
        let components = (0..config.mixture_count)
            .map(|_| Linear::new(config.input_size, config.output_size, &mut *rng))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            input_size = config.input_size,
            output_size = config.output_size,
            mixture_count = config.mixture_count,
            use_activation = config.use_activation,
            take_log = config.take_log,
            "initialized mixture of softmax"
        );

        Ok(MixtureOfSoftmax {
            input_size: config.input_size,
            output_size: config.output_size,
            gate,
            components,
            use_activation: config.use_activation,
            take_log: config.take_log,
        })
    }

    /// Assemble a layer from existing projections.
    ///
    /// The gate must map `input_size -> components.len()` and every component
    /// must map `input_size -> output_size` with identical sizes.
    pub fn from_parts(
        gate: Linear,
        components: Vec<Linear>,
        use_activation: bool,
        take_log: bool,
    ) -> Result<Self> {
        let first = components.first().ok_or_else(|| {
            NnError::InvalidConfig("mixture_count must be >= 1".to_string())
        })?;
        let input_size = first.input_dim();
        let output_size = first.output_dim();

        for (i, c) in components.iter().enumerate() {
            if c.input_dim() != input_size || c.output_dim() != output_size {
                return Err(NnError::InvalidConfig(format!(
                    "component {} maps {} -> {}, expected {} -> {}",
                    i,
                    c.input_dim(),
                    c.output_dim(),
                    input_size,
                    output_size
                )));
            }
        }
        if gate.input_dim() != input_size || gate.output_dim() != components.len() {
            return Err(NnError::InvalidConfig(format!(
                "gate maps {} -> {}, expected {} -> {}",
                gate.input_dim(),
                gate.output_dim(),
                input_size,
                components.len()
            )));
        }

        Ok(MixtureOfSoftmax {
            input_size,
            output_size,
            gate,
            components,
            use_activation,
            take_log,
        })
    }

    /// Number of mixture components (k).
    pub fn mixture_count(&self) -> usize {
        self.components.len()
    }

    /// Whether a final softmax / log-softmax is applied.
    pub fn use_activation(&self) -> bool {
        self.use_activation
    }

    /// Whether the final activation is log-softmax rather than softmax.
    pub fn take_log(&self) -> bool {
        self.take_log
    }

    pub fn gate(&self) -> &Linear {
        &self.gate
    }

    pub fn components(&self) -> &[Linear] {
        &self.components
    }

    /// Gating distribution over the components, shape [..., k].
    ///
    /// Every row sums to one.
    pub fn gate_weights(&self, input: &Tensor, backend: &dyn ComputeBackend) -> Result<Tensor> {
        check_input(input, self.input_size)?;
        let logits = self.gate.forward(input, backend)?;
        Ok(logits.softmax_last(backend)?)
    }
}

impl Encoder for MixtureOfSoftmax {
    fn input_dim(&self) -> usize {
        self.input_size
    }

    fn output_dim(&self) -> usize {
        self.output_size
    }

    fn forward(&self, input: &Tensor, backend: &dyn ComputeBackend) -> Result<Tensor> {
        let weights = self.gate_weights(input, backend)?;

        // Weighted sum over the components. Each candidate keeps the input's
        // leading dims, so accumulation is equivalent to stacking on a new
        // axis and reducing it.
        let mut out: Option<Tensor> = None;
        for (i, component) in self.components.iter().enumerate() {
            let candidate = component.forward(input, backend)?.tanh(backend)?;
            let weighted = candidate.scale_rows(&weights.select_last(i)?, backend)?;
            out = Some(match out {
                Some(acc) => acc.add(&weighted, backend)?,
                None => weighted,
            });
        }
        let out = out.ok_or_else(|| {
            NnError::InvalidConfig("mixture has no components".to_string())
        })?;

        trace!(
            rows = out.rows(),
            output_size = self.output_size,
            "mixture of softmax forward"
        );

        if !self.use_activation {
            return Ok(out);
        }
        let normalized = if self.take_log {
            out.log_softmax_last(backend)?
        } else {
            out.softmax_last(backend)?
        };
        Ok(normalized)
    }

    fn parameters(&self) -> Vec<&Tensor> {
        let mut params = self.gate.parameters();
        for c in &self.components {
            params.extend(c.parameters());
        }
        params
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut params = self.gate.parameters_mut();
        for c in &mut self.components {
            params.extend(c.parameters_mut());
        }
        params
    }
}

pub mod batch;
pub mod config;
pub mod vocab;

pub use batch::{Batches, BigramBatch};
pub use config::BigramLmConfig;
pub use vocab::Vocab;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use fl_nn::{Encoder, MixtureOfSoftmax, MosConfig};
use fl_tensor::{ComputeBackend, CpuBackend, Shape, Tensor};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace, warn};

use crate::error::{ModelError, Result};
use crate::metrics::{self, MetricValue, Metrics, LOSS_KEY};
use crate::model::Model;

/// Sum of per-token negative log-likelihoods in a batch.
pub const NLL_SUM_KEY: &str = "nll_sum";
/// Number of predicted tokens.
pub const TOKENS_KEY: &str = "tokens";
/// `exp(mean NLL)` over a dataset.
pub const PERPLEXITY_KEY: &str = "perplexity";

/// Next-word language model: embeds the previous word and predicts the next
/// one through a mixture-of-softmax output layer.
///
/// The output layer runs with log-softmax enabled, so its rows are
/// log-probabilities over the vocabulary.
#[derive(Debug)]
pub struct BigramLm {
    config: BigramLmConfig,
    vocab: Vocab,
    /// Context embeddings, shape [vocab_size, hidden_size].
    embedding: Tensor,
    head: MixtureOfSoftmax,
    backend: Arc<dyn ComputeBackend>,
    /// Number of training samplers handed out; seeds each shuffle.
    sampler_epoch: AtomicU64,
    steps: u64,
}

impl BigramLm {
    /// Run the forward computation on a different backend.
    pub fn with_backend(mut self, backend: Arc<dyn ComputeBackend>) -> Self {
        self.backend = backend;
        self
    }

    pub fn config(&self) -> &BigramLmConfig {
        &self.config
    }

    pub fn vocab(&self) -> &Vocab {
        &self.vocab
    }

    pub fn head(&self) -> &MixtureOfSoftmax {
        &self.head
    }

    pub fn embedding(&self) -> &Tensor {
        &self.embedding
    }

    /// Number of `batch_train` calls so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Every learned tensor: the embedding table followed by the output
    /// layer's parameters.
    pub fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut params = vec![&mut self.embedding];
        params.extend(self.head.parameters_mut());
        params
    }

    /// Log-probabilities of the next token for each context id, shape
    /// [contexts.len(), vocab_size].
    pub fn log_probs(&self, contexts: &[u32]) -> Result<Tensor> {
        let hidden = self.config.hidden_size;
        let mut data = Vec::with_capacity(contexts.len() * hidden);
        for &id in contexts {
            data.extend_from_slice(self.embedding.row(self.check_id(id)?)?);
        }
        let x = Tensor::new(data, Shape::new(vec![contexts.len(), hidden]))?;
        Ok(self.head.forward(&x, self.backend.as_ref())?)
    }

    /// Total negative log-likelihood of the batch targets and the number of
    /// targets scored.
    fn nll(&self, batch: &BigramBatch) -> Result<(f32, u64)> {
        if batch.is_empty() {
            return Err(ModelError::EmptyBatch);
        }
        if batch.contexts.len() != batch.targets.len() {
            return Err(ModelError::Other(format!(
                "batch has {} contexts but {} targets",
                batch.contexts.len(),
                batch.targets.len()
            )));
        }

        let log_probs = self.log_probs(&batch.contexts)?;
        let mut total = 0.0f32;
        for (r, &target) in batch.targets.iter().enumerate() {
            total -= log_probs.row(r)?[self.check_id(target)?];
        }
        Ok((total, batch.len() as u64))
    }

    fn check_id(&self, id: u32) -> Result<usize> {
        let idx = id as usize;
        if idx >= self.vocab.len() {
            return Err(ModelError::Other(format!(
                "token id {} exceeds vocab size {}",
                id,
                self.vocab.len()
            )));
        }
        Ok(idx)
    }
}

impl Model for BigramLm {
    type Example = String;
    type Batch = BigramBatch;
    type Config = BigramLmConfig;

    /// Derive the vocabulary from `dataset` and initialize all parameters.
    ///
    /// The whole dataset is read, so it must be finite.
    fn build<I>(dataset: I, config: BigramLmConfig) -> Result<Self>
    where
        I: IntoIterator<Item = Self::Example>,
    {
        config.validate()?;

        let vocab = Vocab::from_sentences(dataset, config.min_count);
        if vocab.word_count() == 0 {
            return Err(ModelError::InvalidConfig(format!(
                "dataset has no word seen at least {} times",
                config.min_count
            )));
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let embedding = Tensor::from_fn(
            Shape::new(vec![vocab.len(), config.hidden_size]),
            |_| rng.gen_range(-1.0..1.0),
        );
        let head_config = MosConfig::new(config.hidden_size, vocab.len())
            .with_mixture_count(config.mixture_count)
            .with_activation(true)
            .with_log_output(true)
            .with_seed(config.seed);
        let head = MixtureOfSoftmax::with_rng(&head_config, &mut rng)?;
        let backend: Arc<dyn ComputeBackend> = Arc::new(CpuBackend::new());

        info!(
            backend = backend.name(),
            vocab_size = vocab.len(),
            hidden_size = config.hidden_size,
            mixture_count = config.mixture_count,
            parameters = embedding.shape().numel() + head.num_parameters(),
            "built bigram language model"
        );

        Ok(BigramLm {
            config,
            vocab,
            embedding,
            head,
            backend,
            sampler_epoch: AtomicU64::new(0),
            steps: 0,
        })
    }

    /// Training batches are drawn from a fresh shuffle of every pair in
    /// `data` on each call; evaluation batches follow corpus order.
    fn sampler<'a>(
        &'a self,
        data: &'a [String],
        train: bool,
    ) -> Box<dyn Iterator<Item = BigramBatch> + 'a> {
        let batch_size = self.config.batch_size;
        if !train {
            let pairs = data.iter().flat_map(move |s| self.vocab.pairs(s));
            return Box::new(Batches::new(pairs, batch_size));
        }

        let epoch = self.sampler_epoch.fetch_add(1, Ordering::Relaxed);
        let mut rng = StdRng::seed_from_u64(self.config.seed.wrapping_add(epoch));
        let mut pairs: Vec<(u32, u32)> = data.iter().flat_map(|s| self.vocab.pairs(s)).collect();
        pairs.shuffle(&mut rng);
        debug!(epoch, pairs = pairs.len(), "shuffled training pairs");

        Box::new(Batches::new(pairs.into_iter(), batch_size))
    }

    fn batch_train(&mut self, batch: &BigramBatch) -> Result<Metrics> {
        let (nll_sum, tokens) = self.nll(batch)?;
        self.steps += 1;
        let loss = nll_sum / tokens as f32;
        trace!(step = self.steps, loss, tokens, "train batch");

        Ok(Metrics::from([
            (LOSS_KEY.to_string(), MetricValue::Scalar(loss)),
            (TOKENS_KEY.to_string(), MetricValue::Count(tokens)),
        ]))
    }

    fn batch_eval(&self, batch: &BigramBatch) -> Result<Metrics> {
        let (nll_sum, tokens) = self.nll(batch)?;
        Ok(Metrics::from([
            (NLL_SUM_KEY.to_string(), MetricValue::Scalar(nll_sum)),
            (TOKENS_KEY.to_string(), MetricValue::Count(tokens)),
        ]))
    }

    /// Token-weighted mean NLL (`loss`) and its perplexity.
    ///
    /// An empty list is rejected with `ModelError::EmptyMetrics`.
    fn aggregate(&self, batches: &[Metrics]) -> Result<Metrics> {
        if batches.is_empty() {
            return Err(ModelError::EmptyMetrics);
        }

        let mut nll_sum = 0.0f64;
        let mut tokens = 0u64;
        for m in batches {
            nll_sum += metrics::scalar(m, NLL_SUM_KEY)? as f64;
            tokens += metrics::count(m, TOKENS_KEY)?;
        }
        if tokens == 0 {
            return Err(ModelError::Other("no tokens were scored".to_string()));
        }

        let loss = (nll_sum / tokens as f64) as f32;
        let perplexity = loss.exp();
        debug!(loss, perplexity, tokens, "aggregated evaluation");

        Ok(Metrics::from([
            (LOSS_KEY.to_string(), MetricValue::Scalar(loss)),
            (PERPLEXITY_KEY.to_string(), MetricValue::Scalar(perplexity)),
            (TOKENS_KEY.to_string(), MetricValue::Count(tokens)),
        ]))
    }

    /// Lower perplexity wins. Ties keep the other model.
    ///
    /// Both sides are expected to come from `aggregate`, which always sets
    /// `perplexity`. If either side lacks it the trait gives no way to
    /// report the error, so this logs a warning and returns `true`,
    /// preferring `metrics`.
    fn compare(&self, metrics: &Metrics, other: &Metrics) -> bool {
        match (
            metrics::scalar(metrics, PERPLEXITY_KEY),
            metrics::scalar(other, PERPLEXITY_KEY),
        ) {
            (Ok(a), Ok(b)) => a < b,
            _ => {
                warn!("perplexity missing from aggregated metrics; preferring the first result");
                true
            }
        }
    }
}

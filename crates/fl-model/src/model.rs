use crate::error::Result;
use crate::metrics::Metrics;

/// Contract a trainable model implements so that a generic driver can train,
/// evaluate and select it without knowing its internals.
///
/// Both the example and the batch representation are chosen by the
/// implementation. A driver typically:
///
/// 1. calls `build` once with the training data,
/// 2. iterates `sampler(data, true)` and feeds each batch to `batch_train`,
///    reading the loss with [`crate::required_loss`] and running the backward
///    pass itself,
/// 3. periodically iterates `sampler(data, false)` through `batch_eval`,
///    folds the results with `aggregate`, and keeps the best checkpoint
///    according to `compare`.
pub trait Model {
    /// One datum, in whatever form the dataset provides.
    type Example;

    /// A group of examples prepared for one forward computation.
    type Batch;

    /// Dataset-independent hyperparameters consumed by `build`.
    type Config;

    /// Build a model from a dataset.
    ///
    /// This is where dataset-dependent setup happens, such as deriving a
    /// vocabulary that fixes the model's input and output sizes. The dataset
    /// may be any iterable; implementations decide how much of it they read.
    fn build<I>(dataset: I, config: Self::Config) -> Result<Self>
    where
        I: IntoIterator<Item = Self::Example>,
        Self: Sized;

    /// Lazily group `data` into batches.
    ///
    /// `train` selects training-mode batching (which may shuffle or repeat)
    /// over evaluation-mode batching. The batches produced in one mode are
    /// the inputs of `batch_train` and `batch_eval` respectively.
    fn sampler<'a>(
        &'a self,
        data: &'a [Self::Example],
        train: bool,
    ) -> Box<dyn Iterator<Item = Self::Batch> + 'a>;

    /// Compute the loss on a training batch.
    ///
    /// The output must contain [`crate::LOSS_KEY`]; other entries are free-form
    /// training metrics. This method must not run a backward pass: that is
    /// the caller's job.
    fn batch_train(&mut self, batch: &Self::Batch) -> Result<Metrics>;

    /// Compute per-batch evaluation values, later combined by `aggregate`.
    fn batch_eval(&self, batch: &Self::Batch) -> Result<Metrics>;

    /// Fold the `batch_eval` outputs of a whole dataset into one result.
    fn aggregate(&self, metrics: &[Metrics]) -> Result<Metrics>;

    /// Returns `true` if `metrics` is better than `other`.
    ///
    /// Both arguments come from `aggregate`. The default always returns
    /// `true`, so a driver using it for early stopping always keeps the
    /// most recent model, even when the two results are identical.
    fn compare(&self, _metrics: &Metrics, _other: &Metrics) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use crate::metrics::{MetricValue, LOSS_KEY};

    /// Sums integers; keeps the default `compare`.
    struct Summer {
        offset: i64,
    }

    impl Model for Summer {
        type Example = i64;
        type Batch = Vec<i64>;
        type Config = ();

        fn build<I>(dataset: I, _config: ()) -> Result<Self>
        where
            I: IntoIterator<Item = Self::Example>,
        {
            let offset = dataset.into_iter().take(3).sum();
            Ok(Summer { offset })
        }

        fn sampler<'a>(
            &'a self,
            data: &'a [i64],
            _train: bool,
        ) -> Box<dyn Iterator<Item = Vec<i64>> + 'a> {
            Box::new(data.chunks(2).map(|c| c.to_vec()))
        }

        fn batch_train(&mut self, batch: &Vec<i64>) -> Result<Metrics> {
            let loss = batch.iter().sum::<i64>() + self.offset;
            Ok(Metrics::from([(LOSS_KEY.to_string(), MetricValue::Scalar(loss as f32))]))
        }

        fn batch_eval(&self, batch: &Vec<i64>) -> Result<Metrics> {
            Ok(Metrics::from([("n".to_string(), MetricValue::Count(batch.len() as u64))]))
        }

        fn aggregate(&self, metrics: &[Metrics]) -> Result<Metrics> {
            if metrics.is_empty() {
                return Err(ModelError::EmptyMetrics);
            }
            let n = metrics
                .iter()
                .filter_map(|m| m.get("n").and_then(MetricValue::as_count))
                .sum::<u64>();
            Ok(Metrics::from([("n".to_string(), MetricValue::Count(n))]))
        }
    }

    #[test]
    fn test_build_reads_only_what_it_needs() {
        // An unbounded dataset is fine as long as the model stops reading.
        let model = Summer::build(1i64.., ()).unwrap();
        assert_eq!(model.offset, 1 + 2 + 3);
    }

    #[test]
    fn test_default_compare_always_true() {
        let model = Summer::build(Vec::new(), ()).unwrap();
        let a = Metrics::from([("n".to_string(), MetricValue::Count(1))]);
        let b = Metrics::from([("n".to_string(), MetricValue::Count(100))]);
        assert!(model.compare(&a, &b));
        assert!(model.compare(&b, &a));
        assert!(model.compare(&a, &a));
        assert!(model.compare(&Metrics::new(), &Metrics::new()));
    }

    #[test]
    fn test_sampler_does_not_consume_data() {
        let model = Summer::build(Vec::new(), ()).unwrap();
        let data = vec![1, 2, 3, 4, 5];
        let batches: Vec<_> = model.sampler(&data, true).collect();
        assert_eq!(batches, vec![vec![1, 2], vec![3, 4], vec![5]]);
        assert_eq!(data, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_train_and_aggregate_through_trait() {
        let mut model = Summer::build(vec![10], ()).unwrap();
        let out = model.batch_train(&vec![1, 2]).unwrap();
        assert_eq!(crate::required_loss(&out).unwrap(), 13.0);

        let evals: Vec<Metrics> = [vec![1, 2], vec![3]]
            .iter()
            .map(|b| model.batch_eval(b).unwrap())
            .collect();
        let agg = model.aggregate(&evals).unwrap();
        assert_eq!(agg["n"], MetricValue::Count(3));
        assert!(matches!(model.aggregate(&[]), Err(ModelError::EmptyMetrics)));
    }
}

use tracing::debug;

use crate::error::Result;
use crate::metrics::{to_json, Metrics};
use crate::model::Model;

/// Run one evaluation pass over `data`.
///
/// Batches come from `model.sampler(data, false)`; each is passed through
/// `batch_eval` and the per-batch results are folded with `aggregate`. The
/// first failing batch aborts the pass.
pub fn evaluate<M: Model>(model: &M, data: &[M::Example]) -> Result<Metrics> {
    let per_batch = model
        .sampler(data, false)
        .map(|batch| model.batch_eval(&batch))
        .collect::<Result<Vec<_>>>()?;

    let metrics = model.aggregate(&per_batch)?;
    debug!(
        batches = per_batch.len(),
        metrics = %to_json(&metrics)?,
        "evaluation pass complete"
    );
    Ok(metrics)
}

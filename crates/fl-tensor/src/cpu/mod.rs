use crate::backend::ComputeBackend;
use crate::error::{Result, TensorError};

/// Single-threaded backend built from plain loops over the input slices.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuBackend;

impl CpuBackend {
    pub fn new() -> Self {
        CpuBackend
    }
}

fn expect_len(got: usize, expected: usize) -> Result<()> {
    if got != expected {
        return Err(TensorError::ShapeMismatch {
            expected: vec![expected],
            got: vec![got],
        });
    }
    Ok(())
}

/// Validates that `x` splits into whole rows of `n` elements and returns the
/// row count.
fn row_count(op: &'static str, x: &[f32], n: usize) -> Result<usize> {
    if n == 0 || x.len() % n != 0 {
        return Err(TensorError::RowLength {
            op,
            len: x.len(),
            n,
        });
    }
    Ok(x.len() / n)
}

fn row_max(row: &[f32]) -> f32 {
    row.iter().copied().fold(f32::NEG_INFINITY, f32::max)
}

impl ComputeBackend for CpuBackend {
    fn name(&self) -> &str {
        "cpu"
    }

    fn matmul(&self, a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Result<Vec<f32>> {
        expect_len(a.len(), m * k)?;
        expect_len(b.len(), k * n)?;

        // i-p-j order keeps the inner loop on contiguous rows of b and c.
        let mut c = vec![0.0f32; m * n];
        for (a_row, c_row) in a.chunks_exact(k.max(1)).zip(c.chunks_exact_mut(n.max(1))) {
            for (&a_ip, b_row) in a_row.iter().zip(b.chunks_exact(n.max(1))) {
                for (c_ij, &b_pj) in c_row.iter_mut().zip(b_row) {
                    *c_ij += a_ip * b_pj;
                }
            }
        }
        Ok(c)
    }

    fn add(&self, a: &[f32], b: &[f32]) -> Result<Vec<f32>> {
        expect_len(b.len(), a.len())?;
        Ok(a.iter().zip(b).map(|(x, y)| x + y).collect())
    }

    fn add_row_bias(&self, x: &[f32], bias: &[f32], n: usize) -> Result<Vec<f32>> {
        expect_len(bias.len(), n)?;
        row_count("add_row_bias", x, n)?;

        let mut result = x.to_vec();
        for row in result.chunks_exact_mut(n) {
            for (v, b) in row.iter_mut().zip(bias) {
                *v += b;
            }
        }
        Ok(result)
    }

    fn scale_rows(&self, x: &[f32], scales: &[f32], n: usize) -> Result<Vec<f32>> {
        let rows = row_count("scale_rows", x, n)?;
        expect_len(scales.len(), rows)?;

        let mut result = x.to_vec();
        for (row, &s) in result.chunks_exact_mut(n).zip(scales) {
            row.iter_mut().for_each(|v| *v *= s);
        }
        Ok(result)
    }

    fn softmax(&self, x: &[f32], n: usize) -> Result<Vec<f32>> {
        row_count("softmax", x, n)?;

        let mut result = vec![0.0f32; x.len()];
        for (src, dst) in x.chunks_exact(n).zip(result.chunks_exact_mut(n)) {
            let max_val = row_max(src);
            let mut sum = 0.0f32;
            for (d, &s) in dst.iter_mut().zip(src) {
                *d = (s - max_val).exp();
                sum += *d;
            }
            dst.iter_mut().for_each(|d| *d /= sum);
        }
        Ok(result)
    }

    fn log_softmax(&self, x: &[f32], n: usize) -> Result<Vec<f32>> {
        row_count("log_softmax", x, n)?;

        let mut result = vec![0.0f32; x.len()];
        for (src, dst) in x.chunks_exact(n).zip(result.chunks_exact_mut(n)) {
            let max_val = row_max(src);
            let log_sum = src.iter().map(|&s| (s - max_val).exp()).sum::<f32>().ln();
            for (d, &s) in dst.iter_mut().zip(src) {
                *d = s - max_val - log_sum;
            }
        }
        Ok(result)
    }

    fn tanh(&self, x: &[f32]) -> Result<Vec<f32>> {
        Ok(x.iter().map(|v| v.tanh()).collect())
    }
}

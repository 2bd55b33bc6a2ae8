//! Rotary position embeddings in the rotate-half layout.
//!
//! The head dimension is split into two halves `x0 = x[..d/2]`,
//! `x1 = x[d/2..]` and every pair `(x0[i], x1[i])` is rotated by
//! `pos * theta^(-2i/d)`. ModernBERT uses two of these: one with a large
//! theta for global layers and one with a small theta for local layers.

use anyhow::{anyhow, Result};
use ndarray::{Array1, Array2, ArrayViewMut4};

/// Precomputed cosine/sine tables for one theta.
#[derive(Debug, Clone)]
pub struct RoPE {
    /// `[max_seq_len, head_dim]`
    pub cos_cache: Array2<f32>,
    /// `[max_seq_len, head_dim]`
    pub sin_cache: Array2<f32>,
    pub head_dim: usize,
    pub theta: f32,
}

impl RoPE {
    pub fn new(head_dim: usize, max_seq_len: usize, theta: f32) -> Self {
        let inv_freq = Self::inv_freq(head_dim, theta);
        let (cos_cache, sin_cache) = Self::build_cache(max_seq_len, &inv_freq);
        Self {
            cos_cache,
            sin_cache,
            head_dim,
            theta,
        }
    }

    fn inv_freq(head_dim: usize, theta: f32) -> Array1<f32> {
        Array1::from_iter((0..head_dim / 2).map(|i| {
            let exponent = (2 * i) as f32 / head_dim as f32;
            1.0 / theta.powf(exponent)
        }))
    }

    fn build_cache(max_seq_len: usize, inv_freq: &Array1<f32>) -> (Array2<f32>, Array2<f32>) {
        let half_dim = inv_freq.len();
        let head_dim = half_dim * 2;
        let mut cos_cache = Array2::<f32>::zeros((max_seq_len, head_dim));
        let mut sin_cache = Array2::<f32>::zeros((max_seq_len, head_dim));

        for pos in 0..max_seq_len {
            for i in 0..half_dim {
                let angle = pos as f32 * inv_freq[i];
                let (sin_val, cos_val) = angle.sin_cos();
                cos_cache[[pos, i]] = cos_val;
                sin_cache[[pos, i]] = sin_val;
                cos_cache[[pos, i + half_dim]] = cos_val;
                sin_cache[[pos, i + half_dim]] = sin_val;
            }
        }
        (cos_cache, sin_cache)
    }

    pub fn max_seq_len(&self) -> usize {
        self.cos_cache.nrows()
    }

    /// Rotates `[batch, heads, seq, head_dim]` in place, positions from 0.
    pub fn rotate_in_place(&self, x: &mut ArrayViewMut4<f32>) -> Result<()> {
        let (batch, num_heads, seq_len, head_dim) = x.dim();
        if head_dim != self.head_dim {
            return Err(anyhow!(
                "rope built for head_dim {}, got {}",
                self.head_dim,
                head_dim
            ));
        }
        if seq_len > self.max_seq_len() {
            return Err(anyhow!(
                "sequence length {} exceeds rope cache of {} positions",
                seq_len,
                self.max_seq_len()
            ));
        }
        let half_dim = head_dim / 2;

        for b in 0..batch {
            for h in 0..num_heads {
                for s in 0..seq_len {
                    for i in 0..half_dim {
                        let cos = self.cos_cache[[s, i]];
                        let sin = self.sin_cache[[s, i]];

                        // both halves are read before either is written
                        let x0 = x[[b, h, s, i]];
                        let x1 = x[[b, h, s, i + half_dim]];

                        x[[b, h, s, i]] = x0 * cos - x1 * sin;
                        x[[b, h, s, i + half_dim]] = x0 * sin + x1 * cos;
                    }
                }
            }
        }
        Ok(())
    }
}

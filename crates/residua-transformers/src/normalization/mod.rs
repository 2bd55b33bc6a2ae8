//! Bias-free layer normalization.

use anyhow::{anyhow, Result};
use ndarray::{Array1, Array3, ArrayView3, Axis};

/// LayerNorm with a learned scale and no shift.
#[derive(Debug, Clone)]
pub struct LayerNorm {
    pub weight: Array1<f32>,
    pub eps: f32,
}

impl LayerNorm {
    pub fn new(weight: Array1<f32>, eps: f32) -> Self {
        Self { weight, eps }
    }

    /// Unit scale, i.e. plain standardization.
    pub fn ones(hidden_size: usize, eps: f32) -> Self {
        Self::new(Array1::ones(hidden_size), eps)
    }

    pub fn hidden_size(&self) -> usize {
        self.weight.len()
    }

    /// Replaces the scale, keeping the width.
    pub fn set_weight(&mut self, weight: Array1<f32>) -> Result<()> {
        if weight.len() != self.weight.len() {
            return Err(anyhow!(
                "layer norm expects {} weights, got {}",
                self.weight.len(),
                weight.len()
            ));
        }
        self.weight = weight;
        Ok(())
    }

    /// Normalizes over the last axis of `[batch, seq, hidden]`.
    pub fn forward(&self, hidden_states: &ArrayView3<f32>) -> Array3<f32> {
        let (batch, seq, hidden) = hidden_states.dim();
        if batch * seq == 0 {
            return Array3::zeros((batch, seq, hidden));
        }
        // var_axis with ddof 0 matches the biased variance of torch's layer_norm
        let mean = hidden_states
            .mean_axis(Axis(2))
            .unwrap_or_else(|| ndarray::Array2::zeros((batch, seq)))
            .insert_axis(Axis(2));
        let variance = hidden_states.var_axis(Axis(2), 0.0).insert_axis(Axis(2));

        let inv_std = (&variance + self.eps).mapv(|x| 1.0 / x.sqrt());
        let normalized = (hidden_states - &mean) * &inv_std;
        normalized * &self.weight
    }
}

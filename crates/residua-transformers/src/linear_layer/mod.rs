//! Bias-free dense projection in PyTorch `[out_features, in_features]` layout.

use anyhow::{anyhow, Result};
use ndarray::{Array2, Array3, ArrayView2, ArrayView3};

/// `y = x W^T`.
#[derive(Debug, Clone)]
pub struct LinearLayer {
    weight: Array2<f32>,
}

impl LinearLayer {
    /// Zero-initialized projection.
    pub fn zeros(out_features: usize, in_features: usize) -> Self {
        Self {
            weight: Array2::zeros((out_features, in_features)),
        }
    }

    pub fn new_f32(weight: Array2<f32>) -> Self {
        Self { weight }
    }

    pub fn weight(&self) -> &Array2<f32> {
        &self.weight
    }

    /// Replaces the weight matrix; the shape must stay the same.
    pub fn set_weight(&mut self, weight: Array2<f32>) -> Result<()> {
        if weight.dim() != self.weight.dim() {
            return Err(anyhow!(
                "linear layer expects weight {:?}, got {:?}",
                self.weight.dim(),
                weight.dim()
            ));
        }
        self.weight = weight;
        Ok(())
    }

    pub fn shape(&self) -> [usize; 2] {
        [self.weight.nrows(), self.weight.ncols()]
    }

    pub fn out_features(&self) -> usize {
        self.weight.nrows()
    }

    pub fn in_features(&self) -> usize {
        self.weight.ncols()
    }

    /// `[tokens, in] -> [tokens, out]`
    pub fn matmul(&self, input: &ArrayView2<f32>) -> Array2<f32> {
        input.dot(&self.weight.t())
    }

    /// `[batch, seq, in] -> [batch, seq, out]`
    pub fn forward_3d(&self, input: &ArrayView3<f32>) -> Result<Array3<f32>> {
        let (batch, seq, hidden) = input.dim();
        if hidden != self.in_features() {
            return Err(anyhow!(
                "linear layer expects {} input features, got {}",
                self.in_features(),
                hidden
            ));
        }
        let flat = input
            .as_standard_layout()
            .into_owned()
            .into_shape_with_order((batch * seq, hidden))?;
        let out = self.matmul(&flat.view());
        Ok(out.into_shape_with_order((batch, seq, self.out_features()))?)
    }
}

impl From<Array2<f32>> for LinearLayer {
    fn from(weight: Array2<f32>) -> Self {
        Self::new_f32(weight)
    }
}

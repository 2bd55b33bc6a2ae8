use anyhow::{anyhow, Result};
use ndarray::{s, Array2, Array3, ArrayView3, Zip};

use crate::activations::{gelu_scalar, silu_scalar};
use crate::feedforward::MlpActivation;
use crate::linear_layer::LinearLayer;

/// `Wo(act(Wi(x)))` with `Wi` producing both input and gate.
#[derive(Debug, Clone)]
pub struct GluFeedForward {
    pub wi: LinearLayer,
    pub wo: LinearLayer,
    pub activation: MlpActivation,
}

impl GluFeedForward {
    pub fn new(
        wi: impl Into<LinearLayer>,
        wo: impl Into<LinearLayer>,
        activation: MlpActivation,
    ) -> Result<Self> {
        let wi = wi.into();
        let wo = wo.into();
        if wi.out_features() != 2 * wo.in_features() {
            return Err(anyhow!(
                "Wi produces {} features, Wo expects 2 x {}",
                wi.out_features(),
                wo.in_features()
            ));
        }
        Ok(Self { wi, wo, activation })
    }

    /// Zero-initialized block for `hidden -> intermediate -> hidden`.
    pub fn zeros(hidden_size: usize, intermediate_size: usize, activation: MlpActivation) -> Self {
        Self {
            wi: LinearLayer::zeros(2 * intermediate_size, hidden_size),
            wo: LinearLayer::zeros(hidden_size, intermediate_size),
            activation,
        }
    }

    pub fn intermediate_size(&self) -> usize {
        self.wo.in_features()
    }

    /// Combines the input and gate halves of a `[tokens, 2 * intermediate]` matrix.
    fn gate(&self, fused: &Array2<f32>) -> Array2<f32> {
        let half = self.intermediate_size();
        let input = fused.slice(s![.., ..half]);
        let gate = fused.slice(s![.., half..]);
        let mut out = Array2::<f32>::zeros(input.raw_dim());
        match self.activation {
            MlpActivation::SwiGlu => Zip::from(&mut out)
                .and(&input)
                .and(&gate)
                .par_for_each(|o, &x, &g| *o = silu_scalar(g) * x),
            MlpActivation::Gelu => Zip::from(&mut out)
                .and(&input)
                .and(&gate)
                .par_for_each(|o, &x, &g| *o = gelu_scalar(x) * g),
        }
        out
    }

    pub fn forward(&self, hidden: &ArrayView3<f32>) -> Result<Array3<f32>> {
        let (batch, seq, hidden_dim) = hidden.dim();
        if hidden_dim != self.wi.in_features() {
            return Err(anyhow!(
                "mlp expects hidden size {}, got {}",
                self.wi.in_features(),
                hidden_dim
            ));
        }
        let hidden_2d = hidden
            .as_standard_layout()
            .into_owned()
            .into_shape_with_order((batch * seq, hidden_dim))?;

        let fused = self.wi.matmul(&hidden_2d.view());
        let activated = self.gate(&fused);
        let output_2d = self.wo.matmul(&activated.view());

        Ok(output_2d.into_shape_with_order((batch, seq, self.wo.out_features()))?)
    }
}

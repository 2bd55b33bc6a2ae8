use anyhow::Result;
use ndarray::{Array2, Array3};

use crate::encoder::attention::ModernBertAttention;
use crate::encoder::config::EncoderConfig;
use crate::feedforward::GluFeedForward;
use crate::normalization::LayerNorm;
use crate::rope::RoPE;

/// One pre-norm encoder block.
///
/// The first layer has no attention norm: the embedding norm already
/// normalizes its input.
#[derive(Debug, Clone)]
pub struct ModernBertLayer {
    pub attn_norm: Option<LayerNorm>,
    pub attn: ModernBertAttention,
    pub mlp_norm: LayerNorm,
    pub mlp: GluFeedForward,
    pub is_global: bool,
}

impl ModernBertLayer {
    pub fn new(config: &EncoderConfig, layer_idx: usize) -> Self {
        let attn_norm =
            (layer_idx != 0).then(|| LayerNorm::ones(config.hidden_size, config.norm_eps));
        Self {
            attn_norm,
            attn: ModernBertAttention::zeros(config.hidden_size, config.num_heads),
            mlp_norm: LayerNorm::ones(config.hidden_size, config.norm_eps),
            mlp: GluFeedForward::zeros(
                config.hidden_size,
                config.intermediate_size,
                config.mlp_activation,
            ),
            is_global: config.is_global_layer(layer_idx),
        }
    }

    pub fn forward(
        &self,
        hidden: Array3<f32>,
        attention_mask: &Array2<f32>,
        rope: &RoPE,
        window: Option<&Array2<f32>>,
    ) -> Result<Array3<f32>> {
        let window = if self.is_global { None } else { window };

        let attn_out = match &self.attn_norm {
            Some(norm) => {
                let normed = norm.forward(&hidden.view());
                self.attn
                    .forward(&normed.view(), attention_mask, rope, window)?
            }
            None => self
                .attn
                .forward(&hidden.view(), attention_mask, rope, window)?,
        };
        let hidden = hidden + &attn_out;

        let normed = self.mlp_norm.forward(&hidden.view());
        let mlp_out = self.mlp.forward(&normed.view())?;
        Ok(hidden + &mlp_out)
    }
}

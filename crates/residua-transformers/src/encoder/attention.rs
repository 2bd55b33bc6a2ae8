use anyhow::{anyhow, Result};
use ndarray::{Array2, Array3, ArrayView3, Axis};

use crate::activations::softmax_4d_inplace;
use crate::linear_layer::LinearLayer;
use crate::rope::RoPE;
use crate::utils::{apply_padding_mask, apply_window_mask, matmul_4d};

/// Bidirectional self-attention with a fused `Wqkv` projection.
#[derive(Debug, Clone)]
pub struct ModernBertAttention {
    /// `[3 * hidden, hidden]`, rows ordered q, k, v.
    pub wqkv: LinearLayer,
    /// `[hidden, hidden]`
    pub wo: LinearLayer,
    pub num_heads: usize,
    pub head_dim: usize,
    pub scale_factor: f32,
}

impl ModernBertAttention {
    pub fn zeros(hidden_size: usize, num_heads: usize) -> Self {
        let head_dim = hidden_size / num_heads;
        Self {
            wqkv: LinearLayer::zeros(3 * hidden_size, hidden_size),
            wo: LinearLayer::zeros(hidden_size, hidden_size),
            num_heads,
            head_dim,
            scale_factor: 1.0 / (head_dim as f32).sqrt(),
        }
    }

    pub fn hidden_size(&self) -> usize {
        self.num_heads * self.head_dim
    }

    /// # Arguments
    /// * `hidden_states` - `[batch, seq, hidden]`
    /// * `attention_mask` - `[batch, seq]`, 0 = padding
    /// * `rope` - rotary tables for this layer's theta
    /// * `window` - `[seq, seq]` sliding window for local layers, `None` for global
    pub fn forward(
        &self,
        hidden_states: &ArrayView3<f32>,
        attention_mask: &Array2<f32>,
        rope: &RoPE,
        window: Option<&Array2<f32>>,
    ) -> Result<Array3<f32>> {
        let (batch, seq_len, hidden_dim) = hidden_states.dim();
        if hidden_dim != self.hidden_size() {
            return Err(anyhow!(
                "attention expects hidden size {}, got {}",
                self.hidden_size(),
                hidden_dim
            ));
        }

        // [B, S, 3E] -> [B, S, 3, H, D]
        let qkv = self
            .wqkv
            .forward_3d(hidden_states)?
            .into_shape_with_order((batch, seq_len, 3, self.num_heads, self.head_dim))?;

        // each [B, H, S, D]
        let mut q = qkv
            .index_axis(Axis(2), 0)
            .permuted_axes([0, 2, 1, 3])
            .as_standard_layout()
            .into_owned();
        let mut k = qkv
            .index_axis(Axis(2), 1)
            .permuted_axes([0, 2, 1, 3])
            .as_standard_layout()
            .into_owned();
        let v = qkv.index_axis(Axis(2), 2).permuted_axes([0, 2, 1, 3]);

        rope.rotate_in_place(&mut q.view_mut())?;
        rope.rotate_in_place(&mut k.view_mut())?;

        let k_t = k.view().permuted_axes([0, 1, 3, 2]);
        let mut scores = matmul_4d(&q.view(), &k_t);
        scores.mapv_inplace(|x| x * self.scale_factor);

        apply_padding_mask(&mut scores.view_mut(), attention_mask)?;
        if let Some(w) = window {
            apply_window_mask(&mut scores.view_mut(), w);
        }

        softmax_4d_inplace(&mut scores);

        // [B, H, S, D] -> [B, S, H, D] -> [B, S, E]
        let context = matmul_4d(&scores.view(), &v)
            .permuted_axes([0, 2, 1, 3])
            .as_standard_layout()
            .into_owned()
            .into_shape_with_order((batch, seq_len, hidden_dim))?;

        self.wo.forward_3d(&context.view())
    }
}

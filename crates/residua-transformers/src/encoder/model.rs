use anyhow::{anyhow, Result};
use ndarray::{Array2, Array3, Axis};

use crate::encoder::config::{EncoderConfig, EncoderConfigError};
use crate::encoder::layer::ModernBertLayer;
use crate::encoder::loading::{LoadReport, ShapeMismatch, Slot};
use crate::encoder::traits::SequenceEncoder;
use crate::normalization::LayerNorm;
use crate::rope::RoPE;
use crate::utils::sliding_window_mask;
use crate::weights::ParameterTable;

pub const TOK_EMBEDDINGS: &str = "model.embeddings.tok_embeddings.weight";
pub const EMBEDDINGS_NORM: &str = "model.embeddings.norm.weight";
pub const FINAL_NORM: &str = "model.final_norm.weight";
const LAYER_PREFIX: &str = "model.layers.";

/// CPU ModernBERT encoder.
///
/// Built with deterministic default parameters (zero projections and
/// embeddings, unit norms) and then filled from a checkpoint with
/// [`ModernBertEncoder::load_parameters`].
#[derive(Debug, Clone)]
pub struct ModernBertEncoder {
    config: EncoderConfig,
    tok_embeddings: Array2<f32>,
    embeddings_norm: LayerNorm,
    layers: Vec<ModernBertLayer>,
    final_norm: LayerNorm,
    global_rope: RoPE,
    local_rope: RoPE,
}

impl ModernBertEncoder {
    pub fn new(config: EncoderConfig) -> Result<Self, EncoderConfigError> {
        config.validate()?;

        let head_dim = config.head_dim();
        let layers = (0..config.num_layers)
            .map(|i| ModernBertLayer::new(&config, i))
            .collect();

        log::debug!("building encoder: {}", config);

        Ok(Self {
            tok_embeddings: Array2::zeros((config.vocab_size, config.hidden_size)),
            embeddings_norm: LayerNorm::ones(config.hidden_size, config.norm_eps),
            final_norm: LayerNorm::ones(config.hidden_size, config.norm_eps),
            global_rope: RoPE::new(
                head_dim,
                config.max_position_embeddings,
                config.global_rope_theta,
            ),
            local_rope: RoPE::new(
                head_dim,
                config.max_position_embeddings,
                config.local_rope_theta,
            ),
            layers,
            config,
        })
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn layers(&self) -> &[ModernBertLayer] {
        &self.layers
    }

    pub fn tok_embeddings(&self) -> &Array2<f32> {
        &self.tok_embeddings
    }

    /// Names of every parameter the encoder owns, in model order.
    pub fn parameter_names(&self) -> Vec<String> {
        let mut names = vec![TOK_EMBEDDINGS.to_string(), EMBEDDINGS_NORM.to_string()];
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.attn_norm.is_some() {
                names.push(format!("{}{}.attn_norm.weight", LAYER_PREFIX, i));
            }
            for param in [
                "attn.Wqkv.weight",
                "attn.Wo.weight",
                "mlp_norm.weight",
                "mlp.Wi.weight",
                "mlp.Wo.weight",
            ] {
                names.push(format!("{}{}.{}", LAYER_PREFIX, i, param));
            }
        }
        names.push(FINAL_NORM.to_string());
        names
    }

    fn slot(&mut self, name: &str) -> Option<Slot<'_>> {
        match name {
            TOK_EMBEDDINGS => return Some(Slot::Matrix(&mut self.tok_embeddings)),
            EMBEDDINGS_NORM => return Some(Slot::Norm(&mut self.embeddings_norm)),
            FINAL_NORM => return Some(Slot::Norm(&mut self.final_norm)),
            _ => {}
        }

        let (idx, param) = name.strip_prefix(LAYER_PREFIX)?.split_once('.')?;
        // "01" would parse, but is not a name the encoder produces
        let layer_idx: usize = idx.parse().ok().filter(|i: &usize| i.to_string() == idx)?;
        let layer = self.layers.get_mut(layer_idx)?;

        match param {
            "attn_norm.weight" => layer.attn_norm.as_mut().map(Slot::Norm),
            "attn.Wqkv.weight" => Some(Slot::Linear(&mut layer.attn.wqkv)),
            "attn.Wo.weight" => Some(Slot::Linear(&mut layer.attn.wo)),
            "mlp_norm.weight" => Some(Slot::Norm(&mut layer.mlp_norm)),
            "mlp.Wi.weight" => Some(Slot::Linear(&mut layer.mlp.wi)),
            "mlp.Wo.weight" => Some(Slot::Linear(&mut layer.mlp.wo)),
            _ => None,
        }
    }

    /// Copies every matching checkpoint tensor into the encoder.
    ///
    /// Non-strict: names the encoder does not own and tensors whose shape
    /// disagrees are skipped, and parameters absent from the table keep their
    /// defaults. All of it is recorded in the returned report.
    pub fn load_parameters(&mut self, table: &ParameterTable) -> Result<LoadReport> {
        let mut report = LoadReport::default();

        for (name, tensor) in table.iter() {
            let Some(slot) = self.slot(name) else {
                report.unexpected.push(name.to_string());
                continue;
            };
            let expected = slot.expected_shape();
            if tensor.shape() != &expected {
                report.mismatched.push(ShapeMismatch {
                    name: name.to_string(),
                    expected,
                    found: tensor.shape().clone(),
                });
                continue;
            }
            slot.assign(tensor)
                .map_err(|e| anyhow!("failed to assign '{}': {}", name, e))?;
            report.loaded.push(name.to_string());
        }

        report.missing = self
            .parameter_names()
            .into_iter()
            .filter(|name| !table.contains(name))
            .collect();

        report.log();
        Ok(report)
    }

    fn embed(&self, input_ids: &Array2<u32>) -> Result<Array3<f32>> {
        let (batch, seq_len) = input_ids.dim();
        let vocab_size = self.tok_embeddings.nrows();
        if let Some(&bad) = input_ids.iter().find(|&&id| id as usize >= vocab_size) {
            return Err(anyhow!(
                "token id {} is outside the vocabulary of {}",
                bad,
                vocab_size
            ));
        }

        let mut hidden = Array3::<f32>::zeros((batch, seq_len, self.config.hidden_size));
        for ((b, s), &id) in input_ids.indexed_iter() {
            hidden
                .index_axis_mut(Axis(0), b)
                .row_mut(s)
                .assign(&self.tok_embeddings.row(id as usize));
        }
        Ok(hidden)
    }
}

impl SequenceEncoder for ModernBertEncoder {
    fn hidden_size(&self) -> usize {
        self.config.hidden_size
    }

    fn forward(
        &self,
        input_ids: &Array2<u32>,
        attention_mask: &Array2<f32>,
    ) -> Result<Array3<f32>> {
        if input_ids.dim() != attention_mask.dim() {
            return Err(anyhow!(
                "input ids {:?} and attention mask {:?} differ in shape",
                input_ids.dim(),
                attention_mask.dim()
            ));
        }
        let seq_len = input_ids.ncols();
        if seq_len > self.config.max_position_embeddings {
            return Err(anyhow!(
                "sequence length {} exceeds max_position_embeddings {}",
                seq_len,
                self.config.max_position_embeddings
            ));
        }

        let embedded = self.embed(input_ids)?;
        let mut hidden = self.embeddings_norm.forward(&embedded.view());

        let window = sliding_window_mask(seq_len, self.config.local_attention / 2);
        for layer in &self.layers {
            let rope = if layer.is_global {
                &self.global_rope
            } else {
                &self.local_rope
            };
            hidden = layer.forward(hidden, attention_mask, rope, Some(&window))?;
        }

        Ok(self.final_norm.forward(&hidden.view()))
    }
}

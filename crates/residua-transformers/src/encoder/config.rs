//! Encoder hyperparameters.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::feedforward::MlpActivation;

/// Rejected encoder configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncoderConfigError {
    #[error("{0} must be > 0")]
    ZeroSize(&'static str),

    #[error("hidden_size {hidden_size} is not divisible by num_heads {num_heads}")]
    HeadsDoNotDivide { hidden_size: usize, num_heads: usize },

    #[error("head_dim {0} must be even for rotary embeddings")]
    OddHeadDim(usize),

    #[error("{name} id {id} is outside the vocabulary of {vocab_size}")]
    TokenOutOfVocab {
        name: &'static str,
        id: u32,
        vocab_size: usize,
    },
}

/// ModernBERT-style encoder configuration.
///
/// Defaults follow the stock ModernBERT config; only the sizes normally
/// change between checkpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderConfig {
    pub vocab_size: usize,
    pub hidden_size: usize,
    pub intermediate_size: usize,
    pub num_layers: usize,
    pub num_heads: usize,
    pub pad_token_id: u32,
    pub eos_token_id: u32,
    pub norm_eps: f32,
    pub global_rope_theta: f32,
    pub local_rope_theta: f32,
    /// Full width of the sliding window; a token sees `local_attention / 2` on each side.
    pub local_attention: usize,
    pub global_attn_every_n_layers: usize,
    pub max_position_embeddings: usize,
    pub mlp_activation: MlpActivation,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            vocab_size: 29,
            hidden_size: 768,
            intermediate_size: 1536,
            num_layers: 12,
            num_heads: 12,
            pad_token_id: 0,
            eos_token_id: 1,
            norm_eps: 1e-5,
            global_rope_theta: 160_000.0,
            local_rope_theta: 10_000.0,
            local_attention: 128,
            global_attn_every_n_layers: 3,
            max_position_embeddings: 8192,
            mlp_activation: MlpActivation::SwiGlu,
        }
    }
}

impl EncoderConfig {
    /// Config for an inferred shape, with `intermediate_size = 2 * hidden_size`.
    pub fn for_shape(hidden_size: usize, num_layers: usize, num_heads: usize) -> Self {
        Self {
            hidden_size,
            intermediate_size: 2 * hidden_size,
            num_layers,
            num_heads,
            ..Default::default()
        }
    }

    pub fn with_vocab(mut self, vocab_size: usize, pad_token_id: u32, eos_token_id: u32) -> Self {
        self.vocab_size = vocab_size;
        self.pad_token_id = pad_token_id;
        self.eos_token_id = eos_token_id;
        self
    }

    pub fn with_mlp_activation(mut self, activation: MlpActivation) -> Self {
        self.mlp_activation = activation;
        self
    }

    pub fn with_max_position_embeddings(mut self, max_positions: usize) -> Self {
        self.max_position_embeddings = max_positions;
        self
    }

    pub fn head_dim(&self) -> usize {
        self.hidden_size / self.num_heads.max(1)
    }

    /// Layers at multiples of `global_attn_every_n_layers` attend globally.
    pub fn is_global_layer(&self, layer_idx: usize) -> bool {
        self.global_attn_every_n_layers == 0 || layer_idx % self.global_attn_every_n_layers == 0
    }

    pub fn validate(&self) -> Result<(), EncoderConfigError> {
        let sizes = [
            ("vocab_size", self.vocab_size),
            ("hidden_size", self.hidden_size),
            ("intermediate_size", self.intermediate_size),
            ("num_layers", self.num_layers),
            ("num_heads", self.num_heads),
            ("max_position_embeddings", self.max_position_embeddings),
        ];
        if let Some((name, _)) = sizes.iter().find(|(_, v)| *v == 0) {
            return Err(EncoderConfigError::ZeroSize(*name));
        }
        if self.hidden_size % self.num_heads != 0 {
            return Err(EncoderConfigError::HeadsDoNotDivide {
                hidden_size: self.hidden_size,
                num_heads: self.num_heads,
            });
        }
        if self.head_dim() % 2 != 0 {
            return Err(EncoderConfigError::OddHeadDim(self.head_dim()));
        }
        for (name, id) in [("pad_token", self.pad_token_id), ("eos_token", self.eos_token_id)] {
            if id as usize >= self.vocab_size {
                return Err(EncoderConfigError::TokenOutOfVocab {
                    name,
                    id,
                    vocab_size: self.vocab_size,
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for EncoderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ModernBERT {{ hidden: {}, layers: {}, heads: {}, intermediate: {}, mlp: {} }}",
            self.hidden_size,
            self.num_layers,
            self.num_heads,
            self.intermediate_size,
            self.mlp_activation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_shape() {
        let config = EncoderConfig::for_shape(320, 6, 5);
        assert_eq!(config.intermediate_size, 640);
        assert_eq!(config.head_dim(), 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_global_layer_pattern() {
        let config = EncoderConfig::default();
        let globals: Vec<usize> = (0..7).filter(|&i| config.is_global_layer(i)).collect();
        assert_eq!(globals, vec![0, 3, 6]);
    }

    #[test]
    fn test_zero_sizes_rejected() {
        let config = EncoderConfig::for_shape(64, 0, 2);
        assert_eq!(
            config.validate(),
            Err(EncoderConfigError::ZeroSize("num_layers"))
        );
        let config = EncoderConfig::for_shape(64, 2, 0);
        assert_eq!(
            config.validate(),
            Err(EncoderConfigError::ZeroSize("num_heads"))
        );
    }

    #[test]
    fn test_indivisible_heads_rejected() {
        let config = EncoderConfig::for_shape(100, 2, 3);
        assert!(matches!(
            config.validate(),
            Err(EncoderConfigError::HeadsDoNotDivide { .. })
        ));
    }

    #[test]
    fn test_odd_head_dim_rejected() {
        // 100 / 20 = 5
        let config = EncoderConfig::for_shape(100, 2, 20);
        assert_eq!(config.validate(), Err(EncoderConfigError::OddHeadDim(5)));
    }

    #[test]
    fn test_special_tokens_must_fit_vocab() {
        let config = EncoderConfig::for_shape(64, 1, 2).with_vocab(4, 0, 7);
        assert!(matches!(
            config.validate(),
            Err(EncoderConfigError::TokenOutOfVocab { id: 7, .. })
        ));
    }

    #[test]
    fn test_display() {
        let config = EncoderConfig::for_shape(64, 2, 4).with_mlp_activation(MlpActivation::Gelu);
        assert_eq!(
            config.to_string(),
            "ModernBERT { hidden: 64, layers: 2, heads: 4, intermediate: 128, mlp: gelu }"
        );
    }
}

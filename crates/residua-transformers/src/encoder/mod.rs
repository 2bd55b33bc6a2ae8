//! ModernBERT encoder on the CPU.
//!
//! Token embeddings are normalized and passed through `num_layers` pre-norm
//! blocks. Every `global_attn_every_n_layers`-th block attends over the full
//! sequence with the global RoPE theta; the others use a sliding window and
//! the local theta. A final LayerNorm produces the hidden states.

pub mod attention;
pub mod config;
pub mod layer;
pub mod loading;
pub mod model;
pub mod traits;

pub use attention::ModernBertAttention;
pub use config::{EncoderConfig, EncoderConfigError};
pub use layer::ModernBertLayer;
pub use loading::{LoadReport, ShapeMismatch};
pub use model::ModernBertEncoder;
pub use traits::SequenceEncoder;

//! Recovers encoder hyperparameters from a checkpoint's parameter table.
//!
//! Checkpoints produced by the distillation pipeline carry no config file, so
//! the embedding width, layer count and attention-head count are read off
//! tensor shapes and parameter-name patterns:
//!
//! 1. `embed_dim`: the first table entry matching one of
//!    [`rules::EMBED_DIM_RULES`], in table order.
//! 2. `num_layers`: the number of *distinct* `model.layers.<idx>` indices.
//!    Sparse indices `{0, 2, 5}` count as three layers, not six.
//! 3. `num_heads`: the [`rules::NUM_HEADS_RULES`] chain, fused QKV first and
//!    a separate query projection as fallback.
//!
//! ```ignore
//! let table = load_parameter_table(Path::new("model.safetensors"))?;
//! let arch = infer_architecture(&table)?;
//! println!("{} layers x {} wide, {} heads", arch.num_layers, arch.embed_dim, arch.num_heads);
//! ```

pub mod rules;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::weights::ParameterTable;

/// Hyperparameters recovered from a checkpoint.
///
/// `embed_dim % num_heads == 0` is what the heuristics aim for but it is not
/// checked here; encoder construction validates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InferredArchitecture {
    pub embed_dim: usize,
    pub num_layers: usize,
    pub num_heads: usize,
}

impl InferredArchitecture {
    /// Per-head width, rounded down.
    pub fn head_dim(&self) -> usize {
        self.embed_dim / self.num_heads
    }
}

impl fmt::Display for InferredArchitecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "embed_dim={}, num_layers={}, num_heads={}",
            self.embed_dim, self.num_layers, self.num_heads
        )
    }
}

/// One of the three scalars could not be determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArchitectureError {
    #[error("could not determine embed_dim from checkpoint")]
    EmbedDimUndetermined,

    #[error("could not determine num_layers from checkpoint")]
    NumLayersUndetermined,

    #[error("could not determine num_heads from checkpoint")]
    NumHeadsUndetermined,
}

impl ArchitectureError {
    /// Name of the scalar that could not be determined.
    pub fn scalar(&self) -> &'static str {
        match self {
            ArchitectureError::EmbedDimUndetermined => "embed_dim",
            ArchitectureError::NumLayersUndetermined => "num_layers",
            ArchitectureError::NumHeadsUndetermined => "num_heads",
        }
    }
}

/// Infers `(embed_dim, num_layers, num_heads)` from a parameter table.
///
/// Only reads the table. The scalars are resolved in that order and the first
/// one that cannot be determined is reported.
pub fn infer_architecture(
    table: &ParameterTable,
) -> Result<InferredArchitecture, ArchitectureError> {
    let (embed_dim, rule) = rules::embed_dim(table).ok_or(ArchitectureError::EmbedDimUndetermined)?;
    log::debug!("embed_dim={} from rule '{}'", embed_dim, rule);

    let layers = rules::layer_indices(table);
    if layers.is_empty() {
        return Err(ArchitectureError::NumLayersUndetermined);
    }
    let num_layers = layers.len();
    if let Some(&max) = layers.iter().next_back() {
        if max + 1 != num_layers {
            log::warn!(
                "layer indices are not contiguous ({} distinct, highest {}); using num_layers={}",
                num_layers,
                max,
                num_layers
            );
        }
    }

    let (num_heads, rule) =
        rules::num_heads(table, embed_dim).ok_or(ArchitectureError::NumHeadsUndetermined)?;
    log::debug!("num_heads={} from rule '{}'", num_heads, rule);

    Ok(InferredArchitecture {
        embed_dim,
        num_layers,
        num_heads,
    })
}

#[cfg(test)]
mod tests;

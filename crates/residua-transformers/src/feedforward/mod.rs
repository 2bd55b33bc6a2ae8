//! Gated MLP blocks.
//!
//! ModernBERT fuses the input and gate projections into a single `Wi` of
//! shape `[2 * intermediate, hidden]`. Its output is split in two halves
//! along the feature axis: the first half is the input, the second the gate.

mod glu;

pub use glu::GluFeedForward;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the two halves of the `Wi` projection are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MlpActivation {
    /// `silu(gate) * input`
    #[default]
    #[serde(alias = "swi_glu")]
    SwiGlu,
    /// `gelu(input) * gate`, the stock ModernBERT MLP.
    #[serde(alias = "gelu_glu", alias = "geglu")]
    Gelu,
}

impl FromStr for MlpActivation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "swiglu" | "swi_glu" => Ok(MlpActivation::SwiGlu),
            "gelu" | "gelu_glu" | "geglu" => Ok(MlpActivation::Gelu),
            _ => Err(format!("unknown mlp activation: {}", s)),
        }
    }
}

impl fmt::Display for MlpActivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlpActivation::SwiGlu => write!(f, "swiglu"),
            MlpActivation::Gelu => write!(f, "gelu"),
        }
    }
}

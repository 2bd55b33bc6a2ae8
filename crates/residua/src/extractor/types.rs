//! Types for the extractor module.

use std::fmt;
use std::str::FromStr;

use ndarray::{Array1, Array2};

use crate::common::ResiduaError;

/// Whether each sequence yields one vector or one vector per residue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Masked mean over positions, `[embed_dim]`.
    #[default]
    Pooled,
    /// Per-residue states without padding and `<eos>`, `[true_length, embed_dim]`.
    PerToken,
}

impl OutputMode {
    pub fn from_pooled(pooled: bool) -> Self {
        if pooled {
            OutputMode::Pooled
        } else {
            OutputMode::PerToken
        }
    }
}

impl FromStr for OutputMode {
    type Err = ResiduaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pooled" | "mean" => Ok(OutputMode::Pooled),
            "per-token" | "per_token" | "tokens" => Ok(OutputMode::PerToken),
            other => Err(ResiduaError::InvalidConfig(format!(
                "unknown output mode '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::Pooled => write!(f, "pooled"),
            OutputMode::PerToken => write!(f, "per-token"),
        }
    }
}

/// Embedding of one input sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddingResult {
    Pooled(Array1<f32>),
    PerToken(Array2<f32>),
}

impl EmbeddingResult {
    pub fn embed_dim(&self) -> usize {
        match self {
            EmbeddingResult::Pooled(v) => v.len(),
            EmbeddingResult::PerToken(m) => m.ncols(),
        }
    }

    pub fn as_pooled(&self) -> Option<&Array1<f32>> {
        match self {
            EmbeddingResult::Pooled(v) => Some(v),
            EmbeddingResult::PerToken(_) => None,
        }
    }

    pub fn as_per_token(&self) -> Option<&Array2<f32>> {
        match self {
            EmbeddingResult::Pooled(_) => None,
            EmbeddingResult::PerToken(m) => Some(m),
        }
    }

    /// Rows of the result: one for pooled, `true_length` for per-token.
    pub fn to_rows(&self) -> Vec<Vec<f32>> {
        match self {
            EmbeddingResult::Pooled(v) => vec![v.to_vec()],
            EmbeddingResult::PerToken(m) => m.outer_iter().map(|r| r.to_vec()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_accessors() {
        let pooled = EmbeddingResult::Pooled(array![1.0, 2.0, 3.0]);
        assert_eq!(pooled.embed_dim(), 3);
        assert!(pooled.as_per_token().is_none());
        assert_eq!(pooled.to_rows(), vec![vec![1.0, 2.0, 3.0]]);

        let tokens = EmbeddingResult::PerToken(array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]);
        assert_eq!(tokens.embed_dim(), 2);
        assert_eq!(tokens.as_per_token().map(|m| m.nrows()), Some(3));
        assert_eq!(tokens.to_rows().len(), 3);
    }

    #[test]
    fn test_output_mode() {
        assert_eq!(OutputMode::from_pooled(true), OutputMode::Pooled);
        assert_eq!(OutputMode::from_pooled(false), OutputMode::PerToken);
        assert_eq!("per-token".parse::<OutputMode>().unwrap(), OutputMode::PerToken);
        assert!("max".parse::<OutputMode>().is_err());
        assert_eq!(OutputMode::PerToken.to_string(), "per-token");
    }
}

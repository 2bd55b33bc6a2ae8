//! Tokenizers turning residue strings into padded id batches.

pub mod residue;

pub use residue::ResidueTokenizer;

use anyhow::{anyhow, Result};
use ndarray::Array2;

pub trait SequenceTokenizer: Send + Sync {
    fn vocab_size(&self) -> usize;
    fn pad_token_id(&self) -> u32;
    fn eos_token_id(&self) -> u32;

    /// Ids for one sequence, end marker included, at most `max_length` long.
    fn encode(&self, sequence: &str, max_length: usize) -> Result<Vec<u32>>;

    fn decode(&self, ids: &[u32], skip_special_tokens: bool) -> String;

    /// Encodes every sequence and right-pads to the longest row.
    fn batch_encode(&self, sequences: &[String], max_length: usize) -> Result<TokenizedBatch> {
        let encoded = sequences
            .iter()
            .map(|s| self.encode(s, max_length))
            .collect::<Result<Vec<_>>>()?;
        TokenizedBatch::from_rows(&encoded, self.pad_token_id())
    }
}

/// Right-padded ids and the matching 0/1 attention mask, both `[batch, seq_len]`.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenizedBatch {
    pub input_ids: Array2<u32>,
    pub attention_mask: Array2<f32>,
}

impl TokenizedBatch {
    pub fn from_rows(rows: &[Vec<u32>], pad_token_id: u32) -> Result<Self> {
        let seq_len = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut input_ids = Array2::from_elem((rows.len(), seq_len), pad_token_id);
        let mut attention_mask = Array2::<f32>::zeros((rows.len(), seq_len));

        for (i, row) in rows.iter().enumerate() {
            if row.is_empty() {
                return Err(anyhow!("row {} of the batch has no tokens", i));
            }
            for (j, &id) in row.iter().enumerate() {
                input_ids[[i, j]] = id;
                attention_mask[[i, j]] = 1.0;
            }
        }

        Ok(Self {
            input_ids,
            attention_mask,
        })
    }

    pub fn batch_size(&self) -> usize {
        self.input_ids.nrows()
    }

    pub fn seq_len(&self) -> usize {
        self.input_ids.ncols()
    }

    /// Number of real (unpadded) tokens in each row.
    pub fn lengths(&self) -> Vec<usize> {
        self.attention_mask
            .rows()
            .into_iter()
            .map(|row| row.sum() as usize)
            .collect()
    }
}

use anyhow::Result;
use ndarray::{Array2, Array3};

/// Maps a padded id batch to contextual hidden states.
pub trait SequenceEncoder: Send + Sync {
    fn hidden_size(&self) -> usize;

    /// `[batch, seq]` ids and 0/1 mask to `[batch, seq, hidden]` states.
    fn forward(&self, input_ids: &Array2<u32>, attention_mask: &Array2<f32>)
        -> Result<Array3<f32>>;
}

use anyhow::anyhow;
use ndarray::{Array2, ArrayViewMut4, Axis, Zip};

pub const MASK_VALUE: f32 = -1e9;

/// Masks key positions where `mask[batch, key_pos] == 0`.
pub fn apply_padding_mask(
    scores: &mut ArrayViewMut4<f32>,
    mask: &Array2<f32>,
) -> anyhow::Result<()> {
    let (batch_size, num_heads, seq_q, seq_k) = scores.dim();

    if mask.shape()[0] != batch_size {
        return Err(anyhow!(
            "mask batch size {} doesn't match scores batch size {}",
            mask.shape()[0],
            batch_size
        ));
    }

    if mask.shape()[1] != seq_k {
        return Err(anyhow!(
            "mask sequence length {} doesn't match key sequence length {}",
            mask.shape()[1],
            seq_k
        ));
    }

    // [batch, seq_k] -> [batch, 1, 1, seq_k]
    let mask_expanded = mask.view().insert_axis(Axis(1)).insert_axis(Axis(1));

    if let Some(broadcast_mask) = mask_expanded.broadcast((batch_size, num_heads, seq_q, seq_k)) {
        Zip::from(scores).and(&broadcast_mask).for_each(|s, &m| {
            if m == 0.0 {
                *s = MASK_VALUE;
            }
        });
    }

    Ok(())
}

/// `[seq, seq]` band of ones where `|i - j| <= half_window`, zeros elsewhere.
pub fn sliding_window_mask(seq_len: usize, half_window: usize) -> Array2<f32> {
    Array2::from_shape_fn((seq_len, seq_len), |(i, j)| {
        if i.abs_diff(j) <= half_window {
            1.0
        } else {
            0.0
        }
    })
}

/// Masks query/key pairs outside a `[seq_q, seq_k]` window mask.
pub fn apply_window_mask(scores: &mut ArrayViewMut4<f32>, window: &Array2<f32>) {
    let (batch_size, num_heads, seq_q, seq_k) = scores.dim();
    let window_expanded = window.view().insert_axis(Axis(0)).insert_axis(Axis(0));
    if let Some(m) = window_expanded.broadcast((batch_size, num_heads, seq_q, seq_k)) {
        Zip::from(scores).and(&m).for_each(|s, &w| {
            if w == 0.0 {
                *s = MASK_VALUE;
            }
        });
    }
}

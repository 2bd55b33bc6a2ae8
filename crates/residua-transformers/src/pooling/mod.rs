//! Reducing encoder hidden states to per-sequence or per-residue embeddings.
//!
//! Every tokenized sequence ends with `<eos>`, which is excluded from the
//! embeddings. Pooling excludes it by dropping the last column of the padded
//! batch; per-token output excludes it by trimming each row to
//! `sum(mask) - 1` positions.

use anyhow::{anyhow, Result};
use ndarray::{s, Array2, ArrayView1, ArrayView2, ArrayView3, Axis};

/// Smallest divisor used when averaging, so all-padding rows pool to zero.
pub const MIN_MASK_SUM: f32 = 1e-9;

/// Drops the last position of the padded batch from both hidden states and mask.
///
/// This is a fixed column, not each row's own end marker. For a row shorter
/// than the batch's longest, the dropped column is padding and the row's
/// `<eos>` stays inside the mean.
pub fn drop_last_position<'a>(
    hidden: ArrayView3<'a, f32>,
    mask: ArrayView2<'a, f32>,
) -> (ArrayView3<'a, f32>, ArrayView2<'a, f32>) {
    let keep = hidden.shape()[1].saturating_sub(1);
    (
        hidden.slice_move(s![.., ..keep, ..]),
        mask.slice_move(s![.., ..keep.min(mask.ncols())]),
    )
}

/// Mean over masked positions of `[batch, seq, hidden]`, giving `[batch, hidden]`.
///
/// The mask sum is clamped below at [`MIN_MASK_SUM`].
pub fn masked_mean_pool(hidden: &ArrayView3<f32>, mask: &ArrayView2<f32>) -> Result<Array2<f32>> {
    let (batch, seq, _) = hidden.dim();
    if mask.dim() != (batch, seq) {
        return Err(anyhow!(
            "mask shape {:?} doesn't match hidden states {:?}",
            mask.dim(),
            (batch, seq)
        ));
    }
    let mask_expanded = mask.view().insert_axis(Axis(2));
    let summed = (hidden * &mask_expanded).sum_axis(Axis(1));

    let counts = mask
        .sum_axis(Axis(1))
        .mapv(|c| c.max(MIN_MASK_SUM))
        .insert_axis(Axis(1));

    Ok(summed / &counts)
}

/// Number of positions kept for one row: real tokens minus the end marker.
pub fn true_length(mask_row: &ArrayView1<f32>) -> usize {
    (mask_row.sum() as usize).saturating_sub(1)
}

/// First `sum(mask) - 1` rows of one sequence's `[seq, hidden]` states.
pub fn trim_per_token(hidden_row: &ArrayView2<f32>, mask_row: &ArrayView1<f32>) -> Array2<f32> {
    let len = true_length(mask_row).min(hidden_row.nrows());
    hidden_row.slice(s![..len, ..]).to_owned()
}

//! Scalar activations and the row softmax used by attention.

use libm::{erff, expf};
use ndarray::Array4;
use rayon::prelude::*;

/// Minimum array size for parallel execution.
pub const PARALLEL_THRESHOLD: usize = 16_384;

const SQRT_2_INV: f32 = 0.7071067811865475;

/// Exact (erf) GELU.
#[inline(always)]
pub fn gelu_scalar(x: f32) -> f32 {
    0.5 * x * (1.0 + erff(x * SQRT_2_INV))
}

#[inline(always)]
pub fn silu_scalar(x: f32) -> f32 {
    if x <= -20.0 {
        0.0
    } else if x >= 20.0 {
        x
    } else {
        x / (1.0 + expf(-x))
    }
}

/// Numerically stable softmax over a contiguous row.
pub fn softmax_inplace(slice: &mut [f32]) {
    if slice.is_empty() {
        return;
    }

    let max = slice.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));

    let mut sum = 0.0;
    for v in slice.iter_mut() {
        *v = (*v - max).exp();
        sum += *v;
    }

    if sum > 0.0 {
        let scale = 1.0 / sum;
        for v in slice.iter_mut() {
            *v *= scale;
        }
    }
}

/// Softmax along the last axis of `[batch, heads, q, k]` scores.
pub fn softmax_4d_inplace(scores: &mut Array4<f32>) {
    let k_len = scores.shape()[3];
    if k_len == 0 {
        return;
    }
    match scores.as_slice_mut() {
        Some(flat) if flat.len() >= PARALLEL_THRESHOLD => {
            flat.par_chunks_mut(k_len).for_each(softmax_inplace)
        }
        Some(flat) => flat.chunks_mut(k_len).for_each(softmax_inplace),
        None => {
            for mut row in scores.rows_mut() {
                let max = row.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
                row.mapv_inplace(|x| (x - max).exp());
                let sum = row.sum();
                if sum > 0.0 {
                    row /= sum;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_gelu_reference_points() {
        assert_eq!(gelu_scalar(0.0), 0.0);
        assert_abs_diff_eq!(gelu_scalar(1.0), 0.841_344_7, epsilon = 1e-5);
        assert_abs_diff_eq!(gelu_scalar(-1.0), -0.158_655_3, epsilon = 1e-5);
    }

    #[test]
    fn test_silu_saturates() {
        assert_eq!(silu_scalar(-30.0), 0.0);
        assert_eq!(silu_scalar(30.0), 30.0);
        assert_abs_diff_eq!(silu_scalar(1.0), 0.731_058_6, epsilon = 1e-5);
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let mut row = [1.0f32, 2.0, 3.0, -1e9];
        softmax_inplace(&mut row);
        assert_abs_diff_eq!(row.iter().sum::<f32>(), 1.0, epsilon = 1e-6);
        assert_eq!(row[3], 0.0);
        assert!(row[2] > row[1] && row[1] > row[0]);
    }

    #[test]
    fn test_softmax_4d_rows() {
        let mut scores = Array4::from_shape_fn((2, 2, 3, 4), |(b, h, q, k)| (b + h + q * k) as f32);
        softmax_4d_inplace(&mut scores);

        for row in scores.rows() {
            assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_softmax_4d_non_contiguous() {
        let base = Array4::from_shape_fn((1, 3, 2, 2), |(_, h, q, k)| (h * q + k) as f32);
        let mut scores = base
            .clone()
            .permuted_axes([0, 2, 1, 3])
            .as_standard_layout()
            .into_owned();
        let mut permuted = base.permuted_axes([0, 2, 1, 3]);
        assert!(permuted.as_slice_mut().is_none());
        softmax_4d_inplace(&mut scores);
        softmax_4d_inplace(&mut permuted);

        for (a, b) in scores.iter().zip(permuted.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-6);
        }
    }
}

use ndarray::{linalg::general_mat_mul, Array4, ArrayView4, Zip};

/// Batched `a @ b` over the two leading axes: `[B, H, M, K] x [B, H, K, N]`.
///
/// Parallel over the batch axis; each head is a plain 2-D matmul.
pub fn matmul_4d(a: &ArrayView4<f32>, b: &ArrayView4<f32>) -> Array4<f32> {
    let (batch, heads, seq1, _) = a.dim();
    let seq2 = b.shape()[3];

    let mut output = Array4::<f32>::zeros((batch, heads, seq1, seq2));

    Zip::from(output.outer_iter_mut())
        .and(a.outer_iter())
        .and(b.outer_iter())
        .par_for_each(|mut out_b, a_b, b_b| {
            Zip::from(out_b.outer_iter_mut())
                .and(a_b.outer_iter())
                .and(b_b.outer_iter())
                .for_each(|mut out_h, a_h, b_h| {
                    general_mat_mul(1.0, &a_h, &b_h, 0.0, &mut out_h);
                });
        });

    output
}

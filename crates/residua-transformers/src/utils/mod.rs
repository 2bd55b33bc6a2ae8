pub mod linear_algebra;
pub mod masks;

pub use linear_algebra::matmul_4d;
pub use masks::{apply_padding_mask, apply_window_mask, sliding_window_mask, MASK_VALUE};

//! Checkpoint tensor representation: dtypes, shapes and raw byte buffers.

pub mod dtype;
pub mod raw_tensor;
pub mod shape;

pub use dtype::DType;
pub use raw_tensor::RawTensor;
pub use shape::Shape;

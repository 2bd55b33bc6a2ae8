use crate::tensor::{DType, Shape};
use anyhow::{anyhow, Result};
use half::{bf16, f16};
use ndarray::{Array1, Array2};

/// An owned, untyped tensor as read from a checkpoint: bytes, shape and dtype.
///
/// Architecture inference only ever looks at [`RawTensor::shape`]; the bytes
/// are decoded to `f32` when weights are assigned into the encoder.
#[derive(Debug, Clone)]
pub struct RawTensor {
    dtype: DType,
    shape: Shape,
    bytes: Vec<u8>,
}

impl RawTensor {
    /// Wraps little-endian bytes, checking that their length matches the shape.
    pub fn new(dtype: DType, shape: impl Into<Shape>, bytes: Vec<u8>) -> Result<Self> {
        let shape = shape.into();
        let expected = dtype.buffer_size_for_shape(shape.dims());
        if bytes.len() != expected {
            return Err(anyhow!(
                "tensor of shape {} and dtype {:?} needs {} bytes, got {}",
                shape,
                dtype,
                expected,
                bytes.len()
            ));
        }
        Ok(Self { dtype, shape, bytes })
    }

    pub fn from_f32(shape: impl Into<Shape>, values: &[f32]) -> Result<Self> {
        let bytes = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        Self::new(DType::F32, shape, bytes)
    }

    /// A zero-filled tensor. Handy for tables that only need shapes.
    pub fn zeros(dtype: DType, shape: impl Into<Shape>) -> Self {
        let shape = shape.into();
        let bytes = vec![0u8; dtype.buffer_size_for_shape(shape.dims())];
        Self { dtype, shape, bytes }
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Decodes the buffer to `f32`, widening half-precision types.
    pub fn to_f32_vec(&self) -> Vec<f32> {
        match self.dtype {
            DType::F32 => match bytemuck::try_cast_slice::<u8, f32>(&self.bytes) {
                Ok(slice) => slice.to_vec(),
                // not aligned, copy element by element
                Err(_) => self
                    .bytes
                    .chunks_exact(4)
                    .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                    .collect(),
            },
            DType::F16 => self
                .bytes
                .chunks_exact(2)
                .map(|c| f16::from_le_bytes([c[0], c[1]]).to_f32())
                .collect(),
            DType::BF16 => self
                .bytes
                .chunks_exact(2)
                .map(|c| bf16::from_le_bytes([c[0], c[1]]).to_f32())
                .collect(),
        }
    }

    pub fn to_array1(&self) -> Result<Array1<f32>> {
        if self.shape.rank() != 1 {
            return Err(anyhow!("expected a rank-1 tensor, got shape {}", self.shape));
        }
        Ok(Array1::from_vec(self.to_f32_vec()))
    }

    pub fn to_array2(&self) -> Result<Array2<f32>> {
        let (rows, cols) = self
            .shape
            .as_2d()
            .ok_or_else(|| anyhow!("expected a rank-2 tensor, got shape {}", self.shape))?;
        Ok(Array2::from_shape_vec((rows, cols), self.to_f32_vec())?)
    }
}

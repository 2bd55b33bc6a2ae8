use anyhow::{anyhow, Result};

/// Element types a checkpoint tensor may be stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DType {
    /// Standard 32-bit float
    F32,
    /// 16-bit float (IEEE 754 half-precision)
    F16,
    /// 16-bit brain float (more range, less precision than F16)
    BF16,
}

impl DType {
    /// Maps a safetensors::Dtype to our internal DType.
    pub fn from_safetensors(dtype: safetensors::Dtype) -> Result<Self> {
        match dtype {
            safetensors::Dtype::F32 => Ok(DType::F32),
            safetensors::Dtype::F16 => Ok(DType::F16),
            safetensors::Dtype::BF16 => Ok(DType::BF16),
            _ => Err(anyhow!("unsupported safetensors dtype: {:?}", dtype)),
        }
    }

    pub fn size_of(&self) -> usize {
        match self {
            DType::F32 => 4,
            DType::F16 | DType::BF16 => 2,
        }
    }

    /// Byte length of a densely packed tensor of this dtype.
    pub fn buffer_size_for_shape(&self, shape: &[usize]) -> usize {
        shape.iter().product::<usize>() * self.size_of()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_safetensors() {
        assert_eq!(DType::from_safetensors(safetensors::Dtype::F32).unwrap(), DType::F32);
        assert_eq!(DType::from_safetensors(safetensors::Dtype::BF16).unwrap(), DType::BF16);
        assert!(DType::from_safetensors(safetensors::Dtype::I64).is_err());
    }

    #[test]
    fn test_buffer_size() {
        assert_eq!(DType::F32.buffer_size_for_shape(&[3, 4]), 48);
        assert_eq!(DType::F16.buffer_size_for_shape(&[3, 4]), 24);
        assert_eq!(DType::BF16.buffer_size_for_shape(&[]), 2);
    }
}

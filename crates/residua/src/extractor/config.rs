//! Extraction settings and their builder.

use residua_transformers::MlpActivation;

use crate::common::{Device, ResiduaError, ResiduaResult};
use crate::extractor::types::OutputMode;

pub const DEFAULT_BATCH_SIZE: usize = 32;
pub const DEFAULT_MAX_LENGTH: usize = 512;

/// How sequences are batched, truncated and reduced.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionConfig {
    pub batch_size: usize,
    /// Token budget per sequence, `<eos>` included.
    pub max_length: usize,
    pub device: Device,
    pub mode: OutputMode,
    pub mlp_activation: MlpActivation,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_length: DEFAULT_MAX_LENGTH,
            device: Device::default(),
            mode: OutputMode::default(),
            mlp_activation: MlpActivation::default(),
        }
    }
}

impl ExtractionConfig {
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder::new()
    }

    pub fn validate(&self) -> ResiduaResult<()> {
        if self.batch_size == 0 {
            return Err(ResiduaError::InvalidConfig(
                "batch_size must be > 0".to_string(),
            ));
        }
        if self.max_length == 0 {
            return Err(ResiduaError::InvalidConfig(
                "max_length must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug, Clone, Default)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.config.max_length = max_length;
        self
    }

    pub fn device(mut self, device: Device) -> Self {
        self.config.device = device;
        self
    }

    /// Run on CPU.
    pub fn cpu(self) -> Self {
        self.device(Device::Cpu)
    }

    pub fn pooled(mut self) -> Self {
        self.config.mode = OutputMode::Pooled;
        self
    }

    pub fn per_token(mut self) -> Self {
        self.config.mode = OutputMode::PerToken;
        self
    }

    pub fn mode(mut self, mode: OutputMode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn mlp_activation(mut self, activation: MlpActivation) -> Self {
        self.config.mlp_activation = activation;
        self
    }

    pub fn build(self) -> ResiduaResult<ExtractionConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExtractionConfig::default();
        assert_eq!(config.batch_size, 32);
        assert_eq!(config.max_length, 512);
        assert_eq!(config.device, Device::Cpu);
        assert_eq!(config.mode, OutputMode::Pooled);
        assert_eq!(config.mlp_activation, MlpActivation::SwiGlu);
    }

    #[test]
    fn test_builder() {
        let config = ExtractionConfig::builder()
            .batch_size(4)
            .max_length(64)
            .per_token()
            .device(Device::Auto)
            .mlp_activation(MlpActivation::Gelu)
            .build()
            .unwrap();

        assert_eq!(config.batch_size, 4);
        assert_eq!(config.max_length, 64);
        assert_eq!(config.mode, OutputMode::PerToken);
        assert_eq!(config.device, Device::Auto);
        assert_eq!(config.mlp_activation, MlpActivation::Gelu);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let result = ExtractionConfig::builder().batch_size(0).build();
        assert!(matches!(result, Err(ResiduaError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_max_length_rejected() {
        let result = ExtractionConfig::builder().max_length(0).build();
        assert!(matches!(result, Err(ResiduaError::InvalidConfig(_))));
    }
}

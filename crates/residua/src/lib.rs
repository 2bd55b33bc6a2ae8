//! Residua - protein sequence embeddings from distilled encoder checkpoints
//!
//! Recovers the encoder shape from parameter names and shapes alone, builds a
//! matching ModernBERT encoder on the CPU and streams one embedding per input
//! sequence.

pub mod common;
pub mod extractor;

#[cfg(test)]
mod test_utils;

use std::path::Path;

pub use common::{Device, ResiduaError, ResiduaResult};
pub use extractor::{
    EmbeddingExtractor, EmbeddingResult, EmbeddingStream, ExtractionConfig,
    ExtractionConfigBuilder, OutputMode,
};

pub use residua_transformers::{
    ArchitectureError, InferredArchitecture, LoadReport, MlpActivation,
};

/// Reads a checkpoint and reports the encoder shape it implies.
pub fn inspect_architecture(path: impl AsRef<Path>) -> ResiduaResult<InferredArchitecture> {
    let path = path.as_ref();
    let table = residua_transformers::load_parameter_table(path)
        .map_err(|e| ResiduaError::checkpoint(path, e))?;
    Ok(residua_transformers::infer_architecture(&table)?)
}

/// Loads a checkpoint and lazily embeds `sequences`.
///
/// Failures are logged and produce a stream that yields nothing.
pub fn load_and_generate_embeddings<I>(
    path: impl AsRef<Path>,
    sequences: I,
    batch_size: usize,
    max_length: usize,
    device: Device,
    pooled: bool,
) -> EmbeddingStream
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    let config = ExtractionConfig {
        batch_size,
        max_length,
        device,
        mode: OutputMode::from_pooled(pooled),
        ..Default::default()
    };
    load_and_generate_embeddings_with(path, sequences, &config)
}

/// Same as [`load_and_generate_embeddings`] with a full [`ExtractionConfig`].
pub fn load_and_generate_embeddings_with<I>(
    path: impl AsRef<Path>,
    sequences: I,
    config: &ExtractionConfig,
) -> EmbeddingStream
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    match EmbeddingExtractor::from_checkpoint(path.as_ref(), config) {
        Ok(extractor) => extractor.stream(sequences),
        Err(ResiduaError::ArchitectureInference(e)) => {
            log::error!(
                "cannot determine {} of {:?}: {}",
                e.scalar(),
                path.as_ref(),
                e
            );
            EmbeddingStream::empty()
        }
        Err(e) => {
            log::error!("{}", e);
            EmbeddingStream::empty()
        }
    }
}

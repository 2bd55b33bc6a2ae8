//! Embedding extraction from checkpoints of unknown shape.
//!
//! ```ignore
//! let config = ExtractionConfig::builder().batch_size(8).per_token().build()?;
//! let extractor = EmbeddingExtractor::from_checkpoint("student/model.safetensors", &config)?;
//! println!("{}", extractor.architecture());
//! for (seq, embedding) in extractor.stream(["MKVLA", "GHW"]) {
//!     println!("{}: {:?}", seq, embedding.as_per_token().map(|m| m.dim()));
//! }
//! ```

pub mod config;
pub mod stream;
pub mod types;

pub use config::{ExtractionConfig, ExtractionConfigBuilder};
pub use stream::EmbeddingStream;
pub use types::{EmbeddingResult, OutputMode};

use std::path::Path;

use residua_transformers::{
    drop_last_position, infer_architecture, load_parameter_table, masked_mean_pool,
    trim_per_token, EncoderConfig, InferredArchitecture, LoadReport, ModernBertEncoder,
    ResidueTokenizer, SequenceEncoder, SequenceTokenizer,
};

use crate::common::{ResiduaError, ResiduaResult};

/// Encoder and tokenizer built to the shape found in a checkpoint.
pub struct EmbeddingExtractor {
    architecture: InferredArchitecture,
    encoder: ModernBertEncoder,
    tokenizer: ResidueTokenizer,
    config: ExtractionConfig,
    load_report: LoadReport,
}

impl EmbeddingExtractor {
    /// Reads the checkpoint once, infers its shape and loads it non-strictly.
    pub fn from_checkpoint(path: impl AsRef<Path>, config: &ExtractionConfig) -> ResiduaResult<Self> {
        let path = path.as_ref();
        config.validate()?;

        let device = config.device.resolve();
        log::debug!("extraction on {} ({} requested)", device, config.device);

        let table = load_parameter_table(path).map_err(|e| ResiduaError::checkpoint(path, e))?;
        let architecture = infer_architecture(&table)?;
        log::info!("detected architecture: {}", architecture);

        let tokenizer = ResidueTokenizer::new();
        let encoder_config = EncoderConfig::for_shape(
            architecture.embed_dim,
            architecture.num_layers,
            architecture.num_heads,
        )
        .with_vocab(
            tokenizer.vocab_size(),
            tokenizer.pad_token_id(),
            tokenizer.eos_token_id(),
        )
        .with_mlp_activation(config.mlp_activation);
        let positions = encoder_config.max_position_embeddings.max(config.max_length);
        let encoder_config = encoder_config.with_max_position_embeddings(positions);

        let mut encoder = ModernBertEncoder::new(encoder_config)?;
        let load_report = encoder
            .load_parameters(&table)
            .map_err(|e| ResiduaError::checkpoint(path, e))?;
        log::info!("loaded checkpoint from {:?}", path);

        Ok(Self {
            architecture,
            encoder,
            tokenizer,
            config: config.clone(),
            load_report,
        })
    }

    pub fn architecture(&self) -> InferredArchitecture {
        self.architecture
    }

    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    pub fn encoder(&self) -> &ModernBertEncoder {
        &self.encoder
    }

    pub fn tokenizer(&self) -> &ResidueTokenizer {
        &self.tokenizer
    }

    /// Embeds one batch, returning results in input order.
    pub fn embed_batch(&self, sequences: &[String]) -> ResiduaResult<Vec<EmbeddingResult>> {
        if sequences.is_empty() {
            return Ok(Vec::new());
        }
        let batch = self
            .tokenizer
            .batch_encode(sequences, self.config.max_length)?;
        log::debug!(
            "encoding {} sequences padded to {} tokens, lengths {:?}",
            batch.batch_size(),
            batch.seq_len(),
            batch.lengths()
        );
        let hidden = self
            .encoder
            .forward(&batch.input_ids, &batch.attention_mask)?;

        let results = match self.config.mode {
            OutputMode::Pooled => {
                let (hidden, mask) = drop_last_position(hidden.view(), batch.attention_mask.view());
                masked_mean_pool(&hidden, &mask)?
                    .outer_iter()
                    .map(|row| EmbeddingResult::Pooled(row.to_owned()))
                    .collect()
            }
            OutputMode::PerToken => hidden
                .outer_iter()
                .zip(batch.attention_mask.outer_iter())
                .map(|(states, mask)| EmbeddingResult::PerToken(trim_per_token(&states, &mask)))
                .collect(),
        };
        Ok(results)
    }

    /// Lazily embeds `sequences` batch by batch.
    ///
    /// The input is collected up front. The first failing batch is logged and
    /// ends the stream.
    pub fn stream<I>(self, sequences: I) -> EmbeddingStream
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        EmbeddingStream::new(self, sequences.into_iter().map(Into::into).collect())
    }
}

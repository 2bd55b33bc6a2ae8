//! Building blocks for loading protein sequence encoders from raw checkpoints.
//!
//! This crate carries everything below the embedding API: tensor decoding,
//! checkpoint reading, architecture inference, the residue tokenizer, a CPU
//! ModernBERT encoder and the pooling kernels.

pub mod activations;
pub mod architecture;
pub mod encoder;
pub mod feedforward;
pub mod linear_layer;
pub mod normalization;
pub mod pooling;
pub mod rope;
pub mod tensor;
pub mod tokenizer;
pub mod utils;
pub mod weights;

pub use crate::{
    architecture::{infer_architecture, ArchitectureError, InferredArchitecture},
    encoder::{EncoderConfig, EncoderConfigError, LoadReport, ModernBertEncoder, SequenceEncoder},
    feedforward::MlpActivation,
    pooling::{drop_last_position, masked_mean_pool, trim_per_token},
    tensor::{DType, RawTensor, Shape},
    tokenizer::{ResidueTokenizer, SequenceTokenizer, TokenizedBatch},
    weights::{load_parameter_table, ParameterTable, SafeTensorsLoader},
};

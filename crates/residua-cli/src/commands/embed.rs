//! Sequence embedding command.

use anyhow::{anyhow, Result};
use residua::{Device, EmbeddingExtractor, EmbeddingResult, ExtractionConfig, MlpActivation, OutputMode};
use serde_json::{json, Value};

use crate::commands::util::{self, Record};

#[allow(clippy::too_many_arguments)]
pub fn run(
    checkpoint: &str,
    input: Option<&str>,
    batch_size: usize,
    max_length: usize,
    per_token: bool,
    device: &str,
    mlp_activation: &str,
    format: &str,
) -> Result<()> {
    if !matches!(format, "jsonl" | "json" | "raw") {
        return Err(anyhow!("Unknown format: '{}'. Use: jsonl, json, raw", format));
    }

    let records = util::parse_records(&util::resolve_input(input)?)?;

    let device: Device = device.parse()?;
    let mlp_activation: MlpActivation = mlp_activation
        .parse()
        .map_err(|e: String| anyhow!("Invalid --mlp-activation: {}", e))?;
    let config = ExtractionConfig::builder()
        .batch_size(batch_size)
        .max_length(max_length)
        .device(device)
        .mode(OutputMode::from_pooled(!per_token))
        .mlp_activation(mlp_activation)
        .build()?;

    let extractor = EmbeddingExtractor::from_checkpoint(checkpoint, &config)?;
    log::info!("{}", extractor.load_report());
    log::info!("embedding {} sequences", records.len());

    let stream = extractor.stream(records.iter().map(|r| r.sequence.clone()));
    let mut produced = 0;
    let mut collected = Vec::new();
    for (record, (_, embedding)) in records.iter().zip(stream) {
        produced += 1;
        match format {
            "jsonl" => println!("{}", serde_json::to_string(&to_json(record, &embedding))?),
            "json" => collected.push(to_json(record, &embedding)),
            _ => print!("{}", to_raw(&embedding)),
        }
    }
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&collected)?);
    }

    if produced < records.len() {
        return Err(anyhow!(
            "Embedding stopped after {} of {} sequences",
            produced,
            records.len()
        ));
    }
    Ok(())
}

pub(crate) fn to_json(record: &Record, embedding: &EmbeddingResult) -> Value {
    let values = match embedding {
        EmbeddingResult::Pooled(v) => json!(v.to_vec()),
        EmbeddingResult::PerToken(_) => json!(embedding.to_rows()),
    };
    json!({
        "id": record.id,
        "sequence": record.sequence,
        "dim": embedding.embed_dim(),
        "embedding": values,
    })
}

/// Space-separated values, one line per row.
pub(crate) fn to_raw(embedding: &EmbeddingResult) -> String {
    embedding
        .to_rows()
        .iter()
        .map(|row| {
            let mut line = row.iter().map(|f| f.to_string()).collect::<Vec<_>>().join(" ");
            line.push('\n');
            line
        })
        .collect()
}

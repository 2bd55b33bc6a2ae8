//! Tiny on-disk checkpoints for tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub use safetensors::tensor::Dtype;
use safetensors::tensor::TensorView;

pub const EMBED_DIM: usize = 32;
pub const NUM_LAYERS: usize = 2;
pub const VOCAB: usize = 29;

/// Deterministic values around `center`, varied per tensor by `seed`.
fn values(numel: usize, seed: usize, center: f32, spread: f32) -> Vec<f32> {
    (0..numel)
        .map(|i| center + spread * ((i * 7 + seed * 13) as f32 * 0.37).sin())
        .collect()
}

/// Tensors of a student checkpoint: a ModernBERT encoder plus the
/// projection head the encoder does not own.
pub fn student_tensors() -> Vec<(String, Vec<usize>, Vec<f32>)> {
    let e = EMBED_DIM;
    let i = 2 * e;
    let mut tensors = vec![
        (
            "model.embeddings.tok_embeddings.weight".to_string(),
            vec![VOCAB, e],
        ),
        ("model.embeddings.norm.weight".to_string(), vec![e]),
    ];
    for layer in 0..NUM_LAYERS {
        let p = format!("model.layers.{}", layer);
        if layer > 0 {
            tensors.push((format!("{}.attn_norm.weight", p), vec![e]));
        }
        tensors.push((format!("{}.attn.Wqkv.weight", p), vec![3 * e, e]));
        tensors.push((format!("{}.attn.Wo.weight", p), vec![e, e]));
        tensors.push((format!("{}.mlp_norm.weight", p), vec![e]));
        tensors.push((format!("{}.mlp.Wi.weight", p), vec![2 * i, e]));
        tensors.push((format!("{}.mlp.Wo.weight", p), vec![e, i]));
    }
    tensors.push(("model.final_norm.weight".to_string(), vec![e]));
    tensors.push(("proj.weight".to_string(), vec![16, e]));
    tensors.push(("proj_norm.weight".to_string(), vec![16]));

    tensors
        .into_iter()
        .enumerate()
        .map(|(seed, (name, shape))| {
            let numel = shape.iter().product();
            let data = if name.ends_with("norm.weight") {
                values(numel, seed, 1.0, 0.1)
            } else {
                values(numel, seed, 0.0, 0.2)
            };
            (name, shape, data)
        })
        .collect()
}

pub fn write_checkpoint(path: &Path, tensors: &[(String, Vec<usize>, Vec<f32>)]) {
    let typed: Vec<_> = tensors
        .iter()
        .map(|(name, shape, data)| (name.clone(), shape.clone(), data.clone(), Dtype::F32))
        .collect();
    write_typed_checkpoint(path, &typed);
}

/// Like [`write_checkpoint`], storing each tensor as F32 or BF16.
pub fn write_typed_checkpoint(path: &Path, tensors: &[(String, Vec<usize>, Vec<f32>, Dtype)]) {
    let bytes: Vec<(String, Vec<usize>, Vec<u8>, Dtype)> = tensors
        .iter()
        .map(|(name, shape, data, dtype)| {
            let raw = match dtype {
                Dtype::BF16 => data
                    .iter()
                    .flat_map(|f| half::bf16::from_f32(*f).to_le_bytes())
                    .collect(),
                _ => data.iter().flat_map(|f| f.to_le_bytes()).collect(),
            };
            (name.clone(), shape.clone(), raw, *dtype)
        })
        .collect();

    let mut views = HashMap::new();
    for (name, shape, raw, dtype) in &bytes {
        views.insert(
            name.clone(),
            TensorView::new(*dtype, shape.clone(), raw).unwrap(),
        );
    }
    safetensors::serialize_to_file(&views, &None, path).unwrap();
}

/// Writes the default student checkpoint into `dir`.
pub fn student_checkpoint(dir: &Path) -> PathBuf {
    let path = dir.join("model.safetensors");
    write_checkpoint(&path, &student_tensors());
    path
}

pub fn strings(seqs: &[&str]) -> Vec<String> {
    seqs.iter().map(|s| s.to_string()).collect()
}

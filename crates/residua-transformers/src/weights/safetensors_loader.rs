//! SafeTensors checkpoint reader.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use memmap2::Mmap;
use safetensors::SafeTensors;

use crate::tensor::{DType, RawTensor};
use crate::weights::ParameterTable;

const SINGLE_FILE: &str = "model.safetensors";
const INDEX_FILE: &str = "model.safetensors.index.json";

/// Locates the shard files of a `.safetensors` checkpoint.
///
/// Accepts either a direct file path or a directory containing
/// `model.safetensors` or `model.safetensors.index.json` + shards.
#[derive(Debug)]
pub struct SafeTensorsLoader {
    shards: Vec<PathBuf>,
}

impl SafeTensorsLoader {
    pub fn new(path: &Path) -> Result<Self> {
        if path.is_file() {
            return Ok(Self {
                shards: vec![path.to_path_buf()],
            });
        }

        if !path.is_dir() {
            return Err(anyhow!("path {:?} is neither a file nor a directory", path));
        }

        let index_file = path.join(INDEX_FILE);
        if index_file.exists() {
            return Ok(Self {
                shards: Self::shards_from_index(path, &index_file)?,
            });
        }

        let single = path.join(SINGLE_FILE);
        if !single.is_file() {
            return Err(anyhow!(
                "no {} or {} found in {:?}",
                SINGLE_FILE,
                INDEX_FILE,
                path
            ));
        }
        Ok(Self {
            shards: vec![single],
        })
    }

    fn shards_from_index(dir: &Path, index_path: &Path) -> Result<Vec<PathBuf>> {
        let index_content = fs::read_to_string(index_path)
            .with_context(|| format!("failed to read index file: {:?}", index_path))?;

        let index: serde_json::Value =
            serde_json::from_str(&index_content).context("failed to parse index.json")?;

        let weight_map = index["weight_map"]
            .as_object()
            .ok_or_else(|| anyhow!("invalid index.json: missing 'weight_map' object"))?;

        let mut unique_files: Vec<String> = weight_map
            .values()
            .filter_map(|v| v.as_str().map(String::from))
            .collect();
        unique_files.sort();
        unique_files.dedup();

        log::info!(
            "sharded checkpoint: {} shards, {} tensors",
            unique_files.len(),
            weight_map.len()
        );

        Ok(unique_files.into_iter().map(|f| dir.join(f)).collect())
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Reads every shard fully into a [`ParameterTable`].
    ///
    /// The table is ordered by parameter name across all shards, independent
    /// of how tensors are laid out on disk.
    pub fn load(&self) -> Result<ParameterTable> {
        let mut tensors = BTreeMap::new();
        for (idx, shard) in self.shards.iter().enumerate() {
            let count = read_shard(shard, &mut tensors)?;
            log::debug!(
                "read shard {}/{}: {} tensors from {:?}",
                idx + 1,
                self.shard_count(),
                count,
                shard.file_name().unwrap_or_default()
            );
        }
        let table: ParameterTable = tensors.into_iter().collect();
        log::info!("loaded checkpoint: {} tensors", table.len());
        Ok(table)
    }
}

fn read_shard(path: &Path, tensors: &mut BTreeMap<String, RawTensor>) -> Result<usize> {
    let file =
        File::open(path).with_context(|| format!("failed to open checkpoint: {:?}", path))?;
    // SAFETY: the file is mapped read-only and the mapping is dropped before
    // returning; every tensor is copied out of it.
    let mmap = unsafe { Mmap::map(&file) }
        .with_context(|| format!("failed to mmap checkpoint: {:?}", path))?;

    let parsed = SafeTensors::deserialize(&mmap)
        .with_context(|| format!("failed to parse safetensors: {:?}", path))?;

    let views = parsed.tensors();
    let count = views.len();
    for (name, view) in views {
        let dtype = DType::from_safetensors(view.dtype())
            .with_context(|| format!("tensor '{}' in {:?}", name, path))?;
        let tensor = RawTensor::new(dtype, view.shape().to_vec(), view.data().to_vec())
            .with_context(|| format!("tensor '{}' in {:?}", name, path))?;
        if tensors.insert(name.clone(), tensor).is_some() {
            log::warn!("tensor '{}' appears in more than one shard; keeping the last", name);
        }
    }
    Ok(count)
}

//! Checkpoint reading into an ordered parameter table.

mod parameter_table;
mod safetensors_loader;

pub use parameter_table::ParameterTable;
pub use safetensors_loader::SafeTensorsLoader;

use anyhow::Result;
use std::path::Path;

/// Reads a `.safetensors` checkpoint (file, directory or sharded directory)
/// fully into memory.
pub fn load_parameter_table(path: &Path) -> Result<ParameterTable> {
    SafeTensorsLoader::new(path)?.load()
}

//! Architecture inspection command.

use anyhow::{anyhow, Result};
use residua::InferredArchitecture;

pub fn run(checkpoint: &str, format: &str) -> Result<()> {
    let arch = residua::inspect_architecture(checkpoint)?;
    println!("{}", render(&arch, format)?);
    Ok(())
}

pub(crate) fn render(arch: &InferredArchitecture, format: &str) -> Result<String> {
    match format {
        "text" => Ok(format!("{}, head_dim={}", arch, arch.head_dim())),
        "json" => Ok(serde_json::to_string_pretty(arch)?),
        _ => Err(anyhow!("Unknown format: '{}'. Use: text, json", format)),
    }
}

use anyhow::{anyhow, Context, Result};
use std::io::{self, Read};
use std::path::Path;

/// One input sequence, with its FASTA header when there was one.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: Option<String>,
    pub sequence: String,
}

/// Read input from a file, or from stdin when `input` is `None` or `-`.
pub fn resolve_input(input: Option<&str>) -> Result<String> {
    match input {
        Some(path) if path != "-" => std::fs::read_to_string(Path::new(path))
            .with_context(|| format!("Failed to read input file '{}'", path)),
        _ => {
            let mut buffer = String::new();
            io::stdin().lock().read_to_string(&mut buffer)?;
            if buffer.trim().is_empty() {
                return Err(anyhow!(
                    "No input provided. Pass --input FILE or pipe sequences via stdin."
                ));
            }
            Ok(buffer)
        }
    }
}

/// Split input into records: FASTA when any line starts with `>`, otherwise
/// one sequence per non-empty line.
pub fn parse_records(text: &str) -> Result<Vec<Record>> {
    let is_fasta = text.lines().any(|l| l.trim_start().starts_with('>'));
    if !is_fasta {
        return Ok(text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|l| Record {
                id: None,
                sequence: l.to_string(),
            })
            .collect());
    }

    let mut records: Vec<Record> = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(header) = line.strip_prefix('>') {
            let id = header.split_whitespace().next().unwrap_or_default();
            records.push(Record {
                id: Some(id.to_string()),
                sequence: String::new(),
            });
        } else {
            let record = records.last_mut().ok_or_else(|| {
                anyhow!("line {}: sequence data before the first '>' header", line_no + 1)
            })?;
            record.sequence.push_str(line);
        }
    }
    Ok(records)
}

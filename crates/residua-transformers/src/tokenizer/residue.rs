//! Character-level tokenizer over the amino-acid alphabet.

use std::collections::HashMap;

use anyhow::{anyhow, Result};

use crate::tokenizer::SequenceTokenizer;

pub const PAD_TOKEN: &str = "<pad>";
pub const EOS_TOKEN: &str = "<eos>";
pub const UNK_TOKEN: &str = "<unk>";
pub const MASK_TOKEN: &str = "<mask>";

/// The 20 standard residues followed by the ambiguity and rare codes.
pub const RESIDUES: &str = "ACDEFGHIKLMNPQRSTVWYXBZUO";

const SPECIAL_TOKENS: [&str; 4] = [PAD_TOKEN, EOS_TOKEN, UNK_TOKEN, MASK_TOKEN];

/// One token per residue letter, with `<eos>` appended to every sequence.
///
/// Ids: `<pad>`=0, `<eos>`=1, `<unk>`=2, `<mask>`=3, then the letters of
/// [`RESIDUES`] in order. Input is upper-cased and whitespace is dropped.
#[derive(Debug, Clone)]
pub struct ResidueTokenizer {
    vocab: HashMap<char, u32>,
    id_to_token: Vec<String>,
}

impl Default for ResidueTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ResidueTokenizer {
    pub const PAD_ID: u32 = 0;
    pub const EOS_ID: u32 = 1;
    pub const UNK_ID: u32 = 2;
    pub const MASK_ID: u32 = 3;

    pub fn new() -> Self {
        let mut id_to_token: Vec<String> = SPECIAL_TOKENS.iter().map(|t| t.to_string()).collect();
        let mut vocab = HashMap::with_capacity(RESIDUES.len());
        for c in RESIDUES.chars() {
            vocab.insert(c, id_to_token.len() as u32);
            id_to_token.push(c.to_string());
        }
        Self { vocab, id_to_token }
    }

    pub fn token_to_id(&self, residue: char) -> u32 {
        self.vocab
            .get(&residue.to_ascii_uppercase())
            .copied()
            .unwrap_or(Self::UNK_ID)
    }

    pub fn id_to_token(&self, id: u32) -> Option<&str> {
        self.id_to_token.get(id as usize).map(String::as_str)
    }

    fn is_special(id: u32) -> bool {
        (id as usize) < SPECIAL_TOKENS.len()
    }
}

impl SequenceTokenizer for ResidueTokenizer {
    fn vocab_size(&self) -> usize {
        self.id_to_token.len()
    }

    fn pad_token_id(&self) -> u32 {
        Self::PAD_ID
    }

    fn eos_token_id(&self) -> u32 {
        Self::EOS_ID
    }

    fn encode(&self, sequence: &str, max_length: usize) -> Result<Vec<u32>> {
        if max_length == 0 {
            return Err(anyhow!("max_length must be > 0"));
        }
        let mut ids: Vec<u32> = sequence
            .chars()
            .filter(|c| !c.is_whitespace())
            .take(max_length - 1)
            .map(|c| self.token_to_id(c))
            .collect();
        ids.push(Self::EOS_ID);
        Ok(ids)
    }

    fn decode(&self, ids: &[u32], skip_special_tokens: bool) -> String {
        ids.iter()
            .filter(|&&id| !(skip_special_tokens && Self::is_special(id)))
            .map(|&id| self.id_to_token(id).unwrap_or(UNK_TOKEN))
            .collect()
    }
}

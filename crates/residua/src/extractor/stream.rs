use std::collections::VecDeque;

use crate::extractor::{EmbeddingExtractor, EmbeddingResult};

/// Iterator over `(sequence, embedding)` pairs in input order.
///
/// Owns the extractor; each batch is tokenized and encoded only when the
/// previous batch's results have been consumed.
pub struct EmbeddingStream {
    extractor: Option<EmbeddingExtractor>,
    sequences: Vec<String>,
    next_start: usize,
    ready: VecDeque<(String, EmbeddingResult)>,
}

impl EmbeddingStream {
    pub(crate) fn new(extractor: EmbeddingExtractor, sequences: Vec<String>) -> Self {
        log::debug!("embedding {} sequences", sequences.len());
        Self {
            extractor: Some(extractor),
            sequences,
            next_start: 0,
            ready: VecDeque::new(),
        }
    }

    /// A stream that yields nothing.
    pub fn empty() -> Self {
        Self {
            extractor: None,
            sequences: Vec::new(),
            next_start: 0,
            ready: VecDeque::new(),
        }
    }

    /// Number of input sequences not yet yielded.
    pub fn remaining(&self) -> usize {
        if self.extractor.is_none() {
            return self.ready.len();
        }
        self.ready.len() + self.sequences.len().saturating_sub(self.next_start)
    }

    fn fill(&mut self) {
        let Some(extractor) = &self.extractor else {
            return;
        };
        if self.next_start >= self.sequences.len() {
            return;
        }

        let end = (self.next_start + extractor.config().batch_size).min(self.sequences.len());
        let batch = &self.sequences[self.next_start..end];

        match extractor.embed_batch(batch) {
            Ok(results) => {
                log::debug!("embedded sequences {}..{}", self.next_start, end);
                self.ready
                    .extend(batch.iter().cloned().zip(results));
                self.next_start = end;
            }
            Err(e) => {
                log::error!(
                    "batch {}..{} failed, stopping: {}",
                    self.next_start,
                    end,
                    e
                );
                self.extractor = None;
            }
        }
    }
}

impl Iterator for EmbeddingStream {
    type Item = (String, EmbeddingResult);

    fn next(&mut self) -> Option<Self::Item> {
        if self.ready.is_empty() {
            self.fill();
        }
        self.ready.pop_front()
    }
}

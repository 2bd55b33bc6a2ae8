//! The individual inference rules, each a fallible attempt returning `Option`.
//!
//! Rules never error: a rule that does not apply returns `None` and the
//! caller moves on to the next one in its chain.

use std::collections::BTreeSet;

use crate::tensor::Shape;
use crate::weights::ParameterTable;

/// Reads `embed_dim` from one axis of a rank-2 tensor whose name contains
/// `pattern`.
#[derive(Debug, Clone, Copy)]
pub struct EmbedDimRule {
    pub name: &'static str,
    pub pattern: &'static str,
    pub axis: usize,
}

/// Tried in this order for every table entry.
pub const EMBED_DIM_RULES: [EmbedDimRule; 3] = [
    // [vocab_size, embed_dim]
    EmbedDimRule {
        name: "token_embeddings",
        pattern: "embeddings.tok_embeddings.weight",
        axis: 1,
    },
    // [embed_dim, embed_dim]
    EmbedDimRule {
        name: "attention_output",
        pattern: "model.layers.0.attn.Wo.weight",
        axis: 0,
    },
    // [mlp_width, embed_dim]
    EmbedDimRule {
        name: "mlp_input",
        pattern: "model.layers.0.mlp.Wi.weight",
        axis: 1,
    },
];

impl EmbedDimRule {
    pub fn apply(&self, key: &str, shape: &Shape) -> Option<usize> {
        if !key.contains(self.pattern) {
            return None;
        }
        let (rows, cols) = shape.as_2d()?;
        let dim = if self.axis == 0 { rows } else { cols };
        (dim > 0).then_some(dim)
    }
}

/// First table entry satisfying any rule, checking the rules in order per entry.
pub fn embed_dim(table: &ParameterTable) -> Option<(usize, &'static str)> {
    table.iter().find_map(|(key, tensor)| {
        EMBED_DIM_RULES
            .iter()
            .find_map(|rule| rule.apply(key, tensor.shape()).map(|dim| (dim, rule.name)))
    })
}

const LAYER_PREFIX: &str = "model.layers.";

/// Integer indices following a `layers` path segment in one key.
///
/// Keys without the `model.layers.` prefix yield nothing; segments that do not
/// parse as a non-negative integer are skipped.
pub fn layer_indices_in_key(key: &str) -> Vec<usize> {
    if !key.contains(LAYER_PREFIX) {
        return Vec::new();
    }
    let parts: Vec<&str> = key.split('.').collect();
    parts
        .windows(2)
        .filter(|w| w[0] == "layers")
        .filter_map(|w| w[1].parse::<usize>().ok())
        .collect()
}

/// Every distinct layer index mentioned anywhere in the table.
pub fn layer_indices(table: &ParameterTable) -> BTreeSet<usize> {
    table.names().flat_map(layer_indices_in_key).collect()
}

/// Head dimensions tried, in order, when `embed_dim` divides evenly.
pub const PREFERRED_HEAD_DIMS: [usize; 3] = [64, 32, 128];

/// Head counts tried, in order, when no preferred head dimension fits.
pub const CANDIDATE_HEAD_COUNTS: [usize; 6] = [8, 12, 16, 20, 24, 32];

/// Head dimensions tried against a separate query projection.
pub const QUERY_HEAD_DIMS: [usize; 3] = [32, 64, 128];

const FUSED_QKV_PATTERN: &str = "model.layers.0.attn.Wqkv.weight";

/// Picks a head count for a model width from the divisor heuristics.
pub fn heads_for_width(embed_dim: usize) -> Option<usize> {
    if embed_dim == 0 {
        return None;
    }
    if let Some(head_dim) = PREFERRED_HEAD_DIMS.iter().find(|&&d| embed_dim % d == 0) {
        return Some(embed_dim / head_dim);
    }
    CANDIDATE_HEAD_COUNTS
        .iter()
        .copied()
        .find(|&heads| embed_dim % heads == 0)
}

/// Signature shared by the `num_heads` rules.
pub type HeadRule = fn(&ParameterTable, usize) -> Option<usize>;

/// The `num_heads` chain, tried in order until one yields a value.
pub const NUM_HEADS_RULES: [(&str, HeadRule); 2] = [
    ("fused_qkv", heads_from_fused_qkv),
    ("query_projection", heads_from_query_projection),
];

/// Uses the first layer-0 fused QKV weight, shaped `[3 * embed_dim, embed_dim]`.
///
/// Only the first matching key is examined. A QKV width other than
/// `3 * embed_dim` makes the rule yield nothing.
pub fn heads_from_fused_qkv(table: &ParameterTable, embed_dim: usize) -> Option<usize> {
    let (_, tensor) = table
        .iter()
        .find(|(key, _)| key.contains(FUSED_QKV_PATTERN))?;
    let (qkv_dim, _model_dim) = tensor.shape().as_2d()?;
    if Some(qkv_dim) != embed_dim.checked_mul(3) {
        return None;
    }
    heads_for_width(embed_dim)
}

fn is_layer0_query_weight(key: &str) -> bool {
    key.to_lowercase().contains("query") && key.contains("weight") && key.contains("layers.0")
}

/// Uses the first layer-0 query projection `[out_dim, in_dim]` with
/// `in_dim == embed_dim`. Only the first matching key is examined.
pub fn heads_from_query_projection(table: &ParameterTable, embed_dim: usize) -> Option<usize> {
    let (_, tensor) = table.iter().find(|(key, _)| is_layer0_query_weight(key))?;
    let (out_dim, in_dim) = tensor.shape().as_2d()?;
    if in_dim != embed_dim {
        return None;
    }
    QUERY_HEAD_DIMS
        .iter()
        .find(|&&head_dim| out_dim % head_dim == 0)
        .map(|head_dim| out_dim / head_dim)
        .filter(|&heads| heads > 0)
}

/// Runs [`NUM_HEADS_RULES`] in order.
pub fn num_heads(table: &ParameterTable, embed_dim: usize) -> Option<(usize, &'static str)> {
    NUM_HEADS_RULES
        .iter()
        .find_map(|(name, rule)| rule(table, embed_dim).map(|heads| (heads, *name)))
}

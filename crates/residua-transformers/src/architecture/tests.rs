use super::rules::*;
use super::*;
use crate::tensor::{DType, RawTensor, Shape};

fn table(entries: &[(&str, &[usize])]) -> ParameterTable {
    entries
        .iter()
        .map(|(name, shape)| (name.to_string(), RawTensor::zeros(DType::F32, *shape)))
        .collect()
}

/// Layer-0 tensors of a fused-QKV checkpoint of width `e`, plus extra layers.
fn modernbert_table(e: usize, layers: &[usize]) -> ParameterTable {
    let mut entries: Vec<(String, Vec<usize>)> =
        vec![("model.embeddings.tok_embeddings.weight".into(), vec![29, e])];
    for &i in layers {
        entries.push((format!("model.layers.{}.attn.Wqkv.weight", i), vec![3 * e, e]));
        entries.push((format!("model.layers.{}.attn.Wo.weight", i), vec![e, e]));
        entries.push((format!("model.layers.{}.mlp.Wi.weight", i), vec![4 * e, e]));
        entries.push((format!("model.layers.{}.mlp.Wo.weight", i), vec![e, 2 * e]));
    }
    entries
        .into_iter()
        .map(|(name, shape)| (name, RawTensor::zeros(DType::F32, shape)))
        .collect()
}

// =========================================================================
// embed_dim
// =========================================================================

#[test]
fn test_embed_dim_from_token_embeddings() {
    let t = table(&[
        ("model.layers.0.attn.Wo.weight", &[320, 320]),
        ("model.embeddings.tok_embeddings.weight", &[29, 320]),
        ("model.layers.0.mlp.Wi.weight", &[1280, 320]),
        ("model.layers.0.attn.Wqkv.weight", &[960, 320]),
    ]);

    let arch = infer_architecture(&t).unwrap();
    assert_eq!(arch.embed_dim, 320);
}

#[test]
fn test_embed_dim_from_attention_output_without_embeddings() {
    let t = table(&[
        ("model.layers.0.attn.Wo.weight", &[256, 999]),
        ("model.layers.0.attn.Wqkv.weight", &[768, 256]),
    ]);

    let arch = infer_architecture(&t).unwrap();
    assert_eq!(arch.embed_dim, 256);
}

#[test]
fn test_embed_dim_from_mlp_input() {
    let t = table(&[
        ("model.layers.0.mlp.Wi.weight", &[2048, 512]),
        ("model.layers.0.attn.Wqkv.weight", &[1536, 512]),
    ]);

    let arch = infer_architecture(&t).unwrap();
    assert_eq!(arch.embed_dim, 512);
}

#[test]
fn test_embed_dim_first_entry_in_table_order_wins() {
    // An inconsistent table: the earlier entry decides, not the rule priority.
    let t = table(&[
        ("model.layers.0.attn.Wo.weight", &[128, 128]),
        ("model.embeddings.tok_embeddings.weight", &[29, 320]),
    ]);

    let (dim, rule) = embed_dim(&t).unwrap();
    assert_eq!(dim, 128);
    assert_eq!(rule, "attention_output");
}

#[test]
fn test_embed_dim_rule_order_within_one_entry() {
    let rule = &EMBED_DIM_RULES[0];
    let shape = Shape::from([33, 480]);
    assert_eq!(rule.apply("x.embeddings.tok_embeddings.weight", &shape), Some(480));
    assert_eq!(rule.apply("model.layers.0.attn.Wo.weight", &shape), None);
}

#[test]
fn test_embed_dim_ignores_non_matrix_tensors() {
    let t = table(&[
        ("model.embeddings.tok_embeddings.weight", &[320]),
        ("model.layers.0.mlp.Wi.weight", &[1280, 320]),
    ]);

    let (dim, rule) = embed_dim(&t).unwrap();
    assert_eq!(dim, 320);
    assert_eq!(rule, "mlp_input");
}

#[test]
fn test_embed_dim_undetermined() {
    let t = table(&[
        ("model.layers.0.attn_norm.weight", &[64]),
        ("model.layers.1.attn.Wo.weight", &[64, 64]),
    ]);

    let err = infer_architecture(&t).unwrap_err();
    assert_eq!(err, ArchitectureError::EmbedDimUndetermined);
    assert_eq!(err.scalar(), "embed_dim");
}

// =========================================================================
// num_layers
// =========================================================================

#[test]
fn test_num_layers_contiguous() {
    let arch = infer_architecture(&modernbert_table(64, &[0, 1, 2, 3])).unwrap();
    assert_eq!(arch.num_layers, 4);
}

#[test]
fn test_num_layers_counts_distinct_indices_not_max() {
    let arch = infer_architecture(&modernbert_table(64, &[0, 2])).unwrap();
    assert_eq!(arch.num_layers, 2);

    let arch = infer_architecture(&modernbert_table(64, &[0, 2, 5])).unwrap();
    assert_eq!(arch.num_layers, 3);
}

#[test]
fn test_layer_index_parsing() {
    assert_eq!(layer_indices_in_key("model.layers.7.attn.Wo.weight"), vec![7]);
    assert_eq!(layer_indices_in_key("model.layers.final.weight"), Vec::<usize>::new());
    assert_eq!(layer_indices_in_key("encoder.layers.3.weight"), Vec::<usize>::new());
    assert_eq!(layer_indices_in_key("model.layers.-1.weight"), Vec::<usize>::new());
    assert_eq!(
        layer_indices_in_key("model.layers.2.adapter.layers.9.weight"),
        vec![2, 9]
    );
}

#[test]
fn test_num_layers_skips_malformed_segments() {
    let t = table(&[
        ("model.embeddings.tok_embeddings.weight", &[29, 64]),
        ("model.layers.0.attn.Wqkv.weight", &[192, 64]),
        ("model.layers.x.attn.Wo.weight", &[64, 64]),
        ("model.layers.", &[1]),
    ]);

    let arch = infer_architecture(&t).unwrap();
    assert_eq!(arch.num_layers, 1);
}

#[test]
fn test_num_layers_undetermined() {
    let t = table(&[("model.embeddings.tok_embeddings.weight", &[29, 64])]);

    let err = infer_architecture(&t).unwrap_err();
    assert_eq!(err, ArchitectureError::NumLayersUndetermined);
}

// =========================================================================
// num_heads
// =========================================================================

#[test]
fn test_num_heads_head_dim_64() {
    let arch = infer_architecture(&modernbert_table(768, &[0])).unwrap();
    assert_eq!(arch.embed_dim, 768);
    assert_eq!(arch.num_heads, 12);
    assert_eq!(arch.head_dim(), 64);
}

#[test]
fn test_num_heads_head_dim_32() {
    let arch = infer_architecture(&modernbert_table(96, &[0])).unwrap();
    assert_eq!(arch.num_heads, 3);
}

#[test]
fn test_num_heads_candidate_list_order() {
    // 100 is not a multiple of 32; 8, 12 and 16 do not divide it, 20 does.
    let arch = infer_architecture(&modernbert_table(100, &[0])).unwrap();
    assert_eq!(arch.num_heads, 20);
}

#[test]
fn test_heads_for_width() {
    assert_eq!(heads_for_width(320), Some(5));
    assert_eq!(heads_for_width(480), Some(15));
    assert_eq!(heads_for_width(72), Some(8));
    assert_eq!(heads_for_width(36), Some(12));
    assert_eq!(heads_for_width(7), None);
    assert_eq!(heads_for_width(0), None);
}

#[test]
fn test_fused_qkv_width_mismatch_falls_through() {
    let t = table(&[
        ("model.embeddings.tok_embeddings.weight", &[29, 768]),
        ("model.layers.0.attn.Wqkv.weight", &[2000, 768]),
    ]);

    assert_eq!(heads_from_fused_qkv(&t, 768), None);
    assert_eq!(
        infer_architecture(&t).unwrap_err(),
        ArchitectureError::NumHeadsUndetermined
    );
}

#[test]
fn test_fused_qkv_huge_width_yields_nothing() {
    let t = table(&[("model.layers.0.attn.Wqkv.weight", &[6, 2])]);
    assert_eq!(heads_from_fused_qkv(&t, usize::MAX / 2), None);
}

#[test]
fn test_query_projection_fallback() {
    let t = table(&[
        ("model.embeddings.tok_embeddings.weight", &[29, 768]),
        ("model.layers.0.attention.self.Query.weight", &[768, 768]),
    ]);

    let (heads, rule) = num_heads(&t, 768).unwrap();
    // head_dim 32 is tried before 64
    assert_eq!(heads, 24);
    assert_eq!(rule, "query_projection");
}

#[test]
fn test_query_projection_used_after_fused_qkv_mismatch() {
    let t = table(&[
        ("model.embeddings.tok_embeddings.weight", &[29, 100]),
        ("model.layers.0.attn.Wqkv.weight", &[301, 100]),
        ("model.layers.0.attn.query.weight", &[128, 100]),
    ]);

    let arch = infer_architecture(&t).unwrap();
    assert_eq!(arch.num_heads, 4);
}

#[test]
fn test_query_projection_input_width_mismatch() {
    let t = table(&[
        ("model.embeddings.tok_embeddings.weight", &[29, 768]),
        ("model.layers.0.attn.query.weight", &[768, 512]),
    ]);

    assert_eq!(heads_from_query_projection(&t, 768), None);
}

#[test]
fn test_query_projection_only_first_match_examined() {
    let t = table(&[
        ("model.layers.0.attn.query.weight", &[768, 512]),
        ("model.layers.0.attn.query_2.weight", &[768, 768]),
    ]);

    assert_eq!(heads_from_query_projection(&t, 768), None);
}

#[test]
fn test_num_heads_undetermined_without_attention_weights() {
    let t = table(&[
        ("model.embeddings.tok_embeddings.weight", &[29, 64]),
        ("model.layers.0.mlp.Wi.weight", &[256, 64]),
        ("model.layers.1.mlp.Wi.weight", &[256, 64]),
    ]);

    let err = infer_architecture(&t).unwrap_err();
    assert_eq!(err, ArchitectureError::NumHeadsUndetermined);
    assert_eq!(err.to_string(), "could not determine num_heads from checkpoint");
}

#[test]
fn test_indivisible_width_with_fused_qkv_is_undetermined() {
    let t = table(&[
        ("model.embeddings.tok_embeddings.weight", &[29, 7]),
        ("model.layers.0.attn.Wqkv.weight", &[21, 7]),
    ]);

    assert_eq!(
        infer_architecture(&t).unwrap_err(),
        ArchitectureError::NumHeadsUndetermined
    );
}

#[test]
fn test_display() {
    let arch = InferredArchitecture {
        embed_dim: 320,
        num_layers: 6,
        num_heads: 5,
    };
    assert_eq!(arch.to_string(), "embed_dim=320, num_layers=6, num_heads=5");
}

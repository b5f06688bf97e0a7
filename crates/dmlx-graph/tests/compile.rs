use anyhow::Result;
use dmlx_graph::compile::{InputEdge, IntermediateEdge, MergedNode, OutputEdge};
use dmlx_graph::hashing::Fingerprint;
use dmlx_graph::ops::elementwise::{add, identity};
use dmlx_graph::ops::pooling::max_pooling;
use dmlx_graph::ops::PoolingOptions;
use dmlx_graph::schema::{Capabilities, FeatureLevel};
use dmlx_graph::tensor::DataTypeMask;
use dmlx_graph::{BuilderConfig, DataType, ErrorCategory, GraphBuilder, OperatorKind, TensorDesc};

#[test]
fn max_pooling_graph_compiles_to_single_operator() -> Result<()> {
    let mut builder = GraphBuilder::default();
    let input = builder.input_tensor(0, DataType::Float32, &[1, 3, 8, 8])?;
    let pooled = max_pooling(
        &mut builder,
        input,
        &[2, 2],
        false,
        &PoolingOptions::default().strides(&[2, 2]),
    )?;
    assert_eq!(builder.desc(pooled.values)?.sizes(), &[1, 3, 4, 4]);
    assert!(pooled.indices.is_none());

    let graph = builder.compile(&[Some(pooled.values)])?;
    assert_eq!(graph.input_count, 1);
    assert_eq!(graph.output_count, 1);
    assert_eq!(graph.operator_nodes.len(), 1);
    assert_eq!(graph.operator_nodes[0].kind, OperatorKind::MaxPooling2);
    assert_eq!(
        graph.input_edges,
        vec![InputEdge {
            graph_input_index: 0,
            to_node_index: 0,
            to_node_input_index: 0,
        }]
    );
    assert_eq!(
        graph.output_edges,
        vec![OutputEdge {
            from_node_index: 0,
            from_node_output_index: 0,
            graph_output_index: 0,
        }]
    );
    assert!(graph.intermediate_edges.is_empty());
    Ok(())
}

#[test]
fn add_of_two_inputs_has_no_intermediate_edges() -> Result<()> {
    let mut builder = GraphBuilder::default();
    let a = builder.input_tensor(0, DataType::Float32, &[1, 4, 4, 4])?;
    let b = builder.input_tensor(1, DataType::Float32, &[1, 4, 4, 4])?;
    let sum = add(&mut builder, a, b)?;

    let graph = builder.compile(&[Some(sum)])?;
    assert_eq!(graph.input_count, 2);
    assert_eq!(graph.input_edges.len(), 2);
    assert_eq!(graph.input_edges[1].graph_input_index, 1);
    assert_eq!(graph.input_edges[1].to_node_input_index, 1);
    assert_eq!(graph.operator_nodes.len(), 1);
    assert_eq!(graph.output_edges.len(), 1);
    assert!(graph.intermediate_edges.is_empty());
    Ok(())
}

#[test]
fn chained_operators_produce_intermediate_edges() -> Result<()> {
    let mut builder = GraphBuilder::default();
    let x = builder.input_tensor(0, DataType::Float32, &[2, 2])?;
    let doubled = add(&mut builder, x, x)?;
    let copied = identity(&mut builder, doubled, None)?;

    let graph = builder.compile(&[Some(copied)])?;
    assert_eq!(
        graph.intermediate_edges,
        vec![IntermediateEdge {
            from_node_index: 0,
            from_node_output_index: 0,
            to_node_index: 1,
            to_node_input_index: 0,
        }]
    );
    assert_eq!(graph.output_edges[0].from_node_index, 1);
    Ok(())
}

#[test]
fn constants_follow_operators_in_merged_order() -> Result<()> {
    let weights = vec![0u8; 64];
    let mut builder = GraphBuilder::default();
    let x = builder.input_tensor(0, DataType::Float32, &[1, 4, 2, 2])?;
    let bias = builder.with_name_scope("bias", |builder| {
        builder.constant(&weights, TensorDesc::packed(DataType::Float32, &[1, 4, 2, 2])?)
    })?;
    let sum = add(&mut builder, x, bias)?;

    let graph = builder.compile(&[Some(sum)])?;
    assert_eq!(graph.base_operator_node_index(), 0);
    assert_eq!(graph.base_constant_node_index(), 1);
    assert_eq!(graph.constant_nodes.len(), 1);
    assert_eq!(graph.constant_nodes[0].byte_len, 64);
    assert_eq!(graph.constant_nodes[0].byte_hash, Fingerprint::of_bytes(&weights));
    assert_eq!(graph.constant_nodes[0].name.as_deref(), Some("bias"));
    assert_eq!(
        graph.intermediate_edges,
        vec![IntermediateEdge {
            from_node_index: 1,
            from_node_output_index: 0,
            to_node_index: 0,
            to_node_input_index: 1,
        }]
    );

    let merged = graph.merged_nodes();
    assert_eq!(merged.len(), 2);
    assert!(matches!(merged[0], MergedNode::Operator(_)));
    assert!(matches!(merged[1], MergedNode::Constant(node) if node.data.len() == 64));
    Ok(())
}

#[test]
fn constants_need_feature_level_6_2() -> Result<()> {
    let bytes = [0u8; 16];
    let config = BuilderConfig::default().with_capabilities(Capabilities::new(
        FeatureLevel::V6_1,
        DataTypeMask::ALL_BUT_NIBBLE,
    ));
    let mut builder = GraphBuilder::new(config);
    let err = builder
        .constant(&bytes, TensorDesc::packed(DataType::Float32, &[4])?)
        .expect_err("constants are unavailable before 6.2");
    assert_eq!(err.category(), ErrorCategory::UnsupportedConfiguration);
    assert_eq!(builder.node_count(), 0);
    Ok(())
}

#[test]
fn reinterpret_round_trip_routes_to_the_producer() -> Result<()> {
    let mut builder = GraphBuilder::default();
    let x = builder.input_tensor(0, DataType::Float32, &[1, 4, 4, 4])?;
    let sum = add(&mut builder, x, x)?;
    let flat = builder.reinterpret_sizes(sum, &[1, 64], None)?;
    let restored = builder.reinterpret_sizes(flat, &[1, 4, 4, 4], None)?;
    assert_eq!(builder.desc(restored)?, builder.desc(sum)?);

    let direct = builder.compile(&[Some(sum)])?;
    let routed = builder.compile(&[Some(restored)])?;
    assert_eq!(direct, routed);
    assert_eq!(direct.operator_nodes.len(), 1);
    Ok(())
}

#[test]
fn reinterpret_inputs_resolve_to_graph_inputs() -> Result<()> {
    let mut builder = GraphBuilder::default();
    let x = builder.input_tensor(0, DataType::Float32, &[2, 8])?;
    let view = builder.reinterpret_sizes(x, &[4, 4], None)?;
    let copied = identity(&mut builder, view, None)?;

    let graph = builder.compile(&[Some(copied)])?;
    assert_eq!(graph.input_edges.len(), 1);
    assert_eq!(graph.input_edges[0].graph_input_index, 0);
    Ok(())
}

#[test]
fn reinterpret_cannot_grow_the_buffer() -> Result<()> {
    let mut builder = GraphBuilder::default();
    let x = builder.input_tensor(0, DataType::Float32, &[2, 2])?;
    let err = builder
        .reinterpret_sizes(x, &[4, 4], None)
        .expect_err("view larger than its source");
    assert_eq!(err.category(), ErrorCategory::ContractViolation);
    Ok(())
}

#[test]
fn graph_inputs_cannot_be_outputs() -> Result<()> {
    let mut builder = GraphBuilder::default();
    let x = builder.input_tensor(0, DataType::Float32, &[4])?;
    let view = builder.reinterpret_type(x, DataType::UInt32)?;

    let err = builder
        .compile(&[Some(view)])
        .expect_err("input exposed as output");
    assert_eq!(err.category(), ErrorCategory::GraphStructure);
    Ok(())
}

#[test]
fn absent_outputs_keep_their_position() -> Result<()> {
    let mut builder = GraphBuilder::default();
    let x = builder.input_tensor(0, DataType::Float32, &[4])?;
    let copied = identity(&mut builder, x, None)?;

    let graph = builder.compile(&[None, Some(copied)])?;
    assert_eq!(graph.output_count, 2);
    assert_eq!(graph.output_edges.len(), 1);
    assert_eq!(graph.output_edges[0].graph_output_index, 1);
    Ok(())
}

#[test]
fn requested_input_count_may_only_grow() -> Result<()> {
    let mut builder = GraphBuilder::default();
    let a = builder.input_tensor(0, DataType::Float32, &[4])?;
    let b = builder.input_tensor(1, DataType::Float32, &[4])?;
    let sum = add(&mut builder, a, b)?;

    let err = builder
        .compile_with_input_count(&[Some(sum)], 1)
        .expect_err("fewer inputs than declared");
    assert_eq!(err.category(), ErrorCategory::ContractViolation);

    let graph = builder.compile_with_input_count(&[Some(sum)], 3)?;
    assert_eq!(graph.input_count, 3);
    Ok(())
}

#[test]
fn compiling_twice_is_byte_identical() -> Result<()> {
    let mut builder = GraphBuilder::default();
    let x = builder.input_tensor(0, DataType::Float32, &[1, 3, 8, 8])?;
    builder.push_name("block");
    let pooled = max_pooling(
        &mut builder,
        x,
        &[3, 3],
        true,
        &PoolingOptions::default().start_padding(&[1, 1]).end_padding(&[1, 1]),
    )?;
    builder.pop_name();
    let outputs = [Some(pooled.values), pooled.indices];

    let first = builder.compile(&outputs)?;
    let second = builder.compile(&outputs)?;
    assert_eq!(first, second);
    assert_eq!(first.fingerprint()?, second.fingerprint()?);
    assert_eq!(first.to_json_string()?, second.to_json_string()?);
    assert_eq!(first.to_bincode_bytes()?, second.to_bincode_bytes()?);
    assert_eq!(first.operator_nodes[0].name.as_deref(), Some("block"));
    assert_eq!(first.output_edges[1].from_node_output_index, 1);
    Ok(())
}

#[test]
fn text_dump_lists_nodes_and_edges() -> Result<()> {
    let mut builder = GraphBuilder::default();
    let a = builder.input_tensor(0, DataType::Float32, &[4])?;
    let b = builder.input_tensor(1, DataType::Float32, &[4])?;
    let sum = add(&mut builder, a, b)?;

    let text = builder.compile(&[Some(sum)])?.to_text();
    assert!(text.starts_with("graph (inputs = 2, outputs = 1) {"));
    assert!(text.contains("ElementWiseAdd"));
    assert!(text.contains("in1 -> #0.1"));
    assert!(text.contains("#0:0 -> out0"));
    Ok(())
}

#[test]
fn json_description_can_be_saved() -> Result<()> {
    let mut builder = GraphBuilder::default();
    let x = builder.input_tensor(0, DataType::Float32, &[4])?;
    let copied = identity(&mut builder, x, None)?;
    let graph = builder.compile(&[Some(copied)])?;

    let path = std::env::temp_dir().join(format!("dmlx-graph-{}.json", std::process::id()));
    graph.save_json(&path)?;
    let saved: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    std::fs::remove_file(&path)?;
    assert_eq!(saved["input_count"], 1);
    assert_eq!(saved["operator_nodes"][0]["kind"], "ElementWiseIdentity");
    Ok(())
}

use anyhow::Result;
use dmlx_graph::ops::attributes::OperatorAttributes;
use dmlx_graph::ops::conv::convolution;
use dmlx_graph::ops::elementwise::{add, equals};
use dmlx_graph::ops::gather::{gather, top_k};
use dmlx_graph::ops::matmul::gemm;
use dmlx_graph::ops::movement::{join, split};
use dmlx_graph::ops::pooling::average_pooling;
use dmlx_graph::ops::recurrent::{gru, GruInputs};
use dmlx_graph::ops::reduce::reduce;
use dmlx_graph::ops::resample::resample;
use dmlx_graph::ops::roi::{roi_align, roi_align_grad, RoiAlignGradRequest};
use dmlx_graph::ops::{
    AxisDirection, ConvolutionOptions, GemmOptions, GruOptions, GruOutputSelection,
    InterpolationMode, PoolingOptions, RecurrentDirection, ReduceFunction, ResampleOptions,
    RoiSampling,
};
use dmlx_graph::schema::Capabilities;
use dmlx_graph::tensor::{DataTypeMask, LayoutKind};
use dmlx_graph::{
    BuilderConfig, DataType, ErrorCategory, FeatureLevel, GraphBuilder, GraphResult,
    OperatorKind,
};

fn sizes(builder: &GraphBuilder<'_>, expr: dmlx_graph::Expression) -> GraphResult<Vec<u32>> {
    Ok(builder.desc(expr)?.sizes().to_vec())
}

#[test]
fn unit_convolution_shrinks_by_window_minus_one() -> Result<()> {
    for k in 1..=8u32 {
        let mut builder = GraphBuilder::default();
        let input = builder.input_tensor(0, DataType::Float32, &[1, 2, 8, 8])?;
        let filter = builder.input_tensor(1, DataType::Float32, &[3, 2, k, k])?;
        let output = convolution(&mut builder, input, filter, None, &ConvolutionOptions::default())?;
        assert_eq!(sizes(&builder, output)?, vec![1, 3, 9 - k, 9 - k], "k = {k}");
    }
    Ok(())
}

#[test]
fn strided_padded_convolution() -> Result<()> {
    let mut builder = GraphBuilder::default();
    let input = builder.input_tensor(0, DataType::Float32, &[2, 4, 9, 9])?;
    let filter = builder.input_tensor(1, DataType::Float32, &[6, 4, 3, 3])?;
    let options = ConvolutionOptions::default()
        .strides(&[2, 2])
        .start_padding(&[1, 1])
        .end_padding(&[1, 1])
        .dilations(&[2, 1]);
    let output = convolution(&mut builder, input, filter, None, &options)?;
    // H: (9 + 2 - 5) / 2 + 1, W: (9 + 2 - 3) / 2 + 1
    assert_eq!(sizes(&builder, output)?, vec![2, 6, 4, 5]);
    Ok(())
}

#[test]
fn oversized_pooling_window_clamps_to_one() -> Result<()> {
    let mut builder = GraphBuilder::default();
    let input = builder.input_tensor(0, DataType::Float32, &[1, 1, 2, 2])?;
    let output = average_pooling(
        &mut builder,
        input,
        &[3, 3],
        false,
        &PoolingOptions::default(),
    )?;
    assert_eq!(sizes(&builder, output)?, vec![1, 1, 1, 1]);
    Ok(())
}

#[test]
fn split_partitions_the_axis() -> Result<()> {
    let mut builder = GraphBuilder::default();
    let input = builder.input_tensor(0, DataType::Float32, &[1, 8, 4, 4])?;
    let parts = split(&mut builder, input, 1, &[3, 5])?;
    assert_eq!(parts.len(), 2);
    assert_eq!(sizes(&builder, parts[0])?, vec![1, 3, 4, 4]);
    assert_eq!(sizes(&builder, parts[1])?, vec![1, 5, 4, 4]);
    Ok(())
}

#[test]
fn split_sizes_must_cover_the_axis() -> Result<()> {
    let mut builder = GraphBuilder::default();
    let input = builder.input_tensor(0, DataType::Float32, &[1, 8, 4, 4])?;
    let nodes_before = builder.node_count();
    let outputs_before = builder.output_count();

    let err = split(&mut builder, input, 1, &[3, 4]).expect_err("3 + 4 != 8");
    assert_eq!(err.category(), ErrorCategory::ContractViolation);
    assert_eq!(builder.node_count(), nodes_before);
    assert_eq!(builder.output_count(), outputs_before);
    Ok(())
}

#[test]
fn split_then_join_restores_the_descriptor() -> Result<()> {
    for layout in [LayoutKind::Default, LayoutKind::InterleavedChannel] {
        let mut builder = GraphBuilder::new(BuilderConfig::default().with_layout(layout));
        let input = builder.input_tensor(0, DataType::Float16, &[2, 6, 3, 5])?;
        let parts = split(&mut builder, input, 1, &[1, 2, 3])?;
        let joined = join(&mut builder, &parts, 1)?;
        assert_eq!(builder.desc(joined)?, builder.desc(input)?, "{layout:?}");
    }
    Ok(())
}

#[test]
fn join_rejects_mismatched_extents() -> Result<()> {
    let mut builder = GraphBuilder::default();
    let a = builder.input_tensor(0, DataType::Float32, &[1, 2, 4])?;
    let b = builder.input_tensor(1, DataType::Float32, &[1, 2, 5])?;
    let err = join(&mut builder, &[a, b], 1).expect_err("axis 2 differs");
    assert_eq!(err.category(), ErrorCategory::ContractViolation);
    Ok(())
}

#[test]
fn in_place_operators_mirror_their_input() -> Result<()> {
    let mut builder =
        GraphBuilder::new(BuilderConfig::default().with_layout(LayoutKind::InterleavedChannel));
    let a = builder.input_tensor(0, DataType::Float32, &[1, 3, 4, 4])?;
    let b = builder.input_tensor(1, DataType::Float32, &[1, 3, 4, 4])?;
    let sum = add(&mut builder, a, b)?;
    assert_eq!(builder.desc(sum)?, builder.desc(a)?);

    let mask = equals(&mut builder, a, b)?;
    assert_eq!(builder.desc(mask)?.data_type(), DataType::UInt8);
    Ok(())
}

#[test]
fn gemm_follows_transpose_flags() -> Result<()> {
    let mut builder = GraphBuilder::default();
    let a = builder.input_tensor(0, DataType::Float32, &[2, 1, 5, 3])?;
    let b = builder.input_tensor(1, DataType::Float32, &[2, 1, 4, 3])?;
    let output = gemm(
        &mut builder,
        a,
        b,
        None,
        &GemmOptions::default().transpose_b(true),
    )?;
    assert_eq!(sizes(&builder, output)?, vec![2, 1, 5, 4]);

    let err = gemm(&mut builder, a, b, None, &GemmOptions::default())
        .expect_err("inner dimensions 3 and 4 differ");
    assert_eq!(err.category(), ErrorCategory::ContractViolation);
    Ok(())
}

#[test]
fn arg_max_collapses_axes_to_indices() -> Result<()> {
    let mut builder = GraphBuilder::default();
    let input = builder.input_tensor(0, DataType::Float32, &[2, 3, 4])?;
    let arg = reduce(&mut builder, input, ReduceFunction::ArgMax, &[1], None)?;
    let desc = builder.desc(arg)?;
    assert_eq!(desc.sizes(), &[2, 1, 4]);
    assert_eq!(desc.data_type(), DataType::UInt32);

    let total = reduce(&mut builder, input, ReduceFunction::Sum, &[], None)?;
    assert_eq!(sizes(&builder, total)?, vec![1, 1, 1]);

    let err = reduce(&mut builder, input, ReduceFunction::Max, &[3], None)
        .expect_err("axis out of range");
    assert_eq!(err.category(), ErrorCategory::ContractViolation);
    Ok(())
}

#[test]
fn gather_replaces_the_axis_with_index_extents() -> Result<()> {
    let mut builder = GraphBuilder::default();
    let input = builder.input_tensor(0, DataType::Float32, &[1, 1, 4, 5])?;
    let indices = builder.input_tensor(1, DataType::UInt32, &[1, 1, 1, 3])?;
    let output = gather(&mut builder, input, indices, 2, 1)?;
    assert_eq!(sizes(&builder, output)?, vec![1, 1, 3, 5]);
    Ok(())
}

#[test]
fn top_k_keeps_k_entries() -> Result<()> {
    let mut builder = GraphBuilder::default();
    let input = builder.input_tensor(0, DataType::Float32, &[1, 10])?;
    let selected = top_k(&mut builder, input, 1, 3, AxisDirection::Decreasing)?;
    assert_eq!(sizes(&builder, selected.values)?, vec![1, 3]);
    assert_eq!(builder.desc(selected.indices)?.data_type(), DataType::UInt32);

    let err = top_k(&mut builder, input, 1, 11, AxisDirection::Decreasing)
        .expect_err("k exceeds the axis");
    assert_eq!(err.category(), ErrorCategory::ContractViolation);
    Ok(())
}

#[test]
fn resample_derives_scales_and_pixel_offsets() -> Result<()> {
    let mut builder = GraphBuilder::default();
    let input = builder.input_tensor(0, DataType::Float32, &[1, 1, 2, 2])?;
    let output = resample(
        &mut builder,
        input,
        &[1, 1, 4, 6],
        InterpolationMode::Linear,
        &ResampleOptions::default(),
    )?;
    assert_eq!(sizes(&builder, output)?, vec![1, 1, 4, 6]);

    let graph = builder.compile(&[Some(output)])?;
    let OperatorAttributes::Resample(attributes) = &graph.operator_nodes[0].attributes else {
        panic!("unexpected attributes {:?}", graph.operator_nodes[0].attributes);
    };
    assert_eq!(attributes.scales, vec![1.0, 1.0, 2.0, 3.0]);
    assert_eq!(attributes.input_pixel_offsets, vec![0.5; 4]);
    assert_eq!(attributes.output_pixel_offsets, vec![-0.5; 4]);
    Ok(())
}

#[test]
fn resample_revision_follows_feature_level() -> Result<()> {
    let mut builder = GraphBuilder::default();
    let input = builder.input_tensor(0, DataType::Float32, &[1, 1, 4, 4])?;
    let options = ResampleOptions::default().antialiased(true);
    let output = resample(&mut builder, input, &[1, 1, 2, 2], InterpolationMode::Linear, &options)?;
    let graph = builder.compile(&[Some(output)])?;
    assert_eq!(graph.operator_nodes[0].kind, OperatorKind::Resample3);
    let OperatorAttributes::Resample(attributes) = &graph.operator_nodes[0].attributes else {
        panic!("unexpected attributes {:?}", graph.operator_nodes[0].attributes);
    };
    assert_eq!(attributes.antialiased, Some(true));

    let config = BuilderConfig::default().with_capabilities(Capabilities::new(
        FeatureLevel::V6_3,
        DataTypeMask::ALL_BUT_NIBBLE,
    ));
    let mut builder = GraphBuilder::new(config);
    let input = builder.input_tensor(0, DataType::Float32, &[1, 1, 4, 4])?;
    let err = resample(&mut builder, input, &[1, 1, 2, 2], InterpolationMode::Linear, &options)
        .expect_err("antialiasing arrives in 6.4");
    assert_eq!(err.category(), ErrorCategory::UnsupportedConfiguration);
    assert_eq!(builder.node_count(), 1);

    let output = resample(
        &mut builder,
        input,
        &[1, 1, 2, 2],
        InterpolationMode::Linear,
        &ResampleOptions::default(),
    )?;
    let graph = builder.compile(&[Some(output)])?;
    assert_eq!(graph.operator_nodes[0].kind, OperatorKind::Resample2);
    let OperatorAttributes::Resample(attributes) = &graph.operator_nodes[0].attributes else {
        panic!("unexpected attributes {:?}", graph.operator_nodes[0].attributes);
    };
    assert_eq!(attributes.antialiased, None);
    Ok(())
}

#[test]
fn huge_dilation_is_a_contract_violation() -> Result<()> {
    let mut builder = GraphBuilder::default();
    let input = builder.input_tensor(0, DataType::Float32, &[1, 1, 8, 8])?;
    let filter = builder.input_tensor(1, DataType::Float32, &[1, 1, 3, 3])?;
    let options = ConvolutionOptions::default().dilations(&[u32::MAX / 2 + 1, 1]);
    let err = convolution(&mut builder, input, filter, None, &options)
        .expect_err("dilated window overflows u32");
    assert_eq!(err.category(), ErrorCategory::ContractViolation);

    let pooling = PoolingOptions::default().dilations(&[1, u32::MAX]);
    let err = average_pooling(&mut builder, input, &[2, 2], false, &pooling)
        .expect_err("dilated window overflows u32");
    assert_eq!(err.category(), ErrorCategory::ContractViolation);
    assert_eq!(builder.node_count(), 2);
    Ok(())
}

#[test]
fn gru_reports_sequence_and_final_state() -> Result<()> {
    let mut builder = GraphBuilder::default();
    let input = builder.input_tensor(0, DataType::Float32, &[1, 5, 2, 3])?;
    let weight = builder.input_tensor(1, DataType::Float32, &[1, 2, 12, 3])?;
    let recurrence = builder.input_tensor(2, DataType::Float32, &[1, 2, 12, 4])?;
    let tensors = GruInputs {
        input,
        weight,
        recurrence,
        bias: None,
        hidden_init: None,
        sequence_lengths: None,
    };

    let both = gru(
        &mut builder,
        tensors,
        &GruOptions::default().direction(RecurrentDirection::Bidirectional),
    )?;
    let sequence = both.sequence.unwrap_or_else(|| panic!("sequence output requested"));
    let single = both.single.unwrap_or_else(|| panic!("single output requested"));
    assert_eq!(sizes(&builder, sequence)?, vec![5, 2, 2, 4]);
    assert_eq!(sizes(&builder, single)?, vec![1, 2, 2, 4]);

    let last_only = gru(
        &mut builder,
        tensors,
        &GruOptions::default()
            .direction(RecurrentDirection::Bidirectional)
            .outputs(GruOutputSelection::Single),
    )?;
    assert!(last_only.sequence.is_none());
    assert!(last_only.single.is_some());

    let err = gru(&mut builder, tensors, &GruOptions::default())
        .expect_err("forward GRU with two-direction weights");
    assert_eq!(err.category(), ErrorCategory::ContractViolation);
    Ok(())
}

#[test]
fn roi_align_emits_one_map_per_region() -> Result<()> {
    let mut builder = GraphBuilder::default();
    let input = builder.input_tensor(0, DataType::Float32, &[2, 8, 16, 16])?;
    let roi = builder.input_tensor(1, DataType::Float32, &[3, 4])?;
    let batch_indices = builder.input_tensor(2, DataType::UInt32, &[3])?;
    let output = roi_align(
        &mut builder,
        input,
        roi,
        batch_indices,
        RoiSampling::default().spatial_scale(0.25, 0.25),
        0.0,
        7,
        7,
    )?;
    assert_eq!(sizes(&builder, output)?, vec![3, 8, 7, 7]);
    Ok(())
}

#[test]
fn roi_align_grad_emits_requested_gradients() -> Result<()> {
    let mut builder = GraphBuilder::default();
    let gradient = builder.input_tensor(0, DataType::Float32, &[3, 8, 7, 7])?;
    let roi = builder.input_tensor(1, DataType::Float32, &[3, 4])?;
    let batch_indices = builder.input_tensor(2, DataType::UInt32, &[3])?;

    let both = roi_align_grad(
        &mut builder,
        None,
        gradient,
        roi,
        batch_indices,
        RoiSampling::default(),
        RoiAlignGradRequest {
            output_gradient: Some((2, 16, 16)),
            roi_gradient: true,
        },
    )?;
    let image = both
        .output_gradient
        .unwrap_or_else(|| panic!("image gradient requested"));
    let regions = both
        .roi_gradient
        .unwrap_or_else(|| panic!("roi gradient requested"));
    assert_eq!(sizes(&builder, image)?, vec![2, 8, 16, 16]);
    assert_eq!(builder.desc(regions)?, builder.desc(roi)?);

    let err = roi_align_grad(
        &mut builder,
        None,
        gradient,
        roi,
        batch_indices,
        RoiSampling::default(),
        RoiAlignGradRequest::default(),
    )
    .expect_err("nothing requested");
    assert_eq!(err.category(), ErrorCategory::ContractViolation);
    Ok(())
}

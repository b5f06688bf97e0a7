use anyhow::Result;
use dmlx_graph::ops::activation::relu;
use dmlx_graph::ops::conv::convolution;
use dmlx_graph::ops::elementwise::add;
use dmlx_graph::ops::matmul::gemm;
use dmlx_graph::ops::normalization::{
    mean_variance_normalization, MeanVarianceNormalizationOptions,
};
use dmlx_graph::ops::{ConvolutionDirection, ConvolutionOptions, GemmOptions};
use dmlx_graph::schema::Capabilities;
use dmlx_graph::tensor::DataTypeMask;
use dmlx_graph::{BuilderConfig, DataType, ErrorCategory, FeatureLevel, GraphBuilder};

#[test]
fn expressions_are_bound_to_their_builder() -> Result<()> {
    let mut first = GraphBuilder::default();
    let mut second = GraphBuilder::default();
    let foreign = first.input_tensor(0, DataType::Float32, &[4])?;
    let local = second.input_tensor(0, DataType::Float32, &[4])?;

    let err = add(&mut second, local, foreign).expect_err("cross-builder operand");
    assert_eq!(err.category(), ErrorCategory::ContractViolation);
    assert!(second.desc(foreign).is_err());
    assert_eq!(second.node_count(), 1);
    Ok(())
}

#[test]
fn nested_name_scopes_label_operators() -> Result<()> {
    let mut builder = GraphBuilder::default();
    let x = builder.input_tensor(0, DataType::Float32, &[1, 4])?;
    let activated = builder.with_name_scope("encoder", |builder| {
        builder.with_name_scope("conv", |builder| relu(builder, x))
    })?;
    assert_eq!(builder.current_name(), None);

    builder.push_name("head");
    let summed = add(&mut builder, activated, activated)?;
    builder.pop_name();

    let graph = builder.compile(&[Some(summed)])?;
    assert_eq!(graph.operator_nodes[0].name.as_deref(), Some("encoder_conv"));
    assert_eq!(graph.operator_nodes[1].name.as_deref(), Some("head"));
    Ok(())
}

#[test]
fn schema_validation_rejects_unlisted_types() -> Result<()> {
    let mut builder = GraphBuilder::default();
    let a = builder.input_tensor(0, DataType::Float64, &[1, 1, 2, 3])?;
    let b = builder.input_tensor(1, DataType::Float64, &[1, 1, 3, 2])?;
    let err = gemm(&mut builder, a, b, None, &GemmOptions::default())
        .expect_err("gemm has no double-precision form");
    assert_eq!(err.category(), ErrorCategory::UnsupportedConfiguration);
    assert_eq!(builder.node_count(), 2);

    let mut unchecked = GraphBuilder::new(BuilderConfig::default().with_validation(false));
    let a = unchecked.input_tensor(0, DataType::Float64, &[1, 1, 2, 3])?;
    let b = unchecked.input_tensor(1, DataType::Float64, &[1, 1, 3, 2])?;
    let product = gemm(&mut unchecked, a, b, None, &GemmOptions::default())?;
    assert_eq!(unchecked.desc(product)?.sizes(), &[1, 1, 2, 2]);
    Ok(())
}

#[test]
fn mean_free_normalization_needs_feature_level_6_3() -> Result<()> {
    let config = BuilderConfig::default().with_capabilities(Capabilities::new(
        FeatureLevel::V6_2,
        DataTypeMask::ALL_BUT_NIBBLE,
    ));
    let mut builder = GraphBuilder::new(config);
    let x = builder.input_tensor(0, DataType::Float32, &[1, 2, 3, 3])?;

    let options = MeanVarianceNormalizationOptions::default().normalize_mean(false);
    let err = mean_variance_normalization(&mut builder, x, &[2, 3], &options)
        .expect_err("MeanVarianceNormalization2 arrives in 6.3");
    assert_eq!(err.category(), ErrorCategory::UnsupportedConfiguration);

    let normalized = mean_variance_normalization(
        &mut builder,
        x,
        &[2, 3],
        &MeanVarianceNormalizationOptions::default(),
    )?;
    assert_eq!(builder.desc(normalized)?, builder.desc(x)?);
    Ok(())
}

#[test]
fn backward_convolution_requires_explicit_sizes() -> Result<()> {
    let mut builder = GraphBuilder::default();
    let input = builder.input_tensor(0, DataType::Float32, &[1, 3, 4, 4])?;
    let filter = builder.input_tensor(1, DataType::Float32, &[3, 2, 3, 3])?;
    let backward = ConvolutionOptions::default().direction(ConvolutionDirection::Backward);

    let err = convolution(&mut builder, input, filter, None, &backward)
        .expect_err("backward sizes are not inferred");
    assert_eq!(err.category(), ErrorCategory::Unimplemented);

    let output = convolution(
        &mut builder,
        input,
        filter,
        None,
        &backward.output_sizes(&[1, 2, 6, 6]),
    )?;
    assert_eq!(builder.desc(output)?.sizes(), &[1, 2, 6, 6]);
    Ok(())
}

#[test]
fn failed_operators_leave_no_trace() -> Result<()> {
    let mut builder = GraphBuilder::default();
    let a = builder.input_tensor(0, DataType::Float32, &[1, 4])?;
    let b = builder.input_tensor(1, DataType::Float32, &[1, 5])?;
    let outputs_before = builder.output_count();

    add(&mut builder, a, b).expect_err("mismatched sizes");
    assert_eq!(builder.node_count(), 2);
    assert_eq!(builder.output_count(), outputs_before);

    let graph = builder.compile(&[])?;
    assert!(graph.operator_nodes.is_empty());
    Ok(())
}

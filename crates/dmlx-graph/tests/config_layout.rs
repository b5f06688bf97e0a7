use anyhow::Result;
use dmlx_graph::schema::{operator_schemas, Capabilities, FieldRole};
use dmlx_graph::tensor::{DataTypeMask, LayoutKind, TensorLayout};
use dmlx_graph::{
    BuilderConfig, DataType, ErrorCategory, FeatureLevel, GraphBuilder, LayoutPolicy, OperatorKind,
    TensorDesc,
};

#[test]
fn config_parses_from_json() -> Result<()> {
    let config = BuilderConfig::from_json_str(
        r#"{ "layout": "interleaved_channel", "validate_schemas": false }"#,
    )?;
    assert_eq!(config.layout, LayoutKind::InterleavedChannel);
    assert!(!config.validate_schemas);
    assert_eq!(config.capabilities, Capabilities::default());

    let config = BuilderConfig::from_json_str(
        r#"{ "capabilities": { "feature_level": "V6_2", "supported_data_types": 6 } }"#,
    )?;
    assert_eq!(config.layout, LayoutKind::Default);
    assert!(config.validate_schemas);
    assert_eq!(config.capabilities.feature_level, FeatureLevel::V6_2);
    assert_eq!(
        config.capabilities.supported_data_types,
        DataTypeMask::FLOAT16_32
    );

    assert!(BuilderConfig::from_json_str(r#"{ "layout": "planar" }"#).is_err());
    Ok(())
}

#[test]
fn layout_spellings_agree_between_env_and_json() -> Result<()> {
    for spelling in ["default", "packed", "interleaved", "interleaved_channel", "nhwc"] {
        let config = BuilderConfig::from_json_str(&format!(r#"{{ "layout": "{spelling}" }}"#))?;
        assert_eq!(Some(config.layout), LayoutKind::parse(spelling), "{spelling}");
    }
    assert_eq!(LayoutKind::parse("planar"), None);
    Ok(())
}

#[test]
fn interleaved_strides_that_overflow_are_rejected() -> Result<()> {
    let config = BuilderConfig::default().with_layout(LayoutKind::InterleavedChannel);
    let mut builder = GraphBuilder::new(config);
    let err = builder
        .input_tensor(0, DataType::UInt8, &[1, 65536, 65536, 2])
        .expect_err("batch stride exceeds u32");
    assert_eq!(err.category(), ErrorCategory::ContractViolation);
    assert_eq!(builder.node_count(), 0);

    let x = builder.input_tensor(0, DataType::UInt8, &[1, 3, 4, 4])?;
    assert_eq!(builder.desc(x)?.strides(), Some(&[48, 1, 12, 3][..]));
    Ok(())
}

#[test]
fn interleaved_layout_puts_channels_innermost() -> Result<()> {
    let desc = TensorDesc::new(
        DataType::Float32,
        &[1, 3, 4, 4],
        &LayoutPolicy::InterleavedChannel,
    )?;
    assert_eq!(desc.strides(), Some(&[48, 1, 12, 3][..]));
    assert_eq!(desc.total_bytes(), 192);

    let packed = TensorDesc::new(DataType::Float32, &[1, 3, 4, 4], &LayoutPolicy::Default)?;
    assert_eq!(packed.strides(), None);
    assert_eq!(packed.total_bytes(), 192);
    Ok(())
}

#[test]
fn custom_layout_policy_drives_every_descriptor() -> Result<()> {
    let policy = LayoutPolicy::custom(|data_type, _, sizes| TensorLayout {
        strides: None,
        total_bytes: sizes.iter().map(|size| u64::from(*size)).product::<u64>()
            * u64::from(data_type.size_in_bytes())
            + 64,
        alignment: 64,
    });
    let mut builder = GraphBuilder::default().with_layout(policy);
    let x = builder.input_tensor(0, DataType::Float16, &[2, 8])?;
    let desc = builder.desc(x)?;
    assert_eq!(desc.total_bytes(), 96);
    assert_eq!(desc.alignment(), 64);
    Ok(())
}

#[test]
fn registry_follows_feature_level() {
    let older = operator_schemas(&Capabilities::new(
        FeatureLevel::V6_2,
        DataTypeMask::ALL_BUT_NIBBLE,
    ));
    assert!(!older.contains(OperatorKind::MeanVarianceNormalization2));
    assert!(older.contains(OperatorKind::MeanVarianceNormalization1));

    let latest = operator_schemas(&Capabilities::default());
    assert!(latest.contains(OperatorKind::MeanVarianceNormalization2));
    assert!(latest.contains(OperatorKind::Resample3));
    assert!(latest.len() > older.len());
}

#[test]
fn registry_narrows_types_to_supported_mask() {
    let schemas = operator_schemas(&Capabilities::new(FeatureLevel::LATEST, DataTypeMask::FLOAT32));
    let gemm = schemas
        .get(OperatorKind::Gemm)
        .unwrap_or_else(|| panic!("gemm is always available"));
    for field in gemm.fields().iter().filter(|field| field.role == FieldRole::Input) {
        assert_eq!(field.allowed_data_types, DataTypeMask::FLOAT32, "{}", field.name);
    }
    assert_eq!(schemas.data_types_of(OperatorKind::Gemm), DataTypeMask::FLOAT32);
}

#[test]
fn registry_is_shared_per_capability_set() {
    let capabilities = Capabilities::new(FeatureLevel::V5_0, DataTypeMask::ALL_BUT_NIBBLE);
    let first = operator_schemas(&capabilities);
    let second = operator_schemas(&capabilities);
    assert!(std::sync::Arc::ptr_eq(&first, &second));
}

use anyhow::Result;
use dmlx_graph::logging::init_tracing;
use dmlx_graph::ops::elementwise::add;
use dmlx_graph::{DataType, GraphBuilder};
use tracing::Level;

#[test]
fn subscriber_installs_once_and_traces_compilation() -> Result<()> {
    assert!(init_tracing(Level::TRACE));
    assert!(!init_tracing(Level::WARN));

    let mut builder = GraphBuilder::default();
    let a = builder.input_tensor(0, DataType::Float32, &[2, 2])?;
    let b = builder.input_tensor(1, DataType::Float32, &[2, 2])?;
    let sum = builder.with_name_scope("residual", |builder| add(builder, a, b))?;
    let graph = builder.compile(&[Some(sum)])?;
    assert_eq!(graph.operator_nodes.len(), 1);
    assert_eq!(graph.operator_nodes[0].name.as_deref(), Some("residual"));
    Ok(())
}

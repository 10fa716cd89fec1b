use manos_block_core::{
    BlockTool, BlockToolOptions, EditorValue, HostApi, MenuItem, Node, RegistryError,
    ToolRegistry, ToolSpec, ToolboxConfig, make,
};
use serde_json::{Value, json};

struct EchoTool {
    data: Value,
}

impl BlockTool for EchoTool {
    fn render(&self) -> Node {
        make("div", &["echo"], Vec::<(String, Value)>::new())
            .text(self.data.to_string())
            .build()
    }

    fn save(&self) -> Value {
        self.data.clone()
    }

    fn validate(&self, data: &Value) -> bool {
        !data.is_null()
    }

    fn render_settings(&self) -> Vec<MenuItem> {
        vec![MenuItem::new("noop", || {})]
    }
}

fn echo_spec(name: &str) -> ToolSpec {
    ToolSpec::new(
        name,
        ToolboxConfig {
            icon: "<svg/>".to_string(),
            title: "Echo".to_string(),
        },
        |options: BlockToolOptions| {
            Box::new(EchoTool {
                data: options.data.unwrap_or(Value::Null),
            }) as Box<dyn BlockTool>
        },
    )
}

#[test]
fn duplicate_tool_names_are_rejected() {
    let err = ToolRegistry::new([echo_spec("echo"), echo_spec("echo")])
        .err()
        .unwrap();
    assert!(matches!(err, RegistryError::DuplicateTool(name) if name == "echo"));
}

#[test]
fn load_and_save_round_trips_blocks_in_order() -> anyhow::Result<()> {
    let registry = ToolRegistry::new([echo_spec("echo")])?;
    let value = EditorValue::from_json_str(
        r#"{"blocks":[{"id":"a","type":"echo","data":{"n":1}},{"id":"b","type":"echo","data":{"n":2}}]}"#,
    )?;

    let blocks = registry.load(&value, &HostApi::default(), false)?;
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[1].handle.id, "b");

    let saved = registry.save(&blocks);
    assert_eq!(saved.blocks, value.blocks);
    assert_eq!(saved.version, value.version);
    Ok(())
}

#[test]
fn save_drops_blocks_failing_validation() -> anyhow::Result<()> {
    let registry = ToolRegistry::new([echo_spec("echo")])?;
    let blocks = vec![
        registry.create("echo", "a", Some(json!({"keep": true})), &HostApi::default(), false)?,
        registry.create("echo", "b", None, &HostApi::default(), false)?,
    ];

    let saved = registry.save(&blocks);
    assert_eq!(saved.blocks.len(), 1);
    assert_eq!(saved.blocks[0].id, "a");
    Ok(())
}

#[test]
fn unknown_tool_and_read_only_are_reported() -> anyhow::Result<()> {
    let registry = ToolRegistry::new([echo_spec("echo")])?;
    assert!(matches!(
        registry.create("missing", "a", None, &HostApi::default(), false),
        Err(RegistryError::UnknownTool(_))
    ));
    assert!(matches!(
        registry.create("echo", "a", None, &HostApi::default(), true),
        Err(RegistryError::ReadOnlyUnsupported(_))
    ));

    let registry = ToolRegistry::new([echo_spec("echo").read_only_supported(true)])?;
    assert!(
        registry
            .create("echo", "a", None, &HostApi::default(), true)
            .is_ok()
    );
    Ok(())
}

#[test]
fn spec_config_is_passed_to_constructed_tools() -> anyhow::Result<()> {
    let spec = ToolSpec::new(
        "cfg",
        ToolboxConfig {
            icon: String::new(),
            title: "Cfg".to_string(),
        },
        |options: BlockToolOptions| {
            Box::new(EchoTool {
                data: options.config.unwrap_or(Value::Null),
            }) as Box<dyn BlockTool>
        },
    )
    .config(json!({"maxEntityQuantity": 5}));
    let registry = ToolRegistry::new([spec])?;

    let block = registry.create("cfg", "a", None, &HostApi::default(), false)?;
    assert_eq!(block.block.save(), json!({"maxEntityQuantity": 5}));
    assert_eq!(registry.toolbox()[0].1.title, "Cfg");
    Ok(())
}

//! Tests for config parsing and resolution.

use sbcore::Tier;
use std::path::Path;
use switchboard_cli::{
    Cli,
    config::{Config, DEFAULT_CONFIG, resolve_in},
};

#[test]
fn default_config_describes_the_demo_team() {
    let config = Config::from_toml(DEFAULT_CONFIG).unwrap();
    assert_eq!(config.llm.model, "gpt-4");
    assert_eq!(config.dispatch.max_iterations, 10);
    assert_eq!(config.dispatch.temperature, Some(0.0));

    assert_eq!(config.generalist().unwrap().name, "general");
    let specialists: Vec<_> = config.specialists().map(|a| a.name.as_str()).collect();
    assert_eq!(specialists, ["shopping", "banking"]);
    assert_eq!(config.tools.len(), 2);
    assert_eq!(config.tools[1].fields.as_ref().map(Vec::len), Some(0));
}

#[test]
fn env_vars_are_expanded() {
    // SAFETY: no other test in this binary reads this variable.
    unsafe { std::env::set_var("SWITCHBOARD_TEST_KEY", "sk-test") };
    let config = Config::from_toml(
        r#"
[llm]
model = "gpt-4"
api_key = "${SWITCHBOARD_TEST_KEY}"

[[agents]]
name = "general"
role = "generalist"
"#,
    )
    .unwrap();
    assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
}

#[test]
fn exactly_one_generalist_is_required() {
    let none = r#"
[llm]
model = "gpt-4"

[[agents]]
name = "shopping"
"#;
    assert!(Config::from_toml(none).is_err());

    let two = r#"
[llm]
model = "gpt-4"

[[agents]]
name = "a"
role = "generalist"

[[agents]]
name = "b"
role = "generalist"
"#;
    let err = Config::from_toml(two).unwrap_err();
    assert!(err.to_string().contains("found 2"));
}

#[test]
fn agent_roles_default_to_specialist() {
    let config = Config::from_toml(
        r#"
[llm]
model = "gpt-4"

[[agents]]
name = "general"
role = "generalist"

[[agents]]
name = "travel"
tools = ["flights"]
model = "gpt-4o"
"#,
    )
    .unwrap();
    let travel = &config.agents[1];
    assert_eq!(travel.role, Tier::Specialist);
    assert_eq!(travel.model.as_deref(), Some("gpt-4o"));
}

#[test]
fn resolution_prefers_flag_then_workspace_then_global() {
    let dir = tempfile::tempdir().unwrap();
    let workspace = dir.path().join("workspace.toml");
    let global = dir.path().join("global").join("config.toml");
    let flagged = dir.path().join("flag.toml");

    // Nothing exists yet: the global default is generated.
    let config = resolve_in(None, &workspace, &global).unwrap();
    assert!(global.exists());
    assert_eq!(config.agents.len(), 3);

    let workspace_toml = DEFAULT_CONFIG.replace("model = \"gpt-4\"", "model = \"gpt-4o\"");
    std::fs::write(&workspace, workspace_toml).unwrap();
    let config = resolve_in(None, &workspace, &global).unwrap();
    assert_eq!(config.llm.model, "gpt-4o");

    let flag_toml = DEFAULT_CONFIG.replace("model = \"gpt-4\"", "model = \"deepseek-chat\"");
    std::fs::write(&flagged, flag_toml).unwrap();
    let config = resolve_in(Some(&flagged), &workspace, &global).unwrap();
    assert_eq!(config.llm.model, "deepseek-chat");
}

#[test]
fn missing_flagged_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.toml");
    let err = resolve_in(Some(&missing), Path::new("nope"), Path::new("nope")).unwrap_err();
    assert!(format!("{err:#}").contains("missing.toml"));
}

#[test]
fn model_flag_overrides_config() {
    use clap::Parser;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, DEFAULT_CONFIG).unwrap();

    let cli = Cli::parse_from([
        "switchboard",
        "--config",
        path.to_str().unwrap(),
        "--model",
        "gpt-4o-mini",
        "agents",
    ]);
    assert_eq!(cli.load().unwrap().llm.model, "gpt-4o-mini");
}

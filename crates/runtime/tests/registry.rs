//! Tests for the tool registry.

use sbcore::Error;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use switchboard_runtime::{ESCALATE, Entry, Field, Kind, ToolRegistry, transfer};

fn echo(name: &str) -> Entry {
    Entry::text(name, "Echoes the input", |input| async move {
        Ok(format!("got: {input}"))
    })
}

#[test]
fn duplicate_names_are_rejected() {
    let mut registry = ToolRegistry::new();
    registry.register(echo("echo")).unwrap();
    let err = registry.register(echo("echo")).unwrap_err();
    assert!(matches!(err, Error::DuplicateToolName(name) if name == "echo"));
    assert_eq!(registry.len(), 1);
}

#[test]
fn resolve_unknown_fails() {
    let registry = ToolRegistry::new();
    let err = registry.resolve("missing").unwrap_err();
    assert!(matches!(err, Error::UnknownTool(name) if name == "missing"));
}

#[test]
fn descriptors_keep_insertion_order() {
    let mut registry = ToolRegistry::new();
    for name in ["zeta", "alpha", "mid"] {
        registry.register(echo(name)).unwrap();
    }

    let first: Vec<_> = registry.descriptors().into_iter().map(|t| t.name).collect();
    let second: Vec<_> = registry.descriptors().into_iter().map(|t| t.name).collect();
    assert_eq!(first, ["zeta", "alpha", "mid"]);
    assert_eq!(first, second);
}

#[test]
fn subset_follows_requested_order() {
    let mut catalog = ToolRegistry::new();
    for name in ["a", "b", "c"] {
        catalog.register(echo(name)).unwrap();
    }

    let subset = catalog.subset(&["c", "a"]).unwrap();
    assert_eq!(subset.names().collect::<Vec<_>>(), ["c", "a"]);
    assert!(!subset.contains("b"));

    let err = catalog.subset(&["a", "nope"]).unwrap_err();
    assert!(matches!(err, Error::UnknownTool(name) if name == "nope"));
}

#[tokio::test]
async fn invoke_passes_text_input() {
    let mut registry = ToolRegistry::new();
    registry.register(echo("echo")).unwrap();

    let out = registry.invoke("echo", r#"{"input":"shirts"}"#).await.unwrap();
    assert_eq!(out, "got: shirts");
    let out = registry.invoke("echo", "plain words").await.unwrap();
    assert_eq!(out, "got: plain words");
}

#[tokio::test]
async fn invalid_fields_never_run_the_handler() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = runs.clone();
    let mut registry = ToolRegistry::new();
    registry
        .register(Entry::fields(
            "transfer_funds",
            "Move money between accounts",
            vec![Field::new("amount", Kind::Number), Field::string("to")],
            move |fields| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(format!("sent {}", fields["amount"]))
                }
            },
        ))
        .unwrap();

    for bad in [
        r#"{"amount":"ten","to":"savings"}"#,
        r#"{"to":"savings"}"#,
        r#"{"amount":10,"to":"savings","memo":"x"}"#,
        "not json",
    ] {
        let err = registry.invoke("transfer_funds", bad).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }), "{bad}: {err}");
    }
    assert_eq!(runs.load(Ordering::SeqCst), 0);

    let out = registry
        .invoke("transfer_funds", r#"{"amount":10,"to":"savings"}"#)
        .await
        .unwrap();
    assert_eq!(out, "sent 10");
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn handler_errors_are_tool_errors() {
    let mut registry = ToolRegistry::new();
    registry
        .register(Entry::text("flaky", "Always fails", |_| async move {
            Err(anyhow::anyhow!("upstream down").context("lookup failed"))
        }))
        .unwrap();

    let err = registry.invoke("flaky", "x").await.unwrap_err();
    assert!(matches!(&err, Error::Tool { tool, .. } if tool == "flaky"));
    assert_eq!(err.to_string(), "tool `flaky` failed: lookup failed: upstream down");
}

#[tokio::test]
async fn transfer_tools_cannot_be_invoked_directly() {
    let mut registry = ToolRegistry::new();
    registry.register(transfer::escalate_tool()).unwrap();

    let err = registry
        .invoke(ESCALATE, r#"{"summary":"off topic"}"#)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::TransferRefused(_)));
}

#[test]
fn text_schema_has_input_field() {
    let entry = echo("echo");
    let json = serde_json::to_string(&entry.tool.parameters).unwrap();
    assert!(json.contains("input"));
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::Serialize;

use super::{format_or_json, handle_list, OutputFormat};

#[derive(Debug, Clone, Serialize)]
struct FakeEntry {
    name: String,
}

#[test]
fn handle_list_json_serializes_items() {
    let entries = vec![FakeEntry { name: "eth0".into() }, FakeEntry { name: "wan0".into() }];
    let result = handle_list(OutputFormat::Json, &entries, "no interfaces", |_, _| {});
    assert!(result.is_ok());
}

#[test]
fn handle_list_text_renders_empty_message() {
    let entries: Vec<FakeEntry> = vec![];
    let mut rendered = false;
    let result = handle_list(OutputFormat::Text, &entries, "no interfaces configured", |_, _| {
        rendered = true;
    });
    assert!(result.is_ok());
    assert!(!rendered, "render_text must not run for an empty list");
}

#[test]
fn handle_list_text_renders_items_when_nonempty() {
    let entries = vec![FakeEntry { name: "eth0".into() }];
    let mut seen = Vec::new();
    let result = handle_list(OutputFormat::Text, &entries, "no interfaces", |items, _| {
        seen.extend(items.iter().map(|e| e.name.clone()));
    });
    assert!(result.is_ok());
    assert_eq!(seen, vec!["eth0".to_string()]);
}

#[test]
fn format_or_json_dispatches_on_format() {
    let mut called = false;
    format_or_json(OutputFormat::Text, &FakeEntry { name: "x".into() }, || called = true)
        .expect("text branch");
    assert!(called);

    format_or_json(OutputFormat::Json, &FakeEntry { name: "x".into() }, || {
        panic!("json branch must not call text_fn")
    })
    .expect("json branch");
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn text(s: &str) -> QueuedPrompt {
    QueuedPrompt {
        text: Some(s.to_string()),
        content: None,
    }
}

#[test]
fn single_prompt_passes_through_unchanged() {
    let prompt = text("solo");
    let out = coalesce_prompts(vec![prompt.clone()]);
    assert_eq!(out.text, prompt.text);
    assert_eq!(out.content, prompt.content);
}

#[test]
fn three_prompts_join_with_ordinal_markers() {
    let out = coalesce_prompts(vec![text("a"), text("b"), text("c")]);
    assert_eq!(out.text, Some("[1/3] a\n\n[2/3] b\n\n[3/3] c".to_string()));
}

#[test]
fn text_less_prompt_contributes_empty_slot() {
    let blank = QueuedPrompt {
        text: None,
        content: None,
    };
    let out = coalesce_prompts(vec![text("a"), blank, text("c")]);
    assert_eq!(out.text, Some("[1/3] a\n\n[2/3] \n\n[3/3] c".to_string()));
}

#[test]
fn content_arrays_are_merged_in_order() {
    let p1 = QueuedPrompt {
        text: Some("a".to_string()),
        content: Some(vec![serde_json::json!({"kind": "image", "id": 1})]),
    };
    let p2 = QueuedPrompt {
        text: Some("b".to_string()),
        content: Some(vec![serde_json::json!({"kind": "image", "id": 2})]),
    };
    let out = coalesce_prompts(vec![p1, p2]);
    let content = out.content.expect("merged content");
    assert_eq!(content.len(), 2);
    assert_eq!(content[0]["id"], 1);
    assert_eq!(content[1]["id"], 2);
}

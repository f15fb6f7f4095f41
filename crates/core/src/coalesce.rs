// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Prompt coalescing for the queue-drain path.

use crate::wire::QueuedPrompt;

/// Collapses a batch of queued prompts into a single one for delivery.
///
/// A single prompt passes through unchanged. Multiple prompts are joined
/// with visible `[i/N]` markers over their text bodies; any image/content
/// arrays are concatenated in order. A prompt with no text contributes an
/// empty slot rather than being skipped, so the ordinal markers still line
/// up with what the sender actually queued.
pub fn coalesce_prompts(prompts: Vec<QueuedPrompt>) -> QueuedPrompt {
    if prompts.len() == 1 {
        return prompts.into_iter().next().unwrap_or_default();
    }

    let total = prompts.len();
    let mut text_parts = Vec::with_capacity(total);
    let mut content = Vec::new();
    let mut has_content = false;

    for (i, prompt) in prompts.into_iter().enumerate() {
        let body = prompt.text.unwrap_or_default();
        text_parts.push(format!("[{}/{}] {}", i + 1, total, body));
        if let Some(blocks) = prompt.content {
            has_content = true;
            content.extend(blocks);
        }
    }

    QueuedPrompt {
        text: Some(text_parts.join("\n\n")),
        content: has_content.then_some(content),
    }
}

#[cfg(test)]
#[path = "coalesce_tests.rs"]
mod tests;

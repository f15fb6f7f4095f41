//! Scenario F: an API error ends the turn without a trailing `result` event
//! (spec §8.F).

use crate::prelude::*;

#[test]
fn api_error_ends_turn_without_result() {
    let bridge = Bridge::start();
    let folder = bridge.folder_path("proj");
    let name = folder.file_name().unwrap().to_string_lossy().into_owned();

    let mut events = bridge.connect_events("client-f");
    events.next_frame_named("hello", 2_000).expect("hello frame");
    events.next_frame_named("folders", 2_000).expect("folders frame");

    bridge.post_json(
        &format!("/session/{name}"),
        serde_json::json!({"clientId": "client-f"}),
    );

    let prompt = bridge.post_json(
        &format!("/prompt/{name}"),
        serde_json::json!({"text": "trigger-api-error"}),
    );
    assert_eq!(prompt.status(), 200);

    let state = events
        .next_frame_named("state", 3_000)
        .expect("state snapshot carrying the formatted API error");
    assert_eq!(state.data["status"], "error");
    let messages = state.data["messages"].as_array().unwrap();
    assert!(messages.iter().any(|m| {
        m["role"] == "assistant"
            && m["content"]
                .as_str()
                .map(|c| c.contains("API error 400: Could not process image"))
                .unwrap_or(false)
    }));

    // The turn ended via the API-error path, not a `result` event — the
    // Session must be idle and ready for another prompt right away, with
    // no lingering turn-in-progress state blocking it.
    let follow_up = bridge.post_json(&format!("/prompt/{name}"), serde_json::json!({"text": "hi"}));
    assert_eq!(follow_up.status(), 200);
}

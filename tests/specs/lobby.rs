//! Scenario A: cold lobby to first answer (spec §8.A).

use crate::prelude::*;

#[test]
fn cold_lobby_to_first_answer() {
    let bridge = Bridge::start();
    let folder = bridge.folder_path("proj");
    let name = folder.file_name().unwrap().to_string_lossy().into_owned();

    let mut events = bridge.connect_events("client-a");
    let hello = events
        .next_frame_named("hello", 2_000)
        .expect("hello frame");
    assert_eq!(hello.data["clientId"], "client-a");

    let folders = events
        .next_frame_named("folders", 2_000)
        .expect("folders frame");
    assert!(folders.data["folders"]
        .as_array()
        .unwrap()
        .iter()
        .any(|f| f["name"] == name));

    let session = bridge.post_json(
        &format!("/session/{name}"),
        serde_json::json!({"clientId": "client-a"}),
    );
    assert_eq!(session.status(), 200);
    let session: serde_json::Value = session.json().unwrap();
    assert_eq!(session["resumable"], false);

    let prompt = bridge.post_json(&format!("/prompt/{name}"), serde_json::json!({"text": "hi"}));
    assert_eq!(prompt.status(), 200);
    let prompt: serde_json::Value = prompt.json().unwrap();
    assert_eq!(prompt["delivered"], true);

    let state = events.next_frame_named("state", 3_000).expect("state frame");
    assert_eq!(state.data["status"], "idle");
    let messages = state.data["messages"].as_array().unwrap();
    assert!(messages
        .iter()
        .any(|m| m["role"] == "assistant" && m["content"].as_str().unwrap().contains("hi")));
}

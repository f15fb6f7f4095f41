//! Scenario E: explicit exit, then a fresh session afterward (spec §8.E).

use crate::prelude::*;

#[test]
fn explicit_exit_then_fresh_session() {
    let bridge = Bridge::start();
    let folder = bridge.folder_path("proj");
    let name = folder.file_name().unwrap().to_string_lossy().into_owned();

    let mut events = bridge.connect_events("client-e");
    events.next_frame_named("hello", 2_000).expect("hello frame");
    events.next_frame_named("folders", 2_000).expect("folders frame");

    bridge.post_json(
        &format!("/session/{name}"),
        serde_json::json!({"clientId": "client-e"}),
    );
    let first_prompt = bridge.post_json(&format!("/prompt/{name}"), serde_json::json!({"text": "hi"}));
    assert_eq!(first_prompt.status(), 200);
    events
        .next_frame_named("state", 3_000)
        .expect("state frame for the first turn");

    let exit = bridge.post_json(&format!("/exit/{name}"), serde_json::json!({}));
    assert_eq!(exit.status(), 200);

    let idle_state = events
        .next_frame_named("state", 3_000)
        .expect("final idle state after exit");
    assert_eq!(idle_state.data["status"], "idle");

    // A fresh session for the same folder gets a brand new, non-resumable id.
    let session = bridge.post_json(
        &format!("/session/{name}"),
        serde_json::json!({"clientId": "client-e"}),
    );
    assert_eq!(session.status(), 200);
    let session: serde_json::Value = session.json().unwrap();
    assert_eq!(session["resumable"], false);
}

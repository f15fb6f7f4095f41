//! Scenario C: graceful restart round-trip (spec §8.C).

use crate::prelude::*;

#[test]
fn graceful_restart_round_trip() {
    let mut bridge = Bridge::start_with_env(&[("FAKE_WORKER_DELAY_MS", "1500")]);
    let folder = bridge.folder_path("proj");
    let name = folder.file_name().unwrap().to_string_lossy().into_owned();

    bridge.post_json(&format!("/session/{name}"), serde_json::json!({}));
    // FAKE_WORKER_DELAY_MS keeps this turn in flight long enough for the
    // SIGTERM below to land while turnInProgress is still true.
    let prompt = bridge.post_json(&format!("/prompt/{name}"), serde_json::json!({"text": "hi"}));
    assert_eq!(prompt.status(), 200);

    bridge.sigterm_and_wait();

    let restarted = Bridge::restart(bridge);
    let mut events = restarted.connect_events("client-c");
    events.next_frame_named("hello", 2_000).expect("hello frame");

    let session = restarted.post_json(&format!("/session/{name}"), serde_json::json!({"clientId": "client-c"}));
    assert_eq!(session.status(), 200);
    let session: serde_json::Value = session.json().unwrap();
    assert_eq!(session["resumable"], true);

    // The auto-resume prompt is delivered immediately on attach; its
    // synthetic user message shows up in the next state snapshot.
    let state = events
        .next_frame_named("state", 3_000)
        .expect("state snapshot carrying the auto-resume message");
    let messages = state.data["messages"].as_array().unwrap();
    assert!(messages.iter().any(|m| {
        m["role"] == "user"
            && m["content"]
                .as_str()
                .map(|c| c.contains("guéridon:system"))
                .unwrap_or(false)
    }));
}

//! Scenario B: a second prompt queues while a turn is in flight (spec §8.B).

use crate::prelude::*;

#[test]
fn queue_during_turn() {
    let bridge = Bridge::start_with_env(&[("FAKE_WORKER_DELAY_MS", "400")]);
    let folder = bridge.folder_path("proj");
    let name = folder.file_name().unwrap().to_string_lossy().into_owned();

    let mut events = bridge.connect_events("client-b");
    events.next_frame_named("hello", 2_000).expect("hello frame");
    events.next_frame_named("folders", 2_000).expect("folders frame");

    bridge.post_json(
        &format!("/session/{name}"),
        serde_json::json!({"clientId": "client-b"}),
    );

    let first = bridge.post_json(&format!("/prompt/{name}"), serde_json::json!({"text": "q1"}));
    assert_eq!(first.status(), 200);

    // The worker is sleeping FAKE_WORKER_DELAY_MS before it replies, so this
    // second prompt is guaranteed to land while turnInProgress is still true.
    let second = bridge.post_json(&format!("/prompt/{name}"), serde_json::json!({"text": "q2"}));
    assert_eq!(second.status(), 202);
    let second: serde_json::Value = second.json().unwrap();
    assert_eq!(second["queued"], true);
    assert_eq!(second["position"], 1);

    // q2 shows up as a user message well before the turn completes.
    let state_with_q2 = events
        .next_frame_named("state", 3_000)
        .expect("a state snapshot carrying q2's injected user message");
    assert!(state_with_q2.data["messages"]
        .as_array()
        .unwrap()
        .iter()
        .any(|m| m["role"] == "user" && m["content"] == "q2"));

    // On completion the coalesced q2 is delivered automatically; eventually
    // it gets its own answer too.
    let final_state = events
        .next_frame_named("state", 3_000)
        .expect("final state snapshot after the coalesced follow-up turn");
    assert_eq!(final_state.data["status"], "idle");
}

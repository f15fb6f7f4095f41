//! Scenario D: a stale handoff is ignored in favor of resuming the journal's
//! own session id (spec §8.D).

use crate::prelude::*;

#[test]
fn stale_handoff_is_ignored_and_journal_resumes() {
    let bridge = Bridge::start();
    let folder = bridge.folder_path("proj");
    let name = folder.file_name().unwrap().to_string_lossy().into_owned();

    // The handoff is 2 minutes older than the journal record it's paired
    // with — past STALE_HANDOFF_THRESHOLD_MS, so it must be discarded.
    bridge.write_journal(&folder, "journal-session", 0);
    bridge.write_handoff(&folder, "journal-session", 120_000);

    let session = bridge.post_json(
        &format!("/session/{name}"),
        serde_json::json!({"clientId": "client-d"}),
    );
    assert_eq!(session.status(), 200);
    let session: serde_json::Value = session.json().unwrap();
    assert_eq!(session["sessionId"], "journal-session");
    assert_eq!(session["resumable"], true);
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Server-sent frames and their wire framing.
//!
//! Each frame on the wire is `id: <seq>\nevent: <name>\ndata: <json>\n\n`.
//! `bridge-sse` only ever produces the five frame kinds below; the SSE
//! reconnect contract (§6 of the bridge protocol) requires clients to
//! discard any `delta`/`state` frame whose `folder` field does not match
//! their currently-selected one.

use axum::response::sse::Event;
use serde::Serialize;
use serde_json::Value;

use bridge_state::{Delta, Snapshot};

/// A minimal folder listing entry, mirrored from the (external) folder
/// scanner collaborator — this crate only needs enough shape to frame it.
#[derive(Debug, Clone, Serialize)]
pub struct FolderInfo {
    pub name: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resumable: Option<bool>,
}

/// A frame destined for exactly one subscriber's event stream.
#[derive(Debug, Clone)]
pub struct OutboundFrame {
    pub name: &'static str,
    pub payload: Value,
}

impl OutboundFrame {
    pub fn hello(
        client_id: &str,
        reconnect: bool,
        push_token: &str,
        vapid_public_key: Option<&str>,
    ) -> Self {
        Self {
            name: "hello",
            payload: serde_json::json!({
                "version": 1,
                "clientId": client_id,
                "reconnect": reconnect,
                "pushToken": push_token,
                "vapidPublicKey": vapid_public_key,
            }),
        }
    }

    pub fn folders(folders: &[FolderInfo]) -> Self {
        Self {
            name: "folders",
            payload: serde_json::json!({ "folders": folders }),
        }
    }

    pub fn state(folder: &str, snapshot: &Snapshot) -> Self {
        let mut payload = serde_json::to_value(snapshot).unwrap_or(Value::Null);
        inject_folder(&mut payload, folder);
        Self {
            name: "state",
            payload,
        }
    }

    pub fn delta(folder: &str, delta: &Delta) -> Self {
        let mut payload = serde_json::to_value(delta).unwrap_or(Value::Null);
        inject_folder(&mut payload, folder);
        Self {
            name: "delta",
            payload,
        }
    }

    pub fn ping() -> Self {
        Self {
            name: "ping",
            payload: serde_json::json!({}),
        }
    }

    /// Renders this frame as an axum SSE event carrying `seq` as the
    /// reconnect id.
    pub fn into_event(self, seq: u64) -> Event {
        Event::default()
            .id(seq.to_string())
            .event(self.name)
            .data(self.payload.to_string())
    }
}

/// Splices a `folder` key into a frame's JSON payload, matching the
/// `broadcastToSession` contract: every frame the hub fans out to a
/// session's subscribers carries the folder it belongs to, even though
/// `Snapshot`/`Delta` themselves have no notion of which folder they came
/// from (that's `bridge-session`'s key, not `bridge-state`'s).
fn inject_folder(payload: &mut Value, folder: &str) {
    if let Value::Object(map) = payload {
        map.insert("folder".to_string(), Value::String(folder.to_string()));
    }
}

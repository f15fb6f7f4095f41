//! A stand-in for the real Worker binary, used only by `tests/specs.rs`.
//!
//! Speaks just enough of the wire protocol (spec §6 "Worker wire protocol")
//! to drive the bridge through a turn: one `system`/`init` line on startup,
//! then for every stdin line read, a streamed text reply followed by a
//! `result` line — except for the sentinel prompt `trigger-api-error`,
//! which instead emits a lone `is_api_error_message` assistant line with no
//! following `result`, matching scenario F in spec §8.
//!
//! No dependency on any bridge crate or on serde: this only has to survive
//! the handful of shapes the tests below actually send it.

use std::io::{self, BufRead, Write};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let session_id = session_id_from_argv(&args).unwrap_or_else(|| "fake-session".to_string());

    let delay_ms: u64 = std::env::var("FAKE_WORKER_DELAY_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(150);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    emit(
        &mut out,
        &format!(
            r#"{{"type":"system","subtype":"init","model":"fake-model","session_id":"{session_id}","slash_commands":[]}}"#
        ),
    );

    let stdin = io::stdin();
    let mut turn = 0usize;
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }
        turn += 1;
        let text = extract_content_text(&line).unwrap_or_default();

        if text == "trigger-api-error" {
            emit_api_error(&mut out);
            continue;
        }

        std::thread::sleep(std::time::Duration::from_millis(delay_ms));
        emit_turn(&mut out, turn, &text);
    }
}

fn session_id_from_argv(args: &[String]) -> Option<String> {
    args.windows(2).find_map(|pair| {
        if pair[0] == "--resume" || pair[0] == "--session-id" {
            Some(pair[1].clone())
        } else {
            None
        }
    })
}

/// Best-effort extraction of `message.content` from a `{"type":"user",...}`
/// stdin line, when it's a plain string (the only shape these tests send).
fn extract_content_text(line: &str) -> Option<String> {
    let key = "\"content\":\"";
    let start = line.find(key)? + key.len();
    let rest = &line[start..];
    let mut end = 0;
    let mut escaped = false;
    for (i, c) in rest.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => {
                end = i;
                break;
            }
            _ => {}
        }
    }
    Some(rest[..end].to_string())
}

fn emit_turn(out: &mut impl Write, turn: usize, prompt_text: &str) {
    let reply = format!("Ack #{turn}: {prompt_text}");
    emit(out, r#"{"type":"stream_event","event":{"type":"message_start"}}"#);
    emit(
        out,
        r#"{"type":"stream_event","event":{"type":"content_block_start","index":0,"content_block":{"type":"text","text":""}}}"#,
    );
    emit(
        out,
        &format!(
            r#"{{"type":"stream_event","event":{{"type":"content_block_delta","index":0,"delta":{{"type":"text_delta","text":"{reply}"}}}}}}"#
        ),
    );
    emit(
        out,
        r#"{"type":"stream_event","event":{"type":"content_block_stop","index":0}}"#,
    );
    emit(
        out,
        &format!(
            r#"{{"type":"assistant","message":{{"id":"msg-{turn}","model":"fake-model","stop_reason":"end_turn","content":[{{"type":"text","text":"{reply}"}}],"usage":{{"input_tokens":1,"output_tokens":1,"cache_read_input_tokens":0,"cache_creation_input_tokens":0}}}}}}"#
        ),
    );
    emit(out, r#"{"type":"result","subtype":"success"}"#);
}

fn emit_api_error(out: &mut impl Write) {
    let text = r#"API Error: 400 {\"error\":{\"message\":\"Could not process image\"}}"#;
    emit(
        out,
        &format!(
            r#"{{"type":"assistant","message":{{"id":"msg-err","model":"fake-model","stop_reason":"end_turn","content":[{{"type":"text","text":"{text}"}}]}},"is_api_error_message":true}}"#
        ),
    );
}

fn emit(out: &mut impl Write, line: &str) {
    let _ = out.write_all(line.as_bytes());
    let _ = out.write_all(b"\n");
    let _ = out.flush();
}

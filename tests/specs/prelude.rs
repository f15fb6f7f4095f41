//! Test helpers for the bridge's behavioral specifications.
//!
//! Black-box: every test spawns the real `bridged` binary (and, standing in
//! for the real Worker, the `fake-worker` fixture binary from
//! `tests/fixtures/fake_worker.rs`) and drives it over HTTP/SSE exactly as a
//! client would.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::io::{BufRead, BufReader, Read};
use std::net::TcpStream;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

/// Returns the path to a binary built alongside the test harness, checking
/// llvm-cov's target directory first (matches the teacher's `binary_path`).
fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let llvm_cov_path = manifest_dir.join("target/llvm-cov-target/debug").join(name);
    if llvm_cov_path.exists() {
        return llvm_cov_path;
    }

    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }

    standard
}

fn bridged_binary() -> PathBuf {
    binary_path("bridged")
}

fn fake_worker_binary() -> PathBuf {
    binary_path("fake-worker")
}

/// Picks a free TCP port by binding to port 0 and immediately releasing it.
/// Racy in principle, fine in practice for a test suite that doesn't run
/// thousands of these concurrently.
fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// A running `bridged` instance, its scan root, and its state directory —
/// all torn down together when dropped.
pub struct Bridge {
    child: Option<Child>,
    port: u16,
    scan_root: tempfile::TempDir,
    state_dir: tempfile::TempDir,
    claude_config_dir: tempfile::TempDir,
}

impl Bridge {
    /// Starts a fresh bridge with an empty scan root and state directory.
    pub fn start() -> Self {
        let scan_root = tempfile::tempdir().unwrap();
        let state_dir = tempfile::tempdir().unwrap();
        let claude_config_dir = tempfile::tempdir().unwrap();
        Self::start_with_dirs(scan_root, state_dir, claude_config_dir, &[])
    }

    /// Starts a fresh bridge, passing extra environment variables through
    /// to both `bridged` and (since it inherits its own environment when
    /// spawning) the fake worker — e.g. `FAKE_WORKER_DELAY_MS`.
    pub fn start_with_env(extra_env: &[(&str, &str)]) -> Self {
        let scan_root = tempfile::tempdir().unwrap();
        let state_dir = tempfile::tempdir().unwrap();
        let claude_config_dir = tempfile::tempdir().unwrap();
        Self::start_with_dirs(scan_root, state_dir, claude_config_dir, extra_env)
    }

    /// Starts a bridge reusing a previous instance's directories — used by
    /// the restart scenario, where the state directory's `shutdown.json`
    /// must still be there for the new process to read.
    pub fn restart(previous: Bridge) -> Self {
        let Bridge {
            scan_root,
            state_dir,
            claude_config_dir,
            ..
        } = previous;
        Self::start_with_dirs(scan_root, state_dir, claude_config_dir, &[])
    }

    fn start_with_dirs(
        scan_root: tempfile::TempDir,
        state_dir: tempfile::TempDir,
        claude_config_dir: tempfile::TempDir,
        extra_env: &[(&str, &str)],
    ) -> Self {
        let port = free_port();
        let mut cmd = Command::new(bridged_binary());
        cmd.env("BRIDGE_PORT", port.to_string())
            .env("SCAN_ROOT", scan_root.path())
            .env("BRIDGE_STATE_DIR", state_dir.path())
            .env("BRIDGE_WORKER_PROGRAM", fake_worker_binary())
            .env("CLAUDE_CONFIG_DIR", claude_config_dir.path())
            .env("LOG_LEVEL", "error")
            .env_remove("LOG_FILE")
            .env_remove("TAILSCALE_HOSTNAME")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (key, value) in extra_env {
            cmd.env(key, value);
        }

        let mut child = cmd.spawn().expect("bridged should spawn");

        let stdout = child.stdout.take().expect("piped stdout");
        wait_for_ready(stdout);

        let bridge = Bridge {
            child: Some(child),
            port,
            scan_root,
            state_dir,
            claude_config_dir,
        };
        assert!(
            wait_for(2_000, || bridge.get("/status").is_ok()),
            "bridge did not become reachable on port {port}"
        );
        bridge
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn folder_path(&self, name: &str) -> PathBuf {
        let path = self.scan_root.path().join(name);
        std::fs::create_dir_all(&path).unwrap();
        path
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{path}", self.port)
    }

    pub fn get(&self, path: &str) -> reqwest::Result<reqwest::blocking::Response> {
        reqwest::blocking::get(self.url(path))
    }

    pub fn post_json(&self, path: &str, body: serde_json::Value) -> reqwest::blocking::Response {
        reqwest::blocking::Client::new()
            .post(self.url(path))
            .json(&body)
            .send()
            .expect("request should complete")
    }

    /// Sends SIGTERM and waits for the process to exit, simulating a
    /// graceful shutdown without giving up the scan root / state dir so a
    /// follow-up `Bridge::restart` can reuse them.
    pub fn sigterm_and_wait(&mut self) {
        let pid = self.child.as_ref().unwrap().id();
        let _ = Command::new("kill")
            .args(["-TERM", &pid.to_string()])
            .status();
        if let Some(mut child) = self.child.take() {
            let _ = child.wait();
        }
    }

    /// Writes a fake Worker journal record for `folder`/`session_id`, with
    /// its mtime `age_ms_ago` milliseconds before now — mirrors the on-disk
    /// layout `bridge_session::journal_path` expects:
    /// `<claude_config_dir>/projects/<mangled-folder>/<session_id>.jsonl`.
    pub fn write_journal(&self, folder: &Path, session_id: &str, age_ms_ago: u64) {
        let dir = self.project_dir(folder);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{session_id}.jsonl"));
        std::fs::write(&path, b"{}\n").unwrap();
        set_mtime_ago(&path, age_ms_ago);
    }

    /// Writes a fake handoff file pointing at `session_id`, with its mtime
    /// `age_ms_ago` milliseconds before now.
    pub fn write_handoff(&self, folder: &Path, session_id: &str, age_ms_ago: u64) {
        let dir = self.project_dir(folder);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{session_id}.handoff.json"));
        std::fs::write(&path, format!(r#"{{"sessionId":"{session_id}"}}"#)).unwrap();
        set_mtime_ago(&path, age_ms_ago);
    }

    /// The directory the bridge's Worker would journal `folder` under,
    /// replicating `bridge_session::journal_path::project_dir_name`'s
    /// canonicalize-and-mangle logic (that function is crate-private and
    /// unreachable from here).
    fn project_dir(&self, folder: &Path) -> PathBuf {
        let canonical = std::fs::canonicalize(folder).unwrap_or_else(|_| folder.to_path_buf());
        let mangled = canonical.to_string_lossy().replace(['/', '.'], "-");
        self.claude_config_dir.path().join("projects").join(mangled)
    }

    /// Opens a raw SSE connection and returns a reader positioned right
    /// after the HTTP response headers — frames can be pulled off with
    /// [`SseReader::next_frame`].
    pub fn connect_events(&self, client_id: &str) -> SseReader {
        let stream =
            TcpStream::connect(("127.0.0.1", self.port)).expect("SSE connection should open");
        stream.set_read_timeout(Some(Duration::from_millis(500))).unwrap();
        let mut write_side = stream.try_clone().unwrap();
        let request = format!(
            "GET /events?clientId={client_id} HTTP/1.1\r\nHost: 127.0.0.1\r\nConnection: keep-alive\r\n\r\n"
        );
        use std::io::Write;
        write_side.write_all(request.as_bytes()).unwrap();

        let mut reader = BufReader::new(stream);
        // Drain the HTTP status line and headers.
        loop {
            let mut header_line = String::new();
            reader.read_line(&mut header_line).unwrap();
            if header_line == "\r\n" || header_line.is_empty() {
                break;
            }
        }
        SseReader { reader }
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Blocks until `bridged` prints its `READY` line on stdout (or the pipe
/// closes), draining the rest of stdout on a background thread afterward so
/// the child never blocks on a full pipe buffer.
fn wait_for_ready(stdout: impl Read + Send + 'static) {
    let mut reader = BufReader::new(stdout);
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) if line.trim() == "READY" => break,
            Ok(_) => continue,
            Err(_) => break,
        }
    }
    std::thread::spawn(move || {
        let mut sink = [0u8; 4096];
        while reader.read(&mut sink).unwrap_or(0) > 0 {}
    });
}

/// Backdates a file's mtime by `age_ms_ago` milliseconds, for fixtures that
/// need to simulate a journal or handoff written some time in the past.
fn set_mtime_ago(path: &Path, age_ms_ago: u64) {
    let target = std::time::SystemTime::now() - Duration::from_millis(age_ms_ago);
    let file = std::fs::File::options().write(true).open(path).unwrap();
    file.set_modified(target).unwrap();
}

/// Polls `condition` until it returns true or `timeout_ms` elapses.
pub fn wait_for<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = Instant::now();
    let timeout = Duration::from_millis(timeout_ms);
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    false
}

/// One parsed `event: <name>\ndata: <json>` SSE frame.
pub struct Frame {
    pub name: String,
    pub data: serde_json::Value,
}

pub struct SseReader {
    reader: BufReader<TcpStream>,
}

impl SseReader {
    /// Reads frames until one matching `name` is found (or the read
    /// times out), skipping any others — `ping` keep-alives in particular.
    pub fn next_frame_named(&mut self, name: &str, timeout_ms: u64) -> Option<Frame> {
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        while Instant::now() < deadline {
            let Some(frame) = self.next_frame() else {
                continue;
            };
            if frame.name == name {
                return Some(frame);
            }
        }
        None
    }

    fn next_frame(&mut self) -> Option<Frame> {
        let mut event_name = None;
        let mut data = None;
        loop {
            let mut line = String::new();
            match self.reader.read_line(&mut line) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(_) => return None,
            }
            let line = line.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                break;
            }
            if let Some(rest) = line.strip_prefix("event: ") {
                event_name = Some(rest.to_string());
            } else if let Some(rest) = line.strip_prefix("data: ") {
                data = Some(serde_json::from_str(rest).unwrap_or(serde_json::Value::Null));
            }
        }
        Some(Frame {
            name: event_name?,
            data: data.unwrap_or(serde_json::Value::Null),
        })
    }
}

use serial_test::serial;

use super::*;

fn clear_all() {
    for key in [
        "BRIDGE_PORT",
        "GRACE_MS",
        "SCAN_ROOT",
        "TAILSCALE_HOSTNAME",
        "LOG_LEVEL",
        "LOG_FILE",
        "BRIDGE_STATE_DIR",
        "XDG_STATE_HOME",
        "BRIDGE_WORKER_PROGRAM",
        "BRIDGE_OUTRIDER_NUDGE",
        "BRIDGE_MCP_CONFIG",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn load_applies_defaults_when_unset() {
    clear_all();
    std::env::set_var("HOME", "/home/tester");

    let config = Config::load().expect("HOME is set");
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.grace_ms, Duration::from_millis(DEFAULT_GRACE_MS));
    assert_eq!(config.state_dir, PathBuf::from("/home/tester/.local/state/bridge"));
    assert_eq!(config.worker_program, "claude");
    assert!(!config.outrider_nudge_enabled);
    assert!(config.tailscale_hostname.is_none());
    assert!(config.mcp_config.is_none());
}

#[test]
#[serial]
fn load_prefers_bridge_state_dir_over_xdg_and_home() {
    clear_all();
    std::env::set_var("HOME", "/home/tester");
    std::env::set_var("XDG_STATE_HOME", "/xdg/state");
    std::env::set_var("BRIDGE_STATE_DIR", "/explicit/state");

    let config = Config::load().expect("state dir resolvable");
    assert_eq!(config.state_dir, PathBuf::from("/explicit/state"));
}

#[test]
#[serial]
fn load_prefers_xdg_state_home_over_home() {
    clear_all();
    std::env::set_var("HOME", "/home/tester");
    std::env::set_var("XDG_STATE_HOME", "/xdg/state");

    let config = Config::load().expect("state dir resolvable");
    assert_eq!(config.state_dir, PathBuf::from("/xdg/state/bridge"));
}

#[test]
#[serial]
fn load_parses_overrides() {
    clear_all();
    std::env::set_var("HOME", "/home/tester");
    std::env::set_var("BRIDGE_PORT", "4242");
    std::env::set_var("GRACE_MS", "60000");
    std::env::set_var("TAILSCALE_HOSTNAME", "my-host.ts.net");
    std::env::set_var("LOG_LEVEL", "debug");
    std::env::set_var("BRIDGE_OUTRIDER_NUDGE", "true");

    let config = Config::load().expect("state dir resolvable");
    assert_eq!(config.port, 4242);
    assert_eq!(config.grace_ms, Duration::from_millis(60_000));
    assert_eq!(config.tailscale_hostname.as_deref(), Some("my-host.ts.net"));
    assert_eq!(config.log_level, "debug");
    assert!(config.outrider_nudge_enabled);
}

#[test]
#[serial]
fn load_fails_without_any_state_dir_signal() {
    clear_all();
    std::env::remove_var("HOME");

    assert!(matches!(Config::load(), Err(ConfigError::NoStateDir)));
}

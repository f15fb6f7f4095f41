//! Behavioral specifications for the bridge daemon, run black-box against
//! the real compiled binary.

#[path = "specs/prelude.rs"]
mod prelude;

#[path = "specs/lobby.rs"]
mod lobby;
#[path = "specs/queue.rs"]
mod queue;
#[path = "specs/restart.rs"]
mod restart;
#[path = "specs/stale_handoff.rs"]
mod stale_handoff;
#[path = "specs/exit.rs"]
mod exit;
#[path = "specs/api_error.rs"]
mod api_error;

/// Log filter used when neither the config file nor `RUST_LOG` sets one
pub const DEFAULT_LOG_FILTER: &str = "info";
/// Role names used in selection diagnostics and `AmbiguousCandidates` errors
pub const STATE_MACHINE_ROLE: &str = "state machine";
pub const SYNCER_ROLE: &str = "syncer";
pub const ACTION_SYNCER_ROLE: &str = "action syncer";

//! Error kinds for the nurse rostering core (spec §7).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScheduleError>;

/// One variant per §7 error kind. `Display` messages are meant for logs and
/// CLI/HTTP collaborators to surface, not for the core itself to parse.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("unresolved identifier '{id}' in {namespace} namespace")]
    UnresolvedIdentifier { namespace: &'static str, id: String },

    #[error("malformed date literal '{literal}': {reason}")]
    MalformedDate { literal: String, reason: String },

    #[error("unsupported expression '{0}'")]
    UnsupportedExpression(String),

    /// Named per spec §7 for completeness; `schedule()` never raises this.
    /// A solver non-success is reported as `Ok(Assignment)` with `table` and
    /// `score` `None` and `status` set to the terminal status string (§7
    /// "Propagation policy").
    #[error("no solution: solver returned status {status}")]
    InfeasibleOrUnknown { status: String },

    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

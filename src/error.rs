//! Error kinds for the simulation kernel (spec §7).

use thiserror::Error;

/// Errors that the core can report.
///
/// `Format` and `Dependency` are surfaced synchronously from registration
/// methods. `Stale`, `Empty`, and `Negative` are invariant violations:
/// callers that build on top of this crate should treat them as bugs, not
/// as conditions to recover from.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// Malformed input encountered while registering entities.
    #[error("format error: {0}")]
    Format(String),

    /// A reference to an undefined entity was used at registration time.
    #[error("undefined dependency: {0}")]
    Dependency(String),

    /// A rate was picked before the rate manager drained the validity queue.
    #[error("rate picked while stale")]
    Stale,

    /// A weighted pick was attempted over a distribution whose total is zero.
    #[error("empty distribution")]
    Empty,

    /// A sequence-occupancy operation's interval falls outside a partial strand.
    #[error("interval outside synthesized strand")]
    OutOfStrand,

    /// The total rate is zero and no further scheduled event remains.
    #[error("no reaction left to fire")]
    NoReaction,

    /// A rate container was asked to store a negative rate.
    #[error("negative rate")]
    Negative,
}

pub type Result<T> = std::result::Result<T, SimError>;

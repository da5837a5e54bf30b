//! Error taxonomy for the agent.
//!
//! Only configuration failures and transport/initial-connect failures are
//! terminal for the process; everything else is confined to a single job's
//! `complete` message (see `job::run_job`).

use thiserror::Error;

/// Top-level error categories the supervisor distinguishes when choosing an
/// exit code. Job-local failures (encoder non-zero exit, upload exhaustion,
/// timeout) never produce this type — they are folded into `success: false`
/// on the job's `complete` message instead.
#[derive(Debug, Error)]
pub enum AgentError {
    /// An environment variable could not be parsed into its target type.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The initial WebSocket handshake with the controller failed.
    #[error("failed to connect to controller: {0}")]
    InitialConnect(#[from] tokio_tungstenite::tungstenite::Error),

    /// The session terminated after having been established (transport
    /// error or clean close initiated by the controller).
    #[error("controller session terminated: {0}")]
    Transport(String),
}

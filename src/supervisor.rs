//! Agent supervisor (AS).
//!
//! Top-level lifecycle: build shared state, run the session to completion,
//! join any jobs still in flight, and return. The exit code the binary
//! reports is derived purely from whether the *initial* connection
//! succeeded — everything after that is graceful from the process's point
//! of view, even if the session later dropped due to a transport error.

use std::sync::Arc;

use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::queue::OutboundQueue;
use crate::session;
use crate::state::AgentState;

/// Runs one agent process lifetime. Returns `Ok(())` on graceful shutdown
/// or `Err(AgentError)` if the initial connection to the controller never
/// succeeded.
pub async fn run(config: AgentConfig) -> Result<(), AgentError> {
    let (outbound, outbound_rx) = OutboundQueue::channel();
    let state = AgentState::new(config, outbound);

    tracing::info!(agent_id = %state.agent_id, concurrency = state.config.concurrency(), "agent starting");

    let result = session::run(state.clone(), outbound_rx).await;

    state.join_all_jobs().await;

    match &result {
        Ok(()) => tracing::info!("agent shut down"),
        Err(err) => tracing::error!(%err, "agent terminated with an error"),
    }

    result
}

//! Message router (MR).
//!
//! Interprets one inbound WebSocket text frame. Everything that isn't a
//! well-formed, admissible `lease` is dropped silently — the controller
//! gets no negative acknowledgment, only the absence of `lease-accepted`.

use std::sync::Arc;

use crate::job;
use crate::messages::{InboundMessage, LeaseAcceptedPayload, OutboundMessage};
use crate::state::AgentState;

/// Parses and dispatches one inbound text frame.
pub async fn handle_inbound(state: &Arc<AgentState>, text: &str) {
    let message: InboundMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(err) => {
            tracing::debug!(%err, "dropped unparseable inbound message");
            return;
        }
    };

    match message {
        InboundMessage::Lease { payload } => handle_lease(state, payload).await,
        InboundMessage::Other => {
            tracing::debug!("dropped message with unknown type");
        }
    }
}

async fn handle_lease(state: &Arc<AgentState>, raw: crate::messages::LeaseRaw) {
    let Some(lease) = raw.validate() else {
        tracing::debug!("dropped lease message with missing or malformed fields");
        return;
    };

    if !state.try_admit_job() {
        tracing::debug!(job_id = %lease.job_id, active_jobs = state.active_jobs(), "admission refused: at concurrency limit");
        return;
    }

    state.outbound.enqueue(&OutboundMessage::LeaseAccepted {
        payload: LeaseAcceptedPayload {
            agent_id: state.agent_id.clone(),
            job_id: lease.job_id.clone(),
        },
    });

    let job_id = lease.job_id.clone();
    let task_state = state.clone();
    let handle = tokio::spawn(async move {
        job::run_job(task_state, lease).await;
    });
    tracing::info!(job_id, "lease accepted, job spawned");
    state.track_job(handle).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentConfig;
    use crate::queue::OutboundQueue;
    use std::path::PathBuf;

    fn test_config(concurrency: usize) -> AgentConfig {
        AgentConfig {
            controller_url: "http://localhost:4000".into(),
            agent_token: "dev-token".into(),
            ffmpeg_path: "ffmpeg".into(),
            concurrency,
            hostname: "box".into(),
            job_timeout_secs: 1800,
            upload_max_retries: 3,
            request_connect_timeout_secs: 10,
            request_timeout_secs: 900,
            heartbeat_interval_secs: 10,
            tmp_dir: PathBuf::from("/tmp"),
        }
    }

    #[tokio::test]
    async fn admission_refusal_drops_lease_silently() {
        let (omq, mut rx) = OutboundQueue::channel();
        let state = AgentState::new(test_config(1), omq);
        state.try_admit_job();

        let text = r#"{"type":"lease","payload":{"jobId":"J2","inputUrl":"u","outputUrl":"o","ffmpegArgs":[]}}"#;
        handle_inbound(&state, text).await;

        assert!(rx.try_recv().is_err());
        assert_eq!(state.active_jobs(), 1);
    }

    #[tokio::test]
    async fn malformed_lease_is_dropped() {
        let (omq, mut rx) = OutboundQueue::channel();
        let state = AgentState::new(test_config(4), omq);

        let text = r#"{"type":"lease","payload":{"jobId":"J","inputUrl":"u"}}"#;
        handle_inbound(&state, text).await;

        assert!(rx.try_recv().is_err());
        assert_eq!(state.active_jobs(), 0);
    }

    #[tokio::test]
    async fn unknown_message_type_is_dropped() {
        let (omq, mut rx) = OutboundQueue::channel();
        let state = AgentState::new(test_config(4), omq);

        handle_inbound(&state, r#"{"type":"ping"}"#).await;

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn unparseable_json_is_dropped() {
        let (omq, mut rx) = OutboundQueue::channel();
        let state = AgentState::new(test_config(4), omq);

        handle_inbound(&state, "not json at all").await;

        assert!(rx.try_recv().is_err());
    }
}

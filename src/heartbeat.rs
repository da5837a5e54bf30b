//! Heartbeat ticker (HT).
//!
//! Sampling is best-effort: any metric this fails to read is reported as
//! zero rather than stalling or failing the heartbeat altogether. Invoked
//! by the session's event pump on its own timer, so heartbeats are only
//! ever sent while a session is open.

use std::sync::Arc;

use sysinfo::System;

use crate::messages::{HeartbeatPayload, OutboundMessage};
use crate::state::AgentState;

/// Holds the `sysinfo` handle so repeated refreshes reuse its internal
/// buffers instead of re-enumerating the system on every tick.
pub struct HeartbeatSampler {
    system: System,
}

impl HeartbeatSampler {
    pub fn new() -> Self {
        Self {
            system: System::new_all(),
        }
    }

    /// Returns `(1-minute load average, memory used, memory total)` in
    /// bytes, refreshing the underlying system snapshot first.
    fn sample(&mut self) -> (f64, u64, u64) {
        self.system.refresh_memory();
        let load = System::load_average();
        (load.one, self.system.used_memory(), self.system.total_memory())
    }
}

impl Default for HeartbeatSampler {
    fn default() -> Self {
        Self::new()
    }
}

/// Samples current metrics and enqueues one `heartbeat` message.
pub fn tick(state: &Arc<AgentState>, sampler: &mut HeartbeatSampler) {
    let (cpu, mem_used, mem_total) = sampler.sample();
    state.outbound.enqueue(&OutboundMessage::Heartbeat {
        payload: HeartbeatPayload {
            id: state.agent_id.clone(),
            active_jobs: state.active_jobs(),
            cpu,
            mem_used,
            mem_total,
        },
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentConfig;
    use crate::queue::OutboundQueue;
    use std::path::PathBuf;

    fn test_config() -> AgentConfig {
        AgentConfig {
            controller_url: "http://localhost:4000".into(),
            agent_token: "dev-token".into(),
            ffmpeg_path: "ffmpeg".into(),
            concurrency: 4,
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
    async fn tick_enqueues_one_heartbeat_with_current_agent_id() {
        let (omq, mut rx) = OutboundQueue::channel();
        let state = AgentState::new(test_config(), omq);
        let mut sampler = HeartbeatSampler::new();

        tick(&state, &mut sampler);

        let text = rx.try_recv().expect("heartbeat enqueued");
        assert!(text.contains(r#""type":"heartbeat""#));
        assert!(text.contains(&state.agent_id));
        assert!(rx.try_recv().is_err());
    }
}

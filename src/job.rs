//! Job executor (JX).
//!
//! One `run_job` call is the entire lifecycle of an accepted lease: build
//! the argument vector, launch the encoder tool, pump its progress stream
//! into the outbound queue, upload the artifact on success, and emit
//! exactly one `complete` message. Spawned as its own task by the router;
//! never awaited by the session, so failures here must never panic across
//! the task boundary — they become `complete{success:false}` instead.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::ChildStdout;

use crate::messages::{CompletePayload, LeasePayload, OutboundMessage, ProgressPayload};
use crate::progress::ProgressParser;
use crate::queue::OutboundQueue;
use crate::state::AgentState;
use crate::subprocess;
use crate::upload;

const DEFAULT_OUTPUT_EXT: &str = ".out";

/// Runs one lease to completion. Always decrements `active_jobs` exactly
/// once, regardless of outcome.
pub async fn run_job(state: Arc<AgentState>, lease: LeasePayload) {
    let success = execute(&state, &lease).await;
    state.outbound.enqueue(&OutboundMessage::Complete {
        payload: CompletePayload {
            job_id: lease.job_id.clone(),
            agent_id: state.agent_id.clone(),
            success,
        },
    });
    state.release_job();
}

async fn execute(state: &Arc<AgentState>, lease: &LeasePayload) -> bool {
    let output_ext = lease
        .output_ext
        .clone()
        .unwrap_or_else(|| DEFAULT_OUTPUT_EXT.to_string());
    let tmp_dir = state.config.tmp_dir.join("ffmpegeasy");
    if let Err(err) = tokio::fs::create_dir_all(&tmp_dir).await {
        tracing::error!(job_id = %lease.job_id, %err, "failed to create temp directory");
        return false;
    }
    let tmp_out = tmp_dir.join(format!("{}{}", lease.job_id, output_ext));

    let success = run_encoder_and_upload(state, lease, &tmp_out).await;

    if let Err(err) = tokio::fs::remove_file(&tmp_out).await {
        if err.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(job_id = %lease.job_id, path = %tmp_out.display(), %err, "failed to remove temp output file");
        }
    }

    success
}

async fn run_encoder_and_upload(
    state: &Arc<AgentState>,
    lease: &LeasePayload,
    tmp_out: &std::path::Path,
) -> bool {
    let mut args = Vec::with_capacity(lease.ffmpeg_args.len() + 3);
    args.push("-i".to_string());
    args.push(lease.input_url.clone());
    args.extend(lease.ffmpeg_args.iter().cloned());
    args.push(tmp_out.to_string_lossy().into_owned());

    let spawned = match subprocess::spawn(&state.config.ffmpeg_path, &args) {
        Ok(spawned) => spawned,
        Err(err) => {
            tracing::error!(job_id = %lease.job_id, %err, "failed to spawn encoder tool");
            return false;
        }
    };

    let pump = tokio::spawn(pump_progress(
        spawned.stdout,
        lease.job_id.clone(),
        state.outbound.clone(),
    ));

    let timeout = Duration::from_secs(state.config.job_timeout_secs);
    let outcome = subprocess::wait_with_timeout(spawned.child, timeout).await;
    let _ = pump.await;

    let child_ok = match &outcome {
        Ok(outcome) => outcome.is_success(),
        Err(err) => {
            tracing::error!(job_id = %lease.job_id, %err, "failed to wait on encoder tool");
            false
        }
    };

    if !child_ok {
        tracing::warn!(job_id = %lease.job_id, "encoder tool did not exit successfully");
        return false;
    }

    let uploaded = upload::upload(
        &lease.output_url,
        tmp_out,
        Duration::from_secs(state.config.request_connect_timeout_secs),
        Duration::from_secs(state.config.request_timeout_secs),
        state.config.upload_max_retries,
    )
    .await;

    if !uploaded {
        tracing::warn!(job_id = %lease.job_id, "artifact upload failed after all retries");
    }

    uploaded
}

/// Reads the child's stdout line by line, forwarding each flushed snapshot
/// as a `progress` message. Returns once the pipe hits EOF or a read error.
async fn pump_progress(stdout: ChildStdout, job_id: String, outbound: OutboundQueue) {
    let mut lines = BufReader::new(stdout).lines();
    let mut parser = ProgressParser::new();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if let Some(data) = parser.feed_line(&line) {
                    outbound.enqueue(&OutboundMessage::Progress {
                        payload: ProgressPayload {
                            job_id: job_id.clone(),
                            data,
                        },
                    });
                }
            }
            Ok(None) => break,
            Err(err) => {
                tracing::warn!(job_id, %err, "error reading encoder stdout");
                break;
            }
        }
    }
}

//! Controller session (CS).
//!
//! Owns the single WebSocket connection to the controller. Registration
//! happens immediately on connect; after that the session is a plain pump
//! between the socket and the rest of the agent — inbound text frames go
//! to the router, outbound queue entries go to the socket, and a periodic
//! tick drives the heartbeat. All WebSocket I/O happens on this one task;
//! every other component reaches it only through `AgentState::outbound`.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use crate::encoders;
use crate::error::AgentError;
use crate::heartbeat::{self, HeartbeatSampler};
use crate::messages::{OutboundMessage, RegisterPayload};
use crate::router;
use crate::state::AgentState;
use crate::url_util;

/// Connects to the controller, registers, and runs the session until the
/// connection closes or fails. Returns `Ok(())` for any termination after
/// a successful connect (including transport errors mid-session, which are
/// logged and reflected in `AgentState::should_exit` rather than returned
/// as an error) — only a failed *initial* connection is an `Err`, so the
/// supervisor can tell the two apart for its exit code.
pub async fn run(
    state: Arc<AgentState>,
    mut outbound_rx: mpsc::UnboundedReceiver<String>,
) -> Result<(), AgentError> {
    let url = url_util::session_url(&state.config.controller_url, &state.config.agent_token);
    tracing::info!(url = %redact_token(&url), "connecting to controller");

    let (ws_stream, _response) = tokio_tungstenite::connect_async(&url).await?;
    let (mut sink, mut stream) = ws_stream.split();

    let encoders = encoders::probe_encoders(&state.config.ffmpeg_path).await;
    let register = OutboundMessage::Register {
        payload: RegisterPayload {
            id: state.agent_id.clone(),
            name: state.agent_id.clone(),
            concurrency: state.config.concurrency(),
            encoders,
            token: state.config.agent_token.clone(),
        },
    };
    if let Err(err) = sink.send(Message::Text(register.to_json().into())).await {
        return Err(AgentError::Transport(err.to_string()));
    }
    tracing::info!(agent_id = %state.agent_id, "registered with controller");

    let mut sampler = HeartbeatSampler::new();
    let mut heartbeat_ticker =
        tokio::time::interval(Duration::from_secs(state.config.heartbeat_interval_secs));
    heartbeat_ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    heartbeat_ticker.tick().await; // first tick fires immediately; consume it without sending

    loop {
        tokio::select! {
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        router::handle_inbound(&state, &text).await;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::info!("controller closed the session");
                        break;
                    }
                    Some(Ok(_)) => {
                        // Ping/pong/binary frames carry no application meaning here.
                    }
                    Some(Err(err)) => {
                        tracing::error!(%err, "transport error while reading");
                        break;
                    }
                }
            }
            outbound = outbound_rx.recv() => {
                match outbound {
                    Some(text) => {
                        if let Err(err) = sink.send(Message::Text(text.into())).await {
                            tracing::error!(%err, "transport error while writing");
                            break;
                        }
                    }
                    None => {
                        tracing::error!("outbound queue producer dropped unexpectedly");
                        break;
                    }
                }
            }
            _ = heartbeat_ticker.tick() => {
                heartbeat::tick(&state, &mut sampler);
            }
        }
    }

    state.set_should_exit();
    Ok(())
}

/// Redacts the token query parameter before logging a session URL.
fn redact_token(url: &str) -> String {
    match url.split_once("token=") {
        Some((prefix, _)) => format!("{prefix}token=<redacted>"),
        None => url.to_string(),
    }
}

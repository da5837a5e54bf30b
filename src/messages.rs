//! Wire message types exchanged with the controller.
//!
//! Outbound messages are tagged enums serialized as compact JSON, one per
//! WebSocket text frame. Inbound messages are parsed loosely: an unknown
//! `type` or a malformed payload is dropped by the router rather than
//! rejected with a negative acknowledgment (see `router::handle_inbound`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Payload of an inbound `lease` message, after validation.
#[derive(Debug, Clone)]
pub struct LeasePayload {
    pub job_id: String,
    pub input_url: String,
    pub output_url: String,
    pub output_ext: Option<String>,
    pub ffmpeg_args: Vec<String>,
}

/// An inbound control message, discriminated by its `type` field. Only
/// `lease` carries semantics today; any other `type` string is parsed into
/// `Other` and dropped by the router.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum InboundMessage {
    Lease { payload: LeaseRaw },
    #[serde(other)]
    Other,
}

/// Raw `lease` payload as received, before required-field validation.
/// `outputExt` defaults to `.out` and `ffmpegArgs` must be an array of
/// strings; both checks happen in `router::handle_inbound` because serde
/// can't express "array of strings or drop the message" as a parse failure
/// without losing the rest of a structurally valid message.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaseRaw {
    pub job_id: Option<String>,
    pub input_url: Option<String>,
    pub output_url: Option<String>,
    #[serde(default)]
    pub output_ext: Option<String>,
    #[serde(default)]
    pub ffmpeg_args: Option<Vec<String>>,
}

impl LeaseRaw {
    /// Validates the raw payload into a `LeasePayload`, or `None` if any
    /// required field is missing.
    pub fn validate(self) -> Option<LeasePayload> {
        Some(LeasePayload {
            job_id: self.job_id?,
            input_url: self.input_url?,
            output_url: self.output_url?,
            output_ext: self.output_ext,
            ffmpeg_args: self.ffmpeg_args?,
        })
    }
}

/// An outbound message, one per WebSocket text frame.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum OutboundMessage {
    Register {
        payload: RegisterPayload,
    },
    LeaseAccepted {
        payload: LeaseAcceptedPayload,
    },
    Progress {
        payload: ProgressPayload,
    },
    Complete {
        payload: CompletePayload,
    },
    Heartbeat {
        payload: HeartbeatPayload,
    },
}

impl OutboundMessage {
    /// Serializes this message to compact JSON for enqueueing.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("outbound message types are always serializable")
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    pub id: String,
    pub name: String,
    pub concurrency: usize,
    pub encoders: Vec<String>,
    pub token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaseAcceptedPayload {
    pub agent_id: String,
    pub job_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressPayload {
    pub job_id: String,
    pub data: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletePayload {
    pub job_id: String,
    pub agent_id: String,
    pub success: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatPayload {
    pub id: String,
    pub active_jobs: usize,
    pub cpu: f64,
    pub mem_used: u64,
    pub mem_total: u64,
}

//! Worker agent for a distributed media-transcoding fleet: registers with
//! a controller over WebSocket, accepts bounded concurrent leases, runs an
//! external encoder tool, streams progress, uploads the produced artifact,
//! and reports completion.
//!
//! See `supervisor::run` for the top-level lifecycle.

pub mod config;
pub mod encoders;
pub mod error;
pub mod heartbeat;
pub mod job;
pub mod messages;
pub mod progress;
pub mod queue;
pub mod router;
pub mod session;
pub mod state;
pub mod subprocess;
pub mod supervisor;
pub mod upload;
pub mod url_util;

//! Outbound message queue (OMQ).
//!
//! The distilled design calls for a thread-safe FIFO whose `enqueue` also
//! signals the session to request a writable turn. An unbounded MPSC
//! channel satisfies that contract directly: `Sender::send` never blocks
//! (the "signal" is simply a value becoming available), and `Receiver::recv`
//! delivers values in send order with a single consumer. No manual
//! mutex-guarded linked list is needed.

use tokio::sync::mpsc;

use crate::messages::OutboundMessage;

/// The producer half, cheaply cloned and handed to every component that
/// needs to emit control-plane messages (router, job executor, heartbeat
/// ticker, session itself for `register`).
#[derive(Clone)]
pub struct OutboundQueue {
    tx: mpsc::UnboundedSender<String>,
}

impl OutboundQueue {
    /// Creates a connected producer/consumer pair.
    pub fn channel() -> (OutboundQueue, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (OutboundQueue { tx }, rx)
    }

    /// Serializes and enqueues a message. Ownership of the serialized text
    /// is transferred to the channel; the session writer consumes it
    /// exactly once. Silently dropped if the session's reader half has
    /// already been torn down (no session to drain into).
    pub fn enqueue(&self, message: &OutboundMessage) {
        let _ = self.tx.send(message.to_json());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{HeartbeatPayload, OutboundMessage};

    #[tokio::test]
    async fn preserves_fifo_order() {
        let (omq, mut rx) = OutboundQueue::channel();
        for i in 0..3 {
            omq.enqueue(&OutboundMessage::Heartbeat {
                payload: HeartbeatPayload {
                    id: format!("agent-{i}"),
                    active_jobs: 0,
                    cpu: 0.0,
                    mem_used: 0,
                    mem_total: 0,
                },
            });
        }
        for i in 0..3 {
            let text = rx.recv().await.expect("message present");
            assert!(text.contains(&format!("agent-{i}")));
        }
    }

    #[tokio::test]
    async fn enqueue_after_receiver_dropped_does_not_panic() {
        let (omq, rx) = OutboundQueue::channel();
        drop(rx);
        omq.enqueue(&OutboundMessage::Heartbeat {
            payload: HeartbeatPayload {
                id: "a".into(),
                active_jobs: 0,
                cpu: 0.0,
                mem_used: 0,
                mem_total: 0,
            },
        });
    }
}

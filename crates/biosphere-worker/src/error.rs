//! Worker and protocol error types.

use crate::protocol::RequestId;

/// Failures of the worker thread itself.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// The operating system refused to start the worker thread.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// The worker thread is gone; requests can no longer be delivered.
    #[error("worker thread has shut down")]
    Disconnected,
}

/// Failures moving a response between threads.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("failed to encode response {request_id}: {source}")]
    Encode {
        request_id: RequestId,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode response {request_id}: {source}")]
    Decode {
        request_id: RequestId,
        #[source]
        source: serde_json::Error,
    },

    /// A decoded response carried a different id than its envelope.
    #[error("response id {found} does not match envelope id {expected}")]
    MismatchedId { expected: RequestId, found: RequestId },
}

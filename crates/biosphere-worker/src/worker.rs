//! The computation unit: a thread that runs generation requests to completion.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::thread::JoinHandle;
use std::time::Instant;

use biosphere_mesh::{GenerationError, GenerationResult, MeshGenerator};
use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, error, warn};

use crate::config::WorkerConfig;
use crate::error::{ProtocolError, WorkerError};
use crate::protocol::{Payload, RequestId, TransferMode, WorkerRequest, WorkerResponse};

/// Executes requests and packages their responses for the configured transport.
pub struct Worker {
    generator: MeshGenerator,
    transfer: TransferMode,
}

impl Worker {
    pub fn new(config: &WorkerConfig) -> Self {
        Self {
            generator: MeshGenerator::new(config.max_detail),
            transfer: config.transfer,
        }
    }

    /// Run one request and return the payload to send back. Never panics on a
    /// generation failure.
    pub fn handle(&self, request: WorkerRequest) -> Payload {
        let WorkerRequest::Generate {
            request_id,
            options,
        } = request;

        let started = Instant::now();
        let response = run_guarded(request_id, || self.generator.generate(&options));
        debug!(
            request_id,
            ok = matches!(response, WorkerResponse::Result { .. }),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request finished"
        );
        self.package(response)
    }

    fn package(&self, response: WorkerResponse) -> Payload {
        match self.transfer {
            TransferMode::Owned => Payload::Transferred(response),
            TransferMode::Serialized => {
                let request_id = response.request_id();
                match serde_json::to_string(&response) {
                    Ok(json) => Payload::Serialized { request_id, json },
                    Err(source) => {
                        let err = ProtocolError::Encode { request_id, source };
                        warn!(%err, "sending error response instead");
                        Payload::Transferred(WorkerResponse::Error {
                            request_id,
                            message: err.to_string(),
                        })
                    }
                }
            }
        }
    }
}

/// Run `generate`, converting both returned errors and panics into an
/// [`WorkerResponse::Error`].
pub fn run_guarded<F>(request_id: RequestId, generate: F) -> WorkerResponse
where
    F: FnOnce() -> Result<GenerationResult, GenerationError>,
{
    match catch_unwind(AssertUnwindSafe(generate)) {
        Ok(Ok(result)) => WorkerResponse::from_result(request_id, result),
        Ok(Err(err)) => {
            warn!(request_id, %err, "generation failed");
            WorkerResponse::Error {
                request_id,
                message: err.to_string(),
            }
        }
        Err(panic) => {
            let message = format!("generation panicked: {}", panic_message(panic.as_ref()));
            error!(request_id, %message);
            WorkerResponse::Error {
                request_id,
                message,
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        return s;
    }
    if let Some(s) = panic.downcast_ref::<String>() {
        return s.as_str();
    }
    "unknown panic payload"
}

/// Spawn the worker thread. It exits when `requests` disconnects or nobody is
/// listening on `responses` anymore.
pub(crate) fn spawn(
    config: &WorkerConfig,
    requests: Receiver<WorkerRequest>,
    responses: Sender<Payload>,
) -> Result<JoinHandle<()>, WorkerError> {
    let worker = Worker::new(config);
    std::thread::Builder::new()
        .name(config.thread_name.clone())
        .spawn(move || {
            debug!("worker started");
            while let Ok(request) = requests.recv() {
                if responses.send(worker.handle(request)).is_err() {
                    warn!("response channel closed, stopping worker");
                    break;
                }
            }
            debug!("worker stopped");
        })
        .map_err(WorkerError::Spawn)
}

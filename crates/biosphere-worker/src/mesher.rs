//! The control-side orchestrator: issues requests, matches responses, fires callbacks.

use std::thread::JoinHandle;
use std::time::Duration;

use biosphere_mesh::GenerationRequest;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::config::WorkerConfig;
use crate::error::{ProtocolError, WorkerError};
use crate::fallback::fallback_mesh;
use crate::planet::PlanetMesh;
use crate::protocol::{Payload, RequestId, WorkerRequest, WorkerResponse};
use crate::worker;

type Callback = Box<dyn FnOnce(PlanetMesh) + Send>;

struct PendingRequest {
    options: GenerationRequest,
    callback: Callback,
}

/// Generates planet meshes on a dedicated worker thread.
///
/// [`request_mesh`](Self::request_mesh) queues work without blocking and
/// [`poll`](Self::poll) delivers finished meshes to their callbacks on the calling
/// thread. Failed requests still call back, with a low-detail fallback sphere.
pub struct PlanetMesher {
    config: WorkerConfig,
    next_id: RequestId,
    pending: FxHashMap<RequestId, PendingRequest>,
    /// `None` once shut down.
    requests: Option<Sender<WorkerRequest>>,
    responses: Receiver<Payload>,
    /// Responses produced locally, e.g. for requests the worker never received.
    backlog: Vec<Payload>,
    handle: Option<JoinHandle<()>>,
}

impl PlanetMesher {
    /// Spawn the worker thread.
    pub fn new(config: WorkerConfig) -> Result<Self, WorkerError> {
        let (request_tx, request_rx) = crossbeam_channel::unbounded();
        let (response_tx, response_rx) = crossbeam_channel::unbounded();
        let handle = worker::spawn(&config, request_rx, response_tx)?;
        debug!(thread = %config.thread_name, transfer = ?config.transfer, "planet mesher started");

        Ok(Self {
            config,
            next_id: 1,
            pending: FxHashMap::default(),
            requests: Some(request_tx),
            responses: response_rx,
            backlog: Vec::new(),
            handle: Some(handle),
        })
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Queue a generation request. `callback` runs exactly once, from a later
    /// [`poll`](Self::poll), with either the requested mesh or a fallback.
    pub fn request_mesh<F>(&mut self, options: GenerationRequest, callback: F) -> RequestId
    where
        F: FnOnce(PlanetMesh) + Send + 'static,
    {
        let request_id = self.next_id;
        self.next_id += 1;

        let message = WorkerRequest::Generate {
            request_id,
            options: options.clone(),
        };
        self.pending.insert(
            request_id,
            PendingRequest {
                options,
                callback: Box::new(callback),
            },
        );

        let sent = match &self.requests {
            Some(requests) => requests.send(message).is_ok(),
            None => false,
        };
        if sent {
            debug!(request_id, "mesh requested");
        } else {
            warn!(request_id, err = %WorkerError::Disconnected, "request not delivered");
            self.backlog.push(Payload::Transferred(WorkerResponse::Error {
                request_id,
                message: WorkerError::Disconnected.to_string(),
            }));
        }
        request_id
    }

    /// Deliver every response that is ready. Returns the number of callbacks run.
    pub fn poll(&mut self) -> usize {
        let mut fired = 0;
        for payload in std::mem::take(&mut self.backlog) {
            fired += usize::from(self.resolve(payload));
        }
        loop {
            match self.responses.try_recv() {
                Ok(payload) => fired += usize::from(self.resolve(payload)),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    fired += self.fail_all("worker thread exited");
                    break;
                }
            }
        }
        fired
    }

    /// Like [`poll`](Self::poll), but waits up to `timeout` for a response when
    /// none is ready and requests are outstanding.
    pub fn poll_timeout(&mut self, timeout: Duration) -> usize {
        let fired = self.poll();
        if fired > 0 || self.pending.is_empty() {
            return fired;
        }
        match self.responses.recv_timeout(timeout) {
            Ok(payload) => usize::from(self.resolve(payload)) + self.poll(),
            Err(RecvTimeoutError::Timeout) => 0,
            Err(RecvTimeoutError::Disconnected) => self.fail_all("worker thread exited"),
        }
    }

    /// Requests whose callback has not run yet.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Stop the worker after it finishes the queued requests, then deliver every
    /// outstanding callback. Later requests resolve to fallbacks.
    ///
    /// Safe to call repeatedly: each call also settles requests made since the last.
    pub fn shutdown(&mut self) {
        if let Some(requests) = self.requests.take() {
            drop(requests);
            if let Some(handle) = self.handle.take() {
                if handle.join().is_err() {
                    warn!("worker thread panicked");
                }
            }
            debug!("planet mesher stopped");
        }
        self.poll();
        self.fail_all("planet mesher shut down");
    }

    /// Match `payload` to its pending request and run the callback. Returns
    /// `false` if no request was waiting for it.
    fn resolve(&mut self, payload: Payload) -> bool {
        let request_id = payload.request_id();
        let Some(pending) = self.pending.remove(&request_id) else {
            warn!(request_id, "response for unknown request, dropping");
            return false;
        };

        let mesh = match decode(payload) {
            Ok(result) => PlanetMesh::from_result(request_id, &pending.options, result, false),
            Err(message) => {
                warn!(request_id, %message, "request failed, using fallback mesh");
                fallback_mesh(request_id, &pending.options, self.config.fallback_detail)
            }
        };
        debug!(
            request_id,
            faces = mesh.face_count(),
            fallback = mesh.fallback,
            "mesh delivered"
        );
        (pending.callback)(mesh);
        true
    }

    fn fail_all(&mut self, message: &str) -> usize {
        let mut ids: Vec<RequestId> = self.pending.keys().copied().collect();
        ids.sort_unstable();
        ids.into_iter()
            .map(|request_id| {
                self.resolve(Payload::Transferred(WorkerResponse::Error {
                    request_id,
                    message: message.to_string(),
                }))
            })
            .filter(|fired| *fired)
            .count()
    }
}

impl Drop for PlanetMesher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn decode(payload: Payload) -> Result<biosphere_mesh::GenerationResult, String> {
    let response = match payload {
        Payload::Transferred(response) => response,
        Payload::Serialized { request_id, json } => {
            let response: WorkerResponse = serde_json::from_str(&json)
                .map_err(|source| ProtocolError::Decode { request_id, source }.to_string())?;
            if response.request_id() != request_id {
                return Err(ProtocolError::MismatchedId {
                    expected: request_id,
                    found: response.request_id(),
                }
                .to_string());
            }
            response
        }
    };
    response.into_outcome()
}

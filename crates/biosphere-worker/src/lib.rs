//! Off-thread planet mesh generation with graceful degradation.
//!
//! A [`PlanetMesher`] owns one worker thread. Requests go out over a channel,
//! responses come back either by ownership or as JSON ([`TransferMode`]), and are
//! matched to their callbacks by [`RequestId`]. Any failure on the way (a
//! generation error, a panic, an undecodable payload, a dead worker) still ends
//! in a callback, with a low-detail fallback sphere.

mod config;
mod error;
mod fallback;
mod mesher;
mod planet;
mod protocol;
mod worker;

pub use config::WorkerConfig;
pub use error::{ProtocolError, WorkerError};
pub use fallback::{bare_sphere, fallback_detail, fallback_mesh};
pub use mesher::PlanetMesher;
pub use planet::PlanetMesh;
pub use protocol::{Payload, RequestId, ResultBuffers, TransferMode, WorkerRequest, WorkerResponse};
pub use worker::{Worker, run_guarded};

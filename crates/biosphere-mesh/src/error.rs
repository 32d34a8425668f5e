//! Mesh generation error types.

/// Failures that abort a generation request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    /// The requested subdivision level exceeds the generator's limit.
    #[error("detail {detail} exceeds the maximum of {max}")]
    DetailTooHigh { detail: u32, max: u32 },

    /// A NaN or infinite value reached the output buffers.
    #[error("non-finite values in {buffer} buffers")]
    NonFiniteGeometry { buffer: &'static str },
}

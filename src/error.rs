use thiserror::Error;

use crate::index::TrackId;

/// Rejected fingerprint configuration. Raised once, when a
/// [`Fingerprinter`](crate::Fingerprinter) is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("frame size must be greater than zero")]
    ZeroFrameSize,
    #[error("frame size {0} cannot be rounded to a supported power of two")]
    FrameSizeTooLarge(usize),
    #[error("hop size must be greater than zero")]
    ZeroHopSize,
    #[error("target sample rate must be greater than zero")]
    ZeroTargetRate,
    #[error("peaks-per-frame cap must be greater than zero")]
    ZeroPeakCap,
    #[error("pair fan-out must be greater than zero")]
    ZeroFanOut,
    #[error("minimum frame delta must be at least 1")]
    ZeroMinFrameDelta,
    #[error("minimum frame delta {min} exceeds maximum frame delta {max}")]
    FrameDeltaRange { min: usize, max: usize },
    #[error("maximum frame delta {0} does not fit in a hash token")]
    FrameDeltaTooLarge(usize),
}

#[derive(Debug, Error)]
pub enum RecognizerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("track {0} was never registered with the index")]
    UnknownTrack(TrackId),
    #[error("sample rate must be greater than zero")]
    InvalidSampleRate,
}

pub type Result<T, E = RecognizerError> = std::result::Result<T, E>;

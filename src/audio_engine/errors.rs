//! Audio-specific error types.

use thiserror::Error;

/// Errors raised by an audio output while opening, resuming or accepting cues.
#[derive(Debug, Error)]
pub enum OutputError {
    /// No default output device is available.
    #[error("no audio output device found")]
    NoDevice,

    /// The device did not report a default output configuration.
    #[error("no default output config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    /// Failed to build the output stream.
    #[error("failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    /// Failed to start or resume the output stream.
    #[error("failed to play output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    /// Failed to pause the output stream.
    #[error("failed to pause output stream: {0}")]
    PauseStream(#[from] cpal::PauseStreamError),

    /// The output has not been opened yet.
    #[error("audio output is not open")]
    NotOpen,

    /// The control ring buffer is full.
    #[error("audio message queue is full")]
    QueueFull,
}

/// Errors that abort a single cue without affecting the engine.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// Base frequency times pitch is not a usable oscillator frequency.
    #[error("invalid oscillator frequency: {0} Hz")]
    InvalidFrequency(f32),

    /// The filter stage could not be built.
    #[error("invalid filter: cutoff {cutoff_hz} Hz, Q {q}")]
    InvalidFilter {
        /// Requested cutoff frequency.
        cutoff_hz: f32,
        /// Requested resonance.
        q: f32,
    },

    /// Attack, decay and release do not fit into the sound's duration.
    #[error("envelope of {envelope_ms} ms exceeds duration of {duration_ms} ms")]
    EnvelopeOverrun {
        /// Attack + decay + release.
        envelope_ms: u64,
        /// Total sounding time.
        duration_ms: u32,
    },

    /// The output rejected the cue.
    #[error(transparent)]
    Output(#[from] OutputError),
}

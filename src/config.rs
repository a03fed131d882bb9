//! Engine construction parameters.

use crate::audio_engine::constants::{DEFAULT_BUFFER_FRAMES, DEFAULT_SETTINGS_KEY, MESSAGE_CAPACITY};

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Output buffer size requested from the device, in frames.
    pub buffer_frames: u32,

    /// Capacity of each control/audio ring buffer.
    pub message_capacity: usize,

    /// Start in `Suspended` and wait for an explicit resume, for hosts that
    /// only allow audio after a user gesture.
    pub start_suspended: bool,

    /// Backend key of the persisted settings record.
    pub settings_key: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            buffer_frames: DEFAULT_BUFFER_FRAMES,
            message_capacity: MESSAGE_CAPACITY,
            start_suspended: false,
            settings_key: DEFAULT_SETTINGS_KEY.to_string(),
        }
    }
}

impl EngineConfig {
    /// Configuration for hosts that gate audio output behind a user gesture.
    pub fn gesture_gated() -> Self {
        Self {
            start_suspended: true,
            ..Self::default()
        }
    }
}

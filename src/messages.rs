//! Message definitions for communication between the control thread and the audio thread.
//!
//! These enums are the wire format for messages passed through the lock-free ring
//! buffers between the engine owner and the real-time output callback.

use crate::audio_engine::voice::CueVoice;
use crate::catalog::SoundEvent;

/// Message that is emitted from the control side.
#[derive(Debug, Clone)]
pub enum ControlMessage {
    /// Used for testing message passing functionality.
    Ping(),

    /// Start a fully built cue voice at its scheduled frame.
    PlayCue(CueVoice),

    /// Stop all currently sounding cues.
    StopAll(),
}

/// Message that is emitted from the audio thread.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioMessage {
    /// Response to a Ping message.
    Pong(),

    /// A cue was dropped because every voice slot was busy.
    VoiceDropped { event: SoundEvent },

    /// A cue reached its stop frame and released its slot.
    CueFinished { event: SoundEvent, frame: u64 },
}

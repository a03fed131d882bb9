//! Audio engine configuration constants and limits.

/// Maximum number of cues that can sound simultaneously.
pub const MAX_VOICES: usize = 32;

/// Minimum volume level (silence).
pub const VOLUME_MIN: f32 = 0.0;

/// Maximum volume level (100%).
pub const VOLUME_MAX: f32 = 1.0;

/// Master volume of the factory settings.
pub const DEFAULT_MASTER_VOLUME: f32 = 0.7;

/// Lowest accepted pitch multiplier (two octaves down).
pub const PITCH_MIN: f32 = 0.25;

/// Highest accepted pitch multiplier (two octaves up).
pub const PITCH_MAX: f32 = 4.0;

/// Output buffer size requested from the device, in frames.
pub const DEFAULT_BUFFER_FRAMES: u32 = 512;

/// Capacity of the control → audio and audio → control ring buffers.
pub const MESSAGE_CAPACITY: usize = 1024;

/// Backend key under which the settings record is stored.
pub const DEFAULT_SETTINGS_KEY: &str = "sound_cues.settings";

/// Upper bound on gain envelope breakpoints (full ADSR needs five).
pub const MAX_BREAKPOINTS: usize = 5;

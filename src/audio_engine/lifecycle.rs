//! Engine lifecycle and output availability.
//!
//! `Uninitialized → Initializing → Ready ⇄ Suspended → Disposed`. Only `Ready`
//! produces sound. Environment failures (no device, resume refused, device
//! lost) park the engine in `Suspended` and are logged once per failure streak.

use std::fmt;

use crate::audio_engine::errors::OutputError;
use crate::audio_engine::output::AudioOutput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Initializing,
    Ready,
    Suspended,
    Disposed,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::Suspended => "suspended",
            Self::Disposed => "disposed",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub struct Lifecycle {
    state: EngineState,
    degraded_logged: bool,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: EngineState::Uninitialized,
            degraded_logged: false,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == EngineState::Ready
    }

    /// Opens the output. Only acts on an uninitialized engine.
    ///
    /// With `start_suspended` the engine parks in `Suspended` until
    /// [`resume`](Self::resume) is called.
    pub fn initialize<O: AudioOutput>(&mut self, output: &mut O, start_suspended: bool) {
        if self.state != EngineState::Uninitialized {
            return;
        }

        self.state = EngineState::Initializing;

        if let Err(err) = output.open() {
            self.degrade("could not open audio output", &err);
            return;
        }

        if start_suspended {
            if let Err(err) = output.suspend() {
                log::debug!("Could not pause output while waiting for resume: {err}");
            }
            self.state = EngineState::Suspended;
            log::debug!("Sound engine waiting for resume");
            return;
        }

        self.enter_ready(output);
    }

    /// The "device became available" signal: `Suspended → Ready`.
    pub fn resume<O: AudioOutput>(&mut self, output: &mut O) {
        if self.state != EngineState::Suspended {
            return;
        }

        if !output.is_available() {
            output.close();
        }
        if !output.is_open() {
            if let Err(err) = output.open() {
                self.degrade("could not open audio output", &err);
                return;
            }
        }

        self.enter_ready(output);
    }

    /// `Ready → Suspended`.
    pub fn suspend<O: AudioOutput>(&mut self, output: &mut O) {
        if self.state != EngineState::Ready {
            return;
        }

        if let Err(err) = output.suspend() {
            log::debug!("Could not pause output: {err}");
        }
        self.state = EngineState::Suspended;
    }

    /// Terminal. Later calls are no-ops.
    pub fn dispose<O: AudioOutput>(&mut self, output: &mut O) {
        if self.state == EngineState::Disposed {
            return;
        }

        output.close();
        self.state = EngineState::Disposed;
        log::debug!("Sound engine disposed");
    }

    /// Drops back to `Suspended` if a ready output stopped being usable.
    pub fn check_output<O: AudioOutput>(&mut self, output: &O) {
        if self.state == EngineState::Ready && !output.is_available() {
            self.state = EngineState::Suspended;
            if !self.degraded_logged {
                log::warn!("Audio output became unavailable, sound cues are muted until resume");
                self.degraded_logged = true;
            }
        }
    }

    fn enter_ready<O: AudioOutput>(&mut self, output: &mut O) {
        match output.resume() {
            Ok(()) => {
                self.state = EngineState::Ready;
                self.degraded_logged = false;
                log::debug!("Sound engine ready");
            }
            Err(err) => self.degrade("could not start audio output", &err),
        }
    }

    fn degrade(&mut self, what: &str, err: &OutputError) {
        self.state = EngineState::Suspended;
        if !self.degraded_logged {
            log::warn!("Sound cues disabled, {what}: {err}");
            self.degraded_logged = true;
        }
    }
}

//! Scoped swaps of engine-wide properties.
//!
//! The active voice and the audio output belong to the engine, not to a
//! single call. Both guards remember the previous value and put it back
//! when dropped, whether the guarded call succeeded or not.

use tracing::{debug, warn};

use super::SpeechEngine;
use crate::error::EngineResult;

/// Holds a temporarily selected voice.
pub struct VoiceGuard<'e, E: SpeechEngine> {
    engine: &'e E,
    previous: Option<E::Voice>,
}

impl<'e, E: SpeechEngine> VoiceGuard<'e, E> {
    /// Select `voice` until the guard is dropped. `None` leaves the engine
    /// voice untouched.
    pub fn swap(engine: &'e E, voice: Option<&E::Voice>) -> EngineResult<Self> {
        let previous = match voice {
            Some(voice) => {
                let previous = engine.voice()?;
                engine.set_voice(voice)?;
                Some(previous)
            }
            None => None,
        };
        Ok(Self { engine, previous })
    }
}

impl<E: SpeechEngine> Drop for VoiceGuard<'_, E> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            if let Err(e) = self.engine.set_voice(&previous) {
                warn!("Failed to restore previous voice: {e}");
            }
        }
    }
}

/// Holds an engine output redirected into a file sink.
pub struct OutputGuard<'e, E: SpeechEngine> {
    engine: &'e E,
    previous: Option<E::Output>,
    sink: Option<E::Sink>,
}

impl<'e, E: SpeechEngine> OutputGuard<'e, E> {
    /// Route engine audio into `sink` until the guard is dropped. The sink
    /// is closed on drop, and also here if the redirect itself fails.
    pub fn redirect(engine: &'e E, sink: E::Sink) -> EngineResult<Self> {
        let previous = match engine.output() {
            Ok(previous) => previous,
            Err(e) => {
                close_quietly(engine, sink);
                return Err(e);
            }
        };
        if let Err(e) = engine.redirect_output(&sink) {
            close_quietly(engine, sink);
            return Err(e);
        }
        debug!("Engine output redirected to file sink");
        Ok(Self {
            engine,
            previous: Some(previous),
            sink: Some(sink),
        })
    }
}

impl<E: SpeechEngine> Drop for OutputGuard<'_, E> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            if let Err(e) = self.engine.restore_output(&previous) {
                warn!("Failed to restore previous audio output: {e}");
            }
        }
        if let Some(sink) = self.sink.take() {
            close_quietly(self.engine, sink);
        }
    }
}

fn close_quietly<E: SpeechEngine>(engine: &E, sink: E::Sink) {
    if let Err(e) = engine.close_sink(sink) {
        warn!("Failed to close file sink: {e}");
    }
}

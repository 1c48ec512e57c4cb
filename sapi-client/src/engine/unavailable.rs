//! Engine type for hosts without SAPI. It has no values, so every
//! operation is unreachable once `open_platform` has refused to build one.

use std::path::Path;

use super::{SpeakFormat, SpeechEngine, VoiceToken, WaveFormat};
use crate::error::EngineResult;

pub enum UnavailableEngine {}

impl SpeechEngine for UnavailableEngine {
    type Voice = ();
    type Output = ();
    type Sink = ();

    fn voices(&self) -> EngineResult<Vec<VoiceToken<()>>> {
        match *self {}
    }

    fn voice(&self) -> EngineResult<()> {
        match *self {}
    }

    fn set_voice(&self, _voice: &()) -> EngineResult<()> {
        match *self {}
    }

    fn set_rate(&self, _rate: i32) -> EngineResult<()> {
        match *self {}
    }

    fn output(&self) -> EngineResult<()> {
        match *self {}
    }

    fn redirect_output(&self, _sink: &()) -> EngineResult<()> {
        match *self {}
    }

    fn restore_output(&self, _output: &()) -> EngineResult<()> {
        match *self {}
    }

    fn open_file_sink(&self, _path: &Path, _format: &WaveFormat) -> EngineResult<()> {
        match *self {}
    }

    fn close_sink(&self, _sink: ()) -> EngineResult<()> {
        match *self {}
    }

    fn speak(&self, _text: &str, _format: SpeakFormat) -> EngineResult<()> {
        match *self {}
    }
}

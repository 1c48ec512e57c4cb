//! Speech engine seam.
//!
//! The platform synthesizer, its voice catalog and its audio sinks are
//! external collaborators. Everything above this module talks to them
//! through [`SpeechEngine`]:
//! - `sapi`: SAPI 5 over COM (Windows only)
//! - `unavailable`: placeholder for platforms without SAPI
//! - `guard`: scoped swap-and-restore of the engine voice and output

pub mod guard;
#[cfg(windows)]
pub mod sapi;
#[cfg(not(windows))]
pub mod unavailable;

#[cfg(test)]
pub mod fake;

use std::path::Path;

use serde::Deserialize;

use crate::error::EngineResult;

/// One installed voice as read from the platform catalog.
#[derive(Debug, Clone)]
pub struct VoiceToken<H> {
    /// The `Name` attribute, e.g. "Microsoft Zira".
    pub name: String,
    /// Token description, e.g. "Microsoft Zira - English (United States)".
    pub description: String,
    /// Registry path of the token; its last segment encodes the locale.
    pub id: String,
    pub handle: H,
}

impl<H> VoiceToken<H> {
    pub fn locale(&self) -> Option<String> {
        locale_from_id(&self.id)
    }

    /// Description part after " - ", usually the language and region.
    pub fn region_label(&self) -> Option<&str> {
        self.description.split(" - ").nth(1)
    }
}

/// Derive an `xx-YY` locale tag from a voice token id.
///
/// `...\Tokens\MSTTS_V110_enUS_ZiraM` gives `en-US`,
/// `...\Tokens\TTS_MS_en-GB_Hazel_11.0` gives `en-GB`.
pub fn locale_from_id(id: &str) -> Option<String> {
    let segment = id.rsplit('\\').next()?;
    let field = segment.split('_').nth(2)?;
    let (split, third) = field.char_indices().nth(2)?;
    if third == '-' {
        return Some(field.to_string());
    }
    let (language, region) = field.split_at(split);
    Some(format!("{language}-{region}"))
}

/// How the engine should parse the text handed to `speak`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakFormat {
    /// Engine default: XML is detected from a leading `<`.
    Auto,
    /// SAPI TTS XML (`<pron>` and friends).
    SapiXml,
    /// SSML document.
    Ssml,
}

/// PCM layout of the WAV files written by `-o`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WaveFormat {
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub channels: u16,
}

impl Default for WaveFormat {
    fn default() -> Self {
        Self {
            sample_rate: 22050,
            bits_per_sample: 16,
            channels: 1,
        }
    }
}

impl WaveFormat {
    /// Bytes per sample frame, `None` if it does not fit a `WAVEFORMATEX`.
    pub fn block_align(&self) -> Option<u16> {
        let bits = u32::from(self.channels) * u32::from(self.bits_per_sample);
        u16::try_from(bits / 8).ok()
    }

    pub fn bytes_per_second(&self) -> Option<u32> {
        self.sample_rate
            .checked_mul(u32::from(self.block_align()?))
    }

    /// Reject layouts the engine cannot write as PCM.
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 || self.channels == 0 {
            return Err(format!("empty wave format: {self:?}"));
        }
        if !matches!(self.bits_per_sample, 8 | 16 | 24 | 32) {
            return Err(format!(
                "unsupported bits_per_sample: {}",
                self.bits_per_sample
            ));
        }
        if self.bytes_per_second().is_none() {
            return Err(format!("wave format overflows: {self:?}"));
        }
        Ok(())
    }
}

/// Operations consumed from the platform speech subsystem.
///
/// `voice`/`set_voice` and `output`/`redirect_output`/`restore_output` are
/// process-wide engine properties; callers swap them through the guards in
/// [`guard`] so the previous value is always put back.
pub trait SpeechEngine {
    /// Catalog handle of one voice.
    type Voice: Clone;
    /// Whatever the engine currently renders audio into.
    type Output;
    /// A file-backed audio sink opened by this engine.
    type Sink;

    fn voices(&self) -> EngineResult<Vec<VoiceToken<Self::Voice>>>;

    fn voice(&self) -> EngineResult<Self::Voice>;

    fn set_voice(&self, voice: &Self::Voice) -> EngineResult<()>;

    fn set_rate(&self, rate: i32) -> EngineResult<()>;

    fn output(&self) -> EngineResult<Self::Output>;

    fn redirect_output(&self, sink: &Self::Sink) -> EngineResult<()>;

    fn restore_output(&self, output: &Self::Output) -> EngineResult<()>;

    /// Open `path` for writing, truncating any existing file.
    fn open_file_sink(&self, path: &Path, format: &WaveFormat) -> EngineResult<Self::Sink>;

    fn close_sink(&self, sink: Self::Sink) -> EngineResult<()>;

    /// Synthesize `text`, blocking until playback or rendering is done.
    fn speak(&self, text: &str, format: SpeakFormat) -> EngineResult<()>;
}

/// Connect to the host speech engine.
#[cfg(windows)]
pub fn open_platform(catalog: &str) -> EngineResult<sapi::SapiEngine> {
    sapi::SapiEngine::open(catalog)
}

/// Connect to the host speech engine.
#[cfg(not(windows))]
pub fn open_platform(_catalog: &str) -> EngineResult<unavailable::UnavailableEngine> {
    Err(crate::error::EngineError::new(
        "SAPI text-to-speech is only available on Windows",
    ))
}

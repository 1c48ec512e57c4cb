//! In-memory engine that records every call, for tests.

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

use super::{SpeakFormat, SpeechEngine, VoiceToken, WaveFormat};
use crate::error::{EngineError, EngineResult};

const ONECORE_TOKENS: &str = r"HKEY_LOCAL_MACHINE\SOFTWARE\Microsoft\Speech_OneCore\Voices\Tokens";
const DESKTOP_TOKENS: &str = r"HKEY_LOCAL_MACHINE\SOFTWARE\Microsoft\Speech\Voices\Tokens";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    SetVoice(String),
    SetRate(i32),
    OpenSink(PathBuf),
    Redirect(PathBuf),
    RestoreOutput(String),
    CloseSink(PathBuf),
    Speak {
        voice: String,
        output: String,
        text: String,
        format: SpeakFormat,
    },
}

pub struct FakeEngine {
    tokens: Vec<VoiceToken<String>>,
    voice: RefCell<String>,
    output: RefCell<String>,
    rate: Cell<i32>,
    fail_speak: bool,
    fail_redirect: bool,
    calls: RefCell<Vec<Call>>,
}

impl FakeEngine {
    /// Catalog with a handful of OneCore voices, one desktop voice and one
    /// token whose id carries no locale. "Microsoft David" is active.
    pub fn new() -> Self {
        let tokens = vec![
            token("Microsoft Zira", "English (United States)", ONECORE_TOKENS, "MSTTS_V110_enUS_ZiraM"),
            token("Microsoft Haruka", "Japanese (Japan)", ONECORE_TOKENS, "MSTTS_V110_jaJP_HarukaM"),
            token("Microsoft David", "English (United States)", ONECORE_TOKENS, "MSTTS_V110_enUS_DavidM"),
            token("Microsoft Hedda", "German (Germany)", ONECORE_TOKENS, "MSTTS_V110_deDE_HeddaM"),
            token(
                "Microsoft Hazel Desktop",
                "English (Great Britain)",
                DESKTOP_TOKENS,
                "TTS_MS_en-GB_Hazel_11.0",
            ),
            VoiceToken {
                name: "Sample TTS Voice".into(),
                description: "Sample TTS Voice".into(),
                id: format!(r"{DESKTOP_TOKENS}\SampleTTSVoice"),
                handle: "Sample TTS Voice".into(),
            },
        ];
        Self {
            tokens,
            voice: RefCell::new("Microsoft David".into()),
            output: RefCell::new("speakers".into()),
            rate: Cell::new(0),
            fail_speak: false,
            fail_redirect: false,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn failing_speak(mut self) -> Self {
        self.fail_speak = true;
        self
    }

    pub fn failing_redirect(mut self) -> Self {
        self.fail_redirect = true;
        self
    }

    pub fn handle_of(&self, name: &str) -> String {
        self.tokens
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.handle.clone())
            .unwrap_or_else(|| panic!("no fake voice named {name}"))
    }

    pub fn active_voice(&self) -> String {
        self.voice.borrow().clone()
    }

    pub fn active_output(&self) -> String {
        self.output.borrow().clone()
    }

    pub fn rate(&self) -> i32 {
        self.rate.get()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn spoken(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Speak { .. }))
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

fn token(name: &str, region: &str, category: &str, key: &str) -> VoiceToken<String> {
    VoiceToken {
        name: name.into(),
        description: format!("{name} - {region}"),
        id: format!(r"{category}\{key}"),
        handle: name.into(),
    }
}

impl SpeechEngine for FakeEngine {
    type Voice = String;
    type Output = String;
    type Sink = PathBuf;

    fn voices(&self) -> EngineResult<Vec<VoiceToken<String>>> {
        Ok(self.tokens.clone())
    }

    fn voice(&self) -> EngineResult<String> {
        Ok(self.active_voice())
    }

    fn set_voice(&self, voice: &String) -> EngineResult<()> {
        self.record(Call::SetVoice(voice.clone()));
        *self.voice.borrow_mut() = voice.clone();
        Ok(())
    }

    fn set_rate(&self, rate: i32) -> EngineResult<()> {
        self.record(Call::SetRate(rate));
        self.rate.set(rate);
        Ok(())
    }

    fn output(&self) -> EngineResult<String> {
        Ok(self.active_output())
    }

    fn redirect_output(&self, sink: &PathBuf) -> EngineResult<()> {
        if self.fail_redirect {
            return Err(EngineError::new("output stream is locked"));
        }
        self.record(Call::Redirect(sink.clone()));
        *self.output.borrow_mut() = sink.display().to_string();
        Ok(())
    }

    fn restore_output(&self, output: &String) -> EngineResult<()> {
        self.record(Call::RestoreOutput(output.clone()));
        *self.output.borrow_mut() = output.clone();
        Ok(())
    }

    fn open_file_sink(&self, path: &Path, _format: &WaveFormat) -> EngineResult<PathBuf> {
        self.record(Call::OpenSink(path.to_path_buf()));
        Ok(path.to_path_buf())
    }

    fn close_sink(&self, sink: PathBuf) -> EngineResult<()> {
        self.record(Call::CloseSink(sink));
        Ok(())
    }

    fn speak(&self, text: &str, format: SpeakFormat) -> EngineResult<()> {
        self.record(Call::Speak {
            voice: self.active_voice(),
            output: self.active_output(),
            text: text.into(),
            format,
        });
        if self.fail_speak {
            return Err(EngineError::new("audio device is unavailable"));
        }
        Ok(())
    }
}

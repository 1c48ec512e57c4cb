//! Speech client: the engine plus per-process settings, passed explicitly
//! to every operation instead of living in globals.

use std::ops::RangeInclusive;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::catalog::{self, VoiceListing};
use crate::engine::guard::{OutputGuard, VoiceGuard};
use crate::engine::{SpeakFormat, SpeechEngine, VoiceToken, WaveFormat};
use crate::error::ClientError;

/// Valid engine rates, slow to fast.
pub const RATE_RANGE: RangeInclusive<i32> = -10..=10;

/// What to do with a rate outside [`RATE_RANGE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateCheck {
    /// Fail with [`ClientError::RateOutOfRange`].
    Fatal,
    /// Log a warning and leave the engine rate unchanged.
    Lenient,
}

pub struct SpeechClient<E: SpeechEngine> {
    engine: E,
    wave_format: WaveFormat,
}

impl<E: SpeechEngine> SpeechClient<E> {
    pub fn new(engine: E, wave_format: WaveFormat) -> Self {
        Self {
            engine,
            wave_format,
        }
    }

    #[cfg(test)]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn list_voices(&self, prefixes: &[String]) -> Result<Vec<VoiceListing>, ClientError> {
        catalog::list_voices(&self.engine, prefixes)
    }

    pub fn resolve_voice(&self, name: &str) -> Result<VoiceToken<E::Voice>, ClientError> {
        catalog::resolve_voice(&self.engine, name)
    }

    /// Set the engine rate. Returns whether the rate was applied.
    pub fn apply_rate(&self, rate: i32, check: RateCheck) -> Result<bool, ClientError> {
        if !RATE_RANGE.contains(&rate) {
            return match check {
                RateCheck::Fatal => Err(ClientError::RateOutOfRange(rate)),
                RateCheck::Lenient => {
                    warn!("rate is out of range: {rate}, keeping engine rate");
                    Ok(false)
                }
            };
        }
        self.engine.set_rate(rate)?;
        debug!("Engine rate set to {rate}");
        Ok(true)
    }

    /// Speak `text` aloud, with `voice` selected for this call only.
    pub fn speak(
        &self,
        voice: Option<&VoiceToken<E::Voice>>,
        text: &str,
        format: SpeakFormat,
    ) -> Result<(), ClientError> {
        let _voice = VoiceGuard::swap(&self.engine, voice.map(|v| &v.handle))?;
        self.engine.speak(text, format)?;
        Ok(())
    }

    /// Render `text` into a WAV file at `path`, overwriting it. Engine
    /// output and voice are restored and the file closed even when
    /// synthesis fails.
    pub fn save_to_file(
        &self,
        path: &Path,
        voice: Option<&VoiceToken<E::Voice>>,
        text: &str,
        format: SpeakFormat,
    ) -> Result<(), ClientError> {
        let sink = self.engine.open_file_sink(path, &self.wave_format)?;
        let _output = OutputGuard::redirect(&self.engine, sink)?;
        self.speak(voice, text, format)?;
        info!("Saved speech to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::engine::fake::{Call, FakeEngine};

    fn client(engine: FakeEngine) -> SpeechClient<FakeEngine> {
        SpeechClient::new(engine, WaveFormat::default())
    }

    #[test]
    fn rates_inside_range_are_applied() {
        let client = client(FakeEngine::new());
        for rate in [-10, -3, 0, 7, 10] {
            assert!(client.apply_rate(rate, RateCheck::Fatal).unwrap());
            assert_eq!(client.engine().rate(), rate);
        }
    }

    #[test]
    fn fatal_check_rejects_out_of_range_rates() {
        let client = client(FakeEngine::new());
        for rate in [-11, 11, i32::MIN, i32::MAX] {
            let err = client.apply_rate(rate, RateCheck::Fatal).unwrap_err();
            assert_eq!(err.to_string(), format!("rate is out of range: {rate}"));
        }
        assert!(client.engine().calls().is_empty());
    }

    #[test]
    fn lenient_check_skips_out_of_range_rates() {
        let client = client(FakeEngine::new());
        assert!(!client.apply_rate(42, RateCheck::Lenient).unwrap());
        assert_eq!(client.engine().rate(), 0);
        assert!(client.engine().calls().is_empty());
    }

    #[test]
    fn speak_swaps_voice_for_one_call() {
        let client = client(FakeEngine::new());
        let zira = client.resolve_voice("Zira").unwrap();

        client.speak(Some(&zira), "hello", SpeakFormat::Auto).unwrap();

        assert_eq!(
            client.engine().calls(),
            vec![
                Call::SetVoice("Microsoft Zira".into()),
                Call::Speak {
                    voice: "Microsoft Zira".into(),
                    output: "speakers".into(),
                    text: "hello".into(),
                    format: SpeakFormat::Auto,
                },
                Call::SetVoice("Microsoft David".into()),
            ]
        );
    }

    #[test]
    fn speak_without_voice_uses_engine_voice() {
        let client = client(FakeEngine::new());
        client.speak(None, "hi", SpeakFormat::Auto).unwrap();
        assert_eq!(client.engine().calls().len(), 1);
        assert_eq!(client.engine().active_voice(), "Microsoft David");
    }

    #[test]
    fn failed_speak_restores_voice() {
        let client = client(FakeEngine::new().failing_speak());
        let haruka = client.resolve_voice("haruka").unwrap();

        let err = client
            .speak(Some(&haruka), "konnichiwa", SpeakFormat::Auto)
            .unwrap_err();

        assert!(matches!(err, ClientError::Engine(_)));
        assert_eq!(client.engine().active_voice(), "Microsoft David");
    }

    #[test]
    fn save_to_file_redirects_and_restores_everything() {
        let client = client(FakeEngine::new());
        let zira = client.resolve_voice("zira").unwrap();
        let path = PathBuf::from("greeting.wav");

        client
            .save_to_file(&path, Some(&zira), "hello", SpeakFormat::Auto)
            .unwrap();

        assert_eq!(
            client.engine().calls(),
            vec![
                Call::OpenSink(path.clone()),
                Call::Redirect(path.clone()),
                Call::SetVoice("Microsoft Zira".into()),
                Call::Speak {
                    voice: "Microsoft Zira".into(),
                    output: "greeting.wav".into(),
                    text: "hello".into(),
                    format: SpeakFormat::Auto,
                },
                Call::SetVoice("Microsoft David".into()),
                Call::RestoreOutput("speakers".into()),
                Call::CloseSink(path),
            ]
        );
    }

    #[test]
    fn failed_save_still_closes_file_and_restores_output() {
        let client = client(FakeEngine::new().failing_speak());
        let path = PathBuf::from("broken.wav");

        assert!(client
            .save_to_file(&path, None, "hello", SpeakFormat::Auto)
            .is_err());

        let calls = client.engine().calls();
        assert_eq!(client.engine().active_output(), "speakers");
        assert_eq!(calls.last(), Some(&Call::CloseSink(path)));
        assert!(calls.contains(&Call::RestoreOutput("speakers".into())));
    }
}

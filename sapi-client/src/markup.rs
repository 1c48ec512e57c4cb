//! Text construction from positional words.
//!
//! Words are inserted verbatim; callers pass symbols and phonetic strings
//! exactly as the engine should see them.

use clap::ValueEnum;

use crate::engine::SpeakFormat;
use crate::error::ClientError;

/// Phonetic alphabets accepted by `-s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Alphabet {
    Sapi,
    Ups,
    Ipa,
}

impl Alphabet {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sapi => "sapi",
            Self::Ups => "ups",
            Self::Ipa => "ipa",
        }
    }
}

/// How positional words become the text handed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMode {
    /// Words joined by single spaces.
    Plain,
    /// One SAPI `<pron>` tag per word.
    Pronunciation,
    /// SSML document with one `<phoneme>` per word; needs the voice locale.
    Phoneme(Alphabet),
}

impl TextMode {
    pub fn select(pronunciation: bool, alphabet: Option<Alphabet>) -> Self {
        match (alphabet, pronunciation) {
            (Some(alphabet), _) => Self::Phoneme(alphabet),
            (None, true) => Self::Pronunciation,
            (None, false) => Self::Plain,
        }
    }

    pub fn needs_locale(self) -> bool {
        matches!(self, Self::Phoneme(_))
    }

    pub fn speak_format(self) -> SpeakFormat {
        match self {
            Self::Plain => SpeakFormat::Auto,
            Self::Pronunciation => SpeakFormat::SapiXml,
            Self::Phoneme(_) => SpeakFormat::Ssml,
        }
    }

    /// Build the engine text. `locale` is the selected voice's locale and is
    /// only consulted in phoneme mode.
    pub fn render(self, words: &[String], locale: Option<&str>) -> Result<String, ClientError> {
        match self {
            Self::Plain => Ok(words.join(" ")),
            Self::Pronunciation => Ok(pron(words)),
            Self::Phoneme(alphabet) => {
                let locale = locale.ok_or(ClientError::SsmlRequiresVoice)?;
                Ok(ssml(locale, alphabet, words))
            }
        }
    }
}

/// `<pron sym="..."/>` for each symbol, back to back.
pub fn pron(symbols: &[String]) -> String {
    symbols
        .iter()
        .map(|sym| format!(r#"<pron sym="{sym}"/>"#))
        .collect()
}

/// SSML `<speak>` document tagged with `locale`, one `<phoneme>` per line.
pub fn ssml(locale: &str, alphabet: Alphabet, phonemes: &[String]) -> String {
    let mut doc = format!("<speak version=\"1.0\" xml:lang=\"{locale}\">\n");
    for ph in phonemes {
        doc.push_str(&format!(
            "<phoneme alphabet=\"{}\" ph=\"{ph}\"/>\n",
            alphabet.as_str()
        ));
    }
    doc.push_str("</speak>");
    doc
}

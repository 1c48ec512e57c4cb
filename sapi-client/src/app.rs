//! One invocation: arguments and config become a [`Plan`], which is then
//! run against a [`SpeechClient`].
//!
//! Planning touches only the filesystem (`-i`), so usage errors surface
//! before the speech engine is opened.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::{Args, USAGE};
use crate::client::{RateCheck, SpeechClient};
use crate::config::Config;
use crate::engine::{self, SpeakFormat, SpeechEngine};
use crate::error::ClientError;
use crate::markup::{Alphabet, TextMode};

/// Parse `argv`, plan, run on the platform engine and map the outcome to an
/// exit code. Listings and usage text go to `out`.
pub fn run<I, T>(argv: I, out: &mut impl Write) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = match Args::try_parse_from(argv) {
        Ok(args) => args,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = write!(out, "{err}");
            return ExitCode::SUCCESS;
        }
        Err(err) => return report(&ClientError::from(err), out),
    };

    init_logging(args.verbose);

    let config = Config::load(args.config.as_deref());
    debug!("Config: {config:?}");

    let outcome = Plan::from_args(&args, &config).and_then(|plan| {
        let engine = engine::open_platform(&config.catalog)?;
        let client = SpeechClient::new(engine, config.output.clone());
        execute(&client, plan, out)
    });

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e, out),
    }
}

// Logs go to stderr; stdout carries the voice listing.
fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Usage-class errors print the message and usage text to `out`; anything
/// else is one line on stderr. Every error exits 1.
fn report(err: &ClientError, out: &mut impl Write) -> ExitCode {
    if err.shows_usage() {
        let _ = writeln!(out, "{err}\n{USAGE}");
    } else {
        eprintln!("{err}");
    }
    ExitCode::FAILURE
}

#[derive(Debug, PartialEq, Eq)]
pub enum Plan {
    /// Print voices whose locale starts with one of these prefixes.
    List(Vec<String>),
    Speak(SpeakRequest),
}

#[derive(Debug, PartialEq, Eq)]
pub struct SpeakRequest {
    pub voice: Option<String>,
    pub rate: Option<(i32, RateCheck)>,
    pub output: Option<PathBuf>,
    pub payload: Payload,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Payload {
    /// Finished engine text: file contents, plain words or `<pron>` tags.
    Text { text: String, format: SpeakFormat },
    /// SSML phonemes, rendered once the voice locale is known.
    Phonemes {
        alphabet: Alphabet,
        words: Vec<String>,
    },
}

impl Plan {
    pub fn from_args(args: &Args, config: &Config) -> Result<Self, ClientError> {
        // -l wins over every other flag regardless of order.
        if args.list {
            return Ok(Self::List(args.words.clone()));
        }

        let voice = args.voice.clone().or_else(|| config.voice.clone());
        let mode = TextMode::select(args.pron, args.alphabet);
        if mode.needs_locale() && voice.is_none() {
            return Err(ClientError::SsmlRequiresVoice);
        }

        let rate = match (args.rate, config.rate) {
            (Some(rate), _) => Some((rate, RateCheck::Fatal)),
            (None, Some(rate)) => Some((rate, RateCheck::Lenient)),
            (None, None) => None,
        };

        let file_text = match &args.input {
            Some(path) => read_input(path)?,
            None => String::new(),
        };

        // An empty input file falls back to the positional words.
        let payload = if !file_text.is_empty() {
            Payload::Text {
                text: file_text,
                format: SpeakFormat::Auto,
            }
        } else {
            match mode {
                TextMode::Phoneme(alphabet) => Payload::Phonemes {
                    alphabet,
                    words: args.words.clone(),
                },
                TextMode::Plain | TextMode::Pronunciation => {
                    let text = mode.render(&args.words, None)?;
                    if text.is_empty() {
                        return Err(ClientError::NoText);
                    }
                    Payload::Text {
                        text,
                        format: mode.speak_format(),
                    }
                }
            }
        };

        Ok(Self::Speak(SpeakRequest {
            voice,
            rate,
            output: args.output.clone(),
            payload,
        }))
    }
}

fn read_input(path: &Path) -> Result<String, ClientError> {
    let text = fs::read_to_string(path).map_err(|source| ClientError::Input {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Read {} bytes from {}", text.len(), path.display());
    Ok(text)
}

/// Run `plan`, writing any listing to `out`.
pub fn execute<E: SpeechEngine>(
    client: &SpeechClient<E>,
    plan: Plan,
    out: &mut impl Write,
) -> Result<(), ClientError> {
    match plan {
        Plan::List(prefixes) => {
            for listing in client.list_voices(&prefixes)? {
                writeln!(out, "{listing}")?;
            }
            Ok(())
        }
        Plan::Speak(request) => speak(client, request),
    }
}

fn speak<E: SpeechEngine>(
    client: &SpeechClient<E>,
    request: SpeakRequest,
) -> Result<(), ClientError> {
    let voice = request
        .voice
        .as_deref()
        .map(|name| client.resolve_voice(name))
        .transpose()?;

    if let Some((rate, check)) = request.rate {
        client.apply_rate(rate, check)?;
    }

    let (text, format) = match request.payload {
        Payload::Text { text, format } => (text, format),
        Payload::Phonemes { alphabet, words } => {
            let locale = voice
                .as_ref()
                .map(|v| v.locale().ok_or_else(|| ClientError::MalformedVoiceId(v.id.clone())))
                .transpose()?;
            let mode = TextMode::Phoneme(alphabet);
            (mode.render(&words, locale.as_deref())?, mode.speak_format())
        }
    };

    match &request.output {
        Some(path) => client.save_to_file(path, voice.as_ref(), &text, format),
        None => client.speak(voice.as_ref(), &text, format),
    }
}

//! Command-line arguments and usage text.

use clap::Parser;
use std::path::PathBuf;

use crate::markup::Alphabet;

pub const USAGE: &str = "\
[usage] sapi-client -l | [-o] [-v] [-r] (-i | -p | -s | text)
    -l language: case insensitive, begins-with match
    -o output.wav
    -v voice: case insensitive, 'Microsoft' can be dropped.
    -r rate: -10 (slow) ... 10 (fast)
    -i input.txt
    -p sym: SAPI TTS XML <pron>
    -s sapi|ups|ipa ph: SSML <phoneme> (requires -v)";

#[derive(Parser, Debug)]
#[command(
    name = "sapi-client",
    version,
    about = "Speak text with the Windows speech API"
)]
pub struct Args {
    /// List voices; trailing words are language prefixes
    #[arg(short = 'l')]
    pub list: bool,

    /// Write the speech to this WAV file instead of playing it
    #[arg(short = 'o', value_name = "OUTPUT.WAV")]
    pub output: Option<PathBuf>,

    /// Voice name, case insensitive; "Microsoft " may be dropped
    #[arg(short = 'v', value_name = "VOICE")]
    pub voice: Option<String>,

    /// Speaking rate from -10 (slow) to 10 (fast)
    #[arg(short = 'r', value_name = "RATE", allow_negative_numbers = true)]
    pub rate: Option<i32>,

    /// Read the text to speak from this UTF-8 file
    #[arg(short = 'i', value_name = "INPUT.TXT")]
    pub input: Option<PathBuf>,

    /// Treat words as SAPI <pron> symbols
    #[arg(short = 'p')]
    pub pron: bool,

    /// Treat words as SSML phonemes in this alphabet (requires -v)
    #[arg(short = 's', value_enum, value_name = "ALPHABET")]
    pub alphabet: Option<Alphabet>,

    /// Path to config.yaml
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable verbose (debug) logging
    #[arg(long)]
    pub verbose: bool,

    /// Words to speak, symbols, phonemes, or language prefixes with -l
    #[arg(value_name = "TEXT", trailing_var_arg = true)]
    pub words: Vec<String>,
}

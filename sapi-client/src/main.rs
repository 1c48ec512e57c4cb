//! sapi-client: command-line front end for Windows SAPI text-to-speech.

mod app;
mod catalog;
mod cli;
mod client;
mod config;
mod engine;
mod error;
mod markup;

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    app::run(std::env::args_os(), &mut io::stdout().lock())
}

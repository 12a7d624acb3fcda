//! Thin wrapper around `slog`/`sloggers`, in the manner of the teacher's
//! `flux::logging` module: a single `init` entry point that builds a root
//! logger, with the severity macros re-exported so callers can write
//! `logging::debug!(log, "..."; "k" => v)` without an extra `slog` import.

use sloggers::terminal::{Destination, TerminalLoggerBuilder};
use sloggers::types::Severity;
use sloggers::Build;

pub use slog::{debug, error, info, o, trace, warn, Logger};

/// Verbosity requested by the binary's CLI (`-v`/`-vv`) or its defaults.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Verbosity {
    Info,
    Debug,
    Trace,
}

impl Verbosity {
    fn severity(self) -> Severity {
        match self {
            Verbosity::Info => Severity::Info,
            Verbosity::Debug => Severity::Debug,
            Verbosity::Trace => Severity::Trace,
        }
    }
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::Info
    }
}

/// Build the root terminal logger for a process. Both the client shim's
/// `ctor` initializer and the server's `main` call this once.
pub fn init(verbosity: Verbosity) -> Logger {
    let mut builder = TerminalLoggerBuilder::new();
    builder.level(verbosity.severity());
    builder.destination(Destination::Stderr);

    builder
        .build()
        .unwrap_or_else(|_| Logger::root(slog::Discard, o!()))
}

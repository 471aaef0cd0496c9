//! Error types for the Fern front-end core.
//!
//! Lexical problems never surface here directly: the lexer reports them
//! as ERROR tokens and the driver turns those into [`Diagnostic`]s.
//! `CoreError` is the outer wrapper used by the pipeline and the CLI.

use thiserror::Error;

use crate::diagnostic::Diagnostic;

/// Failures of the arena allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArenaError {
    #[error("host allocator refused {size} bytes (alignment {align})")]
    OutOfMemory { size: usize, align: usize },
    #[error("alignment {0} is not a power of two")]
    InvalidAlignment(usize),
    #[error("arena block limit of {0} blocks reached")]
    BlockLimit(usize),
    #[error("allocation of {size} bytes overflows the address space")]
    LayoutOverflow { size: usize },
}

/// Failures of [`SourceStr::format`](crate::source_str::SourceStr::format).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("a formatting trait implementation returned an error")]
    Formatter,
    #[error("formatted output grew past the measured {measured} bytes on the second pass")]
    LengthMismatch { measured: usize },
    #[error("string allocation failed: {0}")]
    Alloc(#[from] ArenaError),
}

/// Failures of the FernSim scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("deadline overflow: now {now_ms} ms + delay {delay_ms} ms exceeds the clock range")]
    DeadlineOverflow { now_ms: u64, delay_ms: u64 },
    #[error("clock overflow: now {now_ms} ms + {delta_ms} ms exceeds the clock range")]
    ClockOverflow { now_ms: u64, delta_ms: u64 },
    #[error("event queue allocation failed: {0}")]
    Alloc(#[from] ArenaError),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to read source: {0}")]
    SourceIo(#[from] std::io::Error),
    #[error("arena allocation failed: {0}")]
    Arena(#[from] ArenaError),
    #[error("lex error: {}", first_message(.0))]
    Lex(Vec<Diagnostic>),
}

fn first_message(diagnostics: &[Diagnostic]) -> String {
    match diagnostics {
        [] => "no diagnostics".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (and {} more)", rest.len()),
    }
}

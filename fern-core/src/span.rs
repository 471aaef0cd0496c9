//! Source positions attached to tokens and diagnostics.

use std::fmt;

use crate::source_str::SourceStr;

/// A half-open byte range `[start, end)` within the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Span {
        Span { start, end }
    }

    /// Construct an empty span at the given position.
    pub fn empty(pos: usize) -> Span {
        Span { start: pos, end: pos }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Human-facing position of a token: file, 1-based line, 1-based column.
///
/// A column of zero means "unknown" and is left out when rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceLoc<'a> {
    pub filename: SourceStr<'a>,
    pub line: usize,
    pub column: usize,
}

impl<'a> SourceLoc<'a> {
    pub fn new(filename: SourceStr<'a>, line: usize, column: usize) -> SourceLoc<'a> {
        SourceLoc {
            filename,
            line,
            column,
        }
    }
}

impl fmt::Display for SourceLoc<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_location(f, &self.filename.to_string_lossy(), self.line, self.column)
    }
}

/// Write `<file>:<line>:<col>`, dropping `:<col>` when `column` is zero.
pub fn write_location(
    out: &mut impl fmt::Write,
    file: &str,
    line: usize,
    column: usize,
) -> fmt::Result {
    write!(out, "{file}:{line}")?;
    if column > 0 {
        write!(out, ":{column}")?;
    }
    Ok(())
}

//! Diagnostics reported by the front end.
//!
//! The lexer itself never fails; it emits ERROR tokens. The driver turns
//! each of those into a [`Diagnostic`], which owns its text so it can
//! outlive the arena the tokens came from.

use std::fmt;

use crate::source_str::SourceStr;
use crate::span::{Span, write_location};
use crate::token::{Token, TokenKind};

/// Severity level of a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: Option<&'static str>,
    pub message: String,
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub span: Span,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, token: &Token<'_>) -> Diagnostic {
        Diagnostic::new(Severity::Error, message.into(), token)
    }

    pub fn warning(message: impl Into<String>, token: &Token<'_>) -> Diagnostic {
        Diagnostic::new(Severity::Warning, message.into(), token)
    }

    fn new(severity: Severity, message: String, token: &Token<'_>) -> Diagnostic {
        Diagnostic {
            severity,
            code: None,
            message,
            file: token.loc.filename.to_string_lossy().into_owned(),
            line: token.loc.line,
            column: token.loc.column,
            span: token.span,
        }
    }

    /// Attach an error code (for example, "E0001") to this diagnostic.
    pub fn with_code(mut self, code: &'static str) -> Diagnostic {
        self.code = Some(code);
        self
    }

    /// Describe an ERROR token; any other kind yields `None`.
    ///
    /// The byte the token starts on tells the two failure modes apart:
    /// a string segment starts on its opening quote or closing brace.
    pub fn from_token(token: &Token<'_>, source: SourceStr<'_>) -> Option<Diagnostic> {
        if !token.is(TokenKind::Error) {
            return None;
        }
        let first = source.as_bytes().get(token.span.start).copied();
        let diagnostic = match first {
            Some(b'"' | b'}') => {
                Diagnostic::error("unterminated string literal", token).with_code("E0002")
            }
            Some(byte) => Diagnostic::error(
                format!("unexpected character '{}'", std::ascii::escape_default(byte)),
                token,
            )
            .with_code("E0001"),
            None => Diagnostic::error("unexpected end of input", token).with_code("E0001"),
        };
        Some(diagnostic)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Header line followed by the offending source line and a caret
    /// marker under the lexeme.
    pub fn render(&self, source: SourceStr<'_>) -> String {
        let mut out = self.to_string();
        let bytes = source.as_bytes();
        let start = self.span.start.min(bytes.len());

        let line_start = bytes[..start]
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |i| i + 1);
        let line_end = bytes[start..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(bytes.len(), |i| start + i);
        let line = String::from_utf8_lossy(&bytes[line_start..line_end]);
        let line = line.trim_end_matches('\r');

        out.push('\n');
        out.push_str(line);
        out.push('\n');
        for &b in &bytes[line_start..start] {
            out.push(if b == b'\t' { '\t' } else { ' ' });
        }
        out.push('^');
        let underline = self.span.end.min(line_end).saturating_sub(start);
        for _ in 1..underline {
            out.push('~');
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_location(f, &self.file, self.line, self.column)?;
        write!(f, ": {}", self.severity.label())?;
        if let Some(code) = self.code {
            write!(f, "[{code}]")?;
        }
        write!(f, ": {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::lexer::Lexer;

    fn first_error<'a>(lexer: &mut Lexer<'a>) -> Token<'a> {
        loop {
            let tok = lexer.next_token();
            if tok.kind == TokenKind::Error || tok.kind == TokenKind::Eof {
                return tok;
            }
        }
    }

    #[test]
    fn describes_unexpected_character() {
        let arena = Arena::new().expect("arena");
        let mut lexer = Lexer::new(&arena, "let x = $").expect("lexer");
        let tok = first_error(&mut lexer);
        let diag = Diagnostic::from_token(&tok, lexer.source()).expect("diagnostic");
        assert_eq!(diag.code, Some("E0001"));
        assert_eq!(diag.to_string(), "<input>:1:9: error[E0001]: unexpected character '$'");
    }

    #[test]
    fn describes_unterminated_string() {
        let arena = Arena::new().expect("arena");
        let mut lexer = Lexer::new(&arena, "say(\"hi").expect("lexer");
        let tok = first_error(&mut lexer);
        let diag = Diagnostic::from_token(&tok, lexer.source()).expect("diagnostic");
        assert_eq!(diag.code, Some("E0002"));
        assert_eq!(diag.message, "unterminated string literal");
        assert_eq!((diag.line, diag.column), (1, 5));
    }

    #[test]
    fn ignores_non_error_tokens() {
        let arena = Arena::new().expect("arena");
        let mut lexer = Lexer::new(&arena, "x").expect("lexer");
        let tok = lexer.next_token();
        assert!(Diagnostic::from_token(&tok, lexer.source()).is_none());
    }

    #[test]
    fn escapes_control_bytes() {
        let arena = Arena::new().expect("arena");
        let mut lexer = Lexer::new(&arena, "a\x01b").expect("lexer");
        let tok = first_error(&mut lexer);
        let diag = Diagnostic::from_token(&tok, lexer.source()).expect("diagnostic");
        assert_eq!(diag.message, "unexpected character '\\x01'");
    }

    #[test]
    fn renders_source_line_with_carets() {
        let arena = Arena::new().expect("arena");
        let mut lexer = Lexer::new(&arena, "x = 1\ny = \"open\nz").expect("lexer");
        let tok = first_error(&mut lexer);
        let diag = Diagnostic::from_token(&tok, lexer.source()).expect("diagnostic");
        let rendered = diag.render(lexer.source());
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines[0], "<input>:2:5: error[E0002]: unterminated string literal");
        assert_eq!(lines[1], "y = \"open");
        assert_eq!(lines[2], "    ^~~~~");
    }

    #[test]
    fn warning_without_code() {
        let arena = Arena::new().expect("arena");
        let mut lexer = Lexer::new(&arena, "x").expect("lexer");
        let tok = lexer.next_token();
        let diag = Diagnostic::warning("unused binding", &tok);
        assert!(!diag.is_error());
        assert_eq!(diag.to_string(), "<input>:1:1: warning: unused binding");
    }
}

//! Front-end driver: source text in, arena-backed token stream out.
//!
//! The parser consumes the lexer directly; this driver is what the CLI
//! and tests use when they want the whole stream plus diagnostics.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::arena::Arena;
use crate::diagnostic::Diagnostic;
use crate::error::{ArenaError, CoreError};
use crate::lexer::Lexer;
use crate::source_str::SourceStr;
use crate::token::{Token, TokenKind};
use crate::vec::ArenaVec;

/// Every token of one source file, ending with EOF.
#[derive(Debug)]
pub struct TokenStream<'a> {
    tokens: ArenaVec<'a, Token<'a>>,
    diagnostics: Vec<Diagnostic>,
    source: SourceStr<'a>,
}

impl<'a> TokenStream<'a> {
    pub fn tokens(&self) -> &[Token<'a>] {
        self.tokens.as_slice()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn source(&self) -> SourceStr<'a> {
        self.source
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Fail with [`CoreError::Lex`] when any error was reported.
    pub fn into_result(self) -> Result<TokenStream<'a>, CoreError> {
        if self.has_errors() {
            Err(CoreError::Lex(self.diagnostics))
        } else {
            Ok(self)
        }
    }
}

/// Intern `filename` and `source` in the arena and lex to EOF.
pub fn tokenize<'a>(
    arena: &'a Arena,
    filename: &str,
    source: &str,
) -> Result<TokenStream<'a>, CoreError> {
    let filename = SourceStr::new(arena, filename)?;
    let source = SourceStr::new(arena, source)?;
    Ok(tokenize_source(arena, filename, source)?)
}

/// Lex text that already lives in the arena.
pub fn tokenize_source<'a>(
    arena: &'a Arena,
    filename: SourceStr<'a>,
    source: SourceStr<'a>,
) -> Result<TokenStream<'a>, ArenaError> {
    let mut tokens = ArenaVec::new(arena)?;
    let mut diagnostics = Vec::new();

    for token in Lexer::from_source(source).with_filename(filename).tokens() {
        if let Some(diagnostic) = Diagnostic::from_token(&token, source) {
            diagnostics.push(diagnostic);
        }
        tokens.push(token)?;
    }

    debug!(
        file = %filename,
        tokens = tokens.len(),
        errors = diagnostics.len(),
        "tokenized"
    );
    Ok(TokenStream {
        tokens,
        diagnostics,
        source,
    })
}

/// Read a file into arena memory.
pub fn read_source<'a>(arena: &'a Arena, path: impl AsRef<Path>) -> Result<SourceStr<'a>, CoreError> {
    let bytes = fs::read(path.as_ref())?;
    Ok(SourceStr::from_bytes(arena, &bytes)?)
}

pub fn tokenize_file<'a>(arena: &'a Arena, path: impl AsRef<Path>) -> Result<TokenStream<'a>, CoreError> {
    let path = path.as_ref();
    let source = read_source(arena, path)?;
    let filename = SourceStr::new(arena, &path.display().to_string())?;
    Ok(tokenize_source(arena, filename, source)?)
}

/// Kinds of a token slice; handy for assertions and debugging output.
pub fn token_kinds(tokens: &[Token<'_>]) -> Vec<TokenKind> {
    tokens.iter().map(|token| token.kind).collect()
}

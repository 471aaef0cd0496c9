//! Streaming lexer for Fern source.
//!
//! The lexer hands out one [`Token`] per call; it owns no token buffer.
//! Layout is not significant: newlines are whitespace and the scanner
//! never produces NEWLINE/INDENT/DEDENT. Single-line `#` comments are
//! skipped.
//!
//! String literals may contain `{expr}` interpolations. The literal is
//! split into STRING_BEGIN / STRING_MID / STRING_END segments with the
//! expression tokens in between; two counters track how many
//! interpolations are open and how many plain braces are open inside
//! the innermost one.
//!
//! Input ends at the buffer's end or at the first NUL byte, whichever
//! comes first; anything after a NUL is never scanned.
//!
//! Errors never stop the scan. An offending byte (or an unterminated
//! string segment) becomes an ERROR token and lexing continues after it.
//!
//! [`LexerState`] snapshots only the cursor, line and column. The
//! interpolation counters are not part of it, so a restore must not
//! cross an interpolation boundary.

use tracing::trace;

use crate::arena::Arena;
use crate::error::ArenaError;
use crate::source_str::SourceStr;
use crate::span::{SourceLoc, Span};
use crate::token::{Token, TokenKind};

/// Filename used until the caller supplies one.
pub const PLACEHOLDER_FILENAME: &str = "<input>";

/// Saved cursor position for speculative parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexerState {
    pos: usize,
    line: usize,
    column: usize,
}

#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    source: SourceStr<'a>,
    chars: &'a [u8],
    filename: SourceStr<'a>,
    index: usize,
    line: usize,
    column: usize,
    interp_depth: u32,
    interp_brace_depth: u32,
}

impl<'a> Lexer<'a> {
    /// Copy `source` into the arena and lex it.
    pub fn new(arena: &'a Arena, source: &str) -> Result<Lexer<'a>, ArenaError> {
        let source = SourceStr::new(arena, source)?;
        Ok(Lexer::from_source(source))
    }

    /// Lex text that already lives in an arena.
    pub fn from_source(source: SourceStr<'a>) -> Lexer<'a> {
        let bytes = source.as_bytes();
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Lexer {
            source,
            chars: &bytes[..end],
            filename: SourceStr::borrowed(PLACEHOLDER_FILENAME.as_bytes()),
            index: 0,
            line: 1,
            column: 1,
            interp_depth: 0,
            interp_brace_depth: 0,
        }
    }

    pub fn with_filename(mut self, filename: SourceStr<'a>) -> Lexer<'a> {
        self.filename = filename;
        self
    }

    pub fn source(&self) -> SourceStr<'a> {
        self.source
    }

    pub fn filename(&self) -> SourceStr<'a> {
        self.filename
    }

    /// Produce the next token. At end of input this keeps returning EOF.
    pub fn next_token(&mut self) -> Token<'a> {
        self.skip_whitespace();

        let start = self.save();
        let Some(ch) = self.peek_char() else {
            return self.finish(TokenKind::Eof, start, start.pos);
        };
        self.consume_char();

        // `}` closing an interpolation resumes the enclosing literal.
        if ch == b'}' && self.interp_depth > 0 && self.interp_brace_depth == 0 {
            self.interp_depth -= 1;
            return self.lex_string_segment(start, TokenKind::StringMid, TokenKind::StringEnd);
        }

        if self.interp_depth > 0 {
            match ch {
                b'{' => self.interp_brace_depth += 1,
                b'}' => self.interp_brace_depth = self.interp_brace_depth.saturating_sub(1),
                _ => {}
            }
        }

        match ch {
            b'"' => self.lex_string_segment(start, TokenKind::StringBegin, TokenKind::String),
            b'0'..=b'9' => self.lex_number(ch, start),
            c if is_ident_start(c) => self.lex_ident_or_keyword(start),
            b'<' => {
                if self.eat(b'-') {
                    self.simple_token(TokenKind::Bind, start)
                } else if self.eat(b'=') {
                    self.simple_token(TokenKind::Le, start)
                } else {
                    self.simple_token(TokenKind::Lt, start)
                }
            }
            b'>' => {
                if self.eat(b'=') {
                    self.simple_token(TokenKind::Ge, start)
                } else {
                    self.simple_token(TokenKind::Gt, start)
                }
            }
            b'=' => {
                if self.eat(b'=') {
                    self.simple_token(TokenKind::Eq, start)
                } else if self.eat(b'>') {
                    self.simple_token(TokenKind::FatArrow, start)
                } else {
                    self.simple_token(TokenKind::Assign, start)
                }
            }
            b'!' => {
                if self.eat(b'=') {
                    self.simple_token(TokenKind::Ne, start)
                } else {
                    // A lone `!` is not an operator.
                    self.simple_token(TokenKind::Error, start)
                }
            }
            b'-' => {
                if self.eat(b'>') {
                    self.simple_token(TokenKind::Arrow, start)
                } else {
                    self.simple_token(TokenKind::Minus, start)
                }
            }
            b'|' => {
                if self.eat(b'>') {
                    self.simple_token(TokenKind::Pipe, start)
                } else {
                    self.simple_token(TokenKind::Bar, start)
                }
            }
            b'*' => {
                if self.eat(b'*') {
                    self.simple_token(TokenKind::Power, start)
                } else {
                    self.simple_token(TokenKind::Star, start)
                }
            }
            b'.' => {
                if self.eat(b'.') {
                    if self.eat(b'.') {
                        self.simple_token(TokenKind::Ellipsis, start)
                    } else if self.eat(b'=') {
                        self.simple_token(TokenKind::DotDotEq, start)
                    } else {
                        self.simple_token(TokenKind::DotDot, start)
                    }
                } else {
                    self.simple_token(TokenKind::Dot, start)
                }
            }
            b'(' => self.simple_token(TokenKind::LParen, start),
            b')' => self.simple_token(TokenKind::RParen, start),
            b'[' => self.simple_token(TokenKind::LBracket, start),
            b']' => self.simple_token(TokenKind::RBracket, start),
            b'{' => self.simple_token(TokenKind::LBrace, start),
            b'}' => self.simple_token(TokenKind::RBrace, start),
            b',' => self.simple_token(TokenKind::Comma, start),
            b':' => self.simple_token(TokenKind::Colon, start),
            b'+' => self.simple_token(TokenKind::Plus, start),
            b'/' => self.simple_token(TokenKind::Slash, start),
            b'%' => self.simple_token(TokenKind::Percent, start),
            b'@' => self.simple_token(TokenKind::At, start),
            b'?' => self.simple_token(TokenKind::Question, start),
            _ => self.simple_token(TokenKind::Error, start),
        }
    }

    /// The token `next_token` would return, without advancing.
    pub fn peek_token(&self) -> Token<'a> {
        self.clone().next_token()
    }

    pub fn save(&self) -> LexerState {
        LexerState {
            pos: self.index,
            line: self.line,
            column: self.column,
        }
    }

    /// Rewind to a saved position. Interpolation counters are untouched.
    pub fn restore(&mut self, state: LexerState) {
        self.index = state.pos.min(self.chars.len());
        self.line = state.line;
        self.column = state.column;
    }

    /// True when only whitespace and comments remain.
    pub fn is_eof(&self) -> bool {
        let mut probe = self.clone();
        probe.skip_whitespace();
        probe.peek_char().is_none()
    }

    /// Iterate over the remaining tokens, ending after the first EOF.
    pub fn tokens(self) -> Tokens<'a> {
        Tokens {
            lexer: self,
            done: false,
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            match ch {
                b' ' | b'\t' | b'\r' | b'\n' => self.consume_char(),
                b'#' => {
                    while self.peek_char().is_some_and(|c| c != b'\n') {
                        self.consume_char();
                    }
                }
                _ => break,
            }
        }
    }

    /// Scan literal text up to an interpolation `{` or the closing quote.
    fn lex_string_segment(
        &mut self,
        start: LexerState,
        if_interp: TokenKind,
        if_end: TokenKind,
    ) -> Token<'a> {
        let content_start = self.index;
        while let Some(ch) = self.peek_char() {
            match ch {
                b'"' => break,
                b'\\' => {
                    // Escapes are decoded by `unescape`; only skip them here.
                    self.consume_char();
                    if self.peek_char().is_some() {
                        self.consume_char();
                    }
                }
                // `{` right before the closing quote is literal text.
                b'{' if self.peek_next() != Some(b'"') => break,
                _ => self.consume_char(),
            }
        }
        let content_end = self.index;

        let kind = match self.peek_char() {
            None => TokenKind::Error,
            Some(b'{') => {
                self.consume_char();
                self.interp_depth += 1;
                self.interp_brace_depth = 0;
                if_interp
            }
            Some(_) => {
                self.consume_char(); // closing quote
                if_end
            }
        };
        self.make_token(kind, start, content_start, content_end)
    }

    fn lex_number(&mut self, first: u8, start: LexerState) -> Token<'a> {
        if first == b'0' {
            let radix = match self.peek_char() {
                Some(b'x' | b'X') => Some(16),
                Some(b'b' | b'B') => Some(2),
                Some(b'o' | b'O') => Some(8),
                _ => None,
            };
            if let Some(radix) = radix {
                self.consume_char(); // prefix letter
                self.consume_while(|c| c == b'_' || char::from(c).is_digit(radix));
                return self.simple_token(TokenKind::Int, start);
            }
        }

        self.consume_while(|c| c.is_ascii_digit());

        // A '.' only continues the number when a digit follows, so that
        // `1..5` stays a range.
        if self.peek_char() == Some(b'.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.consume_char(); // '.'
            self.consume_while(|c| c.is_ascii_digit());
            return self.simple_token(TokenKind::Float, start);
        }

        self.simple_token(TokenKind::Int, start)
    }

    fn lex_ident_or_keyword(&mut self, start: LexerState) -> Token<'a> {
        self.consume_while(is_ident_continue);
        let word = &self.chars[start.pos..self.index];
        let kind = if word == b"_" {
            TokenKind::Underscore
        } else {
            TokenKind::from_word(word)
        };
        self.simple_token(kind, start)
    }

    /// Token whose text is everything consumed since `start`.
    fn simple_token(&self, kind: TokenKind, start: LexerState) -> Token<'a> {
        self.finish(kind, start, self.index)
    }

    fn finish(&self, kind: TokenKind, start: LexerState, end: usize) -> Token<'a> {
        self.make_token(kind, start, start.pos, end)
    }

    fn make_token(
        &self,
        kind: TokenKind,
        start: LexerState,
        text_start: usize,
        text_end: usize,
    ) -> Token<'a> {
        let token = Token {
            kind,
            text: self.source.slice(text_start..text_end),
            loc: SourceLoc::new(self.filename, start.line, start.column),
            span: Span::new(start.pos, self.index),
        };
        trace!(
            kind = kind.name(),
            line = start.line,
            column = start.column,
            "token"
        );
        token
    }

    fn peek_char(&self) -> Option<u8> {
        self.chars.get(self.index).copied()
    }

    fn peek_next(&self) -> Option<u8> {
        self.chars.get(self.index + 1).copied()
    }

    fn consume_char(&mut self) {
        if let Some(&ch) = self.chars.get(self.index) {
            self.index += 1;
            if ch == b'\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn consume_while(&mut self, pred: impl Fn(u8) -> bool) {
        while self.peek_char().is_some_and(&pred) {
            self.consume_char();
        }
    }

    fn eat(&mut self, expected: u8) -> bool {
        if self.peek_char() == Some(expected) {
            self.consume_char();
            true
        } else {
            false
        }
    }
}

/// Iterator over a lexer's tokens; yields the first EOF and then stops.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    lexer: Lexer<'a>,
    done: bool,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if self.done {
            return None;
        }
        let token = self.lexer.next_token();
        self.done = token.is(TokenKind::Eof);
        Some(token)
    }
}

/// Decode the escapes of a raw string segment into fresh arena storage.
///
/// Recognised escapes are `\n \t \r \\ \" \{ \}`; any other backslash is
/// kept as written.
pub fn unescape<'b>(arena: &'b Arena, raw: SourceStr<'_>) -> Result<SourceStr<'b>, ArenaError> {
    let bytes = raw.as_bytes();
    let buf = arena.alloc_zeroed_bytes(bytes.len())?;
    let mut out = 0;
    let mut i = 0;
    while i < bytes.len() {
        let decoded = match (bytes[i], bytes.get(i + 1)) {
            (b'\\', Some(&next)) => match next {
                b'n' => Some(b'\n'),
                b't' => Some(b'\t'),
                b'r' => Some(b'\r'),
                b'\\' | b'"' | b'{' | b'}' => Some(next),
                _ => None,
            },
            _ => None,
        };
        match decoded {
            Some(byte) => {
                buf[out] = byte;
                i += 2;
            }
            None => {
                buf[out] = bytes[i];
                i += 1;
            }
        }
        out += 1;
    }
    let buf: &'b [u8] = buf;
    Ok(SourceStr::borrowed(&buf[..out]))
}

fn is_ident_start(ch: u8) -> bool {
    // Bytes >= 0xC0 lead a multi-byte UTF-8 sequence.
    ch.is_ascii_alphabetic() || ch == b'_' || ch >= 0xC0
}

fn is_ident_continue(ch: u8) -> bool {
    // 0x80..=0xBF are UTF-8 continuation bytes.
    ch.is_ascii_alphanumeric() || ch == b'_' || ch >= 0x80
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let arena = Arena::new().expect("arena");
        let lexer = Lexer::new(&arena, source).expect("lexer");
        lexer.tokens().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_integer_with_locations() {
        let arena = Arena::new().expect("arena");
        let mut lexer = Lexer::new(&arena, "42").expect("lexer");

        let tok = lexer.next_token();
        assert_eq!(tok.kind, TokenKind::Int);
        assert_eq!(tok.text, "42");
        assert_eq!((tok.loc.line, tok.loc.column), (1, 1));
        assert_eq!(tok.loc.filename, PLACEHOLDER_FILENAME);

        let eof = lexer.next_token();
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!((eof.loc.line, eof.loc.column), (1, 3));
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }

    #[test]
    fn lexes_keywords_and_identifiers() {
        assert_eq!(
            kinds("let fn if match true false hello_world _ _x"),
            vec![
                TokenKind::Let,
                TokenKind::Fn,
                TokenKind::If,
                TokenKind::Match,
                TokenKind::True,
                TokenKind::False,
                TokenKind::Ident,
                TokenKind::Underscore,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_unicode_identifiers() {
        let arena = Arena::new().expect("arena");
        let mut lexer = Lexer::new(&arena, "café = 1").expect("lexer");
        let tok = lexer.next_token();
        assert_eq!(tok.kind, TokenKind::Ident);
        assert_eq!(tok.text, "café");
        assert_eq!(lexer.next_token().kind, TokenKind::Assign);
    }

    #[test]
    fn lexes_bind_operator() {
        let arena = Arena::new().expect("arena");
        let mut lexer = Lexer::new(&arena, "content <- read_file").expect("lexer");
        let content = lexer.next_token();
        let bind = lexer.next_token();
        let call = lexer.next_token();
        let eof = lexer.next_token();
        assert_eq!((content.kind, content.text.to_str()), (TokenKind::Ident, Some("content")));
        assert_eq!((bind.kind, bind.text.to_str()), (TokenKind::Bind, Some("<-")));
        assert_eq!((call.kind, call.text.to_str()), (TokenKind::Ident, Some("read_file")));
        assert_eq!(bind.loc.column, 9);
        assert_eq!(call.loc.column, 12);
        assert_eq!(eof.loc.column, 21);
    }

    #[test]
    fn lexes_operators_longest_match_first() {
        assert_eq!(
            kinds("+ - * / % ** == != < <= > >= = <- |> | -> => .. ..= ... . @ ?"),
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Percent,
                TokenKind::Power,
                TokenKind::Eq,
                TokenKind::Ne,
                TokenKind::Lt,
                TokenKind::Le,
                TokenKind::Gt,
                TokenKind::Ge,
                TokenKind::Assign,
                TokenKind::Bind,
                TokenKind::Pipe,
                TokenKind::Bar,
                TokenKind::Arrow,
                TokenKind::FatArrow,
                TokenKind::DotDot,
                TokenKind::DotDotEq,
                TokenKind::Ellipsis,
                TokenKind::Dot,
                TokenKind::At,
                TokenKind::Question,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_delimiters() {
        assert_eq!(
            kinds("( ) [ ] { } , : ."),
            vec![
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Comma,
                TokenKind::Colon,
                TokenKind::Dot,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_radix_and_float_literals() {
        let arena = Arena::new().expect("arena");
        for (source, kind) in [
            ("0xFF_00", TokenKind::Int),
            ("0b1010", TokenKind::Int),
            ("0o755", TokenKind::Int),
            ("3.14", TokenKind::Float),
            ("0.5", TokenKind::Float),
            ("1.0", TokenKind::Float),
        ] {
            let mut lexer = Lexer::new(&arena, source).expect("lexer");
            let tok = lexer.next_token();
            assert_eq!(tok.kind, kind, "{source}");
            assert_eq!(tok.text, source);
            assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        }
    }

    #[test]
    fn range_after_integer_is_not_a_float() {
        assert_eq!(
            kinds("1..5"),
            vec![TokenKind::Int, TokenKind::DotDot, TokenKind::Int, TokenKind::Eof]
        );
    }

    #[test]
    fn exponent_is_not_part_of_number() {
        assert_eq!(kinds("1e10"), vec![TokenKind::Int, TokenKind::Ident, TokenKind::Eof]);
    }

    #[test]
    fn skips_comments_and_tracks_lines() {
        let arena = Arena::new().expect("arena");
        let mut lexer = Lexer::new(&arena, "42 # the answer\n  x").expect("lexer");
        assert_eq!(lexer.next_token().kind, TokenKind::Int);
        let x = lexer.next_token();
        assert_eq!(x.kind, TokenKind::Ident);
        assert_eq!((x.loc.line, x.loc.column), (2, 3));
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }

    #[test]
    fn plain_string_keeps_raw_text() {
        let arena = Arena::new().expect("arena");
        let mut lexer = Lexer::new(&arena, r#""hello \"world\"""#).expect("lexer");
        let tok = lexer.next_token();
        assert_eq!(tok.kind, TokenKind::String);
        assert_eq!(tok.text, r#"hello \"world\""#);
        assert_eq!(tok.span, Span::new(0, 17));
    }

    #[test]
    fn interpolation_emits_segments() {
        let arena = Arena::new().expect("arena");
        let mut lexer = Lexer::new(&arena, r#""Hello, {name}!""#).expect("lexer");
        let begin = lexer.next_token();
        let name = lexer.next_token();
        let end = lexer.next_token();
        assert_eq!((begin.kind, begin.text.to_str()), (TokenKind::StringBegin, Some("Hello, ")));
        assert_eq!((name.kind, name.text.to_str()), (TokenKind::Ident, Some("name")));
        assert_eq!((end.kind, end.text.to_str()), (TokenKind::StringEnd, Some("!")));
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }

    #[test]
    fn interpolation_with_middle_segment_and_braces() {
        let arena = Arena::new().expect("arena");
        let lexer = Lexer::new(&arena, r#""a{ {x} }b{y}c""#).expect("lexer");
        let tokens: Vec<_> = lexer.tokens().map(|t| (t.kind, t.text.to_string())).collect();
        assert_eq!(
            tokens,
            vec![
                (TokenKind::StringBegin, "a".to_string()),
                (TokenKind::LBrace, "{".to_string()),
                (TokenKind::Ident, "x".to_string()),
                (TokenKind::RBrace, "}".to_string()),
                (TokenKind::StringMid, "b".to_string()),
                (TokenKind::Ident, "y".to_string()),
                (TokenKind::StringEnd, "c".to_string()),
                (TokenKind::Eof, String::new()),
            ]
        );
    }

    #[test]
    fn nested_string_inside_interpolation() {
        assert_eq!(
            kinds(r#""x {f("y")} z""#),
            vec![
                TokenKind::StringBegin,
                TokenKind::Ident,
                TokenKind::LParen,
                TokenKind::String,
                TokenKind::RParen,
                TokenKind::StringEnd,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn brace_before_closing_quote_is_text() {
        let arena = Arena::new().expect("arena");
        let mut lexer = Lexer::new(&arena, r#""{""#).expect("lexer");
        let tok = lexer.next_token();
        assert_eq!(tok.kind, TokenKind::String);
        assert_eq!(tok.text, "{");
    }

    #[test]
    fn escaped_brace_does_not_interpolate() {
        let arena = Arena::new().expect("arena");
        let mut lexer = Lexer::new(&arena, r#""a\{b}""#).expect("lexer");
        let tok = lexer.next_token();
        assert_eq!(tok.kind, TokenKind::String);
        assert_eq!(tok.text, r"a\{b}");
    }

    #[test]
    fn unterminated_string_is_an_error_token() {
        let arena = Arena::new().expect("arena");
        let mut lexer = Lexer::new(&arena, "x = \"abc").expect("lexer");
        lexer.next_token();
        lexer.next_token();
        let err = lexer.next_token();
        assert_eq!(err.kind, TokenKind::Error);
        assert_eq!(err.text, "abc");
        assert_eq!(err.loc.column, 5);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }

    #[test]
    fn unknown_bytes_become_error_tokens_and_scanning_continues() {
        let arena = Arena::new().expect("arena");
        let mut lexer = Lexer::new(&arena, "a $ !b").expect("lexer");
        assert_eq!(lexer.next_token().kind, TokenKind::Ident);
        let dollar = lexer.next_token();
        assert_eq!((dollar.kind, dollar.text.to_str()), (TokenKind::Error, Some("$")));
        assert_eq!(dollar.loc.column, 3);
        let bang = lexer.next_token();
        assert_eq!((bang.kind, bang.text.to_str()), (TokenKind::Error, Some("!")));
        assert_eq!(lexer.next_token().kind, TokenKind::Ident);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }

    #[test]
    fn nul_byte_ends_the_input() {
        let arena = Arena::new().expect("arena");
        assert_eq!(kinds("a\0b"), vec![TokenKind::Ident, TokenKind::Eof]);

        let mut lexer = Lexer::new(&arena, "x\0").expect("lexer");
        assert_eq!(lexer.next_token().kind, TokenKind::Ident);
        assert!(lexer.is_eof());
        let eof = lexer.next_token();
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!(eof.span, Span::empty(1));
    }

    #[test]
    fn peek_does_not_advance() {
        let arena = Arena::new().expect("arena");
        let mut lexer = Lexer::new(&arena, "let x").expect("lexer");
        let peeked = lexer.peek_token();
        assert_eq!(lexer.peek_token(), peeked);
        assert_eq!(lexer.next_token(), peeked);
        assert_eq!(lexer.peek_token().kind, TokenKind::Ident);
    }

    #[test]
    fn save_and_restore_rewind_the_cursor() {
        let arena = Arena::new().expect("arena");
        let mut lexer = Lexer::new(&arena, "fn add(a: Int)").expect("lexer");
        lexer.next_token();
        let state = lexer.save();
        let first = lexer.next_token();
        lexer.next_token();
        lexer.restore(state);
        assert_eq!(lexer.next_token(), first);
    }

    #[test]
    fn is_eof_ignores_trailing_whitespace_and_comments() {
        let arena = Arena::new().expect("arena");
        let mut lexer = Lexer::new(&arena, "x  # trailing\n\t ").expect("lexer");
        assert!(!lexer.is_eof());
        lexer.next_token();
        assert!(lexer.is_eof());
    }

    #[test]
    fn uses_supplied_filename() {
        let arena = Arena::new().expect("arena");
        let filename = SourceStr::new(&arena, "main.fn").expect("alloc");
        let mut lexer = Lexer::new(&arena, "\n  y").expect("lexer").with_filename(filename);
        let tok = lexer.next_token();
        assert_eq!(tok.loc.to_string(), "main.fn:2:3");
    }

    #[test]
    fn unescape_decodes_known_escapes() {
        let arena = Arena::new().expect("arena");
        let raw = SourceStr::borrowed(br#"a\nb\t\"q\" \{x\} \\ \z"#);
        let decoded = unescape(&arena, raw).expect("alloc");
        assert_eq!(decoded, "a\nb\t\"q\" {x} \\ \\z");
    }
}

//! Token kinds and the token value produced by the lexer.

use crate::source_str::SourceStr;
use crate::span::{SourceLoc, Span};

/// Kind of a token produced by the lexer.
///
/// Variants are grouped in bands (literals, keywords, operators, ...);
/// the classification predicates below follow those bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Control
    Eof,
    Error,
    Newline,
    Indent,
    Dedent,

    // Literals
    Int,   // 42, 0xFF, 0b1010, 0o755
    Float, // 3.14
    String,
    True,
    False,

    Ident,

    // Keywords
    Let,
    Fn,
    Return,
    If,
    Else,
    Match,
    With,
    Do,
    Defer,
    Pub,
    Import,
    Type,
    Trait,
    Impl,
    And,
    Or,
    Not,
    As,
    Module,
    For,
    While,
    Loop,
    Break,
    Continue,
    In,
    Spawn,
    Send,
    Receive,
    After,
    Derive,
    Newtype,
    Unless,
    Where,

    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Power, // **

    // Comparison
    Eq, // ==
    Ne, // !=
    Lt,
    Le,
    Gt,
    Ge,

    // Assignment / flow
    Assign,   // =
    Bind,     // <-
    Pipe,     // |>
    Bar,      // |
    Arrow,    // ->
    FatArrow, // =>

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,

    // Punctuation
    Comma,
    Colon,
    Dot,
    DotDot,   // ..
    DotDotEq, // ..=
    Ellipsis, // ...
    Underscore,
    At,
    Question,

    // String interpolation segments
    StringBegin, // "text{
    StringMid,   // }text{
    StringEnd,   // }text"

    // Comments (never produced by the scanner)
    Comment,
    BlockComment,
    DocComment,
}

impl TokenKind {
    /// Short uppercase name, as printed by `fern lex`.
    pub fn name(self) -> &'static str {
        use TokenKind::*;
        match self {
            Eof => "EOF",
            Error => "ERROR",
            Newline => "NEWLINE",
            Indent => "INDENT",
            Dedent => "DEDENT",
            Int => "INT",
            Float => "FLOAT",
            String => "STRING",
            True => "TRUE",
            False => "FALSE",
            Ident => "IDENT",
            Let => "LET",
            Fn => "FN",
            Return => "RETURN",
            If => "IF",
            Else => "ELSE",
            Match => "MATCH",
            With => "WITH",
            Do => "DO",
            Defer => "DEFER",
            Pub => "PUB",
            Import => "IMPORT",
            Type => "TYPE",
            Trait => "TRAIT",
            Impl => "IMPL",
            And => "AND",
            Or => "OR",
            Not => "NOT",
            As => "AS",
            Module => "MODULE",
            For => "FOR",
            While => "WHILE",
            Loop => "LOOP",
            Break => "BREAK",
            Continue => "CONTINUE",
            In => "IN",
            Spawn => "SPAWN",
            Send => "SEND",
            Receive => "RECEIVE",
            After => "AFTER",
            Derive => "DERIVE",
            Newtype => "NEWTYPE",
            Unless => "UNLESS",
            Where => "WHERE",
            Plus => "PLUS",
            Minus => "MINUS",
            Star => "STAR",
            Slash => "SLASH",
            Percent => "PERCENT",
            Power => "POWER",
            Eq => "EQ",
            Ne => "NE",
            Lt => "LT",
            Le => "LE",
            Gt => "GT",
            Ge => "GE",
            Assign => "ASSIGN",
            Bind => "BIND",
            Pipe => "PIPE",
            Bar => "BAR",
            Arrow => "ARROW",
            FatArrow => "FAT_ARROW",
            LParen => "LPAREN",
            RParen => "RPAREN",
            LBracket => "LBRACKET",
            RBracket => "RBRACKET",
            LBrace => "LBRACE",
            RBrace => "RBRACE",
            Comma => "COMMA",
            Colon => "COLON",
            Dot => "DOT",
            DotDot => "DOTDOT",
            DotDotEq => "DOTDOTEQ",
            Ellipsis => "ELLIPSIS",
            Underscore => "UNDERSCORE",
            At => "AT",
            Question => "QUESTION",
            StringBegin => "STRING_BEGIN",
            StringMid => "STRING_MID",
            StringEnd => "STRING_END",
            Comment => "COMMENT",
            BlockComment => "BLOCK_COMMENT",
            DocComment => "DOC_COMMENT",
        }
    }

    pub fn is_keyword(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Let | Fn
                | Return
                | If
                | Else
                | Match
                | With
                | Do
                | Defer
                | Pub
                | Import
                | Type
                | Trait
                | Impl
                | And
                | Or
                | Not
                | As
                | Module
                | For
                | While
                | Loop
                | Break
                | Continue
                | In
                | Spawn
                | Send
                | Receive
                | After
                | Derive
                | Newtype
                | Unless
                | Where
        )
    }

    /// Arithmetic, comparison, assignment and flow operators.
    pub fn is_operator(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Plus | Minus
                | Star
                | Slash
                | Percent
                | Power
                | Eq
                | Ne
                | Lt
                | Le
                | Gt
                | Ge
                | Assign
                | Bind
                | Pipe
                | Bar
                | Arrow
                | FatArrow
        )
    }

    pub fn is_literal(self) -> bool {
        use TokenKind::*;
        matches!(self, Int | Float | String | True | False)
    }

    /// Classify an identifier-shaped lexeme. `true`/`false` come back as
    /// literal kinds; anything not in the table is an identifier.
    pub fn from_word(word: &[u8]) -> TokenKind {
        use TokenKind::*;
        match word {
            b"let" => Let,
            b"fn" => Fn,
            b"return" => Return,
            b"if" => If,
            b"else" => Else,
            b"match" => Match,
            b"with" => With,
            b"do" => Do,
            b"defer" => Defer,
            b"pub" => Pub,
            b"import" => Import,
            b"type" => Type,
            b"trait" => Trait,
            b"impl" => Impl,
            b"and" => And,
            b"or" => Or,
            b"not" => Not,
            b"as" => As,
            b"module" => Module,
            b"for" => For,
            b"while" => While,
            b"loop" => Loop,
            b"break" => Break,
            b"continue" => Continue,
            b"in" => In,
            b"spawn" => Spawn,
            b"send" => Send,
            b"receive" => Receive,
            b"after" => After,
            b"derive" => Derive,
            b"newtype" => Newtype,
            b"unless" => Unless,
            b"where" => Where,
            b"true" => True,
            b"false" => False,
            _ => Ident,
        }
    }
}

/// A single token: kind, lexeme and position.
///
/// `text` is the lexeme for most kinds. For string kinds it is the raw
/// segment between the delimiters (quotes and braces excluded, escapes
/// left undecoded); `span` always covers the whole lexeme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: SourceStr<'a>,
    pub loc: SourceLoc<'a>,
    pub span: Span,
}

impl Token<'_> {
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

//! Core of the Fern language front end.
//!
//! The pipeline this crate covers is:
//!
//!   source .fn
//!     -> arena      (interned source text, every derived datum)
//!     -> lexer      (streaming tokens, ERROR tokens instead of failures)
//!     -> compiler   (tokenize driver + diagnostics)
//!
//! FernSim, the deterministic actor scheduler used for testing
//! concurrent programs, lives here too because it shares the arena.
//! Parsing and later stages are separate crates that consume the lexer.

// ---------------------------------------------------------------------
// Memory: arena, arena-backed vectors and strings
// ---------------------------------------------------------------------

pub mod arena;
pub mod vec;
pub mod source_str;

// ---------------------------------------------------------------------
// Error handling and diagnostics
// ---------------------------------------------------------------------

pub mod span;
pub mod diagnostic;
pub mod error;

// ---------------------------------------------------------------------
// Front-end: lexing
// ---------------------------------------------------------------------

pub mod token;
pub mod lexer;
pub mod compiler;

// ---------------------------------------------------------------------
// Deterministic simulation
// ---------------------------------------------------------------------

pub mod fernsim;

// ---------------------------------------------------------------------
// Public API re-exports
// ---------------------------------------------------------------------

pub use arena::Arena;
pub use compiler::{TokenStream, read_source, tokenize, tokenize_file, tokenize_source};
pub use diagnostic::{Diagnostic, Severity};
pub use error::{ArenaError, CoreError, FormatError, SimError};
pub use fernsim::{ActorId, FernSim, SimEvent};
pub use lexer::{Lexer, LexerState, unescape};
pub use source_str::SourceStr;
pub use span::{SourceLoc, Span};
pub use token::{Token, TokenKind};
pub use vec::ArenaVec;

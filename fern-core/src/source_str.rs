//! Immutable byte strings borrowed from an arena.
//!
//! A [`SourceStr`] is the textual payload of tokens, filenames and
//! diagnostics. It is a thin `Copy` view over arena-owned bytes; every
//! operation that produces new text allocates it from a caller-supplied
//! [`Arena`]. Equality and ordering are plain byte comparisons.

use std::borrow::Cow;
use std::ffi::CStr;
use std::fmt::{self, Write as _};
use std::ops::Range;

use crate::arena::Arena;
use crate::error::{ArenaError, FormatError};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SourceStr<'a> {
    bytes: &'a [u8],
}

impl<'a> SourceStr<'a> {
    /// Copy `text` into the arena.
    pub fn new(arena: &'a Arena, text: &str) -> Result<Self, ArenaError> {
        SourceStr::from_bytes(arena, text.as_bytes())
    }

    /// Copy an explicit byte range into the arena.
    pub fn from_bytes(arena: &'a Arena, bytes: &[u8]) -> Result<Self, ArenaError> {
        let bytes = arena.alloc_bytes(bytes)?;
        Ok(SourceStr { bytes })
    }

    /// Copy a NUL-terminated string (without its terminator) into the arena.
    pub fn from_c_str(arena: &'a Arena, text: &CStr) -> Result<Self, ArenaError> {
        SourceStr::from_bytes(arena, text.to_bytes())
    }

    /// Wrap bytes that already live long enough, without copying.
    pub const fn borrowed(bytes: &'a [u8]) -> Self {
        SourceStr { bytes }
    }

    pub const fn empty() -> Self {
        SourceStr { bytes: &[] }
    }

    /// Allocate `a` followed by `b` as one string.
    pub fn concat(arena: &'a Arena, a: SourceStr<'_>, b: SourceStr<'_>) -> Result<Self, ArenaError> {
        let total = a.len().checked_add(b.len()).ok_or(ArenaError::LayoutOverflow { size: usize::MAX })?;
        let out = arena.alloc_zeroed_bytes(total)?;
        out[..a.len()].copy_from_slice(a.bytes);
        out[a.len()..].copy_from_slice(b.bytes);
        Ok(SourceStr { bytes: out })
    }

    /// Render `args` into exactly-sized arena storage.
    ///
    /// The arguments are formatted twice: once to measure, once to
    /// write. Output that grows between the passes is rejected; output
    /// that shrinks is kept at its written length.
    pub fn format(arena: &'a Arena, args: fmt::Arguments<'_>) -> Result<Self, FormatError> {
        let mut counter = ByteCounter(0);
        counter
            .write_fmt(args)
            .map_err(|_| FormatError::Formatter)?;
        let measured = counter.0;

        let out = arena.alloc_zeroed_bytes(measured)?;
        let mut writer = SliceWriter {
            buf: out,
            pos: 0,
            overflowed: false,
        };
        let written = writer.write_fmt(args);
        let SliceWriter {
            buf,
            pos,
            overflowed,
        } = writer;
        if overflowed {
            return Err(FormatError::LengthMismatch { measured });
        }
        written.map_err(|_| FormatError::Formatter)?;
        Ok(SourceStr { bytes: &buf[..pos] })
    }

    /// Sub-range view sharing the same storage. Out-of-range requests
    /// yield the empty string.
    pub fn slice(&self, range: Range<usize>) -> SourceStr<'a> {
        self.bytes
            .get(range)
            .map_or_else(SourceStr::empty, SourceStr::borrowed)
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// The text as `&str` when it is valid UTF-8.
    pub fn to_str(&self) -> Option<&'a str> {
        std::str::from_utf8(self.bytes).ok()
    }

    pub fn to_string_lossy(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl PartialEq<str> for SourceStr<'_> {
    fn eq(&self, other: &str) -> bool {
        self.bytes == other.as_bytes()
    }
}

impl PartialEq<&str> for SourceStr<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.bytes == other.as_bytes()
    }
}

impl fmt::Display for SourceStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl fmt::Debug for SourceStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_string_lossy())
    }
}

struct ByteCounter(usize);

impl fmt::Write for ByteCounter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0 = self.0.checked_add(s.len()).ok_or(fmt::Error)?;
        Ok(())
    }
}

struct SliceWriter<'b> {
    buf: &'b mut [u8],
    pos: usize,
    overflowed: bool,
}

impl fmt::Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = self.buf.len() - self.pos;
        let take = s.len().min(room);
        self.buf[self.pos..self.pos + take].copy_from_slice(&s.as_bytes()[..take]);
        self.pos += take;
        if take < s.len() {
            self.overflowed = true;
            return Err(fmt::Error);
        }
        Ok(())
    }
}

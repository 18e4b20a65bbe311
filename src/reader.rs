// Copyright 2024-2025 The html5tok Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The input reader: decodes a byte source into Unicode scalar values with
//! newline normalization, line/column tracking, pushback and lookahead.
//!
//! Bare CR and CRLF are folded into a single LF before the tokenizer sees
//! them, so positions are reported on the normalized stream. Decoding is
//! strict UTF-8: overlong forms, surrogates and out-of-range values fail
//! with [`ReaderError::MalformedUtf8`] rather than being replaced.

use std::io::{self, Read};

use thiserror::Error;

const READ_CHUNK: usize = 4096;

// Worst case bytes examined per scalar: 4 for the scalar itself plus one
// more so a CR can see whether an LF follows.
const DECODE_LOOKAHEAD: usize = 5;

/// A location in the normalized input stream.
///
/// `line` is 1-based; `byte` and `character` are the 0-based offsets within
/// that line, in bytes and code points respectively.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    pub line: u64,
    pub byte: u64,
    pub character: u64,
}

/// Origin for [`Reader::seek`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeekOrigin {
    Begin,
    Current,
}

/// A fatal reader failure. End of input is not a failure; it is reported as
/// `Ok(None)` from the read and peek operations.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// The byte source produced a sequence that is not valid UTF-8. The
    /// position is that of the read head when the failure was observed.
    #[error("malformed UTF-8 near line {}, byte {}", .0.line, .0.byte)]
    MalformedUtf8(Position),

    #[error("reading from the byte source failed")]
    Io(#[from] io::Error),
}

/// Byte and code-point length of a completed line, excluding its newline.
#[derive(Clone, Copy, Debug)]
struct LineLen {
    bytes: u64,
    chars: u64,
}

/// A decoding reader over an opaque byte source.
///
/// Bytes are fetched in chunks and retained, which is what makes
/// [`backtrack`](Reader::backtrack) and absolute [`seek`](Reader::seek)
/// cheap: backing up inspects the already-decoded bytes instead of
/// re-reading the source.
pub struct Reader<R> {
    src: R,
    buf: Vec<u8>,
    src_done: bool,

    /// Byte offset of the next code point in `buf`.
    pos: usize,

    line: u64,
    line_byte: u64,
    line_char: u64,

    /// Lengths of completed lines, indexed by line number - 1. Only lines
    /// completed by forward reading are recorded; lines replayed by an
    /// absolute seek are not.
    lines: Vec<LineLen>,
}

impl<R: Read> Reader<R> {
    pub fn new(src: R) -> Reader<R> {
        Reader {
            src,
            buf: Vec::new(),
            src_done: false,
            pos: 0,
            line: 1,
            line_byte: 0,
            line_char: 0,
            lines: Vec::new(),
        }
    }

    /// The current position on the normalized stream.
    pub fn position(&self) -> Position {
        Position {
            line: self.line,
            byte: self.line_byte,
            character: self.line_char,
        }
    }

    /// Consume and return the next code point, or `None` at end of input.
    /// Repeated reads at end of input keep returning `None` and do not move
    /// the position.
    pub fn read(&mut self) -> Result<Option<char>, ReaderError> {
        self.advance(true)
    }

    /// Fill `buf` with consumed code points; short count at end of input.
    pub fn read_into(&mut self, buf: &mut [char]) -> Result<usize, ReaderError> {
        let mut n = 0;
        while n < buf.len() {
            match self.read()? {
                Some(c) => {
                    buf[n] = c;
                    n += 1;
                },
                None => break,
            }
        }
        Ok(n)
    }

    /// Return the next code point without consuming it.
    pub fn peek(&mut self) -> Result<Option<char>, ReaderError> {
        Ok(self.decode_at(self.pos)?.map(|(c, _)| c))
    }

    /// Fill `buf` with upcoming code points without consuming anything;
    /// short count at end of input. The position is unchanged.
    pub fn peek_into(&mut self, buf: &mut [char]) -> Result<usize, ReaderError> {
        let mut p = self.pos;
        let mut n = 0;
        while n < buf.len() {
            match self.decode_at(p)? {
                Some((c, len)) => {
                    buf[n] = c;
                    n += 1;
                    p += len;
                },
                None => break,
            }
        }
        Ok(n)
    }

    /// Undo the last `read`. `read` followed by `backtrack` is an identity
    /// on the position. Backing up at the start of input does nothing.
    pub fn backtrack(&mut self) {
        if self.pos == 0 {
            return;
        }

        let mut start = self.pos - 1;
        while start > 0 && self.buf[start] & 0xC0 == 0x80 {
            start -= 1;
        }

        if matches!(self.buf[start], b'\n' | b'\r') {
            // The scalar we hand back was a normalized LF. A CR directly
            // before an LF was folded into it and is part of its length.
            if self.buf[start] == b'\n' && start > 0 && self.buf[start - 1] == b'\r' {
                start -= 1;
            }
            self.pos = start;
            self.line -= 1;
            let len = self.prev_line_len(start);
            self.line_byte = len.bytes;
            self.line_char = len.chars;
        } else {
            let len = (self.pos - start) as u64;
            self.pos = start;
            self.line_byte -= len;
            self.line_char -= 1;
        }
    }

    /// Undo the last `n` reads.
    pub fn backtrack_by(&mut self, n: usize) {
        for _ in 0..n {
            if self.pos == 0 {
                break;
            }
            self.backtrack();
        }
    }

    /// Reposition by code-point count. Seeking from `Begin` replays `offset`
    /// code points from the start of input; a negative offset from `Current`
    /// is equivalent to [`backtrack_by`](Reader::backtrack_by).
    pub fn seek(&mut self, origin: SeekOrigin, offset: i64) -> Result<(), ReaderError> {
        match origin {
            SeekOrigin::Begin => {
                self.pos = 0;
                self.line = 1;
                self.line_byte = 0;
                self.line_char = 0;
                for _ in 0..offset.max(0) {
                    if self.advance(false)?.is_none() {
                        break;
                    }
                }
            },
            SeekOrigin::Current => {
                if offset < 0 {
                    self.backtrack_by(offset.unsigned_abs() as usize);
                } else {
                    for _ in 0..offset {
                        if self.advance(true)?.is_none() {
                            break;
                        }
                    }
                }
            },
        }
        Ok(())
    }

    fn advance(&mut self, record_lines: bool) -> Result<Option<char>, ReaderError> {
        let Some((c, len)) = self.decode_at(self.pos)? else {
            return Ok(None);
        };
        self.pos += len;
        if c == '\n' {
            if record_lines && self.lines.len() as u64 == self.line - 1 {
                self.lines.push(LineLen {
                    bytes: self.line_byte,
                    chars: self.line_char,
                });
            }
            self.line += 1;
            self.line_byte = 0;
            self.line_char = 0;
        } else {
            self.line_byte += len as u64;
            self.line_char += 1;
        }
        Ok(Some(c))
    }

    /// Length of the line we return to when backing over a newline, after
    /// `self.line` has been decremented. `end` is the byte offset of that
    /// newline.
    fn prev_line_len(&self, end: usize) -> LineLen {
        if let Some(len) = self.lines.get((self.line - 1) as usize) {
            return *len;
        }
        // Not cached (the line was replayed by an absolute seek): recover by
        // scanning back to the previous newline. A line body never contains
        // CR or LF, so counting non-continuation bytes counts code points.
        let mut start = end;
        while start > 0 && !matches!(self.buf[start - 1], b'\n' | b'\r') {
            start -= 1;
        }
        let bytes = (end - start) as u64;
        let chars = self.buf[start..end]
            .iter()
            .filter(|&&b| b & 0xC0 != 0x80)
            .count() as u64;
        LineLen { bytes, chars }
    }

    /// Decode the scalar at byte offset `p`, returning it together with the
    /// number of input bytes it spans. CR and CRLF decode as LF (spanning
    /// one and two bytes respectively).
    fn decode_at(&mut self, p: usize) -> Result<Option<(char, usize)>, ReaderError> {
        self.fill_to(p + DECODE_LOOKAHEAD)?;
        let buf = &self.buf[..];
        let Some(&b0) = buf.get(p) else {
            return Ok(None);
        };

        let malformed = || ReaderError::MalformedUtf8(self.position());

        match b0 {
            b'\r' => {
                if buf.get(p + 1) == Some(&b'\n') {
                    Ok(Some(('\n', 2)))
                } else {
                    Ok(Some(('\n', 1)))
                }
            },
            0x00..=0x7F => Ok(Some((b0 as char, 1))),
            0xC2..=0xDF => {
                let b1 = *buf.get(p + 1).ok_or_else(malformed)?;
                if b1 & 0xC0 != 0x80 {
                    return Err(malformed());
                }
                let v = (u32::from(b0 & 0x1F) << 6) | u32::from(b1 & 0x3F);
                Ok(Some((char_from_scalar(v), 2)))
            },
            0xE0..=0xEF => {
                let b1 = *buf.get(p + 1).ok_or_else(malformed)?;
                let b2 = *buf.get(p + 2).ok_or_else(malformed)?;
                // Reject overlong (E0 80..9F) and surrogate (ED A0..BF) forms.
                let b1_ok = match b0 {
                    0xE0 => (0xA0..=0xBF).contains(&b1),
                    0xED => (0x80..=0x9F).contains(&b1),
                    _ => b1 & 0xC0 == 0x80,
                };
                if !b1_ok || b2 & 0xC0 != 0x80 {
                    return Err(malformed());
                }
                let v = (u32::from(b0 & 0x0F) << 12)
                    | (u32::from(b1 & 0x3F) << 6)
                    | u32::from(b2 & 0x3F);
                Ok(Some((char_from_scalar(v), 3)))
            },
            0xF0..=0xF4 => {
                let b1 = *buf.get(p + 1).ok_or_else(malformed)?;
                let b2 = *buf.get(p + 2).ok_or_else(malformed)?;
                let b3 = *buf.get(p + 3).ok_or_else(malformed)?;
                // Reject overlong (F0 80..8F) and beyond-U+10FFFF (F4 90..BF).
                let b1_ok = match b0 {
                    0xF0 => (0x90..=0xBF).contains(&b1),
                    0xF4 => (0x80..=0x8F).contains(&b1),
                    _ => b1 & 0xC0 == 0x80,
                };
                if !b1_ok || b2 & 0xC0 != 0x80 || b3 & 0xC0 != 0x80 {
                    return Err(malformed());
                }
                let v = (u32::from(b0 & 0x07) << 18)
                    | (u32::from(b1 & 0x3F) << 12)
                    | (u32::from(b2 & 0x3F) << 6)
                    | u32::from(b3 & 0x3F);
                Ok(Some((char_from_scalar(v), 4)))
            },
            // 0x80..=0xC1 (stray continuation, overlong lead) and 0xF5..=0xFF.
            _ => Err(malformed()),
        }
    }

    /// Grow the retained buffer until it holds at least `want` bytes or the
    /// source is exhausted.
    fn fill_to(&mut self, want: usize) -> io::Result<()> {
        while self.buf.len() < want && !self.src_done {
            let mut chunk = [0u8; READ_CHUNK];
            let n = self.src.read(&mut chunk)?;
            if n == 0 {
                self.src_done = true;
            } else {
                self.buf.extend_from_slice(&chunk[..n]);
            }
        }
        Ok(())
    }
}

/// Build a `char` from a scalar value already validated by range checks on
/// the encoded form.
fn char_from_scalar(v: u32) -> char {
    debug_assert!(char::from_u32(v).is_some());
    char::from_u32(v).unwrap_or('\u{fffd}')
}

#[cfg(test)]
mod test {
    use super::{Position, Reader, ReaderError, SeekOrigin};
    use std::io::Cursor;

    fn reader(input: &[u8]) -> Reader<Cursor<Vec<u8>>> {
        Reader::new(Cursor::new(input.to_vec()))
    }

    fn drain(r: &mut Reader<Cursor<Vec<u8>>>) -> String {
        let mut out = String::new();
        while let Some(c) = r.read().unwrap() {
            out.push(c);
        }
        out
    }

    fn pos(line: u64, byte: u64, character: u64) -> Position {
        Position {
            line,
            byte,
            character,
        }
    }

    #[test]
    fn decodes_mixed_width_scalars() {
        let mut r = reader("a\u{e9}\u{20ac}\u{1f600}".as_bytes());
        assert_eq!(drain(&mut r), "a\u{e9}\u{20ac}\u{1f600}");
        assert_eq!(r.read().unwrap(), None);
    }

    #[test]
    fn eof_is_sticky() {
        let mut r = reader(b"x");
        assert_eq!(r.read().unwrap(), Some('x'));
        let p = r.position();
        assert_eq!(r.read().unwrap(), None);
        assert_eq!(r.read().unwrap(), None);
        assert_eq!(r.position(), p);
    }

    #[test]
    fn normalizes_crlf_and_bare_cr() {
        let mut r = reader(b"a\r\nb\rc");
        assert_eq!(drain(&mut r), "a\nb\nc");
    }

    #[test]
    fn tracks_line_byte_and_char_offsets() {
        let mut r = reader("a\u{e9}\n\u{20ac}x".as_bytes());
        assert_eq!(r.position(), pos(1, 0, 0));
        r.read().unwrap();
        assert_eq!(r.position(), pos(1, 1, 1));
        r.read().unwrap();
        assert_eq!(r.position(), pos(1, 3, 2));
        r.read().unwrap();
        assert_eq!(r.position(), pos(2, 0, 0));
        r.read().unwrap();
        assert_eq!(r.position(), pos(2, 3, 1));
        r.read().unwrap();
        assert_eq!(r.position(), pos(2, 4, 2));
    }

    #[test]
    fn read_then_backtrack_is_identity() {
        let mut r = reader("a\u{e9}\r\nb".as_bytes());
        for _ in 0..4 {
            let before = r.position();
            let c = r.read().unwrap();
            r.backtrack();
            assert_eq!(r.position(), before);
            assert_eq!(r.read().unwrap(), c);
        }
    }

    #[test]
    fn backtrack_across_newline_restores_columns() {
        let mut r = reader("ab\u{e9}\ncd".as_bytes());
        for _ in 0..5 {
            r.read().unwrap();
        }
        assert_eq!(r.position(), pos(2, 1, 1));
        r.backtrack_by(2);
        assert_eq!(r.position(), pos(1, 4, 3));
        assert_eq!(r.read().unwrap(), Some('\n'));
        assert_eq!(r.position(), pos(2, 0, 0));
    }

    #[test]
    fn backtrack_across_crlf_spans_both_bytes() {
        let mut r = reader(b"a\r\nb");
        for _ in 0..3 {
            r.read().unwrap();
        }
        r.backtrack_by(2);
        assert_eq!(r.position(), pos(1, 1, 1));
        assert_eq!(r.read().unwrap(), Some('\n'));
        assert_eq!(r.read().unwrap(), Some('b'));
    }

    #[test]
    fn peek_does_not_move_the_position() {
        let mut r = reader(b"<!DOCTYPE");
        let mut ahead = ['\0'; 6];
        assert_eq!(r.peek_into(&mut ahead).unwrap(), 6);
        assert_eq!(ahead.iter().collect::<String>(), "<!DOCT");
        assert_eq!(r.position(), pos(1, 0, 0));
        assert_eq!(r.peek().unwrap(), Some('<'));
        assert_eq!(r.read().unwrap(), Some('<'));
    }

    #[test]
    fn peek_into_short_count_at_eof() {
        let mut r = reader(b"ab");
        let mut ahead = ['\0'; 4];
        assert_eq!(r.peek_into(&mut ahead).unwrap(), 2);
        assert_eq!(r.read().unwrap(), Some('a'));
    }

    #[test]
    fn read_into_fills_and_short_counts() {
        let mut r = reader(b"abc");
        let mut buf = ['\0'; 2];
        assert_eq!(r.read_into(&mut buf).unwrap(), 2);
        assert_eq!(buf, ['a', 'b']);
        let mut rest = ['\0'; 2];
        assert_eq!(r.read_into(&mut rest).unwrap(), 1);
        assert_eq!(rest[0], 'c');
    }

    #[test]
    fn seek_from_begin_replays_code_points() {
        let mut r = reader("a\nb\u{e9}c".as_bytes());
        drain(&mut r);
        r.seek(SeekOrigin::Begin, 3).unwrap();
        assert_eq!(r.position(), pos(2, 1, 1));
        assert_eq!(r.read().unwrap(), Some('\u{e9}'));
    }

    #[test]
    fn negative_seek_from_current_backtracks() {
        let mut r = reader(b"abcd");
        for _ in 0..3 {
            r.read().unwrap();
        }
        r.seek(SeekOrigin::Current, -2).unwrap();
        assert_eq!(r.position(), pos(1, 1, 1));
        assert_eq!(r.read().unwrap(), Some('b'));
    }

    #[test]
    fn backtrack_over_line_skipped_by_seek() {
        // Line 1 is replayed by the absolute seek and therefore not cached;
        // backing over its newline must still restore the right columns.
        let mut r = reader("wide\u{e9}\nxy".as_bytes());
        r.seek(SeekOrigin::Begin, 7).unwrap();
        assert_eq!(r.position(), pos(2, 1, 1));
        r.backtrack_by(2);
        assert_eq!(r.position(), pos(1, 6, 5));
    }

    #[test]
    fn rejects_overlong_sequences() {
        let mut r = reader(&[0xC0, 0x80]);
        assert!(matches!(r.read(), Err(ReaderError::MalformedUtf8(_))));
        let mut r = reader(&[0xE0, 0x80, 0x80]);
        assert!(matches!(r.read(), Err(ReaderError::MalformedUtf8(_))));
        let mut r = reader(&[0xF0, 0x80, 0x80, 0x80]);
        assert!(matches!(r.read(), Err(ReaderError::MalformedUtf8(_))));
    }

    #[test]
    fn rejects_surrogates_and_out_of_range() {
        // U+D800 and U+110000.
        let mut r = reader(&[0xED, 0xA0, 0x80]);
        assert!(matches!(r.read(), Err(ReaderError::MalformedUtf8(_))));
        let mut r = reader(&[0xF4, 0x90, 0x80, 0x80]);
        assert!(matches!(r.read(), Err(ReaderError::MalformedUtf8(_))));
    }

    #[test]
    fn rejects_stray_continuation_and_truncation() {
        let mut r = reader(&[0x80]);
        assert!(matches!(r.read(), Err(ReaderError::MalformedUtf8(_))));
        let mut r = reader(&[0xE2, 0x82]);
        assert!(matches!(r.read(), Err(ReaderError::MalformedUtf8(_))));
        let mut r = reader(&[0xFF]);
        assert!(matches!(r.read(), Err(ReaderError::MalformedUtf8(_))));
    }

    #[test]
    fn valid_input_survives_chunk_boundaries() {
        // Multi-byte scalar straddling the internal chunk size.
        let mut input = vec![b'a'; super::READ_CHUNK - 1];
        input.extend_from_slice("\u{20ac}z".as_bytes());
        let mut r = reader(&input);
        let out = drain(&mut r);
        assert!(out.ends_with("\u{20ac}z"));
        assert_eq!(out.chars().count(), super::READ_CHUNK + 1);
    }
}

// Copyright 2024-2025 The html5tok Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The character-reference sub-tokenizer.
//!
//! Runs at the `&` that starts a reference and consumes through its end,
//! covering the eight WHATWG character-reference states. Input the machine
//! must re-process (a failed name, a bare `#`) is handed back to the reader,
//! so the leading `&` and any retained characters flow through the return
//! state as ordinary input.

use std::io::Read;

use log::debug;

use super::{ErrorSink, Tokenizer};
use crate::data;
use crate::reader::ReaderError;
use crate::tokenizer::ParseError;

/// The resolved character(s) of one reference. `num_chars == 0` means the
/// reference did not resolve and the bare `&` stands.
#[derive(Clone, Copy, Debug)]
pub(super) struct CharRef {
    pub(super) chars: [char; 2],
    pub(super) num_chars: u8,
}

impl CharRef {
    pub(super) const EMPTY: CharRef = CharRef {
        chars: ['\0', '\0'],
        num_chars: 0,
    };

    fn one(c: char) -> CharRef {
        CharRef {
            chars: [c, '\0'],
            num_chars: 1,
        }
    }
}

pub(super) struct CharRefTokenizer {
    is_consumed_in_attribute: bool,

    num: u32,
    num_too_big: bool,
    seen_digit: bool,
    hex_marker: Option<char>,
}

impl CharRefTokenizer {
    pub(super) fn new(is_consumed_in_attribute: bool) -> CharRefTokenizer {
        CharRefTokenizer {
            is_consumed_in_attribute,
            num: 0,
            num_too_big: false,
            seen_digit: false,
            hex_marker: None,
        }
    }

    /// Consume one complete reference. The `&` itself has already been
    /// consumed by the caller.
    pub(super) fn run<R: Read, Sink: ErrorSink>(
        self,
        tokenizer: &mut Tokenizer<R, Sink>,
    ) -> Result<CharRef, ReaderError> {
        match tokenizer.peek_char()? {
            Some(c) if c.is_ascii_alphanumeric() => self.do_named(tokenizer),
            Some('#') => {
                tokenizer.discard_char()?;
                self.do_octothorpe(tokenizer)
            },
            // Includes EOF: the bare `&` stands.
            _ => Ok(CharRef::EMPTY),
        }
    }

    fn do_octothorpe<R: Read, Sink: ErrorSink>(
        mut self,
        tokenizer: &mut Tokenizer<R, Sink>,
    ) -> Result<CharRef, ReaderError> {
        match tokenizer.peek_char()? {
            Some(c @ ('x' | 'X')) => {
                tokenizer.discard_char()?;
                self.hex_marker = Some(c);
                self.do_numeric(tokenizer, 16)
            },
            _ => self.do_numeric(tokenizer, 10),
        }
    }

    fn do_numeric<R: Read, Sink: ErrorSink>(
        mut self,
        tokenizer: &mut Tokenizer<R, Sink>,
        base: u32,
    ) -> Result<CharRef, ReaderError> {
        while let Some(c) = tokenizer.peek_char()? {
            let Some(n) = c.to_digit(base) else {
                break;
            };
            tokenizer.discard_char()?;
            self.num = self.num.wrapping_mul(base);
            if self.num > 0x10FFFF {
                // We might overflow, and the character is definitely
                // invalid. We still parse digits and the semicolon, but
                // don't use the result.
                self.num_too_big = true;
            }
            self.num = self.num.wrapping_add(n);
            self.seen_digit = true;
        }

        if !self.seen_digit {
            return self.unconsume_numeric(tokenizer);
        }

        // numeric-character-reference-end
        match tokenizer.peek_char()? {
            Some(';') => tokenizer.discard_char()?,
            _ => tokenizer.emit_error(ParseError::MissingSemicolonAfterCharacterReference),
        }
        Ok(self.finish_numeric(tokenizer))
    }

    fn unconsume_numeric<R: Read, Sink: ErrorSink>(
        self,
        tokenizer: &mut Tokenizer<R, Sink>,
    ) -> Result<CharRef, ReaderError> {
        let mut unconsume = 1; // the '#'
        if self.hex_marker.is_some() {
            unconsume += 1;
        }
        tokenizer.unconsume(unconsume);
        tokenizer.emit_error(ParseError::AbsenceOfDigitsInNumericCharacterReference);
        Ok(CharRef::EMPTY)
    }

    fn finish_numeric<R: Read, Sink: ErrorSink>(
        &self,
        tokenizer: &mut Tokenizer<R, Sink>,
    ) -> CharRef {
        fn conv(n: u32) -> char {
            char::from_u32(n).expect("invalid scalar missed by error handling cases")
        }

        let (c, error) = match self.num {
            _ if self.num_too_big || self.num > 0x10FFFF => (
                '\u{fffd}',
                Some(ParseError::CharacterReferenceOutsideUnicodeRange),
            ),
            0x00 => ('\u{fffd}', Some(ParseError::NullCharacterReference)),
            0xD800..=0xDFFF => ('\u{fffd}', Some(ParseError::SurrogateCharacterReference)),
            n if (n & 0xFFFE) == 0xFFFE || (0xFDD0..=0xFDEF).contains(&n) => {
                (conv(n), Some(ParseError::NoncharacterCharacterReference))
            },
            0x80..=0x9F => (
                data::C1_REPLACEMENTS[(self.num - 0x80) as usize].unwrap_or(conv(self.num)),
                Some(ParseError::ControlCharacterReference),
            ),
            0x01..=0x08 | 0x0B | 0x0D..=0x1F | 0x7F => {
                (conv(self.num), Some(ParseError::ControlCharacterReference))
            },
            n => (conv(n), None),
        };

        if let Some(error) = error {
            debug!("invalid numeric character reference 0x{:06X}", self.num);
            tokenizer.emit_error(error);
        }

        CharRef::one(c)
    }

    fn do_named<R: Read, Sink: ErrorSink>(
        self,
        tokenizer: &mut Tokenizer<R, Sink>,
    ) -> Result<CharRef, ReaderError> {
        // Walk the dictionary one character at a time, remembering the
        // longest entry seen. Only characters that still extend some entry
        // are consumed.
        let mut name = String::new();
        let mut consumed = 0;
        let mut best: Option<(usize, (char, Option<char>), bool)> = None;

        while let Some(c) = tokenizer.peek_char()? {
            name.push(c);
            if !tokenizer.refs.has_prefix(&name) {
                name.pop();
                break;
            }
            tokenizer.discard_char()?;
            consumed += 1;
            if let Some(chars) = tokenizer.refs.resolve(&name) {
                best = Some((consumed, chars, c == ';'));
            }
        }

        let Some((matched, (c1, c2), semicolon)) = best else {
            return self.do_bogus_name(tokenizer, consumed);
        };

        // Hand back what the longest match does not cover.
        tokenizer.unconsume(consumed - matched);

        if !semicolon && self.is_consumed_in_attribute {
            // Historical quirk: `&param` in `?param=value` style attribute
            // text is left alone, with no error.
            let next = tokenizer.peek_char()?;
            if matches!(next, Some(c) if c == '=' || c.is_ascii_alphanumeric()) {
                tokenizer.unconsume(matched);
                return Ok(CharRef::EMPTY);
            }
        }

        if !semicolon {
            tokenizer.emit_error(ParseError::MissingSemicolonAfterCharacterReference);
        }

        let num_chars = if c2.is_some() { 2 } else { 1 };
        Ok(CharRef {
            chars: [c1, c2.unwrap_or('\0')],
            num_chars,
        })
    }

    /// The ambiguous-ampersand tail: consume the rest of an alphanumeric
    /// run that matched nothing, then hand all of it back so the return
    /// state re-processes it as plain text.
    fn do_bogus_name<R: Read, Sink: ErrorSink>(
        self,
        tokenizer: &mut Tokenizer<R, Sink>,
        mut consumed: usize,
    ) -> Result<CharRef, ReaderError> {
        while let Some(c) = tokenizer.peek_char()? {
            if c.is_ascii_alphanumeric() {
                tokenizer.discard_char()?;
                consumed += 1;
                continue;
            }
            if c == ';' {
                tokenizer.emit_error(ParseError::UnknownNamedCharacterReference);
            }
            break;
        }
        tokenizer.unconsume(consumed);
        Ok(CharRef::EMPTY)
    }
}

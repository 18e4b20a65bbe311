// Copyright 2024-2025 The html5tok Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The HTML tokenizer.
//!
//! [`Tokenizer`] pulls code points from a [`Reader`] one at a time and
//! yields tokens on demand through [`Tokenizer::next_token`] (or the
//! `Iterator` impl). Exactly one [`EOFToken`] ends the sequence. Parse
//! errors go to the caller's [`ErrorSink`] and never interrupt
//! tokenization; the only fatal condition is input the reader cannot
//! decode, which reports [`ParseError::MalformedInput`] and ends the
//! stream.

pub use self::interface::{CharacterToken, CommentToken, DoctypeToken, EOFToken, TagToken};
pub use self::interface::{Attribute, Doctype, Tag, TagKind, Token};
pub use self::interface::{EndTag, StartTag};
pub use self::interface::{ErrorSink, IgnoreParseErrors, ParseError};
pub use self::interface::{NamedReferences, NoNamedReferences};

use self::char_ref::{CharRef, CharRefTokenizer};
use self::states::{DoctypeIdKind, Public, System};
use self::states::{DoubleEscaped, Escaped};
use self::states::{DoubleQuoted, SingleQuoted, Unquoted};
use self::states::{RawKind, Rawtext, Rcdata, ScriptData, ScriptDataEscaped};

use crate::reader::{Position, Reader, ReaderError};
use crate::tendril::StrTendril;
use crate::util::str::lower_ascii_letter;

use log::{debug, trace};
use std::collections::{BTreeMap, VecDeque};
use std::io::Read;
use std::mem;

mod char_ref;
mod interface;
pub mod states;

fn option_push(opt_str: &mut Option<StrTendril>, c: char) {
    match *opt_str {
        Some(ref mut s) => s.push_char(c),
        None => *opt_str = Some(StrTendril::from_char(c)),
    }
}

/// Tokenizer options, with an impl for `Default`.
#[derive(Clone)]
pub struct TokenizerOpts {
    /// Keep a record of how long we spent in each state?  Printed
    /// when the stream ends.  Default: false
    pub profile: bool,

    /// Initial state override.  Only the test runner should use
    /// a non-`None` value!
    pub initial_state: Option<states::State>,

    /// Last start tag.  Only the test runner should use a
    /// non-`None` value!
    pub last_start_tag_name: Option<String>,
}

impl Default for TokenizerOpts {
    fn default() -> TokenizerOpts {
        TokenizerOpts {
            profile: false,
            initial_state: None,
            last_start_tag_name: None,
        }
    }
}

/// The HTML tokenizer.
pub struct Tokenizer<R, Sink> {
    /// Options controlling the behavior of the tokenizer.
    opts: TokenizerOpts,

    /// Destination for parse errors, and oracle for the CDATA predicate.
    pub sink: Sink,

    /// The input reader.
    reader: Reader<R>,

    /// The named character reference table.
    refs: Box<dyn NamedReferences>,

    /// The abstract machine state as described in the spec.
    state: states::State,

    /// Current input character.  Just consumed, may reconsume.
    current_char: char,

    /// Should we reconsume the current input character?
    reconsume: bool,

    /// Has the reader run dry? Once set, only `eof_step` runs.
    reached_eof: bool,

    /// Has the EOF token been emitted? Ends the public sequence.
    done: bool,

    /// Tokens finished by the last dispatch, in emission order. At most
    /// a few per code point; handed out before the machine runs again.
    pending: VecDeque<Token>,

    /// Current tag kind.
    current_tag_kind: TagKind,

    /// Current tag name.
    current_tag_name: StrTendril,

    /// Current tag is self-closing?
    current_tag_self_closing: bool,

    /// Current tag attributes.
    current_tag_attrs: Vec<Attribute>,

    /// Current attribute name.
    current_attr_name: StrTendril,

    /// Current attribute value.
    current_attr_value: StrTendril,

    /// Current comment.
    current_comment: StrTendril,

    /// Current doctype token.
    current_doctype: Doctype,

    /// Last start tag name, for use in checking "appropriate end tag".
    last_start_tag_name: Option<StrTendril>,

    /// The "temporary buffer" mentioned in the spec.
    temp_buf: StrTendril,

    /// Record of how many ns we spent in each state, if profiling is enabled.
    state_profile: BTreeMap<states::State, u64>,
}

impl<R: Read, Sink: ErrorSink> Tokenizer<R, Sink> {
    /// Create a new tokenizer over a byte source, with the empty named
    /// reference table.
    pub fn new(src: R, sink: Sink, opts: TokenizerOpts) -> Tokenizer<R, Sink> {
        Tokenizer::with_named_references(src, sink, Box::new(NoNamedReferences), opts)
    }

    /// Create a new tokenizer that resolves named character references
    /// through the given table.
    pub fn with_named_references(
        src: R,
        sink: Sink,
        refs: Box<dyn NamedReferences>,
        mut opts: TokenizerOpts,
    ) -> Tokenizer<R, Sink> {
        let start_tag_name = opts
            .last_start_tag_name
            .take()
            .map(|s| StrTendril::from_slice(&s));
        let state = opts.initial_state.unwrap_or(states::Data);
        Tokenizer {
            opts,
            sink,
            reader: Reader::new(src),
            refs,
            state,
            current_char: '\0',
            reconsume: false,
            reached_eof: false,
            done: false,
            pending: VecDeque::new(),
            current_tag_kind: StartTag,
            current_tag_name: StrTendril::new(),
            current_tag_self_closing: false,
            current_tag_attrs: vec![],
            current_attr_name: StrTendril::new(),
            current_attr_value: StrTendril::new(),
            current_comment: StrTendril::new(),
            current_doctype: Doctype::default(),
            last_start_tag_name: start_tag_name,
            temp_buf: StrTendril::new(),
            state_profile: BTreeMap::new(),
        }
    }

    /// Pull the next token. Drives the state machine until at least one
    /// token is finished; returns `None` only after the EOF token has been
    /// yielded.
    pub fn next_token(&mut self) -> Option<Token> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(token);
            }
            if self.done {
                return None;
            }
            self.step();
        }
    }

    /// The reader position, on the normalized stream.
    pub fn position(&self) -> Position {
        self.reader.position()
    }

    /// Switch to the PLAINTEXT state. The tree builder calls this after
    /// emitting a `<plaintext>` start tag.
    pub fn set_plaintext_state(&mut self) {
        self.state = states::Plaintext;
    }

    /// Switch to a raw text state (RCDATA, RAWTEXT or script data). The
    /// tree builder calls this after emitting the matching start tag.
    pub fn set_raw_data_state(&mut self, kind: RawKind) {
        self.state = states::RawData(kind);
    }

    //§ tokenization
    // Get the next input character, which might be the character
    // we already consumed and are reconsuming.
    fn get_char(&mut self) -> Result<Option<char>, ReaderError> {
        if self.reconsume {
            self.reconsume = false;
            return Ok(Some(self.current_char));
        }
        let c = self.reader.read()?;
        if let Some(c) = c {
            trace!("got character {c:?}");
            self.current_char = c;
        }
        Ok(c)
    }

    fn peek_char(&mut self) -> Result<Option<char>, ReaderError> {
        if self.reconsume {
            Ok(Some(self.current_char))
        } else {
            self.reader.peek()
        }
    }

    fn discard_char(&mut self) -> Result<(), ReaderError> {
        if self.reconsume {
            self.reconsume = false;
        } else {
            self.reader.read()?;
        }
        Ok(())
    }

    /// Hand `n` code points back to the reader so the machine re-reads
    /// them. Only valid while no reconsume is pending, which holds
    /// everywhere lookahead is unwound.
    fn unconsume(&mut self, n: usize) {
        debug_assert!(!self.reconsume);
        self.reader.backtrack_by(n);
    }

    // Check whether the next characters match `pat`, and consume them if
    // so. `pat` must be ASCII. There is no "not enough input yet" case:
    // the reader blocks, so a short peek means end of input.
    fn eat(&mut self, pat: &str, eq: fn(&u8, &u8) -> bool) -> Result<bool, ReaderError> {
        debug_assert!(pat.is_ascii() && !pat.is_empty() && pat.len() <= 8);
        let mut buf = ['\0'; 8];
        let n = self.peek_chars(&mut buf[..pat.len()])?;
        if n < pat.len() {
            return Ok(false);
        }
        for (&c, p) in buf[..pat.len()].iter().zip(pat.bytes()) {
            if !c.is_ascii() || !eq(&(c as u8), &p) {
                return Ok(false);
            }
        }
        for _ in 0..pat.len() {
            self.discard_char()?;
        }
        Ok(true)
    }

    fn peek_chars(&mut self, buf: &mut [char]) -> Result<usize, ReaderError> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.reconsume {
            buf[0] = self.current_char;
            let n = self.reader.peek_into(&mut buf[1..])?;
            Ok(n + 1)
        } else {
            self.reader.peek_into(buf)
        }
    }

    fn emit_error(&mut self, error: ParseError) {
        debug!("parse error: {error}");
        self.sink.parse_error(error, self.reader.position());
    }

    /// A reader failure ends tokenization: one `MalformedInput` parse
    /// error, then the EOF token.
    fn fatal(&mut self, error: ReaderError) {
        debug!("fatal input error: {error}");
        self.emit_error(ParseError::MalformedInput);
        self.emit_eof();
    }

    fn emit_char(&mut self, c: char) {
        self.pending.push_back(CharacterToken(c));
    }

    fn emit_temp_buf(&mut self) {
        let buf = mem::take(&mut self.temp_buf);
        for c in buf.chars() {
            self.emit_char(c);
        }
    }

    fn clear_temp_buf(&mut self) {
        // Do this without a new allocation.
        self.temp_buf.clear();
    }

    fn emit_current_tag(&mut self) {
        self.finish_attribute();

        let name = mem::take(&mut self.current_tag_name);

        match self.current_tag_kind {
            StartTag => {
                self.last_start_tag_name = Some(name.clone());
            },
            EndTag => {
                // Anything parsed into an end tag's attribute list or
                // self-closing flag must not survive emission.
                if !self.current_tag_attrs.is_empty() {
                    self.emit_error(ParseError::EndTagWithAttributes);
                    self.current_tag_attrs.clear();
                }
                if self.current_tag_self_closing {
                    self.emit_error(ParseError::EndTagWithTrailingSolidus);
                    self.current_tag_self_closing = false;
                }
            },
        }

        let token = TagToken(Tag {
            kind: self.current_tag_kind,
            name,
            self_closing: self.current_tag_self_closing,
            attrs: mem::take(&mut self.current_tag_attrs),
        });
        self.current_tag_self_closing = false;
        self.pending.push_back(token);
    }

    fn emit_current_comment(&mut self) {
        let comment = mem::take(&mut self.current_comment);
        self.pending.push_back(CommentToken(comment));
    }

    fn emit_current_doctype(&mut self) {
        let doctype = mem::take(&mut self.current_doctype);
        self.pending.push_back(DoctypeToken(doctype));
    }

    fn emit_eof(&mut self) {
        if self.done {
            return;
        }
        self.done = true;
        self.pending.push_back(EOFToken);
        if self.opts.profile {
            self.dump_profile();
        }
    }

    fn discard_tag(&mut self) {
        self.current_tag_name.clear();
        self.current_tag_self_closing = false;
        self.current_tag_attrs = vec![];
    }

    fn create_tag(&mut self, kind: TagKind, c: char) {
        self.discard_tag();
        self.current_tag_name.push_char(c);
        self.current_tag_kind = kind;
    }

    fn have_appropriate_end_tag(&self) -> bool {
        match self.last_start_tag_name.as_ref() {
            Some(last) => {
                self.current_tag_kind == EndTag && *self.current_tag_name == **last
            },
            None => false,
        }
    }

    /// Begin a new attribute, finishing (and possibly discarding) the one
    /// before it.
    fn create_attribute(&mut self) {
        self.finish_attribute();
    }

    fn finish_attribute(&mut self) {
        if self.current_attr_name.is_empty() {
            return;
        }

        // Check for a duplicate attribute: the first one wins.
        let dup = {
            let name = &self.current_attr_name;
            self.current_tag_attrs.iter().any(|a| a.name == *name)
        };

        if dup {
            self.emit_error(ParseError::DuplicateAttribute);
            self.current_attr_name.clear();
            self.current_attr_value.clear();
        } else {
            let name = mem::take(&mut self.current_attr_name);
            self.current_tag_attrs.push(Attribute {
                name,
                value: mem::take(&mut self.current_attr_value),
            });
        }
    }

    fn doctype_id(&mut self, kind: DoctypeIdKind) -> &mut Option<StrTendril> {
        match kind {
            Public => &mut self.current_doctype.public_id,
            System => &mut self.current_doctype.system_id,
        }
    }

    fn clear_doctype_id(&mut self, kind: DoctypeIdKind) {
        let id = self.doctype_id(kind);
        match *id {
            Some(ref mut s) => s.clear(),
            None => *id = Some(StrTendril::new()),
        }
    }

    fn consume_char_ref(&mut self) {
        let is_consumed_in_attribute = matches!(self.state, states::AttributeValue(_));
        match CharRefTokenizer::new(is_consumed_in_attribute).run(self) {
            Ok(char_ref) => self.process_char_ref(char_ref),
            Err(e) => self.fatal(e),
        }
    }

    fn process_char_ref(&mut self, char_ref: CharRef) {
        let CharRef {
            mut chars,
            mut num_chars,
        } = char_ref;

        if num_chars == 0 {
            chars[0] = '&';
            num_chars = 1;
        }

        for i in 0..num_chars {
            let c = chars[i as usize];
            match self.state {
                states::Data | states::RawData(states::Rcdata) => self.emit_char(c),

                states::AttributeValue(_) => self.current_attr_value.push_char(c),

                _ => panic!(
                    "state {:?} should not be reachable in process_char_ref",
                    self.state
                ),
            }
        }
    }

    fn dump_profile(&self) {
        let mut results: Vec<(states::State, u64)> =
            self.state_profile.iter().map(|(s, t)| (*s, *t)).collect();
        results.sort_by(|&(_, x), &(_, y)| y.cmp(&x));

        let total: u64 = results.iter().map(|&(_, t)| t).sum();
        println!("\nTokenizer profile, in nanoseconds");
        println!("\n{total:12}         total in tokenizer");

        for (k, v) in results.into_iter() {
            let pct = 100.0 * (v as f64) / (total as f64);
            println!("{v:12}  {pct:4.1}%  {k:?}");
        }
    }
}
//§ END

// Shorthand for common state machine behaviors.
macro_rules! shorthand (
    ( $me:ident : emit $c:expr                     ) => ( $me.emit_char($c)                        );
    ( $me:ident : create_tag $kind:ident $c:expr   ) => ( $me.create_tag($kind, $c)                );
    ( $me:ident : push_tag $c:expr                 ) => ( $me.current_tag_name.push_char($c)       );
    ( $me:ident : discard_tag                      ) => ( $me.discard_tag()                        );
    ( $me:ident : push_temp $c:expr                ) => ( $me.temp_buf.push_char($c)               );
    ( $me:ident : clear_temp                       ) => ( $me.clear_temp_buf()                     );
    ( $me:ident : emit_temp                        ) => ( $me.emit_temp_buf()                      );
    ( $me:ident : create_attr                      ) => ( $me.create_attribute()                   );
    ( $me:ident : push_name $c:expr                ) => ( $me.current_attr_name.push_char($c)      );
    ( $me:ident : push_value $c:expr               ) => ( $me.current_attr_value.push_char($c)     );
    ( $me:ident : push_comment $c:expr             ) => ( $me.current_comment.push_char($c)        );
    ( $me:ident : append_comment $c:expr           ) => ( $me.current_comment.push_slice($c)       );
    ( $me:ident : emit_comment                     ) => ( $me.emit_current_comment()               );
    ( $me:ident : clear_comment                    ) => ( $me.current_comment.clear()              );
    ( $me:ident : create_doctype                   ) => ( $me.current_doctype = Doctype::default() );
    ( $me:ident : push_doctype_name $c:expr        ) => ( option_push(&mut $me.current_doctype.name, $c) );
    ( $me:ident : push_doctype_id $k:ident $c:expr ) => ( option_push($me.doctype_id($k), $c)      );
    ( $me:ident : clear_doctype_id $k:ident        ) => ( $me.clear_doctype_id($k)                 );
    ( $me:ident : force_quirks                     ) => ( $me.current_doctype.force_quirks = true  );
    ( $me:ident : emit_doctype                     ) => ( $me.emit_current_doctype()               );
    ( $me:ident : error $kind:ident                ) => ( $me.emit_error(ParseError::$kind)        );
);

// A little DSL for sequencing shorthand actions.
macro_rules! go (
    // A pattern like $($cmd:tt)* ; $($rest:tt)* causes parse ambiguity.
    // We have to tell the parser how much lookahead we need.

    ( $me:ident : $a:tt                   ; $($rest:tt)* ) => ({ shorthand!($me: $a);          go!($me: $($rest)*); });
    ( $me:ident : $a:tt $b:tt             ; $($rest:tt)* ) => ({ shorthand!($me: $a $b);       go!($me: $($rest)*); });
    ( $me:ident : $a:tt $b:tt $c:tt       ; $($rest:tt)* ) => ({ shorthand!($me: $a $b $c);    go!($me: $($rest)*); });

    // These can only come at the end.

    ( $me:ident : to $s:ident                    ) => ({ $me.state = states::$s; return;           });
    ( $me:ident : to $s:ident $k1:expr           ) => ({ $me.state = states::$s($k1); return;      });
    ( $me:ident : to $s:ident $k1:ident $k2:expr ) => ({ $me.state = states::$s($k1($k2)); return; });

    ( $me:ident : reconsume $s:ident                    ) => ({ $me.reconsume = true; go!($me: to $s);         });
    ( $me:ident : reconsume $s:ident $k1:expr           ) => ({ $me.reconsume = true; go!($me: to $s $k1);     });
    ( $me:ident : reconsume $s:ident $k1:ident $k2:expr ) => ({ $me.reconsume = true; go!($me: to $s $k1 $k2); });

    ( $me:ident : consume_char_ref ) => ({ $me.consume_char_ref(); return; });

    ( $me:ident : emit_tag $s:ident ) => ({
        $me.state = states::$s;
        $me.emit_current_tag();
        return;
    });

    ( $me:ident : eof ) => ({ $me.emit_eof(); return; });

    // If nothing else matched, it's a single command
    ( $me:ident : $($cmd:tt)+ ) => ( shorthand!($me: $($cmd)+) );

    // or nothing.
    ( $me:ident : ) => (());
);

// These are macros because they can cause early return from the
// dispatch function where they are used.
macro_rules! get_char ( ($me:expr) => (
    match $me.get_char() {
        Ok(Some(c)) => c,
        Ok(None) => {
            $me.reached_eof = true;
            return $me.eof_step();
        },
        Err(e) => return $me.fatal(e),
    }
));

macro_rules! eat ( ($me:expr, $pat:expr) => (
    match $me.eat($pat, u8::eq_ignore_ascii_case) {
        Ok(matched) => matched,
        Err(e) => return $me.fatal(e),
    }
));

macro_rules! eat_exact ( ($me:expr, $pat:expr) => (
    match $me.eat($pat, u8::eq) {
        Ok(matched) => matched,
        Err(e) => return $me.fatal(e),
    }
));

impl<R: Read, Sink: ErrorSink> Tokenizer<R, Sink> {
    // Run the state machine for one dispatch: one code point (or the EOF
    // sentinel), zero or more finished tokens.
    fn step(&mut self) {
        if self.opts.profile {
            let state = self.state;
            let (_, dt) = time!(self.dispatch());
            *self.state_profile.entry(state).or_insert(0) += dt;
        } else {
            self.dispatch();
        }
    }

    fn dispatch(&mut self) {
        if self.reached_eof {
            return self.eof_step();
        }

        trace!("processing in state {:?}", self.state);
        match self.state {
            //§ data-state
            states::Data => match get_char!(self) {
                '&' => go!(self: consume_char_ref),
                '<' => go!(self: to TagOpen),
                '\0' => {
                    go!(self: error UnexpectedNullCharacter);
                    go!(self: emit '\0');
                },
                c => go!(self: emit c),
            },

            //§ rcdata-state
            states::RawData(Rcdata) => match get_char!(self) {
                '&' => go!(self: consume_char_ref),
                '<' => go!(self: to RawLessThanSign Rcdata),
                '\0' => {
                    go!(self: error UnexpectedNullCharacter);
                    go!(self: emit '\u{fffd}');
                },
                c => go!(self: emit c),
            },

            //§ rawtext-state
            states::RawData(Rawtext) => match get_char!(self) {
                '<' => go!(self: to RawLessThanSign Rawtext),
                '\0' => {
                    go!(self: error UnexpectedNullCharacter);
                    go!(self: emit '\u{fffd}');
                },
                c => go!(self: emit c),
            },

            //§ script-data-state
            states::RawData(ScriptData) => match get_char!(self) {
                '<' => go!(self: to RawLessThanSign ScriptData),
                '\0' => {
                    go!(self: error UnexpectedNullCharacter);
                    go!(self: emit '\u{fffd}');
                },
                c => go!(self: emit c),
            },

            //§ script-data-escaped-state
            states::RawData(ScriptDataEscaped(Escaped)) => match get_char!(self) {
                '-' => {
                    go!(self: emit '-');
                    go!(self: to ScriptDataEscapedDash Escaped);
                },
                '<' => go!(self: to RawLessThanSign ScriptDataEscaped Escaped),
                '\0' => {
                    go!(self: error UnexpectedNullCharacter);
                    go!(self: emit '\u{fffd}');
                },
                c => go!(self: emit c),
            },

            //§ script-data-double-escaped-state
            states::RawData(ScriptDataEscaped(DoubleEscaped)) => match get_char!(self) {
                '-' => {
                    go!(self: emit '-');
                    go!(self: to ScriptDataEscapedDash DoubleEscaped);
                },
                '<' => {
                    go!(self: emit '<');
                    go!(self: to RawLessThanSign ScriptDataEscaped DoubleEscaped);
                },
                '\0' => {
                    go!(self: error UnexpectedNullCharacter);
                    go!(self: emit '\u{fffd}');
                },
                c => go!(self: emit c),
            },

            //§ plaintext-state
            states::Plaintext => match get_char!(self) {
                '\0' => {
                    go!(self: error UnexpectedNullCharacter);
                    go!(self: emit '\u{fffd}');
                },
                c => go!(self: emit c),
            },

            //§ tag-open-state
            states::TagOpen => match get_char!(self) {
                '!' => go!(self: to MarkupDeclarationOpen),
                '/' => go!(self: to EndTagOpen),
                '?' => {
                    go!(self: error UnexpectedQuestionMarkInsteadOfTagName);
                    go!(self: clear_comment; reconsume BogusComment);
                },
                c => match lower_ascii_letter(c) {
                    Some(cl) => go!(self: create_tag StartTag cl; to TagName),
                    None => {
                        go!(self: error InvalidFirstCharacterOfTagName);
                        go!(self: emit '<');
                        go!(self: reconsume Data);
                    },
                },
            },

            //§ end-tag-open-state
            states::EndTagOpen => match get_char!(self) {
                '>' => {
                    go!(self: error MissingEndTagName);
                    go!(self: to Data);
                },
                c => match lower_ascii_letter(c) {
                    Some(cl) => go!(self: create_tag EndTag cl; to TagName),
                    None => {
                        go!(self: error InvalidFirstCharacterOfTagName);
                        go!(self: clear_comment; reconsume BogusComment);
                    },
                },
            },

            //§ tag-name-state
            states::TagName => match get_char!(self) {
                '\t' | '\n' | '\x0C' | ' ' => go!(self: to BeforeAttributeName),
                '/' => go!(self: to SelfClosingStartTag),
                '>' => go!(self: emit_tag Data),
                '\0' => {
                    go!(self: error UnexpectedNullCharacter);
                    go!(self: push_tag '\u{fffd}');
                },
                c => go!(self: push_tag (c.to_ascii_lowercase())),
            },

            //§ script-data-escaped-less-than-sign-state
            states::RawLessThanSign(ScriptDataEscaped(Escaped)) => match get_char!(self) {
                '/' => go!(self: clear_temp; to RawEndTagOpen ScriptDataEscaped Escaped),
                c => match lower_ascii_letter(c) {
                    Some(cl) => {
                        go!(self: clear_temp; push_temp cl);
                        go!(self: emit '<');
                        go!(self: emit c);
                        go!(self: to ScriptDataEscapeStart DoubleEscaped);
                    },
                    None => {
                        go!(self: emit '<');
                        go!(self: reconsume RawData ScriptDataEscaped Escaped);
                    },
                },
            },

            //§ script-data-double-escaped-less-than-sign-state
            states::RawLessThanSign(ScriptDataEscaped(DoubleEscaped)) => match get_char!(self) {
                '/' => {
                    go!(self: clear_temp);
                    go!(self: emit '/');
                    go!(self: to ScriptDataDoubleEscapeEnd);
                },
                _ => go!(self: reconsume RawData ScriptDataEscaped DoubleEscaped),
            },

            //§ rcdata-less-than-sign-state rawtext-less-than-sign-state script-data-less-than-sign-state
            // otherwise
            states::RawLessThanSign(kind) => match get_char!(self) {
                '/' => go!(self: clear_temp; to RawEndTagOpen kind),
                '!' if kind == ScriptData => {
                    go!(self: emit '<');
                    go!(self: emit '!');
                    go!(self: to ScriptDataEscapeStart Escaped);
                },
                _ => {
                    go!(self: emit '<');
                    go!(self: reconsume RawData kind);
                },
            },

            //§ rcdata-end-tag-open-state rawtext-end-tag-open-state script-data-end-tag-open-state script-data-escaped-end-tag-open-state
            states::RawEndTagOpen(kind) => {
                let c = get_char!(self);
                match lower_ascii_letter(c) {
                    Some(cl) => go!(self: create_tag EndTag cl; push_temp c; to RawEndTagName kind),
                    None => {
                        go!(self: emit '<');
                        go!(self: emit '/');
                        go!(self: reconsume RawData kind);
                    },
                }
            },

            //§ rcdata-end-tag-name-state rawtext-end-tag-name-state script-data-end-tag-name-state script-data-escaped-end-tag-name-state
            states::RawEndTagName(kind) => {
                let c = get_char!(self);
                if self.have_appropriate_end_tag() {
                    match c {
                        '\t' | '\n' | '\x0C' | ' ' => {
                            go!(self: clear_temp; to BeforeAttributeName)
                        },
                        '/' => go!(self: clear_temp; to SelfClosingStartTag),
                        '>' => go!(self: clear_temp; emit_tag Data),
                        _ => (),
                    }
                }

                match lower_ascii_letter(c) {
                    Some(cl) => go!(self: push_tag cl; push_temp c),
                    None => {
                        go!(self: discard_tag);
                        go!(self: emit '<');
                        go!(self: emit '/');
                        go!(self: emit_temp);
                        go!(self: reconsume RawData kind);
                    },
                }
            },

            //§ script-data-double-escape-start-state
            states::ScriptDataEscapeStart(DoubleEscaped) => {
                let c = get_char!(self);
                match c {
                    '\t' | '\n' | '\x0C' | ' ' | '/' | '>' => {
                        let esc = if &*self.temp_buf == "script" {
                            DoubleEscaped
                        } else {
                            Escaped
                        };
                        go!(self: emit c);
                        go!(self: to RawData ScriptDataEscaped esc);
                    },
                    _ => match lower_ascii_letter(c) {
                        Some(cl) => {
                            go!(self: push_temp cl);
                            go!(self: emit c);
                        },
                        None => go!(self: reconsume RawData ScriptDataEscaped Escaped),
                    },
                }
            },

            //§ script-data-escape-start-state
            states::ScriptDataEscapeStart(Escaped) => match get_char!(self) {
                '-' => {
                    go!(self: emit '-');
                    go!(self: to ScriptDataEscapeStartDash);
                },
                _ => go!(self: reconsume RawData ScriptData),
            },

            //§ script-data-escape-start-dash-state
            states::ScriptDataEscapeStartDash => match get_char!(self) {
                '-' => {
                    go!(self: emit '-');
                    go!(self: to ScriptDataEscapedDashDash Escaped);
                },
                _ => go!(self: reconsume RawData ScriptData),
            },

            //§ script-data-escaped-dash-state script-data-double-escaped-dash-state
            states::ScriptDataEscapedDash(kind) => match get_char!(self) {
                '-' => {
                    go!(self: emit '-');
                    go!(self: to ScriptDataEscapedDashDash kind);
                },
                '<' => {
                    if kind == DoubleEscaped {
                        go!(self: emit '<');
                    }
                    go!(self: to RawLessThanSign ScriptDataEscaped kind);
                },
                '\0' => {
                    go!(self: error UnexpectedNullCharacter);
                    go!(self: emit '\u{fffd}');
                    go!(self: to RawData ScriptDataEscaped kind);
                },
                c => {
                    go!(self: emit c);
                    go!(self: to RawData ScriptDataEscaped kind);
                },
            },

            //§ script-data-escaped-dash-dash-state script-data-double-escaped-dash-dash-state
            states::ScriptDataEscapedDashDash(kind) => match get_char!(self) {
                '-' => go!(self: emit '-'),
                '<' => {
                    if kind == DoubleEscaped {
                        go!(self: emit '<');
                    }
                    go!(self: to RawLessThanSign ScriptDataEscaped kind);
                },
                '>' => {
                    go!(self: emit '>');
                    go!(self: to RawData ScriptData);
                },
                '\0' => {
                    go!(self: error UnexpectedNullCharacter);
                    go!(self: emit '\u{fffd}');
                    go!(self: to RawData ScriptDataEscaped kind);
                },
                c => {
                    go!(self: emit c);
                    go!(self: to RawData ScriptDataEscaped kind);
                },
            },

            //§ script-data-double-escape-end-state
            states::ScriptDataDoubleEscapeEnd => {
                let c = get_char!(self);
                match c {
                    '\t' | '\n' | '\x0C' | ' ' | '/' | '>' => {
                        let esc = if &*self.temp_buf == "script" {
                            Escaped
                        } else {
                            DoubleEscaped
                        };
                        go!(self: emit c);
                        go!(self: to RawData ScriptDataEscaped esc);
                    },
                    _ => match lower_ascii_letter(c) {
                        Some(cl) => {
                            go!(self: push_temp cl);
                            go!(self: emit c);
                        },
                        None => go!(self: reconsume RawData ScriptDataEscaped DoubleEscaped),
                    },
                }
            },

            //§ before-attribute-name-state
            states::BeforeAttributeName => match get_char!(self) {
                '\t' | '\n' | '\x0C' | ' ' => (),
                '/' => go!(self: to SelfClosingStartTag),
                '>' => go!(self: emit_tag Data),
                '=' => {
                    go!(self: error UnexpectedEqualsSignBeforeAttributeName);
                    go!(self: create_attr; push_name '='; to AttributeName);
                },
                _ => go!(self: create_attr; reconsume AttributeName),
            },

            //§ attribute-name-state
            states::AttributeName => match get_char!(self) {
                '\t' | '\n' | '\x0C' | ' ' => go!(self: to AfterAttributeName),
                '/' => go!(self: to SelfClosingStartTag),
                '=' => go!(self: to BeforeAttributeValue),
                '>' => go!(self: emit_tag Data),
                '\0' => {
                    go!(self: error UnexpectedNullCharacter);
                    go!(self: push_name '\u{fffd}');
                },
                c => match lower_ascii_letter(c) {
                    Some(cl) => go!(self: push_name cl),
                    None => {
                        if matches!(c, '"' | '\'' | '<') {
                            go!(self: error UnexpectedCharacterInAttributeName);
                        }
                        go!(self: push_name c);
                    },
                },
            },

            //§ after-attribute-name-state
            states::AfterAttributeName => match get_char!(self) {
                '\t' | '\n' | '\x0C' | ' ' => (),
                '/' => go!(self: to SelfClosingStartTag),
                '=' => go!(self: to BeforeAttributeValue),
                '>' => go!(self: emit_tag Data),
                _ => go!(self: create_attr; reconsume AttributeName),
            },

            //§ before-attribute-value-state
            states::BeforeAttributeValue => match get_char!(self) {
                '\t' | '\n' | '\x0C' | ' ' => (),
                '"' => go!(self: to AttributeValue DoubleQuoted),
                '\'' => go!(self: to AttributeValue SingleQuoted),
                '>' => {
                    go!(self: error MissingAttributeValue);
                    go!(self: emit_tag Data);
                },
                _ => go!(self: reconsume AttributeValue Unquoted),
            },

            //§ attribute-value-(double-quoted)-state
            states::AttributeValue(DoubleQuoted) => match get_char!(self) {
                '"' => go!(self: to AfterAttributeValueQuoted),
                '&' => go!(self: consume_char_ref),
                '\0' => {
                    go!(self: error UnexpectedNullCharacter);
                    go!(self: push_value '\u{fffd}');
                },
                c => go!(self: push_value c),
            },

            //§ attribute-value-(single-quoted)-state
            states::AttributeValue(SingleQuoted) => match get_char!(self) {
                '\'' => go!(self: to AfterAttributeValueQuoted),
                '&' => go!(self: consume_char_ref),
                '\0' => {
                    go!(self: error UnexpectedNullCharacter);
                    go!(self: push_value '\u{fffd}');
                },
                c => go!(self: push_value c),
            },

            //§ attribute-value-(unquoted)-state
            states::AttributeValue(Unquoted) => match get_char!(self) {
                '\t' | '\n' | '\x0C' | ' ' => go!(self: to BeforeAttributeName),
                '&' => go!(self: consume_char_ref),
                '>' => go!(self: emit_tag Data),
                '\0' => {
                    go!(self: error UnexpectedNullCharacter);
                    go!(self: push_value '\u{fffd}');
                },
                c => {
                    if matches!(c, '"' | '\'' | '<' | '=' | '`') {
                        go!(self: error UnexpectedCharacterInUnquotedAttributeValue);
                    }
                    go!(self: push_value c);
                },
            },

            //§ after-attribute-value-(quoted)-state
            states::AfterAttributeValueQuoted => match get_char!(self) {
                '\t' | '\n' | '\x0C' | ' ' => go!(self: to BeforeAttributeName),
                '/' => go!(self: to SelfClosingStartTag),
                '>' => go!(self: emit_tag Data),
                _ => {
                    go!(self: error MissingWhitespaceBetweenAttributes);
                    go!(self: reconsume BeforeAttributeName);
                },
            },

            //§ self-closing-start-tag-state
            states::SelfClosingStartTag => match get_char!(self) {
                '>' => {
                    self.current_tag_self_closing = true;
                    go!(self: emit_tag Data);
                },
                _ => {
                    go!(self: error UnexpectedSolidusInTag);
                    go!(self: reconsume BeforeAttributeName);
                },
            },

            //§ comment-start-state
            states::CommentStart => match get_char!(self) {
                '-' => go!(self: to CommentStartDash),
                '>' => {
                    go!(self: error AbruptClosingOfEmptyComment);
                    go!(self: emit_comment; to Data);
                },
                _ => go!(self: reconsume Comment),
            },

            //§ comment-start-dash-state
            states::CommentStartDash => match get_char!(self) {
                '-' => go!(self: to CommentEnd),
                '>' => {
                    go!(self: error AbruptClosingOfEmptyComment);
                    go!(self: emit_comment; to Data);
                },
                _ => go!(self: push_comment '-'; reconsume Comment),
            },

            //§ comment-state
            states::Comment => match get_char!(self) {
                c @ '<' => go!(self: push_comment c; to CommentLessThanSign),
                '-' => go!(self: to CommentEndDash),
                '\0' => {
                    go!(self: error UnexpectedNullCharacter);
                    go!(self: push_comment '\u{fffd}');
                },
                c => go!(self: push_comment c),
            },

            //§ comment-less-than-sign-state
            states::CommentLessThanSign => match get_char!(self) {
                c @ '!' => go!(self: push_comment c; to CommentLessThanSignBang),
                c @ '<' => go!(self: push_comment c),
                _ => go!(self: reconsume Comment),
            },

            //§ comment-less-than-sign-bang-state
            states::CommentLessThanSignBang => match get_char!(self) {
                '-' => go!(self: to CommentLessThanSignBangDash),
                _ => go!(self: reconsume Comment),
            },

            //§ comment-less-than-sign-bang-dash-state
            states::CommentLessThanSignBangDash => match get_char!(self) {
                '-' => go!(self: to CommentLessThanSignBangDashDash),
                _ => go!(self: reconsume CommentEndDash),
            },

            //§ comment-less-than-sign-bang-dash-dash-state
            states::CommentLessThanSignBangDashDash => match get_char!(self) {
                '>' => go!(self: reconsume CommentEnd),
                _ => {
                    go!(self: error NestedComment);
                    go!(self: reconsume CommentEnd);
                },
            },

            //§ comment-end-dash-state
            states::CommentEndDash => match get_char!(self) {
                '-' => go!(self: to CommentEnd),
                _ => go!(self: push_comment '-'; reconsume Comment),
            },

            //§ comment-end-state
            states::CommentEnd => match get_char!(self) {
                '>' => go!(self: emit_comment; to Data),
                '!' => go!(self: to CommentEndBang),
                '-' => go!(self: push_comment '-'),
                _ => go!(self: append_comment "--"; reconsume Comment),
            },

            //§ comment-end-bang-state
            states::CommentEndBang => match get_char!(self) {
                '-' => go!(self: append_comment "--!"; to CommentEndDash),
                '>' => {
                    go!(self: error IncorrectlyClosedComment);
                    go!(self: emit_comment; to Data);
                },
                _ => go!(self: append_comment "--!"; reconsume Comment),
            },

            //§ doctype-state
            states::Doctype => match get_char!(self) {
                '\t' | '\n' | '\x0C' | ' ' => go!(self: to BeforeDoctypeName),
                '>' => go!(self: reconsume BeforeDoctypeName),
                _ => {
                    go!(self: error MissingWhitespaceBeforeDoctypeName);
                    go!(self: reconsume BeforeDoctypeName);
                },
            },

            //§ before-doctype-name-state
            states::BeforeDoctypeName => match get_char!(self) {
                '\t' | '\n' | '\x0C' | ' ' => (),
                '\0' => {
                    go!(self: error UnexpectedNullCharacter);
                    go!(self: create_doctype; push_doctype_name '\u{fffd}'; to DoctypeName);
                },
                '>' => {
                    go!(self: error MissingDoctypeName);
                    go!(self: create_doctype; force_quirks; emit_doctype; to Data);
                },
                c => go!(self: create_doctype; push_doctype_name (c.to_ascii_lowercase());
                              to DoctypeName),
            },

            //§ doctype-name-state
            states::DoctypeName => match get_char!(self) {
                '\t' | '\n' | '\x0C' | ' ' => go!(self: to AfterDoctypeName),
                '>' => go!(self: emit_doctype; to Data),
                '\0' => {
                    go!(self: error UnexpectedNullCharacter);
                    go!(self: push_doctype_name '\u{fffd}');
                },
                c => go!(self: push_doctype_name (c.to_ascii_lowercase())),
            },

            //§ after-doctype-name-state
            states::AfterDoctypeName => {
                if eat!(self, "public") {
                    go!(self: to AfterDoctypeKeyword Public);
                } else if eat!(self, "system") {
                    go!(self: to AfterDoctypeKeyword System);
                } else {
                    match get_char!(self) {
                        '\t' | '\n' | '\x0C' | ' ' => (),
                        '>' => go!(self: emit_doctype; to Data),
                        _ => {
                            go!(self: error InvalidCharacterSequenceAfterDoctypeName);
                            go!(self: force_quirks; reconsume BogusDoctype);
                        },
                    }
                }
            },

            //§ after-doctype-public-keyword-state after-doctype-system-keyword-state
            states::AfterDoctypeKeyword(kind) => match get_char!(self) {
                '\t' | '\n' | '\x0C' | ' ' => go!(self: to BeforeDoctypeIdentifier kind),
                '"' => {
                    self.emit_error(missing_whitespace_after_keyword(kind));
                    go!(self: clear_doctype_id kind; to DoctypeIdentifierDoubleQuoted kind);
                },
                '\'' => {
                    self.emit_error(missing_whitespace_after_keyword(kind));
                    go!(self: clear_doctype_id kind; to DoctypeIdentifierSingleQuoted kind);
                },
                '>' => {
                    self.emit_error(missing_doctype_identifier(kind));
                    go!(self: force_quirks; emit_doctype; to Data);
                },
                _ => {
                    self.emit_error(missing_quote_before_identifier(kind));
                    go!(self: force_quirks; reconsume BogusDoctype);
                },
            },

            //§ before-doctype-public-identifier-state before-doctype-system-identifier-state
            states::BeforeDoctypeIdentifier(kind) => match get_char!(self) {
                '\t' | '\n' | '\x0C' | ' ' => (),
                '"' => go!(self: clear_doctype_id kind; to DoctypeIdentifierDoubleQuoted kind),
                '\'' => go!(self: clear_doctype_id kind; to DoctypeIdentifierSingleQuoted kind),
                '>' => {
                    self.emit_error(missing_doctype_identifier(kind));
                    go!(self: force_quirks; emit_doctype; to Data);
                },
                _ => {
                    self.emit_error(missing_quote_before_identifier(kind));
                    go!(self: force_quirks; reconsume BogusDoctype);
                },
            },

            //§ doctype-public-identifier-(double-quoted)-state doctype-system-identifier-(double-quoted)-state
            states::DoctypeIdentifierDoubleQuoted(kind) => match get_char!(self) {
                '"' => go!(self: to AfterDoctypeIdentifier kind),
                '\0' => {
                    go!(self: error UnexpectedNullCharacter);
                    go!(self: push_doctype_id kind '\u{fffd}');
                },
                '>' => {
                    self.emit_error(abrupt_doctype_identifier(kind));
                    go!(self: force_quirks; emit_doctype; to Data);
                },
                c => go!(self: push_doctype_id kind c),
            },

            //§ doctype-public-identifier-(single-quoted)-state doctype-system-identifier-(single-quoted)-state
            states::DoctypeIdentifierSingleQuoted(kind) => match get_char!(self) {
                '\'' => go!(self: to AfterDoctypeIdentifier kind),
                '\0' => {
                    go!(self: error UnexpectedNullCharacter);
                    go!(self: push_doctype_id kind '\u{fffd}');
                },
                '>' => {
                    self.emit_error(abrupt_doctype_identifier(kind));
                    go!(self: force_quirks; emit_doctype; to Data);
                },
                c => go!(self: push_doctype_id kind c),
            },

            //§ after-doctype-public-identifier-state
            states::AfterDoctypeIdentifier(Public) => match get_char!(self) {
                '\t' | '\n' | '\x0C' | ' ' => {
                    go!(self: to BetweenDoctypePublicAndSystemIdentifiers)
                },
                '>' => go!(self: emit_doctype; to Data),
                '"' => {
                    go!(self: error MissingWhitespaceBetweenDoctypePublicAndSystemIdentifiers);
                    go!(self: clear_doctype_id System; to DoctypeIdentifierDoubleQuoted System);
                },
                '\'' => {
                    go!(self: error MissingWhitespaceBetweenDoctypePublicAndSystemIdentifiers);
                    go!(self: clear_doctype_id System; to DoctypeIdentifierSingleQuoted System);
                },
                _ => {
                    go!(self: error MissingQuoteBeforeDoctypeSystemIdentifier);
                    go!(self: force_quirks; reconsume BogusDoctype);
                },
            },

            //§ after-doctype-system-identifier-state
            states::AfterDoctypeIdentifier(System) => match get_char!(self) {
                '\t' | '\n' | '\x0C' | ' ' => (),
                '>' => go!(self: emit_doctype; to Data),
                _ => {
                    go!(self: error UnexpectedCharacterAfterDoctypeSystemIdentifier);
                    go!(self: reconsume BogusDoctype);
                },
            },

            //§ between-doctype-public-and-system-identifiers-state
            states::BetweenDoctypePublicAndSystemIdentifiers => match get_char!(self) {
                '\t' | '\n' | '\x0C' | ' ' => (),
                '>' => go!(self: emit_doctype; to Data),
                '"' => {
                    go!(self: clear_doctype_id System; to DoctypeIdentifierDoubleQuoted System)
                },
                '\'' => {
                    go!(self: clear_doctype_id System; to DoctypeIdentifierSingleQuoted System)
                },
                _ => {
                    go!(self: error MissingQuoteBeforeDoctypeSystemIdentifier);
                    go!(self: force_quirks; reconsume BogusDoctype);
                },
            },

            //§ bogus-doctype-state
            states::BogusDoctype => match get_char!(self) {
                '>' => go!(self: emit_doctype; to Data),
                '\0' => go!(self: error UnexpectedNullCharacter),
                _ => (),
            },

            //§ bogus-comment-state
            states::BogusComment => match get_char!(self) {
                '>' => go!(self: emit_comment; to Data),
                '\0' => {
                    go!(self: error UnexpectedNullCharacter);
                    go!(self: push_comment '\u{fffd}');
                },
                c => go!(self: push_comment c),
            },

            //§ markup-declaration-open-state
            states::MarkupDeclarationOpen => {
                if eat_exact!(self, "--") {
                    go!(self: clear_comment; to CommentStart);
                } else if eat!(self, "doctype") {
                    go!(self: to Doctype);
                } else if eat_exact!(self, "[CDATA[") {
                    if self
                        .sink
                        .adjusted_current_node_present_but_not_in_html_namespace()
                    {
                        go!(self: to CdataSection);
                    }
                    go!(self: error CDataInHtmlContent);
                    go!(self: clear_comment; append_comment "[CDATA["; to BogusComment);
                } else {
                    go!(self: error IncorrectlyOpenedComment);
                    go!(self: clear_comment; to BogusComment);
                }
            },

            //§ cdata-section-state
            states::CdataSection => match get_char!(self) {
                ']' => go!(self: to CdataSectionBracket),
                c => go!(self: emit c),
            },

            //§ cdata-section-bracket-state
            states::CdataSectionBracket => match get_char!(self) {
                ']' => go!(self: to CdataSectionEnd),
                _ => {
                    go!(self: emit ']');
                    go!(self: reconsume CdataSection);
                },
            },

            //§ cdata-section-end-state
            states::CdataSectionEnd => match get_char!(self) {
                ']' => go!(self: emit ']'),
                '>' => go!(self: to Data),
                _ => {
                    go!(self: emit ']');
                    go!(self: emit ']');
                    go!(self: reconsume CdataSection);
                },
            },
            //§ END
        }
    }

    fn eof_step(&mut self) {
        debug!("processing EOF in state {:?}", self.state);
        match self.state {
            states::Data
            | states::RawData(Rcdata)
            | states::RawData(Rawtext)
            | states::RawData(ScriptData)
            | states::Plaintext => go!(self: eof),

            states::TagName
            | states::BeforeAttributeName
            | states::AttributeName
            | states::AfterAttributeName
            | states::AttributeValue(_)
            | states::AfterAttributeValueQuoted
            | states::SelfClosingStartTag => {
                go!(self: error EofInTag);
                go!(self: to Data);
            },

            states::RawData(ScriptDataEscaped(_))
            | states::ScriptDataEscapedDash(_)
            | states::ScriptDataEscapedDashDash(_) => {
                go!(self: error EofInScriptHtmlCommentLikeText);
                go!(self: to Data);
            },

            states::BeforeAttributeValue => go!(self: reconsume AttributeValue Unquoted),

            states::TagOpen => {
                go!(self: error EofBeforeTagName);
                go!(self: emit '<');
                go!(self: to Data);
            },

            states::EndTagOpen => {
                go!(self: error EofBeforeTagName);
                go!(self: emit '<');
                go!(self: emit '/');
                go!(self: to Data);
            },

            states::RawLessThanSign(ScriptDataEscaped(DoubleEscaped)) => {
                go!(self: to RawData ScriptDataEscaped DoubleEscaped)
            },

            states::RawLessThanSign(kind) => {
                go!(self: emit '<');
                go!(self: to RawData kind);
            },

            states::RawEndTagOpen(kind) => {
                go!(self: emit '<');
                go!(self: emit '/');
                go!(self: to RawData kind);
            },

            states::RawEndTagName(kind) => {
                go!(self: discard_tag);
                go!(self: emit '<');
                go!(self: emit '/');
                go!(self: emit_temp);
                go!(self: to RawData kind);
            },

            states::ScriptDataEscapeStart(Escaped) => go!(self: to RawData ScriptData),

            states::ScriptDataEscapeStart(DoubleEscaped) => {
                go!(self: to RawData ScriptDataEscaped Escaped)
            },

            states::ScriptDataEscapeStartDash => go!(self: to RawData ScriptData),

            states::ScriptDataDoubleEscapeEnd => {
                go!(self: to RawData ScriptDataEscaped DoubleEscaped)
            },

            states::CommentStart
            | states::CommentStartDash
            | states::Comment
            | states::CommentEndDash
            | states::CommentEnd
            | states::CommentEndBang => {
                go!(self: error EofInComment);
                go!(self: emit_comment; to Data);
            },

            states::CommentLessThanSign | states::CommentLessThanSignBang => {
                go!(self: reconsume Comment)
            },

            states::CommentLessThanSignBangDash => go!(self: reconsume CommentEndDash),

            states::CommentLessThanSignBangDashDash => go!(self: reconsume CommentEnd),

            states::Doctype | states::BeforeDoctypeName => {
                go!(self: error EofInDoctype);
                go!(self: create_doctype; force_quirks; emit_doctype; to Data);
            },

            states::DoctypeName
            | states::AfterDoctypeName
            | states::AfterDoctypeKeyword(_)
            | states::BeforeDoctypeIdentifier(_)
            | states::DoctypeIdentifierDoubleQuoted(_)
            | states::DoctypeIdentifierSingleQuoted(_)
            | states::AfterDoctypeIdentifier(_)
            | states::BetweenDoctypePublicAndSystemIdentifiers => {
                go!(self: error EofInDoctype);
                go!(self: force_quirks; emit_doctype; to Data);
            },

            states::BogusDoctype => go!(self: emit_doctype; to Data),

            states::BogusComment => go!(self: emit_comment; to Data),

            states::MarkupDeclarationOpen => {
                go!(self: error IncorrectlyOpenedComment);
                go!(self: clear_comment; to BogusComment);
            },

            states::CdataSection => {
                go!(self: error EofInCdata);
                go!(self: to Data);
            },

            states::CdataSectionBracket => {
                go!(self: emit ']');
                go!(self: to CdataSection);
            },

            states::CdataSectionEnd => {
                go!(self: emit ']');
                go!(self: emit ']');
                go!(self: to CdataSection);
            },
        }
    }
}

impl<R: Read, Sink: ErrorSink> Iterator for Tokenizer<R, Sink> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.next_token()
    }
}

fn missing_whitespace_after_keyword(kind: DoctypeIdKind) -> ParseError {
    match kind {
        Public => ParseError::MissingWhitespaceAfterDoctypePublicKeyword,
        System => ParseError::MissingWhitespaceAfterDoctypeSystemKeyword,
    }
}

fn missing_doctype_identifier(kind: DoctypeIdKind) -> ParseError {
    match kind {
        Public => ParseError::MissingDoctypePublicIdentifier,
        System => ParseError::MissingDoctypeSystemIdentifier,
    }
}

fn missing_quote_before_identifier(kind: DoctypeIdKind) -> ParseError {
    match kind {
        Public => ParseError::MissingQuoteBeforeDoctypePublicIdentifier,
        System => ParseError::MissingQuoteBeforeDoctypeSystemIdentifier,
    }
}

fn abrupt_doctype_identifier(kind: DoctypeIdKind) -> ParseError {
    match kind {
        Public => ParseError::AbruptDoctypePublicIdentifier,
        System => ParseError::AbruptDoctypeSystemIdentifier,
    }
}

// Copyright 2024-2025 The html5tok Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::fmt;

use crate::reader::Position;
use crate::tendril::StrTendril;

pub use self::TagKind::{EndTag, StartTag};
pub use self::Token::{CharacterToken, CommentToken, DoctypeToken, EOFToken, TagToken};

/// A `DOCTYPE` token. A `None` identifier is distinct from a present but
/// empty one; the distinction is observable in quirks-mode decisions.
#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct Doctype {
    pub name: Option<StrTendril>,
    pub public_id: Option<StrTendril>,
    pub system_id: Option<StrTendril>,
    pub force_quirks: bool,
}

#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum TagKind {
    StartTag,
    EndTag,
}

/// A tag attribute. Names are lowercased during construction.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Attribute {
    pub name: StrTendril,
    pub value: StrTendril,
}

/// A tag token. An emitted end tag never carries attributes and is never
/// self-closing; offending input raises a parse error instead.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Tag {
    pub kind: TagKind,
    pub name: StrTendril,
    pub self_closing: bool,
    pub attrs: Vec<Attribute>,
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Token {
    DoctypeToken(Doctype),
    TagToken(Tag),
    CommentToken(StrTendril),
    CharacterToken(char),
    EOFToken,
}

/// The parse errors of WHATWG HTML §13.2, plus [`MalformedInput`] for a
/// byte source the reader cannot decode.
///
/// [`MalformedInput`]: ParseError::MalformedInput
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum ParseError {
    AbruptClosingOfEmptyComment,
    AbruptDoctypePublicIdentifier,
    AbruptDoctypeSystemIdentifier,
    AbsenceOfDigitsInNumericCharacterReference,
    CDataInHtmlContent,
    CharacterReferenceOutsideUnicodeRange,
    ControlCharacterReference,
    DuplicateAttribute,
    EndTagWithAttributes,
    EndTagWithTrailingSolidus,
    EofBeforeTagName,
    EofInCdata,
    EofInComment,
    EofInDoctype,
    EofInScriptHtmlCommentLikeText,
    EofInTag,
    IncorrectlyClosedComment,
    IncorrectlyOpenedComment,
    InvalidCharacterSequenceAfterDoctypeName,
    InvalidFirstCharacterOfTagName,
    MalformedInput,
    MissingAttributeValue,
    MissingDoctypeName,
    MissingDoctypePublicIdentifier,
    MissingDoctypeSystemIdentifier,
    MissingEndTagName,
    MissingQuoteBeforeDoctypePublicIdentifier,
    MissingQuoteBeforeDoctypeSystemIdentifier,
    MissingSemicolonAfterCharacterReference,
    MissingWhitespaceAfterDoctypePublicKeyword,
    MissingWhitespaceAfterDoctypeSystemKeyword,
    MissingWhitespaceBeforeDoctypeName,
    MissingWhitespaceBetweenAttributes,
    MissingWhitespaceBetweenDoctypePublicAndSystemIdentifiers,
    NestedComment,
    NoncharacterCharacterReference,
    NullCharacterReference,
    SurrogateCharacterReference,
    UnexpectedCharacterAfterDoctypeSystemIdentifier,
    UnexpectedCharacterInAttributeName,
    UnexpectedCharacterInUnquotedAttributeValue,
    UnexpectedEqualsSignBeforeAttributeName,
    UnexpectedNullCharacter,
    UnexpectedQuestionMarkInsteadOfTagName,
    UnexpectedSolidusInTag,
    UnknownNamedCharacterReference,
}

impl ParseError {
    /// The WHATWG error code for this error.
    pub fn code(&self) -> &'static str {
        use self::ParseError::*;
        match *self {
            AbruptClosingOfEmptyComment => "abrupt-closing-of-empty-comment",
            AbruptDoctypePublicIdentifier => "abrupt-doctype-public-identifier",
            AbruptDoctypeSystemIdentifier => "abrupt-doctype-system-identifier",
            AbsenceOfDigitsInNumericCharacterReference => {
                "absence-of-digits-in-numeric-character-reference"
            },
            CDataInHtmlContent => "cdata-in-html-content",
            CharacterReferenceOutsideUnicodeRange => "character-reference-outside-unicode-range",
            ControlCharacterReference => "control-character-reference",
            DuplicateAttribute => "duplicate-attribute",
            EndTagWithAttributes => "end-tag-with-attributes",
            EndTagWithTrailingSolidus => "end-tag-with-trailing-solidus",
            EofBeforeTagName => "eof-before-tag-name",
            EofInCdata => "eof-in-cdata",
            EofInComment => "eof-in-comment",
            EofInDoctype => "eof-in-doctype",
            EofInScriptHtmlCommentLikeText => "eof-in-script-html-comment-like-text",
            EofInTag => "eof-in-tag",
            IncorrectlyClosedComment => "incorrectly-closed-comment",
            IncorrectlyOpenedComment => "incorrectly-opened-comment",
            InvalidCharacterSequenceAfterDoctypeName => {
                "invalid-character-sequence-after-doctype-name"
            },
            InvalidFirstCharacterOfTagName => "invalid-first-character-of-tag-name",
            MalformedInput => "malformed-input",
            MissingAttributeValue => "missing-attribute-value",
            MissingDoctypeName => "missing-doctype-name",
            MissingDoctypePublicIdentifier => "missing-doctype-public-identifier",
            MissingDoctypeSystemIdentifier => "missing-doctype-system-identifier",
            MissingEndTagName => "missing-end-tag-name",
            MissingQuoteBeforeDoctypePublicIdentifier => {
                "missing-quote-before-doctype-public-identifier"
            },
            MissingQuoteBeforeDoctypeSystemIdentifier => {
                "missing-quote-before-doctype-system-identifier"
            },
            MissingSemicolonAfterCharacterReference => {
                "missing-semicolon-after-character-reference"
            },
            MissingWhitespaceAfterDoctypePublicKeyword => {
                "missing-whitespace-after-doctype-public-keyword"
            },
            MissingWhitespaceAfterDoctypeSystemKeyword => {
                "missing-whitespace-after-doctype-system-keyword"
            },
            MissingWhitespaceBeforeDoctypeName => "missing-whitespace-before-doctype-name",
            MissingWhitespaceBetweenAttributes => "missing-whitespace-between-attributes",
            MissingWhitespaceBetweenDoctypePublicAndSystemIdentifiers => {
                "missing-whitespace-between-doctype-public-and-system-identifiers"
            },
            NestedComment => "nested-comment",
            NoncharacterCharacterReference => "noncharacter-character-reference",
            NullCharacterReference => "null-character-reference",
            SurrogateCharacterReference => "surrogate-character-reference",
            UnexpectedCharacterAfterDoctypeSystemIdentifier => {
                "unexpected-character-after-doctype-system-identifier"
            },
            UnexpectedCharacterInAttributeName => "unexpected-character-in-attribute-name",
            UnexpectedCharacterInUnquotedAttributeValue => {
                "unexpected-character-in-unquoted-attribute-value"
            },
            UnexpectedEqualsSignBeforeAttributeName => {
                "unexpected-equals-sign-before-attribute-name"
            },
            UnexpectedNullCharacter => "unexpected-null-character",
            UnexpectedQuestionMarkInsteadOfTagName => {
                "unexpected-question-mark-instead-of-tag-name"
            },
            UnexpectedSolidusInTag => "unexpected-solidus-in-tag",
            UnknownNamedCharacterReference => "unknown-named-character-reference",
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The side channel for parse errors, and the tree-construction query the
/// tokenizer cannot answer on its own.
///
/// The sink must not panic back into the tokenizer; errors never interrupt
/// token emission.
pub trait ErrorSink {
    /// Called once for every parse error, at the earliest observation point.
    fn parse_error(&self, error: ParseError, position: Position);

    /// Used in the markup declaration open state. By default, this always
    /// returns false and thus all CDATA sections are tokenized as bogus
    /// comments.
    /// <https://html.spec.whatwg.org/multipage/#markup-declaration-open-state>
    fn adjusted_current_node_present_but_not_in_html_namespace(&self) -> bool {
        false
    }
}

/// An [`ErrorSink`] that discards everything.
pub struct IgnoreParseErrors;

impl ErrorSink for IgnoreParseErrors {
    fn parse_error(&self, _: ParseError, _: Position) {}
}

/// The named character reference table, consumed as an abstract dictionary.
///
/// Keys are the reference names without the leading ampersand, including the
/// trailing semicolon where the entry has one (`"amp;"`, and the legacy
/// `"amp"`). The tokenizer walks the table a character at a time and keeps
/// the longest key it has seen, so both operations need to be cheap; a trie
/// or DAFSA built once at startup is the expected shape.
pub trait NamedReferences {
    /// Does any table entry start with `prefix`?
    fn has_prefix(&self, prefix: &str) -> bool;

    /// The replacement code point(s) for an exact table entry.
    fn resolve(&self, name: &str) -> Option<(char, Option<char>)>;
}

/// The empty table: every named reference is treated as unknown text.
pub struct NoNamedReferences;

impl NamedReferences for NoNamedReferences {
    fn has_prefix(&self, _: &str) -> bool {
        false
    }

    fn resolve(&self, _: &str) -> Option<(char, Option<char>)> {
        None
    }
}

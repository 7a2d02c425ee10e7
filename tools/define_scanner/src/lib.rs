//! Recovers `#define NAME VALUE` pairs from a raw preprocessing token stream.
//!
//! The scan works on unexpanded tokens and is independent of the AST: the AST already reflects
//! macro-expanded source, while this recovers the literal definitions. Only object-like macros
//! with a non-empty body are reported; a function-like macro's parameter list ends up as part of
//! the literal text.


use serde::{Deserialize, Serialize};
use tracing::debug;
use typedb_core::DefineEntry;

/// Token category as reported by the tokenizer.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum TokenKind {
    Punctuation,
    Keyword,
    Identifier,
    Literal,
    Comment,
}

/// One preprocessing token.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub spelling: String,
}

impl Token {
    pub fn new<S: Into<String>>(kind: TokenKind, spelling: S) -> Token {
        Token {
            kind,
            spelling: spelling.into(),
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
enum State {
    #[default]
    Idle,
    SawHash,
    SawDefine,
    CollectingValue {
        identifier: String,
        value: String,
    },
}

/// Incremental scanner. Feed it every token of a stream in order, then call
/// [DefineScanner::finish].
#[derive(Debug, Default)]
pub struct DefineScanner {
    state: State,
    defines: Vec<DefineEntry>,
}

impl DefineScanner {
    pub fn new() -> DefineScanner {
        DefineScanner::default()
    }

    /// Advances the state machine by one token.
    pub fn feed(&mut self, kind: TokenKind, spelling: &str) {
        use TokenKind::*;
        if kind == Comment {
            return;
        }
        let is_hash = kind == Punctuation && spelling.starts_with('#');
        self.state = match std::mem::take(&mut self.state) {
            State::Idle if is_hash => State::SawHash,
            State::Idle => State::Idle,
            State::SawHash if kind == Identifier && spelling == "define" => State::SawDefine,
            State::SawHash => State::Idle,
            State::SawDefine if kind == Identifier => State::CollectingValue {
                identifier: spelling.to_owned(),
                value: String::new(),
            },
            State::SawDefine => State::Idle,
            State::CollectingValue { identifier, value } if is_hash => {
                self.emit(identifier, value);
                State::SawHash
            }
            State::CollectingValue { identifier, .. } if kind == Keyword => {
                debug!("Keyword {spelling:?} aborts #define {identifier}");
                State::Idle
            }
            State::CollectingValue {
                identifier,
                mut value,
            } => {
                value.push_str(spelling);
                State::CollectingValue { identifier, value }
            }
        };
    }

    /// Flushes a macro still being collected at end of stream and returns every entry found.
    pub fn finish(mut self) -> Vec<DefineEntry> {
        if let State::CollectingValue { identifier, value } = std::mem::take(&mut self.state) {
            self.emit(identifier, value);
        }
        self.defines
    }

    fn emit(&mut self, identifier: String, literal: String) {
        if literal.is_empty() {
            debug!("Dropping #define {identifier} without a value");
            return;
        }
        debug!("add #define {identifier} {literal}");
        self.defines.push(DefineEntry {
            identifier,
            literal,
        });
    }
}

/// Scans one complete token stream.
pub fn scan_defines<'t, I: IntoIterator<Item = &'t Token>>(tokens: I) -> Vec<DefineEntry> {
    let mut scanner = DefineScanner::new();
    for token in tokens {
        scanner.feed(token.kind, &token.spelling);
    }
    scanner.finish()
}

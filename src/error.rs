use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::token::{Position, Token};

/// Where a parse error was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "at", rename_all = "snake_case")]
pub enum Location {
    /// At the token starting at this position
    Token(Position),
    /// The script ended before the construct was complete; the position is
    /// where the input ran out
    EndOfInput(Position),
}

impl Location {
    pub fn of(token: &Token) -> Self {
        if token.is_eof() {
            Location::EndOfInput(token.position)
        } else {
            Location::Token(token.position)
        }
    }

    pub fn position(&self) -> Position {
        match self {
            Location::Token(position) | Location::EndOfInput(position) => *position,
        }
    }

    pub fn is_end_of_input(&self) -> bool {
        matches!(self, Location::EndOfInput(_))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Token(p) => write!(f, "line {}, column {}", p.line, p.column),
            Location::EndOfInput(p) => {
                write!(f, "unexpected end of input at line {}, column {}", p.line, p.column)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseErrorKind {
    #[error("script is empty")]
    EmptyScript,

    #[error("expected a key, value or group, found {found}")]
    UnexpectedToken { found: String },

    #[error("unrecognized token {found}")]
    UnrecognizedToken { found: String },

    #[error("'{operator}' must be followed by {operand}, found {found}")]
    MissingOperand {
        operator: char,
        operand: &'static str,
        found: String,
    },

    #[error("'{open}' opened at {opened_at} is never closed")]
    UnclosedBracket { open: char, opened_at: Position },

    #[error("expected '{expected}' to close '{open}' opened at {opened_at}, found {found}")]
    MismatchedBracket {
        open: char,
        expected: char,
        opened_at: Position,
        found: String,
    },

    #[error("unmatched closing bracket {found}")]
    UnmatchedClosingBracket { found: String },

    #[error("unexpected trailing token {found}")]
    TrailingToken { found: String },

    #[error("repeat count must be at least 1, found {value}")]
    InvalidRepeatCount { value: String },

    #[error("wheel amount must be at least 1, found {value}")]
    InvalidWheelAmount { value: String },

    #[error("number {value} is out of range")]
    NumberOutOfRange { value: String },

    #[error("nesting exceeds the maximum depth of {limit}")]
    NestingTooDeep { limit: usize },
}

/// Structural grammar violation. Parsing stops at the first one.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{location}: {kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub location: Location,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, location: Location) -> Self {
        Self { kind, location }
    }

    pub fn at(kind: ParseErrorKind, token: &Token) -> Self {
        Self::new(kind, Location::of(token))
    }

    /// Message without the location prefix.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    pub fn position(&self) -> Position {
        self.location.position()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    #[test]
    fn test_location_of_eof_is_end_of_input() {
        let eof = Token::new(TokenKind::Eof, "", Position::new(1, 3), 2);
        let location = Location::of(&eof);
        assert!(location.is_end_of_input());
        assert_eq!(location.position(), Position::new(1, 3));

        let key = Token::new(TokenKind::Key, "q", Position::new(1, 1), 0);
        assert_eq!(Location::of(&key), Location::Token(Position::new(1, 1)));
    }

    #[test]
    fn test_error_display() {
        let token = Token::new(TokenKind::Key, "x", Position::new(2, 4), 9);
        let error = ParseError::at(
            ParseErrorKind::MissingOperand {
                operator: '*',
                operand: "a repeat count",
                found: token.describe(),
            },
            &token,
        );
        assert_eq!(
            error.to_string(),
            "line 2, column 4: '*' must be followed by a repeat count, found 'x'"
        );
        assert_eq!(
            error.message(),
            "'*' must be followed by a repeat count, found 'x'"
        );
    }

    #[test]
    fn test_end_of_input_display() {
        let error = ParseError::new(
            ParseErrorKind::EmptyScript,
            Location::EndOfInput(Position::new(1, 1)),
        );
        assert_eq!(
            error.to_string(),
            "unexpected end of input at line 1, column 1: script is empty"
        );
    }
}

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// 1-based line/column location in the script source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Lexical category of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    /// Key name, already lowercased
    Key,
    Number,
    /// `$name`; the token text holds the name without the sigil
    Variable,
    /// `@(x,y)` with both coordinates parsed
    MouseCoord { x: i32, y: i32 },
    /// `wheel_up` / `wheel_down`, optionally with a `+N` / `-N` step
    Wheel,

    Comma,
    Plus,
    Pipe,
    Tilde,
    Star,
    Ampersand,

    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    LAngle,
    /// `>`: closes a fade suffix or chains held keys
    RAngle,

    Newline,
    /// A single character no lexical form claims
    Unknown,
    Eof,
}

impl TokenKind {
    /// Stable upper-snake name used in listings and statistics.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Key => "KEY",
            TokenKind::Number => "NUMBER",
            TokenKind::Variable => "VARIABLE",
            TokenKind::MouseCoord { .. } => "MOUSE_COORD",
            TokenKind::Wheel => "WHEEL",
            TokenKind::Comma => "COMMA",
            TokenKind::Plus => "PLUS",
            TokenKind::Pipe => "PIPE",
            TokenKind::Tilde => "TILDE",
            TokenKind::Star => "STAR",
            TokenKind::Ampersand => "AMPERSAND",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::LBracket => "LBRACKET",
            TokenKind::RBracket => "RBRACKET",
            TokenKind::LBrace => "LBRACE",
            TokenKind::RBrace => "RBRACE",
            TokenKind::LAngle => "LANGLE",
            TokenKind::RAngle => "RANGLE",
            TokenKind::Newline => "NEWLINE",
            TokenKind::Unknown => "UNKNOWN",
            TokenKind::Eof => "EOF",
        }
    }

    /// Literal kinds that become terminal AST nodes.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            TokenKind::Key
                | TokenKind::Number
                | TokenKind::Variable
                | TokenKind::MouseCoord { .. }
                | TokenKind::Wheel
        )
    }

    /// The closing bracket matching this opening bracket, if it is one.
    pub fn closing(&self) -> Option<TokenKind> {
        match self {
            TokenKind::LParen => Some(TokenKind::RParen),
            TokenKind::LBracket => Some(TokenKind::RBracket),
            TokenKind::LBrace => Some(TokenKind::RBrace),
            TokenKind::LAngle => Some(TokenKind::RAngle),
            _ => None,
        }
    }
}

/// A single lexical unit with its source location
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text of the token; normalised for keys, wheels, variables and
    /// mouse coordinates
    pub text: String,
    pub position: Position,
    /// Byte offset of the first character
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: Position, offset: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
            offset,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// Short form for error messages: the quoted text, or a phrase for
    /// tokens without visible text.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::Newline => "newline".to_string(),
            _ => format!("'{}'", self.text),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "EOF at {}", self.position),
            TokenKind::Newline => write!(f, "NEWLINE at {}", self.position),
            kind => write!(f, "{}('{}') at {}", kind.name(), self.text, self.position),
        }
    }
}

/// Count tokens per kind name.
pub fn token_statistics(tokens: &[Token]) -> BTreeMap<&'static str, usize> {
    let mut stats = BTreeMap::new();
    for token in tokens {
        *stats.entry(token.kind.name()).or_insert(0) += 1;
    }
    stats
}

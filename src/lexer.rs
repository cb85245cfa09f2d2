use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;

use crate::token::{Position, Token, TokenKind};

#[derive(Parser)]
#[grammar = "src/msl.pest"]
struct MslGrammar;

/// Split MSL source into tokens.
///
/// Never fails: characters outside the language come back as one-character
/// `Unknown` tokens so the validator and parser can point at them. The result
/// always ends with exactly one `Eof` token.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut origin = Origin::START;

    while let Some(resume) = lex_segment(&text[origin.offset..], origin, &mut tokens) {
        origin = resume;
    }

    tracing::trace!(count = tokens.len(), "tokenized script");
    tokens
}

/// Where a lexed segment starts within the whole script.
#[derive(Debug, Clone, Copy)]
struct Origin {
    offset: usize,
    position: Position,
}

impl Origin {
    const START: Origin = Origin {
        offset: 0,
        position: Position { line: 1, column: 1 },
    };

    /// Map a segment-relative line/column and byte offset onto the script.
    fn locate(&self, (line, column): (usize, usize), offset: usize) -> (Position, usize) {
        let position = if line == 1 {
            Position::new(self.position.line, self.position.column + column - 1)
        } else {
            Position::new(self.position.line + line - 1, column)
        };
        (position, self.offset + offset)
    }

    /// The origin just past a one-character token.
    fn after(token: &Token) -> Origin {
        Origin {
            offset: token.offset + token.text.len(),
            position: Position::new(token.position.line, token.position.column + 1),
        }
    }
}

enum Lexed {
    Token(Token),
    /// The token is a lone `Unknown` character; lexing restarts right after it
    Restart(Token),
}

/// Lex one segment into `tokens`. Returns where to resume when the segment
/// had to be cut short.
fn lex_segment(segment: &str, origin: Origin, tokens: &mut Vec<Token>) -> Option<Origin> {
    let pairs = match MslGrammar::parse(Rule::script, segment) {
        Ok(pairs) => pairs,
        Err(error) => {
            // The grammar has a catch-all lexeme, so this only guards against
            // a grammar regression.
            tracing::error!(%error, "lexical grammar rejected input");
            let (position, offset) = origin.locate((1, 1), 0);
            let (end, end_offset) = origin.locate(end_line_col(segment), segment.len());
            tokens.push(Token::new(TokenKind::Unknown, segment, position, offset));
            tokens.push(Token::new(TokenKind::Eof, "", end, end_offset));
            return None;
        }
    };

    for pair in pairs {
        match lex_token(pair, origin) {
            Lexed::Token(token) => tokens.push(token),
            Lexed::Restart(token) => {
                let resume = Origin::after(&token);
                tokens.push(token);
                return Some(resume);
            }
        }
    }
    None
}

fn lex_token(pair: Pair<'_, Rule>, origin: Origin) -> Lexed {
    let span = pair.as_span();
    let (position, offset) = origin.locate(span.start_pos().line_col(), span.start());
    let text = pair.as_str();

    let kind = match pair.as_rule() {
        Rule::key => {
            return Lexed::Token(Token::new(TokenKind::Key, text.to_lowercase(), position, offset));
        }
        Rule::wheel => {
            let wheel = Token::new(TokenKind::Wheel, text.to_lowercase(), position, offset);
            return Lexed::Token(wheel);
        }
        Rule::variable => {
            let name = text.strip_prefix('$').unwrap_or(text);
            return Lexed::Token(Token::new(TokenKind::Variable, name, position, offset));
        }
        Rule::mouse_coord => return lex_mouse_coord(pair, position, offset),
        Rule::EOI => return Lexed::Token(Token::new(TokenKind::Eof, "", position, offset)),
        Rule::number => TokenKind::Number,
        Rule::newline => TokenKind::Newline,
        Rule::comma => TokenKind::Comma,
        Rule::plus => TokenKind::Plus,
        Rule::pipe => TokenKind::Pipe,
        Rule::tilde => TokenKind::Tilde,
        Rule::star => TokenKind::Star,
        Rule::ampersand => TokenKind::Ampersand,
        Rule::lparen => TokenKind::LParen,
        Rule::rparen => TokenKind::RParen,
        Rule::lbracket => TokenKind::LBracket,
        Rule::rbracket => TokenKind::RBracket,
        Rule::lbrace => TokenKind::LBrace,
        Rule::rbrace => TokenKind::RBrace,
        Rule::langle => TokenKind::LAngle,
        Rule::rangle => TokenKind::RAngle,
        // `unknown`; silent rules never surface as pairs
        _ => TokenKind::Unknown,
    };

    Lexed::Token(Token::new(kind, text, position, offset))
}

/// Coordinates too large for an `i32` leave only the `@` as `Unknown`; the
/// rest of the literal is lexed again as ordinary tokens.
fn lex_mouse_coord(pair: Pair<'_, Rule>, position: Position, offset: usize) -> Lexed {
    let mut coords = pair.into_inner().map(|coord| coord.as_str().parse::<i32>());

    match (coords.next(), coords.next()) {
        (Some(Ok(x)), Some(Ok(y))) => Lexed::Token(Token::new(
            TokenKind::MouseCoord { x, y },
            format!("@({x},{y})"),
            position,
            offset,
        )),
        _ => Lexed::Restart(Token::new(TokenKind::Unknown, "@", position, offset)),
    }
}

fn end_line_col(text: &str) -> (usize, usize) {
    let line = text.matches('\n').count() + 1;
    let column = text.rsplit('\n').next().map_or(0, |last| last.chars().count()) + 1;
    (line, column)
}

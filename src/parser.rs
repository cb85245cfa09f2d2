use crate::ast::{Node, NodeKind, WheelDirection};
use crate::config::ParserConfig;
use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::tokenize;
use crate::token::{Position, Token, TokenKind};

/// Parse MSL source into a syntax tree with the default configuration.
pub fn parse(text: &str) -> Result<Node, ParseError> {
    parse_with(text, &ParserConfig::default())
}

/// Parse MSL source into a syntax tree.
///
/// Fails on the first structural problem; no partial tree is returned.
pub fn parse_with(text: &str, config: &ParserConfig) -> Result<Node, ParseError> {
    Parser::new(tokenize(text), config).parse_script()
}

/// Infix chain levels from loosest to tightest. Each level folds a run of
/// its operator into one flat node.
const CHAINS: [(TokenKind, Chain); 4] = [
    (TokenKind::Comma, Chain::Sequential),
    (TokenKind::Plus, Chain::Simultaneous),
    (TokenKind::Pipe, Chain::Parallel),
    (TokenKind::RAngle, Chain::HoldChain),
];

#[derive(Debug, Clone, Copy)]
enum Chain {
    Sequential,
    Simultaneous,
    Parallel,
    HoldChain,
}

impl Chain {
    fn build(self, children: Vec<Node>) -> NodeKind {
        match self {
            Chain::Sequential => NodeKind::Sequential { children },
            Chain::Simultaneous => NodeKind::Simultaneous { children },
            Chain::Parallel => NodeKind::Parallel { children },
            Chain::HoldChain => NodeKind::HoldChain { children },
        }
    }
}

/// Recursive-descent parser over one token stream.
///
/// Owns its cursor, so each parse needs its own instance.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl Parser {
    /// Newlines are dropped; the stream is cut after its first `Eof`, or gets
    /// one appended if it has none.
    pub fn new(tokens: Vec<Token>, config: &ParserConfig) -> Self {
        let mut tokens: Vec<Token> = tokens
            .into_iter()
            .filter(|token| token.kind != TokenKind::Newline)
            .collect();

        if let Some(eof) = tokens.iter().position(Token::is_eof) {
            tokens.truncate(eof + 1);
        } else {
            let (position, offset) = tokens.last().map_or((Position::new(1, 1), 0), |last| {
                let width = last.text.chars().count();
                (
                    Position::new(last.position.line, last.position.column + width),
                    last.offset + last.text.len(),
                )
            });
            tokens.push(Token::new(TokenKind::Eof, "", position, offset));
        }

        Self {
            tokens,
            pos: 0,
            depth: 0,
            max_depth: config.max_depth,
        }
    }

    /// Parse the whole stream as one script.
    pub fn parse_script(mut self) -> Result<Node, ParseError> {
        if self.current().is_eof() {
            return Err(ParseError::at(ParseErrorKind::EmptyScript, self.current()));
        }

        let root = self.parse_expression()?;

        let rest = self.current();
        if !rest.is_eof() {
            let kind = match rest.kind {
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    ParseErrorKind::UnmatchedClosingBracket {
                        found: rest.describe(),
                    }
                }
                _ => ParseErrorKind::TrailingToken {
                    found: rest.describe(),
                },
            };
            return Err(error_at(kind, rest));
        }

        tracing::debug!(tokens = self.tokens.len(), root = root.kind_name(), "parsed script");
        Ok(root)
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    /// Consume the current token. The cursor never moves past `Eof`.
    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !token.is_eof() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn parse_expression(&mut self) -> Result<Node, ParseError> {
        self.parse_chain(0)
    }

    fn parse_chain(&mut self, level: usize) -> Result<Node, ParseError> {
        let Some(&(operator, chain)) = CHAINS.get(level) else {
            return self.parse_continuous();
        };

        let first = self.parse_chain(level + 1)?;
        if !self.check(operator) {
            return Ok(first);
        }

        let position = first.position;
        let mut children = vec![first];
        while self.eat(operator) {
            children.push(self.parse_chain(level + 1)?);
        }

        Ok(Node::new(chain.build(children), position))
    }

    /// `operand & interval`
    fn parse_continuous(&mut self) -> Result<Node, ParseError> {
        let node = self.parse_repeat()?;
        if !self.eat(TokenKind::Ampersand) {
            return Ok(node);
        }

        let (interval_ms, _) = self.expect_number('&', "an interval in milliseconds")?;
        let position = node.position;
        Ok(Node::new(
            NodeKind::Continuous {
                interval_ms,
                child: Box::new(node),
            },
            position,
        ))
    }

    /// `operand * count` with an optional `{interval}`
    fn parse_repeat(&mut self) -> Result<Node, ParseError> {
        let node = self.parse_toggle()?;
        if !self.eat(TokenKind::Star) {
            return Ok(node);
        }

        let (value, count_token) = self.expect_number('*', "a repeat count")?;
        let count = repeat_count(value, &count_token)?;

        let interval_ms = if self.check(TokenKind::LBrace) {
            Some(self.parse_bracketed_number("an interval in milliseconds")?)
        } else {
            None
        };

        let position = node.position;
        Ok(Node::new(
            NodeKind::Repeat {
                count,
                interval_ms,
                child: Box::new(node),
            },
            position,
        ))
    }

    fn parse_toggle(&mut self) -> Result<Node, ParseError> {
        let position = self.current().position;
        if !self.eat(TokenKind::Tilde) {
            return self.parse_primary();
        }

        let child = self.parse_primary()?;
        Ok(Node::new(
            NodeKind::Toggle {
                child: Box::new(child),
            },
            position,
        ))
    }

    fn parse_primary(&mut self) -> Result<Node, ParseError> {
        let token = self.current().clone();
        let position = token.position;

        let node = match token.kind {
            TokenKind::LParen => self.parse_group()?,
            TokenKind::Variable => {
                self.advance();
                return Ok(Node::new(NodeKind::Variable { name: token.text }, position));
            }
            TokenKind::Key => {
                self.advance();
                Node::new(NodeKind::Key { name: token.text }, position)
            }
            TokenKind::MouseCoord { x, y } => {
                self.advance();
                Node::new(NodeKind::MouseCoord { x, y }, position)
            }
            TokenKind::Wheel => {
                self.advance();
                wheel_node(&token)?
            }
            TokenKind::Number => {
                self.advance();
                let value = number_value(&token)?;
                Node::new(NodeKind::Number { value }, position)
            }
            _ => {
                return Err(error_at(
                    ParseErrorKind::UnexpectedToken {
                        found: token.describe(),
                    },
                    &token,
                ));
            }
        };

        self.parse_timing_suffixes(node)
    }

    fn parse_group(&mut self) -> Result<Node, ParseError> {
        let open = self.advance();

        if self.depth >= self.max_depth {
            return Err(ParseError::at(
                ParseErrorKind::NestingTooDeep {
                    limit: self.max_depth,
                },
                &open,
            ));
        }
        self.depth += 1;
        let inner = self.parse_expression();
        self.depth -= 1;

        let inner = inner?;
        self.expect_close(&open)?;
        Ok(Node::new(
            NodeKind::Group {
                child: Box::new(inner),
            },
            open.position,
        ))
    }

    /// Delay `(ms)`, hold `[ms]` and fade `<ms>`, each at most once and in
    /// that order.
    fn parse_timing_suffixes(&mut self, mut node: Node) -> Result<Node, ParseError> {
        let position = node.position;

        if self.check(TokenKind::LParen) {
            let ms = self.parse_bracketed_number("a delay in milliseconds")?;
            node = Node::new(
                NodeKind::Delay {
                    ms,
                    child: Box::new(node),
                },
                position,
            );
        }

        if self.check(TokenKind::LBracket) {
            let ms = self.parse_bracketed_number("a hold time in milliseconds")?;
            node = Node::new(
                NodeKind::Hold {
                    ms,
                    child: Box::new(node),
                },
                position,
            );
        }

        if self.check(TokenKind::LAngle) {
            let ms = self.parse_bracketed_number("a fade time in milliseconds")?;
            node = Node::new(
                NodeKind::Fade {
                    ms,
                    child: Box::new(node),
                },
                position,
            );
        }

        Ok(node)
    }

    /// `open number close`, starting at the opening bracket.
    fn parse_bracketed_number(&mut self, operand: &'static str) -> Result<f64, ParseError> {
        let open = self.advance();
        let (value, _) = self.expect_number(bracket_char(open.kind), operand)?;
        self.expect_close(&open)?;
        Ok(value)
    }

    fn expect_number(
        &mut self,
        operator: char,
        operand: &'static str,
    ) -> Result<(f64, Token), ParseError> {
        let token = self.current();
        if token.kind != TokenKind::Number {
            return Err(error_at(
                ParseErrorKind::MissingOperand {
                    operator,
                    operand,
                    found: token.describe(),
                },
                token,
            ));
        }

        let token = self.advance();
        let value = number_value(&token)?;
        Ok((value, token))
    }

    fn expect_close(&mut self, open: &Token) -> Result<(), ParseError> {
        let expected = open.kind.closing();
        let token = self.current();
        if Some(token.kind) == expected {
            self.advance();
            return Ok(());
        }

        let open_char = bracket_char(open.kind);
        let kind = if token.is_eof() {
            ParseErrorKind::UnclosedBracket {
                open: open_char,
                opened_at: open.position,
            }
        } else {
            ParseErrorKind::MismatchedBracket {
                open: open_char,
                expected: expected.map_or(open_char, bracket_char),
                opened_at: open.position,
                found: token.describe(),
            }
        };
        Err(error_at(kind, token))
    }
}

/// Report unknown characters as such, whatever the parser expected there.
fn error_at(kind: ParseErrorKind, token: &Token) -> ParseError {
    if token.kind == TokenKind::Unknown {
        ParseError::at(
            ParseErrorKind::UnrecognizedToken {
                found: token.describe(),
            },
            token,
        )
    } else {
        ParseError::at(kind, token)
    }
}

fn bracket_char(kind: TokenKind) -> char {
    match kind {
        TokenKind::LParen => '(',
        TokenKind::RParen => ')',
        TokenKind::LBracket => '[',
        TokenKind::RBracket => ']',
        TokenKind::LBrace => '{',
        TokenKind::RBrace => '}',
        TokenKind::LAngle => '<',
        TokenKind::RAngle => '>',
        _ => '?',
    }
}

fn number_value(token: &Token) -> Result<f64, ParseError> {
    token
        .text
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| {
            ParseError::at(
                ParseErrorKind::NumberOutOfRange {
                    value: token.text.clone(),
                },
                token,
            )
        })
}

/// Fractional counts are truncated.
fn repeat_count(value: f64, token: &Token) -> Result<u32, ParseError> {
    let whole = value.trunc();
    if whole < 1.0 {
        return Err(ParseError::at(
            ParseErrorKind::InvalidRepeatCount {
                value: token.text.clone(),
            },
            token,
        ));
    }
    if whole > f64::from(u32::MAX) {
        return Err(ParseError::at(
            ParseErrorKind::NumberOutOfRange {
                value: token.text.clone(),
            },
            token,
        ));
    }
    Ok(whole as u32)
}

/// `wheel_up`, `wheel_down`, or either with an explicit `+N` / `-N` step.
/// An explicit sign decides the direction.
fn wheel_node(token: &Token) -> Result<Node, ParseError> {
    let text = token.text.as_str();
    let (name, step) = match text.find(['+', '-']) {
        Some(split) => (&text[..split], Some(&text[split..])),
        None => (text, None),
    };

    let direction = match step {
        Some(step) if step.starts_with('+') => WheelDirection::Up,
        Some(_) => WheelDirection::Down,
        None if name.ends_with("up") => WheelDirection::Up,
        None => WheelDirection::Down,
    };

    let amount = match step {
        Some(step) => step[1..].parse::<u32>().map_err(|_| {
            ParseError::at(
                ParseErrorKind::NumberOutOfRange {
                    value: step[1..].to_string(),
                },
                token,
            )
        })?,
        None => 1,
    };
    if amount == 0 {
        return Err(ParseError::at(
            ParseErrorKind::InvalidWheelAmount {
                value: step.unwrap_or_default().to_string(),
            },
            token,
        ));
    }

    Ok(Node::new(NodeKind::Wheel { direction, amount }, token.position))
}

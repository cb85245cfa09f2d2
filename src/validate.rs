use serde::Serialize;

use crate::token::{Position, Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    MismatchedBracket,
    UnmatchedClosingBracket,
    UnclosedBracket,
    UnrecognizedToken,
}

/// A non-fatal finding of the bracket pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub position: Position,
}

impl Diagnostic {
    fn new(kind: DiagnosticKind, message: String, position: Position) -> Self {
        Self {
            kind,
            message,
            position,
        }
    }
}

/// Check bracket balance and flag unknown characters in one scan.
///
/// `>` only closes a bracket when the innermost open one is `<`; anywhere
/// else it is the hold-chain operator and is skipped.
pub fn validate_brackets(tokens: &[Token]) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut open: Vec<&Token> = Vec::new();

    for token in tokens {
        match token.kind {
            TokenKind::Unknown => diagnostics.push(Diagnostic::new(
                DiagnosticKind::UnrecognizedToken,
                format!("unrecognized token '{}'", token.text),
                token.position,
            )),
            TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace | TokenKind::LAngle => {
                open.push(token);
            }
            TokenKind::RAngle
                if open.last().map(|top| top.kind) != Some(TokenKind::LAngle) => {}
            TokenKind::RParen
            | TokenKind::RBracket
            | TokenKind::RBrace
            | TokenKind::RAngle => match open.pop() {
                None => diagnostics.push(Diagnostic::new(
                    DiagnosticKind::UnmatchedClosingBracket,
                    format!("unmatched closing bracket '{}'", token.text),
                    token.position,
                )),
                Some(top) if top.kind.closing() != Some(token.kind) => {
                    diagnostics.push(Diagnostic::new(
                        DiagnosticKind::MismatchedBracket,
                        format!(
                            "mismatched bracket: '{}' opened at {} closed by '{}'",
                            top.text, top.position, token.text
                        ),
                        token.position,
                    ));
                }
                Some(_) => {}
            },
            _ => {}
        }
    }

    for token in open {
        diagnostics.push(Diagnostic::new(
            DiagnosticKind::UnclosedBracket,
            format!("unclosed bracket '{}'", token.text),
            token.position,
        ));
    }

    tracing::debug!(
        tokens = tokens.len(),
        diagnostics = diagnostics.len(),
        "validated brackets"
    );
    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use rstest::rstest;

    fn validate(text: &str) -> Vec<Diagnostic> {
        validate_brackets(&tokenize(text))
    }

    fn kinds(text: &str) -> Vec<DiagnosticKind> {
        validate(text).into_iter().map(|d| d.kind).collect()
    }

    #[rstest]
    #[case::plain("W, A, S, D")]
    #[case::groups("(W,A)|(S,D)")]
    #[case::suffixes("W(100)[200]<300>, Q*3{50}")]
    #[case::hold_chain("W>A>S")]
    #[case::fade_then_chain("W<500>>A")]
    #[case::empty("")]
    fn test_balanced_scripts(#[case] script: &str) {
        assert!(validate(script).is_empty());
    }

    #[test]
    fn test_mismatched_bracket() {
        let diagnostics = validate("[Q,500)");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::MismatchedBracket);
        assert_eq!(diagnostics[0].position, Position::new(1, 7));
        assert!(diagnostics[0].message.contains("'['"));
    }

    #[test]
    fn test_unclosed_bracket() {
        let diagnostics = validate("[Q,500");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::UnclosedBracket);
        assert_eq!(diagnostics[0].position, Position::new(1, 1));
    }

    #[test]
    fn test_unmatched_closing_bracket() {
        assert_eq!(kinds("a)"), vec![DiagnosticKind::UnmatchedClosingBracket]);
    }

    #[test]
    fn test_unrecognized_token() {
        let diagnostics = validate("A,@#,B");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::UnrecognizedToken);
        assert_eq!(diagnostics[0].position, Position::new(1, 3));
    }

    #[test]
    fn test_collects_every_issue() {
        assert_eq!(
            kinds("(a]; b)\n{c"),
            vec![
                DiagnosticKind::MismatchedBracket,
                DiagnosticKind::UnrecognizedToken,
                DiagnosticKind::UnmatchedClosingBracket,
                DiagnosticKind::UnclosedBracket,
            ]
        );
    }

    #[test]
    fn test_angle_closes_only_fade() {
        // `(` is on top, so `>` is a hold-chain operator here
        assert!(kinds("(a>b)").is_empty());
        assert_eq!(kinds("a<100"), vec![DiagnosticKind::UnclosedBracket]);
        assert_eq!(
            kinds("a<(100>"),
            vec![DiagnosticKind::UnclosedBracket, DiagnosticKind::UnclosedBracket]
        );
    }
}

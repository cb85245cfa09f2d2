use serde::Serialize;

use crate::ast::Node;
use crate::config::ParserConfig;
use crate::error::{Location, ParseError};
use crate::lexer::tokenize;
use crate::parser::Parser;
use crate::validate::{Diagnostic, validate_brackets};
use crate::visit::Stats;

/// Everything known about a script after one pass over it
#[derive(Debug, Clone, Serialize)]
pub struct SyntaxReport {
    pub ast: Option<Node>,
    pub diagnostics: Vec<Diagnostic>,
    #[serde(serialize_with = "serialize_parse_error")]
    pub parse_error: Option<ParseError>,
    pub stats: Option<Stats>,
}

impl SyntaxReport {
    /// No bracket findings and a successful parse.
    pub fn is_valid(&self) -> bool {
        self.diagnostics.is_empty() && self.parse_error.is_none()
    }
}

pub fn check(text: &str) -> SyntaxReport {
    check_with(text, &ParserConfig::default())
}

/// Tokenize once, then run both the bracket pass and the parser over the
/// same tokens.
pub fn check_with(text: &str, config: &ParserConfig) -> SyntaxReport {
    let tokens = tokenize(text);
    let diagnostics = validate_brackets(&tokens);

    let (ast, parse_error) = match Parser::new(tokens, config).parse_script() {
        Ok(ast) => (Some(ast), None),
        Err(error) => (None, Some(error)),
    };
    let stats = ast.as_ref().map(Stats::collect);

    tracing::debug!(
        diagnostics = diagnostics.len(),
        parsed = ast.is_some(),
        "checked script"
    );

    SyntaxReport {
        ast,
        diagnostics,
        parse_error,
        stats,
    }
}

#[derive(Serialize)]
struct ParseErrorView<'a> {
    message: String,
    #[serde(flatten)]
    location: &'a Location,
}

fn serialize_parse_error<S>(error: &Option<ParseError>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    error
        .as_ref()
        .map(|error| ParseErrorView {
            message: error.message(),
            location: &error.location,
        })
        .serialize(serializer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseErrorKind;
    use crate::token::Position;
    use crate::validate::DiagnosticKind;

    #[test]
    fn test_valid_script() {
        let report = check("W, A, S, D");
        assert!(report.is_valid());
        assert!(report.ast.is_some());
        assert_eq!(report.stats.map(|s| s.key_nodes), Some(4));
    }

    #[test]
    fn test_unknown_reported_by_both_passes() {
        let report = check("A,@#,B");
        assert!(!report.is_valid());
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].kind, DiagnosticKind::UnrecognizedToken);
        assert_eq!(report.diagnostics[0].position, Position::new(1, 3));

        let error = report.parse_error.unwrap();
        assert!(matches!(error.kind, ParseErrorKind::UnrecognizedToken { .. }));
        assert_eq!(error.position(), Position::new(1, 3));
        assert!(report.ast.is_none());
        assert!(report.stats.is_none());
    }

    #[test]
    fn test_bracket_findings_alongside_parse_error() {
        let report = check("[Q,500)");
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].kind, DiagnosticKind::MismatchedBracket);
        assert!(report.parse_error.is_some());
    }

    #[test]
    fn test_check_with_depth_limit() {
        let report = check_with("((a))", &ParserConfig { max_depth: 1 });
        assert!(report.diagnostics.is_empty());
        assert_eq!(
            report.parse_error.map(|e| e.kind),
            Some(ParseErrorKind::NestingTooDeep { limit: 1 })
        );
    }

    #[test]
    fn test_report_json() {
        let json = serde_json::to_value(check("Q*")).unwrap();
        assert_eq!(json["ast"], serde_json::Value::Null);
        assert_eq!(json["parse_error"]["at"], "end_of_input");
        assert_eq!(json["parse_error"]["line"], 1);
        assert_eq!(json["parse_error"]["column"], 3);
        assert!(
            json["parse_error"]["message"]
                .as_str()
                .unwrap()
                .starts_with("'*' must be followed by a repeat count")
        );
    }
}

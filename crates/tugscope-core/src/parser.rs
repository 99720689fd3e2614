//! Parser collaborator seam.
//!
//! Parsing is not done here. A [`SourceParser`] turns source text into an
//! opaque tree or a list of [`ParseError`]s, and the registry encodes that
//! outcome on the module it creates:
//!
//! - `Ok(tree)`: the module gets a [`CodeTree`](crate::code_tree::CodeTree)
//!   wrapping `tree`
//! - `Err(errors)`: the module carries `errors` and never gets a code tree
//!
//! ```
//! use tugscope_core::parser::{ParseError, SourceParser};
//! use tugscope_core::project::Project;
//!
//! struct LineParser;
//!
//! impl SourceParser for LineParser {
//!     type Tree = Vec<String>;
//!
//!     fn parse(&self, _subpath: &str, source: &str) -> Result<Vec<String>, Vec<ParseError>> {
//!         if source.contains('\t') {
//!             return Err(vec![ParseError::new("tabs are not allowed")]);
//!         }
//!         Ok(source.lines().map(str::to_string).collect())
//!     }
//! }
//!
//! let mut project = Project::default();
//! let module = project.load_module(&LineParser, "pkg/mod.py", "x = 1\ny = 2");
//! assert_eq!(project.code_of(module).unwrap().len(), 2);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single error reported by a parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseError {
    /// Human-readable description.
    pub message: String,
    /// Line number (1-indexed), if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    /// Column number (1-indexed), if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl ParseError {
    /// Create a parse error without a position.
    pub fn new(message: impl Into<String>) -> Self {
        ParseError {
            message: message.into(),
            line: None,
            column: None,
        }
    }

    /// Create a parse error at a position.
    pub fn at(message: impl Into<String>, line: u32, column: u32) -> Self {
        ParseError {
            message: message.into(),
            line: Some(line),
            column: Some(column),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(col)) => write!(f, "{}:{}: {}", line, col, self.message),
            (Some(line), None) => write!(f, "{}: {}", line, self.message),
            _ => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ParseError {}

/// A language parser that produces opaque trees.
///
/// Implementations must not touch the project; they only report the outcome.
pub trait SourceParser {
    /// The parsed representation stored in code trees.
    type Tree;

    /// Parse `source` (the contents of `subpath`).
    fn parse(&self, subpath: &str, source: &str) -> Result<Self::Tree, Vec<ParseError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_position_when_known() {
        assert_eq!(
            ParseError::at("unexpected indent", 3, 5).to_string(),
            "3:5: unexpected indent"
        );
        assert_eq!(ParseError::new("bad token").to_string(), "bad token");

        let line_only = ParseError {
            message: "EOF in multi-line string".to_string(),
            line: Some(12),
            column: None,
        };
        assert_eq!(line_only.to_string(), "12: EOF in multi-line string");
    }

    #[test]
    fn serializes_without_missing_positions() {
        let json = serde_json::to_string(&ParseError::new("oops")).unwrap();
        assert_eq!(json, r#"{"message":"oops"}"#);

        let parsed: ParseError = serde_json::from_str(r#"{"message":"x","line":2}"#).unwrap();
        assert_eq!(parsed.line, Some(2));
        assert_eq!(parsed.column, None);
    }
}

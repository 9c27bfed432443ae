//! Verdicts emitted by conformance checks.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Message key identifying what a verdict is about.
///
/// Each kind owns a fixed positional argument layout, documented per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// `[class description]`
    ConformanceClassNotUsed,
    /// `[registry table, key column, missing value]`
    MissingReference,
    /// `[actual type, column or table, table or context]`
    InvalidDataType,
    /// `[column, table, attribute, expected, actual]`
    InvalidColumnDefinition,
    /// `[table]`
    MissingPrimaryKey,
    /// `[column, table]`
    MissingColumn,
}

impl MessageKind {
    /// Stable key used in serialized reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ConformanceClassNotUsed => "conformance_class_not_used",
            Self::MissingReference => "missing_reference",
            Self::InvalidDataType => "invalid_data_type",
            Self::InvalidColumnDefinition => "invalid_column_definition",
            Self::MissingPrimaryKey => "missing_primary_key",
            Self::MissingColumn => "missing_column",
        }
    }

    /// Renders the English message for this kind.
    ///
    /// Missing positional arguments render as `?` so a malformed verdict still
    /// produces a readable line.
    pub fn format(self, args: &[String]) -> String {
        let arg = |index: usize| args.get(index).map_or("?", String::as_str);
        match self {
            Self::ConformanceClassNotUsed => {
                format!("Conformance class not used: {}", arg(0))
            }
            Self::MissingReference => format!(
                "No row in {} where {} = '{}'",
                arg(0),
                arg(1),
                arg(2)
            ),
            Self::InvalidDataType => format!(
                "Invalid data type '{}' for {} in {}",
                arg(0),
                arg(1),
                arg(2)
            ),
            Self::InvalidColumnDefinition => format!(
                "Invalid column definition for {} in {}: expected {} = {}, found {}",
                arg(0),
                arg(1),
                arg(2),
                arg(3),
                arg(4)
            ),
            Self::MissingPrimaryKey => format!("Table {} must have a primary key", arg(0)),
            Self::MissingColumn => format!("Table {} is missing required column {}", arg(1), arg(0)),
        }
    }
}

impl Display for MessageKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of one conformance assertion.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Verdict {
    pub passed: bool,
    pub kind: MessageKind,
    pub args: Vec<String>,
}

impl Verdict {
    /// Creates a failing verdict.
    pub fn fail<I, S>(kind: MessageKind, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            passed: false,
            kind,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Human-readable message rendered from kind and arguments.
    pub fn message(&self) -> String {
        self.kind.format(&self.args)
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let status = if self.passed { "PASS" } else { "FAIL" };
        write!(f, "[{status}] {}: {}", self.kind, self.message())
    }
}

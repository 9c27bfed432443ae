//! Validation reports and the verdict sink seam.

use crate::model::catalog::ExtensionRecord;
use crate::model::verdict::{MessageKind, Verdict};
use crate::rules::classes::{find_class, RequirementsClass};
use serde::Serialize;

/// Why a requirements class produced no verdicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No accepted extension name is registered in `gpkg_extensions`.
    ExtensionNotUsed,
    /// No relation is declared under the class's relation name.
    ClassNotUsed,
    /// The run options excluded the class.
    NotSelected,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ExtensionNotUsed => "extension_not_used",
            Self::ClassNotUsed => "class_not_used",
            Self::NotSelected => "not_selected",
        }
    }
}

/// Whether a class's checks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum Applicability {
    Applicable,
    NotApplicable(SkipReason),
}

/// Verdicts of one requirements class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassReport {
    pub class: String,
    pub relation_name: String,
    pub applicability: Applicability,
    pub verdicts: Vec<Verdict>,
}

impl ClassReport {
    pub fn new(class: &RequirementsClass, applicability: Applicability) -> Self {
        Self {
            class: class.name.to_string(),
            relation_name: class.relation_name.to_string(),
            applicability,
            verdicts: Vec::new(),
        }
    }

    pub fn passed(&self) -> bool {
        self.verdicts.iter().all(|verdict| verdict.passed)
    }

    /// "Conformance class not used" line for a class whose relation name was
    /// never declared; `None` for every other outcome.
    pub fn not_used_message(&self) -> Option<String> {
        if self.applicability != Applicability::NotApplicable(SkipReason::ClassNotUsed) {
            return None;
        }
        let class = find_class(&self.relation_name)?;
        Some(MessageKind::ConformanceClassNotUsed.format(&[class.description()]))
    }
}

/// Result of one validation run over a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub engine_version: String,
    /// `gpkg_extensions` rows that activated the extension.
    pub extension_records: Vec<ExtensionRecord>,
    pub classes: Vec<ClassReport>,
}

impl ValidationReport {
    /// True when no verdict of any class failed.
    pub fn passed(&self) -> bool {
        self.classes.iter().all(ClassReport::passed)
    }

    pub fn verdicts(&self) -> impl Iterator<Item = &Verdict> {
        self.classes.iter().flat_map(|class| class.verdicts.iter())
    }

    pub fn failures(&self) -> impl Iterator<Item = &Verdict> {
        self.verdicts().filter(|verdict| !verdict.passed)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Receiver of verdicts as they are produced.
pub trait VerdictSink {
    fn record(&mut self, class: &RequirementsClass, verdict: Verdict);
}

impl VerdictSink for Vec<Verdict> {
    fn record(&mut self, _class: &RequirementsClass, verdict: Verdict) {
        self.push(verdict);
    }
}

impl VerdictSink for ClassReport {
    fn record(&mut self, _class: &RequirementsClass, verdict: Verdict) {
        self.verdicts.push(verdict);
    }
}

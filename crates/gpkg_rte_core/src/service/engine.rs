//! Two-phase conformance engine.
//!
//! # Responsibility
//! - `prepare`: read activation state for every requirements class.
//! - `evaluate`: run the walker and table contract of each applicable class.
//!
//! # Invariants
//! - Skipped classes yield no verdicts, never failures.
//! - Each class is evaluated independently; catalog errors abort the run.
//! - A related table shared by several relations of one class is checked
//!   against the class contract once.

use crate::catalog::records::{extension_records, relations};
use crate::catalog::{Catalog, CatalogResult};
use crate::config::ValidationOptions;
use crate::model::catalog::ExtensionRecord;
use crate::model::verdict::Verdict;
use crate::rules::classes::{builtin_classes, RequirementsClass, SIMPLE_ATTRIBUTES};
use crate::rules::contract::TableContract;
use crate::rules::gate::{
    is_extension_active, is_requirements_class_active, RELATED_TABLES_EXTENSION_NAMES,
};
use crate::rules::walker::validate_related_type;
use crate::service::report::{
    Applicability, ClassReport, SkipReason, ValidationReport, VerdictSink,
};
use log::info;
use std::collections::BTreeSet;
use std::time::Instant;

/// Activation decision for one requirements class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassActivation {
    pub class: RequirementsClass,
    pub applicability: Applicability,
}

/// Result of the prepare phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationState {
    pub extension_active: bool,
    pub extension_records: Vec<ExtensionRecord>,
    pub classes: Vec<ClassActivation>,
}

impl ActivationState {
    pub fn applicable_classes(&self) -> impl Iterator<Item = &RequirementsClass> {
        self.classes
            .iter()
            .filter(|activation| activation.applicability == Applicability::Applicable)
            .map(|activation| &activation.class)
    }

    pub fn applicability(&self, relation_name: &str) -> Option<Applicability> {
        self.classes
            .iter()
            .find(|activation| activation.class.relation_name == relation_name)
            .map(|activation| activation.applicability)
    }
}

/// Conformance entry point over any [`Catalog`].
pub struct ConformanceService<C: Catalog> {
    catalog: C,
}

impl<C: Catalog> ConformanceService<C> {
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Reads which classes are in use. Issues reads only.
    pub fn prepare(&self, options: &ValidationOptions) -> CatalogResult<ActivationState> {
        let names = options.extension_name_refs();
        let extension_active = is_extension_active(&self.catalog, &names)?;
        let records = if extension_active {
            extension_records(&self.catalog, &names)?
        } else {
            Vec::new()
        };

        let mut classes = Vec::with_capacity(builtin_classes().len());
        for class in builtin_classes() {
            let applicability = if !options.is_selected(class) {
                Applicability::NotApplicable(SkipReason::NotSelected)
            } else {
                self.class_applicability(extension_active, class)?
            };
            classes.push(ClassActivation {
                class: *class,
                applicability,
            });
        }

        info!(
            "event=activation_prepare module=service status=ok extension_active={extension_active} applicable={}",
            classes
                .iter()
                .filter(|activation| activation.applicability == Applicability::Applicable)
                .count()
        );

        Ok(ActivationState {
            extension_active,
            extension_records: records,
            classes,
        })
    }

    /// Evaluates every applicable class and groups verdicts per class.
    pub fn evaluate(&self, state: &ActivationState) -> CatalogResult<ValidationReport> {
        let mut classes = Vec::with_capacity(state.classes.len());
        for activation in &state.classes {
            let mut report = ClassReport::new(&activation.class, activation.applicability);
            if activation.applicability == Applicability::Applicable {
                self.evaluate_class_into(&activation.class, &mut report)?;
            }
            classes.push(report);
        }

        Ok(ValidationReport {
            engine_version: crate::core_version().to_string(),
            extension_records: state.extension_records.clone(),
            classes,
        })
    }

    /// Streams verdicts of every applicable class into `sink`.
    pub fn evaluate_into<S: VerdictSink + ?Sized>(
        &self,
        state: &ActivationState,
        sink: &mut S,
    ) -> CatalogResult<()> {
        for class in state.applicable_classes() {
            self.evaluate_class_into(class, sink)?;
        }
        Ok(())
    }

    /// Runs `prepare` then `evaluate`.
    pub fn validate(&self, options: &ValidationOptions) -> CatalogResult<ValidationReport> {
        let state = self.prepare(options)?;
        self.evaluate(&state)
    }

    /// Gates and evaluates a single class against the default extension
    /// aliases.
    pub fn validate_class(&self, class: &RequirementsClass) -> CatalogResult<ClassReport> {
        let extension_active =
            is_extension_active(&self.catalog, RELATED_TABLES_EXTENSION_NAMES)?;
        let applicability = self.class_applicability(extension_active, class)?;

        let mut report = ClassReport::new(class, applicability);
        if applicability == Applicability::Applicable {
            self.evaluate_class_into(class, &mut report)?;
        }
        Ok(report)
    }

    pub fn validate_simple_attributes(&self) -> CatalogResult<ClassReport> {
        self.validate_class(&SIMPLE_ATTRIBUTES)
    }

    /// Verdicts of one class, without consulting the gates.
    pub fn evaluate_class(&self, class: &RequirementsClass) -> CatalogResult<Vec<Verdict>> {
        let mut verdicts = Vec::new();
        self.evaluate_class_into(class, &mut verdicts)?;
        Ok(verdicts)
    }

    fn class_applicability(
        &self,
        extension_active: bool,
        class: &RequirementsClass,
    ) -> CatalogResult<Applicability> {
        if !extension_active {
            return Ok(Applicability::NotApplicable(SkipReason::ExtensionNotUsed));
        }
        if !is_requirements_class_active(&self.catalog, class.relation_name)? {
            return Ok(Applicability::NotApplicable(SkipReason::ClassNotUsed));
        }
        Ok(Applicability::Applicable)
    }

    fn evaluate_class_into<S: VerdictSink + ?Sized>(
        &self,
        class: &RequirementsClass,
        sink: &mut S,
    ) -> CatalogResult<()> {
        let started_at = Instant::now();
        let mut failures = 0usize;
        let mut record = |verdict: Verdict| {
            if !verdict.passed {
                failures += 1;
            }
            sink.record(class, verdict);
        };

        for verdict in
            validate_related_type(&self.catalog, class.relation_name, class.related_data_type)?
        {
            record(verdict);
        }

        if class.contract != TableContract::Unconstrained {
            let mut seen = BTreeSet::new();
            for relation in relations(&self.catalog, class.relation_name)? {
                if !seen.insert(relation.related_table_name.clone()) {
                    continue;
                }
                for verdict in class
                    .contract
                    .check(&self.catalog, &relation.related_table_name)?
                {
                    record(verdict);
                }
            }
        }

        info!(
            "event=class_evaluate module=service status=ok class={} failures={failures} duration_ms={}",
            class.relation_name,
            started_at.elapsed().as_millis()
        );
        Ok(())
    }
}

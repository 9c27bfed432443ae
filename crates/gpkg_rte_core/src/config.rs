//! Validation run options.
//!
//! # Responsibility
//! - Describe which extension aliases and requirements classes a run covers.
//! - Load options from JSON documents.
//!
//! # Invariants
//! - Validated options always carry at least one extension alias.
//! - Selected classes always name built-in requirements classes.

use crate::rules::classes::{find_class, RequirementsClass};
use crate::rules::gate::RELATED_TABLES_EXTENSION_NAMES;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Options for one validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationOptions {
    /// `gpkg_extensions.extension_name` values that activate the extension.
    pub extension_names: Vec<String>,
    /// Relation names of the classes to evaluate; `None` evaluates all.
    pub classes: Option<Vec<String>>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            extension_names: RELATED_TABLES_EXTENSION_NAMES
                .iter()
                .map(|name| (*name).to_string())
                .collect(),
            classes: None,
        }
    }
}

impl ValidationOptions {
    /// Restricts the run to the classes with the given relation names.
    pub fn with_classes<I, S>(mut self, relation_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classes = Some(relation_names.into_iter().map(Into::into).collect());
        self
    }

    /// Parses and validates options from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let options: Self = serde_json::from_str(json).map_err(ConfigError::Parse)?;
        options.validate()?;
        Ok(options)
    }

    /// Reads, parses and validates options from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self
            .extension_names
            .iter()
            .all(|name| name.trim().is_empty())
        {
            return Err(ConfigError::EmptyExtensionNames);
        }

        if let Some(classes) = &self.classes {
            for relation_name in classes {
                if find_class(relation_name).is_none() {
                    return Err(ConfigError::UnknownClass(relation_name.clone()));
                }
            }
        }

        Ok(())
    }

    /// Whether `class` is part of this run.
    pub fn is_selected(&self, class: &RequirementsClass) -> bool {
        self.classes.as_ref().map_or(true, |classes| {
            classes.iter().any(|name| name == class.relation_name)
        })
    }

    /// Extension aliases as borrowed strings, blank entries dropped.
    pub fn extension_name_refs(&self) -> Vec<&str> {
        self.extension_names
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .collect()
    }
}

/// Errors from loading or validating [`ValidationOptions`].
#[derive(Debug)]
pub enum ConfigError {
    EmptyExtensionNames,
    UnknownClass(String),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyExtensionNames => {
                write!(f, "at least one extension name must be accepted")
            }
            Self::UnknownClass(value) => {
                write!(f, "unknown requirements class relation name `{value}`")
            }
            Self::Io { path, source } => {
                write!(f, "failed to read options `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid options document: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::EmptyExtensionNames => None,
            Self::UnknownClass(_) => None,
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ValidationOptions};
    use crate::rules::classes::{MEDIA, SIMPLE_ATTRIBUTES};
    use std::io::Write;

    #[test]
    fn defaults_accept_both_extension_aliases() {
        let options = ValidationOptions::default();
        assert_eq!(
            options.extension_name_refs(),
            vec!["related_tables", "gpkg_related_tables"]
        );
        assert!(options.is_selected(&SIMPLE_ATTRIBUTES));
        assert!(options.is_selected(&MEDIA));
        options.validate().expect("defaults are valid");
    }

    #[test]
    fn class_selection_filters_classes() {
        let options = ValidationOptions::default().with_classes(["simple_attributes"]);
        assert!(options.is_selected(&SIMPLE_ATTRIBUTES));
        assert!(!options.is_selected(&MEDIA));
    }

    #[test]
    fn parses_partial_json_with_defaults() {
        let options = ValidationOptions::from_json_str(r#"{"classes": ["media"]}"#)
            .expect("partial options should parse");
        assert_eq!(options.classes, Some(vec!["media".to_string()]));
        assert_eq!(options.extension_names.len(), 2);
    }

    #[test]
    fn rejects_unknown_fields_and_classes() {
        let err = ValidationOptions::from_json_str(r#"{"clases": []}"#)
            .expect_err("unknown field must fail");
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = ValidationOptions::from_json_str(r#"{"classes": ["geometry"]}"#)
            .expect_err("unknown class must fail");
        assert!(matches!(err, ConfigError::UnknownClass(name) if name == "geometry"));
    }

    #[test]
    fn rejects_blank_extension_names() {
        let err = ValidationOptions::from_json_str(r#"{"extension_names": ["  "]}"#)
            .expect_err("blank aliases must fail");
        assert!(matches!(err, ConfigError::EmptyExtensionNames));
    }

    #[test]
    fn loads_options_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"extension_names": ["gpkg_related_tables"]}}"#)
            .expect("write options");

        let options = ValidationOptions::from_json_file(file.path()).expect("options file");
        assert_eq!(options.extension_name_refs(), vec!["gpkg_related_tables"]);
    }

    #[test]
    fn missing_file_reports_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = ValidationOptions::from_json_file(dir.path().join("absent.json"))
            .expect_err("missing file must fail");
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}

//! Built-in requirements classes of the Related Tables Extension.
//!
//! Each class is plain data evaluated by the same walker and contract code.

use crate::rules::contract::TableContract;
use serde::Serialize;

/// One requirements class of the Related Tables Extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RequirementsClass {
    /// Human-readable class name, e.g. `Simple Attributes`.
    pub name: &'static str,
    /// Value of `gpkgext_relations.relation_name` that activates this class.
    pub relation_name: &'static str,
    /// Required `gpkg_contents.data_type` of every related table.
    pub related_data_type: &'static str,
    pub contract: TableContract,
}

impl RequirementsClass {
    /// Description used in "not used" messages.
    pub fn description(&self) -> String {
        format!("Related Tables Extension, {} Requirements Class", self.name)
    }
}

pub const FEATURES: RequirementsClass = RequirementsClass {
    name: "Features",
    relation_name: "features",
    related_data_type: "features",
    contract: TableContract::Unconstrained,
};

pub const SIMPLE_ATTRIBUTES: RequirementsClass = RequirementsClass {
    name: "Simple Attributes",
    relation_name: "simple_attributes",
    related_data_type: "attributes",
    contract: TableContract::SimpleAttributes,
};

pub const MEDIA: RequirementsClass = RequirementsClass {
    name: "Media",
    relation_name: "media",
    related_data_type: "attributes",
    contract: TableContract::Media,
};

pub const ATTRIBUTES: RequirementsClass = RequirementsClass {
    name: "Attributes",
    relation_name: "attributes",
    related_data_type: "attributes",
    contract: TableContract::Unconstrained,
};

pub const TILES: RequirementsClass = RequirementsClass {
    name: "Tiles",
    relation_name: "tiles",
    related_data_type: "tiles",
    contract: TableContract::Unconstrained,
};

const BUILTIN_CLASSES: &[RequirementsClass] =
    &[FEATURES, SIMPLE_ATTRIBUTES, MEDIA, ATTRIBUTES, TILES];

/// Returns every built-in requirements class in evaluation order.
pub fn builtin_classes() -> &'static [RequirementsClass] {
    BUILTIN_CLASSES
}

/// Finds a built-in class by its relation name.
pub fn find_class(relation_name: &str) -> Option<&'static RequirementsClass> {
    BUILTIN_CLASSES
        .iter()
        .find(|class| class.relation_name == relation_name)
}

#[cfg(test)]
mod tests {
    use super::{builtin_classes, find_class, SIMPLE_ATTRIBUTES};
    use crate::rules::contract::TableContract;
    use std::collections::BTreeSet;

    #[test]
    fn relation_names_are_unique() {
        let names = builtin_classes()
            .iter()
            .map(|class| class.relation_name)
            .collect::<BTreeSet<_>>();
        assert_eq!(names.len(), builtin_classes().len());
    }

    #[test]
    fn simple_attributes_requires_attributes_contents() {
        let class = find_class("simple_attributes").expect("simple attributes class");
        assert_eq!(*class, SIMPLE_ATTRIBUTES);
        assert_eq!(class.related_data_type, "attributes");
        assert_eq!(class.contract, TableContract::SimpleAttributes);
        assert_eq!(
            class.description(),
            "Related Tables Extension, Simple Attributes Requirements Class"
        );
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert!(find_class("Simple_Attributes").is_none());
        assert!(find_class("unknown").is_none());
    }
}

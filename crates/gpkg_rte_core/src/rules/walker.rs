//! Relation graph walker.
//!
//! # Invariants
//! - Each relation row is checked independently; one bad row never hides
//!   another.
//! - A missing contents entry suppresses the type check for that row only.

use crate::catalog::records::{content_entry, relations};
use crate::catalog::{Catalog, CatalogResult, GPKGEXT_RELATIONS, GPKG_CONTENTS};
use crate::model::verdict::{MessageKind, Verdict};
use log::debug;

/// Checks that every table related under `relation_name` is registered in
/// `gpkg_contents` with exactly `required_data_type`.
///
/// Comparison is exact and case-sensitive: `Attributes` does not satisfy
/// `attributes`.
pub fn validate_related_type<C: Catalog + ?Sized>(
    catalog: &C,
    relation_name: &str,
    required_data_type: &str,
) -> CatalogResult<Vec<Verdict>> {
    let mut verdicts = Vec::new();

    for relation in relations(catalog, relation_name)? {
        let related = relation.related_table_name.as_str();
        match content_entry(catalog, related)? {
            None => verdicts.push(Verdict::fail(
                MessageKind::MissingReference,
                [GPKG_CONTENTS, "table_name", related],
            )),
            Some(entry) if entry.data_type != required_data_type => {
                verdicts.push(Verdict::fail(
                    MessageKind::InvalidDataType,
                    [entry.data_type.as_str(), related, GPKGEXT_RELATIONS],
                ))
            }
            Some(_) => {}
        }
    }

    debug!(
        "event=related_type_walk module=rules relation={relation_name} failures={}",
        verdicts.len()
    );
    Ok(verdicts)
}

//! Pure predicates comparing observed and desired table shapes.

use std::collections::HashSet;

use crate::model::{hash_key, range_key, KeySchemaElement, Projection, ProjectionType};

/// True if the hash key name differs or the sort key was added, removed or
/// renamed. Attribute types are not part of the key schema and are ignored.
pub fn is_key_schema_modified(current: &[KeySchemaElement], desired: &[KeySchemaElement]) -> bool {
    hash_key(current) != hash_key(desired) || range_key(current) != range_key(desired)
}

/// True if the projection type differs, or an INCLUDE projection carries a
/// different set of non-key attributes. Order of attributes is irrelevant.
pub fn is_projection_modified(current: &Projection, desired: &Projection) -> bool {
    if current.projection_type != desired.projection_type {
        return true;
    }
    if current.projection_type == Some(ProjectionType::All) {
        return false;
    }

    let current_attributes: HashSet<&str> =
        current.non_key_attributes.iter().map(String::as_str).collect();
    let desired_attributes: HashSet<&str> =
        desired.non_key_attributes.iter().map(String::as_str).collect();
    current_attributes != desired_attributes
}

//! Global secondary index convergence.
//!
//! DynamoDB accepts a single index create or delete per UpdateTable call, so
//! convergence is computed one step at a time: the caller applies the step,
//! waits for the table to settle and asks again until [`ConvergenceStep::Converged`].
//! A changed index is therefore dropped in one cycle and recreated in a later one.

use crate::model::{
    AttributeDefinition, DesiredTableSpec, GlobalSecondaryIndex, ObservedIndex, ObservedTableState,
};
use crate::table_operations::compare::{is_key_schema_modified, is_projection_modified};

/// The single index mutation needed to move one step closer to the desired state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvergenceStep {
    DeleteIndex(String),
    CreateIndex {
        index: GlobalSecondaryIndex,
        /// Only the definitions the index's key schema references.
        attribute_definitions: Vec<AttributeDefinition>,
    },
    Converged,
}

impl ConvergenceStep {
    pub fn is_converged(&self) -> bool {
        matches!(self, ConvergenceStep::Converged)
    }
}

fn needs_removal(current: &ObservedIndex, desired: &DesiredTableSpec) -> bool {
    match desired
        .global_secondary_indexes
        .iter()
        .find(|index| index.index_name == current.index_name)
    {
        None => true,
        Some(wanted) => {
            is_key_schema_modified(&current.key_schema, &wanted.key_schema)
                || is_projection_modified(&current.projection, &wanted.projection)
        }
    }
}

/// Compute the next index step. Removals always come before creations.
///
/// Key schema replacement of the table itself is decided by the caller; this
/// only looks at indexes.
pub fn next_gsi_step(current: &ObservedTableState, desired: &DesiredTableSpec) -> ConvergenceStep {
    if let Some(stale) = current
        .global_secondary_indexes
        .iter()
        .find(|index| needs_removal(index, desired))
    {
        return ConvergenceStep::DeleteIndex(stale.index_name.clone());
    }

    if let Some(missing) = desired.global_secondary_indexes.iter().find(|index| {
        !current
            .global_secondary_indexes
            .iter()
            .any(|existing| existing.index_name == index.index_name)
    }) {
        return ConvergenceStep::CreateIndex {
            index: missing.clone(),
            attribute_definitions: desired.attribute_definitions_for(&missing.key_schema),
        };
    }

    ConvergenceStep::Converged
}

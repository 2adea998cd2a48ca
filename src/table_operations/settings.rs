//! Table-level settings convergence (capacity, streams, encryption, deletion protection).
//!
//! Like index changes, settings are converged one UpdateTable call at a time,
//! in a fixed order. Fields the desired table leaves unset are never touched.

use crate::model::{
    BillingMode, DesiredTableSpec, ObservedTableState, ProvisionedThroughput, SseSpecification,
    StreamSpecification,
};
use crate::table_operations::provider::{IndexThroughputUpdate, TableUpdate};

fn desired_index_throughput(
    index_name: &str,
    desired: &DesiredTableSpec,
) -> Option<ProvisionedThroughput> {
    desired
        .global_secondary_indexes
        .iter()
        .find(|index| index.index_name == index_name)
        .and_then(|index| index.provisioned_throughput)
}

/// Throughput for every existing index when the table becomes provisioned.
///
/// DynamoDB requires one per index in the same call. Indexes without a desired
/// value (including ones about to be dropped) borrow the table's throughput.
fn index_throughput_for_switch(
    current: &ObservedTableState,
    desired: &DesiredTableSpec,
) -> Vec<IndexThroughputUpdate> {
    current
        .global_secondary_indexes
        .iter()
        .filter_map(|index| {
            let throughput = desired_index_throughput(&index.index_name, desired)
                .or(desired.provisioned_throughput)?;
            Some(IndexThroughputUpdate {
                index_name: index.index_name.clone(),
                provisioned_throughput: throughput,
            })
        })
        .collect()
}

/// Existing indexes whose throughput differs from the desired value.
fn changed_index_throughput(
    current: &ObservedTableState,
    desired: &DesiredTableSpec,
) -> Vec<IndexThroughputUpdate> {
    current
        .global_secondary_indexes
        .iter()
        .filter_map(|index| {
            let wanted = desired_index_throughput(&index.index_name, desired)?;
            (index.provisioned_throughput != Some(wanted)).then(|| IndexThroughputUpdate {
                index_name: index.index_name.clone(),
                provisioned_throughput: wanted,
            })
        })
        .collect()
}

fn capacity_update(
    current: &ObservedTableState,
    desired: &DesiredTableSpec,
) -> Option<TableUpdate> {
    let effective_mode = desired.billing_mode.or(current.billing_mode);

    if let Some(mode) = desired.billing_mode
        && current.billing_mode != Some(mode)
    {
        let update = match mode {
            BillingMode::Provisioned => TableUpdate {
                billing_mode: Some(mode),
                provisioned_throughput: desired.provisioned_throughput,
                index_throughput: index_throughput_for_switch(current, desired),
                ..TableUpdate::new(&current.table_name)
            },
            BillingMode::PayPerRequest => TableUpdate {
                billing_mode: Some(mode),
                ..TableUpdate::new(&current.table_name)
            },
        };
        return Some(update);
    }

    if effective_mode != Some(BillingMode::Provisioned) {
        return None;
    }

    let table_throughput = desired
        .provisioned_throughput
        .filter(|throughput| current.provisioned_throughput != Some(*throughput));
    let index_throughput = changed_index_throughput(current, desired);

    if table_throughput.is_none() && index_throughput.is_empty() {
        return None;
    }
    Some(TableUpdate {
        provisioned_throughput: table_throughput,
        index_throughput,
        ..TableUpdate::new(&current.table_name)
    })
}

fn stream_update(current: &ObservedTableState, desired: &DesiredTableSpec) -> Option<TableUpdate> {
    let wanted = desired.stream_specification.as_ref()?;
    let enabled_now = current
        .stream_specification
        .as_ref()
        .filter(|stream| stream.stream_enabled);

    let next = match (enabled_now, wanted.stream_enabled) {
        (None, false) => return None,
        (None, true) => wanted.clone(),
        (Some(_), false) => StreamSpecification {
            stream_enabled: false,
            stream_view_type: None,
        },
        (Some(existing), true) => {
            if existing.stream_view_type == wanted.stream_view_type {
                return None;
            }
            // The view type of an enabled stream cannot be changed in place.
            StreamSpecification {
                stream_enabled: false,
                stream_view_type: None,
            }
        }
    };

    Some(TableUpdate {
        stream_specification: Some(next),
        ..TableUpdate::new(&current.table_name)
    })
}

fn sse_matches(current: Option<&SseSpecification>, wanted: &SseSpecification) -> bool {
    let enabled_now = current.is_some_and(|sse| sse.sse_enabled);
    if enabled_now != wanted.sse_enabled {
        return false;
    }
    if !wanted.sse_enabled {
        return true;
    }
    match &wanted.sse_type {
        Some(wanted_type) => current.and_then(|sse| sse.sse_type.as_ref()) == Some(wanted_type),
        None => true,
    }
}

fn sse_update(current: &ObservedTableState, desired: &DesiredTableSpec) -> Option<TableUpdate> {
    let wanted = desired.sse_specification.as_ref()?;
    if sse_matches(current.sse_specification.as_ref(), wanted) {
        return None;
    }
    Some(TableUpdate {
        sse_specification: Some(wanted.clone()),
        ..TableUpdate::new(&current.table_name)
    })
}

fn deletion_protection_update(
    current: &ObservedTableState,
    desired: &DesiredTableSpec,
) -> Option<TableUpdate> {
    let wanted = desired.deletion_protection_enabled?;
    (current.deletion_protection_enabled != wanted).then(|| TableUpdate {
        deletion_protection_enabled: Some(wanted),
        ..TableUpdate::new(&current.table_name)
    })
}

/// The next table-level settings update, if any setting differs.
pub fn next_settings_update(
    current: &ObservedTableState,
    desired: &DesiredTableSpec,
) -> Option<TableUpdate> {
    capacity_update(current, desired)
        .or_else(|| stream_update(current, desired))
        .or_else(|| sse_update(current, desired))
        .or_else(|| deletion_protection_update(current, desired))
}

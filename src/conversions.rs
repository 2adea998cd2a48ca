//! Type conversions between the table model and `aws-sdk-dynamodb` types.
//!
//! Outbound conversions only set fields that are present; inbound conversions
//! default anything DynamoDB leaves out.

use aws_sdk_dynamodb::types as sdk;

use crate::errors::TableError;
use crate::model::{
    AttributeDefinition, AttributeType, BillingMode, GlobalSecondaryIndex, KeySchemaElement,
    KeyType, ObservedIndex, ObservedTableState, Projection, ProjectionType, ProvisionedThroughput,
    ResourceStatus, SseSpecification, StreamSpecification, StreamViewType,
    TimeToLiveSpecification, TimeToLiveStatus,
};

fn build_error(what: &str, err: impl std::fmt::Display) -> TableError {
    TableError::Validation(format!("Failed to build {}: {}", what, err))
}

// ========== MODEL -> SDK ==========

pub fn to_sdk_key_schema(
    schema: &[KeySchemaElement],
) -> Result<Vec<sdk::KeySchemaElement>, TableError> {
    schema
        .iter()
        .map(|element| {
            sdk::KeySchemaElement::builder()
                .attribute_name(&element.attribute_name)
                .key_type(sdk::KeyType::from(element.key_type.as_str()))
                .build()
                .map_err(|e| build_error("key schema", e))
        })
        .collect()
}

pub fn to_sdk_attribute_definitions(
    definitions: &[AttributeDefinition],
) -> Result<Vec<sdk::AttributeDefinition>, TableError> {
    definitions
        .iter()
        .map(|definition| {
            sdk::AttributeDefinition::builder()
                .attribute_name(&definition.attribute_name)
                .attribute_type(sdk::ScalarAttributeType::from(
                    definition.attribute_type.as_str(),
                ))
                .build()
                .map_err(|e| build_error("attribute definition", e))
        })
        .collect()
}

pub fn to_sdk_projection(projection: &Projection) -> sdk::Projection {
    let non_key_attributes = if projection.non_key_attributes.is_empty() {
        None
    } else {
        Some(projection.non_key_attributes.clone())
    };

    sdk::Projection::builder()
        .set_projection_type(
            projection
                .projection_type
                .map(|kind| sdk::ProjectionType::from(kind.as_str())),
        )
        .set_non_key_attributes(non_key_attributes)
        .build()
}

pub fn to_sdk_throughput(
    throughput: &ProvisionedThroughput,
) -> Result<sdk::ProvisionedThroughput, TableError> {
    sdk::ProvisionedThroughput::builder()
        .read_capacity_units(throughput.read_capacity_units)
        .write_capacity_units(throughput.write_capacity_units)
        .build()
        .map_err(|e| build_error("provisioned throughput", e))
}

fn to_sdk_opt_throughput(
    throughput: Option<&ProvisionedThroughput>,
) -> Result<Option<sdk::ProvisionedThroughput>, TableError> {
    throughput.map(to_sdk_throughput).transpose()
}

pub fn to_sdk_global_secondary_index(
    index: &GlobalSecondaryIndex,
) -> Result<sdk::GlobalSecondaryIndex, TableError> {
    sdk::GlobalSecondaryIndex::builder()
        .index_name(&index.index_name)
        .set_key_schema(Some(to_sdk_key_schema(&index.key_schema)?))
        .projection(to_sdk_projection(&index.projection))
        .set_provisioned_throughput(to_sdk_opt_throughput(index.provisioned_throughput.as_ref())?)
        .build()
        .map_err(|e| build_error("global secondary index", e))
}

pub fn to_sdk_create_index_action(
    index: &GlobalSecondaryIndex,
) -> Result<sdk::CreateGlobalSecondaryIndexAction, TableError> {
    sdk::CreateGlobalSecondaryIndexAction::builder()
        .index_name(&index.index_name)
        .set_key_schema(Some(to_sdk_key_schema(&index.key_schema)?))
        .projection(to_sdk_projection(&index.projection))
        .set_provisioned_throughput(to_sdk_opt_throughput(index.provisioned_throughput.as_ref())?)
        .build()
        .map_err(|e| build_error("create index action", e))
}

pub fn to_sdk_delete_index_action(
    index_name: &str,
) -> Result<sdk::DeleteGlobalSecondaryIndexAction, TableError> {
    sdk::DeleteGlobalSecondaryIndexAction::builder()
        .index_name(index_name)
        .build()
        .map_err(|e| build_error("delete index action", e))
}

pub fn to_sdk_update_index_action(
    index_name: &str,
    throughput: &ProvisionedThroughput,
) -> Result<sdk::UpdateGlobalSecondaryIndexAction, TableError> {
    sdk::UpdateGlobalSecondaryIndexAction::builder()
        .index_name(index_name)
        .provisioned_throughput(to_sdk_throughput(throughput)?)
        .build()
        .map_err(|e| build_error("update index action", e))
}

pub fn to_sdk_stream_specification(
    stream: &StreamSpecification,
) -> Result<sdk::StreamSpecification, TableError> {
    sdk::StreamSpecification::builder()
        .stream_enabled(stream.stream_enabled)
        .set_stream_view_type(
            stream
                .stream_view_type
                .map(|view| sdk::StreamViewType::from(view.as_str())),
        )
        .build()
        .map_err(|e| build_error("stream specification", e))
}

pub fn to_sdk_sse_specification(sse: &SseSpecification) -> sdk::SseSpecification {
    sdk::SseSpecification::builder()
        .enabled(sse.sse_enabled)
        .set_sse_type(sse.sse_type.as_deref().map(sdk::SseType::from))
        .set_kms_master_key_id(sse.kms_master_key_id.clone())
        .build()
}

pub fn to_sdk_time_to_live(
    ttl: &TimeToLiveSpecification,
) -> Result<sdk::TimeToLiveSpecification, TableError> {
    sdk::TimeToLiveSpecification::builder()
        .attribute_name(&ttl.attribute_name)
        .enabled(ttl.enabled)
        .build()
        .map_err(|e| build_error("time to live specification", e))
}

pub fn to_sdk_billing_mode(mode: BillingMode) -> sdk::BillingMode {
    sdk::BillingMode::from(mode.as_str())
}

// ========== SDK -> MODEL ==========

fn from_sdk_key_schema(schema: &[sdk::KeySchemaElement]) -> Vec<KeySchemaElement> {
    schema
        .iter()
        .map(|element| KeySchemaElement {
            attribute_name: element.attribute_name().to_string(),
            key_type: match element.key_type() {
                sdk::KeyType::Range => KeyType::Range,
                _ => KeyType::Hash,
            },
        })
        .collect()
}

fn from_sdk_attribute_definitions(
    definitions: &[sdk::AttributeDefinition],
) -> Vec<AttributeDefinition> {
    definitions
        .iter()
        .map(|definition| AttributeDefinition {
            attribute_name: definition.attribute_name().to_string(),
            attribute_type: match definition.attribute_type() {
                sdk::ScalarAttributeType::N => AttributeType::N,
                sdk::ScalarAttributeType::B => AttributeType::B,
                _ => AttributeType::S,
            },
        })
        .collect()
}

fn from_sdk_projection(projection: Option<&sdk::Projection>) -> Projection {
    match projection {
        Some(projection) => Projection {
            projection_type: projection
                .projection_type()
                .and_then(|kind| ProjectionType::parse(kind.as_str())),
            non_key_attributes: projection.non_key_attributes().to_vec(),
        },
        None => Projection::default(),
    }
}

fn from_sdk_throughput(
    throughput: Option<&sdk::ProvisionedThroughputDescription>,
) -> Option<ProvisionedThroughput> {
    let throughput = throughput?;
    Some(ProvisionedThroughput {
        read_capacity_units: throughput.read_capacity_units()?,
        write_capacity_units: throughput.write_capacity_units()?,
    })
}

fn from_sdk_index(index: &sdk::GlobalSecondaryIndexDescription) -> ObservedIndex {
    ObservedIndex {
        index_name: index.index_name().unwrap_or_default().to_string(),
        index_status: index
            .index_status()
            .map(|status| ResourceStatus::parse(status.as_str()))
            .unwrap_or(ResourceStatus::Creating),
        backfilling: index.backfilling().unwrap_or(false),
        key_schema: from_sdk_key_schema(index.key_schema()),
        projection: from_sdk_projection(index.projection()),
        provisioned_throughput: from_sdk_throughput(index.provisioned_throughput()),
    }
}

fn from_sdk_sse(sse: Option<&sdk::SseDescription>) -> Option<SseSpecification> {
    let sse = sse?;
    let enabled = matches!(
        sse.status(),
        Some(sdk::SseStatus::Enabled | sdk::SseStatus::Enabling | sdk::SseStatus::Updating)
    );
    Some(SseSpecification {
        sse_enabled: enabled,
        sse_type: sse.sse_type().map(|kind| kind.as_str().to_string()),
        kms_master_key_id: sse.kms_master_key_arn().map(str::to_string),
    })
}

/// Build the observed state from a DescribeTable/CreateTable description.
///
/// `fallback_name` is used if DynamoDB omits the table name.
pub fn observed_from_description(
    description: &sdk::TableDescription,
    fallback_name: &str,
) -> ObservedTableState {
    // Tables that were always provisioned may carry no billing summary.
    let billing_mode = description
        .billing_mode_summary()
        .and_then(|summary| summary.billing_mode())
        .and_then(|mode| BillingMode::parse(mode.as_str()))
        .unwrap_or(BillingMode::Provisioned);

    let provisioned_throughput = match billing_mode {
        BillingMode::Provisioned => from_sdk_throughput(description.provisioned_throughput()),
        BillingMode::PayPerRequest => None,
    };

    let stream_specification = description.stream_specification().map(|stream| StreamSpecification {
        stream_enabled: stream.stream_enabled(),
        stream_view_type: stream
            .stream_view_type()
            .and_then(|view| StreamViewType::parse(view.as_str())),
    });

    ObservedTableState {
        table_name: description
            .table_name()
            .unwrap_or(fallback_name)
            .to_string(),
        table_arn: description.table_arn().map(str::to_string),
        latest_stream_arn: description.latest_stream_arn().map(str::to_string),
        table_status: description
            .table_status()
            .map(|status| ResourceStatus::parse(status.as_str()))
            .unwrap_or(ResourceStatus::Creating),
        key_schema: from_sdk_key_schema(description.key_schema()),
        attribute_definitions: from_sdk_attribute_definitions(description.attribute_definitions()),
        global_secondary_indexes: description
            .global_secondary_indexes()
            .iter()
            .map(|index| {
                let mut observed = from_sdk_index(index);
                // On-demand tables report zeroed index capacity.
                if billing_mode == BillingMode::PayPerRequest {
                    observed.provisioned_throughput = None;
                }
                observed
            })
            .collect(),
        billing_mode: Some(billing_mode),
        provisioned_throughput,
        stream_specification,
        sse_specification: from_sdk_sse(description.sse_description()),
        deletion_protection_enabled: description.deletion_protection_enabled().unwrap_or(false),
    }
}

/// TTL status from a DescribeTimeToLive description. No description means disabled.
pub fn time_to_live_from_description(
    description: Option<&sdk::TimeToLiveDescription>,
) -> TimeToLiveStatus {
    let Some(description) = description else {
        return TimeToLiveStatus::Disabled;
    };
    let attribute = description.attribute_name().unwrap_or_default().to_string();
    match description.time_to_live_status() {
        Some(sdk::TimeToLiveStatus::Enabled) => TimeToLiveStatus::Enabled(attribute),
        Some(sdk::TimeToLiveStatus::Enabling) => TimeToLiveStatus::Enabling(attribute),
        Some(sdk::TimeToLiveStatus::Disabling) => TimeToLiveStatus::Disabling(attribute),
        _ => TimeToLiveStatus::Disabled,
    }
}

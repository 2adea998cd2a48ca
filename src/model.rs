//! Domain types for the desired and observed shape of a DynamoDB table.
//!
//! `DesiredTableSpec` is parsed from custom-resource properties on every
//! invocation. `ObservedTableState` is built from a fresh DescribeTable call.
//! Neither is cached between invocations.

use serde::Deserialize;

use crate::properties::{coerce_bool, coerce_i64, coerce_opt_bool};

/// Role of an attribute inside a key schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeyType {
    Hash,
    Range,
}

impl KeyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Hash => "HASH",
            KeyType::Range => "RANGE",
        }
    }
}

/// Scalar type of a key attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum AttributeType {
    S,
    N,
    B,
}

impl AttributeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeType::S => "S",
            AttributeType::N => "N",
            AttributeType::B => "B",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KeySchemaElement {
    #[serde(rename = "AttributeName")]
    pub attribute_name: String,
    #[serde(rename = "KeyType")]
    pub key_type: KeyType,
}

impl KeySchemaElement {
    pub fn hash(name: impl Into<String>) -> Self {
        Self {
            attribute_name: name.into(),
            key_type: KeyType::Hash,
        }
    }

    pub fn range(name: impl Into<String>) -> Self {
        Self {
            attribute_name: name.into(),
            key_type: KeyType::Range,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AttributeDefinition {
    #[serde(rename = "AttributeName")]
    pub attribute_name: String,
    #[serde(rename = "AttributeType")]
    pub attribute_type: AttributeType,
}

impl AttributeDefinition {
    pub fn new(name: impl Into<String>, attribute_type: AttributeType) -> Self {
        Self {
            attribute_name: name.into(),
            attribute_type,
        }
    }
}

/// Name of the hash key in a key schema, if any.
pub fn hash_key(schema: &[KeySchemaElement]) -> Option<&str> {
    schema
        .iter()
        .find(|element| element.key_type == KeyType::Hash)
        .map(|element| element.attribute_name.as_str())
}

/// Name of the sort key in a key schema, if any.
pub fn range_key(schema: &[KeySchemaElement]) -> Option<&str> {
    schema
        .iter()
        .find(|element| element.key_type == KeyType::Range)
        .map(|element| element.attribute_name.as_str())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectionType {
    All,
    KeysOnly,
    Include,
}

impl ProjectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectionType::All => "ALL",
            ProjectionType::KeysOnly => "KEYS_ONLY",
            ProjectionType::Include => "INCLUDE",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ALL" => Some(ProjectionType::All),
            "KEYS_ONLY" => Some(ProjectionType::KeysOnly),
            "INCLUDE" => Some(ProjectionType::Include),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Projection {
    #[serde(rename = "ProjectionType", default)]
    pub projection_type: Option<ProjectionType>,
    #[serde(rename = "NonKeyAttributes", default)]
    pub non_key_attributes: Vec<String>,
}

impl Projection {
    pub fn all() -> Self {
        Self {
            projection_type: Some(ProjectionType::All),
            non_key_attributes: Vec::new(),
        }
    }

    pub fn include<I, S>(attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            projection_type: Some(ProjectionType::Include),
            non_key_attributes: attributes.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ProvisionedThroughput {
    #[serde(rename = "ReadCapacityUnits", deserialize_with = "coerce_i64")]
    pub read_capacity_units: i64,
    #[serde(rename = "WriteCapacityUnits", deserialize_with = "coerce_i64")]
    pub write_capacity_units: i64,
}

/// A global secondary index as declared in the desired state.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GlobalSecondaryIndex {
    #[serde(rename = "IndexName")]
    pub index_name: String,
    #[serde(rename = "KeySchema")]
    pub key_schema: Vec<KeySchemaElement>,
    #[serde(rename = "Projection", default)]
    pub projection: Projection,
    #[serde(rename = "ProvisionedThroughput", default)]
    pub provisioned_throughput: Option<ProvisionedThroughput>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingMode {
    Provisioned,
    PayPerRequest,
}

impl BillingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingMode::Provisioned => "PROVISIONED",
            BillingMode::PayPerRequest => "PAY_PER_REQUEST",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PROVISIONED" => Some(BillingMode::Provisioned),
            "PAY_PER_REQUEST" => Some(BillingMode::PayPerRequest),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StreamViewType {
    KeysOnly,
    NewImage,
    OldImage,
    NewAndOldImages,
}

impl StreamViewType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamViewType::KeysOnly => "KEYS_ONLY",
            StreamViewType::NewImage => "NEW_IMAGE",
            StreamViewType::OldImage => "OLD_IMAGE",
            StreamViewType::NewAndOldImages => "NEW_AND_OLD_IMAGES",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "KEYS_ONLY" => Some(StreamViewType::KeysOnly),
            "NEW_IMAGE" => Some(StreamViewType::NewImage),
            "OLD_IMAGE" => Some(StreamViewType::OldImage),
            "NEW_AND_OLD_IMAGES" => Some(StreamViewType::NewAndOldImages),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StreamSpecification {
    #[serde(rename = "StreamEnabled", deserialize_with = "coerce_bool")]
    pub stream_enabled: bool,
    #[serde(rename = "StreamViewType", default)]
    pub stream_view_type: Option<StreamViewType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SseSpecification {
    #[serde(rename = "SSEEnabled", deserialize_with = "coerce_bool")]
    pub sse_enabled: bool,
    #[serde(rename = "SSEType", default)]
    pub sse_type: Option<String>,
    #[serde(rename = "KMSMasterKeyId", default)]
    pub kms_master_key_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimeToLiveSpecification {
    #[serde(rename = "AttributeName")]
    pub attribute_name: String,
    #[serde(rename = "Enabled", deserialize_with = "coerce_bool")]
    pub enabled: bool,
}

/// TTL state as DescribeTimeToLive reports it.
///
/// DynamoDB rejects UpdateTimeToLive while a change is still in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeToLiveStatus {
    Disabled,
    Enabling(String),
    Enabled(String),
    Disabling(String),
}

impl TimeToLiveStatus {
    pub fn is_transitioning(&self) -> bool {
        matches!(
            self,
            TimeToLiveStatus::Enabling(_) | TimeToLiveStatus::Disabling(_)
        )
    }
}

/// The table as the deployment wants it to be.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DesiredTableSpec {
    #[serde(rename = "TableName")]
    pub table_name: String,
    #[serde(rename = "AttributeDefinitions", default)]
    pub attribute_definitions: Vec<AttributeDefinition>,
    #[serde(rename = "KeySchema")]
    pub key_schema: Vec<KeySchemaElement>,
    #[serde(rename = "GlobalSecondaryIndexes", default)]
    pub global_secondary_indexes: Vec<GlobalSecondaryIndex>,
    #[serde(rename = "BillingMode", default)]
    pub billing_mode: Option<BillingMode>,
    #[serde(rename = "ProvisionedThroughput", default)]
    pub provisioned_throughput: Option<ProvisionedThroughput>,
    #[serde(rename = "StreamSpecification", default)]
    pub stream_specification: Option<StreamSpecification>,
    #[serde(rename = "SSESpecification", default)]
    pub sse_specification: Option<SseSpecification>,
    #[serde(rename = "TimeToLiveSpecification", default)]
    pub time_to_live_specification: Option<TimeToLiveSpecification>,
    #[serde(
        rename = "PointInTimeRecoveryEnabled",
        default,
        deserialize_with = "coerce_opt_bool"
    )]
    pub point_in_time_recovery_enabled: Option<bool>,
    #[serde(
        rename = "DeletionProtectionEnabled",
        default,
        deserialize_with = "coerce_opt_bool"
    )]
    pub deletion_protection_enabled: Option<bool>,
}

impl DesiredTableSpec {
    /// Attribute definitions referenced by the given key schema, in declaration order.
    pub fn attribute_definitions_for(
        &self,
        schema: &[KeySchemaElement],
    ) -> Vec<AttributeDefinition> {
        self.attribute_definitions
            .iter()
            .filter(|definition| {
                schema
                    .iter()
                    .any(|element| element.attribute_name == definition.attribute_name)
            })
            .cloned()
            .collect()
    }
}

/// Provider-side lifecycle status, shared by tables and indexes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceStatus {
    Creating,
    Updating,
    Deleting,
    Active,
    Other(String),
}

impl ResourceStatus {
    pub fn parse(value: &str) -> Self {
        match value {
            "CREATING" => ResourceStatus::Creating,
            "UPDATING" => ResourceStatus::Updating,
            "DELETING" => ResourceStatus::Deleting,
            "ACTIVE" => ResourceStatus::Active,
            other => ResourceStatus::Other(other.to_string()),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, ResourceStatus::Active)
    }
}

/// A global secondary index as reported by DescribeTable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedIndex {
    pub index_name: String,
    pub index_status: ResourceStatus,
    pub backfilling: bool,
    pub key_schema: Vec<KeySchemaElement>,
    pub projection: Projection,
    pub provisioned_throughput: Option<ProvisionedThroughput>,
}

impl ObservedIndex {
    /// Active and no longer populating from base table data.
    pub fn is_settled(&self) -> bool {
        self.index_status.is_active() && !self.backfilling
    }
}

/// The table as DynamoDB currently reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedTableState {
    pub table_name: String,
    pub table_arn: Option<String>,
    pub latest_stream_arn: Option<String>,
    pub table_status: ResourceStatus,
    pub key_schema: Vec<KeySchemaElement>,
    pub attribute_definitions: Vec<AttributeDefinition>,
    pub global_secondary_indexes: Vec<ObservedIndex>,
    pub billing_mode: Option<BillingMode>,
    pub provisioned_throughput: Option<ProvisionedThroughput>,
    pub stream_specification: Option<StreamSpecification>,
    pub sse_specification: Option<SseSpecification>,
    pub deletion_protection_enabled: bool,
}

impl ObservedTableState {
    /// Table and every index are ACTIVE and nothing is backfilling.
    pub fn is_settled(&self) -> bool {
        self.table_status.is_active()
            && self
                .global_secondary_indexes
                .iter()
                .all(ObservedIndex::is_settled)
    }
}

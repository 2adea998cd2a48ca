use std::time::Duration;

use dynamo_table_manager::lifecycle::{
    LifecycleController, LifecycleEvent, RequestType, WaitPolicies,
};
use dynamo_table_manager::model::{
    AttributeDefinition, AttributeType, BillingMode, KeySchemaElement, ObservedIndex,
    ObservedTableState, Projection, ResourceStatus,
};
use dynamo_table_manager::retry::RetryPolicy;
use serde_json::{json, Value};

use super::fake_provider::FakeTableProvider;

pub const TABLE: &str = "Todo";

/// Short waits so paused-clock tests finish in few virtual seconds.
pub fn fast_waits() -> WaitPolicies {
    WaitPolicies {
        table_deletion: RetryPolicy::new(20, Duration::from_millis(100), Duration::from_secs(10)),
        table_visibility: RetryPolicy::new(3, Duration::from_millis(100), Duration::from_secs(5)),
    }
}

pub fn controller(provider: FakeTableProvider) -> LifecycleController<FakeTableProvider> {
    LifecycleController::new(provider, fast_waits())
}

pub fn event(
    request_type: RequestType,
    physical_id: Option<&str>,
    properties: Value,
) -> LifecycleEvent {
    let mut envelope = json!({
        "RequestType": request_type.as_str(),
        "RequestId": "8c8d1f0a-request",
        "LogicalResourceId": "TodoTable",
        "ResourceProperties": properties,
    });
    if let Some(id) = physical_id {
        envelope["PhysicalResourceId"] = json!(id);
    }
    serde_json::from_value(envelope).expect("valid lifecycle event")
}

/// `id` hash key, pay-per-request, plus one `S` attribute per index hash key.
pub fn properties(indexes: &[(&str, &str)]) -> Value {
    let mut attributes = vec![json!({"AttributeName": "id", "AttributeType": "S"})];
    for (_, hash) in indexes {
        attributes.push(json!({"AttributeName": hash, "AttributeType": "S"}));
    }
    let indexes: Vec<Value> = indexes
        .iter()
        .map(|(name, hash)| {
            json!({
                "IndexName": name,
                "KeySchema": [{"AttributeName": hash, "KeyType": "HASH"}],
                "Projection": {"ProjectionType": "ALL"},
            })
        })
        .collect();

    json!({
        "ServiceToken": "arn:aws:lambda:us-east-1:123456789012:function:provider",
        "TableName": TABLE,
        "AttributeDefinitions": attributes,
        "KeySchema": [{"AttributeName": "id", "KeyType": "HASH"}],
        "GlobalSecondaryIndexes": indexes,
        "BillingMode": "PAY_PER_REQUEST",
    })
}

pub fn active_index(name: &str, hash: &str) -> ObservedIndex {
    ObservedIndex {
        index_name: name.to_string(),
        index_status: ResourceStatus::Active,
        backfilling: false,
        key_schema: vec![KeySchemaElement::hash(hash)],
        projection: Projection::all(),
        provisioned_throughput: None,
    }
}

/// An ACTIVE pay-per-request table keyed on `id`.
pub fn active_table(indexes: &[(&str, &str)]) -> ObservedTableState {
    let mut attribute_definitions = vec![AttributeDefinition::new("id", AttributeType::S)];
    for (_, hash) in indexes {
        attribute_definitions.push(AttributeDefinition::new(*hash, AttributeType::S));
    }

    ObservedTableState {
        table_name: TABLE.to_string(),
        table_arn: Some(format!("arn:aws:dynamodb:us-east-1:123456789012:table/{}", TABLE)),
        latest_stream_arn: None,
        table_status: ResourceStatus::Active,
        key_schema: vec![KeySchemaElement::hash("id")],
        attribute_definitions,
        global_secondary_indexes: indexes
            .iter()
            .map(|(name, hash)| active_index(name, hash))
            .collect(),
        billing_mode: Some(BillingMode::PayPerRequest),
        provisioned_throughput: None,
        stream_specification: None,
        sse_specification: None,
        deletion_protection_enabled: false,
    }
}

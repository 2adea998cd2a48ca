//! Custom-resource request and response shapes.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::TableError;
use crate::model::{DesiredTableSpec, ObservedTableState};
use crate::properties::parse_desired_spec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum RequestType {
    Create,
    Update,
    Delete,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Create => "Create",
            RequestType::Update => "Update",
            RequestType::Delete => "Delete",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lifecycle request as delivered to both `onEvent` and `isComplete`.
///
/// Only the fields the controller reads are modelled; the rest of the
/// CloudFormation envelope is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct LifecycleEvent {
    #[serde(rename = "RequestType")]
    pub request_type: RequestType,
    #[serde(rename = "PhysicalResourceId", default)]
    pub physical_resource_id: Option<String>,
    #[serde(rename = "ResourceProperties", default)]
    pub resource_properties: Value,
    #[serde(rename = "RequestId", default)]
    pub request_id: Option<String>,
    #[serde(rename = "LogicalResourceId", default)]
    pub logical_resource_id: Option<String>,
}

impl LifecycleEvent {
    /// Parse the desired table from `ResourceProperties`.
    pub fn desired_spec(&self) -> Result<DesiredTableSpec, TableError> {
        parse_desired_spec(&self.resource_properties)
    }

    pub fn physical_id(&self) -> Result<&str, TableError> {
        self.physical_resource_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(TableError::MissingPhysicalId(self.request_type.as_str()))
    }
}

/// Attributes exposed to the stack through `Fn::GetAtt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableOutputs {
    #[serde(rename = "TableArn")]
    pub table_arn: String,
    #[serde(rename = "TableStreamArn", skip_serializing_if = "Option::is_none")]
    pub table_stream_arn: Option<String>,
    #[serde(rename = "TableName")]
    pub table_name: String,
}

impl From<&ObservedTableState> for TableOutputs {
    fn from(state: &ObservedTableState) -> Self {
        Self {
            table_arn: state.table_arn.clone().unwrap_or_default(),
            table_stream_arn: state.latest_stream_arn.clone(),
            table_name: state.table_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OnEventResponse {
    #[serde(rename = "PhysicalResourceId")]
    pub physical_resource_id: String,
    #[serde(rename = "Data", skip_serializing_if = "Option::is_none")]
    pub data: Option<TableOutputs>,
}

impl OnEventResponse {
    pub fn for_table(state: &ObservedTableState) -> Self {
        Self {
            physical_resource_id: state.table_name.clone(),
            data: Some(TableOutputs::from(state)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IsCompleteResponse {
    #[serde(rename = "IsComplete")]
    pub is_complete: bool,
    #[serde(rename = "Data", skip_serializing_if = "Option::is_none")]
    pub data: Option<TableOutputs>,
}

impl IsCompleteResponse {
    pub fn pending() -> Self {
        Self {
            is_complete: false,
            data: None,
        }
    }

    pub fn complete(data: Option<TableOutputs>) -> Self {
        Self {
            is_complete: true,
            data,
        }
    }
}

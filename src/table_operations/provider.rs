//! The provisioning calls the lifecycle controller needs.

use std::future::Future;

use crate::errors::TableError;
use crate::model::{
    AttributeDefinition, BillingMode, DesiredTableSpec, GlobalSecondaryIndex, ObservedTableState,
    ProvisionedThroughput, SseSpecification, StreamSpecification, TimeToLiveSpecification,
    TimeToLiveStatus,
};
use crate::table_operations::gsi::ConvergenceStep;

/// The one index mutation an UpdateTable call may carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexUpdate {
    Create(GlobalSecondaryIndex),
    Delete(String),
}

/// New provisioned throughput for an existing index.
///
/// Unlike [`IndexUpdate`], any number of these may share one UpdateTable call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexThroughputUpdate {
    pub index_name: String,
    pub provisioned_throughput: ProvisionedThroughput,
}

/// Input for a single UpdateTable call. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableUpdate {
    pub table_name: String,
    pub attribute_definitions: Vec<AttributeDefinition>,
    pub index_update: Option<IndexUpdate>,
    pub index_throughput: Vec<IndexThroughputUpdate>,
    pub billing_mode: Option<BillingMode>,
    pub provisioned_throughput: Option<ProvisionedThroughput>,
    pub stream_specification: Option<StreamSpecification>,
    pub sse_specification: Option<SseSpecification>,
    pub deletion_protection_enabled: Option<bool>,
}

impl TableUpdate {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Self::default()
        }
    }

    /// Translate an index convergence step into an UpdateTable input.
    ///
    /// Returns `None` for [`ConvergenceStep::Converged`].
    pub fn from_step(table_name: &str, step: &ConvergenceStep) -> Option<Self> {
        match step {
            ConvergenceStep::DeleteIndex(name) => Some(Self {
                index_update: Some(IndexUpdate::Delete(name.clone())),
                ..Self::new(table_name)
            }),
            ConvergenceStep::CreateIndex {
                index,
                attribute_definitions,
            } => Some(Self {
                attribute_definitions: attribute_definitions.clone(),
                index_update: Some(IndexUpdate::Create(index.clone())),
                ..Self::new(table_name)
            }),
            ConvergenceStep::Converged => None,
        }
    }

    /// Short label for logs.
    pub fn describe(&self) -> String {
        match &self.index_update {
            Some(IndexUpdate::Create(index)) => format!("create index {}", index.index_name),
            Some(IndexUpdate::Delete(name)) => format!("delete index {}", name),
            None => {
                let mut fields = Vec::new();
                if self.billing_mode.is_some() {
                    fields.push("billing mode");
                }
                if self.provisioned_throughput.is_some() {
                    fields.push("provisioned throughput");
                }
                if !self.index_throughput.is_empty() {
                    fields.push("index throughput");
                }
                if self.stream_specification.is_some() {
                    fields.push("stream");
                }
                if self.sse_specification.is_some() {
                    fields.push("encryption");
                }
                if self.deletion_protection_enabled.is_some() {
                    fields.push("deletion protection");
                }
                format!("update {}", fields.join(", "))
            }
        }
    }
}

/// Table provisioning backend.
///
/// `describe_table` reports a missing table as `Ok(None)`; every other call
/// reports it as [`TableError::NotFound`].
pub trait TableProvider {
    fn describe_table(
        &self,
        table_name: &str,
    ) -> impl Future<Output = Result<Option<ObservedTableState>, TableError>> + Send;

    fn create_table(
        &self,
        spec: &DesiredTableSpec,
    ) -> impl Future<Output = Result<ObservedTableState, TableError>> + Send;

    fn update_table(
        &self,
        update: &TableUpdate,
    ) -> impl Future<Output = Result<(), TableError>> + Send;

    fn delete_table(&self, table_name: &str) -> impl Future<Output = Result<(), TableError>> + Send;

    fn describe_time_to_live(
        &self,
        table_name: &str,
    ) -> impl Future<Output = Result<TimeToLiveStatus, TableError>> + Send;

    fn update_time_to_live(
        &self,
        table_name: &str,
        spec: &TimeToLiveSpecification,
    ) -> impl Future<Output = Result<(), TableError>> + Send;

    fn describe_point_in_time_recovery(
        &self,
        table_name: &str,
    ) -> impl Future<Output = Result<bool, TableError>> + Send;

    fn update_point_in_time_recovery(
        &self,
        table_name: &str,
        enabled: bool,
    ) -> impl Future<Output = Result<(), TableError>> + Send;
}

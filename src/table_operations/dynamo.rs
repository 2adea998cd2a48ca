//! DynamoDB-backed table provisioner.

use aws_sdk_dynamodb::types::{
    GlobalSecondaryIndexUpdate, PointInTimeRecoverySpecification, PointInTimeRecoveryStatus,
};
use aws_sdk_dynamodb::Client;
use tracing::{debug, info};

use crate::conversions::{
    observed_from_description, time_to_live_from_description, to_sdk_attribute_definitions,
    to_sdk_billing_mode, to_sdk_create_index_action, to_sdk_delete_index_action,
    to_sdk_global_secondary_index, to_sdk_key_schema, to_sdk_sse_specification,
    to_sdk_stream_specification, to_sdk_throughput, to_sdk_time_to_live,
    to_sdk_update_index_action,
};
use crate::errors::{map_sdk_error, TableError};
use crate::model::{DesiredTableSpec, ObservedTableState, TimeToLiveSpecification, TimeToLiveStatus};
use crate::table_operations::provider::{IndexUpdate, TableProvider, TableUpdate};

/// Issues table calls against DynamoDB.
#[derive(Debug, Clone)]
pub struct DynamoTableProvisioner {
    client: Client,
}

impl DynamoTableProvisioner {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() { None } else { Some(items) }
}

fn index_updates(update: &TableUpdate) -> Result<Vec<GlobalSecondaryIndexUpdate>, TableError> {
    let mut updates = Vec::with_capacity(update.index_throughput.len() + 1);
    if let Some(change) = &update.index_update {
        updates.push(index_update(change)?);
    }
    for change in &update.index_throughput {
        let action =
            to_sdk_update_index_action(&change.index_name, &change.provisioned_throughput)?;
        updates.push(GlobalSecondaryIndexUpdate::builder().update(action).build());
    }
    Ok(updates)
}

fn index_update(update: &IndexUpdate) -> Result<GlobalSecondaryIndexUpdate, TableError> {
    Ok(match update {
        IndexUpdate::Create(index) => GlobalSecondaryIndexUpdate::builder()
            .create(to_sdk_create_index_action(index)?)
            .build(),
        IndexUpdate::Delete(name) => GlobalSecondaryIndexUpdate::builder()
            .delete(to_sdk_delete_index_action(name)?)
            .build(),
    })
}

impl TableProvider for DynamoTableProvisioner {
    async fn describe_table(
        &self,
        table_name: &str,
    ) -> Result<Option<ObservedTableState>, TableError> {
        debug!(table = table_name, "DescribeTable");
        match self.client.describe_table().table_name(table_name).send().await {
            Ok(output) => Ok(output
                .table()
                .map(|description| observed_from_description(description, table_name))),
            Err(e) => match map_sdk_error(e, Some(table_name)) {
                TableError::NotFound { .. } => Ok(None),
                other => Err(other),
            },
        }
    }

    async fn create_table(
        &self,
        spec: &DesiredTableSpec,
    ) -> Result<ObservedTableState, TableError> {
        let attribute_definitions = to_sdk_attribute_definitions(&spec.attribute_definitions)?;
        let indexes = spec
            .global_secondary_indexes
            .iter()
            .map(to_sdk_global_secondary_index)
            .collect::<Result<Vec<_>, _>>()?;

        let request = self
            .client
            .create_table()
            .table_name(&spec.table_name)
            .set_attribute_definitions(Some(attribute_definitions))
            .set_key_schema(Some(to_sdk_key_schema(&spec.key_schema)?))
            .set_global_secondary_indexes(non_empty(indexes))
            .set_billing_mode(spec.billing_mode.map(to_sdk_billing_mode))
            .set_provisioned_throughput(
                spec.provisioned_throughput
                    .as_ref()
                    .map(to_sdk_throughput)
                    .transpose()?,
            )
            .set_stream_specification(
                spec.stream_specification
                    .as_ref()
                    .map(to_sdk_stream_specification)
                    .transpose()?,
            )
            .set_sse_specification(spec.sse_specification.as_ref().map(to_sdk_sse_specification))
            .set_deletion_protection_enabled(spec.deletion_protection_enabled);

        info!(
            table = %spec.table_name,
            indexes = spec.global_secondary_indexes.len(),
            "CreateTable"
        );
        let output = request
            .send()
            .await
            .map_err(|e| map_sdk_error(e, Some(&spec.table_name)))?;

        output
            .table_description()
            .map(|description| observed_from_description(description, &spec.table_name))
            .ok_or_else(|| {
                TableError::Service(format!(
                    "CreateTable for '{}' returned no table description",
                    spec.table_name
                ))
            })
    }

    async fn update_table(&self, update: &TableUpdate) -> Result<(), TableError> {
        let gsi_updates = non_empty(index_updates(update)?);

        let request = self
            .client
            .update_table()
            .table_name(&update.table_name)
            .set_attribute_definitions(non_empty(to_sdk_attribute_definitions(
                &update.attribute_definitions,
            )?))
            .set_global_secondary_index_updates(gsi_updates)
            .set_billing_mode(update.billing_mode.map(to_sdk_billing_mode))
            .set_provisioned_throughput(
                update
                    .provisioned_throughput
                    .as_ref()
                    .map(to_sdk_throughput)
                    .transpose()?,
            )
            .set_stream_specification(
                update
                    .stream_specification
                    .as_ref()
                    .map(to_sdk_stream_specification)
                    .transpose()?,
            )
            .set_sse_specification(update.sse_specification.as_ref().map(to_sdk_sse_specification))
            .set_deletion_protection_enabled(update.deletion_protection_enabled);

        info!(table = %update.table_name, change = %update.describe(), "UpdateTable");
        request
            .send()
            .await
            .map(|_| ())
            .map_err(|e| map_sdk_error(e, Some(&update.table_name)))
    }

    async fn delete_table(&self, table_name: &str) -> Result<(), TableError> {
        info!(table = table_name, "DeleteTable");
        self.client
            .delete_table()
            .table_name(table_name)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| map_sdk_error(e, Some(table_name)))
    }

    async fn describe_time_to_live(
        &self,
        table_name: &str,
    ) -> Result<TimeToLiveStatus, TableError> {
        debug!(table = table_name, "DescribeTimeToLive");
        let output = self
            .client
            .describe_time_to_live()
            .table_name(table_name)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, Some(table_name)))?;
        Ok(time_to_live_from_description(output.time_to_live_description()))
    }

    async fn update_time_to_live(
        &self,
        table_name: &str,
        spec: &TimeToLiveSpecification,
    ) -> Result<(), TableError> {
        info!(
            table = table_name,
            attribute = %spec.attribute_name,
            enabled = spec.enabled,
            "UpdateTimeToLive"
        );
        self.client
            .update_time_to_live()
            .table_name(table_name)
            .time_to_live_specification(to_sdk_time_to_live(spec)?)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| map_sdk_error(e, Some(table_name)))
    }

    async fn describe_point_in_time_recovery(&self, table_name: &str) -> Result<bool, TableError> {
        debug!(table = table_name, "DescribeContinuousBackups");
        let output = self
            .client
            .describe_continuous_backups()
            .table_name(table_name)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, Some(table_name)))?;

        Ok(output
            .continuous_backups_description()
            .and_then(|backups| backups.point_in_time_recovery_description())
            .and_then(|pitr| pitr.point_in_time_recovery_status())
            == Some(&PointInTimeRecoveryStatus::Enabled))
    }

    async fn update_point_in_time_recovery(
        &self,
        table_name: &str,
        enabled: bool,
    ) -> Result<(), TableError> {
        let specification = PointInTimeRecoverySpecification::builder()
            .point_in_time_recovery_enabled(enabled)
            .build()
            .map_err(|e| {
                TableError::Validation(format!(
                    "Failed to build point in time recovery specification: {}",
                    e
                ))
            })?;

        info!(table = table_name, enabled, "UpdateContinuousBackups");
        self.client
            .update_continuous_backups()
            .table_name(table_name)
            .point_in_time_recovery_specification(specification)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| map_sdk_error(e, Some(table_name)))
    }
}

//! `onEvent` / `isComplete` state machine.
//!
//! `on_event` starts an operation and returns immediately; the provider
//! framework then calls `is_complete` on a fixed cadence. Each `is_complete`
//! call re-describes the table, waits while anything is not ACTIVE, and
//! otherwise issues the next single convergence step until none is left.

use tracing::{debug, info, instrument};

use crate::errors::TableError;
use crate::lifecycle::event::{
    IsCompleteResponse, LifecycleEvent, OnEventResponse, RequestType, TableOutputs,
};
use crate::model::{
    DesiredTableSpec, ObservedTableState, TimeToLiveSpecification, TimeToLiveStatus,
};
use crate::retry::{retry_until, RetryPolicy};
use crate::table_operations::{
    is_key_schema_modified, next_gsi_step, next_settings_update, TableProvider, TableUpdate,
};

/// Bounds for the waits a single invocation may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicies {
    /// Waiting for a replaced table to disappear.
    pub table_deletion: RetryPolicy,
    /// Waiting for a table to show up in DescribeTable.
    pub table_visibility: RetryPolicy,
}

impl Default for WaitPolicies {
    fn default() -> Self {
        Self {
            table_deletion: RetryPolicy::default(),
            table_visibility: RetryPolicy::new(
                10,
                std::time::Duration::from_secs(1),
                std::time::Duration::from_secs(60),
            ),
        }
    }
}

/// Drives a table through create, update and delete requests.
#[derive(Debug)]
pub struct LifecycleController<P> {
    provider: P,
    waits: WaitPolicies,
}

impl<P: TableProvider + Sync> LifecycleController<P> {
    pub fn new(provider: P, waits: WaitPolicies) -> Self {
        Self { provider, waits }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Start the requested operation.
    #[instrument(
        skip_all,
        fields(
            request_type = %event.request_type,
            logical_id = event.logical_resource_id.as_deref(),
        )
    )]
    pub async fn on_event(&self, event: &LifecycleEvent) -> Result<OnEventResponse, TableError> {
        match event.request_type {
            RequestType::Create => self.create(&event.desired_spec()?).await,
            RequestType::Update => self.update(event.physical_id()?, &event.desired_spec()?).await,
            RequestType::Delete => self.delete(event.physical_id()?).await,
        }
    }

    /// Report whether the operation started by `on_event` has finished,
    /// issuing the next convergence step if it has not.
    #[instrument(
        skip_all,
        fields(
            request_type = %event.request_type,
            logical_id = event.logical_resource_id.as_deref(),
        )
    )]
    pub async fn is_complete(
        &self,
        event: &LifecycleEvent,
    ) -> Result<IsCompleteResponse, TableError> {
        if event.request_type == RequestType::Delete {
            return Ok(IsCompleteResponse::complete(None));
        }

        let desired = event.desired_spec()?;
        let current = self.describe_until_visible(&desired.table_name).await?;

        if !current.is_settled() {
            debug!(
                table = %current.table_name,
                status = ?current.table_status,
                "table or index not ACTIVE yet"
            );
            return Ok(IsCompleteResponse::pending());
        }

        if event.request_type == RequestType::Update
            && let Some(update) = next_update(&current, &desired)
        {
            info!(
                table = %current.table_name,
                change = %update.describe(),
                "issuing next convergence step"
            );
            self.provider.update_table(&update).await?;
            return Ok(IsCompleteResponse::pending());
        }

        if self.converge_recovery_settings(&current.table_name, &desired).await? {
            return Ok(IsCompleteResponse::pending());
        }

        info!(table = %current.table_name, "table converged");
        Ok(IsCompleteResponse::complete(Some(TableOutputs::from(&current))))
    }

    async fn create(&self, desired: &DesiredTableSpec) -> Result<OnEventResponse, TableError> {
        let created = self.provider.create_table(desired).await?;
        info!(table = %created.table_name, "table creation started");
        Ok(OnEventResponse::for_table(&created))
    }

    async fn update(
        &self,
        physical_id: &str,
        desired: &DesiredTableSpec,
    ) -> Result<OnEventResponse, TableError> {
        let current = self
            .provider
            .describe_table(physical_id)
            .await?
            .ok_or_else(|| TableError::NotFound {
                table: physical_id.to_string(),
            })?;

        if current.table_name != desired.table_name {
            return Err(TableError::NameMismatch {
                current: current.table_name,
                desired: desired.table_name.clone(),
            });
        }

        if is_key_schema_modified(&current.key_schema, &desired.key_schema) {
            info!(table = %current.table_name, "primary key changed, replacing table");
            self.provider.delete_table(&current.table_name).await?;
            self.wait_for_deletion(&current.table_name).await?;
            return self.create(desired).await;
        }

        // A table that is still settling gets its step from is_complete instead.
        if current.is_settled() {
            if let Some(update) = next_update(&current, desired) {
                info!(
                    table = %current.table_name,
                    change = %update.describe(),
                    "issuing first convergence step"
                );
                self.provider.update_table(&update).await?;
            } else {
                debug!(table = %current.table_name, "no structural change");
            }
        }

        Ok(OnEventResponse::for_table(&current))
    }

    async fn delete(&self, physical_id: &str) -> Result<OnEventResponse, TableError> {
        match self.provider.delete_table(physical_id).await {
            Ok(()) => info!(table = physical_id, "table deletion started"),
            Err(TableError::NotFound { .. }) => info!(table = physical_id, "table already deleted"),
            Err(e) => return Err(e),
        }
        Ok(OnEventResponse {
            physical_resource_id: physical_id.to_string(),
            data: None,
        })
    }

    async fn wait_for_deletion(&self, table_name: &str) -> Result<(), TableError> {
        retry_until(
            || self.provider.describe_table(table_name),
            Option::is_none,
            &self.waits.table_deletion,
        )
        .await?;
        info!(table = table_name, "old table deleted");
        Ok(())
    }

    async fn describe_until_visible(
        &self,
        table_name: &str,
    ) -> Result<ObservedTableState, TableError> {
        retry_until(
            || self.provider.describe_table(table_name),
            Option::is_some,
            &self.waits.table_visibility,
        )
        .await?
        .ok_or_else(|| TableError::NotFound {
            table: table_name.to_string(),
        })
    }

    /// Apply TTL and point-in-time recovery. Returns true if another cycle is needed,
    /// which is the case after any TTL change until DynamoDB reports it settled.
    async fn converge_recovery_settings(
        &self,
        table_name: &str,
        desired: &DesiredTableSpec,
    ) -> Result<bool, TableError> {
        if let Some(wanted) = &desired.time_to_live_specification {
            match self.provider.describe_time_to_live(table_name).await? {
                status if status.is_transitioning() => {
                    debug!(table = table_name, ?status, "time to live change in progress");
                    return Ok(true);
                }
                // TTL must be disabled before it can move to another attribute.
                TimeToLiveStatus::Enabled(active)
                    if !wanted.enabled || active != wanted.attribute_name =>
                {
                    let disable = TimeToLiveSpecification {
                        attribute_name: active,
                        enabled: false,
                    };
                    self.provider.update_time_to_live(table_name, &disable).await?;
                    return Ok(true);
                }
                TimeToLiveStatus::Disabled if wanted.enabled => {
                    self.provider.update_time_to_live(table_name, wanted).await?;
                    return Ok(true);
                }
                _ => {}
            }
        }

        if let Some(wanted) = desired.point_in_time_recovery_enabled
            && self.provider.describe_point_in_time_recovery(table_name).await? != wanted
        {
            self.provider
                .update_point_in_time_recovery(table_name, wanted)
                .await?;
        }

        Ok(false)
    }
}

/// Table-level settings first, then indexes.
fn next_update(current: &ObservedTableState, desired: &DesiredTableSpec) -> Option<TableUpdate> {
    next_settings_update(current, desired)
        .or_else(|| TableUpdate::from_step(&current.table_name, &next_gsi_step(current, desired)))
}

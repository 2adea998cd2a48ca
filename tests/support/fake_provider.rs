use std::collections::HashMap;
use std::sync::Mutex;

use dynamo_table_manager::errors::TableError;
use dynamo_table_manager::model::{
    BillingMode, DesiredTableSpec, ObservedIndex, ObservedTableState, ResourceStatus,
    TimeToLiveSpecification, TimeToLiveStatus,
};
use dynamo_table_manager::table_operations::{IndexUpdate, TableProvider, TableUpdate};

/// A mutating call the controller made against the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create(String),
    Update(TableUpdate),
    Delete(String),
    UpdateTimeToLive(String, TimeToLiveSpecification),
    UpdatePointInTimeRecovery(String, bool),
}

#[derive(Debug, Clone)]
struct FakeTable {
    state: ObservedTableState,
    /// Describes left before a deleting table disappears.
    deleting: Option<u32>,
    time_to_live: TimeToLiveStatus,
    point_in_time_recovery: bool,
}

#[derive(Debug, Default)]
struct Inner {
    tables: HashMap<String, FakeTable>,
    calls: Vec<Call>,
    hidden_describes: u32,
    hidden_after_create: u32,
    deletion_describes: u32,
}

/// In-memory DynamoDB stand-in.
///
/// Every DescribeTable call reports the current state and then moves the table
/// one tick forward: CREATING/UPDATING become ACTIVE, a CREATING index becomes
/// ACTIVE but backfilling, a backfilling index finishes, a DELETING index
/// disappears. UpdateTable is rejected unless everything is settled.
#[derive(Debug, Default)]
pub struct FakeTableProvider {
    inner: Mutex<Inner>,
}

impl FakeTableProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// DescribeTable keeps answering "not found" this many times after each create.
    pub fn with_visibility_lag(self, describes: u32) -> Self {
        self.inner.lock().unwrap().hidden_after_create = describes;
        self
    }

    /// A deleted table stays visible as DELETING for this many describes.
    pub fn with_deletion_lag(self, describes: u32) -> Self {
        self.inner.lock().unwrap().deletion_describes = describes;
        self
    }

    /// Insert a table that already exists in the account.
    pub fn seed(&self, state: ObservedTableState) {
        let table = FakeTable {
            state,
            deleting: None,
            time_to_live: TimeToLiveStatus::Disabled,
            point_in_time_recovery: false,
        };
        self.inner
            .lock()
            .unwrap()
            .tables
            .insert(table.state.table_name.clone(), table);
    }

    pub fn seed_time_to_live(&self, table_name: &str, status: TimeToLiveStatus) {
        let mut inner = self.inner.lock().unwrap();
        let table = inner.tables.get_mut(table_name).expect("table was seeded");
        table.time_to_live = status;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn updates(&self) -> Vec<TableUpdate> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Update(update) => Some(update),
                _ => None,
            })
            .collect()
    }

    /// Current state without advancing the simulation.
    pub fn peek(&self, table_name: &str) -> Option<ObservedTableState> {
        self.inner
            .lock()
            .unwrap()
            .tables
            .get(table_name)
            .map(|table| table.state.clone())
    }

    pub fn time_to_live(&self, table_name: &str) -> Option<TimeToLiveStatus> {
        self.inner
            .lock()
            .unwrap()
            .tables
            .get(table_name)
            .map(|table| table.time_to_live.clone())
    }

    pub fn point_in_time_recovery(&self, table_name: &str) -> bool {
        self.inner
            .lock()
            .unwrap()
            .tables
            .get(table_name)
            .is_some_and(|table| table.point_in_time_recovery)
    }

    fn not_found(table_name: &str) -> TableError {
        TableError::NotFound {
            table: table_name.to_string(),
        }
    }
}

fn tick(state: &mut ObservedTableState) {
    state
        .global_secondary_indexes
        .retain(|index| index.index_status != ResourceStatus::Deleting);
    for index in &mut state.global_secondary_indexes {
        if index.index_status == ResourceStatus::Creating {
            index.index_status = ResourceStatus::Active;
            index.backfilling = true;
        } else if index.backfilling {
            index.backfilling = false;
        }
    }
    if matches!(
        state.table_status,
        ResourceStatus::Creating | ResourceStatus::Updating
    ) {
        state.table_status = ResourceStatus::Active;
    }
}

fn created_state(spec: &DesiredTableSpec) -> ObservedTableState {
    let table_arn = format!(
        "arn:aws:dynamodb:us-east-1:123456789012:table/{}",
        spec.table_name
    );
    let stream_enabled = spec
        .stream_specification
        .as_ref()
        .is_some_and(|stream| stream.stream_enabled);
    let billing_mode = spec.billing_mode.unwrap_or(BillingMode::Provisioned);

    ObservedTableState {
        table_name: spec.table_name.clone(),
        latest_stream_arn: stream_enabled
            .then(|| format!("{}/stream/2026-10-18T00:00:00.000", table_arn)),
        table_arn: Some(table_arn),
        table_status: ResourceStatus::Creating,
        key_schema: spec.key_schema.clone(),
        attribute_definitions: spec.attribute_definitions.clone(),
        global_secondary_indexes: spec
            .global_secondary_indexes
            .iter()
            .map(|index| ObservedIndex {
                index_name: index.index_name.clone(),
                index_status: ResourceStatus::Creating,
                backfilling: false,
                key_schema: index.key_schema.clone(),
                projection: index.projection.clone(),
                provisioned_throughput: index.provisioned_throughput,
            })
            .collect(),
        billing_mode: Some(billing_mode),
        provisioned_throughput: match billing_mode {
            BillingMode::Provisioned => spec.provisioned_throughput,
            BillingMode::PayPerRequest => None,
        },
        stream_specification: spec.stream_specification.clone(),
        sse_specification: spec.sse_specification.clone(),
        deletion_protection_enabled: spec.deletion_protection_enabled.unwrap_or(false),
    }
}

fn apply_update(state: &mut ObservedTableState, update: &TableUpdate) -> Result<(), TableError> {
    let has_settings = update.billing_mode.is_some()
        || update.provisioned_throughput.is_some()
        || !update.index_throughput.is_empty()
        || update.stream_specification.is_some()
        || update.sse_specification.is_some()
        || update.deletion_protection_enabled.is_some();

    match &update.index_update {
        Some(_) if has_settings => {
            return Err(TableError::Validation(
                "index updates cannot be combined with other changes".to_string(),
            ));
        }
        Some(IndexUpdate::Create(index)) => {
            if state
                .global_secondary_indexes
                .iter()
                .any(|existing| existing.index_name == index.index_name)
            {
                return Err(TableError::Validation(format!(
                    "index {} already exists",
                    index.index_name
                )));
            }
            for definition in &update.attribute_definitions {
                if !state
                    .attribute_definitions
                    .iter()
                    .any(|existing| existing.attribute_name == definition.attribute_name)
                {
                    state.attribute_definitions.push(definition.clone());
                }
            }
            state.global_secondary_indexes.push(ObservedIndex {
                index_name: index.index_name.clone(),
                index_status: ResourceStatus::Creating,
                backfilling: false,
                key_schema: index.key_schema.clone(),
                projection: index.projection.clone(),
                provisioned_throughput: index.provisioned_throughput,
            });
        }
        Some(IndexUpdate::Delete(name)) => {
            let index = state
                .global_secondary_indexes
                .iter_mut()
                .find(|existing| &existing.index_name == name)
                .ok_or_else(|| TableError::Validation(format!("index {} does not exist", name)))?;
            index.index_status = ResourceStatus::Deleting;
        }
        None => {
            if !has_settings {
                return Err(TableError::Validation("nothing to update".to_string()));
            }
        }
    }

    if update.billing_mode == Some(BillingMode::Provisioned)
        && state.billing_mode != Some(BillingMode::Provisioned)
        && let Some(missing) = state.global_secondary_indexes.iter().find(|index| {
            !update
                .index_throughput
                .iter()
                .any(|change| change.index_name == index.index_name)
        })
    {
        return Err(TableError::Validation(format!(
            "ProvisionedThroughput must be specified for index: {}",
            missing.index_name
        )));
    }
    for change in &update.index_throughput {
        if !state
            .global_secondary_indexes
            .iter()
            .any(|index| index.index_name == change.index_name)
        {
            return Err(TableError::Validation(format!(
                "index {} does not exist",
                change.index_name
            )));
        }
    }

    if let Some(mode) = update.billing_mode {
        state.billing_mode = Some(mode);
        if mode == BillingMode::PayPerRequest {
            state.provisioned_throughput = None;
            for index in &mut state.global_secondary_indexes {
                index.provisioned_throughput = None;
            }
        }
    }
    for change in &update.index_throughput {
        if let Some(index) = state
            .global_secondary_indexes
            .iter_mut()
            .find(|index| index.index_name == change.index_name)
        {
            index.provisioned_throughput = Some(change.provisioned_throughput);
        }
    }
    if let Some(throughput) = update.provisioned_throughput {
        state.provisioned_throughput = Some(throughput);
    }
    if let Some(stream) = &update.stream_specification {
        state.stream_specification = Some(stream.clone());
        state.latest_stream_arn = if stream.stream_enabled {
            state
                .table_arn
                .as_ref()
                .map(|arn| format!("{}/stream/2026-10-18T01:00:00.000", arn))
        } else {
            None
        };
    }
    if let Some(sse) = &update.sse_specification {
        state.sse_specification = Some(sse.clone());
    }
    if let Some(enabled) = update.deletion_protection_enabled {
        state.deletion_protection_enabled = enabled;
    }

    state.table_status = ResourceStatus::Updating;
    Ok(())
}

impl TableProvider for FakeTableProvider {
    async fn describe_table(
        &self,
        table_name: &str,
    ) -> Result<Option<ObservedTableState>, TableError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.hidden_describes > 0 {
            inner.hidden_describes -= 1;
            return Ok(None);
        }

        let Some(table) = inner.tables.get_mut(table_name) else {
            return Ok(None);
        };

        if let Some(remaining) = table.deleting {
            if remaining == 0 {
                inner.tables.remove(table_name);
                return Ok(None);
            }
            table.deleting = Some(remaining - 1);
            return Ok(Some(table.state.clone()));
        }

        let snapshot = table.state.clone();
        tick(&mut table.state);
        Ok(Some(snapshot))
    }

    async fn create_table(
        &self,
        spec: &DesiredTableSpec,
    ) -> Result<ObservedTableState, TableError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::Create(spec.table_name.clone()));
        if inner.tables.contains_key(&spec.table_name) {
            return Err(TableError::InUse {
                table: spec.table_name.clone(),
            });
        }

        let state = created_state(spec);
        inner.tables.insert(
            spec.table_name.clone(),
            FakeTable {
                state: state.clone(),
                deleting: None,
                time_to_live: TimeToLiveStatus::Disabled,
                point_in_time_recovery: false,
            },
        );
        inner.hidden_describes = inner.hidden_after_create;
        Ok(state)
    }

    async fn update_table(&self, update: &TableUpdate) -> Result<(), TableError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::Update(update.clone()));
        let table = inner
            .tables
            .get_mut(&update.table_name)
            .filter(|table| table.deleting.is_none())
            .ok_or_else(|| Self::not_found(&update.table_name))?;

        if !table.state.is_settled() {
            return Err(TableError::InUse {
                table: update.table_name.clone(),
            });
        }
        apply_update(&mut table.state, update)
    }

    async fn delete_table(&self, table_name: &str) -> Result<(), TableError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::Delete(table_name.to_string()));
        let lag = inner.deletion_describes;
        let table = inner
            .tables
            .get_mut(table_name)
            .filter(|table| table.deleting.is_none())
            .ok_or_else(|| Self::not_found(table_name))?;

        if table.state.deletion_protection_enabled {
            return Err(TableError::Validation(
                "table has deletion protection enabled".to_string(),
            ));
        }
        table.state.table_status = ResourceStatus::Deleting;
        table.deleting = Some(lag);
        Ok(())
    }

    async fn describe_time_to_live(
        &self,
        table_name: &str,
    ) -> Result<TimeToLiveStatus, TableError> {
        let mut inner = self.inner.lock().unwrap();
        let table = inner
            .tables
            .get_mut(table_name)
            .ok_or_else(|| Self::not_found(table_name))?;

        let reported = table.time_to_live.clone();
        table.time_to_live = match reported.clone() {
            TimeToLiveStatus::Enabling(attribute) => TimeToLiveStatus::Enabled(attribute),
            TimeToLiveStatus::Disabling(_) => TimeToLiveStatus::Disabled,
            settled => settled,
        };
        Ok(reported)
    }

    async fn update_time_to_live(
        &self,
        table_name: &str,
        spec: &TimeToLiveSpecification,
    ) -> Result<(), TableError> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .calls
            .push(Call::UpdateTimeToLive(table_name.to_string(), spec.clone()));
        let table = inner
            .tables
            .get_mut(table_name)
            .ok_or_else(|| Self::not_found(table_name))?;

        let attribute = spec.attribute_name.clone();
        table.time_to_live = match (&table.time_to_live, spec.enabled) {
            (status, _) if status.is_transitioning() => {
                return Err(TableError::Validation(
                    "Time to live has been modified multiple times within a fixed interval"
                        .to_string(),
                ));
            }
            (TimeToLiveStatus::Disabled, true) => TimeToLiveStatus::Enabling(attribute),
            (TimeToLiveStatus::Enabled(active), false) if *active == attribute => {
                TimeToLiveStatus::Disabling(attribute)
            }
            (TimeToLiveStatus::Enabled(_), true) => {
                return Err(TableError::Validation("TimeToLive is already enabled".to_string()));
            }
            _ => {
                return Err(TableError::Validation(
                    "TimeToLive is already disabled".to_string(),
                ));
            }
        };
        Ok(())
    }

    async fn describe_point_in_time_recovery(&self, table_name: &str) -> Result<bool, TableError> {
        let inner = self.inner.lock().unwrap();
        inner
            .tables
            .get(table_name)
            .map(|table| table.point_in_time_recovery)
            .ok_or_else(|| Self::not_found(table_name))
    }

    async fn update_point_in_time_recovery(
        &self,
        table_name: &str,
        enabled: bool,
    ) -> Result<(), TableError> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .calls
            .push(Call::UpdatePointInTimeRecovery(table_name.to_string(), enabled));
        let table = inner
            .tables
            .get_mut(table_name)
            .ok_or_else(|| Self::not_found(table_name))?;
        table.point_in_time_recovery = enabled;
        Ok(())
    }
}

//! Table convergence and provisioning.
//!
//! This module provides the pieces the lifecycle controller composes:
//! - `compare` - Key schema and projection change predicates
//! - `gsi` - Next global secondary index step
//! - `settings` - Next table-level settings update
//! - `provider` - Provisioning calls as a trait
//! - `dynamo` - DynamoDB implementation of the provider

mod compare;
mod dynamo;
mod gsi;
mod provider;
mod settings;

// Re-export public items
pub use compare::{is_key_schema_modified, is_projection_modified};
pub use dynamo::DynamoTableProvisioner;
pub use gsi::{next_gsi_step, ConvergenceStep};
pub use provider::{IndexThroughputUpdate, IndexUpdate, TableProvider, TableUpdate};
pub use settings::next_settings_update;

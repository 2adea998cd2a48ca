//! CloudFormation custom-resource handlers for DynamoDB tables.
//!
//! The `on_event` and `is_complete` binaries implement the asynchronous
//! custom-resource provider contract. Creating a table is a single call; an
//! update computes one safe step at a time (table settings, then index
//! removals, then index creations) because DynamoDB accepts only one index
//! change per UpdateTable; a primary key change replaces the table.

pub mod client;
pub mod config;
pub mod conversions;
pub mod errors;
pub mod lifecycle;
pub mod logging;
pub mod model;
pub mod properties;
pub mod retry;
pub mod table_operations;

pub use errors::TableError;
pub use lifecycle::{LifecycleController, LifecycleEvent};

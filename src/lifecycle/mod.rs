//! Custom-resource lifecycle: request shapes and the controller that serves them.

mod controller;
mod event;

pub use controller::{LifecycleController, WaitPolicies};
pub use event::{IsCompleteResponse, LifecycleEvent, OnEventResponse, RequestType, TableOutputs};

// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Logging setup and runtime level control for platform drivers.
//!
//! Every crate declares the tracing targets it logs to with [`trace_target!`]; the declarations
//! are collected at link time, so the set of known targets (and the tags grouping them, e.g.
//! `sfp` or `bmc`) is complete before `main` runs.

pub mod control;
pub mod display;
pub mod targets;

// re-exports
pub use control::{TargetState, TraceCtlError, TracingControl, get_trace_ctl};
pub use targets::Origin;
pub use tracing_subscriber::filter::LevelFilter;

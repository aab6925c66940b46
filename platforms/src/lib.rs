// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Board support.
//!
//! Each board is a [`board::Board`] descriptor table registered at link time with
//! [`register_board!`]; [`driver::TablePlatform`] implements the platform interface for any of
//! them. [`registry::detect`] picks the board to run on.

#![deny(clippy::pedantic, clippy::unwrap_used)]
#![allow(clippy::module_name_repetitions)]

pub mod board;
pub mod boards;
pub mod driver;
pub mod registry;

pub use board::Board;
pub use driver::TablePlatform;
pub use registry::{PlatformLookupError, boards, detect, find};

use tracectl::{LevelFilter, trace_target};
trace_target!("platforms", LevelFilter::INFO, &["platform"]);

// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The reference boards.

pub mod qs32;
pub mod sf54;

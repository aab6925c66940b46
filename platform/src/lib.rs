// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The platform interface of a network switch.
//!
//! A platform exposes a fixed set of object classes (the chassis, thermal sensors, fans, PSUs,
//! LEDs and transceiver modules), each behind a small driver trait with `init` / `info_get` /
//! control operations.
//! Board support lives elsewhere and fills these traits in from tables of constants; this crate
//! holds what every board shares:
//!
//! - the per-class info records, status and capability flags ([`thermal`], [`fan`], [`psu`],
//!   [`led`], [`sfp`], [`sys`]),
//! - the mapping of logical ids to physical resources ([`locator`]) and the I/O layer reading
//!   them ([`io`], [`bmc`]),
//! - the object tree walk ([`chassis`]), the ONIE system EEPROM decoder ([`onie`]) and the fan
//!   and LED management policies ([`manage`]).

#![deny(clippy::pedantic, clippy::unwrap_used)]
#![allow(clippy::module_name_repetitions)]

pub mod bmc;
pub mod chassis;
pub mod fan;
pub mod header;
pub mod io;
pub mod led;
pub mod locator;
pub mod manage;
pub mod onie;
pub mod platform;
pub mod psu;
pub mod sfp;
pub mod sys;
pub mod thermal;

pub use header::OidHeader;
pub use oid::{Oid, OidType};
pub use platform::{OidInfo, Platform};
pub use status::{Status, StatusError};

use tracectl::{LevelFilter, trace_target};
trace_target!("platform", LevelFilter::INFO, &["platform"]);

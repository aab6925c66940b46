// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The system object: platform identity, versions and the ONIE EEPROM.

use oid::Oid;
use status::Status;

use crate::header::OidHeader;
use crate::onie::OnieInfo;

/// Firmware versions of the board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformInfo {
    /// `(name, version)` of each CPLD
    pub cpld_versions: Vec<(String, String)>,
    /// `(name, version)` of other components
    pub other_versions: Vec<(String, String)>,
}

fn join(versions: &[(String, String)]) -> String {
    versions
        .iter()
        .map(|(name, version)| format!("{name}:{version}"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl PlatformInfo {
    /// CPLD versions as `name:version` joined by `, `.
    #[must_use]
    pub fn cpld_versions_str(&self) -> String {
        join(&self.cpld_versions)
    }

    /// Other versions as `name:version` joined by `, `.
    #[must_use]
    pub fn other_versions_str(&self) -> String {
        join(&self.other_versions)
    }
}

impl std::fmt::Display for PlatformInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CPLD versions: {}", self.cpld_versions_str())?;
        if !self.other_versions.is_empty() {
            write!(f, "; other versions: {}", self.other_versions_str())?;
        }
        Ok(())
    }
}

/// System driver.
pub trait SysDriver: Send + Sync {
    /// The platform name, e.g. `x86-64-ref-qs32-r0`.
    fn platform_name(&self) -> &'static str;

    /// One-time initialization.
    ///
    /// # Errors
    ///
    /// Board specific.
    fn init(&self) -> Status {
        Ok(())
    }

    /// Header of the chassis, listing its children.
    ///
    /// # Errors
    ///
    /// Board specific.
    fn hdr_get(&self) -> Status<OidHeader>;

    /// Decode the ONIE system EEPROM.
    ///
    /// # Errors
    ///
    /// [`status::StatusError::Missing`] without EEPROM, [`status::StatusError::Invalid`] for a
    /// corrupt one.
    fn onie_data_get(&self) -> Status<OnieInfo>;

    /// Firmware versions.
    ///
    /// # Errors
    ///
    /// Board specific.
    fn platform_info_get(&self) -> Status<PlatformInfo>;

    /// Every object of the board, chassis children first.
    ///
    /// # Errors
    ///
    /// As [`SysDriver::hdr_get`].
    fn oids_get(&self) -> Status<Vec<Oid>> {
        Ok(self.hdr_get()?.children)
    }
}

// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Power supplies.

use bitflags::bitflags;
use oid::Oid;
use status::Status;

use crate::header::OidHeader;
use crate::thermal::Milli;

bitflags! {
    /// PSU status.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PsuStatus: u32 {
        const PRESENT   = 1 << 0;
        const FAILED    = 1 << 1;
        /// present but without input power
        const UNPLUGGED = 1 << 2;
    }
}

bitflags! {
    /// PSU type and the readings it supports.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PsuCaps: u32 {
        const AC   = 1 << 0;
        const DC12 = 1 << 1;
        const DC48 = 1 << 2;
        const VIN  = 1 << 3;
        const VOUT = 1 << 4;
        const IIN  = 1 << 5;
        const IOUT = 1 << 6;
        const PIN  = 1 << 7;
        const POUT = 1 << 8;
    }
}

/// A PSU reading. Electrical values are in mV, mA and mW.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PsuInfo {
    pub hdr: OidHeader,
    pub model: String,
    pub serial: String,
    pub status: PsuStatus,
    pub caps: PsuCaps,
    pub mvin: i32,
    pub mvout: i32,
    pub miin: i32,
    pub miout: i32,
    pub mpin: i32,
    pub mpout: i32,
}

impl PsuInfo {
    /// An empty reading of a PSU with header `hdr`.
    #[must_use]
    pub fn new(hdr: OidHeader) -> PsuInfo {
        PsuInfo {
            hdr,
            model: String::new(),
            serial: String::new(),
            status: PsuStatus::empty(),
            caps: PsuCaps::empty(),
            mvin: 0,
            mvout: 0,
            miin: 0,
            miout: 0,
            mpin: 0,
            mpout: 0,
        }
    }

    /// Present, powered and not failed.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status == PsuStatus::PRESENT
    }
}

fn milli(f: &mut std::fmt::Formatter<'_>, name: &str, value: i32, unit: char) -> std::fmt::Result {
    write!(f, " {name} {}{unit}", Milli(value))
}

impl std::fmt::Display for PsuInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hdr)?;
        if !self.status.contains(PsuStatus::PRESENT) {
            return write!(f, " not present");
        }
        if self.status.contains(PsuStatus::UNPLUGGED) {
            write!(f, " unplugged")?;
        } else if self.status.contains(PsuStatus::FAILED) {
            write!(f, " FAILED")?;
        }
        if !self.model.is_empty() {
            write!(f, " model {}", self.model)?;
        }
        if !self.serial.is_empty() {
            write!(f, " serial {}", self.serial)?;
        }
        let readings = [
            (PsuCaps::VIN, "vin", self.mvin, 'V'),
            (PsuCaps::VOUT, "vout", self.mvout, 'V'),
            (PsuCaps::IIN, "iin", self.miin, 'A'),
            (PsuCaps::IOUT, "iout", self.miout, 'A'),
            (PsuCaps::PIN, "pin", self.mpin, 'W'),
            (PsuCaps::POUT, "pout", self.mpout, 'W'),
        ];
        for (cap, name, value, unit) in readings {
            if self.caps.contains(cap) {
                milli(f, name, value, unit)?;
            }
        }
        Ok(())
    }
}

/// PSU driver.
pub trait PsuDriver: Send + Sync {
    /// One-time initialization.
    ///
    /// # Errors
    ///
    /// Board specific.
    fn init(&self) -> Status {
        Ok(())
    }

    /// Header of PSU `id`, listing the PSU fan and thermal as children.
    ///
    /// # Errors
    ///
    /// [`status::StatusError::Param`] for an id that is not a PSU of this board.
    fn hdr_get(&self, id: Oid) -> Status<OidHeader>;

    /// Full reading of PSU `id`.
    ///
    /// # Errors
    ///
    /// [`status::StatusError::Param`] for an id that is not a PSU of this board.
    fn info_get(&self, id: Oid) -> Status<PsuInfo>;

    /// Status of PSU `id`.
    ///
    /// # Errors
    ///
    /// As [`PsuDriver::info_get`].
    fn status_get(&self, id: Oid) -> Status<PsuStatus> {
        Ok(self.info_get(id)?.status)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_shows_supported_readings_only() {
        let mut info = PsuInfo::new(OidHeader::new(Oid::psu(1), "PSU-1", Oid::CHASSIS));
        assert_eq!(info.to_string(), "psu-1 (0x04000001) \"PSU-1\" not present");
        info.status = PsuStatus::PRESENT;
        info.caps = PsuCaps::AC | PsuCaps::VIN | PsuCaps::POUT;
        info.mvin = 229_500;
        info.mvout = 12_000;
        info.mpout = 151_250;
        info.model = "PSU-650W-F2B".into();
        assert!(info.is_healthy());
        assert_eq!(
            info.to_string(),
            "psu-1 (0x04000001) \"PSU-1\" model PSU-650W-F2B vin 229.500V pout 151.250W"
        );
        info.status |= PsuStatus::UNPLUGGED;
        assert!(!info.is_healthy());
        assert!(info.to_string().contains("unplugged"));
    }

    #[test]
    fn small_negative_reading() {
        let mut info = PsuInfo::new(OidHeader::new(Oid::psu(2), "PSU-2", Oid::CHASSIS));
        info.status = PsuStatus::PRESENT;
        info.caps = PsuCaps::IOUT;
        info.miout = -250;
        assert!(info.to_string().ends_with(" iout -0.250A"), "{info}");
    }
}

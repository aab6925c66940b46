// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Fans.

use bitflags::bitflags;
use oid::Oid;
use status::{Status, StatusError};

use crate::header::OidHeader;

bitflags! {
    /// Fan status.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FanStatus: u32 {
        const PRESENT = 1 << 0;
        const FAILED  = 1 << 1;
        /// back to front airflow
        const B2F     = 1 << 2;
        /// front to back airflow
        const F2B     = 1 << 3;
    }
}

bitflags! {
    /// What a fan supports.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FanCaps: u32 {
        const B2F            = 1 << 0;
        const F2B            = 1 << 1;
        const SET_RPM        = 1 << 2;
        const SET_PERCENTAGE = 1 << 3;
        const GET_RPM        = 1 << 4;
        const GET_PERCENTAGE = 1 << 5;
    }
}

/// Airflow direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum FanDir {
    B2F,
    F2B,
}

impl FanDir {
    /// The status bit of this direction.
    #[must_use]
    pub const fn status(self) -> FanStatus {
        match self {
            FanDir::B2F => FanStatus::B2F,
            FanDir::F2B => FanStatus::F2B,
        }
    }
}

/// Coarse fan speed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum FanMode {
    Off,
    Slow,
    Normal,
    Fast,
    Max,
}

impl FanMode {
    /// The band a duty cycle falls in.
    #[must_use]
    pub const fn from_percentage(percentage: u8) -> FanMode {
        match percentage {
            0 => FanMode::Off,
            1..=40 => FanMode::Slow,
            41..=70 => FanMode::Normal,
            71..=99 => FanMode::Fast,
            _ => FanMode::Max,
        }
    }

    /// The duty cycle used to put a fan in this mode.
    #[must_use]
    pub const fn percentage(self) -> u8 {
        match self {
            FanMode::Off => 0,
            FanMode::Slow => 40,
            FanMode::Normal => 60,
            FanMode::Fast => 80,
            FanMode::Max => 100,
        }
    }
}

/// A fan reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanInfo {
    pub hdr: OidHeader,
    pub status: FanStatus,
    pub caps: FanCaps,
    pub rpm: i32,
    pub percentage: u8,
    pub mode: FanMode,
    pub model: String,
    pub serial: String,
}

impl FanInfo {
    /// Present and not failed.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status.contains(FanStatus::PRESENT) && !self.status.contains(FanStatus::FAILED)
    }

    /// The airflow direction, if reported.
    #[must_use]
    pub fn dir(&self) -> Option<FanDir> {
        if self.status.contains(FanStatus::F2B) {
            Some(FanDir::F2B)
        } else if self.status.contains(FanStatus::B2F) {
            Some(FanDir::B2F)
        } else {
            None
        }
    }
}

impl std::fmt::Display for FanInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hdr)?;
        if !self.status.contains(FanStatus::PRESENT) {
            return write!(f, " not present");
        }
        if self.status.contains(FanStatus::FAILED) {
            write!(f, " FAILED")?;
        }
        write!(f, " {} rpm {}% ({})", self.rpm, self.percentage, self.mode)?;
        if let Some(dir) = self.dir() {
            write!(f, " {dir}")?;
        }
        if !self.model.is_empty() {
            write!(f, " model {}", self.model)?;
        }
        if !self.serial.is_empty() {
            write!(f, " serial {}", self.serial)?;
        }
        Ok(())
    }
}

/// Fan driver.
///
/// Only `hdr_get` and `info_get` are mandatory; controls default to unsupported.
pub trait FanDriver: Send + Sync {
    /// One-time initialization.
    ///
    /// # Errors
    ///
    /// Board specific.
    fn init(&self) -> Status {
        Ok(())
    }

    /// Header of fan `id`.
    ///
    /// # Errors
    ///
    /// [`StatusError::Param`] for an id that is not a fan of this board.
    fn hdr_get(&self, id: Oid) -> Status<OidHeader>;

    /// Full reading of fan `id`. An absent fan is reported without [`FanStatus::PRESENT`].
    ///
    /// # Errors
    ///
    /// [`StatusError::Param`] for an id that is not a fan of this board.
    fn info_get(&self, id: Oid) -> Status<FanInfo>;

    /// Status of fan `id`.
    ///
    /// # Errors
    ///
    /// As [`FanDriver::info_get`].
    fn status_get(&self, id: Oid) -> Status<FanStatus> {
        Ok(self.info_get(id)?.status)
    }

    /// Set the fan speed in rpm.
    ///
    /// # Errors
    ///
    /// [`StatusError::Unsupported`] by default.
    fn rpm_set(&self, id: Oid, rpm: i32) -> Status {
        let _ = (id, rpm);
        Err(StatusError::Unsupported)
    }

    /// Set the duty cycle, in percent; boards implement [`FanDriver::set_duty`].
    ///
    /// # Errors
    ///
    /// [`StatusError::Param`] outside `0..=100`, [`StatusError::Unsupported`] by default.
    fn percentage_set(&self, id: Oid, percentage: i32) -> Status {
        let percentage = u8::try_from(percentage)
            .ok()
            .filter(|p| *p <= 100)
            .ok_or(StatusError::Param)?;
        self.set_duty(id, percentage)
    }

    /// Apply an already validated duty cycle.
    ///
    /// # Errors
    ///
    /// [`StatusError::Unsupported`] by default.
    fn set_duty(&self, id: Oid, percentage: u8) -> Status {
        let _ = (id, percentage);
        Err(StatusError::Unsupported)
    }

    /// Set a coarse speed, through the duty cycle of the mode.
    ///
    /// # Errors
    ///
    /// As [`FanDriver::percentage_set`].
    fn mode_set(&self, id: Oid, mode: FanMode) -> Status {
        self.percentage_set(id, i32::from(mode.percentage()))
    }

    /// Set the airflow direction.
    ///
    /// # Errors
    ///
    /// [`StatusError::Unsupported`] by default.
    fn dir_set(&self, id: Oid, dir: FanDir) -> Status {
        let _ = (id, dir);
        Err(StatusError::Unsupported)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct OneFan {
        duty: Mutex<u8>,
    }

    impl FanDriver for OneFan {
        fn hdr_get(&self, id: Oid) -> Status<OidHeader> {
            (id == Oid::fan(1))
                .then(|| OidHeader::new(id, "Chassis Fan 1", Oid::CHASSIS))
                .ok_or(StatusError::Param)
        }

        fn info_get(&self, id: Oid) -> Status<FanInfo> {
            let percentage = *self.duty.lock().unwrap();
            Ok(FanInfo {
                hdr: self.hdr_get(id)?,
                status: FanStatus::PRESENT | FanStatus::F2B,
                caps: FanCaps::SET_PERCENTAGE | FanCaps::GET_PERCENTAGE,
                rpm: i32::from(percentage) * 200,
                percentage,
                mode: FanMode::from_percentage(percentage),
                model: String::new(),
                serial: String::new(),
            })
        }

        fn set_duty(&self, _id: Oid, percentage: u8) -> Status {
            *self.duty.lock().unwrap() = percentage;
            Ok(())
        }
    }

    #[test]
    fn percentage_is_validated() {
        let fan = OneFan::default();
        assert_eq!(fan.percentage_set(Oid::fan(1), 101), Err(StatusError::Param));
        assert_eq!(fan.percentage_set(Oid::fan(1), -1), Err(StatusError::Param));
        fan.percentage_set(Oid::fan(1), 100).unwrap();
        assert_eq!(fan.info_get(Oid::fan(1)).unwrap().mode, FanMode::Max);
    }

    #[test]
    fn mode_goes_through_percentage() {
        let fan = OneFan::default();
        fan.mode_set(Oid::fan(1), FanMode::Slow).unwrap();
        let info = fan.info_get(Oid::fan(1)).unwrap();
        assert_eq!(info.percentage, 40);
        assert_eq!(info.mode, FanMode::Slow);
        assert_eq!(info.dir(), Some(FanDir::F2B));
        assert!(info.is_healthy());
        assert_eq!(fan.rpm_set(Oid::fan(1), 9000), Err(StatusError::Unsupported));
        assert_eq!(
            fan.dir_set(Oid::fan(1), FanDir::B2F),
            Err(StatusError::Unsupported)
        );
    }

    #[test]
    fn mode_bands() {
        for mode in [FanMode::Off, FanMode::Slow, FanMode::Normal, FanMode::Fast, FanMode::Max] {
            assert_eq!(FanMode::from_percentage(mode.percentage()), mode);
        }
        assert_eq!(FanMode::from_percentage(1), FanMode::Slow);
        assert_eq!(FanMode::from_percentage(255), FanMode::Max);
        assert_eq!("fast".parse::<FanMode>().unwrap(), FanMode::Fast);
    }
}

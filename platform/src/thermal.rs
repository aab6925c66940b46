// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Thermal sensors.

use bitflags::bitflags;
use oid::Oid;
use status::Status;

use crate::header::OidHeader;

bitflags! {
    /// Thermal sensor status.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ThermalStatus: u32 {
        const PRESENT = 1 << 0;
        const FAILED  = 1 << 1;
    }
}

bitflags! {
    /// What a thermal sensor can report.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ThermalCaps: u32 {
        const GET_TEMPERATURE        = 1 << 0;
        const GET_WARNING_THRESHOLD  = 1 << 1;
        const GET_ERROR_THRESHOLD    = 1 << 2;
        const GET_SHUTDOWN_THRESHOLD = 1 << 3;
        const GET_ALL_THRESHOLDS = Self::GET_WARNING_THRESHOLD.bits()
            | Self::GET_ERROR_THRESHOLD.bits()
            | Self::GET_SHUTDOWN_THRESHOLD.bits();
    }
}

/// Alarm thresholds, in millidegrees Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Thresholds {
    pub warning: i32,
    pub error: i32,
    pub shutdown: i32,
}

impl Thresholds {
    #[must_use]
    pub const fn new(warning: i32, error: i32, shutdown: i32) -> Thresholds {
        Thresholds {
            warning,
            error,
            shutdown,
        }
    }

    /// Classify a temperature. Thresholds are inclusive; a zero threshold is not set.
    #[must_use]
    pub fn level(&self, mcelsius: i32) -> ThermalLevel {
        let reached = |threshold: i32| threshold != 0 && mcelsius >= threshold;
        if reached(self.shutdown) {
            ThermalLevel::Shutdown
        } else if reached(self.error) {
            ThermalLevel::Error
        } else if reached(self.warning) {
            ThermalLevel::Warning
        } else {
            ThermalLevel::Normal
        }
    }
}

/// Severity of a temperature reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ThermalLevel {
    Normal,
    Warning,
    Error,
    Shutdown,
}

/// A thermal sensor reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThermalInfo {
    pub hdr: OidHeader,
    pub status: ThermalStatus,
    pub caps: ThermalCaps,
    /// current temperature, millidegrees Celsius
    pub mcelsius: i32,
    pub thresholds: Thresholds,
}

impl ThermalInfo {
    /// Severity of the current reading, `None` when the sensor is absent or failed.
    #[must_use]
    pub fn level(&self) -> Option<ThermalLevel> {
        if !self.status.contains(ThermalStatus::PRESENT)
            || self.status.contains(ThermalStatus::FAILED)
        {
            return None;
        }
        Some(self.thresholds.level(self.mcelsius))
    }
}

/// A fixed point value in thousandths, displayed with three decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Milli(pub i32);

impl std::fmt::Display for Milli {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:03}", abs / 1000, abs % 1000)
    }
}

impl std::fmt::Display for ThermalInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hdr)?;
        match self.level() {
            None if self.status.contains(ThermalStatus::FAILED) => write!(f, " failed"),
            None => write!(f, " not present"),
            Some(level) => write!(
                f,
                " {} C ({level}; warn {} / err {} / shutdown {})",
                Milli(self.mcelsius),
                self.thresholds.warning,
                self.thresholds.error,
                self.thresholds.shutdown
            ),
        }
    }
}

/// Thermal sensor driver.
pub trait ThermalDriver: Send + Sync {
    /// One-time initialization.
    ///
    /// # Errors
    ///
    /// Board specific.
    fn init(&self) -> Status {
        Ok(())
    }

    /// Header of sensor `id`.
    ///
    /// # Errors
    ///
    /// [`status::StatusError::Param`] for an id that is not a sensor of this board.
    fn hdr_get(&self, id: Oid) -> Status<OidHeader>;

    /// Status of sensor `id`.
    ///
    /// # Errors
    ///
    /// As [`ThermalDriver::info_get`].
    fn status_get(&self, id: Oid) -> Status<ThermalStatus> {
        Ok(self.info_get(id)?.status)
    }

    /// Full reading of sensor `id`. An unreadable sensor is reported without
    /// [`ThermalStatus::PRESENT`], not as an error.
    ///
    /// # Errors
    ///
    /// [`status::StatusError::Param`] for an id that is not a sensor of this board.
    fn info_get(&self, id: Oid) -> Status<ThermalInfo>;
}

#[cfg(test)]
mod test {
    use super::*;

    const LIMITS: Thresholds = Thresholds::new(60_000, 70_000, 80_000);

    fn info(status: ThermalStatus, mcelsius: i32) -> ThermalInfo {
        ThermalInfo {
            hdr: OidHeader::new(Oid::thermal(1), "CPU Core", Oid::CHASSIS),
            status,
            caps: ThermalCaps::GET_TEMPERATURE | ThermalCaps::GET_ALL_THRESHOLDS,
            mcelsius,
            thresholds: LIMITS,
        }
    }

    #[test]
    fn levels() {
        assert_eq!(LIMITS.level(25_000), ThermalLevel::Normal);
        assert_eq!(LIMITS.level(60_000), ThermalLevel::Warning);
        assert_eq!(LIMITS.level(79_999), ThermalLevel::Error);
        assert_eq!(LIMITS.level(95_000), ThermalLevel::Shutdown);
        assert_eq!(Thresholds::default().level(150_000), ThermalLevel::Normal);
        assert!(ThermalLevel::Warning < ThermalLevel::Shutdown);
    }

    #[test]
    fn absent_sensor_has_no_level() {
        assert_eq!(info(ThermalStatus::empty(), 0).level(), None);
        assert_eq!(
            info(ThermalStatus::PRESENT | ThermalStatus::FAILED, 1).level(),
            None
        );
        assert_eq!(
            info(ThermalStatus::PRESENT, 65_500).level(),
            Some(ThermalLevel::Warning)
        );
    }

    #[test]
    fn display() {
        let shown = info(ThermalStatus::PRESENT, 41_250).to_string();
        assert!(shown.contains("41.250 C (normal"), "{shown}");
        assert!(info(ThermalStatus::empty(), 0).to_string().ends_with("not present"));
    }

    #[test]
    fn below_zero() {
        assert_eq!(Milli(-500).to_string(), "-0.500");
        assert_eq!(Milli(-1).to_string(), "-0.001");
        assert_eq!(Milli(-12_345).to_string(), "-12.345");
        assert_eq!(Milli(0).to_string(), "0.000");
        assert_eq!(Milli(i32::MIN).to_string(), "-2147483.648");
        let shown = info(ThermalStatus::PRESENT, -500).to_string();
        assert!(shown.contains(" -0.500 C (normal"), "{shown}");
    }
}

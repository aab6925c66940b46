// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Reading and writing [`Locator`]s.

use std::path::PathBuf;
use std::sync::Arc;

use status::{Status, StatusError};
use sysfs::{SysfsRoot, hwmon};
use tracing::trace;

use crate::bmc::{Bmc, BmcPresence};
use crate::locator::Locator;

/// Everything a board driver needs to reach its hardware.
pub struct PlatformIo {
    root: SysfsRoot,
    bmc: Option<Arc<dyn Bmc>>,
    presence: BmcPresence,
}

impl std::fmt::Debug for PlatformIo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformIo")
            .field("root", &self.root)
            .field("bmc", &self.bmc.is_some())
            .field("presence", &self.presence)
            .finish()
    }
}

impl PlatformIo {
    /// I/O on a board without a BMC link.
    #[must_use]
    pub fn new(root: SysfsRoot) -> PlatformIo {
        PlatformIo {
            root,
            bmc: None,
            presence: BmcPresence::new(crate::bmc::BmcMode::Absent, None),
        }
    }

    /// Attach a BMC link; it is used only while `presence` says a BMC is fitted.
    #[must_use]
    pub fn with_bmc(mut self, bmc: Arc<dyn Bmc>, presence: BmcPresence) -> PlatformIo {
        self.bmc = Some(bmc);
        self.presence = presence;
        self
    }

    /// The root platform paths resolve under.
    #[must_use]
    pub fn root(&self) -> &SysfsRoot {
        &self.root
    }

    /// Is a BMC fitted (and linked)?
    pub fn bmc_present(&self) -> bool {
        self.bmc.is_some() && self.presence.get(&self.root)
    }

    fn bmc(&self) -> Status<&dyn Bmc> {
        match &self.bmc {
            Some(bmc) if self.presence.get(&self.root) => Ok(bmc.as_ref()),
            _ => Err(StatusError::Missing),
        }
    }

    fn hwmon_path(&self, device: &str, attr: &str) -> Status<PathBuf> {
        Ok(hwmon::hwmon_attr(&self.root, device, attr)?)
    }

    /// Read an integer.
    ///
    /// # Errors
    ///
    /// [`StatusError::Missing`] if the backing file or sensor is absent (including BMC-only
    /// sensors on a board without BMC); other codes on real failures.
    pub fn read(&self, locator: &Locator) -> Status<i32> {
        trace!("read {locator:?}");
        match *locator {
            Locator::File(path) => Ok(self.root.read_int(path)?),
            Locator::Hwmon { device, attr } => {
                let path = self.hwmon_path(device, attr)?;
                Ok(self.root.read_int(path)?)
            }
            Locator::Gpio(gpio) => Ok(i32::from(gpio.is_asserted(&self.root)?)),
            Locator::Bmc { id, scale } => {
                let raw = self.bmc()?.read_attr(id)?;
                raw.checked_mul(scale).ok_or(StatusError::Invalid)
            }
            Locator::BmcOr {
                id,
                scale,
                fallback,
            } => {
                if self.bmc_present() {
                    self.read(&Locator::Bmc { id, scale })
                } else {
                    self.read(fallback)
                }
            }
        }
    }

    /// Read an integer, mapping "absent" to `None`.
    ///
    /// # Errors
    ///
    /// Any failure other than [`StatusError::Missing`].
    pub fn read_opt(&self, locator: &Locator) -> Status<Option<i32>> {
        match self.read(locator) {
            Ok(value) => Ok(Some(value)),
            Err(StatusError::Missing) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Read a flag: any non-zero value is `true`, an absent file is `false`.
    ///
    /// # Errors
    ///
    /// Any failure other than [`StatusError::Missing`].
    pub fn read_flag(&self, locator: &Locator) -> Status<bool> {
        Ok(self.read_opt(locator)?.is_some_and(|value| value != 0))
    }

    /// Read a string attribute (model names, serial numbers, versions).
    ///
    /// # Errors
    ///
    /// [`StatusError::Unsupported`] for GPIO and BMC locators, otherwise as [`PlatformIo::read`].
    pub fn read_str(&self, locator: &Locator) -> Status<String> {
        match *locator {
            Locator::File(path) => Ok(self.root.read_str(path)?),
            Locator::Hwmon { device, attr } => {
                let path = self.hwmon_path(device, attr)?;
                Ok(self.root.read_str(path)?)
            }
            Locator::BmcOr { fallback, .. } if !self.bmc_present() => self.read_str(fallback),
            Locator::Gpio(_) | Locator::Bmc { .. } | Locator::BmcOr { .. } => {
                Err(StatusError::Unsupported)
            }
        }
    }

    /// Write an integer.
    ///
    /// # Errors
    ///
    /// [`StatusError::Missing`] if the target is absent.
    pub fn write(&self, locator: &Locator, value: i32) -> Status {
        trace!("write {value} to {locator:?}");
        match *locator {
            Locator::File(path) => Ok(self.root.write_int(path, value)?),
            Locator::Hwmon { device, attr } => {
                let path = self.hwmon_path(device, attr)?;
                Ok(self.root.write_int(path, value)?)
            }
            Locator::Gpio(gpio) => Ok(gpio.set_asserted(&self.root, value != 0)?),
            Locator::Bmc { id, scale } => {
                let raw = if scale == 0 { value } else { value / scale };
                self.bmc()?.write_attr(id, raw)
            }
            Locator::BmcOr {
                id,
                scale,
                fallback,
            } => {
                if self.bmc_present() {
                    self.write(&Locator::Bmc { id, scale }, value)
                } else {
                    self.write(fallback, value)
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bmc::test::FakeBmc;
    use crate::bmc::{BmcMode, BmcPresence};
    use sysfs::gpio::Gpio;
    use test_utils::FakeSysfs;

    const LM75: Locator = Locator::Hwmon {
        device: "/sys/bus/i2c/devices/3-0048",
        attr: "temp1_input",
    };
    const VIA_BMC: Locator = Locator::BmcOr {
        id: 1,
        scale: 1000,
        fallback: &LM75,
    };

    #[test]
    fn bmc_or_fallback() {
        let fake = FakeSysfs::new();
        fake.write("/sys/bus/i2c/devices/3-0048/hwmon/hwmon2/temp1_input", "31000");

        let without = PlatformIo::new(fake.root());
        assert_eq!(without.read(&VIA_BMC), Ok(31000));
        assert_eq!(
            without.read(&Locator::Bmc { id: 1, scale: 1 }),
            Err(StatusError::Missing)
        );

        let with = PlatformIo::new(fake.root()).with_bmc(
            Arc::new(FakeBmc::with(&[(1, 45)])),
            BmcPresence::new(BmcMode::Present, None),
        );
        assert!(with.bmc_present());
        assert_eq!(with.read(&VIA_BMC), Ok(45000));

        // linked but not fitted
        let unfitted = PlatformIo::new(fake.root()).with_bmc(
            Arc::new(FakeBmc::with(&[(1, 45)])),
            BmcPresence::new(BmcMode::Absent, None),
        );
        assert_eq!(unfitted.read(&VIA_BMC), Ok(31000));
    }

    #[test]
    fn absent_is_missing_not_fatal() {
        let fake = FakeSysfs::new();
        let io = PlatformIo::new(fake.root());
        assert_eq!(io.read(&LM75), Err(StatusError::Missing));
        assert_eq!(io.read_opt(&LM75), Ok(None));
        assert_eq!(io.read_flag(&Locator::File("/sys/x/present")), Ok(false));
        assert_eq!(
            io.read_str(&Locator::File("/sys/x/model")),
            Err(StatusError::Missing)
        );
    }

    #[test]
    fn gpio_and_strings() {
        let fake = FakeSysfs::new();
        fake.write("/sys/class/gpio/gpio500/value", "0");
        fake.write("/sys/bus/i2c/devices/10-0050/psu_model_name", "PSU-650W-F2B\n");
        let io = PlatformIo::new(fake.root());
        assert_eq!(io.read(&Locator::Gpio(Gpio::active_low(500))), Ok(1));
        io.write(&Locator::Gpio(Gpio::active_low(500)), 0).unwrap();
        assert_eq!(io.read(&Locator::Gpio(Gpio::new(500))), Ok(1));
        assert_eq!(
            io.read_str(&Locator::File("/sys/bus/i2c/devices/10-0050/psu_model_name")),
            Ok("PSU-650W-F2B".to_string())
        );
        assert_eq!(
            io.read_str(&Locator::Gpio(Gpio::new(500))),
            Err(StatusError::Unsupported)
        );
    }

    #[test]
    fn garbage_is_invalid() {
        let fake = FakeSysfs::new();
        fake.write("/sys/x/temp", "hot");
        let io = PlatformIo::new(fake.root());
        assert_eq!(io.read(&Locator::File("/sys/x/temp")), Err(StatusError::Invalid));
        assert_eq!(io.read_opt(&Locator::File("/sys/x/temp")), Err(StatusError::Invalid));
    }
}

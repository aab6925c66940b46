// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! GPIO lines through the legacy `/sys/class/gpio` interface.
//!
//! I/O expanders on switch boards (presence, reset, tx-disable of SFP cages) register as
//! ordinary gpiochips; the platform only knows the global line number.

use std::path::PathBuf;

use tracing::debug;

use crate::{SysfsErr, SysfsRoot};

const GPIO_CLASS: &str = "/sys/class/gpio";

/// One GPIO line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Gpio {
    number: u32,
    active_low: bool,
}

impl Gpio {
    /// An active high line.
    #[must_use]
    pub const fn new(number: u32) -> Gpio {
        Gpio {
            number,
            active_low: false,
        }
    }

    /// A line which is asserted when it reads `0`.
    #[must_use]
    pub const fn active_low(number: u32) -> Gpio {
        Gpio {
            number,
            active_low: true,
        }
    }

    /// Global line number.
    #[must_use]
    pub const fn number(&self) -> u32 {
        self.number
    }

    /// Platform path of the `value` attribute.
    #[must_use]
    pub fn value_path(&self) -> PathBuf {
        PathBuf::from(format!("{GPIO_CLASS}/gpio{}/value", self.number))
    }

    /// Export the line unless it is already exported.
    ///
    /// # Errors
    ///
    /// Fails if the export attribute cannot be written.
    pub fn export(&self, root: &SysfsRoot) -> Result<(), SysfsErr> {
        if root.exists(self.value_path()) {
            return Ok(());
        }
        debug!("exporting gpio {}", self.number);
        root.write_int(format!("{GPIO_CLASS}/export"), self.number_i32()?)
    }

    /// Read the line, honouring polarity: `true` means asserted.
    ///
    /// An unexported line is exported first.
    ///
    /// # Errors
    ///
    /// [`SysfsErr::NotFound`] if the line does not exist, [`SysfsErr::Parse`] if the value file
    /// holds something other than `0` or `1`.
    pub fn is_asserted(&self, root: &SysfsRoot) -> Result<bool, SysfsErr> {
        let path = self.value_path();
        if !root.exists(&path) {
            self.export(root)?;
        }
        let value = root.read_int(&path)?;
        match value {
            0 | 1 => Ok((value == 1) != self.active_low),
            _ => Err(SysfsErr::Parse {
                path,
                content: value.to_string(),
            }),
        }
    }

    /// Drive the line, honouring polarity.
    ///
    /// # Errors
    ///
    /// [`SysfsErr::NotFound`] if the line does not exist.
    pub fn set_asserted(&self, root: &SysfsRoot, asserted: bool) -> Result<(), SysfsErr> {
        let path = self.value_path();
        if !root.exists(&path) {
            self.export(root)?;
        }
        let level = i32::from(asserted != self.active_low);
        root.write_int(path, level)
    }

    fn number_i32(&self) -> Result<i32, SysfsErr> {
        i32::try_from(self.number).map_err(|_| SysfsErr::Parse {
            path: PathBuf::from(GPIO_CLASS),
            content: self.number.to_string(),
        })
    }
}

// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Baseboard management controller access.
//!
//! On boards with a BMC, the BMC owns the sensor buses and the host reads telemetry through
//! it. The same boards are often also built without a BMC, in which case the host reads the
//! sensors directly; whether a BMC is fitted is probed once per process.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use status::{Status, StatusError};
use sysfs::SysfsRoot;
use tracing::{debug, info, warn};

/// Telemetry and control through a BMC.
pub trait Bmc: Send + Sync {
    /// Read attribute `id`.
    ///
    /// # Errors
    ///
    /// [`StatusError::Missing`] if the BMC does not expose the attribute.
    fn read_attr(&self, id: u32) -> Status<i32>;

    /// Write attribute `id`.
    ///
    /// # Errors
    ///
    /// [`StatusError::Unsupported`] unless the implementation supports writes.
    fn write_attr(&self, id: u32, value: i32) -> Status {
        let _ = (id, value);
        Err(StatusError::Unsupported)
    }
}

/// A BMC whose sensors are exported by a kernel driver as `sensor<id>` files in one directory.
///
/// Accesses are serialized: the BMC link does not tolerate interleaved transactions.
#[derive(Debug)]
pub struct SysfsBmc {
    root: SysfsRoot,
    dir: PathBuf,
    lock: Mutex<()>,
}

impl SysfsBmc {
    /// BMC attributes under platform directory `dir`.
    pub fn new(root: SysfsRoot, dir: impl AsRef<Path>) -> SysfsBmc {
        SysfsBmc {
            root,
            dir: dir.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn attr_path(&self, id: u32) -> PathBuf {
        self.dir.join(format!("sensor{id}"))
    }
}

impl Bmc for SysfsBmc {
    fn read_attr(&self, id: u32) -> Status<i32> {
        let _guard = self.lock.lock().map_err(|_| StatusError::Internal)?;
        let value = self.root.read_int(self.attr_path(id))?;
        debug!("bmc attribute {id:#x} = {value}");
        Ok(value)
    }

    fn write_attr(&self, id: u32, value: i32) -> Status {
        let _guard = self.lock.lock().map_err(|_| StatusError::Internal)?;
        self.root.write_int(self.attr_path(id), value)?;
        Ok(())
    }
}

/// How the BMC presence flag is decided.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
#[strum(serialize_all = "lowercase")]
pub enum BmcMode {
    /// Probe the board.
    #[default]
    Auto,
    /// Assume a BMC is fitted.
    Present,
    /// Assume no BMC is fitted.
    Absent,
}

/// A board attribute telling whether the BMC is fitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BmcProbe {
    /// attribute to read
    pub path: &'static str,
    /// value meaning "fitted"
    pub present_value: i32,
}

/// The per-process "BMC present" flag: decided on first use, then frozen.
#[derive(Debug)]
pub struct BmcPresence {
    mode: BmcMode,
    probe: Option<BmcProbe>,
    present: OnceLock<bool>,
}

impl BmcPresence {
    /// Presence decided by `mode`, probing `probe` in [`BmcMode::Auto`].
    ///
    /// A board without a probe has no BMC in auto mode.
    #[must_use]
    pub fn new(mode: BmcMode, probe: Option<BmcProbe>) -> BmcPresence {
        BmcPresence {
            mode,
            probe,
            present: OnceLock::new(),
        }
    }

    /// Is a BMC fitted?
    pub fn get(&self, root: &SysfsRoot) -> bool {
        *self.present.get_or_init(|| {
            let present = match (self.mode, self.probe) {
                (BmcMode::Present, _) => true,
                (BmcMode::Absent, _) | (BmcMode::Auto, None) => false,
                (BmcMode::Auto, Some(probe)) => match root.read_int(probe.path) {
                    Ok(value) => value == probe.present_value,
                    Err(e) => {
                        warn!("unable to probe for a BMC, assuming none: {e}");
                        false
                    }
                },
            };
            info!("BMC present: {present} (mode {})", self.mode);
            present
        })
    }
}

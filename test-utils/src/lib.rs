// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Testing utilities for the platform drivers

use std::path::{Path, PathBuf};

use sysfs::SysfsRoot;
use tempfile::TempDir;
use tracing::debug;

/// A throwaway directory standing in for `/`: platform path `/sys/x` lives at `<dir>/sys/x`.
///
/// The directory is removed when the fixture is dropped.
pub struct FakeSysfs {
    dir: TempDir,
}

impl Default for FakeSysfs {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeSysfs {
    /// An empty tree.
    #[must_use]
    pub fn new() -> FakeSysfs {
        let dir = tempfile::Builder::new()
            .prefix("fake-sysfs-")
            .tempdir()
            .unwrap_or_else(|e| panic!("unable to create fake sysfs: {e}"));
        debug!("fake sysfs at {}", dir.path().display());
        FakeSysfs { dir }
    }

    /// Root to hand to the code under test.
    #[must_use]
    pub fn root(&self) -> SysfsRoot {
        SysfsRoot::at(self.dir.path())
    }

    /// Where platform path `path` lives on disk.
    #[must_use]
    pub fn path(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root().resolve(path)
    }

    /// Create or replace a file, creating its parents.
    pub fn write(&self, path: impl AsRef<Path>, content: &str) {
        self.write_bytes(path, content.as_bytes());
    }

    /// Create or replace a binary file, creating its parents.
    pub fn write_bytes(&self, path: impl AsRef<Path>, content: &[u8]) {
        let full = self.path(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent)
                .unwrap_or_else(|e| panic!("unable to create {}: {e}", parent.display()));
        }
        std::fs::write(&full, content)
            .unwrap_or_else(|e| panic!("unable to write {}: {e}", full.display()));
    }

    /// Content of a file, as written by the code under test.
    #[must_use]
    pub fn read(&self, path: impl AsRef<Path>) -> String {
        let full = self.path(path);
        std::fs::read_to_string(&full)
            .unwrap_or_else(|e| panic!("unable to read {}: {e}", full.display()))
    }

    #[must_use]
    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.path(path).exists()
    }

    /// Remove a file or a whole directory, if present.
    pub fn remove(&self, path: impl AsRef<Path>) {
        let full = self.path(path);
        let result = if full.is_dir() {
            std::fs::remove_dir_all(&full)
        } else {
            std::fs::remove_file(&full)
        };
        match result {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => panic!("unable to remove {}: {e}", full.display()),
        }
    }

    /// Set the value file of GPIO `number` (raw level, before polarity).
    pub fn gpio(&self, number: u32, level: bool) {
        self.write(
            format!("/sys/class/gpio/gpio{number}/value"),
            if level { "1\n" } else { "0\n" },
        );
    }

    /// Set attribute `attr` in instance `hwmon{index}` of device `device`.
    pub fn hwmon(&self, device: &str, index: u32, attr: &str, content: &str) {
        self.write(format!("{device}/hwmon/hwmon{index}/{attr}"), content);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn files_round_trip_through_the_root() {
        let fake = FakeSysfs::new();
        fake.write("/sys/devices/platform/fan/fan1_input", "9000\n");
        assert_eq!(
            fake.root().read_int("/sys/devices/platform/fan/fan1_input").unwrap(),
            9000
        );
        fake.gpio(400, false);
        assert_eq!(fake.read("/sys/class/gpio/gpio400/value"), "0\n");
        fake.remove("/sys/class/gpio");
        assert!(!fake.exists("/sys/class/gpio/gpio400/value"));
        fake.remove("/sys/class/gpio");
    }
}

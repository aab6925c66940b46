// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! hwmon index discovery.
//!
//! The `hwmonN` directory a sensor driver registers under depends on probe order, so platform
//! tables name the i2c device directory and the attribute, and the index is found at runtime.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{SysfsErr, SysfsRoot};

fn hwmon_index(name: &str) -> Option<u32> {
    name.strip_prefix("hwmon")?.parse().ok()
}

/// Find the `hwmon/hwmonN` directory of a device.
///
/// If a device registers more than one hwmon instance the lowest index wins.
///
/// # Errors
///
/// [`SysfsErr::NotFound`] if the device or its hwmon directory is absent.
pub fn hwmon_dir(root: &SysfsRoot, device_dir: impl AsRef<Path>) -> Result<PathBuf, SysfsErr> {
    let hwmon_parent = device_dir.as_ref().join("hwmon");
    let mut found: Vec<(u32, String)> = root
        .list_dir(&hwmon_parent)?
        .into_iter()
        .filter_map(|name| hwmon_index(&name).map(|index| (index, name)))
        .collect();
    found.sort();
    match found.as_slice() {
        [] => Err(SysfsErr::NotFound(hwmon_parent)),
        [(_, name)] => Ok(hwmon_parent.join(name)),
        [(_, name), ..] => {
            warn!(
                "{} has {} hwmon instances, using {name}",
                device_dir.as_ref().display(),
                found.len()
            );
            Ok(hwmon_parent.join(name))
        }
    }
}

/// Platform path of `attr` in the hwmon directory of a device.
///
/// # Errors
///
/// As [`hwmon_dir`].
pub fn hwmon_attr(
    root: &SysfsRoot,
    device_dir: impl AsRef<Path>,
    attr: &str,
) -> Result<PathBuf, SysfsErr> {
    let path = hwmon_dir(root, device_dir)?.join(attr);
    debug!("resolved hwmon attribute {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::Scratch;
    use tracing_test::traced_test;

    #[test]
    fn finds_the_index() {
        let fake = Scratch::new();
        fake.write("/sys/bus/i2c/devices/3-0048/hwmon/hwmon5/temp1_input", "38500");
        let root = fake.root();
        let attr = hwmon_attr(&root, "/sys/bus/i2c/devices/3-0048", "temp1_input").unwrap();
        assert_eq!(
            attr,
            PathBuf::from("/sys/bus/i2c/devices/3-0048/hwmon/hwmon5/temp1_input")
        );
        assert_eq!(root.read_int(attr).unwrap(), 38500);
    }

    #[traced_test]
    #[test]
    fn lowest_index_wins() {
        let fake = Scratch::new();
        fake.write("/sys/bus/i2c/devices/3-0049/hwmon/hwmon12/name", "a");
        fake.write("/sys/bus/i2c/devices/3-0049/hwmon/hwmon9/name", "b");
        fake.write("/sys/bus/i2c/devices/3-0049/hwmon/device", "");
        let dir = hwmon_dir(&fake.root(), "/sys/bus/i2c/devices/3-0049").unwrap();
        assert_eq!(dir, PathBuf::from("/sys/bus/i2c/devices/3-0049/hwmon/hwmon9"));
        assert!(logs_contain("2 hwmon instances"));
    }

    #[test]
    fn absent_device() {
        let fake = Scratch::new();
        let err = hwmon_dir(&fake.root(), "/sys/bus/i2c/devices/3-004a").unwrap_err();
        assert!(err.is_not_found());
        fake.write("/sys/bus/i2c/devices/3-004a/hwmon/uevent", "");
        let err = hwmon_dir(&fake.root(), "/sys/bus/i2c/devices/3-004a").unwrap_err();
        assert!(err.is_not_found());
    }
}

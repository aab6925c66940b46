// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! [sysfs] read/write primitives for platform drivers.
//!
//! Platform drivers talk to hardware almost exclusively through small attribute files exported
//! by kernel drivers (CPLD drivers, hwmon, GPIO, eeprom).
//! This crate provides the handful of operations they need: read an integer, read a string,
//! read a window of bytes, write a value.
//!
//! All paths handed to this crate are absolute *platform* paths (`/sys/...`, `/etc/...`).
//! A [`SysfsRoot`] resolves them under a prefix, which is `/` on a real switch and a scratch
//! directory in tests.
//!
//! A missing attribute file is reported as [`SysfsErr::NotFound`] so that drivers can treat it
//! as "not present" rather than as a failure.
//!
//! [sysfs]: https://www.kernel.org/doc/Documentation/filesystems/sysfs.txt

#![deny(clippy::pedantic, clippy::unwrap_used)]

pub mod gpio;
pub mod hwmon;

use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Component, Path, PathBuf};

use nix::errno::Errno;
use status::StatusError;
use tracing::{debug, error, info};

/// Errors which might occur when accessing platform attribute files
#[derive(Debug, thiserror::Error)]
pub enum SysfsErr {
    /// The attribute (or the device behind it) does not exist.
    #[error("{0:?} not found")]
    NotFound(PathBuf),
    /// Some [`std::io::Error`] error occurred while accessing `path`
    #[error("i/o error on {path:?}: {source}")]
    Io {
        /// platform path being accessed
        path: PathBuf,
        /// underlying error
        source: std::io::Error,
    },
    /// The attribute content could not be interpreted
    #[error("unable to parse {content:?} read from {path:?}")]
    Parse {
        /// platform path being read
        path: PathBuf,
        /// trimmed content of the file
        content: String,
    },
    /// sysfs is not mounted where the platform expects it
    #[error("sysfs is not mounted at /sys")]
    SysfsNotMounted,
    /// sysfs is mounted more than once.
    #[error("suspicious configuration found: sysfs is mounted at {0:?}")]
    SuspiciousMounts(Vec<PathBuf>),
    /// The path is not under a mounted sysfs.
    #[error("path {0:?} is not under sysfs")]
    PathNotUnderSysfs(PathBuf),
    /// The mount table could not be read
    #[error("unable to read mount table: {0}")]
    MountTable(String),
}

impl SysfsErr {
    fn io(path: &Path, source: std::io::Error) -> SysfsErr {
        let absent = source.kind() == std::io::ErrorKind::NotFound
            || source.raw_os_error() == Some(Errno::ENXIO as i32)
            || source.raw_os_error() == Some(Errno::ENODEV as i32);
        if absent {
            SysfsErr::NotFound(path.to_path_buf())
        } else {
            SysfsErr::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// True if the error only means "nothing is there".
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, SysfsErr::NotFound(_))
    }
}

impl From<SysfsErr> for StatusError {
    fn from(value: SysfsErr) -> Self {
        match value {
            SysfsErr::NotFound(_) => StatusError::Missing,
            SysfsErr::Parse { .. } => StatusError::Invalid,
            SysfsErr::Io { .. }
            | SysfsErr::SysfsNotMounted
            | SysfsErr::SuspiciousMounts(_)
            | SysfsErr::PathNotUnderSysfs(_)
            | SysfsErr::MountTable(_) => StatusError::Internal,
        }
    }
}

/// Parse an integer the way attribute files present them: surrounding whitespace ignored,
/// decimal by default, hexadecimal when prefixed with `0x`.
///
/// Some CPLD drivers print `0x1f`, others `31`; both read the same.
#[must_use]
pub fn parse_int(content: &str) -> Option<i32> {
    let content = content.trim();
    let (negative, digits) = match content.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, content),
    };
    let value = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        i64::from_str_radix(hex, 16).ok()?
    } else {
        digits.parse::<i64>().ok()?
    };
    let value = if negative { -value } else { value };
    i32::try_from(value).ok()
}

/// Root under which absolute platform paths are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysfsRoot {
    prefix: PathBuf,
}

impl SysfsRoot {
    /// The live system: platform paths are used as they are.
    ///
    /// # Errors
    ///
    /// Fails unless sysfs is mounted exactly once, at `/sys`, with the sysfs magic.
    pub fn system() -> Result<SysfsRoot, SysfsErr> {
        verify_sysfs_mount()?;
        Ok(SysfsRoot {
            prefix: PathBuf::from("/"),
        })
    }

    /// Resolve platform paths under `prefix` instead of `/`.
    ///
    /// No check is made that `prefix` holds a sysfs; this is how tests and offline inspection
    /// of a captured tree work.
    pub fn at(prefix: impl AsRef<Path>) -> SysfsRoot {
        SysfsRoot {
            prefix: prefix.as_ref().to_path_buf(),
        }
    }

    /// The prefix paths are resolved under.
    #[must_use]
    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    /// Map a platform path to the path actually accessed.
    ///
    /// Only normal components are kept: a platform path can never walk above the prefix.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let mut resolved = self.prefix.clone();
        for component in path.as_ref().components() {
            if let Component::Normal(part) = component {
                resolved.push(part);
            }
        }
        resolved
    }

    /// True if the platform path exists.
    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.resolve(path).exists()
    }

    /// Read a whole attribute file as a trimmed string.
    ///
    /// # Errors
    ///
    /// [`SysfsErr::NotFound`] if the file is absent, [`SysfsErr::Io`] on other failures.
    pub fn read_str(&self, path: impl AsRef<Path>) -> Result<String, SysfsErr> {
        let path = path.as_ref();
        match std::fs::read(self.resolve(path)) {
            Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).trim().to_string()),
            Err(e) => Err(SysfsErr::io(path, e)),
        }
    }

    /// Read an integer attribute (see [`parse_int`]).
    ///
    /// # Errors
    ///
    /// As [`SysfsRoot::read_str`], plus [`SysfsErr::Parse`] if the content is not an integer.
    pub fn read_int(&self, path: impl AsRef<Path>) -> Result<i32, SysfsErr> {
        let path = path.as_ref();
        let content = self.read_str(path)?;
        parse_int(&content).ok_or_else(|| SysfsErr::Parse {
            path: path.to_path_buf(),
            content,
        })
    }

    /// Read `len` bytes starting at `offset` (eeprom style binary attributes).
    ///
    /// # Errors
    ///
    /// [`SysfsErr::NotFound`] if the file (or the device behind it) is absent, [`SysfsErr::Io`]
    /// on short reads and other failures.
    pub fn read_bytes(
        &self,
        path: impl AsRef<Path>,
        offset: u64,
        len: usize,
    ) -> Result<Vec<u8>, SysfsErr> {
        let path = path.as_ref();
        let mut file = OpenOptions::new()
            .read(true)
            .open(self.resolve(path))
            .map_err(|e| SysfsErr::io(path, e))?;
        if offset != 0 {
            file.seek(SeekFrom::Start(offset))
                .map_err(|e| SysfsErr::io(path, e))?;
        }
        let mut buf = vec![0u8; len];
        file.read_exact(&mut buf)
            .map_err(|e| SysfsErr::io(path, e))?;
        Ok(buf)
    }

    /// Write `len` bytes at `offset`.
    ///
    /// # Errors
    ///
    /// As [`SysfsRoot::read_bytes`].
    pub fn write_bytes(
        &self,
        path: impl AsRef<Path>,
        offset: u64,
        data: &[u8],
    ) -> Result<(), SysfsErr> {
        let path = path.as_ref();
        let mut file = OpenOptions::new()
            .write(true)
            .open(self.resolve(path))
            .map_err(|e| SysfsErr::io(path, e))?;
        file.seek(SeekFrom::Start(offset))
            .map_err(|e| SysfsErr::io(path, e))?;
        file.write_all(data).map_err(|e| SysfsErr::io(path, e))
    }

    /// Write a string to an existing attribute file.
    ///
    /// Attribute files are never created: writing to a missing attribute is
    /// [`SysfsErr::NotFound`].
    ///
    /// # Errors
    ///
    /// [`SysfsErr::NotFound`] if the file is absent, [`SysfsErr::Io`] on other failures.
    pub fn write_str(&self, path: impl AsRef<Path>, value: &str) -> Result<(), SysfsErr> {
        let path = path.as_ref();
        debug!("writing {value:?} to {}", path.display());
        let mut file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(self.resolve(path))
            .map_err(|e| SysfsErr::io(path, e))?;
        file.write_all(value.as_bytes())
            .map_err(|e| SysfsErr::io(path, e))
    }

    /// Write a decimal integer to an existing attribute file.
    ///
    /// # Errors
    ///
    /// As [`SysfsRoot::write_str`].
    pub fn write_int(&self, path: impl AsRef<Path>, value: i32) -> Result<(), SysfsErr> {
        self.write_str(path, &value.to_string())
    }

    /// Names of the entries of a platform directory, sorted.
    ///
    /// # Errors
    ///
    /// [`SysfsErr::NotFound`] if the directory is absent.
    pub fn list_dir(&self, path: impl AsRef<Path>) -> Result<Vec<String>, SysfsErr> {
        let path = path.as_ref();
        let entries = std::fs::read_dir(self.resolve(path)).map_err(|e| SysfsErr::io(path, e))?;
        let mut names: Vec<String> = entries
            .flatten()
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .collect();
        names.sort();
        Ok(names)
    }
}

/// Check that sysfs is mounted exactly once, at `/sys`, and that `/sys` really is a sysfs.
///
/// # Errors
///
/// Returns an error describing the first violated expectation.
pub fn verify_sysfs_mount() -> Result<(), SysfsErr> {
    let sysfs_mounts: Vec<PathBuf> = procfs::mounts()
        .map_err(|e| SysfsErr::MountTable(e.to_string()))?
        .into_iter()
        .filter(|mount| mount.fs_vfstype == "sysfs")
        .map(|mount| PathBuf::from(mount.fs_file))
        .collect();
    match sysfs_mounts.as_slice() {
        [] => return Err(SysfsErr::SysfsNotMounted),
        [one] if one == Path::new("/sys") => {}
        [_] => return Err(SysfsErr::SysfsNotMounted),
        _ => {
            error!("sysfs mounted more than once: {sysfs_mounts:#?}");
            return Err(SysfsErr::SuspiciousMounts(sysfs_mounts));
        }
    }
    match nix::sys::statfs::statfs("/sys") {
        Ok(stats) if stats.filesystem_type() == nix::sys::statfs::SYSFS_MAGIC => {
            info!("found sysfs filesystem at /sys");
            Ok(())
        }
        Ok(_) => Err(SysfsErr::PathNotUnderSysfs(PathBuf::from("/sys"))),
        Err(errno) => Err(SysfsErr::Io {
            path: PathBuf::from("/sys"),
            source: errno.into(),
        }),
    }
}

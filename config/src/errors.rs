// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Configuration loading and validation failures.

use std::path::PathBuf;

use sysfs::SysfsErr;
use thiserror::Error;

/// The reasons why we may reject a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read configuration file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_yaml_ng::Error),
    #[error("sysfs root must be an absolute path: {0:?}")]
    RelativeRoot(PathBuf),
    #[error("sysfs root {0:?} is not a directory")]
    NoSuchRoot(PathBuf),
    #[error("platform name must not be empty")]
    EmptyPlatform,
    #[error("host sysfs unusable: {0}")]
    Sysfs(#[from] SysfsErr),
}

// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Configuration of the platform tools.
//!
//! A small YAML file, every key optional:
//!
//! ```yaml
//! platform: x86-64-ref-qs32-r0   # otherwise read from /etc/onl/platform
//! root: /                        # where /sys is looked up; a capture directory works too
//! bmc: auto                      # auto | present | absent
//! tracing: default=info,sfp=debug
//! ```
//!
//! Command line options override file values, see [`PlatformConfig::with_overrides`].

#![deny(clippy::pedantic, clippy::unwrap_used)]

pub mod errors;

use std::path::{Path, PathBuf};

use platform::bmc::BmcMode;
use serde::{Deserialize, Serialize};
use sysfs::SysfsRoot;
use tracectl::{LevelFilter, trace_target};
use tracing::{debug, info};

pub use errors::ConfigError;

trace_target!("config", LevelFilter::INFO, &["config"]);

/// Used when no configuration file is given and this one exists.
pub const DEFAULT_CONFIG_FILE: &str = "/etc/onlp/onlp.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlatformConfig {
    /// board name, detected when absent
    pub platform: Option<String>,
    /// prefix platform paths are resolved under
    pub root: PathBuf,
    pub bmc: BmcMode,
    /// tracing configuration string, e.g. `default=info,sfp=debug`
    pub tracing: Option<String>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        PlatformConfig {
            platform: None,
            root: PathBuf::from("/"),
            bmc: BmcMode::Auto,
            tracing: None,
        }
    }
}

impl PlatformConfig {
    /// Parse a YAML document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] on malformed YAML or unknown keys.
    pub fn from_yaml(yaml: &str) -> Result<PlatformConfig, ConfigError> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Read and parse a configuration file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Read`] if the file cannot be read, else as [`PlatformConfig::from_yaml`].
    pub fn load(path: impl AsRef<Path>) -> Result<PlatformConfig, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&yaml)?;
        info!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load `path` if given (it must exist), else [`DEFAULT_CONFIG_FILE`] if it exists, else
    /// the defaults.
    ///
    /// # Errors
    ///
    /// As [`PlatformConfig::load`].
    pub fn load_or_default(path: Option<&Path>) -> Result<PlatformConfig, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::load(DEFAULT_CONFIG_FILE),
            None => {
                debug!("no configuration file, using defaults");
                Ok(PlatformConfig::default())
            }
        }
    }

    /// Replace file values by those given on the command line.
    #[must_use]
    pub fn with_overrides(
        mut self,
        platform: Option<String>,
        root: Option<PathBuf>,
        bmc: Option<BmcMode>,
        tracing: Option<String>,
    ) -> PlatformConfig {
        if platform.is_some() {
            self.platform = platform;
        }
        if let Some(root) = root {
            self.root = root;
        }
        if let Some(bmc) = bmc {
            self.bmc = bmc;
        }
        if tracing.is_some() {
            self.tracing = tracing;
        }
        self
    }

    /// Check the values that can be checked without touching the hardware.
    ///
    /// # Errors
    ///
    /// The first invalid value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.root.is_absolute() {
            return Err(ConfigError::RelativeRoot(self.root.clone()));
        }
        if !self.root.is_dir() {
            return Err(ConfigError::NoSuchRoot(self.root.clone()));
        }
        if self.platform.as_ref().is_some_and(|name| name.trim().is_empty()) {
            return Err(ConfigError::EmptyPlatform);
        }
        Ok(())
    }

    /// Is the live system (as opposed to a captured tree) being used?
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.root == Path::new("/")
    }

    /// The root the platform drivers work under. The live system's sysfs mount is verified.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Sysfs`] if `/sys` is not a proper sysfs mount.
    pub fn sysfs_root(&self) -> Result<SysfsRoot, ConfigError> {
        if self.is_live() {
            Ok(SysfsRoot::system()?)
        } else {
            info!("using sysfs tree under {}", self.root.display());
            Ok(SysfsRoot::at(&self.root))
        }
    }
}

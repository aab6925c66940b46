// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Link time registry of boards, and platform detection.

use linkme::distributed_slice;
use platform::bmc::BmcMode;
use sysfs::{SysfsErr, SysfsRoot};
use thiserror::Error;
use tracing::{debug, info};

use crate::board::Board;
use crate::driver::TablePlatform;

/// Where ONL records the platform name.
pub const PLATFORM_FILE: &str = "/etc/onl/platform";

#[distributed_slice]
pub static BOARDS: [&'static Board];

/// Add a board to [`BOARDS`].
#[macro_export]
macro_rules! register_board {
    ($board:path) => {
        const _: () = {
            use linkme::distributed_slice;
            use $crate::registry::BOARDS;

            #[distributed_slice(BOARDS)]
            static BOARD_ENTRY: &$crate::board::Board = &$board;
        };
    };
}

#[derive(Debug, Error)]
pub enum PlatformLookupError {
    #[error("no platform configured and {PLATFORM_FILE} is unreadable: {0}")]
    NoPlatformFile(SysfsErr),
    #[error("{PLATFORM_FILE} is empty")]
    Empty,
    #[error("unsupported platform '{0}'")]
    Unknown(String),
}

/// All registered boards, sorted by name.
#[must_use]
pub fn boards() -> Vec<&'static Board> {
    let mut all: Vec<&'static Board> = BOARDS.iter().copied().collect();
    all.sort_by_key(|board| board.name);
    all
}

/// The board named `name`.
#[must_use]
pub fn find(name: &str) -> Option<&'static Board> {
    BOARDS.iter().copied().find(|board| board.name == name)
}

/// The name of the platform we run on: `configured` if given, else the first line of
/// [`PLATFORM_FILE`] under `root`.
///
/// # Errors
///
/// Fails if no name is configured and the platform file is missing or empty.
pub fn platform_name(
    configured: Option<&str>,
    root: &SysfsRoot,
) -> Result<String, PlatformLookupError> {
    if let Some(name) = configured {
        debug!("using configured platform {name}");
        return Ok(name.to_string());
    }
    let content = root
        .read_str(PLATFORM_FILE)
        .map_err(PlatformLookupError::NoPlatformFile)?;
    let name = content.lines().next().unwrap_or_default().trim();
    if name.is_empty() {
        return Err(PlatformLookupError::Empty);
    }
    Ok(name.to_string())
}

/// Find the board to run on.
///
/// # Errors
///
/// See [`platform_name`]; [`PlatformLookupError::Unknown`] when no board has that name.
pub fn detect(
    configured: Option<&str>,
    root: &SysfsRoot,
) -> Result<&'static Board, PlatformLookupError> {
    let name = platform_name(configured, root)?;
    let board = find(&name).ok_or(PlatformLookupError::Unknown(name))?;
    info!("platform {}", board.name);
    Ok(board)
}

/// Detect the board and bind it to `root`.
///
/// # Errors
///
/// As [`detect`].
pub fn load(
    configured: Option<&str>,
    root: SysfsRoot,
    bmc: BmcMode,
) -> Result<TablePlatform, PlatformLookupError> {
    let board = detect(configured, &root)?;
    Ok(TablePlatform::new(board, root, bmc))
}

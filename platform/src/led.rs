// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! LEDs.

use bitflags::bitflags;
use oid::Oid;
use status::{Status, StatusError};
use strum::IntoEnumIterator;

use crate::header::OidHeader;

/// What an LED shows.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
    strum::FromRepr,
)]
#[strum(serialize_all = "kebab-case")]
#[repr(u8)]
pub enum LedMode {
    Off = 0,
    On,
    Blinking,
    Red,
    RedBlinking,
    Orange,
    OrangeBlinking,
    Yellow,
    YellowBlinking,
    Green,
    GreenBlinking,
    Blue,
    BlueBlinking,
    Purple,
    PurpleBlinking,
    Auto,
    AutoBlinking,
}

impl LedMode {
    /// The capability bit advertising this mode.
    #[must_use]
    pub const fn cap(self) -> LedCaps {
        LedCaps::from_bits_retain(1 << self as u8)
    }
}

bitflags! {
    /// Modes an LED supports, one bit per [`LedMode`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LedCaps: u32 {
        const OFF             = 1 << LedMode::Off as u8;
        const ON              = 1 << LedMode::On as u8;
        const BLINKING        = 1 << LedMode::Blinking as u8;
        const RED             = 1 << LedMode::Red as u8;
        const RED_BLINKING    = 1 << LedMode::RedBlinking as u8;
        const ORANGE          = 1 << LedMode::Orange as u8;
        const ORANGE_BLINKING = 1 << LedMode::OrangeBlinking as u8;
        const YELLOW          = 1 << LedMode::Yellow as u8;
        const YELLOW_BLINKING = 1 << LedMode::YellowBlinking as u8;
        const GREEN           = 1 << LedMode::Green as u8;
        const GREEN_BLINKING  = 1 << LedMode::GreenBlinking as u8;
        const BLUE            = 1 << LedMode::Blue as u8;
        const BLUE_BLINKING   = 1 << LedMode::BlueBlinking as u8;
        const PURPLE          = 1 << LedMode::Purple as u8;
        const PURPLE_BLINKING = 1 << LedMode::PurpleBlinking as u8;
        const AUTO            = 1 << LedMode::Auto as u8;
        const AUTO_BLINKING   = 1 << LedMode::AutoBlinking as u8;
    }
}

impl LedCaps {
    /// The capabilities of an LED supporting exactly `modes`.
    #[must_use]
    pub fn of(modes: impl IntoIterator<Item = LedMode>) -> LedCaps {
        modes
            .into_iter()
            .fold(LedCaps::empty(), |caps, mode| caps | mode.cap())
    }

    /// The supported modes, in declaration order.
    pub fn modes(self) -> impl Iterator<Item = LedMode> {
        LedMode::iter().filter(move |mode| self.contains(mode.cap()))
    }
}

bitflags! {
    /// LED status.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LedStatus: u32 {
        const PRESENT = 1 << 0;
        const FAILED  = 1 << 1;
        const ON      = 1 << 2;
    }
}

/// An LED reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedInfo {
    pub hdr: OidHeader,
    pub status: LedStatus,
    pub caps: LedCaps,
    pub mode: LedMode,
}

impl std::fmt::Display for LedInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hdr)?;
        if !self.status.contains(LedStatus::PRESENT) {
            return write!(f, " not present");
        }
        write!(f, " {}", self.mode)?;
        if self.status.contains(LedStatus::FAILED) {
            write!(f, " FAILED")?;
        }
        Ok(())
    }
}

/// LED driver.
pub trait LedDriver: Send + Sync {
    /// One-time initialization.
    ///
    /// # Errors
    ///
    /// Board specific.
    fn init(&self) -> Status {
        Ok(())
    }

    /// Header of LED `id`.
    ///
    /// # Errors
    ///
    /// [`StatusError::Param`] for an id that is not an LED of this board.
    fn hdr_get(&self, id: Oid) -> Status<OidHeader>;

    /// Current state of LED `id`.
    ///
    /// # Errors
    ///
    /// [`StatusError::Param`] for an id that is not an LED of this board.
    fn info_get(&self, id: Oid) -> Status<LedInfo>;

    /// Status of LED `id`.
    ///
    /// # Errors
    ///
    /// As [`LedDriver::info_get`].
    fn status_get(&self, id: Oid) -> Status<LedStatus> {
        Ok(self.info_get(id)?.status)
    }

    /// Show `mode` on LED `id`.
    ///
    /// # Errors
    ///
    /// [`StatusError::Unsupported`] if the LED cannot show `mode`.
    fn mode_set(&self, id: Oid, mode: LedMode) -> Status {
        let _ = (id, mode);
        Err(StatusError::Unsupported)
    }

    /// Turn LED `id` on or off.
    ///
    /// # Errors
    ///
    /// As [`LedDriver::mode_set`].
    fn set(&self, id: Oid, on: bool) -> Status {
        self.mode_set(id, if on { LedMode::On } else { LedMode::Off })
    }
}

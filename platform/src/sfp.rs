// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Pluggable transceiver modules (SFP, QSFP and friends).
//!
//! Ports are numbered from 0. Ports that are not in [`SfpDriver::bitmap_get`] are rejected
//! with [`StatusError::Param`].

use status::{Status, StatusError};

/// Size of the A0 (identification) and A2 (diagnostics) EEPROM pages.
pub const EEPROM_SIZE: usize = 256;

/// I2C address of the identification EEPROM.
pub const EEPROM_ADDR: u8 = 0x50;

/// I2C address of the diagnostics (DOM) page.
pub const DOM_ADDR: u8 = 0x51;

/// A set of port numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortBitmap {
    words: Vec<u64>,
}

impl PortBitmap {
    #[must_use]
    pub fn new() -> PortBitmap {
        PortBitmap::default()
    }

    /// Add `port`.
    pub fn set(&mut self, port: u32) {
        let word = (port / 64) as usize;
        if self.words.len() <= word {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1u64 << (port % 64);
    }

    /// Is `port` in the set?
    #[must_use]
    pub fn contains(&self, port: u32) -> bool {
        self.words
            .get((port / 64) as usize)
            .is_some_and(|word| word & (1u64 << (port % 64)) != 0)
    }

    /// Number of ports in the set.
    #[must_use]
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    /// Ports in ascending order.
    #[allow(clippy::cast_possible_truncation)] // words are indexed by port / 64
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.words.iter().enumerate().flat_map(|(index, word)| {
            (0..64u32)
                .filter(move |bit| word & (1u64 << *bit) != 0)
                .map(move |bit| index as u32 * 64 + bit)
        })
    }
}

impl FromIterator<u32> for PortBitmap {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> PortBitmap {
        let mut bitmap = PortBitmap::new();
        for port in iter {
            bitmap.set(port);
        }
        bitmap
    }
}

/// Ranges, e.g. `0-3,8,10-11`; an empty set shows as `none`.
impl std::fmt::Display for PortBitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ports = self.iter().peekable();
        if ports.peek().is_none() {
            return write!(f, "none");
        }
        let mut first = true;
        while let Some(start) = ports.next() {
            let mut end = start;
            while ports.peek() == Some(&(end + 1)) {
                end += 1;
                ports.next();
            }
            if !first {
                write!(f, ",")?;
            }
            first = false;
            if start == end {
                write!(f, "{start}")?;
            } else {
                write!(f, "{start}-{end}")?;
            }
        }
        Ok(())
    }
}

/// Per port module controls.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter, strum::EnumString,
)]
#[strum(serialize_all = "kebab-case")]
pub enum SfpControl {
    /// pulse reset
    Reset,
    /// hold in reset
    ResetState,
    RxLos,
    TxFault,
    TxDisable,
    LpMode,
    PowerOverride,
}

/// Module type, from byte 0 of the identification EEPROM (SFF-8024).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SffIdentifier {
    Sfp,
    Qsfp,
    QsfpPlus,
    Qsfp28,
    QsfpDd,
    Osfp,
    Unknown(u8),
}

impl From<u8> for SffIdentifier {
    fn from(byte: u8) -> SffIdentifier {
        match byte {
            0x03 => SffIdentifier::Sfp,
            0x0C => SffIdentifier::Qsfp,
            0x0D => SffIdentifier::QsfpPlus,
            0x11 => SffIdentifier::Qsfp28,
            0x18 => SffIdentifier::QsfpDd,
            0x19 => SffIdentifier::Osfp,
            other => SffIdentifier::Unknown(other),
        }
    }
}

impl SffIdentifier {
    /// Decode the identifier of an EEPROM image; an empty image is unknown.
    #[must_use]
    pub fn of_eeprom(eeprom: &[u8]) -> SffIdentifier {
        eeprom
            .first()
            .map_or(SffIdentifier::Unknown(0), |b| SffIdentifier::from(*b))
    }
}

impl std::fmt::Display for SffIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SffIdentifier::Sfp => write!(f, "SFP/SFP+/SFP28"),
            SffIdentifier::Qsfp => write!(f, "QSFP"),
            SffIdentifier::QsfpPlus => write!(f, "QSFP+"),
            SffIdentifier::Qsfp28 => write!(f, "QSFP28"),
            SffIdentifier::QsfpDd => write!(f, "QSFP-DD"),
            SffIdentifier::Osfp => write!(f, "OSFP"),
            SffIdentifier::Unknown(byte) => write!(f, "unknown ({byte:#04x})"),
        }
    }
}

/// Transceiver module driver.
pub trait SfpDriver: Send + Sync {
    /// One-time initialization.
    ///
    /// # Errors
    ///
    /// Board specific.
    fn init(&self) -> Status {
        Ok(())
    }

    /// The ports of this board.
    fn bitmap_get(&self) -> PortBitmap;

    /// Reject ports that are not ports of this board.
    ///
    /// # Errors
    ///
    /// [`StatusError::Param`] for a port outside [`SfpDriver::bitmap_get`].
    fn check_port(&self, port: u32) -> Status {
        if self.bitmap_get().contains(port) {
            Ok(())
        } else {
            Err(StatusError::Param)
        }
    }

    /// Is a module plugged in `port`?
    ///
    /// # Errors
    ///
    /// [`StatusError::Param`] for an invalid port.
    fn is_present(&self, port: u32) -> Status<bool>;

    /// All ports with a module plugged in.
    ///
    /// # Errors
    ///
    /// As [`SfpDriver::is_present`].
    fn presence_bitmap_get(&self) -> Status<PortBitmap> {
        let mut present = PortBitmap::new();
        for port in self.bitmap_get().iter() {
            if self.is_present(port)? {
                present.set(port);
            }
        }
        Ok(present)
    }

    /// All ports reporting loss of signal. Ports without the control are left out.
    ///
    /// # Errors
    ///
    /// As [`SfpDriver::control_get`], for failures other than an absent control.
    fn rx_los_bitmap_get(&self) -> Status<PortBitmap> {
        let mut los = PortBitmap::new();
        for port in self.bitmap_get().iter() {
            match self.control_get(port, SfpControl::RxLos) {
                Ok(0) => {}
                Ok(_) => los.set(port),
                Err(StatusError::Unsupported | StatusError::Missing) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(los)
    }

    /// The identification page (A0) of the module in `port`.
    ///
    /// # Errors
    ///
    /// [`StatusError::Missing`] if no module is plugged.
    fn eeprom_read(&self, port: u32) -> Status<[u8; EEPROM_SIZE]>;

    /// The diagnostics page (A2) of the module in `port`.
    ///
    /// # Errors
    ///
    /// [`StatusError::Unsupported`] by default.
    fn dom_read(&self, port: u32) -> Status<[u8; EEPROM_SIZE]> {
        let _ = port;
        Err(StatusError::Unsupported)
    }

    /// Read one byte at `offset` of device `addr` on the module bus of `port`.
    ///
    /// # Errors
    ///
    /// [`StatusError::Unsupported`] by default.
    fn dev_readb(&self, port: u32, addr: u8, offset: u8) -> Status<u8> {
        let _ = (port, addr, offset);
        Err(StatusError::Unsupported)
    }

    /// Write one byte at `offset` of device `addr` on the module bus of `port`.
    ///
    /// # Errors
    ///
    /// [`StatusError::Unsupported`] by default.
    fn dev_writeb(&self, port: u32, addr: u8, offset: u8, value: u8) -> Status {
        let _ = (port, addr, offset, value);
        Err(StatusError::Unsupported)
    }

    /// Drive a module control.
    ///
    /// # Errors
    ///
    /// [`StatusError::Unsupported`] for controls the port does not have.
    fn control_set(&self, port: u32, control: SfpControl, value: i32) -> Status {
        let _ = (port, control, value);
        Err(StatusError::Unsupported)
    }

    /// Read a module control.
    ///
    /// # Errors
    ///
    /// [`StatusError::Unsupported`] for controls the port does not have.
    fn control_get(&self, port: u32, control: SfpControl) -> Status<i32> {
        let _ = (port, control);
        Err(StatusError::Unsupported)
    }

    /// Hook run after a module is detected in `port`.
    ///
    /// # Errors
    ///
    /// Board specific.
    fn post_insert(&self, port: u32) -> Status {
        let _ = port;
        Ok(())
    }

    /// Release module resources.
    ///
    /// # Errors
    ///
    /// Board specific.
    fn denit(&self) -> Status {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn bitmap_ops() {
        let mut bitmap = PortBitmap::new();
        assert!(bitmap.is_empty());
        assert_eq!(bitmap.to_string(), "none");
        for port in [0, 1, 2, 3, 8, 63, 64, 65, 130] {
            bitmap.set(port);
        }
        bitmap.set(2);
        assert_eq!(bitmap.count(), 9);
        assert!(bitmap.contains(64));
        assert!(!bitmap.contains(66));
        assert!(!bitmap.contains(10_000));
        assert_eq!(bitmap.to_string(), "0-3,8,63-65,130");
        let again: PortBitmap = bitmap.iter().collect();
        assert_eq!(again, bitmap);
    }

    #[test]
    fn identifiers() {
        assert_eq!(SffIdentifier::from(0x11), SffIdentifier::Qsfp28);
        assert_eq!(SffIdentifier::of_eeprom(&[0x03, 0x04]), SffIdentifier::Sfp);
        assert_eq!(SffIdentifier::of_eeprom(&[]), SffIdentifier::Unknown(0));
        assert_eq!(SffIdentifier::from(0x7f).to_string(), "unknown (0x7f)");
        assert_eq!(SfpControl::PowerOverride.to_string(), "power-override");
        assert_eq!("lp-mode".parse::<SfpControl>().unwrap(), SfpControl::LpMode);
    }

    struct FourPorts;

    impl SfpDriver for FourPorts {
        fn bitmap_get(&self) -> PortBitmap {
            (0..4).collect()
        }

        fn is_present(&self, port: u32) -> Status<bool> {
            self.check_port(port)?;
            Ok(port % 2 == 0)
        }

        fn eeprom_read(&self, port: u32) -> Status<[u8; EEPROM_SIZE]> {
            if !self.is_present(port)? {
                return Err(StatusError::Missing);
            }
            let mut page = [0; EEPROM_SIZE];
            page[0] = 0x11;
            Ok(page)
        }

        fn control_get(&self, port: u32, control: SfpControl) -> Status<i32> {
            self.check_port(port)?;
            match control {
                SfpControl::RxLos if port == 3 => Ok(1),
                SfpControl::RxLos => Ok(0),
                _ => Err(StatusError::Unsupported),
            }
        }
    }

    #[test]
    fn default_bitmaps() {
        let sfp = FourPorts;
        assert_eq!(sfp.presence_bitmap_get().unwrap().to_string(), "0,2");
        assert_eq!(sfp.rx_los_bitmap_get().unwrap().to_string(), "3");
        assert_eq!(sfp.is_present(4), Err(StatusError::Param));
        assert_eq!(sfp.eeprom_read(1), Err(StatusError::Missing));
        assert_eq!(
            SffIdentifier::of_eeprom(&sfp.eeprom_read(0).unwrap()),
            SffIdentifier::Qsfp28
        );
        assert_eq!(sfp.dom_read(0), Err(StatusError::Unsupported));
        assert_eq!(sfp.post_insert(0), Ok(()));
    }
}

// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Platform object identifiers.
//!
//! Every object a platform exposes (the chassis, each thermal sensor, fan, PSU, LED and
//! transceiver module) is named by a 32 bit object id.
//! The top byte carries the [`OidType`], the low 24 bits carry the 1-based index of the object
//! within its type.
//!
//! # Examples
//!
//! ```
//! use onlp_oid::{Oid, OidType};
//!
//! let oid = Oid::thermal(3);
//! assert_eq!(oid.oid_type(), OidType::Thermal);
//! assert_eq!(oid.index(), 3);
//! assert_eq!(oid.raw(), 0x0200_0003);
//! assert_eq!(oid.to_string(), "thermal-3");
//! assert_eq!(Oid::try_from("0x02000003").unwrap(), oid);
//! ```

#![deny(clippy::all, clippy::pedantic)]
#![forbid(unsafe_code, clippy::unwrap_used)]

use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[allow(unused_imports)] // re-export
#[cfg(any(test, feature = "bolero"))]
pub use contract::*;

/// The class of a platform object.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
    strum::FromRepr,
    strum::IntoStaticStr,
)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum OidType {
    /// The system / chassis
    Sys = 1,
    /// Thermal sensor
    Thermal = 2,
    /// Fan
    Fan = 3,
    /// Power supply unit
    Psu = 4,
    /// Light emitting diode
    Led = 5,
    /// Transceiver module (SFP/QSFP cage)
    Module = 6,
    /// Real time clock
    Rtc = 7,
}

/// Errors which might occur when building or parsing an [`Oid`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OidError {
    /// The type byte does not name a known [`OidType`].
    #[error("unknown object type {0:#04x}")]
    UnknownType(u8),
    /// The index is zero or does not fit in 24 bits.
    #[error("object index {0} out of range [1, {max}]", max = Oid::MAX_INDEX)]
    IndexOutOfRange(u32),
    /// The textual form is neither `type-index` nor a hex id.
    #[error("invalid object id syntax: {0}")]
    Syntax(String),
}

/// A platform object id.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
#[repr(transparent)]
pub struct Oid(u32);

impl Oid {
    /// Largest index representable in the low 24 bits.
    pub const MAX_INDEX: u32 = 0x00FF_FFFF;
    const TYPE_SHIFT: u32 = 24;

    /// The chassis object, root of every platform's object tree.
    pub const CHASSIS: Oid = Oid(((OidType::Sys as u32) << Self::TYPE_SHIFT) | 1);

    /// Build an id from its type and 1-based index.
    ///
    /// # Errors
    ///
    /// Returns [`OidError::IndexOutOfRange`] if `index` is zero or larger than [`Oid::MAX_INDEX`].
    pub const fn new(oid_type: OidType, index: u32) -> Result<Oid, OidError> {
        if index == 0 || index > Self::MAX_INDEX {
            return Err(OidError::IndexOutOfRange(index));
        }
        Ok(Oid(((oid_type as u32) << Self::TYPE_SHIFT) | index))
    }

    // Table constructors: an index outside `1..=MAX_INDEX` fails to compile in a const or static
    // initializer, and panics elsewhere. Use [`Oid::new`] for indices not known up front.
    const fn checked(oid_type: OidType, index: u32) -> Oid {
        assert!(
            index != 0 && index <= Self::MAX_INDEX,
            "object index out of range"
        );
        Oid(((oid_type as u32) << Self::TYPE_SHIFT) | index)
    }

    /// Thermal sensor `index`.
    ///
    /// # Panics
    ///
    /// If `index` is zero or larger than [`Oid::MAX_INDEX`].
    #[must_use]
    pub const fn thermal(index: u32) -> Oid {
        Self::checked(OidType::Thermal, index)
    }

    /// Fan `index`.
    ///
    /// # Panics
    ///
    /// If `index` is zero or larger than [`Oid::MAX_INDEX`].
    #[must_use]
    pub const fn fan(index: u32) -> Oid {
        Self::checked(OidType::Fan, index)
    }

    /// PSU `index`.
    ///
    /// # Panics
    ///
    /// If `index` is zero or larger than [`Oid::MAX_INDEX`].
    #[must_use]
    pub const fn psu(index: u32) -> Oid {
        Self::checked(OidType::Psu, index)
    }

    /// LED `index`.
    ///
    /// # Panics
    ///
    /// If `index` is zero or larger than [`Oid::MAX_INDEX`].
    #[must_use]
    pub const fn led(index: u32) -> Oid {
        Self::checked(OidType::Led, index)
    }

    /// Transceiver module `index`.
    ///
    /// # Panics
    ///
    /// If `index` is zero or larger than [`Oid::MAX_INDEX`].
    #[must_use]
    pub const fn module(index: u32) -> Oid {
        Self::checked(OidType::Module, index)
    }

    /// The raw 32 bit value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// The 1-based index of the object within its type.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 & Self::MAX_INDEX
    }

    /// The type of the object.
    #[must_use]
    #[allow(clippy::missing_panics_doc)] // the type byte is validated on construction
    pub fn oid_type(self) -> OidType {
        #[allow(clippy::cast_possible_truncation)]
        let byte = (self.0 >> Self::TYPE_SHIFT) as u8;
        match OidType::from_repr(byte) {
            Some(t) => t,
            None => unreachable!("oid {:#010x} escaped validation", self.0),
        }
    }

    /// True if this id names an object of type `oid_type`.
    #[must_use]
    pub fn is(self, oid_type: OidType) -> bool {
        self.oid_type() == oid_type
    }
}

impl TryFrom<u32> for Oid {
    type Error = OidError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        #[allow(clippy::cast_possible_truncation)]
        let byte = (value >> Oid::TYPE_SHIFT) as u8;
        let oid_type = OidType::from_repr(byte).ok_or(OidError::UnknownType(byte))?;
        Oid::new(oid_type, value & Oid::MAX_INDEX)
    }
}

impl From<Oid> for u32 {
    fn from(value: Oid) -> u32 {
        value.0
    }
}

impl Display for Oid {
    /// Formats the id as `type-index`, e.g. `fan-2`.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.oid_type(), self.index())
    }
}

impl std::fmt::LowerHex for Oid {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        std::fmt::LowerHex::fmt(&self.0, f)
    }
}

impl TryFrom<&str> for Oid {
    type Error = OidError;

    /// Parses either the `type-index` form or a `0x` prefixed raw id.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let value = value.trim();
        if let Some(hex) = value
            .strip_prefix("0x")
            .or_else(|| value.strip_prefix("0X"))
        {
            let raw = u32::from_str_radix(hex, 16)
                .map_err(|_| OidError::Syntax(value.to_string()))?;
            return Oid::try_from(raw);
        }
        let Some((type_str, index_str)) = value.rsplit_once('-') else {
            return Err(OidError::Syntax(value.to_string()));
        };
        let oid_type =
            OidType::from_str(type_str).map_err(|_| OidError::Syntax(value.to_string()))?;
        let index = index_str
            .parse::<u32>()
            .map_err(|_| OidError::Syntax(value.to_string()))?;
        Oid::new(oid_type, index)
    }
}

impl TryFrom<String> for Oid {
    type Error = OidError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Oid::try_from(value.as_str())
    }
}

impl FromStr for Oid {
    type Err = OidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Oid::try_from(s)
    }
}

impl From<Oid> for String {
    fn from(value: Oid) -> Self {
        value.to_string()
    }
}

#[cfg(any(test, feature = "bolero"))]
mod contract {
    use crate::{Oid, OidType};
    use bolero::{Driver, TypeGenerator, ValueGenerator};

    /// Generates only valid object ids.
    pub struct ValidOidGenerator;

    impl ValueGenerator for ValidOidGenerator {
        type Output = Oid;

        fn generate<D: Driver>(&self, driver: &mut D) -> Option<Self::Output> {
            let byte = driver.produce::<u8>()? % 7 + 1;
            let index = driver.produce::<u32>()? % Oid::MAX_INDEX + 1;
            let oid_type = OidType::from_repr(byte)?;
            Oid::new(oid_type, index).ok()
        }
    }

    impl TypeGenerator for Oid {
        fn generate<D: Driver>(driver: &mut D) -> Option<Self> {
            ValidOidGenerator.generate(driver)
        }
    }
}

#[cfg(test)]
mod test {
    use crate::{Oid, OidError, OidType, ValidOidGenerator};
    use strum::IntoEnumIterator;

    #[test]
    fn chassis_is_sys_one() {
        assert_eq!(Oid::CHASSIS.raw(), 0x0100_0001);
        assert!(Oid::CHASSIS.is(OidType::Sys));
        assert_eq!(Oid::CHASSIS.to_string(), "sys-1");
    }

    #[test]
    fn index_bounds() {
        assert_eq!(
            Oid::new(OidType::Fan, 0),
            Err(OidError::IndexOutOfRange(0))
        );
        assert_eq!(
            Oid::new(OidType::Fan, Oid::MAX_INDEX + 1),
            Err(OidError::IndexOutOfRange(Oid::MAX_INDEX + 1))
        );
        assert!(Oid::new(OidType::Fan, Oid::MAX_INDEX).is_ok());
    }

    #[test]
    fn unknown_type_byte_rejected() {
        assert_eq!(Oid::try_from(0x0000_0001), Err(OidError::UnknownType(0)));
        assert_eq!(Oid::try_from(0x0900_0001), Err(OidError::UnknownType(9)));
    }

    #[test]
    fn every_type_displays_lowercase() {
        for t in OidType::iter() {
            let oid = Oid::new(t, 12).unwrap();
            let text = oid.to_string();
            assert_eq!(text, format!("{}-12", <&'static str>::from(t)));
            assert_eq!(text.to_lowercase(), text);
        }
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(Oid::try_from("fan"), Err(OidError::Syntax(_))));
        assert!(matches!(Oid::try_from("blower-1"), Err(OidError::Syntax(_))));
        assert!(matches!(Oid::try_from("0xzz"), Err(OidError::Syntax(_))));
        assert_eq!(Oid::try_from(" psu-2 ").unwrap(), Oid::psu(2));
        assert_eq!(Oid::try_from("0X04000002").unwrap(), Oid::psu(2));
    }

    #[test]
    fn both_text_forms_agree() {
        bolero::check!()
            .with_generator(ValidOidGenerator)
            .for_each(|oid: &Oid| {
                assert_eq!(Oid::try_from(oid.to_string().as_str()).unwrap(), *oid);
                assert_eq!(Oid::try_from(format!("{oid:#x}").as_str()).unwrap(), *oid);
                assert_eq!(Oid::try_from(oid.raw()).unwrap(), *oid);
            });
    }

    #[test]
    fn serde_uses_text_form() {
        let yaml = serde_yaml_ng::to_string(&vec![Oid::led(4), Oid::CHASSIS]).unwrap();
        assert!(yaml.contains("led-4"));
        assert!(yaml.contains("sys-1"));
        let back: Vec<Oid> = serde_yaml_ng::from_str(&yaml).unwrap();
        assert_eq!(back, vec![Oid::led(4), Oid::CHASSIS]);
        assert!(serde_yaml_ng::from_str::<Oid>("fan-0").is_err());
    }

    #[test]
    #[should_panic(expected = "object index out of range")]
    fn table_constructor_rejects_zero() {
        let _ = Oid::module(0);
    }

    #[test]
    #[should_panic(expected = "object index out of range")]
    fn table_constructor_rejects_wide_index() {
        let _ = Oid::thermal(Oid::MAX_INDEX + 1);
    }

    #[test]
    fn index_zero_is_never_parsed() {
        assert!("module-0".parse::<Oid>().is_err());
        assert!(Oid::try_from(0x0600_0000u32).is_err());
        assert_eq!(Oid::module(Oid::MAX_INDEX).index(), Oid::MAX_INDEX);
    }
}

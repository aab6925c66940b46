// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Board descriptor tables.
//!
//! A board is entirely described by `'static` tables of these types; the table driver in
//! [`crate::driver`] turns them into a [`platform::Platform`].

use std::collections::HashSet;
use std::path::PathBuf;

use platform::bmc::BmcProbe;
use platform::fan::{FanCaps, FanDir};
use platform::led::LedMode;
use platform::locator::{Locator, PathTemplate, RangeMap};
use platform::manage::{FanPolicy, LedRoles};
use platform::psu::PsuCaps;
use platform::thermal::{ThermalCaps, Thresholds};
use platform::{Oid, OidType};
use sysfs::gpio::Gpio;
use thiserror::Error;

/// A boolean read from a [`Locator`]; an absent file reads as not asserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signal {
    pub at: Locator,
    /// the raw value 0 means asserted
    pub active_low: bool,
}

impl Signal {
    #[must_use]
    pub const fn high(at: Locator) -> Signal {
        Signal {
            at,
            active_low: false,
        }
    }

    #[must_use]
    pub const fn low(at: Locator) -> Signal {
        Signal {
            at,
            active_low: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThermalDesc {
    pub description: &'static str,
    /// the chassis or a PSU
    pub parent: Oid,
    pub input: Locator,
    pub caps: ThermalCaps,
    pub thresholds: Thresholds,
}

/// Where the airflow direction of a fan comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanDirSource {
    Unknown,
    Fixed(FanDir),
    /// an attribute reading `f2b` for front to back fans, anything else for back to front
    Attr { at: Locator, f2b: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanDesc {
    pub description: &'static str,
    /// the chassis or a PSU
    pub parent: Oid,
    pub caps: FanCaps,
    /// `None` for fans that cannot be removed
    pub present: Option<Signal>,
    pub fault: Option<Signal>,
    pub rpm: Option<Locator>,
    /// duty cycle in percent, often shared by all chassis fans
    pub percentage: Option<Locator>,
    /// used to derive the duty cycle from the rpm when there is no duty attribute
    pub max_rpm: i32,
    pub dir: FanDirSource,
    pub model: Option<Locator>,
    pub serial: Option<Locator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PsuDesc {
    pub description: &'static str,
    /// type only (AC, DC12, DC48); reading caps are added as readings succeed
    pub caps: PsuCaps,
    pub present: Signal,
    pub power_good: Option<Signal>,
    /// input power present
    pub input_good: Option<Signal>,
    /// device directory of the PMBus driver, whose hwmon instance carries the readings
    pub pmbus: Option<&'static str>,
    pub model: Option<Locator>,
    pub serial: Option<Locator>,
    pub fan: Option<Oid>,
    pub thermal: Option<Oid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedDesc {
    pub description: &'static str,
    pub at: Locator,
    /// raw register value for each supported mode
    pub modes: &'static [(i32, LedMode)],
}

/// A per port boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortSignal {
    /// CPLD attributes: port `p` in segment `i` of `ranges` is attribute `attr(map(p))` in
    /// `dirs[i]`.
    Cpld {
        ranges: RangeMap,
        dirs: &'static [&'static str],
        attr: PathTemplate,
        active_low: bool,
    },
    /// GPIO line `map(p)`.
    Gpio { map: RangeMap, active_low: bool },
}

/// The resource carrying a [`PortSignal`] for one port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortLine {
    Attr { path: PathBuf, active_low: bool },
    Gpio(Gpio),
}

impl PortSignal {
    /// The line of `port`, `None` for ports without this signal.
    #[must_use]
    pub fn line(&self, port: u32) -> Option<PortLine> {
        match *self {
            PortSignal::Cpld {
                ranges,
                dirs,
                attr,
                active_low,
            } => {
                let (segment, value) = ranges.locate(port)?;
                let dir = dirs.get(segment)?;
                Some(PortLine::Attr {
                    path: PathBuf::from(*dir).join(attr.render(&[value])),
                    active_low,
                })
            }
            PortSignal::Gpio { map, active_low } => {
                let number = map.map(port)?;
                Some(PortLine::Gpio(if active_low {
                    Gpio::active_low(number)
                } else {
                    Gpio::new(number)
                }))
            }
        }
    }

    /// GPIO lines used by this signal.
    #[must_use]
    pub fn gpios(&self) -> Vec<Gpio> {
        match *self {
            PortSignal::Cpld { .. } => Vec::new(),
            PortSignal::Gpio { map, .. } => map
                .ids()
                .filter_map(|port| match self.line(port)? {
                    PortLine::Gpio(gpio) => Some(gpio),
                    PortLine::Attr { .. } => None,
                })
                .collect(),
        }
    }

    /// Does `port` have this signal?
    #[must_use]
    pub fn covers(&self, port: u32) -> bool {
        self.line(port).is_some()
    }
}

/// Transceiver ports: `0..count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortLayout {
    pub count: u32,
    /// ports taking QSFP-family modules; the others take SFP modules
    pub qsfp: RangeMap,
    pub present: PortSignal,
    pub rx_los: Option<PortSignal>,
    pub tx_fault: Option<PortSignal>,
    pub tx_disable: Option<PortSignal>,
    pub reset: Option<PortSignal>,
    pub lp_mode: Option<PortSignal>,
    pub eeprom_bus: RangeMap,
    /// EEPROM attribute, rendered with the bus number
    pub eeprom: PathTemplate,
    /// diagnostics attribute of SFP ports, rendered with the bus number
    pub dom: Option<PathTemplate>,
}

impl PortLayout {
    /// Every per port signal of the layout.
    pub fn signals(&self) -> impl Iterator<Item = &PortSignal> {
        std::iter::once(&self.present).chain(
            [
                &self.rx_los,
                &self.tx_fault,
                &self.tx_disable,
                &self.reset,
                &self.lp_mode,
            ]
            .into_iter()
            .flatten(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SysDesc {
    /// ONIE system EEPROM attribute
    pub onie_eeprom: Option<&'static str>,
    /// `(name, version attribute)` of each CPLD
    pub cplds: &'static [(&'static str, Locator)],
    pub other_versions: &'static [(&'static str, Locator)],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BmcDesc {
    /// directory of the BMC `sensor<id>` attributes
    pub dir: &'static str,
    pub probe: BmcProbe,
}

/// A complete board.
#[derive(Debug)]
pub struct Board {
    /// ONL platform name, e.g. `x86-64-ref-qs32-r0`
    pub name: &'static str,
    pub sys: SysDesc,
    pub thermals: &'static [ThermalDesc],
    pub fans: &'static [FanDesc],
    pub psus: &'static [PsuDesc],
    pub leds: &'static [LedDesc],
    pub ports: PortLayout,
    pub bmc: Option<BmcDesc>,
    pub fan_policy: Option<FanPolicy>,
    pub led_roles: Option<LedRoles>,
}

/// Inconsistencies in a board table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("{0} has unknown parent {1}")]
    UnknownParent(Oid, Oid),
    #[error("{psu} lists {child} which is not parented by it")]
    ChildMismatch { psu: Oid, child: Oid },
    #[error("{0} is attached to no PSU although parented by one")]
    Orphan(Oid),
    #[error("{0} has no modes")]
    NoLedModes(Oid),
    #[error("{0} maps raw value {1} twice")]
    DuplicateLedValue(Oid, i32),
    #[error("port {0} has no {1}")]
    PortUncovered(u32, &'static str),
    #[error("{0} refers to missing {1}")]
    MissingRole(&'static str, Oid),
    #[error("fan policy steps are not ascending")]
    PolicyOrder,
    #[error("fan policy duty above 100%")]
    PolicyDuty,
}

fn index_oid(oid_type: OidType, index: usize) -> Oid {
    // tables are far smaller than the oid index space
    #[allow(clippy::cast_possible_truncation)]
    let index = index as u32 + 1;
    Oid::new(oid_type, index).unwrap_or(Oid::CHASSIS)
}

impl Board {
    /// The object id of entry `index` of a table of type `oid_type`.
    #[must_use]
    pub fn oid(oid_type: OidType, index: usize) -> Oid {
        index_oid(oid_type, index)
    }

    fn exists(&self, id: Oid) -> bool {
        let index = id.index() as usize;
        let len = match id.oid_type() {
            OidType::Thermal => self.thermals.len(),
            OidType::Fan => self.fans.len(),
            OidType::Psu => self.psus.len(),
            OidType::Led => self.leds.len(),
            OidType::Module => self.ports.count as usize,
            OidType::Sys => return id == Oid::CHASSIS,
            OidType::Rtc => 0,
        };
        (1..=len).contains(&index)
    }

    fn check_parent(&self, id: Oid, parent: Oid) -> Result<(), BoardError> {
        let ok = parent == Oid::CHASSIS || (parent.is(OidType::Psu) && self.exists(parent));
        if !ok {
            return Err(BoardError::UnknownParent(id, parent));
        }
        if parent.is(OidType::Psu) {
            let psu = &self.psus[parent.index() as usize - 1];
            if psu.fan != Some(id) && psu.thermal != Some(id) {
                return Err(BoardError::Orphan(id));
            }
        }
        Ok(())
    }

    fn parent_of(&self, id: Oid) -> Option<Oid> {
        let index = (id.index() as usize).checked_sub(1)?;
        match id.oid_type() {
            OidType::Thermal => self.thermals.get(index).map(|t| t.parent),
            OidType::Fan => self.fans.get(index).map(|f| f.parent),
            _ => None,
        }
    }

    /// Check the cross references of the tables.
    ///
    /// # Errors
    ///
    /// The first inconsistency found.
    pub fn validate(&self) -> Result<(), BoardError> {
        for (index, thermal) in self.thermals.iter().enumerate() {
            self.check_parent(Board::oid(OidType::Thermal, index), thermal.parent)?;
        }
        for (index, fan) in self.fans.iter().enumerate() {
            self.check_parent(Board::oid(OidType::Fan, index), fan.parent)?;
        }
        for (index, psu) in self.psus.iter().enumerate() {
            let id = Board::oid(OidType::Psu, index);
            for child in [psu.fan, psu.thermal].into_iter().flatten() {
                if self.parent_of(child) != Some(id) {
                    return Err(BoardError::ChildMismatch { psu: id, child });
                }
            }
        }
        for (index, led) in self.leds.iter().enumerate() {
            let id = Board::oid(OidType::Led, index);
            if led.modes.is_empty() {
                return Err(BoardError::NoLedModes(id));
            }
            let mut raws = HashSet::new();
            for (raw, _) in led.modes {
                if !raws.insert(*raw) {
                    return Err(BoardError::DuplicateLedValue(id, *raw));
                }
            }
        }
        for port in 0..self.ports.count {
            if !self.ports.present.covers(port) {
                return Err(BoardError::PortUncovered(port, "presence signal"));
            }
            if !self.ports.eeprom_bus.contains(port) {
                return Err(BoardError::PortUncovered(port, "EEPROM bus"));
            }
        }
        if let Some(roles) = self.led_roles {
            let leds = roles
                .fan
                .into_iter()
                .chain(roles.psus.iter().map(|(_, led)| *led));
            for led in leds {
                if !self.exists(led) {
                    return Err(BoardError::MissingRole("LED", led));
                }
            }
            for (psu, _) in roles.psus {
                if !self.exists(*psu) {
                    return Err(BoardError::MissingRole("PSU", *psu));
                }
            }
        }
        if let Some(policy) = self.fan_policy {
            if policy
                .steps
                .windows(2)
                .any(|pair| pair[0].mcelsius >= pair[1].mcelsius)
            {
                return Err(BoardError::PolicyOrder);
            }
            let duties = policy.steps.iter().map(|step| step.percentage);
            if duties
                .chain([policy.failsafe, policy.floor])
                .any(|duty| duty > 100)
            {
                return Err(BoardError::PolicyDuty);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use platform::locator::Segment;

    const SPLIT: PortSignal = PortSignal::Cpld {
        ranges: RangeMap::new(&[Segment::new(0, 15, 1), Segment::new(16, 31, 17)]),
        dirs: &["/sys/bus/i2c/devices/11-0060", "/sys/bus/i2c/devices/12-0062"],
        attr: PathTemplate::new("module_present_{}"),
        active_low: false,
    };

    const LINES: PortSignal = PortSignal::Gpio {
        map: RangeMap::new(&[Segment::descending(0, 3, 511), Segment::descending(4, 5, 495)]),
        active_low: true,
    };

    #[test]
    fn cpld_signal_paths() {
        assert_eq!(
            SPLIT.line(3),
            Some(PortLine::Attr {
                path: PathBuf::from("/sys/bus/i2c/devices/11-0060/module_present_4"),
                active_low: false
            })
        );
        assert_eq!(
            SPLIT.line(16),
            Some(PortLine::Attr {
                path: PathBuf::from("/sys/bus/i2c/devices/12-0062/module_present_17"),
                active_low: false
            })
        );
        assert_eq!(SPLIT.line(32), None);
        assert!(!SPLIT.covers(40));
        assert!(SPLIT.gpios().is_empty());
    }

    #[test]
    fn gpio_signal_lines() {
        assert_eq!(LINES.line(0), Some(PortLine::Gpio(Gpio::active_low(511))));
        assert_eq!(LINES.line(3), Some(PortLine::Gpio(Gpio::active_low(508))));
        assert_eq!(LINES.line(5), Some(PortLine::Gpio(Gpio::active_low(494))));
        assert_eq!(LINES.line(6), None);
        let numbers: Vec<u32> = LINES.gpios().iter().map(Gpio::number).collect();
        assert_eq!(numbers, vec![511, 510, 509, 508, 495, 494]);
    }
}

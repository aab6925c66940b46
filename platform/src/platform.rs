// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The per-board entry point.

use oid::{Oid, OidType};
use status::{Status, StatusError};
use tracing::{debug, warn};

use crate::fan::{FanDriver, FanInfo};
use crate::header::OidHeader;
use crate::led::{LedDriver, LedInfo};
use crate::manage::FanDecision;
use crate::psu::{PsuDriver, PsuInfo};
use crate::sfp::{SffIdentifier, SfpDriver};
use crate::sys::SysDriver;
use crate::thermal::{ThermalDriver, ThermalInfo};

/// The state of any object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OidInfo {
    Chassis(OidHeader),
    Thermal(ThermalInfo),
    Fan(FanInfo),
    Psu(PsuInfo),
    Led(LedInfo),
    Module {
        hdr: OidHeader,
        present: bool,
        /// decoded from the EEPROM of a present module, when readable
        identifier: Option<SffIdentifier>,
    },
}

impl OidInfo {
    #[must_use]
    pub fn hdr(&self) -> &OidHeader {
        match self {
            OidInfo::Chassis(hdr) | OidInfo::Module { hdr, .. } => hdr,
            OidInfo::Thermal(info) => &info.hdr,
            OidInfo::Fan(info) => &info.hdr,
            OidInfo::Psu(info) => &info.hdr,
            OidInfo::Led(info) => &info.hdr,
        }
    }
}

impl std::fmt::Display for OidInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OidInfo::Chassis(hdr) => write!(f, "{hdr}"),
            OidInfo::Thermal(info) => write!(f, "{info}"),
            OidInfo::Fan(info) => write!(f, "{info}"),
            OidInfo::Psu(info) => write!(f, "{info}"),
            OidInfo::Led(info) => write!(f, "{info}"),
            OidInfo::Module {
                hdr,
                present,
                identifier,
            } => {
                write!(f, "{hdr}")?;
                match (present, identifier) {
                    (false, _) => write!(f, " not present"),
                    (true, Some(id)) => write!(f, " {id}"),
                    (true, None) => write!(f, " present"),
                }
            }
        }
    }
}

/// Module objects are numbered from 1, ports from 0.
///
/// # Errors
///
/// [`StatusError::Param`] if `id` is not a module object.
pub fn module_port(id: Oid) -> Status<u32> {
    if !id.is(OidType::Module) {
        return Err(StatusError::Param);
    }
    id.index().checked_sub(1).ok_or(StatusError::Param)
}

/// A board: one driver per object class.
pub trait Platform: Send + Sync {
    fn sys(&self) -> &dyn SysDriver;
    fn thermal(&self) -> &dyn ThermalDriver;
    fn fan(&self) -> &dyn FanDriver;
    fn psu(&self) -> &dyn PsuDriver;
    fn led(&self) -> &dyn LedDriver;
    fn sfp(&self) -> &dyn SfpDriver;

    fn name(&self) -> &'static str {
        self.sys().platform_name()
    }

    /// Initialize every driver. All drivers are initialized even if one fails.
    ///
    /// # Errors
    ///
    /// The first failure.
    fn init(&self) -> Status {
        let results = [
            ("sys", self.sys().init()),
            ("thermal", self.thermal().init()),
            ("fan", self.fan().init()),
            ("psu", self.psu().init()),
            ("led", self.led().init()),
            ("sfp", self.sfp().init()),
        ];
        let mut first = Ok(());
        for (class, result) in results {
            if let Err(e) = result {
                warn!("{} {class} init failed: {e}", self.name());
                if first.is_ok() {
                    first = Err(e);
                }
            }
        }
        first
    }

    /// Header of any object.
    ///
    /// # Errors
    ///
    /// [`StatusError::Param`] for an object not on this board.
    fn hdr_get(&self, id: Oid) -> Status<OidHeader> {
        match id.oid_type() {
            OidType::Sys if id == Oid::CHASSIS => self.sys().hdr_get(),
            OidType::Thermal => self.thermal().hdr_get(id),
            OidType::Fan => self.fan().hdr_get(id),
            OidType::Psu => self.psu().hdr_get(id),
            OidType::Led => self.led().hdr_get(id),
            OidType::Module => {
                let port = module_port(id)?;
                self.sfp().check_port(port)?;
                Ok(OidHeader::new(id, format!("Port {port}"), Oid::CHASSIS))
            }
            OidType::Sys | OidType::Rtc => Err(StatusError::Param),
        }
    }

    /// State of any object.
    ///
    /// # Errors
    ///
    /// [`StatusError::Param`] for an object not on this board.
    fn info_get(&self, id: Oid) -> Status<OidInfo> {
        Ok(match id.oid_type() {
            OidType::Thermal => OidInfo::Thermal(self.thermal().info_get(id)?),
            OidType::Fan => OidInfo::Fan(self.fan().info_get(id)?),
            OidType::Psu => OidInfo::Psu(self.psu().info_get(id)?),
            OidType::Led => OidInfo::Led(self.led().info_get(id)?),
            OidType::Module => {
                let hdr = self.hdr_get(id)?;
                let port = module_port(id)?;
                let present = self.sfp().is_present(port)?;
                let identifier = if present {
                    match self.sfp().eeprom_read(port) {
                        Ok(eeprom) => Some(SffIdentifier::of_eeprom(&eeprom)),
                        Err(e) => {
                            debug!("port {port}: unable to read eeprom: {e}");
                            None
                        }
                    }
                } else {
                    None
                };
                OidInfo::Module {
                    hdr,
                    present,
                    identifier,
                }
            }
            OidType::Sys | OidType::Rtc => OidInfo::Chassis(self.hdr_get(id)?),
        })
    }

    /// One pass of fan speed management.
    ///
    /// # Errors
    ///
    /// [`StatusError::Unsupported`] by default.
    fn manage_fans(&self) -> Status<FanDecision> {
        Err(StatusError::Unsupported)
    }

    /// One pass of status LED management.
    ///
    /// # Errors
    ///
    /// [`StatusError::Unsupported`] by default.
    fn manage_leds(&self) -> Status {
        Err(StatusError::Unsupported)
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::fan::{FanCaps, FanMode, FanStatus};
    use crate::led::{LedCaps, LedMode, LedStatus};
    use crate::onie::OnieInfo;
    use crate::psu::PsuStatus;
    use crate::sfp::{EEPROM_SIZE, PortBitmap};
    use crate::sys::PlatformInfo;
    use crate::thermal::{ThermalCaps, ThermalStatus, Thresholds};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// A small in-memory board: thermals 1-3 (3 on the PSU), fans 1-3 (3 on the PSU), one PSU,
    /// LEDs 1-2 and 4 ports (0 and 2 populated).
    #[derive(Debug)]
    pub(crate) struct MockBoard {
        pub(crate) temps: Mutex<HashMap<u32, Option<i32>>>,
        pub(crate) fans: Mutex<HashMap<u32, (FanStatus, u8)>>,
        pub(crate) psu: Mutex<PsuStatus>,
        pub(crate) leds: Mutex<HashMap<u32, LedMode>>,
    }

    impl Default for MockBoard {
        fn default() -> MockBoard {
            MockBoard {
                temps: Mutex::new(HashMap::from([
                    (1, Some(30_000)),
                    (2, Some(35_000)),
                    (3, Some(40_000)),
                ])),
                fans: Mutex::new(HashMap::from([
                    (1, (FanStatus::PRESENT | FanStatus::F2B, 50)),
                    (2, (FanStatus::PRESENT | FanStatus::F2B, 50)),
                    (3, (FanStatus::PRESENT | FanStatus::F2B, 70)),
                ])),
                psu: Mutex::new(PsuStatus::PRESENT),
                leds: Mutex::new(HashMap::from([(1, LedMode::Off), (2, LedMode::Off)])),
            }
        }
    }

    impl MockBoard {
        pub(crate) fn set_temp(&self, index: u32, mcelsius: Option<i32>) {
            self.temps.lock().unwrap().insert(index, mcelsius);
        }

        pub(crate) fn set_fan_status(&self, index: u32, status: FanStatus) {
            self.fans.lock().unwrap().entry(index).or_default().0 = status;
        }

        pub(crate) fn duty(&self, index: u32) -> u8 {
            self.fans.lock().unwrap()[&index].1
        }

        pub(crate) fn led_mode(&self, index: u32) -> LedMode {
            self.leds.lock().unwrap()[&index]
        }
    }

    fn check(id: Oid, count: u32) -> Status {
        if (1..=count).contains(&id.index()) {
            Ok(())
        } else {
            Err(StatusError::Param)
        }
    }

    impl SysDriver for MockBoard {
        fn platform_name(&self) -> &'static str {
            "mock-board"
        }

        fn hdr_get(&self) -> Status<OidHeader> {
            Ok(
                OidHeader::new(Oid::CHASSIS, "Chassis", Oid::CHASSIS).with_children([
                    Oid::thermal(1),
                    Oid::thermal(2),
                    Oid::fan(1),
                    Oid::fan(2),
                    Oid::psu(1),
                    Oid::led(1),
                    Oid::led(2),
                    Oid::module(1),
                    Oid::module(2),
                    Oid::module(3),
                    Oid::module(4),
                    // stale entry, skipped by tree walks
                    Oid::fan(9),
                ]),
            )
        }

        fn onie_data_get(&self) -> Status<OnieInfo> {
            Err(StatusError::Missing)
        }

        fn platform_info_get(&self) -> Status<PlatformInfo> {
            Ok(PlatformInfo::default())
        }
    }

    impl ThermalDriver for MockBoard {
        fn hdr_get(&self, id: Oid) -> Status<OidHeader> {
            check(id, 3)?;
            let parent = if id.index() == 3 { Oid::psu(1) } else { Oid::CHASSIS };
            Ok(OidHeader::new(id, format!("Thermal {}", id.index()), parent))
        }

        fn info_get(&self, id: Oid) -> Status<ThermalInfo> {
            let hdr = ThermalDriver::hdr_get(self, id)?;
            let reading = self.temps.lock().unwrap().get(&id.index()).copied().flatten();
            Ok(ThermalInfo {
                hdr,
                status: if reading.is_some() {
                    ThermalStatus::PRESENT
                } else {
                    ThermalStatus::empty()
                },
                caps: ThermalCaps::GET_TEMPERATURE,
                mcelsius: reading.unwrap_or_default(),
                thresholds: Thresholds::new(60_000, 70_000, 80_000),
            })
        }
    }

    impl FanDriver for MockBoard {
        fn hdr_get(&self, id: Oid) -> Status<OidHeader> {
            check(id, 3)?;
            let parent = if id.index() == 3 { Oid::psu(1) } else { Oid::CHASSIS };
            Ok(OidHeader::new(id, format!("Fan {}", id.index()), parent))
        }

        fn info_get(&self, id: Oid) -> Status<FanInfo> {
            let hdr = FanDriver::hdr_get(self, id)?;
            let (status, percentage) = self.fans.lock().unwrap()[&id.index()];
            let caps = if id.index() == 3 {
                FanCaps::GET_PERCENTAGE
            } else {
                FanCaps::SET_PERCENTAGE | FanCaps::GET_PERCENTAGE
            };
            Ok(FanInfo {
                hdr,
                status,
                caps,
                rpm: i32::from(percentage) * 200,
                percentage,
                mode: FanMode::from_percentage(percentage),
                model: String::new(),
                serial: String::new(),
            })
        }

        fn set_duty(&self, id: Oid, percentage: u8) -> Status {
            check(id, 2)?;
            self.fans.lock().unwrap().entry(id.index()).or_default().1 = percentage;
            Ok(())
        }
    }

    impl PsuDriver for MockBoard {
        fn hdr_get(&self, id: Oid) -> Status<OidHeader> {
            check(id, 1)?;
            Ok(OidHeader::new(id, "PSU 1", Oid::CHASSIS)
                .with_children([Oid::fan(3), Oid::thermal(3)]))
        }

        fn info_get(&self, id: Oid) -> Status<PsuInfo> {
            let mut info = PsuInfo::new(PsuDriver::hdr_get(self, id)?);
            info.status = *self.psu.lock().unwrap();
            Ok(info)
        }
    }

    impl LedDriver for MockBoard {
        fn hdr_get(&self, id: Oid) -> Status<OidHeader> {
            check(id, 2)?;
            Ok(OidHeader::new(id, format!("LED {}", id.index()), Oid::CHASSIS))
        }

        fn info_get(&self, id: Oid) -> Status<LedInfo> {
            let hdr = LedDriver::hdr_get(self, id)?;
            let mode = self.led_mode(id.index());
            let mut status = LedStatus::PRESENT;
            if mode != LedMode::Off {
                status |= LedStatus::ON;
            }
            Ok(LedInfo {
                hdr,
                status,
                caps: LedCaps::of([LedMode::Off, LedMode::Green, LedMode::Orange]),
                mode,
            })
        }

        fn mode_set(&self, id: Oid, mode: LedMode) -> Status {
            check(id, 2)?;
            if !LedCaps::of([LedMode::Off, LedMode::Green, LedMode::Orange]).contains(mode.cap()) {
                return Err(StatusError::Unsupported);
            }
            self.leds.lock().unwrap().insert(id.index(), mode);
            Ok(())
        }
    }

    impl SfpDriver for MockBoard {
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
            page[0] = if port == 0 { 0x11 } else { 0x03 };
            Ok(page)
        }
    }

    impl Platform for MockBoard {
        fn sys(&self) -> &dyn SysDriver {
            self
        }
        fn thermal(&self) -> &dyn ThermalDriver {
            self
        }
        fn fan(&self) -> &dyn FanDriver {
            self
        }
        fn psu(&self) -> &dyn PsuDriver {
            self
        }
        fn led(&self) -> &dyn LedDriver {
            self
        }
        fn sfp(&self) -> &dyn SfpDriver {
            self
        }
    }

    #[test]
    fn dispatch_by_type() {
        let mock = MockBoard::default();
        let board: &dyn Platform = &mock;
        assert_eq!(board.name(), "mock-board");
        board.init().unwrap();
        assert!(matches!(
            board.info_get(Oid::thermal(2)),
            Ok(OidInfo::Thermal(ThermalInfo { mcelsius: 35_000, .. }))
        ));
        assert!(matches!(board.info_get(Oid::psu(1)), Ok(OidInfo::Psu(_))));
        assert_eq!(board.info_get(Oid::led(3)), Err(StatusError::Param));
        assert_eq!(board.hdr_get(Oid::CHASSIS).unwrap().children.len(), 12);
        let rtc = Oid::new(OidType::Rtc, 1).unwrap();
        assert_eq!(board.hdr_get(rtc), Err(StatusError::Param));
        assert_eq!(board.manage_leds(), Err(StatusError::Unsupported));
    }

    #[test]
    fn modules() {
        let mock = MockBoard::default();
        let board: &dyn Platform = &mock;
        let info = board.info_get(Oid::module(1)).unwrap();
        assert_eq!(info.hdr().description, "Port 0");
        assert_eq!(info.to_string(), "module-1 (0x06000001) \"Port 0\" QSFP28");
        assert!(matches!(
            board.info_get(Oid::module(2)),
            Ok(OidInfo::Module { present: false, identifier: None, .. })
        ));
        assert_eq!(board.info_get(Oid::module(5)), Err(StatusError::Param));
    }

    #[test]
    fn module_numbering() {
        assert_eq!(module_port(Oid::module(1)), Ok(0));
        assert_eq!(module_port(Oid::module(32)), Ok(31));
        assert_eq!(module_port(Oid::fan(1)), Err(StatusError::Param));
        assert_eq!(module_port(Oid::CHASSIS), Err(StatusError::Param));
        // the largest module index maps past any board, not into a wrapped port
        let mock = MockBoard::default();
        let board: &dyn Platform = &mock;
        let last = Oid::module(Oid::MAX_INDEX);
        assert_eq!(module_port(last), Ok(Oid::MAX_INDEX - 1));
        assert_eq!(board.info_get(last), Err(StatusError::Param));
    }
}

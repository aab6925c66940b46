// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The table driven platform: every board is this driver applied to a [`Board`].

use std::sync::Arc;

use platform::bmc::{BmcMode, BmcPresence, SysfsBmc};
use platform::chassis;
use platform::fan::{FanCaps, FanDriver, FanInfo, FanMode, FanStatus};
use platform::io::PlatformIo;
use platform::led::{LedCaps, LedDriver, LedInfo, LedMode, LedStatus};
use platform::locator::Locator;
use platform::manage::{self, FanDecision, FanManager};
use platform::onie::{HEADER_LEN, OnieError, OnieInfo};
use platform::psu::{PsuCaps, PsuDriver, PsuInfo, PsuStatus};
use platform::sfp::{
    DOM_ADDR, EEPROM_ADDR, EEPROM_SIZE, PortBitmap, SffIdentifier, SfpControl, SfpDriver,
};
use platform::sys::{PlatformInfo, SysDriver};
use platform::thermal::{ThermalDriver, ThermalInfo, ThermalStatus};
use platform::{Oid, OidHeader, OidType, Platform, Status, StatusError};
use sysfs::SysfsRoot;
use tracing::{debug, error, info, warn};

use crate::board::{Board, FanDirSource, PortLine, PortSignal, Signal};

/// A [`Board`] bound to a sysfs root.
#[derive(Debug)]
pub struct TablePlatform {
    board: &'static Board,
    io: PlatformIo,
    fan_manager: Option<FanManager>,
}

fn entry<T>(table: &'static [T], id: Oid, oid_type: OidType) -> Status<&'static T> {
    if !id.is(oid_type) {
        return Err(StatusError::Param);
    }
    table
        .get((id.index() as usize).wrapping_sub(1))
        .ok_or(StatusError::Param)
}

impl TablePlatform {
    /// Bind `board` to `root`; on boards with a BMC, `bmc` decides whether it is used.
    #[must_use]
    pub fn new(board: &'static Board, root: SysfsRoot, bmc: BmcMode) -> TablePlatform {
        let mut io = PlatformIo::new(root.clone());
        if let Some(desc) = board.bmc {
            io = io.with_bmc(
                Arc::new(SysfsBmc::new(root, desc.dir)),
                BmcPresence::new(bmc, Some(desc.probe)),
            );
        }
        TablePlatform {
            board,
            io,
            fan_manager: board.fan_policy.map(FanManager::new),
        }
    }

    #[must_use]
    pub fn board(&self) -> &'static Board {
        self.board
    }

    #[must_use]
    pub fn io(&self) -> &PlatformIo {
        &self.io
    }

    fn asserted(&self, signal: &Signal) -> Status<bool> {
        Ok(self
            .io
            .read_opt(&signal.at)?
            .is_some_and(|raw| (raw != 0) != signal.active_low))
    }

    /// A status line that reads inactive. A missing line reports nothing.
    fn deasserted(&self, signal: Option<&Signal>) -> Status<bool> {
        let Some(signal) = signal else {
            return Ok(false);
        };
        Ok(self
            .io
            .read_opt(&signal.at)?
            .is_some_and(|raw| (raw != 0) == signal.active_low))
    }

    fn string(&self, at: Option<&Locator>) -> String {
        match at.map(|at| self.io.read_str(at)) {
            Some(Ok(value)) => value,
            Some(Err(e)) if e != StatusError::Missing => {
                debug!("unable to read {at:?}: {e}");
                String::new()
            }
            _ => String::new(),
        }
    }

    fn chassis_hdr(&self) -> OidHeader {
        let board = self.board;
        let on_chassis = |parent: Oid| parent == Oid::CHASSIS;
        let thermals = (0..board.thermals.len())
            .filter(|i| on_chassis(board.thermals[*i].parent))
            .map(|i| Board::oid(OidType::Thermal, i));
        let fans = (0..board.fans.len())
            .filter(|i| on_chassis(board.fans[*i].parent))
            .map(|i| Board::oid(OidType::Fan, i));
        let psus = (0..board.psus.len()).map(|i| Board::oid(OidType::Psu, i));
        let leds = (0..board.leds.len()).map(|i| Board::oid(OidType::Led, i));
        let modules = (0..board.ports.count as usize).map(|i| Board::oid(OidType::Module, i));
        OidHeader::new(Oid::CHASSIS, "Chassis", Oid::CHASSIS)
            .with_children(thermals.chain(fans).chain(psus).chain(leds).chain(modules))
    }

    fn read_line(&self, line: &PortLine) -> Status<Option<bool>> {
        match line {
            PortLine::Attr { path, active_low } => match self.io.root().read_int(path) {
                Ok(raw) => Ok(Some((raw != 0) != *active_low)),
                Err(e) if e.is_not_found() => Ok(None),
                Err(e) => Err(e.into()),
            },
            PortLine::Gpio(gpio) => match gpio.is_asserted(self.io.root()) {
                Ok(asserted) => Ok(Some(asserted)),
                Err(e) if e.is_not_found() => Ok(None),
                Err(e) => Err(e.into()),
            },
        }
    }

    fn write_line(&self, line: &PortLine, asserted: bool) -> Status {
        match line {
            PortLine::Attr { path, active_low } => Ok(self
                .io
                .root()
                .write_int(path, i32::from(asserted != *active_low))?),
            PortLine::Gpio(gpio) => Ok(gpio.set_asserted(self.io.root(), asserted)?),
        }
    }

    fn port_line(&self, port: u32, signal: Option<&PortSignal>) -> Status<PortLine> {
        self.check_port(port)?;
        signal
            .and_then(|signal| signal.line(port))
            .ok_or(StatusError::Unsupported)
    }

    fn is_qsfp(&self, port: u32) -> bool {
        self.board.ports.qsfp.contains(port)
    }

    fn eeprom_path(&self, port: u32, addr: u8) -> Status<std::path::PathBuf> {
        self.check_port(port)?;
        let layout = &self.board.ports;
        let bus = layout.eeprom_bus.map(port).ok_or(StatusError::Param)?;
        match addr {
            EEPROM_ADDR => Ok(layout.eeprom.render(&[bus])),
            DOM_ADDR if !self.is_qsfp(port) => layout
                .dom
                .map(|dom| dom.render(&[bus]))
                .ok_or(StatusError::Unsupported),
            _ => Err(StatusError::Unsupported),
        }
    }

    fn read_page(&self, port: u32, addr: u8) -> Status<[u8; EEPROM_SIZE]> {
        let path = self.eeprom_path(port, addr)?;
        if !self.is_present(port)? {
            return Err(StatusError::Missing);
        }
        let bytes = self.io.root().read_bytes(&path, 0, EEPROM_SIZE)?;
        let mut page = [0; EEPROM_SIZE];
        page.copy_from_slice(&bytes);
        Ok(page)
    }
}

impl SysDriver for TablePlatform {
    fn platform_name(&self) -> &'static str {
        self.board.name
    }

    fn init(&self) -> Status {
        if let Err(e) = self.board.validate() {
            error!("{}: inconsistent board table: {e}", self.board.name);
            return Err(StatusError::Internal);
        }
        if self.board.bmc.is_some() {
            info!(
                "{}: BMC {}",
                self.board.name,
                if self.io.bmc_present() {
                    "present"
                } else {
                    "absent, reading sensors directly"
                }
            );
        }
        Ok(())
    }

    fn hdr_get(&self) -> Status<OidHeader> {
        Ok(self.chassis_hdr())
    }

    fn onie_data_get(&self) -> Status<OnieInfo> {
        let path = self.board.sys.onie_eeprom.ok_or(StatusError::Unsupported)?;
        let root = self.io.root();
        let invalid = |e: OnieError| {
            warn!("{path}: {e}");
            StatusError::from(e)
        };
        let header = root.read_bytes(path, 0, HEADER_LEN)?;
        let len = OnieInfo::image_len(&header).map_err(invalid)?;
        let image = root.read_bytes(path, 0, len)?;
        OnieInfo::decode(&image).map_err(invalid)
    }

    fn platform_info_get(&self) -> Status<PlatformInfo> {
        let versions = |table: &'static [(&'static str, Locator)]| {
            let mut out = Vec::with_capacity(table.len());
            for (name, at) in table {
                match self.io.read_str(at) {
                    Ok(version) => out.push(((*name).to_string(), version)),
                    Err(StatusError::Missing) => debug!("no version for {name}"),
                    Err(e) => return Err(e),
                }
            }
            Ok(out)
        };
        Ok(PlatformInfo {
            cpld_versions: versions(self.board.sys.cplds)?,
            other_versions: versions(self.board.sys.other_versions)?,
        })
    }

    fn oids_get(&self) -> Status<Vec<Oid>> {
        chassis::oids(self)
    }
}

impl ThermalDriver for TablePlatform {
    fn hdr_get(&self, id: Oid) -> Status<OidHeader> {
        let desc = entry(self.board.thermals, id, OidType::Thermal)?;
        Ok(OidHeader::new(id, desc.description, desc.parent))
    }

    fn info_get(&self, id: Oid) -> Status<ThermalInfo> {
        let desc = entry(self.board.thermals, id, OidType::Thermal)?;
        let mut info = ThermalInfo {
            hdr: OidHeader::new(id, desc.description, desc.parent),
            status: ThermalStatus::empty(),
            caps: desc.caps,
            mcelsius: 0,
            thresholds: desc.thresholds,
        };
        match self.io.read(&desc.input) {
            Ok(mcelsius) => {
                info.status = ThermalStatus::PRESENT;
                info.mcelsius = mcelsius;
            }
            Err(StatusError::Missing) => debug!("{id} not present"),
            Err(e) => {
                warn!("{id}: {e}");
                info.status = ThermalStatus::PRESENT | ThermalStatus::FAILED;
            }
        }
        Ok(info)
    }
}

impl FanDriver for TablePlatform {
    fn hdr_get(&self, id: Oid) -> Status<OidHeader> {
        let desc = entry(self.board.fans, id, OidType::Fan)?;
        Ok(OidHeader::new(id, desc.description, desc.parent))
    }

    fn info_get(&self, id: Oid) -> Status<FanInfo> {
        let desc = entry(self.board.fans, id, OidType::Fan)?;
        let mut info = FanInfo {
            hdr: OidHeader::new(id, desc.description, desc.parent),
            status: FanStatus::empty(),
            caps: desc.caps,
            rpm: 0,
            percentage: 0,
            mode: FanMode::Off,
            model: String::new(),
            serial: String::new(),
        };
        let present = match &desc.present {
            Some(signal) => self.asserted(signal)?,
            None => true,
        };
        if !present {
            return Ok(info);
        }
        info.status |= FanStatus::PRESENT;

        match desc.dir {
            FanDirSource::Unknown => {}
            FanDirSource::Fixed(dir) => info.status |= dir.status(),
            FanDirSource::Attr { at, f2b } => match self.io.read_opt(&at)? {
                Some(raw) if raw == f2b => info.status |= FanStatus::F2B,
                Some(_) => info.status |= FanStatus::B2F,
                None => {}
            },
        }

        if let Some(fault) = &desc.fault {
            if self.asserted(fault)? {
                info.status |= FanStatus::FAILED;
            }
        }
        if let Some(at) = &desc.rpm {
            if let Some(rpm) = self.io.read_opt(at)? {
                info.rpm = rpm;
                if rpm == 0 {
                    info.status |= FanStatus::FAILED;
                }
            }
        }

        let percentage = match &desc.percentage {
            Some(at) => self.io.read_opt(at)?,
            None if desc.max_rpm > 0 => {
                let derived = i64::from(info.rpm) * 100 / i64::from(desc.max_rpm);
                Some(i32::try_from(derived).unwrap_or(100))
            }
            None => None,
        };
        if let Some(percentage) = percentage {
            info.percentage = u8::try_from(percentage.clamp(0, 100)).unwrap_or(100);
        }
        info.mode = FanMode::from_percentage(info.percentage);

        info.model = self.string(desc.model.as_ref());
        info.serial = self.string(desc.serial.as_ref());
        Ok(info)
    }

    fn set_duty(&self, id: Oid, percentage: u8) -> Status {
        let desc = entry(self.board.fans, id, OidType::Fan)?;
        if !desc.caps.contains(FanCaps::SET_PERCENTAGE) {
            return Err(StatusError::Unsupported);
        }
        let at = desc.percentage.as_ref().ok_or(StatusError::Unsupported)?;
        debug!("{id} -> {percentage}%");
        self.io.write(at, i32::from(percentage))
    }
}

impl PsuDriver for TablePlatform {
    fn hdr_get(&self, id: Oid) -> Status<OidHeader> {
        let desc = entry(self.board.psus, id, OidType::Psu)?;
        Ok(OidHeader::new(id, desc.description, Oid::CHASSIS)
            .with_children([desc.fan, desc.thermal].into_iter().flatten()))
    }

    fn info_get(&self, id: Oid) -> Status<PsuInfo> {
        let desc = entry(self.board.psus, id, OidType::Psu)?;
        let mut info = PsuInfo::new(PsuDriver::hdr_get(self, id)?);
        info.caps = desc.caps;
        if !self.asserted(&desc.present)? {
            return Ok(info);
        }
        info.status = PsuStatus::PRESENT;
        let unplugged = self.deasserted(desc.input_good.as_ref())?;
        let failed = self.deasserted(desc.power_good.as_ref())?;
        if unplugged {
            info.status |= PsuStatus::UNPLUGGED;
        } else if failed {
            info.status |= PsuStatus::FAILED;
        }
        info.model = self.string(desc.model.as_ref());
        info.serial = self.string(desc.serial.as_ref());

        let Some(device) = desc.pmbus else {
            return Ok(info);
        };
        if info.status != PsuStatus::PRESENT {
            return Ok(info);
        }
        let readings: [(&'static str, PsuCaps, &mut i32, i32); 6] = [
            ("in1_input", PsuCaps::VIN, &mut info.mvin, 1),
            ("in2_input", PsuCaps::VOUT, &mut info.mvout, 1),
            ("curr1_input", PsuCaps::IIN, &mut info.miin, 1),
            ("curr2_input", PsuCaps::IOUT, &mut info.miout, 1),
            // µW
            ("power1_input", PsuCaps::PIN, &mut info.mpin, 1000),
            ("power2_input", PsuCaps::POUT, &mut info.mpout, 1000),
        ];
        let mut caps = PsuCaps::empty();
        for (attr, cap, value, divisor) in readings {
            match self.io.read(&Locator::Hwmon { device, attr }) {
                Ok(raw) => {
                    *value = raw / divisor;
                    caps |= cap;
                }
                Err(StatusError::Missing) => {}
                Err(e) => warn!("{id} {attr}: {e}"),
            }
        }
        info.caps |= caps;
        Ok(info)
    }
}

impl LedDriver for TablePlatform {
    fn hdr_get(&self, id: Oid) -> Status<OidHeader> {
        let desc = entry(self.board.leds, id, OidType::Led)?;
        Ok(OidHeader::new(id, desc.description, Oid::CHASSIS))
    }

    fn info_get(&self, id: Oid) -> Status<LedInfo> {
        let desc = entry(self.board.leds, id, OidType::Led)?;
        let mut info = LedInfo {
            hdr: OidHeader::new(id, desc.description, Oid::CHASSIS),
            status: LedStatus::empty(),
            caps: LedCaps::of(desc.modes.iter().map(|(_, mode)| *mode)),
            mode: LedMode::Off,
        };
        let Some(raw) = self.io.read_opt(&desc.at)? else {
            return Ok(info);
        };
        info.status = LedStatus::PRESENT;
        match desc.modes.iter().find(|(value, _)| *value == raw) {
            Some((_, mode)) => info.mode = *mode,
            None => debug!("{id}: unknown raw value {raw:#x}"),
        }
        if info.mode != LedMode::Off {
            info.status |= LedStatus::ON;
        }
        Ok(info)
    }

    fn mode_set(&self, id: Oid, mode: LedMode) -> Status {
        let desc = entry(self.board.leds, id, OidType::Led)?;
        let (raw, _) = desc
            .modes
            .iter()
            .find(|(_, m)| *m == mode)
            .ok_or(StatusError::Unsupported)?;
        self.io.write(&desc.at, *raw)
    }
}

impl SfpDriver for TablePlatform {
    fn init(&self) -> Status {
        let root = self.io.root();
        for signal in self.board.ports.signals() {
            for gpio in signal.gpios() {
                if let Err(e) = gpio.export(root) {
                    warn!("unable to export gpio {}: {e}", gpio.number());
                }
            }
        }
        Ok(())
    }

    fn bitmap_get(&self) -> PortBitmap {
        (0..self.board.ports.count).collect()
    }

    fn check_port(&self, port: u32) -> Status {
        if port < self.board.ports.count {
            Ok(())
        } else {
            Err(StatusError::Param)
        }
    }

    fn is_present(&self, port: u32) -> Status<bool> {
        let line = self.port_line(port, Some(&self.board.ports.present))?;
        Ok(self.read_line(&line)?.unwrap_or(false))
    }

    fn eeprom_read(&self, port: u32) -> Status<[u8; EEPROM_SIZE]> {
        self.read_page(port, EEPROM_ADDR)
    }

    fn dom_read(&self, port: u32) -> Status<[u8; EEPROM_SIZE]> {
        self.read_page(port, DOM_ADDR)
    }

    fn dev_readb(&self, port: u32, addr: u8, offset: u8) -> Status<u8> {
        let path = self.eeprom_path(port, addr)?;
        let bytes = self.io.root().read_bytes(path, u64::from(offset), 1)?;
        bytes.first().copied().ok_or(StatusError::I2c)
    }

    fn dev_writeb(&self, port: u32, addr: u8, offset: u8, value: u8) -> Status {
        let path = self.eeprom_path(port, addr)?;
        Ok(self
            .io
            .root()
            .write_bytes(path, u64::from(offset), &[value])?)
    }

    fn control_set(&self, port: u32, control: SfpControl, value: i32) -> Status {
        let layout = &self.board.ports;
        let signal = match control {
            SfpControl::Reset | SfpControl::ResetState => layout.reset.as_ref(),
            SfpControl::TxDisable => layout.tx_disable.as_ref(),
            SfpControl::LpMode => layout.lp_mode.as_ref(),
            SfpControl::RxLos | SfpControl::TxFault | SfpControl::PowerOverride => None,
        };
        let line = self.port_line(port, signal)?;
        debug!("port {port}: {control} <- {value}");
        if control == SfpControl::Reset {
            // pulse
            self.write_line(&line, true)?;
            return self.write_line(&line, false);
        }
        self.write_line(&line, value != 0)
    }

    fn control_get(&self, port: u32, control: SfpControl) -> Status<i32> {
        let layout = &self.board.ports;
        let signal = match control {
            SfpControl::Reset | SfpControl::ResetState => layout.reset.as_ref(),
            SfpControl::RxLos => layout.rx_los.as_ref(),
            SfpControl::TxFault => layout.tx_fault.as_ref(),
            SfpControl::TxDisable => layout.tx_disable.as_ref(),
            SfpControl::LpMode => layout.lp_mode.as_ref(),
            SfpControl::PowerOverride => None,
        };
        let line = self.port_line(port, signal)?;
        let asserted = self.read_line(&line)?.ok_or(StatusError::Missing)?;
        Ok(i32::from(asserted))
    }

    fn post_insert(&self, port: u32) -> Status {
        let page = self.eeprom_read(port)?;
        info!("port {port}: {} inserted", SffIdentifier::of_eeprom(&page));
        Ok(())
    }
}

impl Platform for TablePlatform {
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

    fn manage_fans(&self) -> Status<FanDecision> {
        self.fan_manager
            .as_ref()
            .ok_or(StatusError::Unsupported)?
            .run(self)
    }

    fn manage_leds(&self) -> Status {
        let roles = self.board.led_roles.ok_or(StatusError::Unsupported)?;
        manage::manage_leds(self, &roles)
    }
}

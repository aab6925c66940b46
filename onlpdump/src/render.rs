// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Text rendering of platform objects.

use std::fmt::Write;

use platform::chassis;
use platform::platform::module_port;
use platform::sfp::{EEPROM_SIZE, SfpControl};
use platform::{Oid, OidInfo, OidType, Platform, Status, StatusError};
use tracing::debug;

/// The whole object tree, one object per line, children indented under their parent.
pub(crate) fn tree(platform: &dyn Platform) -> Status<String> {
    let mut out = String::new();
    for entry in chassis::walk(platform)? {
        let indent = "  ".repeat(entry.depth);
        match platform.info_get(entry.hdr.id) {
            Ok(info) => {
                let _ = writeln!(out, "{indent}{info}");
            }
            Err(e) => {
                let _ = writeln!(out, "{indent}{}: {e}", entry.hdr);
            }
        }
    }
    Ok(out)
}

/// One object with the list of its children.
pub(crate) fn object(platform: &dyn Platform, id: Oid) -> Status<String> {
    let info = platform.info_get(id)?;
    let mut out = format!("{info}\n");
    let hdr = info.hdr();
    if hdr.parent != id {
        let _ = writeln!(out, "  parent: {}", hdr.parent);
    }
    if !hdr.children.is_empty() {
        let children: Vec<String> = hdr.children.iter().map(ToString::to_string).collect();
        let _ = writeln!(out, "  children: {}", children.join(", "));
    }
    if id.is(OidType::Module) {
        let port = module_port(id)?;
        for control in [
            SfpControl::ResetState,
            SfpControl::LpMode,
            SfpControl::TxDisable,
            SfpControl::RxLos,
        ] {
            match platform.sfp().control_get(port, control) {
                Ok(value) => {
                    let _ = writeln!(out, "  {control}: {value}");
                }
                Err(StatusError::Unsupported) => {}
                Err(e) => debug!("port {port} {control}: {e}"),
            }
        }
    }
    Ok(out)
}

/// Port bitmaps, then the module type of each plugged port.
pub(crate) fn sfp(platform: &dyn Platform) -> Status<String> {
    let sfp = platform.sfp();
    let present = sfp.presence_bitmap_get()?;
    let mut out = String::new();
    let _ = writeln!(out, "ports:   {}", sfp.bitmap_get());
    let _ = writeln!(out, "present: {present}");
    let _ = writeln!(out, "rx-los:  {}", sfp.rx_los_bitmap_get()?);
    for port in present.iter() {
        let module = Oid::new(OidType::Module, port + 1).map_err(|_| StatusError::Param)?;
        match platform.info_get(module)? {
            OidInfo::Module {
                identifier: Some(identifier),
                ..
            } => {
                let _ = writeln!(out, "port {port}: {identifier}");
            }
            _ => {
                let _ = writeln!(out, "port {port}: unreadable");
            }
        }
    }
    Ok(out)
}

/// Classic 16 bytes per line hex dump.
pub(crate) fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 4);
    for (line, chunk) in bytes.chunks(16).enumerate() {
        let _ = write!(out, "{:04x}:", line * 16);
        for byte in chunk {
            let _ = write!(out, " {byte:02x}");
        }
        for _ in chunk.len()..16 {
            out.push_str("   ");
        }
        out.push_str("  ");
        out.extend(chunk.iter().map(|&byte| {
            if byte.is_ascii_graphic() || byte == b' ' {
                char::from(byte)
            } else {
                '.'
            }
        }));
        out.push('\n');
    }
    out
}

/// An EEPROM page of the module in `port`.
pub(crate) fn eeprom(platform: &dyn Platform, port: u32, dom: bool) -> Status<String> {
    let page: [u8; EEPROM_SIZE] = if dom {
        platform.sfp().dom_read(port)?
    } else {
        platform.sfp().eeprom_read(port)?
    };
    Ok(hex_dump(&page))
}

/// The ONIE system EEPROM and the firmware versions.
pub(crate) fn onie(platform: &dyn Platform) -> Status<String> {
    let mut out = format!("platform: {}\n", platform.name());
    match platform.sys().onie_data_get() {
        Ok(onie) => {
            let _ = writeln!(out, "{onie}");
        }
        Err(e) => {
            let _ = writeln!(out, "ONIE EEPROM: {e}");
        }
    }
    let _ = writeln!(out, "{}", platform.sys().platform_info_get()?);
    Ok(out)
}

/// One fan and LED management pass.
pub(crate) fn manage(platform: &dyn Platform) -> Status<String> {
    let mut out = String::new();
    match platform.manage_fans() {
        Ok(decision) => {
            let _ = writeln!(out, "fans: {decision}");
        }
        Err(StatusError::Unsupported) => out.push_str("fans: not managed on this platform\n"),
        Err(e) => return Err(e),
    }
    match platform.manage_leds() {
        Ok(()) => out.push_str("leds: updated\n"),
        Err(StatusError::Unsupported) => out.push_str("leds: not managed on this platform\n"),
        Err(e) => return Err(e),
    }
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;
    use platform::bmc::BmcMode;
    use platforms::TablePlatform;
    use pretty_assertions::assert_eq;
    use test_utils::FakeSysfs;

    fn qs32(fake: &FakeSysfs) -> TablePlatform {
        let board = platforms::find("x86-64-ref-qs32-r0").unwrap();
        TablePlatform::new(board, fake.root(), BmcMode::Absent)
    }

    #[test]
    fn hex() {
        let dump = hex_dump(b"QSFP28 module\x00\x01\x02\x03\x04");
        assert_eq!(
            dump,
            "0000: 51 53 46 50 32 38 20 6d 6f 64 75 6c 65 00 01 02  QSFP28 module...\n\
             0010: 03 04                                            ..\n"
        );
    }

    #[test]
    fn tree_of_an_empty_board() {
        let fake = FakeSysfs::new();
        let qs32 = qs32(&fake);
        let out = tree(&qs32).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("sys-1 (0x01000001) \"Chassis\""));
        assert!(lines[1].starts_with("  thermal-1 "));
        assert!(lines[1].ends_with("not present"));
        assert!(lines.iter().any(|l| l.starts_with("    fan-6 ")));
        assert!(lines.last().unwrap().contains("module-32"));
    }

    #[test]
    fn objects_and_ports() {
        let fake = FakeSysfs::new();
        fake.write("/sys/bus/i2c/devices/11-0060/module_present_1", "1");
        fake.write("/sys/bus/i2c/devices/11-0060/module_reset_1", "1");
        fake.write_bytes("/sys/bus/i2c/devices/26-0050/eeprom", &[0x11; EEPROM_SIZE]);
        let qs32 = qs32(&fake);

        let out = object(&qs32, Oid::psu(1)).unwrap();
        assert!(out.contains("children: fan-6, thermal-5"));
        let out = object(&qs32, Oid::module(1)).unwrap();
        assert!(out.contains("reset-state: 0"));

        let out = sfp(&qs32).unwrap();
        assert!(out.contains("ports:   0-31\n"));
        assert!(out.contains("present: 0\n"));
        assert!(out.contains("port 0: QSFP28\n"));

        let dump = eeprom(&qs32, 0, false).unwrap();
        assert_eq!(dump.lines().count(), EEPROM_SIZE / 16);
        assert_eq!(eeprom(&qs32, 0, true), Err(StatusError::Unsupported));
        assert_eq!(object(&qs32, Oid::fan(9)), Err(StatusError::Param));
    }

    #[test]
    fn management_pass() {
        let fake = FakeSysfs::new();
        for led in ["led_fan", "led_psu1", "led_psu2"] {
            fake.write(format!("/sys/devices/platform/qs32_led/{led}"), "0");
        }
        let qs32 = qs32(&fake);
        // no sensor and no fan
        let out = manage(&qs32).unwrap();
        assert_eq!(
            out,
            "fans: no readable sensor, fans at 100% (failsafe)\nleds: updated\n"
        );
        assert_eq!(fake.read("/sys/devices/platform/qs32_led/led_fan"), "2");
    }
}

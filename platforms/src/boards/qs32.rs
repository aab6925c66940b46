// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! `x86-64-ref-qs32-r0`: 32 QSFP28 ports, no BMC.
//!
//! Ports 0-15 hang off the CPLD at 11-0060 and ports 16-31 off the CPLD at 12-0062; the
//! module EEPROMs sit behind muxes whose bus numbers are not in port order. Fans are driven by
//! the fan CPLD at 2-0066 and share one duty cycle.

use platform::Oid;
use platform::fan::{FanCaps, FanDir};
use platform::led::LedMode;
use platform::locator::{Locator, PathTemplate, RangeMap, Segment};
use platform::manage::{FanPolicy, FanStep, LedRoles};
use platform::psu::PsuCaps;
use platform::thermal::{ThermalCaps, Thresholds};

use crate::board::{
    Board, FanDesc, FanDirSource, LedDesc, PortLayout, PortSignal, PsuDesc, Signal, SysDesc,
    ThermalDesc,
};
use crate::register_board;

const CPLD1: &str = "/sys/bus/i2c/devices/11-0060";
const CPLD2: &str = "/sys/bus/i2c/devices/12-0062";

const SENSOR_CAPS: ThermalCaps = ThermalCaps::GET_TEMPERATURE.union(ThermalCaps::GET_ALL_THRESHOLDS);
const BOARD_LIMITS: Thresholds = Thresholds::new(60_000, 70_000, 80_000);

const fn lm75(description: &'static str, device: &'static str) -> ThermalDesc {
    ThermalDesc {
        description,
        parent: Oid::CHASSIS,
        input: Locator::Hwmon {
            device,
            attr: "temp1_input",
        },
        caps: SENSOR_CAPS,
        thresholds: BOARD_LIMITS,
    }
}

const fn psu_thermal(description: &'static str, psu: u32, device: &'static str) -> ThermalDesc {
    ThermalDesc {
        description,
        parent: Oid::psu(psu),
        input: Locator::Hwmon {
            device,
            attr: "temp1_input",
        },
        caps: ThermalCaps::GET_TEMPERATURE,
        thresholds: Thresholds::new(0, 0, 0),
    }
}

static THERMALS: [ThermalDesc; 6] = [
    ThermalDesc {
        description: "CPU Core",
        parent: Oid::CHASSIS,
        input: Locator::Hwmon {
            device: "/sys/devices/platform/coretemp.0",
            attr: "temp1_input",
        },
        caps: SENSOR_CAPS,
        thresholds: Thresholds::new(82_000, 92_000, 102_000),
    },
    lm75("Main Board MAC (LM75 3-0048)", "/sys/bus/i2c/devices/3-0048"),
    lm75("Main Board Front (LM75 3-0049)", "/sys/bus/i2c/devices/3-0049"),
    lm75("Main Board Rear (LM75 3-004a)", "/sys/bus/i2c/devices/3-004a"),
    psu_thermal("PSU-1 Thermal Sensor 1", 1, "/sys/bus/i2c/devices/10-0058"),
    psu_thermal("PSU-2 Thermal Sensor 1", 2, "/sys/bus/i2c/devices/9-0059"),
];

macro_rules! chassis_fan {
    ($n:literal) => {
        FanDesc {
            description: concat!("Chassis Fan - ", $n),
            parent: Oid::CHASSIS,
            caps: FanCaps::SET_PERCENTAGE
                .union(FanCaps::GET_RPM)
                .union(FanCaps::GET_PERCENTAGE)
                .union(FanCaps::F2B)
                .union(FanCaps::B2F),
            present: Some(Signal::high(Locator::File(concat!(
                "/sys/bus/i2c/devices/2-0066/fan",
                $n,
                "_present"
            )))),
            fault: Some(Signal::high(Locator::File(concat!(
                "/sys/bus/i2c/devices/2-0066/fan",
                $n,
                "_fault"
            )))),
            rpm: Some(Locator::File(concat!(
                "/sys/bus/i2c/devices/2-0066/fan",
                $n,
                "_front_speed_rpm"
            ))),
            percentage: Some(Locator::File(
                "/sys/bus/i2c/devices/2-0066/fan_duty_cycle_percentage",
            )),
            max_rpm: 0,
            dir: FanDirSource::Attr {
                at: Locator::File(concat!(
                    "/sys/bus/i2c/devices/2-0066/fan",
                    $n,
                    "_direction"
                )),
                f2b: 1,
            },
            model: None,
            serial: None,
        }
    };
}

const fn psu_fan(description: &'static str, psu: u32, rpm: &'static str) -> FanDesc {
    FanDesc {
        description,
        parent: Oid::psu(psu),
        caps: FanCaps::GET_RPM.union(FanCaps::GET_PERCENTAGE),
        present: None,
        fault: None,
        rpm: Some(Locator::File(rpm)),
        percentage: None,
        max_rpm: 21_000,
        dir: FanDirSource::Fixed(FanDir::F2B),
        model: None,
        serial: None,
    }
}

static FANS: [FanDesc; 7] = [
    chassis_fan!(1),
    chassis_fan!(2),
    chassis_fan!(3),
    chassis_fan!(4),
    chassis_fan!(5),
    psu_fan(
        "PSU-1 Fan 1",
        1,
        "/sys/bus/i2c/devices/10-0058/psu_fan1_speed_rpm",
    ),
    psu_fan(
        "PSU-2 Fan 1",
        2,
        "/sys/bus/i2c/devices/9-0059/psu_fan1_speed_rpm",
    ),
];

static PSUS: [PsuDesc; 2] = [
    PsuDesc {
        description: "PSU-1",
        caps: PsuCaps::AC,
        present: Signal::high(Locator::File("/sys/bus/i2c/devices/10-0050/psu_present")),
        power_good: Some(Signal::high(Locator::File(
            "/sys/bus/i2c/devices/10-0050/psu_power_good",
        ))),
        input_good: None,
        pmbus: Some("/sys/bus/i2c/devices/10-0058"),
        model: Some(Locator::File("/sys/bus/i2c/devices/10-0050/psu_model_name")),
        serial: Some(Locator::File("/sys/bus/i2c/devices/10-0058/psu_serial_number")),
        fan: Some(Oid::fan(6)),
        thermal: Some(Oid::thermal(5)),
    },
    PsuDesc {
        description: "PSU-2",
        caps: PsuCaps::AC,
        present: Signal::high(Locator::File("/sys/bus/i2c/devices/9-0050/psu_present")),
        power_good: Some(Signal::high(Locator::File(
            "/sys/bus/i2c/devices/9-0050/psu_power_good",
        ))),
        input_good: None,
        pmbus: Some("/sys/bus/i2c/devices/9-0059"),
        model: Some(Locator::File("/sys/bus/i2c/devices/9-0050/psu_model_name")),
        serial: Some(Locator::File("/sys/bus/i2c/devices/9-0059/psu_serial_number")),
        fan: Some(Oid::fan(7)),
        thermal: Some(Oid::thermal(6)),
    },
];

const STATUS_MODES: &[(i32, LedMode)] = &[
    (0, LedMode::Off),
    (1, LedMode::Green),
    (2, LedMode::Orange),
    (3, LedMode::Auto),
];

static LEDS: [LedDesc; 5] = [
    LedDesc {
        description: "Diag LED",
        at: Locator::File("/sys/devices/platform/qs32_led/led_diag"),
        modes: &[
            (0, LedMode::Off),
            (1, LedMode::Green),
            (2, LedMode::Orange),
            (3, LedMode::GreenBlinking),
        ],
    },
    LedDesc {
        description: "Locator LED",
        at: Locator::File("/sys/devices/platform/qs32_led/led_loc"),
        modes: &[(0, LedMode::Off), (1, LedMode::Blue), (2, LedMode::BlueBlinking)],
    },
    LedDesc {
        description: "Fan LED",
        at: Locator::File("/sys/devices/platform/qs32_led/led_fan"),
        modes: STATUS_MODES,
    },
    LedDesc {
        description: "PSU-1 LED",
        at: Locator::File("/sys/devices/platform/qs32_led/led_psu1"),
        modes: STATUS_MODES,
    },
    LedDesc {
        description: "PSU-2 LED",
        at: Locator::File("/sys/devices/platform/qs32_led/led_psu2"),
        modes: STATUS_MODES,
    },
];

/// Ports 0-15 are attributes 1-16 of CPLD1, ports 16-31 attributes 17-32 of CPLD2.
const CPLD_PORTS: RangeMap = RangeMap::new(&[Segment::new(0, 15, 1), Segment::new(16, 31, 17)]);

const fn cpld_signal(attr: &'static str, active_low: bool) -> PortSignal {
    PortSignal::Cpld {
        ranges: CPLD_PORTS,
        dirs: &[CPLD1, CPLD2],
        attr: PathTemplate::new(attr),
        active_low,
    }
}

static STEPS: [FanStep; 3] = [
    FanStep {
        mcelsius: 50_000,
        percentage: 60,
    },
    FanStep {
        mcelsius: 60_000,
        percentage: 80,
    },
    FanStep {
        mcelsius: 68_000,
        percentage: 100,
    },
];

pub static BOARD: Board = Board {
    name: "x86-64-ref-qs32-r0",
    sys: SysDesc {
        onie_eeprom: Some("/sys/bus/i2c/devices/1-0057/eeprom"),
        cplds: &[
            ("CPLD1", Locator::File("/sys/bus/i2c/devices/11-0060/version")),
            ("CPLD2", Locator::File("/sys/bus/i2c/devices/12-0062/version")),
            ("FAN-CPLD", Locator::File("/sys/bus/i2c/devices/2-0066/version")),
        ],
        other_versions: &[],
    },
    thermals: &THERMALS,
    fans: &FANS,
    psus: &PSUS,
    leds: &LEDS,
    ports: PortLayout {
        count: 32,
        qsfp: RangeMap::new(&[Segment::new(0, 31, 0)]),
        present: cpld_signal("module_present_{}", false),
        rx_los: None,
        tx_fault: None,
        tx_disable: None,
        // the reset attributes read 0 while the module is held in reset
        reset: Some(cpld_signal("module_reset_{}", true)),
        lp_mode: Some(cpld_signal("module_lp_mode_{}", false)),
        eeprom_bus: RangeMap::new(&[
            Segment::new(0, 7, 26),
            Segment::new(8, 15, 18),
            Segment::new(16, 23, 42),
            Segment::new(24, 31, 34),
        ]),
        eeprom: PathTemplate::new("/sys/bus/i2c/devices/{}-0050/eeprom"),
        dom: None,
    },
    bmc: None,
    fan_policy: Some(FanPolicy {
        steps: &STEPS,
        hysteresis: 3_000,
        failsafe: 100,
        floor: 40,
    }),
    led_roles: Some(LedRoles {
        fan: Some(Oid::led(3)),
        psus: &[(Oid::psu(1), Oid::led(4)), (Oid::psu(2), Oid::led(5))],
    }),
};

register_board!(BOARD);

#[cfg(test)]
mod test {
    use super::*;
    use crate::driver::TablePlatform;
    use platform::bmc::BmcMode;
    use platform::fan::FanStatus;
    use platform::psu::PsuStatus;
    use platform::sfp::{EEPROM_SIZE, SfpControl};
    use platform::thermal::ThermalStatus;
    use platform::{OidInfo, Platform, StatusError};
    use pretty_assertions::assert_eq;
    use test_utils::FakeSysfs;
    use tracing_test::traced_test;

    const FAN_CPLD: &str = "/sys/bus/i2c/devices/2-0066";
    const LED_DIR: &str = "/sys/devices/platform/qs32_led";

    /// A populated qs32: all fans and both PSUs fitted, modules in ports 0, 9 and 31.
    fn populated() -> FakeSysfs {
        let fake = FakeSysfs::new();
        fake.hwmon("/sys/devices/platform/coretemp.0", 1, "temp1_input", "45000");
        fake.hwmon("/sys/bus/i2c/devices/3-0048", 3, "temp1_input", "38500");
        fake.hwmon("/sys/bus/i2c/devices/3-0049", 4, "temp1_input", "33000");
        // 3-004a is not fitted
        for n in 1..=5 {
            fake.write(format!("{FAN_CPLD}/fan{n}_present"), "1");
            fake.write(format!("{FAN_CPLD}/fan{n}_fault"), "0");
            fake.write(format!("{FAN_CPLD}/fan{n}_front_speed_rpm"), "9600");
            fake.write(format!("{FAN_CPLD}/fan{n}_direction"), "1");
        }
        fake.write(format!("{FAN_CPLD}/fan_duty_cycle_percentage"), "50");
        for (cpld, bus, pmbus) in [("10-0050", 10, "10-0058"), ("9-0050", 9, "9-0059")] {
            let dir = format!("/sys/bus/i2c/devices/{cpld}");
            fake.write(format!("{dir}/psu_present"), "1");
            fake.write(format!("{dir}/psu_power_good"), "1");
            fake.write(format!("{dir}/psu_model_name"), "PSU-650W-F2B");
            let pmbus = format!("/sys/bus/i2c/devices/{pmbus}");
            fake.write(format!("{pmbus}/psu_serial_number"), &format!("SN-PSU-{bus}"));
            fake.write(format!("{pmbus}/psu_fan1_speed_rpm"), "10500");
            for (attr, value) in [
                ("in1_input", "229000"),
                ("in2_input", "12100"),
                ("curr1_input", "700"),
                ("curr2_input", "12500"),
                ("power1_input", "160000000"),
                ("power2_input", "151250000"),
                ("temp1_input", "31000"),
            ] {
                fake.hwmon(&pmbus, 0, attr, value);
            }
        }
        for led in ["diag", "loc", "fan", "psu1", "psu2"] {
            fake.write(format!("{LED_DIR}/led_{led}"), "0");
        }
        for port in 1..=32 {
            let cpld = if port <= 16 { CPLD1 } else { CPLD2 };
            let present = if [1, 10, 32].contains(&port) { "1" } else { "0" };
            fake.write(format!("{cpld}/module_present_{port}"), present);
            fake.write(format!("{cpld}/module_reset_{port}"), "1");
            fake.write(format!("{cpld}/module_lp_mode_{port}"), "0");
        }
        fake
    }

    fn qs32(fake: &FakeSysfs) -> TablePlatform {
        TablePlatform::new(&BOARD, fake.root(), BmcMode::Auto)
    }

    #[test]
    fn chassis_tree() {
        let fake = populated();
        let qs32 = qs32(&fake);
        let platform: &dyn Platform = &qs32;
        platform.init().unwrap();
        assert_eq!(platform.name(), "x86-64-ref-qs32-r0");
        let chassis = platform.hdr_get(Oid::CHASSIS).unwrap();
        // 4 board thermals, 5 chassis fans, 2 PSUs, 5 LEDs, 32 modules
        assert_eq!(chassis.children.len(), 48);
        assert!(!chassis.children.contains(&Oid::fan(6)));
        let all = platform.sys().oids_get().unwrap();
        assert_eq!(all.len(), 52);
        let psu1 = all.iter().position(|id| *id == Oid::psu(1)).unwrap();
        assert_eq!(&all[psu1..psu1 + 3], &[Oid::psu(1), Oid::fan(6), Oid::thermal(5)]);
    }

    #[test]
    #[traced_test]
    fn thermals_degrade_when_absent() {
        let fake = populated();
        let qs32 = qs32(&fake);
        let platform: &dyn Platform = &qs32;
        let mac = platform.thermal().info_get(Oid::thermal(2)).unwrap();
        assert_eq!(mac.status, ThermalStatus::PRESENT);
        assert_eq!(mac.mcelsius, 38_500);
        assert_eq!(mac.thresholds, BOARD_LIMITS);

        let rear = platform.thermal().info_get(Oid::thermal(4)).unwrap();
        assert_eq!(rear.status, ThermalStatus::empty());
        assert_eq!(rear.level(), None);

        fake.hwmon("/sys/bus/i2c/devices/3-0049", 4, "temp1_input", "n/a");
        let front = platform.thermal().info_get(Oid::thermal(3)).unwrap();
        assert_eq!(front.status, ThermalStatus::PRESENT | ThermalStatus::FAILED);
        assert!(logs_contain("thermal-3"));

        assert_eq!(
            platform.thermal().info_get(Oid::thermal(7)),
            Err(StatusError::Param)
        );
        assert_eq!(
            platform.thermal().info_get(Oid::fan(1)),
            Err(StatusError::Param)
        );
    }

    #[test]
    fn fans() {
        let fake = populated();
        let qs32 = qs32(&fake);
        let platform: &dyn Platform = &qs32;
        let fan = platform.fan().info_get(Oid::fan(2)).unwrap();
        assert_eq!(fan.status, FanStatus::PRESENT | FanStatus::F2B);
        assert_eq!((fan.rpm, fan.percentage), (9600, 50));

        fake.write(format!("{FAN_CPLD}/fan3_direction"), "0");
        fake.write(format!("{FAN_CPLD}/fan3_fault"), "1");
        let fan = platform.fan().info_get(Oid::fan(3)).unwrap();
        assert_eq!(
            fan.status,
            FanStatus::PRESENT | FanStatus::B2F | FanStatus::FAILED
        );

        fake.write(format!("{FAN_CPLD}/fan4_present"), "0");
        assert_eq!(
            platform.fan().status_get(Oid::fan(4)),
            Ok(FanStatus::empty())
        );

        // stopped rotor
        fake.write(format!("{FAN_CPLD}/fan5_front_speed_rpm"), "0");
        assert!(
            platform
                .fan()
                .status_get(Oid::fan(5))
                .unwrap()
                .contains(FanStatus::FAILED)
        );

        platform.fan().percentage_set(Oid::fan(1), 75).unwrap();
        assert_eq!(fake.read(format!("{FAN_CPLD}/fan_duty_cycle_percentage")), "75");
        assert_eq!(
            platform.fan().percentage_set(Oid::fan(1), 120),
            Err(StatusError::Param)
        );

        // PSU fan: duty derived from rpm, not settable
        let psu_fan = platform.fan().info_get(Oid::fan(6)).unwrap();
        assert_eq!(psu_fan.hdr.parent, Oid::psu(1));
        assert_eq!((psu_fan.rpm, psu_fan.percentage), (10500, 50));
        assert_eq!(
            platform.fan().percentage_set(Oid::fan(6), 50),
            Err(StatusError::Unsupported)
        );
    }

    #[test]
    fn psus() {
        let fake = populated();
        let qs32 = qs32(&fake);
        let platform: &dyn Platform = &qs32;
        let psu = platform.psu().info_get(Oid::psu(1)).unwrap();
        assert_eq!(psu.status, PsuStatus::PRESENT);
        assert_eq!(psu.model, "PSU-650W-F2B");
        assert_eq!(psu.serial, "SN-PSU-10");
        assert_eq!((psu.mvin, psu.mvout), (229_000, 12_100));
        assert_eq!((psu.miin, psu.miout), (700, 12_500));
        assert_eq!((psu.mpin, psu.mpout), (160_000, 151_250));
        assert!(psu.caps.contains(PsuCaps::AC | PsuCaps::VIN | PsuCaps::POUT));
        assert_eq!(psu.hdr.children, vec![Oid::fan(6), Oid::thermal(5)]);

        fake.write("/sys/bus/i2c/devices/9-0050/psu_power_good", "0");
        let psu = platform.psu().info_get(Oid::psu(2)).unwrap();
        assert_eq!(psu.status, PsuStatus::PRESENT | PsuStatus::FAILED);
        // no electrical readings from a failed supply
        assert_eq!(psu.caps, PsuCaps::AC);

        fake.write("/sys/bus/i2c/devices/9-0050/psu_present", "0");
        let psu = platform.psu().info_get(Oid::psu(2)).unwrap();
        assert_eq!(psu.status, PsuStatus::empty());
        assert_eq!(psu.model, "");
    }

    #[test]
    fn leds() {
        let fake = populated();
        let qs32 = qs32(&fake);
        let platform: &dyn Platform = &qs32;
        platform.led().mode_set(Oid::led(1), LedMode::GreenBlinking).unwrap();
        assert_eq!(fake.read(format!("{LED_DIR}/led_diag")), "3");
        let diag = platform.led().info_get(Oid::led(1)).unwrap();
        assert_eq!(diag.mode, LedMode::GreenBlinking);
        assert_eq!(
            platform.led().mode_set(Oid::led(2), LedMode::Green),
            Err(StatusError::Unsupported)
        );
        // unknown register value
        fake.write(format!("{LED_DIR}/led_loc"), "7");
        let loc = platform.led().info_get(Oid::led(2)).unwrap();
        assert_eq!(loc.mode, LedMode::Off);
        assert!(loc.caps.contains(LedMode::BlueBlinking.cap()));
        platform.led().set(Oid::led(2), false).unwrap();
        assert_eq!(fake.read(format!("{LED_DIR}/led_loc")), "0");
    }

    #[test]
    fn sfp() {
        let fake = populated();
        let qs32 = qs32(&fake);
        let sfp = qs32.sfp();
        assert_eq!(sfp.bitmap_get().count(), 32);
        assert_eq!(sfp.presence_bitmap_get().unwrap().to_string(), "0,9,31");
        // QSFP ports report no rx-los
        assert!(sfp.rx_los_bitmap_get().unwrap().is_empty());
        assert_eq!(sfp.is_present(32), Err(StatusError::Param));

        // port 9 is on bus 19, port 31 on bus 41
        let mut page = vec![0u8; EEPROM_SIZE];
        page[0] = 0x11;
        page[1] = 0x07;
        fake.write_bytes("/sys/bus/i2c/devices/19-0050/eeprom", &page);
        fake.write_bytes("/sys/bus/i2c/devices/41-0050/eeprom", &[0x0d; EEPROM_SIZE]);
        assert_eq!(sfp.eeprom_read(9).unwrap()[..2], [0x11, 0x07]);
        assert_eq!(sfp.dev_readb(9, 0x50, 1), Ok(0x07));
        assert_eq!(sfp.eeprom_read(1), Err(StatusError::Missing));
        assert_eq!(sfp.dom_read(9), Err(StatusError::Unsupported));
        let platform: &dyn Platform = &qs32;
        assert!(matches!(
            platform.info_get(Oid::module(32)),
            Ok(OidInfo::Module { present: true, identifier: Some(_), .. })
        ));
        sfp.dev_writeb(9, 0x50, 127, 0xaa).unwrap();
        assert_eq!(sfp.dev_readb(9, 0x50, 127), Ok(0xaa));

        sfp.control_set(20, SfpControl::LpMode, 1).unwrap();
        assert_eq!(fake.read(format!("{CPLD2}/module_lp_mode_21")), "1");
        assert_eq!(sfp.control_get(20, SfpControl::LpMode), Ok(1));
        // reset is active low
        assert_eq!(sfp.control_get(3, SfpControl::ResetState), Ok(0));
        sfp.control_set(3, SfpControl::ResetState, 1).unwrap();
        assert_eq!(fake.read(format!("{CPLD1}/module_reset_4")), "0");
        sfp.control_set(3, SfpControl::Reset, 1).unwrap();
        assert_eq!(fake.read(format!("{CPLD1}/module_reset_4")), "1");
        assert_eq!(
            sfp.control_set(3, SfpControl::TxDisable, 1),
            Err(StatusError::Unsupported)
        );
    }

    #[test]
    fn management() {
        let fake = populated();
        let qs32 = qs32(&fake);
        let decision = qs32.manage_fans().unwrap();
        assert_eq!(decision.hottest, Some(45_000));
        assert_eq!(decision.percentage, 40);
        assert_eq!(fake.read(format!("{FAN_CPLD}/fan_duty_cycle_percentage")), "40");

        qs32.manage_leds().unwrap();
        assert_eq!(fake.read(format!("{LED_DIR}/led_fan")), "1");
        assert_eq!(fake.read(format!("{LED_DIR}/led_psu1")), "1");

        fake.write(format!("{FAN_CPLD}/fan2_present"), "0");
        fake.write("/sys/bus/i2c/devices/9-0050/psu_present", "0");
        assert!(qs32.manage_fans().unwrap().failsafe);
        assert_eq!(fake.read(format!("{FAN_CPLD}/fan_duty_cycle_percentage")), "100");
        qs32.manage_leds().unwrap();
        assert_eq!(fake.read(format!("{LED_DIR}/led_fan")), "2");
        assert_eq!(fake.read(format!("{LED_DIR}/led_psu2")), "0");
    }

    #[test]
    fn onie_and_versions() {
        let fake = populated();
        let qs32 = qs32(&fake);
        assert_eq!(qs32.sys().onie_data_get(), Err(StatusError::Missing));
        fake.write_bytes("/sys/bus/i2c/devices/1-0057/eeprom", &[0xff; 256]);
        assert_eq!(qs32.sys().onie_data_get(), Err(StatusError::Invalid));

        fake.write(format!("{CPLD1}/version"), "0x0b");
        fake.write(format!("{CPLD2}/version"), "0x07\n");
        let info = qs32.sys().platform_info_get().unwrap();
        assert_eq!(info.cpld_versions_str(), "CPLD1:0x0b, CPLD2:0x07");
    }
}

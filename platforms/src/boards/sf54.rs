// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! `x86-64-ref-sf54-r0`: 48 SFP28 and 6 QSFP28 ports, optional BMC.
//!
//! When the BMC is fitted it owns the board sensors and the fan tray and exports them as IPMI
//! sensor attributes; without it the same sensors are reached through their own drivers.
//! Module presence, loss of signal and transmitter disable come from GPIO expanders whose lines
//! count downwards.

use platform::Oid;
use platform::bmc::BmcProbe;
use platform::fan::{FanCaps, FanDir};
use platform::led::LedMode;
use platform::locator::{Locator, PathTemplate, RangeMap, Segment};
use platform::manage::{FanPolicy, FanStep, LedRoles};
use platform::psu::PsuCaps;
use platform::thermal::{ThermalCaps, Thresholds};

use crate::board::{
    BmcDesc, Board, FanDesc, FanDirSource, LedDesc, PortLayout, PortSignal, PsuDesc, Signal,
    SysDesc, ThermalDesc,
};
use crate::register_board;

const BMC_DIR: &str = "/sys/devices/platform/ipmi_bmc.0";
const SENSOR_CAPS: ThermalCaps = ThermalCaps::GET_TEMPERATURE.union(ThermalCaps::GET_ALL_THRESHOLDS);
const BOARD_LIMITS: Thresholds = Thresholds::new(65_000, 75_000, 85_000);

/// An LM75 that the BMC reports in °C when fitted.
const fn board_sensor(
    description: &'static str,
    sensor: u32,
    fallback: &'static Locator,
) -> ThermalDesc {
    ThermalDesc {
        description,
        parent: Oid::CHASSIS,
        input: Locator::BmcOr {
            id: sensor,
            scale: 1000,
            fallback,
        },
        caps: SENSOR_CAPS,
        thresholds: BOARD_LIMITS,
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
        thresholds: Thresholds::new(85_000, 95_000, 105_000),
    },
    board_sensor(
        "MAC Side",
        0x11,
        &Locator::Hwmon {
            device: "/sys/bus/i2c/devices/3-0048",
            attr: "temp1_input",
        },
    ),
    board_sensor(
        "Front Panel",
        0x12,
        &Locator::Hwmon {
            device: "/sys/bus/i2c/devices/3-0049",
            attr: "temp1_input",
        },
    ),
    board_sensor(
        "Fan Board",
        0x13,
        &Locator::Hwmon {
            device: "/sys/bus/i2c/devices/3-004a",
            attr: "temp1_input",
        },
    ),
    ThermalDesc {
        description: "PSU-1 Thermal Sensor 1",
        parent: Oid::psu(1),
        input: Locator::Hwmon {
            device: "/sys/bus/i2c/devices/31-0058",
            attr: "temp1_input",
        },
        caps: ThermalCaps::GET_TEMPERATURE,
        thresholds: Thresholds::new(0, 0, 0),
    },
    ThermalDesc {
        description: "PSU-2 Thermal Sensor 1",
        parent: Oid::psu(2),
        input: Locator::Hwmon {
            device: "/sys/bus/i2c/devices/32-0059",
            attr: "temp1_input",
        },
        caps: ThermalCaps::GET_TEMPERATURE,
        thresholds: Thresholds::new(0, 0, 0),
    },
];

macro_rules! tray_fan {
    ($n:literal, $present:literal, $rpm:literal) => {
        FanDesc {
            description: concat!("Chassis Fan - ", $n),
            parent: Oid::CHASSIS,
            caps: FanCaps::SET_PERCENTAGE
                .union(FanCaps::GET_RPM)
                .union(FanCaps::GET_PERCENTAGE)
                .union(FanCaps::F2B),
            present: Some(Signal::high(Locator::BmcOr {
                id: $present,
                scale: 1,
                fallback: &Locator::File(concat!(
                    "/sys/bus/i2c/devices/0-0066/fan",
                    $n,
                    "_present"
                )),
            })),
            fault: Some(Signal::high(Locator::File(concat!(
                "/sys/bus/i2c/devices/0-0066/fan",
                $n,
                "_fault"
            )))),
            rpm: Some(Locator::BmcOr {
                id: $rpm,
                scale: 1,
                fallback: &Locator::File(concat!(
                    "/sys/bus/i2c/devices/0-0066/fan",
                    $n,
                    "_input"
                )),
            }),
            percentage: Some(Locator::File(
                "/sys/bus/i2c/devices/0-0066/fan_duty_cycle_percentage",
            )),
            max_rpm: 0,
            dir: FanDirSource::Fixed(FanDir::F2B),
            model: None,
            serial: None,
        }
    };
}

const fn psu_fan(description: &'static str, psu: u32, device: &'static str) -> FanDesc {
    FanDesc {
        description,
        parent: Oid::psu(psu),
        caps: FanCaps::GET_RPM.union(FanCaps::GET_PERCENTAGE),
        present: None,
        fault: None,
        rpm: Some(Locator::Hwmon {
            device,
            attr: "fan1_input",
        }),
        percentage: None,
        max_rpm: 25_000,
        dir: FanDirSource::Fixed(FanDir::F2B),
        model: None,
        serial: None,
    }
}

static FANS: [FanDesc; 6] = [
    tray_fan!(1, 0x41, 0x51),
    tray_fan!(2, 0x42, 0x52),
    tray_fan!(3, 0x43, 0x53),
    tray_fan!(4, 0x44, 0x54),
    psu_fan("PSU-1 Fan 1", 1, "/sys/bus/i2c/devices/31-0058"),
    psu_fan("PSU-2 Fan 1", 2, "/sys/bus/i2c/devices/32-0059"),
];

macro_rules! psu {
    ($n:literal, $pmbus:literal) => {
        PsuDesc {
            description: concat!("PSU-", $n),
            caps: PsuCaps::AC,
            present: Signal::low(Locator::File(concat!(
                "/sys/bus/i2c/devices/0-0060/psu",
                $n,
                "_present"
            ))),
            power_good: Some(Signal::high(Locator::File(concat!(
                "/sys/bus/i2c/devices/0-0060/psu",
                $n,
                "_power_good"
            )))),
            input_good: Some(Signal::high(Locator::File(concat!(
                "/sys/bus/i2c/devices/0-0060/psu",
                $n,
                "_ac_ok"
            )))),
            pmbus: Some($pmbus),
            model: Some(Locator::File(concat!($pmbus, "/psu_mfr_model"))),
            serial: Some(Locator::File(concat!($pmbus, "/psu_mfr_serial"))),
            fan: Some(Oid::fan(4 + $n)),
            thermal: Some(Oid::thermal(4 + $n)),
        }
    };
}

static PSUS: [PsuDesc; 2] = [
    psu!(1, "/sys/bus/i2c/devices/31-0058"),
    psu!(2, "/sys/bus/i2c/devices/32-0059"),
];

const HEALTH_MODES: &[(i32, LedMode)] = &[
    (0, LedMode::Off),
    (1, LedMode::Green),
    (2, LedMode::Orange),
];

static LEDS: [LedDesc; 5] = [
    LedDesc {
        description: "System LED",
        at: Locator::File("/sys/devices/platform/sf54_led/led_sys"),
        modes: &[
            (0, LedMode::Off),
            (1, LedMode::Green),
            (2, LedMode::GreenBlinking),
            (3, LedMode::Orange),
            (4, LedMode::OrangeBlinking),
        ],
    },
    LedDesc {
        description: "Locator LED",
        at: Locator::File("/sys/devices/platform/sf54_led/led_loc"),
        modes: &[(0, LedMode::Off), (1, LedMode::BlueBlinking)],
    },
    LedDesc {
        description: "Fan LED",
        at: Locator::File("/sys/devices/platform/sf54_led/led_fan"),
        modes: HEALTH_MODES,
    },
    LedDesc {
        description: "PSU-1 LED",
        at: Locator::File("/sys/devices/platform/sf54_led/led_psu1"),
        modes: HEALTH_MODES,
    },
    LedDesc {
        description: "PSU-2 LED",
        at: Locator::File("/sys/devices/platform/sf54_led/led_psu2"),
        modes: HEALTH_MODES,
    },
];

// SFP cage lines, sixteen per expander, top line first
const RX_LOS_LINES: RangeMap = RangeMap::new(&[
    Segment::descending(0, 15, 399),
    Segment::descending(16, 31, 383),
    Segment::descending(32, 47, 367),
]);
const TX_DISABLE_LINES: RangeMap = RangeMap::new(&[
    Segment::descending(0, 15, 447),
    Segment::descending(16, 31, 431),
    Segment::descending(32, 47, 415),
]);

const QSFP_CONTROL: RangeMap = RangeMap::new(&[Segment::new(48, 53, 1)]);

static STEPS: [FanStep; 3] = [
    FanStep {
        mcelsius: 40_000,
        percentage: 50,
    },
    FanStep {
        mcelsius: 50_000,
        percentage: 70,
    },
    FanStep {
        mcelsius: 60_000,
        percentage: 100,
    },
];

pub static BOARD: Board = Board {
    name: "x86-64-ref-sf54-r0",
    sys: SysDesc {
        onie_eeprom: Some("/sys/bus/i2c/devices/0-0056/eeprom"),
        cplds: &[
            ("CPLD1", Locator::File("/sys/bus/i2c/devices/0-0060/version")),
            ("CPLD2", Locator::File("/sys/bus/i2c/devices/0-0062/version")),
        ],
        other_versions: &[(
            "BMC",
            Locator::File("/sys/devices/platform/ipmi_bmc.0/firmware_revision"),
        )],
    },
    thermals: &THERMALS,
    fans: &FANS,
    psus: &PSUS,
    leds: &LEDS,
    ports: PortLayout {
        count: 54,
        qsfp: QSFP_CONTROL,
        present: PortSignal::Gpio {
            map: RangeMap::new(&[
                Segment::descending(0, 15, 511),
                Segment::descending(16, 31, 495),
                Segment::descending(32, 47, 479),
                Segment::descending(48, 53, 463),
            ]),
            active_low: true,
        },
        rx_los: Some(PortSignal::Gpio {
            map: RX_LOS_LINES,
            active_low: false,
        }),
        tx_fault: None,
        tx_disable: Some(PortSignal::Gpio {
            map: TX_DISABLE_LINES,
            active_low: false,
        }),
        reset: Some(PortSignal::Cpld {
            ranges: QSFP_CONTROL,
            dirs: &["/sys/bus/i2c/devices/0-0062"],
            attr: PathTemplate::new("module_reset_{}"),
            active_low: true,
        }),
        lp_mode: Some(PortSignal::Cpld {
            ranges: QSFP_CONTROL,
            dirs: &["/sys/bus/i2c/devices/0-0062"],
            attr: PathTemplate::new("module_lp_mode_{}"),
            active_low: false,
        }),
        eeprom_bus: RangeMap::new(&[Segment::new(0, 47, 20), Segment::new(48, 53, 70)]),
        eeprom: PathTemplate::new("/sys/bus/i2c/devices/{}-0050/eeprom"),
        dom: Some(PathTemplate::new("/sys/bus/i2c/devices/{}-0051/eeprom")),
    },
    bmc: Some(BmcDesc {
        dir: BMC_DIR,
        probe: BmcProbe {
            path: "/sys/bus/i2c/devices/0-0060/bmc_present",
            present_value: 1,
        },
    }),
    fan_policy: Some(FanPolicy {
        steps: &STEPS,
        hysteresis: 2_000,
        failsafe: 100,
        floor: 35,
    }),
    led_roles: Some(LedRoles {
        fan: Some(Oid::led(3)),
        psus: &[(Oid::psu(1), Oid::led(4)), (Oid::psu(2), Oid::led(5))],
    }),
};

register_board!(BOARD);

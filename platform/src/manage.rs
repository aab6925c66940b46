// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Fan speed and status LED management.
//!
//! One call is one pass: read the sensors, decide, apply. Callers run passes periodically.

use std::sync::Mutex;

use oid::{Oid, OidType};
use status::{Status, StatusError};
use tracing::{debug, info, warn};

use crate::chassis;
use crate::fan::{FanCaps, FanInfo, FanStatus};
use crate::led::LedMode;
use crate::platform::Platform;
use crate::psu::PsuStatus;
use crate::thermal::Milli;

/// From `mcelsius` up, fans run at least at `percentage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanStep {
    pub mcelsius: i32,
    pub percentage: u8,
}

/// A step table keyed by the hottest sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanPolicy {
    /// ascending temperatures
    pub steps: &'static [FanStep],
    /// how far below a step the temperature must fall before the duty drops, m°C
    pub hysteresis: i32,
    /// duty when a fan is absent or failed, or no sensor can be read
    pub failsafe: u8,
    /// duty below the first step
    pub floor: u8,
}

impl FanPolicy {
    /// The duty for `mcelsius`, without hysteresis.
    #[must_use]
    pub fn duty_for(&self, mcelsius: i32) -> u8 {
        self.steps
            .iter()
            .filter(|step| mcelsius >= step.mcelsius)
            .map(|step| step.percentage)
            .fold(self.floor, u8::max)
    }

    /// The duty for `mcelsius` when the fans currently run at `current`.
    #[must_use]
    pub fn next_duty(&self, current: Option<u8>, mcelsius: i32) -> u8 {
        let duty = self.duty_for(mcelsius);
        match current {
            Some(current) if duty < current => {
                current.min(self.duty_for(mcelsius.saturating_add(self.hysteresis)))
            }
            _ => duty,
        }
    }
}

/// The outcome of a fan management pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanDecision {
    /// hottest readable sensor, m°C
    pub hottest: Option<i32>,
    pub percentage: u8,
    pub failsafe: bool,
}

impl std::fmt::Display for FanDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.hottest {
            Some(t) => write!(f, "hottest sensor {} C", Milli(t))?,
            None => write!(f, "no readable sensor")?,
        }
        write!(f, ", fans at {}%", self.percentage)?;
        if self.failsafe {
            write!(f, " (failsafe)")?;
        }
        Ok(())
    }
}

/// Runs a [`FanPolicy`], remembering the duty between passes.
#[derive(Debug)]
pub struct FanManager {
    policy: FanPolicy,
    current: Mutex<Option<u8>>,
}

impl FanManager {
    #[must_use]
    pub fn new(policy: FanPolicy) -> FanManager {
        FanManager {
            policy,
            current: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn policy(&self) -> &FanPolicy {
        &self.policy
    }

    /// One pass over the chassis fans (PSU fans are left to the PSU).
    ///
    /// # Errors
    ///
    /// The first failure to set a fan; all settable fans are still attempted.
    pub fn run(&self, platform: &dyn Platform) -> Status<FanDecision> {
        let tree = chassis::walk(platform)?;

        let mut hottest: Option<i32> = None;
        let mut fans: Vec<FanInfo> = Vec::new();
        let mut fan_fault = false;
        for entry in &tree {
            let id = entry.hdr.id;
            match id.oid_type() {
                OidType::Thermal => match platform.thermal().info_get(id) {
                    Ok(info) if info.level().is_some() => {
                        hottest = Some(hottest.map_or(info.mcelsius, |t| t.max(info.mcelsius)));
                    }
                    Ok(_) => debug!("{id} not readable"),
                    Err(e) => warn!("{id}: {e}"),
                },
                OidType::Fan if entry.hdr.parent == Oid::CHASSIS => {
                    match platform.fan().info_get(id) {
                        Ok(info) => {
                            if !info.is_healthy() {
                                warn!("{id} is absent or failed");
                                fan_fault = true;
                            }
                            fans.push(info);
                        }
                        Err(e) => {
                            warn!("{id}: {e}");
                            fan_fault = true;
                        }
                    }
                }
                _ => {}
            }
        }

        let mut current = self.current.lock().map_err(|_| StatusError::Internal)?;
        let decision = match hottest {
            Some(t) if !fan_fault => FanDecision {
                hottest,
                percentage: self.policy.next_duty(*current, t),
                failsafe: false,
            },
            _ => FanDecision {
                hottest,
                percentage: self.policy.failsafe,
                failsafe: true,
            },
        };
        if *current != Some(decision.percentage) {
            info!("{decision}");
        }
        *current = Some(decision.percentage);
        drop(current);

        let mut result = Ok(decision);
        let settable = fans.iter().filter(|fan| {
            fan.caps.contains(FanCaps::SET_PERCENTAGE) && fan.status.contains(FanStatus::PRESENT)
        });
        for fan in settable {
            let id = fan.hdr.id;
            if let Err(e) = platform
                .fan()
                .percentage_set(id, i32::from(decision.percentage))
            {
                warn!("unable to set {id} to {}%: {e}", decision.percentage);
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        result
    }
}

/// Which LEDs show the health of what.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedRoles {
    /// LED reflecting all chassis fans
    pub fan: Option<Oid>,
    /// `(psu, led)` pairs
    pub psus: &'static [(Oid, Oid)],
}

fn show(platform: &dyn Platform, led: Oid, mode: LedMode, result: &mut Status) {
    debug!("{led} -> {mode}");
    if let Err(e) = platform.led().mode_set(led, mode) {
        warn!("unable to set {led} to {mode}: {e}");
        if result.is_ok() {
            *result = Err(e);
        }
    }
}

/// One pass of LED management: green when healthy, orange on failure, off for an absent PSU.
/// A missing chassis fan is a failure.
///
/// # Errors
///
/// The first failure to set an LED; all LEDs are still attempted.
pub fn manage_leds(platform: &dyn Platform, roles: &LedRoles) -> Status {
    let mut result = Ok(());

    if let Some(led) = roles.fan {
        let healthy = chassis::walk(platform)?
            .iter()
            .filter(|e| e.hdr.id.is(OidType::Fan) && e.hdr.parent == Oid::CHASSIS)
            .all(|e| {
                platform
                    .fan()
                    .info_get(e.hdr.id)
                    .is_ok_and(|info| info.is_healthy())
            });
        let mode = if healthy {
            LedMode::Green
        } else {
            LedMode::Orange
        };
        show(platform, led, mode, &mut result);
    }

    for &(psu, led) in roles.psus {
        let mode = match platform.psu().info_get(psu) {
            Ok(info) if !info.status.contains(PsuStatus::PRESENT) => LedMode::Off,
            Ok(info) if info.is_healthy() => LedMode::Green,
            Ok(_) => LedMode::Orange,
            Err(e) => {
                warn!("{psu}: {e}");
                LedMode::Orange
            }
        };
        show(platform, led, mode, &mut result);
    }
    result
}

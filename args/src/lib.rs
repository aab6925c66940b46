// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

pub use clap::Parser;
use clap::Subcommand;
use platform::Oid;
use platform::bmc::BmcMode;
use platform::led::LedMode;
use platform::sfp::SfpControl;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Walk the object tree and show every object
    Show,
    /// Show one object, e.g. `fan-2` or `0x03000002`
    Oid { oid: Oid },
    /// Presence and rx-los bitmaps, then the module type of each plugged port
    Sfp,
    /// Hex dump of a module EEPROM page
    Eeprom {
        port: u32,
        #[arg(long, help = "Dump the diagnostics page (A2) instead of A0")]
        dom: bool,
    },
    /// Read a module control, or set it when a value is given
    Control {
        port: u32,
        #[arg(help = "One of reset, reset-state, rx-los, tx-fault, tx-disable, lp-mode, power-override")]
        control: SfpControl,
        value: Option<i32>,
    },
    /// Set the duty cycle of a fan
    Fan {
        oid: Oid,
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        percentage: u8,
    },
    /// Set the mode of an LED
    Led { oid: Oid, mode: LedMode },
    /// Run fan and LED management passes
    Manage {
        #[arg(long, default_value_t = 1, help = "Number of passes, 0 to run until killed")]
        passes: u32,
        #[arg(long, value_name = "SECONDS", default_value_t = 5)]
        interval: u64,
    },
    /// Decode the ONIE system EEPROM
    Onie,
}

#[derive(Parser)]
#[command(name = "onlpdump")]
#[command(version)]
#[command(about = "Inspect and manage the hardware of a network switch", long_about = None)]
#[allow(clippy::struct_excessive_bools)]
pub struct CmdArgs {
    #[arg(long, value_name = "FILE", help = "YAML configuration file")]
    config: Option<PathBuf>,

    #[arg(
        long,
        value_name = "NAME",
        help = "Platform name, overriding /etc/onl/platform"
    )]
    platform: Option<String>,

    #[arg(
        long,
        value_name = "DIR",
        help = "Resolve /sys paths under DIR instead of / (e.g. a captured tree)"
    )]
    root: Option<PathBuf>,

    #[arg(long, value_name = "auto|present|absent", help = "How to decide whether a BMC is fitted")]
    bmc: Option<BmcMode>,

    #[arg(
        long,
        value_name = "tracing configuration",
        help = "Tracing config string as comma-separated sequence of tag=level, with level one in [off,error,warn,info,debug,trace].
Passing default=level sets the default log-level.
Passing all=level allows setting the log-level of all targets to level.
E.g. default=error,all=info,sfp=debug will set the default target to error, and all the registered targets to info, but enable debug for sfp"
    )]
    tracing: Option<String>,

    #[arg(
        long,
        default_value_t = false,
        help = "Show the available tracing tags and exit"
    )]
    show_tracing_tags: bool,

    #[arg(
        long,
        default_value_t = false,
        help = "Show configurable tracing targets and exit"
    )]
    show_tracing_targets: bool,

    #[arg(long, default_value_t = false, help = "List the supported platforms and exit")]
    list_platforms: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

impl CmdArgs {
    pub fn config(&self) -> Option<&Path> {
        self.config.as_deref()
    }
    pub fn platform(&self) -> Option<String> {
        self.platform.clone()
    }
    pub fn root(&self) -> Option<PathBuf> {
        self.root.clone()
    }
    pub fn bmc(&self) -> Option<BmcMode> {
        self.bmc
    }
    pub fn tracing(&self) -> Option<String> {
        self.tracing.clone()
    }
    pub fn show_tracing_tags(&self) -> bool {
        self.show_tracing_tags
    }
    pub fn show_tracing_targets(&self) -> bool {
        self.show_tracing_targets
    }
    pub fn list_platforms(&self) -> bool {
        self.list_platforms
    }

    /// The command to run; `show` when none is given.
    pub fn command(&self) -> Command {
        let command = self.command.clone().unwrap_or(Command::Show);
        debug!("command: {command:?}");
        command
    }
}

impl Command {
    /// Pause between management passes.
    pub fn interval(&self) -> Option<Duration> {
        match self {
            Command::Manage { interval, .. } => Some(Duration::from_secs(*interval)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> CmdArgs {
        CmdArgs::try_parse_from(std::iter::once("onlpdump").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults() {
        let args = parse(&[]);
        assert_eq!(args.command(), Command::Show);
        assert_eq!(args.bmc(), None);
        assert!(args.config().is_none());
        assert!(!args.list_platforms());
    }

    #[test]
    fn global_options() {
        let args = parse(&[
            "--platform",
            "x86-64-ref-sf54-r0",
            "--root",
            "/tmp/capture",
            "--bmc",
            "absent",
            "--tracing",
            "default=debug",
            "sfp",
        ]);
        assert_eq!(args.platform().as_deref(), Some("x86-64-ref-sf54-r0"));
        assert_eq!(args.root(), Some(PathBuf::from("/tmp/capture")));
        assert_eq!(args.bmc(), Some(BmcMode::Absent));
        assert_eq!(args.tracing().as_deref(), Some("default=debug"));
        assert_eq!(args.command(), Command::Sfp);
    }

    #[test]
    fn subcommands() {
        assert_eq!(
            parse(&["oid", "fan-2"]).command(),
            Command::Oid { oid: Oid::fan(2) }
        );
        assert_eq!(
            parse(&["eeprom", "7", "--dom"]).command(),
            Command::Eeprom { port: 7, dom: true }
        );
        assert_eq!(
            parse(&["control", "3", "lp-mode", "1"]).command(),
            Command::Control {
                port: 3,
                control: SfpControl::LpMode,
                value: Some(1)
            }
        );
        assert_eq!(
            parse(&["led", "led-1", "green-blinking"]).command(),
            Command::Led {
                oid: Oid::led(1),
                mode: LedMode::GreenBlinking
            }
        );
        let manage = parse(&["manage", "--passes", "0", "--interval", "2"]).command();
        assert_eq!(manage.interval(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn rejects_bad_values() {
        let bad = |args: &[&str]| {
            CmdArgs::try_parse_from(std::iter::once("onlpdump").chain(args.iter().copied()))
                .is_err()
        };
        assert!(bad(&["oid", "fan"]));
        assert!(bad(&["fan", "fan-1", "101"]));
        assert!(bad(&["--bmc", "maybe"]));
        assert!(bad(&["control", "0", "turbo"]));
    }
}

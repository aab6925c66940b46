// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

#![deny(clippy::all, clippy::pedantic)]

mod render;

use std::process::ExitCode;
use std::time::Duration;

use args::{CmdArgs, Command, Parser};
use config::{ConfigError, PlatformConfig};
use platform::{Oid, OidType, Platform, StatusError};
use platforms::PlatformLookupError;
use thiserror::Error;
use tracectl::{LevelFilter, TraceCtlError, get_trace_ctl, trace_target};
use tracing::{debug, error, info, warn};

trace_target!("onlpdump", LevelFilter::INFO, &[]);

#[derive(Debug, Error)]
enum DumpError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Lookup(#[from] PlatformLookupError),
    #[error("invalid tracing configuration: {0}")]
    Tracing(#[from] TraceCtlError),
    #[error("{what}: {status}")]
    Platform { what: String, status: StatusError },
    #[error("{0} is not a {1} object")]
    WrongType(Oid, OidType),
}

/// Tag a platform status with what was being done.
fn failed(what: impl Into<String>) -> impl FnOnce(StatusError) -> DumpError {
    let what = what.into();
    move |status| DumpError::Platform { what, status }
}

fn expect_type(oid: Oid, oid_type: OidType) -> Result<(), DumpError> {
    if oid.is(oid_type) {
        Ok(())
    } else {
        Err(DumpError::WrongType(oid, oid_type))
    }
}

fn manage(platform: &dyn Platform, passes: u32, interval: Duration) -> Result<(), DumpError> {
    let mut pass = 0u32;
    loop {
        pass += 1;
        debug!("management pass {pass}");
        print!("{}", render::manage(platform).map_err(failed("management"))?);
        if passes != 0 && pass >= passes {
            return Ok(());
        }
        std::thread::sleep(interval);
    }
}

fn dispatch(platform: &dyn Platform, command: &Command) -> Result<(), DumpError> {
    match command {
        Command::Show => print!("{}", render::tree(platform).map_err(failed("object tree"))?),
        Command::Oid { oid } => print!(
            "{}",
            render::object(platform, *oid).map_err(failed(oid.to_string()))?
        ),
        Command::Sfp => print!("{}", render::sfp(platform).map_err(failed("ports"))?),
        Command::Eeprom { port, dom } => {
            let dump = render::eeprom(platform, *port, *dom)
                .map_err(failed(format!("port {port} eeprom")))?;
            print!("{dump}");
        }
        Command::Control {
            port,
            control,
            value: Some(value),
        } => {
            let what = format!("port {port} {control}");
            platform
                .sfp()
                .control_set(*port, *control, *value)
                .map_err(failed(what))?;
            info!("port {port}: {control} set to {value}");
        }
        Command::Control {
            port,
            control,
            value: None,
        } => {
            let what = format!("port {port} {control}");
            let value = platform
                .sfp()
                .control_get(*port, *control)
                .map_err(failed(what))?;
            println!("port {port} {control}: {value}");
        }
        Command::Fan { oid, percentage } => {
            expect_type(*oid, OidType::Fan)?;
            platform
                .fan()
                .percentage_set(*oid, i32::from(*percentage))
                .map_err(failed(oid.to_string()))?;
            info!("{oid} set to {percentage}%");
        }
        Command::Led { oid, mode } => {
            expect_type(*oid, OidType::Led)?;
            platform
                .led()
                .mode_set(*oid, *mode)
                .map_err(failed(oid.to_string()))?;
            info!("{oid} set to {mode}");
        }
        Command::Manage { passes, .. } => {
            manage(platform, *passes, command.interval().unwrap_or_default())?;
        }
        Command::Onie => {
            print!("{}", render::onie(platform).map_err(failed("system eeprom"))?);
        }
    }
    Ok(())
}

fn run(args: &CmdArgs) -> Result<(), DumpError> {
    let config = PlatformConfig::load_or_default(args.config())?.with_overrides(
        args.platform(),
        args.root(),
        args.bmc(),
        args.tracing(),
    );
    if let Some(tracing) = &config.tracing {
        get_trace_ctl().setup_from_string(tracing)?;
    }
    if args.show_tracing_tags() {
        println!("{}", get_trace_ctl().targets_by_tag());
        return Ok(());
    }
    if args.show_tracing_targets() {
        println!("{}", get_trace_ctl().targets());
        return Ok(());
    }
    if args.list_platforms() {
        for board in platforms::boards() {
            println!("{}", board.name);
        }
        return Ok(());
    }

    config.validate()?;
    let root = config.sysfs_root()?;
    let board = platforms::registry::load(config.platform.as_deref(), root, config.bmc)?;
    let platform: &dyn Platform = &board;
    if let Err(e) = platform.init() {
        warn!("platform initialization incomplete: {e}");
    }
    dispatch(platform, &args.command())
}

fn main() -> ExitCode {
    let args = CmdArgs::parse();
    get_trace_ctl().set_default_level(LevelFilter::WARN);
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

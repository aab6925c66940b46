// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Runtime control of log levels.

use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use ordermap::{OrderMap, OrderSet};
use tracing::{debug, error, warn};
use tracing_subscriber::{EnvFilter, Registry, filter::LevelFilter, prelude::*, reload};

use crate::display::ByTag;
use crate::targets::{Origin, TARGETS, TargetDecl};
use crate::trace_target;

trace_target!("tracectl", LevelFilter::INFO, &["logging"]);

/// Errors in a tracing configuration string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TraceCtlError {
    /// An item is not of the form `key=level`
    #[error("invalid syntax '{0}': it should be tag=level")]
    Syntax(String),
    /// The level is not one of off, error, warn, info, debug, trace
    #[error("invalid level '{level}' for '{key}'")]
    Level { key: String, level: String },
}

/// The current level of one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetState {
    pub(crate) target: &'static str,
    pub(crate) name: &'static str,
    pub(crate) level: LevelFilter,
    /// declared tags, then the name
    pub(crate) tags: Vec<&'static str>,
    pub(crate) origin: Origin,
}

impl TargetState {
    fn from_decl(decl: &TargetDecl) -> TargetState {
        let mut tags = decl.tags.to_vec();
        if !tags.contains(&decl.name) {
            tags.push(decl.name);
        }
        TargetState {
            target: decl.target,
            name: decl.name,
            level: decl.level,
            tags,
            origin: decl.origin,
        }
    }
    #[must_use]
    pub fn target(&self) -> &'static str {
        self.target
    }
    #[must_use]
    pub fn level(&self) -> LevelFilter {
        self.level
    }
    #[must_use]
    pub fn origin(&self) -> Origin {
        self.origin
    }
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(&tag)
    }
}

/// One item of a configuration string.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Key {
    Default,
    All,
    Tag(String),
}

fn parse_config(input: &str) -> Result<Vec<(Key, LevelFilter)>, TraceCtlError> {
    input
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            let (key, level) = item
                .split_once('=')
                .ok_or_else(|| TraceCtlError::Syntax(item.to_string()))?;
            let (key, level) = (key.trim(), level.trim());
            let level = LevelFilter::from_str(level).map_err(|_| TraceCtlError::Level {
                key: key.to_string(),
                level: level.to_string(),
            })?;
            let key = match key {
                "default" => Key::Default,
                "all" => Key::All,
                tag => Key::Tag(tag.to_string()),
            };
            Ok((key, level))
        })
        .collect()
}

/// The levels of all targets known to the process.
#[derive(Debug)]
pub(crate) struct Levels {
    pub(crate) default: LevelFilter,
    pub(crate) targets: OrderMap<&'static str, TargetState>,
}

impl Levels {
    fn collect(default: LevelFilter, decls: &[TargetDecl]) -> Levels {
        let mut targets = OrderMap::with_capacity(decls.len());
        for decl in decls {
            if targets
                .insert(decl.target, TargetState::from_decl(decl))
                .is_some()
            {
                warn!("target {} declared more than once", decl.target);
            }
        }
        Levels { default, targets }
    }

    pub(crate) fn tags(&self) -> OrderSet<&'static str> {
        self.targets
            .values()
            .flat_map(|t| t.tags.iter().copied())
            .collect()
    }

    pub(crate) fn tagged<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a TargetState> {
        self.targets.values().filter(move |t| t.has_tag(tag))
    }

    fn env_filter(&self) -> EnvFilter {
        let mut filter = EnvFilter::new(self.default.to_string());
        for t in self.targets.values() {
            match format!("{}={}", t.target, t.level).parse() {
                Ok(directive) => filter = filter.add_directive(directive),
                Err(e) => error!("bad directive for target {}: {e}", t.target),
            }
        }
        filter
    }

    /// Apply one setting, telling whether anything changed.
    fn set(&mut self, key: &Key, level: LevelFilter) -> bool {
        match key {
            Key::Default => std::mem::replace(&mut self.default, level) != level,
            Key::All => self.targets.values_mut().fold(false, |changed, t| {
                std::mem::replace(&mut t.level, level) != level || changed
            }),
            Key::Tag(tag) => {
                let mut matched = 0;
                let mut changed = false;
                for t in self.targets.values_mut().filter(|t| t.has_tag(tag)) {
                    matched += 1;
                    changed |= std::mem::replace(&mut t.level, level) != level;
                }
                if matched == 0 {
                    warn!("no tracing target is tagged '{tag}'");
                }
                changed
            }
        }
    }

    fn config_string(&self) -> String {
        let mut out = format!("default={}", self.default);
        for t in self.targets.values() {
            out.push_str(&format!(",{}={}", t.name, t.level));
        }
        out
    }
}

/// Owner of the process wide subscriber and of the target levels.
#[derive(Debug)]
pub struct TracingControl {
    levels: Mutex<Levels>,
    handle: Option<reload::Handle<EnvFilter, Registry>>,
}

impl TracingControl {
    fn new() -> TracingControl {
        let levels = Levels::collect(LevelFilter::INFO, &TARGETS);
        let (filter, handle) = reload::Layer::new(levels.env_filter());

        // stdout carries command output
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_line_number(true);

        // a test harness may own the global subscriber already
        let handle = match tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
        {
            Ok(()) => Some(handle),
            Err(e) => {
                debug!("not installing tracing subscriber: {e}");
                None
            }
        };
        TracingControl {
            levels: Mutex::new(levels),
            handle,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Levels> {
        self.levels.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, apply: impl FnOnce(&mut Levels) -> bool) {
        let mut levels = self.lock();
        if apply(&mut levels)
            && let Some(handle) = &self.handle
            && let Err(e) = handle.reload(levels.env_filter())
        {
            error!("failed to reload tracing filter: {e}");
        }
    }

    /// Install the subscriber if not done yet.
    pub fn init() {
        get_trace_ctl();
    }

    /// Level of events whose target was not declared.
    pub fn set_default_level(&self, level: LevelFilter) {
        self.update(|levels| levels.set(&Key::Default, level));
    }

    pub fn set_level_all(&self, level: LevelFilter) {
        self.update(|levels| levels.set(&Key::All, level));
    }

    /// Set every target carrying `tag`; a target's name is one of its tags.
    pub fn set_tag_level(&self, tag: &str, level: LevelFilter) {
        self.update(|levels| levels.set(&Key::Tag(tag.to_string()), level));
    }

    /// Apply a configuration string such as `default=warn,sfp=debug`.
    ///
    /// `default` sets the level of events from undeclared targets, `all` the level of every
    /// declared target, any other key a tag. Items apply left to right, so
    /// `all=info,sfp=debug` leaves `sfp` at debug.
    ///
    /// # Errors
    ///
    /// Nothing is applied if any item is malformed.
    pub fn setup_from_string(&self, input: &str) -> Result<(), TraceCtlError> {
        let config = parse_config(input)?;
        self.update(|levels| {
            config
                .iter()
                .fold(false, |changed, (key, level)| levels.set(key, *level) || changed)
        });
        Ok(())
    }

    #[must_use]
    pub fn default_level(&self) -> LevelFilter {
        self.lock().default
    }

    #[must_use]
    pub fn target(&self, target: &str) -> Option<TargetState> {
        self.lock().targets.get(target).cloned()
    }

    #[must_use]
    pub fn tags(&self) -> Vec<&'static str> {
        self.lock().tags().into_iter().collect()
    }

    #[must_use]
    pub fn targets_with_tag(&self, tag: &str) -> Vec<TargetState> {
        self.lock().tagged(tag).cloned().collect()
    }

    /// Printable table of all targets.
    #[must_use]
    pub fn targets(&self) -> String {
        self.lock().to_string()
    }

    /// Printable list of targets under each tag.
    #[must_use]
    pub fn targets_by_tag(&self) -> String {
        ByTag(&self.lock()).to_string()
    }

    /// A configuration string reproducing the current levels.
    #[must_use]
    pub fn as_config_string(&self) -> String {
        self.lock().config_string()
    }
}

/// The process wide [`TracingControl`], created on first use.
pub fn get_trace_ctl() -> &'static TracingControl {
    static TRACING_CTL: OnceLock<TracingControl> = OnceLock::new();
    TRACING_CTL.get_or_init(TracingControl::new)
}

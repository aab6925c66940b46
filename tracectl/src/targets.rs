// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Link-time registry of tracing targets.

use crate::LevelFilter;
use linkme::distributed_slice;

/// Where a target name comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// the module path of the declaring crate
    Module,
    /// any other target, e.g. the one a dependency logs under
    Custom,
}

/// A target as declared by [`trace_target!`] or [`custom_target!`].
#[derive(Debug)]
pub struct TargetDecl {
    pub target: &'static str,
    pub name: &'static str,
    pub level: LevelFilter,
    pub tags: &'static [&'static str],
    pub origin: Origin,
}

#[distributed_slice]
pub static TARGETS: [TargetDecl];

#[doc(hidden)]
#[macro_export]
macro_rules! declare_target {
    ($target:expr, $name:expr, $level:expr, $tags:expr, $origin:ident) => {
        const _: () = {
            #[linkme::distributed_slice($crate::targets::TARGETS)]
            static TARGET: $crate::targets::TargetDecl = $crate::targets::TargetDecl {
                target: $target,
                name: $name,
                level: $level,
                tags: $tags,
                origin: $crate::targets::Origin::$origin,
            };
        };
    };
}

/// Declare the calling crate's target with a short name, a default level and tags.
/// The caller needs `linkme` among its dependencies.
///
/// ```ignore
/// trace_target!("sfp", LevelFilter::INFO, &["ports"]);
/// ```
#[macro_export]
macro_rules! trace_target {
    ($name:expr, $level:expr, $tags:expr) => {
        $crate::declare_target!(module_path!(), $name, $level, $tags, Module);
    };
}

/// Declare a target which is not a module path of ours.
#[macro_export]
macro_rules! custom_target {
    ($target:expr, $level:expr, $tags:expr) => {
        $crate::declare_target!($target, $target, $level, $tags, Custom);
    };
}

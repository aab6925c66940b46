// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Tables of targets and levels.

use std::fmt::{Display, Formatter, Result};

use crate::control::{Levels, TargetState};
use crate::targets::Origin;

fn width<'a>(targets: impl Iterator<Item = &'a TargetState>) -> usize {
    targets
        .map(|t| t.target.len())
        .max()
        .unwrap_or(0)
        .max("(default)".len())
}

impl Display for TargetState {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let w = f.width().unwrap_or(0);
        let level = self.level.to_string();
        write!(f, "{:<w$}  {level:<5}  {}", self.target, self.tags.join(","))?;
        if self.origin == Origin::Custom {
            write!(f, " (custom)")?;
        }
        Ok(())
    }
}

impl Display for Levels {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let w = width(self.targets.values());
        writeln!(f, "{:<w$}  {:<5}  TAGS", "TARGET", "LEVEL")?;
        for target in self.targets.values() {
            writeln!(f, "{target:w$}")?;
        }
        write!(f, "{:<w$}  {}", "(default)", self.default)
    }
}

/// The targets under each tag.
pub(crate) struct ByTag<'a>(pub(crate) &'a Levels);

impl Display for ByTag<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let levels = self.0;
        let w = width(levels.targets.values());
        for tag in levels.tags() {
            writeln!(f, "{tag}:")?;
            for target in levels.tagged(tag) {
                writeln!(f, "    {:<w$}  {}", target.target, target.level)?;
            }
        }
        Ok(())
    }
}

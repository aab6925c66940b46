// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Walking the object tree rooted at the chassis.

use std::collections::HashSet;

use oid::Oid;
use status::Status;
use tracing::debug;

use crate::header::OidHeader;
use crate::platform::Platform;

/// One object of the tree, with its distance from the chassis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub depth: usize,
    pub hdr: OidHeader,
}

/// Depth-first walk from the chassis: every object comes before its children, and each
/// object is visited once. Children the board does not know are skipped.
///
/// # Errors
///
/// Fails only if the chassis header itself cannot be read.
pub fn walk(platform: &dyn Platform) -> Status<Vec<TreeEntry>> {
    let root = platform.hdr_get(Oid::CHASSIS)?;
    let mut seen = HashSet::from([Oid::CHASSIS]);
    let mut out = Vec::new();
    let mut stack = vec![TreeEntry { depth: 0, hdr: root }];
    while let Some(entry) = stack.pop() {
        let depth = entry.depth + 1;
        let mut children = Vec::with_capacity(entry.hdr.children.len());
        for &child in &entry.hdr.children {
            if !seen.insert(child) {
                continue;
            }
            match platform.hdr_get(child) {
                Ok(hdr) => children.push(TreeEntry { depth, hdr }),
                Err(e) => {
                    debug!("skipping child {child} of {}: {e}", entry.hdr.id);
                }
            }
        }
        out.push(entry);
        // reversed so that children pop in table order
        stack.extend(children.into_iter().rev());
    }
    Ok(out)
}

/// Every object id of the board in walk order, chassis excluded.
///
/// # Errors
///
/// As [`walk`].
pub fn oids(platform: &dyn Platform) -> Status<Vec<Oid>> {
    Ok(walk(platform)?
        .into_iter()
        .skip(1)
        .map(|entry| entry.hdr.id)
        .collect())
}

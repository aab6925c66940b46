// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Object header shared by every platform object.

use oid::Oid;

/// Identity and position of an object in the platform tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OidHeader {
    /// The object itself.
    pub id: Oid,
    /// Human readable description, e.g. `"Chassis Fan 3"`.
    pub description: String,
    /// The object this one is attached to; the chassis is its own parent.
    pub parent: Oid,
    /// Objects attached to this one.
    pub children: Vec<Oid>,
}

impl OidHeader {
    /// A header with no children.
    pub fn new(id: Oid, description: impl Into<String>, parent: Oid) -> OidHeader {
        OidHeader {
            id,
            description: description.into(),
            parent,
            children: Vec::new(),
        }
    }

    /// Builder style helper adding children.
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Oid>) -> OidHeader {
        self.children.extend(children);
        self
    }
}

impl std::fmt::Display for OidHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:#010x}) \"{}\"", self.id, self.id, self.description)
    }
}

//! Forwarding information base.
//!
//! Name prefix → next hops sorted by cost. Lookup is longest-prefix match.

use std::collections::HashMap;

use crate::net::{FaceId, Name};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextHop {
    pub face: FaceId,
    pub cost: u32,
}

#[derive(Debug, Default, Clone)]
pub struct Fib {
    entries: HashMap<Name, Vec<NextHop>>,
}

impl Fib {
    /// Adds or updates the next hop `face` under `prefix`, keeping hops sorted
    /// by cost (ties in insertion order).
    pub fn add_next_hop(&mut self, prefix: Name, face: FaceId, cost: u32) {
        let hops = self.entries.entry(prefix).or_default();
        hops.retain(|h| h.face != face);
        let at = hops.partition_point(|h| h.cost <= cost);
        hops.insert(at, NextHop { face, cost });
    }

    /// Drops `face` from every entry; entries left without hops are removed.
    pub fn remove_face(&mut self, face: FaceId) {
        self.entries.retain(|_, hops| {
            hops.retain(|h| h.face != face);
            !hops.is_empty()
        });
    }

    pub fn longest_prefix_match(&self, name: &Name) -> Option<(Name, &[NextHop])> {
        (0..=name.len()).rev().find_map(|n| {
            let prefix = name.prefix(n);
            let hops = self.entries.get(&prefix)?;
            Some((prefix, hops.as_slice()))
        })
    }

    /// Next hops for `name`, empty when nothing matches.
    pub fn next_hops(&self, name: &Name) -> &[NextHop] {
        match self.longest_prefix_match(name) {
            Some((_, hops)) => hops,
            None => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//! Monotonic tab-id registry.

use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy)]
struct TabEntry {
    id: u32,
    first_seen: u32,
}

/// Assigns stable numeric ids to browser tab handles.
///
/// Ids are handed out monotonically and never reused or reassigned. A
/// handle that disappears is pruned, so if the browser later recycles the
/// same handle value for a fresh tab, that tab gets a fresh id rather than
/// resurrecting the old one.
#[derive(Debug, Clone, Default)]
pub struct TabRegistry {
    live: HashMap<String, TabEntry>,
    next_id: u32,
}

impl TabRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `handle` was seen on capture number `capture_seq`.
    ///
    /// Returns the handle's id and whether this observation is the first.
    pub fn observe(&mut self, handle: &str, capture_seq: u32) -> (u32, bool) {
        if let Some(entry) = self.live.get(handle) {
            return (entry.id, false);
        }
        let id = self.next_id;
        self.next_id += 1;
        self.live.insert(
            handle.to_string(),
            TabEntry {
                id,
                first_seen: capture_seq,
            },
        );
        (id, true)
    }

    /// Drop every handle not in `present`. Assigned ids stay burned.
    pub fn prune<'a, I>(&mut self, present: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let keep: HashSet<&str> = present.into_iter().collect();
        self.live.retain(|handle, _| keep.contains(handle.as_str()));
    }

    /// Handle for a previously assigned id, if that tab is still live.
    pub fn resolve(&self, id: u32) -> Option<&str> {
        self.live
            .iter()
            .find(|(_, entry)| entry.id == id)
            .map(|(handle, _)| handle.as_str())
    }

    /// Capture number on which `handle` was first observed.
    pub fn first_seen(&self, handle: &str) -> Option<u32> {
        self.live.get(handle).map(|entry| entry.first_seen)
    }

    pub fn contains(&self, handle: &str) -> bool {
        self.live.contains_key(handle)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

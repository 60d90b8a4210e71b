//! Ball trigger classification and overlap-entry tracking.

use std::collections::HashSet;
use std::hash::Hash;

use volleyball_shared::types::{Event, RegionTag};

/// Semantic event for a tagged region the ball entered.
pub fn classify(tag: RegionTag) -> Option<Event> {
    match tag {
        RegionTag::Boundary => Some(Event::BallOutOfBounds),
        RegionTag::BlueBoundary => Some(Event::BallEnteredBlueArea),
        RegionTag::PurpleBoundary => Some(Event::BallEnteredPurpleArea),
        RegionTag::PurpleGoal => Some(Event::BallHitPurpleGoal),
        RegionTag::BlueGoal => Some(Event::BallHitBlueGoal),
        RegionTag::Untagged => None,
    }
}

/// Turns per-tick "currently touching" sets into entry edges. Staying in
/// contact fires once; separating and touching again fires again.
#[derive(Debug, Clone)]
pub struct EntryTracker<K> {
    inside: HashSet<K>,
}

impl<K: Copy + Eq + Hash> EntryTracker<K> {
    pub fn new() -> Self {
        Self {
            inside: HashSet::new(),
        }
    }

    /// Record this tick's contacts and return the ones that are new, in
    /// the order given.
    pub fn update(&mut self, current: &[K]) -> Vec<K> {
        let mut now = HashSet::with_capacity(current.len());
        let mut entered = Vec::new();
        for key in current {
            if now.insert(*key) && !self.inside.contains(key) {
                entered.push(*key);
            }
        }
        self.inside = now;
        entered
    }

    /// Forget everything, e.g. after the ball was teleported.
    pub fn clear(&mut self) {
        self.inside.clear();
    }

    pub fn is_inside(&self, key: &K) -> bool {
        self.inside.contains(key)
    }
}

impl<K: Copy + Eq + Hash> Default for EntryTracker<K> {
    fn default() -> Self {
        Self::new()
    }
}

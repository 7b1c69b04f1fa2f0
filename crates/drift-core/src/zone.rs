//! Per-observer smoothing of rewrite events.
//!
//! A zone owns a local scalar that decays from 1.0 toward 0.0 over its
//! own duration once the bound default is rewritten. Zones watching the
//! same key never share state; the registry knows nothing about them.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use contracts::{EventKind, LifecycleState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ZoneId(u64);

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zone_{:04}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionZone {
    key: String,
    local_scalar: f64,
    target_scalar: f64,
    duration_seconds: f64,
}

impl TransitionZone {
    fn new(key: String, duration_seconds: f64) -> Self {
        Self {
            key,
            local_scalar: 1.0,
            target_scalar: 1.0,
            duration_seconds,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn current_scalar(&self) -> f64 {
        self.local_scalar
    }

    pub fn target_scalar(&self) -> f64 {
        self.target_scalar
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    pub fn is_settled(&self) -> bool {
        self.local_scalar == self.target_scalar
    }

    fn on_rewritten(&mut self) {
        self.target_scalar = 0.0;
    }

    /// Late-join catch-up: if the bound default was rewritten before this
    /// zone existed, snap straight to 0.0 with no replayed decay.
    fn sync_to_state(&mut self, state: LifecycleState) {
        if state.is_rewritten() {
            self.local_scalar = 0.0;
            self.target_scalar = 0.0;
        }
    }

    fn resync(&mut self) {
        self.local_scalar = 1.0;
        self.target_scalar = 1.0;
    }

    /// Moves the local scalar toward the target at `1 / duration` per
    /// second. Linear, never overshoots; reaches the target in exactly
    /// `duration` seconds of accumulated delta time.
    fn advance(&mut self, delta_seconds: f64) {
        if delta_seconds <= 0.0 || self.is_settled() {
            return;
        }
        if self.duration_seconds <= 0.0 {
            self.local_scalar = self.target_scalar;
            return;
        }
        let step = delta_seconds / self.duration_seconds;
        if self.local_scalar > self.target_scalar {
            self.local_scalar = (self.local_scalar - step).max(self.target_scalar);
        } else {
            self.local_scalar = (self.local_scalar + step).min(self.target_scalar);
        }
    }
}

/// Registration and fan-out for an open set of zones. Forwards rewrite
/// notifications to every zone bound to the rewritten key and re-snaps
/// all zones on a full resync.
#[derive(Debug, Default)]
pub struct ZoneManager {
    zones: BTreeMap<u64, TransitionZone>,
    bindings: BTreeMap<String, BTreeSet<u64>>,
    next_zone_id: u64,
}

impl ZoneManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: impl Into<String>, duration_seconds: f64) -> ZoneId {
        let key = key.into();
        self.next_zone_id += 1;
        let id = self.next_zone_id;
        self.bindings.entry(key.clone()).or_default().insert(id);
        self.zones.insert(id, TransitionZone::new(key, duration_seconds));
        ZoneId(id)
    }

    /// Stops all future notifications for the zone. Its last scalar is
    /// returned as-is; discarding it is the caller's business.
    pub fn deregister(&mut self, id: ZoneId) -> Option<TransitionZone> {
        let zone = self.zones.remove(&id.0)?;
        if let Some(bound) = self.bindings.get_mut(zone.key()) {
            bound.remove(&id.0);
            if bound.is_empty() {
                self.bindings.remove(zone.key());
            }
        }
        Some(zone)
    }

    pub fn zone(&self, id: ZoneId) -> Option<&TransitionZone> {
        self.zones.get(&id.0)
    }

    pub fn scalar(&self, id: ZoneId) -> Option<f64> {
        self.zones.get(&id.0).map(TransitionZone::current_scalar)
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn sync_to_state(&mut self, id: ZoneId, state: LifecycleState) -> bool {
        match self.zones.get_mut(&id.0) {
            Some(zone) => {
                zone.sync_to_state(state);
                true
            }
            None => false,
        }
    }

    pub fn advance(&mut self, id: ZoneId, delta_seconds: f64) -> Option<f64> {
        let zone = self.zones.get_mut(&id.0)?;
        zone.advance(delta_seconds);
        Some(zone.current_scalar())
    }

    pub fn advance_all(&mut self, delta_seconds: f64) {
        for zone in self.zones.values_mut() {
            zone.advance(delta_seconds);
        }
    }

    pub fn on_event(&mut self, kind: &EventKind) {
        match kind {
            EventKind::DefaultRewritten { key, .. } => {
                let Some(bound) = self.bindings.get(key) else {
                    return;
                };
                for id in bound.clone() {
                    if let Some(zone) = self.zones.get_mut(&id) {
                        zone.on_rewritten();
                    }
                }
            }
            EventKind::DefaultsResync => {
                for zone in self.zones.values_mut() {
                    zone.resync();
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewritten(key: &str) -> EventKind {
        EventKind::DefaultRewritten {
            key: key.to_string(),
            new_value: 0.5,
        }
    }

    #[test]
    fn zone_starts_fully_unrewritten() {
        let mut manager = ZoneManager::new();
        let id = manager.register("timing_window", 2.0);
        assert_eq!(manager.scalar(id), Some(1.0));
        manager.advance(id, 1.0);
        // No rewrite observed yet; nothing to decay toward.
        assert_eq!(manager.scalar(id), Some(1.0));
    }

    #[test]
    fn decay_reaches_zero_in_exactly_duration_seconds() {
        let mut manager = ZoneManager::new();
        let id = manager.register("timing_window", 2.0);
        manager.on_event(&rewritten("timing_window"));

        manager.advance(id, 0.5);
        assert!((manager.scalar(id).expect("zone") - 0.75).abs() < 1e-12);
        manager.advance(id, 1.5);
        assert_eq!(manager.scalar(id), Some(0.0));
        manager.advance(id, 1.0);
        assert_eq!(manager.scalar(id), Some(0.0)); // never overshoots
    }

    #[test]
    fn zones_on_the_same_key_decay_independently() {
        let mut manager = ZoneManager::new();
        let fast = manager.register("timing_window", 1.0);
        let slow = manager.register("timing_window", 4.0);
        manager.on_event(&rewritten("timing_window"));

        manager.advance(fast, 0.5);
        assert!((manager.scalar(fast).expect("zone") - 0.5).abs() < 1e-12);
        assert_eq!(manager.scalar(slow), Some(1.0));
    }

    #[test]
    fn rewrite_of_an_unbound_key_leaves_zones_alone() {
        let mut manager = ZoneManager::new();
        let id = manager.register("timing_window", 1.0);
        manager.on_event(&rewritten("screen_shake"));
        manager.advance(id, 1.0);
        assert_eq!(manager.scalar(id), Some(1.0));
    }

    #[test]
    fn sync_to_state_snaps_without_replaying_the_decay() {
        let mut manager = ZoneManager::new();
        let id = manager.register("timing_window", 3.0);
        assert!(manager.sync_to_state(id, LifecycleState::Rewritten));
        assert_eq!(manager.scalar(id), Some(0.0));

        let late = manager.register("timing_window", 3.0);
        assert!(manager.sync_to_state(late, LifecycleState::Read));
        assert_eq!(manager.scalar(late), Some(1.0));
    }

    #[test]
    fn resync_is_the_only_way_a_scalar_rises() {
        let mut manager = ZoneManager::new();
        let id = manager.register("timing_window", 1.0);
        manager.on_event(&rewritten("timing_window"));
        manager.advance(id, 0.25);
        let mut previous = manager.scalar(id).expect("zone");
        for _ in 0..8 {
            manager.advance(id, 0.1);
            let current = manager.scalar(id).expect("zone");
            assert!(current <= previous);
            previous = current;
        }

        manager.on_event(&EventKind::DefaultsResync);
        assert_eq!(manager.scalar(id), Some(1.0));
    }

    #[test]
    fn deregistered_zone_stops_receiving_notifications() {
        let mut manager = ZoneManager::new();
        let id = manager.register("timing_window", 1.0);
        let zone = manager.deregister(id).expect("registered");
        assert_eq!(zone.current_scalar(), 1.0);
        assert!(manager.is_empty());
        assert_eq!(manager.scalar(id), None);
        manager.on_event(&rewritten("timing_window"));
    }

    #[test]
    fn zero_duration_zone_snaps_on_first_advance() {
        let mut manager = ZoneManager::new();
        let id = manager.register("screen_shake", 0.0);
        manager.on_event(&rewritten("screen_shake"));
        manager.advance(id, 0.016);
        assert_eq!(manager.scalar(id), Some(0.0));
    }
}

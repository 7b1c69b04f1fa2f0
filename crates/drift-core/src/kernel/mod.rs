//! The explicitly-owned kernel context.
//!
//! Owns the registry, the tracker, the zone manager, the external event
//! bus, and the append-only event log. Every mutation goes through here;
//! internal sinks run synchronously before the call returns, external
//! observers receive the same events in their mailboxes.


use contracts::{
    DefaultCategory, DefaultDescription, DriftLevel, Event, EventKind, EventType, KernelConfig,
    LifecycleState, Manifest, ManifestError, Phase, RegistryError, ScanSummary, SessionRecord,
};
use serde_json::{json, Value};

use crate::events::{EventBus, Subscription};
use crate::registry::{DefaultsRegistry, RewriteOutcome};
use crate::tracker::{ProgressTracker, TrackerDelta};
use crate::zone::{ZoneId, ZoneManager};

#[derive(Debug)]
pub struct DriftKernel {
    config: KernelConfig,
    registry: DefaultsRegistry,
    tracker: ProgressTracker,
    zones: ZoneManager,
    bus: EventBus,
    event_log: Vec<Event>,
    next_sequence: u64,
}

impl DriftKernel {
    pub fn new(manifest: &Manifest, config: KernelConfig) -> Result<Self, ManifestError> {
        let registry = DefaultsRegistry::from_manifest(manifest)?;
        let tracker = ProgressTracker::new(registry.len(), config.total_chapters);
        Ok(Self {
            config,
            registry,
            tracker,
            zones: ZoneManager::new(),
            bus: EventBus::new(),
            event_log: Vec::new(),
            next_sequence: 0,
        })
    }

    // -- queries -------------------------------------------------------

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn registry(&self) -> &DefaultsRegistry {
        &self.registry
    }

    pub fn get_value(&self, key: &str) -> Result<f64, RegistryError> {
        self.registry.get_value(key)
    }

    pub fn describe(&self, key: &str) -> Result<DefaultDescription, RegistryError> {
        self.registry.describe(key)
    }

    pub fn list_by_state(
        &self,
        predicate: impl Fn(LifecycleState) -> bool,
    ) -> Vec<DefaultDescription> {
        self.registry.list_by_state(predicate)
    }

    pub fn list_readable(&self) -> Vec<DefaultDescription> {
        self.registry.list_readable()
    }

    pub fn list_rewritable(&self) -> Vec<DefaultDescription> {
        self.registry.list_rewritable()
    }

    pub fn by_category(&self, category: DefaultCategory) -> Vec<DefaultDescription> {
        self.registry.by_category(category)
    }

    pub fn scan_area(&self, keys: &[&str]) -> Vec<ScanSummary> {
        self.registry.scan_area(keys)
    }

    pub fn progress_fraction(&self) -> f64 {
        self.registry.progress_fraction()
    }

    pub fn read_count(&self) -> usize {
        self.registry.read_count()
    }

    pub fn rewritten_count(&self) -> usize {
        self.registry.rewritten_count()
    }

    pub fn all_rewritten(&self) -> bool {
        self.registry.all_rewritten()
    }

    pub fn drift(&self) -> f64 {
        self.tracker.drift()
    }

    pub fn phase(&self) -> Phase {
        self.tracker.phase()
    }

    pub fn drift_level(&self) -> DriftLevel {
        self.tracker.drift_level()
    }

    pub fn current_chapter(&self) -> u32 {
        self.tracker.current_chapter()
    }

    pub fn civic_rules_restored(&self) -> Vec<String> {
        self.tracker.civic_rules_restored().iter().cloned().collect()
    }

    pub fn derivation_clamps(&self) -> u64 {
        self.tracker.derivation_clamps()
    }

    pub fn events(&self) -> &[Event] {
        &self.event_log
    }

    pub fn inspect_default(&self, key: &str) -> Option<Value> {
        self.registry.describe(key).ok().map(|desc| {
            json!({
                "key": desc.key,
                "label": desc.label,
                "category": desc.category.to_string(),
                "state": desc.state.to_string(),
                "initial_value": desc.initial_value,
                "target_value": desc.target_value,
                "current_value": desc.current_value,
            })
        })
    }

    pub fn inspect_progress(&self) -> Value {
        json!({
            "session_id": self.config.session_id,
            "drift": self.tracker.drift(),
            "drift_level": self.tracker.drift_level(),
            "phase": self.tracker.phase(),
            "progress_fraction": self.registry.progress_fraction(),
            "read_count": self.registry.read_count(),
            "rewritten_count": self.registry.rewritten_count(),
            "current_chapter": self.tracker.current_chapter(),
            "total_chapters": self.tracker.total_chapters(),
            "civic_rules_restored": self.tracker.civic_rules_restored(),
            "derivation_clamps": self.tracker.derivation_clamps(),
            "event_count": self.event_log.len(),
            "zone_count": self.zones.len(),
        })
    }

    // -- lifecycle mutations ---------------------------------------------

    /// Reveal a default. Idempotent: repeat reads return the description
    /// without re-announcing the reveal.
    pub fn read(&mut self, key: &str) -> Result<DefaultDescription, RegistryError> {
        let outcome = self.registry.read(key)?;
        if outcome.first_read {
            self.dispatch(EventKind::DefaultRead {
                key: key.to_string(),
            });
        }
        Ok(outcome.description)
    }

    /// Replace a default that has been read. On success the rewritten and
    /// value-changed events fire, then the tracker recomputes drift and
    /// phase; everything is delivered before this returns.
    pub fn rewrite(&mut self, key: &str) -> Result<RewriteOutcome, RegistryError> {
        let outcome = self.registry.rewrite(key)?;
        if let RewriteOutcome::Applied { new_value } = outcome {
            self.dispatch(EventKind::DefaultRewritten {
                key: key.to_string(),
                new_value,
            });
            self.dispatch(EventKind::ValueChanged {
                key: key.to_string(),
                new_value,
            });
            let delta = self.tracker.on_default_rewritten();
            self.dispatch_tracker_delta(delta);
        }
        Ok(outcome)
    }

    /// Narrative progress source, independent of rewrites. Returns
    /// `false` once the final chapter is reached.
    pub fn advance_chapter(&mut self) -> bool {
        let Some(delta) = self.tracker.advance_chapter() else {
            return false;
        };
        self.dispatch(EventKind::ChapterAdvanced {
            chapter: self.tracker.current_chapter(),
        });
        self.dispatch_tracker_delta(delta);
        true
    }

    /// Records the rule and decrements drift once; restoring the same
    /// rule again is a no-op.
    pub fn restore_civic_rule(&mut self, rule_id: &str) -> bool {
        let Some(delta) = self.tracker.restore_civic_rule(rule_id) else {
            return false;
        };
        self.dispatch(EventKind::CivicRuleRestored {
            rule_id: rule_id.to_string(),
        });
        self.dispatch_tracker_delta(delta);
        true
    }

    /// Session reset. No per-key events; one resync signal tells every
    /// observer to rebuild from current state.
    pub fn reset_all(&mut self) {
        self.registry.reset_all();
        self.tracker.reset();
        self.dispatch(EventKind::DefaultsResync);
    }

    // -- zones -----------------------------------------------------------

    /// Binds a new zone to a key. The key must exist in the manifest;
    /// the zone starts fully un-rewritten regardless of current state.
    pub fn register_zone(
        &mut self,
        key: &str,
        duration_seconds: f64,
    ) -> Result<ZoneId, RegistryError> {
        if !self.registry.contains_key(key) {
            return Err(RegistryError::UnknownKey(key.to_string()));
        }
        Ok(self.zones.register(key, duration_seconds))
    }

    pub fn register_zone_with_default_duration(
        &mut self,
        key: &str,
    ) -> Result<ZoneId, RegistryError> {
        self.register_zone(key, self.config.default_zone_duration_seconds)
    }

    pub fn deregister_zone(&mut self, id: ZoneId) -> bool {
        self.zones.deregister(id).is_some()
    }

    /// Late-join catch-up for a zone bound to an already-rewritten key.
    pub fn sync_zone_to_current(&mut self, id: ZoneId) -> bool {
        let Some(key) = self.zones.zone(id).map(|zone| zone.key().to_string()) else {
            return false;
        };
        match self.registry.state(&key) {
            Ok(state) => self.zones.sync_to_state(id, state),
            Err(_) => false,
        }
    }

    pub fn advance_zone(&mut self, id: ZoneId, delta_seconds: f64) -> Option<f64> {
        self.zones.advance(id, delta_seconds)
    }

    pub fn advance_zones(&mut self, delta_seconds: f64) {
        self.zones.advance_all(delta_seconds);
    }

    pub fn zone_scalar(&self, id: ZoneId) -> Option<f64> {
        self.zones.scalar(id)
    }

    // -- external observers ------------------------------------------------

    pub fn subscribe(&mut self) -> Subscription {
        self.bus.subscribe()
    }

    pub fn subscribe_filtered(
        &mut self,
        types: impl IntoIterator<Item = EventType>,
    ) -> Subscription {
        self.bus.subscribe_filtered(types)
    }

    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.bus.unsubscribe(subscription)
    }

    pub fn drain(&mut self, subscription: &Subscription) -> Vec<Event> {
        self.bus.drain(subscription)
    }

    pub fn pending_events(&self, subscription: &Subscription) -> usize {
        self.bus.pending_count(subscription)
    }

    // -- session -----------------------------------------------------------

    pub fn session_records(&self) -> Vec<SessionRecord> {
        self.registry.session_records()
    }

    /// Replays lifecycle records through the validated read/rewrite path.
    /// `Rewritten` stays unreachable except via `Read`, exactly as in a
    /// live session.
    pub fn replay_session(&mut self, records: &[SessionRecord]) -> Result<(), RegistryError> {
        for record in records {
            match record.state {
                LifecycleState::Unread => {}
                LifecycleState::Read => {
                    self.read(&record.key)?;
                }
                LifecycleState::Rewritten => {
                    self.read(&record.key)?;
                    self.rewrite(&record.key)?;
                }
            }
        }
        Ok(())
    }

    // -- dispatch ------------------------------------------------------------

    fn dispatch(&mut self, kind: EventKind) {
        self.next_sequence += 1;
        let event = Event::new(self.next_sequence, kind);
        self.zones.on_event(&event.kind);
        self.bus.publish(&event);
        self.event_log.push(event);
    }

    fn dispatch_tracker_delta(&mut self, delta: TrackerDelta) {
        self.dispatch(EventKind::DriftChanged { drift: delta.drift });
        if let Some(phase) = delta.phase_change {
            self.dispatch(EventKind::PhaseChanged { phase });
        }
    }
}

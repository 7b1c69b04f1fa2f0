//! The Default entity and the registry that owns the full collection.

use std::collections::BTreeMap;

use contracts::{
    DefaultCategory, DefaultDescription, LifecycleState, Manifest, ManifestError, RegistryError,
    ScanSummary, SessionRecord,
};

const SCAN_HINT_MAX_CHARS: usize = 60;

/// One rewritable default. `current_value` is always one of the two
/// endpoints; intermediate visual interpolation belongs to zones.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultEntry {
    key: String,
    label: String,
    description: String,
    category: DefaultCategory,
    initial_value: f64,
    target_value: f64,
    current_value: f64,
    state: LifecycleState,
}

impl DefaultEntry {
    fn from_manifest(entry: &contracts::ManifestEntry) -> Self {
        Self {
            key: entry.key.clone(),
            label: entry.label.clone(),
            description: entry.description.clone(),
            category: entry.category,
            initial_value: entry.initial_value,
            target_value: entry.target_value,
            current_value: entry.initial_value,
            state: LifecycleState::Unread,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn category(&self) -> DefaultCategory {
        self.category
    }

    pub fn current_value(&self) -> f64 {
        self.current_value
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn describe(&self) -> DefaultDescription {
        DefaultDescription {
            key: self.key.clone(),
            label: self.label.clone(),
            description: self.description.clone(),
            category: self.category,
            initial_value: self.initial_value,
            target_value: self.target_value,
            current_value: self.current_value,
            state: self.state,
        }
    }

    /// Transitions `Unread -> Read`. Reading an already-read or
    /// already-rewritten default is a legal no-op and never regresses
    /// state. Returns whether this call performed the transition.
    fn read(&mut self) -> bool {
        if self.state == LifecycleState::Unread {
            self.state = LifecycleState::Read;
            true
        } else {
            false
        }
    }

    /// Transitions `Read -> Rewritten` and flips the current value to the
    /// target endpoint. The read gate is deliberate: an unread default is
    /// never auto-read on the way through.
    fn rewrite(&mut self) -> RewriteOutcome {
        match self.state {
            LifecycleState::Unread => RewriteOutcome::NotYetRead,
            LifecycleState::Rewritten => RewriteOutcome::AlreadyRewritten,
            LifecycleState::Read => {
                self.state = LifecycleState::Rewritten;
                self.current_value = self.target_value;
                RewriteOutcome::Applied {
                    new_value: self.current_value,
                }
            }
        }
    }

    fn reset(&mut self) {
        self.state = LifecycleState::Unread;
        self.current_value = self.initial_value;
    }
}

/// Result of a registry `read`: the description plus whether the call
/// performed the first-time `Unread -> Read` transition.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadOutcome {
    pub description: DefaultDescription,
    pub first_read: bool,
}

/// Result of a registry `rewrite`. The two no-op cases are distinct so
/// a caller-logic bug (rewrite before read) can be surfaced while an
/// idempotent repeat stays silent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RewriteOutcome {
    Applied { new_value: f64 },
    NotYetRead,
    AlreadyRewritten,
}

impl RewriteOutcome {
    pub fn applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Central mapping from key to default. Keys are unique; manifest order
/// is preserved for deterministic enumeration.
#[derive(Debug, Clone)]
pub struct DefaultsRegistry {
    defaults: BTreeMap<String, DefaultEntry>,
    manifest_order: Vec<String>,
}

impl DefaultsRegistry {
    pub fn from_manifest(manifest: &Manifest) -> Result<Self, ManifestError> {
        manifest.validate()?;
        let mut defaults = BTreeMap::new();
        let mut manifest_order = Vec::with_capacity(manifest.entries.len());
        for entry in &manifest.entries {
            defaults.insert(entry.key.clone(), DefaultEntry::from_manifest(entry));
            manifest_order.push(entry.key.clone());
        }
        Ok(Self {
            defaults,
            manifest_order,
        })
    }

    fn entry(&self, key: &str) -> Result<&DefaultEntry, RegistryError> {
        self.defaults
            .get(key)
            .ok_or_else(|| RegistryError::UnknownKey(key.to_string()))
    }

    fn entry_mut(&mut self, key: &str) -> Result<&mut DefaultEntry, RegistryError> {
        self.defaults
            .get_mut(key)
            .ok_or_else(|| RegistryError::UnknownKey(key.to_string()))
    }

    // -- queries -------------------------------------------------------

    pub fn get_value(&self, key: &str) -> Result<f64, RegistryError> {
        Ok(self.entry(key)?.current_value())
    }

    pub fn describe(&self, key: &str) -> Result<DefaultDescription, RegistryError> {
        Ok(self.entry(key)?.describe())
    }

    pub fn state(&self, key: &str) -> Result<LifecycleState, RegistryError> {
        Ok(self.entry(key)?.state())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.defaults.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.manifest_order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.defaults.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defaults.is_empty()
    }

    pub fn list_by_state(
        &self,
        predicate: impl Fn(LifecycleState) -> bool,
    ) -> Vec<DefaultDescription> {
        self.manifest_order
            .iter()
            .filter_map(|key| self.defaults.get(key))
            .filter(|entry| predicate(entry.state()))
            .map(DefaultEntry::describe)
            .collect()
    }

    pub fn list_readable(&self) -> Vec<DefaultDescription> {
        self.list_by_state(LifecycleState::is_readable)
    }

    pub fn list_rewritable(&self) -> Vec<DefaultDescription> {
        self.list_by_state(LifecycleState::is_rewritable)
    }

    pub fn by_category(&self, category: DefaultCategory) -> Vec<DefaultDescription> {
        self.manifest_order
            .iter()
            .filter_map(|key| self.defaults.get(key))
            .filter(|entry| entry.category() == category)
            .map(DefaultEntry::describe)
            .collect()
    }

    /// Discovery loop for presentation layers: summaries of the given
    /// keys that are still unread. Unknown keys are skipped, not errors.
    pub fn scan_area(&self, keys: &[&str]) -> Vec<ScanSummary> {
        keys.iter()
            .filter_map(|key| self.defaults.get(*key))
            .filter(|entry| entry.state() == LifecycleState::Unread)
            .map(|entry| ScanSummary {
                key: entry.key.clone(),
                label: entry.label.clone(),
                category: entry.category,
                hint: truncate_hint(&entry.description),
            })
            .collect()
    }

    pub fn progress_fraction(&self) -> f64 {
        if self.defaults.is_empty() {
            return 0.0;
        }
        self.rewritten_count() as f64 / self.defaults.len() as f64
    }

    pub fn read_count(&self) -> usize {
        self.defaults
            .values()
            .filter(|entry| entry.state() != LifecycleState::Unread)
            .count()
    }

    pub fn rewritten_count(&self) -> usize {
        self.defaults
            .values()
            .filter(|entry| entry.state().is_rewritten())
            .count()
    }

    pub fn all_rewritten(&self) -> bool {
        self.defaults
            .values()
            .all(|entry| entry.state().is_rewritten())
    }

    pub fn session_records(&self) -> Vec<SessionRecord> {
        self.manifest_order
            .iter()
            .filter_map(|key| self.defaults.get(key))
            .map(|entry| SessionRecord {
                key: entry.key.clone(),
                state: entry.state(),
            })
            .collect()
    }

    // -- mutations -----------------------------------------------------

    pub fn read(&mut self, key: &str) -> Result<ReadOutcome, RegistryError> {
        let entry = self.entry_mut(key)?;
        let first_read = entry.read();
        Ok(ReadOutcome {
            description: entry.describe(),
            first_read,
        })
    }

    pub fn rewrite(&mut self, key: &str) -> Result<RewriteOutcome, RegistryError> {
        Ok(self.entry_mut(key)?.rewrite())
    }

    /// Bulk session reset. Emits nothing itself; the kernel publishes a
    /// single resync signal instead of per-key transitions.
    pub fn reset_all(&mut self) {
        for entry in self.defaults.values_mut() {
            entry.reset();
        }
    }
}

fn truncate_hint(description: &str) -> String {
    if description.chars().count() <= SCAN_HINT_MAX_CHARS {
        return description.to_string();
    }
    let mut hint = description
        .chars()
        .take(SCAN_HINT_MAX_CHARS)
        .collect::<String>();
    hint.push('…');
    hint
}

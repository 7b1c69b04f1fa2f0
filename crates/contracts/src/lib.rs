//! v1 cross-boundary contracts for the defaults kernel, CLI, and host embeddings.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION_V1: &str = "1.0";

/// Which aspect of the world a default governs. Used for bulk queries
/// only; transition rules never branch on it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DefaultCategory {
    Timing,
    Sensory,
    Routing,
    Social,
    Failure,
    Consent,
}

impl fmt::Display for DefaultCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Timing => "timing",
            Self::Sensory => "sensory",
            Self::Routing => "routing",
            Self::Social => "social",
            Self::Failure => "failure",
            Self::Consent => "consent",
        };
        write!(f, "{name}")
    }
}

/// Lifecycle of a single default. Transitions are one-directional:
/// `Rewritten` is reachable only from `Read`, `Read` only from `Unread`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Unread,
    Read,
    Rewritten,
}

impl LifecycleState {
    pub fn is_readable(self) -> bool {
        matches!(self, Self::Unread)
    }

    pub fn is_rewritable(self) -> bool {
        matches!(self, Self::Read)
    }

    pub fn is_rewritten(self) -> bool {
        matches!(self, Self::Rewritten)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unread => "unread",
            Self::Read => "read",
            Self::Rewritten => "rewritten",
        };
        write!(f, "{name}")
    }
}

/// Discrete, threshold-derived classification of the drift scalar.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Corrupted,
    Stabilizing,
    Restored,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Corrupted => "corrupted",
            Self::Stabilizing => "stabilizing",
            Self::Restored => "restored",
        };
        write!(f, "{name}")
    }
}

/// Coarse qualitative bucket over the drift scalar, for presentation
/// layers that do not want the raw fraction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DriftLevel {
    None,
    Low,
    Moderate,
    High,
    Critical,
}

impl DriftLevel {
    pub fn from_intensity(drift: f64) -> Self {
        if drift <= 0.0 {
            Self::None
        } else if drift <= 0.25 {
            Self::Low
        } else if drift <= 0.5 {
            Self::Moderate
        } else if drift <= 0.75 {
            Self::High
        } else {
            Self::Critical
        }
    }
}

/// One entry in the static startup manifest. Lifecycle state is session
/// state and never appears here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManifestEntry {
    pub key: String,
    pub label: String,
    pub description: String,
    pub category: DefaultCategory,
    pub initial_value: f64,
    pub target_value: f64,
}

/// The versioned set of defaults loaded at kernel construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Manifest {
    pub schema_version: String,
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn new(entries: Vec<ManifestEntry>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            entries,
        }
    }

    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.entries.is_empty() {
            return Err(ManifestError::EmptyManifest);
        }
        let mut seen = std::collections::BTreeSet::new();
        for entry in &self.entries {
            if !seen.insert(entry.key.as_str()) {
                return Err(ManifestError::DuplicateKey(entry.key.clone()));
            }
        }
        Ok(())
    }
}

/// Structured description of one default, returned by `read` and the
/// listing queries for presentation layers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DefaultDescription {
    pub key: String,
    pub label: String,
    pub description: String,
    pub category: DefaultCategory,
    pub initial_value: f64,
    pub target_value: f64,
    pub current_value: f64,
    pub state: LifecycleState,
}

/// Summary of a still-unread default surfaced by an area scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanSummary {
    pub key: String,
    pub label: String,
    pub category: DefaultCategory,
    pub hint: String,
}

/// Flat per-key lifecycle record, sufficient to replay a session through
/// the validated read/rewrite path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionRecord {
    pub key: String,
    pub state: LifecycleState,
}

/// A saved session: lifecycle records plus aggregate progression.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionDocument {
    pub schema_version: String,
    pub session_id: String,
    pub current_chapter: u32,
    pub civic_rules_restored: Vec<String>,
    pub records: Vec<SessionRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KernelConfig {
    pub schema_version: String,
    pub session_id: String,
    pub total_chapters: u32,
    pub default_zone_duration_seconds: f64,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            session_id: "session_local_001".to_string(),
            total_chapters: 12,
            default_zone_duration_seconds: 1.5,
        }
    }
}

/// Flat event discriminant, used for subscription filters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    DefaultRead,
    DefaultRewritten,
    ValueChanged,
    DriftChanged,
    PhaseChanged,
    ChapterAdvanced,
    CivicRuleRestored,
    DefaultsResync,
}

/// Typed event payload published by the kernel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    DefaultRead { key: String },
    DefaultRewritten { key: String, new_value: f64 },
    ValueChanged { key: String, new_value: f64 },
    DriftChanged { drift: f64 },
    PhaseChanged { phase: Phase },
    ChapterAdvanced { chapter: u32 },
    CivicRuleRestored { rule_id: String },
    DefaultsResync,
}

impl EventKind {
    pub fn event_type(&self) -> EventType {
        match self {
            Self::DefaultRead { .. } => EventType::DefaultRead,
            Self::DefaultRewritten { .. } => EventType::DefaultRewritten,
            Self::ValueChanged { .. } => EventType::ValueChanged,
            Self::DriftChanged { .. } => EventType::DriftChanged,
            Self::PhaseChanged { .. } => EventType::PhaseChanged,
            Self::ChapterAdvanced { .. } => EventType::ChapterAdvanced,
            Self::CivicRuleRestored { .. } => EventType::CivicRuleRestored,
            Self::DefaultsResync => EventType::DefaultsResync,
        }
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            Self::DefaultRead { key }
            | Self::DefaultRewritten { key, .. }
            | Self::ValueChanged { key, .. } => Some(key),
            _ => None,
        }
    }
}

/// A single published event, sequence-numbered in emission order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub schema_version: String,
    pub sequence: u64,
    pub kind: EventKind,
}

impl Event {
    pub fn new(sequence: u64, kind: EventKind) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            sequence,
            kind,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "error", content = "detail")]
pub enum RegistryError {
    /// Query or mutation referenced a key absent from the manifest.
    /// Recoverable; callers should degrade to their engine default.
    UnknownKey(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownKey(key) => write!(f, "unknown default key: {key}"),
        }
    }
}

impl std::error::Error for RegistryError {}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "error", content = "detail")]
pub enum ManifestError {
    EmptyManifest,
    DuplicateKey(String),
}

impl fmt::Display for ManifestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyManifest => write!(f, "manifest contains no entries"),
            Self::DuplicateKey(key) => write!(f, "manifest key registered twice: {key}"),
        }
    }
}

impl std::error::Error for ManifestError {}

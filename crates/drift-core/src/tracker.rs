//! Aggregate drift accumulator and phase derivation.
//!
//! Derived, not authoritative: downstream consumers watch one scalar and
//! one enum instead of enumerating every default. Only the count of
//! progress steps matters, never which key produced them.

use std::collections::BTreeSet;

use contracts::{DriftLevel, Phase};

const CORRUPTED_THRESHOLD: f64 = 0.5;
const RESTORED_EPSILON: f64 = 1e-9;

/// Result of one accumulator step: the drift value after the step and
/// the new phase if the step crossed a threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerDelta {
    pub drift: f64,
    pub phase_change: Option<Phase>,
}

#[derive(Debug, Clone)]
pub struct ProgressTracker {
    drift: f64,
    phase: Phase,
    rewrite_step: f64,
    chapter_step: f64,
    current_chapter: u32,
    total_chapters: u32,
    civic_rules_restored: BTreeSet<String>,
    derivation_clamps: u64,
}

impl ProgressTracker {
    pub fn new(total_defaults: usize, total_chapters: u32) -> Self {
        let rewrite_step = if total_defaults == 0 {
            0.0
        } else {
            1.0 / total_defaults as f64
        };
        let chapter_step = if total_chapters == 0 {
            0.0
        } else {
            1.0 / f64::from(total_chapters)
        };
        Self {
            drift: 1.0,
            phase: Self::phase_for(1.0),
            rewrite_step,
            chapter_step,
            current_chapter: 1,
            total_chapters,
            civic_rules_restored: BTreeSet::new(),
            derivation_clamps: 0,
        }
    }

    /// The one derivation rule. Pure and order-independent: equal drift
    /// always yields an equal phase, whatever path reached it.
    pub fn phase_for(drift: f64) -> Phase {
        if drift >= CORRUPTED_THRESHOLD {
            Phase::Corrupted
        } else if drift > RESTORED_EPSILON {
            Phase::Stabilizing
        } else {
            Phase::Restored
        }
    }

    // -- queries -------------------------------------------------------

    pub fn drift(&self) -> f64 {
        self.drift
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn drift_level(&self) -> DriftLevel {
        DriftLevel::from_intensity(self.drift)
    }

    pub fn current_chapter(&self) -> u32 {
        self.current_chapter
    }

    pub fn total_chapters(&self) -> u32 {
        self.total_chapters
    }

    pub fn civic_rules_restored(&self) -> &BTreeSet<String> {
        &self.civic_rules_restored
    }

    /// How many times the accumulator had to be clamped back into [0, 1]
    /// this session. Diagnostic counter; never surfaced as an error.
    pub fn derivation_clamps(&self) -> u64 {
        self.derivation_clamps
    }

    // -- progress sources ------------------------------------------------

    /// Per-key rewrite observed. Decrements by `1 / total_default_count`.
    pub fn on_default_rewritten(&mut self) -> TrackerDelta {
        self.apply_step(self.rewrite_step)
    }

    /// Narrative advancement. Same accumulator, same derivation path as
    /// rewrites; a rewrite that coincides with a chapter advance
    /// decrements twice by design. Returns `None` at the final chapter.
    pub fn advance_chapter(&mut self) -> Option<TrackerDelta> {
        if self.current_chapter >= self.total_chapters {
            return None;
        }
        self.current_chapter += 1;
        Some(self.apply_step(self.chapter_step))
    }

    /// Restoring the same rule twice decrements once.
    pub fn restore_civic_rule(&mut self, rule_id: &str) -> Option<TrackerDelta> {
        if !self.civic_rules_restored.insert(rule_id.to_string()) {
            return None;
        }
        Some(self.apply_step(self.chapter_step))
    }

    pub fn reset(&mut self) {
        self.drift = 1.0;
        self.phase = Self::phase_for(self.drift);
        self.current_chapter = 1;
        self.civic_rules_restored.clear();
        self.derivation_clamps = 0;
    }

    fn apply_step(&mut self, step: f64) -> TrackerDelta {
        self.drift -= step;
        if !(0.0..=1.0).contains(&self.drift) {
            self.drift = self.drift.clamp(0.0, 1.0);
            self.derivation_clamps += 1;
        }
        let derived = Self::phase_for(self.drift);
        let phase_change = if derived != self.phase {
            self.phase = derived;
            Some(derived)
        } else {
            None
        };
        TrackerDelta {
            drift: self.drift,
            phase_change,
        }
    }
}

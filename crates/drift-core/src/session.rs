//! Session capture and restore.
//!
//! The document holds flat `(key, state)` records plus aggregate
//! progression. Restore replays records through the kernel's validated
//! read/rewrite path rather than writing values directly.

use contracts::{RegistryError, SessionDocument, SCHEMA_VERSION_V1};

use crate::kernel::DriftKernel;

pub fn capture(kernel: &DriftKernel) -> SessionDocument {
    SessionDocument {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        session_id: kernel.config().session_id.clone(),
        current_chapter: kernel.current_chapter(),
        civic_rules_restored: kernel.civic_rules_restored(),
        records: kernel.session_records(),
    }
}

/// Rebuilds kernel state from a saved document: lifecycle records first,
/// then chapters and civic rules through their usual operations.
pub fn restore(kernel: &mut DriftKernel, document: &SessionDocument) -> Result<(), RegistryError> {
    kernel.replay_session(&document.records)?;
    while kernel.current_chapter() < document.current_chapter {
        if !kernel.advance_chapter() {
            break;
        }
    }
    for rule_id in &document.civic_rules_restored {
        kernel.restore_civic_rule(rule_id);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::society_manifest;
    use contracts::KernelConfig;

    fn fresh_kernel() -> DriftKernel {
        DriftKernel::new(&society_manifest(), KernelConfig::default()).expect("valid manifest")
    }

    #[test]
    fn capture_restore_round_trip() {
        let mut kernel = fresh_kernel();
        kernel.read("timing_window").expect("known key");
        kernel.rewrite("timing_window").expect("known key");
        kernel.read("screen_shake").expect("known key");
        kernel.advance_chapter();
        kernel.restore_civic_rule("rule:plural_routes");

        let document = capture(&kernel);
        let serialized = serde_json::to_string(&document).expect("serialize");
        let decoded: SessionDocument = serde_json::from_str(&serialized).expect("deserialize");

        let mut restored = fresh_kernel();
        restore(&mut restored, &decoded).expect("restore");

        assert_eq!(restored.session_records(), kernel.session_records());
        assert_eq!(restored.current_chapter(), kernel.current_chapter());
        assert!((restored.drift() - kernel.drift()).abs() < 1e-12);
        assert_eq!(restored.phase(), kernel.phase());
    }

    #[test]
    fn restore_fails_cleanly_on_unknown_record_keys() {
        let mut kernel = fresh_kernel();
        let document = SessionDocument {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            session_id: "session_local_001".to_string(),
            current_chapter: 1,
            civic_rules_restored: Vec::new(),
            records: vec![contracts::SessionRecord {
                key: "nonexistent".to_string(),
                state: contracts::LifecycleState::Rewritten,
            }],
        };
        assert!(restore(&mut kernel, &document).is_err());
    }
}

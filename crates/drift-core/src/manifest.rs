//! The built-in startup manifest: every rewritable default, its spectrum
//! endpoints, and its category. Lifecycle state is session state and
//! never appears here.

use contracts::{DefaultCategory, Manifest, ManifestEntry};

fn entry(
    key: &str,
    label: &str,
    description: &str,
    category: DefaultCategory,
    initial_value: f64,
    target_value: f64,
) -> ManifestEntry {
    ManifestEntry {
        key: key.to_string(),
        label: label.to_string(),
        description: description.to_string(),
        category,
        initial_value,
        target_value,
    }
}

pub fn society_manifest() -> Manifest {
    Manifest::new(vec![
        // timing
        entry(
            "timing_window",
            "Timing Window Width",
            "Assumes all players react within 200 ms. Penalises slower processing speeds.",
            DefaultCategory::Timing,
            0.2,
            0.5,
        ),
        entry(
            "platform_rhythm",
            "Platform Rhythm",
            "Platforms move at one fixed tempo. No accommodation for observation before action.",
            DefaultCategory::Timing,
            1.0,
            0.6,
        ),
        entry(
            "coyote_time",
            "Coyote Time",
            "Zero grace period after leaving a ledge. Assumes instant spatial awareness.",
            DefaultCategory::Timing,
            0.0,
            0.2,
        ),
        entry(
            "jump_buffer",
            "Jump Buffer Window",
            "No input buffering. Requires frame-perfect timing.",
            DefaultCategory::Timing,
            0.0,
            0.15,
        ),
        // sensory
        entry(
            "visual_clutter",
            "Visual Density",
            "All particle effects, decorations, and ambient motion rendered simultaneously. \
             Assumes high sensory filtering.",
            DefaultCategory::Sensory,
            1.0,
            0.4,
        ),
        entry(
            "audio_layering",
            "Audio Layering",
            "Multiple concurrent audio streams with no ducking. Assumes ability to parse \
             layered sound.",
            DefaultCategory::Sensory,
            1.0,
            0.5,
        ),
        entry(
            "screen_shake",
            "Screen Shake Intensity",
            "Full camera shake on impacts. Assumes vestibular comfort.",
            DefaultCategory::Sensory,
            1.0,
            0.0,
        ),
        // routing
        entry(
            "route_strictness",
            "Route Strictness",
            "Single valid path through each area. Penalises alternative approaches.",
            DefaultCategory::Routing,
            1.0,
            0.3,
        ),
        entry(
            "safe_route_visibility",
            "Safe Route Visibility",
            "Accessible routes are hidden behind harder paths. Assumes safe routes are \
             'easy mode'.",
            DefaultCategory::Routing,
            0.0,
            1.0,
        ),
        // social
        entry(
            "communication_rigidity",
            "Communication Mode",
            "Only one expression style is accepted. Penalises non-verbal or icon-based \
             communication.",
            DefaultCategory::Social,
            1.0,
            0.0,
        ),
        entry(
            "social_script_penalty",
            "Social Script Penalty",
            "NPCs penalise 'unexpected' dialogue responses. Assumes one correct \
             conversational flow.",
            DefaultCategory::Social,
            1.0,
            0.0,
        ),
        // failure
        entry(
            "failure_penalty",
            "Failure Penalty",
            "Falling or missing a jump resets significant progress. Assumes failure is \
             deviation, not information.",
            DefaultCategory::Failure,
            1.0,
            0.1,
        ),
        entry(
            "retry_cost",
            "Retry Cost",
            "Retrying a section costs resources. Assumes learning happens on the first attempt.",
            DefaultCategory::Failure,
            1.0,
            0.0,
        ),
        // consent
        entry(
            "consent_gates",
            "Consent Gates",
            "No confirmation before danger zones. Assumes willingness to proceed.",
            DefaultCategory::Consent,
            0.0,
            1.0,
        ),
        entry(
            "opt_out_available",
            "Opt-Out Availability",
            "No way to leave an encounter once started. Assumes commitment is always free.",
            DefaultCategory::Consent,
            0.0,
            1.0,
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_manifest_is_valid() {
        let manifest = society_manifest();
        assert!(manifest.validate().is_ok());
        assert_eq!(manifest.entries.len(), 15);
    }

    #[test]
    fn every_category_is_represented() {
        let manifest = society_manifest();
        for category in [
            DefaultCategory::Timing,
            DefaultCategory::Sensory,
            DefaultCategory::Routing,
            DefaultCategory::Social,
            DefaultCategory::Failure,
            DefaultCategory::Consent,
        ] {
            assert!(
                manifest
                    .entries
                    .iter()
                    .any(|entry| entry.category == category),
                "missing category {category}"
            );
        }
    }

    #[test]
    fn endpoints_are_distinct_for_every_entry() {
        for entry in society_manifest().entries {
            assert_ne!(entry.initial_value, entry.target_value, "{}", entry.key);
        }
    }
}

//! Consumer-side tuning readers.
//!
//! Pure rule layers: each sample pulls the current values from the
//! registry and an engine adapter turns them into physics, audio, or
//! routing calls. An unknown key means "no override" and falls back to
//! the engine default; it never aborts the sampling consumer.

use crate::registry::DefaultsRegistry;

const ENGINE_TIMING_WINDOW: f64 = 0.2;
const ENGINE_PLATFORM_RHYTHM: f64 = 1.0;
const ENGINE_COYOTE_TIME: f64 = 0.0;
const ENGINE_JUMP_BUFFER: f64 = 0.0;
const ENGINE_VISUAL_CLUTTER: f64 = 1.0;
const ENGINE_AUDIO_LAYERING: f64 = 1.0;
const ENGINE_SCREEN_SHAKE: f64 = 1.0;
const ENGINE_ROUTE_STRICTNESS: f64 = 1.0;
const ENGINE_SAFE_ROUTE_VISIBILITY: f64 = 0.0;

fn value_or(registry: &DefaultsRegistry, key: &str, engine_default: f64) -> f64 {
    registry.get_value(key).unwrap_or(engine_default)
}

/// Timing-side movement tuning, sampled once per tick by the traversal
/// layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementTuning {
    pub timing_window: f64,
    pub platform_rhythm: f64,
    pub coyote_time: f64,
    pub jump_buffer: f64,
}

impl MovementTuning {
    pub fn sample(registry: &DefaultsRegistry) -> Self {
        Self {
            timing_window: value_or(registry, "timing_window", ENGINE_TIMING_WINDOW),
            platform_rhythm: value_or(registry, "platform_rhythm", ENGINE_PLATFORM_RHYTHM),
            coyote_time: value_or(registry, "coyote_time", ENGINE_COYOTE_TIME),
            jump_buffer: value_or(registry, "jump_buffer", ENGINE_JUMP_BUFFER),
        }
    }
}

/// Sensory intensity levels for the render and audio mix layers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensoryMix {
    pub visual_clutter: f64,
    pub audio_layering: f64,
    pub screen_shake: f64,
}

impl SensoryMix {
    pub fn sample(registry: &DefaultsRegistry) -> Self {
        Self {
            visual_clutter: value_or(registry, "visual_clutter", ENGINE_VISUAL_CLUTTER),
            audio_layering: value_or(registry, "audio_layering", ENGINE_AUDIO_LAYERING),
            screen_shake: value_or(registry, "screen_shake", ENGINE_SCREEN_SHAKE),
        }
    }
}

/// Routing flexibility for the path layer. Flexibility is the inverse of
/// strictness: a fully strict world has one valid route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteTuning {
    pub route_flexibility: f64,
    pub safe_route_visibility: f64,
}

impl RouteTuning {
    pub fn sample(registry: &DefaultsRegistry) -> Self {
        Self {
            route_flexibility: 1.0
                - value_or(registry, "route_strictness", ENGINE_ROUTE_STRICTNESS),
            safe_route_visibility: value_or(
                registry,
                "safe_route_visibility",
                ENGINE_SAFE_ROUTE_VISIBILITY,
            ),
        }
    }
}

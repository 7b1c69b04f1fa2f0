//! Deterministic defaults kernel.
//!
//! A registry of named, individually-lifecycled defaults (reveal, then
//! replace), an aggregate drift tracker deriving a discrete phase from
//! accumulated progress, and per-observer transition zones that smooth
//! rewrites over local time. All state mutation goes through the
//! [`DriftKernel`] context; events are delivered synchronously, in
//! subscription order, before the mutating call returns.

pub mod events;
pub mod kernel;
pub mod manifest;
pub mod registry;
pub mod session;
pub mod tracker;
pub mod tuning;
pub mod zone;

pub use events::{EventBus, Subscription};
pub use kernel::DriftKernel;
pub use registry::{DefaultEntry, DefaultsRegistry, ReadOutcome, RewriteOutcome};
pub use tracker::{ProgressTracker, TrackerDelta};
pub use zone::{TransitionZone, ZoneId, ZoneManager};

//! Core traits and types for haptic-chain
//!
//! This crate provides the building blocks for scheduling timed haptic
//! feedback with a fluent, chainable API.
//!
//! # Core Concepts
//!
//! - **EffectKind**: The closed set of effects a chain can play
//! - **EffectChain**: Accumulates virtual time and schedules effects
//! - **Clock**: Source of "now" for a chain
//! - **Dispatcher**: Runs scheduled effects no earlier than their deadline
//! - **EffectBackend**: Produces the actual feedback
//!
//! # Basic Example
//!
//! ```ignore
//! use std::time::Duration;
//! use haptic_chain_core::prelude::*;
//!
//! let haptics = Haptics::new(TokioClock, TokioDispatcher::spawn(), TracingBackend);
//!
//! haptics
//!     .chain()
//!     .impact_occurred(ImpactStyle::Light)
//!     .then(Duration::from_secs(1))
//!     .notification_occurred(NotificationType::Success)
//!     .play();
//! ```
//!
//! # Deterministic Tests
//!
//! Swap in the [`testing`] collaborators to run chains without a runtime:
//! [`testing::VirtualClock`], [`testing::ManualDispatcher`] and
//! [`testing::RecordingBackend`] record every deadline and trigger so that
//! timings can be asserted exactly.

pub mod backend;
pub mod chain;
pub mod clock;
pub mod dispatch;
pub mod effect;
pub mod presets;
pub mod runtime;
pub mod testing;

// Core type exports
pub use chain::{EffectChain, Haptics};
pub use effect::{EffectKind, ImpactStyle, NotificationType};

// Collaborator exports
pub use backend::{EffectBackend, TracingBackend};
pub use clock::{Clock, TokioClock};
pub use dispatch::{Dispatcher, ScheduledAction};

// Runtime exports
pub use runtime::{DispatcherConfig, TokioDispatcher};

// Testing exports
pub use testing::{ManualDispatcher, RecordingBackend, Trigger, VirtualClock};

#[cfg(feature = "testing-time")]
pub use testing::{advance_time, pause_time, resume_time};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::backend::{EffectBackend, TracingBackend};
    pub use crate::chain::{EffectChain, Haptics};
    pub use crate::clock::{Clock, TokioClock};
    pub use crate::dispatch::{Dispatcher, ScheduledAction};
    pub use crate::effect::{EffectKind, ImpactStyle, NotificationType};
    pub use crate::runtime::{DispatcherConfig, TokioDispatcher};
}

//! haptic-chain: Chainable scheduling of timed haptic feedback
//!
//! Build a sequence of effects and delays with a fluent API; each effect is
//! handed to a dispatcher at its accumulated offset and played later.
//!
//! # Example
//! ```ignore
//! use std::time::Duration;
//! use haptic_chain::prelude::*;
//!
//! let haptics = Haptics::new(TokioClock, TokioDispatcher::spawn(), TracingBackend);
//!
//! haptics
//!     .chain()
//!     .selection_changed()
//!     .then(Duration::from_millis(200))
//!     .replay(3);
//! ```

// Re-export everything from core
pub use haptic_chain_core::*;

/// Prelude for convenient imports
pub mod prelude {
    // Chain building
    pub use haptic_chain_core::{EffectChain, EffectKind, Haptics, ImpactStyle, NotificationType};

    // Collaborators
    pub use haptic_chain_core::{Clock, Dispatcher, EffectBackend, ScheduledAction};

    // Runtime
    pub use haptic_chain_core::{DispatcherConfig, TokioClock, TokioDispatcher, TracingBackend};

    // Presets
    pub use haptic_chain_core::presets;
}

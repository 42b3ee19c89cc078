//! Feedback-producing backends
//!
//! An [`EffectBackend`] is the thing that actually moves a motor, plays a
//! tap, or whatever the host platform offers. Chains never call it directly
//! at scheduling time except for the `prepare_*` hints; triggers run later,
//! from inside the dispatcher.

use tracing::info;

use crate::effect::{EffectKind, ImpactStyle, NotificationType};

/// Executes feedback effects immediately when invoked.
///
/// A single backend is shared by every chain, so implementations must be
/// `Send + Sync`. Prepare hints are optional: they exist so platform
/// generators can warm up, and default to no-ops.
pub trait EffectBackend: Send + Sync + 'static {
    /// Warm up the selection generator.
    fn prepare_selection(&self) {}

    /// Warm up the impact generator for `style`.
    fn prepare_impact(&self, _style: ImpactStyle) {}

    /// Warm up the notification generator.
    fn prepare_notification(&self) {}

    /// Play a selection tick.
    fn selection_changed(&self);

    /// Play an impact of the given strength.
    fn impact_occurred(&self, style: ImpactStyle);

    /// Play a notification of the given type.
    fn notification_occurred(&self, kind: NotificationType);

    /// Route a prepare hint for `effect` to the matching generator.
    fn prepare(&self, effect: EffectKind) {
        match effect {
            EffectKind::None => {}
            EffectKind::SelectionChanged => self.prepare_selection(),
            EffectKind::LightImpact => self.prepare_impact(ImpactStyle::Light),
            EffectKind::MediumImpact => self.prepare_impact(ImpactStyle::Medium),
            EffectKind::HeavyImpact => self.prepare_impact(ImpactStyle::Heavy),
            EffectKind::NotificationSuccess
            | EffectKind::NotificationError
            | EffectKind::NotificationWarning => self.prepare_notification(),
        }
    }

    /// Play `effect` now. `EffectKind::None` does nothing.
    fn trigger(&self, effect: EffectKind) {
        match effect {
            EffectKind::None => {}
            EffectKind::SelectionChanged => self.selection_changed(),
            EffectKind::LightImpact => self.impact_occurred(ImpactStyle::Light),
            EffectKind::MediumImpact => self.impact_occurred(ImpactStyle::Medium),
            EffectKind::HeavyImpact => self.impact_occurred(ImpactStyle::Heavy),
            EffectKind::NotificationSuccess => self.notification_occurred(NotificationType::Success),
            EffectKind::NotificationError => self.notification_occurred(NotificationType::Error),
            EffectKind::NotificationWarning => self.notification_occurred(NotificationType::Warning),
        }
    }
}

/// Backend that only logs, for hosts without feedback hardware.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingBackend;

impl EffectBackend for TracingBackend {
    fn selection_changed(&self) {
        info!(effect = %EffectKind::SelectionChanged, "Haptic fired");
    }

    fn impact_occurred(&self, style: ImpactStyle) {
        info!(effect = %EffectKind::from(style), "Haptic fired");
    }

    fn notification_occurred(&self, kind: NotificationType) {
        info!(effect = %EffectKind::from(kind), "Haptic fired");
    }
}

//! Effect kinds that a chain can schedule
//!
//! Impact and notification effects are fully expanded into their own
//! variants so the chain can remember exactly which sub-style it played last
//! and replay it without extra payload.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Strength of an impact effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactStyle {
    Light,
    Medium,
    Heavy,
}

/// Outcome conveyed by a notification effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Success,
    Error,
    Warning,
}

/// A single schedulable effect.
///
/// `None` is the state of a chain that has not played anything yet.
/// Scheduling it is always a no-op.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    #[default]
    None,
    SelectionChanged,
    LightImpact,
    MediumImpact,
    HeavyImpact,
    NotificationSuccess,
    NotificationError,
    NotificationWarning,
}

impl EffectKind {
    /// Every variant, in declaration order.
    pub const ALL: [EffectKind; 8] = [
        EffectKind::None,
        EffectKind::SelectionChanged,
        EffectKind::LightImpact,
        EffectKind::MediumImpact,
        EffectKind::HeavyImpact,
        EffectKind::NotificationSuccess,
        EffectKind::NotificationError,
        EffectKind::NotificationWarning,
    ];

    /// Get the effect name for logging
    pub fn name(&self) -> &'static str {
        match self {
            EffectKind::None => "None",
            EffectKind::SelectionChanged => "SelectionChanged",
            EffectKind::LightImpact => "LightImpact",
            EffectKind::MediumImpact => "MediumImpact",
            EffectKind::HeavyImpact => "HeavyImpact",
            EffectKind::NotificationSuccess => "NotificationSuccess",
            EffectKind::NotificationError => "NotificationError",
            EffectKind::NotificationWarning => "NotificationWarning",
        }
    }

    /// Returns true for the placeholder `None` variant.
    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, EffectKind::None)
    }

    /// The impact style, if this is an impact effect.
    pub fn impact_style(&self) -> Option<ImpactStyle> {
        match self {
            EffectKind::LightImpact => Some(ImpactStyle::Light),
            EffectKind::MediumImpact => Some(ImpactStyle::Medium),
            EffectKind::HeavyImpact => Some(ImpactStyle::Heavy),
            _ => None,
        }
    }

    /// The notification type, if this is a notification effect.
    pub fn notification_type(&self) -> Option<NotificationType> {
        match self {
            EffectKind::NotificationSuccess => Some(NotificationType::Success),
            EffectKind::NotificationError => Some(NotificationType::Error),
            EffectKind::NotificationWarning => Some(NotificationType::Warning),
            _ => None,
        }
    }
}

impl From<ImpactStyle> for EffectKind {
    fn from(style: ImpactStyle) -> Self {
        match style {
            ImpactStyle::Light => EffectKind::LightImpact,
            ImpactStyle::Medium => EffectKind::MediumImpact,
            ImpactStyle::Heavy => EffectKind::HeavyImpact,
        }
    }
}

impl From<NotificationType> for EffectKind {
    fn from(kind: NotificationType) -> Self {
        match kind {
            NotificationType::Success => EffectKind::NotificationSuccess,
            NotificationType::Error => EffectKind::NotificationError,
            NotificationType::Warning => EffectKind::NotificationWarning,
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_none() {
        assert_eq!(EffectKind::default(), EffectKind::None);
        assert!(EffectKind::default().is_none());
        assert!(!EffectKind::SelectionChanged.is_none());
    }

    #[test]
    fn test_impact_conversion() {
        for style in [ImpactStyle::Light, ImpactStyle::Medium, ImpactStyle::Heavy] {
            let kind = EffectKind::from(style);
            assert_eq!(kind.impact_style(), Some(style));
            assert_eq!(kind.notification_type(), None);
        }
    }

    #[test]
    fn test_notification_conversion() {
        for ty in [
            NotificationType::Success,
            NotificationType::Error,
            NotificationType::Warning,
        ] {
            let kind = EffectKind::from(ty);
            assert_eq!(kind.notification_type(), Some(ty));
            assert_eq!(kind.impact_style(), None);
        }
    }

    #[test]
    fn test_names_are_distinct() {
        let mut names: Vec<_> = EffectKind::ALL.iter().map(|k| k.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), EffectKind::ALL.len());
        assert_eq!(EffectKind::HeavyImpact.to_string(), "HeavyImpact");
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&EffectKind::NotificationWarning).unwrap();
        assert_eq!(json, "\"notification_warning\"");

        let style: ImpactStyle = serde_json::from_str("\"heavy\"").unwrap();
        assert_eq!(style, ImpactStyle::Heavy);
    }
}

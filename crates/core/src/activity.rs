//! Activity-level inference.
//!
//! The diet model takes an activity level as input, derived from the
//! predicted weekly frequency and intensity. These rules must stay identical
//! to the labeling used when the diet training data was generated; a drift
//! here degrades diet predictions without raising any error.

use serde::{Deserialize, Serialize};

/// Minimum weekly sessions for "very active" (with high intensity).
pub const VERY_ACTIVE_MIN_FREQUENCY: u32 = 5;
/// Minimum weekly sessions for "moderate" (with medium or high intensity).
pub const MODERATE_MIN_FREQUENCY: u32 = 3;
/// Maximum weekly sessions counted as "light".
pub const LIGHT_MAX_FREQUENCY: u32 = 2;

/// Derived activity level, in the label vocabulary of the diet encoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityLevel {
    #[serde(rename = "sedentary")]
    Sedentary,
    #[serde(rename = "light")]
    Light,
    #[serde(rename = "moderate")]
    Moderate,
    #[serde(rename = "very active")]
    VeryActive,
}

impl ActivityLevel {
    /// Label as it appears in the diet encoder's class list.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sedentary => "sedentary",
            Self::Light => "light",
            Self::Moderate => "moderate",
            Self::VeryActive => "very active",
        }
    }
}

impl std::fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Infer the activity level from weekly frequency and intensity label.
///
/// Rules are evaluated in order; intensity is compared case-insensitively.
pub fn infer_activity_level(frequency: u32, intensity: &str) -> ActivityLevel {
    let intensity = intensity.to_lowercase();
    if frequency >= VERY_ACTIVE_MIN_FREQUENCY && intensity == "high" {
        ActivityLevel::VeryActive
    } else if frequency >= MODERATE_MIN_FREQUENCY && (intensity == "medium" || intensity == "high")
    {
        ActivityLevel::Moderate
    } else if frequency <= LIGHT_MAX_FREQUENCY {
        ActivityLevel::Light
    } else {
        ActivityLevel::Sedentary
    }
}

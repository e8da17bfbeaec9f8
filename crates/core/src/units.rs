//! Unit normalization for body measurements.
//!
//! The models were trained on height in inches and weight in kilograms, so
//! every request is converted to those units before BMI is derived.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Conversion factors
// ---------------------------------------------------------------------------

/// Inches per centimetre.
pub const INCHES_PER_CM: f64 = 0.393701;
/// Inches per foot.
pub const INCHES_PER_FOOT: f64 = 12.0;
/// Kilograms per pound.
pub const KG_PER_LB: f64 = 0.453592;
/// Metres per inch.
pub const METRES_PER_INCH: f64 = 0.0254;

// ---------------------------------------------------------------------------
// Units
// ---------------------------------------------------------------------------

/// Unit a height value was submitted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeightUnit {
    Cm,
    Inches,
    Feet,
}

impl HeightUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cm => "cm",
            Self::Inches => "inches",
            Self::Feet => "feet",
        }
    }

    /// Convert `value` in this unit to inches.
    pub fn to_inches(self, value: f64) -> f64 {
        match self {
            Self::Cm => value * INCHES_PER_CM,
            Self::Inches => value,
            Self::Feet => value * INCHES_PER_FOOT,
        }
    }
}

/// Unit a weight value was submitted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    Kg,
    Lbs,
}

impl WeightUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kg => "kg",
            Self::Lbs => "lbs",
        }
    }

    /// Convert `value` in this unit to kilograms.
    pub fn to_kg(self, value: f64) -> f64 {
        match self {
            Self::Kg => value,
            Self::Lbs => value * KG_PER_LB,
        }
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Body measurements in model units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyMetrics {
    pub height_in: f64,
    pub weight_kg: f64,
    pub bmi: f64,
}

/// Body-mass index from kilograms and inches.
///
/// Returns `0.0` when the height resolves to zero.
pub fn bmi(weight_kg: f64, height_in: f64) -> f64 {
    let height_m = height_in * METRES_PER_INCH;
    if height_m > 0.0 {
        weight_kg / (height_m * height_m)
    } else {
        0.0
    }
}

/// Convert raw measurements into model units and derive BMI.
pub fn normalize(
    height_value: f64,
    height_unit: HeightUnit,
    weight_value: f64,
    weight_unit: WeightUnit,
) -> BodyMetrics {
    let height_in = height_unit.to_inches(height_value);
    let weight_kg = weight_unit.to_kg(weight_value);
    BodyMetrics {
        height_in,
        weight_kg,
        bmi: bmi(weight_kg, height_in),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

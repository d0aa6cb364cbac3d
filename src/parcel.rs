// 🗺️ Parcel Model - Lots, boundaries and cadastral keys
//
// A parcel ("batch") is a lot with an address, four boundary measurements,
// a cadastral key and an area. The original parcel is entered by the user;
// result parcels are generated from it by the subdivision module.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ============================================================================
// BOUNDARY MEASUREMENT
// ============================================================================

/// One side of a parcel: distance in meters plus the adjoining property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundaryMeasurement {
    #[serde(default, deserialize_with = "lenient_number")]
    pub distance: f64,
    #[serde(default)]
    pub label: String,
}

impl BoundaryMeasurement {
    pub fn new(distance: f64, label: &str) -> Self {
        BoundaryMeasurement {
            distance,
            label: label.to_string(),
        }
    }

    /// Zero value used for generated parcels (distance 0, empty label)
    pub fn zero() -> Self {
        Self::default()
    }
}

// ============================================================================
// SIDE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    North,
    East,
    West,
    South,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::North, Side::East, Side::West, Side::South];

    /// Field name as it appears in form paths and template placeholders
    pub fn key(&self) -> &'static str {
        match self {
            Side::North => "north",
            Side::East => "east",
            Side::West => "west",
            Side::South => "south",
        }
    }
}

// ============================================================================
// PARCEL
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parcel {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub north: BoundaryMeasurement,
    #[serde(default)]
    pub east: BoundaryMeasurement,
    #[serde(default)]
    pub west: BoundaryMeasurement,
    #[serde(default)]
    pub south: BoundaryMeasurement,
    #[serde(default)]
    pub cadastral_key: String,
    /// Square meters
    #[serde(default, deserialize_with = "lenient_number")]
    pub area: f64,
}

impl Parcel {
    pub fn boundary(&self, side: Side) -> &BoundaryMeasurement {
        match side {
            Side::North => &self.north,
            Side::East => &self.east,
            Side::West => &self.west,
            Side::South => &self.south,
        }
    }

    pub fn boundary_mut(&mut self, side: Side) -> &mut BoundaryMeasurement {
        match side {
            Side::North => &mut self.north,
            Side::East => &mut self.east,
            Side::West => &mut self.west,
            Side::South => &mut self.south,
        }
    }

    /// Result parcel inheriting only the address of `original`
    pub fn result_of(original: &Parcel, cadastral_key: String) -> Self {
        Parcel {
            address: original.address.clone(),
            north: BoundaryMeasurement::zero(),
            east: BoundaryMeasurement::zero(),
            west: BoundaryMeasurement::zero(),
            south: BoundaryMeasurement::zero(),
            cadastral_key,
            area: 0.0,
        }
    }
}

// ============================================================================
// LENIENT NUMBERS
// ============================================================================

/// Form values arrive as numbers, numeric strings or garbage.
/// Anything that is not a finite number becomes 0.
pub(crate) fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_number(&value))
}

pub(crate) fn coerce_number(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

// ============================================================================
// TESTS
// ============================================================================

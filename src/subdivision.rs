// ✂️ Subdivision Engine - Derive result parcels from an original parcel
//
// Given an original parcel and a desired count N, produce N result parcels:
//   keys:    {base}-1, {base}-2, ... {base}-N
//   address: copied from the original
//   borders: zeroed, area: 0
//
// Every call is a full replace. Data previously entered for result parcels
// is not carried over.

use crate::parcel::Parcel;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

// ============================================================================
// INVALID COUNT ERROR
// ============================================================================

/// Requested result count is not a strictly positive integer
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidCountError {
    pub value: String,
}

impl InvalidCountError {
    fn new(value: impl fmt::Display) -> Self {
        InvalidCountError {
            value: value.to_string(),
        }
    }
}

impl fmt::Display for InvalidCountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "result count must be an integer between 1 and {}, got {}",
            MAX_RESULT_COUNT, self.value
        )
    }
}

impl std::error::Error for InvalidCountError {}

// ============================================================================
// RESULT COUNT
// ============================================================================

/// Largest number of result parcels a single subdivision may request
pub const MAX_RESULT_COUNT: u32 = 5_000;

/// Number of result parcels; always in `1..=MAX_RESULT_COUNT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "u32")]
pub struct ResultCount(u32);

impl ResultCount {
    pub const ONE: ResultCount = ResultCount(1);

    pub fn new(n: u32) -> Result<Self, InvalidCountError> {
        if n == 0 || n > MAX_RESULT_COUNT {
            return Err(InvalidCountError::new(n));
        }
        Ok(ResultCount(n))
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

impl Default for ResultCount {
    fn default() -> Self {
        ResultCount::ONE
    }
}

impl fmt::Display for ResultCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ResultCount> for u32 {
    fn from(count: ResultCount) -> u32 {
        count.0
    }
}

impl TryFrom<f64> for ResultCount {
    type Error = InvalidCountError;

    fn try_from(n: f64) -> Result<Self, Self::Error> {
        if !n.is_finite() || n.fract() != 0.0 || n <= 0.0 || n > MAX_RESULT_COUNT as f64 {
            return Err(InvalidCountError::new(n));
        }
        ResultCount::new(n as u32)
    }
}

// ============================================================================
// COUNT CONVERSION
// ============================================================================

/// Anything a caller may hand in as a requested count
pub trait IntoResultCount {
    fn into_result_count(self) -> Result<ResultCount, InvalidCountError>;
}

impl IntoResultCount for ResultCount {
    fn into_result_count(self) -> Result<ResultCount, InvalidCountError> {
        Ok(self)
    }
}

impl IntoResultCount for f64 {
    fn into_result_count(self) -> Result<ResultCount, InvalidCountError> {
        ResultCount::try_from(self)
    }
}

macro_rules! impl_into_result_count {
    ($($t:ty),*) => {
        $(
            impl IntoResultCount for $t {
                fn into_result_count(self) -> Result<ResultCount, InvalidCountError> {
                    let n = u32::try_from(self).map_err(|_| InvalidCountError::new(self))?;
                    ResultCount::new(n)
                }
            }
        )*
    };
}

impl_into_result_count!(i32, i64, u32, u64, usize);

// ============================================================================
// DERIVATION
// ============================================================================

/// `{base_key}-{index}` for a 1-based index
fn result_cadastral_key(base_key: &str, index: u32) -> String {
    format!("{}-{}", base_key, index)
}

/// Derive `count` cadastral keys from `base_key`, ascending from 1.
///
/// ```
/// use parcel_subdivision::derive_cadastral_keys;
///
/// let keys = derive_cadastral_keys("ABC-123", 3).unwrap();
/// assert_eq!(keys, vec!["ABC-123-1", "ABC-123-2", "ABC-123-3"]);
///
/// assert!(derive_cadastral_keys("ABC-123", 0).is_err());
/// assert!(derive_cadastral_keys("ABC-123", 2.5).is_err());
/// ```
pub fn derive_cadastral_keys<C: IntoResultCount>(
    base_key: &str,
    count: C,
) -> Result<Vec<String>, InvalidCountError> {
    Ok(cadastral_keys(base_key, count.into_result_count()?))
}

fn cadastral_keys(base_key: &str, count: ResultCount) -> Vec<String> {
    (1..=count.get())
        .map(|i| result_cadastral_key(base_key, i))
        .collect()
}

/// Build `count` blank result parcels from `original`.
///
/// Each parcel copies the original address, has zeroed borders and area,
/// and carries a derived cadastral key.
pub fn derive_result_parcels<C: IntoResultCount>(
    original: &Parcel,
    count: C,
) -> Result<Vec<Parcel>, InvalidCountError> {
    Ok(result_parcels(original, count.into_result_count()?))
}

/// Same as [`derive_result_parcels`] for an already validated count
pub fn result_parcels(original: &Parcel, count: ResultCount) -> Vec<Parcel> {
    debug!(
        base_key = %original.cadastral_key,
        count = count.get(),
        "derived result parcels"
    );

    cadastral_keys(&original.cadastral_key, count)
        .into_iter()
        .map(|key| Parcel::result_of(original, key))
        .collect()
}

// ============================================================================
// SUBDIVISION REQUEST
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubdivisionRequest {
    pub original: Parcel,
    pub result_count: ResultCount,
}

impl SubdivisionRequest {
    pub fn new<C: IntoResultCount>(original: Parcel, count: C) -> Result<Self, InvalidCountError> {
        Ok(SubdivisionRequest {
            original,
            result_count: count.into_result_count()?,
        })
    }

    pub fn derive(&self) -> Vec<Parcel> {
        result_parcels(&self.original, self.result_count)
    }
}

// ============================================================================
// TESTS
// ============================================================================

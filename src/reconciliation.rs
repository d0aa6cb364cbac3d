// ⚖️ Reconciliation Engine - Validate areas add up
//
// Following the rule:
//   sum(result_parcel.area) == original_parcel.area   (within 1e-6)
//
// The tolerance is absolute, not relative. Very large areas near the
// tolerance boundary can compare differently than a relative check would.

use crate::parcel::Parcel;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Absolute tolerance for area comparisons (square meters)
pub const AREA_TOLERANCE: f64 = 1e-6;

// ============================================================================
// RECONCILIATION RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AreaReconciliation {
    /// Result areas add up to the original area
    Ok,

    /// Result areas don't add up
    Mismatch {
        expected: f64,
        actual: f64,
        /// actual - expected: negative means area is still missing
        difference: f64,
    },
}

impl AreaReconciliation {
    pub fn is_ok(&self) -> bool {
        matches!(self, AreaReconciliation::Ok)
    }

    pub fn is_mismatch(&self) -> bool {
        !self.is_ok()
    }

    pub fn difference(&self) -> f64 {
        match self {
            AreaReconciliation::Ok => 0.0,
            AreaReconciliation::Mismatch { difference, .. } => *difference,
        }
    }

    pub fn summary(&self) -> String {
        match self {
            AreaReconciliation::Ok => "Areas reconcile".to_string(),
            AreaReconciliation::Mismatch {
                expected,
                actual,
                difference,
            } => {
                let direction = if *difference < 0.0 { "under" } else { "over" };
                format!(
                    "Areas do not reconcile: expected {:.2} m2, got {:.2} m2 ({:.2} m2 {})",
                    expected,
                    actual,
                    difference.abs(),
                    direction
                )
            }
        }
    }
}

// ============================================================================
// AREA SOURCE
// ============================================================================

/// Anything with an area that can be summed
pub trait HasArea {
    fn area(&self) -> f64;
}

impl HasArea for Parcel {
    fn area(&self) -> f64 {
        self.area
    }
}

impl HasArea for f64 {
    fn area(&self) -> f64 {
        *self
    }
}

impl<T: HasArea + ?Sized> HasArea for &T {
    fn area(&self) -> f64 {
        (**self).area()
    }
}

/// Non-finite areas count as 0
fn finite_or_zero(n: f64) -> f64 {
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

// ============================================================================
// RECONCILIATION
// ============================================================================

/// Sum of result areas, ignoring invalid values
pub fn sum_areas<T: HasArea>(parcels: &[T]) -> f64 {
    parcels.iter().map(|p| finite_or_zero(p.area())).sum()
}

/// Check that the result parcel areas add up to `original_area`.
///
/// ```
/// use parcel_subdivision::{reconcile_areas, AreaReconciliation};
///
/// assert!(reconcile_areas(100.0, &[60.0, 40.0]).is_ok());
/// assert_eq!(
///     reconcile_areas(100.0, &[60.0, 39.0]),
///     AreaReconciliation::Mismatch { expected: 100.0, actual: 99.0, difference: -1.0 }
/// );
/// ```
pub fn reconcile_areas<T: HasArea>(original_area: f64, result_parcels: &[T]) -> AreaReconciliation {
    let expected = finite_or_zero(original_area);
    let actual = sum_areas(result_parcels);
    let difference = actual - expected;

    if difference.abs() <= AREA_TOLERANCE {
        AreaReconciliation::Ok
    } else {
        warn!(expected, actual, difference, "area mismatch");
        AreaReconciliation::Mismatch {
            expected,
            actual,
            difference,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parcel_with_area(area: f64) -> Parcel {
        Parcel {
            area,
            ..Parcel::default()
        }
    }

    #[test]
    fn test_reconcile_exact() {
        assert_eq!(reconcile_areas(100.0, &[60.0, 40.0]), AreaReconciliation::Ok);
    }

    #[test]
    fn test_reconcile_within_tolerance() {
        let result = reconcile_areas(100.0, &[60.0, 39.9999995]);
        assert!(result.is_ok());
    }

    #[test]
    fn test_reconcile_mismatch_under() {
        let result = reconcile_areas(100.0, &[60.0, 39.0]);
        assert_eq!(
            result,
            AreaReconciliation::Mismatch {
                expected: 100.0,
                actual: 99.0,
                difference: -1.0,
            }
        );
        assert!(result.summary().contains("under"));
    }

    #[test]
    fn test_reconcile_mismatch_over() {
        let result = reconcile_areas(100.0, &[60.0, 41.5]);
        assert_eq!(result.difference(), 1.5);
        assert!(result.summary().contains("over"));
    }

    #[test]
    fn test_reconcile_order_independent() {
        let a = reconcile_areas(100.0, &[10.5, 20.25, 69.25]);
        let b = reconcile_areas(100.0, &[69.25, 10.5, 20.25]);
        assert_eq!(a, b);
        assert!(a.is_ok());
    }

    #[test]
    fn test_reconcile_ignores_invalid_areas() {
        let parcels = vec![
            parcel_with_area(60.0),
            parcel_with_area(f64::NAN),
            parcel_with_area(40.0),
            parcel_with_area(f64::INFINITY),
        ];
        assert!(reconcile_areas(100.0, &parcels).is_ok());
    }

    #[test]
    fn test_reconcile_parcel_refs() {
        let parcels = [parcel_with_area(250.0), parcel_with_area(250.0)];
        let refs: Vec<&Parcel> = parcels.iter().collect();
        assert!(reconcile_areas(500.0, &refs).is_ok());
    }

    #[test]
    fn test_reconcile_fresh_subdivision_is_mismatch() {
        let parcels = vec![parcel_with_area(0.0); 3];
        assert_eq!(
            reconcile_areas(500.0, &parcels),
            AreaReconciliation::Mismatch {
                expected: 500.0,
                actual: 0.0,
                difference: -500.0,
            }
        );
    }

    #[test]
    fn test_reconciliation_json_shape() {
        let ok = serde_json::to_value(AreaReconciliation::Ok).unwrap();
        assert_eq!(ok, serde_json::json!({"status": "ok"}));

        let mismatch = serde_json::to_value(reconcile_areas(100.0, &[60.0, 39.0])).unwrap();
        assert_eq!(mismatch["status"], "mismatch");
        assert_eq!(mismatch["difference"], -1.0);
    }
}

//! Deterministic float ordering for sorting by scores and ratings.

use core::cmp::Ordering;

/// Canonicalize a floating-point value for deterministic ordering.
///
/// Rules:
/// - `-0.0` becomes `0.0`
/// - all NaNs become a single canonical NaN
pub fn canonical_f64(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else if v.is_nan() {
        f64::NAN
    } else {
        v
    }
}

/// Deterministic total ordering for floats.
///
/// Prefer this any time you sort floats or use them in ordered keys.
pub fn stable_total_cmp_f64(a: f64, b: f64) -> Ordering {
    canonical_f64(a).total_cmp(&canonical_f64(b))
}

/// Descending order on `f64` keys; pair with a stable sort to keep input
/// order among equal keys.
pub fn descending_f64(a: f64, b: f64) -> Ordering {
    stable_total_cmp_f64(b, a)
}

#[cfg(test)]
mod tests {
    use super::{canonical_f64, descending_f64, stable_total_cmp_f64};
    use core::cmp::Ordering;

    #[test]
    fn canonicalizes_negative_zero() {
        assert_eq!(canonical_f64(-0.0), 0.0);
        assert_eq!(stable_total_cmp_f64(-0.0, 0.0), Ordering::Equal);
    }

    #[test]
    fn descending_sort_is_stable_for_ties() {
        let mut items = vec![(3.0, 'a'), (5.0, 'b'), (3.0, 'c'), (1.0, 'd')];
        items.sort_by(|x, y| descending_f64(x.0, y.0));
        let order: String = items.iter().map(|i| i.1).collect();
        assert_eq!(order, "bacd");
    }
}

//! Pixel <-> index conversions.
//!
//! All float-to-integer casts in the crate go through these helpers so the
//! truncation is audited in one place. Negative and non-finite inputs map to
//! zero.

/// Tolerance used when comparing pixel quantities.
pub const EPSILON: f64 = 0.000_001;

/// `floor(px)` as an index.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn floor_index(px: f64) -> usize {
    if px.is_finite() && px > 0.0 {
        px.floor() as usize
    } else {
        0
    }
}

/// `ceil(px)` as a count.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn ceil_count(px: f64) -> usize {
    if px.is_finite() && px > 0.0 {
        px.ceil() as usize
    } else {
        0
    }
}

/// `floor(px)` as a signed integer, saturating at the i64 bounds.
#[allow(clippy::cast_possible_truncation)]
pub fn floor_i64(px: f64) -> i64 {
    if px.is_nan() {
        0
    } else {
        px.floor() as i64
    }
}

/// `ceil(px)` as a signed integer, saturating at the i64 bounds.
#[allow(clippy::cast_possible_truncation)]
pub fn ceil_i64(px: f64) -> i64 {
    if px.is_nan() {
        0
    } else {
        px.ceil() as i64
    }
}

/// Unsigned index as a signed value.
pub fn signed(index: usize) -> i64 {
    i64::try_from(index).unwrap_or(i64::MAX)
}

/// Signed value as an unsigned index, clamping negatives to zero.
pub fn unsigned(value: i64) -> usize {
    usize::try_from(value).unwrap_or(0)
}

/// Approximate float equality within [`EPSILON`].
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_and_ceil() {
        assert_eq!(floor_index(19.9), 19);
        assert_eq!(floor_index(-3.0), 0);
        assert_eq!(floor_index(f64::NAN), 0);
        assert_eq!(ceil_count(10.01), 11);
        assert_eq!(ceil_count(10.0), 10);
        assert_eq!(floor_i64(-0.5), -1);
        assert_eq!(ceil_i64(-0.5), 0);
    }

    #[test]
    fn test_sign_conversions() {
        assert_eq!(unsigned(-4), 0);
        assert_eq!(unsigned(4), 4);
        assert_eq!(signed(7), 7);
    }
}

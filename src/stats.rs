/// Rounds to `places` decimals, half to even, deciding ties on the exact
/// binary value: `2.125` becomes `2.12` and `1.115` (stored just below)
/// becomes `1.11`.
pub fn round_to(value: f64, places: u32) -> f64 {
    if !value.is_finite() || value == 0.0 {
        return value;
    }
    let Some(scale) = 10u128.checked_pow(places) else {
        return value;
    };

    let bits = value.to_bits();
    let biased_exponent = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1u64 << 52) - 1);
    let (mantissa, exponent) = if biased_exponent == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), biased_exponent - 1075)
    };
    // Integral already.
    if exponent >= 0 {
        return value;
    }

    let shift = exponent.unsigned_abs();
    if shift >= 128 {
        return 0.0f64.copysign(value);
    }
    let Some(scaled) = u128::from(mantissa).checked_mul(scale) else {
        return value;
    };

    let quotient = scaled >> shift;
    let remainder = scaled & ((1u128 << shift) - 1);
    let half = 1u128 << (shift - 1);
    let rounded = if remainder > half || (remainder == half && quotient & 1 == 1) {
        quotient + 1
    } else {
        quotient
    };
    (rounded as f64 / scale as f64).copysign(value)
}

pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

pub fn median(values: &[f64]) -> f64 {
    percentile(values, 50.0)
}

/// Percentile with linear interpolation between closest ranks
/// (`rank = p / 100 * (n - 1)`). Returns 0 for an empty slice.
pub fn percentile(values: &[f64], pct: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = (pct.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;

    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// Share of `part` in `whole` as a percentage, 0 when `whole` is 0.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn percentile_interpolates_linearly() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert!((percentile(&values, 25.0) - 1.75).abs() < 1e-9);
        assert!((percentile(&values, 75.0) - 3.25).abs() < 1e-9);
        assert!((percentile(&values, 50.0) - 2.5).abs() < 1e-9);
    }

    #[test]
    fn percentile_ignores_input_order() {
        let values = [4.0, 1.0, 3.0, 2.0];
        assert!((percentile(&values, 25.0) - 1.75).abs() < 1e-9);
    }

    #[test]
    fn empty_inputs_are_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(percentile(&[], 75.0), 0.0);
        assert_eq!(percentage(3, 0), 0.0);
    }

    #[test]
    fn rounds_to_two_places() {
        assert_eq!(round2(2.333333), 2.33);
        assert_eq!(round2(-0.456), -0.46);
        assert_eq!(round_to(12.345, 1), 12.3);
    }

    #[test]
    fn exact_ties_round_to_even() {
        assert_eq!(round2(2.125), 2.12);
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(-2.125), -2.12);
        assert_eq!(round_to(0.25, 1), 0.2);
        assert_eq!(round_to(2.5, 0), 2.0);
        assert_eq!(round_to(3.5, 0), 4.0);
    }

    #[test]
    fn near_ties_follow_the_stored_value() {
        // Both literals are stored slightly below the written tie.
        assert_eq!(round2(1.115), 1.11);
        assert_eq!(round_to(0.35, 1), 0.3);
        // Stored slightly above.
        assert_eq!(round2(1.005 + 1e-12), 1.01);
    }

    #[test]
    fn integral_and_non_finite_values_pass_through() {
        assert_eq!(round2(42.0), 42.0);
        assert_eq!(round2(-7.0), -7.0);
        assert!(round2(f64::NAN).is_nan());
        assert_eq!(round2(f64::INFINITY), f64::INFINITY);
    }

    proptest! {
        #[test]
        fn rounding_is_stable(value in -1000.0f64..1000.0) {
            let once = round2(value);
            prop_assert_eq!(round2(once), once);
        }
    }
}

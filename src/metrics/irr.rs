//! Internal rate of return by bracketed bisection
//!
//! Streams with several sign changes can have several roots; the search
//! returns whichever root the first bracket found by expansion contains.

/// Lower end of the initial bracket (fractional rate)
const LOWER_BOUND: f64 = -0.99;
/// Upper end of the initial bracket (fractional rate)
const UPPER_BOUND: f64 = 5.0;
/// Growth factor applied to the upper bound while searching for a bracket
const EXPANSION_FACTOR: f64 = 1.5;
const MAX_EXPANSIONS: u32 = 20;
const MAX_BISECTIONS: u32 = 80;
/// Absolute NPV tolerance that ends the bisection early
const NPV_TOLERANCE: f64 = 1e-8;

/// NPV of a net flow series at a fractional rate
pub fn npv_at(net: &[f64], rate: f64) -> f64 {
    let base = 1.0 + rate;
    net.iter()
        .enumerate()
        .map(|(t, cf)| cf / base.powi(t as i32))
        .sum()
}

/// True when the series has both a strictly positive and a strictly negative flow
pub fn has_sign_change(net: &[f64]) -> bool {
    net.iter().any(|cf| *cf > 0.0) && net.iter().any(|cf| *cf < 0.0)
}

/// IRR in percent, or `None` when no sign change exists or no bracket is found
pub fn irr_pct(net: &[f64]) -> Option<f64> {
    if !has_sign_change(net) {
        return None;
    }

    let mut lo = LOWER_BOUND;
    let mut hi = UPPER_BOUND;
    let npv_lo = npv_at(net, lo);
    let mut npv_hi = npv_at(net, hi);

    let mut expansions = 0;
    while npv_lo.signum() == npv_hi.signum() {
        if expansions == MAX_EXPANSIONS {
            log::warn!("IRR bracket not found after {} expansions (hi = {:.3})", expansions, hi);
            return None;
        }
        hi *= EXPANSION_FACTOR;
        npv_hi = npv_at(net, hi);
        expansions += 1;
    }
    // An infinite NPV at the lower bound still brackets the root; only NaN is unusable
    if npv_lo.is_nan() || npv_hi.is_nan() {
        return None;
    }

    let lo_positive = npv_lo > 0.0;
    let mut mid = 0.5 * (lo + hi);
    for _ in 0..MAX_BISECTIONS {
        mid = 0.5 * (lo + hi);
        let npv_mid = npv_at(net, mid);
        if npv_mid.abs() < NPV_TOLERANCE {
            break;
        }
        if (npv_mid > 0.0) == lo_positive {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Some(mid * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_simple_irr() {
        // -100 now, 110 next year: 10%
        let irr = irr_pct(&[-100.0, 110.0]).unwrap();
        assert_abs_diff_eq!(irr, 10.0, epsilon = 1e-6);
    }

    #[test]
    fn test_annuity_irr_zeroes_npv() {
        let net = [-1_000.0, 300.0, 300.0, 300.0, 300.0, 300.0];
        let irr = irr_pct(&net).unwrap();
        // Known value for this annuity is about 15.24%
        assert!((irr - 15.24).abs() < 0.01);
        assert!(npv_at(&net, irr / 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_negative_irr() {
        let irr = irr_pct(&[-100.0, 50.0, 40.0]).unwrap();
        assert!(irr < 0.0);
        assert!(npv_at(&[-100.0, 50.0, 40.0], irr / 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_no_sign_change_is_undefined() {
        assert_eq!(irr_pct(&[100.0, 50.0, 0.0]), None);
        assert_eq!(irr_pct(&[-100.0, -50.0]), None);
        assert_eq!(irr_pct(&[0.0, 0.0]), None);
        assert_eq!(irr_pct(&[]), None);
    }

    #[test]
    fn test_bracket_expansion() {
        // Very high return: 1000% needs the upper bound pushed past 5.0
        let net = [-1.0, 11.0];
        let irr = irr_pct(&net).unwrap();
        assert_abs_diff_eq!(irr, 1_000.0, epsilon = 1e-4);
    }

    #[test]
    fn test_long_horizon_bracket() {
        // NPV at the lower bound overflows to +inf over 170 years
        let mut net = vec![-1_000.0];
        net.extend(std::iter::repeat(120.0).take(170));
        assert!(npv_at(&net, LOWER_BOUND).is_infinite());

        let irr = irr_pct(&net).unwrap();
        assert!((irr - 12.0).abs() < 0.01);
        assert!(npv_at(&net, irr / 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_bracket_not_found_is_undefined() {
        // NPV stays positive at every expanded upper bound
        assert_eq!(irr_pct(&[1.0, -1e-300]), None);
    }
}

//! Modified internal rate of return

/// MIRR in percent for a net flow series over N = len - 1 years
///
/// Negative flows are discounted to year zero at the finance rate, positive
/// flows compounded to year N at the reinvestment rate. Undefined when there
/// are no negative flows or the horizon is zero.
pub fn mirr_pct(net: &[f64], finance_rate_pct: f64, reinvestment_rate_pct: f64) -> Option<f64> {
    let n = net.len().checked_sub(1)?;
    if n == 0 {
        return None;
    }
    let fr = 1.0 + finance_rate_pct / 100.0;
    let rr = 1.0 + reinvestment_rate_pct / 100.0;

    let mut pv_negative = 0.0;
    let mut fv_positive = 0.0;
    for (t, cf) in net.iter().enumerate() {
        if *cf < 0.0 {
            pv_negative += cf / fr.powi(t as i32);
        } else if *cf > 0.0 {
            fv_positive += cf * rr.powi((n - t) as i32);
        }
    }
    if pv_negative == 0.0 {
        return None;
    }

    let ratio = -fv_positive / pv_negative;
    let mirr = ratio.powf(1.0 / n as f64) - 1.0;
    mirr.is_finite().then_some(mirr * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_known_value() {
        // -1000 then 500 x 3 at 10% / 12%
        let net = [-1_000.0, 500.0, 500.0, 500.0];
        let fv = 500.0 * 1.12_f64.powi(2) + 500.0 * 1.12 + 500.0;
        let expected = ((fv / 1_000.0).powf(1.0 / 3.0) - 1.0) * 100.0;
        assert_relative_eq!(mirr_pct(&net, 10.0, 12.0).unwrap(), expected, epsilon = 1e-10);
    }

    #[test]
    fn test_scale_invariance() {
        let net = [-800.0, -200.0, 350.0, 420.0, 510.0];
        let scaled: Vec<f64> = net.iter().map(|cf| cf * 37.5).collect();
        let a = mirr_pct(&net, 6.0, 4.0).unwrap();
        let b = mirr_pct(&scaled, 6.0, 4.0).unwrap();
        assert_relative_eq!(a, b, epsilon = 1e-9);
    }

    #[test]
    fn test_undefined_cases() {
        assert_eq!(mirr_pct(&[100.0, 100.0], 5.0, 5.0), None);
        assert_eq!(mirr_pct(&[-100.0], 5.0, 5.0), None);
        assert_eq!(mirr_pct(&[], 5.0, 5.0), None);
    }

    #[test]
    fn test_all_negative_is_total_loss() {
        assert_relative_eq!(mirr_pct(&[-100.0, -10.0], 5.0, 5.0).unwrap(), -100.0);
    }
}

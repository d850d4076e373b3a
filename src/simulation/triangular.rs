//! Triangular inverse-CDF sampling

use crate::config::ScenarioTriple;

/// Map a uniform draw onto a (low, mode, high) triangular distribution
///
/// A collapsed triple (high == low) returns the mode.
pub fn triangular(u: f64, triple: &ScenarioTriple) -> f64 {
    let ScenarioTriple { low, base, high } = *triple;
    let span = high - low;
    if span <= 0.0 {
        return base;
    }
    let mode_fraction = (base - low) / span;
    if u < mode_fraction {
        low + (u * span * (base - low)).sqrt()
    } else {
        high - ((1.0 - u) * span * (high - base)).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_endpoints_and_mode() {
        let t = ScenarioTriple::new(2.0, 5.0, 10.0);
        assert_relative_eq!(triangular(0.0, &t), 2.0);
        assert_relative_eq!(triangular(1.0, &t), 10.0);
        // CDF at the mode equals the mode fraction
        assert_relative_eq!(triangular(3.0 / 8.0, &t), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_collapsed_triple() {
        let t = ScenarioTriple::fixed(0.7);
        assert_eq!(triangular(0.0, &t), 0.7);
        assert_eq!(triangular(0.99, &t), 0.7);
    }

    #[test]
    fn test_sample_mean() {
        // Mean of a triangular distribution is (low + mode + high) / 3
        let t = ScenarioTriple::new(0.0, 3.0, 6.0);
        let n = 10_000;
        let mean: f64 = (0..n)
            .map(|i| triangular((i as f64 + 0.5) / n as f64, &t))
            .sum::<f64>()
            / n as f64;
        assert!((mean - 3.0).abs() < 1e-3);
    }
}

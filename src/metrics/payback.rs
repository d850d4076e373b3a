//! Discounted payback detection

use serde::{Deserialize, Serialize};

/// First year the discounted cumulative net flow is non-negative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Payback {
    Year(usize),
    NotReached,
}

impl Payback {
    pub fn year(&self) -> Option<usize> {
        match self {
            Payback::Year(t) => Some(*t),
            Payback::NotReached => None,
        }
    }
}

/// Walk the discounted cumulative net flow from t = 0
pub fn payback_year(net: &[f64], rate_pct: f64) -> Payback {
    let base = 1.0 + rate_pct / 100.0;
    let mut cumulative = 0.0;
    for (t, cf) in net.iter().enumerate() {
        cumulative += cf / base.powi(t as i32);
        if cumulative >= 0.0 {
            return Payback::Year(t);
        }
    }
    Payback::NotReached
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payback_found() {
        assert_eq!(payback_year(&[-200.0, 60.0, 60.0, 60.0, 60.0], 0.0), Payback::Year(4));
        // Discounting pushes it out of reach
        assert_eq!(payback_year(&[-200.0, 60.0, 60.0, 60.0, 60.0], 10.0), Payback::NotReached);
    }

    #[test]
    fn test_immediate_payback() {
        assert_eq!(payback_year(&[0.0, 60.0], 5.0), Payback::Year(0));
        assert_eq!(Payback::Year(3).year(), Some(3));
        assert_eq!(Payback::NotReached.year(), None);
    }
}

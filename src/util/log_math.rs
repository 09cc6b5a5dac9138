
/// The quality ceiling for Phred conversion; also returned for probability <= 0
pub const MAX_PHRED_SCORE: u16 = 255;

/// Adds two probabilities in log10 space without leaving it.
/// `None` stands in for probability zero, so it is the identity here.
pub fn log10_sum(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (None, None) => None,
        (Some(x), None) => Some(x),
        (None, Some(y)) => Some(y),
        (Some(x), Some(y)) => {
            // anchor on the larger term so the power term stays <= 1
            let (hi, lo) = if x >= y { (x, y) } else { (y, x) };
            Some(hi + (1.0 + power10(lo - hi)).log10())
        }
    }
}

/// Converts a log10 value back to linear space
pub fn power10(x: f64) -> f64 {
    10f64.powf(x)
}

/// Phred-scales an error probability: round(-10*log10(p)), clamped to [0, 255].
/// A non-positive probability saturates at the ceiling.
pub fn phred_score(probability: f64) -> u16 {
    if probability <= 0.0 {
        return MAX_PHRED_SCORE;
    }
    let scaled = -10.0 * probability.log10();
    if scaled <= 0.0 {
        0
    } else {
        (scaled.round() as u64).min(MAX_PHRED_SCORE as u64) as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;

    #[test]
    fn test_log10_sum_identity() {
        assert_eq!(log10_sum(None, None), None);
        assert_eq!(log10_sum(Some(-1.0), None), Some(-1.0));
        assert_eq!(log10_sum(None, Some(-2.0)), Some(-2.0));
    }

    #[test]
    fn test_log10_sum_matches_linear() {
        // log10(0.1 + 0.01) regardless of argument order
        let expected = (0.11f64).log10();
        assert_approx_eq!(log10_sum(Some(-1.0), Some(-2.0)).unwrap(), expected);
        assert_approx_eq!(log10_sum(Some(-2.0), Some(-1.0)).unwrap(), expected);

        // equal terms double the probability
        assert_approx_eq!(log10_sum(Some(-3.0), Some(-3.0)).unwrap(), (0.002f64).log10());
    }

    #[test]
    fn test_log10_sum_extreme_spread() {
        // the tiny term must not produce a NaN or dominate
        let result = log10_sum(Some(-1.0), Some(-300.0)).unwrap();
        assert_approx_eq!(result, -1.0);
    }

    #[test]
    fn test_phred_score() {
        assert_eq!(phred_score(0.1), 10);
        assert_eq!(phred_score(0.01), 20);
        assert_eq!(phred_score(0.05), 13);
        // probability 1 or greater clamps to zero quality
        assert_eq!(phred_score(1.0), 0);
        assert_eq!(phred_score(1.5), 0);
        // vanishing probability saturates
        assert_eq!(phred_score(0.0), MAX_PHRED_SCORE);
        assert_eq!(phred_score(1e-100), MAX_PHRED_SCORE);
    }
}

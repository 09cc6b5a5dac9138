
#[derive(thiserror::Error, Debug)]
pub enum CallReportError {
    #[error("expected {expected} log-conditionals for {num_alleles} alleles, received {received}")]
    ConditionalCount{ num_alleles: usize, expected: usize, received: usize },
    #[error("report requires at least one allele")]
    NoAlleles
}

/// Per-genotype likelihood report for a single called site.
/// Stores one log10 conditional probability of the observed data per unordered
/// allele pair (i <= j), flattened in VCF genotype ordering: index = j*(j+1)/2 + i.
/// Consumed read-only by the quality resolver.
#[derive(Clone, Debug, PartialEq)]
pub struct VariantCallReport {
    /// Number of alleles at the site, pairs are derived from this
    num_alleles: usize,
    /// Upper-triangular log10 conditionals; None marks a value the input did not provide
    log_conditionals: Vec<Option<f64>>
}

impl VariantCallReport {
    /// Builds a report from a flat genotype-ordered likelihood vector.
    /// # Arguments
    /// * `num_alleles` - number of alleles at the site
    /// * `log_conditionals` - log10 conditionals, length must be num_alleles*(num_alleles+1)/2
    /// # Errors
    /// * if the vector length does not match the declared allele count
    pub fn new(num_alleles: usize, log_conditionals: Vec<Option<f64>>) -> Result<VariantCallReport, CallReportError> {
        if num_alleles == 0 {
            return Err(CallReportError::NoAlleles);
        }
        let expected = num_alleles * (num_alleles + 1) / 2;
        if log_conditionals.len() != expected {
            return Err(CallReportError::ConditionalCount {
                num_alleles,
                expected,
                received: log_conditionals.len()
            });
        }

        Ok(VariantCallReport {
            num_alleles,
            log_conditionals
        })
    }

    /// True if every genotype has a log-conditional attached.
    /// The quality resolver treats a partially filled report the same as no report.
    pub fn log_conditionals_present(&self) -> bool {
        self.log_conditionals.iter().all(|lc| lc.is_some())
    }

    /// Fetches the log10 conditional for an unordered allele pair.
    /// # Panics
    /// * if either index is out of range for the allele count
    pub fn log_conditional(&self, allele1: u8, allele2: u8) -> Option<f64> {
        let (i, j) = if allele1 <= allele2 {
            (allele1 as usize, allele2 as usize)
        } else {
            (allele2 as usize, allele1 as usize)
        };
        assert!(j < self.num_alleles, "allele index {j} out of range for {} alleles", self.num_alleles);
        self.log_conditionals[j * (j + 1) / 2 + i]
    }

    pub fn num_alleles(&self) -> usize {
        self.num_alleles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_lookup() {
        // biallelic ordering is (0,0), (0,1), (1,1)
        let report = VariantCallReport::new(2, vec![Some(-0.1), Some(-1.0), Some(-2.0)]).unwrap();
        assert!(report.log_conditionals_present());
        assert_eq!(report.log_conditional(0, 0), Some(-0.1));
        assert_eq!(report.log_conditional(0, 1), Some(-1.0));
        assert_eq!(report.log_conditional(1, 1), Some(-2.0));
        // unordered: (1,0) is the same pair as (0,1)
        assert_eq!(report.log_conditional(1, 0), Some(-1.0));
    }

    #[test]
    fn test_triallelic_ordering() {
        // ordering is (0,0), (0,1), (1,1), (0,2), (1,2), (2,2)
        let values: Vec<Option<f64>> = (0..6).map(|v| Some(-(v as f64))).collect();
        let report = VariantCallReport::new(3, values).unwrap();
        assert_eq!(report.log_conditional(0, 2), Some(-3.0));
        assert_eq!(report.log_conditional(2, 1), Some(-4.0));
        assert_eq!(report.log_conditional(2, 2), Some(-5.0));
    }

    #[test]
    fn test_length_mismatch() {
        let result = VariantCallReport::new(2, vec![Some(-0.1), Some(-1.0)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_partial_report() {
        let report = VariantCallReport::new(2, vec![Some(-0.1), None, Some(-2.0)]).unwrap();
        assert!(!report.log_conditionals_present());
        assert_eq!(report.log_conditional(0, 1), None);
    }
}

/*!
# Genotype quality resolution
Callers that omit GQ often still carry per-genotype likelihoods, so the
benchmark recovers a quality from those before falling back to "unknown".
The resolver is a pure function: callers hold onto the resolved value
instead of writing it back into the call.
*/

use crate::data_types::variants::CalledGenomicVariant;
use crate::util::log_math::{log10_sum, phred_score, power10};

/// Produces the genotype quality for a call.
/// The stored quality wins if positive. Otherwise the quality is derived from
/// the call report: posterior error = 1 - P(called genotype) / P(all genotypes),
/// computed in log10 space, then Phred-scaled. Returns 0 (unknown) whenever the
/// inputs cannot support the computation. Idempotent by construction.
/// # Arguments
/// * `call` - the call to resolve; never modified
pub fn resolve_genotype_quality(call: &CalledGenomicVariant) -> u16 {
    let stored = call.genotype_quality();
    if stored > 0 {
        return stored;
    }

    let report = match call.call_report() {
        Some(r) => r,
        None => return 0
    };
    let called = call.called_indices();
    if called.is_empty() || !report.log_conditionals_present() {
        return 0;
    }

    // likelihood of the called genotype; homozygous pairs the allele with itself
    let log_called = if called.len() == 1 {
        report.log_conditional(called[0], called[0])
    } else {
        report.log_conditional(called[0], called[1])
    };
    let Some(log_called) = log_called else {
        return 0;
    };

    // log-domain sum over every unordered genotype
    let num_alleles = report.num_alleles() as u8;
    let mut log_total = None;
    for i in 0..num_alleles {
        for j in i..num_alleles {
            log_total = log10_sum(log_total, report.log_conditional(i, j));
        }
    }
    let Some(log_total) = log_total else {
        return 0;
    };

    let posterior = power10(log_called - log_total);
    phred_score(1.0 - posterior)
}

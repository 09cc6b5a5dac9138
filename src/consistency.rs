/*!
# Consistency checking
Decides whether a gold-standard call and an overlapping, flank-normalized
test call describe the same event. The GS alleles are extended (never
shrunk) to cover the test window, then compared by prefix containment so
truncated indel representations near window edges still match.
*/

use log::warn;
use rust_lib_reference_genome::reference_genome::ReferenceGenome;

use crate::allele_normalizer::fetch_reference_bases;
use crate::data_types::variants::{CalledGenomicVariant, GenomicVariant};

/// Tests whether a normalized test call is consistent with an overlapping GS call.
///
/// The GS reference allele (offset-trimmed to align start positions) must start
/// with the test reference allele, and every test alternate allele must be a
/// prefix of at least one GS alternate allele. Comparisons are case-insensitive.
/// A mismatched reference is diagnosed with a warning but is not fatal; the
/// pair simply counts as inconsistent.
/// # Arguments
/// * `call_gs` - the gold-standard call
/// * `call_test` - the overlapping, flank-normalized test call
/// * `reference_genome` - the pre-loaded reference genome
/// # Errors
/// * if extending the GS alleles requires reference bases that cannot be fetched
pub fn is_consistent(call_gs: &CalledGenomicVariant, call_test: &CalledGenomicVariant, reference_genome: &ReferenceGenome) -> anyhow::Result<bool> {
    let alleles_gs = build_extended_alleles(
        call_gs.variant(), call_test.first(), call_test.last(), reference_genome
    )?;

    // expected start of the test alleles inside the extended GS alleles
    let offset = call_test.first().saturating_sub(call_gs.first()) as usize;

    let reference_gs = trim_offset(&alleles_gs[0], offset);
    let reference_test = call_test.reference_allele().to_uppercase();
    let mut consistent = reference_gs.starts_with(&reference_test);
    if !consistent {
        warn!(
            "Inconsistent reference for comparison between {}:{} reference: {} and {}:{} reference: {} offset: {}",
            call_gs.sequence_name(), call_gs.first(), reference_gs,
            call_test.sequence_name(), call_test.first(), reference_test, offset
        );
    }

    for allele_test in call_test.alleles().iter().skip(1) {
        if !consistent {
            break;
        }
        let allele_test = allele_test.to_uppercase();
        consistent = alleles_gs.iter().skip(1)
            .any(|allele_gs| trim_offset(allele_gs, offset).starts_with(&allele_test));
    }
    Ok(consistent)
}

/// Drops the first `offset` characters when that leaves anything behind
fn trim_offset(allele: &str, offset: usize) -> &str {
    if offset > 0 && offset < allele.len() {
        &allele[offset..]
    } else {
        allele
    }
}

/// Extends every GS allele to cover the test window, prepending reference
/// bases when the test window starts earlier and appending when it ends later.
/// All returned strings are upper-cased.
fn build_extended_alleles(variant: &GenomicVariant, first_test: u64, last_test: u64, reference_genome: &ReferenceGenome) -> anyhow::Result<Vec<String>> {
    let sequence_name = variant.sequence_name();
    let left = if first_test < variant.first() {
        Some(fetch_reference_bases(reference_genome, sequence_name, first_test, variant.first() - 1)?)
    } else {
        None
    };
    let right = if variant.last() < last_test {
        Some(fetch_reference_bases(reference_genome, sequence_name, variant.last() + 1, last_test)?)
    } else {
        None
    };

    let left = left.unwrap_or_default();
    let right = right.unwrap_or_default();
    let extended = variant.alleles().iter()
        .map(|allele| format!("{left}{allele}{right}").to_uppercase())
        .collect();
    Ok(extended)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::allele_normalizer::normalize_flanks;

    //                              123456789012345
    const MOCK_REFERENCE: &str = "TTTCACACAGGGTTT";

    fn mock_genome() -> ReferenceGenome {
        let mut reference_genome = ReferenceGenome::empty_reference();
        reference_genome.add_contig(
            "mock_chr1".to_string(), MOCK_REFERENCE
        ).unwrap();
        reference_genome
    }

    fn build_call(first: u64, alleles: &[&str], called: &[u8]) -> CalledGenomicVariant {
        let variant = GenomicVariant::new(
            "mock_chr1".to_string(), first,
            alleles.iter().map(|a| a.to_string()).collect(),
            None
        ).unwrap();
        CalledGenomicVariant::new(variant, called.to_vec(), 40, None).unwrap()
    }

    #[test]
    fn test_identical_snv() {
        let genome = mock_genome();
        let call_gs = build_call(4, &["C", "G"], &[0, 1]);
        let call_test = build_call(4, &["C", "G"], &[0, 1]);
        assert!(is_consistent(&call_gs, &call_test, &genome).unwrap());
    }

    #[test]
    fn test_case_insensitive() {
        let genome = mock_genome();
        let call_gs = build_call(4, &["C", "G"], &[0, 1]);
        let call_test = build_call(4, &["c", "g"], &[0, 1]);
        assert!(is_consistent(&call_gs, &call_test, &genome).unwrap());
    }

    #[test]
    fn test_different_alt() {
        let genome = mock_genome();
        let call_gs = build_call(4, &["C", "G"], &[0, 1]);
        let call_test = build_call(4, &["C", "T"], &[0, 1]);
        assert!(!is_consistent(&call_gs, &call_test, &genome).unwrap());
    }

    #[test]
    fn test_differently_anchored_deletion() {
        // deleting one CA unit from the CACACA repeat, represented two ways:
        // GS left-anchored at 3 (TCA>T), test right-anchored at 7 (ACA>A)
        let genome = mock_genome();
        let call_gs = build_call(3, &["TCA", "T"], &[0, 1]);
        let call_test = build_call(7, &["ACA", "A"], &[0, 1]);

        // raw representations do not line up...
        let normalized = normalize_flanks(&call_test, 0, 15, &genome).unwrap();
        assert_eq!(normalized.first(), 2);
        assert_eq!(normalized.alleles(), &["TTCACACAGGGT".to_string(), "TTCACAGGGT".to_string()]);

        // ...but the normalized call is recognized as the same event
        assert!(is_consistent(&call_gs, &normalized, &genome).unwrap());
    }

    #[test]
    fn test_overlapping_but_different_event() {
        // an SNV inside the GS deletion window is not the deletion
        let genome = mock_genome();
        let call_gs = build_call(3, &["TCA", "T"], &[0, 1]);
        let call_test = build_call(7, &["A", "G"], &[0, 1]);
        assert!(!is_consistent(&call_gs, &call_test, &genome).unwrap());
    }

    #[test]
    fn test_truncated_alt_prefix_match() {
        // a truncated representation of the same deletion still matches by prefix
        let genome = mock_genome();
        let call_gs = build_call(3, &["TCA", "T"], &[0, 1]);
        let call_test = build_call(3, &["TC", "T"], &[0, 1]);
        assert!(is_consistent(&call_gs, &call_test, &genome).unwrap());
    }

    #[test]
    fn test_multiallelic_gs_any_alt() {
        // the test alt only needs one matching GS alt
        let genome = mock_genome();
        let call_gs = build_call(3, &["TCA", "T", "TCACA"], &[1, 2]);
        let call_test = build_call(3, &["TCA", "TCACA"], &[0, 1]);
        assert!(is_consistent(&call_gs, &call_test, &genome).unwrap());

        let call_test = build_call(3, &["TCA", "TGG"], &[0, 1]);
        assert!(!is_consistent(&call_gs, &call_test, &genome).unwrap());
    }

    #[test]
    fn test_mismatched_reference() {
        // the test reference allele contradicts the genome; diagnosed, not fatal
        let genome = mock_genome();
        let call_gs = build_call(4, &["C", "G"], &[0, 1]);
        let call_test = build_call(4, &["A", "G"], &[0, 1]);
        assert!(!is_consistent(&call_gs, &call_test, &genome).unwrap());
    }
}

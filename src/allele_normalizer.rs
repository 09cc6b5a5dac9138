/*!
# Allele normalization
Different callers anchor the same indel or repeat event at different
positions. Padding every allele with a bounded window of flanking reference
bases makes two such representations coordinate-congruent without changing
the described event, as long as the padding never crosses into a neighboring
call's span.
*/

use anyhow::{Context, ensure};
use rust_lib_reference_genome::reference_genome::ReferenceGenome;

use crate::data_types::variants::{CalledGenomicVariant, GenomicVariant};

/// Maximum number of reference bases added on each side
pub const MAX_FLANK_BASES: u64 = 5;

/// Pulls reference bases over a 1-based inclusive range.
/// Normalization and consistency checking both depend on these bases, so any
/// failure here is a hard error rather than a recoverable condition.
/// # Arguments
/// * `reference_genome` - the pre-loaded reference genome
/// * `sequence_name` - the sequence to read from
/// * `first` - 1-based first position, inclusive
/// * `last` - 1-based last position, inclusive
/// # Errors
/// * if the sequence is absent from the genome
/// * if the range is empty, inverted, or runs past the sequence end
pub fn fetch_reference_bases(reference_genome: &ReferenceGenome, sequence_name: &str, first: u64, last: u64) -> anyhow::Result<String> {
    ensure!(first >= 1, "Reference positions are 1-based, received first={first}");
    ensure!(first <= last, "Inverted reference range: {first} > {last}");
    ensure!(
        reference_genome.contig_keys().iter().any(|k| k == sequence_name),
        "Sequence {sequence_name:?} is not in the reference genome"
    );

    let chromosome = reference_genome.get_full_chromosome(sequence_name);
    ensure!(
        last as usize <= chromosome.len(),
        "Reference range {sequence_name}:{first}-{last} runs past the sequence end ({} bp)",
        chromosome.len()
    );

    let bases = chromosome[(first - 1) as usize..last as usize].to_vec();
    String::from_utf8(bases)
        .with_context(|| format!("Non-UTF8 reference bases at {sequence_name}:{first}-{last}"))
}

/// Expands a call's alleles with flanking reference bases so differently
/// anchored representations of the same event become comparable.
///
/// SNVs (all alleles length 1) and single-allele records pass through
/// untouched. Padding on each side is capped at `MAX_FLANK_BASES` and
/// additionally clamped so it stays at least one base away from the
/// neighboring calls in the same input.
/// # Arguments
/// * `call` - the call to normalize
/// * `last_before` - end of the previous same-sequence call, or 0 at the sequence start
/// * `first_after` - start of the next same-sequence call, or the sequence length at the end
/// * `reference_genome` - the pre-loaded reference genome
/// # Errors
/// * if a required reference lookup fails (correctness of every downstream
///   comparison depends on the flank bases, so there is no partial result)
pub fn normalize_flanks(
    call: &CalledGenomicVariant,
    last_before: u64,
    first_after: u64,
    reference_genome: &ReferenceGenome
) -> anyhow::Result<CalledGenomicVariant> {
    let alleles = call.alleles();
    if alleles.len() < 2 {
        return Ok(call.clone());
    }
    if alleles.iter().all(|a| a.len() == 1) {
        // uniformly length-1 alleles cannot be anchored differently
        return Ok(call.clone());
    }

    let first = call.first();
    let last = call.last();
    let sequence_name = call.sequence_name();

    // pad start/end, clamped by both the flank cap and the exclusive span of the neighbors
    let pad_start = first.saturating_sub(MAX_FLANK_BASES).max(last_before + 2);
    let left = if pad_start < first {
        Some(fetch_reference_bases(reference_genome, sequence_name, pad_start, first - 1)?)
    } else {
        None
    };
    let pad_end = (last + MAX_FLANK_BASES).min(first_after.saturating_sub(2));
    let right = if last < pad_end {
        Some(fetch_reference_bases(reference_genome, sequence_name, last + 1, pad_end)?)
    } else {
        None
    };

    if left.is_none() && right.is_none() {
        return Ok(call.clone());
    }

    let left = left.unwrap_or_default();
    let right = right.unwrap_or_default();
    let new_first = first - left.len() as u64;
    let extended_alleles: Vec<String> = alleles.iter()
        .map(|a| format!("{left}{a}{right}"))
        .collect();

    let expanded_variant = GenomicVariant::new(
        sequence_name.to_string(),
        new_first,
        extended_alleles,
        call.variant().variant_type()
    )?;
    let expanded = CalledGenomicVariant::new(
        expanded_variant,
        call.called_indices().to_vec(),
        call.genotype_quality(),
        None
    )?;
    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;

    //                                              1         2
    //                                     123456789012345678901234
    const MOCK_REFERENCE: &str = "ACGTACGTAGGACCATTACGGATC";

    fn mock_genome() -> ReferenceGenome {
        let mut reference_genome = ReferenceGenome::empty_reference();
        reference_genome.add_contig(
            "mock_chr1".to_string(), MOCK_REFERENCE
        ).unwrap();
        reference_genome
    }

    fn build_call(first: u64, alleles: &[&str]) -> CalledGenomicVariant {
        let variant = GenomicVariant::new(
            "mock_chr1".to_string(), first,
            alleles.iter().map(|a| a.to_string()).collect(),
            None
        ).unwrap();
        CalledGenomicVariant::new(variant, vec![0, 1], 37, None).unwrap()
    }

    #[test]
    fn test_fetch_reference_bases() {
        let genome = mock_genome();
        assert_eq!(fetch_reference_bases(&genome, "mock_chr1", 1, 4).unwrap(), "ACGT");
        assert_eq!(fetch_reference_bases(&genome, "mock_chr1", 10, 12).unwrap(), "GGA");
        // invalid ranges and sequences are hard errors
        assert!(fetch_reference_bases(&genome, "mock_chr1", 0, 4).is_err());
        assert!(fetch_reference_bases(&genome, "mock_chr1", 8, 7).is_err());
        assert!(fetch_reference_bases(&genome, "mock_chr1", 20, 30).is_err());
        assert!(fetch_reference_bases(&genome, "mock_chr2", 1, 4).is_err());
    }

    #[test]
    fn test_snv_untouched() {
        let genome = mock_genome();
        let call = build_call(10, &["G", "T"]);
        let normalized = normalize_flanks(&call, 0, 24, &genome).unwrap();
        assert_eq!(normalized, call);
    }

    #[test]
    fn test_single_allele_untouched() {
        // reference-confirming records have nothing to re-anchor
        let genome = mock_genome();
        let variant = GenomicVariant::new(
            "mock_chr1".to_string(), 5, vec!["ACGTA".to_string()], None
        ).unwrap();
        let call = CalledGenomicVariant::new(variant, vec![0], 50, None).unwrap();
        let normalized = normalize_flanks(&call, 0, 24, &genome).unwrap();
        assert_eq!(normalized, call);
    }

    #[test]
    fn test_full_expansion() {
        let genome = mock_genome();
        // deletion GGAC -> G at positions 10-13, neighbors far away
        let call = build_call(10, &["GGAC", "G"]);
        let normalized = normalize_flanks(&call, 0, 24, &genome).unwrap();

        // five pad bases on each side: left = 5-9 "ACGTA", right = 14-18 "CATTA"
        assert_eq!(normalized.first(), 5);
        assert_eq!(normalized.last(), 18);
        assert_eq!(normalized.alleles(), &["ACGTAGGACCATTA".to_string(), "ACGTAGCATTA".to_string()]);
        // call-level attributes carry over
        assert_eq!(normalized.called_indices(), &[0, 1]);
        assert_eq!(normalized.genotype_quality(), 37);
    }

    #[test]
    fn test_neighbor_clamping() {
        let genome = mock_genome();
        // previous call ends at 6, next starts at 18: pads shrink to 8-9 and 14-16
        let call = build_call(10, &["GGAC", "G"]);
        let normalized = normalize_flanks(&call, 6, 18, &genome).unwrap();
        assert_eq!(normalized.first(), 8);
        assert_eq!(normalized.alleles()[0], "TAGGACCAT");
        assert_eq!(normalized.alleles()[1], "TAGCAT");
    }

    #[test]
    fn test_adjacent_neighbors_no_padding() {
        let genome = mock_genome();
        // neighbors directly adjacent on both sides leave no room at all
        let call = build_call(10, &["GGAC", "G"]);
        let normalized = normalize_flanks(&call, 9, 14, &genome).unwrap();
        assert_eq!(normalized, call);
    }

    #[test]
    fn test_one_sided_padding() {
        let genome = mock_genome();
        // left side blocked, right side open
        let call = build_call(10, &["GGAC", "G"]);
        let normalized = normalize_flanks(&call, 9, 24, &genome).unwrap();
        assert_eq!(normalized.first(), 10);
        assert_eq!(normalized.alleles()[0], "GGACCATTA");
        assert_eq!(normalized.alleles()[1], "GCATTA");
    }

    #[test]
    fn test_expansion_round_trip() {
        let genome = mock_genome();
        let call = build_call(10, &["GGAC", "G"]);
        let normalized = normalize_flanks(&call, 0, 24, &genome).unwrap();

        // stripping the applied pads reconstructs the original alleles exactly
        let left_pad = (call.first() - normalized.first()) as usize;
        let right_pad = (normalized.last() - call.last()) as usize;
        for (original, expanded) in call.alleles().iter().zip(normalized.alleles().iter()) {
            let trimmed = &expanded[left_pad..expanded.len() - right_pad];
            assert_eq!(trimmed, original);
        }
    }
}

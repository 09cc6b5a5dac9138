/*!
# Gold standard comparator
Contains the single-pass merge-join between the gold-standard (GS) call
stream and the materialized test call set. Both inputs must be sorted by
(sequence order, start position); the engine advances a cursor through the
test calls while iterating GS records, normalizes each test call against its
neighbors, and routes every pair through the consistency check into the
quality-stratified count matrices.

## Example usage
```rust
use goldfinch::comparator::{BenchConfig, GoldStandardComparator};
use goldfinch::data_types::comparison_counts::OutcomeColumn;
use goldfinch::data_types::variants::{CalledGenomicVariant, GenomicVariant, GenotypeClass, VariantType};
use rust_lib_reference_genome::reference_genome::ReferenceGenome;

// create a simple reference genome
let mut reference_genome = ReferenceGenome::empty_reference();
reference_genome.add_contig(
    "mock_chr1".to_string(), "ACGTTGCAAC"
).unwrap();

// GS and test agree on a heterozygous SNV at position 5 with quality 40
let build_call = |quality: u16| {
    let variant = GenomicVariant::new(
        "mock_chr1".to_string(), 5,
        vec!["T".to_string(), "C".to_string()], None
    ).unwrap();
    CalledGenomicVariant::new(variant, vec![0, 1], quality, None).unwrap()
};

let comparator = GoldStandardComparator::new(&reference_genome, BenchConfig::default());
let benchmark = comparator.run_benchmark(
    vec![Ok(build_call(40))], &[build_call(40)], None
).unwrap();

// the match survives every cutoff through 40 and converts to a miss above it
let counts = benchmark.counts(VariantType::Snv);
let matched = OutcomeColumn::Matched {
    gs: GenotypeClass::Heterozygous, test: GenotypeClass::Heterozygous
};
assert_eq!(counts.count(4, matched), 1);
assert_eq!(counts.count(5, matched), 0);
```
*/

use derive_builder::Builder;
use log::debug;
use rust_lib_reference_genome::reference_genome::ReferenceGenome;
use serde::Serialize;
use strum_macros::EnumString;

use crate::allele_normalizer::normalize_flanks;
use crate::consistency::is_consistent;
use crate::data_types::comparison_counts::{GoldStandardBenchmark, LAST_QUALITY_ROW, OutcomeColumn, quality_row};
use crate::data_types::sequence_dictionary::SequenceDictionary;
use crate::data_types::variants::{CalledGenomicVariant, GenotypeClass};
use crate::genotype_quality::resolve_genotype_quality;

/// Selects which call records are forwarded to the output sink during a run
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, strum_macros::Display, EnumString, Serialize, clap::ValueEnum)]
pub enum OutputMode {
    /// Nothing is forwarded
    #[default]
    #[strum(ascii_case_insensitive, serialize = "none")]
    #[clap(name = "none")]
    None,
    /// GS records absent from the test set, plus matched pairs whose quality falls below the cutoff
    #[strum(ascii_case_insensitive, serialize = "false_negatives")]
    #[clap(name = "false-negatives")]
    FalseNegatives,
    /// Non-reference test calls at or above the cutoff that land inside evaluated GS regions
    #[strum(ascii_case_insensitive, serialize = "retained")]
    #[clap(name = "retained")]
    Retained,
    /// Overlapping pairs that disagree, either by genotype class or by alleles, at or above the cutoff
    #[strum(ascii_case_insensitive, serialize = "discordant")]
    #[clap(name = "discordant")]
    Discordant,
}

/// Receives call records selected by the active `OutputMode`.
/// Purely a pass-through; sink failures abort the run.
pub trait CallSink {
    fn emit(&mut self, call: &CalledGenomicVariant) -> anyhow::Result<()>;
}

/// Controls the accounting and output behavior of a benchmark run
#[derive(Builder, Clone, Copy, Debug, Default)]
#[builder(default)]
pub struct BenchConfig {
    /// if true, stray test calls join the false-discovery numerators instead of
    /// leaving the FDR/precision denominators
    count_non_gs_as_fp: bool,
    /// records below this genotype quality are not forwarded to the sink
    min_emit_quality: u16,
    /// which records the sink receives
    output_mode: OutputMode,
    /// if set, logs the engine decisions for the GS record starting at this position
    debug_position: Option<u64>
}

impl BenchConfig {
    // mostly getters
    pub fn count_non_gs_as_fp(&self) -> bool {
        self.count_non_gs_as_fp
    }

    pub fn min_emit_quality(&self) -> u16 {
        self.min_emit_quality
    }

    pub fn output_mode(&self) -> OutputMode {
        self.output_mode
    }

    pub fn debug_position(&self) -> Option<u64> {
        self.debug_position
    }
}

/// Drives one full benchmark pass. All mutable state lives inside
/// `run_benchmark`, so one comparator can serve multiple sequential runs.
pub struct GoldStandardComparator<'a> {
    /// Shared pre-loaded reference genome
    reference_genome: &'a ReferenceGenome,
    /// Sequence ordering derived from the reference genome
    sequence_dictionary: SequenceDictionary,
    /// Run configuration
    config: BenchConfig
}

impl<'a> GoldStandardComparator<'a> {
    /// Constructor; the sequence ordering is taken from the reference genome
    /// # Arguments
    /// * `reference_genome` - the pre-loaded reference genome
    /// * `config` - collection of configuration items for the benchmark
    pub fn new(reference_genome: &'a ReferenceGenome, config: BenchConfig) -> Self {
        let sequence_dictionary = SequenceDictionary::from_reference_genome(reference_genome);
        Self {
            reference_genome,
            sequence_dictionary,
            config
        }
    }

    /// Runs the full merge-join over both call sets and returns the populated
    /// count matrices. Single pass, no backtracking: the test cursor only ever
    /// moves forward, and each test call is claimed as a match candidate by at
    /// most one GS record.
    /// # Arguments
    /// * `gs_calls` - forward iterator over the GS call stream, sorted
    /// * `test_calls` - fully materialized test call set, sorted
    /// * `sink` - optional receiver for records selected by the output mode
    /// # Errors
    /// * if the GS stream yields an error
    /// * if normalization or consistency checking hits an invalid reference lookup
    /// * if either input names a sequence missing from the reference genome
    /// * if the sink fails to accept a record
    pub fn run_benchmark<I>(
        &self,
        gs_calls: I,
        test_calls: &[CalledGenomicVariant],
        mut sink: Option<&mut dyn CallSink>
    ) -> anyhow::Result<GoldStandardBenchmark>
    where
        I: IntoIterator<Item = anyhow::Result<CalledGenomicVariant>>
    {
        let mut benchmark = GoldStandardBenchmark::new(self.config.count_non_gs_as_fp);
        let mut idx_test: usize = 0;

        for gs_result in gs_calls {
            let call_gs = gs_result?;
            if !call_gs.is_undecided() {
                benchmark.add_confident_length(call_gs.reference_allele().len() as u64);
            }
            let reference_region = call_gs.is_homozygous_reference();
            let type_gs = call_gs.classify_variant_type();
            let debug_target = self.config.debug_position == Some(call_gs.first());

            // test calls overlapping this GS record, resolved later against the consistency check
            let mut candidates: Vec<(CalledGenomicVariant, u16)> = vec![];

            while idx_test < test_calls.len() {
                let call_test = &test_calls[idx_test];
                if call_test.is_undecided() {
                    idx_test += 1;
                    continue;
                }

                let qual_test = resolve_genotype_quality(call_test);
                let (last_before, first_after) = self.neighbor_bounds(test_calls, idx_test)?;
                let type_test = call_test.classify_variant_type();
                let class_test = call_test.genotype_class();
                let expanded = normalize_flanks(call_test, last_before, first_after, self.reference_genome)?;
                let comparison = self.sequence_dictionary.compare_regions(call_gs.variant(), expanded.variant())?;
                if debug_target {
                    debug!(
                        "GS call: {}-{} test call: {}-{} expanded: {}-{} type: {:?} class: {:?} comparison: {}",
                        call_gs.first(), call_gs.last(), call_test.first(), call_test.last(),
                        expanded.first(), expanded.last(), type_test, class_test, comparison
                    );
                }

                if comparison < -1 {
                    // entirely after this GS window; a later GS record owns it
                    break;
                }
                let column = if comparison <= 1 {
                    // overlap between the GS record and the extended test window
                    if !reference_region {
                        candidates.push((expanded, qual_test));
                        idx_test += 1;
                        continue;
                    }
                    // a non-reference call reaching past a reference-confirming
                    // region is settled by the next GS record instead
                    let remainder = expanded.last() as i64 - call_gs.last() as i64;
                    if debug_target {
                        debug!("GS call: {}-{} test call: {}-{} remainder: {}",
                            call_gs.first(), call_gs.last(), call_test.first(), call_test.last(), remainder);
                    }
                    if !call_test.is_homozygous_reference() && remainder > 0 {
                        break;
                    }
                    if call_test.first() < call_gs.first() || call_gs.last() < call_test.last() {
                        OutcomeColumn::Stray { test: class_test }
                    } else {
                        OutcomeColumn::Matched { gs: GenotypeClass::HomozygousReference, test: class_test }
                    }
                } else {
                    // entirely before the GS window
                    OutcomeColumn::Stray { test: class_test }
                };
                benchmark.counts_mut(type_test).update(0, quality_row(qual_test), column);
                if self.config.output_mode == OutputMode::Retained
                    && qual_test >= self.config.min_emit_quality
                    && !column.is_stray()
                    && !call_test.is_homozygous_reference() {
                    if let Some(s) = sink.as_mut() {
                        s.emit(call_test)?;
                    }
                }
                idx_test += 1;
            }

            if call_gs.is_undecided() || reference_region {
                // overlapping test calls were already settled in the loop above;
                // anything intersecting an unknown GS site receives no accounting
                continue;
            }

            // the GS record is a true variant
            let class_gs = call_gs.genotype_class();
            if candidates.is_empty() {
                benchmark.counts_mut(type_gs).update(0, LAST_QUALITY_ROW, OutcomeColumn::Missed { gs: class_gs });
                if self.config.output_mode == OutputMode::FalseNegatives {
                    if let Some(s) = sink.as_mut() {
                        s.emit(&call_gs)?;
                    }
                }
                continue;
            }

            let mut covered = false;
            for (candidate, qual_test) in candidates.iter() {
                let consistent = is_consistent(&call_gs, candidate, self.reference_genome)?;
                let type_test = candidate.classify_variant_type();
                let class_test = candidate.genotype_class();
                if consistent {
                    let row = quality_row(*qual_test);
                    let counts = benchmark.counts_mut(type_gs);
                    counts.update(0, row, OutcomeColumn::Matched { gs: class_gs, test: class_test });
                    // above the call's own quality the match degrades into a miss
                    counts.update(row + 1, LAST_QUALITY_ROW, OutcomeColumn::Missed { gs: class_gs });
                    covered = true;

                    let emit_pair = match self.config.output_mode {
                        OutputMode::FalseNegatives => *qual_test < self.config.min_emit_quality,
                        OutputMode::Discordant => class_gs != class_test && *qual_test >= self.config.min_emit_quality,
                        _ => false
                    };
                    if emit_pair {
                        if let Some(s) = sink.as_mut() {
                            s.emit(&call_gs)?;
                            s.emit(candidate)?;
                        }
                    }
                } else {
                    // an inconsistent overlap is a false positive of the test call's own type
                    benchmark.counts_mut(type_test).update(0, quality_row(*qual_test), OutcomeColumn::Stray { test: class_test });
                    if self.config.output_mode == OutputMode::Discordant && *qual_test >= self.config.min_emit_quality {
                        if let Some(s) = sink.as_mut() {
                            s.emit(&call_gs)?;
                            s.emit(candidate)?;
                        }
                    }
                }
            }
            if !covered {
                benchmark.counts_mut(type_gs).update(0, LAST_QUALITY_ROW, OutcomeColumn::Missed { gs: class_gs });
            }
        }

        // everything left after GS exhaustion is a stray false positive
        while idx_test < test_calls.len() {
            let call_test = &test_calls[idx_test];
            if !call_test.is_undecided() {
                let type_test = call_test.classify_variant_type();
                let qual_test = resolve_genotype_quality(call_test);
                let class_test = call_test.genotype_class();
                benchmark.counts_mut(type_test).update(0, quality_row(qual_test), OutcomeColumn::Stray { test: class_test });
                if self.config.output_mode == OutputMode::Retained
                    && qual_test >= self.config.min_emit_quality
                    && !call_test.is_homozygous_reference() {
                    if let Some(s) = sink.as_mut() {
                        s.emit(call_test)?;
                    }
                }
            }
            idx_test += 1;
        }

        benchmark.finalize_confident_mbp();
        Ok(benchmark)
    }

    /// Exclusive bounds of the test call at `index`, taken from its
    /// same-sequence neighbors: the previous call's end (or 0) and the next
    /// call's start (or the sequence length). Normalization must not pad into
    /// these spans.
    fn neighbor_bounds(&self, test_calls: &[CalledGenomicVariant], index: usize) -> anyhow::Result<(u64, u64)> {
        let call = &test_calls[index];
        let last_before = if index == 0 || test_calls[index - 1].sequence_name() != call.sequence_name() {
            0
        } else {
            test_calls[index - 1].last()
        };
        let first_after = if index == test_calls.len() - 1 || test_calls[index + 1].sequence_name() != call.sequence_name() {
            self.sequence_dictionary.sequence_length(call.sequence_name())?
        } else {
            test_calls[index + 1].first()
        };
        Ok((last_before, first_after))
    }
}

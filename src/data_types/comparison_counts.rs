
use crate::data_types::variants::{GenotypeClass, VariantType};

/// Number of quality-threshold rows; row r keeps calls with quality >= 10*r
pub const NUM_QUALITY_ROWS: usize = 10;
/// Index of the final quality-threshold row
pub const LAST_QUALITY_ROW: usize = NUM_QUALITY_ROWS - 1;
/// Number of outcome columns per row
pub const NUM_OUTCOME_COLUMNS: usize = 15;

/// All variant types a benchmark tracks, in matrix order
pub const VARIANT_TYPES: [VariantType; 3] = [
    VariantType::Snv,
    VariantType::Indel,
    VariantType::Str
];

/// Named outcome columns for the count matrices.
/// Layout is fixed for output compatibility: columns 0-8 are the
/// (GS class x test class) match grid, 9-11 are GS calls missing from the
/// test set, and 12-14 are test calls with no consistent GS counterpart.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OutcomeColumn {
    /// GS and an overlapping, consistent test call, by their genotype classes
    Matched{ gs: GenotypeClass, test: GenotypeClass },
    /// GS call with no consistent test call, by GS genotype class
    Missed{ gs: GenotypeClass },
    /// Test call attributed to no GS variant, by test genotype class
    Stray{ test: GenotypeClass }
}

impl OutcomeColumn {
    /// The flat column index this outcome occupies
    pub fn index(self) -> usize {
        match self {
            OutcomeColumn::Matched { gs, test } => 3 * gs.offset() + test.offset(),
            OutcomeColumn::Missed { gs } => 9 + gs.offset(),
            OutcomeColumn::Stray { test } => 12 + test.offset()
        }
    }

    /// True for the columns outside the match grid that carry the +12 shift
    pub fn is_stray(self) -> bool {
        matches!(self, OutcomeColumn::Stray { .. })
    }
}

/// Derived accuracy statistics for one (row, genotype class) pair
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClassStats {
    /// Fraction of GS calls of this class recovered with the matching genotype
    pub recall: f64,
    /// Number of test calls of this class that contradict the GS
    pub false_discoveries: u64,
    /// False discoveries normalized by confident megabases
    pub fp_per_mbp: f64,
    /// False discovery rate over the adjusted test total
    pub fdr: f64,
    /// Fraction of the adjusted test total that matches the GS genotype
    pub precision: f64,
    /// Harmonic mean of precision and recall
    pub f1: f64
}

/// Quality-stratified confusion counts for one variant type.
/// Row r accumulates every outcome whose call survives a quality cutoff of
/// 10*r, so counts are monotonically non-increasing down the rows.
#[derive(Clone, Debug, PartialEq)]
pub struct ComparisonCounts {
    /// counts[row][column]
    counts: [[u64; NUM_OUTCOME_COLUMNS]; NUM_QUALITY_ROWS],
    /// If true, stray test calls join the false-discovery numerator;
    /// otherwise they are excluded from the FDR/precision denominator
    count_non_gs_as_fp: bool,
    /// Confident megabases used to normalize false-positive rates
    confident_mbp: f64
}

impl Default for ComparisonCounts {
    fn default() -> Self {
        Self {
            counts: [[0; NUM_OUTCOME_COLUMNS]; NUM_QUALITY_ROWS],
            count_non_gs_as_fp: false,
            confident_mbp: 3000.0
        }
    }
}

/// Maps a genotype quality onto its highest retaining threshold row
pub fn quality_row(quality: u16) -> usize {
    (quality as usize / 10).min(LAST_QUALITY_ROW)
}

impl ComparisonCounts {
    /// Constructor
    /// # Arguments
    /// * `count_non_gs_as_fp` - selects how stray test calls fold into the derived statistics
    pub fn new(count_non_gs_as_fp: bool) -> Self {
        Self {
            count_non_gs_as_fp,
            ..Default::default()
        }
    }

    /// The sole mutator: increments the outcome column at every row in the
    /// inclusive range. An inverted range is a no-op, which callers rely on
    /// when a call's quality row is already the last row.
    pub fn update(&mut self, first_row: usize, last_row: usize, column: OutcomeColumn) {
        let column = column.index();
        for row in first_row..=last_row.min(LAST_QUALITY_ROW) {
            self.counts[row][column] += 1;
        }
    }

    /// Overrides the confident megabase normalizer, typically once per run
    pub fn set_confident_mbp(&mut self, confident_mbp: f64) {
        self.confident_mbp = confident_mbp;
    }

    /// Raw count lookup
    pub fn count(&self, row: usize, column: OutcomeColumn) -> u64 {
        self.counts[row][column.index()]
    }

    /// All 15 raw counts for a row, in column order
    pub fn row_counts(&self, row: usize) -> &[u64; NUM_OUTCOME_COLUMNS] {
        &self.counts[row]
    }

    /// Number of GS calls of the given class retained at a row: the class's
    /// grid row plus its miss column
    pub fn gs_total(&self, row: usize, class: GenotypeClass) -> u64 {
        let row = &self.counts[row];
        let c = class.offset();
        row[3 * c] + row[3 * c + 1] + row[3 * c + 2] + row[9 + c]
    }

    /// Number of test calls of the given class retained at a row: the class's
    /// grid column plus its stray column
    pub fn test_total(&self, row: usize, class: GenotypeClass) -> u64 {
        let row = &self.counts[row];
        let c = class.offset();
        row[c] + row[3 + c] + row[6 + c] + row[12 + c]
    }

    /// Derived statistics for one genotype class at one threshold row.
    /// The report consumes the heterozygous and alternate-homozygous classes;
    /// the computation is generic over all three.
    pub fn class_stats(&self, row_index: usize, class: GenotypeClass) -> ClassStats {
        let row = &self.counts[row_index];
        let c = class.offset();

        let diagonal = row[3 * c + c];
        let gs_total = self.gs_total(row_index, class);
        let recall = if gs_total > 0 {
            diagonal as f64 / gs_total as f64
        } else {
            0.0
        };

        // off-diagonal matches of this test class contradict the GS genotype
        let mut false_discoveries: u64 = (0..3usize)
            .filter(|&g| g != c)
            .map(|g| row[3 * g + c])
            .sum();
        let mut denominator = self.test_total(row_index, class) as f64;
        if self.count_non_gs_as_fp {
            false_discoveries += row[12 + c];
        } else {
            denominator -= row[12 + c] as f64;
        }

        let fp_per_mbp = false_discoveries as f64 / self.confident_mbp;
        let (fdr, precision) = if denominator > 0.0 {
            (false_discoveries as f64 / denominator, diagonal as f64 / denominator)
        } else {
            (0.0, 1.0)
        };
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        ClassStats {
            recall,
            false_discoveries,
            fp_per_mbp,
            fdr,
            precision,
            f1
        }
    }

    pub fn count_non_gs_as_fp(&self) -> bool {
        self.count_non_gs_as_fp
    }

    pub fn confident_mbp(&self) -> f64 {
        self.confident_mbp
    }
}

/// Full result of one benchmarking pass: one count matrix per variant type
/// plus the confident-region length accumulated alongside.
#[derive(Clone, Debug, PartialEq)]
pub struct GoldStandardBenchmark {
    /// One matrix per entry in `VARIANT_TYPES`
    counts_per_type: [ComparisonCounts; 3],
    /// Total bases where the GS asserts a definite genotype
    confident_length: u64
}

impl GoldStandardBenchmark {
    /// Creates an empty benchmark
    /// # Arguments
    /// * `count_non_gs_as_fp` - forwarded to every per-type matrix
    pub fn new(count_non_gs_as_fp: bool) -> Self {
        Self {
            counts_per_type: [
                ComparisonCounts::new(count_non_gs_as_fp),
                ComparisonCounts::new(count_non_gs_as_fp),
                ComparisonCounts::new(count_non_gs_as_fp)
            ],
            confident_length: 0
        }
    }

    /// Access to the matrix for a variant type
    pub fn counts(&self, variant_type: VariantType) -> &ComparisonCounts {
        &self.counts_per_type[variant_type as usize]
    }

    /// Mutable access, used by the merge-join accounting
    pub fn counts_mut(&mut self, variant_type: VariantType) -> &mut ComparisonCounts {
        &mut self.counts_per_type[variant_type as usize]
    }

    /// Extends the confident-region total
    pub fn add_confident_length(&mut self, length: u64) {
        self.confident_length += length;
    }

    /// Confident length expressed in megabases
    pub fn confident_mbp(&self) -> f64 {
        self.confident_length as f64 / 1_000_000.0
    }

    /// Pushes the accumulated confident megabases into every matrix so the
    /// derived per-megabase statistics use this run's spans
    pub fn finalize_confident_mbp(&mut self) {
        let confident_mbp = self.confident_mbp();
        for counts in self.counts_per_type.iter_mut() {
            counts.set_confident_mbp(confident_mbp);
        }
    }

    pub fn confident_length(&self) -> u64 {
        self.confident_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;

    #[test]
    fn test_column_layout() {
        // spot check the fixed layout against the grid formula
        assert_eq!(OutcomeColumn::Matched {
            gs: GenotypeClass::HomozygousReference, test: GenotypeClass::HomozygousReference
        }.index(), 0);
        assert_eq!(OutcomeColumn::Matched {
            gs: GenotypeClass::Heterozygous, test: GenotypeClass::Heterozygous
        }.index(), 4);
        assert_eq!(OutcomeColumn::Matched {
            gs: GenotypeClass::HomozygousAlternate, test: GenotypeClass::Heterozygous
        }.index(), 7);
        assert_eq!(OutcomeColumn::Missed { gs: GenotypeClass::Heterozygous }.index(), 10);
        assert_eq!(OutcomeColumn::Stray { test: GenotypeClass::HomozygousAlternate }.index(), 14);
        assert!(OutcomeColumn::Stray { test: GenotypeClass::Heterozygous }.is_stray());
        assert!(!OutcomeColumn::Missed { gs: GenotypeClass::Heterozygous }.is_stray());
    }

    #[test]
    fn test_update_ranges() {
        let mut counts = ComparisonCounts::new(false);
        let column = OutcomeColumn::Matched {
            gs: GenotypeClass::Heterozygous, test: GenotypeClass::Heterozygous
        };
        counts.update(0, 4, column);
        for row in 0..5 {
            assert_eq!(counts.count(row, column), 1);
        }
        for row in 5..NUM_QUALITY_ROWS {
            assert_eq!(counts.count(row, column), 0);
        }

        // inverted range is a no-op
        counts.update(10, LAST_QUALITY_ROW, column);
        assert_eq!(counts.count(LAST_QUALITY_ROW, column), 0);
    }

    #[test]
    fn test_row_monotonicity() {
        // "at least this quality" updates all start at row 0, so raising the
        // threshold can never increase a retained count
        let mut counts = ComparisonCounts::new(false);
        let updates = [
            (4usize, OutcomeColumn::Matched { gs: GenotypeClass::Heterozygous, test: GenotypeClass::Heterozygous }),
            (9, OutcomeColumn::Missed { gs: GenotypeClass::Heterozygous }),
            (2, OutcomeColumn::Stray { test: GenotypeClass::HomozygousAlternate }),
            (2, OutcomeColumn::Stray { test: GenotypeClass::HomozygousAlternate }),
            (0, OutcomeColumn::Matched { gs: GenotypeClass::HomozygousReference, test: GenotypeClass::HomozygousReference }),
        ];
        for (last, column) in updates {
            counts.update(0, last, column);
        }
        for column in 0..NUM_OUTCOME_COLUMNS {
            for row in 1..NUM_QUALITY_ROWS {
                assert!(
                    counts.counts[row][column] <= counts.counts[row - 1][column],
                    "column {column} not monotone at row {row}"
                );
            }
        }
    }

    #[test]
    fn test_paired_update_preserves_gs_total() {
        // a consistent match pairs a grid update up to its quality row with a
        // miss update on the remaining rows; the GS total must not leak
        let mut counts = ComparisonCounts::new(false);
        let row = 4;
        counts.update(0, row, OutcomeColumn::Matched {
            gs: GenotypeClass::Heterozygous, test: GenotypeClass::Heterozygous
        });
        counts.update(row + 1, LAST_QUALITY_ROW, OutcomeColumn::Missed {
            gs: GenotypeClass::Heterozygous
        });
        for r in 0..NUM_QUALITY_ROWS {
            assert_eq!(counts.gs_total(r, GenotypeClass::Heterozygous), 1, "row {r}");
        }
    }

    #[test]
    fn test_class_stats_identical_het_snv() {
        // one het SNV at quality 40, called identically in GS and test
        let mut counts = ComparisonCounts::new(false);
        let matched = OutcomeColumn::Matched {
            gs: GenotypeClass::Heterozygous, test: GenotypeClass::Heterozygous
        };
        let missed = OutcomeColumn::Missed { gs: GenotypeClass::Heterozygous };
        counts.update(0, 4, matched);
        counts.update(5, LAST_QUALITY_ROW, missed);

        let stats = counts.class_stats(0, GenotypeClass::Heterozygous);
        assert_approx_eq!(stats.recall, 1.0);
        assert_eq!(stats.false_discoveries, 0);
        assert_approx_eq!(stats.precision, 1.0);
        assert_approx_eq!(stats.f1, 1.0);

        // raising the cutoff above 40 converts the match to a miss
        let stats = counts.class_stats(5, GenotypeClass::Heterozygous);
        assert_approx_eq!(stats.recall, 0.0);
        assert_eq!(counts.gs_total(5, GenotypeClass::Heterozygous), 1);
        assert_eq!(counts.test_total(5, GenotypeClass::Heterozygous), 0);
    }

    #[test]
    fn test_class_stats_genotype_discordance() {
        // GS hom-alt call recovered as a het: diagonal stays empty
        let mut counts = ComparisonCounts::new(false);
        counts.update(0, LAST_QUALITY_ROW, OutcomeColumn::Matched {
            gs: GenotypeClass::HomozygousAlternate, test: GenotypeClass::Heterozygous
        });

        let het_stats = counts.class_stats(0, GenotypeClass::Heterozygous);
        assert_eq!(het_stats.false_discoveries, 1);
        assert_approx_eq!(het_stats.fdr, 1.0);
        assert_approx_eq!(het_stats.precision, 0.0);

        let hom_stats = counts.class_stats(0, GenotypeClass::HomozygousAlternate);
        assert_approx_eq!(hom_stats.recall, 0.0);
        assert_eq!(hom_stats.false_discoveries, 0);
    }

    #[test]
    fn test_stray_fold_toggle() {
        // one perfect het match plus one stray het call
        let build = |count_non_gs_as_fp: bool| {
            let mut counts = ComparisonCounts::new(count_non_gs_as_fp);
            counts.update(0, LAST_QUALITY_ROW, OutcomeColumn::Matched {
                gs: GenotypeClass::Heterozygous, test: GenotypeClass::Heterozygous
            });
            counts.update(0, LAST_QUALITY_ROW, OutcomeColumn::Stray {
                test: GenotypeClass::Heterozygous
            });
            counts
        };

        // excluded: the stray leaves the denominator, precision stays perfect
        let stats = build(false).class_stats(0, GenotypeClass::Heterozygous);
        assert_eq!(stats.false_discoveries, 0);
        assert_approx_eq!(stats.precision, 1.0);

        // folded: the stray is a false discovery over the full test total
        let stats = build(true).class_stats(0, GenotypeClass::Heterozygous);
        assert_eq!(stats.false_discoveries, 1);
        assert_approx_eq!(stats.fdr, 0.5);
        assert_approx_eq!(stats.precision, 0.5);
    }

    #[test]
    fn test_empty_matrix_stats() {
        let counts = ComparisonCounts::new(false);
        let stats = counts.class_stats(0, GenotypeClass::Heterozygous);
        assert_approx_eq!(stats.recall, 0.0);
        assert_approx_eq!(stats.fdr, 0.0);
        // empty denominator defaults precision to 1, so F1 stays defined
        assert_approx_eq!(stats.precision, 1.0);
        assert_approx_eq!(stats.f1, 0.0);
    }

    #[test]
    fn test_benchmark_confident_mbp() {
        let mut benchmark = GoldStandardBenchmark::new(false);
        benchmark.add_confident_length(2_500_000);
        benchmark.add_confident_length(500_000);
        assert_eq!(benchmark.confident_length(), 3_000_000);
        assert_approx_eq!(benchmark.confident_mbp(), 3.0);

        benchmark.finalize_confident_mbp();
        for variant_type in VARIANT_TYPES {
            assert_approx_eq!(benchmark.counts(variant_type).confident_mbp(), 3.0);
        }
    }
}

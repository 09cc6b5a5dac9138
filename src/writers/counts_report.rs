

use serde::Serialize;
use std::fs::File;
use std::path::Path;

use crate::data_types::comparison_counts::{ComparisonCounts, GoldStandardBenchmark, NUM_QUALITY_ROWS, VARIANT_TYPES};
use crate::data_types::variants::GenotypeClass;

/// Contains all the data written to each row of our counts file.
/// Column order matches the established report layout: the 15 raw counts,
/// per-class totals, then the derived statistics for the het and hom-alt classes.
#[derive(Serialize)]
struct CountsRow {
    /// The variant type this row belongs to
    variant_type: String,
    /// Genotype quality cutoff applied to this row
    min_gq: usize,
    // the 3x3 match grid, GS class major
    gs_homref_test_homref: u64,
    gs_homref_test_het: u64,
    gs_homref_test_homalt: u64,
    gs_het_test_homref: u64,
    gs_het_test_het: u64,
    gs_het_test_homalt: u64,
    gs_homalt_test_homref: u64,
    gs_homalt_test_het: u64,
    gs_homalt_test_homalt: u64,
    // GS calls with no consistent test counterpart
    missed_homref: u64,
    missed_het: u64,
    missed_homalt: u64,
    // test calls attributed to no GS variant
    stray_homref: u64,
    stray_het: u64,
    stray_homalt: u64,
    // per-class totals
    gs_total_homref: u64,
    gs_total_het: u64,
    gs_total_homalt: u64,
    test_total_homref: u64,
    test_total_het: u64,
    test_total_homalt: u64,
    // derived statistics, heterozygous class
    het_recall: f64,
    het_false_discoveries: u64,
    het_fp_per_mbp: f64,
    het_fdr: f64,
    het_precision: f64,
    het_f1: f64,
    // derived statistics, alternate-homozygous class
    homalt_recall: f64,
    homalt_false_discoveries: u64,
    homalt_fp_per_mbp: f64,
    homalt_fdr: f64,
    homalt_precision: f64,
    homalt_f1: f64
}

impl CountsRow {
    /// Builds one report row from a matrix row
    fn new(variant_type: String, row: usize, counts: &ComparisonCounts) -> Self {
        let raw = counts.row_counts(row);
        let het = counts.class_stats(row, GenotypeClass::Heterozygous);
        let homalt = counts.class_stats(row, GenotypeClass::HomozygousAlternate);

        Self {
            variant_type,
            min_gq: row * 10,
            gs_homref_test_homref: raw[0],
            gs_homref_test_het: raw[1],
            gs_homref_test_homalt: raw[2],
            gs_het_test_homref: raw[3],
            gs_het_test_het: raw[4],
            gs_het_test_homalt: raw[5],
            gs_homalt_test_homref: raw[6],
            gs_homalt_test_het: raw[7],
            gs_homalt_test_homalt: raw[8],
            missed_homref: raw[9],
            missed_het: raw[10],
            missed_homalt: raw[11],
            stray_homref: raw[12],
            stray_het: raw[13],
            stray_homalt: raw[14],
            gs_total_homref: counts.gs_total(row, GenotypeClass::HomozygousReference),
            gs_total_het: counts.gs_total(row, GenotypeClass::Heterozygous),
            gs_total_homalt: counts.gs_total(row, GenotypeClass::HomozygousAlternate),
            test_total_homref: counts.test_total(row, GenotypeClass::HomozygousReference),
            test_total_het: counts.test_total(row, GenotypeClass::Heterozygous),
            test_total_homalt: counts.test_total(row, GenotypeClass::HomozygousAlternate),
            het_recall: het.recall,
            het_false_discoveries: het.false_discoveries,
            het_fp_per_mbp: het.fp_per_mbp,
            het_fdr: het.fdr,
            het_precision: het.precision,
            het_f1: het.f1,
            homalt_recall: homalt.recall,
            homalt_false_discoveries: homalt.false_discoveries,
            homalt_fp_per_mbp: homalt.fp_per_mbp,
            homalt_fdr: homalt.fdr,
            homalt_precision: homalt.precision,
            homalt_f1: homalt.f1
        }
    }
}

/// Will write the full benchmark out to the given file path, one row per
/// (variant type, quality threshold).
/// # Arguments
/// * `benchmark` - the completed benchmark results
/// * `filename` - the filename for the output (tsv/csv)
pub fn write_counts_report(benchmark: &GoldStandardBenchmark, filename: &Path) -> csv::Result<()> {
    // modify the delimiter to "," if it ends with .csv
    let is_csv: bool = filename.extension().unwrap_or_default() == "csv";
    let delimiter: u8 = if is_csv { b',' } else { b'\t' };
    let mut csv_writer: csv::Writer<File> = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(filename)?;

    for variant_type in VARIANT_TYPES {
        let counts = benchmark.counts(variant_type);
        for row in 0..NUM_QUALITY_ROWS {
            let counts_row = CountsRow::new(variant_type.as_ref().to_string(), row, counts);
            csv_writer.serialize(&counts_row)?;
        }
    }

    // save everything
    csv_writer.flush()?;
    Ok(())
}

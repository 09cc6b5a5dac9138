
use anyhow::Context;
use itertools::Itertools;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::comparator::CallSink;
use crate::data_types::variants::CalledGenomicVariant;

/// Writes records selected by the output mode as minimal single-sample VCF.
/// Only the fields the benchmark tracks are serialized (site, GT, GQ); this is
/// a pass-through artifact for inspection, not a faithful copy of the input.
pub struct VcfSinkWriter {
    /// Destination, gzip compressed when the filename ends in .gz
    writer: BufWriter<Box<dyn Write>>
}

impl VcfSinkWriter {
    /// Opens the sink and writes the header lines.
    /// # Arguments
    /// * `filename` - user provided path to write to, .gz enables compression
    /// * `sample_name` - sample name for the header line
    /// # Errors
    /// * if the file cannot be created or the header fails to write
    pub fn new(filename: &Path, sample_name: &str) -> anyhow::Result<Self> {
        let file: Box<dyn Write> = if filename.extension().unwrap_or_default() == "gz" {
            Box::new(
                flate2::write::GzEncoder::new(
                    File::create(filename)?,
                    flate2::Compression::best()
                )
            )
        } else {
            Box::new(File::create(filename)?)
        };
        let mut writer = BufWriter::new(file);

        writeln!(writer, "##fileformat=VCFv4.2")
            .with_context(|| format!("Error while writing header to {filename:?}:"))?;
        writeln!(writer, "##source=goldfinch_v{}", env!("CARGO_PKG_VERSION"))?;
        writeln!(writer, "##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">")?;
        writeln!(writer, "##FORMAT=<ID=GQ,Number=1,Type=Integer,Description=\"Genotype quality\">")?;
        writeln!(writer, "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\t{sample_name}")?;

        Ok(Self {
            writer
        })
    }

    /// Flushes everything to disk; call once at the end of the run
    pub fn finish(&mut self) -> anyhow::Result<()> {
        self.writer.flush()
            .with_context(|| "Error while flushing output VCF:".to_string())
    }
}

impl CallSink for VcfSinkWriter {
    fn emit(&mut self, call: &CalledGenomicVariant) -> anyhow::Result<()> {
        let line = format_record(call);
        writeln!(self.writer, "{line}")
            .with_context(|| format!("Error while writing record at {}:{}:", call.sequence_name(), call.first()))
    }
}

/// Serializes one call as a VCF data line
fn format_record(call: &CalledGenomicVariant) -> String {
    let alleles = call.alleles();
    let alt_field = if alleles.len() > 1 {
        alleles[1..].iter().join(",")
    } else {
        ".".to_string()
    };

    let called = call.called_indices();
    let gt_field = match called.len() {
        0 => "./.".to_string(),
        1 => format!("{}/{}", called[0], called[0]),
        _ => format!("{}/{}", called[0], called[1])
    };

    format!(
        "{}\t{}\t.\t{}\t{}\t.\t.\t.\tGT:GQ\t{}:{}",
        call.sequence_name(), call.first(), call.reference_allele(), alt_field,
        gt_field, call.genotype_quality()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::data_types::variants::GenomicVariant;

    fn build_call(alleles: &[&str], called: &[u8], quality: u16) -> CalledGenomicVariant {
        let variant = GenomicVariant::new(
            "chr1".to_string(), 100,
            alleles.iter().map(|a| a.to_string()).collect(),
            None
        ).unwrap();
        CalledGenomicVariant::new(variant, called.to_vec(), quality, None).unwrap()
    }

    #[test]
    fn test_format_het() {
        let call = build_call(&["A", "T"], &[0, 1], 40);
        assert_eq!(format_record(&call), "chr1\t100\t.\tA\tT\t.\t.\t.\tGT:GQ\t0/1:40");
    }

    #[test]
    fn test_format_homozygous() {
        let call = build_call(&["A", "T"], &[1], 99);
        assert_eq!(format_record(&call), "chr1\t100\t.\tA\tT\t.\t.\t.\tGT:GQ\t1/1:99");
    }

    #[test]
    fn test_format_undecided_and_multiallelic() {
        let call = build_call(&["A", "T", "TGG"], &[], 0);
        assert_eq!(format_record(&call), "chr1\t100\t.\tA\tT,TGG\t.\t.\t.\tGT:GQ\t./.:0");
    }

    #[test]
    fn test_format_reference_block() {
        let call = build_call(&["ACGT"], &[0], 50);
        assert_eq!(format_record(&call), "chr1\t100\t.\tACGT\t.\t.\t.\t.\tGT:GQ\t0/0:50");
    }
}


use anyhow::{Context, anyhow, ensure};
use log::{debug, info, trace};
use noodles::vcf;
use noodles::vcf::variant::record::samples::keys::key as vcf_key;
use noodles::vcf::variant::record_buf::samples::sample::value::Array;
use noodles::vcf::variant::record_buf::samples::sample::Value;
use noodles_util::variant::io::Reader as VariantReader;
use std::io::BufRead;
use std::path::Path;

use crate::data_types::call_report::VariantCallReport;
use crate::data_types::variants::{CalledGenomicVariant, GenomicVariant, VariantType};
use crate::parsing::noodles_helper::{get_sample_index, open_variant_reader};

/// Streaming single-sample call reader, used for the gold-standard input.
/// Yields calls in file order; the comparison engine requires that order to be
/// (sequence, start) sorted, which is treated as a documented precondition of
/// the input rather than re-verified record by record.
pub struct CalledVariantReader {
    /// Underlying dynamic-format reader
    vcf_reader: VariantReader<Box<dyn BufRead>>,
    /// Pre-loaded header for record conversion
    vcf_header: vcf::Header,
    /// Index of the sample to extract genotypes from
    sample_index: usize
}

impl CalledVariantReader {
    /// Opens a streaming reader over one sample of a VCF file.
    /// # Arguments
    /// * `vcf_fn` - filepath of the VCF, multiple formats supported
    /// * `sample_name` - sample name to read genotypes from
    /// # Errors
    /// * if the file cannot be opened or the sample is absent
    pub fn new(vcf_fn: &Path, sample_name: &str) -> anyhow::Result<Self> {
        let (vcf_reader, vcf_header) = open_variant_reader(vcf_fn)?;
        let sample_index = get_sample_index(&vcf_header, sample_name, vcf_fn)?;

        Ok(Self {
            vcf_reader,
            vcf_header,
            sample_index
        })
    }
}

impl Iterator for CalledVariantReader {
    type Item = anyhow::Result<CalledGenomicVariant>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.vcf_reader.records(&self.vcf_header).next()?;
        let item = result
            .map_err(anyhow::Error::from)
            .and_then(|record| {
                let record_buf = vcf::variant::RecordBuf::try_from_variant_record(&self.vcf_header, record.as_ref())?;
                convert_record(&record_buf, self.sample_index)
                    .with_context(|| format!("Error while converting record {record_buf:?}:"))
            });
        Some(item)
    }
}

/// Fully materializes the calls of one sample, verifying the sort order the
/// engine depends on (ascending start per sequence, no revisited sequences).
/// # Arguments
/// * `vcf_fn` - filepath of the VCF, multiple formats supported
/// * `sample_name` - sample name to read genotypes from
/// # Errors
/// * if the file cannot be opened or the sample is absent
/// * if any record fails conversion
/// * if the calls are out of order
pub fn load_called_variants(vcf_fn: &Path, sample_name: &str) -> anyhow::Result<Vec<CalledGenomicVariant>> {
    debug!("Pre-loading calls from {vcf_fn:?}...");
    let reader = CalledVariantReader::new(vcf_fn, sample_name)?;

    let mut calls: Vec<CalledGenomicVariant> = vec![];
    let mut seen_sequences: Vec<String> = vec![];
    for result in reader {
        let call = result?;
        match calls.last() {
            Some(previous) if previous.sequence_name() == call.sequence_name() => {
                ensure!(
                    previous.first() <= call.first(),
                    "Calls in {vcf_fn:?} are not sorted: {}:{} follows {}:{}",
                    call.sequence_name(), call.first(), previous.sequence_name(), previous.first()
                );
            },
            _ => {
                // sequence transition (or very first call)
                ensure!(
                    !seen_sequences.iter().any(|s| s == call.sequence_name()),
                    "Calls in {vcf_fn:?} are not sorted: sequence {:?} appears in multiple blocks",
                    call.sequence_name()
                );
                seen_sequences.push(call.sequence_name().to_string());
            }
        }
        calls.push(call);
    }

    info!("Loaded {} test calls from {} sequences.", calls.len(), seen_sequences.len());
    Ok(calls)
}

/// Converts one parsed VCF record into a called variant for a sample.
/// A missing or partial GT becomes an undecided call; GQ is carried over when
/// present, and GL/PL fields become a likelihood report for quality resolution.
/// # Arguments
/// * `record` - the record to convert
/// * `sample_index` - index of the sample to pull the genotype from
fn convert_record(record: &vcf::variant::RecordBuf, sample_index: usize) -> anyhow::Result<CalledGenomicVariant> {
    // site-level columns
    let sequence_name = record.reference_sequence_name().to_string();
    let position = record.variant_start().ok_or(anyhow!("Missing POS"))?; // 1-based
    let reference = record.reference_bases().to_string();
    let mut alleles = vec![reference];
    alleles.extend(record.alternate_bases().as_ref().iter().cloned());
    let variant_type = declared_variant_type(record);

    // sample-specific information
    let all_samples = record.samples();
    let sample = all_samples.get_index(sample_index)
        .ok_or(anyhow!("Sample index {sample_index} does not exist"))?;

    let called_indices = match sample.get(vcf_key::GENOTYPE).flatten() {
        Some(gt) => parse_genotype(gt),
        None => vec![] // no GT at all is an undecided call
    };

    let genotype_quality = match sample.get(vcf_key::CONDITIONAL_GENOTYPE_QUALITY).flatten() {
        Some(Value::Integer(gq)) => (*gq).clamp(0, u16::MAX as i32) as u16,
        _ => 0
    };

    let gl_value = sample.get(vcf_key::GENOTYPE_LIKELIHOODS).flatten();
    let pl_value = sample.get(vcf_key::ROUNDED_GENOTYPE_LIKELIHOODS).flatten();
    let call_report = build_call_report(gl_value, pl_value, alleles.len())?;

    trace!("{sequence_name}\t{position}\t{alleles:?}\tGT={called_indices:?}\tGQ={genotype_quality}");

    let variant = GenomicVariant::new(sequence_name, position.get() as u64, alleles, variant_type)?;
    let call = CalledGenomicVariant::new(variant, called_indices, genotype_quality, call_report)?;
    Ok(call)
}

/// Pulls a declared type tag out of the INFO column when one is present.
/// Only the STR tag matters: SNV/indel classification is re-derived from the
/// alleles anyway, but repeat annotations cannot be.
fn declared_variant_type(record: &vcf::variant::RecordBuf) -> Option<VariantType> {
    use vcf::variant::record_buf::info::field::Value as InfoValue;

    let opt_type = record.info().get("TYPE");
    if let Some(Some(InfoValue::String(type_tag))) = opt_type {
        if type_tag == "STR" {
            return Some(VariantType::Str);
        }
    }
    None
}

/// Parses the GT field into sorted called-allele indices.
/// Any missing allele (e.g. `./1` or `./.`) makes the whole call undecided.
/// # Arguments
/// * `gt` - the GT field from the record
fn parse_genotype(gt: &Value) -> Vec<u8> {
    let mut ret = vec![];
    if let Value::Genotype(genotype) = gt {
        for allele in genotype.as_ref().iter() {
            match allele.position() {
                Some(index) => ret.push(index as u8),
                None => return vec![]
            }
        }
    }
    ret.sort_unstable();
    ret.dedup();
    ret
}

/// Builds the likelihood report from GL (log10 likelihoods) or PL
/// (Phred-scaled, converted back to log10), preferring GL when both exist.
/// # Arguments
/// * `gl_value` - the sample's GL field, if any
/// * `pl_value` - the sample's PL field, if any
/// * `num_alleles` - allele count at the site, fixes the expected vector length
/// # Errors
/// * if a likelihood vector length does not match the allele count
fn build_call_report(
    gl_value: Option<&Value>,
    pl_value: Option<&Value>,
    num_alleles: usize
) -> anyhow::Result<Option<VariantCallReport>> {
    let log_conditionals = match (gl_value, pl_value) {
        (Some(Value::Array(Array::Float(values))), _) => likelihoods_from_gl(values),
        (_, Some(Value::Array(Array::Integer(values)))) => likelihoods_from_pl(values),
        _ => return Ok(None)
    };

    let report = VariantCallReport::new(num_alleles, log_conditionals)
        .with_context(|| "Error while building call report:".to_string())?;
    Ok(Some(report))
}

/// GL values are already log10 likelihoods
fn likelihoods_from_gl(values: &[Option<f32>]) -> Vec<Option<f64>> {
    values.iter()
        .map(|v| v.map(|gl| gl as f64))
        .collect()
}

/// PL values are -10*log10 scaled and rounded; undo the scaling
fn likelihoods_from_pl(values: &[Option<i32>]) -> Vec<Option<f64>> {
    values.iter()
        .map(|v| v.map(|pl| -(pl as f64) / 10.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_likelihoods_from_pl() {
        // PL 0 is the most likely genotype, log10 likelihood 0
        let converted = likelihoods_from_pl(&[Some(40), Some(0), Some(55)]);
        assert_eq!(converted, vec![Some(-4.0), Some(0.0), Some(-5.5)]);

        // missing entries stay missing, which downgrades the whole report later
        let converted = likelihoods_from_pl(&[Some(10), None, Some(20)]);
        assert_eq!(converted, vec![Some(-1.0), None, Some(-2.0)]);
    }

    #[test]
    fn test_likelihoods_from_gl() {
        let converted = likelihoods_from_gl(&[Some(-0.5), Some(0.0), None]);
        assert_eq!(converted, vec![Some(-0.5), Some(0.0), None]);
    }

    #[test]
    fn test_report_length_check() {
        // a biallelic site expects three genotype likelihoods
        let result = VariantCallReport::new(2, likelihoods_from_pl(&[Some(0), Some(10)]));
        assert!(result.is_err());
    }

    // TODO: record-level conversion tests would need mock VCFs on disk; the
    //       comparator tests exercise the downstream logic, so on-disk parsing
    //       is covered by the end-to-end runs instead
}

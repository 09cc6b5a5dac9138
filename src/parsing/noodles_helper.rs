
use anyhow::{Context, anyhow};
use noodles::vcf;
use noodles_util::variant::io::Reader as VariantReader;
use noodles_util::variant::io::reader::Builder as VariantReaderBuilder;
use std::io::BufRead;
use std::path::Path;

/// Opens a VCF file (plain, gzip, or BCF) for streaming and pulls the header.
/// # Arguments
/// * `vcf_fn` - the file to open
/// # Errors
/// * if the file cannot be opened or the header cannot be parsed
pub fn open_variant_reader(vcf_fn: &Path) -> anyhow::Result<(VariantReader<Box<dyn BufRead>>, vcf::Header)> {
    let mut vcf_reader = VariantReaderBuilder::default()
        .build_from_path(vcf_fn)
        .with_context(|| format!("Error while opening {vcf_fn:?}:"))?;

    let vcf_header = vcf_reader.read_header()
        .with_context(|| format!("Error while reading header of {vcf_fn:?}:"))?;

    Ok((vcf_reader, vcf_header))
}

/// Finds the index of a sample in a VCF header.
/// # Arguments
/// * `vcf_header` - the pre-loaded header
/// * `sample_name` - the sample to look up
/// * `vcf_fn` - only used for error messages
/// # Errors
/// * if the sample is not in the header
pub fn get_sample_index(vcf_header: &vcf::Header, sample_name: &str, vcf_fn: &Path) -> anyhow::Result<usize> {
    vcf_header.sample_names().get_index_of(sample_name)
        .ok_or(anyhow!("Sample name {sample_name:?} was not found in {vcf_fn:?}"))
}

/// This will open a VCF file and retrieve the sample name at the given index
/// # Arguments
/// * `vcf_fn` - the VCF filename to open
/// * `index` - the index of the sample to return; 0 = first sample
pub fn get_vcf_sample_name(vcf_fn: &Path, index: usize) -> anyhow::Result<String> {
    let (_vcf_reader, vcf_header) = open_variant_reader(vcf_fn)?;

    let sample_name = vcf_header.sample_names().get_index(index)
        .ok_or(anyhow!("Sample index {index} does not exist in {vcf_fn:?}"))?
        .clone();

    Ok(sample_name)
}

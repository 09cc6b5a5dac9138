
use anyhow::{bail, ensure};
use clap::Args;
use log::info;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::core::{check_required_filename, AFTER_HELP, FULL_VERSION};
use crate::comparator::OutputMode;
use crate::parsing::noodles_helper::get_vcf_sample_name;

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct BenchSettings {
    #[clap(default_value = "")]
    #[clap(hide = true)]
    goldfinch_version: String,

    /// Reference FASTA file
    #[clap(required = true)]
    #[clap(short = 'r')]
    #[clap(long = "reference")]
    #[clap(value_name = "FASTA")]
    #[clap(help_heading = Some("Input/Output"))]
    pub reference_fn: PathBuf,

    /// Gold standard variant call file (VCF/gVCF)
    #[clap(required = true)]
    #[clap(short = 'g')]
    #[clap(long = "gs-vcf")]
    #[clap(value_name = "VCF")]
    #[clap(help_heading = Some("Input/Output"))]
    pub gs_vcf_filename: PathBuf,

    /// Test variant call file (VCF)
    #[clap(required = true)]
    #[clap(short = 't')]
    #[clap(long = "test-vcf")]
    #[clap(value_name = "VCF")]
    #[clap(help_heading = Some("Input/Output"))]
    pub test_vcf_filename: PathBuf,

    /// The sample name to use in the gold standard VCF [default: first sample]
    #[clap(long = "gs-sample")]
    #[clap(value_name = "SAMPLE")]
    #[clap(help_heading = Some("Input/Output"))]
    #[clap(default_value = "", hide_default_value = true)]
    pub gs_sample: String,

    /// The sample name to use in the test VCF [default: first sample]
    #[clap(long = "test-sample")]
    #[clap(value_name = "SAMPLE")]
    #[clap(help_heading = Some("Input/Output"))]
    #[clap(default_value = "", hide_default_value = true)]
    pub test_sample: String,

    /// Output counts and statistics file (TSV/CSV)
    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output-counts")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_counts_filename: PathBuf,

    /// Optional output VCF receiving the records selected by --output-mode
    #[clap(long = "output-vcf")]
    #[clap(value_name = "VCF")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_vcf_filename: Option<PathBuf>,

    /// Optional JSON dump of the resolved settings for reproducibility
    #[clap(long = "output-settings")]
    #[clap(value_name = "JSON")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_settings_filename: Option<PathBuf>,

    /// Selects which call records are written to --output-vcf
    #[clap(long = "output-mode")]
    #[clap(value_name = "MODE")]
    #[clap(help_heading = Some("Bench parameters"))]
    #[clap(default_value_t = OutputMode::None)]
    pub output_mode: OutputMode,

    /// Minimum genotype quality for records written to --output-vcf
    #[clap(long = "min-quality")]
    #[clap(value_name = "GQ")]
    #[clap(help_heading = Some("Bench parameters"))]
    #[clap(default_value = "0")]
    pub min_quality: u16,

    /// Counts test calls outside the gold standard regions as false discoveries
    /// instead of excluding them from the FDR/precision denominators
    #[clap(long = "count-non-gs-fp")]
    #[clap(help_heading = Some("Bench parameters"))]
    pub count_non_gs_as_fp: bool,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,

    // Debug options that are generally hidden and just for quick testing
    /// Logs engine decisions for the GS record starting at this position (debug only)
    #[clap(hide = true)]
    #[clap(long = "debug-position")]
    pub debug_position: Option<u64>,
}

pub fn check_bench_settings(mut settings: BenchSettings) -> anyhow::Result<BenchSettings> {
    // hard code the version in
    settings.goldfinch_version = FULL_VERSION.clone();
    info!("Goldfinch version: {:?}", &settings.goldfinch_version);
    info!("Sub-command: bench");
    info!("Inputs:");

    // check for all the required input files
    check_required_filename(&settings.reference_fn, "Reference FASTA")?;
    check_required_filename(&settings.gs_vcf_filename, "Gold standard VCF")?;
    check_required_filename(&settings.test_vcf_filename, "Test VCF")?;

    // dump stuff to the logger
    info!("\tReference: {:?}", &settings.reference_fn);
    info!("\tGold standard VCF: {:?}", &settings.gs_vcf_filename);
    if settings.gs_sample.is_empty() {
        settings.gs_sample = get_vcf_sample_name(&settings.gs_vcf_filename, 0)?;
    }
    info!("\tGold standard sample: {:?}", &settings.gs_sample);
    info!("\tTest VCF: {:?}", &settings.test_vcf_filename);
    if settings.test_sample.is_empty() {
        settings.test_sample = get_vcf_sample_name(&settings.test_vcf_filename, 0)?;
    }
    info!("\tTest sample: {:?}", &settings.test_sample);

    // outputs
    info!("Outputs:");
    info!("\tCounts report: {:?}", &settings.output_counts_filename);
    if let Some(out_vcf) = settings.output_vcf_filename.as_deref() {
        info!("\tOutput VCF: {out_vcf:?}");
    } else {
        info!("\tOutput VCF: None");
    }
    if let Some(out_settings) = settings.output_settings_filename.as_deref() {
        info!("\tSettings dump: {out_settings:?}");
    }

    // the output VCF and output mode only make sense together
    if settings.output_mode != OutputMode::None && settings.output_vcf_filename.is_none() {
        bail!("--output-vcf is required when --output-mode is not \"none\"");
    }
    ensure!(
        settings.output_vcf_filename.is_none() || settings.output_mode != OutputMode::None,
        "--output-mode must be set when --output-vcf is provided"
    );

    info!("Bench parameters:");
    info!("\tOutput mode: {}", settings.output_mode);
    if settings.output_mode != OutputMode::None {
        info!("\tMinimum output quality: {}", settings.min_quality);
    }
    info!("\tNon-GS calls in FDR: {}", if settings.count_non_gs_as_fp { "COUNTED" } else { "EXCLUDED" });

    Ok(settings)
}


use log::{LevelFilter, error, info};
use rust_lib_reference_genome::reference_genome::ReferenceGenome;
use std::time::Instant;

use goldfinch::cli::bench::{BenchSettings, check_bench_settings};
use goldfinch::cli::core::{Commands, get_cli};
use goldfinch::comparator::{BenchConfigBuilder, CallSink, GoldStandardComparator, OutputMode};
use goldfinch::data_types::comparison_counts::VARIANT_TYPES;
use goldfinch::data_types::variants::GenotypeClass;
use goldfinch::parsing::call_stream::{CalledVariantReader, load_called_variants};
use goldfinch::util::json_io::save_json;
use goldfinch::writers::counts_report::write_counts_report;
use goldfinch::writers::vcf_sink::VcfSinkWriter;

fn run_bench(settings: BenchSettings) {
    // start the timer
    let start_time = Instant::now();

    // set up logging before we check the other settings
    let filter_level: LevelFilter = match settings.verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace
    };
    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(filter_level)
        .init();

    let settings = match check_bench_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    // save the resolved settings if requested
    if let Some(settings_fn) = settings.output_settings_filename.as_deref() {
        info!("Saving resolved settings to {settings_fn:?}...");
        if let Err(e) = save_json(&settings, settings_fn) {
            error!("Error while saving settings: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    }

    // load the reference genome
    info!("Pre-loading reference genome into memory...");
    let reference_genome = match ReferenceGenome::from_fasta(&settings.reference_fn) {
        Ok(rg) => rg,
        Err(e) => {
            error!("Error while loading reference genome: {e:?}");
            std::process::exit(exitcode::IOERR);
        }
    };

    // the test calls are fully materialized for neighbor lookups
    info!("Pre-loading test calls into memory...");
    let test_calls = match load_called_variants(&settings.test_vcf_filename, &settings.test_sample) {
        Ok(calls) => calls,
        Err(e) => {
            error!("Error while loading test calls: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    };

    // the gold standard is streamed
    let gs_reader = match CalledVariantReader::new(&settings.gs_vcf_filename, &settings.gs_sample) {
        Ok(reader) => reader,
        Err(e) => {
            error!("Error while opening gold standard VCF: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    };

    // build our configuration
    let bench_config = match BenchConfigBuilder::default()
        .count_non_gs_as_fp(settings.count_non_gs_as_fp)
        .min_emit_quality(settings.min_quality)
        .output_mode(settings.output_mode)
        .debug_position(settings.debug_position)
        .build() {
        Ok(bc) => bc,
        Err(e) => {
            error!("Error while building bench config: {e:?}");
            std::process::exit(exitcode::SOFTWARE);
        }
    };

    // open the optional record sink
    let mut vcf_sink = if settings.output_mode != OutputMode::None {
        // settings checks guarantee the filename is present with a non-none mode
        let out_vcf = settings.output_vcf_filename.as_deref().unwrap();
        info!("Opening output VCF file...");
        match VcfSinkWriter::new(out_vcf, &settings.test_sample) {
            Ok(sink) => Some(sink),
            Err(e) => {
                error!("Error while creating output VCF: {e:#}");
                std::process::exit(exitcode::IOERR);
            }
        }
    } else {
        None
    };

    // run the single comparison pass
    info!("Comparing call sets...");
    let comparator = GoldStandardComparator::new(&reference_genome, bench_config);
    let benchmark = match comparator.run_benchmark(
        gs_reader, &test_calls,
        vcf_sink.as_mut().map(|s| s as &mut dyn CallSink)
    ) {
        Ok(b) => b,
        Err(e) => {
            error!("Error while comparing call sets: {e:#}");
            std::process::exit(exitcode::SOFTWARE);
        }
    };

    if let Some(sink) = vcf_sink.as_mut() {
        if let Err(e) = sink.finish() {
            error!("Error while finalizing output VCF: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    }

    // log the headline numbers before writing the full report
    info!("Confident Mbp: {:.3}", benchmark.confident_mbp());
    for variant_type in VARIANT_TYPES {
        let counts = benchmark.counts(variant_type);
        let het = counts.class_stats(0, GenotypeClass::Heterozygous);
        let homalt = counts.class_stats(0, GenotypeClass::HomozygousAlternate);
        info!("{variant_type:?} het: recall={:.4} precision={:.4} f1={:.4}", het.recall, het.precision, het.f1);
        info!("{variant_type:?} hom-alt: recall={:.4} precision={:.4} f1={:.4}", homalt.recall, homalt.precision, homalt.f1);
    }

    // now write things
    info!("Saving counts report to {:?}...", settings.output_counts_filename);
    if let Err(e) = write_counts_report(&benchmark, &settings.output_counts_filename) {
        error!("Error while saving counts report: {e:#}");
        std::process::exit(exitcode::IOERR);
    }

    info!("Benchmark completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn main() {
    let cli = get_cli();
    match cli.command {
        Commands::Bench(settings) => {
            run_bench(*settings);
        }
    }

    info!("Process finished successfully.");
}

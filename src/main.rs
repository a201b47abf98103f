
use log::{LevelFilter, error, info, warn};
use std::path::Path;
use std::time::Instant;

use varsieve::breakpoint_matcher::WindowedBreakpointMatcher;
use varsieve::cli::compare::{CompareKind, CompareSettings, check_compare_settings};
use varsieve::cli::core::{Commands, get_cli, load_column_config};
use varsieve::cli::spectrum::{SpectrumKind, SpectrumSettings, check_spectrum_settings};
use varsieve::comparison_report::ComparisonReport;
use varsieve::data_types::match_result::MatchResult;
use varsieve::data_types::spectrum::SpectrumTally;
use varsieve::data_types::variant_table::{TableRecord, VariantTable};
use varsieve::indel_classifier::MatrixGeneratorCommandBuilder;
use varsieve::parsing::table_loader::{load_indel_table, load_snv_table, load_sv_table};
use varsieve::sequence_provider::ReferenceSequence;
use varsieve::spectrum_counter::{count_indels, count_snvs, count_svs};
use varsieve::util::json_io::save_json;
use varsieve::variant_matcher::{MatchConfigBuilder, match_snvs, match_svs};
use varsieve::writers::comparison_summary::{SummaryFormat, write_summary};
use varsieve::writers::partition_table::write_partitions;
use varsieve::writers::spectrum_table::{write_skipped, write_spectrum};

/// Sets up the logger; verbosity 0 is Info, 1 is Debug, and anything higher is Trace
fn init_logging(verbosity: u8) {
    let filter_level: LevelFilter = match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace
    };
    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(filter_level)
        .init();
}

/// Creates the debug folder and saves the CLI options into it
fn save_debug_settings<T: serde::Serialize>(debug_folder: &Path, settings: &T) {
    info!("Creating debug folder at {debug_folder:?}...");
    if let Err(e) = std::fs::create_dir_all(debug_folder) {
        error!("Error while creating debug folder: {e}");
        std::process::exit(exitcode::IOERR);
    }

    let cli_json = debug_folder.join("cli_settings.json");
    info!("Saving CLI options to {cli_json:?}...");
    if let Err(e) = save_json(settings, &cli_json) {
        error!("Error while saving CLI options: {e:#}");
        std::process::exit(exitcode::IOERR);
    }
}

/// Loads a table or exits with an I/O error
fn load_or_exit<V, E: std::fmt::Display>(result: Result<VariantTable<V>, E>, label: &str) -> VariantTable<V> {
    match result {
        Ok(table) => table,
        Err(e) => {
            error!("Error while loading {label}: {e}");
            std::process::exit(exitcode::DATAERR);
        }
    }
}

/// Shared tail of the compare sub-command: set algebra, partitions, summary
fn report_comparison<V: TableRecord>(
    settings: &CompareSettings, table_a: &VariantTable<V>, table_b: &VariantTable<V>, result: &MatchResult
) {
    if let Some(partitions_fn) = settings.partitions_filename.as_deref() {
        info!("Saving match partitions to {partitions_fn:?}...");
        if let Err(e) = write_partitions(partitions_fn, table_a, table_b, result) {
            error!("Error while saving partitions: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    }

    let report = ComparisonReport::new(table_a, table_b, result);
    let counts = report.counts();
    info!("Set sizes: {counts:?}");

    let format = SummaryFormat {
        name: settings.name.clone(),
        include_header: !settings.no_header,
        delimiter: settings.delimiter.clone()
    };
    if let Err(e) = write_summary(settings.output_filename.as_deref(), &counts, &format) {
        error!("Error while saving summary: {e:#}");
        std::process::exit(exitcode::IOERR);
    }
}

fn run_compare(settings: CompareSettings) {
    // start the timer
    let start_time = Instant::now();

    // set up logging before we check the other settings
    init_logging(settings.verbosity);

    let settings = match check_compare_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    if let Some(debug_folder) = settings.debug_folder.as_deref() {
        save_debug_settings(debug_folder, &settings);
    }

    let column_config = match load_column_config(settings.column_config.as_deref()) {
        Ok(cc) => cc,
        Err(e) => {
            error!("Error while loading column config: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    match settings.kind {
        CompareKind::Snv => {
            info!("Loading point mutation tables...");
            let table_a = load_or_exit(load_snv_table(&settings.table_a, &column_config.snv), "table A");
            let table_b = load_or_exit(load_snv_table(&settings.table_b, &column_config.snv), "table B");

            info!("Matching point mutations...");
            let result = match_snvs(&table_a, &table_b);
            report_comparison(&settings, &table_a, &table_b, &result);
        },
        CompareKind::Sv => {
            info!("Loading structural variant tables...");
            let table_a = load_or_exit(load_sv_table(&settings.table_a, &column_config.sv), "table A");
            let table_b = load_or_exit(load_sv_table(&settings.table_b, &column_config.sv), "table B");

            let match_config = match MatchConfigBuilder::default()
                .window_size(settings.window_size)
                .build() {
                Ok(mc) => mc,
                Err(e) => {
                    error!("Error while building match config: {e:?}");
                    std::process::exit(exitcode::SOFTWARE);
                }
            };

            info!("Matching structural variant breakpoints...");
            let result = match_svs(&table_a, &table_b, &WindowedBreakpointMatcher, match_config);
            report_comparison(&settings, &table_a, &table_b, &result);
        }
    }

    info!("Comparison completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn run_spectrum(settings: SpectrumSettings) {
    // start the timer
    let start_time = Instant::now();

    // set up logging before we check the other settings
    init_logging(settings.verbosity);

    let settings = match check_spectrum_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    if let Some(debug_folder) = settings.debug_folder.as_deref() {
        save_debug_settings(debug_folder, &settings);
    }

    let column_config = match load_column_config(settings.column_config.as_deref()) {
        Ok(cc) => cc,
        Err(e) => {
            error!("Error while loading column config: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    let tally: SpectrumTally = match settings.kind {
        SpectrumKind::Snv => {
            let table = load_or_exit(load_snv_table(&settings.input_filename, &column_config.snv), "input table");

            // checked in settings, SNV spectra always have a reference
            let Some(reference) = settings.reference.as_deref() else {
                error!("No reference provided for SNV spectrum");
                std::process::exit(exitcode::CONFIG);
            };
            info!("Pre-loading reference genome into memory...");
            let provider = if reference.is_dir() {
                ReferenceSequence::from_assembly(settings.genome_assembly, reference)
            } else {
                ReferenceSequence::from_fasta(settings.genome_assembly, reference)
            };
            let provider = match provider {
                Ok(p) => p,
                Err(e) => {
                    error!("Error while loading reference genome: {e:#}");
                    std::process::exit(exitcode::IOERR);
                }
            };

            info!("Classifying point mutation contexts...");
            match count_snvs(&table, &provider) {
                Ok(t) => t,
                Err(e) => {
                    error!("Error while counting point mutations: {e:#}");
                    std::process::exit(exitcode::DATAERR);
                }
            }
        },
        SpectrumKind::Sv => {
            let table = load_or_exit(load_sv_table(&settings.input_filename, &column_config.sv), "input table");
            info!("Binning structural variants...");
            match count_svs(&table) {
                Ok(t) => t,
                Err(e) => {
                    error!("Error while counting structural variants: {e:#}");
                    std::process::exit(exitcode::DATAERR);
                }
            }
        },
        SpectrumKind::Indel => {
            let table = load_or_exit(load_indel_table(&settings.input_filename, &column_config.snv), "input table");

            let mut builder = MatrixGeneratorCommandBuilder::default();
            builder.project(settings.project.clone());
            if let Some(program) = settings.matrix_generator.as_deref() {
                // a custom executable receives only project, assembly, and folder
                builder.program(program).args(vec![]);
            }
            let classifier = match builder.build() {
                Ok(c) => c,
                Err(e) => {
                    error!("Error while building indel classifier: {e:?}");
                    std::process::exit(exitcode::SOFTWARE);
                }
            };

            info!("Classifying indels with {:?}...", classifier.program());
            count_indels(&table, &classifier, settings.genome_assembly)
        }
    };

    info!("Counted records: {}", tally.spectrum.total());
    info!("Skipped records: {}", tally.num_skipped());
    if let Some(failure) = tally.backend_failure.as_deref() {
        warn!("Spectrum is zero-filled due to a backend failure: {failure}");
    }

    info!("Saving spectrum to {:?}...", settings.output_filename);
    if let Err(e) = write_spectrum(&settings.output_filename, &tally.spectrum) {
        error!("Error while saving spectrum: {e:#}");
        std::process::exit(exitcode::IOERR);
    }

    if let Some(json_fn) = settings.output_json.as_deref() {
        info!("Saving spectrum JSON to {json_fn:?}...");
        if let Err(e) = save_json(&tally.spectrum, json_fn) {
            error!("Error while saving spectrum JSON: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    }

    if let Some(skipped_fn) = settings.skipped_filename.as_deref() {
        info!("Saving skipped records to {skipped_fn:?}...");
        if let Err(e) = write_skipped(skipped_fn, &tally) {
            error!("Error while saving skipped records: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    }

    info!("Spectrum completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn main() {
    let cli = get_cli();
    match cli.command {
        Commands::Compare(settings) => {
            run_compare(*settings);
        },
        Commands::Spectrum(settings) => {
            run_spectrum(*settings);
        }
    }

    info!("Process finished successfully.");
}

//! pdffuse - Merge PDF files in a chosen order and fit the result under a
//! size ceiling.

mod cli;

use clap::Parser;
use std::process;
use std::time::Instant;
use tokio::task;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use pdffuse::compress::Compressor;
use pdffuse::config::{Config, OverwriteMode, ReportFormat};
use pdffuse::error::PdfFuseError;
use pdffuse::io::{LoadStatistics, PdfReader, PdfWriter};
use pdffuse::merge::Merger;
use pdffuse::order::MergeOrder;
use pdffuse::output::{
    OutputFormatter, RunReport, RunWarning, display_compression, display_load_statistics,
    display_merge_statistics, display_order, display_validation_summary, display_warnings,
};
use pdffuse::utils::collect_paths_for_patterns;
use pdffuse::validation::{Validator, check_page_total};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        OutputFormatter::default().error(&format!("Error: {err}"));
        process::exit(err.exit_code());
    }
}

/// Install the diagnostics subscriber. `RUST_LOG` overrides the default.
fn init_tracing(verbose: bool) {
    let default = if verbose { "pdffuse=debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Main application logic.
async fn run(cli: Cli) -> Result<(), PdfFuseError> {
    cli.validate()?;

    let inputs = collect_paths_for_patterns(&cli.inputs)?;
    let config = cli.to_config(inputs)?;

    let formatter = OutputFormatter::from_config(&config);

    if formatter.should_print() {
        formatter.section(&format!("{} v{}", pdffuse::NAME, pdffuse::VERSION));
        formatter.blank_line();
    }

    // Validate inputs and output before parsing anything
    formatter.info("Validating input files...");
    let validator = Validator::new(config.limits);
    let summary = validator.validate_inputs(&config.inputs).await?;
    display_validation_summary(&formatter, &summary);
    validator.validate_output(&config).await?;

    // Load and order
    let load_start = Instant::now();
    let sources = PdfReader::new()
        .load_ordered(&config.inputs, config.effective_jobs())
        .await?;
    display_load_statistics(
        &formatter,
        &LoadStatistics::from_sources(&sources, load_start.elapsed()),
    );

    let names: Vec<String> = sources.iter().map(|s| s.name.clone()).collect();
    let order = MergeOrder::resolve(&config.order, &names)?;
    display_order(&formatter, &order);
    let sources = order.arrange(sources, |s| s.name.as_str())?;

    let headerless: Vec<String> = sources
        .iter()
        .filter(|s| !s.has_header)
        .map(|s| s.name.clone())
        .collect();
    let mut report = RunReport::planned(
        config.output.clone(),
        &order,
        summary.total_size,
        config.dry_run,
    );

    if config.dry_run {
        let total_pages = sources.iter().map(|s| s.page_count).sum();
        check_page_total(total_pages, config.limits.max_pages)?;

        formatter.success("Dry run completed successfully");
        formatter.info(&format!("  {total_pages} pages would be merged"));
        formatter.info(&format!("  Output would be: {}", config.output.display()));
        formatter.info("  Run without --dry-run to create the merged PDF");
        return print_report(&config, report);
    }

    handle_output_overwrite(&config, &formatter)?;

    // Merge
    formatter.info("Merging documents...");
    let max_pages = config.limits.max_pages;
    let (stats, merged) = task::spawn_blocking(move || {
        let result = Merger::new(max_pages).merge(&sources)?;
        let stats = result.statistics.clone();
        Ok::<_, PdfFuseError>((stats, result.into_bytes()?))
    })
    .await
    .map_err(|e| PdfFuseError::other(format!("Merge task failed: {e}")))??;

    display_merge_statistics(&formatter, &stats);
    report = report.with_merge(&stats, merged.len() as u64);

    // Compress
    let (final_bytes, compression) = match config.compression.clone() {
        Some(options) => {
            formatter.info("Compressing...");
            let target = options.target_size;
            let mut result = task::spawn_blocking(move || {
                Compressor::default().compress(&merged, &options)
            })
            .await
            .map_err(|e| PdfFuseError::other(format!("Compression task failed: {e}")))??;

            display_compression(&formatter, &result);
            report = report.with_compression(&result, target);

            let bytes = std::mem::take(&mut result.final_bytes);
            (bytes, Some((result, target)))
        }
        None => (merged, None),
    };

    // Write
    formatter.debug(&format!("Writing to: {}", config.output.display()));
    let write_stats = PdfWriter::new().write(&final_bytes, &config.output).await?;

    let warnings = RunWarning::collect(
        headerless,
        compression.as_ref().map(|(result, target)| (result, *target)),
    );
    display_warnings(&formatter, &warnings);
    report = report.with_warnings(&warnings);

    formatter.blank_line();
    formatter.success(&format!(
        "Created {} ({})",
        write_stats.output_path.display(),
        write_stats.format_file_size()
    ));
    formatter.detail(
        "Write time",
        &format!("{:.2}s", write_stats.write_time.as_secs_f64()),
    );

    print_report(&config, report)
}

/// Print the JSON report when one was requested.
fn print_report(config: &Config, report: RunReport) -> Result<(), PdfFuseError> {
    if config.report == ReportFormat::Json {
        println!("{}", report.to_json()?);
    }
    Ok(())
}

/// Handle output file overwrite scenarios.
fn handle_output_overwrite(
    config: &Config,
    formatter: &OutputFormatter,
) -> Result<(), PdfFuseError> {
    if !config.output.exists() {
        return Ok(());
    }

    match config.overwrite_mode {
        OverwriteMode::Force => Ok(()),
        OverwriteMode::NoClobber => Err(PdfFuseError::output_exists(config.output.clone())),
        OverwriteMode::Prompt => {
            // Nobody to ask when output is silenced
            if formatter.is_quiet() {
                return Err(PdfFuseError::output_exists(config.output.clone()));
            }

            formatter.warning(&format!(
                "Output file already exists: {}",
                config.output.display()
            ));

            use std::io::{self, Write};
            print!("Overwrite? [y/N]: ");
            io::stdout().flush().ok();

            let mut response = String::new();
            io::stdin()
                .read_line(&mut response)
                .map_err(|err| PdfFuseError::other(format!("Failed to read input: {err}")))?;

            if is_yes(&response) {
                Ok(())
            } else {
                Err(PdfFuseError::Cancelled)
            }
        }
    }
}

fn is_yes(response: &str) -> bool {
    matches!(response.trim().to_lowercase().as_str(), "y" | "yes")
}

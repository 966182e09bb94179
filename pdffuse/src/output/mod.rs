//! Output formatting and display for pdffuse.
//!
//! This module handles all user-facing output including:
//! - Formatted status messages
//! - The merge order preview
//! - Merge and compression summaries
//! - Run warnings
//! - The JSON run report
//!
//! # Examples
//!
//! ```no_run
//! use pdffuse::output::OutputFormatter;
//! use pdffuse::config::Config;
//!
//! # fn example(config: Config) {
//! let formatter = OutputFormatter::from_config(&config);
//! formatter.info("Starting merge");
//! formatter.success("Merge completed");
//! # }
//! ```

pub mod formatter;
pub mod report;

pub use formatter::{MessageLevel, OutputFormatter};
pub use report::{RunReport, RunWarning};

use crate::compress::CompressionResult;
use crate::io::LoadStatistics;
use crate::merge::MergeStatistics;
use crate::order::MergeOrder;
use crate::utils::format_file_size;
use crate::validation::ValidationSummary;

/// Display the validation summary.
pub fn display_validation_summary(formatter: &OutputFormatter, summary: &ValidationSummary) {
    formatter.info(&format!(
        "Validated {} file(s), {}",
        summary.files_validated,
        summary.format_total_size()
    ));

    for input in &summary.inputs {
        formatter.detail(&input.name, &format_file_size(input.file_size));
    }
}

/// Display the numbered merge order.
pub fn display_order(formatter: &OutputFormatter, order: &MergeOrder) {
    formatter.section("Merge order:");
    for (i, name) in order.names().iter().enumerate() {
        formatter.list_item(i + 1, name);
    }
    formatter.blank_line();
}

/// Display load statistics.
pub fn display_load_statistics(formatter: &OutputFormatter, stats: &LoadStatistics) {
    formatter.info(&format!(
        "Loaded {} file(s) in {:.2}s: {} pages, {}",
        stats.files_loaded,
        stats.total_time.as_secs_f64(),
        stats.total_pages,
        stats.format_total_size()
    ));
}

/// Display merge statistics.
pub fn display_merge_statistics(formatter: &OutputFormatter, stats: &MergeStatistics) {
    formatter.success(&format!(
        "Merged {} file(s) into {} pages",
        stats.files_merged, stats.total_pages
    ));
    formatter.detail("Input size", &stats.format_input_size());
    formatter.detail("Form fields", &stats.form_fields.to_string());
    formatter.detail(
        "Merge time",
        &format!("{:.2}s", stats.merge_time.as_secs_f64()),
    );
}

/// Display the outcome of compression.
///
/// In verbose mode every raster attempt is listed.
pub fn display_compression(formatter: &OutputFormatter, result: &CompressionResult) {
    formatter.info(&format!(
        "Compression: {} -> {} ({:.1}% smaller) via {}",
        format_file_size(result.size_before),
        format_file_size(result.size_after),
        result.reduction_percent(),
        result.method
    ));

    if !result.attempts.is_empty() && formatter.is_verbose() {
        formatter.section("Raster attempts:");
        for attempt in &result.attempts {
            let resolution = format!("{} dpi", attempt.resolution);
            let quality = format!("q{}", attempt.quality);
            let mode = attempt.color_mode.to_string();
            let size = format_file_size(attempt.size);
            formatter.table_row(&[&resolution, &quality, &mode, &size]);
        }
    }
}

/// Display run warnings.
pub fn display_warnings(formatter: &OutputFormatter, warnings: &[RunWarning]) {
    for warning in warnings {
        formatter.warning(&warning.to_string());
    }
}

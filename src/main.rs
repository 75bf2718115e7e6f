//! photosweep - metadata-only photo library triage.
//!
//! Usage:
//!   sweep summary FILE                  Category overview of a library
//!   sweep duplicates FILE               Show duplicate clusters
//!   sweep categories FILE               List photos per category
//!   sweep export FILE                   Export categorized photos to JSON
//!   sweep --help                        Show help
//!
//! FILE is a JSON array of photo records as produced by a media library
//! query (`id`, `uri`, `width`, `height`, `size`, `creationTime`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result};

use photosweep_analyze::{DuplicateReport, group_by_category};
use photosweep_core::{
    CategorizedPhoto, Category, PhotoMetadata, SweepConfig, SweepError, SweepWarning,
};
use photosweep_scan::{SweepOutcome, SweepScanner};

#[derive(Parser)]
#[command(
    name = "photosweep",
    version,
    about = "Find duplicate, burst, screenshot, low quality and old photos",
    long_about = "photosweep classifies a photo library from its metadata alone.\n\n\
                  Feed it a JSON array of photo records and pick a report."
)]
struct Cli {
    /// JSON file overriding sweep thresholds (missing fields keep defaults)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Compute signatures on all cores
    #[arg(short = 'P', long, global = true)]
    parallel: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sweep a library and show a category summary
    Summary {
        /// Photo list (JSON)
        file: PathBuf,
    },

    /// Show duplicate clusters
    Duplicates {
        /// Photo list (JSON)
        file: PathBuf,

        /// Maximum number of duplicate groups to show
        #[arg(short = 'n', long, default_value = "20")]
        top: usize,
    },

    /// List photos per category
    Categories {
        /// Photo list (JSON)
        file: PathBuf,

        /// Only show this category (e.g. "burst", "low_quality")
        #[arg(long)]
        category: Option<Category>,
    },

    /// Export categorized photos to JSON
    Export {
        /// Photo list (JSON)
        file: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), cli.parallel)?;

    match cli.command {
        Command::Summary { file } => run_summary(&file, config, cli.format),
        Command::Duplicates { file, top } => run_duplicates(&file, config, top, cli.format),
        Command::Categories { file, category } => {
            run_categories(&file, config, category, cli.format)
        }
        Command::Export { file, output } => run_export(&file, config, output),
    }
}

/// Show a category summary.
fn run_summary(file: &Path, config: SweepConfig, format: OutputFormat) -> Result<()> {
    let outcome = sweep(file, config)?;
    let report = outcome.report();

    match format {
        OutputFormat::Text => {
            println!();
            println!("{}", "─".repeat(60));
            println!(" {} - {}", file.display(), format_size(report.total_size));
            println!(
                " {} photos, {} flagged",
                report.total_photos, report.flagged_photos
            );
            println!(" Swept in {:.2}s", outcome.elapsed.as_secs_f64());
            println!("{}", "─".repeat(60));
            println!();

            if report.categories.is_empty() {
                println!(" Nothing to clean up.");
            } else {
                let max_count = report
                    .categories
                    .iter()
                    .map(|s| s.photo_count)
                    .max()
                    .unwrap_or(1);
                for stats in &report.categories {
                    let ratio = stats.photo_count as f64 / max_count as f64;
                    println!(
                        "   {:<14} {:>8} photos {:>12}  {}",
                        stats.category.title(),
                        stats.photo_count,
                        format_size(stats.total_size),
                        make_bar(ratio, 20)
                    );
                }
            }

            if report.duplicate_groups > 0 {
                println!();
                println!(
                    " Reclaimable from {} duplicate groups: {}",
                    report.duplicate_groups,
                    format_size(report.reclaimable_bytes)
                );
            }
            print_warnings(&outcome);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

/// Show duplicate clusters.
fn run_duplicates(file: &Path, config: SweepConfig, top_n: usize, format: OutputFormat) -> Result<()> {
    let outcome = sweep(file, config)?;
    let mut report = DuplicateReport::from_photos(&outcome.photos);
    report.truncate(top_n);

    match format {
        OutputFormat::Text => {
            println!();
            println!("{}", "─".repeat(70));
            println!(" Duplicate Photo Report");
            println!("{}", "─".repeat(70));
            println!();

            if report.groups.is_empty() {
                println!(" No duplicate photos found.");
            } else {
                println!(
                    " Found {} duplicate groups ({} photos)",
                    report.group_count, report.photos_with_duplicates
                );
                println!(
                    " Total wasted space: {}",
                    format_size(report.total_wasted_space)
                );
                println!();

                let by_id: HashMap<&str, &PhotoMetadata> = outcome
                    .photos
                    .iter()
                    .map(|p| (p.id(), p.photo()))
                    .collect();

                for (i, group) in report.groups.iter().enumerate() {
                    println!(
                        " Group {} ({} photos, {} total, {} wasted)",
                        i + 1,
                        group.count(),
                        format_size(group.total_size),
                        format_size(group.wasted_bytes)
                    );
                    for id in &group.photo_ids {
                        let marker = if *id == group.keeper_id { "*" } else { " " };
                        match by_id.get(id.as_str()) {
                            Some(photo) => println!(
                                "   {} {:<50} {:>10}",
                                marker,
                                truncate(&photo.uri, 50),
                                format_size(photo.size)
                            ),
                            None => println!("   {} {}", marker, id),
                        }
                    }
                    println!();
                }
                println!(" * suggested keeper");
            }
            print_warnings(&outcome);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

/// List photos per category.
fn run_categories(
    file: &Path,
    config: SweepConfig,
    only: Option<Category>,
    format: OutputFormat,
) -> Result<()> {
    let outcome = sweep(file, config)?;
    let mut groups = group_by_category(&outcome.photos);
    if let Some(category) = only {
        groups.retain(|c, _| *c == category);
    }

    match format {
        OutputFormat::Text => {
            if groups.is_empty() {
                println!();
                println!(" No matching photos.");
            }
            for (category, photos) in &groups {
                let total: u64 = photos.iter().map(|p| p.photo().size).sum();
                println!();
                println!("{}", "─".repeat(70));
                println!(
                    " {} ({} photos, {})",
                    category.title(),
                    photos.len(),
                    format_size(total)
                );
                println!("{}", "─".repeat(70));
                for photo in photos {
                    println!(
                        "   {:<50} {:>10}{}",
                        truncate(&photo.photo().uri, 50),
                        format_size(photo.photo().size),
                        describe(photo, *category)
                    );
                }
            }
            print_warnings(&outcome);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&groups)?);
        }
    }

    Ok(())
}

/// Export categorized photos to JSON.
fn run_export(file: &Path, config: SweepConfig, output: Option<PathBuf>) -> Result<()> {
    let outcome = sweep(file, config)?;
    let json = serde_json::to_string_pretty(&outcome.photos)?;

    match output {
        Some(output_path) => {
            std::fs::write(&output_path, json)
                .with_context(|| format!("Failed to write {}", output_path.display()))?;
            eprintln!("Exported to {}", output_path.display());
        }
        None => {
            println!("{}", json);
        }
    }

    Ok(())
}

/// Load a photo list and sweep it, printing progress to stderr.
fn sweep(file: &Path, config: SweepConfig) -> Result<SweepOutcome> {
    let photos = load_photos(file)?;

    eprintln!("Sweeping {} photos from {}...", photos.len(), file.display());

    let scanner = SweepScanner::with_config(config);
    let mut last = None;
    let outcome = scanner
        .scan_blocking(&photos, |percent| {
            if last != Some(percent) {
                eprint!("\r {:>3}%", percent);
                last = Some(percent);
            }
        })
        .context("Sweep failed")?;
    eprintln!();

    Ok(outcome)
}

/// Read a JSON array of photo records. A `null` document is an empty library.
fn load_photos(path: &Path) -> Result<Vec<PhotoMetadata>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let photos: Option<Vec<PhotoMetadata>> = serde_json::from_str(&data)
        .with_context(|| format!("Invalid photo list in {}", path.display()))?;
    Ok(photos.unwrap_or_default())
}

/// Read sweep settings, falling back to defaults.
fn load_config(path: Option<&Path>, parallel: bool) -> Result<SweepConfig> {
    let mut config = match path {
        Some(path) => {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&data)
                .with_context(|| format!("Invalid configuration in {}", path.display()))?
        }
        None => SweepConfig::default(),
    };

    if parallel {
        config.parallel_signatures = true;
    }
    config
        .validate()
        .map_err(|message| SweepError::InvalidConfig { message })?;

    Ok(config)
}

fn print_warnings(outcome: &SweepOutcome) {
    if !outcome.has_warnings() {
        return;
    }

    println!();
    println!("{} warning(s) during sweep:", outcome.warnings.len());
    for warning in &outcome.warnings {
        println!("   {}", format_warning(warning));
    }
}

fn format_warning(warning: &SweepWarning) -> String {
    match &warning.photo_id {
        Some(id) => format!("[{}] {}", id, warning.message),
        None => warning.message.clone(),
    }
}

/// Extra detail for a photo in a category listing.
fn describe(photo: &CategorizedPhoto, category: Category) -> String {
    match category {
        Category::Duplicate => format!("  ({} copies)", photo.duplicate_count()),
        Category::Similar | Category::Burst => format!("  ({} similar)", photo.similar_count()),
        Category::Screenshot | Category::LowQuality => {
            format!("  {}x{}", photo.photo().width, photo.photo().height)
        }
        Category::OldUnused => String::new(),
    }
}

/// Create a simple ASCII bar.
fn make_bar(ratio: f64, width: usize) -> String {
    let filled = (ratio * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Truncate a string to at most `max_len` characters.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the field permit tools.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use field_permits_cli::config::Config;
use field_permits_cli::{default_output_path, render};
use field_permits_cli_utils::IndicatifProgress;
use field_permits_document::{DocumentLoader, FileLoader};
use field_permits_permit::{ClockConversion, OrphanSlotPolicy};
use field_permits_summarize::Summarizer;
use field_permits_summarize::export::{ExportOptions, export_document};
use field_permits_workbook::{HeaderStyle, Workbook, WorkbookFormat};

#[derive(Parser)]
#[command(
    name = "field_permits",
    version,
    about = "Read, summarize, and export athletic field permits"
)]
struct Cli {
    /// Enable debug logging (overrides `RUST_LOG`)
    #[arg(long, global = true)]
    debug: bool,
    /// Config file (defaults to `field_permits.toml` in the working directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a document's lines (or PDF pages), numbered
    ReadFile {
        file: PathBuf,
        /// Number of lines to show (default: all)
        #[arg(short = 'n', long)]
        lines: Option<usize>,
    },
    /// Summarize a permit: statistics, time slots, and fields
    SummarizeFile {
        file: PathBuf,
        /// Maximum number of slot lines and field names to keep
        #[arg(short = 'l', long)]
        max_length: Option<usize>,
        /// Handling for slots before any field header (`drop` or `error`)
        #[arg(long)]
        orphan_slots: Option<OrphanSlotPolicy>,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Summarize many permits. Directories are searched for permit files.
    Batch {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Print successful summaries as a JSON array
        #[arg(long)]
        json: bool,
    },
    /// Export each field's slots to its own sheet
    Export {
        file: PathBuf,
        /// Issued date copied into every row (default: today)
        #[arg(long)]
        issued_date: Option<String>,
        /// Output file, or directory for CSV (default: beside the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output format (`xlsx` or `csv`)
        #[arg(long)]
        format: Option<WorkbookFormat>,
        /// Header row style for xlsx (`bold` or `plain`)
        #[arg(long)]
        header_style: Option<HeaderStyle>,
        /// 12-to-24 hour conversion (`corrected` or `legacy`)
        #[arg(long)]
        clock: Option<ClockConversion>,
        /// Maximum number of slot lines and field names to keep
        #[arg(short = 'l', long)]
        max_length: Option<usize>,
        /// Fail on the first slot line that does not parse
        #[arg(long)]
        strict: bool,
    },
    /// Show file metadata
    Info {
        file: PathBuf,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[allow(clippy::too_many_lines)]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let multi = field_permits_cli_utils::init_logger(cli.debug);

    let mut config = Config::load(cli.config.as_deref())?;
    let loader = FileLoader::from_current_dir()?;

    match cli.command {
        Commands::ReadFile { file, lines } => {
            let content = loader.read_lines(&file)?;
            print!("{}", render::numbered_lines(&content, lines));
            log::info!("Successfully read {} lines from {}", content.len(), file.display());
        }
        Commands::SummarizeFile {
            file,
            max_length,
            orphan_slots,
            json,
        } => {
            if let Some(max_length) = max_length {
                config.max_length = max_length;
            }
            if let Some(policy) = orphan_slots {
                config.orphan_slots = policy;
            }

            let summarizer = Summarizer::new(&loader, config.extract_options());
            let summary = summarizer.summarize_file(&file)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!("{}", render::summary(&summary));
            }
        }
        Commands::Batch { paths, json } => {
            let mut files = Vec::new();
            for path in &paths {
                if loader.resolve(path).is_dir() {
                    files.extend(loader.find_permit_files(path));
                } else {
                    files.push(path.clone());
                }
            }

            let summarizer = Summarizer::new(&loader, config.extract_options());
            let progress = IndicatifProgress::files_bar(&multi, "Summarizing permits");
            let report = summarizer.batch(&files, &progress);

            if json {
                let summaries: Vec<_> = report
                    .outcomes
                    .iter()
                    .filter_map(|o| o.result.as_ref().ok())
                    .collect();
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                for outcome in &report.outcomes {
                    match &outcome.result {
                        Ok(summary) => println!(
                            "OK      {} ({} slots, {} fields)",
                            outcome.path.display(),
                            summary.extraction.date_time_slots.len(),
                            summary.extraction.field_names.len()
                        ),
                        Err(e) => println!("FAILED  {}: {e}", outcome.path.display()),
                    }
                }
            }

            if report.successful() < report.total() {
                return Err(format!(
                    "{} of {} files failed",
                    report.total() - report.successful(),
                    report.total()
                )
                .into());
            }
        }
        Commands::Export {
            file,
            issued_date,
            output,
            format,
            header_style,
            clock,
            max_length,
            strict,
        } => {
            if let Some(max_length) = max_length {
                config.max_length = max_length;
            }
            if let Some(clock) = clock {
                config.clock = clock;
            }
            let format = format.unwrap_or(config.output.format);
            let header_style = header_style.unwrap_or(config.output.header_style);

            let options = ExportOptions {
                issued_date: issued_date
                    .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string()),
                row: config.row_options(),
                strict,
            };

            let mut workbook = Workbook::new();
            let report = export_document(
                &loader,
                &file,
                &config.extract_options(),
                &options,
                &mut workbook,
            )?;

            if workbook.sheets().is_empty() {
                log::warn!("No slot rows found in {}", file.display());
            }

            let output = output.unwrap_or_else(|| default_output_path(&file, format));
            let written = workbook.save(&loader.resolve(&output), format, header_style)?;

            print!("{}", render::export(&report, &workbook.stats()));
            for path in written {
                println!("Saved {}", path.display());
            }
        }
        Commands::Info { file, json } => {
            let info = loader.info(&file)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Path:     {}", info.path.display());
                println!("Type:     {}", info.kind);
                println!("Size:     {} bytes", render::thousands(usize::try_from(info.size)?));
                if let Some(modified) = info.modified {
                    println!("Modified: {}", modified.format("%Y-%m-%d %H:%M:%S UTC"));
                }
                if let Some(pages) = info.pages {
                    println!("Pages:    {pages}");
                }
            }
        }
    }

    Ok(())
}

use std::path::PathBuf;

use anyhow::Context;
use campus_dashboard::config::AppConfig;
use campus_dashboard::filter::{self, FavoriteIds, FilterConstraints, Searchable};
use campus_dashboard::models::{Record, RecordKind};
use campus_dashboard::{loader, metrics, report, telemetry};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "campus-dashboard")]
#[command(about = "Search and summarize campus dashboard collections", long_about = None)]
struct Cli {
    /// Directory holding the collection CSV files (overrides DASHBOARD_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Contacts,
    Teams,
    Files,
    Meetings,
    Locations,
    Faq,
    Grades,
    Attendance,
}

impl From<KindArg> for RecordKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Contacts => RecordKind::Contact,
            KindArg::Teams => RecordKind::Team,
            KindArg::Files => RecordKind::File,
            KindArg::Meetings => RecordKind::Meeting,
            KindArg::Locations => RecordKind::Location,
            KindArg::Faq => RecordKind::Question,
            KindArg::Grades => RecordKind::Grade,
            KindArg::Attendance => RecordKind::Attendance,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Write the demonstration collections as CSV files
    Seed {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Filter one collection by text, category and favorites
    Search {
        #[arg(value_enum)]
        kind: KindArg,
        #[arg(long, default_value = "")]
        query: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        favorites_only: bool,
        /// Extra favorite identifiers on top of favorites.csv
        #[arg(long = "favorite")]
        favorites: Vec<String>,
        #[arg(long)]
        limit: Option<usize>,
        /// Print matching records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Summarize grades
    Grades {
        #[arg(long)]
        subject: Option<String>,
    },
    /// Summarize absences and late arrivals
    Attendance,
    /// Generate a markdown report
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load().context("invalid dashboard configuration")?;
    telemetry::init(&config.log_level)?;

    let data_dir = cli.data_dir.unwrap_or_else(|| config.data_dir.clone());

    match cli.command {
        Commands::Seed { out } => {
            let dir = out.unwrap_or(data_dir);
            let written = loader::seed_collections(&dir)
                .with_context(|| format!("failed to seed {}", dir.display()))?;
            println!("Wrote {written} records to {}.", dir.display());
            let data = loader::DataSet::load(&dir)
                .with_context(|| format!("failed to reload {}", dir.display()))?;
            for kind in RecordKind::ordered() {
                println!("- {}: {} rows", kind.file_name(), data.records(kind).len());
            }
        }
        Commands::Search {
            kind,
            query,
            category,
            favorites_only,
            favorites,
            limit,
            json,
        } => {
            let kind = RecordKind::from(kind);
            let records = loader::load_records(&data_dir, kind)?;
            let mut favorite_ids: FavoriteIds = loader::load_favorites(&data_dir)?;
            for id in favorites {
                favorite_ids.insert(id);
            }

            let constraints = FilterConstraints {
                category_equals: category.as_deref(),
                favorites_only,
                favorites: Some(&favorite_ids),
            };
            let matched = filter::filter(&records, &query, &constraints);
            let shown: Vec<&Record> = matched
                .iter()
                .take(limit.unwrap_or(config.result_limit))
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&shown)?);
                return Ok(());
            }

            if matched.is_empty() {
                println!("No {} match this search.", kind.as_str());
                return Ok(());
            }

            println!("{} of {} {} records:", matched.len(), records.len(), kind.as_str());
            for record in shown {
                let star = if favorite_ids.contains(record.id()) { "*" } else { " " };
                println!("{star} [{}] {}", record.id(), record.title());
            }
        }
        Commands::Grades { subject } => {
            let grades = loader::load_grades(&data_dir)?;
            let grades = match subject.as_deref() {
                Some(subject) => {
                    filter::filter(&grades, "", &FilterConstraints::category(subject))
                }
                None => grades,
            };

            let stats = match metrics::aggregate_grades(&grades) {
                Ok(stats) => stats,
                Err(err) => {
                    println!("No grades to summarize ({err}).");
                    return Ok(());
                }
            };

            println!("Weighted average: {:.2}/20", stats.weighted_average);
            println!("Simple average: {:.2}/20", stats.average);
            println!("Highest: {:.2} / Lowest: {:.2}", stats.highest, stats.lowest);
            if let Some(average) = subject.as_deref().and_then(|s| stats.subject_average(s)) {
                println!("Subject average: {average:.2}/20");
                return Ok(());
            }
            for entry in stats.subject_averages.iter() {
                println!(
                    "- {}: {:.2} across {} grades",
                    entry.subject, entry.average, entry.grade_count
                );
            }
        }
        Commands::Attendance => {
            let events = loader::load_attendance(&data_dir)?;
            let stats = match metrics::aggregate_attendance(&events) {
                Ok(stats) => stats,
                Err(err) => {
                    println!("No attendance events to summarize ({err}).");
                    return Ok(());
                }
            };

            println!(
                "Absences: {} ({} justified)",
                stats.total_absences, stats.justified_absences
            );
            println!(
                "Late arrivals: {} ({} justified)",
                stats.total_lates, stats.justified_lates
            );
            println!("Pending justifications: {}", stats.pending_justifications);
            for subject in metrics::attendance_by_subject(&events) {
                println!(
                    "- {}: {} absences, {} late",
                    subject.subject, subject.statistics.total_absences, subject.statistics.total_lates
                );
            }
        }
        Commands::Report { out } => {
            let grades = loader::load_grades(&data_dir)?;
            let attendance = loader::load_attendance(&data_dir)?;
            let report = report::build_report(&grades, &attendance, Local::now().date_naive());
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

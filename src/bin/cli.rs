use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use clap::{ArgAction, Parser, Subcommand};
use review_monitor::report::{ReportRow, render_dataframe, render_no_reviewer_listing, rows_to_dataframe};
use review_monitor::{
    BusinessDayCalendar, ReviewConfig, RunMode, load_config_from_json, load_submissions_from_csv,
    process_submissions, save_config_to_json, write_reports,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cli", version, about = "Track review aging of student submissions")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process a submissions export and write the reports
    Run {
        #[arg(long)]
        config: PathBuf,
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        /// Run date (defaults to the local date)
        #[arg(long)]
        today: Option<NaiveDate>,
        /// auto | regular | coursework | all
        #[arg(long, default_value = "auto")]
        mode: RunMode,
        /// Print the report tables
        #[arg(long)]
        show: bool,
    },
    /// Working-day queries against the configured calendar
    Days {
        #[arg(long)]
        config: Option<PathBuf>,
        #[command(subcommand)]
        query: DaysQuery,
    },
    /// Edit the review configuration file
    Config {
        #[arg(long)]
        config: PathBuf,
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum DaysQuery {
    Check {
        date: NaiveDate,
    },
    Between {
        start: NaiveDate,
        end: NaiveDate,
        #[arg(long)]
        inclusive: bool,
    },
    Before {
        end: NaiveDate,
        #[arg(allow_negative_numbers = true)]
        n: i64,
    },
    After {
        start: NaiveDate,
        #[arg(allow_negative_numbers = true)]
        n: i64,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    Show,
    AddHoliday { date: NaiveDate },
    RemoveHoliday { date: NaiveDate },
    AddExtraDay { date: NaiveDate },
    RemoveExtraDay { date: NaiveDate },
    AddDiplomaModule { module: String },
    RemoveDiplomaModule { module: String },
    AddSelfModule { module: String },
    RemoveSelfModule { module: String },
    SetCoordinator { id: i64, name: String },
    RemoveCoordinator { id: i64 },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .init();
}

fn run_reports(
    config_path: &Path,
    input: &Path,
    output: &Path,
    today: NaiveDate,
    mode: RunMode,
    show: bool,
) -> Result<()> {
    let config = load_config_from_json(config_path)
        .with_context(|| format!("failed to load config {}", config_path.display()))?;
    let loaded = load_submissions_from_csv(input)
        .with_context(|| format!("failed to load submissions {}", input.display()))?;
    for rejected in &loaded.rejected {
        println!("Rejected line {}: {}", rejected.line, rejected.reason);
    }

    let outcome = process_submissions(&config, &loaded.records, today, mode)?;
    println!("Run {} ({}) mode={}", outcome.today, outcome.today.format("%A"), outcome.mode);
    println!("Processed: {}", outcome.report.summary.to_cli_summary());
    for skipped in &outcome.report.summary.skipped {
        println!("Skipped record {} ({}): {}", skipped.position, skipped.module, skipped.reason);
    }

    if show {
        let report = &outcome.report;
        if outcome.mode.includes_regular() {
            print_table("Diploma works", &report.diploma_works)?;
            print_table("Overdue homework", &report.overdue_homework)?;
        }
        if outcome.mode.includes_coursework() {
            print_table("Overdue coursework", &report.overdue_coursework)?;
            println!("Coursework without reviewer");
            print!("{}", render_no_reviewer_listing(&report.coursework_without_reviewer));
        }
    }

    let written = write_reports(&outcome, output)
        .with_context(|| format!("failed to write reports to {}", output.display()))?;
    for path in written {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn print_table(title: &str, rows: &[ReportRow]) -> Result<()> {
    let df = rows_to_dataframe(rows)?;
    println!("{title} ({})", rows.len());
    print!("{}", render_dataframe(&df));
    Ok(())
}

fn run_days(config_path: Option<&Path>, query: DaysQuery) -> Result<()> {
    let calendar = match config_path {
        Some(path) => load_config_from_json(path)
            .with_context(|| format!("failed to load config {}", path.display()))?
            .build_calendar(),
        None => BusinessDayCalendar::new(),
    };

    match query {
        DaysQuery::Check { date } => {
            let verdict = if calendar.is_working_day(date) {
                "working day"
            } else {
                "day off"
            };
            println!("{date} ({}): {verdict}", date.format("%A"));
        }
        DaysQuery::Between {
            start,
            end,
            inclusive,
        } => {
            let count = if inclusive {
                calendar.count_working_days_inclusive(start, end)?
            } else {
                calendar.count_working_days(start, end)
            };
            println!("{count}");
        }
        DaysQuery::Before { end, n } => {
            println!("{}", calendar.find_date_n_working_days_before(end, n)?);
        }
        DaysQuery::After { start, n } => {
            println!("{}", calendar.find_date_n_working_days_after(start, n)?);
        }
    }
    Ok(())
}

fn run_config(path: &Path, action: ConfigAction) -> Result<()> {
    let mut config = if path.exists() {
        load_config_from_json(path)
            .with_context(|| format!("failed to load config {}", path.display()))?
    } else {
        ReviewConfig::default()
    };

    let message = match action {
        ConfigAction::Show => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            return Ok(());
        }
        ConfigAction::AddHoliday { date } => changed(
            config.add_holiday(date),
            format!("Added holiday {date}"),
            format!("holiday {date} is already listed"),
        )?,
        ConfigAction::RemoveHoliday { date } => changed(
            config.remove_holiday(date),
            format!("Removed holiday {date}"),
            format!("holiday {date} is not listed"),
        )?,
        ConfigAction::AddExtraDay { date } => changed(
            config.add_extra_working_day(date),
            format!("Added extra working day {date}"),
            format!("extra working day {date} is already listed"),
        )?,
        ConfigAction::RemoveExtraDay { date } => changed(
            config.remove_extra_working_day(date),
            format!("Removed extra working day {date}"),
            format!("extra working day {date} is not listed"),
        )?,
        ConfigAction::AddDiplomaModule { module } => changed(
            config.add_diploma_module(&module),
            format!("Added diploma module {module}"),
            format!("diploma module '{module}' is already listed or blank"),
        )?,
        ConfigAction::RemoveDiplomaModule { module } => changed(
            config.remove_diploma_module(&module),
            format!("Removed diploma module {module}"),
            format!("diploma module '{module}' is not listed"),
        )?,
        ConfigAction::AddSelfModule { module } => changed(
            config.add_self_assignment_module(&module),
            format!("Added self-assignment module {module}"),
            format!("self-assignment module '{module}' is already listed or blank"),
        )?,
        ConfigAction::RemoveSelfModule { module } => changed(
            config.remove_self_assignment_module(&module),
            format!("Removed self-assignment module {module}"),
            format!("self-assignment module '{module}' is not listed"),
        )?,
        ConfigAction::SetCoordinator { id, name } => {
            match config.set_coordinator(id, name.clone()) {
                Some(previous) => format!("Renamed coordinator {id}: {previous} -> {name}"),
                None => format!("Added coordinator {id}: {name}"),
            }
        }
        ConfigAction::RemoveCoordinator { id } => match config.remove_coordinator(id) {
            Some(name) => format!("Removed coordinator {id} ({name})"),
            None => bail!("coordinator {id} not found"),
        },
    };

    save_config_to_json(&config, path)
        .with_context(|| format!("failed to save config {}", path.display()))?;
    println!("{message}");
    Ok(())
}

fn changed(did_change: bool, message: String, unchanged: String) -> Result<String> {
    if did_change {
        Ok(message)
    } else {
        bail!(unchanged)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Run {
            config,
            input,
            output,
            today,
            mode,
            show,
        } => {
            let today = today.unwrap_or_else(|| Local::now().date_naive());
            run_reports(&config, &input, &output, today, mode, show)
        }
        Command::Days { config, query } => run_days(config.as_deref(), query),
        Command::Config { config, action } => run_config(&config, action),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

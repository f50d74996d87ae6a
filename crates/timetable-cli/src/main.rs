//! `timetable` CLI — validate schedule plans and generate class occurrences.
//!
//! ## Usage
//!
//! ```sh
//! # Check a plan for double-booked teachers, rooms and groups
//! timetable validate -i plan.json
//!
//! # Generate occurrences (stdin → stdout, pretty JSON)
//! cat plan.json | timetable generate
//!
//! # Generate with a config file, writing to a file
//! timetable generate -i plan.json -c timetable.toml -o occurrences.json
//!
//! # Free periods of room 3 on a given day
//! timetable free -i plan.json --date 2023-09-11 --room 3
//! ```
//!
//! Set `RUST_LOG=debug` to trace every saved occurrence on stderr.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use clap::{ArgGroup, Parser, Subcommand};
use std::io::{self, Read};
use timetable_engine::model::{GroupId, RoomId, TeacherId};
use timetable_engine::{
    find_conflicts, find_free_periods, validate, GeneratorConfig, InMemoryStore,
    OccurrenceQuery, OccurrenceStore, ScheduleGenerator, ScheduledOccurrence, SchedulePlan,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "timetable",
    version,
    about = "University timetable generation and conflict checking"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a plan for invalid ranges and conflicting templates
    Validate {
        /// Plan JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Expand a plan into dated occurrences
    Generate {
        /// Plan JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Generator configuration (TOML)
        #[arg(short, long)]
        config: Option<String>,
    },
    /// Show free periods of a room, teacher or group on one day
    #[command(group(ArgGroup::new("resource").required(true).args(["room", "teacher", "group"])))]
    Free {
        /// Plan JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Generator configuration (TOML)
        #[arg(short, long)]
        config: Option<String>,
        /// Day to inspect (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        /// Room id to inspect
        #[arg(long)]
        room: Option<u64>,
        /// Teacher id to inspect
        #[arg(long)]
        teacher: Option<u64>,
        /// Group id to inspect
        #[arg(long)]
        group: Option<u64>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { input } => {
            let plan = read_plan(input.as_deref())?;
            for conflict in find_conflicts(&plan.templates) {
                println!("conflict: {}", conflict);
            }
            validate(plan.start_date, plan.end_date, &plan.templates)
                .context("Plan is not valid")?;
            println!(
                "OK: {} template(s), {} to {}",
                plan.templates.len(),
                plan.start_date,
                plan.end_date
            );
        }
        Commands::Generate {
            input,
            output,
            config,
        } => {
            let plan = read_plan(input.as_deref())?;
            let config = load_config(config.as_deref())?;
            let occurrences = generate(&plan, config)?.all()?;
            let json = serde_json::to_string_pretty(&occurrences)?;
            write_output(output.as_deref(), &json)?;
        }
        Commands::Free {
            input,
            config,
            date,
            room,
            teacher,
            group,
        } => {
            let plan = read_plan(input.as_deref())?;
            let config = load_config(config.as_deref())?;
            let tz = config.timezone()?;
            let store = generate(&plan, config)?;

            let mut query = OccurrenceQuery::on(date);
            if let Some(id) = room {
                query = query.room(RoomId(id));
            }
            if let Some(id) = teacher {
                query = query.teacher(TeacherId(id));
            }
            if let Some(id) = group {
                query = query.group(GroupId(id));
            }
            let classes = store.find(&query)?;

            let (window_start, window_end) = teaching_day(&plan, date, tz)?;
            let free = find_free_periods(&classes, tz, window_start, window_end)?;
            print!("{}", render_free(&classes, &free, tz));
        }
    }

    Ok(())
}

fn generate(plan: &SchedulePlan, config: GeneratorConfig) -> Result<InMemoryStore> {
    let generator = ScheduleGenerator::with_config(InMemoryStore::new(), config);
    let report = generator
        .generate(plan.start_date, plan.end_date, &plan.templates)
        .context("Failed to generate schedule")?;
    info!(occurrences = report.total(), "generation finished");
    Ok(generator.into_store())
}

/// From the earliest slot start to the latest slot end used by the plan.
fn teaching_day(
    plan: &SchedulePlan,
    date: NaiveDate,
    tz: Tz,
) -> Result<(chrono::DateTime<Utc>, chrono::DateTime<Utc>)> {
    let slots = plan.time_slots();
    let first = slots
        .iter()
        .map(|s| NaiveDateTime::new(date, s.start_time))
        .min()
        .context("Plan has no time slots")?;
    let last = slots
        .iter()
        .map(|s| NaiveDateTime::new(date, s.start_time) + s.duration())
        .max()
        .context("Plan has no time slots")?;

    let resolve = |local: NaiveDateTime| {
        tz.from_local_datetime(&local)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .with_context(|| format!("{} does not exist in {}", local, tz.name()))
    };
    Ok((resolve(first)?, resolve(last)?))
}

fn render_free(
    classes: &[ScheduledOccurrence],
    free: &[timetable_engine::FreePeriod],
    tz: Tz,
) -> String {
    let mut out = String::new();
    for class in classes {
        out.push_str(&format!(
            "busy {}-{} {} ({})\n",
            class.time_slot.start_time.format("%H:%M"),
            class.time_slot.end_time().format("%H:%M"),
            class.course.name,
            class.room.name
        ));
    }
    for period in free {
        out.push_str(&format!(
            "free {}-{} ({} min)\n",
            period.start.with_timezone(&tz).format("%H:%M"),
            period.end.with_timezone(&tz).format("%H:%M"),
            period.duration_minutes
        ));
    }
    out
}

fn read_plan(path: Option<&str>) -> Result<SchedulePlan> {
    let json = read_input(path)?;
    SchedulePlan::from_json(&json).context("Failed to parse schedule plan")
}

fn load_config(path: Option<&str>) -> Result<GeneratorConfig> {
    match path {
        Some(path) => GeneratorConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path)),
        None => Ok(GeneratorConfig::default()),
    }
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

mod company;

use std::rc::Rc;

use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use timeslice_kernel::{Clock, ManualClock, TemporalError, Timestamp};
use timeslice_tools::HistoryInspector;

use company::Company;

/// One simulated day; keeps the walkthrough clock well inside chrono's range.
const MAX_STEP_MS: i64 = 86_400_000;

#[derive(Parser)]
#[command(name = "timeslice-cli", about = "Demo and inspection tool for timeslice histories")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Walk a company through growth phases and travel back in time
    Demo {
        /// Simulated milliseconds between phases
        #[arg(
            short,
            long,
            default_value = "10",
            value_parser = clap::value_parser!(i64).range(1..=MAX_STEP_MS)
        )]
        step_ms: i64,
    },
    /// Run the walkthrough and dump every attribute's history
    History {
        /// Simulated milliseconds between phases
        #[arg(
            short,
            long,
            default_value = "10",
            value_parser = clap::value_parser!(i64).range(1..=MAX_STEP_MS)
        )]
        step_ms: i64,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

/// A recorded company plus the capture time of each phase.
struct Walkthrough {
    company: Company,
    phases: Vec<(&'static str, Timestamp)>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("timeslice-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", timeslice_common::crate_info());
            println!("kernel: {}", timeslice_kernel::crate_info());
            println!("tools: {}", timeslice_tools::crate_info());
        }
        Commands::Demo { step_ms } => run_demo(step_ms)?,
        Commands::History { step_ms, json } => {
            let walk = walkthrough(step_ms, false)?;
            print_history(&walk, json)?;
        }
    }

    Ok(())
}

/// Build the company and record the initial, growth and expansion phases.
fn walkthrough(step_ms: i64, narrate: bool) -> anyhow::Result<Walkthrough> {
    let _span = tracing::info_span!("walkthrough", step_ms).entered();
    let step = Duration::milliseconds(step_ms);
    let clock = Rc::new(ManualClock::new(Utc::now()));
    let mut company = Company::new("TechCorp", 1999, clock.clone());
    let mut phases = Vec::new();

    let initial = company.state()?;
    phases.push(("initial", clock.now()));
    if narrate {
        println!("Creating company {} (founded {})...", company.name, company.founded);
        println!("Initial state:\n{initial}");
        println!("\n--- Company Growth Phase ---");
    }

    clock.advance(step);
    company.record_phase("A+", 75, 1_500_000);
    phases.push(("growth", clock.now()));
    if narrate {
        println!("After growth:\n{}", company.state()?);
        println!("\n--- Company Expansion Phase ---");
    }

    clock.advance(step);
    company.record_phase("AA-", 120, 2_500_000);
    phases.push(("expansion", clock.now()));
    if narrate {
        println!("After expansion:\n{}", company.state()?);
    }

    tracing::info!(timeline = %company.timeline.id().short(), phases = phases.len(), "walkthrough recorded");
    Ok(Walkthrough { company, phases })
}

fn run_demo(step_ms: i64) -> anyhow::Result<()> {
    println!("Temporal Attribute Demo");
    println!("{}", "=".repeat(40));

    let mut walk = walkthrough(step_ms, true)?;
    let company = &mut walk.company;

    println!("\n{}", "=".repeat(40));
    println!("TIME TRAVEL DEMONSTRATION");
    println!("{}", "=".repeat(40));

    println!("\nCurrent state:\n{}", company.state()?);
    for (label, at) in walk.phases.iter().take(2) {
        println!("\nTraveling to {label} state ({at}):");
        println!("{}", company.state_as_of(*at)?);
    }
    println!("\nBack to current state:\n{}", company.state()?);

    println!("\n{}", "=".repeat(40));
    println!("ERROR HANDLING DEMONSTRATION");
    println!("{}", "=".repeat(40));

    println!("\nAttempting to access state before any snapshots...");
    let first = walk.phases.first().map(|(_, at)| *at).unwrap_or_else(Utc::now);
    match company.state_as_of(first - Duration::hours(1)) {
        Err(e @ TemporalError::NoSnapshotAvailable { .. }) => {
            println!("Caught expected error: {e}");
        }
        Err(e) => return Err(e.into()),
        Ok(state) => anyhow::bail!("expected a pre-history error, read:\n{state}"),
    }

    println!("\n{}", "=".repeat(40));
    println!("SNAPSHOT SUMMARY");
    println!("{}", "=".repeat(40));
    println!();
    println!("{}", HistoryInspector::summary(&company.credit_rating));
    println!("{}", HistoryInspector::summary(&company.employee_count));
    println!("{}", HistoryInspector::summary(&company.revenue));

    println!("\nDemo completed successfully!");
    Ok(())
}

fn print_history(walk: &Walkthrough, json: bool) -> anyhow::Result<()> {
    let company = &walk.company;
    if json {
        let doc = serde_json::json!({
            "company": company.name,
            "timeline": company.timeline.id(),
            "phases": walk.phases,
            "attributes": {
                "credit_rating": company.credit_rating.history().entries(),
                "employee_count": company.employee_count.history().entries(),
                "revenue": company.revenue.history().entries(),
            },
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("{} timeline {}", company.name, company.timeline.id());
    for (summary, rows) in [
        (
            HistoryInspector::summary(&company.credit_rating),
            HistoryInspector::timeline(&company.credit_rating),
        ),
        (
            HistoryInspector::summary(&company.employee_count),
            HistoryInspector::timeline(&company.employee_count),
        ),
        (
            HistoryInspector::summary(&company.revenue),
            HistoryInspector::timeline(&company.revenue),
        ),
    ] {
        println!("\n{summary}");
        for row in rows {
            println!("  {row}");
        }
    }
    Ok(())
}

use anyhow::{Context, Result};
use racwatch_common::planner::InactivityPlanner;
use racwatch_common::report::{self, ReportFormat};
use racwatch_common::{Collector, CommandRunner, RacClient, RacConfig};
use std::path::PathBuf;

pub struct ReportOptions {
    pub output_dir: PathBuf,
    pub save: bool,
    pub dry_run: bool,
    pub message: Option<String>,
}

pub async fn execute<R: CommandRunner>(
    client: &RacClient<R>,
    config: &RacConfig,
    options: &ReportOptions,
) -> Result<()> {
    let snapshot = Collector::new(client, config.inactivity_threshold())
        .collect()
        .await;

    println!("{}", report::project(&snapshot, ReportFormat::Text)?);

    if options.save {
        println!();
        for format in [ReportFormat::Text, ReportFormat::Json] {
            let path = report::save_report(&snapshot, format, None, &options.output_dir)
                .with_context(|| format!("Failed to save {format} report"))?;
            println!("✓ Report saved: {}", path.display());
        }
    }

    let inactive = snapshot.inactive_infobases();
    if inactive.is_empty() {
        return Ok(());
    }

    let mut planner = InactivityPlanner::new(client);
    if let Some(message) = &options.message {
        planner = planner.with_message(message.clone());
    }
    let names = planner.plan_and_execute(&inactive, options.dry_run).await;

    if options.dry_run {
        println!("\nInfobases that would be blocked (run with --execute to apply):");
    } else {
        println!("\nBlocked infobases:");
    }
    for name in &names {
        println!("  - {name}");
    }

    if !options.dry_run && names.len() < inactive.len() {
        println!(
            "\n✗ {} of {} infobase(s) could not be blocked",
            inactive.len() - names.len(),
            inactive.len()
        );
    }

    Ok(())
}

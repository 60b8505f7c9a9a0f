use anyhow::{Context, Result};
use chrono::Utc;
use owo_colors::OwoColorize;
use streamcal_core::merge::{Merger, Pruning, load_sources};
use streamcal_core::settings::MergeSettings;

use super::{pluralize, write_output};
use crate::utils::tui::create_spinner;

pub async fn run(cfg: &MergeSettings) -> Result<()> {
    let sources = load_sources(&cfg.sources)?;

    let pruning = cfg
        .prune
        .then(|| Pruning::days_before(Utc::now(), cfg.cutoff_days, cfg.markers.clone()));
    let merger = Merger::new(pruning).context("Failed to set up HTTP client")?;

    let spinner = create_spinner(format!(
        "Merging {} {}",
        sources.len(),
        pluralize("source", sources.len())
    ));
    let outcome = merger.merge(&sources).await;
    spinner.finish_and_clear();

    for source in &outcome.failed {
        println!("   {} {}", "Skipped".red(), source);
    }

    write_output(&cfg.output, &outcome.to_ics(&cfg.calendar_name))?;

    println!(
        "{} {} {} from {} {} into {} {}",
        "Merged".green(),
        outcome.events.len(),
        pluralize("event", outcome.events.len()),
        outcome.sources_read,
        pluralize("source", outcome.sources_read),
        cfg.output.display(),
        format!(
            "({} pruned, {} failed)",
            outcome.pruned,
            outcome.failed.len()
        )
        .dimmed()
    );

    Ok(())
}

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use owo_colors::OwoColorize;
use streamcal_core::Settings;
use streamcal_core::date_window::{parse_timezone, today_in};
use streamcal_core::ics::{RELEASES_PRODID, generate_calendar};
use streamcal_core::releases;
use streamcal_core::tmdb::TmdbClient;

use super::{pluralize, write_output};
use crate::utils::tui::create_spinner;

pub async fn run(settings: &Settings, today: Option<NaiveDate>) -> Result<()> {
    let cfg = &settings.releases;

    // Fails before any request is made when the key is missing
    let client = TmdbClient::from_env(&settings.tmdb.base_url)?;

    let today = match today {
        Some(date) => date,
        None => today_in(parse_timezone(&cfg.timezone)?),
    };

    let spinner = create_spinner(format!("Fetching releases around {}", today));
    let result = releases::build(&client, cfg, today, Utc::now()).await;
    spinner.finish_and_clear();

    let run = result.context("Failed to build release calendar")?;

    let ics = generate_calendar(&run.events, &cfg.calendar_name, RELEASES_PRODID);
    write_output(&cfg.output, &ics)?;

    println!(
        "{} {} {} to {} {}",
        "Wrote".green(),
        run.events.len(),
        pluralize("event", run.events.len()),
        cfg.output.display(),
        format!(
            "({} candidates, {} eligible)",
            run.candidates, run.eligible
        )
        .dimmed()
    );

    Ok(())
}

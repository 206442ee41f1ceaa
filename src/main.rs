mod board;
mod cli;
mod config;
mod db;
mod error;
mod models;
mod prayer_times;
mod tracker;
mod tui;
mod utils;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use rusqlite::Connection;

use cli::args::{Cli, Commands};
use cli::handlers::{self, SetupArgs};
use config::AppConfig;
use db::migrations::run_migrations;
use prayer_times::PrayerCalculator;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = AppConfig::load().context("Loading config")?;

    // Ensure data directory exists and open DB
    AppConfig::ensure_data_dir()?;
    let db_path = AppConfig::db_path()?;
    let conn = Connection::open(&db_path)
        .with_context(|| format!("Opening database at {:?}", db_path))?;

    // Enable WAL mode for better concurrent access
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    // Run migrations on every startup
    run_migrations(&conn)?;
    log::debug!("Database ready at {:?}", db_path);

    match cli.command {
        Some(Commands::Setup {
            name,
            lat,
            lng,
            method,
            madhab,
            tz,
            hijri_offset,
        }) => {
            let args = SetupArgs {
                name,
                lat,
                lng,
                method,
                madhab,
                tz,
                hijri_offset,
            };
            handlers::handle_setup(&conn, &mut config, args)?;
        }
        Some(Commands::Times) => handlers::handle_times(&conn, &config)?,
        Some(Commands::Mark { prayer }) => handlers::handle_mark(&conn, &config, &prayer)?,
        Some(Commands::Unmark { prayer }) => handlers::handle_unmark(&conn, &config, &prayer)?,
        Some(Commands::Status { json }) => handlers::handle_status(&conn, &config, json)?,
        Some(Commands::Missed) => handlers::handle_missed(&conn, &config)?,

        // No subcommand → launch TUI
        None => {
            // Cache the coming week so midnight rollover never waits on a calculation
            if let Ok(calc) = PrayerCalculator::new(
                config.salah.latitude,
                config.salah.longitude,
                &config.salah.calc_method,
                &config.salah.madhab,
                config.salah.timezone_offset,
            ) {
                if let Err(e) = calc.ensure_cached(&conn, Local::now().date_naive(), 7) {
                    log::warn!("Could not pre-compute prayer times: {:#}", e);
                }
            }
            tui::app::run(conn, config)?;
        }
    }

    Ok(())
}

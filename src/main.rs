use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use console::style;
use log::{error, info};
use std::io::Write;

use football_calendar_rs::calendar::GoogleCalendarClient;
use football_calendar_rs::config;
use football_calendar_rs::fixtures::FootballDataClient;
use football_calendar_rs::selector::TeamSelector;
use football_calendar_rs::sync::FixtureSync;
use football_calendar_rs::teams::TeamDirectory;
use football_calendar_rs::SyncError;

/// Add your favourite football team's upcoming fixtures to Google Calendar.
///
/// Configuration is read from FOOTBALL_* environment variables, a local .env
/// file and an optional football_calendar.toml in the working directory.
#[derive(Parser, Debug)]
#[clap(version, about, long_about = None)]
struct Args {}

/// アプリケーションのロギングを初期化
fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}: {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();

    info!("football_calendar_rs v{} を起動しました", env!("CARGO_PKG_VERSION"));
}

#[tokio::main]
async fn main() {
    let _args = Args::parse();
    init_logging();

    if let Err(e) = run().await {
        error!("{:#}", e);
        eprintln!("\n{} {}", style("❌ Error:").red().bold(), user_message(&e));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = config::load_config().context("Failed to load configuration")?;
    let api_key = config.require_api_key()?;

    let selector = TeamSelector::new(TeamDirectory::new());
    let team = selector.select()?;

    let calendar = GoogleCalendarClient::authenticate(&config)
        .await
        .context("Failed to authenticate with Google Calendar")?;
    println!("✅ Successfully authenticated with Google Calendar");

    let fixtures = FootballDataClient::new(api_key, config.api_base_url.clone())?;

    let report = FixtureSync::new(&fixtures, &calendar)
        .with_policy(config.dedup)
        .with_match_duration(config.match_duration())
        .sync_team_fixtures(team, config.days_ahead)
        .await?;

    info!("Sync finished: {}", report);
    println!(
        "\n✨ {} new matches added to your calendar ({} already there, {} fixtures checked)",
        style(report.created).green().bold(),
        report.skipped,
        report.considered
    );
    println!("\n🎉 Done! Check your Google Calendar.\n");

    Ok(())
}

/// エラー種別ごとのユーザー向けメッセージ
fn user_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<SyncError>() {
        Some(SyncError::RateLimited { .. }) => format!(
            "{}\nThe free football-data.org tier allows 10 requests per minute; wait a moment and run again.",
            err.root_cause()
        ),
        Some(SyncError::NotFound(query)) => format!("Team '{}' not found in the list", query),
        Some(SyncError::Configuration(msg)) => msg.clone(),
        _ => format!("{:#}", err),
    }
}

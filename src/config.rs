use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::normalize::parse_date;
use crate::season::{SeasonPhase, parse_phases};
use crate::stats_api::DEFAULT_STATS_BASE_URL;

pub const DEFAULT_CSV_PATH: &str = "nba_game_player_data.csv";

const DEFAULT_REQUEST_DELAY_SECS: u64 = 2;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct UpdateConfig {
    pub csv_path: PathBuf,
    pub output_path: Option<PathBuf>,
    pub season: Option<String>,
    pub request_delay: Duration,
    pub http_timeout: Duration,
    pub stats_base_url: String,
}

impl UpdateConfig {
    /// Reads `.env.local`, `.env`, then the process environment.
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");

        let csv_path = opt_env("GAMELOG_CSV")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CSV_PATH));
        let output_path = opt_env("GAMELOG_OUT").map(PathBuf::from);
        let season = opt_env("GAMELOG_SEASON");
        let request_delay = env::var("GAMELOG_REQUEST_DELAY_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_REQUEST_DELAY_SECS)
            .min(60);
        let http_timeout = env::var("GAMELOG_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS)
            .clamp(5, 120);
        let stats_base_url =
            opt_env("GAMELOG_STATS_BASE_URL").unwrap_or_else(|| DEFAULT_STATS_BASE_URL.to_string());

        Self {
            csv_path,
            output_path,
            season,
            request_delay: Duration::from_secs(request_delay),
            http_timeout: Duration::from_secs(http_timeout),
            stats_base_url,
        }
    }

    /// Applies `--csv`, `--out` and `--season` on top of the environment.
    pub fn apply_args(&mut self, args: &[String]) {
        if let Some(path) = flag_value(args, "--csv") {
            self.csv_path = PathBuf::from(path);
        }
        if let Some(path) = flag_value(args, "--out") {
            self.output_path = Some(PathBuf::from(path));
        }
        if let Some(season) = flag_value(args, "--season") {
            self.season = Some(season.to_string());
        }
    }
}

/// Postseason flags: `--phases play-in,playoffs` and `--since 2025-04-15`.
pub fn postseason_args(args: &[String]) -> Result<(Vec<SeasonPhase>, Option<NaiveDate>)> {
    let phases = match flag_value(args, "--phases") {
        Some(raw) => parse_phases(raw)?,
        None => Vec::new(),
    };
    let phases = if phases.is_empty() {
        SeasonPhase::POSTSEASON.to_vec()
    } else {
        phases
    };
    let since = flag_value(args, "--since")
        .map(|raw| parse_date(raw).with_context(|| format!("invalid --since date {raw:?}")))
        .transpose()?;
    Ok((phases, since))
}

/// Value of `--name=value` or `--name value`, ignoring blanks.
pub fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed);
            }
        }
        if arg == name {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim());
            }
        }
    }
    None
}

fn opt_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

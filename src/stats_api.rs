use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::http_client::http_client;
use crate::season::SeasonPhase;
use crate::table::RawTable;

pub const DEFAULT_STATS_BASE_URL: &str = "https://stats.nba.com/stats";

const GAME_LOG_RESULT_SET: &str = "LeagueGameLog";

/// Row granularity of a league game log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Granularity {
    #[default]
    Player,
    Team,
}

impl Granularity {
    fn query_value(self) -> &'static str {
        match self {
            Granularity::Player => "P",
            Granularity::Team => "T",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameLogRequest {
    pub season: String,
    pub phase: SeasonPhase,
    pub granularity: Granularity,
}

impl GameLogRequest {
    pub fn players(season: impl Into<String>, phase: SeasonPhase) -> Self {
        Self {
            season: season.into(),
            phase,
            granularity: Granularity::Player,
        }
    }

    pub fn describe(&self) -> String {
        format!("{} {}", self.season, self.phase)
    }
}

/// Anything that can hand back one league game log.
pub trait GameLogSource {
    fn fetch_game_log(&self, request: &GameLogRequest) -> Result<RawTable>;
}

/// Live stats.nba.com `leaguegamelog` endpoint.
pub struct StatsNbaClient {
    client: &'static Client,
    base_url: String,
}

impl StatsNbaClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = http_client(timeout)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn game_log_url(&self, request: &GameLogRequest) -> String {
        let season_type = request.phase.query_value().replace(' ', "+");
        format!(
            "{}/leaguegamelog?Counter=0&Direction=ASC&LeagueID=00&PlayerOrTeam={}&Season={}&SeasonType={}&Sorter=DATE&DateFrom=&DateTo=",
            self.base_url,
            request.granularity.query_value(),
            request.season,
            season_type
        )
    }
}

impl GameLogSource for StatsNbaClient {
    fn fetch_game_log(&self, request: &GameLogRequest) -> Result<RawTable> {
        let url = self.game_log_url(request);
        debug!(%url, "requesting league game log");
        let resp = self.client.get(&url).send().context("request failed")?;
        let status = resp.status();
        let body = resp.text().context("failed reading body")?;
        if !status.is_success() {
            return Err(anyhow!("http {}: {}", status, truncate(&body, 200)));
        }
        parse_league_game_log_json(&body)
    }
}

#[derive(Debug, Deserialize)]
struct GameLogResponse {
    #[serde(rename = "resultSets", default)]
    result_sets: Vec<ResultSet>,
    #[serde(rename = "resultSet")]
    result_set: Option<ResultSet>,
}

#[derive(Debug, Deserialize)]
struct ResultSet {
    #[serde(default)]
    name: String,
    #[serde(default)]
    headers: Vec<String>,
    #[serde(rename = "rowSet", default)]
    row_set: Vec<Vec<Value>>,
}

/// Decodes a `leaguegamelog` payload. `null`/empty bodies are an empty table.
pub fn parse_league_game_log_json(raw: &str) -> Result<RawTable> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(RawTable::default());
    }
    let resp: GameLogResponse =
        serde_json::from_str(trimmed).context("invalid leaguegamelog json")?;
    let mut sets = resp.result_sets;
    sets.extend(resp.result_set);

    let idx = sets
        .iter()
        .position(|s| s.name == GAME_LOG_RESULT_SET)
        .unwrap_or(0);
    if idx >= sets.len() {
        return Ok(RawTable::default());
    }
    let set = sets.swap_remove(idx);
    if let Some(bad) = set.row_set.iter().position(|r| r.len() != set.headers.len()) {
        return Err(anyhow!(
            "row {bad} has {} values, expected {}",
            set.row_set[bad].len(),
            set.headers.len()
        ));
    }
    Ok(RawTable::new(set.headers, set.row_set))
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

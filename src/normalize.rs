use std::collections::{HashMap, HashSet};

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde_json::Value;
use tracing::debug;

use crate::matchup::{Opponent, extract_opponent};
use crate::metrics::{game_score, round_to, try_parse_duration};
use crate::schema::{
    DATE, FIELD_MAP, FieldKind, GAME_SCORE, MATCHUP_FIELD, OPPONENT, PLAYER, PROVIDER_DATE_FIELD,
    PROVIDER_TEAM_FIELD, TEAM, TEXT_SENTINEL,
};
use crate::table::{Cell, RawTable, Table};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

const TOP_OPPONENTS: usize = 5;

/// Inclusive date filter. A missing end means "today".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateWindow {
    pub fn since(start: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        let end = self.end.unwrap_or(today);
        self.start.is_none_or(|start| date >= start) && date <= end
    }
}

/// Row-level problems absorbed during normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnomalyCounts {
    pub unknown_opponents: usize,
    pub bad_durations: usize,
    pub bad_numbers: usize,
    pub bad_dates: usize,
    pub outside_window: usize,
}

impl AnomalyCounts {
    pub fn total(&self) -> usize {
        self.unknown_opponents + self.bad_durations + self.bad_numbers + self.bad_dates
    }
}

#[derive(Debug, Clone)]
pub struct Normalized {
    pub table: Table,
    pub anomalies: AnomalyCounts,
}

pub fn normalize(raw: &RawTable, window: Option<&DateWindow>) -> Normalized {
    normalize_as_of(raw, window, Local::now().date_naive())
}

/// Same as [`normalize`] with an explicit "today" for open-ended windows.
pub fn normalize_as_of(raw: &RawTable, window: Option<&DateWindow>, today: NaiveDate) -> Normalized {
    let mut anomalies = AnomalyCounts::default();

    let mappings = FIELD_MAP
        .iter()
        .filter_map(|m| match m.provider {
            Some(name) => raw.column_index(name).map(|idx| (m, Some(idx))),
            None => Some((m, None)),
        })
        .collect::<Vec<_>>();
    let mut table = Table::new(mappings.iter().map(|(m, _)| m.target.to_string()).collect());
    table.columns.push(GAME_SCORE.to_string());

    let matchup_idx = raw.column_index(MATCHUP_FIELD);
    let team_idx = raw.column_index(PROVIDER_TEAM_FIELD);
    let date_idx = raw.column_index(PROVIDER_DATE_FIELD);
    if matchup_idx.is_none() {
        debug!("no {MATCHUP_FIELD} column in provider rows; opponents left unknown");
    }

    for row in &raw.rows {
        let date = date_idx.and_then(|idx| row.get(idx)).and_then(parse_raw_date);
        if let Some(window) = window {
            match date {
                Some(d) if window.contains(d, today) => {}
                Some(_) => {
                    anomalies.outside_window += 1;
                    continue;
                }
                None => {
                    anomalies.bad_dates += 1;
                    continue;
                }
            }
        } else if date.is_none() {
            anomalies.bad_dates += 1;
        }

        let opponent = match matchup_idx {
            Some(idx) => {
                let team = team_idx.and_then(|i| row.get(i)).map(value_text).unwrap_or_default();
                let matchup = row.get(idx).map(value_text);
                extract_opponent(matchup.as_deref(), &team)
            }
            None => Opponent::Unknown,
        };
        if opponent.is_unknown() {
            anomalies.unknown_opponents += 1;
        }

        let mut cells = Vec::with_capacity(table.columns.len());
        for (mapping, idx) in &mappings {
            let value = idx.and_then(|i| row.get(i)).unwrap_or(&Value::Null);
            let cell = match mapping.kind {
                FieldKind::Text => Cell::Text(value_text(value)),
                FieldKind::Opponent => Cell::text(opponent.as_str()),
                FieldKind::Date => Cell::Text(
                    date.map(|d| d.format(DATE_FORMAT).to_string())
                        .unwrap_or_else(|| TEXT_SENTINEL.to_string()),
                ),
                FieldKind::Duration => {
                    let minutes = try_parse_duration(value);
                    if minutes.is_none() {
                        anomalies.bad_durations += 1;
                    }
                    Cell::Float(minutes.unwrap_or(0.0))
                }
                FieldKind::Count => {
                    let (count, ok) = coerce_count(value);
                    if !ok {
                        anomalies.bad_numbers += 1;
                    }
                    Cell::Int(count)
                }
                FieldKind::Percentage => {
                    let (pct, ok) = coerce_percentage(value);
                    if !ok {
                        anomalies.bad_numbers += 1;
                    }
                    Cell::Float(pct)
                }
            };
            cells.push(cell);
        }

        let score = {
            let columns = &table.columns;
            game_score(|name| {
                let idx = columns.iter().position(|c| c == name)?;
                cells.get(idx).and_then(Cell::as_f64)
            })
        };
        cells.push(Cell::Float(round_to(score, 1)));
        table.rows.push(cells);
    }

    Normalized { table, anomalies }
}

/// Non-negative integer, truncating fractions. `(0, false)` when unparseable.
pub fn coerce_count(value: &Value) -> (i64, bool) {
    match value_f64(value) {
        Some(v) => ((v.trunc() as i64).max(0), true),
        None => (0, false),
    }
}

/// Fraction clamped to `[0, 1]`. `(0.0, false)` when unparseable.
pub fn coerce_percentage(value: &Value) -> (f64, bool) {
    match value_f64(value) {
        Some(v) => (v.clamp(0.0, 1.0), true),
        None => (0.0, false),
    }
}

fn value_f64(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    v.is_finite().then_some(v)
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

fn parse_raw_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => parse_date(s),
        _ => None,
    }
}

/// Accepts the date shapes the provider and older dataset files use.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for fmt in [DATE_FORMAT, "%m/%d/%Y", "%b %d, %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date);
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(ts.date());
        }
    }
    None
}

/// Human-facing profile of one normalized batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub rows: usize,
    pub first_date: Option<String>,
    pub last_date: Option<String>,
    pub players: usize,
    pub teams: usize,
    pub opponents: usize,
    pub top_opponents: Vec<(String, usize)>,
    pub unknown_opponents: usize,
}

pub fn summarize(table: &Table) -> BatchSummary {
    let distinct = |column: &str| {
        table
            .column_values(column)
            .map(Cell::render)
            .collect::<HashSet<_>>()
            .len()
    };

    let mut dates = table
        .column_values(DATE)
        .map(Cell::render)
        .filter(|d| parse_date(d).is_some())
        .collect::<Vec<_>>();
    dates.sort();

    let mut opponent_counts: HashMap<String, usize> = HashMap::new();
    for value in table.column_values(OPPONENT) {
        *opponent_counts.entry(value.render()).or_default() += 1;
    }
    let unknown_opponents = opponent_counts
        .get(crate::matchup::UNKNOWN_OPPONENT)
        .copied()
        .unwrap_or(0);
    let opponents = opponent_counts.len();
    let mut top_opponents = opponent_counts.into_iter().collect::<Vec<_>>();
    top_opponents.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top_opponents.truncate(TOP_OPPONENTS);

    BatchSummary {
        rows: table.len(),
        first_date: dates.first().cloned(),
        last_date: dates.last().cloned(),
        players: distinct(PLAYER),
        teams: distinct(TEAM),
        opponents,
        top_opponents,
        unknown_opponents,
    }
}

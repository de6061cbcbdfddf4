use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use chrono::{Datelike, NaiveDate};

/// Month the NBA season rolls over.
const SEASON_START_MONTH: u32 = 10;

/// Season label such as `2024-25` for a date inside that season.
pub fn season_for_date(date: NaiveDate) -> String {
    let start_year = if date.month() >= SEASON_START_MONTH {
        date.year()
    } else {
        date.year() - 1
    };
    format!("{start_year}-{:02}", (start_year + 1).rem_euclid(100))
}

/// Competition phase the provider filters its game log by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeasonPhase {
    RegularSeason,
    PlayIn,
    Playoffs,
}

impl SeasonPhase {
    pub const POSTSEASON: [SeasonPhase; 2] = [SeasonPhase::PlayIn, SeasonPhase::Playoffs];

    /// Value of the provider's `SeasonType` query parameter.
    pub fn query_value(self) -> &'static str {
        match self {
            SeasonPhase::RegularSeason => "Regular Season",
            SeasonPhase::PlayIn => "PlayIn",
            SeasonPhase::Playoffs => "Playoffs",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SeasonPhase::RegularSeason => "regular season",
            SeasonPhase::PlayIn => "play-in",
            SeasonPhase::Playoffs => "playoffs",
        }
    }
}

impl fmt::Display for SeasonPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SeasonPhase {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        let key = raw
            .trim()
            .to_ascii_lowercase()
            .replace(['-', '_', ' '], "");
        match key.as_str() {
            "regular" | "regularseason" => Ok(SeasonPhase::RegularSeason),
            "playin" => Ok(SeasonPhase::PlayIn),
            "playoffs" | "playoff" | "finals" => Ok(SeasonPhase::Playoffs),
            _ => Err(anyhow!("unknown season phase {raw:?}")),
        }
    }
}

/// Comma/semicolon separated phase list, order kept, duplicates dropped.
pub fn parse_phases(raw: &str) -> Result<Vec<SeasonPhase>> {
    let mut out = Vec::new();
    for part in raw.split([',', ';']).map(str::trim).filter(|p| !p.is_empty()) {
        let phase = part.parse::<SeasonPhase>()?;
        if !out.contains(&phase) {
            out.push(phase);
        }
    }
    Ok(out)
}

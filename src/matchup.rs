use std::fmt;

use once_cell::sync::OnceCell;
use regex::Regex;

pub const UNKNOWN_OPPONENT: &str = "UNK";

const AWAY_AT_HOME: &str = " @ ";
const HOME_VS_AWAY: &str = " vs. ";

/// Opponent resolved from a matchup string. `Unknown` is a real value and
/// renders as `UNK`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Opponent {
    Team(String),
    Unknown,
}

impl Opponent {
    pub fn as_str(&self) -> &str {
        match self {
            Opponent::Team(code) => code,
            Opponent::Unknown => UNKNOWN_OPPONENT,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Opponent::Unknown)
    }
}

impl fmt::Display for Opponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn team_code_re() -> &'static Regex {
    static TEAM_CODE_RE: OnceCell<Regex> = OnceCell::new();
    TEAM_CODE_RE.get_or_init(|| Regex::new(r"\b[A-Z]{3}\b").expect("valid team code regex"))
}

/// Resolve the opponent of `own_team` from text like `LAL @ BOS` or
/// `GSW vs. LAC`. Total: anything unparseable yields `Opponent::Unknown`.
pub fn extract_opponent(matchup: Option<&str>, own_team: &str) -> Opponent {
    let Some(matchup) = matchup.map(str::trim).filter(|m| !m.is_empty()) else {
        return Opponent::Unknown;
    };
    let own_team = own_team.trim();

    if let Some(other) = opposite_side(matchup, own_team) {
        return Opponent::Team(other.to_string());
    }

    team_code_re()
        .find_iter(matchup)
        .map(|m| m.as_str())
        .find(|code| *code != own_team)
        .map(|code| Opponent::Team(code.to_string()))
        .unwrap_or(Opponent::Unknown)
}

// `@` lists away first, `vs.` lists home first; either way the answer is
// whichever side is not ours.
fn opposite_side<'a>(matchup: &'a str, own_team: &str) -> Option<&'a str> {
    let separator = [AWAY_AT_HOME, HOME_VS_AWAY]
        .into_iter()
        .find(|sep| matchup.contains(sep))?;
    let mut sides = matchup.split(separator).map(str::trim);
    let first = sides.next()?;
    let second = sides.next()?;
    if first == own_team && !second.is_empty() {
        Some(second)
    } else if second == own_team && !first.is_empty() {
        Some(first)
    } else {
        None
    }
}

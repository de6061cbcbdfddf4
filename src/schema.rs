//! Column vocabulary shared by the normalizer and the dataset merger.
//!
//! The provider mapping is a fixed table; the persisted schema is runtime
//! data derived from whatever header the dataset file carries.

use crate::table::Cell;

pub const PLAYER: &str = "Player";
pub const TEAM: &str = "Tm";
pub const OPPONENT: &str = "Opp";
pub const RESULT: &str = "Res";
pub const MINUTES: &str = "MP";
pub const GAME_SCORE: &str = "GmSc";
pub const DATE: &str = "Data";

/// Uniqueness key of the persisted dataset.
pub const KEY_COLUMNS: [&str; 3] = [PLAYER, DATE, TEAM];

pub const TEXT_SENTINEL: &str = "Unknown";

/// How a normalized column is coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Opponent,
    Duration,
    Count,
    Percentage,
    Date,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldMapping {
    /// Provider column; `None` for columns derived before mapping.
    pub provider: Option<&'static str>,
    pub target: &'static str,
    pub kind: FieldKind,
}

const fn field(provider: &'static str, target: &'static str, kind: FieldKind) -> FieldMapping {
    FieldMapping {
        provider: Some(provider),
        target,
        kind,
    }
}

pub const MATCHUP_FIELD: &str = "MATCHUP";
pub const PROVIDER_TEAM_FIELD: &str = "TEAM_ABBREVIATION";
pub const PROVIDER_DATE_FIELD: &str = "GAME_DATE";

pub const FIELD_MAP: &[FieldMapping] = &[
    field("PLAYER_NAME", PLAYER, FieldKind::Text),
    field(PROVIDER_TEAM_FIELD, TEAM, FieldKind::Text),
    FieldMapping {
        provider: None,
        target: OPPONENT,
        kind: FieldKind::Opponent,
    },
    field("WL", RESULT, FieldKind::Text),
    field("MIN", MINUTES, FieldKind::Duration),
    field("FGM", "FG", FieldKind::Count),
    field("FGA", "FGA", FieldKind::Count),
    field("FG_PCT", "FG%", FieldKind::Percentage),
    field("FG3M", "3P", FieldKind::Count),
    field("FG3A", "3PA", FieldKind::Count),
    field("FG3_PCT", "3P%", FieldKind::Percentage),
    field("FTM", "FT", FieldKind::Count),
    field("FTA", "FTA", FieldKind::Count),
    field("FT_PCT", "FT%", FieldKind::Percentage),
    field("OREB", "ORB", FieldKind::Count),
    field("DREB", "DRB", FieldKind::Count),
    field("REB", "TRB", FieldKind::Count),
    field("AST", "AST", FieldKind::Count),
    field("STL", "STL", FieldKind::Count),
    field("BLK", "BLK", FieldKind::Count),
    field("TOV", "TOV", FieldKind::Count),
    field("PF", "PF", FieldKind::Count),
    field("PTS", "PTS", FieldKind::Count),
    field(PROVIDER_DATE_FIELD, DATE, FieldKind::Date),
];

/// Canonical column order of a freshly created dataset.
pub const TARGET_COLUMNS: &[&str] = &[
    PLAYER, TEAM, OPPONENT, RESULT, MINUTES, "FG", "FGA", "FG%", "3P", "3PA", "3P%", "FT", "FTA",
    "FT%", "ORB", "DRB", "TRB", "AST", "STL", "BLK", "TOV", "PF", "PTS", GAME_SCORE, DATE,
];

const FLOAT_COLUMNS: &[&str] = &["FG%", "3P%", "FT%", GAME_SCORE, MINUTES];
const TEXT_COLUMNS: &[&str] = &[OPPONENT, PLAYER, TEAM, RESULT, DATE];

/// Storage kind of a persisted column, which decides its fill value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Text,
}

impl ColumnKind {
    pub fn for_column(name: &str) -> Self {
        if FLOAT_COLUMNS.contains(&name) {
            ColumnKind::Float
        } else if TEXT_COLUMNS.contains(&name) {
            ColumnKind::Text
        } else {
            ColumnKind::Integer
        }
    }

    pub fn default_cell(self) -> Cell {
        match self {
            ColumnKind::Integer => Cell::Int(0),
            ColumnKind::Float => Cell::Float(0.0),
            ColumnKind::Text => Cell::Text(TEXT_SENTINEL.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let kind = ColumnKind::for_column(&name);
        Self { name, kind }
    }

    pub fn default_cell(&self) -> Cell {
        self.kind.default_cell()
    }
}

/// Ordered column descriptors of a persisted dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    columns: Vec<ColumnSpec>,
}

impl Schema {
    pub fn from_header<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: header.into_iter().map(ColumnSpec::new).collect(),
        }
    }

    pub fn canonical() -> Self {
        Self::from_header(TARGET_COLUMNS.iter().copied())
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }
}

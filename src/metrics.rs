use serde_json::Value;

/// Minutes played as decimal minutes. Numbers pass through; `MM:SS` strings
/// become `MM + SS/60` rounded to 2 places. Anything else is `0.0`.
pub fn parse_duration(value: &Value) -> f64 {
    try_parse_duration(value).unwrap_or(0.0)
}

/// Like [`parse_duration`] but reports unparseable input as `None`.
pub fn try_parse_duration(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => try_parse_duration_str(s),
        _ => None,
    }
}

pub fn try_parse_duration_str(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let parsed = if raw.contains(':') {
        let mut parts = raw.split(':');
        let minutes = parts.next()?.trim().parse::<i64>().ok()?;
        let seconds = parts.next()?.trim().parse::<i64>().ok()?;
        minutes as f64 + seconds as f64 / 60.0
    } else {
        raw.parse::<f64>().ok()?
    };
    parsed.is_finite().then(|| round_to(parsed, 2))
}

/// Box-score counts feeding the game score formula.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoxScore {
    pub pts: f64,
    pub fg: f64,
    pub fga: f64,
    pub ft: f64,
    pub fta: f64,
    pub orb: f64,
    pub drb: f64,
    pub stl: f64,
    pub ast: f64,
    pub blk: f64,
    pub pf: f64,
    pub tov: f64,
}

impl BoxScore {
    /// Builds a box score from a column lookup. `None` if any count is missing.
    pub fn from_lookup<F>(mut get: F) -> Option<Self>
    where
        F: FnMut(&str) -> Option<f64>,
    {
        Some(Self {
            pts: get("PTS")?,
            fg: get("FG")?,
            fga: get("FGA")?,
            ft: get("FT")?,
            fta: get("FTA")?,
            orb: get("ORB")?,
            drb: get("DRB")?,
            stl: get("STL")?,
            ast: get("AST")?,
            blk: get("BLK")?,
            pf: get("PF")?,
            tov: get("TOV")?,
        })
    }

    pub fn game_score(&self) -> f64 {
        let raw = self.pts + 0.4 * self.fg - 0.7 * self.fga - 0.4 * (self.fta - self.ft)
            + 0.7 * self.orb
            + 0.3 * self.drb
            + self.stl
            + 0.7 * self.ast
            + 0.7 * self.blk
            - 0.4 * self.pf
            - self.tov;
        round_to(raw, 1)
    }
}

/// Game score for a row, or `0.0` when a required count is unavailable.
pub fn game_score<F>(get: F) -> f64
where
    F: FnMut(&str) -> Option<f64>,
{
    BoxScore::from_lookup(get)
        .map(|b| b.game_score())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

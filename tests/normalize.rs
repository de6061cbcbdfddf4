use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde_json::json;

use nba_gamelog::normalize::{DateWindow, normalize_as_of, summarize};
use nba_gamelog::stats_api::parse_league_game_log_json;
use nba_gamelog::table::{Cell, RawTable};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn fixture_table() -> RawTable {
    parse_league_game_log_json(&read_fixture("leaguegamelog.json")).expect("fixture should parse")
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn text(cell: Option<&Cell>) -> String {
    cell.map(Cell::render).unwrap_or_default()
}

#[test]
fn maps_provider_columns_in_target_order() {
    let out = normalize_as_of(&fixture_table(), None, day(2024, 1, 20));
    assert_eq!(
        out.table.columns,
        vec![
            "Player", "Tm", "Opp", "Res", "MP", "FG", "FGA", "FG%", "3P", "3PA", "3P%", "FT",
            "FTA", "FT%", "ORB", "DRB", "TRB", "AST", "STL", "BLK", "TOV", "PF", "PTS", "Data",
            "GmSc"
        ]
    );
    assert_eq!(out.table.len(), 7);
    assert!(!out.table.columns.iter().any(|c| c == "PLUS_MINUS"));
}

#[test]
fn window_keeps_only_new_dates() {
    let window = DateWindow::since(day(2024, 1, 11));
    let out = normalize_as_of(&fixture_table(), Some(&window), day(2024, 1, 12));
    assert_eq!(out.table.len(), 4);
    assert_eq!(out.anomalies.outside_window, 3);
    assert!(
        out.table
            .column_values("Data")
            .all(|d| d.render() == "2024-01-11" || d.render() == "2024-01-12")
    );
}

#[test]
fn derives_opponent_minutes_and_game_score() {
    let out = normalize_as_of(&fixture_table(), None, day(2024, 1, 20));
    let t = &out.table;

    assert_eq!(text(t.cell(1, "Opp")), "BOS");
    assert_eq!(text(t.cell(2, "Opp")), "LAL");
    assert_eq!(text(t.cell(3, "Opp")), "LAC");
    assert_eq!(text(t.cell(4, "Opp")), "GSW");
    assert_eq!(text(t.cell(6, "Opp")), "UNK");

    assert_eq!(t.cell(0, "MP"), Some(&Cell::Float(35.0)));
    assert_eq!(t.cell(1, "MP"), Some(&Cell::Float(32.25)));
    assert_eq!(t.cell(5, "MP"), Some(&Cell::Float(0.0)));

    let score = t.cell(1, "GmSc").and_then(Cell::as_f64).unwrap();
    assert!((score - 24.4).abs() < 1e-9, "game score {score}");
    assert_eq!(t.cell(6, "FG%"), Some(&Cell::Float(0.0)));
    assert_eq!(t.cell(1, "PTS"), Some(&Cell::Int(30)));

    assert_eq!(out.anomalies.unknown_opponents, 1);
    assert_eq!(out.anomalies.bad_durations, 1);
    assert_eq!(out.anomalies.bad_numbers, 1);
}

#[test]
fn missing_matchup_column_marks_every_opponent_unknown() {
    let raw = RawTable::new(
        vec!["PLAYER_NAME".into(), "TEAM_ABBREVIATION".into(), "GAME_DATE".into(), "PTS".into()],
        vec![
            vec![json!("A"), json!("LAL"), json!("2024-01-11"), json!(10)],
            vec![json!("B"), json!("BOS"), json!("2024-01-11"), json!("oops")],
        ],
    );
    let out = normalize_as_of(&raw, None, day(2024, 1, 20));
    assert_eq!(out.table.columns, vec!["Player", "Tm", "Opp", "PTS", "Data", "GmSc"]);
    assert!(out.table.column_values("Opp").all(|c| c.render() == "UNK"));
    assert_eq!(out.table.cell(1, "PTS"), Some(&Cell::Int(0)));
    // Not every box-score count is present, so no game score can be derived.
    assert!(out.table.column_values("GmSc").all(|c| *c == Cell::Float(0.0)));
}

#[test]
fn unparseable_dates_are_dropped_only_when_filtering() {
    let raw = RawTable::new(
        vec!["PLAYER_NAME".into(), "GAME_DATE".into()],
        vec![vec![json!("A"), json!("someday")], vec![json!("B"), json!("2024-01-11")]],
    );
    let unfiltered = normalize_as_of(&raw, None, day(2024, 1, 20));
    assert_eq!(unfiltered.table.len(), 2);
    assert_eq!(text(unfiltered.table.cell(0, "Data")), "Unknown");

    let window = DateWindow::between(day(2024, 1, 1), day(2024, 1, 31));
    let filtered = normalize_as_of(&raw, Some(&window), day(2024, 1, 20));
    assert_eq!(filtered.table.len(), 1);
    assert_eq!(filtered.anomalies.bad_dates, 1);
}

#[test]
fn summary_profiles_the_batch() {
    let out = normalize_as_of(&fixture_table(), None, day(2024, 1, 20));
    let summary = summarize(&out.table);
    assert_eq!(summary.rows, 7);
    assert_eq!(summary.first_date.as_deref(), Some("2024-01-10"));
    assert_eq!(summary.last_date.as_deref(), Some("2024-01-13"));
    assert_eq!(summary.players, 6);
    assert_eq!(summary.teams, 6);
    assert_eq!(summary.unknown_opponents, 1);
    assert_eq!(summary.top_opponents.len(), 5);
}

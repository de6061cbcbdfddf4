use std::fs;
use std::path::PathBuf;

use serde_json::json;

use nba_gamelog::stats_api::parse_league_game_log_json;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_league_game_log_fixture() {
    let raw = read_fixture("leaguegamelog.json");
    let table = parse_league_game_log_json(&raw).expect("fixture should parse");
    assert_eq!(table.len(), 7);
    assert_eq!(table.headers.len(), 32);

    let name = table.column_index("PLAYER_NAME").unwrap();
    let matchup = table.column_index("MATCHUP").unwrap();
    assert_eq!(table.rows[1][name], json!("LeBron James"));
    assert_eq!(table.rows[1][matchup], json!("BOS @ LAL"));
    assert!(table.rows[6][matchup].is_null());
}

#[test]
fn game_log_null_is_empty() {
    assert!(parse_league_game_log_json("null").expect("null should parse").is_empty());
    assert!(parse_league_game_log_json("  ").expect("blank should parse").is_empty());
    assert!(
        parse_league_game_log_json(r#"{"resultSets":[]}"#)
            .expect("no result sets should parse")
            .is_empty()
    );
}

#[test]
fn game_log_garbage_is_an_error() {
    assert!(parse_league_game_log_json("<html>blocked</html>").is_err());
}

use nba_gamelog::matchup::{Opponent, extract_opponent};

const TEAMS: &[&str] = &["ATL", "BOS", "BKN", "CHA", "GSW", "LAC", "LAL", "NYK", "OKC", "PHX"];

fn team(code: &str) -> Opponent {
    Opponent::Team(code.to_string())
}

#[test]
fn away_matchups_resolve_from_either_side() {
    for away in TEAMS {
        for home in TEAMS.iter().filter(|h| *h != away) {
            let text = format!("{away} @ {home}");
            assert_eq!(extract_opponent(Some(&text), away), team(home), "{text}");
            assert_eq!(extract_opponent(Some(&text), home), team(away), "{text}");
        }
    }
}

#[test]
fn home_matchups_resolve_from_either_side() {
    for home in TEAMS {
        for away in TEAMS.iter().filter(|a| *a != home) {
            let text = format!("{home} vs. {away}");
            assert_eq!(extract_opponent(Some(&text), home), team(away), "{text}");
            assert_eq!(extract_opponent(Some(&text), away), team(home), "{text}");
        }
    }
}

#[test]
fn surrounding_whitespace_is_ignored() {
    assert_eq!(extract_opponent(Some("  GSW vs. LAC \n"), "LAC"), team("GSW"));
    assert_eq!(extract_opponent(Some("LAL @ BOS"), " LAL "), team("BOS"));
}

#[test]
fn unrecognized_separator_uses_code_scan() {
    assert_eq!(extract_opponent(Some("MIA at ORL"), "MIA"), team("ORL"));
    assert_eq!(extract_opponent(Some("MIA at ORL"), "ORL"), team("MIA"));
}

#[test]
fn mismatched_own_team_falls_back_to_first_other_code() {
    assert_eq!(extract_opponent(Some("GSW vs. LAC"), "SAC"), team("GSW"));
}

#[test]
fn nothing_usable_is_unknown() {
    assert_eq!(extract_opponent(None, "LAL"), Opponent::Unknown);
    assert_eq!(extract_opponent(Some(""), "LAL"), Opponent::Unknown);
    assert_eq!(extract_opponent(Some("garbage text"), "XXX"), Opponent::Unknown);
    assert_eq!(extract_opponent(Some("LAKERS @ CELTICS"), "LAL"), Opponent::Unknown);
}

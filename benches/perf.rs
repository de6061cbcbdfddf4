use std::hint::black_box;

use chrono::NaiveDate;
use criterion::{Criterion, criterion_group, criterion_main};
use serde_json::{Value, json};

use nba_gamelog::dataset::Dataset;
use nba_gamelog::matchup::extract_opponent;
use nba_gamelog::normalize::{DateWindow, normalize_as_of};
use nba_gamelog::schema::Schema;
use nba_gamelog::table::{Cell, RawTable};

const TEAMS: &[&str] = &["ATL", "BOS", "GSW", "LAC", "LAL", "MIA", "NYK", "PHX"];

fn sample_raw(rows: usize) -> RawTable {
    let headers = [
        "PLAYER_NAME", "TEAM_ABBREVIATION", "GAME_DATE", "MATCHUP", "WL", "MIN", "FGM", "FGA",
        "FG_PCT", "FTM", "FTA", "OREB", "DREB", "REB", "AST", "STL", "BLK", "TOV", "PF", "PTS",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    let data = (0..rows)
        .map(|i| {
            let team = TEAMS[i % TEAMS.len()];
            let opp = TEAMS[(i + 3) % TEAMS.len()];
            let day = 1 + (i / 40) % 28;
            vec![
                json!(format!("Player {}", i % 400)),
                json!(team),
                json!(format!("2024-02-{day:02}")),
                json!(if i % 2 == 0 {
                    format!("{team} @ {opp}")
                } else {
                    format!("{team} vs. {opp}")
                }),
                json!("W"),
                json!("31:12"),
                json!(9),
                json!(18),
                json!(0.5),
                json!(4),
                json!(5),
                json!(1),
                json!(6),
                json!(7),
                json!(5),
                json!(1),
                json!(1),
                json!(2),
                json!(3),
                json!(24),
            ]
        })
        .collect::<Vec<Vec<Value>>>();
    RawTable::new(headers, data)
}

fn bench_extract_opponent(c: &mut Criterion) {
    c.bench_function("extract_opponent", |b| {
        b.iter(|| {
            black_box(extract_opponent(black_box(Some("LAL @ BOS")), "BOS"));
            black_box(extract_opponent(black_box(Some("Lakers at BOS")), "LAL"));
        })
    });
}

fn bench_normalize(c: &mut Criterion) {
    let raw = sample_raw(5_000);
    let window = DateWindow::since(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap());
    let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    c.bench_function("normalize_5k_rows", |b| {
        b.iter(|| {
            let out = normalize_as_of(black_box(&raw), Some(&window), today);
            black_box(out.table.len());
        })
    });
}

fn bench_merge(c: &mut Criterion) {
    let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let existing = normalize_as_of(&sample_raw(20_000), None, today).table;
    let dataset = Dataset::from_rows(
        Schema::from_header(existing.columns.clone()),
        existing
            .rows
            .iter()
            .map(|r| r.iter().map(|c| Cell::Text(c.render())).collect())
            .collect(),
    )
    .unwrap();
    let incoming = normalize_as_of(&sample_raw(2_000), None, today).table;

    c.bench_function("merge_20k_plus_2k", |b| {
        b.iter(|| {
            let (merged, report) = dataset.clone().merge(black_box(&incoming));
            black_box((merged.len(), report.net_added()));
        })
    });
}

criterion_group!(benches, bench_extract_opponent, bench_normalize, bench_merge);
criterion_main!(benches);

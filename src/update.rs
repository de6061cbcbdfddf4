//! One update run: load the stored game log, fetch, normalize, merge, write.
//!
//! The regular-season and postseason entry points share this flow and only
//! differ in their [`FetchPlan`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use chrono::{Days, Local, NaiveDate};
use tracing::{info, warn};

use crate::dataset::{Dataset, MergeReport};
use crate::error::UpdateError;
use crate::normalize::{AnomalyCounts, BatchSummary, DateWindow, normalize_as_of, summarize};
use crate::season::{SeasonPhase, season_for_date};
use crate::stats_api::{GameLogRequest, GameLogSource};
use crate::table::Table;

/// Which games to pull from the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchPlan {
    /// Regular-season games after the latest stored date, up to today.
    SinceLastDate,
    /// Whole named phases, optionally from a given date on.
    Phases {
        phases: Vec<SeasonPhase>,
        since: Option<NaiveDate>,
    },
}

impl FetchPlan {
    pub fn postseason() -> Self {
        FetchPlan::Phases {
            phases: SeasonPhase::POSTSEASON.to_vec(),
            since: None,
        }
    }

    fn describe(&self) -> String {
        match self {
            FetchPlan::SinceLastDate => "regular season update".to_string(),
            FetchPlan::Phases { phases, .. } => phases
                .iter()
                .map(|p| p.label())
                .collect::<Vec<_>>()
                .join(" + "),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpdateOptions {
    pub csv_path: PathBuf,
    pub output_path: Option<PathBuf>,
    pub season: Option<String>,
    pub request_delay: Duration,
    pub today: NaiveDate,
}

impl UpdateOptions {
    pub fn new(csv_path: impl Into<PathBuf>) -> Self {
        Self {
            csv_path: csv_path.into(),
            output_path: None,
            season: None,
            request_delay: Duration::ZERO,
            today: Local::now().date_naive(),
        }
    }

    pub fn from_config(config: &crate::config::UpdateConfig) -> Self {
        Self {
            csv_path: config.csv_path.clone(),
            output_path: config.output_path.clone(),
            season: config.season.clone(),
            request_delay: config.request_delay,
            today: Local::now().date_naive(),
        }
    }

    fn write_path(&self) -> &PathBuf {
        self.output_path.as_ref().unwrap_or(&self.csv_path)
    }
}

#[derive(Debug, Clone)]
pub struct UpdateReport {
    pub season: String,
    pub written_to: PathBuf,
    pub stored_range: Option<(NaiveDate, NaiveDate)>,
    pub window: Option<DateWindow>,
    pub fetched_rows: usize,
    pub anomalies: AnomalyCounts,
    pub batch: BatchSummary,
    pub merge: MergeReport,
}

impl fmt::Display for UpdateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Season: {}", self.season)?;
        writeln!(f, "Written to: {}", self.written_to.display())?;
        if let Some((first, last)) = self.stored_range {
            writeln!(f, "Stored dates before update: {first} to {last}")?;
        }
        writeln!(f, "Provider rows fetched: {}", self.fetched_rows)?;
        writeln!(
            f,
            "Rows: {} -> {} ({:+} new, {} replaced)",
            self.merge.rows_before,
            self.merge.rows_after,
            self.merge.net_added(),
            self.merge.replaced
        )?;
        let batch = &self.batch;
        if let (Some(first), Some(last)) = (&batch.first_date, &batch.last_date) {
            writeln!(f, "New data: {first} to {last}")?;
        }
        writeln!(
            f,
            "Players: {}, teams: {}, opponents: {}",
            batch.players, batch.teams, batch.opponents
        )?;
        if !batch.top_opponents.is_empty() {
            let top = batch
                .top_opponents
                .iter()
                .map(|(team, n)| format!("{team}={n}"))
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(f, "Top opponents: {top}")?;
        }
        if batch.unknown_opponents > 0 {
            writeln!(f, "Unknown opponents: {}", batch.unknown_opponents)?;
        }
        if self.anomalies.total() > 0 {
            writeln!(f, "Row anomalies defaulted: {}", self.anomalies.total())?;
        }
        Ok(())
    }
}

pub fn run_update(
    source: &dyn GameLogSource,
    plan: &FetchPlan,
    opts: &UpdateOptions,
) -> Result<UpdateReport, UpdateError> {
    let dataset = load_dataset(&opts.csv_path)?;
    let stored_range = dataset.date_range();
    match stored_range {
        Some((first, last)) => info!(
            rows = dataset.len(),
            %first,
            %last,
            "loaded existing game log"
        ),
        None => info!(rows = dataset.len(), "loaded existing game log without dates"),
    }

    let season = opts
        .season
        .clone()
        .unwrap_or_else(|| season_for_date(opts.today));

    let (requests, window) = match plan {
        FetchPlan::SinceLastDate => {
            let start = stored_range.and_then(|(_, last)| last.checked_add_days(Days::new(1)));
            let window = DateWindow {
                start,
                end: Some(opts.today),
            };
            match start {
                Some(start) => info!(%start, end = %opts.today, "fetching games since last stored date"),
                None => warn!("no stored dates; fetching the whole season"),
            }
            (
                vec![GameLogRequest::players(&season, SeasonPhase::RegularSeason)],
                Some(window),
            )
        }
        FetchPlan::Phases { phases, since } => (
            phases
                .iter()
                .map(|phase| GameLogRequest::players(&season, *phase))
                .collect::<Vec<_>>(),
            since.map(DateWindow::since),
        ),
    };

    let mut incoming: Option<Table> = None;
    let mut anomalies = AnomalyCounts::default();
    let mut fetched_rows = 0usize;

    for (idx, request) in requests.iter().enumerate() {
        if idx > 0 && !opts.request_delay.is_zero() {
            thread::sleep(opts.request_delay);
        }
        let context = request.describe();
        info!(request = %context, "fetching game log");
        let raw = source
            .fetch_game_log(request)
            .map_err(|source| UpdateError::Fetch {
                context: context.clone(),
                source,
            })?;
        fetched_rows += raw.len();
        info!(request = %context, rows = raw.len(), "game log received");

        let normalized = normalize_as_of(&raw, window.as_ref(), opts.today);
        accumulate(&mut anomalies, &normalized.anomalies);
        if normalized.table.is_empty() {
            warn!(request = %context, "no rows to merge for this request");
            continue;
        }
        let conformed = dataset.conform(&normalized.table);
        match incoming.as_mut() {
            Some(table) => table.rows.extend(conformed.rows),
            None => incoming = Some(conformed),
        }
    }

    let Some(incoming) = incoming else {
        return Err(UpdateError::EmptyFetch {
            context: format!("{season} {}", plan.describe()),
        });
    };

    if anomalies.total() > 0 {
        warn!(
            unknown_opponents = anomalies.unknown_opponents,
            bad_durations = anomalies.bad_durations,
            bad_numbers = anomalies.bad_numbers,
            bad_dates = anomalies.bad_dates,
            "row anomalies replaced with defaults"
        );
    }

    let batch = summarize(&incoming);
    let (merged, merge) = dataset.merge(&incoming);
    info!(
        before = merge.rows_before,
        after = merge.rows_after,
        added = merge.net_added(),
        "merged game log"
    );

    let written_to = opts.write_path().clone();
    merged
        .save(&written_to)
        .map_err(|source| UpdateError::Persistence {
            path: written_to.clone(),
            source,
        })?;
    info!(path = %written_to.display(), "dataset written");

    Ok(UpdateReport {
        season,
        written_to,
        stored_range,
        window,
        fetched_rows,
        anomalies,
        batch,
        merge,
    })
}

fn load_dataset(path: &Path) -> Result<Dataset, UpdateError> {
    if !path.exists() {
        return Err(UpdateError::MissingDataset {
            path: path.to_path_buf(),
        });
    }
    Dataset::load(path).map_err(|source| UpdateError::DatasetRead {
        path: path.to_path_buf(),
        source,
    })
}

fn accumulate(total: &mut AnomalyCounts, batch: &AnomalyCounts) {
    total.unknown_opponents += batch.unknown_opponents;
    total.bad_durations += batch.bad_durations;
    total.bad_numbers += batch.bad_numbers;
    total.bad_dates += batch.bad_dates;
    total.outside_window += batch.outside_window;
}

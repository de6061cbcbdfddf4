use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::normalize::{DATE_FORMAT, parse_date};
use crate::schema::{DATE, KEY_COLUMNS, Schema};
use crate::table::{Cell, Table};

/// The persisted game log: authoritative schema plus every stored row.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    schema: Schema,
    rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub rows_before: usize,
    pub incoming_rows: usize,
    pub rows_after: usize,
    /// Incoming keys that were already present among the stored rows.
    pub replaced: usize,
}

impl MergeReport {
    /// Net growth after dedup; negative only if the stored file held duplicates.
    pub fn net_added(&self) -> i64 {
        self.rows_after as i64 - self.rows_before as i64
    }
}

impl Dataset {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }

    pub fn from_rows(schema: Schema, rows: Vec<Vec<Cell>>) -> Result<Self> {
        if let Some(bad) = rows.iter().position(|r| r.len() != schema.len()) {
            return Err(anyhow!(
                "row {bad} has {} cells, schema has {} columns",
                rows[bad].len(),
                schema.len()
            ));
        }
        ensure_key_columns(&schema)?;
        Ok(Self { schema, rows })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .with_context(|| format!("open dataset {}", path.display()))?;
        let header = reader
            .headers()
            .with_context(|| format!("read dataset header {}", path.display()))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect::<Vec<_>>();
        let schema = Schema::from_header(header);
        ensure_key_columns(&schema)?;
        let date_idx = schema.index_of(DATE);
        let key_idx = key_indices(&schema);

        let mut rows = Vec::new();
        let mut unparsed_dates = 0usize;
        for (line, record) in reader.records().enumerate() {
            let record = record.with_context(|| format!("read dataset row {}", line + 1))?;
            let mut row = record.iter().map(Cell::text).collect::<Vec<_>>();
            for idx in key_idx.iter().flatten() {
                if let Some(Cell::Text(value)) = row.get_mut(*idx) {
                    let trimmed = value.trim();
                    if trimmed.len() != value.len() {
                        *value = trimmed.to_string();
                    }
                }
            }
            if let Some(idx) = date_idx {
                let normalized = row[idx].as_text().and_then(parse_date);
                match normalized {
                    Some(date) => row[idx] = Cell::Text(date.format(DATE_FORMAT).to_string()),
                    None => unparsed_dates += 1,
                }
            }
            rows.push(row);
        }
        if unparsed_dates > 0 {
            warn!(
                path = %path.display(),
                unparsed_dates,
                "dataset rows with unparseable dates kept verbatim"
            );
        }
        debug!(path = %path.display(), rows = rows.len(), "loaded dataset");

        Ok(Self { schema, rows })
    }

    /// Writes the whole table to `<path>.tmp`, then renames it over `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("create dataset dir {}", parent.display()))?;
        }
        let tmp = tmp_path(path);
        {
            let mut writer = csv::Writer::from_path(&tmp)
                .with_context(|| format!("create {}", tmp.display()))?;
            writer
                .write_record(self.schema.names())
                .context("write dataset header")?;
            for row in &self.rows {
                writer
                    .write_record(row.iter().map(Cell::render))
                    .context("write dataset row")?;
            }
            writer.flush().context("flush dataset")?;
        }
        if let Err(err) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(err)
                .with_context(|| format!("swap {} into {}", tmp.display(), path.display()));
        }
        Ok(())
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Earliest and latest parseable game date.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let idx = self.schema.index_of(DATE)?;
        let mut dates = self
            .rows
            .iter()
            .filter_map(|row| row.get(idx)?.as_text().and_then(parse_date));
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }

    /// Reshape `incoming` onto this dataset's columns: missing columns get
    /// their kind's default, extra columns are dropped.
    pub fn conform(&self, incoming: &Table) -> Table {
        let sources = self
            .schema
            .columns()
            .iter()
            .map(|spec| incoming.column_index(&spec.name))
            .collect::<Vec<_>>();
        let mut out = Table::new(self.schema.names().map(str::to_string).collect());
        out.rows = incoming
            .rows
            .iter()
            .map(|row| {
                self.schema
                    .columns()
                    .iter()
                    .zip(&sources)
                    .map(|(spec, src)| {
                        src.and_then(|i| row.get(i).cloned())
                            .unwrap_or_else(|| spec.default_cell())
                    })
                    .collect()
            })
            .collect();
        out
    }

    /// Appends `incoming` after the stored rows and keeps only the last row
    /// of each (player, date, team) key, in original relative order.
    pub fn merge(self, incoming: &Table) -> (Dataset, MergeReport) {
        let rows_before = self.rows.len();
        let conformed = self.conform(incoming);
        let Dataset { schema, mut rows } = self;
        rows.extend(conformed.rows);

        let key_idx = key_indices(&schema);
        let key_of = |row: &[Cell]| row_key(&key_idx, row);

        let mut last_seen: HashMap<[String; 3], usize> = HashMap::with_capacity(rows.len());
        for (pos, row) in rows.iter().enumerate() {
            last_seen.insert(key_of(row), pos);
        }
        let stored_keys = rows[..rows_before]
            .iter()
            .map(|row| key_of(row))
            .collect::<HashSet<_>>();
        let replaced = rows[rows_before..]
            .iter()
            .map(|row| key_of(row))
            .filter(|key| stored_keys.contains(key))
            .collect::<HashSet<_>>()
            .len();

        let rows = rows
            .into_iter()
            .enumerate()
            .filter(|(pos, row)| last_seen.get(&key_of(row)) == Some(pos))
            .map(|(_, row)| row)
            .collect::<Vec<_>>();

        let report = MergeReport {
            rows_before,
            incoming_rows: incoming.len(),
            rows_after: rows.len(),
            replaced,
        };
        (Dataset { schema, rows }, report)
    }
}

fn ensure_key_columns(schema: &Schema) -> Result<()> {
    let missing = KEY_COLUMNS
        .iter()
        .filter(|name| schema.index_of(name).is_none())
        .copied()
        .collect::<Vec<_>>();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(anyhow!("dataset is missing key columns {missing:?}"))
    }
}

fn key_indices(schema: &Schema) -> [Option<usize>; 3] {
    KEY_COLUMNS.map(|name| schema.index_of(name))
}

/// Key cells are compared trimmed so padding in either source cannot split a key.
fn row_key(key_idx: &[Option<usize>; 3], row: &[Cell]) -> [String; 3] {
    key_idx.map(|idx| {
        idx.and_then(|i| row.get(i))
            .map(|cell| cell.render().trim().to_string())
            .unwrap_or_default()
    })
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

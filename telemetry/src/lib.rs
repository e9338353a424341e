//! Columnar capture of per-tick simulation events.
//!
//! Engines emit plain `tracing` events (one per tick per target); a custom
//! subscriber turns each target into a growing table whose schema is
//! whatever fields the events carry. Tables convert to polars DataFrames
//! for analysis and persist as parquet per run.
//!
//! # Usage
//!
//! ```ignore
//! // In engine code:
//! tracing::info!(target: "government", tick, gdp, inflation_rate);
//!
//! // In a test or analysis run:
//! telemetry::install();
//! // ... drive the simulation ...
//! let frames = telemetry::take_frames();
//! let govt = &frames["government"];
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Record};
use tracing::{Event, Id, Metadata, Subscriber};

// === Columns & Tables ===

/// One column of homogeneously-typed values.
#[derive(Debug, Clone)]
pub enum ColumnData {
    U64(Vec<u64>),
    I64(Vec<i64>),
    F64(Vec<f64>),
    Bool(Vec<bool>),
    Str(Vec<String>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::U64(v) => v.len(),
            ColumnData::I64(v) => v.len(),
            ColumnData::F64(v) => v.len(),
            ColumnData::Bool(v) => v.len(),
            ColumnData::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Extend with type-default values until the column holds `rows` entries.
    fn fill_to(&mut self, rows: usize) {
        match self {
            ColumnData::U64(v) => v.resize(rows, 0),
            ColumnData::I64(v) => v.resize(rows, 0),
            ColumnData::F64(v) => v.resize(rows, 0.0),
            ColumnData::Bool(v) => v.resize(rows, false),
            ColumnData::Str(v) => v.resize(rows, String::new()),
        }
    }
}

/// A table built up one event-row at a time. Columns appear lazily the
/// first time an event carries the field; earlier rows are back-filled
/// with defaults so every column always ends a row at the same length.
#[derive(Debug, Clone, Default)]
pub struct EventTable {
    pub columns: HashMap<String, ColumnData>,
    pub rows: usize,
}

impl EventTable {
    /// Pad every column up to the current row count.
    fn align(&mut self) {
        for col in self.columns.values_mut() {
            if col.len() < self.rows {
                col.fill_to(self.rows);
            }
        }
    }

    fn column_or(&mut self, name: &str, make: impl FnOnce() -> ColumnData) -> &mut ColumnData {
        self.columns.entry(name.to_string()).or_insert_with(make)
    }
}

/// Everything captured on this thread so far, keyed by event target.
#[derive(Debug, Clone, Default)]
pub struct Capture {
    pub tables: HashMap<String, EventTable>,
}

thread_local! {
    static CAPTURE: RefCell<Capture> = RefCell::default();
}

// === Subscriber ===

/// Writes one event's fields into the table, creating columns as needed.
struct FieldWriter<'a> {
    table: &'a mut EventTable,
    // rows already committed; new columns are back-filled to this depth
    base_rows: usize,
}

impl Visit for FieldWriter<'_> {
    fn record_u64(&mut self, field: &Field, value: u64) {
        let base = self.base_rows;
        if let ColumnData::U64(v) = self.table.column_or(field.name(), || ColumnData::U64(vec![0; base])) {
            v.push(value);
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        let base = self.base_rows;
        if let ColumnData::I64(v) = self.table.column_or(field.name(), || ColumnData::I64(vec![0; base])) {
            v.push(value);
        }
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        let base = self.base_rows;
        if let ColumnData::F64(v) = self.table.column_or(field.name(), || ColumnData::F64(vec![0.0; base])) {
            v.push(value);
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        let base = self.base_rows;
        if let ColumnData::Bool(v) =
            self.table.column_or(field.name(), || ColumnData::Bool(vec![false; base]))
        {
            v.push(value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        let base = self.base_rows;
        if let ColumnData::Str(v) =
            self.table.column_or(field.name(), || ColumnData::Str(vec![String::new(); base]))
        {
            v.push(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.record_str(field, &format!("{:?}", value));
    }
}

/// Tracing subscriber that captures info-level events into [`EventTable`]s.
pub struct CaptureSubscriber;

impl Subscriber for CaptureSubscriber {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        // Events only; spans carry no tick data here
        metadata.is_event() && *metadata.level() <= tracing::Level::INFO
    }

    fn new_span(&self, _span: &Attributes<'_>) -> Id {
        Id::from_u64(1)
    }

    fn record(&self, _span: &Id, _values: &Record<'_>) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let target = event.metadata().target().to_string();

        CAPTURE.with(|c| {
            let mut capture = c.borrow_mut();
            let table = capture.tables.entry(target).or_default();

            table.align();
            let base_rows = table.rows;
            event.record(&mut FieldWriter { table, base_rows });
            table.rows += 1;
            // Columns the event did not mention still need this row
            table.align();
        });
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}

/// Install the capture subscriber as the global default. Safe to call
/// repeatedly; later calls are ignored once a default is set.
pub fn install() {
    let _ = tracing::subscriber::set_global_default(CaptureSubscriber);
}

/// Take everything captured on this thread, leaving the capture empty.
pub fn take() -> Capture {
    CAPTURE.with(|c| std::mem::take(&mut *c.borrow_mut()))
}

/// Discard everything captured on this thread.
pub fn reset() {
    CAPTURE.with(|c| *c.borrow_mut() = Capture::default());
}

// === Polars Conversion ===

use polars::prelude::*;

impl EventTable {
    /// Materialize as a polars DataFrame.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let columns: Vec<Column> = self
            .columns
            .iter()
            .map(|(name, col)| match col {
                ColumnData::U64(v) => Column::new(name.into(), v),
                ColumnData::I64(v) => Column::new(name.into(), v),
                ColumnData::F64(v) => Column::new(name.into(), v),
                ColumnData::Bool(v) => Column::new(name.into(), v),
                ColumnData::Str(v) => Column::new(name.into(), v),
            })
            .collect();

        DataFrame::new(columns)
    }
}

impl Capture {
    /// Convert every table, skipping any that fail to materialize.
    pub fn to_dataframes(&self) -> HashMap<String, DataFrame> {
        self.tables
            .iter()
            .filter_map(|(name, table)| table.to_dataframe().ok().map(|df| (name.clone(), df)))
            .collect()
    }
}

/// Take this thread's capture and convert it to DataFrames by target.
pub fn take_frames() -> HashMap<String, DataFrame> {
    take().to_dataframes()
}

/// Write each DataFrame as `{dir}/{target}.parquet`.
pub fn write_parquet(frames: &mut HashMap<String, DataFrame>, dir: &Path) -> PolarsResult<()> {
    std::fs::create_dir_all(dir).map_err(|e| PolarsError::IO {
        error: e.into(),
        msg: None,
    })?;
    for (name, df) in frames.iter_mut() {
        let file = std::fs::File::create(dir.join(format!("{}.parquet", name))).map_err(|e| {
            PolarsError::IO {
                error: e.into(),
                msg: None,
            }
        })?;
        ParquetWriter::new(file).finish(df)?;
    }
    Ok(())
}

// === Run Recorder ===

/// Split a unix timestamp into (month, day, hour, minute), UTC.
fn civil_parts(t: std::time::SystemTime) -> (u32, u32, u32, u32) {
    let secs = t
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let hour = (secs % 86400) / 3600;
    let minute = (secs % 3600) / 60;

    let mut days = secs / 86400;
    let mut year = 1970u64;
    let is_leap = |y: u64| y % 4 == 0 && (y % 100 != 0 || y % 400 == 0);
    while days >= if is_leap(year) { 366 } else { 365 } {
        days -= if is_leap(year) { 366 } else { 365 };
        year += 1;
    }
    let month_lengths = [
        31,
        if is_leap(year) { 29 } else { 28 },
        31, 30, 31, 30, 31, 31, 30, 31, 30, 31,
    ];
    let mut month = 1u32;
    for len in month_lengths {
        if days < len {
            break;
        }
        days -= len;
        month += 1;
    }
    (month, days as u32 + 1, hour as u32, minute as u32)
}

fn run_stamp(t: std::time::SystemTime) -> String {
    let (month, day, hour, minute) = civil_parts(t);
    format!("{:02}{:02}_{:02}{:02}", month, day, hour, minute)
}

/// Keep directory names shell-friendly.
fn sanitize(name: &str) -> String {
    let s: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    s.chars().take(48).collect()
}

/// RAII capture for one simulation run.
///
/// Creation resets the thread capture and installs the subscriber; drop
/// writes `{parent}/{MMDD_HHMM}_{name}/*.parquet` plus a `_ready` sentinel
/// so downstream watchers know the directory is complete. Call
/// [`RunRecorder::frames`] before drop to analyze in-process.
///
/// ```ignore
/// let mut rec = telemetry::RunRecorder::new("data/runs", "baseline");
/// // ... run simulation ...
/// let frames = rec.frames();
/// summarize(&frames["government"]);
/// ```
pub struct RunRecorder {
    dir: PathBuf,
    name: String,
    frames: Option<HashMap<String, DataFrame>>,
}

impl RunRecorder {
    pub fn new(parent: impl Into<PathBuf>, name: &str) -> Self {
        let name = format!("{}_{}", run_stamp(std::time::SystemTime::now()), sanitize(name));
        let dir = parent.into().join(&name);
        reset();
        install();
        Self {
            dir,
            name,
            frames: None,
        }
    }

    /// Drain the capture into DataFrames; repeated calls return the same
    /// cached frames.
    pub fn frames(&mut self) -> &HashMap<String, DataFrame> {
        self.frames.get_or_insert_with(take_frames)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Drop for RunRecorder {
    fn drop(&mut self) {
        let mut frames = self.frames.take().unwrap_or_else(take_frames);
        if frames.is_empty() {
            return;
        }
        if let Err(e) = write_parquet(&mut frames, &self.dir) {
            eprintln!("RunRecorder({}): parquet write failed: {}", self.name, e);
            return;
        }
        let sentinel = self.dir.join("_ready");
        match std::fs::File::create(&sentinel) {
            Ok(_) => eprintln!(
                "RunRecorder: {} tables written to {}",
                frames.len(),
                self.dir.display()
            ),
            Err(e) => eprintln!("RunRecorder({}): sentinel write failed: {}", self.name, e),
        }
    }
}

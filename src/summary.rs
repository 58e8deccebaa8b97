//! Hourly status summary of per-instrument bar logs.
//!
//! Produces the `ticker,group,ok,closed,error,fix,empty` CSV the dashboard
//! renders: one row per instrument per hour, counting bar records by status.

use std::collections::BTreeMap;
use std::io::BufRead;

use chrono::{DateTime, Duration, NaiveDateTime, Timelike, Utc};

/// Column order of the summary CSV after `ticker,group`.
pub const STATUS_COLUMNS: [&str; 5] = ["ok", "closed", "error", "fix", "empty"];

/// Upper bound on hourly rows emitted per instrument.
pub const MAX_HOURS: usize = 300;

const BUCKET_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Status of a single bar record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Closed,
    Error,
    Fix,
    Empty,
}

/// Per-hour record counts, one field per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub ok: u64,
    pub closed: u64,
    pub error: u64,
    pub fix: u64,
    pub empty: u64,
}

impl StatusCounts {
    pub fn add(&mut self, status: Status) {
        match status {
            Status::Ok => self.ok += 1,
            Status::Closed => self.closed += 1,
            Status::Error => self.error += 1,
            Status::Fix => self.fix += 1,
            Status::Empty => self.empty += 1,
        }
    }

    fn as_array(&self) -> [u64; 5] {
        [self.ok, self.closed, self.error, self.fix, self.empty]
    }
}

/// Bar log of one instrument, bucketed by UTC hour.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstrumentLog {
    pub ticker: String,
    pub hours: BTreeMap<NaiveDateTime, StatusCounts>,
    pub skipped: usize,
}

fn truthy(value: Option<&serde_json::Value>) -> bool {
    match value {
        None | Some(serde_json::Value::Null) => false,
        Some(serde_json::Value::Bool(b)) => *b,
        Some(serde_json::Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(serde_json::Value::String(s)) => !s.is_empty(),
        Some(serde_json::Value::Array(a)) => !a.is_empty(),
        Some(serde_json::Value::Object(o)) => !o.is_empty(),
    }
}

/// Classifies a bar record. The first matching flag wins:
/// `error`, `closed`, `empty`, then `fix`/`late`; anything else is `ok`.
pub fn classify(record: &serde_json::Value) -> Status {
    if truthy(record.get("error")) {
        Status::Error
    } else if truthy(record.get("closed")) {
        Status::Closed
    } else if truthy(record.get("empty")) {
        Status::Empty
    } else if truthy(record.get("fix")) || truthy(record.get("late")) {
        Status::Fix
    } else {
        Status::Ok
    }
}

/// Start of the UTC hour containing `dt`.
pub fn floor_hour(dt: NaiveDateTime) -> NaiveDateTime {
    dt.date().and_hms_opt(dt.hour(), 0, 0).unwrap_or(dt)
}

fn record_time(record: &serde_json::Value) -> Option<NaiveDateTime> {
    let dt = record.get("dt")?.as_str()?;
    NaiveDateTime::parse_from_str(dt, BUCKET_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(dt, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

impl InstrumentLog {
    /// Reads JSON lines from `reader`, bucketing each record by its `dt` hour.
    ///
    /// Lines that are not JSON, or have no parseable `dt`, are counted in
    /// `skipped` and left out of every hour. They are not tallied as `error`:
    /// a line that cannot be decoded has no time and so no hour to count it
    /// in. Blank lines are ignored.
    pub fn from_reader<R: BufRead>(ticker: &str, reader: R) -> std::io::Result<Self> {
        let mut log = InstrumentLog {
            ticker: ticker.to_string(),
            ..Default::default()
        };
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let Ok(record) = serde_json::from_str::<serde_json::Value>(&line) else {
                log.skipped += 1;
                continue;
            };
            let Some(dt) = record_time(&record) else {
                log.skipped += 1;
                continue;
            };
            log.hours
                .entry(floor_hour(dt))
                .or_default()
                .add(classify(&record));
        }
        Ok(log)
    }

    /// Loads a `.jsonl` file; the ticker is the file stem.
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let ticker = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| anyhow::anyhow!("Invalid file name: {}", path.display()))?;
        let file = std::fs::File::open(path)?;
        let log = Self::from_reader(ticker, std::io::BufReader::new(file))?;
        if log.skipped > 0 {
            tracing::warn!(
                ticker,
                skipped = log.skipped,
                "lines without a usable record were skipped"
            );
        }
        anyhow::Ok(log)
    }

    pub fn counts_at(&self, hour: NaiveDateTime) -> StatusCounts {
        self.hours.get(&hour).copied().unwrap_or_default()
    }
}

/// Hour buckets from `end - hours` (floored) through the hour containing `end`,
/// at most [`MAX_HOURS`] of them.
///
/// # Errors
/// * If `end - hours` falls outside the representable date range.
pub fn hour_window(end: NaiveDateTime, hours: u32) -> anyhow::Result<Vec<NaiveDateTime>> {
    let start = end
        .checked_sub_signed(Duration::hours(i64::from(hours)))
        .ok_or_else(|| {
            anyhow::anyhow!("Look-back of {} hours before {} is out of range", hours, end)
        })?;
    let mut current = floor_hour(start);
    let mut window = Vec::new();
    while window.len() < MAX_HOURS && current <= end {
        window.push(current);
        match current.checked_add_signed(Duration::hours(1)) {
            Some(next) => current = next,
            None => break,
        }
    }
    anyhow::Ok(window)
}

/// Writes the summary CSV for `logs` over the window ending at `end`.
///
/// Instruments are written in ticker order, hours in chronological order.
pub fn write_summary<W: std::io::Write>(
    writer: W,
    logs: &[InstrumentLog],
    end: NaiveDateTime,
    hours: u32,
) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    let mut header = vec!["ticker", "group"];
    header.extend(STATUS_COLUMNS);
    writer.write_record(&header)?;

    let mut sorted: Vec<&InstrumentLog> = logs.iter().collect();
    sorted.sort_by(|a, b| a.ticker.cmp(&b.ticker));

    let window = hour_window(end, hours)?;
    for log in sorted {
        for hour in &window {
            let counts = log.counts_at(*hour);
            let mut record = vec![log.ticker.clone(), hour.format(BUCKET_FORMAT).to_string()];
            record.extend(counts.as_array().iter().map(|c| c.to_string()));
            writer.write_record(&record)?;
        }
    }
    writer.flush()?;
    anyhow::Ok(())
}

/// Summarizes every `.jsonl` file in `input_dir` into the CSV at `output`.
///
/// # Arguments
/// * `input_dir` - Directory of per-instrument JSON-lines logs.
/// * `output` - Path of the CSV to write.
/// * `end` - Last instant covered; `None` means now.
/// * `hours` - Length of the look-back window.
///
/// # Returns
/// * `anyhow::Result<usize>` - Number of instruments summarized.
pub fn summarize_dir<P: AsRef<std::path::Path>, Q: AsRef<std::path::Path>>(
    input_dir: P,
    output: Q,
    end: Option<NaiveDateTime>,
    hours: u32,
) -> anyhow::Result<usize> {
    let paths = std::fs::read_dir(input_dir.as_ref())?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "jsonl"))
        .collect::<Vec<_>>();

    let logs = paths
        .iter()
        .map(InstrumentLog::load)
        .collect::<anyhow::Result<Vec<_>>>()?;

    let end = end.unwrap_or_else(|| Utc::now().naive_utc());
    let file = std::fs::File::create(output.as_ref())?;
    write_summary(file, &logs, end, hours)?;
    tracing::info!(instruments = logs.len(), hours, "summary written");
    anyhow::Ok(logs.len())
}

/// Parses an `--end` argument: `YYYY-MM-DD HH:MM:SS` (UTC) or RFC 3339.
pub fn parse_end(s: &str) -> Result<NaiveDateTime, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc).naive_utc());
    }
    NaiveDateTime::parse_from_str(s, BUCKET_FORMAT)
        .map_err(|e| format!("Not a valid date-time: {}", e))
}

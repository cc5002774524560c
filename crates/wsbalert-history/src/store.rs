use std::collections::{BTreeMap, HashSet};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use wsbalert_core::{HistoryWriteMode, MentionRecord, TickerMention, TickerSeries};

use crate::HistoryError;

/// All stored records grouped by ticker, each series ordered by date.
pub type HistorySnapshot = BTreeMap<String, TickerSeries>;

/// CSV history file holding one row per `(date, ticker)` observation.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every stored record, grouped by ticker.
    ///
    /// A missing file yields an empty snapshot. Rows that fail to parse are
    /// skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Io`] if the file exists but cannot be read.
    pub fn load(&self) -> Result<HistorySnapshot, HistoryError> {
        let rows = self.read_rows()?;
        Ok(group_by_ticker(rows))
    }

    /// Write today's mentions using the given mode.
    ///
    /// # Errors
    ///
    /// See [`HistoryStore::append`] and [`HistoryStore::upsert`].
    pub fn record_day(
        &self,
        mentions: &[TickerMention],
        date: NaiveDate,
        mode: HistoryWriteMode,
    ) -> Result<usize, HistoryError> {
        match mode {
            HistoryWriteMode::Append => self.append(mentions, date),
            HistoryWriteMode::Upsert => self.upsert(mentions, date),
        }
    }

    /// Append one row per mention for `date`, creating the file with a
    /// header if it does not exist yet. No deduplication is performed.
    ///
    /// Returns the number of rows written.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Io`] if the file or its parent directory
    /// cannot be created or written, or [`HistoryError::Csv`] on encoding
    /// failure.
    pub fn append(&self, mentions: &[TickerMention], date: NaiveDate) -> Result<usize, HistoryError> {
        let needs_header = !self.has_content()?;
        self.ensure_parent_dir()?;

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        if !needs_header && !ends_with_newline(&mut file).map_err(|e| self.io_error(e))? {
            file.write_all(b"\n").map_err(|e| self.io_error(e))?;
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        for mention in mentions {
            writer.serialize(mention.to_record(date))?;
        }
        self.finish(writer)?;

        tracing::debug!(
            path = %self.path.display(),
            rows = mentions.len(),
            %date,
            "appended history rows"
        );
        Ok(mentions.len())
    }

    /// Write `mentions` for `date`, replacing any rows already stored for the
    /// same `(date, ticker)` key. Every other row, including rows that do not
    /// parse, is copied through unchanged and keeps its relative order.
    ///
    /// If `mentions` lists a ticker more than once, the last entry wins.
    /// Returns the number of rows written for `date`.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Io`] if the file cannot be read, written or
    /// replaced, or [`HistoryError::Csv`] on encoding failure.
    pub fn upsert(&self, mentions: &[TickerMention], date: NaiveDate) -> Result<usize, HistoryError> {
        let incoming = last_per_ticker(mentions, date);
        let tickers: HashSet<&str> = incoming.iter().map(|r| r.ticker.as_str()).collect();

        let existing = self.read_raw_rows()?;
        let before = existing.len();
        let kept: Vec<csv::ByteRecord> = existing
            .into_iter()
            .filter(|row| !row_key_matches(row, date, &tickers))
            .collect();
        let replaced = before - kept.len();

        self.ensure_parent_dir()?;
        let tmp_path = self.tmp_path();
        let file = File::create(&tmp_path).map_err(|e| HistoryError::Io {
            path: tmp_path.clone(),
            source: e,
        })?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(file);
        writer.write_record(HEADER)?;
        for row in &kept {
            writer.write_byte_record(row)?;
        }
        for record in &incoming {
            writer.serialize(record)?;
        }
        self.finish(writer)?;

        fs::rename(&tmp_path, &self.path).map_err(|e| self.io_error(e))?;

        tracing::debug!(
            path = %self.path.display(),
            rows = incoming.len(),
            replaced,
            kept = kept.len(),
            %date,
            "upserted history rows"
        );
        Ok(incoming.len())
    }

    /// Every data row as raw bytes, without interpreting them.
    fn read_raw_rows(&self) -> Result<Vec<csv::ByteRecord>, HistoryError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);
        let rows = reader.byte_records().collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn read_rows(&self) -> Result<Vec<MentionRecord>, HistoryError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut rows = Vec::new();
        for result in reader.deserialize::<MentionRecord>() {
            match result {
                Ok(record) => rows.push(record),
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        "skipping malformed history row"
                    );
                }
            }
        }
        Ok(rows)
    }

    fn has_content(&self) -> Result<bool, HistoryError> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len() > 0),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn ensure_parent_dir(&self) -> Result<(), HistoryError> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent).map_err(|e| HistoryError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })
            }
            _ => Ok(()),
        }
    }

    /// Flush buffered rows and sync the file to disk.
    fn finish(&self, writer: csv::Writer<File>) -> Result<(), HistoryError> {
        let file = writer
            .into_inner()
            .map_err(|e| self.io_error(e.into_error()))?;
        file.sync_all().map_err(|e| self.io_error(e))
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: io::Error) -> HistoryError {
        HistoryError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

const HEADER: [&str; 3] = ["date", "ticker", "mentions"];

/// Whether `row` holds a `(date, ticker)` key that is being rewritten.
fn row_key_matches(row: &csv::ByteRecord, date: NaiveDate, tickers: &HashSet<&str>) -> bool {
    let field = |i: usize| row.get(i).and_then(|raw| std::str::from_utf8(raw).ok());
    let (Some(raw_date), Some(raw_ticker)) = (field(0), field(1)) else {
        return false;
    };
    NaiveDate::parse_from_str(raw_date.trim(), "%Y-%m-%d").is_ok_and(|d| d == date)
        && tickers.contains(raw_ticker.trim())
}

fn ends_with_newline(file: &mut File) -> io::Result<bool> {
    if file.seek(SeekFrom::End(0))? == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0_u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

fn group_by_ticker(rows: Vec<MentionRecord>) -> HistorySnapshot {
    let mut grouped: BTreeMap<String, Vec<MentionRecord>> = BTreeMap::new();
    for row in rows {
        grouped.entry(row.ticker.clone()).or_default().push(row);
    }
    grouped
        .into_iter()
        .map(|(ticker, records)| {
            let series = TickerSeries::from_records(ticker.clone(), records);
            (ticker, series)
        })
        .collect()
}

/// Convert mentions to records, keeping only the last entry per ticker.
/// Surviving entries keep their relative input order.
fn last_per_ticker(mentions: &[TickerMention], date: NaiveDate) -> Vec<MentionRecord> {
    let mut seen = HashSet::new();
    let mut records: Vec<MentionRecord> = mentions
        .iter()
        .rev()
        .filter(|m| seen.insert(m.ticker.as_str()))
        .map(|m| m.to_record(date))
        .collect();
    records.reverse();
    records
}

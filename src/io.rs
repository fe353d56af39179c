use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::pipeline::ScoredRecord;
use crate::record::{BattingLine, Handedness, Position, Record};

/// One input row, every cell kept as text until parsed leniently.
///
/// Field names are the canonical column names produced by
/// [`canonical_headers`].
#[derive(Debug, Default, Deserialize)]
struct RawRow {
    #[serde(default, rename = "Player")]
    player: Option<String>,
    #[serde(default, rename = "B")]
    bats: Option<String>,
    #[serde(default, rename = "Age")]
    age: Option<String>,
    #[serde(default, rename = "PO")]
    position: Option<String>,
    #[serde(default, rename = "Level")]
    level: Option<String>,
    #[serde(default, rename = "PA")]
    pa: Option<String>,
    #[serde(default, rename = "AB")]
    ab: Option<String>,
    #[serde(default, rename = "R")]
    r: Option<String>,
    #[serde(default, rename = "H")]
    h: Option<String>,
    #[serde(default, rename = "2B")]
    doubles: Option<String>,
    #[serde(default, rename = "3B")]
    triples: Option<String>,
    #[serde(default, rename = "HR")]
    hr: Option<String>,
    #[serde(default, rename = "RBI")]
    rbi: Option<String>,
    #[serde(default, rename = "BB")]
    bb: Option<String>,
    #[serde(default, rename = "SO")]
    so: Option<String>,
    #[serde(default, rename = "SB")]
    sb: Option<String>,
    #[serde(default, rename = "CS")]
    cs: Option<String>,
}

/// Canonical column name and the spellings accepted for it (lowercase).
const COLUMNS: &[(&str, &[&str])] = &[
    ("Player", &["player", "name"]),
    ("B", &["b", "bats"]),
    ("Age", &["age"]),
    ("PO", &["po", "pos"]),
    ("Level", &["level", "lev"]),
    ("PA", &["pa"]),
    ("AB", &["ab"]),
    ("R", &["r"]),
    ("H", &["h"]),
    ("2B", &["2b"]),
    ("3B", &["3b"]),
    ("HR", &["hr"]),
    ("RBI", &["rbi"]),
    ("BB", &["bb"]),
    ("SO", &["so", "k"]),
    ("SB", &["sb"]),
    ("CS", &["cs"]),
];

fn canonical_column(header: &str) -> Option<&'static str> {
    let header = header.trim().to_ascii_lowercase();
    COLUMNS
        .iter()
        .find(|(_, spellings)| spellings.contains(&header.as_str()))
        .map(|(name, _)| *name)
}

/// Rename known spellings to their canonical column. When several columns
/// map to the same name only the first is used; later ones are blanked.
fn canonical_headers(headers: &csv::StringRecord) -> csv::StringRecord {
    let mut seen: Vec<&str> = Vec::new();
    headers
        .iter()
        .map(|header| match canonical_column(header) {
            Some(name) if !seen.contains(&name) => {
                seen.push(name);
                name
            }
            Some(_) => "",
            None => header,
        })
        .collect()
}

/// Parse a numeric cell; blanks, junk and non-finite values read as missing.
fn parse_number(cell: &Option<String>) -> Option<f64> {
    let text = cell.as_deref()?.trim().replace(',', "");
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_text(cell: Option<String>) -> Option<String> {
    cell.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl RawRow {
    fn into_record(self, source: &str) -> Record {
        let line = BattingLine {
            plate_appearances: parse_number(&self.pa),
            at_bats: parse_number(&self.ab),
            hits: parse_number(&self.h),
            doubles: parse_number(&self.doubles),
            triples: parse_number(&self.triples),
            home_runs: parse_number(&self.hr),
            runs: parse_number(&self.r),
            rbi: parse_number(&self.rbi),
            walks: parse_number(&self.bb),
            strikeouts: parse_number(&self.so),
            steals: parse_number(&self.sb),
            caught_stealing: parse_number(&self.cs),
        };
        Record {
            bats: self.bats.as_deref().and_then(Handedness::parse),
            position: self.position.as_deref().and_then(Position::parse),
            age: parse_number(&self.age),
            name: parse_text(self.player),
            level: parse_text(self.level),
            source: Some(source.to_string()),
            line,
        }
    }
}

/// Read records from CSV text, tagging each with `source`.
///
/// Rows that cannot be decoded are skipped with a warning.
pub fn read_csv<R: Read>(reader: R, source: &str) -> Result<Vec<Record>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .with_context(|| format!("Failed to read header of {}", source))?;
    let headers = canonical_headers(headers);
    csv_reader.set_headers(headers);

    let mut records = Vec::new();
    for (idx, row) in csv_reader.deserialize::<RawRow>().enumerate() {
        match row {
            Ok(raw) => records.push(raw.into_record(source)),
            Err(e) => warn!(source, row = idx + 1, "Skipping malformed row: {}", e),
        }
    }
    debug!(source, rows = records.len(), "Read input file");
    Ok(records)
}

/// Every `*.csv` file in `dir`, sorted by path.
pub fn input_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("Input directory not found: {}", dir.display());
    }
    let dir_str = dir
        .to_str()
        .with_context(|| format!("Input directory is not valid UTF-8: {}", dir.display()))?;
    let pattern = Path::new(&glob::Pattern::escape(dir_str))
        .join("*.csv")
        .to_string_lossy()
        .into_owned();

    let mut files: Vec<PathBuf> = glob::glob(&pattern)
        .with_context(|| format!("Invalid input pattern {}", pattern))?
        .filter_map(|entry| entry.ok())
        .collect();
    files.sort();
    Ok(files)
}

/// Read every CSV file in `dir`; each record's provenance is its file name.
pub fn read_dir(dir: &Path) -> Result<Vec<Record>> {
    let files = input_files(dir)?;
    if files.is_empty() {
        anyhow::bail!("No CSV files found in {}", dir.display());
    }

    let mut records = Vec::new();
    for path in &files {
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let file = File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        records.extend(read_csv(file, &source)?);
    }

    info!(files = files.len(), records = records.len(), "Loaded input");
    Ok(records)
}

/// Flat output row shared by the CSV and JSON writers.
#[derive(Debug, Serialize, PartialEq)]
pub struct OutputRow<'a> {
    #[serde(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Player")]
    pub player: &'a str,
    #[serde(rename = "B")]
    pub bats: Option<&'static str>,
    #[serde(rename = "Age")]
    pub age: Option<f64>,
    #[serde(rename = "PO")]
    pub position: Option<&'static str>,
    #[serde(rename = "AB")]
    pub at_bats: Option<f64>,
    #[serde(rename = "Level")]
    pub level: Option<&'a str>,
    #[serde(rename = "Team")]
    pub team: Option<&'a str>,
    #[serde(rename = "Source")]
    pub source: Option<&'a str>,
    pub perf: f64,
    #[serde(rename = "use")]
    pub usage: f64,
    pub combined: f64,
}

/// Rows for `ranked`, numbered from 1 in the given order.
pub fn output_rows(ranked: &[ScoredRecord]) -> Vec<OutputRow<'_>> {
    ranked
        .iter()
        .enumerate()
        .map(|(idx, r)| OutputRow {
            rank: idx + 1,
            player: r.name(),
            bats: r.record.bats.map(|b| b.as_str()),
            age: r.record.age(),
            position: r.record.position.map(|p| p.as_str()),
            at_bats: r.record.line.at_bats_reported(),
            level: r.tier.as_ref().map(|t| t.as_str()),
            team: r.record.team(),
            source: r.record.source.as_deref(),
            perf: r.performance,
            usage: r.usage,
            combined: r.composite,
        })
        .collect()
}

/// Write ranked records as CSV with a header row.
pub fn write_csv<W: Write>(writer: W, ranked: &[ScoredRecord]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in output_rows(ranked) {
        csv_writer.serialize(row).context("Failed to write CSV row")?;
    }
    csv_writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}

/// Replace `path` with `contents` without ever leaving a partial file.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(contents)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    file.commit()
        .with_context(|| format!("Failed to save {}", path.display()))?;
    Ok(())
}

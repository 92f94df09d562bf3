//! Directory scanner for discovering terminal exports and the curve sets they cover

use crate::curves::CurveSet;
use crate::error::Result;
use crate::parser::parse_csv;
use crate::schema::RawSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// What one export file contains
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSummary {
    /// Full path to the file
    pub path: PathBuf,
    /// Tickers with a rate column, in header order
    pub tickers: Vec<String>,
    /// Number of data rows
    pub rows: usize,
    /// Built-in curve sets whose tickers are all present
    pub curve_sets: Vec<CurveSet>,
}

/// Result of scanning directories
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanResult {
    /// Root directories that were scanned
    pub roots: Vec<PathBuf>,
    /// Exports that parsed, sorted by path
    pub exports: Vec<ExportSummary>,
    /// Files that could not be read, with the reason
    pub skipped: Vec<(PathBuf, String)>,
}

impl ScanResult {
    /// Total number of CSV files found
    pub fn total_files(&self) -> usize {
        self.exports.len() + self.skipped.len()
    }

    /// Exports that can build the given curve set
    pub fn exports_for(&self, set: CurveSet) -> Vec<&ExportSummary> {
        self.exports
            .iter()
            .filter(|e| e.curve_sets.contains(&set))
            .collect()
    }
}

/// Scan one or more directories for CSV exports
pub fn scan_directory<P: AsRef<Path>>(roots: &[P]) -> Result<ScanResult> {
    let mut paths = Vec::new();

    for root in roots {
        for entry in WalkDir::new(root.as_ref()).follow_links(true) {
            let entry = entry?;
            let path = entry.path();

            // Only process CSV files
            if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "csv") {
                paths.push(path.to_path_buf());
            }
        }
    }
    paths.sort();

    let mut result = ScanResult {
        roots: roots.iter().map(|r| r.as_ref().to_path_buf()).collect(),
        ..Default::default()
    };

    for path in paths {
        match summarize(&path) {
            Ok(summary) => {
                debug!(path = %path.display(), tickers = summary.tickers.len(), "found export");
                result.exports.push(summary);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping file");
                result.skipped.push((path, e.to_string()));
            }
        }
    }

    Ok(result)
}

fn summarize(path: &Path) -> Result<ExportSummary> {
    let table = parse_csv(path)?;
    let schema = RawSchema::from_table(&table)?;

    let mut curve_sets = Vec::new();
    for set in CurveSet::all() {
        if schema.covers(&set.mapping()?) {
            curve_sets.push(set);
        }
    }

    Ok(ExportSummary {
        path: path.to_path_buf(),
        tickers: schema.instruments.iter().map(|i| i.ticker.clone()).collect(),
        rows: table.row_count(),
        curve_sets,
    })
}

//! Batch alignment jobs
//!
//! A job file is JSON listing export files, the curve set (or custom mapping
//! file) to align each with, and where to write the results.

use crate::aligner::{align_with, AlignMode, AlignOptions};
use crate::curves::CurveSet;
use crate::error::{Error, Result};
use crate::export::{export_table, ExportFormat};
use crate::maturity::MaturityMapping;
use crate::parser::parse_csv;
use crate::table::DateFormats;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// One export to align
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobInput {
    /// Raw export CSV
    pub path: PathBuf,
    /// Built-in curve set to use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve: Option<CurveSet>,
    /// Custom mapping file to use instead of a curve set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<PathBuf>,
    /// Output file name, relative to the job's output directory
    pub output: PathBuf,
}

impl JobInput {
    /// The mapping this input asks for
    pub fn resolve_mapping(&self) -> Result<MaturityMapping> {
        match (&self.curve, &self.mapping) {
            (Some(curve), None) => curve.mapping(),
            (None, Some(path)) => MaturityMapping::load(path),
            _ => Err(Error::InvalidJobInput(self.path.clone())),
        }
    }
}

/// A job file containing multiple alignment operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignJob {
    /// Output directory for aligned tables
    pub output_dir: PathBuf,
    /// Alignment mode for every input
    #[serde(default)]
    pub mode: AlignMode,
    /// Output format for every input
    #[serde(default)]
    pub format: ExportFormat,
    /// Explicit chrono date format for the exports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
    /// Exports to align
    pub inputs: Vec<JobInput>,
}

impl AlignJob {
    /// Load a job file from JSON
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save the job file to JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Options shared by every input
    pub fn options(&self) -> AlignOptions {
        AlignOptions {
            mode: self.mode,
            date_formats: self
                .date_format
                .as_deref()
                .map(DateFormats::single)
                .unwrap_or_default(),
        }
    }
}

/// Outcome of running a job
#[derive(Debug, Clone, Default)]
pub struct JobReport {
    /// Files written, with their row counts
    pub written: Vec<(PathBuf, usize)>,
    /// Inputs that failed, with the reason
    pub errors: Vec<(PathBuf, String)>,
}

impl JobReport {
    /// Total rows written across all outputs
    pub fn total_rows(&self) -> usize {
        self.written.iter().map(|(_, rows)| rows).sum()
    }
}

/// Run every input of a job
///
/// A failing input is recorded in the report and the rest still run.
pub fn run_job(job: &AlignJob) -> Result<JobReport> {
    fs::create_dir_all(&job.output_dir)?;
    let options = job.options();
    let mut report = JobReport::default();

    for input in &job.inputs {
        match run_input(job, input, &options) {
            Ok(written) => {
                info!(input = %input.path.display(), output = %written.0.display(), rows = written.1, "job input done");
                report.written.push(written);
            }
            Err(e) => {
                warn!(input = %input.path.display(), error = %e, "job input failed");
                report.errors.push((input.path.clone(), e.to_string()));
            }
        }
    }

    Ok(report)
}

fn run_input(job: &AlignJob, input: &JobInput, options: &AlignOptions) -> Result<(PathBuf, usize)> {
    let mapping = input.resolve_mapping()?;
    let raw = parse_csv(&input.path)?;
    let aligned = align_with(&raw, &mapping, options)?;

    let output = job.output_dir.join(&input.output);
    export_table(&aligned, job.format, &output)?;
    Ok((output, aligned.row_count()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::{Currency, TermStructure};

    const EXPORT: &str = "\
,A Curncy,,B Curncy
2020-01-01,1.0,2020-01-01,2.0
2020-01-02,1.1,2020-01-03,2.2
";

    #[test]
    fn test_job_json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.json");

        let job = AlignJob {
            output_dir: PathBuf::from("out"),
            mode: AlignMode::Legacy,
            format: ExportFormat::Json,
            date_format: None,
            inputs: vec![JobInput {
                path: PathBuf::from("usd.csv"),
                curve: Some(CurveSet::new(Currency::Usd, TermStructure::SevenMaturities)),
                mapping: None,
                output: PathBuf::from("usd_7.json"),
            }],
        };
        job.save(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"usd_ts_7_mat\""));
        assert!(text.contains("\"legacy\""));

        assert_eq!(AlignJob::load(&path).unwrap(), job);
    }

    #[test]
    fn test_job_defaults() {
        let json = r#"{"output_dir": "out", "inputs": []}"#;
        let job: AlignJob = serde_json::from_str(json).unwrap();

        assert_eq!(job.mode, AlignMode::Strict);
        assert_eq!(job.format, ExportFormat::Csv);
        assert_eq!(job.options().date_formats, DateFormats::default());
    }

    #[test]
    fn test_input_needs_one_mapping_source() {
        let input = JobInput {
            path: PathBuf::from("x.csv"),
            curve: None,
            mapping: None,
            output: PathBuf::from("x_out.csv"),
        };
        assert!(matches!(input.resolve_mapping(), Err(Error::InvalidJobInput(_))));
    }

    #[test]
    fn test_run_job() {
        let dir = tempfile::tempdir().unwrap();
        let export = dir.path().join("export.csv");
        fs::write(&export, EXPORT).unwrap();

        let mapping_path = dir.path().join("mapping.json");
        MaturityMapping::from_pairs(&[("A", "2Y"), ("B", "5Y")])
            .unwrap()
            .save(&mapping_path)
            .unwrap();

        let job = AlignJob {
            output_dir: dir.path().join("out"),
            mode: AlignMode::Strict,
            format: ExportFormat::Csv,
            date_format: None,
            inputs: vec![
                JobInput {
                    path: export.clone(),
                    curve: None,
                    mapping: Some(mapping_path),
                    output: PathBuf::from("aligned.csv"),
                },
                JobInput {
                    path: export.clone(),
                    curve: Some(CurveSet::new(Currency::Gbp, TermStructure::SevenMaturities)),
                    mapping: None,
                    output: PathBuf::from("gbp.csv"),
                },
            ],
        };

        let report = run_job(&job).unwrap();

        assert_eq!(report.written.len(), 1);
        assert_eq!(report.total_rows(), 1);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].1.contains("BPSWS2"));

        let text = fs::read_to_string(dir.path().join("out").join("aligned.csv")).unwrap();
        assert_eq!(text, "dates,2Y,5Y\n2020-01-01,1,2\n");
    }
}

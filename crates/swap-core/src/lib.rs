//! swap-core: Core library for aligning terminal swap-rate exports
//!
//! This library provides functionality to:
//! - Parse wide CSV exports of alternating (date, rate) column pairs
//! - Map `<TICKER> Curncy` columns to maturity labels, with built-in GBP, EUR
//!   and USD curve sets
//! - Align every instrument onto the dates they all share
//! - Export aligned tables, run batch jobs and scan directories of exports

pub mod aligner;
pub mod curves;
pub mod error;
pub mod export;
pub mod job;
pub mod maturity;
pub mod parser;
pub mod scanner;
pub mod schema;
pub mod table;

pub use aligner::{align, align_with, shared_dates, AlignMode, AlignOptions, AlignedRow, AlignedTable};
pub use curves::{Currency, CurveSet, TermStructure};
pub use error::{Error, Result};
pub use export::{export_table, write_csv, write_json, write_table, ExportFormat};
pub use job::{run_job, AlignJob, JobInput, JobReport};
pub use maturity::{MappingEntry, Maturity, MaturityMapping, TenorUnit};
pub use parser::{parse_csv, parse_csv_str};
pub use scanner::{scan_directory, ExportSummary, ScanResult};
pub use schema::{InstrumentColumns, InstrumentSeries, Observation, RawSchema};
pub use table::{CellValue, Column, DateFormats, RawTable, Row};

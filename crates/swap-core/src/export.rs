//! Writers for aligned tables

use crate::aligner::AlignedTable;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

/// Date format used in exported `dates` columns
pub const OUTPUT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Output file format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    /// File extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(Error::UnknownFormat(s.to_string())),
        }
    }
}

/// Write `dates,<maturity...>` rows; missing rates are empty cells
pub fn write_csv<W: Write>(table: &AlignedTable, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let csv_err = |e: csv::Error| Error::Csv {
        path: table.source.clone(),
        source: e,
    };

    csv_writer.write_record(table.column_names()).map_err(csv_err)?;

    for row in &table.rows {
        let mut record = Vec::with_capacity(table.column_count());
        record.push(row.date.format(OUTPUT_DATE_FORMAT).to_string());
        record.extend(
            row.rates
                .iter()
                .map(|r| r.map(|v| v.to_string()).unwrap_or_default()),
        );
        csv_writer.write_record(&record).map_err(csv_err)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write the table as pretty JSON
pub fn write_json<W: Write>(table: &AlignedTable, mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, table)?;
    writeln!(writer)?;
    Ok(())
}

/// Write a table to `writer` in the given format
pub fn write_table<W: Write>(table: &AlignedTable, format: ExportFormat, writer: W) -> Result<()> {
    match format {
        ExportFormat::Csv => write_csv(table, writer),
        ExportFormat::Json => write_json(table, writer),
    }
}

/// Write a table to a file
pub fn export_table<P: AsRef<Path>>(table: &AlignedTable, format: ExportFormat, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    write_table(table, format, &mut writer)?;
    writer.flush()?;
    Ok(())
}

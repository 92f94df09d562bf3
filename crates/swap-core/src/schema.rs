//! Column schema for paired (date, rate) exports
//!
//! Rate columns are named `<TICKER> Curncy`; the column immediately before
//! each rate column holds that instrument's observation dates. The schema is
//! built once from the header row, so a mapping can be checked against it
//! before any alignment work starts.

use crate::error::{Error, Result};
use crate::maturity::{Maturity, MaturityMapping};
use crate::table::{CellValue, Column, DateFormats, RawTable, Row};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Suffix the terminal appends to every rate column name
pub const RATE_SUFFIX: &str = " Curncy";

/// Where one instrument's columns live in the raw table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentColumns {
    /// Ticker, without the suffix
    pub ticker: String,
    /// Index of the date column
    pub date_index: usize,
    /// Index of the rate column
    pub rate_index: usize,
}

/// Ticker -> column pair lookup for one raw table
#[derive(Debug, Clone, Serialize)]
pub struct RawSchema {
    /// Instruments in header order
    pub instruments: Vec<InstrumentColumns>,
    #[serde(skip)]
    by_ticker: HashMap<String, usize>,
}

impl RawSchema {
    /// Build the schema from a table's header row
    pub fn from_table(table: &RawTable) -> Result<Self> {
        Self::from_columns(&table.columns)
    }

    /// Build the schema from column definitions
    pub fn from_columns(columns: &[Column]) -> Result<Self> {
        let mut instruments = Vec::new();
        let mut by_ticker = HashMap::new();

        for column in columns {
            let Some(ticker) = column.name.strip_suffix(RATE_SUFFIX) else {
                continue;
            };
            let ticker = ticker.trim();

            if column.index == 0 {
                return Err(Error::MissingDateColumn {
                    column: column.name.clone(),
                    index: column.index,
                });
            }
            if by_ticker.contains_key(ticker) {
                return Err(Error::DuplicateColumn(ticker.to_string()));
            }

            by_ticker.insert(ticker.to_string(), instruments.len());
            instruments.push(InstrumentColumns {
                ticker: ticker.to_string(),
                date_index: column.index - 1,
                rate_index: column.index,
            });
        }

        Ok(Self {
            instruments,
            by_ticker,
        })
    }

    /// Number of instruments found
    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    /// Whether no rate columns were found
    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    /// Look up a ticker's columns
    pub fn get(&self, ticker: &str) -> Option<&InstrumentColumns> {
        self.by_ticker.get(ticker).map(|&i| &self.instruments[i])
    }

    /// Whether every ticker of the mapping has a column pair
    pub fn covers(&self, mapping: &MaturityMapping) -> bool {
        mapping.tickers().all(|t| self.by_ticker.contains_key(t))
    }

    /// Resolve every mapped ticker, in mapping order
    ///
    /// All missing tickers are reported in one error.
    pub fn resolve<'a>(
        &'a self,
        mapping: &'a MaturityMapping,
    ) -> Result<Vec<(&'a InstrumentColumns, &'a Maturity)>> {
        let mut resolved = Vec::with_capacity(mapping.len());
        let mut missing = Vec::new();

        for entry in mapping.entries() {
            match self.get(&entry.ticker) {
                Some(columns) => resolved.push((columns, &entry.maturity)),
                None => missing.push(entry.ticker.clone()),
            }
        }

        if !missing.is_empty() {
            return Err(Error::MissingTickers(missing));
        }
        Ok(resolved)
    }

    /// Read one instrument's observations from the table
    ///
    /// Rows with an empty date cell are skipped; the shorter series of an
    /// export are padded with blanks.
    pub fn series(
        &self,
        table: &RawTable,
        instrument: &InstrumentColumns,
        formats: &DateFormats,
    ) -> Result<InstrumentSeries> {
        let mut observations = Vec::new();

        for (row_idx, row) in table.rows.iter().enumerate() {
            let date_cell = row.get(instrument.date_index).unwrap_or(&CellValue::Empty);
            if date_cell.is_empty() {
                continue;
            }

            let date = formats.parse(date_cell).ok_or_else(|| Error::InvalidDate {
                column: instrument.date_index,
                row: row_idx + 1,
                value: date_cell.to_string_value(),
            })?;
            let rate = row.get(instrument.rate_index).and_then(CellValue::as_rate);

            observations.push(Observation {
                date,
                rate,
                row: row_idx,
            });
        }

        Ok(InstrumentSeries {
            ticker: instrument.ticker.clone(),
            observations,
        })
    }
}

/// One (date, rate) point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    /// None when the terminal had no quote
    pub rate: Option<f64>,
    /// Data row this came from (0-based)
    pub row: usize,
}

/// An instrument's observations in file order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSeries {
    pub ticker: String,
    pub observations: Vec<Observation>,
}

impl InstrumentSeries {
    /// Number of observations
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the series has no observations
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Distinct observation dates
    pub fn dates(&self) -> BTreeSet<NaiveDate> {
        self.observations.iter().map(|o| o.date).collect()
    }

    /// Earliest and latest date, if any
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.observations.iter().map(|o| o.date).min()?;
        let last = self.observations.iter().map(|o| o.date).max()?;
        Some((first, last))
    }
}

impl RawTable {
    /// Copy of this table keeping, per instrument, only rows dated in `dates`
    ///
    /// Each (date, rate) pair is compacted independently, so pairs may end up
    /// with different lengths; the shorter ones are padded with empty cells.
    pub fn restrict_to_dates(
        &self,
        dates: &BTreeSet<NaiveDate>,
        formats: &DateFormats,
    ) -> Result<RawTable> {
        let schema = RawSchema::from_table(self)?;

        let mut columns = Vec::with_capacity(schema.len() * 2);
        let mut pairs: Vec<Vec<(CellValue, CellValue)>> = Vec::with_capacity(schema.len());

        for instrument in &schema.instruments {
            let series = schema.series(self, instrument, formats)?;
            let kept = series
                .observations
                .iter()
                .filter(|o| dates.contains(&o.date))
                .map(|o| {
                    let row = &self.rows[o.row];
                    (
                        row.get(instrument.date_index).cloned().unwrap_or(CellValue::Empty),
                        row.get(instrument.rate_index).cloned().unwrap_or(CellValue::Empty),
                    )
                })
                .collect();

            let date_name = self.columns[instrument.date_index].name.clone();
            let rate_name = self.columns[instrument.rate_index].name.clone();
            columns.push(Column::new(date_name, columns.len()));
            columns.push(Column::new(rate_name, columns.len()));
            pairs.push(kept);
        }

        let row_count = pairs.iter().map(Vec::len).max().unwrap_or(0);
        let rows = (0..row_count)
            .map(|i| {
                let cells = pairs
                    .iter()
                    .flat_map(|pair| match pair.get(i) {
                        Some((date, rate)) => [date.clone(), rate.clone()],
                        None => [CellValue::Empty, CellValue::Empty],
                    })
                    .collect();
                Row::new(cells)
            })
            .collect();

        Ok(RawTable {
            columns,
            rows,
            source_path: self.source_path.clone(),
        })
    }
}

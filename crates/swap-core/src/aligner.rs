//! Alignment engine: wide (date, rate) pairs -> one row per shared date

use crate::error::{Error, Result};
use crate::maturity::{Maturity, MaturityMapping};
use crate::schema::{InstrumentSeries, RawSchema};
use crate::table::{DateFormats, RawTable};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info};

/// Name of the date column in aligned output
pub const DATES_COLUMN: &str = "dates";

/// How rows from different instruments are matched up
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignMode {
    /// Intersect the dates of every mapped instrument and join by date value
    #[default]
    Strict,
    /// Positional join over the first ticker's unfiltered series
    ///
    /// Shared dates are taken over every date column in the table, mapped or
    /// not. Each later instrument is filtered to those dates and joined by
    /// row position, so the output keeps the first instrument's first `k`
    /// rows where `k` is the shortest filtered length. Kept to reproduce
    /// older outputs. Unlike the older outputs, rows with a blank date cell
    /// are dropped from the first series rather than held in place.
    Legacy,
}

impl fmt::Display for AlignMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignMode::Strict => write!(f, "strict"),
            AlignMode::Legacy => write!(f, "legacy"),
        }
    }
}

impl FromStr for AlignMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(AlignMode::Strict),
            "legacy" => Ok(AlignMode::Legacy),
            _ => Err(Error::UnknownMode(s.to_string())),
        }
    }
}

/// Options for `align_with`
#[derive(Debug, Clone, Default)]
pub struct AlignOptions {
    pub mode: AlignMode,
    pub date_formats: DateFormats,
}

/// One output row: a date and one rate per maturity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedRow {
    pub date: NaiveDate,
    /// Rates in mapping order; None where the terminal had no quote
    pub rates: Vec<Option<f64>>,
}

/// Date-aligned rates by maturity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedTable {
    /// Maturity labels, one per rate column
    pub maturities: Vec<Maturity>,
    /// Ticker behind each rate column
    pub tickers: Vec<String>,
    /// Rows in output order
    pub rows: Vec<AlignedRow>,
    /// Export the table was built from
    pub source: PathBuf,
}

impl AlignedTable {
    /// Number of columns, counting `dates`
    pub fn column_count(&self) -> usize {
        1 + self.maturities.len()
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Header names: `dates` followed by maturity labels
    pub fn column_names(&self) -> Vec<&str> {
        std::iter::once(DATES_COLUMN)
            .chain(self.maturities.iter().map(Maturity::label))
            .collect()
    }

    /// The `dates` column
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }

    /// A rate column by maturity label
    pub fn column(&self, label: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.maturities.iter().position(|m| m.label() == label)?;
        Some(self.rows.iter().map(|r| r.rates[idx]).collect())
    }
}

/// Align a raw export using the default (strict) options
pub fn align(raw: &RawTable, mapping: &MaturityMapping) -> Result<AlignedTable> {
    align_with(raw, mapping, &AlignOptions::default())
}

/// Align a raw export into one `dates` column plus one column per maturity
///
/// Fails before producing any output if a mapped ticker has no column pair.
pub fn align_with(
    raw: &RawTable,
    mapping: &MaturityMapping,
    options: &AlignOptions,
) -> Result<AlignedTable> {
    let schema = RawSchema::from_table(raw)?;
    let resolved = schema.resolve(mapping)?;

    let mut series = Vec::with_capacity(resolved.len());
    for (columns, maturity) in &resolved {
        let s = schema.series(raw, columns, &options.date_formats)?;
        debug!(ticker = %s.ticker, maturity = %maturity, observations = s.len(), "loaded series");
        series.push(s);
    }

    let rows = match options.mode {
        AlignMode::Strict => strict_rows(&series)?,
        AlignMode::Legacy => {
            let mut all_dates = Vec::with_capacity(schema.len());
            for instrument in &schema.instruments {
                all_dates.push(schema.series(raw, instrument, &options.date_formats)?.dates());
            }
            legacy_rows(&series, &intersect(all_dates))
        }
    };

    let table = AlignedTable {
        maturities: mapping.maturities(),
        tickers: mapping.tickers().map(str::to_string).collect(),
        rows,
        source: raw.source_path.clone(),
    };

    info!(
        source = %table.source.display(),
        mode = %options.mode,
        rows = table.row_count(),
        columns = table.column_count(),
        "aligned export"
    );
    Ok(table)
}

/// Dates present in the series of every mapped instrument
pub fn shared_dates(
    raw: &RawTable,
    mapping: &MaturityMapping,
    formats: &DateFormats,
) -> Result<BTreeSet<NaiveDate>> {
    let schema = RawSchema::from_table(raw)?;
    let mut sets = Vec::with_capacity(mapping.len());
    for (columns, _) in schema.resolve(mapping)? {
        sets.push(schema.series(raw, columns, formats)?.dates());
    }
    Ok(intersect(sets))
}

fn intersect(sets: Vec<BTreeSet<NaiveDate>>) -> BTreeSet<NaiveDate> {
    let mut sets = sets.into_iter();
    let Some(first) = sets.next() else {
        return BTreeSet::new();
    };
    sets.fold(first, |acc, set| acc.intersection(&set).copied().collect())
}

fn strict_rows(series: &[InstrumentSeries]) -> Result<Vec<AlignedRow>> {
    let mut by_date = Vec::with_capacity(series.len());
    for s in series {
        let mut rates = BTreeMap::new();
        for obs in &s.observations {
            if rates.insert(obs.date, obs.rate).is_some() {
                return Err(Error::DuplicateDate {
                    ticker: s.ticker.clone(),
                    date: obs.date,
                });
            }
        }
        by_date.push(rates);
    }

    let shared = intersect(
        by_date
            .iter()
            .map(|rates: &BTreeMap<NaiveDate, Option<f64>>| rates.keys().copied().collect())
            .collect(),
    );
    debug!(shared = shared.len(), instruments = series.len(), "shared dates");

    // Seed with the first instrument, then join the rest on date
    let mut rows: Vec<AlignedRow> = shared
        .iter()
        .map(|&date| AlignedRow {
            date,
            rates: Vec::with_capacity(series.len()),
        })
        .collect();

    for rates in &by_date {
        for row in &mut rows {
            row.rates.push(rates.get(&row.date).copied().flatten());
        }
    }

    Ok(rows)
}

fn legacy_rows(series: &[InstrumentSeries], shared: &BTreeSet<NaiveDate>) -> Vec<AlignedRow> {
    let Some((seed, rest)) = series.split_first() else {
        return Vec::new();
    };

    let mut rows: Vec<AlignedRow> = seed
        .observations
        .iter()
        .map(|obs| AlignedRow {
            date: obs.date,
            rates: vec![obs.rate],
        })
        .collect();

    for s in rest {
        let filtered: Vec<Option<f64>> = s
            .observations
            .iter()
            .filter(|obs| shared.contains(&obs.date))
            .map(|obs| obs.rate)
            .collect();

        rows.truncate(filtered.len());
        for (row, rate) in rows.iter_mut().zip(filtered) {
            row.rates.push(rate);
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_csv_str;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const THREE_INSTRUMENTS: &str = "\
,A Curncy,,B Curncy,,C Curncy
2020-01-01,1.0,2020-01-01,2.0,2020-01-01,3.0
2020-01-02,1.1,2020-01-03,2.2,2020-01-02,3.1
2020-01-03,1.2,,,2020-01-03,3.2
";

    fn mapping() -> MaturityMapping {
        MaturityMapping::from_pairs(&[("A", "2Y"), ("B", "5Y"), ("C", "10Y")]).unwrap()
    }

    #[test]
    fn test_align_three_instruments() {
        let raw = parse_csv_str(THREE_INSTRUMENTS, "abc.csv").unwrap();
        let result = align(&raw, &mapping()).unwrap();

        assert_eq!(result.column_names(), vec!["dates", "2Y", "5Y", "10Y"]);
        assert_eq!(result.dates(), vec![date(2020, 1, 1), date(2020, 1, 3)]);
        assert_eq!(result.column("2Y").unwrap(), vec![Some(1.0), Some(1.2)]);
        assert_eq!(result.column("5Y").unwrap(), vec![Some(2.0), Some(2.2)]);
        assert_eq!(result.column("10Y").unwrap(), vec![Some(3.0), Some(3.2)]);
        assert_eq!(result.tickers, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_row_and_column_counts() {
        let raw = parse_csv_str(THREE_INSTRUMENTS, "abc.csv").unwrap();
        let mapping = mapping();
        let shared = shared_dates(&raw, &mapping, &DateFormats::default()).unwrap();
        let result = align(&raw, &mapping).unwrap();

        assert_eq!(result.row_count(), shared.len());
        assert_eq!(result.column_count(), 1 + mapping.len());
    }

    #[test]
    fn test_first_instrument_dates_are_intersected() {
        // A lacks 2020-01-02, which B and C both have
        let csv = "\
,A Curncy,,B Curncy,,C Curncy
2020-01-01,1.0,2020-01-01,2.0,2020-01-01,3.0
2020-01-03,1.2,2020-01-02,2.1,2020-01-02,3.1
,,2020-01-03,2.2,2020-01-03,3.2
";
        let raw = parse_csv_str(csv, "gap.csv").unwrap();
        let result = align(&raw, &mapping()).unwrap();

        assert_eq!(result.dates(), vec![date(2020, 1, 1), date(2020, 1, 3)]);
        assert_eq!(result.column("5Y").unwrap(), vec![Some(2.0), Some(2.2)]);
    }

    #[test]
    fn test_output_sorted_by_date() {
        let csv = "\
,A Curncy,,B Curncy
2020-01-03,1.2,2020-01-02,2.1
2020-01-01,1.0,2020-01-03,2.2
2020-01-02,1.1,2020-01-01,2.0
";
        let raw = parse_csv_str(csv, "unsorted.csv").unwrap();
        let mapping = MaturityMapping::from_pairs(&[("A", "2Y"), ("B", "5Y")]).unwrap();
        let result = align(&raw, &mapping).unwrap();

        assert_eq!(
            result.dates(),
            vec![date(2020, 1, 1), date(2020, 1, 2), date(2020, 1, 3)]
        );
        assert_eq!(result.column("5Y").unwrap(), vec![Some(2.0), Some(2.1), Some(2.2)]);
    }

    #[test]
    fn test_single_ticker_returns_seed() {
        let raw = parse_csv_str(THREE_INSTRUMENTS, "abc.csv").unwrap();
        let mapping = MaturityMapping::from_pairs(&[("A", "2Y")]).unwrap();
        let result = align(&raw, &mapping).unwrap();

        assert_eq!(result.column_names(), vec!["dates", "2Y"]);
        assert_eq!(
            result.dates(),
            vec![date(2020, 1, 1), date(2020, 1, 2), date(2020, 1, 3)]
        );
        assert_eq!(result.column("2Y").unwrap(), vec![Some(1.0), Some(1.1), Some(1.2)]);
    }

    #[test]
    fn test_mapping_order_sets_column_order() {
        let raw = parse_csv_str(THREE_INSTRUMENTS, "abc.csv").unwrap();
        let mapping = MaturityMapping::from_pairs(&[("C", "10Y"), ("A", "2Y")]).unwrap();
        let result = align(&raw, &mapping).unwrap();

        assert_eq!(result.column_names(), vec!["dates", "10Y", "2Y"]);
        assert_eq!(result.rows[0].rates, vec![Some(3.0), Some(1.0)]);
    }

    #[test]
    fn test_missing_ticker_fails_without_output() {
        let raw = parse_csv_str(THREE_INSTRUMENTS, "abc.csv").unwrap();
        let mapping = MaturityMapping::from_pairs(&[("A", "2Y"), ("Z", "30Y")]).unwrap();

        match align(&raw, &mapping) {
            Err(Error::MissingTickers(missing)) => assert_eq!(missing, vec!["Z"]),
            other => panic!("expected lookup error, got {:?}", other),
        }
    }

    #[test]
    fn test_prefiltered_input_gives_same_result() {
        let raw = parse_csv_str(THREE_INSTRUMENTS, "abc.csv").unwrap();
        let mapping = mapping();
        let formats = DateFormats::default();

        let first = align(&raw, &mapping).unwrap();
        let shared = shared_dates(&raw, &mapping, &formats).unwrap();
        let restricted = raw.restrict_to_dates(&shared, &formats).unwrap();
        let second = align(&restricted, &mapping).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_quotes_stay_missing() {
        let csv = "\
,A Curncy,,B Curncy
2020-01-01,1.0,2020-01-01,#N/A N/A
2020-01-02,,2020-01-02,2.1
";
        let raw = parse_csv_str(csv, "na.csv").unwrap();
        let mapping = MaturityMapping::from_pairs(&[("A", "2Y"), ("B", "5Y")]).unwrap();
        let result = align(&raw, &mapping).unwrap();

        assert_eq!(result.row_count(), 2);
        assert_eq!(result.rows[0].rates, vec![Some(1.0), None]);
        assert_eq!(result.rows[1].rates, vec![None, Some(2.1)]);
    }

    #[test]
    fn test_duplicate_date_is_error() {
        let csv = "\
,A Curncy,,B Curncy
2020-01-01,1.0,2020-01-01,2.0
2020-01-02,1.1,2020-01-01,2.1
";
        let raw = parse_csv_str(csv, "dup.csv").unwrap();
        let mapping = MaturityMapping::from_pairs(&[("A", "2Y"), ("B", "5Y")]).unwrap();

        match align(&raw, &mapping) {
            Err(Error::DuplicateDate { ticker, date: d }) => {
                assert_eq!(ticker, "B");
                assert_eq!(d, date(2020, 1, 1));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_two_digit_year_is_invalid_date() {
        let csv = ",A Curncy,,B Curncy\n01/02/20,1.0,01/02/20,2.0\n";
        let raw = parse_csv_str(csv, "short_year.csv").unwrap();
        let mapping = MaturityMapping::from_pairs(&[("A", "2Y"), ("B", "5Y")]).unwrap();

        match align(&raw, &mapping) {
            Err(Error::InvalidDate { column, value, .. }) => {
                assert_eq!(column, 0);
                assert_eq!(value, "01/02/20");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_no_shared_dates() {
        let csv = ",A Curncy,,B Curncy\n2020-01-01,1.0,2020-01-02,2.0\n";
        let raw = parse_csv_str(csv, "disjoint.csv").unwrap();
        let mapping = MaturityMapping::from_pairs(&[("A", "2Y"), ("B", "5Y")]).unwrap();
        let result = align(&raw, &mapping).unwrap();

        assert_eq!(result.row_count(), 0);
        assert_eq!(result.column_count(), 3);
    }

    #[test]
    fn test_legacy_reproduces_positional_join() {
        // Positional join keeps A's first two rows, so 2020-01-02 survives and
        // 2020-01-03 is dropped, with B's 2020-01-03 quote on the 01-02 row.
        let raw = parse_csv_str(THREE_INSTRUMENTS, "abc.csv").unwrap();
        let options = AlignOptions {
            mode: AlignMode::Legacy,
            ..Default::default()
        };
        let result = align_with(&raw, &mapping(), &options).unwrap();

        assert_eq!(result.column_names(), vec!["dates", "2Y", "5Y", "10Y"]);
        assert_eq!(result.dates(), vec![date(2020, 1, 1), date(2020, 1, 2)]);
        assert_eq!(result.column("2Y").unwrap(), vec![Some(1.0), Some(1.1)]);
        assert_eq!(result.column("5Y").unwrap(), vec![Some(2.0), Some(2.2)]);
        assert_eq!(result.column("10Y").unwrap(), vec![Some(3.0), Some(3.2)]);
    }

    #[test]
    fn test_legacy_intersects_unmapped_columns() {
        // D is not mapped but still restricts the shared dates
        let csv = "\
,A Curncy,,B Curncy,,D Curncy
2020-01-01,1.0,2020-01-01,2.0,2020-01-02,9.0
2020-01-02,1.1,2020-01-02,2.1,,
";
        let raw = parse_csv_str(csv, "unmapped.csv").unwrap();
        let mapping = MaturityMapping::from_pairs(&[("A", "2Y"), ("B", "5Y")]).unwrap();
        let options = AlignOptions {
            mode: AlignMode::Legacy,
            ..Default::default()
        };
        let result = align_with(&raw, &mapping, &options).unwrap();

        assert_eq!(result.dates(), vec![date(2020, 1, 1)]);
        assert_eq!(result.rows[0].rates, vec![Some(1.0), Some(2.1)]);

        let strict = align(&raw, &mapping).unwrap();
        assert_eq!(strict.row_count(), 2);
    }

    #[test]
    fn test_legacy_drops_blank_seed_dates() {
        let csv = "\
,A Curncy,,B Curncy
2020-01-01,1.0,2020-01-01,2.0
,1.1,2020-01-02,2.1
2020-01-02,1.2,,
";
        let raw = parse_csv_str(csv, "blank_seed.csv").unwrap();
        let mapping = MaturityMapping::from_pairs(&[("A", "2Y"), ("B", "5Y")]).unwrap();
        let options = AlignOptions {
            mode: AlignMode::Legacy,
            ..Default::default()
        };
        let result = align_with(&raw, &mapping, &options).unwrap();

        assert_eq!(result.dates(), vec![date(2020, 1, 1), date(2020, 1, 2)]);
        assert_eq!(result.column("2Y").unwrap(), vec![Some(1.0), Some(1.2)]);
        assert_eq!(result.column("5Y").unwrap(), vec![Some(2.0), Some(2.1)]);
    }

    #[test]
    fn test_legacy_matches_strict_on_clean_input() {
        let csv = "\
,A Curncy,,B Curncy
2020-01-01,1.0,2020-01-01,2.0
2020-01-02,1.1,2020-01-02,2.1
";
        let raw = parse_csv_str(csv, "clean.csv").unwrap();
        let mapping = MaturityMapping::from_pairs(&[("A", "2Y"), ("B", "5Y")]).unwrap();
        let options = AlignOptions {
            mode: AlignMode::Legacy,
            ..Default::default()
        };

        assert_eq!(
            align_with(&raw, &mapping, &options).unwrap(),
            align(&raw, &mapping).unwrap()
        );
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!("strict".parse::<AlignMode>().unwrap(), AlignMode::Strict);
        assert_eq!("LEGACY".parse::<AlignMode>().unwrap(), AlignMode::Legacy);
        assert!(matches!("fuzzy".parse::<AlignMode>(), Err(Error::UnknownMode(_))));
    }
}

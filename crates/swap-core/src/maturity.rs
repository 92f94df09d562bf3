//! Maturity labels and ordered ticker-to-maturity mappings

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Unit of a maturity label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TenorUnit {
    /// Weeks ("W")
    Weeks,
    /// Months ("M")
    Months,
    /// Years ("Y")
    Years,
}

impl TenorUnit {
    fn from_char(c: char) -> Option<Self> {
        match c {
            'W' => Some(TenorUnit::Weeks),
            'M' => Some(TenorUnit::Months),
            'Y' => Some(TenorUnit::Years),
            _ => None,
        }
    }
}

/// A swap maturity label such as "1W", "1.5Y" or "10Y"
///
/// The original label text is kept so that output column names match the
/// configured labels exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Maturity {
    label: String,
    amount: f64,
    unit: TenorUnit,
}

impl Maturity {
    /// Parse a label of the form `<digits>[.<digits>]<W|M|Y>`
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidMaturity(s.to_string());

        let unit_char = s.chars().last().ok_or_else(invalid)?;
        let unit = TenorUnit::from_char(unit_char).ok_or_else(invalid)?;
        let number = &s[..s.len() - unit_char.len_utf8()];

        let (whole, frac) = match number.split_once('.') {
            Some((w, f)) => (w, Some(f)),
            None => (number, None),
        };
        let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(whole) || frac.is_some_and(|f| !all_digits(f)) {
            return Err(invalid());
        }

        let amount: f64 = number.parse().map_err(|_| invalid())?;
        Ok(Self {
            label: s.to_string(),
            amount,
            unit,
        })
    }

    /// The label as written, e.g. "1.5Y"
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Numeric part of the label
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Unit of the label
    pub fn unit(&self) -> TenorUnit {
        self.unit
    }

    /// Approximate length in years (weeks as 1/52, months as 1/12)
    pub fn years(&self) -> f64 {
        match self.unit {
            TenorUnit::Weeks => self.amount / 52.0,
            TenorUnit::Months => self.amount / 12.0,
            TenorUnit::Years => self.amount,
        }
    }
}

impl FromStr for Maturity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Maturity::parse(s)
    }
}

impl TryFrom<String> for Maturity {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Maturity::parse(&s)
    }
}

impl From<Maturity> for String {
    fn from(m: Maturity) -> Self {
        m.label
    }
}

impl fmt::Display for Maturity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// One ticker and the maturity it quotes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Terminal ticker, without the " Curncy" suffix
    pub ticker: String,
    /// Maturity label used as the output column name
    pub maturity: Maturity,
}

/// Ordered, non-empty mapping from ticker to maturity
///
/// Entry order is the output column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MaturityMapping {
    entries: Vec<MappingEntry>,
}

impl MaturityMapping {
    /// Build a mapping, rejecting empty input and repeated tickers
    pub fn new(entries: Vec<MappingEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::EmptyMapping);
        }

        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.ticker.as_str()) {
                return Err(Error::DuplicateTicker(entry.ticker.clone()));
            }
        }

        Ok(Self { entries })
    }

    /// Build a mapping from `(ticker, label)` pairs
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Result<Self> {
        let entries = pairs
            .iter()
            .map(|(ticker, label)| {
                Ok(MappingEntry {
                    ticker: ticker.to_string(),
                    maturity: Maturity::parse(label)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(entries)
    }

    /// Load a mapping from a JSON array of `{"ticker", "maturity"}` objects
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        let entries: Vec<MappingEntry> = serde_json::from_str(&content)?;
        Self::new(entries)
    }

    /// Save the mapping as a JSON array
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Entries in output order
    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tickers in output order
    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.ticker.as_str())
    }

    /// Maturities in output order
    pub fn maturities(&self) -> Vec<Maturity> {
        self.entries.iter().map(|e| e.maturity.clone()).collect()
    }
}

impl<'de> Deserialize<'de> for MaturityMapping {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let entries = Vec::<MappingEntry>::deserialize(deserializer)?;
        MaturityMapping::new(entries).map_err(serde::de::Error::custom)
    }
}

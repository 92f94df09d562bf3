//! Built-in ticker-to-maturity tables for GBP, EUR and USD swap curves
//!
//! Each currency has three term structures:
//! - `ts_full`: the full set of quoted maturities
//! - `ts_long`: maturities from 2 years out (no short end)
//! - `ts_7_mat`: the fixed 7-maturity curve (2Y, 3Y, 5Y, 10Y, 15Y, 20Y, 30Y)

use crate::error::{Error, Result};
use crate::maturity::MaturityMapping;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// BPSWSC and BPSWSD (3M, 4M) are not present in the GBP exports.
pub const GBP_TS_FULL: &[(&str, &str)] = &[
    ("BPSWS1Z", "1W"),
    ("BPSWS2Z", "2W"),
    ("BPSWSA", "1M"),
    ("BPSWSB", "2M"),
    ("BPSWSE", "5M"),
    ("BPSWSF", "6M"),
    ("BPSWSG", "7M"),
    ("BPSWSH", "8M"),
    ("BPSWSI", "9M"),
    ("BPSWSJ", "10M"),
    ("BPSWSK", "11M"),
    ("BPSWS1", "1Y"),
    ("BPSWS1F", "1.5Y"),
    ("BPSWS2", "2Y"),
    ("BPSWS3", "3Y"),
    ("BPSWS4", "4Y"),
    ("BPSWS5", "5Y"),
    ("BPSWS6", "6Y"),
    ("BPSWS7", "7Y"),
    ("BPSWS8", "8Y"),
    ("BPSWS9", "9Y"),
    ("BPSWS10", "10Y"),
    ("BPSWS12", "12Y"),
    ("BPSWS15", "15Y"),
    ("BPSWS20", "20Y"),
    ("BPSWS25", "25Y"),
    ("BPSWS30", "30Y"),
    ("BPSWS40", "40Y"),
    ("BPSWS50", "50Y"),
];

pub const GBP_TS_LONG: &[(&str, &str)] = &[
    ("BPSWS2", "2Y"),
    ("BPSWS3", "3Y"),
    ("BPSWS4", "4Y"),
    ("BPSWS5", "5Y"),
    ("BPSWS6", "6Y"),
    ("BPSWS7", "7Y"),
    ("BPSWS8", "8Y"),
    ("BPSWS9", "9Y"),
    ("BPSWS10", "10Y"),
    ("BPSWS12", "12Y"),
    ("BPSWS15", "15Y"),
    ("BPSWS20", "20Y"),
    ("BPSWS25", "25Y"),
    ("BPSWS30", "30Y"),
    ("BPSWS40", "40Y"),
    ("BPSWS50", "50Y"),
];

pub const GBP_TS_7_MAT: &[(&str, &str)] = &[
    ("BPSWS2", "2Y"),
    ("BPSWS3", "3Y"),
    ("BPSWS5", "5Y"),
    ("BPSWS10", "10Y"),
    ("BPSWS15", "15Y"),
    ("BPSWS20", "20Y"),
    ("BPSWS30", "30Y"),
];

pub const EUR_TS_FULL: &[(&str, &str)] = &[
    ("EESWE1Z", "1W"),
    ("EESWE2Z", "2W"),
    ("EESWEA", "1M"),
    ("EESWEB", "2M"),
    ("EESWEC", "3M"),
    ("EESWED", "4M"),
    ("EESWEE", "5M"),
    ("EESWEF", "6M"),
    ("EESWEG", "7M"),
    ("EESWEH", "8M"),
    ("EESWEI", "9M"),
    ("EESWEJ", "10M"),
    ("EESWEK", "11M"),
    ("EESWE1", "1Y"),
    ("EESWE1F", "1.5Y"),
    ("EESWE2", "2Y"),
    ("EESWE3", "3Y"),
    ("EESWE4", "4Y"),
    ("EESWE5", "5Y"),
    ("EESWE6", "6Y"),
    ("EESWE7", "7Y"),
    ("EESWE8", "8Y"),
    ("EESWE9", "9Y"),
    ("EESWE10", "10Y"),
    ("EESWE12", "12Y"),
    ("EESWE15", "15Y"),
    ("EESWE20", "20Y"),
    ("EESWE25", "25Y"),
    ("EESWE30", "30Y"),
    ("EESWE40", "40Y"),
    ("EESWE50", "50Y"),
];

pub const EUR_TS_LONG: &[(&str, &str)] = &[
    ("EESWE2", "2Y"),
    ("EESWE3", "3Y"),
    ("EESWE4", "4Y"),
    ("EESWE5", "5Y"),
    ("EESWE6", "6Y"),
    ("EESWE7", "7Y"),
    ("EESWE8", "8Y"),
    ("EESWE9", "9Y"),
    ("EESWE10", "10Y"),
    ("EESWE12", "12Y"),
    ("EESWE15", "15Y"),
    ("EESWE20", "20Y"),
    ("EESWE25", "25Y"),
    ("EESWE30", "30Y"),
    ("EESWE40", "40Y"),
    ("EESWE50", "50Y"),
];

pub const EUR_TS_7_MAT: &[(&str, &str)] = &[
    ("EESWE2", "2Y"),
    ("EESWE3", "3Y"),
    ("EESWE5", "5Y"),
    ("EESWE10", "10Y"),
    ("EESWE15", "15Y"),
    ("EESWE20", "20Y"),
    ("EESWE30", "30Y"),
];

pub const USD_TS_FULL: &[(&str, &str)] = &[
    ("USOSFR1Z", "1W"),
    ("USOSFR2Z", "2W"),
    ("USOSFR3Z", "3W"),
    ("USOSFRA", "1M"),
    ("USOSFRB", "2M"),
    ("USOSFRC", "3M"),
    ("USOSFRD", "4M"),
    ("USOSFRE", "5M"),
    ("USOSFRF", "6M"),
    ("USOSFRG", "7M"),
    ("USOSFRH", "8M"),
    ("USOSFRI", "9M"),
    ("USOSFRJ", "10M"),
    ("USOSFRK", "11M"),
    ("USOSFR1", "1Y"),
    ("USOSFR1F", "1.5Y"),
    ("USOSFR2", "2Y"),
    ("USOSFR3", "3Y"),
    ("USOSFR4", "4Y"),
    ("USOSFR5", "5Y"),
    ("USOSFR6", "6Y"),
    ("USOSFR7", "7Y"),
    ("USOSFR8", "8Y"),
    ("USOSFR9", "9Y"),
    ("USOSFR10", "10Y"),
    ("USOSFR12", "12Y"),
    ("USOSFR15", "15Y"),
    ("USOSFR20", "20Y"),
    ("USOSFR25", "25Y"),
    ("USOSFR30", "30Y"),
    ("USOSFR40", "40Y"),
    ("USOSFR50", "50Y"),
];

pub const USD_TS_LONG: &[(&str, &str)] = &[
    ("USOSFR2", "2Y"),
    ("USOSFR3", "3Y"),
    ("USOSFR4", "4Y"),
    ("USOSFR5", "5Y"),
    ("USOSFR6", "6Y"),
    ("USOSFR7", "7Y"),
    ("USOSFR8", "8Y"),
    ("USOSFR9", "9Y"),
    ("USOSFR10", "10Y"),
    ("USOSFR12", "12Y"),
    ("USOSFR15", "15Y"),
    ("USOSFR20", "20Y"),
    ("USOSFR25", "25Y"),
    ("USOSFR30", "30Y"),
    ("USOSFR40", "40Y"),
    ("USOSFR50", "50Y"),
];

pub const USD_TS_7_MAT: &[(&str, &str)] = &[
    ("USOSFR2", "2Y"),
    ("USOSFR3", "3Y"),
    ("USOSFR5", "5Y"),
    ("USOSFR10", "10Y"),
    ("USOSFR15", "15Y"),
    ("USOSFR20", "20Y"),
    ("USOSFR30", "30Y"),
];

/// Currency of a built-in curve set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    Gbp,
    Eur,
    Usd,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::Gbp, Currency::Eur, Currency::Usd];

    fn as_str(&self) -> &'static str {
        match self {
            Currency::Gbp => "gbp",
            Currency::Eur => "eur",
            Currency::Usd => "usd",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Currency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Currency::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownCurveSet(s.to_string()))
    }
}

/// Which maturities of a currency's curve to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TermStructure {
    /// Every quoted maturity
    #[serde(rename = "ts_full")]
    Full,
    /// 2Y and longer
    #[serde(rename = "ts_long")]
    Long,
    /// The fixed 7-maturity curve
    #[serde(rename = "ts_7_mat")]
    SevenMaturities,
}

impl TermStructure {
    pub const ALL: [TermStructure; 3] = [
        TermStructure::Full,
        TermStructure::Long,
        TermStructure::SevenMaturities,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            TermStructure::Full => "ts_full",
            TermStructure::Long => "ts_long",
            TermStructure::SevenMaturities => "ts_7_mat",
        }
    }
}

impl fmt::Display for TermStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named built-in mapping, e.g. `usd_ts_7_mat`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CurveSet {
    pub currency: Currency,
    pub structure: TermStructure,
}

impl CurveSet {
    /// Create a curve set identifier
    pub fn new(currency: Currency, structure: TermStructure) -> Self {
        Self {
            currency,
            structure,
        }
    }

    /// All nine built-in curve sets, grouped by currency
    pub fn all() -> Vec<CurveSet> {
        Currency::ALL
            .into_iter()
            .flat_map(|c| TermStructure::ALL.into_iter().map(move |t| CurveSet::new(c, t)))
            .collect()
    }

    /// The raw `(ticker, maturity)` table for this set
    pub fn pairs(&self) -> &'static [(&'static str, &'static str)] {
        match (self.currency, self.structure) {
            (Currency::Gbp, TermStructure::Full) => GBP_TS_FULL,
            (Currency::Gbp, TermStructure::Long) => GBP_TS_LONG,
            (Currency::Gbp, TermStructure::SevenMaturities) => GBP_TS_7_MAT,
            (Currency::Eur, TermStructure::Full) => EUR_TS_FULL,
            (Currency::Eur, TermStructure::Long) => EUR_TS_LONG,
            (Currency::Eur, TermStructure::SevenMaturities) => EUR_TS_7_MAT,
            (Currency::Usd, TermStructure::Full) => USD_TS_FULL,
            (Currency::Usd, TermStructure::Long) => USD_TS_LONG,
            (Currency::Usd, TermStructure::SevenMaturities) => USD_TS_7_MAT,
        }
    }

    /// Build the validated mapping for this set
    pub fn mapping(&self) -> Result<MaturityMapping> {
        MaturityMapping::from_pairs(self.pairs())
    }
}

impl fmt::Display for CurveSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.currency, self.structure)
    }
}

impl FromStr for CurveSet {
    type Err = Error;

    /// Parse names such as "usd_ts_7_mat" (case-insensitive)
    fn from_str(s: &str) -> Result<Self> {
        let unknown = || Error::UnknownCurveSet(s.to_string());
        let (currency, structure) = s.split_once('_').ok_or_else(unknown)?;
        let currency: Currency = currency.parse().map_err(|_| unknown())?;
        let structure = TermStructure::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(structure))
            .ok_or_else(unknown)?;
        Ok(CurveSet::new(currency, structure))
    }
}

impl Serialize for CurveSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CurveSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use std::collections::HashSet;

    #[test]
    fn test_all_curve_sets_are_well_formed() {
        let label = Regex::new(r"^\d+(\.\d+)?[WMY]$").unwrap();

        for set in CurveSet::all() {
            let pairs = set.pairs();
            let tickers: HashSet<&str> = pairs.iter().map(|(t, _)| *t).collect();
            assert_eq!(tickers.len(), pairs.len(), "duplicate ticker in {}", set);

            for (ticker, maturity) in pairs {
                assert!(!ticker.is_empty());
                assert!(label.is_match(maturity), "{} -> {} in {}", ticker, maturity, set);
            }

            assert_eq!(set.mapping().unwrap().len(), pairs.len());
        }
    }

    #[test]
    fn test_nine_curve_sets() {
        let all = CurveSet::all();
        assert_eq!(all.len(), 9);
        let names: HashSet<String> = all.iter().map(|s| s.to_string()).collect();
        assert_eq!(names.len(), 9);
    }

    #[test]
    fn test_curve_set_sizes() {
        assert_eq!(GBP_TS_FULL.len(), 29);
        assert_eq!(EUR_TS_FULL.len(), 31);
        assert_eq!(USD_TS_FULL.len(), 32);
        for long in [GBP_TS_LONG, EUR_TS_LONG, USD_TS_LONG] {
            assert_eq!(long.len(), 16);
        }
        for seven in [GBP_TS_7_MAT, EUR_TS_7_MAT, USD_TS_7_MAT] {
            assert_eq!(seven.len(), 7);
        }
    }

    #[test]
    fn test_gbp_full_skips_missing_tickers() {
        assert!(GBP_TS_FULL.iter().all(|(t, _)| *t != "BPSWSC" && *t != "BPSWSD"));
    }

    #[test]
    fn test_seven_maturities_share_labels() {
        for currency in Currency::ALL {
            let set = CurveSet::new(currency, TermStructure::SevenMaturities);
            let labels: Vec<&str> = set.pairs().iter().map(|(_, m)| *m).collect();
            assert_eq!(labels, vec!["2Y", "3Y", "5Y", "10Y", "15Y", "20Y", "30Y"]);
        }
    }

    #[test]
    fn test_long_is_suffix_of_full() {
        for currency in Currency::ALL {
            let full = CurveSet::new(currency, TermStructure::Full).pairs();
            let long = CurveSet::new(currency, TermStructure::Long).pairs();
            assert_eq!(&full[full.len() - long.len()..], long);
        }
    }

    #[test]
    fn test_parse_curve_set_names() {
        let set: CurveSet = "usd_ts_7_mat".parse().unwrap();
        assert_eq!(set, CurveSet::new(Currency::Usd, TermStructure::SevenMaturities));

        let set: CurveSet = "GBP_TS_FULL".parse().unwrap();
        assert_eq!(set, CurveSet::new(Currency::Gbp, TermStructure::Full));

        assert_eq!(
            CurveSet::new(Currency::Eur, TermStructure::Long).to_string(),
            "eur_ts_long"
        );

        assert!(matches!("jpy_ts_full".parse::<CurveSet>(), Err(Error::UnknownCurveSet(_))));
        assert!(matches!("usd_ts_short".parse::<CurveSet>(), Err(Error::UnknownCurveSet(_))));
        assert!(matches!("usd".parse::<CurveSet>(), Err(Error::UnknownCurveSet(_))));
    }
}

use anyhow::{bail, Context};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Calendar quarter key in the panel's `"YYYY-Qn"` spelling, e.g. `"2024-Q3"`.
///
/// Ordering is chronological (year first, then quarter), so sorting rows by
/// `(hs_code, quarter)` gives each product's time series in panel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quarter {
    pub year: i32,
    pub quarter: u8,
}

impl Quarter {
    pub fn new(year: i32, quarter: u8) -> anyhow::Result<Self> {
        anyhow::ensure!(
            (1..=4).contains(&quarter),
            "quarter must be 1..=4 (got {quarter})"
        );
        Ok(Self { year, quarter })
    }

    /// Sortable integer form exposed as the `quarter_num` output column
    /// (e.g. 2024-Q3 -> 20243).
    pub fn sort_key(&self) -> i32 {
        self.year * 10 + i32::from(self.quarter)
    }
}

impl FromStr for Quarter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let (year_part, quarter_part) = s
            .trim()
            .split_once('-')
            .with_context(|| format!("quarter key {s:?} is not \"YYYY-Qn\""))?;

        let year: i32 = year_part
            .parse()
            .with_context(|| format!("invalid year in quarter key {s:?}"))?;

        let Some(digit) = quarter_part.strip_prefix('Q') else {
            bail!("quarter key {s:?} is missing the Q marker");
        };
        let quarter: u8 = digit
            .parse()
            .with_context(|| format!("invalid quarter digit in key {s:?}"))?;

        Quarter::new(year, quarter)
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-Q{}", self.year, self.quarter)
    }
}

impl Serialize for Quarter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Quarter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

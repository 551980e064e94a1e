//! Monthly composite periods.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{NdviError, NdviResult};

/// A calendar month identifying one composite, e.g. 2020-06.
///
/// Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Build a period, rejecting months outside 1..=12.
    pub fn new(year: i32, month: u32) -> NdviResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(NdviError::invalid("month", "Month must be between 1 and 12"));
        }
        Ok(Self { year, month })
    }

    /// First day of the month as `YYYY-MM-01`.
    pub fn date_string(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| format!("{}-{:02}-01", self.year, self.month))
    }

    /// Number of months from `self` forward to `later` (negative if earlier).
    pub fn months_until(&self, later: &YearMonth) -> i64 {
        (later.year as i64 - self.year as i64) * 12 + later.month as i64 - self.month as i64
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_month() {
        assert!(YearMonth::new(2020, 0).is_err());
        assert!(YearMonth::new(2020, 13).is_err());
        assert!(YearMonth::new(2020, 12).is_ok());
    }

    #[test]
    fn test_date_string() {
        assert_eq!(YearMonth::new(2020, 6).unwrap().date_string(), "2020-06-01");
        assert_eq!(YearMonth::new(2020, 6).unwrap().to_string(), "2020-06");
    }

    #[test]
    fn test_months_until() {
        let a = YearMonth::new(2020, 11).unwrap();
        let b = YearMonth::new(2021, 2).unwrap();
        assert_eq!(a.months_until(&b), 3);
        assert_eq!(b.months_until(&a), -3);
    }
}

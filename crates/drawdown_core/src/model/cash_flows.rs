use serde::{Deserialize, Serialize};

/// A recurring real-dollar amount active for `duration_years` calendar years
/// starting at `start_year`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CashFlowStream {
    #[serde(alias = "year")]
    pub start_year: i32,
    #[serde(alias = "years")]
    pub duration_years: i32,
    #[serde(alias = "amount")]
    pub annual_amount: f64,
}

impl CashFlowStream {
    #[must_use]
    pub fn new(start_year: i32, duration_years: i32, annual_amount: f64) -> Self {
        Self {
            start_year,
            duration_years,
            annual_amount,
        }
    }

    #[must_use]
    pub fn is_active(&self, year: i32) -> bool {
        let end = i64::from(self.start_year) + i64::from(self.duration_years);
        year >= self.start_year && i64::from(year) < end
    }
}

/// Single-stream income form kept for older configuration files
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegacyIncome {
    pub amount: f64,
    pub start_year: i32,
    pub years: i32,
}

impl From<LegacyIncome> for CashFlowStream {
    fn from(l: LegacyIncome) -> Self {
        CashFlowStream::new(l.start_year, l.years, l.amount)
    }
}

/// One-off deposit into the portfolio (inheritance, home sale, ...)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Windfall {
    pub year: i32,
    pub amount: f64,
}

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const MIN_CLAIMING_AGE: u32 = 62;
pub const MAX_CLAIMING_AGE: u32 = 70;

/// First calendar year of the projected trust-fund shortfall
pub const TRUST_FUND_DEPLETION_YEAR: i32 = 2034;

/// Assumed future of Social Security funding
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FundingScenario {
    /// 19% cut from 2034
    Conservative,
    /// 5% cut in 2034, growing 1% per year up to 10%
    #[default]
    Moderate,
    /// Full benefits throughout
    Optimistic,
    /// User-specified reduction from a user-specified year
    Custom { reduction: f64, start_year: i32 },
}

impl FundingScenario {
    /// Fractional benefit reduction applied in `year`
    #[must_use]
    pub fn reduction_for_year(&self, year: i32) -> f64 {
        match *self {
            FundingScenario::Conservative if year >= TRUST_FUND_DEPLETION_YEAR => 0.19,
            FundingScenario::Moderate if year >= TRUST_FUND_DEPLETION_YEAR => {
                let years_since = f64::from(year - TRUST_FUND_DEPLETION_YEAR);
                (0.05 + 0.01 * years_since).min(0.10)
            }
            FundingScenario::Custom {
                reduction,
                start_year,
            } if year >= start_year => reduction,
            _ => 0.0,
        }
    }
}

/// Second earner in the household
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpousalBenefit {
    pub annual_benefit: f64,
    pub start_age: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SocialSecurityConfig {
    /// Annual benefit in today's dollars at the claiming age
    pub annual_benefit: f64,
    pub start_age: u32,
    #[serde(default)]
    pub scenario: FundingScenario,
    /// Fraction of benefits included in taxable income
    #[serde(default = "default_taxable_fraction")]
    pub taxable_fraction: f64,
    #[serde(default)]
    pub spouse: Option<SpousalBenefit>,
}

fn default_taxable_fraction() -> f64 {
    0.85
}

impl Default for SocialSecurityConfig {
    fn default() -> Self {
        Self {
            annual_benefit: 40_000.0,
            start_age: 67,
            scenario: FundingScenario::default(),
            taxable_fraction: default_taxable_fraction(),
            spouse: None,
        }
    }
}

impl SocialSecurityConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_age("primary", self.start_age)?;
        check_amount(self.annual_benefit)?;
        if let Some(spouse) = &self.spouse {
            check_age("spouse", spouse.start_age)?;
            check_amount(spouse.annual_benefit)?;
        }
        if !(0.0..=1.0).contains(&self.taxable_fraction) {
            return Err(ConfigError::InvalidSocialSecurity(
                "taxable fraction must lie in [0, 1]",
            ));
        }
        match self.scenario {
            FundingScenario::Custom { reduction, .. } if !(0.0..=1.0).contains(&reduction) => {
                return Err(ConfigError::InvalidSocialSecurity(
                    "custom reduction must lie in [0, 1]",
                ));
            }
            _ => {}
        }
        Ok(())
    }
}

fn check_age(who: &'static str, age: u32) -> Result<(), ConfigError> {
    if (MIN_CLAIMING_AGE..=MAX_CLAIMING_AGE).contains(&age) {
        Ok(())
    } else {
        Err(ConfigError::SocialSecurityStartAge { who, age })
    }
}

fn check_amount(amount: f64) -> Result<(), ConfigError> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidSocialSecurity(
            "annual benefit must be >= 0",
        ))
    }
}

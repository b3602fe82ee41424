//! Social Security benefit calculator
//!
//! Age is anchored on the configured retirement age: a household retiring at
//! 45 reaches 67 twenty-two years into the projection, not two.

use crate::model::{FundingScenario, SocialSecurityConfig};

/// Age of the primary earner in calendar `year`
#[must_use]
pub fn age_at_year(year: i32, start_year: i32, retirement_age: u32) -> i64 {
    i64::from(retirement_age) + i64::from(year) - i64::from(start_year)
}

/// Real-dollar benefit paid in `year` for a single earner
#[must_use]
pub fn benefit_for_year(
    year: i32,
    start_year: i32,
    retirement_age: u32,
    annual_benefit: f64,
    scenario: &FundingScenario,
    start_age: u32,
) -> f64 {
    if age_at_year(year, start_year, retirement_age) < i64::from(start_age) {
        return 0.0;
    }
    annual_benefit * (1.0 - scenario.reduction_for_year(year))
}

/// Household benefit split into primary and spousal parts
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HouseholdBenefit {
    pub primary: f64,
    pub spouse: f64,
}

impl HouseholdBenefit {
    #[must_use]
    pub fn total(&self) -> f64 {
        self.primary + self.spouse
    }
}

impl SocialSecurityConfig {
    /// Primary plus spousal benefit in `year`. The spouse shares the primary's
    /// scenario and age axis but has its own amount and claiming age.
    #[must_use]
    pub fn household_benefit(
        &self,
        year: i32,
        start_year: i32,
        retirement_age: u32,
    ) -> HouseholdBenefit {
        let primary = benefit_for_year(
            year,
            start_year,
            retirement_age,
            self.annual_benefit,
            &self.scenario,
            self.start_age,
        );
        let spouse = self.spouse.map_or(0.0, |s| {
            benefit_for_year(
                year,
                start_year,
                retirement_age,
                s.annual_benefit,
                &self.scenario,
                s.start_age,
            )
        });
        HouseholdBenefit { primary, spouse }
    }

    /// Portion of `benefit` that counts as taxable income
    #[must_use]
    pub fn taxable_benefit(&self, benefit: f64) -> f64 {
        benefit * self.taxable_fraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SpousalBenefit;

    #[test]
    fn test_benefit_zero_before_start_age() {
        let s = FundingScenario::Optimistic;
        assert_eq!(benefit_for_year(2025, 2025, 60, 30_000.0, &s, 62), 0.0);
        assert_eq!(benefit_for_year(2026, 2025, 60, 30_000.0, &s, 62), 0.0);
        assert_eq!(benefit_for_year(2027, 2025, 60, 30_000.0, &s, 62), 30_000.0);
    }

    #[test]
    fn test_conservative_cut_applies_by_calendar_year() {
        let s = FundingScenario::Conservative;
        assert_eq!(benefit_for_year(2033, 2025, 70, 40_000.0, &s, 67), 40_000.0);
        assert!((benefit_for_year(2034, 2025, 70, 40_000.0, &s, 67) - 32_400.0).abs() < 1e-9);
    }

    #[test]
    fn test_household_benefit_with_spouse() {
        let cfg = SocialSecurityConfig {
            annual_benefit: 40_000.0,
            start_age: 67,
            scenario: FundingScenario::Optimistic,
            taxable_fraction: 0.85,
            spouse: Some(SpousalBenefit {
                annual_benefit: 18_000.0,
                start_age: 62,
            }),
        };
        // retire at 60: spouse claims after 2 years, primary after 7
        let y2 = cfg.household_benefit(2027, 2025, 60);
        assert_eq!(y2, HouseholdBenefit { primary: 0.0, spouse: 18_000.0 });
        let y7 = cfg.household_benefit(2032, 2025, 60);
        assert_eq!(y7.total(), 58_000.0);
        assert!((cfg.taxable_benefit(y7.total()) - 49_300.0).abs() < 1e-9);
    }
}

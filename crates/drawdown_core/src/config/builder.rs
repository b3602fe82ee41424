//! Simulation Builder
//!
//! Fluent construction of a `SimulationConfig`. `build()` validates the result,
//! so a builder never hands out a configuration the engines would reject.

use super::SimulationConfig;
use crate::error::ConfigError;
use crate::model::{
    Allocation, CashFlowStream, FilingStatus, FundingScenario, Guardrails, MarketRegime,
    ReturnAssumptions, SocialSecurityConfig, SpendingPolicy, SpousalBenefit, StateTaxPreset,
    TaxConfig, Windfall,
};

#[derive(Debug, Clone, Default)]
pub struct SimulationBuilder {
    config: SimulationConfig,
    /// Applied at build time so it sees the final allocation and horizon
    equity_reduction_per_year: Option<f64>,
}

impl SimulationBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration
    #[must_use]
    pub fn from_config(config: SimulationConfig) -> Self {
        Self {
            config,
            equity_reduction_per_year: None,
        }
    }

    // =========================================================================
    // Horizon & capital
    // =========================================================================

    #[must_use]
    pub fn start_year(mut self, year: i32) -> Self {
        self.config.start_year = year;
        self
    }

    #[must_use]
    pub fn horizon_years(mut self, years: u32) -> Self {
        self.config.horizon_years = years;
        self
    }

    #[must_use]
    pub fn retirement_age(mut self, age: u32) -> Self {
        self.config.retirement_age = age;
        self
    }

    #[must_use]
    pub fn start_capital(mut self, capital: f64) -> Self {
        self.config.start_capital = capital;
        self
    }

    // =========================================================================
    // Allocation & returns
    // =========================================================================

    #[must_use]
    pub fn allocation(mut self, allocation: Allocation) -> Self {
        self.config.allocation = allocation;
        self
    }

    /// Explicit glide path end-state
    #[must_use]
    pub fn glide_to(mut self, end: Allocation) -> Self {
        self.config.glide_path = Some(end);
        self.equity_reduction_per_year = None;
        self
    }

    /// Glide path that moves `reduction_per_year` of equity into bonds each year
    #[must_use]
    pub fn equity_glide(mut self, reduction_per_year: f64) -> Self {
        self.equity_reduction_per_year = Some(reduction_per_year);
        self
    }

    #[must_use]
    pub fn returns(mut self, returns: ReturnAssumptions) -> Self {
        self.config.returns = returns;
        self
    }

    #[must_use]
    pub fn regime(mut self, regime: MarketRegime) -> Self {
        self.config.regime = regime;
        self
    }

    // =========================================================================
    // Spending
    // =========================================================================

    #[must_use]
    pub fn fixed_spending(mut self, annual_spending: f64) -> Self {
        self.config.spending = SpendingPolicy::FixedAnnual { annual_spending };
        self
    }

    #[must_use]
    pub fn cape_guardrails(mut self, cape_now: f64, guardrails: Guardrails) -> Self {
        self.config.spending = SpendingPolicy::CapeGuardrails {
            cape_now,
            base_rate: crate::model::DEFAULT_CAPE_BASE_RATE,
            sensitivity: crate::model::DEFAULT_CAPE_SENSITIVITY,
            guardrails,
        };
        self
    }

    #[must_use]
    pub fn spending(mut self, policy: SpendingPolicy) -> Self {
        self.config.spending = policy;
        self
    }

    // =========================================================================
    // Taxes & Social Security
    // =========================================================================

    #[must_use]
    pub fn tax(mut self, tax: TaxConfig) -> Self {
        self.config.tax = tax;
        self
    }

    #[must_use]
    pub fn state_tax(mut self, state: StateTaxPreset, status: FilingStatus) -> Self {
        let solver = self.config.tax.solver;
        self.config.tax = TaxConfig {
            solver,
            ..TaxConfig::for_state(state, status)
        };
        self
    }

    #[must_use]
    pub fn social_security(mut self, annual_benefit: f64, start_age: u32) -> Self {
        let existing = self.config.social_security.unwrap_or_default();
        self.config.social_security = Some(SocialSecurityConfig {
            annual_benefit,
            start_age,
            ..existing
        });
        self
    }

    #[must_use]
    pub fn spousal_benefit(mut self, annual_benefit: f64, start_age: u32) -> Self {
        let mut ss = self.config.social_security.unwrap_or_default();
        ss.spouse = Some(SpousalBenefit {
            annual_benefit,
            start_age,
        });
        self.config.social_security = Some(ss);
        self
    }

    #[must_use]
    pub fn funding_scenario(mut self, scenario: FundingScenario) -> Self {
        let mut ss = self.config.social_security.unwrap_or_default();
        ss.scenario = scenario;
        self.config.social_security = Some(ss);
        self
    }

    // =========================================================================
    // Cash flows
    // =========================================================================

    #[must_use]
    pub fn income_stream(mut self, start_year: i32, duration_years: i32, amount: f64) -> Self {
        self.config
            .income_streams
            .push(CashFlowStream::new(start_year, duration_years, amount));
        self
    }

    #[must_use]
    pub fn expense_stream(mut self, start_year: i32, duration_years: i32, amount: f64) -> Self {
        self.config
            .expense_streams
            .push(CashFlowStream::new(start_year, duration_years, amount));
        self
    }

    #[must_use]
    pub fn windfall(mut self, year: i32, amount: f64) -> Self {
        self.config.windfalls.push(Windfall { year, amount });
        self
    }

    // =========================================================================
    // Simulation control
    // =========================================================================

    #[must_use]
    pub fn simulations(mut self, n: usize) -> Self {
        self.config.num_simulations = n;
        self
    }

    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn build(mut self) -> Result<SimulationConfig, ConfigError> {
        if let Some(reduction) = self.equity_reduction_per_year {
            let years = self.config.horizon_years.saturating_sub(1);
            self.config.glide_path = Some(self.config.allocation.equity_glide(reduction, years));
        }
        self.config.validate()?;
        Ok(self.config)
    }
}

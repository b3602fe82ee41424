//! Projection configuration
//!
//! `SimulationConfig` holds everything either engine needs. It is immutable
//! for the duration of a run and is validated once, before any trajectory is
//! simulated.
//!
//! # Builder DSL
//!
//! ```ignore
//! use drawdown_core::config::SimulationBuilder;
//! use drawdown_core::model::{FilingStatus, StateTaxPreset};
//!
//! let config = SimulationBuilder::new()
//!     .start_year(2026)
//!     .horizon_years(40)
//!     .retirement_age(55)
//!     .start_capital(3_000_000.0)
//!     .fixed_spending(110_000.0)
//!     .state_tax(StateTaxPreset::California, FilingStatus::MarriedFilingJointly)
//!     .social_security(42_000.0, 67)
//!     .income_stream(2026, 5, 35_000.0)
//!     .expense_stream(2032, 8, 70_000.0)
//!     .simulations(5_000)
//!     .seed(42)
//!     .build()?;
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::{
    Allocation, CashFlowStream, LegacyIncome, MarketRegime, ReturnAssumptions,
    SocialSecurityConfig, SpendingPolicy, TaxConfig, Windfall,
};

pub mod builder;

pub use builder::SimulationBuilder;

/// Complete projection configuration
///
/// Optional lists default to empty so that absent keys in a configuration file
/// behave exactly like empty lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub start_year: i32,
    pub horizon_years: u32,
    pub retirement_age: u32,
    /// Starting portfolio value in real dollars
    pub start_capital: f64,

    pub allocation: Allocation,
    /// End-state allocation reached in the final simulated year
    pub glide_path: Option<Allocation>,

    pub returns: ReturnAssumptions,
    pub regime: MarketRegime,
    pub spending: SpendingPolicy,
    pub tax: TaxConfig,
    pub social_security: Option<SocialSecurityConfig>,

    pub income_streams: Vec<CashFlowStream>,
    pub expense_streams: Vec<CashFlowStream>,
    /// Single-stream income from older configuration files
    pub other_income: Option<LegacyIncome>,
    pub windfalls: Vec<Windfall>,

    pub num_simulations: usize,
    /// `None` draws a fresh seed from the OS-seeded thread RNG
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start_year: 2025,
            horizon_years: 50,
            retirement_age: 65,
            start_capital: 2_500_000.0,
            allocation: Allocation::default(),
            glide_path: None,
            returns: ReturnAssumptions::default(),
            regime: MarketRegime::Baseline,
            spending: SpendingPolicy::default(),
            tax: TaxConfig::default(),
            social_security: None,
            income_streams: Vec::new(),
            expense_streams: Vec::new(),
            other_income: None,
            windfalls: Vec::new(),
            num_simulations: 10_000,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Income streams with the legacy single stream folded in
    #[must_use]
    pub fn all_income_streams(&self) -> Vec<CashFlowStream> {
        self.income_streams
            .iter()
            .copied()
            .chain(self.other_income.map(CashFlowStream::from))
            .collect()
    }

    /// Calendar year of simulated year `year_index`
    #[must_use]
    pub fn calendar_year(&self, year_index: u32) -> i32 {
        self.start_year.saturating_add_unsigned(year_index)
    }

    /// Final calendar year simulated
    #[must_use]
    pub fn end_year(&self) -> i32 {
        self.calendar_year(self.horizon_years.saturating_sub(1))
    }

    /// Total windfall deposited in `year`
    #[must_use]
    pub fn windfall_for_year(&self, year: i32) -> f64 {
        self.windfalls
            .iter()
            .filter(|w| w.year == year)
            .map(|w| w.amount)
            .sum()
    }

    /// Check every invariant the engines rely on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.horizon_years == 0 {
            return Err(ConfigError::ZeroHorizon);
        }
        if self.num_simulations == 0 {
            return Err(ConfigError::ZeroSimulations);
        }
        if !self.start_capital.is_finite() || self.start_capital < 0.0 {
            return Err(ConfigError::NegativeCapital(self.start_capital));
        }

        self.allocation.validate("start")?;
        if let Some(end) = &self.glide_path {
            end.validate("glide path end")?;
        }

        self.returns.validate()?;
        if let Some(corr) = &self.returns.correlation {
            crate::returns::cholesky(corr)?;
        }
        self.regime.validate()?;
        self.spending.validate()?;
        self.tax.validate()?;
        if let Some(ss) = &self.social_security {
            ss.validate()?;
        }

        check_streams("income", &self.all_income_streams())?;
        check_streams("expense", &self.expense_streams)?;
        Ok(())
    }
}

fn check_streams(kind: &'static str, streams: &[CashFlowStream]) -> Result<(), ConfigError> {
    match streams
        .iter()
        .enumerate()
        .find(|(_, s)| s.duration_years < 0)
    {
        Some((index, s)) => Err(ConfigError::NegativeStreamDuration {
            kind,
            index,
            duration_years: s.duration_years,
        }),
        None => Ok(()),
    }
}

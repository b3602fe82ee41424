use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    #[default]
    MarriedFilingJointly,
    Single,
}

impl FilingStatus {
    #[must_use]
    pub fn standard_deduction(self) -> f64 {
        match self {
            FilingStatus::MarriedFilingJointly => 29_200.0,
            FilingStatus::Single => 14_600.0,
        }
    }

    /// Thresholds of the 22% and 24% brackets
    fn thresholds(self) -> [f64; 3] {
        match self {
            FilingStatus::MarriedFilingJointly => [0.0, 94_300.0, 201_000.0],
            FilingStatus::Single => [0.0, 47_150.0, 100_500.0],
        }
    }
}

/// Combined federal + state rate approximations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateTaxPreset {
    #[default]
    FederalOnly,
    California,
    NewYork,
    Texas,
    Florida,
    Washington,
    Nevada,
    Pennsylvania,
    Ohio,
    Illinois,
}

impl StateTaxPreset {
    fn rates(self) -> [f64; 3] {
        match self {
            StateTaxPreset::FederalOnly
            | StateTaxPreset::Texas
            | StateTaxPreset::Florida
            | StateTaxPreset::Washington
            | StateTaxPreset::Nevada => [0.10, 0.22, 0.24],
            StateTaxPreset::California => [0.13, 0.31, 0.36],
            StateTaxPreset::NewYork => [0.14, 0.30, 0.35],
            StateTaxPreset::Pennsylvania => [0.13, 0.25, 0.27],
            StateTaxPreset::Ohio => [0.12, 0.26, 0.29],
            StateTaxPreset::Illinois => [0.12, 0.27, 0.30],
        }
    }
}

/// A single progressive bracket; `rate` applies to income above `threshold`
/// up to the next bracket's threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub threshold: f64,
    pub rate: f64,
}

/// What the gross-up solver does when it fails to converge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverFallback {
    /// Use the solver's upper bracket bound and keep going
    #[default]
    UpperBound,
    /// Abort the run
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Residual tolerance in dollars
    pub tolerance: f64,
    pub max_iterations: usize,
    pub on_non_convergence: SolverFallback,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            tolerance: 0.01,
            max_iterations: 100,
            on_non_convergence: SolverFallback::UpperBound,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxConfig {
    #[serde(default)]
    pub filing_status: FilingStatus,
    pub standard_deduction: f64,
    pub brackets: Vec<TaxBracket>,
    #[serde(default)]
    pub solver: SolverSettings,
}

impl Default for TaxConfig {
    fn default() -> Self {
        Self::for_filing_status(FilingStatus::MarriedFilingJointly)
    }
}

impl TaxConfig {
    /// Simplified federal brackets for `status`
    #[must_use]
    pub fn for_filing_status(status: FilingStatus) -> Self {
        Self::for_state(StateTaxPreset::FederalOnly, status)
    }

    /// Federal thresholds with combined federal + state rates
    #[must_use]
    pub fn for_state(state: StateTaxPreset, status: FilingStatus) -> Self {
        let brackets = status
            .thresholds()
            .into_iter()
            .zip(state.rates())
            .map(|(threshold, rate)| TaxBracket { threshold, rate })
            .collect();
        Self {
            filing_status: status,
            standard_deduction: status.standard_deduction(),
            brackets,
            solver: SolverSettings::default(),
        }
    }

    /// Rate of the highest bracket
    #[must_use]
    pub fn top_rate(&self) -> f64 {
        self.brackets.last().map_or(0.0, |b| b.rate)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let first = self.brackets.first().ok_or(ConfigError::EmptyTaxBrackets)?;
        if first.threshold != 0.0 {
            return Err(ConfigError::TaxBracketGap {
                first_threshold: first.threshold,
            });
        }
        for (index, bracket) in self.brackets.iter().enumerate() {
            if bracket.threshold < 0.0 || !bracket.threshold.is_finite() {
                return Err(ConfigError::NegativeTaxThreshold {
                    index,
                    threshold: bracket.threshold,
                });
            }
            if !(0.0..1.0).contains(&bracket.rate) {
                return Err(ConfigError::InvalidTaxRate {
                    index,
                    rate: bracket.rate,
                });
            }
            if index > 0 && bracket.threshold <= self.brackets[index - 1].threshold {
                return Err(ConfigError::UnsortedTaxBrackets { index });
            }
        }
        if self.standard_deduction < 0.0 || !self.standard_deduction.is_finite() {
            return Err(ConfigError::NegativeDeduction(self.standard_deduction));
        }
        if !(self.solver.tolerance > 0.0 && self.solver.tolerance.is_finite()) {
            return Err(ConfigError::InvalidSolverSettings("tolerance must be > 0"));
        }
        if self.solver.max_iterations == 0 {
            return Err(ConfigError::InvalidSolverSettings(
                "max_iterations must be >= 1",
            ));
        }
        Ok(())
    }
}

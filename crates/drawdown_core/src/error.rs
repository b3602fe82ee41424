use std::fmt;

use crate::model::AssetClass;

/// Errors detected while validating a `SimulationConfig`.
///
/// These are always raised before any trajectory is simulated.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    AllocationSum {
        label: &'static str,
        sum: f64,
    },
    NegativeWeight {
        label: &'static str,
        asset: AssetClass,
        weight: f64,
    },
    ZeroHorizon,
    ZeroSimulations,
    NegativeCapital(f64),
    NegativeStreamDuration {
        kind: &'static str,
        index: usize,
        duration_years: i32,
    },
    EmptyTaxBrackets,
    UnsortedTaxBrackets {
        index: usize,
    },
    TaxBracketGap {
        first_threshold: f64,
    },
    NegativeTaxThreshold {
        index: usize,
        threshold: f64,
    },
    InvalidTaxRate {
        index: usize,
        rate: f64,
    },
    NegativeDeduction(f64),
    InvalidSolverSettings(&'static str),
    InvalidReturnAssumption {
        asset: AssetClass,
        mean: f64,
        volatility: f64,
    },
    InvalidCorrelation(&'static str),
    InvalidGuardrails(&'static str),
    InvalidCape(f64),
    InvalidSpending(f64),
    SocialSecurityStartAge {
        who: &'static str,
        age: u32,
    },
    InvalidSocialSecurity(&'static str),
    InvalidRegime(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::AllocationSum { label, sum } => {
                write!(f, "{label} allocation weights must sum to 1.0, got {sum:.6}")
            }
            ConfigError::NegativeWeight {
                label,
                asset,
                weight,
            } => write!(f, "{label} allocation weight for {asset} is negative ({weight})"),
            ConfigError::ZeroHorizon => write!(f, "horizon_years must be at least 1"),
            ConfigError::ZeroSimulations => write!(f, "num_simulations must be at least 1"),
            ConfigError::NegativeCapital(c) => write!(f, "start_capital must be >= 0, got {c}"),
            ConfigError::NegativeStreamDuration {
                kind,
                index,
                duration_years,
            } => write!(
                f,
                "{kind} stream {index} has negative duration ({duration_years} years)"
            ),
            ConfigError::EmptyTaxBrackets => write!(f, "tax bracket table is empty"),
            ConfigError::UnsortedTaxBrackets { index } => {
                write!(f, "tax bracket {index} is not sorted ascending by threshold")
            }
            ConfigError::TaxBracketGap { first_threshold } => write!(
                f,
                "first tax bracket must start at 0, starts at {first_threshold}"
            ),
            ConfigError::NegativeTaxThreshold { index, threshold } => {
                write!(f, "tax bracket {index} has negative threshold {threshold}")
            }
            ConfigError::InvalidTaxRate { index, rate } => {
                write!(f, "tax bracket {index} has rate {rate} outside [0, 1)")
            }
            ConfigError::NegativeDeduction(d) => {
                write!(f, "standard deduction must be >= 0, got {d}")
            }
            ConfigError::InvalidSolverSettings(reason) => {
                write!(f, "invalid tax solver settings: {reason}")
            }
            ConfigError::InvalidReturnAssumption {
                asset,
                mean,
                volatility,
            } => write!(
                f,
                "invalid return assumption for {asset} (mean={mean}, volatility={volatility})"
            ),
            ConfigError::InvalidCorrelation(reason) => {
                write!(f, "invalid correlation matrix: {reason}")
            }
            ConfigError::InvalidGuardrails(reason) => write!(f, "invalid guardrails: {reason}"),
            ConfigError::InvalidCape(cape) => write!(f, "cape_now must be > 0, got {cape}"),
            ConfigError::InvalidSpending(s) => {
                write!(f, "annual spending must be >= 0, got {s}")
            }
            ConfigError::SocialSecurityStartAge { who, age } => write!(
                f,
                "{who} Social Security start age must be between 62 and 70, got {age}"
            ),
            ConfigError::InvalidSocialSecurity(reason) => {
                write!(f, "invalid Social Security settings: {reason}")
            }
            ConfigError::InvalidRegime(reason) => write!(f, "invalid market regime: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors raised by the tax gross-up solver
#[derive(Debug, Clone, PartialEq)]
pub enum TaxError {
    /// Bisection hit its iteration cap (or could not bracket the root)
    NonConvergence {
        net_need: f64,
        iterations: usize,
        last_gross: f64,
    },
}

impl fmt::Display for TaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaxError::NonConvergence {
                net_need,
                iterations,
                last_gross,
            } => write!(
                f,
                "gross-up solver did not converge for net need {net_need:.2} after \
                 {iterations} iterations (last gross {last_gross:.2})"
            ),
        }
    }
}

impl std::error::Error for TaxError {}

/// Errors that abort a projection run
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    Config(ConfigError),
    /// Tax solver failure with `SolverFallback::Fail`
    TaxSolver {
        simulation_index: usize,
        year: i32,
        source: TaxError,
    },
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::Config(e) => write!(f, "configuration error: {e}"),
            SimulationError::TaxSolver {
                simulation_index,
                year,
                source,
            } => write!(
                f,
                "tax computation failed in simulation {simulation_index}, year {year}: {source}"
            ),
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::Config(e) => Some(e),
            SimulationError::TaxSolver { source, .. } => Some(source),
        }
    }
}

impl From<ConfigError> for SimulationError {
    fn from(e: ConfigError) -> Self {
        SimulationError::Config(e)
    }
}

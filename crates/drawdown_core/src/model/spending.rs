use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_CAPE_BASE_RATE: f64 = 0.0175;
pub const DEFAULT_CAPE_SENSITIVITY: f64 = 0.5;

/// Guyton-Klinger style guardrail parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Guardrails {
    /// Trailing withdrawal rate below which spending is raised
    pub lower_withdrawal_rate: f64,
    /// Trailing withdrawal rate above which spending is cut
    pub upper_withdrawal_rate: f64,
    /// Fractional adjustment applied on a trigger (0.10 = 10%)
    pub adjustment_pct: f64,
    pub floor: f64,
    pub ceiling: f64,
    /// Last calendar year in which the floor is enforced. `None` = always.
    #[serde(default)]
    pub floor_end_year: Option<i32>,
}

impl Default for Guardrails {
    fn default() -> Self {
        Self {
            lower_withdrawal_rate: 0.028,
            upper_withdrawal_rate: 0.045,
            adjustment_pct: 0.10,
            floor: 140_000.0,
            ceiling: 220_000.0,
            floor_end_year: None,
        }
    }
}

impl Guardrails {
    /// Effective floor for `year`, honouring `floor_end_year`.
    #[must_use]
    pub fn floor_for_year(&self, year: i32) -> Option<f64> {
        match self.floor_end_year {
            Some(end) if year > end => None,
            _ => Some(self.floor),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let values = [
            self.lower_withdrawal_rate,
            self.upper_withdrawal_rate,
            self.adjustment_pct,
            self.floor,
            self.ceiling,
        ];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(ConfigError::InvalidGuardrails(
                "values must be finite and non-negative",
            ));
        }
        if self.lower_withdrawal_rate >= self.upper_withdrawal_rate {
            return Err(ConfigError::InvalidGuardrails(
                "lower withdrawal rate must be below upper withdrawal rate",
            ));
        }
        if self.floor > self.ceiling {
            return Err(ConfigError::InvalidGuardrails("floor exceeds ceiling"));
        }
        if self.adjustment_pct >= 1.0 {
            return Err(ConfigError::InvalidGuardrails(
                "adjustment percentage must be below 1.0",
            ));
        }
        Ok(())
    }
}

/// Annual spending policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SpendingPolicy {
    /// Constant real spending target
    FixedAnnual { annual_spending: f64 },
    /// CAPE-based initial withdrawal rate with guardrail adjustments.
    ///
    /// The initial rate is `base_rate + sensitivity / cape_now`.
    CapeGuardrails {
        cape_now: f64,
        #[serde(default = "default_base_rate")]
        base_rate: f64,
        #[serde(default = "default_sensitivity")]
        sensitivity: f64,
        #[serde(default)]
        guardrails: Guardrails,
    },
}

fn default_base_rate() -> f64 {
    DEFAULT_CAPE_BASE_RATE
}

fn default_sensitivity() -> f64 {
    DEFAULT_CAPE_SENSITIVITY
}

impl Default for SpendingPolicy {
    fn default() -> Self {
        SpendingPolicy::CapeGuardrails {
            cape_now: 25.0,
            base_rate: DEFAULT_CAPE_BASE_RATE,
            sensitivity: DEFAULT_CAPE_SENSITIVITY,
            guardrails: Guardrails::default(),
        }
    }
}

impl SpendingPolicy {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            SpendingPolicy::FixedAnnual { annual_spending } => {
                if !annual_spending.is_finite() || *annual_spending < 0.0 {
                    return Err(ConfigError::InvalidSpending(*annual_spending));
                }
            }
            SpendingPolicy::CapeGuardrails {
                cape_now,
                base_rate,
                sensitivity,
                guardrails,
            } => {
                if !cape_now.is_finite() || *cape_now <= 0.0 {
                    return Err(ConfigError::InvalidCape(*cape_now));
                }
                if !base_rate.is_finite() || !sensitivity.is_finite() {
                    return Err(ConfigError::InvalidGuardrails(
                        "CAPE base rate and sensitivity must be finite",
                    ));
                }
                guardrails.validate()?;
            }
        }
        Ok(())
    }
}

/// Guardrail decision taken in a simulated year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardrailAction {
    #[default]
    None,
    /// Withdrawal rate above the upper guardrail, spending cut
    Cut,
    /// Withdrawal rate below the lower guardrail, spending raised
    Raise,
}

impl GuardrailAction {
    #[must_use]
    pub fn is_trigger(self) -> bool {
        !matches!(self, GuardrailAction::None)
    }
}

/// Whether the spending target was pinned to a bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpendingClamp {
    #[default]
    None,
    Floor,
    Ceiling,
}

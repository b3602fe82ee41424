//! Spending target state machine
//!
//! A [`SpendingRule`] is resolved from the configured [`SpendingPolicy`] once per
//! run. Guardrail triggers move an unclamped spending base from year to year;
//! the floor and ceiling only bound what is spent in the current year.

use crate::model::{GuardrailAction, Guardrails, SpendingClamp, SpendingPolicy};

/// Initial withdrawal rate implied by a CAPE reading
#[must_use]
pub fn cape_initial_rate(cape_now: f64, base_rate: f64, sensitivity: f64) -> f64 {
    base_rate + sensitivity / cape_now
}

/// Trajectory history the rule needs for one year
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpendingInput {
    pub year: i32,
    pub start_balance: f64,
    /// Previous year's guardrail base and gross withdrawal; `None` in the first year
    pub prior: Option<PriorYear>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriorYear {
    /// Unclamped spending base, moved only by guardrail triggers
    pub base: f64,
    pub gross_withdrawal: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpendingDecision {
    /// Guardrail base carried into next year
    pub base: f64,
    /// This year's spending: `base` clamped to the floor and ceiling
    pub target: f64,
    pub action: GuardrailAction,
    pub clamp: SpendingClamp,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpendingRule {
    Fixed {
        annual_spending: f64,
    },
    Guardrailed {
        initial_target: f64,
        guardrails: Guardrails,
    },
}

impl SpendingRule {
    #[must_use]
    pub fn new(policy: &SpendingPolicy, start_capital: f64) -> Self {
        match policy {
            SpendingPolicy::FixedAnnual { annual_spending } => SpendingRule::Fixed {
                annual_spending: *annual_spending,
            },
            SpendingPolicy::CapeGuardrails {
                cape_now,
                base_rate,
                sensitivity,
                guardrails,
            } => SpendingRule::Guardrailed {
                initial_target: start_capital
                    * cape_initial_rate(*cape_now, *base_rate, *sensitivity),
                guardrails: *guardrails,
            },
        }
    }

    #[must_use]
    pub fn decide(&self, input: &SpendingInput) -> SpendingDecision {
        match self {
            SpendingRule::Fixed { annual_spending } => SpendingDecision {
                base: *annual_spending,
                target: *annual_spending,
                action: GuardrailAction::None,
                clamp: SpendingClamp::None,
            },
            SpendingRule::Guardrailed {
                initial_target,
                guardrails,
            } => {
                let (base, action) = match input.prior {
                    None => (*initial_target, GuardrailAction::None),
                    Some(prior) => adjust_base(prior, input.start_balance, guardrails),
                };
                let (target, clamp) = clamp_to_bounds(base, guardrails, input.year);
                SpendingDecision {
                    base,
                    target,
                    action,
                    clamp,
                }
            }
        }
    }
}

/// Floor (while it applies) first, then the ceiling
fn clamp_to_bounds(base: f64, g: &Guardrails, year: i32) -> (f64, SpendingClamp) {
    match g.floor_for_year(year) {
        Some(floor) if base < floor => (floor, SpendingClamp::Floor),
        _ if base > g.ceiling => (g.ceiling, SpendingClamp::Ceiling),
        _ => (base, SpendingClamp::None),
    }
}

fn adjust_base(prior: PriorYear, start_balance: f64, g: &Guardrails) -> (f64, GuardrailAction) {
    let withdrawal_rate = if start_balance > 0.0 {
        prior.gross_withdrawal / start_balance
    } else {
        f64::INFINITY
    };

    if withdrawal_rate > g.upper_withdrawal_rate {
        (prior.base * (1.0 - g.adjustment_pct), GuardrailAction::Cut)
    } else if withdrawal_rate < g.lower_withdrawal_rate {
        (prior.base * (1.0 + g.adjustment_pct), GuardrailAction::Raise)
    } else {
        (prior.base, GuardrailAction::None)
    }
}

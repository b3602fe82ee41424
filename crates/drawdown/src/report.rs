//! Plain-text projection reports
//!
//! The engine works in real dollars. `Dollars::Nominal` is a display-only
//! transform, `value * (1 + inflation)^t` with `t` years after the start year.

use std::fmt;

use drawdown_core::SimulationConfig;
use drawdown_core::model::{
    DeterministicResults, GuardrailAction, PathDetail, SimulationResults, SpendingClamp,
};
use drawdown_core::taxes::{effective_tax_rate, marginal_tax_rate};

use crate::format::{format_compact_currency, format_currency, format_percentage};

/// Real terminal-wealth levels reported as shortfall probabilities
const TERMINAL_THRESHOLDS: [f64; 3] = [5_000_000.0, 10_000_000.0, 15_000_000.0];

/// Spacing of the wealth-band table, in years
const BAND_STEP: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Dollars {
    #[default]
    Real,
    Nominal { inflation: f64 },
}

impl Dollars {
    /// Convert a real amount observed `years_elapsed` years after the start
    pub fn convert(self, real: f64, years_elapsed: usize) -> f64 {
        match self {
            Dollars::Real => real,
            Dollars::Nominal { inflation } => {
                real * (1.0 + inflation).powi(years_elapsed as i32)
            }
        }
    }
}

impl fmt::Display for Dollars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dollars::Real => write!(f, "real"),
            Dollars::Nominal { inflation } => {
                write!(f, "nominal ({} inflation)", format_percentage(*inflation))
            }
        }
    }
}

fn guardrail_label(action: GuardrailAction, clamp: SpendingClamp) -> &'static str {
    match (action, clamp) {
        (GuardrailAction::Cut, SpendingClamp::Floor) => "cut (floor)",
        (GuardrailAction::Cut, _) => "cut",
        (GuardrailAction::Raise, SpendingClamp::Ceiling) => "raise (ceiling)",
        (GuardrailAction::Raise, _) => "raise",
        (GuardrailAction::None, SpendingClamp::Floor) => "floor",
        (GuardrailAction::None, SpendingClamp::Ceiling) => "ceiling",
        (GuardrailAction::None, SpendingClamp::None) => "",
    }
}

/// Year-by-year table for one trajectory
fn write_path_table(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    path: &PathDetail,
    dollars: Dollars,
) -> fmt::Result {
    writeln!(f, "{title}")?;
    writeln!(
        f,
        "{:>6} {:>4} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}  {}",
        "Year", "Age", "Start", "Spending", "Gross", "Tax", "SS", "End", "Guardrail"
    )?;
    for (t, y) in path.years.iter().enumerate() {
        if y.depleted && y.start_balance <= 0.0 {
            writeln!(f, "{:>6} {:>4} {:>10}", y.year, y.age, "depleted")?;
            continue;
        }
        let c = |v: f64| format_compact_currency(dollars.convert(v, t));
        // end balance is observed one timestep later than the start
        let end = format_compact_currency(dollars.convert(y.end_balance, t + 1));
        writeln!(
            f,
            "{:>6} {:>4} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}  {}",
            y.year,
            y.age,
            c(y.start_balance),
            c(y.spending_target),
            c(y.gross_withdrawal),
            c(y.tax),
            c(y.social_security),
            end,
            guardrail_label(y.guardrail_action, y.clamp),
        )?;
    }
    Ok(())
}

/// Wealth percentiles and survival rate every `BAND_STEP` years
fn write_wealth_bands(
    f: &mut fmt::Formatter<'_>,
    r: &SimulationResults,
    dollars: Dollars,
) -> fmt::Result {
    let bands = r.wealth_percentile_bands(&[10.0, 50.0, 90.0]);
    let survival = r.success_rate_by_year();
    let last = survival.len().saturating_sub(1);
    let mut steps: Vec<usize> = (0..=last).step_by(BAND_STEP).collect();
    if steps.last() != Some(&last) {
        steps.push(last);
    }

    writeln!(f, "Wealth by timestep")?;
    writeln!(
        f,
        "{:>6} {:>10} {:>10} {:>10} {:>9}",
        "Step", "P10", "P50", "P90", "Solvent"
    )?;
    for t in steps {
        let band = |i: usize| format_compact_currency(dollars.convert(bands[i].values[t], t));
        writeln!(
            f,
            "{:>6} {:>10} {:>10} {:>10} {:>9}",
            t,
            band(0),
            band(1),
            band(2),
            format_percentage(survival[t])
        )?;
    }
    Ok(())
}

pub struct MonteCarloReport<'a> {
    pub config: &'a SimulationConfig,
    pub results: &'a SimulationResults,
    pub dollars: Dollars,
}

impl fmt::Display for MonteCarloReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = self.config;
        let r = self.results;
        let horizon = config.horizon_years as usize;
        let terminal = |v: f64| format_currency(self.dollars.convert(v, horizon));

        writeln!(
            f,
            "Monte Carlo projection: {} simulations, {} years ({}-{}), seed {}",
            r.num_simulations(),
            config.horizon_years,
            config.start_year,
            config.end_year(),
            r.seed
        )?;
        writeln!(f, "Dollars: {}", self.dollars)?;
        writeln!(f, "Success rate:        {}", format_percentage(r.success_rate))?;
        writeln!(f, "Terminal wealth mean {}", terminal(r.stats.mean))?;
        writeln!(f, "  P10                {}", terminal(r.stats.p10))?;
        writeln!(f, "  P50                {}", terminal(r.stats.p50))?;
        writeln!(f, "  P90                {}", terminal(r.stats.p90))?;
        writeln!(
            f,
            "  min / max          {} / {}",
            terminal(r.stats.min),
            terminal(r.stats.max)
        )?;

        let depleted: Vec<u32> = r.depletion_year.iter().flatten().copied().collect();
        if !depleted.is_empty() {
            let earliest = depleted.iter().min().copied().unwrap_or_default();
            writeln!(
                f,
                "Depleted:            {} trajectories, earliest in {}",
                depleted.len(),
                config.calendar_year(earliest)
            )?;
        }
        if r.solver_fallbacks > 0 {
            writeln!(f, "Tax solver fallbacks: {}", r.solver_fallbacks)?;
        }
        for threshold in TERMINAL_THRESHOLDS {
            writeln!(
                f,
                "P(terminal < {:>6})  {}",
                format_compact_currency(threshold),
                format_percentage(r.probability_terminal_below(threshold))
            )?;
        }

        writeln!(f)?;
        write_wealth_bands(f, r, self.dollars)?;

        for p in &r.percentile_paths {
            writeln!(f)?;
            let title = format!(
                "P{} path (simulation #{}, terminal {})",
                p.percentile,
                p.simulation_index,
                terminal(p.path.terminal_wealth())
            );
            write_path_table(f, &title, &p.path, self.dollars)?;
        }
        Ok(())
    }
}

pub struct DeterministicReport<'a> {
    pub config: &'a SimulationConfig,
    pub results: &'a DeterministicResults,
    pub dollars: Dollars,
}

impl fmt::Display for DeterministicReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = self.config;
        let r = self.results;
        let horizon = config.horizon_years as usize;

        writeln!(
            f,
            "Deterministic projection: {} years ({}-{}) at expected returns",
            config.horizon_years,
            config.start_year,
            config.end_year()
        )?;
        writeln!(f, "Dollars: {}", self.dollars)?;
        writeln!(
            f,
            "Terminal wealth:     {}",
            format_currency(self.dollars.convert(r.path.terminal_wealth(), horizon))
        )?;
        writeln!(f, "Guardrail hits:      {}", r.guardrail_hits)?;
        if let Some(first) = r.path.years.first() {
            let taxable_ss = config
                .social_security
                .map_or(0.0, |ss| ss.taxable_benefit(first.social_security));
            let income = first.gross_withdrawal + first.other_income + taxable_ss;
            let deduction = config.tax.standard_deduction;
            writeln!(
                f,
                "First-year tax rate: {} effective, {} marginal",
                format_percentage(effective_tax_rate(income, deduction, &config.tax.brackets)),
                format_percentage(marginal_tax_rate(income, deduction, &config.tax.brackets))
            )?;
        }
        match r.depletion_year {
            Some(t) => writeln!(
                f,
                "Depleted in:         {}",
                config.calendar_year(t)
            )?,
            None => writeln!(f, "Depleted in:         never")?,
        }
        if r.solver_fallbacks > 0 {
            writeln!(f, "Tax solver fallbacks: {}", r.solver_fallbacks)?;
        }
        writeln!(f)?;
        write_path_table(f, "Expected path", &r.path, self.dollars)
    }
}

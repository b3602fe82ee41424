//! Return assumptions and market regimes
//!
//! Returns are annual and real. Each asset class has a normal distribution
//! described by `(mean, volatility)`; an optional correlation matrix couples the
//! four draws. A `MarketRegime` overrides the distribution means in specific
//! simulated years to model a scenario (recession, inflation shock, ...).

use serde::{Deserialize, Serialize};

use super::allocation::{ASSET_CLASS_COUNT, AssetClass};
use crate::error::ConfigError;

/// Mean and volatility of one asset class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnDistribution {
    pub mean: f64,
    pub volatility: f64,
}

impl ReturnDistribution {
    #[must_use]
    pub const fn new(mean: f64, volatility: f64) -> Self {
        Self { mean, volatility }
    }
}

/// Per-asset-class return assumptions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnAssumptions {
    pub equity: ReturnDistribution,
    pub bonds: ReturnDistribution,
    pub real_estate: ReturnDistribution,
    pub cash: ReturnDistribution,
    /// Row-major correlation matrix in `AssetClass::ALL` order.
    /// `None` means the four draws are independent.
    #[serde(default)]
    pub correlation: Option<[[f64; ASSET_CLASS_COUNT]; ASSET_CLASS_COUNT]>,
}

impl Default for ReturnAssumptions {
    fn default() -> Self {
        Self {
            equity: ReturnDistribution::new(0.05, 0.18),
            bonds: ReturnDistribution::new(0.015, 0.07),
            real_estate: ReturnDistribution::new(0.01, 0.10),
            cash: ReturnDistribution::new(0.0, 0.0001),
            correlation: None,
        }
    }
}

impl ReturnAssumptions {
    #[must_use]
    pub fn distribution(&self, asset: AssetClass) -> ReturnDistribution {
        match asset {
            AssetClass::Equity => self.equity,
            AssetClass::Bonds => self.bonds,
            AssetClass::RealEstate => self.real_estate,
            AssetClass::Cash => self.cash,
        }
    }

    #[must_use]
    pub fn means(&self) -> [f64; ASSET_CLASS_COUNT] {
        AssetClass::ALL.map(|a| self.distribution(a).mean)
    }

    #[must_use]
    pub fn volatilities(&self) -> [f64; ASSET_CLASS_COUNT] {
        AssetClass::ALL.map(|a| self.distribution(a).volatility)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for asset in AssetClass::ALL {
            let d = self.distribution(asset);
            if !d.mean.is_finite() || !d.volatility.is_finite() || d.volatility < 0.0 {
                return Err(ConfigError::InvalidReturnAssumption {
                    asset,
                    mean: d.mean,
                    volatility: d.volatility,
                });
            }
        }
        if let Some(corr) = &self.correlation {
            for i in 0..ASSET_CLASS_COUNT {
                if (corr[i][i] - 1.0).abs() > 1e-9 {
                    return Err(ConfigError::InvalidCorrelation("diagonal must be 1"));
                }
                for j in 0..ASSET_CLASS_COUNT {
                    if (corr[i][j] - corr[j][i]).abs() > 1e-9 {
                        return Err(ConfigError::InvalidCorrelation("matrix must be symmetric"));
                    }
                    if !(-1.0..=1.0).contains(&corr[i][j]) {
                        return Err(ConfigError::InvalidCorrelation(
                            "entries must lie in [-1, 1]",
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

/// How equity returns recover after a configured shock
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RecoveryPattern {
    /// Constant equity mean for every recovery year
    Flat { equity_return: f64 },
    /// Linear taper from the shock return back to the configured mean
    Taper,
}

/// Explicit mean overrides for one simulated year
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RegimeOverride {
    pub year_offset: u32,
    #[serde(default)]
    pub equity: Option<f64>,
    #[serde(default)]
    pub bonds: Option<f64>,
    #[serde(default)]
    pub real_estate: Option<f64>,
    #[serde(default)]
    pub cash: Option<f64>,
}

impl RegimeOverride {
    fn apply(&self, means: &mut [f64; ASSET_CLASS_COUNT]) {
        let values = [self.equity, self.bonds, self.real_estate, self.cash];
        for (mean, value) in means.iter_mut().zip(values) {
            if let Some(v) = value {
                *mean = v;
            }
        }
    }
}

/// Market scenario overlay.
///
/// Regime values replace the distribution mean for the affected years; the
/// volatility is untouched, so random draws still scatter around the shocked mean.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MarketRegime {
    #[default]
    Baseline,
    /// Equity -15% in year 0, flat in year 1
    RecessionRecover,
    /// A decade of poor returns
    GrindLower,
    /// Recession in years 10-12
    LateRecession,
    /// High inflation in years 3-7: bonds hurt, real estate benefits
    InflationShock,
    /// Extended bear market in years 5-15
    LongBear,
    /// Boom in years 0-3, bust in years 4-6
    TechBubble,
    /// Configurable equity shock with a recovery window
    Shock {
        start_offset: u32,
        duration: u32,
        equity_return: f64,
        #[serde(default)]
        recovery_years: u32,
        #[serde(default = "default_recovery")]
        recovery: RecoveryPattern,
    },
    /// Explicit per-year overrides
    Custom {
        #[serde(default)]
        overrides: Vec<RegimeOverride>,
    },
}

fn default_recovery() -> RecoveryPattern {
    RecoveryPattern::Taper
}

impl MarketRegime {
    /// Distribution means for simulated year `year_offset` (0-based).
    #[must_use]
    pub fn means_for_year(
        &self,
        base: &[f64; ASSET_CLASS_COUNT],
        year_offset: u32,
    ) -> [f64; ASSET_CLASS_COUNT] {
        let mut m = *base;
        const EQ: usize = 0;
        const BONDS: usize = 1;
        const RE: usize = 2;
        const CASH: usize = 3;

        match self {
            MarketRegime::Baseline => {}
            MarketRegime::RecessionRecover => match year_offset {
                0 => m[EQ] = -0.15,
                1 => m[EQ] = 0.0,
                _ => {}
            },
            MarketRegime::GrindLower => {
                if year_offset < 10 {
                    m[EQ] = 0.005;
                    m[BONDS] = 0.01;
                    m[RE] = 0.005;
                }
            }
            MarketRegime::LateRecession => match year_offset {
                10 => {
                    m[EQ] = -0.20;
                    m[RE] = -0.05;
                }
                11 => {
                    m[EQ] = -0.05;
                    m[RE] = 0.0;
                }
                12 => {
                    m[EQ] = 0.15;
                    m[RE] = 0.05;
                }
                _ => {}
            },
            MarketRegime::InflationShock => {
                if (3..=7).contains(&year_offset) {
                    m[EQ] = 0.01;
                    m[BONDS] = -0.02;
                    m[RE] = 0.08;
                    m[CASH] = 0.01;
                }
            }
            MarketRegime::LongBear => {
                if (5..=15).contains(&year_offset) {
                    m[EQ] = 0.02;
                    m[BONDS] = 0.025;
                    m[RE] = 0.015;
                }
            }
            MarketRegime::TechBubble => match year_offset {
                0..=3 => m[EQ] = base[EQ] * 1.5,
                4..=6 => m[EQ] = -0.10,
                _ => {}
            },
            MarketRegime::Shock {
                start_offset,
                duration,
                equity_return,
                recovery_years,
                recovery,
            } => {
                let shock_end = start_offset.saturating_add(*duration);
                let recovery_end = shock_end.saturating_add(*recovery_years);
                if (*start_offset..shock_end).contains(&year_offset) {
                    m[EQ] = *equity_return;
                } else if (shock_end..recovery_end).contains(&year_offset) {
                    m[EQ] = match recovery {
                        RecoveryPattern::Flat { equity_return } => *equity_return,
                        RecoveryPattern::Taper => {
                            // step k of n moves k/(n+1) of the way back to the mean
                            let step = f64::from(year_offset - shock_end) + 1.0;
                            let span = f64::from(*recovery_years) + 1.0;
                            equity_return + (base[EQ] - equity_return) * step / span
                        }
                    };
                }
            }
            MarketRegime::Custom { overrides } => {
                for o in overrides.iter().filter(|o| o.year_offset == year_offset) {
                    o.apply(&mut m);
                }
            }
        }
        m
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            MarketRegime::Shock {
                duration,
                equity_return,
                recovery,
                ..
            } => {
                if *duration == 0 {
                    return Err(ConfigError::InvalidRegime("shock duration must be >= 1"));
                }
                let recovery_ok = match recovery {
                    RecoveryPattern::Flat { equity_return } => equity_return.is_finite(),
                    RecoveryPattern::Taper => true,
                };
                if !equity_return.is_finite() || !recovery_ok {
                    return Err(ConfigError::InvalidRegime("returns must be finite"));
                }
            }
            MarketRegime::Custom { overrides } => {
                let finite = overrides.iter().all(|o| {
                    [o.equity, o.bonds, o.real_estate, o.cash]
                        .iter()
                        .flatten()
                        .all(|v| v.is_finite())
                });
                if !finite {
                    return Err(ConfigError::InvalidRegime("overrides must be finite"));
                }
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: [f64; 4] = [0.074, 0.032, 0.056, 0.023];

    #[test]
    fn test_baseline_is_identity() {
        for year in 0..50 {
            assert_eq!(MarketRegime::Baseline.means_for_year(&BASE, year), BASE);
        }
    }

    #[test]
    fn test_recession_recover() {
        let r = MarketRegime::RecessionRecover;
        assert_eq!(r.means_for_year(&BASE, 0), [-0.15, 0.032, 0.056, 0.023]);
        assert_eq!(r.means_for_year(&BASE, 1), [0.0, 0.032, 0.056, 0.023]);
        assert_eq!(r.means_for_year(&BASE, 2), BASE);
    }

    #[test]
    fn test_grind_lower() {
        let r = MarketRegime::GrindLower;
        for year in 0..10 {
            assert_eq!(r.means_for_year(&BASE, year), [0.005, 0.01, 0.005, 0.023]);
        }
        assert_eq!(r.means_for_year(&BASE, 10), BASE);
    }

    #[test]
    fn test_late_recession() {
        let r = MarketRegime::LateRecession;
        assert_eq!(r.means_for_year(&BASE, 9), BASE);
        let y10 = r.means_for_year(&BASE, 10);
        assert_eq!((y10[0], y10[2]), (-0.20, -0.05));
        let y11 = r.means_for_year(&BASE, 11);
        assert_eq!((y11[0], y11[2]), (-0.05, 0.0));
        let y12 = r.means_for_year(&BASE, 12);
        assert_eq!((y12[0], y12[2]), (0.15, 0.05));
        assert_eq!(r.means_for_year(&BASE, 13), BASE);
    }

    #[test]
    fn test_inflation_shock() {
        let r = MarketRegime::InflationShock;
        assert_eq!(r.means_for_year(&BASE, 2), BASE);
        for year in 3..=7 {
            assert_eq!(r.means_for_year(&BASE, year), [0.01, -0.02, 0.08, 0.01]);
        }
        assert_eq!(r.means_for_year(&BASE, 8), BASE);
    }

    #[test]
    fn test_long_bear() {
        let r = MarketRegime::LongBear;
        assert_eq!(r.means_for_year(&BASE, 4), BASE);
        for year in 5..=15 {
            assert_eq!(r.means_for_year(&BASE, year), [0.02, 0.025, 0.015, 0.023]);
        }
        assert_eq!(r.means_for_year(&BASE, 16), BASE);
    }

    #[test]
    fn test_tech_bubble() {
        let r = MarketRegime::TechBubble;
        for year in 0..4 {
            assert!((r.means_for_year(&BASE, year)[0] - 0.111).abs() < 1e-12);
        }
        for year in 4..7 {
            assert_eq!(r.means_for_year(&BASE, year)[0], -0.10);
        }
        assert_eq!(r.means_for_year(&BASE, 7), BASE);
    }

    #[test]
    fn test_shock_with_flat_recovery() {
        let r = MarketRegime::Shock {
            start_offset: 2,
            duration: 3,
            equity_return: -0.25,
            recovery_years: 2,
            recovery: RecoveryPattern::Flat {
                equity_return: 0.05,
            },
        };
        assert_eq!(r.means_for_year(&BASE, 1)[0], 0.074);
        for year in 2..5 {
            assert_eq!(r.means_for_year(&BASE, year)[0], -0.25);
        }
        for year in 5..7 {
            assert_eq!(r.means_for_year(&BASE, year)[0], 0.05);
        }
        assert_eq!(r.means_for_year(&BASE, 7), BASE);
    }

    #[test]
    fn test_shock_taper_moves_monotonically_toward_mean() {
        let r = MarketRegime::Shock {
            start_offset: 0,
            duration: 1,
            equity_return: -0.30,
            recovery_years: 3,
            recovery: RecoveryPattern::Taper,
        };
        let path: Vec<f64> = (0..5).map(|y| r.means_for_year(&BASE, y)[0]).collect();
        assert_eq!(path[0], -0.30);
        assert!(path[1] > path[0] && path[2] > path[1] && path[3] > path[2]);
        assert!(path[3] < BASE[0]);
        assert_eq!(path[4], BASE[0]);
        // other classes never touched
        assert_eq!(r.means_for_year(&BASE, 1)[1..], BASE[1..]);
    }

    #[test]
    fn test_shock_at_offset_limits() {
        let late = MarketRegime::Shock {
            start_offset: u32::MAX,
            duration: 1,
            equity_return: -0.30,
            recovery_years: u32::MAX,
            recovery: RecoveryPattern::Taper,
        };
        assert_eq!(late.means_for_year(&BASE, 0), BASE);
        assert_eq!(late.means_for_year(&BASE, 50), BASE);

        let endless = MarketRegime::Shock {
            start_offset: 1,
            duration: u32::MAX,
            equity_return: -0.30,
            recovery_years: 5,
            recovery: RecoveryPattern::Taper,
        };
        assert_eq!(endless.means_for_year(&BASE, 0), BASE);
        assert_eq!(endless.means_for_year(&BASE, 40)[0], -0.30);
    }

    #[test]
    fn test_custom_overrides() {
        let r = MarketRegime::Custom {
            overrides: vec![RegimeOverride {
                year_offset: 3,
                equity: Some(-0.4),
                cash: Some(0.05),
                ..Default::default()
            }],
        };
        assert_eq!(r.means_for_year(&BASE, 2), BASE);
        assert_eq!(r.means_for_year(&BASE, 3), [-0.4, 0.032, 0.056, 0.05]);
    }

    #[test]
    fn test_correlation_validation() {
        let mut returns = ReturnAssumptions::default();
        let mut corr = [[0.0; 4]; 4];
        for (i, row) in corr.iter_mut().enumerate() {
            row[i] = 1.0;
        }
        corr[0][1] = 0.3;
        returns.correlation = Some(corr);
        assert_eq!(
            returns.validate(),
            Err(ConfigError::InvalidCorrelation("matrix must be symmetric"))
        );
        corr[1][0] = 0.3;
        returns.correlation = Some(corr);
        assert!(returns.validate().is_ok());
    }

    #[test]
    fn test_negative_volatility_rejected() {
        let mut returns = ReturnAssumptions::default();
        returns.bonds.volatility = -0.1;
        assert!(matches!(
            returns.validate(),
            Err(ConfigError::InvalidReturnAssumption {
                asset: AssetClass::Bonds,
                ..
            })
        ));
    }
}

//! Asset classes and portfolio allocation weights
//!
//! The engine works with a fixed set of four asset classes. Weights are held in
//! an `Allocation`; an optional glide path interpolates linearly between the
//! starting allocation and an end-state over the horizon.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Number of asset classes modelled by the engine
pub const ASSET_CLASS_COUNT: usize = 4;

/// Tolerance used when checking that weights sum to one
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    Equity,
    Bonds,
    RealEstate,
    Cash,
}

impl AssetClass {
    /// All classes in canonical (array) order
    pub const ALL: [AssetClass; ASSET_CLASS_COUNT] = [
        AssetClass::Equity,
        AssetClass::Bonds,
        AssetClass::RealEstate,
        AssetClass::Cash,
    ];

    #[must_use]
    pub fn index(self) -> usize {
        match self {
            AssetClass::Equity => 0,
            AssetClass::Bonds => 1,
            AssetClass::RealEstate => 2,
            AssetClass::Cash => 3,
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetClass::Equity => "equity",
            AssetClass::Bonds => "bonds",
            AssetClass::RealEstate => "real estate",
            AssetClass::Cash => "cash",
        };
        f.write_str(name)
    }
}

/// Target weights per asset class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub equity: f64,
    pub bonds: f64,
    pub real_estate: f64,
    pub cash: f64,
}

impl Default for Allocation {
    fn default() -> Self {
        Self {
            equity: 0.6,
            bonds: 0.2,
            real_estate: 0.15,
            cash: 0.05,
        }
    }
}

impl Allocation {
    #[must_use]
    pub fn new(equity: f64, bonds: f64, real_estate: f64, cash: f64) -> Self {
        Self {
            equity,
            bonds,
            real_estate,
            cash,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> [f64; ASSET_CLASS_COUNT] {
        [self.equity, self.bonds, self.real_estate, self.cash]
    }

    #[must_use]
    pub fn from_array(w: [f64; ASSET_CLASS_COUNT]) -> Self {
        Self::new(w[0], w[1], w[2], w[3])
    }

    #[must_use]
    pub fn weight(&self, asset: AssetClass) -> f64 {
        self.as_array()[asset.index()]
    }

    #[must_use]
    pub fn sum(&self) -> f64 {
        self.as_array().iter().sum()
    }

    pub fn validate(&self, label: &'static str) -> Result<(), ConfigError> {
        for asset in AssetClass::ALL {
            let weight = self.weight(asset);
            if weight < 0.0 || !weight.is_finite() {
                return Err(ConfigError::NegativeWeight {
                    label,
                    asset,
                    weight,
                });
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::AllocationSum { label, sum });
        }
        Ok(())
    }

    /// Linear interpolation toward `target`; `fraction` is clamped to [0, 1].
    ///
    /// A convex combination of two valid allocations is itself valid, so the
    /// glide path never needs re-normalizing.
    #[must_use]
    pub fn interpolate(&self, target: &Allocation, fraction: f64) -> Allocation {
        let t = fraction.clamp(0.0, 1.0);
        let from = self.as_array();
        let to = target.as_array();
        let mut out = [0.0; ASSET_CLASS_COUNT];
        for i in 0..ASSET_CLASS_COUNT {
            out[i] = from[i] + (to[i] - from[i]) * t;
        }
        Allocation::from_array(out)
    }

    /// End-state produced by shifting `reduction_per_year` of equity into bonds
    /// each year for `years` years, stopping once equity is exhausted.
    #[must_use]
    pub fn equity_glide(&self, reduction_per_year: f64, years: u32) -> Allocation {
        let shift = (reduction_per_year.max(0.0) * f64::from(years)).min(self.equity);
        Allocation {
            equity: self.equity - shift,
            bonds: self.bonds + shift,
            ..*self
        }
    }
}

/// Weights for simulated year `year_index` given an optional glide path end-state.
///
/// Year 0 uses `start`, the final simulated year uses `end`; a one-year horizon
/// always uses `start`.
#[must_use]
pub fn weights_for_year(
    start: &Allocation,
    end: Option<&Allocation>,
    year_index: u32,
    horizon_years: u32,
) -> Allocation {
    match end {
        Some(end) if horizon_years > 1 => {
            let fraction = f64::from(year_index) / f64::from(horizon_years - 1);
            start.interpolate(end, fraction)
        }
        _ => *start,
    }
}

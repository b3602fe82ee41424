//! Per-year return model
//!
//! The regime overlay, glide path and correlation factor are all resolved once
//! per run into a [`ReturnSchedule`]. The year loop then only combines the
//! schedule with a vector of standard-normal shocks from a [`ShockSource`].

use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand_distr::{Distribution, StandardNormal};

use crate::config::SimulationConfig;
use crate::error::ConfigError;
use crate::model::{ASSET_CLASS_COUNT, Allocation, weights_for_year};

type Matrix = [[f64; ASSET_CLASS_COUNT]; ASSET_CLASS_COUNT];

/// Lower-triangular Cholesky factor `L` with `L * L^T = corr`.
///
/// Fails if the matrix is not positive definite.
pub fn cholesky(corr: &Matrix) -> Result<Matrix, ConfigError> {
    let mut l = [[0.0; ASSET_CLASS_COUNT]; ASSET_CLASS_COUNT];
    for i in 0..ASSET_CLASS_COUNT {
        for j in 0..=i {
            let dot: f64 = (0..j).map(|k| l[i][k] * l[j][k]).sum();
            if i == j {
                let diag = corr[i][i] - dot;
                if diag <= 0.0 {
                    return Err(ConfigError::InvalidCorrelation(
                        "matrix is not positive definite",
                    ));
                }
                l[i][j] = diag.sqrt();
            } else {
                l[i][j] = (corr[i][j] - dot) / l[j][j];
            }
        }
    }
    Ok(l)
}

/// Source of independent standard-normal draws, one per asset class per year
pub trait ShockSource {
    fn next_shocks(&mut self) -> [f64; ASSET_CLASS_COUNT];
}

/// `N(0, 1)` draws from a trajectory-private RNG
#[derive(Debug, Clone)]
pub struct GaussianShocks {
    rng: SmallRng,
}

impl GaussianShocks {
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl ShockSource for GaussianShocks {
    fn next_shocks(&mut self) -> [f64; ASSET_CLASS_COUNT] {
        std::array::from_fn(|_| StandardNormal.sample(&mut self.rng))
    }
}

/// Every draw lands exactly on the mean
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpectedReturns;

impl ShockSource for ExpectedReturns {
    fn next_shocks(&mut self) -> [f64; ASSET_CLASS_COUNT] {
        [0.0; ASSET_CLASS_COUNT]
    }
}

/// Inputs for one simulated year, identical across trajectories
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearMarket {
    /// Regime-adjusted distribution means
    pub means: [f64; ASSET_CLASS_COUNT],
    pub weights: Allocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnSchedule {
    years: Vec<YearMarket>,
    volatilities: [f64; ASSET_CLASS_COUNT],
    /// `None` when the draws are independent
    cholesky: Option<Matrix>,
}

impl ReturnSchedule {
    pub fn new(config: &SimulationConfig) -> Result<Self, ConfigError> {
        let base = config.returns.means();
        let years = (0..config.horizon_years)
            .map(|t| YearMarket {
                means: config.regime.means_for_year(&base, t),
                weights: weights_for_year(
                    &config.allocation,
                    config.glide_path.as_ref(),
                    t,
                    config.horizon_years,
                ),
            })
            .collect();
        let cholesky = config.returns.correlation.as_ref().map(cholesky).transpose()?;

        Ok(Self {
            years,
            volatilities: config.returns.volatilities(),
            cholesky,
        })
    }

    #[must_use]
    pub fn year(&self, year_index: usize) -> &YearMarket {
        &self.years[year_index]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.years.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Per-asset returns for `year_index` given standard-normal shocks `z`
    #[must_use]
    pub fn asset_returns(
        &self,
        year_index: usize,
        z: &[f64; ASSET_CLASS_COUNT],
    ) -> [f64; ASSET_CLASS_COUNT] {
        let correlated = match &self.cholesky {
            Some(l) => std::array::from_fn(|i| (0..=i).map(|k| l[i][k] * z[k]).sum()),
            None => *z,
        };
        let means = &self.years[year_index].means;
        std::array::from_fn(|i| means[i] + self.volatilities[i] * correlated[i])
    }

    /// Weighted portfolio return for `year_index`
    #[must_use]
    pub fn portfolio_return(&self, year_index: usize, z: &[f64; ASSET_CLASS_COUNT]) -> f64 {
        let returns = self.asset_returns(year_index, z);
        portfolio_return(&self.years[year_index].weights, &returns)
    }
}

#[must_use]
pub fn portfolio_return(weights: &Allocation, returns: &[f64; ASSET_CLASS_COUNT]) -> f64 {
    weights
        .as_array()
        .iter()
        .zip(returns)
        .map(|(w, r)| w * r)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MarketRegime;

    #[test]
    fn test_cholesky_reconstructs_matrix() {
        let corr = [
            [1.0, 0.2, 0.5, 0.0],
            [0.2, 1.0, 0.1, 0.3],
            [0.5, 0.1, 1.0, 0.0],
            [0.0, 0.3, 0.0, 1.0],
        ];
        let l = cholesky(&corr).unwrap();
        for i in 0..4 {
            for j in 0..4 {
                let v: f64 = (0..4).map(|k| l[i][k] * l[j][k]).sum();
                assert!((v - corr[i][j]).abs() < 1e-12, "({i},{j})");
            }
        }
    }

    #[test]
    fn test_cholesky_rejects_indefinite() {
        let mut corr = [[0.0; 4]; 4];
        for (i, row) in corr.iter_mut().enumerate() {
            row[i] = 1.0;
        }
        corr[0][1] = 1.0;
        corr[1][0] = 1.0;
        assert!(cholesky(&corr).is_err());
    }

    #[test]
    fn test_zero_shocks_give_means() {
        let config = SimulationConfig {
            regime: MarketRegime::RecessionRecover,
            ..SimulationConfig::default()
        };
        let schedule = ReturnSchedule::new(&config).unwrap();
        let z = ExpectedReturns.next_shocks();
        let r = schedule.asset_returns(0, &z);
        assert_eq!(r[0], -0.15);
        assert_eq!(r[1], config.returns.bonds.mean);
        assert_eq!(schedule.len(), config.horizon_years as usize);
    }

    #[test]
    fn test_gaussian_shocks_reproducible() {
        let mut a = GaussianShocks::from_seed(7);
        let mut b = GaussianShocks::from_seed(7);
        for _ in 0..10 {
            assert_eq!(a.next_shocks(), b.next_shocks());
        }
    }

    #[test]
    fn test_portfolio_return_weights() {
        let w = Allocation::new(0.5, 0.5, 0.0, 0.0);
        assert!((portfolio_return(&w, &[0.10, 0.02, 1.0, 1.0]) - 0.06).abs() < 1e-12);
    }
}

//! Retirement drawdown projection library
//!
//! This crate projects how a retirement portfolio holds up under uncertain
//! market returns. It provides:
//! - A Monte Carlo engine running thousands of independent trajectories
//! - A deterministic projector using expected returns
//! - Correlated normal returns per asset class with optional market regimes
//! - A tax-aware gross-up of every withdrawal (progressive brackets)
//! - CAPE-based spending with Guyton-Klinger guardrails, or fixed spending
//! - Social Security benefits with funding-shortfall scenarios
//! - Overlapping income and expense streams
//!
//! All amounts are real (inflation-adjusted) dollars.
//!
//! # Example
//!
//! ```ignore
//! use drawdown_core::config::SimulationBuilder;
//! use drawdown_core::simulation::simulate_monte_carlo;
//!
//! let config = SimulationBuilder::new()
//!     .start_capital(2_000_000.0)
//!     .fixed_spending(80_000.0)
//!     .simulations(1_000)
//!     .seed(7)
//!     .build()?;
//! let results = simulate_monte_carlo(&config)?;
//! println!("success rate: {:.1}%", results.success_rate * 100.0);
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod cash_flows;
pub mod deterministic;
pub mod error;
pub mod pipeline;
pub mod returns;
pub mod simulation;
pub mod social_security;
pub mod spending;
pub mod statistics;
pub mod taxes;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use config::{SimulationBuilder, SimulationConfig};
pub use deterministic::project_deterministic;
pub use error::{ConfigError, SimulationError, TaxError};
pub use simulation::{simulate_monte_carlo, simulate_monte_carlo_with};

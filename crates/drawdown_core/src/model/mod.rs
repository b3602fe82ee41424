mod allocation;
mod cash_flows;
mod market;
mod results;
mod social_security;
mod spending;
mod tax_config;

pub use allocation::{
    ASSET_CLASS_COUNT, Allocation, AssetClass, WEIGHT_SUM_TOLERANCE, weights_for_year,
};
pub use cash_flows::{CashFlowStream, LegacyIncome, Windfall};
pub use market::{
    MarketRegime, RecoveryPattern, RegimeOverride, ReturnAssumptions, ReturnDistribution,
};
pub use results::{
    DeterministicResults, PathDetail, PercentileBand, PercentilePath, SimulationResults,
    SummaryStats, YearRecord, YearlyDiagnostics,
};
pub use social_security::{
    FundingScenario, MAX_CLAIMING_AGE, MIN_CLAIMING_AGE, SocialSecurityConfig, SpousalBenefit,
    TRUST_FUND_DEPLETION_YEAR,
};
pub use spending::{
    DEFAULT_CAPE_BASE_RATE, DEFAULT_CAPE_SENSITIVITY, GuardrailAction, Guardrails,
    SpendingClamp, SpendingPolicy,
};
pub use tax_config::{
    FilingStatus, SolverFallback, SolverSettings, StateTaxPreset, TaxBracket, TaxConfig,
};

//! Term-based interest rate selection.
//!
//! Longer terms carry a higher nominal rate. The table is plain data so it
//! can be shipped as JSON and handed to a [`Simulator`](crate::Simulator).

use std::path::Path;

use anyhow::Context;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FinancingError;

/// Applies to every term up to and including `max_months`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateTier {
    /// Longest term, in months, covered by this tier.
    pub max_months: u32,
    /// Nominal annual rate as a fraction.
    pub annual_rate: Decimal,
}

/// An ordered lookup table from term length to annual interest rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatePolicy {
    /// Tiers sorted by strictly ascending `max_months`.
    pub tiers: Vec<RateTier>,
    /// Rate for terms longer than the last tier.
    pub fallback_rate: Decimal,
}

impl Default for RatePolicy {
    /// 6% a year up to 12 months, then +2 points per extra year, capped at 14%.
    fn default() -> Self {
        let tier = |max_months, annual_rate| RateTier {
            max_months,
            annual_rate,
        };

        RatePolicy {
            tiers: vec![
                tier(12, dec!(0.06)),
                tier(24, dec!(0.08)),
                tier(36, dec!(0.10)),
                tier(48, dec!(0.12)),
            ],
            fallback_rate: dec!(0.14),
        }
    }
}

impl RatePolicy {
    /// Returns the annual rate for a term of `months`.
    pub fn rate_for(&self, months: u32) -> Decimal {
        self.tiers
            .iter()
            .find(|tier| months <= tier.max_months)
            .map_or(self.fallback_rate, |tier| tier.annual_rate)
    }

    pub fn validate(&self) -> Result<(), FinancingError> {
        let mut previous: Option<u32> = None;

        for tier in &self.tiers {
            if tier.max_months == 0 {
                return Err(FinancingError::InvalidConfig(
                    "tier maxMonths must be greater than zero".into(),
                ));
            }
            if previous.is_some_and(|prev| tier.max_months <= prev) {
                return Err(FinancingError::InvalidConfig(format!(
                    "tiers must be in strictly ascending order, found {} after {}",
                    tier.max_months,
                    previous.unwrap_or_default()
                )));
            }
            if tier.annual_rate < Decimal::ZERO {
                return Err(FinancingError::InvalidConfig(format!(
                    "negative rate {} for terms up to {} months",
                    tier.annual_rate, tier.max_months
                )));
            }
            previous = Some(tier.max_months);
        }

        if self.fallback_rate < Decimal::ZERO {
            return Err(FinancingError::InvalidConfig(format!(
                "negative fallback rate {}",
                self.fallback_rate
            )));
        }

        Ok(())
    }

    /// Parses and validates a policy from its JSON form.
    ///
    /// ```
    /// use auto_financing::RatePolicy;
    /// use rust_decimal_macros::dec;
    ///
    /// let policy = RatePolicy::from_json_str(
    ///     r#"{ "tiers": [{ "maxMonths": 24, "annualRate": "0.05" }], "fallbackRate": "0.09" }"#,
    /// ).unwrap();
    /// assert_eq!(policy.rate_for(18), dec!(0.05));
    /// assert_eq!(policy.rate_for(36), dec!(0.09));
    /// ```
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let policy: RatePolicy =
            serde_json::from_str(json).context("Failed to parse rate policy JSON")?;
        policy.validate()?;

        tracing::debug!(
            tiers = policy.tiers.len(),
            fallback_rate = %policy.fallback_rate,
            "rate policy loaded"
        );
        Ok(policy)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rate policy from {}", path.display()))?;

        Self::from_json_str(&json)
            .with_context(|| format!("Invalid rate policy in {}", path.display()))
    }
}

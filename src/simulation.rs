//! Financing quotes for a vehicle purchase.
//!
//! This is the layer that sits between a financing request (vehicle value,
//! down payment, term) and the amortization engine: it validates the request,
//! derives the principal, picks the rate and builds the schedule.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amortization::{AmortizationResult, build_schedule, compute_installment, round_currency};
use crate::error::FinancingError;
use crate::rate_policy::RatePolicy;

/// A request to finance a vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancingRequest {
    /// Total vehicle value.
    #[serde(rename = "value")]
    pub vehicle_value: Decimal,
    /// Paid upfront, defaults to zero.
    #[serde(default)]
    pub down_payment: Decimal,
    /// Number of monthly payments.
    #[serde(rename = "countOfMonths")]
    pub months: i32,
    /// Overrides the rate policy when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<Decimal>,
    /// A previously quoted installment to keep stable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installment_value: Option<Decimal>,
}

/// The outcome of a simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancingQuote {
    /// Amount financed.
    pub principal: Decimal,
    /// Annual rate the schedule was built with.
    pub interest_rate: Decimal,
    /// Installment, schedule and total interest.
    pub amortization: AmortizationResult,
    /// Principal plus total interest.
    pub total_amount: Decimal,
}

impl FinancingRequest {
    pub fn new(vehicle_value: Decimal, down_payment: Decimal, months: i32) -> Self {
        FinancingRequest {
            vehicle_value,
            down_payment,
            months,
            interest_rate: None,
            installment_value: None,
        }
    }

    pub fn with_interest_rate(mut self, rate: Decimal) -> Self {
        self.interest_rate = Some(rate);
        self
    }

    pub fn with_installment(mut self, installment: Decimal) -> Self {
        self.installment_value = Some(installment);
        self
    }

    /// Amount financed: vehicle value minus down payment, in cents.
    pub fn principal(&self) -> Decimal {
        round_currency(self.vehicle_value.saturating_sub(self.down_payment))
    }

    pub fn validate(&self) -> Result<(), FinancingError> {
        if self.vehicle_value <= Decimal::ZERO {
            return Err(FinancingError::invalid_input(
                "value",
                "invalid vehicle value, must be greater than zero",
            ));
        }
        if self.down_payment < Decimal::ZERO {
            return Err(FinancingError::invalid_input(
                "downPayment",
                "must not be negative",
            ));
        }
        if self.down_payment > self.vehicle_value {
            return Err(FinancingError::invalid_input(
                "downPayment",
                "exceeds the vehicle value",
            ));
        }
        if self.months <= 0 {
            return Err(FinancingError::invalid_input(
                "countOfMonths",
                "must be greater than zero",
            ));
        }
        if self.interest_rate.is_some_and(|rate| rate < Decimal::ZERO) {
            return Err(FinancingError::invalid_input(
                "interestRate",
                "must not be negative",
            ));
        }
        if self
            .installment_value
            .is_some_and(|installment| installment <= Decimal::ZERO)
        {
            return Err(FinancingError::invalid_input(
                "installmentValue",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Produces financing quotes against an injected rate policy.
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    policy: RatePolicy,
}

impl Simulator {
    pub fn new(policy: RatePolicy) -> Self {
        Simulator { policy }
    }

    pub fn policy(&self) -> &RatePolicy {
        &self.policy
    }

    /// The request's own rate, or the policy rate for its term.
    pub fn rate_for(&self, request: &FinancingRequest) -> Decimal {
        request
            .interest_rate
            .unwrap_or_else(|| self.policy.rate_for(request.months.max(0).unsigned_abs()))
    }

    /// The installment to record for a request: the pinned one if given,
    /// otherwise the computed PRICE installment.
    pub fn installment(&self, request: &FinancingRequest) -> Result<Decimal, FinancingError> {
        request.validate()?;

        Ok(request.installment_value.unwrap_or_else(|| {
            compute_installment(request.principal(), self.rate_for(request), request.months)
        }))
    }

    /// Validates the request and builds its full amortization.
    ///
    /// ```
    /// use auto_financing::{FinancingRequest, Simulator};
    /// use rust_decimal_macros::dec;
    ///
    /// let quote = Simulator::default()
    ///     .quote(&FinancingRequest::new(dec!(50000), dec!(10000), 12))
    ///     .unwrap();
    ///
    /// assert_eq!(quote.principal, dec!(40000));
    /// assert_eq!(quote.interest_rate, dec!(0.06));
    /// assert_eq!(quote.amortization.schedule.len(), 12);
    /// ```
    pub fn quote(&self, request: &FinancingRequest) -> Result<FinancingQuote, FinancingError> {
        request.validate()?;

        let principal = request.principal();
        let interest_rate = self.rate_for(request);
        let amortization = build_schedule(
            principal,
            interest_rate,
            request.months,
            request.installment_value,
        );
        let total_amount = round_currency(principal.saturating_add(amortization.total_interest));

        tracing::debug!(
            %principal,
            %interest_rate,
            months = request.months,
            payment = %amortization.payment,
            %total_amount,
            "financing quote computed"
        );

        Ok(FinancingQuote {
            principal,
            interest_rate,
            amortization,
            total_amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_policy::RateTier;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_quote_uses_policy_rate() {
        let request = FinancingRequest::new(dec!(50000), dec!(10000), 24);
        let quote = Simulator::default().quote(&request).unwrap();

        assert_eq!(quote.principal, dec!(40000));
        assert_eq!(quote.interest_rate, dec!(0.08));
        assert_eq!(quote.amortization.schedule.len(), 24);
        assert_eq!(
            quote.total_amount,
            quote.principal + quote.amortization.total_interest
        );
    }

    #[test]
    fn test_quote_with_explicit_rate() {
        let request = FinancingRequest::new(dec!(45000), dec!(5000), 12).with_interest_rate(dec!(0.08));
        let quote = Simulator::default().quote(&request).unwrap();

        assert_eq!(quote.interest_rate, dec!(0.08));
        assert_eq!(quote.amortization.payment, dec!(3479.54));
        assert_eq!(quote.amortization.total_interest, dec!(1754.44));
        assert_eq!(quote.total_amount, dec!(41754.44));
    }

    #[test]
    fn test_quote_honors_pinned_installment() {
        let request = FinancingRequest::new(dec!(12000), dec!(0), 12)
            .with_interest_rate(dec!(0.12))
            .with_installment(dec!(1000));
        let quote = Simulator::default().quote(&request).unwrap();

        assert_eq!(quote.amortization.payment, dec!(1000));
        assert_eq!(
            quote.amortization.schedule.last().unwrap().balance,
            dec!(839.40)
        );
    }

    #[test]
    fn test_quote_with_custom_policy() {
        let policy = RatePolicy {
            tiers: vec![],
            fallback_rate: dec!(0),
        };
        let quote = Simulator::new(policy)
            .quote(&FinancingRequest::new(dec!(10000), dec!(0), 10))
            .unwrap();

        assert_eq!(quote.interest_rate, dec!(0));
        assert_eq!(quote.amortization.payment, dec!(1000));
        assert_eq!(quote.total_amount, dec!(10000));
    }

    #[test]
    fn test_quote_with_non_amortizing_installment_over_long_term() {
        let request = FinancingRequest::new(dec!(1000000), dec!(0), 600)
            .with_interest_rate(dec!(12))
            .with_installment(dec!(1));
        let quote = Simulator::default().quote(&request).unwrap();

        assert_eq!(quote.amortization.schedule.len(), 600);
        assert_eq!(quote.amortization.payment, dec!(1));
        assert!(quote.total_amount >= quote.principal);
    }

    #[test]
    fn test_simulator_exposes_injected_policy() {
        let policy = RatePolicy {
            tiers: vec![RateTier {
                max_months: 24,
                annual_rate: dec!(0.05),
            }],
            fallback_rate: dec!(0.09),
        };
        let simulator = Simulator::new(policy.clone());

        assert_eq!(simulator.policy(), &policy);
        assert_eq!(Simulator::default().policy(), &RatePolicy::default());
        assert_eq!(
            simulator.rate_for(&FinancingRequest::new(dec!(1000), dec!(0), 36)),
            dec!(0.09)
        );
    }

    #[test]
    fn test_principal_is_rounded_to_cents() {
        let request = FinancingRequest::new(dec!(30000.456), dec!(1000.001), 12);

        assert_eq!(request.principal(), dec!(29000.46));
    }

    #[test]
    fn test_full_down_payment_gives_zero_principal() {
        let quote = Simulator::default()
            .quote(&FinancingRequest::new(dec!(20000), dec!(20000), 12))
            .unwrap();

        assert_eq!(quote.principal, dec!(0));
        assert_eq!(quote.amortization.payment, dec!(0));
        assert_eq!(quote.total_amount, dec!(0));
    }

    #[rstest]
    #[case::zero_value(FinancingRequest::new(dec!(0), dec!(0), 12), "value")]
    #[case::negative_value(FinancingRequest::new(dec!(-1), dec!(0), 12), "value")]
    #[case::negative_down_payment(FinancingRequest::new(dec!(1000), dec!(-1), 12), "downPayment")]
    #[case::excessive_down_payment(FinancingRequest::new(dec!(1000), dec!(1001), 12), "downPayment")]
    #[case::zero_months(FinancingRequest::new(dec!(1000), dec!(0), 0), "countOfMonths")]
    #[case::negative_rate(
        FinancingRequest::new(dec!(1000), dec!(0), 12).with_interest_rate(dec!(-0.01)),
        "interestRate"
    )]
    #[case::zero_installment(
        FinancingRequest::new(dec!(1000), dec!(0), 12).with_installment(dec!(0)),
        "installmentValue"
    )]
    fn test_invalid_requests_are_rejected(#[case] request: FinancingRequest, #[case] field: &str) {
        let simulator = Simulator::default();

        let err = simulator.quote(&request).unwrap_err();
        assert_eq!(err.field(), Some(field));
        assert!(simulator.installment(&request).is_err());
    }

    #[test]
    fn test_installment_prefers_pinned_value() {
        let simulator = Simulator::default();
        let request = FinancingRequest::new(dec!(12000), dec!(0), 12).with_interest_rate(dec!(0.12));

        assert_eq!(simulator.installment(&request).unwrap(), dec!(1066.19));
        assert_eq!(
            simulator
                .installment(&request.clone().with_installment(dec!(1100)))
                .unwrap(),
            dec!(1100)
        );
    }

    #[test]
    fn test_request_deserializes_from_finance_payload() {
        let json = r#"{
            "value": "50000",
            "downPayment": "10000",
            "countOfMonths": 36,
            "interestRate": "0.10"
        }"#;
        let request: FinancingRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.vehicle_value, dec!(50000));
        assert_eq!(request.down_payment, dec!(10000));
        assert_eq!(request.months, 36);
        assert_eq!(request.interest_rate, Some(dec!(0.10)));
        assert_eq!(request.installment_value, None);
    }

    #[test]
    fn test_down_payment_defaults_to_zero() {
        let request: FinancingRequest =
            serde_json::from_str(r#"{ "value": "20000", "countOfMonths": 12 }"#).unwrap();

        assert_eq!(request.down_payment, dec!(0));
        assert_eq!(request.principal(), dec!(20000));
    }
}

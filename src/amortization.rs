//! Fixed-installment (PRICE) amortization.
//!
//! Every period pays the same amount; the interest share shrinks as the
//! balance falls. All intermediate money values are rounded to cents per
//! period, so the figures shown on each line are the ones that add up.

use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FinancingError;

const MONTHS_PER_YEAR: Decimal = dec!(12);
const CURRENCY_DECIMALS: u32 = 2;

/// The inputs of a single amortization run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanTerms {
    /// Amount financed.
    pub principal: Decimal,
    /// Nominal annual rate as a fraction (0.08 for 8% a year).
    pub annual_interest_rate: Decimal,
    /// Number of monthly payments.
    pub months: i32,
}

/// One line of the amortization table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationEntry {
    /// 1-based period number.
    pub month: u32,
    /// Amount paid this period.
    pub payment: Decimal,
    /// Portion of the payment that reduces the balance.
    pub principal_paid: Decimal,
    /// Portion of the payment that covers interest.
    pub interest: Decimal,
    /// Outstanding balance after this period's payment.
    pub balance: Decimal,
}

/// A full schedule together with its aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationResult {
    /// One entry per month, in order.
    pub schedule: Vec<AmortizationEntry>,
    /// Sum of the rounded per-period interest values.
    pub total_interest: Decimal,
    /// The fixed monthly payment, rounded to cents.
    pub payment: Decimal,
}

impl LoanTerms {
    pub fn new(principal: Decimal, annual_interest_rate: Decimal, months: i32) -> Self {
        LoanTerms {
            principal,
            annual_interest_rate,
            months,
        }
    }

    /// Checks the business constraints the engine deliberately does not enforce.
    pub fn validate(&self) -> Result<(), FinancingError> {
        if self.principal <= Decimal::ZERO {
            return Err(FinancingError::invalid_input(
                "principal",
                "must be greater than zero",
            ));
        }
        if self.annual_interest_rate < Decimal::ZERO {
            return Err(FinancingError::invalid_input(
                "annual_interest_rate",
                "must not be negative",
            ));
        }
        if self.months <= 0 {
            return Err(FinancingError::invalid_input(
                "months",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    pub fn installment(&self) -> Decimal {
        compute_installment(self.principal, self.annual_interest_rate, self.months)
    }

    pub fn schedule(&self) -> AmortizationResult {
        build_schedule(self.principal, self.annual_interest_rate, self.months, None)
    }
}

/// Rounds a money value to cents, midpoints away from zero.
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CURRENCY_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts a nominal annual rate into the flat monthly rate (`annual / 12`).
pub fn monthly_rate(annual_rate: Decimal) -> Decimal {
    annual_rate / MONTHS_PER_YEAR
}

/// Computes the fixed monthly payment for the given terms.
///
/// The formula is `PMT = P * r / (1 - (1 + r)^-n)` with `r` the monthly rate.
/// A zero rate falls back to the straight-line `P / n`, and a non-positive
/// term yields `0`.
///
/// This never fails: degenerate inputs (negative principal, negative rates)
/// produce degenerate payments. When the annuity factor cannot be represented,
/// for example a rate of -100% a month, the payment is `0`.
///
/// # Examples
///
/// ```
/// use auto_financing::compute_installment;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(compute_installment(dec!(12000), dec!(0.12), 12), dec!(1066.19));
/// assert_eq!(compute_installment(dec!(12000), dec!(0), 12), dec!(1000));
/// assert_eq!(compute_installment(dec!(12000), dec!(0.12), 0), dec!(0));
/// ```
pub fn compute_installment(principal: Decimal, annual_rate: Decimal, months: i32) -> Decimal {
    if months <= 0 {
        return Decimal::ZERO;
    }

    let rate = monthly_rate(annual_rate);
    if rate.is_zero() {
        return round_currency(principal / Decimal::from(months));
    }

    match annuity_factor(rate, months.unsigned_abs()).and_then(|f| principal.checked_mul(f)) {
        Some(payment) => round_currency(payment),
        None => {
            tracing::warn!(
                %principal,
                %annual_rate,
                months,
                "annuity factor is not representable, installment collapsed to zero"
            );
            Decimal::ZERO
        }
    }
}

/// `r / (1 - (1 + r)^-n)`, or `None` when it is undefined or out of range.
fn annuity_factor(rate: Decimal, months: u32) -> Option<Decimal> {
    let discount = match (Decimal::ONE + rate).checked_powu(u64::from(months)) {
        Some(growth) => Decimal::ONE.checked_div(growth)?,
        // (1 + r)^n overflowed: its inverse is below decimal precision.
        None if rate > Decimal::ZERO => Decimal::ZERO,
        None => return None,
    };

    rate.checked_div(Decimal::ONE.checked_sub(discount)?)
}

/// Builds the month-by-month amortization table.
///
/// The payment comes from [`compute_installment`] unless `fixed_payment` is
/// given, in which case that exact amount is used for every period, even if
/// it leaves a balance at the end.
///
/// For each period the interest on the running balance is rounded to cents,
/// the principal share is capped at the outstanding balance, and the new
/// balance is rounded again. The total interest is the sum of the rounded
/// per-period interest, so it always matches the printed lines.
///
/// A pinned payment below the interest makes the balance grow every period.
/// If it grows out of the decimal range, the schedule freezes: the remaining
/// periods keep the last representable balance and accrue no interest.
pub fn build_schedule(
    principal: Decimal,
    annual_rate: Decimal,
    months: i32,
    fixed_payment: Option<Decimal>,
) -> AmortizationResult {
    let rate = monthly_rate(annual_rate);
    let payment =
        fixed_payment.unwrap_or_else(|| compute_installment(principal, annual_rate, months));

    let periods = u32::try_from(months).unwrap_or(0);
    let mut balance = principal;
    let mut total_interest = Decimal::ZERO;
    let mut frozen_at: Option<u32> = None;
    let mut schedule = Vec::with_capacity(periods as usize);

    for month in 1..=periods {
        let step = match frozen_at {
            Some(_) => None,
            None => amortize_period(balance, rate, payment).and_then(|(interest, paid, next)| {
                let total = total_interest.checked_add(interest)?;
                Some((interest, paid, next, total))
            }),
        };

        let (interest, principal_paid) = match step {
            Some((interest, paid, next, total)) => {
                balance = next;
                total_interest = total;
                (interest, paid)
            }
            None => {
                if frozen_at.is_none() {
                    tracing::warn!(
                        %principal,
                        %annual_rate,
                        %payment,
                        month,
                        %balance,
                        "balance left the decimal range, schedule frozen"
                    );
                    frozen_at = Some(month);
                }
                (Decimal::ZERO, Decimal::ZERO)
            }
        };

        schedule.push(AmortizationEntry {
            month,
            payment,
            principal_paid,
            interest,
            balance,
        });
    }

    tracing::debug!(
        %principal,
        %annual_rate,
        months,
        %payment,
        %total_interest,
        final_balance = %balance,
        frozen_at,
        "amortization schedule built"
    );

    AmortizationResult {
        schedule,
        total_interest: round_currency(total_interest),
        payment: round_currency(payment),
    }
}

/// One period's `(interest, principal_paid, new_balance)`, or `None` on overflow.
fn amortize_period(
    balance: Decimal,
    rate: Decimal,
    payment: Decimal,
) -> Option<(Decimal, Decimal, Decimal)> {
    let interest = round_currency(balance.checked_mul(rate)?);
    let principal_paid = round_currency(payment.checked_sub(interest)?.min(balance));
    let new_balance = round_currency(balance.checked_sub(principal_paid)?);

    Some((interest, principal_paid, new_balance))
}

//! `auto_financing` computes vehicle financing installments and amortization
//! tables using the **Price** system (Sistema Francês de Amortização): a fixed
//! payment every month, with the interest share shrinking as the balance falls.
//!
//! The same engine backs both the simulation shown to a customer and the
//! installment stored with a financing record, so the two never drift apart.
//!
//! - [`compute_installment`] and [`build_schedule`] are the pure engine. They
//!   never fail; validating the inputs is the caller's job.
//! - [`RatePolicy`] maps a term length to an annual rate and can be loaded
//!   from JSON.
//! - [`Simulator`] validates a [`FinancingRequest`], derives the principal
//!   (vehicle value minus down payment) and produces a [`FinancingQuote`].
//!
//! Annual rates are nominal fractions (`0.08` is 8% a year) and are divided by
//! 12 to get the monthly rate. Money is rounded to cents on every period, with
//! midpoints rounded away from zero.
//!
//! ## Usage
//!
//! Add `auto_financing` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! auto_financing = "0.1.0"
//! rust_decimal = "1.39.0"
//! rust_decimal_macros = "1.39.0"
//! ```
//!
//! Then build a schedule directly, or go through the simulator:
//!
//! ```rust
//! use auto_financing::{build_schedule, FinancingRequest, Simulator};
//! use rust_decimal_macros::dec;
//!
//! fn main() {
//!     let result = build_schedule(dec!(40000), dec!(0.08), 12, None);
//!     println!("Installment:    {:.2}", result.payment);
//!     println!("Total interest: {:.2}", result.total_interest);
//!
//!     let request = FinancingRequest::new(dec!(50000), dec!(10000), 36);
//!     match Simulator::default().quote(&request) {
//!         Ok(quote) => {
//!             println!("Rate:         {}", quote.interest_rate);
//!             println!("Total amount: {:.2}", quote.total_amount);
//!         }
//!         Err(e) => {
//!             eprintln!("Error simulating financing: {}", e);
//!         }
//!     }
//! }
//! ```

pub mod amortization;
pub mod error;
pub mod rate_policy;
pub mod simulation;

pub use amortization::{
    AmortizationEntry, AmortizationResult, LoanTerms, build_schedule, compute_installment,
    monthly_rate, round_currency,
};
pub use error::FinancingError;
pub use rate_policy::{RatePolicy, RateTier};
pub use simulation::{FinancingQuote, FinancingRequest, Simulator};

//! Level-payment (annuity) amortization schedules for hire-purchase and
//! consumer loans.

pub mod error;
pub mod loan;
pub mod render;

pub use error::ScheduleError;
pub use loan::{generate, generate_from_today, level_payment, Installment, LoanTerms, Schedule};

pub type Result<T> = std::result::Result<T, ScheduleError>;

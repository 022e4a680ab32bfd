use chrono::{Local, Months, NaiveDate};
use log::{info, trace};
use std::fmt;

use crate::{Result, ScheduleError};

const MONTHS_PER_YEAR: f64 = 12.;

/// Amount financed, annual rate and term of a level-payment loan.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoanTerms {
    pub principal: f64,
    /// Annual rate in percent, i.e. 12.0 for 12%.
    pub annual_rate_percent: f64,
    pub term_months: u32,
}

impl LoanTerms {
    pub fn new(principal: f64, annual_rate_percent: f64, term_months: u32) -> Self {
        Self {
            principal,
            annual_rate_percent,
            term_months,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.principal.is_finite() || self.principal <= 0. {
            return Err(ScheduleError::invalid(
                "principal",
                format!("must be a positive amount, got {}", self.principal),
            ));
        }
        if !self.annual_rate_percent.is_finite() || self.annual_rate_percent < 0. {
            return Err(ScheduleError::invalid(
                "annual_rate_percent",
                format!("must be zero or positive, got {}", self.annual_rate_percent),
            ));
        }
        if self.term_months == 0 {
            return Err(ScheduleError::invalid("term_months", "must be at least 1"));
        }
        Ok(())
    }

    /// Monthly rate as a decimal (12% a year is 0.01).
    pub fn periodic_rate(&self) -> f64 {
        self.annual_rate_percent / 100. / MONTHS_PER_YEAR
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Installment {
    pub number: u32,
    pub due_date: NaiveDate,
    pub payment: f64,
    pub principal: f64,
    pub interest: f64,
    pub balance: f64,
}

impl Installment {
    /// Copy with every amount rounded to `dec_places`, for presentation only.
    pub fn rounded(&self, dec_places: u32) -> Self {
        Self {
            payment: round(self.payment, dec_places),
            principal: round(self.principal, dec_places),
            interest: round(self.interest, dec_places),
            balance: round(self.balance, dec_places),
            ..*self
        }
    }
}

impl fmt::Display for Installment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "installment {}, due {}, payment ${:.2}, principal ${:.2}, interest ${:.2}, balance ${:.2}",
            self.number,
            self.due_date,
            round(self.payment, 2),
            round(self.principal, 2),
            round(self.interest, 2),
            round(self.balance, 2)
        )
    }
}

/// A generated amortization schedule. Amounts are kept unrounded; round
/// with [`Schedule::rounded`] or at display time.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Schedule {
    terms: LoanTerms,
    start_date: NaiveDate,
    payment: f64,
    total_principal: f64,
    total_interest: f64,
    total_paid: f64,
    installments: Vec<Installment>,
}

impl Schedule {
    pub fn terms(&self) -> &LoanTerms {
        &self.terms
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// The level payment due every month.
    pub fn payment(&self) -> f64 {
        self.payment
    }

    pub fn total_principal(&self) -> f64 {
        self.total_principal
    }

    pub fn total_interest(&self) -> f64 {
        self.total_interest
    }

    /// Level payment times the number of installments.
    pub fn total_paid(&self) -> f64 {
        self.total_paid
    }

    pub fn installments(&self) -> &[Installment] {
        &self.installments
    }

    pub fn len(&self) -> usize {
        self.installments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.installments.is_empty()
    }

    /// Looks up an installment by its 1-based number.
    pub fn installment(&self, number: u32) -> Option<&Installment> {
        number
            .checked_sub(1)
            .and_then(|idx| self.installments.get(idx as usize))
    }

    /// Scheduled balance once every installment due on or before `date`
    /// has been paid.
    pub fn outstanding_on(&self, date: NaiveDate) -> f64 {
        self.installments
            .iter()
            .take_while(|inst| inst.due_date <= date)
            .last()
            .map_or(self.terms.principal, |inst| inst.balance)
    }

    /// First installment falling due strictly after `date`.
    pub fn next_due(&self, date: NaiveDate) -> Option<&Installment> {
        self.installments.iter().find(|inst| inst.due_date > date)
    }

    pub fn rounded(&self, dec_places: u32) -> Self {
        Self {
            terms: self.terms,
            start_date: self.start_date,
            payment: round(self.payment, dec_places),
            total_principal: round(self.total_principal, dec_places),
            total_interest: round(self.total_interest, dec_places),
            total_paid: round(self.total_paid, dec_places),
            installments: self
                .installments
                .iter()
                .map(|inst| inst.rounded(dec_places))
                .collect(),
        }
    }
}

pub(crate) fn round(amt: f64, dec: u32) -> f64 {
    if amt == 0. {
        0.
    } else {
        let factor = 10_f64.powi(dec as i32);
        (amt * factor).round() / factor
    }
}

// P r (1+r)^n / ((1+r)^n - 1), rewritten as P r / (1 - (1+r)^-n) so that
// (1+r)^n can neither overflow nor cancel against 1
fn payment_amount(principal: f64, rate: f64, term_months: u32) -> f64 {
    let n = f64::from(term_months);
    if rate > 0. {
        principal * rate / -(-n * rate.ln_1p()).exp_m1()
    } else {
        principal / n
    }
}

/// Balance left after `paid` of `term_months` level payments, in closed form
/// so rounding error is not compounded from one period to the next.
fn balance_after(principal: f64, rate: f64, term_months: u32, paid: u32) -> f64 {
    if paid >= term_months {
        return 0.;
    }
    let remaining = f64::from(term_months - paid);
    if rate > 0. {
        let growth = rate.ln_1p();
        principal * (-remaining * growth).exp_m1()
            / (-f64::from(term_months) * growth).exp_m1()
    } else {
        principal * remaining / f64::from(term_months)
    }
}

fn checked_payment(terms: &LoanTerms) -> Result<f64> {
    let payment = payment_amount(terms.principal, terms.periodic_rate(), terms.term_months);
    if !payment.is_finite() {
        return Err(ScheduleError::invalid(
            "annual_rate_percent",
            format!(
                "{}% on {} does not give a finite payment",
                terms.annual_rate_percent, terms.principal
            ),
        ));
    }
    Ok(payment)
}

fn due_date(start_date: NaiveDate, months: u32) -> Result<NaiveDate> {
    // offset from the start every time so a month-end start date is not
    // dragged down by a short month (Jan 31 -> Feb 29 -> Mar 31)
    start_date
        .checked_add_months(Months::new(months))
        .ok_or(ScheduleError::DateOutOfRange {
            start: start_date,
            months,
        })
}

/// Level payment for `terms`, without building the schedule.
pub fn level_payment(terms: &LoanTerms) -> Result<f64> {
    terms.validate()?;
    checked_payment(terms)
}

/// Builds the level-payment schedule for `terms`, with installment `i` due
/// `i` calendar months after `start_date`.
pub fn generate(terms: &LoanTerms, start_date: NaiveDate) -> Result<Schedule> {
    terms.validate()?;

    let rate = terms.periodic_rate();
    let payment = checked_payment(terms)?;
    // last due date bounds every other one
    due_date(start_date, terms.term_months)?;

    let mut installments = Vec::with_capacity(terms.term_months as usize);
    let mut balance = terms.principal;

    for number in 1..=terms.term_months {
        let due_date = due_date(start_date, number)?;
        let interest = balance * rate;
        let next_balance =
            balance_after(terms.principal, rate, terms.term_months, number).clamp(0., balance);
        // equals payment - interest, without the cancellation
        let principal = balance - next_balance;
        balance = next_balance;

        trace!(
            "Installment # {}, due {}, interest {}, principal {}, balance {}",
            number,
            due_date,
            interest,
            principal,
            balance
        );

        installments.push(Installment {
            number,
            due_date,
            payment,
            principal,
            interest,
            balance,
        });
    }

    let total_principal = installments.iter().map(|inst| inst.principal).sum();
    let total_interest = installments.iter().map(|inst| inst.interest).sum();
    let total_paid = payment * f64::from(terms.term_months);
    info!(
        "Generated {} installments of {:.2} on {:.2} at {}%, total interest {:.2}",
        terms.term_months, payment, terms.principal, terms.annual_rate_percent, total_interest
    );

    Ok(Schedule {
        terms: *terms,
        start_date,
        payment,
        total_principal,
        total_interest,
        total_paid,
        installments,
    })
}

/// [`generate`] with the local calendar date as the start date.
pub fn generate_from_today(terms: &LoanTerms) -> Result<Schedule> {
    generate(terms, Local::now().date_naive())
}

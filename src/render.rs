//! Text renderings of a [`Schedule`]. Amounts are rounded here and nowhere
//! earlier.

use tabled::{builder::Builder, settings::Style};

use crate::loan::{round, Schedule};
use crate::{Result, ScheduleError};

const HEADER: [&str; 6] = ["#", "Due date", "Payment", "Principal", "Interest", "Balance"];

fn money(amt: f64, dec_places: u32) -> String {
    format!("{:.*}", dec_places as usize, round(amt, dec_places))
}

/// Boxed table with one row per installment and a totals footer.
pub fn table(schedule: &Schedule, dec_places: u32) -> String {
    let mut builder = Builder::default();
    builder.push_record(HEADER);
    for inst in schedule.installments() {
        builder.push_record([
            inst.number.to_string(),
            inst.due_date.to_string(),
            money(inst.payment, dec_places),
            money(inst.principal, dec_places),
            money(inst.interest, dec_places),
            money(inst.balance, dec_places),
        ]);
    }
    builder.push_record([
        "Total".to_string(),
        String::new(),
        money(schedule.total_paid(), dec_places),
        money(schedule.total_principal(), dec_places),
        money(schedule.total_interest(), dec_places),
        String::new(),
    ]);

    let mut table = builder.build();
    table.with(Style::modern());
    table.to_string()
}

/// One record per installment followed by the same totals row as [`table`].
pub fn csv(schedule: &Schedule, dec_places: u32) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(HEADER)?;
    for inst in schedule.installments() {
        wtr.write_record([
            inst.number.to_string(),
            inst.due_date.to_string(),
            money(inst.payment, dec_places),
            money(inst.principal, dec_places),
            money(inst.interest, dec_places),
            money(inst.balance, dec_places),
        ])?;
    }
    wtr.write_record([
        "Total".to_string(),
        String::new(),
        money(schedule.total_paid(), dec_places),
        money(schedule.total_principal(), dec_places),
        money(schedule.total_interest(), dec_places),
        String::new(),
    ])?;
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| ScheduleError::Serialization(e.to_string()))
}

#[cfg(feature = "serde")]
pub fn json(schedule: &Schedule, dec_places: u32) -> Result<String> {
    Ok(serde_json::to_string_pretty(&schedule.rounded(dec_places))?)
}

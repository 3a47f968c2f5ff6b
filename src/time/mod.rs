use chrono::NaiveDate;

mod date_range;
pub use date_range::*;
mod date_token;
pub use date_token::*;

/// The format used for every date written into the time sheet.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

use core::fmt;

use derive_more::Display;
use log::warn;
use thiserror::Error;

use crate::time::DateToken;

/// What a single half-day ended up as, derived from its two flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum HalfDayState {
    #[display("unset")]
    Unset,
    #[display("present")]
    Present,
    #[display("absent")]
    Absent,
    #[display("present and absent")]
    Conflicting,
}

/// The two checkboxes of a morning or an afternoon.
///
/// Both can be ticked at the same time, the form never forced a choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HalfDay {
    present: bool,
    absent: bool,
}

impl HalfDay {
    #[must_use]
    pub const fn new(present: bool, absent: bool) -> Self {
        Self { present, absent }
    }

    #[must_use]
    pub const fn is_present(&self) -> bool {
        self.present
    }

    #[must_use]
    pub const fn is_absent(&self) -> bool {
        self.absent
    }

    #[must_use]
    pub const fn is_unset(&self) -> bool {
        !self.present && !self.absent
    }

    #[must_use]
    pub const fn state(&self) -> HalfDayState {
        match (self.present, self.absent) {
            (false, false) => HalfDayState::Unset,
            (true, false) => HalfDayState::Present,
            (false, true) => HalfDayState::Absent,
            (true, true) => HalfDayState::Conflicting,
        }
    }
}

/// One working day of the attendance register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRow {
    day: String,
    date_token: DateToken,
    am: HalfDay,
    pm: HalfDay,
    include_signature: bool,
}

impl AttendanceRow {
    #[must_use]
    pub fn new(day: impl Into<String>, date_token: DateToken) -> Self {
        Self {
            day: day.into(),
            date_token,
            am: HalfDay::default(),
            pm: HalfDay::default(),
            include_signature: false,
        }
    }

    pub fn day(&self) -> &str {
        &self.day
    }

    pub const fn date_token(&self) -> DateToken {
        self.date_token
    }

    pub const fn am(&self) -> HalfDay {
        self.am
    }

    pub const fn pm(&self) -> HalfDay {
        self.pm
    }

    pub const fn include_signature(&self) -> bool {
        self.include_signature
    }

    pub fn set_am_present(&mut self, value: bool) -> &mut Self {
        self.am.present = value;
        self
    }

    pub fn set_am_absent(&mut self, value: bool) -> &mut Self {
        self.am.absent = value;
        self
    }

    pub fn set_pm_present(&mut self, value: bool) -> &mut Self {
        self.pm.present = value;
        self
    }

    pub fn set_pm_absent(&mut self, value: bool) -> &mut Self {
        self.pm.absent = value;
        self
    }

    pub fn set_include_signature(&mut self, value: bool) -> &mut Self {
        self.include_signature = value;
        self
    }

    /// Returns `true` if none of the four attendance boxes is ticked.
    #[must_use]
    pub const fn is_unmarked(&self) -> bool {
        self.am.is_unset() && self.pm.is_unset()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct UnmarkedDays(Vec<String>);

impl UnmarkedDays {
    #[must_use]
    pub fn days(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for UnmarkedDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "please mark the morning or the afternoon for: {}",
            self.0.join(", ")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("there is no day `{0}` in the attendance register")]
pub struct UnknownDay(pub String);

/// The attendance register of one week, rows in template order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Attendance {
    rows: Vec<AttendanceRow>,
}

impl Attendance {
    #[must_use]
    pub fn new(rows: Vec<AttendanceRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[AttendanceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, day: &str) -> Option<&AttendanceRow> {
        self.rows
            .iter()
            .find(|row| row.day.trim().eq_ignore_ascii_case(day.trim()))
    }

    pub fn row_mut(&mut self, day: &str) -> Result<&mut AttendanceRow, UnknownDay> {
        self.rows
            .iter_mut()
            .find(|row| row.day.trim().eq_ignore_ascii_case(day.trim()))
            .ok_or_else(|| UnknownDay(day.to_string()))
    }

    pub fn row_at_mut(&mut self, index: usize) -> Option<&mut AttendanceRow> {
        self.rows.get_mut(index)
    }

    /// Returns `true` if any day asks for the signature to be embedded.
    #[must_use]
    pub fn wants_signature(&self) -> bool {
        self.rows.iter().any(AttendanceRow::include_signature)
    }

    pub fn validate(&self) -> Result<(), UnmarkedDays> {
        for row in &self.rows {
            for (half, value) in [("morning", row.am), ("afternoon", row.pm)] {
                if value.state() == HalfDayState::Conflicting {
                    warn!("{}: the {} is marked as {}", row.day, half, value.state());
                }
            }
        }

        let unmarked = self
            .rows
            .iter()
            .filter(|row| row.is_unmarked())
            .map(|row| row.day.clone())
            .collect::<Vec<_>>();

        if !unmarked.is_empty() {
            return Err(UnmarkedDays(unmarked));
        }

        Ok(())
    }
}

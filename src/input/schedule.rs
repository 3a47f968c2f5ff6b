/// One scheduled session of the week, as listed in the first template table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRow {
    day: String,
    activity: String,
    facilitator: String,
    time_range: String,
    notes: String,
}

impl ScheduleRow {
    pub const COLUMNS: usize = 5;

    #[must_use]
    pub fn new(
        day: impl Into<String>,
        activity: impl Into<String>,
        facilitator: impl Into<String>,
        time_range: impl Into<String>,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            day: day.into(),
            activity: activity.into(),
            facilitator: facilitator.into(),
            time_range: time_range.into(),
            notes: notes.into(),
        }
    }

    /// Builds a row from exactly [`Self::COLUMNS`] cells.
    #[must_use]
    pub fn from_cells(cells: &[String]) -> Option<Self> {
        match cells {
            [day, activity, facilitator, time_range, notes] => Some(Self::new(
                day.as_str(),
                activity.as_str(),
                facilitator.as_str(),
                time_range.as_str(),
                notes.as_str(),
            )),
            _ => None,
        }
    }

    pub fn day(&self) -> &str {
        &self.day
    }

    pub fn activity(&self) -> &str {
        &self.activity
    }

    pub fn facilitator(&self) -> &str {
        &self.facilitator
    }

    pub fn time_range(&self) -> &str {
        &self.time_range
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }
}

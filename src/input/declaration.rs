use chrono::NaiveDate;

use crate::input::{Attendance, LearnerName, SignatureImage};
use crate::time::DateRange;

/// Everything the learner fills in on the declaration screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    learner: LearnerName,
    range: Option<DateRange>,
    declared_on: NaiveDate,
    attendance: Attendance,
    signature: Option<SignatureImage>,
}

impl Declaration {
    #[must_use]
    pub fn new(attendance: Attendance, declared_on: NaiveDate) -> Self {
        Self {
            learner: LearnerName::new(""),
            range: None,
            declared_on,
            attendance,
            signature: None,
        }
    }

    pub fn learner(&self) -> &LearnerName {
        &self.learner
    }

    pub fn range(&self) -> Option<&DateRange> {
        self.range.as_ref()
    }

    pub fn declared_on(&self) -> NaiveDate {
        self.declared_on
    }

    pub fn attendance(&self) -> &Attendance {
        &self.attendance
    }

    pub fn attendance_mut(&mut self) -> &mut Attendance {
        &mut self.attendance
    }

    /// The attached signature, if one was drawn at all.
    pub fn signature(&self) -> Option<&SignatureImage> {
        self.signature
            .as_ref()
            .filter(|signature| !signature.is_blank())
    }

    pub fn set_learner(&mut self, learner: LearnerName) -> &mut Self {
        self.learner = learner;
        self
    }

    pub fn set_range(&mut self, range: DateRange) -> &mut Self {
        self.range = Some(range);
        self
    }

    pub fn set_declared_on(&mut self, declared_on: NaiveDate) -> &mut Self {
        self.declared_on = declared_on;
        self
    }

    pub fn set_signature(&mut self, signature: Option<SignatureImage>) -> &mut Self {
        self.signature = signature;
        self
    }

    /// Discards the signature, it is only kept for a single submission.
    pub fn take_signature(&mut self) -> Option<SignatureImage> {
        self.signature.take()
    }
}

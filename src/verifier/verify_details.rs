use thiserror::Error;

use crate::input::Declaration;
use crate::verifier::Verifier;

pub struct VerifyDetails;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MissingDetail {
    #[error("please enter your name")]
    LearnerName,
    #[error("please select the start and end date of the week")]
    DateRange,
}

impl Verifier for VerifyDetails {
    type Error = MissingDetail;
    type Errors = Vec<Self::Error>;

    fn verify(&self, declaration: &Declaration) -> Result<(), Self::Errors> {
        let mut errors = Vec::new();

        if declaration.learner().is_empty() {
            errors.push(MissingDetail::LearnerName);
        }

        if declaration.range().is_none() {
            errors.push(MissingDetail::DateRange);
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(())
    }
}

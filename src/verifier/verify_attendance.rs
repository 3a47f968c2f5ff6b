use crate::input::{Declaration, UnmarkedDays};
use crate::verifier::Verifier;

/// Every day needs at least one of its four attendance marks.
pub struct VerifyAttendanceMarked;

impl Verifier for VerifyAttendanceMarked {
    type Error = UnmarkedDays;
    type Errors = [Self::Error; 1];

    fn verify(&self, declaration: &Declaration) -> Result<(), Self::Errors> {
        declaration.attendance().validate().map_err(|error| [error])
    }
}

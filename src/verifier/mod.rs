use std::fmt;

use thiserror::Error;

use crate::input::Declaration;

mod verifier;
mod verify_attendance;
mod verify_details;
mod verify_signature;

pub use verifier::Verifier;
pub use verify_attendance::*;
pub use verify_details::*;
pub use verify_signature::*;

/// Everything that is wrong with a declaration, in the order it was found.
#[derive(Debug, Error)]
pub struct ValidationErrors(Vec<anyhow::Error>);

impl ValidationErrors {
    pub fn errors(&self) -> &[anyhow::Error] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, error) in self.0.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", error)?;
        }

        Ok(())
    }
}

fn collect<V: Verifier>(
    verifier: V,
    declaration: &Declaration,
    errors: &mut Vec<anyhow::Error>,
) {
    if let Err(found) = verifier.verify(declaration) {
        errors.extend(found.into_iter().map(anyhow::Error::msg));
    }
}

/// Runs every check, so that all problems can be reported at once.
pub struct DefaultVerifier;

impl Verifier for DefaultVerifier {
    type Error = anyhow::Error;
    type Errors = ValidationErrors;

    fn verify(&self, declaration: &Declaration) -> Result<(), Self::Errors> {
        let mut errors = Vec::new();

        collect(VerifyDetails, declaration, &mut errors);
        collect(VerifyAttendanceMarked, declaration, &mut errors);
        collect(VerifySignature, declaration, &mut errors);

        if !errors.is_empty() {
            return Err(ValidationErrors(errors));
        }

        Ok(())
    }
}

impl IntoIterator for ValidationErrors {
    type Item = anyhow::Error;
    type IntoIter = std::vec::IntoIter<anyhow::Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

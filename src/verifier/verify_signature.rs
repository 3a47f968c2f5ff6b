use thiserror::Error;

use crate::input::Declaration;
use crate::verifier::Verifier;

pub struct VerifySignature;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{day}: the signature should be included, but none has been drawn")]
pub struct SignatureRequired {
    day: String,
}

impl SignatureRequired {
    pub fn day(&self) -> &str {
        &self.day
    }
}

impl Verifier for VerifySignature {
    type Error = SignatureRequired;
    type Errors = Vec<SignatureRequired>;

    fn verify(&self, declaration: &Declaration) -> Result<(), Self::Errors> {
        if declaration.signature().is_some() {
            return Ok(());
        }

        let errors = declaration
            .attendance()
            .rows()
            .iter()
            .filter_map(|row| {
                row.include_signature().then(|| SignatureRequired {
                    day: row.day().to_string(),
                })
            })
            .collect::<Vec<_>>();

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(())
    }
}

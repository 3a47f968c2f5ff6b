use std::fmt;
use std::fmt::Debug;

use crate::input::Declaration;

// relevant data from a Declaration:
// learner name + date range <- what the document is about
// attendance rows <- every day needs a mark
// signature <- only if a day asks for it

pub trait Verifier {
    type Error: fmt::Display + Debug + Sync + Send + 'static;
    type Errors: IntoIterator<Item = Self::Error>;

    fn verify(&self, declaration: &Declaration) -> Result<(), Self::Errors>;
}

use chrono::NaiveDate;
use derive_more::Display;
use log::{info, warn};
use thiserror::Error;

use crate::docx::{DocumentRenderer, RenderError, RenderedDocument, Template};
use crate::input::Declaration;
use crate::submission::{AuthenticationError, SubmissionTarget, UploadError, UploadOutcome};
use crate::time::{resolve_dates, UnresolvedDates};
use crate::verifier::{DefaultVerifier, ValidationErrors, Verifier};

/// The two screens a learner moves between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum View {
    #[display("schedule")]
    Schedule,
    #[display("declaration")]
    Declaration,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("can not go from the {from} view to the {to} view")]
    InvalidTransition { from: View, to: View },
    #[error("this is only possible on the {expected} view, but the {actual} view is shown")]
    WrongView { expected: View, actual: View },
    #[error("the declaration is incomplete:\n{0}")]
    Validation(#[from] ValidationErrors),
    #[error("no week has been selected")]
    MissingRange,
    #[error(transparent)]
    Dates(#[from] UnresolvedDates),
    #[error("failed to render the time sheet")]
    Render(#[from] RenderError),
    #[error("failed to authenticate")]
    Authentication(#[from] AuthenticationError),
    #[error("failed to upload the time sheet")]
    Upload(#[from] UploadError),
}

/// A time sheet that went through [`Session::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    document: RenderedDocument,
    outcome: UploadOutcome,
}

impl Submission {
    pub fn document(&self) -> &RenderedDocument {
        &self.document
    }

    pub fn outcome(&self) -> UploadOutcome {
        self.outcome
    }
}

/// The state of one learner filling in one time sheet.
#[derive(Debug, Clone)]
pub struct Session {
    template: Template,
    week: u32,
    view: View,
    declaration: Declaration,
}

impl Session {
    /// Starts on the schedule view with an empty declaration dated `today`.
    #[must_use]
    pub fn new(template: Template, week: u32, today: NaiveDate) -> Self {
        let declaration = Declaration::new(template.attendance(), today);

        Self {
            template,
            week,
            view: View::Schedule,
            declaration,
        }
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn week(&self) -> u32 {
        self.week
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn declaration(&self) -> &Declaration {
        &self.declaration
    }

    /// The title of the schedule view.
    #[must_use]
    pub fn header(&self) -> String {
        match self.declaration.range() {
            Some(range) => format!("Weekly Timesheet: Week {} {}", self.week, range),
            None => format!("Weekly Timesheet: Week {}", self.week),
        }
    }

    /// Schedule -> Declaration
    pub fn next(&mut self) -> Result<View, SessionError> {
        self.transition(View::Schedule, View::Declaration)
    }

    /// Declaration -> Schedule
    pub fn back(&mut self) -> Result<View, SessionError> {
        self.transition(View::Declaration, View::Schedule)
    }

    fn transition(&mut self, from: View, to: View) -> Result<View, SessionError> {
        if self.view != from {
            return Err(SessionError::InvalidTransition {
                from: self.view,
                to,
            });
        }

        info!("{} -> {}", from, to);
        self.view = to;
        Ok(to)
    }

    fn expect_view(&self, expected: View) -> Result<(), SessionError> {
        if self.view != expected {
            return Err(SessionError::WrongView {
                expected,
                actual: self.view,
            });
        }

        Ok(())
    }

    pub fn declaration_mut(&mut self) -> Result<&mut Declaration, SessionError> {
        self.expect_view(View::Declaration)?;
        Ok(&mut self.declaration)
    }

    /// Replaces the answers, for example with ones read from a file.
    pub fn set_declaration(&mut self, declaration: Declaration) -> Result<(), SessionError> {
        *self.declaration_mut()? = declaration;
        Ok(())
    }

    /// Checks the declaration and fills in the template.
    pub fn render(&self) -> Result<RenderedDocument, SessionError> {
        self.expect_view(View::Declaration)?;

        DefaultVerifier.verify(&self.declaration)?;

        let range = self.declaration.range().ok_or(SessionError::MissingRange)?;
        let dates = resolve_dates(range)?;

        Ok(DocumentRenderer::new(&self.template, &dates, &self.declaration).render(self.week)?)
    }

    /// Renders the time sheet and uploads it into `destination`.
    ///
    /// The target is asked to upload exactly once. The signature is discarded
    /// as soon as it has been embedded.
    pub fn submit<T>(&mut self, target: &mut T, destination: &str) -> Result<Submission, SessionError>
    where
        T: SubmissionTarget + ?Sized,
    {
        let document = self.render()?;
        self.declaration.take_signature();

        target.authenticate()?;
        let outcome = target.upload(&document, destination)?;

        if outcome == UploadOutcome::Created {
            info!("{}", outcome);
        } else {
            warn!("{}", outcome);
        }

        Ok(Submission { document, outcome })
    }
}

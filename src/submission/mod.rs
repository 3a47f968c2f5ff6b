//! Handing a rendered time sheet over to remote storage.

mod graph;
mod outcome;

pub use graph::*;
pub use outcome::*;

use thiserror::Error;

use crate::docx::RenderedDocument;

#[derive(Debug, Error)]
pub enum AuthenticationError {
    #[error("the identity provider did not issue a token: {code}: {description}")]
    Rejected { code: String, description: String },
    #[error("failed to reach the identity provider")]
    Http(#[from] minreq::Error),
    #[error("the identity provider sent an unreadable response")]
    Response(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("there is no access token, authenticate before uploading")]
    NotAuthenticated,
    #[error("failed to reach the storage")]
    Http(#[from] minreq::Error),
}

/// Somewhere a time sheet can be uploaded to.
///
/// Both calls are single attempts, failures are never retried.
pub trait SubmissionTarget {
    fn authenticate(&mut self) -> Result<(), AuthenticationError>;

    /// Uploads the document as `<destination>/<file name of the document>`.
    fn upload(
        &self,
        document: &RenderedDocument,
        destination: &str,
    ) -> Result<UploadOutcome, UploadError>;
}


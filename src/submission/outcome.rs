use derive_more::Display;

/// How the storage answered an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum UploadOutcome {
    #[display("a time sheet with this name has already been submitted")]
    AlreadyExists,
    #[display("the time sheet has been submitted")]
    Created,
    #[display("the time sheet was rejected")]
    Rejected,
    #[display("the upload failed with status {_0}")]
    Unknown(i32),
}

impl UploadOutcome {
    #[must_use]
    pub const fn from_status(status: i32) -> Self {
        match status {
            200 => Self::AlreadyExists,
            201 => Self::Created,
            400 => Self::Rejected,
            other => Self::Unknown(other),
        }
    }

    /// `true` if the time sheet ended up in the storage.
    #[must_use]
    pub const fn is_stored(&self) -> bool {
        matches!(self, Self::AlreadyExists | Self::Created)
    }
}

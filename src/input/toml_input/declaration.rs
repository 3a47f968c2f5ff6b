use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Deserialize;

use crate::input::{Attendance, Declaration, LearnerName, SignatureImage};
use crate::time::DateRange;
use crate::utils;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignatureInput {
    path: PathBuf,
    width: Option<f32>,
}

impl SignatureInput {
    /// Loads the image, relative paths are resolved against `workspace`.
    pub fn load(&self, workspace: &Path) -> anyhow::Result<SignatureImage> {
        let signature = SignatureImage::open(workspace.join(&self.path))?;

        if let Some(width) = self.width {
            return Ok(signature.with_width(width)?);
        }

        Ok(signature)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Learner {
    name: String,
    signature: Option<SignatureInput>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Week {
    #[serde(with = "utils::serde_toml_local_date")]
    start: NaiveDate,
    #[serde(with = "utils::serde_toml_local_date")]
    end: NaiveDate,
    #[serde(default, with = "utils::serde_toml_local_date::option")]
    declared: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DayInput {
    #[serde(default)]
    am_present: bool,
    #[serde(default)]
    am_absent: bool,
    #[serde(default)]
    pm_present: bool,
    #[serde(default)]
    pm_absent: bool,
    #[serde(default)]
    sign: bool,
}

/// The answers of the declaration screen, stored as a toml file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeclarationInput {
    learner: Learner,
    week: Week,
    #[serde(default)]
    attendance: IndexMap<String, DayInput>,
}

impl DeclarationInput {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("failed to open declaration file `{}`", path.display()))?;

        utils::toml_from_reader(file)
            .with_context(|| format!("failed to parse declaration file `{}`", path.display()))
    }

    pub fn learner_name(&self) -> &str {
        &self.learner.name
    }

    pub fn signature(&self) -> Option<&SignatureInput> {
        self.learner.signature.as_ref()
    }

    /// Applies the answers to an empty declaration for the template's days.
    ///
    /// `today` is used when the file does not name a declaration date and the
    /// signature is loaded relative to `workspace`.
    pub fn apply(
        &self,
        attendance: Attendance,
        today: NaiveDate,
        workspace: &Path,
    ) -> anyhow::Result<Declaration> {
        let mut declaration = Declaration::new(attendance, self.week.declared.unwrap_or(today));

        declaration
            .set_learner(LearnerName::new(self.learner.name.as_str()))
            .set_range(DateRange::new(self.week.start, self.week.end)?);

        for (day, input) in &self.attendance {
            declaration
                .attendance_mut()
                .row_mut(day)?
                .set_am_present(input.am_present)
                .set_am_absent(input.am_absent)
                .set_pm_present(input.pm_present)
                .set_pm_absent(input.pm_absent)
                .set_include_signature(input.sign);
        }

        if let Some(signature) = self.signature() {
            declaration.set_signature(Some(signature.load(workspace)?));
        }

        Ok(declaration)
    }
}

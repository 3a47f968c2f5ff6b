use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use thiserror::Error;

use crate::docx::package::{DocxPackage, PackageError};
use crate::docx::wordml::{self, PARAGRAPH, ROW, TABLE};
use crate::docx::xml::{Element, XmlDocument, XmlError};
use crate::input::{Attendance, AttendanceRow, ScheduleRow};
use crate::time::{DateToken, UnknownDateToken};
use crate::utils::{self, PathExt};

/// The placeholder that marks the declaration paragraph.
pub const LEARNER_NAME: &str = "learner_name";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("the template `{}` does not exist", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read the template `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("the template `{}` is malformed", .path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: TemplateFormatError,
    },
}

#[derive(Debug, Error)]
pub enum TemplateFormatError {
    #[error(transparent)]
    Package(#[from] PackageError),
    #[error("the package has no `{0}`")]
    MissingPart(&'static str),
    #[error(transparent)]
    Xml(#[from] XmlError),
    #[error("the document has no body")]
    MissingBody,
    #[error("expected a schedule and an attendance table, but found {0} table(s)")]
    MissingTable(usize),
    #[error("row {row} of the attendance table has {cells} columns, expected 4 or 5")]
    ColumnCount { row: usize, cells: usize },
    #[error("row {row} of the attendance table has no date placeholder")]
    UnknownDateToken {
        row: usize,
        #[source]
        source: UnknownDateToken,
    },
    #[error("the attendance table lists no days")]
    NoAttendanceRows,
    #[error("no paragraph contains the `{}` placeholder", LEARNER_NAME)]
    MissingDeclaration,
}

/// A time sheet template, parsed once and rendered for every submission.
#[derive(Debug, Clone)]
pub struct Template {
    package: DocxPackage,
    document: XmlDocument,
    declaration: String,
    schedule: Vec<ScheduleRow>,
    attendance: Vec<AttendanceRow>,
}

pub(crate) const SCHEDULE_TABLE: usize = 0;
pub(crate) const ATTENDANCE_TABLE: usize = 1;
pub(crate) const ATTENDANCE_COLUMNS: usize = 5;

pub(crate) fn body(document: &XmlDocument) -> Option<&Element> {
    document.root().element("body")
}

pub(crate) fn body_mut(document: &mut XmlDocument) -> Option<&mut Element> {
    document.root_mut().element_mut("body")
}

impl Template {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(TemplateError::NotFound(path.to_path_buf()));
        }

        if !path.has_extension("docx") {
            warn!("`{}` does not look like a .docx file", path.display());
        }

        info!("loading template: {}", path.display());
        let bytes = utils::read(path).map_err(|source| TemplateError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_bytes(&bytes).map_err(|source| TemplateError::Format {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TemplateFormatError> {
        let package = DocxPackage::from_bytes(bytes)?;
        let document = XmlDocument::parse(
            package
                .part(DocxPackage::DOCUMENT)
                .ok_or(TemplateFormatError::MissingPart(DocxPackage::DOCUMENT))?,
        )?;

        let body = body(&document).ok_or(TemplateFormatError::MissingBody)?;
        let tables = body.elements(TABLE).collect::<Vec<_>>();
        if tables.len() <= ATTENDANCE_TABLE {
            return Err(TemplateFormatError::MissingTable(tables.len()));
        }

        let schedule = parse_schedule(tables[SCHEDULE_TABLE])?;
        let attendance = parse_attendance(tables[ATTENDANCE_TABLE])?;
        let declaration = find_declaration(body)?;

        debug!(
            "template has {} scheduled sessions and {} days",
            schedule.len(),
            attendance.len()
        );

        Ok(Self {
            package,
            document,
            declaration,
            schedule,
            attendance,
        })
    }

    /// The text of the declaration paragraph, with its placeholders.
    pub fn declaration(&self) -> &str {
        &self.declaration
    }

    pub fn schedule(&self) -> &[ScheduleRow] {
        &self.schedule
    }

    pub fn attendance_rows(&self) -> &[AttendanceRow] {
        &self.attendance
    }

    /// A blank attendance register for the days of this template.
    #[must_use]
    pub fn attendance(&self) -> Attendance {
        Attendance::new(self.attendance.clone())
    }

    pub(crate) fn package(&self) -> &DocxPackage {
        &self.package
    }

    pub(crate) fn document(&self) -> &XmlDocument {
        &self.document
    }
}

fn parse_schedule(table: &Element) -> Result<Vec<ScheduleRow>, TemplateFormatError> {
    let mut rows = Vec::new();
    for row in table.elements(ROW) {
        let cells = wordml::row_texts(row)?;
        match ScheduleRow::from_cells(&cells) {
            Some(schedule_row) => rows.push(schedule_row),
            None => debug!("skipping schedule row with {} cells", cells.len()),
        }
    }

    Ok(rows)
}

fn parse_attendance(table: &Element) -> Result<Vec<AttendanceRow>, TemplateFormatError> {
    let mut rows = Vec::new();

    // the first row is the header
    for (index, row) in table.elements(ROW).enumerate().skip(1) {
        let mut cells = wordml::row_texts(row)?;
        if cells.len() + 1 < ATTENDANCE_COLUMNS || cells.len() > ATTENDANCE_COLUMNS {
            return Err(TemplateFormatError::ColumnCount {
                row: index,
                cells: cells.len(),
            });
        }
        cells.resize(ATTENDANCE_COLUMNS, String::new());

        let date_token = cells[1]
            .parse::<DateToken>()
            .map_err(|source| TemplateFormatError::UnknownDateToken { row: index, source })?;

        rows.push(AttendanceRow::new(cells[0].as_str(), date_token));
    }

    if rows.is_empty() {
        return Err(TemplateFormatError::NoAttendanceRows);
    }

    Ok(rows)
}

fn find_declaration(body: &Element) -> Result<String, TemplateFormatError> {
    for paragraph in body.elements(PARAGRAPH) {
        let text = wordml::paragraph_text(paragraph)?;
        if text.contains(LEARNER_NAME) {
            return Ok(text);
        }
    }

    Err(TemplateFormatError::MissingDeclaration)
}

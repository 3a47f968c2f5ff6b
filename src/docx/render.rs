use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use tempfile::TempDir;
use thiserror::Error;

use crate::docx::drawing::EmbeddedImage;
use crate::docx::package::{DocxPackage, PackageError};
use crate::docx::template::{self, Template, ATTENDANCE_TABLE};
use crate::docx::tokens::TokenMap;
use crate::docx::wordml::{self, CELL, PARAGRAPH, ROW, TABLE};
use crate::docx::xml::{Element, XmlError};
use crate::input::{AttendanceRow, Declaration, HalfDay, SignatureError, SignatureImage};
use crate::time::{format_date, DateToken, ResolvedDates};
use crate::utils;

pub const CHECK_MARK: &str = "✓";
pub const ABSENT: &str = "Absent";
pub const LEARNER_SIGNATURE: &str = "learner_signature";
pub const DECLARATION_DATE: &str = "date";

const SIGNATURE_IMAGE: &str = "learner_signature";
const FIRST_DRAWING_ID: u32 = 9001;

const DATE_COLUMN: usize = 1;
const AM_COLUMN: usize = 2;
const PM_COLUMN: usize = 3;
const SIGNATURE_COLUMN: usize = 4;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("the template has no body")]
    MissingBody,
    #[error("the template has no attendance table")]
    MissingTable,
    #[error("the template lists {template} days, but the declaration has {declaration}")]
    RowMismatch { template: usize, declaration: usize },
    #[error("a signature is required for {}, but none has been drawn", .0.join(", "))]
    SignatureMissing(Vec<String>),
    #[error("failed to encode the signature")]
    Signature(#[from] SignatureError),
    #[error("failed to stage the signature image")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Xml(#[from] XmlError),
    #[error(transparent)]
    Package(#[from] PackageError),
    #[error("failed to build the placeholder matcher")]
    Tokens(#[from] aho_corasick::BuildError),
}

/// The filled in template, ready to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    file_name: String,
    bytes: Vec<u8>,
}

impl RenderedDocument {
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Writes the document into `dir`, returns the path of the new file.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> io::Result<PathBuf> {
        utils::create_dir_all(dir.as_ref())?;
        let path = dir.as_ref().join(&self.file_name);
        utils::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// The signature as a png file in a temporary directory. The directory is
/// removed when this is dropped.
struct SignatureAsset {
    _dir: TempDir,
    path: PathBuf,
    dimensions: (u32, u32),
}

impl SignatureAsset {
    fn write(signature: &SignatureImage, scratch_dir: Option<&Path>) -> Result<Self, RenderError> {
        let dir = match scratch_dir {
            Some(parent) => TempDir::new_in(parent)?,
            None => TempDir::new()?,
        };
        let path = dir.path().join(format!("{}.png", SIGNATURE_IMAGE));
        utils::write(&path, signature.to_png()?)?;
        debug!("staged signature at: {}", path.display());

        Ok(Self {
            _dir: dir,
            path,
            dimensions: signature.dimensions(),
        })
    }

    fn read(&self) -> io::Result<Vec<u8>> {
        utils::read(&self.path)
    }
}

struct Signature {
    image: EmbeddedImage,
    width: f32,
}

/// Fills a [`Template`] with the answers of a [`Declaration`].
pub struct DocumentRenderer<'a> {
    template: &'a Template,
    dates: &'a ResolvedDates,
    declaration: &'a Declaration,
    cell_signature_width: f32,
    scratch_dir: Option<PathBuf>,
}

impl<'a> DocumentRenderer<'a> {
    pub const DEFAULT_CELL_SIGNATURE_WIDTH: f32 = 2.5;

    #[must_use]
    pub fn new(template: &'a Template, dates: &'a ResolvedDates, declaration: &'a Declaration) -> Self {
        Self {
            template,
            dates,
            declaration,
            cell_signature_width: Self::DEFAULT_CELL_SIGNATURE_WIDTH,
            scratch_dir: None,
        }
    }

    /// The width in cm of the signatures in the attendance table.
    pub fn cell_signature_width(&mut self, width: f32) -> &mut Self {
        self.cell_signature_width = width;
        self
    }

    /// Where the temporary signature image is staged, the system temp
    /// directory by default.
    pub fn scratch_dir(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.scratch_dir = Some(path.into());
        self
    }

    pub fn render(&self, week: u32) -> Result<RenderedDocument, RenderError> {
        let attendance = self.declaration.attendance();
        let template_days = self.template.attendance_rows().len();
        if attendance.len() != template_days {
            return Err(RenderError::RowMismatch {
                template: template_days,
                declaration: attendance.len(),
            });
        }

        let signature = self.declaration.signature();
        if signature.is_none() && attendance.wants_signature() {
            return Err(RenderError::SignatureMissing(
                attendance
                    .rows()
                    .iter()
                    .filter(|row| row.include_signature())
                    .map(|row| row.day().to_string())
                    .collect(),
            ));
        }

        info!("rendering time sheet for {}", self.declaration.learner());

        // must outlive the embedding, dropping it deletes the file
        let asset = signature
            .map(|signature| SignatureAsset::write(signature, self.scratch_dir.as_deref()))
            .transpose()?;

        let mut package = self.template.package().clone();
        let mut document = self.template.document().clone();

        let embedded = match (&asset, signature) {
            (Some(asset), Some(signature)) => Some(Signature {
                image: EmbeddedImage::register_png(
                    &mut package,
                    SIGNATURE_IMAGE,
                    asset.read()?,
                    asset.dimensions,
                )?,
                width: signature.width(),
            }),
            _ => None,
        };

        let mut next_drawing_id = FIRST_DRAWING_ID;
        let body = template::body_mut(&mut document).ok_or(RenderError::MissingBody)?;

        self.fill_paragraphs(body, embedded.as_ref(), &mut next_drawing_id)?;
        self.fill_attendance(body, embedded.as_ref(), &mut next_drawing_id)?;

        package.set_part(DocxPackage::DOCUMENT, document.to_bytes());

        let rendered = RenderedDocument::new(
            self.declaration.learner().file_name(week),
            package.to_bytes()?,
        );
        debug!(
            "rendered `{}` ({} bytes)",
            rendered.file_name(),
            rendered.bytes().len()
        );

        Ok(rendered)
    }

    fn free_text_tokens(&self) -> Result<TokenMap, RenderError> {
        let mut pairs = vec![
            (
                template::LEARNER_NAME.to_string(),
                self.declaration.learner().to_string(),
            ),
            (
                DECLARATION_DATE.to_string(),
                format_date(self.declaration.declared_on()),
            ),
            (LEARNER_SIGNATURE.to_string(), String::new()),
        ];
        pairs.extend(
            self.dates
                .iter()
                .map(|(token, date)| (token.to_string(), format_date(date))),
        );

        Ok(TokenMap::new(pairs)?)
    }

    fn fill_paragraphs(
        &self,
        body: &mut Element,
        signature: Option<&Signature>,
        next_drawing_id: &mut u32,
    ) -> Result<(), RenderError> {
        let tokens = self.free_text_tokens()?;

        for paragraph in body.elements_mut(PARAGRAPH) {
            let text = wordml::paragraph_text(paragraph)?;
            if !tokens.is_match(&text) {
                continue;
            }

            wordml::set_paragraph_text(paragraph, &tokens.replace(&text));

            if text.contains(LEARNER_SIGNATURE) {
                match signature {
                    Some(signature) => {
                        wordml::append_markup_run(
                            paragraph,
                            signature.image.inline_markup(*next_drawing_id, signature.width),
                        );
                        *next_drawing_id += 1;
                    }
                    None => warn!("the declaration is not signed"),
                }
            }
        }

        Ok(())
    }

    fn fill_attendance(
        &self,
        body: &mut Element,
        signature: Option<&Signature>,
        next_drawing_id: &mut u32,
    ) -> Result<(), RenderError> {
        let table = body
            .elements_mut(TABLE)
            .nth(ATTENDANCE_TABLE)
            .ok_or(RenderError::MissingTable)?;

        let dates = TokenMap::new(
            DateToken::ALL
                .into_iter()
                .map(|token| (token.to_string(), self.dates.formatted(token))),
        )?;

        let rows = self.declaration.attendance().rows();
        // the first row is the header
        for (element, row) in table.elements_mut(ROW).skip(1).zip(rows) {
            fill_row(element, row, &dates, signature, self.cell_signature_width, next_drawing_id)?;
        }

        Ok(())
    }
}

fn marks(half_day: HalfDay, prefix: &str) -> Result<TokenMap, RenderError> {
    let mark = |ticked: bool| if ticked { CHECK_MARK } else { "" };

    Ok(TokenMap::new([
        (format!("[{}_pr]", prefix), mark(half_day.is_present())),
        (format!("[{}_ab]", prefix), mark(half_day.is_absent())),
    ])?)
}

fn replace_in_cell(cell: &mut Element, tokens: &TokenMap) -> Result<(), XmlError> {
    for paragraph in cell.elements_mut(PARAGRAPH) {
        let text = wordml::paragraph_text(paragraph)?;
        if tokens.is_match(&text) {
            wordml::set_paragraph_text(paragraph, &tokens.replace(&text));
        }
    }

    Ok(())
}

fn fill_row(
    element: &mut Element,
    row: &AttendanceRow,
    dates: &TokenMap,
    signature: Option<&Signature>,
    signature_width: f32,
    next_drawing_id: &mut u32,
) -> Result<(), RenderError> {
    // columns of merged cells map onto the same cell
    let columns = element
        .elements(CELL)
        .enumerate()
        .flat_map(|(index, cell)| std::iter::repeat(index).take(wordml::grid_span(cell)))
        .collect::<Vec<_>>();
    let mut cells = element.elements_mut(CELL).collect::<Vec<_>>();

    let am = marks(row.am(), "am")?;
    let pm = marks(row.pm(), "pm")?;

    for (column, tokens) in [(DATE_COLUMN, dates), (AM_COLUMN, &am), (PM_COLUMN, &pm)] {
        if let Some(cell) = columns.get(column).and_then(|index| cells.get_mut(*index)) {
            replace_in_cell(cell, tokens)?;
        }
    }

    let Some(cell) = columns
        .get(SIGNATURE_COLUMN)
        .and_then(|index| cells.get_mut(*index))
    else {
        if row.include_signature() {
            warn!("{}: there is no signature column to sign", row.day());
        }
        return Ok(());
    };

    match signature.filter(|_| row.include_signature()) {
        Some(signature) => {
            wordml::set_cell_text(cell, "");
            if let Some(paragraph) = cell.element_mut(PARAGRAPH) {
                wordml::append_markup_run(
                    paragraph,
                    signature.image.inline_markup(*next_drawing_id, signature_width),
                );
                *next_drawing_id += 1;
            }
        }
        None => wordml::set_cell_text(cell, ABSENT),
    }

    Ok(())
}

#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use bootcamp_timesheet::config;
use bootcamp_timesheet::docx::{self, DocxPackage, RenderedDocument, Template, XmlDocument};
use bootcamp_timesheet::input::{Declaration, LearnerName, SignatureImage};
use bootcamp_timesheet::submission::{
    AuthenticationError, SubmissionTarget, UploadError, UploadOutcome,
};
use bootcamp_timesheet::time::DateRange;

pub const WEEKDAYS: [(&str, &str); 5] = [
    ("Monday", "start_date"),
    ("Tuesday", "tu_date"),
    ("Wednesday", "we_date"),
    ("Thursday", "th_date"),
    ("Friday", "end_date"),
];

const CONTENT_TYPES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
    r#"</Types>"#
);

const PACKAGE_RELATIONSHIPS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
    r#"</Relationships>"#
);

const DOCUMENT_RELATIONSHIPS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"</Relationships>"#
);

pub fn paragraph(text: &str) -> String {
    format!(
        r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        text
    )
}

/// A paragraph whose text is split over several runs, like word does it.
pub fn split_paragraph(parts: &[&str]) -> String {
    let runs = parts
        .iter()
        .map(|part| format!(r#"<w:r><w:t xml:space="preserve">{}</w:t></w:r>"#, part))
        .collect::<String>();

    format!("<w:p>{}</w:p>", runs)
}

pub fn cell(text: &str) -> String {
    format!(
        r#"<w:tc><w:tcPr><w:tcW w:w="1800" w:type="dxa"/></w:tcPr>{}</w:tc>"#,
        paragraph(text)
    )
}

pub fn spanning_cell(text: &str, span: usize) -> String {
    format!(
        r#"<w:tc><w:tcPr><w:gridSpan w:val="{}"/></w:tcPr>{}</w:tc>"#,
        span,
        paragraph(text)
    )
}

pub fn row(cells: &[&str]) -> String {
    format!(
        "<w:tr>{}</w:tr>",
        cells.iter().map(|text| cell(text)).collect::<String>()
    )
}

pub fn table(rows: &[String]) -> String {
    format!("<w:tbl><w:tblPr/>{}</w:tbl>", rows.concat())
}

pub fn schedule_table() -> String {
    table(&[
        format!("<w:tr>{}</w:tr>", spanning_cell("Week schedule", 1)),
        row(&["Day", "Activity", "Facilitator", "Time", "Notes"]),
        row(&["Monday", "Introduction", "Sam", "09:30 - 12:30", "Bring a laptop"]),
        row(&["Wednesday", "Workshop", "Alex", "13:30 - 16:30", ""]),
    ])
}

pub fn attendance_table() -> String {
    let mut rows = vec![row(&["Day", "Date", "AM", "PM", "Signature"])];
    rows.extend(WEEKDAYS.iter().map(|&(day, token)| {
        row(&[day, token, "[am_pr] / [am_ab]", "[pm_pr] / [pm_ab]", ""])
    }));

    table(&rows)
}

pub fn declaration_paragraphs() -> String {
    [
        paragraph("Weekly Timesheet"),
        split_paragraph(&[
            "I, ",
            "learner_",
            "name, confirm my attendance from start_date to end_date.",
        ]),
        paragraph("Signature: learner_signature"),
        paragraph("Signed on date"),
    ]
    .concat()
}

pub fn document(body: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
            r#"<w:body>{}<w:sectPr/></w:body></w:document>"#
        ),
        body
    )
}

pub fn package(document: &str) -> Vec<u8> {
    package_with_relationships(document, DOCUMENT_RELATIONSHIPS)
}

/// A package whose main document links to the given relationships part.
pub fn package_with_relationships(document: &str, relationships: &str) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for (name, contents) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", PACKAGE_RELATIONSHIPS),
        ("word/document.xml", document),
        ("word/_rels/document.xml.rels", relationships),
    ] {
        writer.start_file(name, options).expect("zip entry");
        writer.write_all(contents.as_bytes()).expect("zip write");
    }

    writer.finish().expect("zip finish").into_inner()
}

/// The bytes of a complete weekly template.
pub fn template_bytes() -> Vec<u8> {
    package(&document(
        &[
            paragraph("Skills Boot Camp"),
            schedule_table(),
            declaration_paragraphs(),
            attendance_table(),
        ]
        .concat(),
    ))
}

pub fn template() -> Template {
    Template::from_bytes(&template_bytes()).expect("template should be valid")
}

/// A temporary folder with the template of `week` in it.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("should be able to create a temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_template(&self, week: u32, bytes: &[u8]) -> PathBuf {
        let path = config::template_path(self.path(), week);
        std::fs::write(&path, bytes).expect("should be able to write the template");
        path
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// A small black stroke on white.
pub fn signature() -> SignatureImage {
    let mut buffer = Vec::new();
    for index in 0..(4 * 2) {
        if index % 3 == 0 {
            buffer.extend_from_slice(&[0, 0, 0, 255]);
        } else {
            buffer.extend_from_slice(&[255, 255, 255, 255]);
        }
    }

    SignatureImage::from_rgba(4, 2, buffer).expect("valid signature")
}

/// Jane, present all week 2024-09-16..2024-09-20, signing every day.
pub fn declaration(template: &Template) -> Declaration {
    let mut declaration = Declaration::new(template.attendance(), date(2024, 9, 20));
    declaration
        .set_learner(LearnerName::new("Jane O'Brien"))
        .set_range(DateRange::new(date(2024, 9, 16), date(2024, 9, 20)).expect("valid range"))
        .set_signature(Some(signature()));

    for index in 0..declaration.attendance().len() {
        declaration
            .attendance_mut()
            .row_at_mut(index)
            .expect("row exists")
            .set_am_present(true)
            .set_pm_present(true)
            .set_include_signature(true);
    }

    declaration
}

pub fn document_xml(bytes: &[u8]) -> XmlDocument {
    let package = DocxPackage::from_bytes(bytes).expect("output should be a zip");
    XmlDocument::parse(
        package
            .part(DocxPackage::DOCUMENT)
            .expect("output should have a document"),
    )
    .expect("document should be well formed")
}

/// The cell texts of the attendance table, without the header.
pub fn attendance_texts(bytes: &[u8]) -> Vec<Vec<String>> {
    let document = document_xml(bytes);
    let table = document
        .root()
        .element("body")
        .and_then(|body| body.elements("tbl").nth(1))
        .expect("attendance table");

    table
        .elements("tr")
        .skip(1)
        .map(|row| docx::row_texts(row).expect("row text"))
        .collect()
}

/// The texts of the paragraphs directly in the body.
pub fn body_paragraphs(bytes: &[u8]) -> Vec<String> {
    let document = document_xml(bytes);
    let body = document.root().element("body").expect("body");

    body.elements("p")
        .map(|paragraph| docx::paragraph_text(paragraph).expect("paragraph text"))
        .collect()
}

pub fn count_drawings(bytes: &[u8]) -> usize {
    document_xml(bytes).root().descendants("drawing").len()
}

/// Records every upload, answering with a fixed status.
pub struct RecordingTarget {
    status: i32,
    reject_credentials: bool,
    authenticated: bool,
    pub authentications: usize,
    uploads: RefCell<Vec<(String, Vec<u8>, String)>>,
}

impl RecordingTarget {
    pub fn answering(status: i32) -> Self {
        Self {
            status,
            reject_credentials: false,
            authenticated: false,
            authentications: 0,
            uploads: RefCell::new(Vec::new()),
        }
    }

    pub fn rejecting_credentials() -> Self {
        Self {
            reject_credentials: true,
            ..Self::answering(201)
        }
    }

    /// `(file name, bytes, destination)` of every upload.
    pub fn uploads(&self) -> Vec<(String, Vec<u8>, String)> {
        self.uploads.borrow().clone()
    }
}

impl SubmissionTarget for RecordingTarget {
    fn authenticate(&mut self) -> Result<(), AuthenticationError> {
        self.authentications += 1;

        if self.reject_credentials {
            return Err(AuthenticationError::Rejected {
                code: "invalid_client".to_string(),
                description: "Invalid client secret provided.".to_string(),
            });
        }

        self.authenticated = true;
        Ok(())
    }

    fn upload(
        &self,
        document: &RenderedDocument,
        destination: &str,
    ) -> Result<UploadOutcome, UploadError> {
        if !self.authenticated {
            return Err(UploadError::NotAuthenticated);
        }

        self.uploads.borrow_mut().push((
            document.file_name().to_string(),
            document.bytes().to_vec(),
            destination.to_string(),
        ));

        Ok(UploadOutcome::from_status(self.status))
    }
}

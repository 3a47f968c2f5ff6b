//! Filling a template with a declaration.

use bootcamp_timesheet::docx::{
    DocumentRenderer, DocxPackage, Node, RenderError, RenderedDocument, Template,
};
use bootcamp_timesheet::input::{Attendance, Declaration, SignatureImage};
use bootcamp_timesheet::time::{resolve_dates, DateRange, ResolvedDates};

use pretty_assertions::assert_eq;

mod common;

use common::{attendance_texts, body_paragraphs, count_drawings, date, document, paragraph};

fn week_dates() -> ResolvedDates {
    resolve_dates(&DateRange::new(date(2024, 9, 16), date(2024, 9, 20)).unwrap()).unwrap()
}

fn render(declaration: &Declaration) -> Result<RenderedDocument, RenderError> {
    let template = common::template();
    DocumentRenderer::new(&template, &week_dates(), declaration).render(3)
}

fn row(cells: [&str; 5]) -> Vec<String> {
    cells.iter().map(|cell| cell.to_string()).collect()
}

#[test]
fn test_present_and_signed_all_week() {
    let template = common::template();
    let declaration = common::declaration(&template);

    let document = DocumentRenderer::new(&template, &week_dates(), &declaration)
        .render(3)
        .expect("rendering should succeed");

    assert_eq!(document.file_name(), "Timesheet_w3_Jane_O_Brien.docx");

    assert_eq!(
        attendance_texts(document.bytes()),
        vec![
            row(["Monday", "16/09/2024", "✓ /", "✓ /", ""]),
            row(["Tuesday", "17/09/2024", "✓ /", "✓ /", ""]),
            row(["Wednesday", "18/09/2024", "✓ /", "✓ /", ""]),
            row(["Thursday", "19/09/2024", "✓ /", "✓ /", ""]),
            row(["Friday", "20/09/2024", "✓ /", "✓ /", ""]),
        ]
    );

    assert_eq!(
        body_paragraphs(document.bytes()),
        vec![
            "Skills Boot Camp",
            "Weekly Timesheet",
            "I, Jane O'Brien, confirm my attendance from 16/09/2024 to 20/09/2024.",
            "Signature: ",
            "Signed on 20/09/2024",
        ]
    );

    // five signature cells and the declaration
    assert_eq!(count_drawings(document.bytes()), 6);

    let package = DocxPackage::from_bytes(document.bytes()).unwrap();
    assert!(package.part("word/media/learner_signature.png").is_some());

    let relationships =
        String::from_utf8(package.part(DocxPackage::DOCUMENT_RELATIONSHIPS).unwrap().to_vec())
            .unwrap();
    assert!(relationships.contains(r#"Target="media/learner_signature.png""#));

    let content_types =
        String::from_utf8(package.part(DocxPackage::CONTENT_TYPES).unwrap().to_vec()).unwrap();
    assert!(content_types.contains(r#"Extension="png""#));
}

#[test]
fn test_marks_and_absent_days() {
    let template = common::template();
    let mut declaration = common::declaration(&template);

    let attendance = declaration.attendance_mut();
    attendance
        .row_mut("Monday")
        .unwrap()
        .set_am_present(false)
        .set_am_absent(true);
    attendance
        .row_mut("Tuesday")
        .unwrap()
        .set_pm_present(false)
        .set_pm_absent(true)
        .set_include_signature(false);
    // both boxes of a half-day can be ticked
    attendance.row_mut("Wednesday").unwrap().set_am_absent(true);

    let document = render(&declaration).unwrap();

    assert_eq!(
        attendance_texts(document.bytes()),
        vec![
            row(["Monday", "16/09/2024", "/ ✓", "✓ /", ""]),
            row(["Tuesday", "17/09/2024", "✓ /", "/ ✓", "Absent"]),
            row(["Wednesday", "18/09/2024", "✓ / ✓", "✓ /", ""]),
            row(["Thursday", "19/09/2024", "✓ /", "✓ /", ""]),
            row(["Friday", "20/09/2024", "✓ /", "✓ /", ""]),
        ]
    );
    assert_eq!(count_drawings(document.bytes()), 5);
}

#[test]
fn test_without_signature() {
    let template = common::template();
    let mut declaration = common::declaration(&template);
    declaration.set_signature(None);
    for index in 0..declaration.attendance().len() {
        declaration
            .attendance_mut()
            .row_at_mut(index)
            .unwrap()
            .set_include_signature(false);
    }

    let document = render(&declaration).unwrap();

    assert!(attendance_texts(document.bytes())
        .iter()
        .all(|cells| cells[4] == "Absent"));
    assert_eq!(count_drawings(document.bytes()), 0);

    let package = DocxPackage::from_bytes(document.bytes()).unwrap();
    assert_eq!(package.part("word/media/learner_signature.png"), None);
}

#[test]
fn test_missing_signature() {
    let template = common::template();
    let mut declaration = common::declaration(&template);
    declaration.set_signature(None);

    match render(&declaration) {
        Err(RenderError::SignatureMissing(days)) => assert_eq!(
            days,
            vec!["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"]
        ),
        other => panic!("expected a missing signature, got {:?}", other),
    }
}

#[test]
fn test_blank_signature_is_missing() {
    let template = common::template();
    let mut declaration = common::declaration(&template);
    declaration.set_signature(Some(
        SignatureImage::from_rgba(2, 2, vec![255; 16]).unwrap(),
    ));

    assert!(matches!(
        render(&declaration),
        Err(RenderError::SignatureMissing(_))
    ));
}

#[test]
fn test_attendance_must_match_template() {
    let template = common::template();
    let mut declaration = common::declaration(&template);
    let first_two = declaration.attendance().rows()[..2].to_vec();
    *declaration.attendance_mut() = Attendance::new(first_two);

    assert!(matches!(
        render(&declaration),
        Err(RenderError::RowMismatch {
            template: 5,
            declaration: 2
        })
    ));
}

#[test]
fn test_rendering_is_repeatable() {
    let template = common::template();
    let declaration = common::declaration(&template);
    let dates = week_dates();
    let renderer = DocumentRenderer::new(&template, &dates, &declaration);

    let first = renderer.render(3).unwrap();
    let second = renderer.render(3).unwrap();

    let document = |rendered: &RenderedDocument| {
        DocxPackage::from_bytes(rendered.bytes())
            .unwrap()
            .part(DocxPackage::DOCUMENT)
            .unwrap()
            .to_vec()
    };

    assert_eq!(document(&first), document(&second));
    assert_eq!(first.file_name(), second.file_name());
}

#[test]
fn test_signature_file_is_removed() {
    let scratch = tempfile::TempDir::new().unwrap();
    let template = common::template();
    let declaration = common::declaration(&template);
    let dates = week_dates();

    DocumentRenderer::new(&template, &dates, &declaration)
        .scratch_dir(scratch.path())
        .render(3)
        .unwrap();

    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[test]
fn test_signature_file_is_removed_on_failure() {
    let scratch = tempfile::TempDir::new().unwrap();
    let bytes = common::package_with_relationships(
        &document(
            &[
                common::schedule_table(),
                common::declaration_paragraphs(),
                common::attendance_table(),
            ]
            .concat(),
        ),
        "<Relationships><Relationship Id=\"rId1\"></Relationships>",
    );
    let template = Template::from_bytes(&bytes).unwrap();
    let declaration = common::declaration(&template);
    let dates = week_dates();

    let result = DocumentRenderer::new(&template, &dates, &declaration)
        .scratch_dir(scratch.path())
        .render(3);

    assert!(matches!(result, Err(RenderError::Xml(_))));
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[test]
fn test_line_breaks_survive_filling() {
    let bytes = common::package(&document(
        &[
            common::schedule_table(),
            paragraph("Weekly Timesheet"),
            concat!(
                "<w:p><w:r><w:t>I, learner_name</w:t><w:br/>",
                "<w:t>confirm start_date</w:t></w:r></w:p>"
            )
            .to_string(),
            paragraph("Signature: learner_signature"),
            common::attendance_table(),
        ]
        .concat(),
    ));
    let template = Template::from_bytes(&bytes).unwrap();
    let declaration = common::declaration(&template);

    let document = DocumentRenderer::new(&template, &week_dates(), &declaration)
        .render(3)
        .unwrap();

    assert_eq!(
        body_paragraphs(document.bytes())[1],
        "I, Jane O'Brien\nconfirm 16/09/2024"
    );

    let xml = common::document_xml(document.bytes());
    let declaration_paragraph = xml.root().element("body").unwrap().elements("p").nth(1).unwrap();
    let run = declaration_paragraph.element("r").unwrap();
    assert_eq!(
        run.children()
            .iter()
            .filter_map(|node| match node {
                Node::Element(element) => Some(element.name().to_string()),
                _ => None,
            })
            .collect::<Vec<_>>(),
        vec!["w:t", "w:br", "w:t"]
    );
}

#[test]
fn test_cell_signature_width() {
    let template = common::template();
    let declaration = common::declaration(&template);
    let dates = week_dates();

    let document = DocumentRenderer::new(&template, &dates, &declaration)
        .cell_signature_width(2.0)
        .render(3)
        .unwrap();

    let xml = common::document_xml(document.bytes());
    let widths = xml
        .root()
        .descendants("extent")
        .iter()
        .filter_map(|extent| extent.attribute("cx").map(|cx| cx.into_owned()))
        .collect::<Vec<_>>();

    // 3.8 cm in the declaration, 2 cm in every cell
    assert_eq!(
        widths,
        vec!["1368000", "720000", "720000", "720000", "720000", "720000"]
    );
}

#[test]
fn test_write_to() {
    let workspace = common::Workspace::new();
    let document = RenderedDocument::new("Timesheet_w1_Jane.docx", vec![1, 2, 3]);

    let path = document.write_to(workspace.path().join("docx")).unwrap();

    assert_eq!(path, workspace.path().join("docx/Timesheet_w1_Jane.docx"));
    assert_eq!(std::fs::read(path).unwrap(), vec![1, 2, 3]);
}

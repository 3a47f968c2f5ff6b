//! Helpers for the handful of WordprocessingML elements the time sheet uses.

use crate::docx::xml::{Element, Node, XmlError};

pub const PARAGRAPH: &str = "p";
pub const RUN: &str = "r";
pub const TEXT: &str = "t";
pub const BREAK: &str = "br";
pub const CARRIAGE_RETURN: &str = "cr";
pub const TAB: &str = "tab";
pub const TABLE: &str = "tbl";
pub const ROW: &str = "tr";
pub const CELL: &str = "tc";

const PARAGRAPH_PROPERTIES: &str = "pPr";
const RUN_PROPERTIES: &str = "rPr";

/// The text of a paragraph, line breaks become `\n` and tabs `\t`.
pub fn paragraph_text(paragraph: &Element) -> Result<String, XmlError> {
    let mut result = String::new();
    push_text(paragraph, &mut result)?;
    Ok(result)
}

fn push_text(element: &Element, result: &mut String) -> Result<(), XmlError> {
    for node in element.children() {
        if let Node::Element(child) = node {
            match child.local_name() {
                TEXT => result.push_str(&child.text()?),
                BREAK | CARRIAGE_RETURN => result.push('\n'),
                TAB => result.push('\t'),
                // tab stops live in the properties
                PARAGRAPH_PROPERTIES | RUN_PROPERTIES => {}
                _ => push_text(child, result)?,
            }
        }
    }

    Ok(())
}

fn is_layout(node: &Node) -> bool {
    matches!(
        node,
        Node::Element(element) if matches!(element.local_name(), BREAK | CARRIAGE_RETURN | TAB)
    )
}

fn is_text(node: &Node) -> bool {
    matches!(node, Node::Element(element) if element.local_name() == TEXT)
}

/// Replaces the text of a paragraph.
///
/// The whole text ends up in the first run with text, so it keeps that run's
/// formatting. All other text elements are emptied. Breaks and tabs are
/// rebuilt from the `\n` and `\t` in `text`.
pub fn set_paragraph_text(paragraph: &mut Element, text: &str) {
    {
        let mut runs = paragraph.descendants_mut(RUN).into_iter().filter_map(|run| {
            run.children_mut().retain(|node| !is_layout(node));
            run.children().iter().any(is_text).then_some(run)
        });

        if let Some(first) = runs.next() {
            let children = first.children_mut();
            let index = children.iter().position(is_text).unwrap_or(children.len());
            children.retain(|node| !is_text(node));

            let tail = children.split_off(index);
            children.extend(text_content(text).into_iter().map(Node::Element));
            children.extend(tail);

            for other in runs {
                for element in other.elements_mut(TEXT) {
                    element.set_text("");
                }
            }
            return;
        }
    }

    if !text.is_empty() {
        paragraph.push(text_run(text));
    }
}

/// The `w:t`, `w:br` and `w:tab` elements spelling out `text`.
fn text_content(text: &str) -> Vec<Element> {
    let mut result = Vec::new();
    let mut rest = text;

    while let Some(index) = rest.find(['\n', '\t']) {
        if index > 0 {
            result.push(text_element(&rest[..index]));
        }
        result.push(Element::new(if rest[index..].starts_with('\n') {
            "w:br"
        } else {
            "w:tab"
        }));
        rest = &rest[index + 1..];
    }

    if !rest.is_empty() || result.is_empty() {
        result.push(text_element(rest));
    }

    result
}

fn text_element(text: &str) -> Element {
    Element::new("w:t")
        .with_attribute("xml:space", "preserve")
        .with_text(text)
}

#[must_use]
pub fn text_run(text: &str) -> Element {
    let mut run = Element::new("w:r");
    run.children_mut()
        .extend(text_content(text).into_iter().map(Node::Element));
    run
}

/// Adds a run holding the given raw markup, e.g. an inline drawing.
pub fn append_markup_run(paragraph: &mut Element, markup: String) {
    let mut run = Element::new("w:r");
    run.children_mut().push(Node::Markup(markup));
    paragraph.push(run);
}

/// The number of grid columns a cell spans.
#[must_use]
pub fn grid_span(cell: &Element) -> usize {
    cell.element("tcPr")
        .and_then(|properties| properties.element("gridSpan"))
        .and_then(|span| span.attribute("w:val"))
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|span| *span > 0)
        .unwrap_or(1)
}

/// The text of a cell, its paragraphs joined with spaces and trimmed.
pub fn cell_text(cell: &Element) -> Result<String, XmlError> {
    let paragraphs = cell
        .elements(PARAGRAPH)
        .map(paragraph_text)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(paragraphs.join("\n").replace('\n', " ").trim().to_string())
}

/// The texts of all cells in a row, a merged cell is repeated for every
/// column it spans.
pub fn row_texts(row: &Element) -> Result<Vec<String>, XmlError> {
    let mut result = Vec::new();
    for cell in row.elements(CELL) {
        let text = cell_text(cell)?;
        for _ in 0..grid_span(cell) {
            result.push(text.clone());
        }
    }

    Ok(result)
}

/// Replaces the content of a cell with a single paragraph of text.
pub fn set_cell_text(cell: &mut Element, text: &str) {
    let mut first = true;
    cell.children_mut().retain(|node| match node {
        Node::Element(element) if element.local_name() == PARAGRAPH => {
            let keep = first;
            first = false;
            keep
        }
        _ => true,
    });

    if let Some(paragraph) = cell.element_mut(PARAGRAPH) {
        set_paragraph_text(paragraph, text);
    } else {
        let mut paragraph = Element::new("w:p");
        set_paragraph_text(&mut paragraph, text);
        cell.push(paragraph);
    }
}

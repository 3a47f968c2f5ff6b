use quick_xml::escape::escape;

use crate::docx::package::DocxPackage;
use crate::docx::xml::{Element, Node, XmlDocument, XmlError};

const IMAGE_RELATIONSHIP: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
const RELATIONSHIPS_NAMESPACE: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships";
const CONTENT_TYPES_NAMESPACE: &str =
    "http://schemas.openxmlformats.org/package/2006/content-types";

/// English Metric Units per centimetre.
const EMU_PER_CM: f64 = 360_000.0;

/// An image stored in the package, referenced by its relationship id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedImage {
    relationship_id: String,
    /// width / height of the source image
    pixels: (u32, u32),
    name: String,
}

impl EmbeddedImage {
    /// Stores a png in the package and links it to the main document.
    pub fn register_png(
        package: &mut DocxPackage,
        name: &str,
        data: Vec<u8>,
        pixels: (u32, u32),
    ) -> Result<Self, XmlError> {
        let target = format!("media/{}.png", name);
        package.set_part(&format!("word/{}", target), data);

        let relationship_id = add_relationship(package, &target)?;
        add_png_content_type(package)?;

        Ok(Self {
            relationship_id,
            pixels,
            name: name.to_string(),
        })
    }

    /// The markup of an inline drawing, `width` in cm, the height follows from
    /// the aspect ratio of the image.
    #[must_use]
    pub fn inline_markup(&self, drawing_id: u32, width: f32) -> String {
        let (pixel_width, pixel_height) = self.pixels;
        let cx = (f64::from(width) * EMU_PER_CM).round() as i64;
        let cy = if pixel_width == 0 {
            cx
        } else {
            (cx as f64 * f64::from(pixel_height) / f64::from(pixel_width)).round() as i64
        };
        let name = escape(self.name.as_str());

        format!(
            concat!(
                r#"<w:drawing><wp:inline xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" distT="0" distB="0" distL="0" distR="0">"#,
                r#"<wp:extent cx="{cx}" cy="{cy}"/><wp:effectExtent l="0" t="0" r="0" b="0"/>"#,
                r#"<wp:docPr id="{id}" name="{name} {id}"/>"#,
                r#"<wp:cNvGraphicFramePr><a:graphicFrameLocks xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" noChangeAspect="1"/></wp:cNvGraphicFramePr>"#,
                r#"<a:graphic xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
                r#"<pic:pic xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
                r#"<pic:nvPicPr><pic:cNvPr id="0" name="{name}.png"/><pic:cNvPicPr/></pic:nvPicPr>"#,
                r#"<pic:blipFill><a:blip xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" r:embed="{rid}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
                r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr>"#,
                r#"</pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing>"#
            ),
            cx = cx,
            cy = cy,
            id = drawing_id,
            name = name,
            rid = self.relationship_id,
        )
    }

    pub fn relationship_id(&self) -> &str {
        &self.relationship_id
    }
}

fn load_or_create(
    package: &DocxPackage,
    part: &str,
    root: &str,
    namespace: &str,
) -> Result<XmlDocument, XmlError> {
    match package.part(part) {
        Some(bytes) => XmlDocument::parse(bytes),
        None => Ok(XmlDocument::new(
            Element::new(root).with_attribute("xmlns", namespace),
        )),
    }
}

fn add_relationship(package: &mut DocxPackage, target: &str) -> Result<String, XmlError> {
    let mut relationships = load_or_create(
        package,
        DocxPackage::DOCUMENT_RELATIONSHIPS,
        "Relationships",
        RELATIONSHIPS_NAMESPACE,
    )?;

    let existing = relationships
        .root()
        .elements("Relationship")
        .filter_map(|relationship| {
            relationship
                .attribute("Id")
                .map(|id| (id.into_owned(), relationship.attribute("Target").map(|t| t.into_owned())))
        })
        .collect::<Vec<_>>();

    if let Some((id, _)) = existing
        .iter()
        .find(|(_, existing_target)| existing_target.as_deref() == Some(target))
    {
        return Ok(id.clone());
    }

    let id = (1..)
        .map(|n| format!("rIdSignature{}", n))
        .find(|candidate| existing.iter().all(|(id, _)| id != candidate))
        .unwrap_or_else(|| "rIdSignature".to_string());

    relationships.root_mut().push(
        Element::new("Relationship")
            .with_attribute("Id", &id)
            .with_attribute("Type", IMAGE_RELATIONSHIP)
            .with_attribute("Target", target),
    );

    package.set_part(DocxPackage::DOCUMENT_RELATIONSHIPS, relationships.to_bytes());

    Ok(id)
}

fn add_png_content_type(package: &mut DocxPackage) -> Result<(), XmlError> {
    let mut content_types = load_or_create(
        package,
        DocxPackage::CONTENT_TYPES,
        "Types",
        CONTENT_TYPES_NAMESPACE,
    )?;

    let has_png = content_types.root().elements("Default").any(|default| {
        default
            .attribute("Extension")
            .map_or(false, |extension| extension.eq_ignore_ascii_case("png"))
    });

    if !has_png {
        content_types.root_mut().children_mut().insert(
            0,
            Node::Element(
                Element::new("Default")
                    .with_attribute("Extension", "png")
                    .with_attribute("ContentType", "image/png"),
            ),
        );
        package.set_part(DocxPackage::CONTENT_TYPES, content_types.to_bytes());
    }

    Ok(())
}

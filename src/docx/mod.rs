//! Reading and filling `.docx` time sheet templates.

mod drawing;
mod package;
mod render;
mod template;
mod tokens;
mod wordml;
mod xml;

pub use drawing::EmbeddedImage;
pub use package::{DocxPackage, PackageError};
pub use render::*;
pub use template::{Template, TemplateError, TemplateFormatError, LEARNER_NAME};
pub use tokens::TokenMap;
pub use xml::{Element, Node, XmlDocument, XmlError};

pub use wordml::{cell_text, paragraph_text, row_texts};

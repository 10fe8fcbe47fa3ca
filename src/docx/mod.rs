//! WordprocessingML package access: the zip container, a lossless XML tree
//! for individual parts, and paragraph/run helpers on top of it.

pub mod package;
pub mod paragraph;
pub mod xml;

pub use package::{DocxPackage, DOCUMENT_PART};
pub use paragraph::{append_to_body, document_texts, paragraph_text, ParagraphBuilder};
pub use xml::{Element, Node, XmlDocument};

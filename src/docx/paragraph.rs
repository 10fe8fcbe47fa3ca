//! Paragraph and run view over a WordprocessingML tree.
//!
//! A paragraph's visible text is spread over runs (`w:r`), each carrying its
//! own formatting in `w:rPr`. Runs may sit directly in the paragraph or inside
//! wrappers such as hyperlinks, tracked insertions and content controls. Text
//! lives in `w:t` elements; tabs and breaks are separate elements that count
//! as fixed characters.

use super::xml::{Element, Node, XmlDocument};
use crate::error::{DocxError, Result};

pub const PARAGRAPH: &str = "w:p";
pub const RUN: &str = "w:r";
pub const TEXT: &str = "w:t";

/// Wrappers whose runs belong to the enclosing paragraph
const RUN_CONTAINERS: &[&str] = &[
    "w:hyperlink",
    "w:ins",
    "w:smartTag",
    "w:sdt",
    "w:sdtContent",
    "w:fldSimple",
    "w:customXml",
    "w:moveTo",
];

/// A piece of paragraph text in document order
#[derive(Debug)]
pub enum Slot<'a> {
    /// Editable `w:t` element
    Text(&'a mut Element),
    /// Tab or break, rendered as a single character and never edited
    Fixed(char),
}

fn fixed_char(name: &str) -> Option<char> {
    match name {
        "w:tab" => Some('\t'),
        "w:br" | "w:cr" => Some('\n'),
        _ => None,
    }
}

/// Collect the text slots of a paragraph in document order
pub fn collect_slots(paragraph: &mut Element) -> Vec<Slot<'_>> {
    let mut slots = Vec::new();
    collect_container(paragraph, &mut slots);
    slots
}

fn collect_container<'a>(container: &'a mut Element, out: &mut Vec<Slot<'a>>) {
    for node in container.children.iter_mut() {
        let Node::Element(child) = node else {
            continue;
        };
        if child.name == RUN {
            collect_run(child, out);
        } else if RUN_CONTAINERS.contains(&child.name.as_str()) {
            collect_container(child, out);
        }
    }
}

fn collect_run<'a>(run: &'a mut Element, out: &mut Vec<Slot<'a>>) {
    for node in run.children.iter_mut() {
        let Node::Element(child) = node else {
            continue;
        };
        if child.name == TEXT {
            out.push(Slot::Text(child));
        } else if let Some(c) = fixed_char(&child.name) {
            out.push(Slot::Fixed(c));
        }
    }
}

/// Visible text of a paragraph, tabs as `\t` and breaks as `\n`
pub fn paragraph_text(paragraph: &Element) -> String {
    let mut text = String::new();
    push_container_text(paragraph, &mut text);
    text
}

fn push_container_text(container: &Element, out: &mut String) {
    for child in container.child_elements() {
        if child.name == RUN {
            for piece in child.child_elements() {
                if piece.name == TEXT {
                    out.push_str(&piece.text());
                } else if let Some(c) = fixed_char(&piece.name) {
                    out.push(c);
                }
            }
        } else if RUN_CONTAINERS.contains(&child.name.as_str()) {
            push_container_text(child, out);
        }
    }
}

/// Every paragraph under `root`, including table cells and text boxes
pub fn paragraphs(root: &Element) -> Vec<&Element> {
    let mut found = Vec::new();
    gather_paragraphs(root, &mut found);
    found
}

fn gather_paragraphs<'a>(el: &'a Element, out: &mut Vec<&'a Element>) {
    for child in el.child_elements() {
        if child.name == PARAGRAPH {
            out.push(child);
        }
        // Text boxes nest whole paragraphs inside a run
        gather_paragraphs(child, out);
    }
}

/// Call `f` on every paragraph under `root`, outer paragraphs first
pub fn for_each_paragraph_mut<F>(root: &mut Element, f: &mut F)
where
    F: FnMut(&mut Element),
{
    for node in root.children.iter_mut() {
        let Node::Element(child) = node else {
            continue;
        };
        if child.name == PARAGRAPH {
            f(child);
        }
        for_each_paragraph_mut(child, f);
    }
}

/// Text of every paragraph in a part
pub fn document_texts(doc: &XmlDocument) -> Vec<String> {
    doc.root()
        .map(|root| paragraphs(root).into_iter().map(paragraph_text).collect())
        .unwrap_or_default()
}

/// Build a `w:t` element, preserving edge whitespace
pub fn text_element(text: &str) -> Element {
    let mut t = Element::new(TEXT);
    set_slot_text(&mut t, text);
    t
}

/// Set the content of a `w:t`, keeping `xml:space` in step with the text
pub fn set_slot_text(t: &mut Element, text: &str) {
    if needs_preserve(text) {
        t.set_attr("xml:space", "preserve");
    }
    t.set_text(text);
}

fn needs_preserve(text: &str) -> bool {
    text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace)
}

#[derive(Debug, Clone)]
struct RunSpec {
    text: String,
    bold: bool,
}

/// Builds new paragraphs for appended content
#[derive(Debug, Clone, Default)]
pub struct ParagraphBuilder {
    style: Option<String>,
    runs: Vec<RunSpec>,
}

impl ParagraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paragraph style id (`w:pStyle`)
    pub fn style(mut self, style: Option<&str>) -> Self {
        self.style = style.filter(|s| !s.trim().is_empty()).map(str::to_string);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.runs.push(RunSpec {
            text: text.into(),
            bold: false,
        });
        self
    }

    pub fn bold(mut self, text: impl Into<String>) -> Self {
        self.runs.push(RunSpec {
            text: text.into(),
            bold: true,
        });
        self
    }

    pub fn build(self) -> Element {
        let mut p = Element::new(PARAGRAPH);

        if let Some(style) = self.style {
            let style = Element::new("w:pStyle").with_attr("w:val", style);
            p = p.with_child(Element::new("w:pPr").with_child(style));
        }

        for spec in self.runs {
            p = p.with_child(build_run(&spec));
        }
        p
    }
}

/// `\n` becomes `w:br` and `\t` becomes `w:tab`, like Word does on paste
fn build_run(spec: &RunSpec) -> Element {
    let mut run = Element::new(RUN);
    if spec.bold {
        run = run.with_child(Element::new("w:rPr").with_child(Element::new("w:b")));
    }

    let mut pending = String::new();
    for c in spec.text.chars() {
        let control = match c {
            '\n' => Some("w:br"),
            '\t' => Some("w:tab"),
            _ => None,
        };
        match control {
            Some(name) => {
                if !pending.is_empty() {
                    run = run.with_child(text_element(&pending));
                    pending.clear();
                }
                run = run.with_child(Element::new(name));
            }
            None => pending.push(c),
        }
    }
    if !pending.is_empty() {
        run = run.with_child(text_element(&pending));
    }
    run
}

/// Append paragraphs at the end of the body, ahead of the final `w:sectPr`
pub fn append_to_body(doc: &mut XmlDocument, new_paragraphs: Vec<Element>) -> Result<()> {
    let part = doc.part.clone();
    let body = doc
        .root_mut()
        .and_then(|root| root.child_mut("w:body"))
        .ok_or_else(|| DocxError::Xml {
            part,
            details: "document has no w:body".to_string(),
        })?;

    // Indented parts end with whitespace text after `w:sectPr`
    let last_element = body
        .children
        .iter()
        .rposition(|node| matches!(node, Node::Element(_)));
    let insert_at = match last_element {
        Some(i) if matches!(&body.children[i], Node::Element(el) if el.name == "w:sectPr") => i,
        _ => body.children.len(),
    };

    let nodes = new_paragraphs.into_iter().map(Node::Element);
    body.children.splice(insert_at..insert_at, nodes);
    Ok(())
}

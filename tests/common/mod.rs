#![allow(dead_code)]

use std::io::{Cursor, Write};
use tpd_rollforward::docx::{document_texts, DocxPackage, XmlDocument};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

pub const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#;

pub const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:style w:type="paragraph" w:styleId="Normal"/></w:styles>"#;

/// Wrap body content in a `w:document` with a trailing section
pub fn document_xml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{}"><w:body>{}<w:sectPr><w:pgSz w:w="11906" w:h="16838"/></w:sectPr></w:body></w:document>"#,
        W_NS, body
    )
}

pub fn header_xml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:hdr xmlns:w="{}">{}</w:hdr>"#,
        W_NS, body
    )
}

pub fn build_docx(parts: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in parts {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// A prior-year report with a split FY token, a report date label and a header
pub fn prior_year_docx() -> Vec<u8> {
    let body = concat!(
        r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">Transfer Pricing Report FY</w:t></w:r>"#,
        r#"<w:r><w:rPr><w:color w:val="FF0000"/></w:rPr><w:t>2023</w:t></w:r></w:p>"#,
        r#"<w:p><w:r><w:t>Report Date</w:t></w:r></w:p>"#,
        r#"<w:p><w:r><w:t>Results for FY 2023 and fy-2023 remain comparable.</w:t></w:r></w:p>"#,
    );
    let header = r#"<w:p><w:r><w:t>Acme Group FY2023</w:t></w:r></w:p>"#;

    build_docx(&[
        ("[Content_Types].xml", CONTENT_TYPES),
        ("word/document.xml", &document_xml(body)),
        ("word/styles.xml", STYLES),
        ("word/header1.xml", &header_xml(header)),
    ])
}

/// Paragraph texts of one part of a DOCX
pub fn part_texts(docx: &[u8], part: &str) -> Vec<String> {
    let package = DocxPackage::from_bytes(docx).unwrap();
    let doc = XmlDocument::parse(part, package.part(part).unwrap()).unwrap();
    document_texts(&doc)
}

pub fn part_string(docx: &[u8], part: &str) -> String {
    let package = DocxPackage::from_bytes(docx).unwrap();
    String::from_utf8(package.part(part).unwrap().to_vec()).unwrap()
}

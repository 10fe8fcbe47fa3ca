//! DOCX container handling.
//!
//! A DOCX file is a zip archive of XML parts. The package keeps every entry
//! in memory in archive order so that parts the engine never touches are
//! written back byte-for-byte.

use crate::error::{DocxError, Error, IoError, Result};
use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::Path;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Main document part, required in every package
pub const DOCUMENT_PART: &str = "word/document.xml";

/// A single archive entry
#[derive(Debug, Clone)]
struct Entry {
    name: String,
    data: Vec<u8>,
    stored: bool,
    is_dir: bool,
}

/// In-memory DOCX package
#[derive(Debug, Clone)]
pub struct DocxPackage {
    entries: Vec<Entry>,
}

impl DocxPackage {
    /// Read a package from raw DOCX bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| DocxError::InvalidArchive(e.to_string()))?;

        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| DocxError::InvalidArchive(e.to_string()))?;

            // Declared sizes come from the archive and are not trusted
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;

            entries.push(Entry {
                name: file.name().to_string(),
                stored: file.compression() == CompressionMethod::Stored,
                is_dir: file.is_dir(),
                data,
            });
        }

        if !entries.iter().any(|e| e.name == DOCUMENT_PART) {
            return Err(DocxError::MissingPart(DOCUMENT_PART.to_string()).into());
        }

        debug!("Loaded DOCX package with {} entries", entries.len());
        Ok(Self { entries })
    }

    /// Read a package from a file
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|source| {
            Error::Io(IoError::FileReadFailed {
                path: path.display().to_string(),
                source,
            })
        })?;
        Self::from_bytes(&bytes)
    }

    /// Serialize the package back into DOCX bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        for entry in &self.entries {
            let method = if entry.stored {
                CompressionMethod::Stored
            } else {
                CompressionMethod::Deflated
            };
            let options = SimpleFileOptions::default().compression_method(method);

            if entry.is_dir {
                writer
                    .add_directory(entry.name.as_str(), options)
                    .map_err(|e| DocxError::WriteFailed(e.to_string()))?;
                continue;
            }

            writer
                .start_file(entry.name.as_str(), options)
                .map_err(|e| DocxError::WriteFailed(e.to_string()))?;
            writer.write_all(&entry.data)?;
        }

        let cursor = writer
            .finish()
            .map_err(|e| DocxError::WriteFailed(e.to_string()))?;
        Ok(cursor.into_inner())
    }

    /// Write the package to a file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| {
                    Error::Io(IoError::DirectoryCreateFailed {
                        path: parent.display().to_string(),
                        source,
                    })
                })?;
            }
        }

        let bytes = self.to_bytes()?;
        fs::write(path, bytes).map_err(|source| {
            Error::Io(IoError::FileWriteFailed {
                path: path.display().to_string(),
                source,
            })
        })
    }

    /// Raw bytes of a part, if present
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.name == name && !e.is_dir)
            .map(|e| e.data.as_slice())
    }

    /// All entry names in archive order
    pub fn part_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Replace the content of a part, or append it when absent
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.data = data,
            None => self.entries.push(Entry {
                name: name.to_string(),
                data,
                stored: false,
                is_dir: false,
            }),
        }
    }

    /// Text-bearing parts, main document first.
    ///
    /// When `include_secondary` is false only the main document is returned.
    pub fn story_parts(&self, include_secondary: bool) -> Vec<String> {
        let mut secondary: Vec<String> = if include_secondary {
            self.entries
                .iter()
                .filter(|e| !e.is_dir && is_secondary_story(&e.name))
                .map(|e| e.name.clone())
                .collect()
        } else {
            Vec::new()
        };
        secondary.sort();

        let mut parts = vec![DOCUMENT_PART.to_string()];
        parts.extend(secondary);
        parts
    }
}

/// Headers, footers and notes carry running text that mentions the fiscal year
fn is_secondary_story(name: &str) -> bool {
    let Some(file) = name.strip_prefix("word/") else {
        return false;
    };
    if file.contains('/') || !file.ends_with(".xml") {
        return false;
    }
    file.starts_with("header")
        || file.starts_with("footer")
        || file == "footnotes.xml"
        || file == "endnotes.xml"
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn build_zip(files: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in files {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_from_bytes_requires_document_part() {
        let bytes = build_zip(&[("word/styles.xml", "<w:styles/>")]);
        let err = DocxPackage::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, Error::Docx(DocxError::MissingPart(_))));
    }

    #[test]
    fn test_declared_entry_size_is_not_preallocated() {
        let mut bytes = build_zip(&[("word/document.xml", "<w:document/>")]);

        // Claim a ~4 GiB uncompressed size in the local and central headers
        let huge = 0xFFFF_FFF0u32.to_le_bytes();
        for (signature, offset) in [(b"PK\x03\x04", 22), (b"PK\x01\x02", 24)] {
            let at = bytes.windows(4).position(|w| w == signature).unwrap() + offset;
            bytes[at..at + 4].copy_from_slice(&huge);
        }

        // Either outcome is fine as long as it is a result, not an allocation abort
        match DocxPackage::from_bytes(&bytes) {
            Ok(package) => assert_eq!(package.part(DOCUMENT_PART), Some(&b"<w:document/>"[..])),
            Err(err) => assert!(matches!(err, Error::Docx(_) | Error::Io(_))),
        }
    }

    #[test]
    fn test_from_bytes_rejects_non_zip() {
        let err = DocxPackage::from_bytes(b"definitely not a zip").unwrap_err();
        assert!(matches!(err, Error::Docx(DocxError::InvalidArchive(_))));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_round_trip_keeps_order_and_content() {
        let bytes = build_zip(&[
            ("[Content_Types].xml", "<Types/>"),
            ("word/document.xml", "<w:document/>"),
            ("word/media/image1.png", "PNGDATA"),
        ]);

        let package = DocxPackage::from_bytes(&bytes).unwrap();
        let reread = DocxPackage::from_bytes(&package.to_bytes().unwrap()).unwrap();

        assert_eq!(
            reread.part_names(),
            vec!["[Content_Types].xml", "word/document.xml", "word/media/image1.png"]
        );
        assert_eq!(reread.part("word/media/image1.png"), Some(&b"PNGDATA"[..]));
    }

    #[test]
    fn test_set_part_replaces_existing() {
        let bytes = build_zip(&[("word/document.xml", "<old/>")]);
        let mut package = DocxPackage::from_bytes(&bytes).unwrap();

        package.set_part(DOCUMENT_PART, b"<new/>".to_vec());

        assert_eq!(package.part(DOCUMENT_PART), Some(&b"<new/>"[..]));
        assert_eq!(package.part_names().len(), 1);
    }

    #[test]
    fn test_story_parts_order() {
        let bytes = build_zip(&[
            ("word/footer1.xml", "<w:ftr/>"),
            ("word/document.xml", "<w:document/>"),
            ("word/header2.xml", "<w:hdr/>"),
            ("word/header1.xml", "<w:hdr/>"),
            ("word/styles.xml", "<w:styles/>"),
            ("word/footnotes.xml", "<w:footnotes/>"),
            ("word/_rels/header1.xml.rels", "<Relationships/>"),
        ]);
        let package = DocxPackage::from_bytes(&bytes).unwrap();

        assert_eq!(
            package.story_parts(true),
            vec![
                "word/document.xml",
                "word/footer1.xml",
                "word/footnotes.xml",
                "word/header1.xml",
                "word/header2.xml",
            ]
        );
        assert_eq!(package.story_parts(false), vec!["word/document.xml"]);
    }

    #[test]
    fn test_save_creates_directories() {
        let tmp_dir = TempDir::new().unwrap();
        let path = tmp_dir.path().join("out").join("nested").join("draft.docx");

        let bytes = build_zip(&[("word/document.xml", "<w:document/>")]);
        DocxPackage::from_bytes(&bytes).unwrap().save(&path).unwrap();

        assert!(path.exists());
        assert!(DocxPackage::open(&path).is_ok());
    }

    #[test]
    fn test_open_missing_file() {
        let err = DocxPackage::open(Path::new("/nonexistent/prior.docx")).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}

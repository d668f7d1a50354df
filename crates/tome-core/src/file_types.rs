//! MIME and category detection for heterogeneous file content.
//!
//! Detection order: magic bytes first (binary formats carry reliable
//! signatures), then the extension table (text formats have no magic bytes),
//! then a plain-text fallback.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Coarse file category used by search filters and the content endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Document,
    Code,
    Data,
    Image,
    Other,
}

impl FileCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileCategory::Document => "document",
            FileCategory::Code => "code",
            FileCategory::Data => "data",
            FileCategory::Image => "image",
            FileCategory::Other => "other",
        }
    }
}

/// File metadata returned by the enhanced content endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub mime_type: String,
    pub category: FileCategory,
    pub extension: String,
    pub size: usize,
}

static EXTENSION_TABLE: Lazy<HashMap<&'static str, (&'static str, FileCategory)>> =
    Lazy::new(|| {
        [
            ("md", ("text/markdown", FileCategory::Document)),
            ("markdown", ("text/markdown", FileCategory::Document)),
            ("txt", ("text/plain", FileCategory::Document)),
            ("rst", ("text/x-rst", FileCategory::Document)),
            ("html", ("text/html", FileCategory::Document)),
            ("pdf", ("application/pdf", FileCategory::Document)),
            ("rs", ("text/x-rust", FileCategory::Code)),
            ("py", ("text/x-python", FileCategory::Code)),
            ("js", ("text/javascript", FileCategory::Code)),
            ("ts", ("text/typescript", FileCategory::Code)),
            ("go", ("text/x-go", FileCategory::Code)),
            ("sh", ("text/x-shellscript", FileCategory::Code)),
            ("sql", ("text/x-sql", FileCategory::Code)),
            ("c", ("text/x-c", FileCategory::Code)),
            ("json", ("application/json", FileCategory::Data)),
            ("yaml", ("application/yaml", FileCategory::Data)),
            ("yml", ("application/yaml", FileCategory::Data)),
            ("toml", ("application/toml", FileCategory::Data)),
            ("csv", ("text/csv", FileCategory::Data)),
            ("xml", ("application/xml", FileCategory::Data)),
            ("png", ("image/png", FileCategory::Image)),
            ("jpg", ("image/jpeg", FileCategory::Image)),
            ("jpeg", ("image/jpeg", FileCategory::Image)),
            ("gif", ("image/gif", FileCategory::Image)),
            ("svg", ("image/svg+xml", FileCategory::Image)),
        ]
        .into_iter()
        .collect()
    });

/// Look up a MIME type by extension (lowercased).
pub fn mime_from_extension(ext: &str) -> Option<&'static str> {
    EXTENSION_TABLE
        .get(ext.to_lowercase().as_str())
        .map(|(mime, _)| *mime)
}

fn category_from_mime(mime: &str) -> FileCategory {
    if mime.starts_with("image/") {
        FileCategory::Image
    } else if mime == "application/pdf" || mime.starts_with("text/") {
        FileCategory::Document
    } else {
        FileCategory::Other
    }
}

/// Extension of a path (lowercased, without the dot).
pub fn extension_of(path: &str) -> String {
    path.rsplit('/')
        .next()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default()
}

/// Detect MIME type and category for a file.
///
/// Magic bytes win over the extension because the extension can lie about
/// binary content; text formats fall through to the extension table.
pub fn detect_file_metadata(path: &str, data: &[u8]) -> FileMetadata {
    let extension = extension_of(path);

    if let Some(kind) = infer::get(data) {
        let mime = kind.mime_type().to_string();
        let category = category_from_mime(&mime);
        return FileMetadata {
            mime_type: mime,
            category,
            extension,
            size: data.len(),
        };
    }

    if let Some((mime, category)) = EXTENSION_TABLE.get(extension.as_str()) {
        return FileMetadata {
            mime_type: (*mime).to_string(),
            category: *category,
            extension,
            size: data.len(),
        };
    }

    FileMetadata {
        mime_type: "text/plain".to_string(),
        category: FileCategory::Other,
        extension,
        size: data.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_of_handles_paths() {
        assert_eq!(extension_of("docs/guide.MD"), "md");
        assert_eq!(extension_of("a/b/c.tar.gz"), "gz");
        assert_eq!(extension_of("README"), "");
        assert_eq!(extension_of("dir.v2/README"), "");
    }

    #[test]
    fn markdown_detected_by_extension() {
        let meta = detect_file_metadata("notes/runbook.md", b"# Runbook");
        assert_eq!(meta.mime_type, "text/markdown");
        assert_eq!(meta.category, FileCategory::Document);
        assert_eq!(meta.extension, "md");
        assert_eq!(meta.size, 9);
    }

    #[test]
    fn code_and_data_categories() {
        assert_eq!(
            detect_file_metadata("src/main.rs", b"fn main() {}").category,
            FileCategory::Code
        );
        assert_eq!(
            detect_file_metadata("conf.yaml", b"a: 1").category,
            FileCategory::Data
        );
    }

    #[test]
    fn magic_bytes_override_extension() {
        // PNG signature with a lying extension.
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        let meta = detect_file_metadata("image.txt", &png);
        assert_eq!(meta.mime_type, "image/png");
        assert_eq!(meta.category, FileCategory::Image);
    }

    #[test]
    fn unknown_extension_falls_back_to_plain_text() {
        let meta = detect_file_metadata("weird.zzz", b"hello");
        assert_eq!(meta.mime_type, "text/plain");
        assert_eq!(meta.category, FileCategory::Other);
    }
}

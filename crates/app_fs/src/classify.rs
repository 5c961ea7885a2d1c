//! File classification by extension

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Coarse content type used by the editor and tree icons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Text,
    Image,
    Document,
    Video,
    Audio,
    Binary,
}

/// Extensions loaded as text into the editor
const EDITABLE_EXTENSIONS: &[&str] = &[
    // Markdown & plain text
    "md", "markdown", "mdx", "txt", "rst", "log",
    // Data interchange & config
    "json", "jsonl", "yaml", "yml", "toml", "xml", "csv", "tsv", "ini", "cfg", "conf", "env",
    // Web
    "html", "htm", "css", "scss", "sass", "less",
    // Scripts & shell
    "js", "mjs", "cjs", "ts", "jsx", "tsx", "py", "rb", "php", "pl", "lua", "sh", "bash", "zsh",
    "fish", "ps1", "bat",
    // Compiled languages
    "rs", "go", "java", "kt", "swift", "c", "h", "cpp", "hpp", "cc", "cs", "scala",
    // Query & misc
    "sql", "graphql", "r", "tex",
];

const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "bmp", "ico", "svg", "tif", "tiff",
];

const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt", "ods", "odp", "rtf",
];

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "avi", "mkv", "m4v"];

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "flac", "m4a", "aac"];

fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
}

/// True when the file's extension is on the editable allow-list
pub fn is_editable(name: &str) -> bool {
    extension_of(name).map_or(false, |ext| EDITABLE_EXTENSIONS.contains(&ext.as_str()))
}

/// Map a filename to its content type.
///
/// Media lists are checked first; `Text` is only granted to editable files,
/// anything else is `Binary`.
pub fn classify(name: &str) -> ContentType {
    let ext = match extension_of(name) {
        Some(ext) => ext,
        None => return ContentType::Binary,
    };

    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        ContentType::Image
    } else if DOCUMENT_EXTENSIONS.contains(&ext.as_str()) {
        ContentType::Document
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        ContentType::Video
    } else if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
        ContentType::Audio
    } else if is_editable(name) {
        ContentType::Text
    } else {
        ContentType::Binary
    }
}

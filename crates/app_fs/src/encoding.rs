//! Text decoding for files opened in the editor
//!
//! Skill folders collect notes from many places; anything that is not UTF-8
//! is run through charset detection before it reaches the editor.

use chardetng::EncodingDetector;
use encoding_rs::Encoding;

/// Decoded file content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    /// WHATWG name of the encoding that was used
    pub encoding: &'static str,
    /// True if replacement characters were inserted
    pub had_errors: bool,
}

/// Language hint for the detector, taken from `LANG`
fn locale_tld() -> Option<&'static [u8]> {
    let lang = std::env::var("LANG").ok()?.to_lowercase();
    if lang.starts_with("ja") {
        Some(b"jp")
    } else if lang.starts_with("zh_tw") || lang.starts_with("zh-tw") {
        Some(b"tw")
    } else if lang.starts_with("zh") {
        Some(b"cn")
    } else if lang.starts_with("ko") {
        Some(b"kr")
    } else if lang.starts_with("ru") {
        Some(b"ru")
    } else {
        None
    }
}

fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(locale_tld(), true)
}

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decode bytes as UTF-8, falling back to the detected legacy encoding
pub fn decode_text(bytes: &[u8]) -> DecodedText {
    // A UTF-8 BOM is dropped rather than shown in the editor
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    if let Ok(s) = std::str::from_utf8(bytes) {
        return DecodedText {
            text: s.to_string(),
            encoding: encoding_rs::UTF_8.name(),
            had_errors: false,
        };
    }

    let encoding = detect_encoding(bytes);
    let (text, used, had_errors) = encoding.decode(bytes);

    if had_errors {
        tracing::warn!(encoding = used.name(), "Decoding produced replacement characters");
    } else {
        tracing::debug!(encoding = used.name(), "Decoded non-UTF-8 text");
    }

    DecodedText {
        text: text.into_owned(),
        encoding: used.name(),
        had_errors,
    }
}

/// Encode edited text the way `original` was stored.
///
/// A BOM is kept and legacy encodings are written back in kind. Text the
/// legacy encoding cannot represent is saved as UTF-8 instead.
pub fn encode_like(original: &[u8], text: &str) -> Vec<u8> {
    if original.starts_with(UTF8_BOM) {
        let mut out = UTF8_BOM.to_vec();
        out.extend_from_slice(text.as_bytes());
        return out;
    }
    if std::str::from_utf8(original).is_ok() {
        return text.as_bytes().to_vec();
    }

    let encoding = detect_encoding(original);
    let (bytes, used, unmappable) = encoding.encode(text);
    if unmappable {
        tracing::warn!(
            encoding = encoding.name(),
            "Text does not fit the file's encoding, saving as UTF-8"
        );
        return text.as_bytes().to_vec();
    }

    tracing::debug!(encoding = used.name(), "Re-encoded text");
    bytes.into_owned()
}

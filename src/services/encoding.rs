use std::fs;
use std::path::Path;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use serde::Serialize;

use crate::error::Result;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct EncodingGuess {
    pub name: String,
    pub had_errors: bool,
}

#[derive(Debug, Clone)]
pub struct DecodedText {
    pub text: String,
    pub guess: EncodingGuess,
}

pub fn detect(bytes: &[u8]) -> &'static Encoding {
    if bytes.starts_with(UTF8_BOM) {
        return UTF_8;
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

pub fn decode(bytes: &[u8]) -> DecodedText {
    let encoding = detect(bytes);
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let (text, _, had_errors) = encoding.decode(body);

    let name = if bytes.starts_with(UTF8_BOM) {
        "utf-8-sig".to_string()
    } else {
        encoding.name().to_lowercase()
    };

    DecodedText {
        guess: EncodingGuess {
            name,
            had_errors,
        },
        text: text.into_owned(),
    }
}

/// Reads and decodes a text file. CRLF line endings are left to the caller.
pub fn read_text(path: &Path) -> Result<DecodedText> {
    let bytes = fs::read(path)?;
    let decoded = decode(&bytes);
    if decoded.guess.had_errors {
        tracing::warn!(
            path = %path.display(),
            encoding = %decoded.guess.name,
            "file decoded with replacement characters"
        );
    }
    Ok(decoded)
}

/// Decoded lines with trailing `\r` removed.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let decoded = read_text(path)?;
    Ok(decoded
        .text
        .lines()
        .map(|l| l.trim_end_matches('\r').to_string())
        .collect())
}

//! Text encoding detection for resource descriptors.
//!
//! Resource compilers accept both UTF-8 (or plain ASCII) and UTF-16LE
//! scripts. A descriptor is decoded once, edited as a `String`, and encoded
//! back with exactly the encoding and byte-order mark it was read with.

use thiserror::Error;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];
const UTF16LE_BOM: [u8; 2] = [0xFF, 0xFE];

/// The on-disk encoding of a text file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// UTF-8, which includes plain ASCII.
    Utf8 {
        /// Whether the file starts with a UTF-8 byte-order mark.
        bom: bool,
    },
    /// Little-endian UTF-16.
    Utf16Le {
        /// Whether the file starts with a UTF-16LE byte-order mark.
        bom: bool,
    },
}

/// Decoding failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// UTF-16 content with a dangling byte.
    #[error("UTF-16 text has an odd number of bytes")]
    OddLength,
    /// UTF-16 content with unpaired surrogates.
    #[error("invalid UTF-16 text")]
    InvalidUtf16,
    /// Bytes that are neither UTF-8 nor UTF-16LE.
    #[error("invalid UTF-8 text: {0}")]
    InvalidUtf8(String),
}

/// Text together with the encoding it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    /// Detected encoding.
    pub encoding: TextEncoding,
    /// Decoded text, without any byte-order mark.
    pub text: String,
}

/// Detect the encoding of `bytes` and decode them.
///
/// A BOM decides the encoding outright. Without one, a NUL second byte
/// after a non-NUL first byte marks ASCII-range UTF-16LE text.
///
/// # Errors
///
/// Returns an [`EncodingError`] when the bytes are not valid in the detected
/// encoding.
pub fn decode(bytes: &[u8]) -> Result<DecodedText, EncodingError> {
    if let Some(rest) = bytes.strip_prefix(&UTF16LE_BOM) {
        return decode_utf16le(rest, true);
    }
    if let Some(rest) = bytes.strip_prefix(&UTF8_BOM) {
        return decode_utf8(rest, true);
    }
    if matches!(bytes, [first, 0, ..] if *first != 0) {
        return decode_utf16le(bytes, false);
    }
    decode_utf8(bytes, false)
}

/// Encode `text` in `encoding`, restoring the byte-order mark if it had one.
#[must_use]
pub fn encode(text: &str, encoding: TextEncoding) -> Vec<u8> {
    match encoding {
        TextEncoding::Utf8 { bom } => {
            let mut out = Vec::with_capacity(text.len() + UTF8_BOM.len());
            if bom {
                out.extend_from_slice(&UTF8_BOM);
            }
            out.extend_from_slice(text.as_bytes());
            out
        }
        TextEncoding::Utf16Le { bom } => {
            let mut out = Vec::with_capacity(text.len() * 2 + UTF16LE_BOM.len());
            if bom {
                out.extend_from_slice(&UTF16LE_BOM);
            }
            for unit in text.encode_utf16() {
                out.extend_from_slice(&unit.to_le_bytes());
            }
            out
        }
    }
}

fn decode_utf8(bytes: &[u8], bom: bool) -> Result<DecodedText, EncodingError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| EncodingError::InvalidUtf8(e.to_string()))?
        .to_owned();
    Ok(DecodedText {
        encoding: TextEncoding::Utf8 { bom },
        text,
    })
}

fn decode_utf16le(bytes: &[u8], bom: bool) -> Result<DecodedText, EncodingError> {
    if bytes.len() % 2 != 0 {
        return Err(EncodingError::OddLength);
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    let text = String::from_utf16(&units).map_err(|_| EncodingError::InvalidUtf16)?;
    Ok(DecodedText {
        encoding: TextEncoding::Utf16Le { bom },
        text,
    })
}

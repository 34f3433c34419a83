//! MicroVu program file reader.

use crate::error::{ConvertError, Result};
use crate::model::TextEncoding;
use std::path::Path;

/// Decode raw program bytes, detecting the encoding.
///
/// A byte-order mark wins. Without one, a zero second byte after a non-zero
/// first byte marks UTF-16LE (the InSpec default); anything else must be UTF-8.
pub fn decode_text(bytes: &[u8]) -> std::result::Result<(String, TextEncoding), String> {
    match bytes {
        [0xFF, 0xFE, rest @ ..] => Ok((utf16(rest, u16::from_le_bytes)?, TextEncoding::Utf16Le { bom: true })),
        [0xFE, 0xFF, rest @ ..] => Ok((utf16(rest, u16::from_be_bytes)?, TextEncoding::Utf16Be)),
        [0xEF, 0xBB, 0xBF, rest @ ..] => {
            let text = String::from_utf8(rest.to_vec()).map_err(|e| e.to_string())?;
            Ok((text, TextEncoding::Utf8 { bom: true }))
        }
        [first, 0, ..] if *first != 0 && bytes.len() % 2 == 0 => {
            Ok((utf16(bytes, u16::from_le_bytes)?, TextEncoding::Utf16Le { bom: false }))
        }
        _ => {
            let text = String::from_utf8(bytes.to_vec()).map_err(|e| e.to_string())?;
            Ok((text, TextEncoding::Utf8 { bom: false }))
        }
    }
}

fn utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> std::result::Result<String, String> {
    if bytes.len() % 2 != 0 {
        return Err(format!("odd byte count {} for UTF-16 text", bytes.len()));
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).map_err(|e| e.to_string())
}

/// Read a program file into lines (terminators stripped) and its encoding.
pub fn read_program_lines(path: &Path) -> Result<(Vec<String>, TextEncoding)> {
    if !path.exists() {
        return Err(ConvertError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let bytes = std::fs::read(path)?;
    let (content, encoding) = decode_text(&bytes).map_err(|message| ConvertError::InvalidEncoding {
        path: path.to_path_buf(),
        message,
    })?;

    if content.trim().is_empty() {
        return Err(ConvertError::EmptyFile {
            path: path.to_path_buf(),
        });
    }

    Ok((content.lines().map(|s| s.to_string()).collect(), encoding))
}

/// Read any supported text file into lines.
pub fn read_text_lines(path: &Path) -> Result<Vec<String>> {
    read_program_lines(path).map(|(lines, _)| lines)
}

//! UTF-16LE program writer.

use crate::error::{ConvertError, Result};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::Path;

/// Encode lines as UTF-16LE with a CRLF after every line.
pub fn encode_program<S: AsRef<str>>(lines: &[S], bom: bool) -> Vec<u8> {
    let capacity: usize = lines.iter().map(|l| l.as_ref().len() + 2).sum();
    let mut bytes = Vec::with_capacity(capacity * 2 + 2);
    if bom {
        bytes.extend_from_slice(&[0xFF, 0xFE]);
    }
    for line in lines {
        for unit in line.as_ref().encode_utf16().chain("\r\n".encode_utf16()) {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
    }
    bytes
}

/// Write a program to a new file. An existing file is never overwritten.
pub fn write_program<S: AsRef<str>>(path: &Path, lines: &[S], bom: bool) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => ConvertError::OutputExists {
                path: path.to_path_buf(),
            },
            _ => ConvertError::Io(e),
        })?;
    file.write_all(&encode_program(lines, bom))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::read_program_lines;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_encode_program() {
        let bytes = encode_program(&["Ab"], false);
        assert_eq!(bytes, vec![b'A', 0, b'b', 0, b'\r', 0, b'\n', 0]);
        assert_eq!(&encode_program(&["A"], true)[..2], &[0xFF, 0xFE]);
        assert!(encode_program::<&str>(&[], false).is_empty());
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.iwp");
        let lines = vec!["Header".to_string(), "Txt (Name \"Ünïcode\")".to_string()];
        write_program(&path, &lines, true).unwrap();

        let (read, encoding) = read_program_lines(&path).unwrap();
        assert_eq!(read, lines);
        assert!(encoding.has_bom());
    }

    #[test]
    fn test_write_refuses_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.iwp");
        std::fs::write(&path, b"keep").unwrap();

        let err = write_program(&path, &["new"], false).unwrap_err();
        assert!(matches!(err, ConvertError::OutputExists { .. }));
        assert_eq!(std::fs::read(&path).unwrap(), b"keep");
    }
}

//! CSV export of the scan history.
//!
//! The file has a single `Barcode` column. Every value is wrapped in double
//! quotes with embedded quotes doubled, and rows are separated by `\n` with
//! no trailing newline after the last row.
//!
//! ```text
//! Barcode
//! "SN001"
//! "say ""hi"""
//! ```

use snaplocate_core::constants::CSV_HEADER;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Write `entries` as CSV to `writer`.
///
/// # Errors
///
/// Returns any error raised by `writer`.
///
/// # Examples
///
/// ```
/// use snaplocate_pipeline::export::write_csv;
///
/// let mut out = Vec::new();
/// write_csv(&mut out, &["SN001".to_string(), "SN002".to_string()]).unwrap();
/// assert_eq!(String::from_utf8(out).unwrap(), "Barcode\n\"SN001\"\n\"SN002\"");
/// ```
pub fn write_csv<W: Write>(writer: &mut W, entries: &[String]) -> io::Result<()> {
    writeln!(writer, "{CSV_HEADER}")?;

    for (index, entry) in entries.iter().enumerate() {
        if index > 0 {
            writer.write_all(b"\n")?;
        }
        write!(writer, "\"{}\"", entry.replace('"', "\"\""))?;
    }

    writer.flush()
}

/// Render `entries` as a CSV string.
pub fn to_csv_string(entries: &[String]) -> String {
    let mut out = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_csv(&mut out, entries);
    String::from_utf8_lossy(&out).into_owned()
}

/// Write `entries` to `path`, replacing any existing file.
///
/// The CSV is written to a sibling temporary file first and then renamed
/// into place, so readers never see a half-written export.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be written or renamed.
pub fn export_csv(path: impl AsRef<Path>, entries: &[String]) -> io::Result<PathBuf> {
    let path = path.as_ref();
    let staging = staging_path(path);

    let result = (|| -> io::Result<()> {
        let mut file = io::BufWriter::new(std::fs::File::create(&staging)?);
        write_csv(&mut file, entries)?;
        file.into_inner().map_err(io::IntoInnerError::into_error)?.sync_all()?;
        std::fs::rename(&staging, path)
    })();

    if result.is_err() {
        let _ = std::fs::remove_file(&staging);
    }
    result?;

    info!(path = %path.display(), rows = entries.len(), "CSV exported");
    Ok(path.to_path_buf())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use snaplocate_core::constants::DEFAULT_EXPORT_FILE_NAME;

    fn entries(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_csv_format() {
        let csv = to_csv_string(&entries(&["SN001", "sn002"]));
        assert_eq!(csv, "Barcode\n\"SN001\"\n\"sn002\"");
    }

    #[test]
    fn test_csv_header_only_when_empty() {
        assert_eq!(to_csv_string(&[]), "Barcode\n");
    }

    #[test]
    fn test_csv_escapes_quotes() {
        let csv = to_csv_string(&entries(&["say \"hi\""]));
        assert_eq!(csv, "Barcode\n\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_csv_keeps_commas_and_whitespace() {
        let csv = to_csv_string(&entries(&[" a,b "]));
        assert_eq!(csv, "Barcode\n\" a,b \"");
    }

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_EXPORT_FILE_NAME);

        let written = export_csv(&path, &entries(&["SN001"])).unwrap();

        assert_eq!(written, path);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Barcode\n\"SN001\""
        );
        assert!(!staging_path(&path).exists());
    }

    #[test]
    fn test_export_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "old contents").unwrap();

        export_csv(&path, &entries(&["new"])).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Barcode\n\"new\"");
    }

    #[test]
    fn test_export_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        assert!(export_csv(&path, &[]).is_err());
    }
}

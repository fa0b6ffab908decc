use crate::compare::Mode;
use crate::error::{FollowDiffError, Result};
use chrono::NaiveDate;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

pub const CSV_HEADER: &str = "Username";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// One identifier per line.
    Plain,
    /// `Username` header, then one identifier per line.
    Csv,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => ExportFormat::Csv,
            _ => ExportFormat::Plain,
        }
    }
}

/// Write `results` to `path`, picking the format from the extension.
pub fn export<P: AsRef<Path>, S: AsRef<str>>(results: &[S], path: P) -> Result<ExportFormat> {
    let path = path.as_ref();
    let format = ExportFormat::from_path(path);
    write_results(results, path, format)?;

    info!(action = "exported", component = "exporter", file_path = ?path, format = ?format, entry_count = results.len(), "Exported results");
    Ok(format)
}

pub fn write_results<S: AsRef<str>>(results: &[S], path: &Path, format: ExportFormat) -> Result<()> {
    let file = fs::File::create(path).map_err(|e| FollowDiffError::io(path, e))?;
    let mut writer = BufWriter::new(file);

    let mut write = || -> std::io::Result<()> {
        if format == ExportFormat::Csv {
            writeln!(writer, "{}", CSV_HEADER)?;
        }
        for identifier in results {
            writeln!(writer, "{}", identifier.as_ref())?;
        }
        writer.flush()
    };

    write().map_err(|e| FollowDiffError::io(path, e))
}

/// `<mode>_<YYYY-MM-DD>.txt`
pub fn auto_save_file_name(mode: Mode, date: NaiveDate) -> String {
    format!("{}_{}.txt", mode.file_stem(), date.format("%Y-%m-%d"))
}

/// Write the full result list to the dated auto-save file in `directory`,
/// replacing any earlier file for the same mode and day.
pub fn auto_save<S: AsRef<str>>(
    results: &[S],
    mode: Mode,
    directory: &Path,
    date: NaiveDate,
) -> Result<PathBuf> {
    let path = directory.join(auto_save_file_name(mode, date));
    write_results(results, &path, ExportFormat::Plain)?;

    info!(action = "auto_saved", component = "exporter", file_path = ?path, entry_count = results.len(), "Auto-saved results");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn results() -> Vec<String> {
        vec!["alice".to_string(), "bob".to_string(), "carol".to_string()]
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ExportFormat::from_path(Path::new("out.csv")), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_path(Path::new("OUT.CSV")), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_path(Path::new("out.txt")), ExportFormat::Plain);
        assert_eq!(ExportFormat::from_path(Path::new("out")), ExportFormat::Plain);
    }

    #[test]
    fn test_plain_export_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("unfollowers.txt");

        assert_eq!(export(&results(), &path).unwrap(), ExportFormat::Plain);

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "alice\nbob\ncarol\n");
        let reread: Vec<String> = content.lines().map(str::to_string).collect();
        assert_eq!(reread, results());
    }

    #[test]
    fn test_csv_export() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fans.csv");

        assert_eq!(export(&results(), &path).unwrap(), ExportFormat::Csv);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Username\nalice\nbob\ncarol\n"
        );
    }

    #[test]
    fn test_export_to_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("no").join("such").join("dir.txt");
        assert!(matches!(
            export(&results(), &path),
            Err(FollowDiffError::Io { .. })
        ));
    }

    #[test]
    fn test_auto_save_name_and_overwrite() {
        let dir = TempDir::new().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(auto_save_file_name(Mode::Unfollowers, date), "unfollowers_2024-03-07.txt");
        assert_eq!(auto_save_file_name(Mode::Fans, date), "fans_2024-03-07.txt");

        let path = auto_save(&results(), Mode::Fans, dir.path(), date).unwrap();
        assert_eq!(path, dir.path().join("fans_2024-03-07.txt"));

        let path = auto_save(&["zed"], Mode::Fans, dir.path(), date).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "zed\n");
    }
}

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, SiftError};
use crate::pipeline::{BatchOutcome, MatchedRecord, UnmatchedRecord};

pub const MATCHED_JSONL: &str = "nature_articles.jsonl";
pub const MATCHED_CSV: &str = "nature_articles.csv";
pub const UNMATCHED_CSV: &str = "nature_unmatched.csv";

/// Paths of the report files a run actually produced. A `None` means the
/// corresponding file had no rows to hold and was not created.
#[derive(Debug, Clone, Default)]
pub struct WrittenReports {
    pub jsonl_path: Option<PathBuf>,
    pub csv_path: Option<PathBuf>,
    pub unmatched_path: Option<PathBuf>,
    pub matched_count: usize,
    pub unmatched_count: usize,
}

/// Writes the corpus files and the diagnostics file into one output
/// directory, under fixed names so downstream tooling can find them.
pub struct ReportWriter {
    output_directory: PathBuf,
}

impl ReportWriter {
    pub fn new<P: Into<PathBuf>>(output_directory: P) -> Self {
        Self {
            output_directory: output_directory.into(),
        }
    }

    /// Create the output directory and verify it is writable before any
    /// documents are processed, so a doomed run fails up front.
    pub fn initialize(&self) -> Result<()> {
        fs::create_dir_all(&self.output_directory).map_err(|e| SiftError::OutputWrite {
            path: self.output_directory.display().to_string(),
            source: e,
        })?;

        let probe = self.output_directory.join(".papersift_write_test");
        match fs::File::create(&probe) {
            Ok(_) => {
                let _ = fs::remove_file(&probe);
                Ok(())
            }
            Err(e) => Err(SiftError::OutputWrite {
                path: self.output_directory.display().to_string(),
                source: e,
            }),
        }
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    /// Write every report the batch calls for. `format` selects which
    /// corpus serializations to produce; the diagnostics file is written
    /// whenever there are unmatched documents, regardless of format.
    pub fn write(&self, batch: &BatchOutcome, format: &str) -> Result<WrittenReports> {
        let want_jsonl = format == "jsonl" || format == "both";
        let want_csv = format == "csv" || format == "both";

        let mut written = WrittenReports {
            matched_count: batch.matched.len(),
            unmatched_count: batch.unmatched.len(),
            ..WrittenReports::default()
        };

        if !batch.matched.is_empty() {
            if want_jsonl {
                written.jsonl_path = Some(self.write_matched_jsonl(&batch.matched)?);
            }
            if want_csv {
                written.csv_path = Some(self.write_matched_csv(&batch.matched)?);
            }
        }

        if !batch.unmatched.is_empty() {
            written.unmatched_path = Some(self.write_unmatched_csv(&batch.unmatched)?);
        }

        Ok(written)
    }

    fn write_matched_jsonl(&self, records: &[MatchedRecord]) -> Result<PathBuf> {
        let path = self.output_directory.join(MATCHED_JSONL);
        let file = self.create_file(&path)?;
        let mut writer = BufWriter::new(file);

        for record in records {
            let line = serde_json::to_string(record).map_err(|e| SiftError::Config {
                message: format!("Failed to serialize record to JSON: {}", e),
            })?;
            writeln!(writer, "{}", line).map_err(|e| self.write_error(&path, e))?;
        }
        writer.flush().map_err(|e| self.write_error(&path, e))?;

        Ok(path)
    }

    fn write_matched_csv(&self, records: &[MatchedRecord]) -> Result<PathBuf> {
        let path = self.output_directory.join(MATCHED_CSV);
        let file = self.create_file(&path)?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "file,title,abstract").map_err(|e| self.write_error(&path, e))?;
        for record in records {
            writeln!(
                writer,
                "{},{},{}",
                csv_escape(&record.file),
                csv_escape(&record.title),
                csv_escape(&record.abstract_text)
            )
            .map_err(|e| self.write_error(&path, e))?;
        }
        writer.flush().map_err(|e| self.write_error(&path, e))?;

        Ok(path)
    }

    fn write_unmatched_csv(&self, records: &[UnmatchedRecord]) -> Result<PathBuf> {
        let path = self.output_directory.join(UNMATCHED_CSV);
        let file = self.create_file(&path)?;
        let mut writer = BufWriter::new(file);

        writeln!(
            writer,
            "file,primary_found,secondary_found,title_sample,abstract_sample"
        )
        .map_err(|e| self.write_error(&path, e))?;
        for record in records {
            writeln!(
                writer,
                "{},{},{},{},{}",
                csv_escape(&record.file),
                record.primary_found,
                record.secondary_found,
                csv_escape(&record.title_sample),
                csv_escape(&record.abstract_sample)
            )
            .map_err(|e| self.write_error(&path, e))?;
        }
        writer.flush().map_err(|e| self.write_error(&path, e))?;

        Ok(path)
    }

    fn create_file(&self, path: &Path) -> Result<fs::File> {
        fs::File::create(path).map_err(|e| self.write_error(path, e))
    }

    fn write_error(&self, path: &Path, source: std::io::Error) -> SiftError {
        SiftError::OutputWrite {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Minimal CSV quoting: a field is wrapped only when it needs to be, with
/// embedded quotes doubled.
fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_batch() -> BatchOutcome {
        let mut batch = BatchOutcome::default();
        batch.matched.push(MatchedRecord {
            file: "a.html".to_string(),
            title: "Memristor arrays, 2D materials".to_string(),
            abstract_text: "We say \"switching\" a lot.".to_string(),
        });
        batch.unmatched.push(UnmatchedRecord {
            file: "b.html".to_string(),
            primary_found: true,
            secondary_found: false,
            title_sample: "Graphene transport".to_string(),
            abstract_sample: "Carrier mobility study.".to_string(),
        });
        batch
    }

    #[test]
    fn test_initialize_creates_nested_directory() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("reports").join("run1");
        let writer = ReportWriter::new(&target);

        writer.initialize().unwrap();
        assert!(target.is_dir());
        assert!(!target.join(".papersift_write_test").exists());
    }

    #[test]
    fn test_write_both_formats() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(temp_dir.path());
        writer.initialize().unwrap();

        let written = writer.write(&sample_batch(), "both").unwrap();

        assert!(written.jsonl_path.as_ref().unwrap().exists());
        assert!(written.csv_path.as_ref().unwrap().exists());
        assert!(written.unmatched_path.as_ref().unwrap().exists());
        assert_eq!(written.matched_count, 1);
        assert_eq!(written.unmatched_count, 1);
    }

    #[test]
    fn test_jsonl_uses_abstract_key() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(temp_dir.path());
        writer.initialize().unwrap();

        writer.write(&sample_batch(), "jsonl").unwrap();

        let content = fs::read_to_string(temp_dir.path().join(MATCHED_JSONL)).unwrap();
        let line: serde_json::Value = serde_json::from_str(content.lines().next().unwrap()).unwrap();
        assert_eq!(line["file"], "a.html");
        assert!(line.get("abstract").is_some());
        assert!(line.get("abstract_text").is_none());
    }

    #[test]
    fn test_csv_escaping() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(temp_dir.path());
        writer.initialize().unwrap();

        writer.write(&sample_batch(), "csv").unwrap();

        let content = fs::read_to_string(temp_dir.path().join(MATCHED_CSV)).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next().unwrap(), "file,title,abstract");
        assert_eq!(
            lines.next().unwrap(),
            "a.html,\"Memristor arrays, 2D materials\",\"We say \"\"switching\"\" a lot.\""
        );
    }

    #[test]
    fn test_unmatched_columns() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(temp_dir.path());
        writer.initialize().unwrap();

        writer.write(&sample_batch(), "both").unwrap();

        let content = fs::read_to_string(temp_dir.path().join(UNMATCHED_CSV)).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "file,primary_found,secondary_found,title_sample,abstract_sample"
        );
        assert_eq!(
            lines.next().unwrap(),
            "b.html,true,false,Graphene transport,Carrier mobility study."
        );
    }

    #[test]
    fn test_format_selects_serializations() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(temp_dir.path());
        writer.initialize().unwrap();

        let written = writer.write(&sample_batch(), "jsonl").unwrap();
        assert!(written.jsonl_path.is_some());
        assert!(written.csv_path.is_none());
        assert!(!temp_dir.path().join(MATCHED_CSV).exists());
    }

    #[test]
    fn test_empty_batch_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(temp_dir.path());
        writer.initialize().unwrap();

        let written = writer.write(&BatchOutcome::default(), "both").unwrap();

        assert!(written.jsonl_path.is_none());
        assert!(written.csv_path.is_none());
        assert!(written.unmatched_path.is_none());
        assert!(!temp_dir.path().join(MATCHED_JSONL).exists());
    }

    #[test]
    fn test_csv_escape() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_escape("line\nbreak"), "\"line\nbreak\"");
    }
}

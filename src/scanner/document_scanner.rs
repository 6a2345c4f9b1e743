use crate::config::DiscoveryConfig;
use crate::error::{Result, SiftError};
use crate::scanner::file_filter::FileFilter;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct DocumentFile {
    pub path: PathBuf,
    pub file_name: String,
    pub size: u64,
}

impl DocumentFile {
    pub fn new(path: PathBuf, size: u64) -> Self {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string();

        Self {
            path,
            file_name,
            size,
        }
    }

    pub fn format_size(&self) -> String {
        format_bytes(self.size)
    }
}

/// Finds candidate article pages under the input directory.
///
/// Scraped corpora come in two layouts: all pages dumped flat into one
/// directory, or one subdirectory per page (the browser "save page" layout).
/// A flat listing is tried first; the recursive walk only runs when the flat
/// listing finds nothing.
pub struct DocumentScanner {
    filter: FileFilter,
    extensions: Vec<String>,
}

impl DocumentScanner {
    pub fn new(config: &DiscoveryConfig) -> Self {
        Self {
            filter: FileFilter::new(config),
            extensions: config.extensions.clone(),
        }
    }

    pub fn discover<P: AsRef<Path>>(&self, root: P) -> Result<Vec<DocumentFile>> {
        let root_path = root.as_ref();

        if !root_path.is_dir() {
            return Err(SiftError::InputDirNotFound {
                path: root_path.display().to_string(),
            });
        }

        let mut documents = self.scan_flat(root_path)?;

        if documents.is_empty() {
            documents = self.scan_recursive(root_path);
        }

        if documents.is_empty() {
            return Err(SiftError::NoDocumentsFound {
                path: root_path.display().to_string(),
                extensions: self.extensions.clone(),
            });
        }

        // Deterministic order regardless of directory iteration order.
        documents.sort_by(|a, b| a.path.cmp(&b.path));
        documents.dedup_by(|a, b| a.path == b.path);

        Ok(documents)
    }

    fn scan_flat(&self, root_path: &Path) -> Result<Vec<DocumentFile>> {
        let mut documents = Vec::new();

        for entry in std::fs::read_dir(root_path)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(_) => continue,
            };

            let path = entry.path();
            if !path.is_file() || !self.filter.accepts(&path) {
                continue;
            }

            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            documents.push(DocumentFile::new(path, size));
        }

        Ok(documents)
    }

    fn scan_recursive(&self, root_path: &Path) -> Vec<DocumentFile> {
        let mut documents = Vec::new();

        let walker = WalkDir::new(root_path)
            .follow_links(false)
            .into_iter();

        for entry in walker {
            // Unreadable entries are dropped, never fatal; whatever else is
            // readable still gets processed.
            let entry = match entry {
                Ok(entry) => entry,
                Err(_) => continue,
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if !self.filter.accepts(path) {
                continue;
            }

            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            documents.push(DocumentFile::new(path.to_path_buf(), size));
        }

        documents
    }

    pub fn get_statistics(&self, documents: &[DocumentFile]) -> ScanStatistics {
        let total_files = documents.len();
        let total_bytes = documents.iter().map(|d| d.size).sum();

        let (largest_file_size, largest_file_name) = documents
            .iter()
            .max_by_key(|d| d.size)
            .map(|d| (d.size, d.file_name.clone()))
            .unwrap_or((0, String::new()));

        ScanStatistics {
            total_files,
            total_bytes,
            largest_file_size,
            largest_file_name,
        }
    }
}

#[derive(Debug, Default)]
pub struct ScanStatistics {
    pub total_files: usize,
    pub total_bytes: u64,
    pub largest_file_size: u64,
    pub largest_file_name: String,
}

impl ScanStatistics {
    pub fn display_summary(&self) -> String {
        let mut summary = format!(
            "Scan Results:\n  Total files: {}\n  Total size: {}\n",
            self.total_files,
            format_bytes(self.total_bytes)
        );

        if self.largest_file_size > 0 {
            summary.push_str(&format!(
                "  Largest file: {} ({})\n",
                self.largest_file_name,
                format_bytes(self.largest_file_size)
            ));
        }

        summary
    }
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn scanner() -> DocumentScanner {
        DocumentScanner::new(&DiscoveryConfig::default())
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let err = scanner().discover("no_such_directory").unwrap_err();
        assert!(matches!(err, SiftError::InputDirNotFound { .. }));
    }

    #[test]
    fn test_file_path_is_not_a_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("page.html");
        fs::write(&file, "<html></html>").unwrap();

        let err = scanner().discover(&file).unwrap_err();
        assert!(matches!(err, SiftError::InputDirNotFound { .. }));
    }

    #[test]
    fn test_empty_directory_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let err = scanner().discover(temp_dir.path()).unwrap_err();

        match err {
            SiftError::NoDocumentsFound { extensions, .. } => {
                assert_eq!(extensions, vec!["html", "htm"]);
            }
            other => panic!("expected NoDocumentsFound, got {:?}", other),
        }
    }

    #[test]
    fn test_flat_discovery_sorted_by_path() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("b.html"), "x").unwrap();
        fs::write(root.join("a.htm"), "x").unwrap();
        fs::write(root.join("c.HTML"), "x").unwrap();
        fs::write(root.join("notes.txt"), "x").unwrap();

        let documents = scanner().discover(root).unwrap();
        let names: Vec<_> = documents.iter().map(|d| d.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.htm", "b.html", "c.HTML"]);
    }

    #[test]
    fn test_saved_resource_files_never_discovered() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("article.html"), "x").unwrap();
        fs::write(root.join("saved_resource_1.html"), "x").unwrap();
        fs::write(root.join("Saved_Resource.htm"), "x").unwrap();

        let documents = scanner().discover(root).unwrap();
        let names: Vec<_> = documents.iter().map(|d| d.file_name.as_str()).collect();
        assert_eq!(names, vec!["article.html"]);
    }

    #[test]
    fn test_recursive_fallback_when_top_level_empty() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let nested = root.join("pages").join("2024");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("deep.html"), "x").unwrap();
        fs::write(root.join("index.txt"), "x").unwrap();

        let documents = scanner().discover(root).unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].file_name, "deep.html");
    }

    #[test]
    fn test_top_level_hits_suppress_recursion() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("top.html"), "x").unwrap();

        let nested = root.join("pages");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("nested.html"), "x").unwrap();

        let documents = scanner().discover(root).unwrap();
        let names: Vec<_> = documents.iter().map(|d| d.file_name.as_str()).collect();
        assert_eq!(names, vec!["top.html"]);
    }

    #[test]
    fn test_document_file_basename() {
        let doc = DocumentFile::new(PathBuf::from("pages/sub/article.html"), 10);
        assert_eq!(doc.file_name, "article.html");
        assert_eq!(doc.size, 10);
    }

    #[test]
    fn test_scan_statistics() {
        let documents = vec![
            DocumentFile::new(PathBuf::from("a.html"), 100),
            DocumentFile::new(PathBuf::from("b.html"), 200),
        ];

        let stats = scanner().get_statistics(&documents);
        assert_eq!(stats.total_files, 2);
        assert_eq!(stats.total_bytes, 300);
        assert_eq!(stats.largest_file_size, 200);
        assert_eq!(stats.largest_file_name, "b.html");

        let summary = stats.display_summary();
        assert!(summary.contains("Total files: 2"));
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1048576), "1.0 MB");
    }
}

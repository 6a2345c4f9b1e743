use crate::config::DiscoveryConfig;
use std::path::Path;

/// Decides which directory entries count as candidate article pages.
pub struct FileFilter {
    extensions: Vec<String>,
    exclude_prefixes: Vec<String>,
}

impl FileFilter {
    pub fn new(config: &DiscoveryConfig) -> Self {
        Self {
            extensions: config
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
            exclude_prefixes: config
                .exclude_prefixes
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
        }
    }

    /// Extension check, case-insensitive. `page.HTML` and `page.htm` both pass.
    pub fn has_candidate_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|ext| self.extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }

    /// Excluded basenames are browser save-page artifacts such as
    /// `saved_resource.html` that sit next to the real article file.
    pub fn is_excluded_name(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|s| s.to_str())
            .map(|name| {
                let name_lower = name.to_lowercase();
                self.exclude_prefixes
                    .iter()
                    .any(|prefix| name_lower.starts_with(prefix))
            })
            .unwrap_or(false)
    }

    pub fn accepts(&self, path: &Path) -> bool {
        self.has_candidate_extension(path) && !self.is_excluded_name(path)
    }

    pub fn get_extensions(&self) -> &Vec<String> {
        &self.extensions
    }
}

impl Default for FileFilter {
    fn default() -> Self {
        let config = DiscoveryConfig::default();
        Self::new(&config)
    }
}

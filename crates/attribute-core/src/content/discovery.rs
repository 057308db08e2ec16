//! Finding content files in directories.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ProcessingConfig;

/// Discovers content files by extension.
pub struct ContentDiscovery {
    extensions: Vec<String>,
}

impl ContentDiscovery {
    /// Create a discovery instance for the configured content extensions.
    pub fn new(config: &ProcessingConfig) -> Self {
        Self {
            extensions: config
                .content_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// Discover all content files at a path.
    ///
    /// A file path is returned as-is if its extension is supported.
    /// A directory is searched recursively; results are sorted by path.
    pub fn discover(&self, path: &Path) -> Vec<PathBuf> {
        if path.is_file() {
            return if self.is_supported(path) {
                vec![path.to_path_buf()]
            } else {
                vec![]
            };
        }

        let mut files: Vec<PathBuf> = WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|entry| entry.file_type().is_file() && self.is_supported(entry.path()))
            .map(|entry| entry.into_path())
            .collect();

        // Sort by path for deterministic ordering
        files.sort();
        files
    }

    /// The normalized extensions this instance accepts.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Check if a file has a supported extension.
    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext_lower = ext.to_lowercase();
                self.extensions.iter().any(|e| *e == ext_lower)
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_supported() {
        let discovery = ContentDiscovery::new(&ProcessingConfig::default());

        assert!(discovery.is_supported(Path::new("home.json")));
        assert!(discovery.is_supported(Path::new("HOME.JSON")));
        assert!(discovery.is_supported(Path::new("gallery.toml")));
        assert!(discovery.is_supported(Path::new("home.yml")));
        assert!(discovery.is_supported(Path::new("home.yaml")));
        assert!(!discovery.is_supported(Path::new("hero.png")));
        assert!(!discovery.is_supported(Path::new("README")));
    }

    #[test]
    fn test_discover_directory_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("pages/nested")).unwrap();
        std::fs::write(dir.path().join("pages/b.json"), "{}").unwrap();
        std::fs::write(dir.path().join("pages/a.toml"), "").unwrap();
        std::fs::write(dir.path().join("pages/nested/c.json"), "{}").unwrap();
        std::fs::write(dir.path().join("pages/notes.md"), "# hi").unwrap();

        let discovery = ContentDiscovery::new(&ProcessingConfig::default());
        let files = discovery.discover(dir.path());
        let names: Vec<String> = files
            .iter()
            .map(|p| {
                p.strip_prefix(dir.path())
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();

        assert_eq!(names, vec!["pages/a.toml", "pages/b.json", "pages/nested/c.json"]);
    }

    #[test]
    fn test_discover_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("home.json");
        std::fs::write(&file, "{}").unwrap();
        let discovery = ContentDiscovery::new(&ProcessingConfig::default());

        assert_eq!(discovery.discover(&file), vec![file.clone()]);
        let other = dir.path().join("hero.png");
        std::fs::write(&other, b"x").unwrap();
        assert!(discovery.discover(&other).is_empty());
    }

    #[test]
    fn test_custom_extensions_with_dots() {
        let config = ProcessingConfig {
            content_extensions: vec![".JSON".to_string()],
            ..ProcessingConfig::default()
        };
        let discovery = ContentDiscovery::new(&config);
        assert!(discovery.is_supported(Path::new("a.json")));
        assert!(!discovery.is_supported(Path::new("a.toml")));
        assert_eq!(discovery.extensions(), ["json".to_string()]);
    }
}

//! Command implementations.

pub mod config;
pub mod inspect;
pub mod process;

use attribute_core::Config;
use std::path::{Path, PathBuf};

/// Resolve the static asset root: `--root` if given, else the configured one.
pub(crate) fn resolve_static_root(root: Option<&Path>, config: &Config) -> anyhow::Result<PathBuf> {
    let root = match root {
        Some(path) => {
            let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
            PathBuf::from(expanded)
        }
        None => config.static_root(),
    };

    if !root.is_dir() {
        anyhow::bail!(
            "Static root is not a directory: {}\n\n  Hint: Pass --root or set general.static_root in the config.",
            root.display()
        );
    }
    Ok(root)
}

/// Apply the thumbhash flags shared by `process` and `inspect`.
pub(crate) fn apply_thumbhash_overrides(
    config: &mut Config,
    dimensions_only: bool,
    max_size: Option<u32>,
) {
    if dimensions_only {
        config.thumbhash.enabled = false;
    }
    if let Some(max_size) = max_size {
        config.thumbhash.max_size = max_size;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_explicit_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = resolve_static_root(Some(dir.path()), &Config::default()).unwrap();
        assert_eq!(root, dir.path());
    }

    #[test]
    fn test_resolve_missing_root_fails() {
        let err = resolve_static_root(Some(Path::new("/nonexistent/public")), &Config::default())
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/public"));
    }

    #[test]
    fn test_thumbhash_overrides() {
        let mut config = Config::default();
        apply_thumbhash_overrides(&mut config, true, Some(32));
        assert!(!config.thumbhash.enabled);
        assert_eq!(config.thumbhash.max_size, 32);

        let mut config = Config::default();
        apply_thumbhash_overrides(&mut config, false, None);
        assert!(config.thumbhash.enabled);
        assert_eq!(config.thumbhash.max_size, 100);
    }
}

//! Configuration file discovery and loading.
//!
//! Configuration is a JSON document. The schema belongs to the caller: this
//! module only locates the file and deserializes it into any `serde` type,
//! so the engine options stay the single definition of what is configurable.

use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

/// File name looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = ".impfmt.json";

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Returns the default config file in `dir` if it exists.
pub fn discover(dir: &Path) -> Option<PathBuf> {
    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    candidate.is_file().then_some(candidate)
}

/// Reads and deserializes the JSON file at `path`.
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value = serde_json::from_str(&text).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "loaded config");
    Ok(value)
}

/// Loads `explicit` if given, otherwise the discovered default in `dir`.
///
/// Returns `Ok(None)` when no file applies. An explicit path that does not
/// exist is an error; a missing default file is not.
pub fn load_or_discover<T: DeserializeOwned>(
    explicit: Option<&Path>,
    dir: &Path,
) -> Result<Option<T>, ConfigError> {
    match explicit {
        Some(path) => load(path).map(Some),
        None => match discover(dir) {
            Some(path) => load(&path).map(Some),
            None => Ok(None),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct Sample {
        page_width: Option<usize>,
        invert: bool,
    }

    #[test]
    fn discover_finds_default_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(discover(dir.path()), None);
        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "{}").unwrap();
        assert_eq!(
            discover(dir.path()),
            Some(dir.path().join(DEFAULT_CONFIG_FILE))
        );
    }

    #[test]
    fn load_reads_partial_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        std::fs::write(&path, r#"{"page_width": 80}"#).unwrap();
        let sample: Sample = load(&path).unwrap();
        assert_eq!(
            sample,
            Sample {
                page_width: Some(80),
                invert: false
            }
        );
    }

    #[test]
    fn load_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        std::fs::write(&path, "{ nope").unwrap();
        let err = load::<Sample>(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Json { .. }));
    }

    #[test]
    fn load_or_discover_missing() {
        let dir = tempfile::tempdir().unwrap();
        let none: Option<Sample> = load_or_discover(None, dir.path()).unwrap();
        assert_eq!(none, None);
        let missing = dir.path().join("absent.json");
        let err = load_or_discover::<Sample>(Some(&missing), dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}

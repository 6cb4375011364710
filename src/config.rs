//! Configuration file loading.
//!
//! Reads `config.toml` from the user's config directory (or an explicit
//! `--config` path):
//!
//! ```toml
//! [grid]
//! rows = 10
//! cols = 8
//! ```
//!
//! Problems never abort startup: they are returned as warnings and the
//! defaults are used instead.

use cellflow_core::GridConfig;
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const MAX_CONFIG_FILE_BYTES: u64 = 64 * 1024;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    grid: GridConfig,
}

/// Load the grid configuration.
///
/// An explicit path that does not exist is warned about; a missing default
/// file is not.
pub fn load_config(config_file: Option<&PathBuf>) -> (GridConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let Some(path) = config_file.cloned().or_else(user_config_path) else {
        return (GridConfig::default(), warnings);
    };

    if !path.exists() {
        if config_file.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
        return (GridConfig::default(), warnings);
    }

    match read_config(&path) {
        Ok(config) => (config, warnings),
        Err(err) => {
            warnings.push(err);
            (GridConfig::default(), warnings)
        }
    }
}

fn read_config(path: &Path) -> Result<GridConfig, String> {
    let meta = std::fs::metadata(path)
        .map_err(|err| format!("Failed to read metadata for {}: {}", path.display(), err))?;
    if meta.len() > MAX_CONFIG_FILE_BYTES {
        return Err(format!(
            "Refusing to read {}: file too large ({} bytes, max {})",
            path.display(),
            meta.len(),
            MAX_CONFIG_FILE_BYTES
        ));
    }
    let content = std::fs::read_to_string(path)
        .map_err(|err| format!("Failed to read {}: {}", path.display(), err))?;
    let file = toml::from_str::<ConfigFile>(&content)
        .map_err(|err| format!("Failed to parse {}: {}", path.display(), err))?;
    Ok(file.grid)
}

fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "cellflow")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_config_reads_grid_section() {
        let file = write_config("[grid]\nrows = 10\ncols = 3\n");
        let (config, warnings) = load_config(Some(&file.path().to_path_buf()));
        assert!(warnings.is_empty());
        assert_eq!(config, GridConfig::new(10, 3));
    }

    #[test]
    fn test_load_config_fills_missing_fields_with_defaults() {
        let file = write_config("[grid]\nrows = 12\n");
        let (config, _) = load_config(Some(&file.path().to_path_buf()));
        assert_eq!(config, GridConfig::new(12, 6));
    }

    #[test]
    fn test_load_config_warns_on_parse_errors() {
        let file = write_config("[grid]\nrows = \"many\"\n");
        let (config, warnings) = load_config(Some(&file.path().to_path_buf()));
        assert_eq!(config, GridConfig::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Failed to parse"));
    }

    #[test]
    fn test_load_config_warns_on_missing_explicit_file() {
        let path = PathBuf::from("/nonexistent/cellflow/config.toml");
        let (config, warnings) = load_config(Some(&path));
        assert_eq!(config, GridConfig::default());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_user_config_path_names_cellflow_config() {
        // None when the platform has no home directory.
        if let Some(path) = user_config_path() {
            assert_eq!(path.file_name().and_then(|f| f.to_str()), Some("config.toml"));
            assert!(path.components().any(|c| c.as_os_str() == "cellflow"));
            #[cfg(target_os = "linux")]
            assert!(path.ends_with("cellflow/config.toml"));
        }
    }
}

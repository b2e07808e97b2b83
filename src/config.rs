//! Runtime configuration, read from a YAML file.
//!
//! ```yaml
//! python: python3
//! scripts_dir: /opt/annoreport/scripts
//! temp_dir: /var/tmp/annoreport
//! export_area_chunk_size: 500
//! ```
//!
//! Every key is optional.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ReportError;
use crate::report::ScriptRenderer;
use crate::restriction::{ExportAreaFilter, DEFAULT_CHUNK_SIZE};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Interpreter the report scripts are run with.
    pub python: String,
    /// Directory holding `{script}.py` files.
    pub scripts_dir: PathBuf,
    /// Where staged files are created. Defaults to the system temp dir.
    pub temp_dir: Option<PathBuf>,
    /// Annotations read per chunk by the export area scan.
    pub export_area_chunk_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            python: "python3".to_string(),
            scripts_dir: PathBuf::from("scripts"),
            temp_dir: None,
            export_area_chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl Config {
    /// Reads and validates a config file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ReportError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text, path)
    }

    /// Parses YAML from a string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ReportError> {
        Self::parse(yaml, Path::new("<memory>"))
    }

    /// Reads `path` if given, otherwise returns the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ReportError> {
        match path {
            Some(path) => Self::from_yaml_file(path),
            None => Ok(Self::default()),
        }
    }

    fn parse(yaml: &str, path: &Path) -> Result<Self, ReportError> {
        // An empty document deserializes to unit, not to a map.
        let config: Config = if yaml.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(yaml).map_err(|source| ReportError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReportError> {
        if self.export_area_chunk_size == 0 {
            return Err(ReportError::InvalidConfig(
                "export_area_chunk_size must be greater than 0".to_string(),
            ));
        }
        if self.python.trim().is_empty() {
            return Err(ReportError::InvalidConfig("python must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    pub fn export_area_filter(&self) -> ExportAreaFilter {
        ExportAreaFilter::new(self.export_area_chunk_size)
    }

    pub fn script_renderer(&self) -> ScriptRenderer {
        ScriptRenderer::new(self.python.clone(), self.scripts_dir.clone())
    }
}

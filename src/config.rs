use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::{
    audio::types::AnalysisConfig,
    error::{ConfigError, Result},
    fusion::FusionConfig,
};

/// Main configuration for rhythm-timeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Spectral front-end settings
    pub analysis: AnalysisConfig,

    /// Fusion thresholds
    pub fusion: FusionConfig,

    /// Artifact locations
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.analysis.validate().map_err(|reason| ConfigError::InvalidValue {
            key: "analysis".to_string(),
            value: reason,
        })?;
        self.fusion.validate()?;
        self.output.validate()?;
        Ok(())
    }
}

/// Where the script, JSON and presentation document live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the artifacts are written into
    pub directory: PathBuf,

    pub script_file: String,
    pub json_file: String,

    /// Presentation document whose audio source gets rewritten
    pub document_file: String,

    /// Rewrite the document's audio references after emitting
    pub patch_document: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            script_file: "audio-analysis.js".to_string(),
            json_file: "audio_analysis.json".to_string(),
            document_file: "index.html".to_string(),
            patch_document: true,
        }
    }
}

impl OutputConfig {
    pub fn script_path(&self) -> PathBuf {
        self.directory.join(&self.script_file)
    }

    pub fn json_path(&self) -> PathBuf {
        self.directory.join(&self.json_file)
    }

    pub fn document_path(&self) -> PathBuf {
        self.directory.join(&self.document_file)
    }

    fn validate(&self) -> Result<()> {
        let files = [
            ("output.script_file", &self.script_file),
            ("output.json_file", &self.json_file),
            ("output.document_file", &self.document_file),
        ];

        for (key, name) in files {
            if name.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: name.clone()
                }.into());
            }
        }

        if self.script_file == self.json_file {
            return Err(ConfigError::InvalidValue {
                key: "output.json_file".to_string(),
                value: self.json_file.clone()
            }.into());
        }

        Ok(())
    }
}

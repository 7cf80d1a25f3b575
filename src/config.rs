//! Configuration loading.
//!
//! Settings live in a TOML file, by default `tooldev/config.toml` under the
//! user's config directory. Every field has a default, so an empty or absent
//! file is a valid configuration.
//!
//! ```toml
//! [python]
//! interpreter = "python3.12"
//!
//! [display]
//! module_path_width = 30
//! color = "never"
//!
//! [theme]
//! title = "bold #ce93f9"
//! comment = "#6272a4"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::interpreter::DEFAULT_INTERPRETER;
use crate::summary::DEFAULT_MODULE_PATH_WIDTH;
use crate::theme::{ColorMode, Style, StyleParseError, Theme};

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "TOOLDEV_CONFIG";

/// Environment variable overriding the python interpreter.
pub const PYTHON_ENV: &str = "TOOLDEV_PYTHON";

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("validation error: {0}")]
    Validation(String),
}

/// Top-level configuration.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub python: PythonConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub theme: ThemeConfig,
}

/// Interpreter settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PythonConfig {
    /// Interpreter name or path.
    #[serde(default = "default_interpreter")]
    pub interpreter: String,
}

impl Default for PythonConfig {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter(),
        }
    }
}

fn default_interpreter() -> String {
    DEFAULT_INTERPRETER.to_string()
}

/// Report layout settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Module paths longer than this are shortened in the functions table.
    #[serde(default = "default_module_path_width")]
    pub module_path_width: usize,

    /// Fixed table width; the terminal width is used when unset.
    #[serde(default)]
    pub max_width: Option<usize>,

    #[serde(default)]
    pub color: ColorMode,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            module_path_width: default_module_path_width(),
            max_width: None,
            color: ColorMode::default(),
        }
    }
}

fn default_module_path_width() -> usize {
    DEFAULT_MODULE_PATH_WIDTH
}

/// Style overrides; unset entries keep the built-in theme.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub title: Option<String>,
    pub description: Option<String>,
    pub option: Option<String>,
    pub comment: Option<String>,
}

impl ThemeConfig {
    /// Built-in theme with overrides applied.
    pub fn to_theme(&self) -> Result<Theme, StyleParseError> {
        let mut theme = Theme::default();
        let slots: [(&Option<String>, &mut Style); 4] = [
            (&self.title, &mut theme.title),
            (&self.description, &mut theme.description),
            (&self.option, &mut theme.option),
            (&self.comment, &mut theme.comment),
        ];
        for (spec, slot) in slots {
            if let Some(spec) = spec {
                *slot = spec.parse()?;
            }
        }
        Ok(theme)
    }
}

impl Config {
    /// Parse and validate configuration text. `path` is used in errors.
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config file");
        Self::from_toml(&text, path)
    }

    /// Load configuration from an explicit path, `$TOOLDEV_CONFIG`, or the
    /// default location. Only the default location may be absent.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::load(Path::new(&path));
        }
        match default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => {
                debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Check semantic constraints the TOML schema cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.python.interpreter.trim().is_empty() {
            return Err(ConfigError::Validation(
                "python.interpreter must not be empty".to_string(),
            ));
        }
        if self.display.module_path_width == 0 {
            return Err(ConfigError::Validation(
                "display.module_path_width must be positive".to_string(),
            ));
        }
        if self.display.max_width == Some(0) {
            return Err(ConfigError::Validation(
                "display.max_width must be positive".to_string(),
            ));
        }
        self.theme
            .to_theme()
            .map_err(|e| ConfigError::Validation(format!("theme: {e}")))?;
        Ok(())
    }

    /// Interpreter to use, honoring `$TOOLDEV_PYTHON`.
    pub fn interpreter(&self) -> String {
        std::env::var(PYTHON_ENV)
            .ok()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| self.python.interpreter.clone())
    }
}

/// `$XDG_CONFIG_HOME/tooldev/config.toml`, falling back to `~/.config`.
pub fn default_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join("tooldev").join("config.toml"))
}

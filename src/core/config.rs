//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::Project;
use crate::pricing::{DEFAULT_ASSEMBLY_COST_PER_KIT, DEFAULT_BUFFER_PERCENT};

/// KITQ configuration with layered hierarchy
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default author for new entities
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Editor command for `edit` subcommands
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,

    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_format: Option<String>,

    /// Assembly & fulfillment cost charged per kit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assembly_cost_per_kit: Option<f64>,

    /// Default buffer percent for new BOM lines
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_percent: Option<f64>,
}

/// Valid configuration keys with their descriptions
pub const VALID_KEYS: &[(&str, &str)] = &[
    ("author", "Default author for new entities"),
    ("editor", "Editor command for `edit` subcommands"),
    (
        "default_format",
        "Default output format (yaml, json, tsv, etc.)",
    ),
    (
        "assembly_cost_per_kit",
        "Assembly & fulfillment cost per kit (default 15.0)",
    ),
    ("buffer_percent", "Buffer percent for new BOM lines (default 2.0)"),
];

impl Config {
    /// Load configuration, discovering the project from the current directory
    pub fn load() -> Self {
        let project = Project::discover().ok();
        Self::load_for(project.as_ref())
    }

    /// Load configuration from all sources, merging in priority order
    pub fn load_for(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/kitq/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Project config (.kitq/config.yaml)
        if let Some(project) = project {
            if let Some(project_config) = Self::read_file(&project.kitq_dir().join("config.yaml")) {
                config.merge(project_config);
            }
        }

        // 4. Environment variables
        if let Ok(author) = std::env::var("KITQ_AUTHOR") {
            config.author = Some(author);
        }
        if let Ok(editor) = std::env::var("KITQ_EDITOR") {
            config.editor = Some(editor);
        }
        if let Ok(rate) = std::env::var("KITQ_ASSEMBLY_COST") {
            match parse_amount(&rate) {
                Some(rate) => config.assembly_cost_per_kit = Some(rate),
                None => tracing::warn!(value = %rate, "ignoring invalid KITQ_ASSEMBLY_COST"),
            }
        }

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Option<Config>>(&contents) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "skipping unreadable config file"
                );
                None
            }
        }
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "kitq")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.author.is_some() {
            self.author = other.author;
        }
        if other.editor.is_some() {
            self.editor = other.editor;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.assembly_cost_per_kit.is_some() {
            self.assembly_cost_per_kit = other.assembly_cost_per_kit;
        }
        if other.buffer_percent.is_some() {
            self.buffer_percent = other.buffer_percent;
        }
    }

    /// Look up a key's effective value for display
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "author" => self.author.clone(),
            "editor" => self.editor.clone(),
            "default_format" => self.default_format.clone(),
            "assembly_cost_per_kit" => self.assembly_cost_per_kit.map(|v| v.to_string()),
            "buffer_percent" => self.buffer_percent.map(|v| v.to_string()),
            _ => None,
        }
    }

    /// Assembly cost per kit, falling back to the pricing default
    pub fn assembly_cost_per_kit(&self) -> f64 {
        self.assembly_cost_per_kit
            .unwrap_or(DEFAULT_ASSEMBLY_COST_PER_KIT)
    }

    /// Buffer percent for new BOM lines, falling back to the pricing default
    pub fn buffer_percent(&self) -> f64 {
        self.buffer_percent.unwrap_or(DEFAULT_BUFFER_PERCENT)
    }

    /// Get the author name, falling back to git config or username
    pub fn author(&self) -> String {
        if let Some(ref author) = self.author {
            return author.clone();
        }

        if let Ok(output) = std::process::Command::new("git")
            .args(["config", "user.name"])
            .output()
        {
            if output.status.success() {
                let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !name.is_empty() {
                    return name;
                }
            }
        }

        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string())
    }

    /// Get the editor command
    pub fn editor(&self) -> String {
        self.editor
            .clone()
            .or_else(|| std::env::var("EDITOR").ok())
            .or_else(|| std::env::var("VISUAL").ok())
            .unwrap_or_else(|| "vi".to_string())
    }

    /// Run the editor on a file, handling commands with arguments
    /// (e.g., "emacsclient -nw" or "code --wait")
    pub fn run_editor(&self, file_path: &Path) -> std::io::Result<std::process::ExitStatus> {
        let editor = self.editor();
        let mut parts = editor.split_whitespace();

        match parts.next() {
            Some(cmd) => std::process::Command::new(cmd)
                .args(parts)
                .arg(file_path)
                .status(),
            None => std::process::Command::new("vi").arg(file_path).status(),
        }
    }
}

/// Errors raised when editing configuration values
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown configuration key '{0}' (run `kitq config keys` for the list)")]
    UnknownKey(String),

    #[error("invalid value '{value}' for '{key}': expected a non-negative number")]
    InvalidNumber { key: String, value: String },
}

/// Parse a finite, non-negative number
fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n >= 0.0)
}

/// Convert a raw `key=value` pair into a typed YAML value, validating the key
pub fn parse_config_value(key: &str, value: &str) -> Result<serde_yml::Value, ConfigError> {
    match key {
        "author" | "editor" | "default_format" => Ok(serde_yml::Value::String(value.to_string())),
        "assembly_cost_per_kit" | "buffer_percent" => match parse_amount(value) {
            Some(n) => Ok(serde_yml::Value::Number(n.into())),
            None => Err(ConfigError::InvalidNumber {
                key: key.to_string(),
                value: value.to_string(),
            }),
        },
        _ => Err(ConfigError::UnknownKey(key.to_string())),
    }
}

//! Configuration management for the CLI.

use crate::cli::{Cli, Preset};
use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tidemark_rotator::RotatorConfig;

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Rotation settings
    #[serde(default)]
    pub rotation: RotatorConfig,

    /// Snapshot export command
    #[serde(default)]
    pub export: ExportSettings,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// External command that writes a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Program and arguments; `{output}` is replaced by the target path
    #[serde(default)]
    pub command: Vec<String>,

    /// Output fragments marking the backend as not provisioned
    #[serde(default = "default_unavailable_markers")]
    pub unavailable_markers: Vec<String>,

    /// Extra environment variables for the command
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".tidemark").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default path is used if
    /// present and built-in defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) if path.exists() => path.to_path_buf(),
            Some(path) => {
                return Err(CliError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            None => match Self::path() {
                Ok(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        Self::from_file(&path)
    }

    /// Read a configuration file.
    ///
    /// A relative `snapshot_dir` is resolved against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;

        if config.rotation.snapshot_dir.is_relative() {
            if let Some(parent) = path.parent() {
                config.rotation.snapshot_dir = parent.join(&config.rotation.snapshot_dir);
            }
        }

        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Apply global command-line overrides.
    pub fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(preset) = cli.preset {
            self.apply_preset(preset);
        }
        if let Some(dir) = &cli.dir {
            self.rotation.snapshot_dir = dir.clone();
        }
        if let Some(hours) = cli.hourly_hours {
            self.rotation.hourly_window_hours = hours;
        }
        if let Some(days) = cli.daily_days {
            self.rotation.daily_window_days = days;
        }
    }

    /// Replace the retention windows with a preset's.
    pub fn apply_preset(&mut self, preset: Preset) {
        let windows = match preset {
            Preset::Default => RotatorConfig::default(),
            Preset::Aggressive => RotatorConfig::aggressive(),
            Preset::Lenient => RotatorConfig::lenient(),
        };
        self.rotation.hourly_window_hours = windows.hourly_window_hours;
        self.rotation.daily_window_days = windows.daily_window_days;
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            unavailable_markers: default_unavailable_markers(),
            env: BTreeMap::new(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_unavailable_markers() -> Vec<String> {
    vec!["not found".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.rotation, RotatorConfig::default());
        assert!(config.export.command.is_empty());
        assert_eq!(config.export.unavailable_markers, vec!["not found".to_string()]);
        assert!(config.settings.color);
    }

    #[test]
    fn test_load_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            r#"
[rotation]
snapshot_dir = "/var/backups/app"
daily_window_days = 30

[export]
command = ["pg_dump", "--file", "{output}", "app"]

[export.env]
PGHOST = "db.internal"

[settings]
format = "json"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.rotation.snapshot_dir, PathBuf::from("/var/backups/app"));
        assert_eq!(config.rotation.daily_window_days, 30);
        assert_eq!(config.rotation.hourly_window_hours, 24);
        assert_eq!(config.export.command[2], "{output}");
        assert_eq!(config.export.env.get("PGHOST").map(String::as_str), Some("db.internal"));
        assert_eq!(config.export.unavailable_markers, vec!["not found".to_string()]);
        assert!(matches!(config.settings.format, OutputFormat::Json));
    }

    #[test]
    fn test_relative_snapshot_dir_resolves_against_config_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[rotation]\nsnapshot_dir = \"dumps\"\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.rotation.snapshot_dir, tmp.path().join("dumps"));
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let result = Config::load(Some(&tmp.path().join("absent.toml")));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[rotation\n").unwrap();

        assert!(matches!(Config::load(Some(&path)), Err(CliError::Toml(_))));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::default();
        let cli = Cli::parse_from([
            "tidemark",
            "--dir",
            "/srv/snapshots",
            "--hourly-hours",
            "6",
        ]);

        config.apply_overrides(&cli);
        assert_eq!(config.rotation.snapshot_dir, PathBuf::from("/srv/snapshots"));
        assert_eq!(config.rotation.hourly_window_hours, 6);
        assert_eq!(config.rotation.daily_window_days, 14);
    }

    #[test]
    fn test_preset_then_explicit_window() {
        let mut config = Config::default();
        config.rotation.dry_run = true;
        let cli = Cli::parse_from(["tidemark", "--preset", "lenient", "--hourly-hours", "36"]);

        config.apply_overrides(&cli);
        assert_eq!(config.rotation.hourly_window_hours, 36);
        assert_eq!(config.rotation.daily_window_days, 30);
        assert!(config.rotation.dry_run);
    }

    #[test]
    fn test_aggressive_preset() {
        let mut config = Config::default();
        config.apply_preset(Preset::Aggressive);
        assert_eq!(config.rotation.hourly_window_hours, 12);
        assert_eq!(config.rotation.daily_window_days, 7);
    }

    #[test]
    fn test_toml_rendering_round_trips() {
        let config = Config::default();
        let rendered = config.to_toml().unwrap();
        assert!(rendered.contains("[rotation]"));

        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.rotation, config.rotation);
    }
}

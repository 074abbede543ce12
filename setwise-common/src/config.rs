//! Configuration loading and root folder resolution
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`SETWISE_ROOT_FOLDER`)
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or unreadable TOML file never stops startup; the compiled
//! defaults are used instead and the problem is reported to the caller.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "SETWISE_ROOT_FOLDER";

/// Environment variable overriding the listen port
pub const PORT_ENV: &str = "SETWISE_PORT";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "setwise.db";

/// Default listen port for setwise-assist
pub const DEFAULT_PORT: u16 = 5730;

/// Logging section of the TOML file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// tracing filter directive used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Append log output to this file instead of stdout
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Contents of `<config_dir>/setwise/<module>.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub root_folder: Option<PathBuf>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Values used when nothing else is configured
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub port: u16,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            root_folder: default_root_folder(),
            port: DEFAULT_PORT,
            log_level: default_log_level(),
        }
    }
}

/// OS-dependent default root folder
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/setwise
        dirs::data_local_dir()
            .map(|d| d.join("setwise"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/setwise"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/setwise
        dirs::data_dir()
            .map(|d| d.join("setwise"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/setwise"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\setwise
        dirs::data_local_dir()
            .map(|d| d.join("setwise"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\setwise"))
    } else {
        PathBuf::from("./setwise_data")
    }
}

/// Platform config file path for a module, e.g. `~/.config/setwise/setwise-assist.toml`
pub fn default_config_path(module_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("setwise").join(format!("{}.toml", module_name)))
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Invalid TOML in {}: {}", path.display(), e)))
}

/// Serialize a config to disk, creating parent directories
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Result of reading the TOML file once
#[derive(Debug, Clone)]
struct LoadedToml {
    config: TomlConfig,
    /// Why the file was ignored, if it was
    problem: Option<String>,
}

/// Resolves the root folder and TOML settings for one module
///
/// The TOML file is read at most once per resolver.
#[derive(Debug, Clone)]
pub struct RootFolderResolver {
    module_name: String,
    cli_root_folder: Option<PathBuf>,
    config_path: Option<PathBuf>,
    loaded: OnceLock<LoadedToml>,
}

impl RootFolderResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            cli_root_folder: None,
            config_path: None,
            loaded: OnceLock::new(),
        }
    }

    /// Root folder given on the command line
    pub fn with_cli_root_folder(mut self, root_folder: Option<PathBuf>) -> Self {
        self.cli_root_folder = root_folder;
        self
    }

    /// Explicit config file instead of the platform default
    pub fn with_config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self.loaded = OnceLock::new();
        self
    }

    fn read_toml(&self) -> LoadedToml {
        let fallback = |problem: Option<String>| LoadedToml {
            config: TomlConfig::default(),
            problem,
        };

        let path = match self
            .config_path
            .clone()
            .or_else(|| default_config_path(&self.module_name))
        {
            Some(path) => path,
            None => return fallback(None),
        };

        if !path.exists() {
            // Only an explicitly requested file is worth reporting
            return fallback(
                self.config_path
                    .as_ref()
                    .map(|_| format!("Config file {} not found, using defaults", path.display())),
            );
        }

        match load_toml_config(&path) {
            Ok(config) => LoadedToml {
                config,
                problem: None,
            },
            Err(e) => fallback(Some(format!("Ignoring unreadable config file: {}", e))),
        }
    }

    fn loaded(&self) -> &LoadedToml {
        self.loaded.get_or_init(|| self.read_toml())
    }

    /// TOML settings, or defaults when the file is missing or invalid
    pub fn load_toml(&self) -> &TomlConfig {
        &self.loaded().config
    }

    /// Why the TOML file was ignored, for logging once tracing is up
    pub fn load_problem(&self) -> Option<&str> {
        self.loaded().problem.as_deref()
    }

    /// Resolve the root folder in priority order
    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_root_folder {
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.load_toml().root_folder {
            return path.clone();
        }

        CompiledDefaults::for_current_platform().root_folder
    }

    /// Resolve the listen port: CLI/env value first, then TOML, then default
    pub fn resolve_port(&self, cli_or_env: Option<u16>) -> u16 {
        cli_or_env
            .or(self.load_toml().port)
            .unwrap_or(DEFAULT_PORT)
    }
}

/// Open the `[logging] file` target for appending, creating parent directories
pub fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(file)
}

/// Prepares the root folder on disk
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    /// Create the root folder if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            tracing::info!(path = %self.root_folder.display(), "Created root folder");
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }

    pub fn database_exists(&self) -> bool {
        self.database_path().exists()
    }
}

//! Configuration loading from whiteout.toml

use serde::Deserialize;
use std::path::{Path, PathBuf};
use whiteout_core::Tolerance;

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "whiteout.toml";

/// Root configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory every job path is relative to
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Where outputs go; unset means next to (or over) the inputs
    #[serde(default)]
    pub output_root: Option<PathBuf>,
    /// Whiteness tolerance, see [`Tolerance`]
    #[serde(default = "default_tolerance")]
    pub tolerance: i32,
    #[serde(default = "default_directories")]
    pub directories: Vec<DirectoryJob>,
    #[serde(default = "default_files")]
    pub files: Vec<FileJob>,
}

/// Every matching file directly inside `path` is converted in place.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DirectoryJob {
    pub path: PathBuf,
    /// Case-sensitive, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,
}

/// A single file conversion.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileJob {
    pub source: PathBuf,
    /// Defaults to `source` (in place)
    #[serde(default)]
    pub destination: Option<PathBuf>,
    /// Skip quietly when the source is absent instead of reporting an error
    #[serde(default)]
    pub skip_missing: bool,
}

impl FileJob {
    pub fn destination(&self) -> &Path {
        self.destination.as_deref().unwrap_or(&self.source)
    }

    /// True when the output lands under a different name than the input.
    pub fn renames(&self) -> bool {
        self.destination() != self.source.as_path()
    }

    /// Line printed before a renaming conversion, using the job's relative names.
    pub fn announcement(&self) -> Option<String> {
        self.renames().then(|| {
            format!(
                "Processing {} to {}",
                self.source.display(),
                self.destination().display()
            )
        })
    }
}

fn default_root() -> PathBuf {
    PathBuf::from("public/assets")
}

fn default_tolerance() -> i32 {
    Tolerance::DEFAULT.value()
}

fn default_extension() -> String {
    "png".to_string()
}

fn default_directories() -> Vec<DirectoryJob> {
    ["houses", "animals"]
        .into_iter()
        .map(|dir| DirectoryJob {
            path: PathBuf::from(dir),
            extension: default_extension(),
        })
        .collect()
}

fn default_files() -> Vec<FileJob> {
    vec![
        FileJob {
            source: PathBuf::from("plot.png"),
            destination: None,
            skip_missing: false,
        },
        FileJob {
            source: PathBuf::from("logo.jpg"),
            destination: Some(PathBuf::from("logo.png")),
            skip_missing: true,
        },
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: default_root(),
            output_root: None,
            tolerance: default_tolerance(),
            directories: default_directories(),
            files: default_files(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e.to_string()))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load `explicit` if given, else whiteout.toml when it exists, else defaults
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            log::info!("Loading config from {}", path.display());
            return Self::load(path);
        }

        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        if fallback.is_file() {
            log::info!("Loading config from {}", fallback.display());
            Self::load(fallback)
        } else {
            log::debug!("No {} found, using built-in jobs", DEFAULT_CONFIG_FILE);
            Ok(Self::default())
        }
    }

    pub fn tolerance(&self) -> Tolerance {
        Tolerance::new(self.tolerance)
    }

    /// Input location of a job path
    pub fn source_path(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }

    /// Output location of a job path
    pub fn output_path(&self, relative: &Path) -> PathBuf {
        self.output_root
            .as_deref()
            .unwrap_or(&self.root)
            .join(relative)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(String),
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

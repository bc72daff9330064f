//! Optional user configuration file.
//!
//! Location, in priority order:
//!   1. `$CB_HOME/config.toml` (if `CB_HOME` is set and non-empty)
//!   2. `{config_dir}/cb/config.toml` (e.g. `~/.config/cb/config.toml`)
//!
//! ```toml
//! [output]
//! file = "/home/me/notes/cb.log"
//! append = true
//! trim = false
//! raw = false
//!
//! [clipboard]
//! tool = "xclip"
//! clear = false
//! ```
//!
//! A missing file yields defaults. A broken one is reported and ignored.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::clipboard::HelperTool;

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub clipboard: ClipboardSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
#[allow(clippy::struct_excessive_bools)]
pub struct OutputSection {
    pub file: Option<PathBuf>,
    #[serde(default)]
    pub append: bool,
    #[serde(default)]
    pub trim: bool,
    #[serde(default)]
    pub raw: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClipboardSection {
    pub tool: Option<String>,
    #[serde(default)]
    pub clear: bool,
}

impl FileConfig {
    /// The helper named by `[clipboard] tool`, if it is one we know.
    pub fn clipboard_tool(&self) -> Option<HelperTool> {
        let name = self.clipboard.tool.as_deref()?;
        let tool = HelperTool::parse(name);
        if tool.is_none() {
            tracing::warn!("ignoring unknown clipboard tool in config: {name}");
        }
        tool
    }

    /// Read a config file. Returns `Ok(None)` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> anyhow::Result<Option<Self>> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("failed to read config file: {}", path.display())));
            }
        };
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        Ok(Some(config))
    }

    /// Load from the default location, falling back to defaults on any problem.
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(Some(cfg)) => {
                tracing::debug!("loaded config from {}", path.display());
                cfg
            }
            Ok(None) => Self::default(),
            Err(e) => {
                tracing::warn!("{e:#}");
                Self::default()
            }
        }
    }
}

/// Returns the cb user-level config directory.
///
/// `CB_HOME` (when set and non-empty) replaces the platform default
/// `dirs::config_dir()/cb`.
pub fn user_dir() -> Option<PathBuf> {
    if let Ok(home) = std::env::var("CB_HOME")
        && !home.is_empty()
    {
        return Some(PathBuf::from(home));
    }
    dirs::config_dir().map(|d| d.join("cb"))
}

pub fn config_path() -> Option<PathBuf> {
    user_dir().map(|d| d.join("config.toml"))
}

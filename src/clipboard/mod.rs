//! System clipboard access through external helper programs.
//!
//! Discovery order is fixed: `wl-copy` (Wayland), then `xclip`, then `xsel`.
//! The first helper found on `PATH` wins.

mod helper;

use std::ffi::OsStr;
use std::path::PathBuf;

pub use helper::HelperBackend;

/// Errors from discovering or driving a clipboard helper.
#[derive(Debug)]
pub enum ClipboardError {
    /// None of the candidate helpers is on the search path.
    NoTool { tried: Vec<&'static str> },
    /// The helper exists but could not be launched.
    Spawn {
        tool: &'static str,
        source: std::io::Error,
    },
    /// The helper ran and exited non-zero.
    Failed {
        tool: &'static str,
        status: String,
        stderr: String,
    },
    Io(std::io::Error),
}

impl std::fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoTool { tried } => {
                write!(f, "no clipboard tool found (tried: {})", tried.join(", "))
            }
            Self::Spawn { tool, .. } => write!(f, "failed to launch {tool}"),
            Self::Failed {
                tool,
                status,
                stderr,
            } => write!(
                f,
                "clipboard command {tool} failed: {status} (stderr: {})",
                stderr.trim_end()
            ),
            Self::Io(e) => write!(f, "clipboard i/o error: {e}"),
        }
    }
}

impl std::error::Error for ClipboardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spawn { source, .. } => Some(source),
            Self::Io(e) => Some(e),
            Self::NoTool { .. } | Self::Failed { .. } => None,
        }
    }
}

impl From<std::io::Error> for ClipboardError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Something that can set the system clipboard.
pub trait ClipboardBackend {
    /// Short name for diagnostics.
    fn name(&self) -> &str;

    /// Replace the clipboard contents with `text`.
    ///
    /// # Errors
    ///
    /// Returns an error if the clipboard could not be written.
    fn publish(&self, text: &str) -> Result<(), ClipboardError>;

    /// Blank the clipboard.
    ///
    /// # Errors
    ///
    /// Returns an error if the clipboard could not be cleared.
    fn clear(&self) -> Result<(), ClipboardError> {
        self.publish("")
    }
}

impl<T: ClipboardBackend + ?Sized> ClipboardBackend for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn publish(&self, text: &str) -> Result<(), ClipboardError> {
        (**self).publish(text)
    }

    fn clear(&self) -> Result<(), ClipboardError> {
        (**self).clear()
    }
}

/// The supported helper programs, in discovery priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HelperTool {
    WlCopy,
    Xclip,
    Xsel,
}

impl HelperTool {
    pub const ALL: [Self; 3] = [Self::WlCopy, Self::Xclip, Self::Xsel];

    pub const fn program(self) -> &'static str {
        match self {
            Self::WlCopy => "wl-copy",
            Self::Xclip => "xclip",
            Self::Xsel => "xsel",
        }
    }

    /// Fixed arguments that make the helper read stdin into the clipboard selection.
    pub const fn args(self) -> &'static [&'static str] {
        match self {
            Self::WlCopy => &[],
            Self::Xclip => &["-selection", "clipboard"],
            Self::Xsel => &["--clipboard", "--input"],
        }
    }

    /// Parse a helper by its program name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.program() == name.trim())
    }
}

impl std::fmt::Display for HelperTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.program())
    }
}

fn candidates(preferred: Option<HelperTool>) -> Vec<HelperTool> {
    preferred.map_or_else(|| HelperTool::ALL.to_vec(), |tool| vec![tool])
}

fn resolve(
    preferred: Option<HelperTool>,
    lookup: impl Fn(&str) -> Option<PathBuf>,
) -> Result<HelperBackend, ClipboardError> {
    let tools = candidates(preferred);
    for tool in &tools {
        if let Some(path) = lookup(tool.program()) {
            tracing::debug!("clipboard tool: {}", path.display());
            return Ok(HelperBackend::new(*tool, path));
        }
    }
    Err(ClipboardError::NoTool {
        tried: tools.iter().map(|t| t.program()).collect(),
    })
}

/// Find the first available helper on `PATH`.
///
/// # Errors
///
/// Returns [`ClipboardError::NoTool`] if no candidate is installed.
pub fn detect(preferred: Option<HelperTool>) -> Result<HelperBackend, ClipboardError> {
    resolve(preferred, |name| which::which(name).ok())
}

/// Find the first available helper in an explicit search path
/// (same syntax as `PATH`).
///
/// # Errors
///
/// Returns [`ClipboardError::NoTool`] if no candidate is found there.
pub fn detect_in(
    paths: impl AsRef<OsStr>,
    preferred: Option<HelperTool>,
) -> Result<HelperBackend, ClipboardError> {
    let paths = paths.as_ref();
    let cwd = std::env::current_dir().unwrap_or_default();
    resolve(preferred, |name| {
        which::which_in(name, Some(paths), &cwd).ok()
    })
}

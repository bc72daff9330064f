use std::path::PathBuf;
use std::time::Duration;

use crate::clipboard::HelperTool;
use crate::transform::TransformOptions;

/// Default destination for saved records.
pub const DEFAULT_FILE: &str = "/tmp/cb.txt";

/// How much of the final text is echoed to the terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Quiet {
    /// Print everything.
    #[default]
    Disabled,
    /// Print nothing.
    AllSuppressed,
    /// Print only the first `n` lines.
    LimitedTo(usize),
}

impl Quiet {
    /// Resolve the raw `-q` flag: absent, bare (or `=0`), or `=N`.
    pub const fn from_flag(value: Option<usize>) -> Self {
        match value {
            None => Self::Disabled,
            Some(0) => Self::AllSuppressed,
            Some(n) => Self::LimitedTo(n),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    #[default]
    Overwrite,
    Append,
}

/// Everything one run needs, resolved before the pipeline starts.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)] // mirrors CLI switches
pub struct RunOptions {
    pub command: Vec<String>,
    pub head: usize,
    pub tail: usize,
    pub quiet: Quiet,
    /// Target file; `None` skips persistence entirely.
    pub file: Option<PathBuf>,
    pub write_mode: WriteMode,
    pub capture_stderr: bool,
    pub clipboard: bool,
    pub clear_clipboard: bool,
    pub verbose: bool,
    pub raw: bool,
    pub trim: bool,
    pub delay: Duration,
    /// Restrict clipboard discovery to a single helper.
    pub clipboard_tool: Option<HelperTool>,
}

impl RunOptions {
    /// Options with the defaults of a bare `cb <command>` invocation.
    pub fn new(command: Vec<String>) -> Self {
        Self {
            command,
            head: 0,
            tail: 0,
            quiet: Quiet::Disabled,
            file: Some(PathBuf::from(DEFAULT_FILE)),
            write_mode: WriteMode::Overwrite,
            capture_stderr: false,
            clipboard: true,
            clear_clipboard: false,
            verbose: false,
            raw: false,
            trim: false,
            delay: Duration::ZERO,
            clipboard_tool: None,
        }
    }

    /// The invocation as shown in record headers.
    pub fn invocation(&self) -> String {
        self.command.join(" ")
    }

    pub const fn transform(&self) -> TransformOptions {
        TransformOptions {
            raw: self.raw,
            trim: self.trim,
            head: self.head,
            tail: self.tail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_from_flag() {
        assert_eq!(Quiet::from_flag(None), Quiet::Disabled);
        assert_eq!(Quiet::from_flag(Some(0)), Quiet::AllSuppressed);
        assert_eq!(Quiet::from_flag(Some(3)), Quiet::LimitedTo(3));
    }

    #[test]
    fn defaults_match_bare_invocation() {
        let opts = RunOptions::new(vec!["echo".to_string(), "hello".to_string()]);
        assert_eq!(opts.file, Some(PathBuf::from("/tmp/cb.txt")));
        assert_eq!(opts.write_mode, WriteMode::Overwrite);
        assert!(opts.clipboard);
        assert_eq!(opts.delay, Duration::ZERO);
        assert_eq!(opts.invocation(), "echo hello");
    }

    #[test]
    fn transform_options_follow_run_options() {
        let mut opts = RunOptions::new(vec!["ls".to_string()]);
        opts.head = 4;
        opts.tail = 2;
        opts.trim = true;
        let t = opts.transform();
        assert_eq!((t.head, t.tail, t.trim, t.raw), (4, 2, true, false));
    }
}

use std::io::{Read, Seek, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use super::{ClipboardBackend, ClipboardError, HelperTool};

/// A clipboard backed by one of the helper programs found on disk.
#[derive(Debug, Clone)]
pub struct HelperBackend {
    tool: HelperTool,
    program: PathBuf,
}

impl HelperBackend {
    pub const fn new(tool: HelperTool, program: PathBuf) -> Self {
        Self { tool, program }
    }

    pub const fn tool(&self) -> HelperTool {
        self.tool
    }

    /// Launch the helper, feed `input` on stdin and wait for it to exit.
    ///
    /// `wl-copy` and `xclip` fork a server that inherits stdout and stderr
    /// and lives until the selection changes hands, so neither may be a
    /// pipe we read to EOF. Stdout is discarded and stderr goes to an
    /// anonymous temp file that is read back after the helper exits.
    fn run_piped(&self, input: &str) -> Result<(), ClipboardError> {
        let tool = self.tool.program();
        let mut stderr_file = tempfile::tempfile()?;
        let mut child = Command::new(&self.program)
            .args(self.tool.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::from(stderr_file.try_clone()?))
            .spawn()
            .map_err(|source| ClipboardError::Spawn { tool, source })?;

        if let Some(mut stdin) = child.stdin.take()
            && let Err(e) = stdin.write_all(input.as_bytes())
            && e.kind() != std::io::ErrorKind::BrokenPipe
        {
            return Err(e.into());
        }
        // stdin is dropped by now, so the helper sees EOF

        let status = child.wait()?;
        if !status.success() {
            let mut stderr = String::new();
            stderr_file.rewind()?;
            stderr_file.read_to_string(&mut stderr)?;
            return Err(ClipboardError::Failed {
                tool,
                status: status.to_string(),
                stderr,
            });
        }
        Ok(())
    }
}

impl ClipboardBackend for HelperBackend {
    fn name(&self) -> &str {
        self.tool.program()
    }

    fn publish(&self, text: &str) -> Result<(), ClipboardError> {
        self.run_piped(text)
    }
}

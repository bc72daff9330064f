use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::Context;

use crate::options::WriteMode;

/// Write `content` to `path`, creating parent directories as needed.
///
/// Overwrite mode truncates the file; append mode adds after existing
/// content. New files get mode 0644 on Unix. The content goes out in a
/// single `write_all` call and the handle is closed on every path.
///
/// # Errors
///
/// Returns an error if a parent directory cannot be created or the file
/// cannot be opened or written.
pub fn write_record(path: &Path, content: &str, mode: WriteMode) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true);
    match mode {
        WriteMode::Overwrite => options.truncate(true),
        WriteMode::Append => options.append(true),
    };
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }

    let mut file = options
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

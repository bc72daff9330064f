use std::io::Write;

use anyhow::Context;

use crate::clipboard::{ClipboardBackend, ClipboardError, HelperTool};
use crate::options::{Quiet, RunOptions};
use crate::record::Record;
use crate::{persist, runner, transform};

/// Run one capture → transform → persist → publish cycle and echo the
/// result to `out`.
///
/// `clipboard` resolves the backend; it is only called when clipboard
/// output is enabled. A failed clear is logged and ignored; every other
/// failure aborts the remaining steps.
///
/// # Errors
///
/// Returns an error if the command cannot run (or fails with stderr kept
/// separate), the record cannot be written, or the clipboard cannot be set.
pub fn run<W, F, B>(opts: &RunOptions, clipboard: F, out: &mut W) -> anyhow::Result<()>
where
    W: Write,
    F: FnOnce(Option<HelperTool>) -> Result<B, ClipboardError>,
    B: ClipboardBackend,
{
    let captured =
        runner::execute(&opts.command, opts.capture_stderr).context("error executing command")?;
    if captured.exit_code != 0 {
        tracing::debug!("command exited with status {}", captured.exit_code);
    }

    if !opts.delay.is_zero() {
        tracing::info!("waiting {} seconds", opts.delay.as_secs());
        std::thread::sleep(opts.delay);
    }

    let text = transform::apply(&captured.text, &opts.transform());

    if let Some(path) = &opts.file {
        let record = Record::new(opts.invocation(), text.as_str());
        persist::write_record(path, &record.render(), opts.write_mode)
            .context("error writing to file")?;
        tracing::info!("output written to {}", path.display());
    }

    if opts.clipboard {
        let backend = clipboard(opts.clipboard_tool).context("error copying to clipboard")?;
        if opts.clear_clipboard
            && let Err(e) = backend.clear()
        {
            tracing::warn!("could not clear clipboard: {e}");
        }
        backend
            .publish(&text)
            .context("error copying to clipboard")?;
        tracing::info!(
            "copied {} lines to clipboard via {}",
            text.matches('\n').count() + 1,
            backend.name()
        );
    }

    let shown = match opts.quiet {
        Quiet::AllSuppressed => return Ok(()),
        Quiet::LimitedTo(n) => transform::limit_lines(&text, n),
        Quiet::Disabled => text.as_str(),
    };
    if !shown.is_empty() {
        out.write_all(shown.as_bytes())?;
        if !shown.ends_with('\n') {
            out.write_all(b"\n")?;
        }
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::path::PathBuf;

    use super::*;
    use crate::options::WriteMode;

    /// In-memory clipboard that records every call.
    #[derive(Default)]
    struct Recorder {
        events: RefCell<Vec<String>>,
        fail_clear: bool,
        fail_publish: bool,
    }

    impl ClipboardBackend for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn publish(&self, text: &str) -> Result<(), ClipboardError> {
            if self.fail_publish {
                return Err(ClipboardError::Failed {
                    tool: "recorder",
                    status: "exit status: 1".to_string(),
                    stderr: "no display".to_string(),
                });
            }
            self.events.borrow_mut().push(format!("publish:{text}"));
            Ok(())
        }

        fn clear(&self) -> Result<(), ClipboardError> {
            if self.fail_clear {
                return Err(ClipboardError::Io(std::io::Error::other("clear failed")));
            }
            self.events.borrow_mut().push("clear".to_string());
            Ok(())
        }
    }

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    fn opts_in(dir: &tempfile::TempDir, command: Vec<String>) -> (RunOptions, PathBuf) {
        let path = dir.path().join("cb.txt");
        let mut opts = RunOptions::new(command);
        opts.file = Some(path.clone());
        (opts, path)
    }

    fn run_with(opts: &RunOptions, clip: &Recorder) -> (anyhow::Result<()>, String) {
        let mut out = Vec::new();
        let result = run(opts, |_| Ok(clip), &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    fn body_of(path: &std::path::Path) -> String {
        let content = std::fs::read_to_string(path).unwrap();
        let (header, body) = content.split_once('\n').unwrap();
        assert!(header.starts_with('[') && header.ends_with("]:"), "{header}");
        body.to_string()
    }

    #[test]
    fn echo_hello_fills_file_clipboard_and_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let (opts, path) = opts_in(&dir, vec!["echo".to_string(), "hello".to_string()]);
        let clip = Recorder::default();
        let (result, stdout) = run_with(&opts, &clip);
        result.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.ends_with(" \"echo hello\"]:\nhello\n\n"), "{content}");
        assert_eq!(*clip.events.borrow(), vec!["publish:hello\n".to_string()]);
        assert_eq!(stdout, "hello\n");
    }

    #[test]
    fn head_limits_saved_and_copied_text() {
        let dir = tempfile::tempdir().unwrap();
        let (mut opts, path) = opts_in(&dir, sh("printf '1\\n2\\n3\\n4\\n5\\n'"));
        opts.head = 2;
        let clip = Recorder::default();
        let (result, stdout) = run_with(&opts, &clip);
        result.unwrap();

        assert_eq!(body_of(&path), "1\n2\n");
        assert_eq!(*clip.events.borrow(), vec!["publish:1\n2".to_string()]);
        assert_eq!(stdout, "1\n2\n");
    }

    #[test]
    fn quiet_suppresses_stdout_only() {
        let dir = tempfile::tempdir().unwrap();
        let (mut opts, path) = opts_in(&dir, sh("echo hidden"));
        opts.quiet = Quiet::AllSuppressed;
        let clip = Recorder::default();
        let (result, stdout) = run_with(&opts, &clip);
        result.unwrap();

        assert_eq!(stdout, "");
        assert_eq!(body_of(&path), "hidden\n\n");
        assert_eq!(clip.events.borrow().len(), 1);
    }

    #[test]
    fn display_limit_does_not_touch_saved_text() {
        let dir = tempfile::tempdir().unwrap();
        let (mut opts, path) = opts_in(&dir, sh("printf 'a\\nb\\nc\\n'"));
        opts.quiet = Quiet::LimitedTo(1);
        let clip = Recorder::default();
        let (result, stdout) = run_with(&opts, &clip);
        result.unwrap();

        assert_eq!(stdout, "a\n");
        assert_eq!(body_of(&path), "a\nb\nc\n\n");
        assert_eq!(*clip.events.borrow(), vec!["publish:a\nb\nc\n".to_string()]);
    }

    #[test]
    fn no_clipboard_skips_discovery() {
        let dir = tempfile::tempdir().unwrap();
        let (mut opts, path) = opts_in(&dir, sh("echo saved"));
        opts.clipboard = false;
        let called = Cell::new(false);
        let mut out = Vec::new();
        run(
            &opts,
            |_| -> Result<Recorder, ClipboardError> {
                called.set(true);
                Err(ClipboardError::NoTool { tried: vec![] })
            },
            &mut out,
        )
        .unwrap();

        assert!(!called.get());
        assert_eq!(body_of(&path), "saved\n\n");
        assert_eq!(String::from_utf8(out).unwrap(), "saved\n");
    }

    #[test]
    fn no_temp_with_stderr_capture_copies_error_stream() {
        let dir = tempfile::tempdir().unwrap();
        let (mut opts, path) = opts_in(&dir, sh("echo oops >&2; exit 2"));
        opts.file = None;
        opts.capture_stderr = true;
        let clip = Recorder::default();
        let (result, _) = run_with(&opts, &clip);
        result.unwrap();

        assert!(!path.exists());
        assert_eq!(*clip.events.borrow(), vec!["publish:oops\n".to_string()]);
    }

    #[test]
    fn append_mode_accumulates_records() {
        let dir = tempfile::tempdir().unwrap();
        let (mut opts, path) = opts_in(&dir, sh("echo first"));
        opts.write_mode = WriteMode::Append;
        opts.clipboard = false;
        run_with(&opts, &Recorder::default()).0.unwrap();
        opts.command = sh("echo second");
        run_with(&opts, &Recorder::default()).0.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let headers: Vec<&str> = content.lines().filter(|l| l.starts_with('[')).collect();
        assert_eq!(headers.len(), 2);
        assert!(content.contains("]:\nfirst\n\n["));
        assert!(content.ends_with("]:\nsecond\n\n"));
    }

    #[test]
    fn overwrite_mode_keeps_only_last_record() {
        let dir = tempfile::tempdir().unwrap();
        let (mut opts, path) = opts_in(&dir, sh("echo first"));
        opts.clipboard = false;
        run_with(&opts, &Recorder::default()).0.unwrap();
        opts.command = sh("echo second");
        run_with(&opts, &Recorder::default()).0.unwrap();

        assert_eq!(body_of(&path), "second\n\n");
    }

    #[test]
    fn clear_runs_before_publish() {
        let dir = tempfile::tempdir().unwrap();
        let (mut opts, _) = opts_in(&dir, sh("echo x"));
        opts.clear_clipboard = true;
        let clip = Recorder::default();
        run_with(&opts, &clip).0.unwrap();
        assert_eq!(
            *clip.events.borrow(),
            vec!["clear".to_string(), "publish:x\n".to_string()]
        );
    }

    #[test]
    fn clear_failure_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let (mut opts, _) = opts_in(&dir, sh("echo x"));
        opts.clear_clipboard = true;
        let clip = Recorder {
            fail_clear: true,
            ..Recorder::default()
        };
        let (result, stdout) = run_with(&opts, &clip);
        result.unwrap();
        assert_eq!(*clip.events.borrow(), vec!["publish:x\n".to_string()]);
        assert_eq!(stdout, "x\n");
    }

    #[test]
    fn publish_failure_is_fatal_after_file_write() {
        let dir = tempfile::tempdir().unwrap();
        let (opts, path) = opts_in(&dir, sh("echo x"));
        let clip = Recorder {
            fail_publish: true,
            ..Recorder::default()
        };
        let (result, stdout) = run_with(&opts, &clip);
        let err = result.unwrap_err();
        assert!(format!("{err:#}").starts_with("error copying to clipboard"));
        assert!(path.exists());
        assert_eq!(stdout, "");
    }

    #[test]
    fn missing_clipboard_tool_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let (opts, _) = opts_in(&dir, sh("echo x"));
        let mut out = Vec::new();
        let err = run(
            &opts,
            |_| -> Result<Recorder, ClipboardError> {
                Err(ClipboardError::NoTool {
                    tried: vec!["wl-copy", "xclip", "xsel"],
                })
            },
            &mut out,
        )
        .unwrap_err();
        assert_eq!(
            format!("{err:#}"),
            "error copying to clipboard: no clipboard tool found (tried: wl-copy, xclip, xsel)"
        );
    }

    #[test]
    fn preferred_tool_reaches_resolver() {
        let dir = tempfile::tempdir().unwrap();
        let (mut opts, _) = opts_in(&dir, sh("echo x"));
        opts.clipboard_tool = Some(HelperTool::Xsel);
        let clip = Recorder::default();
        let seen = Cell::new(None);
        let mut out = Vec::new();
        run(
            &opts,
            |tool| {
                seen.set(tool);
                Ok(&clip)
            },
            &mut out,
        )
        .unwrap();
        assert_eq!(seen.get(), Some(HelperTool::Xsel));
    }

    #[test]
    fn child_failure_stops_before_file_and_clipboard() {
        let dir = tempfile::tempdir().unwrap();
        let (opts, path) = opts_in(&dir, sh("echo partial; echo bad >&2; exit 1"));
        let clip = Recorder::default();
        let (result, stdout) = run_with(&opts, &clip);
        let err = result.unwrap_err();
        assert_eq!(
            format!("{err:#}"),
            "error executing command: exit status: 1 (stderr: bad)"
        );
        assert!(!path.exists());
        assert!(clip.events.borrow().is_empty());
        assert_eq!(stdout, "");
    }

    #[test]
    fn spawn_failure_stops_everything() {
        let dir = tempfile::tempdir().unwrap();
        let (opts, path) = opts_in(&dir, vec!["nonexistent_cmd_xyz_99".to_string()]);
        let clip = Recorder::default();
        let (result, _) = run_with(&opts, &clip);
        assert!(result.is_err());
        assert!(!path.exists());
        assert!(clip.events.borrow().is_empty());
    }

    #[test]
    fn trim_and_strip_feed_every_output() {
        let dir = tempfile::tempdir().unwrap();
        let (mut opts, path) = opts_in(&dir, sh("printf '\\n  \\033[32mgreen\\033[0m  \\n\\n'"));
        opts.trim = true;
        let clip = Recorder::default();
        let (result, stdout) = run_with(&opts, &clip);
        result.unwrap();
        assert_eq!(stdout, "green\n");
        assert_eq!(body_of(&path), "green\n");
        assert_eq!(*clip.events.borrow(), vec!["publish:green".to_string()]);
    }

    #[test]
    fn delay_waits_after_command_and_keeps_output() {
        let dir = tempfile::tempdir().unwrap();
        let (mut opts, path) = opts_in(&dir, vec!["echo".to_string(), "later".to_string()]);
        opts.delay = std::time::Duration::from_secs(1);
        let clip = Recorder::default();
        let start = std::time::Instant::now();
        let (result, stdout) = run_with(&opts, &clip);
        result.unwrap();
        assert!(start.elapsed() >= opts.delay, "only waited {:?}", start.elapsed());
        assert_eq!(stdout, "later\n");
        assert_eq!(body_of(&path), "later\n\n");
        assert_eq!(*clip.events.borrow(), vec!["publish:later\n".to_string()]);
    }

    #[test]
    fn empty_output_prints_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (opts, path) = opts_in(&dir, vec!["true".to_string()]);
        let clip = Recorder::default();
        let (result, stdout) = run_with(&opts, &clip);
        result.unwrap();
        assert_eq!(stdout, "");
        assert_eq!(body_of(&path), "\n");
    }
}

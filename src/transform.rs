//! Pure text transforms applied to captured output.
//!
//! Processing order:
//!
//! ```text
//! 1. strip_ansi   : drop `ESC [ <digits/;> <letter>` sequences (skipped in raw mode)
//! 2. trim         : drop leading/trailing whitespace of the whole text
//! 3. head / tail  : keep a window of `\n`-separated lines
//! ```
//!
//! [`limit_lines`] is separate: it only shapes what gets echoed to the
//! terminal and never touches the saved or copied text.

use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)]
static ANSI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*[a-zA-Z]").expect("valid ANSI regex"));

/// Knobs for [`apply`]. Zero line counts disable the corresponding filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformOptions {
    pub raw: bool,
    pub trim: bool,
    pub head: usize,
    pub tail: usize,
}

/// Remove terminal escape sequences such as colour codes.
pub fn strip_ansi(input: &str) -> String {
    ANSI_RE.replace_all(input, "").into_owned()
}

/// Keep the first `head` lines, then the last `tail` lines of what remains.
///
/// Lines are split on `\n`, so a trailing newline counts as a final empty
/// line. A count of zero, or one that is not smaller than the current line
/// count, leaves that stage unchanged.
pub fn apply_line_filters(input: &str, head: usize, tail: usize) -> String {
    if head == 0 && tail == 0 {
        return input.to_string();
    }

    let mut lines: Vec<&str> = input.split('\n').collect();

    if head > 0 && head < lines.len() {
        lines.truncate(head);
    }

    if tail > 0 && tail < lines.len() {
        lines = lines.split_off(lines.len() - tail);
    }

    lines.join("\n")
}

/// Truncate `input` to its first `max_lines` lines for display.
pub fn limit_lines(input: &str, max_lines: usize) -> &str {
    if max_lines == 0 {
        return input;
    }
    match input.match_indices('\n').nth(max_lines - 1) {
        Some((idx, _)) => &input[..idx],
        None => input,
    }
}

/// Run the fixed transform chain: strip → trim → head/tail.
pub fn apply(input: &str, opts: &TransformOptions) -> String {
    let stripped = if opts.raw {
        input.to_string()
    } else {
        strip_ansi(input)
    };

    let trimmed = if opts.trim {
        stripped.trim().to_string()
    } else {
        stripped
    };

    apply_line_filters(&trimmed, opts.head, opts.tail)
}

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, CommandFactory, Parser};

use cb::app;
use cb::clipboard;
use cb::config::FileConfig;
use cb::logging;
use cb::options::{DEFAULT_FILE, Quiet, RunOptions, WriteMode};

const EXAMPLES: &str = "\
Examples:
  cb echo \"hello world\"
  cb ls -l /home/user
  cb -h 10 dmesg
  cb -f output.txt -v ps aux
  cb -e -v somecommand

Notes:
  Requires wl-copy (Wayland) or xclip/xsel (X11) for clipboard support.
  Output is saved with a timestamp header: [date time \"command\"]:";

#[derive(Parser)]
#[command(
    name = "cb",
    version = concat!("version ", env!("CARGO_PKG_VERSION")),
    about = "Run a command, save its output, and copy it to the clipboard",
    disable_help_flag = true,
    disable_version_flag = true,
    after_help = EXAMPLES
)]
#[allow(clippy::struct_excessive_bools)] // CLI flags are naturally booleans
struct Cli {
    /// Copy only the first N lines of output
    #[arg(short = 'h', long = "head", value_name = "N", default_value_t = 0)]
    head: usize,

    /// Copy only the last N lines of output
    #[arg(short = 't', long = "tail", value_name = "N", default_value_t = 0)]
    tail: usize,

    /// Suppress stdout entirely, or show only N lines (-q=N)
    #[arg(
        short = 'q',
        long = "quiet",
        value_name = "N",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "0"
    )]
    quiet: Option<usize>,

    /// Write output to FILE instead of /tmp/cb.txt
    #[arg(short = 'f', long = "file", value_name = "FILE", env = "CB_FILE")]
    file: Option<PathBuf>,

    /// Clear the clipboard before writing
    #[arg(short = 'c', long)]
    clear: bool,

    /// Capture stderr together with stdout
    #[arg(short = 'e', long = "error")]
    error: bool,

    /// Append to the file instead of overwriting it
    #[arg(short = 'a', long)]
    append: bool,

    /// Do not touch the clipboard, only save to file
    #[arg(short = 'n', long = "no-clipboard")]
    no_clipboard: bool,

    /// Show what was copied and where
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Skip writing the output file entirely
    #[arg(long = "no-temp")]
    no_temp: bool,

    /// Preserve terminal formatting (ANSI codes)
    #[arg(short = 'r', long)]
    raw: bool,

    /// Wait N seconds before processing the output
    #[arg(long, value_name = "N", default_value_t = 0)]
    delay: u64,

    /// Trim leading and trailing whitespace
    #[arg(long)]
    trim: bool,

    /// Show program version
    #[arg(long, action = ArgAction::Version)]
    version: Option<bool>,

    /// Display this help message
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,

    /// Command to run, followed by its arguments
    #[arg(value_name = "COMMAND", trailing_var_arg = true)]
    command: Vec<String>,
}

impl Cli {
    /// Merge flags with the config file into one immutable snapshot.
    fn into_options(self, file_cfg: &FileConfig) -> RunOptions {
        let file = if self.no_temp {
            None
        } else {
            Some(
                self.file
                    .or_else(|| file_cfg.output.file.clone())
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_FILE)),
            )
        };

        let write_mode = if self.append || file_cfg.output.append {
            WriteMode::Append
        } else {
            WriteMode::Overwrite
        };

        RunOptions {
            command: self.command,
            head: self.head,
            tail: self.tail,
            quiet: Quiet::from_flag(self.quiet),
            file,
            write_mode,
            capture_stderr: self.error,
            clipboard: !self.no_clipboard,
            clear_clipboard: self.clear || file_cfg.clipboard.clear,
            verbose: self.verbose,
            raw: self.raw || file_cfg.output.raw,
            trim: self.trim || file_cfg.output.trim,
            delay: Duration::from_secs(self.delay),
            clipboard_tool: file_cfg.clipboard_tool(),
        }
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here too, on stdout with exit 0
            let code = i32::from(e.use_stderr());
            let _ = e.print();
            std::process::exit(code);
        }
    };

    logging::init(cli.verbose);

    if cli.command.is_empty() {
        eprintln!("[cb] error: no command specified");
        let _ = Cli::command().print_help();
        std::process::exit(1);
    }

    let opts = cli.into_options(&FileConfig::load());
    let stdout = std::io::stdout();
    let exit_code = match app::run(&opts, clipboard::detect, &mut stdout.lock()) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("[cb] error: {e:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

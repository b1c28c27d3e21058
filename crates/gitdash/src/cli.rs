#![forbid(unsafe_code)]

//! Command-line argument parsing.
//!
//! Parses args by hand. Environment variables (`GITDASH_*`) supply the
//! defaults and explicit flags override them. `GITDASH_OUTCOME_PATH` is not
//! parsed here: the outcome reporter reads it itself, as an `OsString`.

use std::env;
use std::path::PathBuf;
use std::process;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const REPLAY_ENV: &str = "GITDASH_REPLAY";
pub const LOG_ENV: &str = "GITDASH_LOG";
pub const LOG_FILE_ENV: &str = "GITDASH_LOG_FILE";
pub const REPO_ENV: &str = "GITDASH_REPO";

const HELP_TEXT: &str = "\
gitdash - terminal dashboard for everyday git operations

USAGE:
    gitdash [OPTIONS]

OPTIONS:
    --repo=PATH          Repository to operate on (default: current directory)
    --replay=KEYS        Feed a key script instead of reading the terminal.
                         KEYS is comma separated, e.g. 'down,enter,q,enter',
                         or @FILE to read the script from a file
    --headless           Run without a terminal (implied by --replay)
    --help, -h           Show this help message
    --version, -V        Show version

KEYBINDINGS:
    j / k, Down / Up     Move through the action list
    Enter                Run the selected action, or accept a panel
    Tab                  New line in a commit message
    Esc                  Close the open panel
    q                    Quit (asks first)
    Ctrl+C               Quit immediately

ENVIRONMENT VARIABLES:
    GITDASH_OUTCOME_PATH  Write a JSON outcome record here on exit
    GITDASH_REPLAY        Same as --replay
    GITDASH_REPO          Same as --repo
    GITDASH_LOG           Log filter, e.g. 'info' or 'gitdash_panels=debug'
    GITDASH_LOG_FILE      Log file (nothing is logged to the terminal)";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    /// Repository the git commands run in.
    pub repo: PathBuf,
    /// Key script, or `@path` to one.
    pub replay: Option<String>,
    /// Run without a terminal.
    pub headless: bool,
    /// `EnvFilter` directive.
    pub log_filter: String,
    /// Log destination.
    pub log_file: Option<PathBuf>,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            repo: PathBuf::from("."),
            replay: None,
            headless: false,
            log_filter: "info".into(),
            log_file: None,
        }
    }
}

/// What the command line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Run(Opts),
    Help,
    Version,
}

impl Opts {
    /// Parse the process arguments and environment. Exits on `--help`,
    /// `--version` and invalid input.
    pub fn parse() -> Self {
        let args = env::args().skip(1);
        match Self::parse_from(|key| env::var(key).ok(), args) {
            Ok(Invocation::Run(opts)) => opts,
            Ok(Invocation::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Invocation::Version) => {
                println!("gitdash {VERSION}");
                process::exit(0);
            }
            Err(msg) => {
                eprintln!("{msg}");
                eprintln!("Run with --help for usage information.");
                process::exit(2);
            }
        }
    }

    /// Parse from an environment lookup and an argument list.
    pub fn parse_from<I, S>(lookup: impl Fn(&str) -> Option<String>, args: I) -> Result<Invocation, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut opts = Self::default();
        let set = |key: &str| lookup(key).filter(|v| !v.is_empty());

        // Environment first
        if let Some(val) = set(REPLAY_ENV) {
            opts.replay = Some(val);
        }
        if let Some(val) = set(REPO_ENV) {
            opts.repo = PathBuf::from(val);
        }
        if let Some(val) = set(LOG_ENV) {
            opts.log_filter = val;
        }
        if let Some(val) = set(LOG_FILE_ENV) {
            opts.log_file = Some(PathBuf::from(val));
        }

        // Flags override
        for arg in args {
            match arg.as_ref() {
                "--help" | "-h" => return Ok(Invocation::Help),
                "--version" | "-V" => return Ok(Invocation::Version),
                "--headless" => opts.headless = true,
                other => {
                    if let Some(val) = other.strip_prefix("--repo=") {
                        if val.is_empty() {
                            return Err("Invalid --repo value: empty path".into());
                        }
                        opts.repo = PathBuf::from(val);
                    } else if let Some(val) = other.strip_prefix("--replay=") {
                        opts.replay = Some(val.to_owned());
                    } else {
                        return Err(format!("Unknown argument: {other}"));
                    }
                }
            }
        }

        if opts.replay.is_some() {
            opts.headless = true;
        }
        Ok(Invocation::Run(opts))
    }

    /// The replay script text, reading `@path` scripts from disk.
    pub fn replay_script(&self) -> std::io::Result<String> {
        match self.replay.as_deref() {
            Some(script) => match script.strip_prefix('@') {
                Some(path) => std::fs::read_to_string(path),
                None => Ok(script.to_owned()),
            },
            None => Ok(String::new()),
        }
    }
}

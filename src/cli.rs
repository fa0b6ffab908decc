use crate::compare::Mode;
use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "followdiff")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Find who doesn't follow you back from your data export")]
#[command(
    long_about = "FollowDiff compares the followers and following lists from a social-graph \
                  data export (HTML or JSON) and lists the accounts that don't follow you back, \
                  or the fans you don't follow back."
)]
#[command(before_help = "🔍 FollowDiff - Followers Comparison Tool")]
#[command(after_help = "EXAMPLES:\n  \
    followdiff -f followers_1.json -F following.json\n  \
    followdiff -f followers_1.html -F following.html --mode fans\n  \
    followdiff --whitelist friends.txt --search john --export unfollowers.csv\n  \
    followdiff --interactive\n\n\
    Selected files are remembered in followdiff.toml, so later runs need no arguments.")]
pub struct Cli {
    /// Followers export file (.json or .html)
    #[arg(short = 'f', long)]
    pub followers: Option<PathBuf>,

    /// Following export file (.json or .html)
    #[arg(short = 'F', long)]
    pub following: Option<PathBuf>,

    /// Whitelist file, one username per line
    #[arg(short, long)]
    pub whitelist: Option<PathBuf>,

    /// What to compute
    #[arg(short, long, value_enum, default_value_t = ModeArg::Unfollowers)]
    pub mode: ModeArg,

    /// Only show results containing this text
    #[arg(short, long)]
    pub search: Option<String>,

    /// Treat --search as a regular expression
    #[arg(long, requires = "search")]
    pub regex: bool,

    /// Export all results (.csv adds a Username header)
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,

    /// Open a profile in the browser
    #[arg(long, value_name = "IDENTIFIER")]
    pub open: Option<String>,

    /// Copy the displayed results to the clipboard
    #[arg(long)]
    pub copy: bool,

    /// Don't write the dated auto-save file
    #[arg(long)]
    pub no_auto_save: bool,

    /// Directory for auto-save files
    #[arg(long, value_name = "DIR")]
    pub auto_save_dir: Option<PathBuf>,

    /// Domain used to recognize and open profiles
    #[arg(long, env = "FOLLOWDIFF_PROFILE_HOST", value_name = "HOST")]
    pub profile_host: Option<String>,

    /// Start an interactive session
    #[arg(short, long)]
    pub interactive: bool,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Accounts you follow that don't follow you back
    Unfollowers,
    /// Accounts following you that you don't follow back
    Fans,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Unfollowers => Mode::Unfollowers,
            ModeArg::Fans => Mode::Fans,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    /// The configuration as stored on disk, without this run's overrides.
    pub fn load_config(&self) -> Result<Config> {
        Config::load_or_default(Config::resolve_path(self.config.as_deref()))
    }

    /// Settings that only apply to this run and are never written back.
    /// Input files are selected separately so that only files that exist
    /// get remembered.
    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_no_auto_save(self.no_auto_save)
            .with_auto_save_dir(self.auto_save_dir.clone())
            .with_profile_host(self.profile_host.clone())
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

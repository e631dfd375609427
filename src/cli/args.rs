//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// duckdex - collect ducks, offline
///
/// Records scanned ducks in a local collection and keeps the app shell and
/// duck images available without a network.
#[derive(Parser, Debug)]
#[command(name = "duckdex")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "DUCKDEX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Data directory (overrides storage.data_dir)
    #[arg(long, global = true, env = "DUCKDEX_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a duck and add it to the collection
    Discover(DiscoverArgs),

    /// Show one duck from the collection
    Show(ShowArgs),

    /// List the collection
    Collection(CollectionArgs),

    /// Make the app available offline (asks once)
    Install(InstallArgs),

    /// Resolve a request through the offline shell
    Fetch(FetchArgs),

    /// Show consent, shell, and storage status
    Status,

    /// Erase the collection, caches, and settings
    Reset(ResetArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Parameters carried by a scanned code
#[derive(Parser, Debug)]
pub struct DiscoverArgs {
    /// Duck id
    #[arg(long)]
    pub id: Option<String>,

    /// Duck name
    #[arg(long)]
    pub name: Option<String>,

    /// Duck fact
    #[arg(long)]
    pub fact: Option<String>,

    /// Image path or URL
    #[arg(long)]
    pub image: Option<String>,

    /// Print the card as HTML
    #[arg(long)]
    pub html: bool,
}

#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Collection key (id, or name for ducks scanned without an id)
    pub key: String,

    /// Print the card as HTML
    #[arg(long)]
    pub html: bool,
}

#[derive(Parser, Debug)]
pub struct CollectionArgs {
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct InstallArgs {
    /// Accept without prompting
    #[arg(short, long, conflicts_with = "decline")]
    pub yes: bool,

    /// Decline without prompting
    #[arg(long)]
    pub decline: bool,

    /// Answer to the image caching question
    #[arg(long)]
    pub images: Option<YesNo>,
}

#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// Path or absolute URL
    pub url: String,

    /// Treat as a page navigation (enables the offline page fallback)
    #[arg(long)]
    pub navigate: bool,

    /// Write the body to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ResetArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    pub shell: Shell,
}

/// Output format for the collection
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one key per line)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    pub fn as_bool(self) -> bool {
        self == Self::Yes
    }
}

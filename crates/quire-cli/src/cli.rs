use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "quire",
    about = "Quire: versioned page and area store",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Snapshot file holding pages, versions and redirects
    #[arg(long, global = true, default_value = "quire.json")]
    pub data: PathBuf,

    /// TOML file with core settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Act as this user (stamped on versions)
    #[arg(long, global = true)]
    pub user: Option<String>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show which page a slug resolves to
    Resolve(SlugArgs),
    /// Fetch the page a slug resolves to, with item loaders run
    GetPage(SlugArgs),
    /// Store a whole page from JSON
    PutPage(PutArgs),
    /// Fetch one area (page-slug:area)
    GetArea(GetAreaArgs),
    /// Store one area from JSON (page-slug:area)
    PutArea(PutArgs),
    /// List versions of a page, newest first
    History(HistoryArgs),
    /// Restore a page's content from an earlier version
    Rollback(RollbackArgs),
    /// Change a page's slug and leave a redirect
    Rename(RenameArgs),
    /// Look up one redirect, or list them all
    Redirect(RedirectArgs),
    /// Turn text into a slug
    Slugify(SlugifyArgs),
}

impl Command {
    /// Whether the command writes to the snapshot.
    pub fn mutates(&self) -> bool {
        matches!(
            self,
            Self::PutPage(_) | Self::PutArea(_) | Self::Rollback(_) | Self::Rename(_)
        )
    }
}

#[derive(Args)]
pub struct SlugArgs {
    pub slug: String,
}

#[derive(Args)]
pub struct PutArgs {
    pub slug: String,
    /// JSON file to read; standard input when absent
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

#[derive(Args)]
pub struct GetAreaArgs {
    pub slug: String,
    /// Skip item loaders
    #[arg(long)]
    pub no_load: bool,
}

#[derive(Args)]
pub struct HistoryArgs {
    pub slug: String,
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,
}

#[derive(Args)]
pub struct RollbackArgs {
    pub slug: String,
    /// Version id to restore
    pub version: String,
}

#[derive(Args)]
pub struct RenameArgs {
    pub from: String,
    pub to: String,
}

#[derive(Args)]
pub struct RedirectArgs {
    pub from: Option<String>,
}

#[derive(Args)]
pub struct SlugifyArgs {
    pub text: String,
    #[arg(long, default_value = "-")]
    pub separator: char,
    /// Extra characters to keep
    #[arg(long, default_value = "")]
    pub allow: String,
}

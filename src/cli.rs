use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "keybox",
    author,
    version,
    about = "A personal, encrypted password vault.",
    long_about = "A personal, encrypted password vault: an ordered table of site/user/password records sealed behind a single passphrase."
)]
pub struct Cli {
    /// Path to the vault file. Overrides the configured path.
    #[arg(long, global = true, value_name = "FILE")]
    pub vault: Option<PathBuf>,

    /// Emit machine-readable JSON instead of text where applicable.
    #[arg(long, global = true, action = clap::ArgAction::SetTrue)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Create a new, empty vault.")]
    Init,

    #[command(about = "Add a new record.")]
    Add(AddArgs),

    #[command(about = "List records, optionally filtered by a search term.")]
    List(ListArgs),

    #[command(about = "Show one record in full.")]
    Show(ShowArgs),

    #[command(about = "Set a single field on an existing record.")]
    Set(SetArgs),

    #[command(about = "Delete a record.")]
    Delete(DeleteArgs),

    #[command(about = "Change the vault's passphrase.")]
    Passwd,

    #[command(about = "Export records to a file.")]
    Export(ExportArgs),

    #[command(about = "Import records from a file.")]
    Import(ImportArgs),

    #[command(about = "List every tag in use across the vault.")]
    Tags,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub site: Option<String>,
    #[arg(long)]
    pub user: Option<String>,
    #[arg(long)]
    pub url: Option<String>,
    #[arg(long)]
    pub tags: Option<String>,
    #[arg(long)]
    pub note: Option<String>,
    /// Read the password from this flag instead of prompting (for scripting — prefer the interactive prompt).
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    pub query: Option<String>,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    pub index: usize,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Reveal the decrypted password.")]
    pub reveal: bool,
}

#[derive(Debug, Args)]
pub struct SetArgs {
    pub index: usize,
    pub field: String,
    pub value: String,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    pub index: usize,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FileFormatArg {
    Keybox,
    Plain,
    Json,
    Gpg,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    pub path: PathBuf,
    #[arg(long, value_enum, default_value_t = FileFormatArg::Plain)]
    pub format: FileFormatArg,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    pub path: PathBuf,
    #[arg(long, value_enum, default_value_t = FileFormatArg::Plain)]
    pub format: FileFormatArg,
    #[arg(long, help = "Minimum matched-column score to treat a record as an update rather than new.")]
    pub min_score: Option<usize>,
}

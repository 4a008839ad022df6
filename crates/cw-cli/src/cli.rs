use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "crosswalk",
    about = "Crosswalk: a knowledge base of metadata mappings",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file; falls back to $CROSSWALK_CONFIG
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the managed store process
    Start,
    /// Stop the managed store process
    Stop,
    /// Report whether the store is reachable
    Status,
    /// Stop the store and wipe its data directory
    Clean,
    /// Create, list or delete branches
    Branch(BranchArgs),
    /// Drop statements a branch shares with main
    Rebase(BranchRef),
    /// Print the line-stable snapshot of a branch
    Save(BranchRef),
    /// Merge a branch into main under a change ticket
    Merge(MergeArgs),
    /// Run the validation rules
    Validate(ValidateArgs),
    /// List current mappings between two component types
    Mappings(MappingsArgs),
}

#[derive(Args)]
pub struct BranchArgs {
    #[command(subcommand)]
    pub action: BranchAction,
}

#[derive(Subcommand)]
pub enum BranchAction {
    Create { owner: String },
    List,
    Delete { branch: String, owner: String },
}

#[derive(Args)]
pub struct BranchRef {
    pub branch: String,
}

#[derive(Args)]
pub struct MergeArgs {
    pub branch: String,
    pub ticket: String,
}

#[derive(Args)]
pub struct ValidateArgs {
    #[arg(short, long)]
    pub branch: Option<String>,
}

#[derive(Args)]
pub struct MappingsArgs {
    pub source_type: String,
    pub target_type: String,
    #[arg(short, long)]
    pub branch: Option<String>,
}

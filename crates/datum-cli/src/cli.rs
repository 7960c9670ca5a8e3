use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use datum_types::DEFAULT_SPACE;

#[derive(Parser)]
#[command(
    name = "datumd",
    about = "datum: token-addressed configuration documents over HTTP",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Toml,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Read a value from a local data directory
    Get(GetArgs),
    /// Write a value into a local data directory
    Set(SetArgs),
    /// Delete a value from a local data directory
    Delete(DeleteArgs),
    /// Mint a fresh token
    Token,
    /// Register a single-use alias for a token
    Onetime(AliasArgs),
    /// Register a durable view alias for a token
    View(AliasArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on [default: 0.0.0.0:80]
    #[arg(long)]
    pub addr: Option<SocketAddr>,
    /// Data directory [default: config]
    #[arg(long)]
    pub dir: Option<PathBuf>,
    /// TOML config file; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct StoreArgs {
    #[arg(long, default_value = "config")]
    pub dir: PathBuf,
}

#[derive(Args)]
pub struct TargetArgs {
    pub token: String,
    /// Dotted key path; empty for the whole space
    #[arg(default_value = "")]
    pub path: String,
    #[arg(short, long, default_value = DEFAULT_SPACE)]
    pub space: String,
}

#[derive(Args)]
pub struct GetArgs {
    #[command(flatten)]
    pub target: TargetArgs,
    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Args)]
pub struct SetArgs {
    pub token: String,
    pub path: String,
    pub value: String,
    #[arg(short, long, default_value = DEFAULT_SPACE)]
    pub space: String,
    /// Parse the value as JSON
    #[arg(long, conflicts_with = "key_id")]
    pub json: bool,
    /// Store the value as ciphertext under this key id
    #[arg(long)]
    pub key_id: Option<String>,
    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Args)]
pub struct DeleteArgs {
    pub token: String,
    pub path: String,
    #[arg(short, long, default_value = DEFAULT_SPACE)]
    pub space: String,
    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Args)]
pub struct AliasArgs {
    pub parent: String,
    #[command(flatten)]
    pub store: StoreArgs,
}

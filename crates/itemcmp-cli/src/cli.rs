use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "itemcmp",
    about = "itemcmp: product catalog with side-by-side comparison",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding product records [default: $STORAGE_PATH or "data"]
    #[arg(long, global = true)]
    pub storage_dir: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Dotenv file loaded into the environment, if present
    #[arg(long, global = true, default_value = "config.env")]
    pub env_file: PathBuf,

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
    /// Run the HTTP API server
    Serve(ServeArgs),
    /// Create the storage directory
    Init(InitArgs),
    /// List all products
    List(ListArgs),
    /// Show one product
    Show(ShowArgs),
    /// Show several products side by side
    Compare(CompareArgs),
    /// Delete a product owned by a seller
    Delete(DeleteArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on [default: $ITEMCMP_BIND or 0.0.0.0:8080]
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

#[derive(Args)]
pub struct InitArgs {}

#[derive(Args)]
pub struct ListArgs {}

#[derive(Args)]
pub struct ShowArgs {
    pub id: i64,
}

#[derive(Args)]
pub struct CompareArgs {
    #[arg(required = true)]
    pub ids: Vec<i64>,
}

#[derive(Args)]
pub struct DeleteArgs {
    pub id: i64,
    #[arg(long)]
    pub seller: String,
}

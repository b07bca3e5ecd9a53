//! Vector Search Sender
//!
//! Posts JSON request files to the vector search API (`/insert`, `/search`,
//! `/delete`) and writes each response, or `{"error": ...}`, next to it.

use clap::Parser;
use core_config::Environment;
use core_config::tracing::{init_tracing, install_color_eyre};
use eyre::Result;
use std::path::PathBuf;
use tracing::info;

mod sender;

use sender::{Endpoint, Sender};

#[derive(Parser)]
#[command(name = "vecsearch-sender")]
#[command(about = "Send insert, search and delete requests to the vector search API")]
struct Cli {
    /// API host
    #[arg(long, default_value = "localhost")]
    host: String,

    /// API port
    #[arg(long, default_value_t = core_config::server::DEFAULT_PORT)]
    port: u16,

    /// Endpoint to call
    #[arg(long, value_enum)]
    endpoint: Endpoint,

    /// JSON file, or a directory of `*.json` files
    #[arg(long)]
    input_path: PathBuf,

    /// Response file, or a directory when the input is a directory
    #[arg(long)]
    output_path: PathBuf,

    /// Hits per query (search only)
    #[arg(long, default_value_t = 10)]
    count: usize,

    /// l2, cosine or dot (search only)
    #[arg(long, default_value = "l2")]
    measure_type: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();
    init_tracing(&Environment::from_env());

    let cli = Cli::parse();

    let sender = Sender::new(&cli.host, cli.port, cli.endpoint)?
        .with_search_params(cli.count, cli.measure_type);

    let summary = sender.process(&cli.input_path, &cli.output_path).await?;

    info!(
        "Done: {} files sent, {} failed",
        summary.succeeded, summary.failed
    );
    Ok(())
}

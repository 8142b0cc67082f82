use clap::Parser;
use log::{error, info};
use server::network::{Server, ServerConfig};
use server::words::WordList;
use std::path::PathBuf;
use std::time::Duration;

/// Command line arguments
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Server IP address to bind to
    #[clap(short = 'H', long, default_value = "127.0.0.1")]
    host: String,
    /// Server port to listen on
    #[clap(short, long, default_value = "3001")]
    port: u16,
    /// Maximum number of concurrent connections
    #[clap(short, long, default_value = "1024")]
    max_clients: usize,
    /// Seconds between sweeps of finished sessions
    #[clap(long, default_value = "30")]
    reap_interval: u64,
    /// Seconds a finished session is kept before it is reaped
    #[clap(long, default_value = "300")]
    finished_ttl: u64,
    /// File with one secret word per line (defaults to the built-in list)
    #[clap(short, long)]
    words: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();

    let words = match &args.words {
        Some(path) => {
            let list = WordList::from_file(path)?;
            info!("Loaded {} words from {}", list.len(), path.display());
            list
        }
        None => WordList::builtin(),
    };

    let config = ServerConfig {
        addr: format!("{}:{}", args.host, args.port),
        max_clients: args.max_clients,
        reap_interval: Duration::from_secs(args.reap_interval.max(1)),
        finished_ttl: Duration::from_secs(args.finished_ttl),
    };

    let mut server = Server::bind(config, Box::new(words)).await?;

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!("Server stopped with error: {}", e);
                return Err(e.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    Ok(())
}

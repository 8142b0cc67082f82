use clap::Parser;
use log::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server URL to connect to
    #[arg(short = 's', long, default_value = "ws://127.0.0.1:3001")]
    server: String,

    /// Display name shown to opponents and on the leaderboard
    #[arg(short = 'n', long, default_value = "")]
    name: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    info!("Connecting to: {}", args.server);
    println!(
        "Type a 5-letter guess, /find for a new game, /solo to play alone, /top for the leaderboard, /quit to leave"
    );

    client::network::run(&args.server, &args.name).await?;

    Ok(())
}

use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = fleet_relay::cli::Cli::parse();
    if let Err(e) = fleet_relay::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

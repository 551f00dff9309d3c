use clap::Parser;
use log::info;
use server::network::{Server, DEFAULT_MAX_DATAGRAMS};
use shared::{GameMode, MatchConfig, DEFAULT_PORT, TICK_RATE};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Interface to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// UDP port to listen on
    #[arg(short = 'p', long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Simulation ticks per second
    #[arg(short = 't', long, default_value_t = TICK_RATE)]
    tick_rate: u32,

    /// Match preset used until p1 configures the match
    #[arg(short = 'm', long, default_value_t = GameMode::Soccer)]
    mode: GameMode,

    /// Match length in seconds (0 keeps the preset)
    #[arg(short = 'd', long, default_value_t = 0)]
    duration: u32,

    /// Most datagrams read per tick; the rest wait for the next tick
    #[arg(long, default_value_t = DEFAULT_MAX_DATAGRAMS)]
    max_datagrams: usize,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    let tick_rate = args.tick_rate.max(1);
    let tick_duration = Duration::from_secs_f64(1.0 / f64::from(tick_rate));
    let config = MatchConfig::from_mode(args.mode).with_duration(args.duration);
    let addr = format!("{}:{}", args.host, args.port);

    info!("Starting server on {}", addr);
    info!(
        "Mode {} ({}s), {} Hz, up to {} datagrams per tick",
        config.mode, config.duration_secs, tick_rate, args.max_datagrams
    );

    let mut server = Server::new(&addr, tick_duration, config, args.max_datagrams).await?;
    server.run().await?;

    Ok(())
}

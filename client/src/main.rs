use clap::Parser;
use client::events::{AudioSink, LogAudio};
use client::game::{ClientGameState, Connection};
use client::input::{Command, InputManager};
use client::network::ClientNetwork;
use client::rendering::{HudInfo, Renderer};
use log::{error, info};
use macroquad::prelude::{next_frame, Conf};
use shared::{GameEvent, GameMode, MatchPhase, Packet, Slot, DEFAULT_PORT, PROTOCOL_VERSION};
use std::time::Instant;

/// Frames between `Join` retries while the server has not answered.
const JOIN_RETRY_FRAMES: u64 = 30;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value_t = format!("127.0.0.1:{}", DEFAULT_PORT))]
    server: String,

    /// Start the match when seated as p1 (host)
    #[arg(long)]
    host_config: bool,

    /// Match mode sent with --host-config
    #[arg(short = 'm', long, default_value_t = GameMode::Soccer)]
    mode: GameMode,

    /// Match length in seconds sent with --host-config (0 keeps the preset)
    #[arg(short = 'd', long, default_value_t = 0)]
    duration: u32,
}

fn window_conf() -> Conf {
    let (width, height) = Renderer::window_size();
    Conf {
        window_title: "Rocket Soccer".to_owned(),
        window_width: width,
        window_height: height,
        window_resizable: false,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    info!("Starting client...");
    info!("Connecting to: {}", args.server);
    info!("Controls: WASD/arrows to drive, Space/Shift to boost, P pause, R restart, Esc quit");

    let mut network = match ClientNetwork::connect(&args.server) {
        Ok(network) => network,
        Err(e) => {
            error!("Failed to set up networking: {}", e);
            return;
        }
    };

    let mut game = ClientGameState::new();
    let mut input = InputManager::new();
    let mut audio = LogAudio::default();
    let renderer = Renderer::new();
    let clock = Instant::now();
    let join = Packet::Join {
        protocol_version: PROTOCOL_VERSION,
    };
    let mut configured = !args.host_config;
    let mut frame: u64 = 0;

    loop {
        let now_ms = u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX);

        if !game.has_contact() && frame % JOIN_RETRY_FRAMES == 0 {
            network.send_or_warn(&join);
        }

        for packet in network.drain() {
            game.apply_packet(packet, now_ms);
        }

        if !configured && game.slot() == Some(Slot::P1) {
            network.send_or_warn(&Packet::Configure {
                mode: args.mode,
                duration_secs: args.duration,
            });
            configured = true;
        }

        let (controls, commands) = input.poll();
        let mut quit = false;
        for command in commands {
            audio.play(&GameEvent::Click);
            match command {
                Command::TogglePause => network.send_or_warn(&Packet::TogglePause),
                Command::Restart => {
                    if game.latest_phase() == Some(MatchPhase::GameOver) {
                        network.send_or_warn(&Packet::Restart);
                    }
                }
                Command::Quit => quit = true,
            }
        }
        if quit {
            network.send_or_warn(&Packet::Leave);
            info!("Leaving after {} frames", frame);
            break;
        }

        network.send_or_warn(&Packet::Input(controls));

        let (state, events) = game.frame(now_ms);
        for event in &events {
            audio.play(event);
        }

        let mode = match &game.connection {
            Connection::Seated { config, .. } => config.mode,
            _ => args.mode,
        };
        let hud = HudInfo {
            connection: &game.connection,
            server: args.server.clone(),
            mode,
        };
        renderer.render(&state, &hud);

        frame += 1;
        next_frame().await;
    }
}

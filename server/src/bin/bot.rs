//! Headless player for exercising a running server.
//!
//! Joins, then chases the ball towards the opposing goal with a little random
//! jitter so two bots do not lock into the same pattern.

use clap::Parser;
use log::{debug, info, warn};
use rand::Rng;
use shared::{
    EntityState, GameMode, InputVector, Packet, Side, Slot, Snapshot, MAX_PACKET_SIZE,
    PROTOCOL_VERSION, TICK_RATE,
};
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::{interval, timeout, MissedTickBehavior};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless bot player", long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:5555")]
    server: String,

    /// Seconds to play before leaving
    #[arg(long, default_value_t = 30)]
    seconds: u64,

    /// If given and seated as p1, start a match in this mode
    #[arg(short = 'm', long)]
    mode: Option<GameMode>,

    /// Match length sent with --mode (0 keeps the preset)
    #[arg(short = 'd', long, default_value_t = 0)]
    duration: u32,

    /// Probability per tick of pressing a random extra key
    #[arg(long, default_value_t = 0.05)]
    jitter: f64,
}

const DEAD_ZONE: f32 = 6.0;
/// How far behind the ball the bot lines up before pushing through it.
const APPROACH_OFFSET: f32 = 24.0;

/// Steers `me` to a point just behind the ball, on the side away from the goal
/// it attacks, so contact pushes the ball goalwards.
fn chase(me: &EntityState, ball: &EntityState, slot: Slot) -> InputVector {
    let attack_dir = match slot.home_side() {
        Side::Left => 1.0,
        Side::Right => -1.0,
    };
    let target_x = ball.x - attack_dir * APPROACH_OFFSET;
    let target_y = ball.y;

    let dx = target_x - me.x;
    let dy = target_y - me.y;
    InputVector {
        up: dy < -DEAD_ZONE,
        down: dy > DEAD_ZONE,
        left: dx < -DEAD_ZONE,
        right: dx > DEAD_ZONE,
        boost: dx.hypot(dy) > 200.0,
    }
}

fn jitter(mut input: InputVector, rng: &mut impl Rng, chance: f64) -> InputVector {
    if rng.gen_bool(chance) {
        match rng.gen_range(0..5) {
            0 => input.up = !input.up,
            1 => input.down = !input.down,
            2 => input.left = !input.left,
            3 => input.right = !input.right,
            _ => input.boost = !input.boost,
        }
    }
    input
}

async fn send(
    socket: &UdpSocket,
    packet: &Packet,
    server: SocketAddr,
) -> Result<(), Box<dyn std::error::Error>> {
    socket.send_to(&packet.encode()?, server).await?;
    Ok(())
}

async fn join(socket: &UdpSocket, server: SocketAddr) -> Result<Slot, Box<dyn std::error::Error>> {
    let mut buf = [0u8; MAX_PACKET_SIZE];
    let hello = Packet::Join {
        protocol_version: PROTOCOL_VERSION,
    };

    for attempt in 1..=10 {
        send(socket, &hello, server).await?;
        debug!("Join attempt {}", attempt);

        let Ok(received) = timeout(Duration::from_millis(500), socket.recv_from(&mut buf)).await
        else {
            continue;
        };
        let (len, _) = received?;
        match Packet::decode(&buf[..len]) {
            Ok(Packet::Welcome { slot, config }) => {
                info!("Seated as {} ({} mode)", slot, config.mode);
                return Ok(slot);
            }
            Ok(Packet::Rejected { reason }) => return Err(format!("rejected: {}", reason).into()),
            Ok(other) => debug!("Ignoring {} while joining", other.kind()),
            Err(e) => debug!("Bad datagram while joining: {}", e),
        }
    }

    Err("no answer from server".into())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let server: SocketAddr = args.server.parse()?;
    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    info!("Bot bound to {}, joining {}", socket.local_addr()?, server);

    let slot = join(&socket, server).await?;

    if let (Some(mode), Slot::P1) = (args.mode, slot) {
        send(
            &socket,
            &Packet::Configure {
                mode,
                duration_secs: args.duration,
            },
            server,
        )
        .await?;
    }

    let mut rng = rand::thread_rng();
    let mut buf = [0u8; MAX_PACKET_SIZE];
    let mut latest: Option<Snapshot> = None;
    let mut ticker = interval(Duration::from_secs_f64(1.0 / f64::from(TICK_RATE)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let total_ticks = args.seconds * u64::from(TICK_RATE);

    for _ in 0..total_ticks {
        ticker.tick().await;

        loop {
            match socket.try_recv_from(&mut buf) {
                Ok((len, _)) => {
                    if let Ok(Packet::Snapshot(snapshot)) = Packet::decode(&buf[..len]) {
                        if latest.as_ref().map_or(true, |s| snapshot.tick > s.tick) {
                            latest = Some(snapshot);
                        }
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) => {
                    warn!("Receive error: {}", e);
                    break;
                }
            }
        }

        let input = match &latest {
            Some(snapshot) => chase(snapshot.player(slot), &snapshot.ball, slot),
            None => InputVector::IDLE,
        };
        let input = jitter(input, &mut rng, args.jitter.clamp(0.0, 1.0));
        if let Err(e) = send(&socket, &Packet::Input(input), server).await {
            warn!("Failed to send input: {}", e);
        }
    }

    if let Some(snapshot) = &latest {
        info!(
            "Leaving at tick {}, score {}-{}",
            snapshot.tick, snapshot.score[0], snapshot.score[1]
        );
    }
    send(&socket, &Packet::Leave, server).await?;

    Ok(())
}

//! # Match Client Library
//!
//! Client side of the two-player arcade soccer match. The client is a viewer
//! with a keyboard: it sends its control vector every frame and draws whatever
//! the server says the world looks like. It never simulates physics itself.
//!
//! ## Interpolation
//!
//! Snapshots arrive at the server tick rate, out of order and with gaps. They
//! are buffered by server timestamp and the client renders a fixed 100 ms
//! behind the newest data, blending the two snapshots that bracket the render
//! time. With fewer than two snapshots, or with a render time older than
//! anything buffered, the buffer reports "not ready" and the client shows a
//! connecting screen rather than guessing.
//!
//! The server and client clocks are unrelated. The buffer estimates their
//! offset from the fastest delivery seen so far, which keeps the render time in
//! the server's time base.
//!
//! ## Module Organization
//!
//! - `sync`: snapshot buffer, clock offset and interpolation
//! - `game`: handshake state plus the buffer, sampled once per frame
//! - `events`: goal and match-over detection between frames, audio sink
//! - `input`: keyboard to control vector and edge-triggered commands
//! - `network`: non-blocking UDP transport
//! - `rendering`: macroquad shapes for the pitch, cars, ball and HUD
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::game::ClientGameState;
//! use client::network::ClientNetwork;
//! use shared::{InputVector, Packet, PROTOCOL_VERSION};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut network = ClientNetwork::connect("127.0.0.1:5555")?;
//! let mut game = ClientGameState::new();
//! network.send(&Packet::Join { protocol_version: PROTOCOL_VERSION })?;
//!
//! let start = std::time::Instant::now();
//! loop {
//!     let now_ms = start.elapsed().as_millis() as u64;
//!     for packet in network.drain() {
//!         game.apply_packet(packet, now_ms);
//!     }
//!     network.send(&Packet::Input(InputVector::default()))?;
//!
//!     let (state, _events) = game.frame(now_ms);
//!     if let Some(snapshot) = state.snapshot() {
//!         println!("ball at {:.0},{:.0}", snapshot.ball.x, snapshot.ball.y);
//!     }
//!     std::thread::sleep(std::time::Duration::from_millis(16));
//! }
//! # }
//! ```

pub mod events;
pub mod game;
pub mod input;
pub mod network;
pub mod rendering;
pub mod sync;

//! # Match Server Library
//!
//! Authoritative server for the two-player arcade soccer match. The server owns
//! the only writable copy of the world: clients send control vectors and receive
//! a full snapshot every tick.
//!
//! ## Tick
//!
//! Each tick runs the same fixed sequence on a single task:
//!
//! 1. Drain queued datagrams without blocking, up to a per-tick cap. Excess
//!    datagrams stay in the socket for the next tick.
//! 2. Apply the latest input held for each slot to that slot's car.
//! 3. Step cars, keepers and ball, resolve collisions, check for goals. This is
//!    skipped while paused, after the final whistle and during the post-goal
//!    freeze.
//! 4. Unicast one encoded snapshot to every bound address.
//!
//! Delivery is fire and forget. Nothing is acknowledged or retransmitted, and a
//! lost input is covered by the previous one, which stays applied until
//! replaced.
//!
//! ## Slots
//!
//! The first two addresses to join or send input are bound to `p1` and `p2`.
//! A third address is rejected. Bindings are never released, so a client that
//! restarts from a new port cannot take its seat back.
//!
//! ## Modules
//!
//! - `client_manager`: slot registry and latest input per slot
//! - `match_state`: score, goal freeze, pausable match clock
//! - `game`: the world and its per-tick update
//! - `network`: socket handling and the tick loop
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::{Server, DEFAULT_MAX_DATAGRAMS};
//! use shared::MatchConfig;
//! use std::time::Duration;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut server = Server::new(
//!         "0.0.0.0:5555",
//!         Duration::from_secs_f64(1.0 / 60.0),
//!         MatchConfig::default(),
//!         DEFAULT_MAX_DATAGRAMS,
//!     )
//!     .await?;
//!
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod client_manager;
pub mod game;
pub mod match_state;
pub mod network;

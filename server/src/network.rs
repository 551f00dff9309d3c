//! UDP front end and the fixed-rate tick loop.

use crate::client_manager::{Admission, ClientManager};
use crate::game::GameState;
use log::{debug, error, info, warn};
use shared::{GameEvent, MatchConfig, Packet, Slot, MAX_PACKET_SIZE, PROTOCOL_VERSION};
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;
use tokio::time::{interval, MissedTickBehavior};

/// Default cap on datagrams read in one tick.
pub const DEFAULT_MAX_DATAGRAMS: usize = 64;

const STATS_INTERVAL_TICKS: u64 = 300;

/// Authoritative server: owns the socket, the slot registry and the world.
///
/// Everything runs on the task that drives [`run`](Server::run), so no state is
/// shared and nothing is locked.
pub struct Server {
    socket: UdpSocket,
    clients: ClientManager,
    game_state: GameState,
    tick_duration: Duration,
    max_datagrams: usize,
    started_at: Instant,
}

impl Server {
    pub async fn new(
        addr: &str,
        tick_duration: Duration,
        config: MatchConfig,
        max_datagrams: usize,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let socket = UdpSocket::bind(addr).await?;
        info!("Server listening on {}", socket.local_addr()?);

        Ok(Server {
            socket,
            clients: ClientManager::new(),
            game_state: GameState::new(config),
            tick_duration,
            max_datagrams: max_datagrams.max(1),
            started_at: Instant::now(),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn game_state(&self) -> &GameState {
        &self.game_state
    }

    pub fn clients(&self) -> &ClientManager {
        &self.clients
    }

    /// Milliseconds since the server started, the time base of every snapshot.
    fn server_time_ms(&self) -> u64 {
        u64::try_from(self.started_at.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Applies one decoded packet. Returns the reply for the sender, if any.
    pub fn handle_packet(&mut self, packet: Packet, addr: SocketAddr, now: Instant) -> Option<Packet> {
        match packet {
            Packet::Join { protocol_version } => {
                if protocol_version != PROTOCOL_VERSION {
                    warn!(
                        "Rejecting {}: protocol {} (expected {})",
                        addr, protocol_version, PROTOCOL_VERSION
                    );
                    return Some(Packet::Rejected {
                        reason: format!(
                            "protocol version {} is not supported (server speaks {})",
                            protocol_version, PROTOCOL_VERSION
                        ),
                    });
                }

                match self.clients.admit(addr) {
                    Admission::Bound(slot) | Admission::Known(slot) => Some(Packet::Welcome {
                        slot,
                        config: self.game_state.config,
                    }),
                    Admission::Full => {
                        info!("Rejecting {}: both slots are taken", addr);
                        Some(Packet::Rejected {
                            reason: "server full".to_string(),
                        })
                    }
                }
            }

            Packet::Input(input) => {
                if self.clients.record_input(addr, input).is_none() {
                    // Input doubles as registration for clients that never joined.
                    match self.clients.admit(addr) {
                        Admission::Full => debug!("Dropping input from unbound {}", addr),
                        _ => {
                            self.clients.record_input(addr, input);
                        }
                    }
                }
                None
            }

            Packet::Configure {
                mode,
                duration_secs,
            } => {
                if self.clients.find_slot_by_addr(addr) != Some(Slot::P1) {
                    warn!("Ignoring configure from {}: only p1 may configure", addr);
                    return None;
                }
                let config = MatchConfig::from_mode(mode).with_duration(duration_secs);
                self.game_state.reconfigure(config, now);
                Some(Packet::Welcome {
                    slot: Slot::P1,
                    config,
                })
            }

            Packet::TogglePause => {
                let Some(slot) = self.clients.find_slot_by_addr(addr) else {
                    warn!("Ignoring pause from unbound {}", addr);
                    return None;
                };
                match self.game_state.toggle_pause(now) {
                    Some(phase) => info!("{} toggled pause: now {:?}", slot, phase),
                    None => debug!("Pause from {} ignored in current phase", slot),
                }
                None
            }

            Packet::Restart => {
                if self.clients.find_slot_by_addr(addr) != Some(Slot::P1) {
                    warn!("Ignoring restart from {}: only p1 may restart", addr);
                    return None;
                }
                self.game_state.restart(now);
                None
            }

            Packet::Leave => {
                match self.clients.find_slot_by_addr(addr) {
                    Some(slot) => info!("{} ({}) left; the slot stays reserved", slot, addr),
                    None => debug!("Leave from unbound {}", addr),
                }
                None
            }

            other => {
                warn!("Unexpected {} packet from {}", other.kind(), addr);
                None
            }
        }
    }

    async fn send_packet(&self, packet: &Packet, addr: SocketAddr) {
        match packet.encode() {
            Ok(data) => {
                if let Err(e) = self.socket.send_to(&data, addr).await {
                    warn!("Failed to send {} to {}: {}", packet.kind(), addr, e);
                }
            }
            Err(e) => error!("Failed to encode {}: {}", packet.kind(), e),
        }
    }

    /// Reads whatever is queued on the socket, up to the per-tick cap.
    /// Anything beyond the cap stays queued for the next tick.
    pub async fn receive_pending(&mut self, now: Instant) -> usize {
        // One spare byte so an oversized datagram shows up as too long
        // instead of being silently truncated to the limit.
        let mut buffer = [0u8; MAX_PACKET_SIZE + 1];
        let mut handled = 0;

        for _ in 0..self.max_datagrams {
            let (len, addr) = match self.socket.try_recv_from(&mut buffer) {
                Ok(received) => received,
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) => {
                    debug!("Receive error: {}", e);
                    continue;
                }
            };

            if len > MAX_PACKET_SIZE {
                debug!("Dropping oversized datagram from {}", addr);
                continue;
            }

            let packet = match Packet::decode(&buffer[..len]) {
                Ok(packet) => packet,
                Err(e) => {
                    debug!("Dropping datagram from {}: {}", addr, e);
                    continue;
                }
            };

            handled += 1;
            if let Some(reply) = self.handle_packet(packet, addr, now) {
                self.send_packet(&reply, addr).await;
            }
        }

        handled
    }

    /// Unicasts the current world to every bound address.
    async fn broadcast_snapshot(&self) {
        if self.clients.is_empty() {
            return;
        }

        let packet = Packet::Snapshot(self.game_state.snapshot(self.server_time_ms()));
        let data = match packet.encode() {
            Ok(data) => data,
            Err(e) => {
                error!("Failed to encode snapshot: {}", e);
                return;
            }
        };

        for (slot, addr) in self.clients.client_addrs() {
            if let Err(e) = self.socket.send_to(&data, addr).await {
                warn!("Failed to send snapshot to {} at {}: {}", slot, addr, e);
            }
        }
    }

    /// One full server tick: drain, simulate, broadcast.
    pub async fn tick(&mut self) -> Vec<GameEvent> {
        let now = Instant::now();
        self.receive_pending(now).await;

        let inputs = self.clients.latest_inputs();
        let events = self.game_state.tick(inputs, now);
        self.broadcast_snapshot().await;

        let tick = self.game_state.tick;
        if tick % STATS_INTERVAL_TICKS == 0 {
            let score = self.game_state.match_state.score;
            debug!(
                "Tick {}: {} clients, score {}-{}, {:.0}s left",
                tick,
                self.clients.len(),
                score[0],
                score[1],
                self.game_state.match_state.time_left()
            );
        }

        events
    }

    /// Ticks at the configured rate until Ctrl-C.
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let mut tick_interval = interval(self.tick_duration);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        info!(
            "Server started: {} mode, {:.1} Hz",
            self.game_state.config.mode,
            1.0 / self.tick_duration.as_secs_f64()
        );

        loop {
            tokio::select! {
                _ = tick_interval.tick() => {
                    self.tick().await;
                }
                result = &mut shutdown => {
                    if let Err(e) = result {
                        error!("Failed to listen for shutdown signal: {}", e);
                    }
                    info!("Server shutting down after {} ticks", self.game_state.tick);
                    break;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{GameMode, InputVector, MatchPhase};
    use tokio_test::assert_ok;

    fn addr(port: u16) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], port))
    }

    async fn test_server() -> Server {
        assert_ok!(
            Server::new(
                "127.0.0.1:0",
                Duration::from_millis(16),
                MatchConfig::default(),
                DEFAULT_MAX_DATAGRAMS,
            )
            .await
        )
    }

    fn join() -> Packet {
        Packet::Join {
            protocol_version: PROTOCOL_VERSION,
        }
    }

    #[tokio::test]
    async fn test_join_assigns_slots_then_rejects() {
        let mut server = test_server().await;
        let now = Instant::now();

        let reply = server.handle_packet(join(), addr(7001), now);
        assert!(matches!(reply, Some(Packet::Welcome { slot: Slot::P1, .. })));

        let reply = server.handle_packet(join(), addr(7002), now);
        assert!(matches!(reply, Some(Packet::Welcome { slot: Slot::P2, .. })));

        let reply = server.handle_packet(join(), addr(7003), now);
        assert!(matches!(reply, Some(Packet::Rejected { .. })));
        assert_eq!(server.clients().len(), 2);
    }

    #[tokio::test]
    async fn test_join_with_wrong_version_is_rejected() {
        let mut server = test_server().await;
        let reply = server.handle_packet(
            Packet::Join {
                protocol_version: PROTOCOL_VERSION + 1,
            },
            addr(7001),
            Instant::now(),
        );
        assert!(matches!(reply, Some(Packet::Rejected { .. })));
        assert!(server.clients().is_empty());
    }

    #[tokio::test]
    async fn test_input_binds_unknown_sender() {
        let mut server = test_server().await;
        let input = InputVector {
            right: true,
            ..Default::default()
        };

        assert_eq!(server.handle_packet(Packet::Input(input), addr(7001), Instant::now()), None);

        assert_eq!(server.clients().find_slot_by_addr(addr(7001)), Some(Slot::P1));
        assert_eq!(server.clients().latest_inputs()[0], input);
    }

    #[tokio::test]
    async fn test_configure_only_from_p1() {
        let mut server = test_server().await;
        let now = Instant::now();
        server.handle_packet(join(), addr(7001), now);
        server.handle_packet(join(), addr(7002), now);
        let configure = Packet::Configure {
            mode: GameMode::Hockey,
            duration_secs: 60,
        };

        assert_eq!(server.handle_packet(configure.clone(), addr(7002), now), None);
        assert_eq!(server.game_state().match_state.phase(), MatchPhase::Warmup);

        let reply = server.handle_packet(configure, addr(7001), now);
        match reply {
            Some(Packet::Welcome { slot, config }) => {
                assert_eq!(slot, Slot::P1);
                assert_eq!(config.mode, GameMode::Hockey);
                assert_eq!(config.duration_secs, 60);
            }
            other => panic!("Expected welcome, got {:?}", other),
        }
        assert_eq!(server.game_state().match_state.phase(), MatchPhase::Playing);
        assert_eq!(server.game_state().config.mode, GameMode::Hockey);
    }

    #[tokio::test]
    async fn test_pause_from_either_slot_restart_from_p1() {
        let mut server = test_server().await;
        let now = Instant::now();
        server.handle_packet(join(), addr(7001), now);
        server.handle_packet(join(), addr(7002), now);
        server.handle_packet(
            Packet::Configure {
                mode: GameMode::Soccer,
                duration_secs: 0,
            },
            addr(7001),
            now,
        );

        server.handle_packet(Packet::TogglePause, addr(7002), now);
        assert_eq!(server.game_state().match_state.phase(), MatchPhase::Paused);

        server.handle_packet(Packet::TogglePause, addr(7009), now);
        assert_eq!(server.game_state().match_state.phase(), MatchPhase::Paused);

        server.handle_packet(Packet::Restart, addr(7002), now);
        assert_eq!(server.game_state().match_state.phase(), MatchPhase::Paused);

        server.handle_packet(Packet::Restart, addr(7001), now);
        assert_eq!(server.game_state().match_state.phase(), MatchPhase::Playing);
    }

    #[tokio::test]
    async fn test_leave_keeps_slot() {
        let mut server = test_server().await;
        let now = Instant::now();
        server.handle_packet(join(), addr(7001), now);

        assert_eq!(server.handle_packet(Packet::Leave, addr(7001), now), None);
        assert_eq!(server.clients().len(), 1);
    }

    #[tokio::test]
    async fn test_server_bound_packets_are_ignored() {
        let mut server = test_server().await;
        let reply = server.handle_packet(
            Packet::Rejected {
                reason: "echo".to_string(),
            },
            addr(7001),
            Instant::now(),
        );
        assert_eq!(reply, None);
        assert!(server.clients().is_empty());
    }

    #[tokio::test]
    async fn test_tick_over_loopback() {
        let mut server = test_server().await;
        let server_addr = server.local_addr().unwrap();
        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        client
            .send_to(&join().encode().unwrap(), server_addr)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        server.tick().await;

        let mut buf = [0u8; MAX_PACKET_SIZE];
        let (len, _) = tokio::time::timeout(Duration::from_secs(1), client.recv_from(&mut buf))
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(
            Packet::decode(&buf[..len]).unwrap(),
            Packet::Welcome { slot: Slot::P1, .. }
        ));

        let (len, _) = tokio::time::timeout(Duration::from_secs(1), client.recv_from(&mut buf))
            .await
            .unwrap()
            .unwrap();
        match Packet::decode(&buf[..len]).unwrap() {
            Packet::Snapshot(snapshot) => assert_eq!(snapshot.tick, 1),
            other => panic!("Expected snapshot, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_garbage_datagrams_are_dropped() {
        let mut server = test_server().await;
        let server_addr = server.local_addr().unwrap();
        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        client.send_to(&[0xde, 0xad, 0xbe, 0xef], server_addr).await.unwrap();
        client.send_to(&[], server_addr).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(server.receive_pending(Instant::now()).await, 0);
        assert!(server.clients().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_datagram_is_dropped() {
        let mut server = test_server().await;
        let server_addr = server.local_addr().unwrap();
        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        let mut padded = join().encode().unwrap();
        padded.resize(4000, 0xAB);
        client.send_to(&padded, server_addr).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(server.receive_pending(Instant::now()).await, 0);
        assert!(server.clients().is_empty());
    }

    #[tokio::test]
    async fn test_datagram_cap_defers_excess() {
        let mut server = assert_ok!(
            Server::new(
                "127.0.0.1:0",
                Duration::from_millis(16),
                MatchConfig::default(),
                2,
            )
            .await
        );
        let server_addr = server.local_addr().unwrap();
        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let input = Packet::Input(InputVector::default()).encode().unwrap();

        for _ in 0..5 {
            client.send_to(&input, server_addr).await.unwrap();
        }
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(server.receive_pending(Instant::now()).await, 2);
        assert_eq!(server.receive_pending(Instant::now()).await, 2);
        assert_eq!(server.receive_pending(Instant::now()).await, 1);
        let received = server
            .clients()
            .get(Slot::P1)
            .map(|client| client.inputs_received);
        assert_eq!(received, Some(5));
    }
}

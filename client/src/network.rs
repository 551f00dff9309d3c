//! Non-blocking UDP transport to the match server.
//!
//! The window loop owns the thread, so the socket is a plain std socket in
//! non-blocking mode, drained once per frame. The server runs on tokio; the
//! client has no async runtime and never waits on the socket.
//!
//! The receive buffer is one byte larger than `MAX_PACKET_SIZE`, so an
//! oversized datagram arrives too long and is dropped rather than truncated.

use log::{debug, info, warn};
use shared::{Packet, MAX_PACKET_SIZE};
use std::io::ErrorKind;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

/// Most datagrams read in a single frame.
const MAX_DRAIN_PER_FRAME: usize = 256;

pub struct ClientNetwork {
    socket: UdpSocket,
    server_addr: SocketAddr,
    buffer: Vec<u8>,
}

impl ClientNetwork {
    /// Resolves `server` and binds an ephemeral local port of the same family.
    pub fn connect(server: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let server_addr = server
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| format!("could not resolve {}", server))?;

        let local = if server_addr.is_ipv4() {
            "0.0.0.0:0"
        } else {
            "[::]:0"
        };
        let socket = UdpSocket::bind(local)?;
        socket.set_nonblocking(true)?;
        info!("Bound {} for server {}", socket.local_addr()?, server_addr);

        Ok(Self {
            socket,
            server_addr,
            buffer: vec![0u8; MAX_PACKET_SIZE + 1],
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn send(&self, packet: &Packet) -> Result<(), Box<dyn std::error::Error>> {
        let data = packet.encode()?;
        match self.socket.send_to(&data, self.server_addr) {
            Ok(_) => Ok(()),
            // A full send buffer just loses this datagram.
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                debug!("Send buffer full, dropped {}", packet.kind());
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Sends and logs failures instead of returning them.
    pub fn send_or_warn(&self, packet: &Packet) {
        if let Err(e) = self.send(packet) {
            warn!("Failed to send {}: {}", packet.kind(), e);
        }
    }

    /// Every decodable packet from the server queued right now. Never blocks.
    pub fn drain(&mut self) -> Vec<Packet> {
        let mut packets = Vec::new();

        for _ in 0..MAX_DRAIN_PER_FRAME {
            let (len, from) = match self.socket.recv_from(&mut self.buffer) {
                Ok(received) => received,
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) => {
                    // ICMP port unreachable surfaces here while the server is down.
                    debug!("Receive error: {}", e);
                    continue;
                }
            };

            if from != self.server_addr {
                debug!("Ignoring datagram from {}", from);
                continue;
            }

            if len > MAX_PACKET_SIZE {
                debug!("Dropping oversized datagram from {}", from);
                continue;
            }

            match Packet::decode(&self.buffer[..len]) {
                Ok(packet) => packets.push(packet),
                Err(e) => debug!("Dropping datagram: {}", e),
            }
        }

        packets
    }
}

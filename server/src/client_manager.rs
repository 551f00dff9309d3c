//! Slot registry for the two human players.
//!
//! The first two distinct addresses that join (or simply start sending input)
//! are bound to `p1` and `p2` in that order. Bindings last for the lifetime of
//! the server process: there is no timeout and no reconnect, and any further
//! address is turned away.

use log::info;
use shared::{InputVector, Slot};
use std::net::SocketAddr;

/// A bound player seat.
#[derive(Debug, Clone)]
pub struct Client {
    pub slot: Slot,
    /// Where snapshots for this slot are sent.
    pub addr: SocketAddr,
    /// Most recent control vector. It is applied every tick until replaced.
    pub latest_input: InputVector,
    pub inputs_received: u64,
}

impl Client {
    pub fn new(slot: Slot, addr: SocketAddr) -> Self {
        Self {
            slot,
            addr,
            latest_input: InputVector::default(),
            inputs_received: 0,
        }
    }

    pub fn record_input(&mut self, input: InputVector) {
        self.latest_input = input;
        self.inputs_received += 1;
    }
}

/// Result of presenting an address to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The address was just given this slot.
    Bound(Slot),
    /// The address already held this slot.
    Known(Slot),
    /// Both slots are taken by other addresses.
    Full,
}

impl Admission {
    pub fn slot(self) -> Option<Slot> {
        match self {
            Admission::Bound(slot) | Admission::Known(slot) => Some(slot),
            Admission::Full => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct ClientManager {
    slots: [Option<Client>; 2],
}

impl ClientManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks `addr` up and binds it to the first free slot if it is new.
    pub fn admit(&mut self, addr: SocketAddr) -> Admission {
        if let Some(slot) = self.find_slot_by_addr(addr) {
            return Admission::Known(slot);
        }

        for slot in Slot::ALL {
            let seat = &mut self.slots[slot.index()];
            if seat.is_none() {
                *seat = Some(Client::new(slot, addr));
                info!("Bound {} to slot {}", addr, slot);
                return Admission::Bound(slot);
            }
        }

        Admission::Full
    }

    pub fn find_slot_by_addr(&self, addr: SocketAddr) -> Option<Slot> {
        self.iter().find(|client| client.addr == addr).map(|c| c.slot)
    }

    pub fn get(&self, slot: Slot) -> Option<&Client> {
        self.slots[slot.index()].as_ref()
    }

    /// Stores the input for the slot bound to `addr`. Returns the slot, or
    /// `None` if the address holds no slot.
    pub fn record_input(&mut self, addr: SocketAddr, input: InputVector) -> Option<Slot> {
        let client = self
            .slots
            .iter_mut()
            .flatten()
            .find(|client| client.addr == addr)?;
        client.record_input(input);
        Some(client.slot)
    }

    /// Per-slot inputs for the next tick. Empty seats are idle.
    pub fn latest_inputs(&self) -> [InputVector; 2] {
        let mut inputs = [InputVector::IDLE; 2];
        for client in self.iter() {
            inputs[client.slot.index()] = client.latest_input;
        }
        inputs
    }

    /// Addresses of every bound slot, in slot order.
    pub fn client_addrs(&self) -> Vec<(Slot, SocketAddr)> {
        self.iter().map(|client| (client.slot, client.addr)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Client> {
        self.slots.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

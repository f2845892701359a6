//! Constructs a WakeOnLAN packet (so called "Magic Packet Technology") and
//! broadcasts it over UDP.
use std::io;
use std::net::{Ipv4Addr, SocketAddrV4, UdpSocket};

use thiserror::Error;
use tracing::debug;

use crate::mac::MacAddress;

const MAGIC_PACKET_LEN: usize = 102;
const SYNC_STREAM: [u8; 6] = [0xFF; 6];

/// Discard port, the usual WoL destination.
pub const WOL_PORT: u16 = 9;

/// IPv4 limited broadcast on the discard port.
pub const BROADCAST: SocketAddrV4 = SocketAddrV4::new(Ipv4Addr::BROADCAST, WOL_PORT);

pub struct MagicPacket([u8; MAGIC_PACKET_LEN]);

#[derive(Error, Debug)]
pub enum TransmitError {
    #[error("unable to open UDP socket: {0}")]
    Bind(#[source] io::Error),

    #[error("unable to enable broadcast on socket: {0}")]
    EnableBroadcast(#[source] io::Error),

    #[error("unable to send magic packet: {0}")]
    Send(#[source] io::Error),

    #[error("magic packet truncated, {0} of 102 bytes sent")]
    ShortSend(usize),
}

impl MagicPacket {
    /// Six bytes of `0xFF` followed by 16 copies of `mac`.
    pub fn new(mac: &MacAddress) -> Self {
        let mut packet = [0u8; MAGIC_PACKET_LEN];
        packet[..SYNC_STREAM.len()].copy_from_slice(&SYNC_STREAM);

        // fill the packet with 16 occurrences of the MAC
        // starting at the 7th byte
        for chunk in packet[SYNC_STREAM.len()..].chunks_exact_mut(6) {
            chunk.copy_from_slice(mac.as_bytes());
        }

        Self(packet)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Sends the packet as one datagram to `dest`, normally [`BROADCAST`].
    /// The socket lives only for this call and is closed on every path.
    pub fn send_to(&self, dest: SocketAddrV4) -> Result<(), TransmitError> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).map_err(TransmitError::Bind)?;
        socket
            .set_broadcast(true)
            .map_err(TransmitError::EnableBroadcast)?;

        let sent = socket.send_to(self.as_bytes(), dest).map_err(TransmitError::Send)?;
        if sent != MAGIC_PACKET_LEN {
            return Err(TransmitError::ShortSend(sent));
        }

        debug!(%dest, bytes = sent, "magic packet sent");
        Ok(())
    }
}

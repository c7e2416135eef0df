//! NSDP Datalink Layer
//!
//! UDP broadcast transport for NSDP. The client binds port 63321 and sends
//! requests to the interface broadcast address on port 63322; devices answer
//! back to 63321, usually themselves by broadcast.
//!
//! # Overview
//!
//! This module handles:
//! - Resolving an interface name to its IPv4 address, broadcast address and
//!   MAC address (the MAC goes into the request header)
//! - Socket setup: address reuse and broadcast permission, via `socket2`
//! - Broadcast send and deadline-bounded receive
//!
//! The receive path is shared-media: anything on the segment may land on
//! port 63321, so callers decode and filter what they read.

use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::time::Instant;

use network_interface::{Addr, NetworkInterface, NetworkInterfaceConfig};
use socket2::{Domain, Protocol, Socket, Type};
use thiserror::Error;

use crate::protocol::MacAddr;

/// Result type for datalink operations
pub type Result<T> = std::result::Result<T, DatalinkError>;

/// Errors that can occur during socket setup or transfer
#[derive(Debug, Error)]
pub enum DatalinkError {
    /// Network I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Interface enumeration failed
    #[error("network interface error: {0}")]
    Interface(#[from] network_interface::Error),
    /// No interface with the requested name
    #[error("network interface {0:?} not found")]
    InterfaceNotFound(String),
    /// Interface carries no IPv4 address
    #[error("interface {0:?} has no IPv4 address")]
    NoIpv4Address(String),
    /// Interface carries no usable MAC address
    #[error("interface {0:?} has no MAC address")]
    NoMacAddress(String),
}

/// UDP port the querying host binds
pub const CLIENT_PORT: u16 = 63321;

/// UDP port devices listen on
pub const DEVICE_PORT: u16 = 63322;

/// Largest frame the receive path accepts
pub const MAX_FRAME: usize = 1500;

/// Addressing details of one local interface
#[derive(Debug, Clone)]
pub struct InterfaceInfo {
    /// Interface name as given by the operating system
    pub name: String,
    /// First IPv4 address
    pub addr: Ipv4Addr,
    /// Broadcast address, 255.255.255.255 when the OS reports none
    pub broadcast: Ipv4Addr,
    /// Hardware address
    pub mac: MacAddr,
}

/// Look up a local interface by name.
pub fn resolve_interface(name: &str) -> Result<InterfaceInfo> {
    let interfaces = NetworkInterface::show()?;
    let interface = interfaces
        .into_iter()
        .find(|candidate| candidate.name == name)
        .ok_or_else(|| DatalinkError::InterfaceNotFound(name.to_string()))?;

    let mac = interface
        .mac_addr
        .as_deref()
        .and_then(|raw| raw.parse::<MacAddr>().ok())
        .filter(|mac| !mac.is_unspecified())
        .ok_or_else(|| DatalinkError::NoMacAddress(name.to_string()))?;

    let v4 = interface
        .addr
        .iter()
        .find_map(|addr| match addr {
            Addr::V4(v4) => Some(v4),
            _ => None,
        })
        .ok_or_else(|| DatalinkError::NoIpv4Address(name.to_string()))?;

    Ok(InterfaceInfo {
        name: interface.name,
        addr: v4.ip,
        broadcast: v4.broadcast.unwrap_or(Ipv4Addr::BROADCAST),
        mac,
    })
}

/// Broadcast socket bound to the NSDP client port
pub struct NsdpSocket {
    socket: UdpSocket,
    target: SocketAddrV4,
}

impl NsdpSocket {
    /// Bind the client port and aim at the interface broadcast address.
    pub fn open(interface: &InterfaceInfo) -> Result<Self> {
        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_reuse_address(true)?;
        socket.set_broadcast(true)?;
        let bind_addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, CLIENT_PORT));
        socket.bind(&bind_addr.into())?;

        Ok(NsdpSocket {
            socket: socket.into(),
            target: SocketAddrV4::new(interface.broadcast, DEVICE_PORT),
        })
    }

    /// Broadcast one frame to the device port.
    pub fn send(&self, frame: &[u8]) -> Result<()> {
        self.socket.send_to(frame, self.target)?;
        Ok(())
    }

    /// Receive one datagram, waiting no later than `deadline`.
    ///
    /// Returns `Ok(None)` once the deadline passes without traffic.
    pub fn recv_deadline(
        &self,
        buf: &mut [u8],
        deadline: Instant,
    ) -> Result<Option<(usize, SocketAddr)>> {
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            self.socket.set_read_timeout(Some(remaining))?;

            match self.socket.recv_from(buf) {
                Ok((len, source)) => return Ok(Some((len, source))),
                Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => {
                    continue
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

//! NSDP Client
//!
//! High-level query interface: broadcast device discovery, the
//! single-parameter read transaction the scan engine runs on, and the
//! best-effort identity lookups.
//!
//! Responses are matched on sequence number and device MAC; anything else
//! arriving on the shared port (foreign traffic, our own broadcast echo,
//! stale answers) is silently dropped until the caller's deadline passes.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use log::trace;
use thiserror::Error;

use crate::datalink::{self, DatalinkError, InterfaceInfo, NsdpSocket, MAX_FRAME};
use crate::param;
use crate::protocol::{MacAddr, Message, Operation, Tlv};
use crate::scan::{DeviceIdentity, Transaction};

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur during a query exchange
#[derive(Debug, Error)]
pub enum ClientError {
    /// Socket setup or transfer failed
    #[error("datalink error: {0}")]
    Datalink(#[from] DatalinkError),
    /// No matching response before the deadline
    #[error("no response from device within {0:?}")]
    Timeout(Duration),
    /// Device answered with a non-zero result code
    #[error("device reported error code 0x{0:04x}")]
    Device(u16),
}

/// Synchronous NSDP client bound to one network interface.
///
/// The client owns the socket and a wrapping sequence counter; it is not
/// reentrant, and a device scan borrows it exclusively for the duration.
pub struct NsdpClient {
    socket: NsdpSocket,
    interface: InterfaceInfo,
    sequence: u16,
}

impl NsdpClient {
    /// Open a client on the named interface.
    pub fn open(interface: &str) -> Result<Self> {
        let interface = datalink::resolve_interface(interface)?;
        let socket = NsdpSocket::open(&interface)?;
        // seed from the clock so restarts do not replay sequence numbers
        let sequence = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.subsec_micros() as u16)
            .unwrap_or(1);

        Ok(NsdpClient {
            socket,
            interface,
            sequence,
        })
    }

    /// Addressing details of the bound interface
    pub fn interface(&self) -> &InterfaceInfo {
        &self.interface
    }

    fn next_sequence(&mut self) -> u16 {
        self.sequence = self.sequence.wrapping_add(1);
        self.sequence
    }

    /// Broadcast a discovery request and collect every switch that answers
    /// before the deadline.
    ///
    /// The request asks for MAC, name and model; name and model stay
    /// absent on devices that do not answer those codes.
    pub fn discover(&mut self, timeout: Duration) -> Result<Vec<DeviceIdentity>> {
        let sequence = self.next_sequence();
        let mut request = Message::read_request(self.interface.mac, MacAddr::UNSPECIFIED, sequence);
        request.push(Tlv::empty(param::DEVICE_MAC));
        request.push(Tlv::empty(param::DEVICE_NAME));
        request.push(Tlv::empty(param::DEVICE_MODEL));
        self.socket.send(&request.encode())?;

        let deadline = Instant::now() + timeout;
        let mut devices: Vec<DeviceIdentity> = Vec::new();
        let mut buf = [0u8; MAX_FRAME];

        while let Some((len, source)) = self.socket.recv_deadline(&mut buf, deadline)? {
            let response = match Message::decode(&buf[..len]) {
                Ok(message) => message,
                Err(err) => {
                    trace!("ignoring undecodable frame from {}: {}", source, err);
                    continue;
                }
            };
            if response.header.operation != Operation::ReadResponse
                || response.header.sequence != sequence
            {
                continue;
            }

            let mac = response.header.device_mac;
            if mac.is_unspecified() || devices.iter().any(|known| known.mac == mac) {
                continue;
            }

            devices.push(DeviceIdentity {
                mac,
                name: response.get(param::DEVICE_NAME).and_then(decode_string),
                model: response.get(param::DEVICE_MODEL).and_then(decode_string),
            });
        }

        Ok(devices)
    }

    /// One read transaction: query `device` for a single parameter code.
    ///
    /// `Ok(Some(bytes))` is the first value the response carried for
    /// `param`; `Ok(None)` means the device answered without it.
    pub fn query_param(
        &mut self,
        device: MacAddr,
        param: u16,
        timeout: Duration,
    ) -> Result<Option<Vec<u8>>> {
        let response = self.exchange(device, param, timeout)?;
        Ok(response.get(param).map(|value| value.to_vec()))
    }

    /// Like [`query_param`](Self::query_param), but returns every value
    /// the response carried for `param`. Per-port parameters answer one
    /// TLV per port.
    pub fn query_param_all(
        &mut self,
        device: MacAddr,
        param: u16,
        timeout: Duration,
    ) -> Result<Vec<Vec<u8>>> {
        let response = self.exchange(device, param, timeout)?;
        Ok(response
            .get_all(param)
            .map(|value| value.to_vec())
            .collect())
    }

    /// Device name, best effort: `None` on any failure.
    pub fn get_name(&mut self, device: MacAddr, timeout: Duration) -> Option<String> {
        self.query_param(device, param::DEVICE_NAME, timeout)
            .ok()
            .flatten()
            .as_deref()
            .and_then(decode_string)
    }

    /// Device model, best effort: `None` on any failure.
    pub fn get_model(&mut self, device: MacAddr, timeout: Duration) -> Option<String> {
        self.query_param(device, param::DEVICE_MODEL, timeout)
            .ok()
            .flatten()
            .as_deref()
            .and_then(decode_string)
    }

    /// Borrow this client as a single-device scan session.
    pub fn session(&mut self, device: MacAddr) -> DeviceSession<'_> {
        DeviceSession {
            client: self,
            device,
        }
    }

    fn exchange(&mut self, device: MacAddr, param: u16, timeout: Duration) -> Result<Message> {
        let sequence = self.next_sequence();
        let mut request = Message::read_request(self.interface.mac, device, sequence);
        request.push(Tlv::empty(param));
        self.socket.send(&request.encode())?;

        let deadline = Instant::now() + timeout;
        let mut buf = [0u8; MAX_FRAME];

        while let Some((len, source)) = self.socket.recv_deadline(&mut buf, deadline)? {
            let response = match Message::decode(&buf[..len]) {
                Ok(message) => message,
                Err(err) => {
                    trace!("ignoring undecodable frame from {}: {}", source, err);
                    continue;
                }
            };
            if response.header.operation != Operation::ReadResponse
                || response.header.sequence != sequence
                || response.header.device_mac != device
            {
                continue;
            }
            if response.header.result != 0 {
                return Err(ClientError::Device(response.header.result));
            }
            return Ok(response);
        }

        Err(ClientError::Timeout(timeout))
    }
}

/// Exclusive borrow of a client aimed at one device, the form the scan
/// engine consumes.
pub struct DeviceSession<'a> {
    client: &'a mut NsdpClient,
    device: MacAddr,
}

impl Transaction for DeviceSession<'_> {
    type Error = ClientError;

    fn query_param(
        &mut self,
        param: u16,
        timeout: Duration,
    ) -> std::result::Result<Option<Vec<u8>>, ClientError> {
        self.client.query_param(self.device, param, timeout)
    }
}

/// Device-supplied text: NUL padding stripped, empty results discarded.
fn decode_string(value: &[u8]) -> Option<String> {
    let trimmed: Vec<u8> = value
        .iter()
        .copied()
        .take_while(|&byte| byte != 0)
        .collect();
    if trimmed.is_empty() {
        return None;
    }
    Some(String::from_utf8_lossy(&trimmed).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_string_strips_nul_padding() {
        assert_eq!(
            decode_string(b"GS108Tv3\0\0\0"),
            Some("GS108Tv3".to_string())
        );
        assert_eq!(decode_string(b"switch-1"), Some("switch-1".to_string()));
    }

    #[test]
    fn decode_string_rejects_empty_values() {
        assert_eq!(decode_string(b""), None);
        assert_eq!(decode_string(b"\0\0\0"), None);
    }
}

//! NSDP Wire Protocol
//!
//! This module implements the NSDP message framing: a fixed 32-byte header
//! followed by a sequence of Type-Length-Value entries, terminated by the
//! end-of-message marker. All multi-byte fields are big-endian.
//!
//! # Overview
//!
//! Every NSDP datagram has the same shape:
//!
//! ```text
//! offset  size  field
//! 0       1     protocol version (0x01)
//! 1       1     operation code
//! 2       2     result code (0 on success)
//! 4       4     reserved
//! 8       6     host MAC address
//! 14      6     device MAC address (zero for broadcast discovery)
//! 20      2     reserved
//! 22      2     sequence number
//! 24      4     signature "NSDP"
//! 28      4     reserved
//! 32      ...   TLV entries: type u16, length u16, value bytes
//! ...     4     end-of-message marker: type 0xFFFF, length 0
//! ```
//!
//! A read request carries zero-length TLVs naming the parameters to fetch;
//! the read response repeats the same types with their values filled in.
//! Per-port parameters answer one TLV per port, so a response may contain
//! several entries with the same type.
//!
//! # Example
//!
//! ```
//! use nsdp_rs::protocol::{MacAddr, Message, Tlv};
//!
//! let host: MacAddr = "02:00:00:aa:bb:cc".parse().unwrap();
//! let mut request = Message::read_request(host, MacAddr::UNSPECIFIED, 1);
//! request.push(Tlv::empty(0x0001));
//! let frame = request.encode();
//! let decoded = Message::decode(&frame).unwrap();
//! assert_eq!(decoded.header.sequence, 1);
//! ```

use std::fmt;
use std::str::FromStr;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors that can occur while encoding or decoding NSDP frames
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Frame shorter than the fixed header
    #[error("frame too short: {0} bytes")]
    FrameTooShort(usize),
    /// Signature field does not read "NSDP"
    #[error("bad protocol signature")]
    BadSignature,
    /// Version byte is not one this implementation speaks
    #[error("unsupported protocol version {0:#04x}")]
    UnsupportedVersion(u8),
    /// Operation code outside the known set
    #[error("unknown operation code {0:#04x}")]
    UnknownOperation(u8),
    /// TLV header or value runs past the end of the frame
    #[error("truncated TLV at offset {0}")]
    TruncatedTlv(usize),
    /// Frame body ended without the 0xFFFF/0 marker
    #[error("missing end-of-message marker")]
    MissingEndMarker,
    /// Text that is not a valid MAC address
    #[error("invalid MAC address: {0:?}")]
    InvalidMacAddress(String),
}

/// Protocol version spoken by this implementation
pub const PROTOCOL_VERSION: u8 = 0x01;

/// Fixed header length in bytes
pub const HEADER_LEN: usize = 32;

/// Signature carried at offset 24 of every frame
pub const SIGNATURE: [u8; 4] = *b"NSDP";

/// TLV type of the end-of-message marker
pub const TAG_END_OF_MESSAGE: u16 = 0xFFFF;

/// NSDP operation codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Operation {
    /// Query parameter values
    ReadRequest = 0x01,
    /// Answer to a read request
    ReadResponse = 0x02,
    /// Set parameter values
    WriteRequest = 0x03,
    /// Answer to a write request
    WriteResponse = 0x04,
}

impl TryFrom<u8> for Operation {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x01 => Ok(Operation::ReadRequest),
            0x02 => Ok(Operation::ReadResponse),
            0x03 => Ok(Operation::WriteRequest),
            0x04 => Ok(Operation::WriteResponse),
            _ => Err(ProtocolError::UnknownOperation(value)),
        }
    }
}

/// A 48-bit hardware address as carried in the NSDP header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    /// The all-zero address, used as the device field of broadcast requests.
    pub const UNSPECIFIED: MacAddr = MacAddr([0; 6]);

    /// Raw octets
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// True for the all-zero address
    pub fn is_unspecified(&self) -> bool {
        self.0 == [0; 6]
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            m[0], m[1], m[2], m[3], m[4], m[5]
        )
    }
}

impl FromStr for MacAddr {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        let mut octets = [0u8; 6];
        let mut parts = s.split(':');
        for octet in octets.iter_mut() {
            let part = parts
                .next()
                .ok_or_else(|| ProtocolError::InvalidMacAddress(s.to_string()))?;
            *octet = u8::from_str_radix(part, 16)
                .map_err(|_| ProtocolError::InvalidMacAddress(s.to_string()))?;
        }
        if parts.next().is_some() {
            return Err(ProtocolError::InvalidMacAddress(s.to_string()));
        }
        Ok(MacAddr(octets))
    }
}

/// Fixed NSDP message header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Operation code
    pub operation: Operation,
    /// Result code; devices answer 0 on success
    pub result: u16,
    /// MAC address of the querying host
    pub host_mac: MacAddr,
    /// MAC address of the target device, zero for broadcast
    pub device_mac: MacAddr,
    /// Sequence number echoed by the device
    pub sequence: u16,
}

impl Header {
    /// Append the 32-byte wire form to a buffer
    pub fn encode_into(&self, buf: &mut BytesMut) {
        buf.put_u8(PROTOCOL_VERSION);
        buf.put_u8(self.operation as u8);
        buf.put_u16(self.result);
        buf.put_bytes(0, 4);
        buf.put_slice(&self.host_mac.octets());
        buf.put_slice(&self.device_mac.octets());
        buf.put_bytes(0, 2);
        buf.put_u16(self.sequence);
        buf.put_slice(&SIGNATURE);
        buf.put_bytes(0, 4);
    }

    /// Decode the fixed header, consuming [`HEADER_LEN`] bytes
    pub fn decode(buf: &mut &[u8]) -> Result<Self> {
        if buf.remaining() < HEADER_LEN {
            return Err(ProtocolError::FrameTooShort(buf.remaining()));
        }

        let version = buf.get_u8();
        if version != PROTOCOL_VERSION {
            return Err(ProtocolError::UnsupportedVersion(version));
        }

        let operation = Operation::try_from(buf.get_u8())?;
        let result = buf.get_u16();
        buf.advance(4);

        let mut host_mac = [0u8; 6];
        buf.copy_to_slice(&mut host_mac);
        let mut device_mac = [0u8; 6];
        buf.copy_to_slice(&mut device_mac);

        buf.advance(2);
        let sequence = buf.get_u16();

        let mut signature = [0u8; 4];
        buf.copy_to_slice(&mut signature);
        if signature != SIGNATURE {
            return Err(ProtocolError::BadSignature);
        }
        buf.advance(4);

        Ok(Header {
            operation,
            result,
            host_mac: MacAddr(host_mac),
            device_mac: MacAddr(device_mac),
            sequence,
        })
    }
}

/// One Type-Length-Value entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tlv {
    /// 16-bit parameter code
    pub tag: u16,
    /// Raw value bytes; empty in read requests
    pub value: Vec<u8>,
}

impl Tlv {
    /// TLV carrying a value
    pub fn new(tag: u16, value: Vec<u8>) -> Self {
        Tlv { tag, value }
    }

    /// Zero-length TLV, the read-request form
    pub fn empty(tag: u16) -> Self {
        Tlv {
            tag,
            value: Vec::new(),
        }
    }
}

/// A complete NSDP message: header plus TLV body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: Header,
    pub tlvs: Vec<Tlv>,
}

impl Message {
    /// Build an empty read request addressed to `device_mac`
    pub fn read_request(host_mac: MacAddr, device_mac: MacAddr, sequence: u16) -> Self {
        Message {
            header: Header {
                operation: Operation::ReadRequest,
                result: 0,
                host_mac,
                device_mac,
                sequence,
            },
            tlvs: Vec::new(),
        }
    }

    /// Append a TLV to the body
    pub fn push(&mut self, tlv: Tlv) {
        self.tlvs.push(tlv);
    }

    /// First value for `tag`, if the body carries it
    pub fn get(&self, tag: u16) -> Option<&[u8]> {
        self.tlvs
            .iter()
            .find(|tlv| tlv.tag == tag)
            .map(|tlv| tlv.value.as_slice())
    }

    /// All values for `tag`, in body order
    pub fn get_all(&self, tag: u16) -> impl Iterator<Item = &[u8]> + '_ {
        self.tlvs
            .iter()
            .filter(move |tlv| tlv.tag == tag)
            .map(|tlv| tlv.value.as_slice())
    }

    /// Encode to wire form, end-of-message marker included
    pub fn encode(&self) -> Bytes {
        let body_len: usize = self.tlvs.iter().map(|tlv| 4 + tlv.value.len()).sum();
        let mut buf = BytesMut::with_capacity(HEADER_LEN + body_len + 4);

        self.header.encode_into(&mut buf);
        for tlv in &self.tlvs {
            buf.put_u16(tlv.tag);
            buf.put_u16(tlv.value.len() as u16);
            buf.put_slice(&tlv.value);
        }
        buf.put_u16(TAG_END_OF_MESSAGE);
        buf.put_u16(0);

        buf.freeze()
    }

    /// Decode a received frame.
    ///
    /// Bytes after the end-of-message marker are ignored; everything before
    /// it must parse, or the frame is rejected.
    pub fn decode(frame: &[u8]) -> Result<Self> {
        let mut buf = frame;
        let header = Header::decode(&mut buf)?;

        let mut tlvs = Vec::new();
        loop {
            let offset = frame.len() - buf.remaining();
            if buf.remaining() == 0 {
                return Err(ProtocolError::MissingEndMarker);
            }
            if buf.remaining() < 4 {
                return Err(ProtocolError::TruncatedTlv(offset));
            }

            let tag = buf.get_u16();
            let length = buf.get_u16() as usize;
            if tag == TAG_END_OF_MESSAGE {
                break;
            }
            if buf.remaining() < length {
                return Err(ProtocolError::TruncatedTlv(offset));
            }

            let value = buf.copy_to_bytes(length).to_vec();
            tlvs.push(Tlv { tag, value });
        }

        Ok(Message { header, tlvs })
    }
}

#![doc = include_str!("../README.md")]

pub mod client;
pub mod datalink;
pub mod param;
pub mod protocol;
pub mod scan;

// Re-export main types without glob imports to avoid conflicts
pub use client::{ClientError, DeviceSession, NsdpClient};
pub use datalink::{InterfaceInfo, NsdpSocket};
pub use protocol::{MacAddr, Message, Operation, ProtocolError, Tlv};
pub use scan::{
    run_scan, DeviceIdentity, Finding, ScanError, ScanOptions, ScanRange, ScanResult, Transaction,
};

/// Protocol version this crate speaks
pub const NSDP_PROTOCOL_VERSION: u8 = protocol::PROTOCOL_VERSION;
/// UDP port the querying host binds
pub const NSDP_CLIENT_PORT: u16 = datalink::CLIENT_PORT;
/// UDP port devices listen on
pub const NSDP_DEVICE_PORT: u16 = datalink::DEVICE_PORT;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_constants() {
        // the two well-known NSDP ports are adjacent
        assert_eq!(NSDP_CLIENT_PORT, 63321);
        assert_eq!(NSDP_DEVICE_PORT, 63322);
        assert_eq!(NSDP_PROTOCOL_VERSION, 1);
    }

    #[test]
    fn request_for_known_param_roundtrips() {
        let host = MacAddr([0x02, 0, 0, 0, 0, 0x01]);
        let mut request = Message::read_request(host, MacAddr::UNSPECIFIED, 99);
        request.push(Tlv::empty(param::PORT_STATUS));

        let decoded = Message::decode(&request.encode()).unwrap();
        assert_eq!(decoded.header.operation, Operation::ReadRequest);
        assert_eq!(decoded.get(param::PORT_STATUS), Some(&[][..]));
        assert_eq!(
            param::describe(param::PORT_STATUS),
            Some("Port Status (Link/Speed)")
        );
    }

    #[test]
    fn full_space_range_partitions_cleanly() {
        let range = ScanRange::new(0x0000, 0xFFFF).unwrap();
        let count: usize = range.batches(100).count();
        assert_eq!(count, 656); // 655 full batches and a final 36
        let total: u32 = range.batches(100).map(|batch| batch.len()).sum();
        assert_eq!(total, 65_536);
    }
}

//! Known NSDP Parameter Catalog
//!
//! Descriptions and value formatters for the parameter codes documented in
//! the field. This is configuration data, not behavior: the table is
//! immutable, loaded once, and kept wholly separate from the discovery
//! engine. A scan works correctly with an empty catalog; its unknown
//! identifiers merely lose their friendly label.

/// Device MAC address
pub const DEVICE_MAC: u16 = 0x0001;
/// Device name
pub const DEVICE_NAME: u16 = 0x0003;
/// Device model
pub const DEVICE_MODEL: u16 = 0x0004;
/// System location
pub const DEVICE_LOCATION: u16 = 0x0005;
/// Device IP address
pub const DEVICE_IP: u16 = 0x0006;
/// Subnet mask
pub const DEVICE_NETMASK: u16 = 0x0007;
/// Gateway IP address
pub const ROUTER_IP: u16 = 0x0008;
/// DHCP mode
pub const DHCP_MODE: u16 = 0x000B;
/// Firmware version, slot 1
pub const FW_VERSION_SLOT1: u16 = 0x000D;
/// Firmware version, slot 2
pub const FW_VERSION_SLOT2: u16 = 0x000E;
/// Next active firmware slot
pub const NEXT_FW_SLOT: u16 = 0x000F;
/// Port link status and speed
pub const PORT_STATUS: u16 = 0x0C00;
/// Port traffic statistics
pub const PORT_STATISTICS: u16 = 0x1000;
/// Cable tester results
pub const CABLE_TEST_RESULT: u16 = 0x1C00;
/// VLAN engine mode
pub const VLAN_ENGINE: u16 = 0x2000;
/// Port-based VLAN membership
pub const VLAN_MEMBERSHIP: u16 = 0x2400;
/// 802.1Q VLAN membership
pub const VLAN_802_1Q: u16 = 0x2800;
/// 802.1Q default VLAN (PVID)
pub const VLAN_PVID: u16 = 0x3000;
/// QoS engine mode
pub const QOS_ENGINE: u16 = 0x3400;
/// QoS port priority
pub const QOS_PRIORITY: u16 = 0x3800;
/// Ingress rate limit
pub const INGRESS_LIMIT: u16 = 0x4C00;
/// Egress rate limit
pub const EGRESS_LIMIT: u16 = 0x5000;
/// Broadcast filtering
pub const BCAST_FILTERING: u16 = 0x5400;
/// Storm control bandwidth
pub const STORM_CONTROL: u16 = 0x5800;
/// Port mirroring configuration
pub const PORT_MIRRORING: u16 = 0x5C00;
/// Number of available ports
pub const AVAILABLE_PORTS: u16 = 0x6000;
/// IGMP snooping status
pub const IGMP_SNOOPING: u16 = 0x6800;
/// Block unknown multicast
pub const BLOCK_UNKNOWN_MCAST: u16 = 0x6C00;
/// Validate IGMPv3 IP header
pub const VALIDATE_IGMPV3: u16 = 0x7000;
/// IGMP snooping static router ports
pub const IGMP_ROUTER_PORTS: u16 = 0x8000;
/// Loop detection
pub const LOOP_DETECTION: u16 = 0x9000;

/// Human-readable label for a parameter code, if it is a documented one.
pub fn describe(param: u16) -> Option<&'static str> {
    match param {
        DEVICE_MAC => Some("Device MAC Address"),
        DEVICE_NAME => Some("Device Name"),
        DEVICE_MODEL => Some("Device Model"),
        DEVICE_LOCATION => Some("System Location"),
        DEVICE_IP => Some("Device IP Address"),
        DEVICE_NETMASK => Some("Subnet Mask"),
        ROUTER_IP => Some("Gateway IP Address"),
        DHCP_MODE => Some("DHCP Mode"),
        FW_VERSION_SLOT1 => Some("Firmware Version (Slot 1)"),
        FW_VERSION_SLOT2 => Some("Firmware Version (Slot 2)"),
        NEXT_FW_SLOT => Some("Next Active Firmware Slot"),
        PORT_STATUS => Some("Port Status (Link/Speed)"),
        PORT_STATISTICS => Some("Port Statistics"),
        CABLE_TEST_RESULT => Some("Cable Tester Results"),
        VLAN_ENGINE => Some("VLAN Engine Mode"),
        VLAN_MEMBERSHIP => Some("VLAN Port Membership"),
        VLAN_802_1Q => Some("802.1Q VLAN Membership"),
        VLAN_PVID => Some("802.1Q PVID"),
        QOS_ENGINE => Some("QoS Engine Mode"),
        QOS_PRIORITY => Some("QoS Port Priority"),
        INGRESS_LIMIT => Some("Ingress Rate Limit"),
        EGRESS_LIMIT => Some("Egress Rate Limit"),
        BCAST_FILTERING => Some("Broadcast Filtering"),
        STORM_CONTROL => Some("Storm Control Bandwidth"),
        PORT_MIRRORING => Some("Port Mirroring Configuration"),
        AVAILABLE_PORTS => Some("Available Ports Count"),
        IGMP_SNOOPING => Some("IGMP Snooping Status"),
        BLOCK_UNKNOWN_MCAST => Some("Block Unknown Multicast"),
        VALIDATE_IGMPV3 => Some("Validate IGMPv3 IP Header"),
        IGMP_ROUTER_PORTS => Some("IGMP Router Ports"),
        LOOP_DETECTION => Some("Loop Detection"),
        _ => None,
    }
}

/// Decode a port status byte into link state and speed.
pub fn format_port_status(status: u8) -> String {
    match status {
        0x00 => "Down".to_string(),
        0x01 => "Up (10 Mbps Half-Duplex)".to_string(),
        0x02 => "Up (10 Mbps Full-Duplex)".to_string(),
        0x03 => "Up (100 Mbps Half-Duplex)".to_string(),
        0x04 => "Up (100 Mbps Full-Duplex)".to_string(),
        0x05 => "Up (1000 Mbps)".to_string(),
        other => format!("Unknown Status (0x{:02x})", other),
    }
}

/// Decode the VLAN engine mode byte.
pub fn format_vlan_engine_mode(mode: u8) -> String {
    match mode {
        0x00 => "Disabled".to_string(),
        0x01 => "Basic Port Based".to_string(),
        0x02 => "Advanced Port Based".to_string(),
        0x03 => "Basic 802.1Q".to_string(),
        0x04 => "Advanced 802.1Q".to_string(),
        other => format!("Unknown Mode (0x{:02x})", other),
    }
}

/// Decode the QoS engine mode byte.
pub fn format_qos_engine_mode(mode: u8) -> String {
    match mode {
        0x01 => "Port Based".to_string(),
        0x02 => "802.1p".to_string(),
        other => format!("Unknown Mode (0x{:02x})", other),
    }
}

/// Decode an enable flag; some firmware answers 0x03 for enabled.
pub fn format_enabled_disabled(value: u8) -> String {
    match value {
        0x00 => "Disabled".to_string(),
        0x01 | 0x03 => "Enabled".to_string(),
        other => format!("Unknown (0x{:02x})", other),
    }
}

/// Decode a rate-limit step value into its bandwidth.
pub fn format_rate_limit(step: u16) -> String {
    match step {
        0 => "No Limit".to_string(),
        1 => "512 Kbps".to_string(),
        2 => "1 Mbps".to_string(),
        3 => "2 Mbps".to_string(),
        4 => "4 Mbps".to_string(),
        5 => "8 Mbps".to_string(),
        6 => "16 Mbps".to_string(),
        7 => "32 Mbps".to_string(),
        8 => "64 Mbps".to_string(),
        9 => "128 Mbps".to_string(),
        10 => "256 Mbps".to_string(),
        11 => "512 Mbps".to_string(),
        other => format!("Unknown ({})", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_codes_have_labels() {
        assert_eq!(describe(PORT_STATUS), Some("Port Status (Link/Speed)"));
        assert_eq!(describe(AVAILABLE_PORTS), Some("Available Ports Count"));
        assert_eq!(describe(DEVICE_MAC), Some("Device MAC Address"));
    }

    #[test]
    fn unknown_codes_have_none() {
        assert_eq!(describe(0x8C00), None);
        assert_eq!(describe(0x1234), None);
    }

    #[test]
    fn port_status_formatting() {
        assert_eq!(format_port_status(0x00), "Down");
        assert_eq!(format_port_status(0x05), "Up (1000 Mbps)");
        assert_eq!(format_port_status(0x77), "Unknown Status (0x77)");
    }

    #[test]
    fn enable_flag_formatting() {
        assert_eq!(format_enabled_disabled(0x00), "Disabled");
        assert_eq!(format_enabled_disabled(0x01), "Enabled");
        assert_eq!(format_enabled_disabled(0x03), "Enabled");
        assert_eq!(format_enabled_disabled(0x42), "Unknown (0x42)");
    }

    #[test]
    fn rate_limit_steps() {
        assert_eq!(format_rate_limit(0), "No Limit");
        assert_eq!(format_rate_limit(5), "8 Mbps");
        assert_eq!(format_rate_limit(99), "Unknown (99)");
    }
}

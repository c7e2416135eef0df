//! NSDP switch information tool.
//!
//! Queries the documented parameters of every switch discovered on an
//! interface and prints a sectioned report: identification, network
//! configuration, firmware, port status, VLAN, QoS, IGMP, loop detection
//! and port mirroring.

use std::env;
use std::process::ExitCode;
use std::time::Duration;

use nsdp_rs::protocol::MacAddr;
use nsdp_rs::{param, NsdpClient};

struct Args {
    interface: String,
    timeout: Duration,
    verbose: bool,
}

fn usage() {
    eprintln!("Usage: nsdp_info -i <interface> [options]");
    eprintln!("Options:");
    eprintln!("  -i <interface>     network interface name (required)");
    eprintln!("  -t <seconds>       query timeout (default: 5)");
    eprintln!("  -v                 verbose output");
    eprintln!("  -h, --help         show this help message");
}

fn parse_args() -> Result<Option<Args>, String> {
    let mut args = Args {
        interface: String::new(),
        timeout: Duration::from_secs(5),
        verbose: false,
    };

    let mut raw = env::args().skip(1);
    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "-i" => {
                args.interface = raw.next().ok_or("missing value for -i")?;
            }
            "-t" => {
                let seconds: u64 = raw
                    .next()
                    .ok_or("missing value for -t")?
                    .parse()
                    .map_err(|_| "invalid -t value".to_string())?;
                args.timeout = Duration::from_secs(seconds);
            }
            "-v" => args.verbose = true,
            "-h" | "--help" => return Ok(None),
            other => return Err(format!("unknown argument: {:?}", other)),
        }
    }

    if args.interface.is_empty() {
        return Err("network interface name (-i) is required".into());
    }
    Ok(Some(args))
}

/// One best-effort parameter read; errors only surface under `-v`.
fn query(
    client: &mut NsdpClient,
    device: MacAddr,
    code: u16,
    timeout: Duration,
    verbose: bool,
) -> Option<Vec<u8>> {
    match client.query_param(device, code, timeout) {
        Ok(Some(value)) => Some(value),
        Ok(None) => {
            if verbose {
                println!("Parameter 0x{:04X}: no response", code);
            }
            None
        }
        Err(err) => {
            if verbose {
                let label = param::describe(code)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Parameter 0x{:04X}", code));
                println!("{}: Error - {}", label, err);
            }
            None
        }
    }
}

fn text(value: &[u8]) -> String {
    String::from_utf8_lossy(value)
        .trim_end_matches('\0')
        .to_string()
}

fn ipv4(value: &[u8]) -> Option<String> {
    if value.len() == 4 {
        Some(format!("{}.{}.{}.{}", value[0], value[1], value[2], value[3]))
    } else {
        None
    }
}

fn show_identification(
    client: &mut NsdpClient,
    device: MacAddr,
    timeout: Duration,
    verbose: bool,
) {
    println!("--- Device Identification ---");
    println!("Device MAC: {}", device);
    if let Some(value) = query(client, device, param::DEVICE_MODEL, timeout, verbose) {
        println!("Model: {}", text(&value));
    }
    if let Some(value) = query(client, device, param::DEVICE_NAME, timeout, verbose) {
        println!("Device Name: {}", text(&value));
    }
    if let Some(value) = query(client, device, param::DEVICE_LOCATION, timeout, verbose) {
        let location = text(&value);
        if !location.is_empty() {
            println!("Location: {}", location);
        }
    }
    if let Some(value) = query(client, device, param::FW_VERSION_SLOT1, timeout, verbose) {
        println!("Firmware Version (Slot 1): {}", text(&value));
    }
    if let Some(value) = query(client, device, param::FW_VERSION_SLOT2, timeout, verbose) {
        let version = text(&value);
        if !version.is_empty() {
            println!("Firmware Version (Slot 2): {}", version);
        }
    }
    if let Some(value) = query(client, device, param::NEXT_FW_SLOT, timeout, verbose) {
        if let Some(slot) = value.first() {
            println!("Next Active Slot: Slot {}", slot);
        }
    }
}

fn show_network_configuration(
    client: &mut NsdpClient,
    device: MacAddr,
    timeout: Duration,
    verbose: bool,
) {
    println!("\n--- Network Configuration ---");
    if let Some(addr) = query(client, device, param::DEVICE_IP, timeout, verbose)
        .as_deref()
        .and_then(ipv4)
    {
        println!("IP Address: {}", addr);
    }
    if let Some(mask) = query(client, device, param::DEVICE_NETMASK, timeout, verbose)
        .as_deref()
        .and_then(ipv4)
    {
        println!("Subnet Mask: {}", mask);
    }
    if let Some(gateway) = query(client, device, param::ROUTER_IP, timeout, verbose)
        .as_deref()
        .and_then(ipv4)
    {
        println!("Gateway: {}", gateway);
    }
    if let Some(value) = query(client, device, param::DHCP_MODE, timeout, verbose) {
        let mode = match value.first() {
            Some(0) => "Disabled".to_string(),
            Some(1) => "Enabled".to_string(),
            Some(other) => format!("Unknown ({})", other),
            None => return,
        };
        println!("DHCP: {}", mode);
    }
}

fn show_ports(client: &mut NsdpClient, device: MacAddr, timeout: Duration, verbose: bool) {
    println!("\n--- Port Information ---");
    if let Some(value) = query(client, device, param::AVAILABLE_PORTS, timeout, verbose) {
        if let Some(count) = value.first() {
            println!("Available Ports: {}", count);
        }
    }

    match client.query_param_all(device, param::PORT_STATUS, timeout) {
        Ok(entries) => {
            // one TLV per port: port number, status byte, trailing detail
            for entry in entries {
                if entry.len() >= 2 {
                    println!(
                        "Port {}: {}",
                        entry[0],
                        param::format_port_status(entry[1])
                    );
                }
            }
        }
        Err(err) => {
            if verbose {
                println!("Port Status: Error - {}", err);
            }
        }
    }
}

fn show_vlan(client: &mut NsdpClient, device: MacAddr, timeout: Duration, verbose: bool) {
    println!("\n--- VLAN Configuration ---");
    if let Some(value) = query(client, device, param::VLAN_ENGINE, timeout, verbose) {
        if let Some(mode) = value.first() {
            println!("VLAN Engine: {}", param::format_vlan_engine_mode(*mode));
        }
    }
    if let Some(value) = query(client, device, param::VLAN_802_1Q, timeout, verbose) {
        println!("802.1Q VLAN Data: {} bytes", value.len());
        if verbose {
            println!("  Raw data: {}", hex::encode(&value));
        }
    }
    if let Some(value) = query(client, device, param::VLAN_PVID, timeout, verbose) {
        println!("PVID Data: {} bytes", value.len());
        if verbose {
            println!("  Raw data: {}", hex::encode(&value));
        }
    }
}

fn show_qos(client: &mut NsdpClient, device: MacAddr, timeout: Duration, verbose: bool) {
    println!("\n--- Quality of Service ---");
    if let Some(value) = query(client, device, param::QOS_ENGINE, timeout, verbose) {
        if let Some(mode) = value.first() {
            println!("QoS Engine: {}", param::format_qos_engine_mode(*mode));
        }
    }
    if let Some(value) = query(client, device, param::QOS_PRIORITY, timeout, verbose) {
        println!("QoS Priority Data: {} bytes", value.len());
        if verbose {
            println!("  Raw data: {}", hex::encode(&value));
        }
    }
    for (code, label) in [
        (param::INGRESS_LIMIT, "Ingress Limit"),
        (param::EGRESS_LIMIT, "Egress Limit"),
    ] {
        if let Some(value) = query(client, device, code, timeout, verbose) {
            // per-port entries end in a 16-bit rate step
            if value.len() >= 2 {
                let step = u16::from_be_bytes([value[value.len() - 2], value[value.len() - 1]]);
                println!("{}: {}", label, param::format_rate_limit(step));
            } else {
                println!("{} Data: {} bytes", label, value.len());
            }
        }
    }
    if let Some(value) = query(client, device, param::BCAST_FILTERING, timeout, verbose) {
        if let Some(flag) = value.first() {
            println!(
                "Broadcast Filtering: {}",
                param::format_enabled_disabled(*flag)
            );
        }
    }
}

fn show_igmp(client: &mut NsdpClient, device: MacAddr, timeout: Duration, verbose: bool) {
    println!("\n--- IGMP Configuration ---");
    if let Some(value) = query(client, device, param::IGMP_SNOOPING, timeout, verbose) {
        if value.len() >= 4 {
            let vlan = u16::from_be_bytes([value[2], value[3]]);
            println!(
                "IGMP Snooping: {} (VLAN {})",
                param::format_enabled_disabled(value[1]),
                vlan
            );
        }
    }
    if let Some(value) = query(client, device, param::BLOCK_UNKNOWN_MCAST, timeout, verbose) {
        if let Some(flag) = value.first() {
            println!(
                "Block Unknown Multicast: {}",
                param::format_enabled_disabled(*flag)
            );
        }
    }
    if let Some(value) = query(client, device, param::VALIDATE_IGMPV3, timeout, verbose) {
        if let Some(flag) = value.first() {
            println!("Validate IGMPv3: {}", param::format_enabled_disabled(*flag));
        }
    }
    if let Some(value) = query(client, device, param::IGMP_ROUTER_PORTS, timeout, verbose) {
        println!("IGMP Router Ports Data: {} bytes", value.len());
        if verbose {
            println!("  Raw data: {}", hex::encode(&value));
        }
    }
}

fn show_loop_detection(
    client: &mut NsdpClient,
    device: MacAddr,
    timeout: Duration,
    verbose: bool,
) {
    println!("\n--- Loop Detection ---");
    if let Some(value) = query(client, device, param::LOOP_DETECTION, timeout, verbose) {
        if let Some(flag) = value.first() {
            println!("Loop Detection: {}", param::format_enabled_disabled(*flag));
        }
    }
}

fn show_port_mirroring(
    client: &mut NsdpClient,
    device: MacAddr,
    timeout: Duration,
    verbose: bool,
) {
    println!("\n--- Port Mirroring ---");
    if let Some(value) = query(client, device, param::PORT_MIRRORING, timeout, verbose) {
        if value.len() >= 4 && value.iter().any(|&byte| byte != 0) {
            println!("Port Mirroring: Enabled (Destination Port: {})", value[0]);
            if verbose {
                println!("  Raw configuration: {}", hex::encode(&value));
            }
        } else {
            println!("Port Mirroring: Disabled");
        }
    }
}

fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(Some(args)) => args,
        Ok(None) => {
            usage();
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("Error: {}", message);
            usage();
            return ExitCode::FAILURE;
        }
    };

    let filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let mut client = match NsdpClient::open(&args.interface) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("Error: {}", err);
            return ExitCode::FAILURE;
        }
    };

    println!("=== Netgear Switch Information ===");
    println!("Interface: {}", args.interface);
    println!("Timeout: {:?}", args.timeout);
    println!();

    let devices = match client.discover(args.timeout) {
        Ok(devices) => devices,
        Err(err) => {
            eprintln!("Error: failed to discover devices: {}", err);
            return ExitCode::FAILURE;
        }
    };

    if devices.is_empty() {
        println!("No NSDP devices found on the network.");
        println!();
        println!("Troubleshooting tips:");
        println!("- Ensure switches are on the same network segment");
        println!("- Verify switches support NSDP protocol");
        println!("- Try increasing timeout with -t flag");
        println!("- Use -v flag for verbose output");
        return ExitCode::FAILURE;
    }

    println!("Found {} NSDP device(s):", devices.len());
    println!();

    for (index, device) in devices.iter().enumerate() {
        println!("=== Device {} ===", index + 1);
        let mac = device.mac;
        show_identification(&mut client, mac, args.timeout, args.verbose);
        show_network_configuration(&mut client, mac, args.timeout, args.verbose);
        show_ports(&mut client, mac, args.timeout, args.verbose);
        show_vlan(&mut client, mac, args.timeout, args.verbose);
        show_qos(&mut client, mac, args.timeout, args.verbose);
        show_igmp(&mut client, mac, args.timeout, args.verbose);
        show_loop_detection(&mut client, mac, args.timeout, args.verbose);
        show_port_mirroring(&mut client, mac, args.timeout, args.verbose);
        println!();
    }

    ExitCode::SUCCESS
}

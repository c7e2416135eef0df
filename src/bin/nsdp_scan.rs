//! NSDP TLV discovery tool.
//!
//! Probes a range of the 16-bit TLV identifier space against every switch
//! discovered on an interface, in paced batches, and reports which codes
//! answered with data.

use std::env;
use std::process::ExitCode;
use std::time::Duration;

use log::warn;

use nsdp_rs::scan::{self, report};
use nsdp_rs::{NsdpClient, ScanOptions, ScanRange};

struct Args {
    interface: String,
    timeout: Duration,
    start: u16,
    end: u16,
    batch_size: u16,
    delay: Duration,
    output: Option<String>,
    verbose: bool,
}

fn usage() {
    eprintln!("Usage: nsdp_scan -i <interface> [options]");
    eprintln!("Options:");
    eprintln!("  -i <interface>     network interface name (required)");
    eprintln!("  -t <seconds>       per-query timeout (default: 10)");
    eprintln!("  --start <hex>      starting TLV hex value (default: 0000)");
    eprintln!("  --end <hex>        ending TLV hex value (default: FFFF)");
    eprintln!("  --batch <n>        TLVs to test per batch (default: 100)");
    eprintln!("  --delay <ms>       delay between batches (default: 100)");
    eprintln!("  -o <file>          output file for results");
    eprintln!("  -v                 verbose output");
    eprintln!("  -h, --help         show this help message");
}

fn parse_hex16(raw: &str, flag: &str) -> Result<u16, String> {
    let digits = raw.trim_start_matches("0x").trim_start_matches("0X");
    u16::from_str_radix(digits, 16).map_err(|_| format!("invalid {} hex value: {:?}", flag, raw))
}

fn parse_args() -> Result<Option<Args>, String> {
    let mut args = Args {
        interface: String::new(),
        timeout: Duration::from_secs(10),
        start: 0x0000,
        end: 0xFFFF,
        batch_size: 100,
        delay: Duration::from_millis(100),
        output: None,
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
            "--start" => {
                let value = raw.next().ok_or("missing value for --start")?;
                args.start = parse_hex16(&value, "--start")?;
            }
            "--end" => {
                let value = raw.next().ok_or("missing value for --end")?;
                args.end = parse_hex16(&value, "--end")?;
            }
            "--batch" => {
                args.batch_size = raw
                    .next()
                    .ok_or("missing value for --batch")?
                    .parse()
                    .map_err(|_| "invalid --batch value".to_string())?;
                if args.batch_size == 0 {
                    return Err("batch size must be at least 1".into());
                }
            }
            "--delay" => {
                let millis: u64 = raw
                    .next()
                    .ok_or("missing value for --delay")?
                    .parse()
                    .map_err(|_| "invalid --delay value".to_string())?;
                args.delay = Duration::from_millis(millis);
            }
            "-o" => {
                args.output = Some(raw.next().ok_or("missing value for -o")?);
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

    let range = match ScanRange::new(args.start, args.end) {
        Ok(range) => range,
        Err(err) => {
            eprintln!("Error: {}", err);
            return ExitCode::FAILURE;
        }
    };
    let options = ScanOptions {
        batch_size: args.batch_size,
        inter_batch_delay: args.delay,
        per_query_timeout: args.timeout,
    };

    println!("=== NSDP TLV Discovery Tool ===");
    println!("Interface: {}", args.interface);
    println!("Timeout: {:?}", args.timeout);
    println!(
        "Scanning range: 0x{:04X} to 0x{:04X} ({} TLVs)",
        range.start(),
        range.end(),
        range.len()
    );
    println!("Batch size: {}", options.batch_size);
    println!("Delay between batches: {:?}", options.inter_batch_delay);
    println!();

    let mut client = match NsdpClient::open(&args.interface) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("Error: {}", err);
            return ExitCode::FAILURE;
        }
    };

    println!("Discovering NSDP devices...");
    let devices = match client.discover(args.timeout) {
        Ok(devices) => devices,
        Err(err) => {
            eprintln!("Error: failed to discover devices: {}", err);
            return ExitCode::FAILURE;
        }
    };

    if devices.is_empty() {
        println!("No NSDP devices found");
        return ExitCode::FAILURE;
    }
    println!("Found {} device(s)", devices.len());
    println!();

    let multi_device = devices.len() > 1;
    for (index, device) in devices.into_iter().enumerate() {
        println!("=== Device {} ===", index + 1);

        // fill identity gaps the discovery response left
        let mut identity = device;
        if identity.name.is_none() {
            identity.name = client.get_name(identity.mac, args.timeout);
        }
        if identity.model.is_none() {
            identity.model = client.get_model(identity.mac, args.timeout);
        }

        println!("Device MAC: {}", identity.mac);
        if let Some(name) = &identity.name {
            println!("Device Name: {}", name);
        }
        if let Some(model) = &identity.model {
            println!("Device Model: {}", model);
        }
        println!();

        let mut session = client.session(identity.mac);
        let result = match scan::run_scan(&mut session, identity, range, &options) {
            Ok(result) => result,
            Err(err) => {
                eprintln!("Error: {}", err);
                return ExitCode::FAILURE;
            }
        };

        report::print_results(&result);

        if let Some(base) = &args.output {
            let path = if multi_device {
                report::indexed_filename(base, index + 1)
            } else {
                base.clone()
            };
            match report::save(&result, &path) {
                Ok(()) => println!("Results saved to: {}", path),
                Err(err) => warn!("failed to write report {}: {}", path, err),
            }
        }
        println!();
    }

    ExitCode::SUCCESS
}

//! Scan result reporting.
//!
//! Two renderings of the same [`ScanResult`]: a console summary for the
//! operator at the end of a scan, and a flat-text report suitable for
//! keeping. Interpretations are recomputed here from the raw bytes; they
//! are never stored on the findings.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::Utc;

use super::{interpretation, ScanResult};

/// Print the summary block and per-finding lines to stdout.
pub fn print_results(result: &ScanResult) {
    println!("=== Scan Results ===");
    println!("Total TLVs tested: {}", result.total_tested);
    println!("Valid TLVs found: {}", result.total_valid());
    println!("Success rate: {:.2}%", result.success_rate());
    println!("Scan duration: {:?}", result.duration);
    println!();

    if result.findings.is_empty() {
        return;
    }

    println!("=== Valid TLVs ===");
    for finding in &result.findings {
        println!(
            "0x{:04X} ({:5}): {:3} bytes - {}",
            finding.param,
            finding.param,
            finding.len(),
            finding.hex()
        );
        if let Some(text) = interpretation(&finding.value) {
            println!("                   Interpretation: {}", text);
        }
    }
}

/// Write the persistent report layout to `w`.
pub fn render<W: Write>(w: &mut W, result: &ScanResult) -> io::Result<()> {
    writeln!(w, "NSDP TLV Discovery Results")?;
    writeln!(w, "==========================")?;
    writeln!(
        w,
        "Scan Date: {}",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(w, "Device MAC: {}", result.identity.mac)?;
    if let Some(name) = &result.identity.name {
        writeln!(w, "Device Name: {}", name)?;
    }
    if let Some(model) = &result.identity.model {
        writeln!(w, "Device Model: {}", model)?;
    }
    writeln!(w, "Total TLVs Tested: {}", result.total_tested)?;
    writeln!(w, "Valid TLVs Found: {}", result.total_valid())?;
    writeln!(w, "Success Rate: {:.2}%", result.success_rate())?;
    writeln!(w, "Scan Duration: {:?}", result.duration)?;
    writeln!(w)?;

    writeln!(w, "Valid TLVs:")?;
    writeln!(w, "-----------")?;
    for finding in &result.findings {
        writeln!(w, "TLV: 0x{:04X} ({})", finding.param, finding.param)?;
        writeln!(w, "Length: {} bytes", finding.len())?;
        writeln!(w, "Hex Data: {}", finding.hex())?;
        if let Some(text) = interpretation(&finding.value) {
            writeln!(w, "Interpretation: {}", text)?;
        }
        writeln!(w)?;
    }

    Ok(())
}

/// Persist the report to `path`.
///
/// Callers are expected to log a failure and carry on; a report that
/// cannot be written must never abort the scan that already completed.
pub fn save<P: AsRef<Path>>(result: &ScanResult, path: P) -> io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    render(&mut file, result)?;
    file.flush()
}

/// Derive a per-device filename for multi-device runs by inserting the
/// device index before the extension, or appending it when the base name
/// has none.
pub fn indexed_filename(base: &str, index: usize) -> String {
    match base.rfind('.') {
        Some(dot) => format!("{}_device{}{}", &base[..dot], index, &base[dot..]),
        None => format!("{}_device{}", base, index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::MacAddr;
    use crate::scan::{DeviceIdentity, Finding, ScanRange};
    use std::time::Duration;

    fn sample_result() -> ScanResult {
        ScanResult {
            identity: DeviceIdentity {
                mac: MacAddr([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]),
                name: Some("NETGEAR-Switch".into()),
                model: Some("GS108Tv3".into()),
            },
            range: ScanRange::new(0x0000, 0x0063).unwrap(),
            findings: vec![
                Finding {
                    param: 0x0C00,
                    value: vec![0x01],
                },
                Finding {
                    param: 0x6000,
                    value: vec![0x08],
                },
                Finding {
                    param: 0x0001,
                    value: vec![0xDE, 0xAD, 0xBE],
                },
            ],
            total_tested: 100,
            duration: Duration::from_secs(42),
        }
    }

    #[test]
    fn report_layout() {
        let mut out = Vec::new();
        render(&mut out, &sample_result()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "NSDP TLV Discovery Results");
        assert_eq!(lines[1], "==========================");
        assert!(lines[2].starts_with("Scan Date: "));
        assert!(lines[2].ends_with(" UTC"));
        assert_eq!(lines[3], "Device MAC: 00:11:22:33:44:55");
        assert_eq!(lines[4], "Device Name: NETGEAR-Switch");
        assert_eq!(lines[5], "Device Model: GS108Tv3");
        assert_eq!(lines[6], "Total TLVs Tested: 100");
        assert_eq!(lines[7], "Valid TLVs Found: 3");
        assert_eq!(lines[8], "Success Rate: 3.00%");
        assert_eq!(lines[9], "Scan Duration: 42s");
        assert_eq!(lines[10], "");
        assert_eq!(lines[11], "Valid TLVs:");
        assert_eq!(lines[12], "-----------");

        assert!(text.contains("TLV: 0x0C00 (3072)\nLength: 1 bytes\nHex Data: 01\nInterpretation: Uint8: 1\n"));
        assert!(text.contains("TLV: 0x6000 (24576)\nLength: 1 bytes\nHex Data: 08\nInterpretation: Uint8: 8\n"));
        // 3-byte payload: hex only, no interpretation line
        assert!(text.contains("TLV: 0x0001 (1)\nLength: 3 bytes\nHex Data: deadbe\n\n"));
    }

    #[test]
    fn identity_lines_omitted_when_unknown() {
        let mut result = sample_result();
        result.identity.name = None;
        result.identity.model = None;

        let mut out = Vec::new();
        render(&mut out, &result).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(!text.contains("Device Name:"));
        assert!(!text.contains("Device Model:"));
        assert!(text.contains("Device MAC: 00:11:22:33:44:55"));
    }

    #[test]
    fn indexed_filename_inserts_before_extension() {
        assert_eq!(indexed_filename("results.txt", 1), "results_device1.txt");
        assert_eq!(
            indexed_filename("scan.out.txt", 2),
            "scan.out_device2.txt"
        );
        assert_eq!(indexed_filename("results", 3), "results_device3");
    }
}

//! TLV Space Discovery Engine
//!
//! NSDP has no capability negotiation: nothing tells a client which of the
//! 65 536 possible parameter codes a given switch implements. This module
//! discovers that set empirically by probing every identifier in a range,
//! one read transaction at a time, and recording the ones that answer with
//! data.
//!
//! # Overview
//!
//! - [`ScanRange`]: inclusive identifier bounds, partitioned into batches
//! - [`run_scan`]: the batch scheduler, which visits batches in ascending
//!   order with a pacing delay between them and aggregates findings
//! - [`probe_batch`]: the per-identifier prober, one transaction per code
//!   with independent failure handling
//! - [`Transaction`]: the seam to the device; anything that can answer a
//!   single-parameter read works, which is how the tests substitute a
//!   simulated switch
//! - [`interpret`]: heuristic typing of the raw values found
//! - [`report`]: summary statistics, console output and flat-text
//!   persistence
//!
//! The engine never consults the known-parameter catalog; it works purely
//! on raw bytes and is correct with an empty catalog.
//!
//! # Pacing
//!
//! Scans run strictly sequentially with one outstanding request: the
//! capacity of embedded switch firmware for concurrent queries is unknown
//! and assumed to be low. Batch size and inter-batch delay are the
//! caller's throughput/safety tradeoff, not derived automatically. A dead
//! identifier costs at most one timeout, so a batch never takes longer
//! than `batch_size * per_query_timeout`.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use nsdp_rs::{scan, NsdpClient, ScanOptions, ScanRange};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut client = NsdpClient::open("eth0")?;
//! let device = client.discover(Duration::from_secs(5))?.remove(0);
//! let range = ScanRange::new(0x0000, 0xFFFF)?;
//! let mut session = client.session(device.mac);
//! let result = scan::run_scan(&mut session, device, range, &ScanOptions::default())?;
//! println!("{} valid TLVs", result.total_valid());
//! # Ok(())
//! # }
//! ```

pub mod interpret;
pub mod report;

use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, trace};
use thiserror::Error;

use crate::protocol::MacAddr;

pub use interpret::{interpret, interpretation};

/// Result type for scan operations
pub type Result<T> = std::result::Result<T, ScanError>;

/// Errors rejected at the scan configuration boundary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// Range bounds out of order
    #[error("invalid scan range: start 0x{start:04X} exceeds end 0x{end:04X}")]
    InvalidRange { start: u16, end: u16 },
    /// A batch size of zero would never make progress
    #[error("batch size must be at least 1")]
    ZeroBatchSize,
}

/// One query/response exchange against a device for a single parameter
/// code.
///
/// Implementations send a read request for `param` and wait up to
/// `timeout` for the answer. `Ok(Some(bytes))` is the value the device
/// returned, `Ok(None)` means the device answered but without the
/// requested code, and errors cover timeouts, transport failures and
/// undecodable responses. The scan engine treats every error uniformly as
/// "no data"; it never distinguishes subtypes.
pub trait Transaction {
    type Error: fmt::Display;

    fn query_param(
        &mut self,
        param: u16,
        timeout: Duration,
    ) -> std::result::Result<Option<Vec<u8>>, Self::Error>;
}

/// Inclusive range of TLV identifiers, `start <= end` by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanRange {
    start: u16,
    end: u16,
}

impl ScanRange {
    /// Build a range, rejecting out-of-order bounds.
    pub fn new(start: u16, end: u16) -> Result<Self> {
        if start > end {
            return Err(ScanError::InvalidRange { start, end });
        }
        Ok(ScanRange { start, end })
    }

    /// First identifier
    pub fn start(&self) -> u16 {
        self.start
    }

    /// Last identifier, inclusive
    pub fn end(&self) -> u16 {
        self.end
    }

    /// Number of identifiers covered; the full space is 65 536, which is
    /// why this is not a `u16`.
    pub fn len(&self) -> u32 {
        u32::from(self.end) - u32::from(self.start) + 1
    }

    /// Identifiers in ascending order
    pub fn iter(&self) -> std::ops::RangeInclusive<u16> {
        self.start..=self.end
    }

    /// Partition into contiguous sub-ranges of at most `batch_size`
    /// identifiers, ascending, the last one clipped at `end`.
    pub fn batches(&self, batch_size: u16) -> Batches {
        Batches {
            cursor: u32::from(self.start),
            end: u32::from(self.end),
            size: u32::from(batch_size.max(1)),
        }
    }
}

impl fmt::Display for ScanRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04X}..0x{:04X}", self.start, self.end)
    }
}

/// Iterator over the batch partition of a [`ScanRange`].
///
/// Cursor arithmetic runs in `u32`: a batch ending at 0xFFFF must step
/// past the `u16` limit to terminate.
#[derive(Debug, Clone)]
pub struct Batches {
    cursor: u32,
    end: u32,
    size: u32,
}

impl Iterator for Batches {
    type Item = ScanRange;

    fn next(&mut self) -> Option<ScanRange> {
        if self.cursor > self.end {
            return None;
        }
        let batch_end = (self.cursor + self.size - 1).min(self.end);
        let batch = ScanRange {
            start: self.cursor as u16,
            end: batch_end as u16,
        };
        self.cursor = batch_end + 1;
        Some(batch)
    }
}

/// Caller-tunable scan parameters.
///
/// Defaults match the discovery tool: batches of 100 identifiers, 100 ms
/// between batches, 10 s per query.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Identifiers per batch; must be at least 1
    pub batch_size: u16,
    /// Pause between consecutive batches
    pub inter_batch_delay: Duration,
    /// Timeout for each individual transaction
    pub per_query_timeout: Duration,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            batch_size: 100,
            inter_batch_delay: Duration::from_millis(100),
            per_query_timeout: Duration::from_secs(10),
        }
    }
}

/// Identity of the device a scan ran against. Name and model are
/// best-effort lookups: populated on success, absent on failure, and
/// absence is a valid terminal state.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceIdentity {
    pub mac: MacAddr,
    pub name: Option<String>,
    pub model: Option<String>,
}

/// One identifier that answered a probe with data.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Finding {
    /// The TLV identifier
    pub param: u16,
    /// The raw value bytes, never empty
    pub value: Vec<u8>,
}

impl Finding {
    /// Value length in bytes
    pub fn len(&self) -> usize {
        self.value.len()
    }

    /// Lowercase hex dump of the value
    pub fn hex(&self) -> String {
        hex::encode(&self.value)
    }
}

/// Aggregate outcome of one device scan.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanResult {
    /// Who was scanned
    pub identity: DeviceIdentity,
    /// The bounds that were covered
    pub range: ScanRange,
    /// Findings sorted by ascending identifier
    pub findings: Vec<Finding>,
    /// Identifiers probed: `end - start + 1`
    pub total_tested: u32,
    /// Wall-clock time of the whole scan
    pub duration: Duration,
}

impl ScanResult {
    /// Number of identifiers that produced a finding
    pub fn total_valid(&self) -> usize {
        self.findings.len()
    }

    /// Findings as a percentage of identifiers probed
    pub fn success_rate(&self) -> f64 {
        self.total_valid() as f64 / self.total_tested as f64 * 100.0
    }
}

/// Scan `range` against `target` in paced batches and aggregate the
/// findings.
///
/// Batches are visited in ascending order; the scheduler sleeps
/// `inter_batch_delay` between batches (not after the last) and emits one
/// progress line per batch through the `log` facade, so long scans stay
/// observably alive. The device handle is exclusively owned for the
/// duration: exactly one transaction is outstanding at any time, and the
/// scan runs to completion or dies with the process.
pub fn run_scan<T: Transaction>(
    target: &mut T,
    identity: DeviceIdentity,
    range: ScanRange,
    options: &ScanOptions,
) -> Result<ScanResult> {
    if options.batch_size == 0 {
        return Err(ScanError::ZeroBatchSize);
    }

    let started = Instant::now();
    let mut findings = Vec::new();

    for (index, batch) in range.batches(options.batch_size).enumerate() {
        let batch_findings = probe_batch(target, batch, options.per_query_timeout);
        info!(
            "batch {}: {} -> {} valid TLVs",
            index + 1,
            batch,
            batch_findings.len()
        );
        findings.extend(batch_findings);

        if batch.end() < range.end() && !options.inter_batch_delay.is_zero() {
            thread::sleep(options.inter_batch_delay);
        }
    }

    Ok(finalize(identity, range, findings, started))
}

/// Probe every identifier in `batch`, ascending, one transaction each.
///
/// Outcome classification:
/// - transaction error (timeout, transport, undecodable): skipped; at
///   this scale failure is the routine case, so it is only surfaced as a
///   trace diagnostic
/// - answered without the code, or with a zero-length value: skipped;
///   supported-but-empty is indistinguishable from unsupported, and only
///   a non-empty payload is accepted as positive evidence. A device could
///   legitimately answer "empty but meaningful" (a zero count, say); this
///   trades recall for precision and is intentional.
/// - answered with data: a [`Finding`]
pub fn probe_batch<T: Transaction>(
    target: &mut T,
    batch: ScanRange,
    timeout: Duration,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    for param in batch.iter() {
        match target.query_param(param, timeout) {
            Err(err) => trace!("0x{param:04X}: no answer ({err})"),
            Ok(None) => trace!("0x{param:04X}: not in response"),
            Ok(Some(value)) if value.is_empty() => {
                trace!("0x{param:04X}: empty value, treated as unsupported")
            }
            Ok(Some(value)) => {
                debug!(
                    "0x{param:04X}: {} bytes - {}",
                    value.len(),
                    hex::encode(&value)
                );
                findings.push(Finding { param, value });
            }
        }
    }

    findings
}

/// Sort findings by identifier, stamp the duration and freeze the result.
///
/// Probing order already delivers ascending identifiers; sorting anyway
/// keeps the ordering guarantee independent of how findings were
/// produced.
pub fn finalize(
    identity: DeviceIdentity,
    range: ScanRange,
    mut findings: Vec<Finding>,
    started: Instant,
) -> ScanResult {
    findings.sort_by_key(|finding| finding.param);
    ScanResult {
        identity,
        total_tested: range.len(),
        range,
        findings,
        duration: started.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    /// Simulated switch: a map from identifier to canned outcome.
    struct FakeDevice {
        answers: HashMap<u16, FakeAnswer>,
        probes: Vec<u16>,
    }

    enum FakeAnswer {
        Value(Vec<u8>),
        Empty,
        Missing,
        Fail,
    }

    impl FakeDevice {
        fn new(answers: HashMap<u16, FakeAnswer>) -> Self {
            FakeDevice {
                answers,
                probes: Vec::new(),
            }
        }
    }

    impl Transaction for FakeDevice {
        type Error = String;

        fn query_param(
            &mut self,
            param: u16,
            _timeout: Duration,
        ) -> std::result::Result<Option<Vec<u8>>, String> {
            self.probes.push(param);
            match self.answers.get(&param) {
                Some(FakeAnswer::Value(bytes)) => Ok(Some(bytes.clone())),
                Some(FakeAnswer::Empty) => Ok(Some(Vec::new())),
                Some(FakeAnswer::Fail) => Err("request timeout".into()),
                Some(FakeAnswer::Missing) | None => Ok(None),
            }
        }
    }

    fn identity() -> DeviceIdentity {
        DeviceIdentity {
            mac: MacAddr([0, 0x11, 0x22, 0x33, 0x44, 0x55]),
            name: Some("NETGEAR-Switch".into()),
            model: Some("GS108Tv3".into()),
        }
    }

    fn fast_options() -> ScanOptions {
        ScanOptions {
            batch_size: 100,
            inter_batch_delay: Duration::ZERO,
            per_query_timeout: Duration::from_millis(1),
        }
    }

    #[test]
    fn range_rejects_inverted_bounds() {
        assert_eq!(
            ScanRange::new(0x10, 0x0F),
            Err(ScanError::InvalidRange {
                start: 0x10,
                end: 0x0F
            })
        );
        assert!(ScanRange::new(0x10, 0x10).is_ok());
    }

    #[test]
    fn range_len_covers_full_space() {
        let range = ScanRange::new(0x0000, 0xFFFF).unwrap();
        assert_eq!(range.len(), 65_536);
    }

    #[test]
    fn batch_boundary_split() {
        let range = ScanRange::new(0x0C00, 0x0C05).unwrap();
        let batches: Vec<ScanRange> = range.batches(3).collect();
        assert_eq!(
            batches,
            vec![
                ScanRange::new(0x0C00, 0x0C02).unwrap(),
                ScanRange::new(0x0C03, 0x0C05).unwrap(),
            ]
        );
    }

    #[test]
    fn batches_terminate_at_space_end() {
        let range = ScanRange::new(0xFFF0, 0xFFFF).unwrap();
        let batches: Vec<ScanRange> = range.batches(100).collect();
        assert_eq!(batches, vec![range]);

        let batches: Vec<ScanRange> = range.batches(7).collect();
        assert_eq!(
            batches,
            vec![
                ScanRange::new(0xFFF0, 0xFFF6).unwrap(),
                ScanRange::new(0xFFF7, 0xFFFD).unwrap(),
                ScanRange::new(0xFFFE, 0xFFFF).unwrap(),
            ]
        );
    }

    proptest! {
        #[test]
        fn batches_partition_exactly(
            start in 0u16..=0xFFFF,
            span in 0u16..=500,
            batch_size in 1u16..=97,
        ) {
            let end = start.saturating_add(span);
            let range = ScanRange::new(start, end).unwrap();

            let mut expected = u32::from(start);
            for batch in range.batches(batch_size) {
                // contiguous: each batch picks up where the last left off
                prop_assert_eq!(u32::from(batch.start()), expected);
                prop_assert!(batch.end() <= end);
                prop_assert!(batch.len() <= u32::from(batch_size));
                expected = u32::from(batch.end()) + 1;
            }
            // no gap after the last batch
            prop_assert_eq!(expected, u32::from(end) + 1);
        }
    }

    #[test]
    fn probe_batch_excludes_negative_results() {
        let mut device = FakeDevice::new(HashMap::from([
            (0x0001, FakeAnswer::Value(vec![0xAB])),
            (0x0002, FakeAnswer::Empty),
            (0x0003, FakeAnswer::Fail),
            (0x0004, FakeAnswer::Missing),
            (0x0005, FakeAnswer::Value(vec![0x01, 0x02])),
        ]));

        let batch = ScanRange::new(0x0000, 0x0008).unwrap();
        let findings = probe_batch(&mut device, batch, Duration::from_millis(1));

        assert_eq!(
            findings,
            vec![
                Finding {
                    param: 0x0001,
                    value: vec![0xAB]
                },
                Finding {
                    param: 0x0005,
                    value: vec![0x01, 0x02]
                },
            ]
        );
        // every identifier in the batch was probed exactly once, ascending
        assert_eq!(device.probes, (0x0000..=0x0008).collect::<Vec<u16>>());
    }

    #[test]
    fn run_scan_rejects_zero_batch_size() {
        let mut device = FakeDevice::new(HashMap::new());
        let range = ScanRange::new(0, 10).unwrap();
        let options = ScanOptions {
            batch_size: 0,
            ..fast_options()
        };
        assert_eq!(
            run_scan(&mut device, identity(), range, &options).unwrap_err(),
            ScanError::ZeroBatchSize
        );
        assert!(device.probes.is_empty());
    }

    #[test]
    fn full_space_scan_of_simulated_device() {
        let mut device = FakeDevice::new(HashMap::from([
            (0x0C00, FakeAnswer::Value(vec![0x01])),
            (0x6000, FakeAnswer::Value(vec![0x08])),
        ]));

        let range = ScanRange::new(0x0000, 0xFFFF).unwrap();
        let result = run_scan(&mut device, identity(), range, &fast_options()).unwrap();

        assert_eq!(result.total_tested, 65_536);
        assert_eq!(result.total_valid(), 2);
        assert_eq!(device.probes.len(), 65_536);

        let params: Vec<u16> = result.findings.iter().map(|f| f.param).collect();
        assert_eq!(params, vec![0x0C00, 0x6000]);
        assert!(interpret(&result.findings[0].value).contains(&"Uint8: 1".to_string()));
        assert!(interpret(&result.findings[1].value).contains(&"Uint8: 8".to_string()));
    }

    #[test]
    fn findings_are_strictly_ascending() {
        let mut answers = HashMap::new();
        for param in [0x0007u16, 0x0100, 0x00FF, 0x0042, 0x0001] {
            answers.insert(param, FakeAnswer::Value(vec![param as u8, 0x00]));
        }
        let mut device = FakeDevice::new(answers);

        let range = ScanRange::new(0x0000, 0x0200).unwrap();
        let result = run_scan(&mut device, identity(), range, &fast_options()).unwrap();

        let params: Vec<u16> = result.findings.iter().map(|f| f.param).collect();
        assert_eq!(params, vec![0x0001, 0x0007, 0x0042, 0x00FF, 0x0100]);
        assert!(params.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn finalize_sorts_out_of_order_findings() {
        let findings = vec![
            Finding {
                param: 0x6000,
                value: vec![0x08],
            },
            Finding {
                param: 0x0C00,
                value: vec![0x01],
            },
        ];
        let range = ScanRange::new(0x0000, 0xFFFF).unwrap();
        let result = finalize(identity(), range, findings, Instant::now());

        assert_eq!(result.findings[0].param, 0x0C00);
        assert_eq!(result.findings[1].param, 0x6000);
        assert_eq!(result.total_tested, 65_536);
    }

    #[test]
    fn success_rate_arithmetic() {
        let findings = (0..3)
            .map(|i| Finding {
                param: i,
                value: vec![1],
            })
            .collect();
        let range = ScanRange::new(0, 99).unwrap();
        let result = finalize(identity(), range, findings, Instant::now());

        assert_eq!(result.total_tested, 100);
        assert_eq!(result.total_valid(), 3);
        assert_eq!(format!("{:.2}%", result.success_rate()), "3.00%");
    }
}

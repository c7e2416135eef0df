//! Heuristic value interpretation.
//!
//! Discovered TLVs come with no schema, so the reporter offers the
//! plausible readings a human operator would try: printable text, the
//! integer widths that fit, an IPv4 address for 4-byte payloads, a MAC
//! address for 6-byte ones. Candidates are advisory; nothing here claims
//! certainty, and 4-byte values deliberately get both the integer and the
//! address reading rather than a guess between them.
//!
//! `interpret` is a pure function: identical bytes always produce
//! identical candidates, so interpretations are recomputed at report time
//! instead of being stored on findings.

/// Propose human-readable decodings of a raw TLV value.
///
/// Returns zero or more candidate descriptions; lengths with no plausible
/// reading yield an empty set and the value is reported as raw hex only.
pub fn interpret(data: &[u8]) -> Vec<String> {
    let mut candidates = Vec::new();

    if is_printable_ascii(data) {
        candidates.push(format!(
            "String: \"{}\"",
            String::from_utf8_lossy(data)
        ));
    }

    match data.len() {
        1 => candidates.push(format!("Uint8: {}", data[0])),
        2 => candidates.push(format!(
            "Uint16: {}",
            u16::from_be_bytes([data[0], data[1]])
        )),
        4 => {
            candidates.push(format!(
                "Uint32: {}",
                u32::from_be_bytes([data[0], data[1], data[2], data[3]])
            ));
            candidates.push(format!(
                "IP: {}.{}.{}.{}",
                data[0], data[1], data[2], data[3]
            ));
        }
        6 => candidates.push(format!(
            "MAC: {:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            data[0], data[1], data[2], data[3], data[4], data[5]
        )),
        _ => {}
    }

    candidates
}

/// All candidates joined for display, or `None` when there are none.
pub fn interpretation(data: &[u8]) -> Option<String> {
    let candidates = interpret(data);
    if candidates.is_empty() {
        None
    } else {
        Some(candidates.join(" | "))
    }
}

/// Every byte in the printable ASCII range, and at least one byte.
fn is_printable_ascii(data: &[u8]) -> bool {
    !data.is_empty() && data.iter().all(|byte| (32..=126).contains(byte))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_byte_reads_as_uint8() {
        assert_eq!(interpret(&[0x01]), vec!["Uint8: 1".to_string()]);
        assert_eq!(interpret(&[0x08]), vec!["Uint8: 8".to_string()]);
    }

    #[test]
    fn printable_pair_reads_as_string_and_uint16() {
        let candidates = interpret(&[0x68, 0x69]);
        assert!(candidates.contains(&"String: \"hi\"".to_string()));
        assert!(candidates.contains(&"Uint16: 26729".to_string()));
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn four_bytes_read_as_both_uint32_and_ip() {
        let candidates = interpret(&[0xC0, 0xA8, 0x01, 0x64]);
        assert!(candidates.contains(&"Uint32: 3232235876".to_string()));
        assert!(candidates.contains(&"IP: 192.168.1.100".to_string()));
    }

    #[test]
    fn six_bytes_read_as_mac() {
        assert_eq!(
            interpret(&[0x00, 0x11, 0x22, 0x33, 0x44, 0x55]),
            vec!["MAC: 00:11:22:33:44:55".to_string()]
        );
    }

    #[test]
    fn unhandled_lengths_propose_nothing() {
        assert!(interpret(&[]).is_empty());
        assert!(interpret(&[0x00, 0x01, 0x02]).is_empty());
        assert!(interpret(&[0x00; 5]).is_empty());
        assert!(interpret(&[0x00; 49]).is_empty());
    }

    #[test]
    fn non_printable_bytes_are_not_a_string() {
        let candidates = interpret(&[0x00, 0x41]);
        assert_eq!(candidates, vec!["Uint16: 65".to_string()]);
    }

    #[test]
    fn interpretation_joins_candidates() {
        assert_eq!(
            interpretation(&[0xC0, 0xA8, 0x01, 0x64]).unwrap(),
            "Uint32: 3232235876 | IP: 192.168.1.100"
        );
        assert_eq!(interpretation(&[0x00, 0x01, 0x02]), None);
    }

    #[test]
    fn interpret_is_deterministic() {
        let data = [0x68, 0x69];
        assert_eq!(interpret(&data), interpret(&data));
    }
}

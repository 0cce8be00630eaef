// Canonical encoding of ledger data structures
//
// Blocks are hashed over a fixed text form: JSON objects with keys in
// lexicographic order, ", " and ": " separators, ASCII-only strings and
// shortest round-trip floats. Nodes that agree on this form agree on digests.

use crate::core::{Block, PreviousHash, Timestamp, Transaction};
use std::fmt::Write;

/// Trait for types with exactly one canonical byte form
pub trait CanonicalEncode {
    /// Append the canonical text of `self` to `out`
    fn encode_canonical(&self, out: &mut String);

    /// Canonical text as a fresh string
    fn to_canonical_string(&self) -> String {
        let mut out = String::new();
        self.encode_canonical(&mut out);
        out
    }
}

impl CanonicalEncode for Transaction {
    fn encode_canonical(&self, out: &mut String) {
        out.push_str("{\"amount\": ");
        write_u64(out, self.amount);
        out.push_str(", \"recipient\": ");
        write_str(out, &self.recipient);
        out.push_str(", \"sender\": ");
        write_str(out, &self.sender);
        out.push('}');
    }
}

impl CanonicalEncode for PreviousHash {
    fn encode_canonical(&self, out: &mut String) {
        match self {
            PreviousHash::Genesis => out.push_str(&self.to_string()),
            PreviousHash::Digest(hash) => write_str(out, hash),
        }
    }
}

impl CanonicalEncode for Timestamp {
    fn encode_canonical(&self, out: &mut String) {
        match *self {
            Timestamp::Whole(secs) => {
                let _ = write!(out, "{}", secs);
            }
            Timestamp::Seconds(secs) => write_f64(out, secs),
        }
    }
}

impl CanonicalEncode for Block {
    fn encode_canonical(&self, out: &mut String) {
        out.push_str("{\"index\": ");
        write_u64(out, self.index);
        out.push_str(", \"previous_hash\": ");
        self.previous_hash.encode_canonical(out);
        out.push_str(", \"proof\": ");
        write_u64(out, self.proof);
        out.push_str(", \"timestamp\": ");
        self.timestamp.encode_canonical(out);
        out.push_str(", \"transactions\": [");
        for (i, tx) in self.transactions.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            tx.encode_canonical(out);
        }
        out.push_str("]}");
    }
}

/// Write an unsigned integer in decimal
pub fn write_u64(out: &mut String, value: u64) {
    let _ = write!(out, "{}", value);
}

/// Write a float in shortest round-trip form
///
/// Integral values keep a trailing `.0`; exponents carry an explicit sign and
/// at least two digits (`1e+16`, `1e-05`).
pub fn write_f64(out: &mut String, value: f64) {
    if value.is_nan() {
        out.push_str("NaN");
        return;
    }
    if value.is_infinite() {
        out.push_str(if value > 0.0 { "Infinity" } else { "-Infinity" });
        return;
    }

    let repr = format!("{:?}", value);
    match repr.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            let _ = write!(out, "{}e{}{:0>2}", mantissa, sign, digits);
        }
        None => out.push_str(&repr),
    }
}

/// Write a quoted string, escaping everything outside printable ASCII
pub fn write_str(out: &mut String, value: &str) {
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            ' '..='\u{7f}' => out.push(c),
            _ => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    let _ = write!(out, "\\u{:04x}", unit);
                }
            }
        }
    }
    out.push('"');
}

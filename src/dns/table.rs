//! Hostname → IP literal mapping table.
//!
//! Parsed once from the `OVERRIDEHOSTS` value and read-only afterwards.

use std::collections::HashMap;
use std::fmt;

/// Lowercased hostname → IP literal text (brackets stripped).
///
/// Values are kept as text; they are classified when a lookup hits, so a bad
/// literal only affects the hostname it is mapped to.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct MappingTable {
    entries: HashMap<String, String>,
}

impl MappingTable {
    /// Creates an empty table. Every lookup misses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a mapping string such as `"db:10.0.0.10, cache:[2001:db8::1]"`.
    ///
    /// Items are separated by commas or whitespace. Items without a colon,
    /// with an empty host, or with an empty address are skipped. Later items
    /// override earlier ones for the same host.
    pub fn parse(raw: &str) -> Self {
        let mut entries = HashMap::new();

        for item in raw.split(|c: char| c == ',' || c.is_ascii_whitespace()) {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            match parse_item(item) {
                Some((host, ip)) => {
                    tracing::trace!(host = %host, ip = %ip, "parsed override");
                    entries.insert(host, ip);
                }
                None => tracing::debug!(item = %item, "ignoring malformed override"),
            }
        }

        Self { entries }
    }

    /// Returns the IP literal mapped to `host`, ignoring ASCII case.
    pub fn lookup(&self, host: &str) -> Option<&str> {
        if host.is_empty() || self.entries.is_empty() {
            return None;
        }
        self.entries
            .get(&host.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns the number of mapped hostnames.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no hostname is mapped.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(host, ip)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(h, ip)| (h.as_str(), ip.as_str()))
    }
}

fn parse_item(item: &str) -> Option<(String, String)> {
    let (host, ip) = item.split_once(':')?;
    let host = host.trim();
    let ip = strip_brackets(ip.trim());
    if host.is_empty() || ip.is_empty() {
        return None;
    }
    Some((host.to_ascii_lowercase(), ip.to_string()))
}

/// `[2001:db8::1]` → `2001:db8::1`. One pair only, and only around a
/// non-empty literal.
fn strip_brackets(ip: &str) -> &str {
    match ip.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        Some(inner) if !inner.is_empty() => inner,
        _ => ip,
    }
}

impl fmt::Debug for MappingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

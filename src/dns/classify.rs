//! IP literal classification.

use crate::base::ResolveError;
use std::ffi::c_int;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Parses an override target as a strict IPv4, then IPv6, literal.
///
/// Accepts exactly what `inet_pton` accepts for `AF_INET` and `AF_INET6`:
/// dotted-quad without leading zeros, and RFC 4291 text without zone ids.
pub fn classify(text: &str) -> Result<IpAddr, ResolveError> {
    if let Ok(v4) = text.parse::<Ipv4Addr>() {
        return Ok(IpAddr::V4(v4));
    }
    if let Ok(v6) = text.parse::<Ipv6Addr>() {
        return Ok(IpAddr::V6(v6));
    }
    Err(ResolveError::InvalidAddress(text.to_string()))
}

/// The `AF_*` constant for an address.
pub fn family_of(ip: &IpAddr) -> c_int {
    match ip {
        IpAddr::V4(_) => libc::AF_INET,
        IpAddr::V6(_) => libc::AF_INET6,
    }
}

//! `struct addrinfo` synthesis for overridden hostnames.
//!
//! [`AddrInfo`] is the owned Rust result. [`AddrInfo::into_raw`] turns it
//! into a C node allocated with the C allocator, laid out as one block with
//! the `addrinfo` header first and the socket address behind it, the same
//! shape glibc produces. Release it with [`free_raw`].

use super::classify::{classify, family_of};
use crate::base::ResolveError;
use std::{
    ffi::{c_char, c_int},
    mem,
    net::{IpAddr, SocketAddr, SocketAddrV4, SocketAddrV6},
    ptr,
};

/// The subset of caller-supplied `hints` the override path honors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hints {
    pub flags: c_int,
    pub family: c_int,
    pub socktype: c_int,
    pub protocol: c_int,
}

impl Hints {
    /// Copies the relevant fields out of a caller's `hints` pointer.
    ///
    /// # Safety
    ///
    /// `hints` must be null or point to a readable `addrinfo`.
    pub unsafe fn from_raw(hints: *const libc::addrinfo) -> Option<Self> {
        // SAFETY: caller guarantees the pointer is null or valid.
        let hints = unsafe { hints.as_ref()? };
        Some(Self {
            flags: hints.ai_flags,
            family: hints.ai_family,
            socktype: hints.ai_socktype,
            protocol: hints.ai_protocol,
        })
    }

    /// Hints asking for one address family only.
    pub fn family(family: c_int) -> Self {
        Self {
            family,
            ..Self::default()
        }
    }
}

/// One synthesized resolver result.
///
/// The port is always 0: the service argument is not consulted, callers set
/// the port after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddrInfo {
    pub socktype: c_int,
    pub protocol: c_int,
    pub addr: SocketAddr,
    pub canonname: Option<String>,
}

impl AddrInfo {
    /// Builds the single result node for `host` mapped to `ip_text`.
    ///
    /// Fails with a "no such name" error when the literal is invalid or its
    /// family conflicts with an explicit `AF_INET`/`AF_INET6` hint.
    pub fn synthesize(host: &str, ip_text: &str, hints: Option<&Hints>) -> Result<Self, ResolveError> {
        let ip = classify(ip_text)?;
        let hints = hints.copied().unwrap_or_default();

        let requested = hints.family;
        let actual = family_of(&ip);
        if (requested == libc::AF_INET || requested == libc::AF_INET6) && requested != actual {
            return Err(ResolveError::family_mismatch(requested, actual));
        }

        let addr = match ip {
            IpAddr::V4(v4) => SocketAddr::V4(SocketAddrV4::new(v4, 0)),
            IpAddr::V6(v6) => SocketAddr::V6(SocketAddrV6::new(v6, 0, 0, 0)),
        };
        let canonname = (hints.flags & libc::AI_CANONNAME != 0).then(|| host.to_string());

        Ok(Self {
            socktype: hints.socktype,
            protocol: hints.protocol,
            addr,
            canonname,
        })
    }

    /// `AF_INET` or `AF_INET6`.
    pub fn family(&self) -> c_int {
        family_of(&self.addr.ip())
    }

    /// Moves the result into a C-allocated `addrinfo` node.
    ///
    /// The node has no successor. Ownership passes to the caller.
    pub fn into_raw(self) -> Result<*mut libc::addrinfo, ResolveError> {
        // SAFETY: calloc returns null or a zeroed block large enough for Node.
        let node = unsafe { libc::calloc(1, mem::size_of::<Node>()) }.cast::<Node>();
        if node.is_null() {
            return Err(ResolveError::OutOfMemory);
        }

        let canonname = match self.canonname.as_deref() {
            Some(name) => match alloc_c_string(name) {
                Some(p) => p,
                None => {
                    // SAFETY: node came from calloc above and is not shared yet.
                    unsafe { libc::free(node.cast()) };
                    return Err(ResolveError::OutOfMemory);
                }
            },
            None => ptr::null_mut(),
        };

        // SAFETY: node is a valid, exclusively owned, zeroed Node.
        unsafe {
            let storage = ptr::addr_of_mut!((*node).storage);
            let addrlen = write_sockaddr(storage, &self.addr);
            let ai = &mut (*node).ai;
            ai.ai_flags = 0;
            ai.ai_family = self.family();
            ai.ai_socktype = self.socktype;
            ai.ai_protocol = self.protocol;
            ai.ai_addrlen = addrlen;
            ai.ai_addr = storage.cast::<libc::sockaddr>();
            ai.ai_canonname = canonname;
            ai.ai_next = ptr::null_mut();
        }

        Ok(node.cast::<libc::addrinfo>())
    }
}

/// Releases a node produced by [`AddrInfo::into_raw`].
///
/// # Safety
///
/// `node` must be null or a pointer returned by `into_raw` that has not been
/// freed yet.
pub unsafe fn free_raw(node: *mut libc::addrinfo) {
    if node.is_null() {
        return;
    }
    // SAFETY: node came from into_raw; canonname, if set, from alloc_c_string.
    unsafe {
        let canonname = (*node).ai_canonname;
        if !canonname.is_null() {
            libc::free(canonname.cast());
        }
        libc::free(node.cast());
    }
}

#[repr(C)]
struct Node {
    ai: libc::addrinfo,
    storage: libc::sockaddr_storage,
}

/// Writes `addr` into `storage` and returns the length of the written
/// `sockaddr_in` or `sockaddr_in6`.
///
/// # Safety
///
/// `storage` must be valid for writes.
unsafe fn write_sockaddr(storage: *mut libc::sockaddr_storage, addr: &SocketAddr) -> libc::socklen_t {
    match addr {
        SocketAddr::V4(v4) => {
            // SAFETY: all-zero is a valid sockaddr_in.
            let mut sin: libc::sockaddr_in = unsafe { mem::zeroed() };
            sin.sin_family = libc::AF_INET as libc::sa_family_t;
            sin.sin_port = v4.port().to_be();
            sin.sin_addr = libc::in_addr {
                s_addr: u32::from_ne_bytes(v4.ip().octets()),
            };
            // SAFETY: sockaddr_storage is large and aligned enough for any sockaddr.
            unsafe { ptr::write(storage.cast::<libc::sockaddr_in>(), sin) };
            mem::size_of::<libc::sockaddr_in>() as libc::socklen_t
        }
        SocketAddr::V6(v6) => {
            // SAFETY: all-zero is a valid sockaddr_in6.
            let mut sin6: libc::sockaddr_in6 = unsafe { mem::zeroed() };
            sin6.sin6_family = libc::AF_INET6 as libc::sa_family_t;
            sin6.sin6_port = v6.port().to_be();
            sin6.sin6_flowinfo = v6.flowinfo().to_be();
            sin6.sin6_addr.s6_addr = v6.ip().octets();
            sin6.sin6_scope_id = v6.scope_id();
            // SAFETY: as above.
            unsafe { ptr::write(storage.cast::<libc::sockaddr_in6>(), sin6) };
            mem::size_of::<libc::sockaddr_in6>() as libc::socklen_t
        }
    }
}

/// NUL-terminated copy of `s` in C-allocated memory, or null on OOM.
fn alloc_c_string(s: &str) -> Option<*mut c_char> {
    let bytes = s.as_bytes();
    // SAFETY: calloc returns null or a zeroed block of len + 1 bytes.
    let buf = unsafe { libc::calloc(bytes.len() + 1, 1) }.cast::<c_char>();
    if buf.is_null() {
        return None;
    }
    // SAFETY: buf has room for bytes plus the terminator calloc already wrote.
    unsafe { ptr::copy_nonoverlapping(bytes.as_ptr().cast::<c_char>(), buf, bytes.len()) };
    Some(buf)
}

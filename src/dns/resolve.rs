//! The resolver strategy trait and the override-first resolver.
//!
//! [`Resolve`] mirrors the C resolver entry points one-to-one so that any
//! implementation can sit behind the exported symbols. Two implementations
//! exist: [`PlatformResolver`](super::PlatformResolver), which forwards to
//! libc, and [`ResolverWithOverrides`], which answers from a
//! [`MappingTable`] and hands everything else to an inner resolver.

use super::addrinfo::{self, AddrInfo, Hints};
use super::hostent::HostEnt;
use super::platform::{set_errno, set_h_errno};
use super::table::MappingTable;
use crate::base::ResolveError;
use dashmap::DashSet;
use std::{
    ffi::{c_char, c_int, CStr},
    fmt,
    sync::Arc,
};

/// Trait for resolver implementations that can stand behind the exported
/// `<netdb.h>` symbols.
///
/// Methods take and return the raw C types so that results pass through
/// without being copied or reinterpreted. Implementations must be
/// thread-safe.
pub trait Resolve: Send + Sync {
    /// `getaddrinfo(3)`.
    ///
    /// # Safety
    ///
    /// Arguments must satisfy the `getaddrinfo` contract.
    unsafe fn getaddrinfo(
        &self,
        node: *const c_char,
        service: *const c_char,
        hints: *const libc::addrinfo,
        res: *mut *mut libc::addrinfo,
    ) -> c_int;

    /// `freeaddrinfo(3)`.
    ///
    /// # Safety
    ///
    /// `res` must be a list returned by this resolver's `getaddrinfo`.
    unsafe fn freeaddrinfo(&self, res: *mut libc::addrinfo);

    /// `gethostbyname(3)`.
    ///
    /// # Safety
    ///
    /// `name` must be null or a NUL-terminated string.
    unsafe fn gethostbyname(&self, name: *const c_char) -> *mut libc::hostent;

    /// `gethostbyname2(3)`.
    ///
    /// # Safety
    ///
    /// `name` must be null or a NUL-terminated string.
    unsafe fn gethostbyname2(&self, name: *const c_char, af: c_int) -> *mut libc::hostent;
}

/// Blanket implementation for Arc-wrapped resolvers.
impl<R: Resolve + ?Sized> Resolve for Arc<R> {
    unsafe fn getaddrinfo(
        &self,
        node: *const c_char,
        service: *const c_char,
        hints: *const libc::addrinfo,
        res: *mut *mut libc::addrinfo,
    ) -> c_int {
        // SAFETY: forwarded contract.
        unsafe { (**self).getaddrinfo(node, service, hints, res) }
    }

    unsafe fn freeaddrinfo(&self, res: *mut libc::addrinfo) {
        // SAFETY: forwarded contract.
        unsafe { (**self).freeaddrinfo(res) }
    }

    unsafe fn gethostbyname(&self, name: *const c_char) -> *mut libc::hostent {
        // SAFETY: forwarded contract.
        unsafe { (**self).gethostbyname(name) }
    }

    unsafe fn gethostbyname2(&self, name: *const c_char, af: c_int) -> *mut libc::hostent {
        // SAFETY: forwarded contract.
        unsafe { (**self).gethostbyname2(name, af) }
    }
}

/// Resolver that answers mapped hostnames from a [`MappingTable`] and
/// delegates everything else to `inner`.
///
/// `getaddrinfo` never delegates a mapped hostname: a literal it cannot use
/// or a conflicting family hint is reported as `EAI_NONAME`. The legacy
/// entry points cannot express IPv6 or errors about the override, so in
/// those cases they delegate instead.
///
/// # Example
///
/// ```rust,ignore
/// use overridehosts::dns::{MappingTable, PlatformResolver, ResolverWithOverrides};
/// use std::sync::Arc;
///
/// let resolver = ResolverWithOverrides::new(
///     Arc::new(PlatformResolver::new()),
///     Arc::new(MappingTable::parse("db:10.0.0.10")),
/// );
/// ```
pub struct ResolverWithOverrides {
    inner: Arc<dyn Resolve>,
    table: Arc<MappingTable>,
    /// Nodes handed out by `getaddrinfo` and not yet freed.
    issued: DashSet<usize>,
}

impl ResolverWithOverrides {
    /// Creates a resolver over `table` that falls back to `inner`.
    pub fn new(inner: Arc<dyn Resolve>, table: Arc<MappingTable>) -> Self {
        Self {
            inner,
            table,
            issued: DashSet::new(),
        }
    }

    /// The table this resolver answers from.
    pub fn table(&self) -> &MappingTable {
        &self.table
    }

    /// Number of synthesized `addrinfo` nodes not yet passed to `freeaddrinfo`.
    pub fn outstanding(&self) -> usize {
        self.issued.len()
    }

    /// Looks up a C hostname. Null and non-UTF-8 names never match: table
    /// keys come from a UTF-8 environment value, so such a name has no key
    /// it could equal.
    ///
    /// # Safety
    ///
    /// `name` must be null or a NUL-terminated string.
    unsafe fn lookup(&self, name: *const c_char) -> Option<(&CStr, &str, &str)> {
        if name.is_null() {
            return None;
        }
        // SAFETY: caller guarantees a NUL-terminated string.
        let cname = unsafe { CStr::from_ptr(name) };
        let host = cname.to_str().ok()?;
        let ip = self.table.lookup(host)?;
        Some((cname, host, ip))
    }

    /// # Safety
    ///
    /// `res` must be null or writable, `hints` null or readable.
    unsafe fn synthesize_addrinfo(
        &self,
        host: &str,
        ip: &str,
        hints: *const libc::addrinfo,
        res: *mut *mut libc::addrinfo,
    ) -> Result<(), ResolveError> {
        if res.is_null() {
            return Err(ResolveError::NullResultPointer);
        }
        // SAFETY: res is non-null and writable per the getaddrinfo contract.
        unsafe { *res = std::ptr::null_mut() };

        // SAFETY: hints is null or a caller-owned addrinfo.
        let hints = unsafe { Hints::from_raw(hints) };
        let node = AddrInfo::synthesize(host, ip, hints.as_ref())?.into_raw()?;
        self.issued.insert(node as usize);
        // SAFETY: as above.
        unsafe { *res = node };
        Ok(())
    }

    /// Shared legacy path: synthesize on a hit, delegate on a miss or on a
    /// result the legacy API cannot carry.
    ///
    /// # Safety
    ///
    /// `name` must be null or a NUL-terminated string.
    unsafe fn legacy<F>(&self, name: *const c_char, af: c_int, delegate: F) -> *mut libc::hostent
    where
        F: FnOnce() -> *mut libc::hostent,
    {
        // SAFETY: forwarded contract.
        let Some((cname, host, ip)) = (unsafe { self.lookup(name) }) else {
            return delegate();
        };

        match HostEnt::synthesize(cname, ip, af).and_then(HostEnt::stage) {
            Ok(hostent) => {
                tracing::debug!(host = %host, ip = %ip, "gethostbyname override");
                hostent
            }
            Err(e) if e.falls_through() => {
                tracing::debug!(host = %host, error = %e, "override not expressible, delegating");
                delegate()
            }
            Err(e) => {
                tracing::warn!(host = %host, error = %e, "gethostbyname override failed");
                if e == ResolveError::OutOfMemory {
                    set_errno(libc::ENOMEM);
                }
                set_h_errno(e.as_h_errno());
                std::ptr::null_mut()
            }
        }
    }
}

impl Resolve for ResolverWithOverrides {
    unsafe fn getaddrinfo(
        &self,
        node: *const c_char,
        service: *const c_char,
        hints: *const libc::addrinfo,
        res: *mut *mut libc::addrinfo,
    ) -> c_int {
        // SAFETY: node follows the getaddrinfo contract.
        let Some((_, host, ip)) = (unsafe { self.lookup(node) }) else {
            // SAFETY: forwarded untouched.
            return unsafe { self.inner.getaddrinfo(node, service, hints, res) };
        };

        // SAFETY: res and hints follow the getaddrinfo contract.
        match unsafe { self.synthesize_addrinfo(host, ip, hints, res) } {
            Ok(()) => {
                tracing::debug!(host = %host, ip = %ip, "getaddrinfo override");
                0
            }
            Err(e) => {
                tracing::debug!(host = %host, ip = %ip, error = %e, "getaddrinfo override failed");
                e.as_eai()
            }
        }
    }

    unsafe fn freeaddrinfo(&self, res: *mut libc::addrinfo) {
        if res.is_null() {
            return;
        }
        // Synthesized lists are always a single node. A registered address
        // heading a longer list was released behind our back and reused by
        // the real resolver.
        // SAFETY: res is a live list head per the freeaddrinfo contract.
        let ours =
            self.issued.remove(&(res as usize)).is_some() && unsafe { (*res).ai_next.is_null() };
        if ours {
            // SAFETY: res was produced by AddrInfo::into_raw and is freed once.
            unsafe { addrinfo::free_raw(res) };
        } else {
            // SAFETY: not ours, so it came from the inner resolver.
            unsafe { self.inner.freeaddrinfo(res) };
        }
    }

    unsafe fn gethostbyname(&self, name: *const c_char) -> *mut libc::hostent {
        // SAFETY: forwarded contract.
        unsafe { self.legacy(name, libc::AF_INET, || self.inner.gethostbyname(name)) }
    }

    unsafe fn gethostbyname2(&self, name: *const c_char, af: c_int) -> *mut libc::hostent {
        // SAFETY: forwarded contract.
        unsafe { self.legacy(name, af, || self.inner.gethostbyname2(name, af)) }
    }
}

impl fmt::Debug for ResolverWithOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverWithOverrides")
            .field("override_count", &self.table.len())
            .field("outstanding", &self.issued.len())
            .finish_non_exhaustive()
    }
}

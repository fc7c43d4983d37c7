//! The exported `<netdb.h>` symbols.
//!
//! Loaded with `LD_PRELOAD`, these shadow libc's resolver for the whole
//! process. The override table is built by the first call into any of them;
//! concurrent first callers block until it is ready.

use crate::config::Config;
use crate::dns::{MappingTable, PlatformResolver, Resolve, ResolverWithOverrides};
use crate::logging;
use std::{
    ffi::{c_char, c_int},
    sync::{Arc, LazyLock},
};

static RESOLVER: LazyLock<ResolverWithOverrides> = LazyLock::new(|| {
    let config = Config::from_env();
    logging::init(config.log_filter.as_deref());

    let table = MappingTable::parse(config.mappings.as_deref().unwrap_or_default());
    tracing::debug!(overrides = table.len(), table = ?table, "override table loaded");

    ResolverWithOverrides::new(Arc::new(PlatformResolver::new()), Arc::new(table))
});

/// The process-wide resolver behind the exported symbols.
pub fn resolver() -> &'static ResolverWithOverrides {
    &RESOLVER
}

/// # Safety
///
/// See `getaddrinfo(3)`.
#[cfg_attr(not(test), no_mangle)]
pub unsafe extern "C" fn getaddrinfo(
    node: *const c_char,
    service: *const c_char,
    hints: *const libc::addrinfo,
    res: *mut *mut libc::addrinfo,
) -> c_int {
    // SAFETY: arguments come straight from the C caller.
    unsafe { resolver().getaddrinfo(node, service, hints, res) }
}

/// # Safety
///
/// See `freeaddrinfo(3)`.
#[cfg_attr(not(test), no_mangle)]
pub unsafe extern "C" fn freeaddrinfo(res: *mut libc::addrinfo) {
    // SAFETY: as above.
    unsafe { resolver().freeaddrinfo(res) }
}

/// # Safety
///
/// See `gethostbyname(3)`.
#[cfg_attr(not(test), no_mangle)]
pub unsafe extern "C" fn gethostbyname(name: *const c_char) -> *mut libc::hostent {
    // SAFETY: as above.
    unsafe { resolver().gethostbyname(name) }
}

/// # Safety
///
/// See `gethostbyname2(3)`.
#[cfg_attr(not(test), no_mangle)]
pub unsafe extern "C" fn gethostbyname2(name: *const c_char, af: c_int) -> *mut libc::hostent {
    // SAFETY: as above.
    unsafe { resolver().gethostbyname2(name, af) }
}

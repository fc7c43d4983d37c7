//! Delegation to the resolver this library shadows.
//!
//! Each real function is found with `dlsym(RTLD_NEXT, ..)` the first time it
//! is needed and cached for the life of the process.

use super::resolve::Resolve;
use crate::base::error::{ResolveError, NO_RECOVERY};
use std::{
    ffi::{c_char, c_int, c_void, CStr},
    ptr,
    sync::OnceLock,
};

pub type GetAddrInfoFn = unsafe extern "C" fn(
    node: *const c_char,
    service: *const c_char,
    hints: *const libc::addrinfo,
    res: *mut *mut libc::addrinfo,
) -> c_int;
pub type FreeAddrInfoFn = unsafe extern "C" fn(res: *mut libc::addrinfo);
pub type GetHostByNameFn = unsafe extern "C" fn(name: *const c_char) -> *mut libc::hostent;
pub type GetHostByName2Fn =
    unsafe extern "C" fn(name: *const c_char, af: c_int) -> *mut libc::hostent;

/// A real libc function bound on first use.
struct Symbol<F> {
    name: &'static CStr,
    cell: OnceLock<Option<F>>,
}

impl<F: Copy> Symbol<F> {
    const fn new(name: &'static CStr) -> Self {
        Self {
            name,
            cell: OnceLock::new(),
        }
    }

    fn get(&self) -> Result<F, ResolveError> {
        let bound = self.cell.get_or_init(|| {
            // SAFETY: name is NUL-terminated; RTLD_NEXT searches the objects
            // loaded after this one.
            let sym = unsafe { libc::dlsym(libc::RTLD_NEXT, self.name.as_ptr()) };
            if sym.is_null() {
                tracing::warn!(symbol = ?self.name, "real resolver symbol not found");
                return None;
            }
            tracing::debug!(symbol = ?self.name, "bound real resolver symbol");
            // SAFETY: F is the C signature of the symbol named by `name`.
            Some(unsafe { std::mem::transmute_copy::<*mut c_void, F>(&sym) })
        });
        (*bound).ok_or_else(|| ResolveError::SymbolNotFound(symbol_name(self.name)))
    }
}

fn symbol_name(name: &'static CStr) -> &'static str {
    name.to_str().unwrap_or("resolver symbol")
}

/// The platform resolver, reached through `RTLD_NEXT`.
pub struct PlatformResolver {
    getaddrinfo: Symbol<GetAddrInfoFn>,
    freeaddrinfo: Symbol<FreeAddrInfoFn>,
    gethostbyname: Symbol<GetHostByNameFn>,
    gethostbyname2: Symbol<GetHostByName2Fn>,
}

impl PlatformResolver {
    /// Creates an unbound resolver. No symbol is looked up until first use.
    pub const fn new() -> Self {
        Self {
            getaddrinfo: Symbol::new(c"getaddrinfo"),
            freeaddrinfo: Symbol::new(c"freeaddrinfo"),
            gethostbyname: Symbol::new(c"gethostbyname"),
            gethostbyname2: Symbol::new(c"gethostbyname2"),
        }
    }
}

#[cfg(test)]
impl PlatformResolver {
    /// A resolver whose symbols can never be bound.
    const fn unbound() -> Self {
        Self {
            getaddrinfo: Symbol::new(c"overridehosts_missing_getaddrinfo"),
            freeaddrinfo: Symbol::new(c"overridehosts_missing_freeaddrinfo"),
            gethostbyname: Symbol::new(c"overridehosts_missing_gethostbyname"),
            gethostbyname2: Symbol::new(c"overridehosts_missing_gethostbyname2"),
        }
    }
}

impl Default for PlatformResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolve for PlatformResolver {
    unsafe fn getaddrinfo(
        &self,
        node: *const c_char,
        service: *const c_char,
        hints: *const libc::addrinfo,
        res: *mut *mut libc::addrinfo,
    ) -> c_int {
        match self.getaddrinfo.get() {
            // SAFETY: arguments are forwarded untouched from the caller.
            Ok(real) => unsafe { real(node, service, hints, res) },
            Err(e) => e.as_eai(),
        }
    }

    unsafe fn freeaddrinfo(&self, res: *mut libc::addrinfo) {
        if let Ok(real) = self.freeaddrinfo.get() {
            // SAFETY: res came from the real getaddrinfo.
            unsafe { real(res) }
        }
    }

    unsafe fn gethostbyname(&self, name: *const c_char) -> *mut libc::hostent {
        match self.gethostbyname.get() {
            // SAFETY: forwarded untouched.
            Ok(real) => unsafe { real(name) },
            Err(_) => {
                set_h_errno(NO_RECOVERY);
                ptr::null_mut()
            }
        }
    }

    unsafe fn gethostbyname2(&self, name: *const c_char, af: c_int) -> *mut libc::hostent {
        match self.gethostbyname2.get() {
            // SAFETY: forwarded untouched.
            Ok(real) => unsafe { real(name, af) },
            Err(_) => {
                set_h_errno(NO_RECOVERY);
                ptr::null_mut()
            }
        }
    }
}

extern "C" {
    fn __h_errno_location() -> *mut c_int;
}

/// Sets the calling thread's `h_errno`.
pub fn set_h_errno(code: c_int) {
    // SAFETY: glibc and musl both return a valid thread-local slot.
    unsafe { *__h_errno_location() = code };
}

/// Sets the calling thread's `errno`.
pub fn set_errno(code: c_int) {
    // SAFETY: errno location is always valid for the calling thread.
    unsafe { *libc::__errno_location() = code };
}

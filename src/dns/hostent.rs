//! `struct hostent` synthesis for the legacy `gethostbyname*` entry points.
//!
//! Synthesis returns an owned [`HostEnt`]. The C API hands out a pointer the
//! caller never frees, so [`HostEnt::stage`] copies the value into a
//! per-thread scratch record that stays valid until the next legacy call on
//! the same thread.

use super::classify::classify;
use crate::base::ResolveError;
use std::{
    cell::RefCell,
    ffi::{c_char, c_int, CStr, CString},
    net::{IpAddr, Ipv4Addr},
    ptr,
};

/// An IPv4-only legacy result: the queried name and its one address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEnt {
    pub name: CString,
    pub addr: Ipv4Addr,
}

impl HostEnt {
    /// Builds the result for `name` mapped to `ip_text`.
    ///
    /// Only `AF_INET` requests for IPv4 targets succeed. Anything else is a
    /// shape the legacy API cannot carry and reports an error that
    /// [falls through](ResolveError::falls_through) to the real resolver.
    pub fn synthesize(name: &CStr, ip_text: &str, requested_family: c_int) -> Result<Self, ResolveError> {
        if requested_family != libc::AF_INET {
            return Err(ResolveError::UnsupportedFamily(requested_family));
        }
        let addr = match classify(ip_text)? {
            IpAddr::V4(v4) => v4,
            IpAddr::V6(_) => {
                return Err(ResolveError::family_mismatch(libc::AF_INET, libc::AF_INET6))
            }
        };
        Ok(Self {
            name: try_copy_name(name)?,
            addr,
        })
    }

    /// Moves the result into this thread's scratch record and returns a
    /// pointer to it.
    ///
    /// The pointer stays valid until the next `stage` on the same thread and
    /// must not be passed to another thread. Fails with
    /// [`ResolveError::ScratchUnavailable`] once the thread's scratch record
    /// has been destroyed, e.g. when called from another TLS destructor.
    pub fn stage(self) -> Result<*mut libc::hostent, ResolveError> {
        SCRATCH
            .try_with(|cell| cell.borrow_mut().fill(self))
            .map_err(|_| ResolveError::ScratchUnavailable)
    }
}

/// Copies the caller's name, reporting allocation failure instead of aborting.
fn try_copy_name(name: &CStr) -> Result<CString, ResolveError> {
    let bytes = name.to_bytes();
    let mut buf = Vec::new();
    buf.try_reserve_exact(bytes.len() + 1)
        .map_err(|_| ResolveError::OutOfMemory)?;
    buf.extend_from_slice(bytes);
    // Interior NULs are impossible, the bytes came from a CStr.
    CString::new(buf).map_err(|_| ResolveError::OutOfMemory)
}

/// Backing storage for the `hostent` handed to C callers.
///
/// Every pointer inside `hostent` points into this struct, which lives in
/// thread-local storage and therefore never moves.
struct Scratch {
    name: CString,
    addr: [u8; 4],
    aliases: [*mut c_char; 1],
    addr_list: [*mut c_char; 2],
    hostent: libc::hostent,
}

impl Scratch {
    fn new() -> Self {
        Self {
            name: CString::default(),
            addr: [0; 4],
            aliases: [ptr::null_mut()],
            addr_list: [ptr::null_mut(); 2],
            hostent: libc::hostent {
                h_name: ptr::null_mut(),
                h_aliases: ptr::null_mut(),
                h_addrtype: 0,
                h_length: 0,
                h_addr_list: ptr::null_mut(),
            },
        }
    }

    fn fill(&mut self, result: HostEnt) -> *mut libc::hostent {
        self.name = result.name;
        self.addr = result.addr.octets();
        self.aliases = [ptr::null_mut()];
        self.addr_list = [self.addr.as_mut_ptr().cast::<c_char>(), ptr::null_mut()];
        self.hostent = libc::hostent {
            h_name: self.name.as_ptr().cast_mut(),
            h_aliases: self.aliases.as_mut_ptr(),
            h_addrtype: libc::AF_INET,
            h_length: 4,
            h_addr_list: self.addr_list.as_mut_ptr(),
        };
        &mut self.hostent
    }
}

thread_local! {
    static SCRATCH: RefCell<Scratch> = RefCell::new(Scratch::new());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_synthesize_ipv4() {
        let he = HostEnt::synthesize(c"Test", "192.168.0.1", libc::AF_INET).unwrap();
        assert_eq!(he.name.as_c_str(), c"Test");
        assert_eq!(he.addr, Ipv4Addr::new(192, 168, 0, 1));
    }

    #[test]
    fn test_ipv6_target_falls_through() {
        let err = HostEnt::synthesize(c"test", "2001:db8::1", libc::AF_INET).unwrap_err();
        assert!(err.falls_through());
    }

    #[test]
    fn test_ipv6_request_falls_through() {
        let err = HostEnt::synthesize(c"test", "192.168.0.1", libc::AF_INET6).unwrap_err();
        assert_eq!(err, ResolveError::UnsupportedFamily(libc::AF_INET6));
        assert!(err.falls_through());
    }

    #[test]
    fn test_invalid_target_falls_through() {
        let err = HostEnt::synthesize(c"test", "garbage", libc::AF_INET).unwrap_err();
        assert!(err.falls_through());
    }

    #[test]
    fn test_stage_layout() {
        let he = HostEnt::synthesize(c"test", "10.1.2.3", libc::AF_INET).unwrap();
        let raw = he.stage().unwrap();

        unsafe {
            let he = &*raw;
            assert_eq!(CStr::from_ptr(he.h_name), c"test");
            assert!(!he.h_aliases.is_null());
            assert!((*he.h_aliases).is_null());
            assert_eq!(he.h_addrtype, libc::AF_INET);
            assert_eq!(he.h_length, 4);

            let first = *he.h_addr_list;
            assert!(!first.is_null());
            let octets = std::slice::from_raw_parts(first.cast::<u8>(), 4);
            assert_eq!(octets, &[10, 1, 2, 3]);
            assert!((*he.h_addr_list.add(1)).is_null());
        }
    }

    #[test]
    fn test_stage_reuses_thread_record() {
        let first = HostEnt::synthesize(c"a", "1.1.1.1", libc::AF_INET).unwrap().stage().unwrap();
        let second = HostEnt::synthesize(c"b", "2.2.2.2", libc::AF_INET).unwrap().stage().unwrap();
        assert_eq!(first, second);
        unsafe {
            assert_eq!(CStr::from_ptr((*second).h_name), c"b");
        }
    }

    #[test]
    fn test_stage_is_per_thread() {
        let here = HostEnt::synthesize(c"main", "1.1.1.1", libc::AF_INET)
            .unwrap()
            .stage()
            .unwrap() as usize;
        let there = std::thread::spawn(|| {
            HostEnt::synthesize(c"worker", "2.2.2.2", libc::AF_INET)
                .unwrap()
                .stage()
                .unwrap() as usize
        })
        .join()
        .unwrap();
        assert_ne!(here, there);
        unsafe {
            assert_eq!(CStr::from_ptr((*(here as *mut libc::hostent)).h_name), c"main");
        }
    }

    struct StageOnDrop(Arc<Mutex<Option<Result<(), ResolveError>>>>);

    impl Drop for StageOnDrop {
        fn drop(&mut self) {
            let staged = HostEnt::synthesize(c"late", "3.3.3.3", libc::AF_INET)
                .unwrap()
                .stage()
                .map(|_| ());
            *self.0.lock().unwrap() = Some(staged);
        }
    }

    thread_local! {
        static STAGE_ON_DROP: RefCell<Option<StageOnDrop>> = const { RefCell::new(None) };
    }

    #[test]
    fn test_stage_after_scratch_destroyed() {
        let outcome = Arc::new(Mutex::new(None));
        let slot = outcome.clone();
        std::thread::spawn(move || {
            // Registered first, so its destructor runs after SCRATCH's.
            STAGE_ON_DROP.with(|cell| *cell.borrow_mut() = Some(StageOnDrop(slot)));
            HostEnt::synthesize(c"early", "1.1.1.1", libc::AF_INET)
                .unwrap()
                .stage()
                .unwrap();
        })
        .join()
        .unwrap();
        assert_eq!(*outcome.lock().unwrap(), Some(Err(ResolveError::ScratchUnavailable)));
    }
}

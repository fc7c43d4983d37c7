use std::ffi::c_int;
use thiserror::Error;

/// `h_errno` values from `<netdb.h>`. The `libc` crate does not export them.
pub const NETDB_INTERNAL: c_int = -1;
pub const HOST_NOT_FOUND: c_int = 1;
pub const NO_RECOVERY: c_int = 3;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ResolveError {
    #[error("override target {0:?} is not an IP literal")]
    InvalidAddress(String),
    #[error("override target is {actual}, caller requested {requested}")]
    FamilyMismatch {
        requested: &'static str,
        actual: &'static str,
    },
    #[error("legacy resolver cannot express address family {0}")]
    UnsupportedFamily(c_int),
    #[error("out of memory building resolver result")]
    OutOfMemory,
    #[error("result pointer is null")]
    NullResultPointer,
    #[error("real {0} could not be located")]
    SymbolNotFound(&'static str),
    #[error("per-thread result storage already destroyed")]
    ScratchUnavailable,
}

impl ResolveError {
    /// The `getaddrinfo` return code for this error.
    pub fn as_eai(&self) -> c_int {
        match self {
            ResolveError::InvalidAddress(_) => libc::EAI_NONAME,
            ResolveError::FamilyMismatch { .. } => libc::EAI_NONAME,
            ResolveError::UnsupportedFamily(_) => libc::EAI_FAMILY,
            ResolveError::OutOfMemory => libc::EAI_MEMORY,
            ResolveError::NullResultPointer => libc::EAI_FAIL,
            ResolveError::SymbolNotFound(_) => libc::EAI_FAIL,
            ResolveError::ScratchUnavailable => libc::EAI_FAIL,
        }
    }

    /// The `h_errno` value a legacy entry point reports for this error.
    pub fn as_h_errno(&self) -> c_int {
        match self {
            ResolveError::InvalidAddress(_)
            | ResolveError::FamilyMismatch { .. }
            | ResolveError::UnsupportedFamily(_) => HOST_NOT_FOUND,
            ResolveError::OutOfMemory => NETDB_INTERNAL,
            ResolveError::NullResultPointer
            | ResolveError::SymbolNotFound(_)
            | ResolveError::ScratchUnavailable => NO_RECOVERY,
        }
    }

    /// Whether a legacy entry point should hand the call to the real resolver
    /// instead of failing. True for results the legacy API cannot express,
    /// and for calls made while the thread's result storage is torn down.
    pub fn falls_through(&self) -> bool {
        matches!(
            self,
            ResolveError::InvalidAddress(_)
                | ResolveError::FamilyMismatch { .. }
                | ResolveError::UnsupportedFamily(_)
                | ResolveError::ScratchUnavailable
        )
    }

    pub(crate) fn family_mismatch(requested: libc::c_int, actual: libc::c_int) -> Self {
        ResolveError::FamilyMismatch {
            requested: family_name(requested),
            actual: family_name(actual),
        }
    }
}

fn family_name(family: c_int) -> &'static str {
    match family {
        libc::AF_INET => "AF_INET",
        libc::AF_INET6 => "AF_INET6",
        libc::AF_UNSPEC => "AF_UNSPEC",
        _ => "unknown family",
    }
}

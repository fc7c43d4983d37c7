use crate::base::error::{ResolveError, HOST_NOT_FOUND, NETDB_INTERNAL, NO_RECOVERY};

#[test]
fn test_eai_mapping() {
    assert_eq!(
        ResolveError::InvalidAddress("nope".into()).as_eai(),
        libc::EAI_NONAME
    );
    assert_eq!(
        ResolveError::family_mismatch(libc::AF_INET6, libc::AF_INET).as_eai(),
        libc::EAI_NONAME
    );
    assert_eq!(ResolveError::OutOfMemory.as_eai(), libc::EAI_MEMORY);
    assert_eq!(
        ResolveError::SymbolNotFound("getaddrinfo").as_eai(),
        libc::EAI_FAIL
    );
}

#[test]
fn test_h_errno_mapping() {
    assert_eq!(ResolveError::OutOfMemory.as_h_errno(), NETDB_INTERNAL);
    assert_eq!(
        ResolveError::SymbolNotFound("gethostbyname").as_h_errno(),
        NO_RECOVERY
    );
    assert_eq!(
        ResolveError::UnsupportedFamily(libc::AF_INET6).as_h_errno(),
        HOST_NOT_FOUND
    );
}

#[test]
fn test_unexpressible_results_fall_through() {
    assert!(ResolveError::InvalidAddress("x".into()).falls_through());
    assert!(ResolveError::UnsupportedFamily(libc::AF_INET6).falls_through());
    assert!(ResolveError::family_mismatch(libc::AF_INET, libc::AF_INET6).falls_through());
    assert!(ResolveError::ScratchUnavailable.falls_through());
    assert!(!ResolveError::OutOfMemory.falls_through());
    assert!(!ResolveError::SymbolNotFound("gethostbyname").falls_through());
}

#[test]
fn test_family_mismatch_display() {
    let err = ResolveError::family_mismatch(libc::AF_INET6, libc::AF_INET);
    assert_eq!(
        err.to_string(),
        "override target is AF_INET, caller requested AF_INET6"
    );
}

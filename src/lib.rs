//! # overridehosts
//!
//! Per-process hostname overrides without root and without touching
//! `/etc/hosts`.
//!
//! Built as `liboverridehosts.so` and loaded with `LD_PRELOAD`, the library
//! shadows `getaddrinfo`, `freeaddrinfo`, `gethostbyname` and
//! `gethostbyname2`. Hostnames listed in `OVERRIDEHOSTS` resolve to the
//! given literal; everything else goes to the real resolver.
//!
//! ```text
//! OVERRIDEHOSTS="db:10.0.0.10, cache:[2001:db8::1]" \
//! LD_PRELOAD=./liboverridehosts.so  curl http://db/
//! ```
//!
//! ## Limitations
//!
//! - One address per hostname.
//! - Synthesized `getaddrinfo` results carry port 0; the service argument is
//!   ignored.
//! - `gethostbyname*` only override IPv4 targets. IPv6 targets and
//!   `AF_INET6` requests go to the real resolver.
//! - The `hostent` returned by the legacy calls lives in per-thread storage
//!   and is overwritten by the next legacy call on the same thread.
//!
//! ## Modules
//!
//! - [`base`] - Error type and `EAI_*`/`h_errno` mapping
//! - [`config`] - Environment configuration
//! - [`dns`] - Mapping table, result synthesis and the resolver trait
//! - [`logging`] - Opt-in stderr diagnostics
//! - [`shim`] - The exported C symbols

#![cfg(target_os = "linux")]

pub mod base;
pub mod config;
pub mod dns;
pub mod logging;
pub mod shim;

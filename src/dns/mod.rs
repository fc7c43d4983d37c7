//! Hostname override resolution.
//!
//! Answers the `<netdb.h>` resolver calls for hostnames listed in
//! `OVERRIDEHOSTS` and forwards every other call to the platform resolver:
//! - [`MappingTable`]: the parsed hostname → IP literal table
//! - [`classify`]: IPv4/IPv6 literal classification
//! - [`AddrInfo`] / [`HostEnt`]: synthesized results for `getaddrinfo` and
//!   `gethostbyname*`
//! - [`Resolve`]: the strategy trait behind the exported symbols, with
//!   [`ResolverWithOverrides`] and [`PlatformResolver`] as implementations
//!
//! # Example
//!
//! ```rust,ignore
//! use overridehosts::dns::{MappingTable, PlatformResolver, Resolve, ResolverWithOverrides};
//! use std::sync::Arc;
//!
//! let resolver = ResolverWithOverrides::new(
//!     Arc::new(PlatformResolver::new()),
//!     Arc::new(MappingTable::parse("db:10.0.0.10")),
//! );
//! let mut res = std::ptr::null_mut();
//! let rc = unsafe { resolver.getaddrinfo(c"db".as_ptr(), std::ptr::null(), std::ptr::null(), &mut res) };
//! ```

mod addrinfo;
mod classify;
mod hostent;
mod platform;
mod resolve;
mod table;

pub use addrinfo::{free_raw, AddrInfo, Hints};
pub use classify::{classify, family_of};
pub use hostent::HostEnt;
pub use platform::{set_errno, set_h_errno, PlatformResolver};
pub use resolve::{Resolve, ResolverWithOverrides};
pub use table::MappingTable;

//! Base types and error handling.
//!
//! - [`ResolveError`]: failure reasons of the override path, mapped onto the
//!   `EAI_*` codes of `<netdb.h>`

pub mod error;

pub use error::ResolveError;

#[cfg(test)]
mod tests;

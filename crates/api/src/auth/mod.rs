//! Authentication primitives.
//!
//! Identities are issued by an external auth service; this server only
//! validates the HS256 access tokens it signs.

pub mod jwt;

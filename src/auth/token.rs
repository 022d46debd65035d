//! Signed token payloads and the pair handed back to callers.

pub mod claims;
pub mod pair;
pub mod secret;

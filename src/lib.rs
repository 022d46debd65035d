//! Paired ID/refresh token issuance for user-facing APIs: RS256 identity tokens carrying a user
//! snapshot, HS256 refresh tokens backed by revocable liveness records in a TTL store, and a
//! bounded-execution middleware that writes exactly one response per request.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod account;
pub mod auth;
pub mod config;
pub mod directory;
pub mod error;
pub mod middleware;
pub mod obs;
pub mod password;
pub mod signer;
pub mod store;
pub mod tokens;

mod _prelude {
	pub use std::{
		collections::HashMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};

	pub use crate::error::{Error, Result};
}

pub use http;

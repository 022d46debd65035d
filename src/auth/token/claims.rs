//! JWT claim sets for identity and refresh tokens.

// self
use crate::{
	_prelude::*,
	auth::{User, UserId},
};

/// Claims carried by an RS256 identity token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdTokenClaims {
	/// Full user snapshot (never includes the password hash).
	pub user: User,
	/// Issued-at, unix seconds.
	pub iat: i64,
	/// Expiry, unix seconds.
	pub exp: i64,
}

/// Claims carried by an HS256 refresh token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
	/// Owning user.
	pub uid: UserId,
	/// Session identifier; kept as text so a malformed value is reported as an authorization
	/// failure instead of a decoding one.
	pub jti: String,
	/// Issued-at, unix seconds.
	pub iat: i64,
	/// Expiry, unix seconds.
	pub exp: i64,
}

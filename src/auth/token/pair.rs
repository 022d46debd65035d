//! Issued tokens and the pair returned from signin, signup, and renewal.

// crates.io
use serde::Serializer;
// self
use crate::{
	_prelude::*,
	auth::{Secret, TokenId, UserId},
};

/// Signed identity token plus the lifetime it was minted with.
#[derive(Clone, Debug)]
pub struct IdToken {
	/// Compact JWS string.
	pub token: Secret,
	/// Issued-at instant embedded in the claims.
	pub issued_at: OffsetDateTime,
	/// Expiry instant embedded in the claims.
	pub expires_at: OffsetDateTime,
}

/// Signed refresh token plus the identifiers of its liveness record.
#[derive(Clone, Debug)]
pub struct RefreshToken {
	/// Compact JWS string.
	pub token: Secret,
	/// Session identifier (`jti`).
	pub id: TokenId,
	/// Owning user.
	pub user_id: UserId,
	/// Issued-at instant embedded in the claims.
	pub issued_at: OffsetDateTime,
	/// Expiry instant embedded in the claims.
	pub expires_at: OffsetDateTime,
}
impl RefreshToken {
	/// Returns `true` once the embedded expiry has passed at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}
}

/// Identity token and refresh token issued together.
#[derive(Clone, Debug)]
pub struct TokenPair {
	/// Short-lived identity token.
	pub id_token: IdToken,
	/// Rotating refresh token.
	pub refresh_token: RefreshToken,
}
impl Serialize for TokenPair {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		#[derive(Serialize)]
		#[serde(rename_all = "camelCase")]
		struct Wire<'a> {
			id_token: &'a str,
			refresh_token: &'a str,
		}

		Wire {
			id_token: self.id_token.token.expose(),
			refresh_token: self.refresh_token.token.expose(),
		}
		.serialize(serializer)
	}
}

//! Token issuance, validation, rotation, and revocation.
//!
//! [`TokenService::issue_token_pair`] mints an RS256 identity token and an HS256 refresh token,
//! then writes the refresh token's liveness record. When a previous refresh token is being
//! rotated out, the new record is written *before* the old one is deleted: a crash in between
//! leaves the caller with two usable refresh tokens rather than none. A previous record that is
//! already gone (revoked, expired, or consumed by a concurrent rotation) makes the rotation fail
//! with an authorization error and the freshly written record is removed again.

mod metrics;

pub use metrics::RotationMetrics;

// self
use crate::{
	_prelude::*,
	auth::{
		IdToken, IdTokenClaims, RefreshToken, RefreshTokenClaims, Secret, TokenId, TokenPair, User,
		UserId,
	},
	config::TokenConfig,
	obs::{self, Operation},
	signer::{IdTokenVerifier, TokenKeys},
	store::{SessionKey, SessionStore},
};

const ID_TOKEN_REJECTED: &str = "Unable to verify user from idToken";
const REFRESH_TOKEN_REJECTED: &str = "Unable to verify user from refresh token";
const REFRESH_TOKEN_NOT_LIVE: &str = "Refresh token is invalid or has already been used";

/// Issues and validates token pairs against a [`SessionStore`].
///
/// Key material is immutable and shared; the store handle is shared with whatever else the
/// process composes around it.
pub struct TokenService<S>
where
	S: ?Sized + SessionStore,
{
	/// Liveness-record store.
	pub store: Arc<S>,
	/// Token lifetimes.
	pub config: TokenConfig,
	/// Shared counters for issuance and rotation outcomes.
	pub rotation_metrics: Arc<RotationMetrics>,
	keys: Arc<TokenKeys>,
}
impl<S> TokenService<S>
where
	S: ?Sized + SessionStore,
{
	/// Creates a service over `store` using the provided key material and lifetimes.
	pub fn new(store: Arc<S>, keys: TokenKeys, config: TokenConfig) -> Self {
		Self { store, config, rotation_metrics: Default::default(), keys: Arc::new(keys) }
	}

	/// Returns the public-key verifier other services can use for identity tokens.
	pub fn id_verifier(&self) -> &IdTokenVerifier {
		self.keys.id_verifier()
	}

	/// Issues a fresh token pair for `user`, retiring `previous` when rotating.
	///
	/// Fails with an internal error if signing fails or the new liveness record cannot be
	/// written, and with an authorization error if `previous` no longer has a live record.
	/// A store error while deleting `previous` is logged and does not fail the call.
	pub async fn issue_token_pair(
		&self,
		user: &User,
		previous: Option<TokenId>,
	) -> Result<TokenPair> {
		obs::observe(Operation::IssuePair, "issue_token_pair", async move {
			let now = now_truncated()?;
			let id_token = self.sign_id_token(user, now)?;
			let refresh_token = self.sign_refresh_token(&user.id, now)?;
			let key = SessionKey::new(&user.id, &refresh_token.id);

			self.store.set(&key, self.config.refresh_ttl).await.map_err(|e| {
				tracing::error!(
					user_id = %user.id,
					token_id = %refresh_token.id,
					error = %e,
					"Failed to store refresh token record."
				);

				Error::from(e)
			})?;

			if let Some(previous) = previous {
				self.retire(&user.id, previous, &key).await?;
			}

			self.rotation_metrics.record_issued();

			Ok(TokenPair { id_token, refresh_token })
		})
		.await
	}

	/// Verifies an identity token and returns the embedded user snapshot.
	pub fn validate_id_token(&self, token: &str) -> Result<User> {
		obs::observe_sync(Operation::ValidateIdToken, "validate_id_token", || {
			let claims = self.keys.verify_id(token).map_err(|e| {
				tracing::debug!(error = %e, "Unable to validate or parse idToken.");

				Error::authorization(ID_TOKEN_REJECTED)
			})?;

			Ok(claims.user.snapshot())
		})
	}

	/// Verifies a refresh token's signature and expiry and extracts its identifiers.
	///
	/// The liveness record is not consulted here; rotation and sign-out enforce it.
	pub fn validate_refresh_token(&self, token: &str) -> Result<RefreshToken> {
		obs::observe_sync(Operation::ValidateRefreshToken, "validate_refresh_token", || {
			let claims = self.keys.verify_refresh(token).map_err(|e| {
				tracing::debug!(error = %e, "Unable to validate or parse refresh token.");

				Error::authorization(REFRESH_TOKEN_REJECTED)
			})?;
			let id = TokenId::parse(&claims.jti).map_err(|e| {
				tracing::debug!(jti = %claims.jti, error = %e, "Refresh token jti is not a UUID.");

				Error::authorization(REFRESH_TOKEN_REJECTED)
			})?;

			Ok(RefreshToken {
				token: Secret::new(token),
				id,
				user_id: claims.uid,
				issued_at: from_unix(claims.iat)?,
				expires_at: from_unix(claims.exp)?,
			})
		})
	}

	/// Deletes every liveness record of `user_id`.
	///
	/// Each record is attempted even if another fails; any failure surfaces as an internal error.
	pub async fn signout(&self, user_id: &UserId) -> Result<()> {
		obs::observe(Operation::Signout, "signout", async move {
			let prefix = SessionKey::user_prefix(user_id);
			let report = self.store.scan_delete(&prefix).await?;

			if report.has_failures() {
				tracing::error!(
					user_id = %user_id,
					matched = report.matched,
					failed = report.failed,
					"Failed to delete some refresh token records."
				);

				return Err(Error::internal(format!(
					"{} of {} refresh token records could not be deleted",
					report.failed, report.matched
				)));
			}

			tracing::debug!(user_id = %user_id, deleted = report.deleted, "Signed out user.");

			Ok(())
		})
		.await
	}

	/// Deletes a single liveness record; fails with an authorization error if it did not exist.
	pub async fn signout_one(&self, user_id: &UserId, token_id: &TokenId) -> Result<()> {
		obs::observe(Operation::SignoutOne, "signout_one", async move {
			let key = SessionKey::new(user_id, token_id);

			match self.store.delete(&key).await? {
				0 => Err(Error::authorization(REFRESH_TOKEN_NOT_LIVE)),
				_ => Ok(()),
			}
		})
		.await
	}

	fn sign_id_token(&self, user: &User, now: OffsetDateTime) -> Result<IdToken> {
		let expires_at = now + self.config.id_ttl;
		let claims = IdTokenClaims {
			user: user.snapshot(),
			iat: now.unix_timestamp(),
			exp: expires_at.unix_timestamp(),
		};
		let token = self.keys.sign_id(&claims).map_err(|source| {
			tracing::error!(user_id = %user.id, error = %source, "Failed to sign idToken.");

			Error::Signing { source }
		})?;

		Ok(IdToken { token: Secret::new(token), issued_at: now, expires_at })
	}

	fn sign_refresh_token(&self, user_id: &UserId, now: OffsetDateTime) -> Result<RefreshToken> {
		let id = TokenId::generate();
		let expires_at = now + self.config.refresh_ttl;
		let claims = RefreshTokenClaims {
			uid: user_id.clone(),
			jti: id.to_string(),
			iat: now.unix_timestamp(),
			exp: expires_at.unix_timestamp(),
		};
		let token = self.keys.sign_refresh(&claims).map_err(|source| {
			tracing::error!(user_id = %user_id, error = %source, "Failed to sign refresh token.");

			Error::Signing { source }
		})?;

		Ok(RefreshToken {
			token: Secret::new(token),
			id,
			user_id: user_id.clone(),
			issued_at: now,
			expires_at,
		})
	}

	async fn retire(
		&self,
		user_id: &UserId,
		previous: TokenId,
		replacement: &SessionKey,
	) -> Result<()> {
		let stale = SessionKey::new(user_id, &previous);

		match self.store.delete(&stale).await {
			Ok(0) => {
				self.rotation_metrics.record_rejected();
				tracing::warn!(
					user_id = %user_id,
					token_id = %previous,
					"Previous refresh token has no live record; refusing rotation."
				);

				if let Err(e) = self.store.delete(replacement).await {
					tracing::warn!(
						key = %replacement,
						error = %e,
						"Failed to roll back refresh token record."
					);
				}

				Err(Error::authorization(REFRESH_TOKEN_NOT_LIVE))
			},
			Ok(_) => {
				self.rotation_metrics.record_rotated();

				Ok(())
			},
			Err(e) => {
				self.rotation_metrics.record_stale_delete_failure();
				tracing::warn!(
					user_id = %user_id,
					token_id = %previous,
					error = %e,
					"Could not delete previous refresh token record."
				);

				Ok(())
			},
		}
	}
}
impl<S> Clone for TokenService<S>
where
	S: ?Sized + SessionStore,
{
	fn clone(&self) -> Self {
		Self {
			store: self.store.clone(),
			config: self.config,
			rotation_metrics: self.rotation_metrics.clone(),
			keys: self.keys.clone(),
		}
	}
}
impl<S> Debug for TokenService<S>
where
	S: ?Sized + SessionStore,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenService")
			.field("config", &self.config)
			.field("keys", &self.keys)
			.finish_non_exhaustive()
	}
}

fn now_truncated() -> Result<OffsetDateTime> {
	OffsetDateTime::now_utc()
		.replace_nanosecond(0)
		.map_err(|e| Error::internal(format!("clock out of range: {e}")))
}

fn from_unix(secs: i64) -> Result<OffsetDateTime> {
	OffsetDateTime::from_unix_timestamp(secs)
		.map_err(|_| Error::authorization(REFRESH_TOKEN_REJECTED))
}

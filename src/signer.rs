//! Key material plus the RS256/HS256 signers and verifiers for both token kinds.
//!
//! Identity tokens are signed with an RSA private key so any holder of the public key can verify
//! them ([`IdTokenVerifier`]). Refresh tokens are signed with a shared HMAC secret and can only be
//! verified by the issuing service. Validation applies no clock-skew leeway.

// std
use std::{fs, path::Path};
// crates.io
use jsonwebtoken::{
	Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::Error as JwtError,
};
// self
use crate::{
	_prelude::*,
	auth::{IdTokenClaims, RefreshTokenClaims},
	error::ConfigError,
};

/// Public-key verifier for identity tokens, suitable for distribution to other services.
#[derive(Clone)]
pub struct IdTokenVerifier {
	key: DecodingKey,
	validation: Validation,
}
impl IdTokenVerifier {
	/// Builds a verifier from an RSA public key in PEM form (SPKI or PKCS#1).
	pub fn from_public_pem(public_pem: &[u8]) -> Result<Self, ConfigError> {
		let key = DecodingKey::from_rsa_pem(public_pem)
			.map_err(|source| ConfigError::InvalidKey { key: "ID token public", source })?;

		Ok(Self { key, validation: strict_validation(Algorithm::RS256) })
	}

	/// Verifies signature, algorithm, and expiry and returns the claims.
	pub fn verify(&self, token: &str) -> Result<IdTokenClaims, JwtError> {
		jsonwebtoken::decode::<IdTokenClaims>(token, &self.key, &self.validation)
			.map(|data| data.claims)
	}
}
impl Debug for IdTokenVerifier {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("IdTokenVerifier").field("algorithm", &Algorithm::RS256).finish()
	}
}

/// Immutable process-wide signing material for both token kinds.
#[derive(Clone)]
pub struct TokenKeys {
	id_signing: EncodingKey,
	id_verifier: IdTokenVerifier,
	refresh_signing: EncodingKey,
	refresh_verifying: DecodingKey,
	refresh_validation: Validation,
}
impl TokenKeys {
	/// Builds key material from PEM-encoded RSA keys and the refresh-token secret.
	pub fn from_pem(
		private_pem: &[u8],
		public_pem: &[u8],
		refresh_secret: &[u8],
	) -> Result<Self, ConfigError> {
		if refresh_secret.is_empty() {
			return Err(ConfigError::EmptyRefreshSecret);
		}

		let id_signing = EncodingKey::from_rsa_pem(private_pem)
			.map_err(|source| ConfigError::InvalidKey { key: "ID token private", source })?;
		let id_verifier = IdTokenVerifier::from_public_pem(public_pem)?;

		Ok(Self {
			id_signing,
			id_verifier,
			refresh_signing: EncodingKey::from_secret(refresh_secret),
			refresh_verifying: DecodingKey::from_secret(refresh_secret),
			refresh_validation: strict_validation(Algorithm::HS256),
		})
	}

	/// Reads both PEM files and builds key material.
	pub fn from_pem_files(
		private_path: impl AsRef<Path>,
		public_path: impl AsRef<Path>,
		refresh_secret: &[u8],
	) -> Result<Self, ConfigError> {
		let private_pem = read_key_file(private_path.as_ref())?;
		let public_pem = read_key_file(public_path.as_ref())?;

		Self::from_pem(&private_pem, &public_pem, refresh_secret)
	}

	/// Returns the public-key verifier for identity tokens.
	pub fn id_verifier(&self) -> &IdTokenVerifier {
		&self.id_verifier
	}

	/// Signs identity-token claims with RS256.
	pub fn sign_id(&self, claims: &IdTokenClaims) -> Result<String, JwtError> {
		jsonwebtoken::encode(&Header::new(Algorithm::RS256), claims, &self.id_signing)
	}

	/// Verifies an identity token with the public key.
	pub fn verify_id(&self, token: &str) -> Result<IdTokenClaims, JwtError> {
		self.id_verifier.verify(token)
	}

	/// Signs refresh-token claims with HS256.
	pub fn sign_refresh(&self, claims: &RefreshTokenClaims) -> Result<String, JwtError> {
		jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.refresh_signing)
	}

	/// Verifies a refresh token with the shared secret.
	pub fn verify_refresh(&self, token: &str) -> Result<RefreshTokenClaims, JwtError> {
		jsonwebtoken::decode::<RefreshTokenClaims>(
			token,
			&self.refresh_verifying,
			&self.refresh_validation,
		)
		.map(|data| data.claims)
	}
}
impl Debug for TokenKeys {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenKeys")
			.field("id_algorithm", &Algorithm::RS256)
			.field("refresh_algorithm", &Algorithm::HS256)
			.finish_non_exhaustive()
	}
}

fn strict_validation(algorithm: Algorithm) -> Validation {
	let mut validation = Validation::new(algorithm);

	validation.leeway = 0;
	validation.set_required_spec_claims(&["exp", "iat"]);

	validation
}

fn read_key_file(path: &Path) -> Result<Vec<u8>, ConfigError> {
	fs::read(path)
		.map_err(|source| ConfigError::KeyFile { path: path.display().to_string(), source })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::{User, UserId};

	const PRIVATE_PEM: &[u8] = include_bytes!("../tests/fixtures/id_rsa.pem");
	const PUBLIC_PEM: &[u8] = include_bytes!("../tests/fixtures/id_rsa.pub.pem");
	const OTHER_PUBLIC_PEM: &[u8] = include_bytes!("../tests/fixtures/other_rsa.pub.pem");

	fn keys() -> TokenKeys {
		TokenKeys::from_pem(PRIVATE_PEM, PUBLIC_PEM, b"refresh-secret")
			.expect("Fixture key material should load.")
	}

	fn id_claims(exp_offset: i64) -> IdTokenClaims {
		let now = OffsetDateTime::now_utc().unix_timestamp();

		IdTokenClaims {
			user: User::new(UserId::new("u1").expect("User id should be valid."), "a@b.com"),
			iat: now,
			exp: now + exp_offset,
		}
	}

	#[test]
	fn id_tokens_verify_with_public_key_only() {
		let keys = keys();
		let claims = id_claims(60);
		let token = keys.sign_id(&claims).expect("Signing should succeed.");

		assert_eq!(token.split('.').count(), 3);

		let verifier =
			IdTokenVerifier::from_public_pem(PUBLIC_PEM).expect("Public key should load.");

		assert_eq!(verifier.verify(&token).expect("Verification should succeed."), claims);

		let stranger =
			IdTokenVerifier::from_public_pem(OTHER_PUBLIC_PEM).expect("Public key should load.");

		assert!(stranger.verify(&token).is_err());
	}

	#[test]
	fn expired_tokens_fail_without_leeway() {
		let keys = keys();
		let token = keys.sign_id(&id_claims(-5)).expect("Signing should succeed.");

		assert!(keys.verify_id(&token).is_err());
	}

	#[test]
	fn algorithms_are_not_interchangeable() {
		let keys = keys();
		let now = OffsetDateTime::now_utc().unix_timestamp();
		let refresh = keys
			.sign_refresh(&RefreshTokenClaims {
				uid: UserId::new("u1").expect("User id should be valid."),
				jti: "jti".into(),
				iat: now,
				exp: now + 60,
			})
			.expect("Signing should succeed.");

		assert!(keys.verify_id(&refresh).is_err());
		assert!(keys.verify_refresh(&refresh).is_ok());

		let id = keys.sign_id(&id_claims(60)).expect("Signing should succeed.");

		assert!(keys.verify_refresh(&id).is_err());
	}

	#[test]
	fn rejects_bad_material() {
		assert!(matches!(
			TokenKeys::from_pem(PRIVATE_PEM, PUBLIC_PEM, b""),
			Err(ConfigError::EmptyRefreshSecret)
		));
		assert!(matches!(
			TokenKeys::from_pem(b"not a key", PUBLIC_PEM, b"secret"),
			Err(ConfigError::InvalidKey { key: "ID token private", .. })
		));
		assert!(matches!(
			TokenKeys::from_pem_files("/nonexistent/id_rsa", "/nonexistent/id_rsa.pub", b"s"),
			Err(ConfigError::KeyFile { .. })
		));
	}
}

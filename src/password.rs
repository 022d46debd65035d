//! Password hashing boundary used by the account flows.

// crates.io
use argon2::{
	Argon2, PasswordHash,
	password_hash::{
		Error as HashError, PasswordHasher as _, PasswordVerifier as _, SaltString,
	},
};
// self
use crate::{_prelude::*, auth::Secret};

/// Hashes and compares account passwords.
pub trait PasswordVerifier
where
	Self: Send + Sync,
{
	/// Produces a self-describing hash of `plaintext`.
	fn hash(&self, plaintext: &str) -> Result<Secret, PasswordError>;

	/// Returns `true` when `plaintext` matches `hash`.
	///
	/// A mismatch is `Ok(false)`; only unusable hashes or backend failures are errors.
	fn compare(&self, hash: &Secret, plaintext: &str) -> Result<bool, PasswordError>;
}

/// Failures from a [`PasswordVerifier`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum PasswordError {
	/// The stored hash could not be parsed.
	#[error("Stored password hash is malformed.")]
	MalformedHash,
	/// Hashing itself failed.
	#[error("Password hashing failed: {message}.")]
	Hash {
		/// Backend description.
		message: String,
	},
}

/// Argon2id hasher producing PHC strings with a random 16-byte salt.
#[derive(Clone, Default)]
pub struct Argon2Passwords {
	argon2: Argon2<'static>,
}
impl Argon2Passwords {
	/// Uses explicit Argon2 parameters instead of the library defaults.
	pub fn with_params(params: argon2::Params) -> Self {
		Self { argon2: Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params) }
	}
}
impl PasswordVerifier for Argon2Passwords {
	fn hash(&self, plaintext: &str) -> Result<Secret, PasswordError> {
		let salt = SaltString::encode_b64(&rand::random::<[u8; 16]>()).map_err(hash_error)?;
		let hash = self.argon2.hash_password(plaintext.as_bytes(), &salt).map_err(hash_error)?;

		Ok(Secret::new(hash.to_string()))
	}

	fn compare(&self, hash: &Secret, plaintext: &str) -> Result<bool, PasswordError> {
		let parsed = PasswordHash::new(hash.expose()).map_err(|_| PasswordError::MalformedHash)?;

		match self.argon2.verify_password(plaintext.as_bytes(), &parsed) {
			Ok(()) => Ok(true),
			Err(HashError::Password) => Ok(false),
			Err(e) => Err(hash_error(e)),
		}
	}
}
impl Debug for Argon2Passwords {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Argon2Passwords").finish_non_exhaustive()
	}
}

fn hash_error(e: HashError) -> PasswordError {
	PasswordError::Hash { message: e.to_string() }
}

//! User-directory boundary: the profile store the account flows read and write through.

pub mod memory;

pub use memory::MemoryDirectory;

// self
use crate::{
	_prelude::*,
	auth::{User, UserId},
};

/// Boxed future returned by [`UserDirectory`] operations.
pub type DirectoryFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, DirectoryError>> + 'a + Send>>;

/// Profile store contract.
pub trait UserDirectory
where
	Self: Send + Sync,
{
	/// Loads a user (including the password hash) by identifier.
	fn find_by_id<'a>(&'a self, id: &'a UserId) -> DirectoryFuture<'a, User>;

	/// Loads a user (including the password hash) by email.
	fn find_by_email<'a>(&'a self, email: &'a str) -> DirectoryFuture<'a, User>;

	/// Inserts a new user; fails with [`DirectoryError::Conflict`] on a duplicate email.
	fn create(&self, user: User) -> DirectoryFuture<'_, User>;

	/// Replaces an existing user's profile.
	fn update(&self, user: User) -> DirectoryFuture<'_, User>;
}

/// Error type produced by [`UserDirectory`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum DirectoryError {
	/// No user matched the lookup.
	#[error("No user with {field} {value}.")]
	NotFound {
		/// Lookup field.
		field: &'static str,
		/// Lookup value.
		value: String,
	},
	/// A unique field collided with another user.
	#[error("A user with {field} {value} already exists.")]
	Conflict {
		/// Colliding field.
		field: &'static str,
		/// Colliding value.
		value: String,
	},
	/// Backend-level failure.
	#[error("Directory backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
impl From<DirectoryError> for Error {
	fn from(e: DirectoryError) -> Self {
		match e {
			DirectoryError::NotFound { field, value } => Error::NotFound { resource: field, value },
			DirectoryError::Conflict { field, value } => Error::Conflict { resource: field, value },
			DirectoryError::Backend { .. } => Error::Directory(e),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::ErrorKind;

	#[test]
	fn directory_errors_map_onto_domain_kinds() {
		let not_found: Error = DirectoryError::NotFound { field: "uid", value: "u1".into() }.into();
		let conflict: Error =
			DirectoryError::Conflict { field: "email", value: "a@b.com".into() }.into();
		let backend: Error = DirectoryError::Backend { message: "pool closed".into() }.into();

		assert_eq!(not_found.kind(), ErrorKind::NotFound);
		assert_eq!(conflict.kind(), ErrorKind::Conflict);
		assert_eq!(backend.kind(), ErrorKind::Internal);
		assert!(!backend.body().message.contains("pool"));
	}
}

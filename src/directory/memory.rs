//! In-memory [`UserDirectory`] for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{User, UserId},
	directory::{DirectoryError, DirectoryFuture, UserDirectory},
};

type UserMap = Arc<RwLock<HashMap<UserId, User>>>;

/// Process-local directory; emails are unique case-insensitively.
#[derive(Clone, Debug, Default)]
pub struct MemoryDirectory(UserMap);
impl MemoryDirectory {
	fn find_by_id_now(map: &UserMap, id: &UserId) -> Result<User, DirectoryError> {
		map.read()
			.get(id)
			.cloned()
			.ok_or_else(|| DirectoryError::NotFound { field: "uid", value: id.to_string() })
	}

	fn find_by_email_now(map: &UserMap, email: &str) -> Result<User, DirectoryError> {
		map.read()
			.values()
			.find(|user| user.email.eq_ignore_ascii_case(email))
			.cloned()
			.ok_or_else(|| DirectoryError::NotFound { field: "email", value: email.to_owned() })
	}

	fn create_now(map: &UserMap, user: User) -> Result<User, DirectoryError> {
		let mut guard = map.write();

		if guard.values().any(|existing| existing.email.eq_ignore_ascii_case(&user.email)) {
			return Err(DirectoryError::Conflict { field: "email", value: user.email });
		}
		if guard.contains_key(&user.id) {
			return Err(DirectoryError::Conflict { field: "uid", value: user.id.to_string() });
		}

		guard.insert(user.id.clone(), user.clone());

		Ok(user)
	}

	fn update_now(map: &UserMap, user: User) -> Result<User, DirectoryError> {
		let mut guard = map.write();

		if !guard.contains_key(&user.id) {
			return Err(DirectoryError::NotFound { field: "uid", value: user.id.to_string() });
		}
		if guard
			.values()
			.any(|other| other.id != user.id && other.email.eq_ignore_ascii_case(&user.email))
		{
			return Err(DirectoryError::Conflict { field: "email", value: user.email });
		}

		guard.insert(user.id.clone(), user.clone());

		Ok(user)
	}
}
impl UserDirectory for MemoryDirectory {
	fn find_by_id<'a>(&'a self, id: &'a UserId) -> DirectoryFuture<'a, User> {
		Box::pin(async move { Self::find_by_id_now(&self.0, id) })
	}

	fn find_by_email<'a>(&'a self, email: &'a str) -> DirectoryFuture<'a, User> {
		Box::pin(async move { Self::find_by_email_now(&self.0, email) })
	}

	fn create(&self, user: User) -> DirectoryFuture<'_, User> {
		Box::pin(async move { Self::create_now(&self.0, user) })
	}

	fn update(&self, user: User) -> DirectoryFuture<'_, User> {
		Box::pin(async move { Self::update_now(&self.0, user) })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn user(id: &str, email: &str) -> User {
		User::new(UserId::new(id).expect("User id fixture should be valid."), email)
	}

	#[tokio::test]
	async fn create_rejects_duplicate_email() {
		let directory = MemoryDirectory::default();

		directory.create(user("u1", "a@b.com")).await.expect("First create should succeed.");

		let err = directory
			.create(user("u2", "A@B.com"))
			.await
			.expect_err("Duplicate email should be rejected.");

		assert_eq!(err, DirectoryError::Conflict { field: "email", value: "A@B.com".into() });
		assert_eq!(
			directory.find_by_email("a@b.com").await.expect("Lookup should succeed.").id.as_ref(),
			"u1"
		);
	}

	#[tokio::test]
	async fn update_requires_existing_user_and_unique_email() {
		let directory = MemoryDirectory::default();

		directory.create(user("u1", "a@b.com")).await.expect("Create u1 should succeed.");
		directory.create(user("u2", "c@d.com")).await.expect("Create u2 should succeed.");

		assert!(matches!(
			directory.update(user("u3", "x@y.com")).await,
			Err(DirectoryError::NotFound { field: "uid", .. })
		));
		assert!(matches!(
			directory.update(user("u2", "a@b.com")).await,
			Err(DirectoryError::Conflict { field: "email", .. })
		));

		let mut renamed = user("u2", "c@d.com");

		renamed.name = "Ada".into();

		directory.update(renamed).await.expect("Update should succeed.");

		let id = UserId::new("u2").expect("User id fixture should be valid.");

		assert_eq!(directory.find_by_id(&id).await.expect("Lookup should succeed.").name, "Ada");
	}
}

//! User snapshot embedded into identity tokens.

// self
use crate::{
	_prelude::*,
	auth::{Secret, UserId},
};

/// Account profile as seen by the token subsystem.
///
/// The password hash is skipped by serde in both directions, so it can never be embedded into an
/// identity token or a response body; a deserialized snapshot always carries `None`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
	/// Unique account identifier.
	#[serde(rename = "uid")]
	pub id: UserId,
	/// Login email.
	pub email: String,
	/// Display name.
	#[serde(default)]
	pub name: String,
	/// Avatar reference.
	#[serde(default)]
	pub image_url: String,
	/// Personal website.
	#[serde(default)]
	pub website: String,
	/// Password hash, present only on records loaded from the directory.
	#[serde(skip)]
	pub password: Option<Secret>,
}
impl User {
	/// Creates a profile with only the identifier and email populated.
	pub fn new(id: UserId, email: impl Into<String>) -> Self {
		Self {
			id,
			email: email.into(),
			name: String::new(),
			image_url: String::new(),
			website: String::new(),
			password: None,
		}
	}

	/// Returns a copy without the password hash.
	pub fn snapshot(&self) -> Self {
		Self { password: None, ..self.clone() }
	}
}
impl Debug for User {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("User")
			.field("id", &self.id)
			.field("email", &self.email)
			.field("name", &self.name)
			.field("image_url", &self.image_url)
			.field("website", &self.website)
			.field("password", &self.password.as_ref().map(|_| "<redacted>"))
			.finish()
	}
}

//! Strongly typed identifiers for users and refresh-token sessions.

// std
use std::{borrow::Borrow, ops::Deref};
// crates.io
use uuid::{Builder, Uuid};
// self
use crate::_prelude::*;

const IDENTIFIER_MAX_LEN: usize = 128;
// ':' separates session-key segments; the rest are glob metacharacters in store scans.
const RESERVED_CHARS: [char; 5] = [':', '*', '?', '[', ']'];

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier.
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier.
		kind: &'static str,
	},
	/// The identifier contains a character reserved by the session-key layout.
	#[error("{kind} identifier contains the reserved character `{found}`.")]
	ReservedCharacter {
		/// Kind of identifier.
		kind: &'static str,
		/// Offending character.
		found: char,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier.
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
	/// The identifier is not a UUID.
	#[error("{kind} identifier is not a valid UUID.")]
	NotUuid {
		/// Kind of identifier.
		kind: &'static str,
	},
}

/// Unique identifier for a user account.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);
impl UserId {
	const KIND: &'static str = "User";

	/// Creates a new identifier after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
		let view = value.as_ref();

		validate_view(Self::KIND, view)?;

		Ok(Self(view.to_owned()))
	}

	/// Generates a random UUID-formatted identifier for a new account.
	pub fn generate() -> Self {
		Self(random_uuid().to_string())
	}
}
impl Deref for UserId {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for UserId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for UserId {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<UserId> for String {
	fn from(value: UserId) -> Self {
		value.0
	}
}
impl TryFrom<String> for UserId {
	type Error = IdentifierError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_view(Self::KIND, &value)?;

		Ok(Self(value))
	}
}
impl Debug for UserId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "User({})", self.0)
	}
}
impl Display for UserId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl FromStr for UserId {
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

/// Identifier of a single refresh-token session (the JWT `jti`).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenId(Uuid);
impl TokenId {
	/// Generates a fresh random identifier.
	pub fn generate() -> Self {
		Self(random_uuid())
	}

	/// Parses a hyphenated (or simple) UUID string.
	pub fn parse(value: &str) -> Result<Self, IdentifierError> {
		Uuid::parse_str(value).map(Self).map_err(|_| IdentifierError::NotUuid { kind: "Token" })
	}

	/// Returns the underlying UUID.
	pub fn as_uuid(&self) -> &Uuid {
		&self.0
	}
}
impl Debug for TokenId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Token({})", self.0)
	}
}
impl Display for TokenId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		Display::fmt(&self.0.hyphenated(), f)
	}
}
impl FromStr for TokenId {
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

fn random_uuid() -> Uuid {
	Builder::from_random_bytes(rand::random()).into_uuid()
}

fn validate_view(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}
	if let Some(found) = view.chars().find(|c| RESERVED_CHARS.contains(c)) {
		return Err(IdentifierError::ReservedCharacter { kind, found });
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn user_ids_validate() {
		assert!(UserId::new(" u1").is_err(), "Leading whitespace must be rejected.");
		assert!(UserId::new("").is_err());
		assert_eq!(
			UserId::new("u1:evil"),
			Err(IdentifierError::ReservedCharacter { kind: "User", found: ':' })
		);
		assert!(UserId::new("u*").is_err());

		let user = UserId::new("u1").expect("User fixture should be considered valid.");

		assert_eq!(user.as_ref(), "u1");
		assert!(UserId::new("a".repeat(IDENTIFIER_MAX_LEN + 1)).is_err());
	}

	#[test]
	fn serde_enforces_validation() {
		let user: UserId =
			serde_json::from_str("\"u-42\"").expect("User id should deserialize successfully.");

		assert_eq!(user.as_ref(), "u-42");
		assert!(serde_json::from_str::<UserId>("\"with space\"").is_err());
	}

	#[test]
	fn generated_ids_are_valid_and_distinct() {
		let a = UserId::generate();
		let b = UserId::generate();

		assert_ne!(a, b);
		UserId::new(a.as_ref()).expect("Generated user id should pass validation.");

		let token = TokenId::generate();

		assert_eq!(token.as_uuid().get_version_num(), 4);
		assert_eq!(TokenId::parse(&token.to_string()), Ok(token));
	}

	#[test]
	fn token_id_rejects_non_uuid() {
		assert_eq!(TokenId::parse("not-a-uuid"), Err(IdentifierError::NotUuid { kind: "Token" }));
	}
}

//! Credential material that must stay out of logs: signed tokens and password hashes.

// self
use crate::_prelude::*;

/// Sensitive string with redacted formatting and length-independent comparison.
///
/// Serializes as the plain string so it can be placed on the wire or in a directory record.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);
impl Secret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Borrows the raw value for signing, verification, or transport.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Hands the raw value to the caller, e.g. to build a response body.
	pub fn into_inner(self) -> String {
		self.0
	}

	/// Returns `true` when no material is held.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl AsRef<str> for Secret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl From<String> for Secret {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl From<&str> for Secret {
	fn from(value: &str) -> Self {
		Self(value.to_owned())
	}
}
impl PartialEq for Secret {
	// Every byte is visited so timing does not reveal the first mismatch.
	fn eq(&self, other: &Self) -> bool {
		let (a, b) = (self.0.as_bytes(), other.0.as_bytes());

		a.len() == b.len() && a.iter().zip(b).fold(0_u8, |acc, (x, y)| acc | (x ^ y)) == 0
	}
}
impl Eq for Secret {}
impl Debug for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Secret(<{} bytes redacted>)", self.0.len())
	}
}
impl Display for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

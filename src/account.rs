//! Account flows layered over the token engine: signup, signin, renewal, sign-out, and profile
//! maintenance.
//!
//! Transports bind requests to these methods and render [`Error::body`] on failure.

// self
use crate::{
	_prelude::*,
	auth::{Secret, TokenPair, User, UserId},
	directory::{DirectoryError, UserDirectory},
	password::PasswordVerifier,
	store::SessionStore,
	tokens::TokenService,
};

const INVALID_CREDENTIALS: &str = "Invalid email and password combination";
const PASSWORD_LEN: std::ops::RangeInclusive<usize> = 6..=30;
const NAME_MAX_LEN: usize = 40;

/// Profile fields a signed-in user may change.
///
/// An empty `email` keeps the current address; empty `name`/`website` clear those fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
	/// Display name, at most 40 characters.
	#[serde(default)]
	pub name: String,
	/// New login email.
	#[serde(default)]
	pub email: String,
	/// Absolute `http(s)` URL.
	#[serde(default)]
	pub website: String,
}

/// Transport-facing account facade.
pub struct AccountService<D, P, S>
where
	D: ?Sized + UserDirectory,
	P: ?Sized + PasswordVerifier,
	S: ?Sized + SessionStore,
{
	directory: Arc<D>,
	passwords: Arc<P>,
	tokens: TokenService<S>,
}
impl<D, P, S> AccountService<D, P, S>
where
	D: ?Sized + UserDirectory,
	P: 'static + ?Sized + PasswordVerifier,
	S: ?Sized + SessionStore,
{
	/// Composes the facade from its collaborators.
	pub fn new(directory: Arc<D>, passwords: Arc<P>, tokens: TokenService<S>) -> Self {
		Self { directory, passwords, tokens }
	}

	/// Underlying token engine.
	pub fn tokens(&self) -> &TokenService<S> {
		&self.tokens
	}

	/// Creates an account and returns its first token pair.
	pub async fn signup(&self, email: &str, password: &str) -> Result<TokenPair> {
		validate_email(email)?;
		validate_password(password)?;

		let hash = self.hash_password(password).await.inspect_err(|e| {
			tracing::error!(email, error = %e, "Unable to hash password during signup.");
		})?;
		let mut user = User::new(UserId::generate(), email);

		user.password = Some(hash);

		let user = self.directory.create(user).await?;

		tracing::debug!(user_id = %user.id, "Created account.");

		self.tokens.issue_token_pair(&user, None).await
	}

	/// Checks credentials and returns a fresh token pair.
	pub async fn signin(&self, email: &str, password: &str) -> Result<TokenPair> {
		let user = match self.directory.find_by_email(email).await {
			Ok(user) => user,
			Err(DirectoryError::NotFound { .. }) =>
				return Err(Error::authorization(INVALID_CREDENTIALS)),
			Err(e) => return Err(e.into()),
		};
		let Some(hash) = user.password.clone() else {
			tracing::warn!(user_id = %user.id, "Account has no password hash.");

			return Err(Error::authorization(INVALID_CREDENTIALS));
		};

		if !self.compare_password(hash, password).await? {
			return Err(Error::authorization(INVALID_CREDENTIALS));
		}

		self.tokens.issue_token_pair(&user, None).await
	}

	/// Exchanges a live refresh token for a new pair, retiring the old one.
	pub async fn renew(&self, refresh_token: &str) -> Result<TokenPair> {
		let refresh = self.tokens.validate_refresh_token(refresh_token)?;
		let user = self.directory.find_by_id(&refresh.user_id).await?;

		self.tokens.issue_token_pair(&user, Some(refresh.id)).await.inspect_err(|e| {
			tracing::debug!(user_id = %user.id, error = %e, "Refresh token renewal failed.");
		})
	}

	/// Revokes every refresh token of `user_id`.
	pub async fn signout(&self, user_id: &UserId) -> Result<()> {
		self.tokens.signout(user_id).await
	}

	/// Revokes only the session behind `refresh_token`.
	pub async fn signout_one(&self, refresh_token: &str) -> Result<()> {
		let refresh = self.tokens.validate_refresh_token(refresh_token)?;

		self.tokens.signout_one(&refresh.user_id, &refresh.id).await
	}

	/// Resolves the caller behind an identity token.
	pub fn authenticate(&self, id_token: &str) -> Result<User> {
		self.tokens.validate_id_token(id_token)
	}

	/// Current profile of `user_id`.
	pub async fn me(&self, user_id: &UserId) -> Result<User> {
		Ok(self.directory.find_by_id(user_id).await?.snapshot())
	}

	/// Applies `update` to the profile of `user_id` and returns the stored result.
	pub async fn update_details(&self, user_id: &UserId, update: ProfileUpdate) -> Result<User> {
		if update.name.chars().count() > NAME_MAX_LEN {
			return Err(Error::bad_request(format!(
				"name must be at most {NAME_MAX_LEN} characters"
			)));
		}
		if !update.email.is_empty() {
			validate_email(&update.email)?;
		}
		if !update.website.is_empty() && !is_http_url(&update.website) {
			return Err(Error::bad_request("website must be an http or https URL"));
		}

		let mut user = self.directory.find_by_id(user_id).await?;

		user.name = update.name;
		user.website = update.website;

		if !update.email.is_empty() {
			user.email = update.email;
		}

		let user = self.directory.update(user).await.inspect_err(|e| {
			tracing::warn!(user_id = %user_id, error = %e, "Failed to update user.");
		})?;

		Ok(user.snapshot())
	}

	async fn hash_password(&self, password: &str) -> Result<Secret> {
		let passwords = self.passwords.clone();
		let password = password.to_owned();

		tokio::task::spawn_blocking(move || passwords.hash(&password))
			.await
			.map_err(|e| Error::internal(format!("password hashing task failed: {e}")))?
			.map_err(Error::from)
	}

	async fn compare_password(&self, hash: Secret, password: &str) -> Result<bool> {
		let passwords = self.passwords.clone();
		let password = password.to_owned();

		tokio::task::spawn_blocking(move || passwords.compare(&hash, &password))
			.await
			.map_err(|e| Error::internal(format!("password comparison task failed: {e}")))?
			.map_err(Error::from)
	}
}
impl<D, P, S> Clone for AccountService<D, P, S>
where
	D: ?Sized + UserDirectory,
	P: ?Sized + PasswordVerifier,
	S: ?Sized + SessionStore,
{
	fn clone(&self) -> Self {
		Self {
			directory: self.directory.clone(),
			passwords: self.passwords.clone(),
			tokens: self.tokens.clone(),
		}
	}
}
impl<D, P, S> Debug for AccountService<D, P, S>
where
	D: ?Sized + UserDirectory,
	P: ?Sized + PasswordVerifier,
	S: ?Sized + SessionStore,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccountService").field("tokens", &self.tokens).finish_non_exhaustive()
	}
}

fn validate_email(email: &str) -> Result<()> {
	let valid = match email.split_once('@') {
		Some((local, domain)) =>
			!local.is_empty()
				&& !domain.is_empty()
				&& !domain.contains('@')
				&& !email.chars().any(char::is_whitespace),
		None => false,
	};

	if valid { Ok(()) } else { Err(Error::bad_request("email must be a valid address")) }
}

fn validate_password(password: &str) -> Result<()> {
	if PASSWORD_LEN.contains(&password.chars().count()) {
		Ok(())
	} else {
		Err(Error::bad_request(format!(
			"password must be between {} and {} characters",
			PASSWORD_LEN.start(),
			PASSWORD_LEN.end()
		)))
	}
}

fn is_http_url(value: &str) -> bool {
	["http://", "https://"]
		.iter()
		.any(|scheme| value.strip_prefix(scheme).is_some_and(|rest| !rest.is_empty()))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn emails_need_one_at_with_both_parts() {
		assert!(validate_email("a@b.com").is_ok());
		assert!(validate_email("ab.com").is_err());
		assert!(validate_email("@b.com").is_err());
		assert!(validate_email("a@").is_err());
		assert!(validate_email("a@b@c").is_err());
		assert!(validate_email("a b@c.com").is_err());
	}

	#[test]
	fn passwords_are_length_bounded() {
		assert!(validate_password("12345").is_err());
		assert!(validate_password("123456").is_ok());
		assert!(validate_password(&"x".repeat(30)).is_ok());
		assert!(validate_password(&"x".repeat(31)).is_err());
	}

	#[test]
	fn websites_need_http_scheme() {
		assert!(is_http_url("https://example.com"));
		assert!(is_http_url("http://example.com"));
		assert!(!is_http_url("ftp://example.com"));
		assert!(!is_http_url("https://"));
	}
}

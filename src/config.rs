//! Token lifetimes and their builder.

// self
use crate::{_prelude::*, error::ConfigError};

/// Lifetimes applied to every issued token pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenConfig {
	/// Identity-token lifetime.
	pub id_ttl: Duration,
	/// Refresh-token lifetime; also the liveness-record TTL.
	pub refresh_ttl: Duration,
}
impl TokenConfig {
	/// Default identity-token lifetime (15 minutes).
	pub const DEFAULT_ID_TTL: Duration = Duration::seconds(900);
	/// Default refresh-token lifetime (3 days).
	pub const DEFAULT_REFRESH_TTL: Duration = Duration::seconds(259_200);

	/// Returns a builder seeded with the defaults.
	pub fn builder() -> TokenConfigBuilder {
		TokenConfigBuilder::default()
	}
}
impl Default for TokenConfig {
	fn default() -> Self {
		Self { id_ttl: Self::DEFAULT_ID_TTL, refresh_ttl: Self::DEFAULT_REFRESH_TTL }
	}
}

/// Builder for [`TokenConfig`].
#[derive(Clone, Debug, Default)]
pub struct TokenConfigBuilder {
	id_ttl: Option<Duration>,
	refresh_ttl: Option<Duration>,
}
impl TokenConfigBuilder {
	/// Overrides the identity-token lifetime.
	pub fn id_ttl(mut self, ttl: Duration) -> Self {
		self.id_ttl = Some(ttl);

		self
	}

	/// Overrides the identity-token lifetime from whole seconds.
	pub fn id_ttl_secs(self, secs: i64) -> Self {
		self.id_ttl(Duration::seconds(secs))
	}

	/// Overrides the refresh-token lifetime.
	pub fn refresh_ttl(mut self, ttl: Duration) -> Self {
		self.refresh_ttl = Some(ttl);

		self
	}

	/// Overrides the refresh-token lifetime from whole seconds.
	pub fn refresh_ttl_secs(self, secs: i64) -> Self {
		self.refresh_ttl(Duration::seconds(secs))
	}

	/// Validates and builds the configuration.
	///
	/// Lifetimes are truncated to whole seconds because JWT time claims are integral.
	pub fn build(self) -> Result<TokenConfig, ConfigError> {
		let id_ttl = whole_seconds(self.id_ttl.unwrap_or(TokenConfig::DEFAULT_ID_TTL), "ID")?;
		let refresh_ttl = whole_seconds(
			self.refresh_ttl.unwrap_or(TokenConfig::DEFAULT_REFRESH_TTL),
			"refresh",
		)?;

		Ok(TokenConfig { id_ttl, refresh_ttl })
	}
}

fn whole_seconds(ttl: Duration, token: &'static str) -> Result<Duration, ConfigError> {
	let secs = ttl.whole_seconds();

	if secs < 1 {
		return Err(ConfigError::TtlTooShort { token });
	}

	Ok(Duration::seconds(secs))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn defaults_match_documented_lifetimes() {
		let config = TokenConfig::builder().build().expect("Default config should build.");

		assert_eq!(config, TokenConfig::default());
		assert_eq!(config.id_ttl.whole_seconds(), 900);
		assert_eq!(config.refresh_ttl.whole_seconds(), 259_200);
	}

	#[test]
	fn rejects_sub_second_lifetimes_and_truncates_fractions() {
		let err = TokenConfig::builder()
			.id_ttl(Duration::milliseconds(999))
			.build()
			.expect_err("Sub-second ID TTL should be rejected.");

		assert!(matches!(err, ConfigError::TtlTooShort { token: "ID" }));
		assert!(matches!(
			TokenConfig::builder().refresh_ttl_secs(0).build(),
			Err(ConfigError::TtlTooShort { token: "refresh" })
		));

		let config = TokenConfig::builder()
			.id_ttl(Duration::milliseconds(1_500))
			.build()
			.expect("Fractional TTL should build.");

		assert_eq!(config.id_ttl, Duration::seconds(1));
	}
}

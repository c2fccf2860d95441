//! Secret string wrapper for credentials read from the environment

use std::fmt;
use zeroize::Zeroizing;

/// String that never prints its contents and is wiped from memory on drop
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(Zeroizing<String>);

impl SecretString {
	/// Expose the secret for the single place that needs it
	pub fn expose_secret(&self) -> &str {
		self.0.as_str()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl From<&str> for SecretString {
	fn from(s: &str) -> Self {
		Self(Zeroizing::new(s.to_string()))
	}
}

impl From<String> for SecretString {
	fn from(s: String) -> Self {
		Self(Zeroizing::new(s))
	}
}

impl fmt::Debug for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("SecretString(<redacted>)")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_debug_is_redacted() {
		let secret = SecretString::from("0xdeadbeef");
		assert_eq!(format!("{:?}", secret), "SecretString(<redacted>)");
		assert_eq!(secret.expose_secret(), "0xdeadbeef");
	}
}

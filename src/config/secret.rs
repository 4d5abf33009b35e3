//! Secure credential handling using the secrecy crate
//!
//! Credentials are zeroized on drop and redacted from `Debug` output; code
//! has to call `expose_secret()` to read them.
//!
//! # Example
//!
//! ```rust
//! use msgexport::config::{SecretString, SecretValue};
//! use secrecy::{ExposeSecret, Secret};
//!
//! let password: SecretString = Secret::new(SecretValue::from("my-password".to_string()));
//! assert_eq!(password.expose_secret().as_ref(), "my-password");
//! assert!(!format!("{password:?}").contains("my-password"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// String payload of a [`SecretString`], wiped on drop
#[derive(Clone, Debug, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl SecretValue {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for SecretValue {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// A zeroizing, debug-redacted string
pub type SecretString = Secret<SecretValue>;

/// Wraps a plain string, e.g. a value taken from the environment
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

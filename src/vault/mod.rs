//! Secret retrieval and the MFA code generator.

pub mod file;
pub mod otp;

pub use file::FileSecrets;
pub use otp::{CodeGenerator, OneTimeCode};

use crate::error::{LauncherError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;

/// Vault entry holding the SSO account
pub const SSO_SECRET_NAME: &str = "sso_account";

/// A named bag of string values. Values never appear in `Debug` output.
#[derive(Clone)]
pub struct Secret {
    name: String,
    values: HashMap<String, String>,
}

impl Secret {
    pub fn new(name: impl Into<String>, values: HashMap<String, String>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, key: &str) -> Result<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| {
                LauncherError::Secret(format!("Secret {} has no field '{}'", self.name, key))
            })
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.values.keys().collect();
        keys.sort();
        f.debug_struct("Secret")
            .field("name", &self.name)
            .field("keys", &keys)
            .finish()
    }
}

#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn get_secret(&self, name: &str) -> Result<Secret>;
}

/// Credentials for the identity provider
#[derive(Clone)]
pub struct SsoAccount {
    pub email: String,
    pub password: String,
    pub mfa_secret_key: String,
}

impl TryFrom<&Secret> for SsoAccount {
    type Error = LauncherError;

    fn try_from(secret: &Secret) -> Result<Self> {
        Ok(Self {
            email: secret.get("email")?.to_string(),
            password: secret.get("password")?.to_string(),
            mfa_secret_key: secret.get("mfa_secret_key")?.to_string(),
        })
    }
}

impl fmt::Debug for SsoAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SsoAccount")
            .field("email", &"<redacted>")
            .field("password", &"<redacted>")
            .field("mfa_secret_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(pairs: &[(&str, &str)]) -> Secret {
        Secret::new(
            SSO_SECRET_NAME,
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_account_from_secret() {
        let s = secret(&[
            ("email", "robot@example.com"),
            ("password", "hunter2"),
            ("mfa_secret_key", "JBSWY3DPEHPK3PXP"),
        ]);
        let account = SsoAccount::try_from(&s).unwrap();
        assert_eq!(account.email, "robot@example.com");
        assert_eq!(account.mfa_secret_key, "JBSWY3DPEHPK3PXP");
    }

    #[test]
    fn test_missing_field_names_field_only() {
        let s = secret(&[("email", "robot@example.com"), ("password", "hunter2")]);
        let err = SsoAccount::try_from(&s).unwrap_err().to_string();
        assert!(err.contains("mfa_secret_key"));
        assert!(!err.contains("hunter2"));
    }

    #[test]
    fn test_debug_is_redacted() {
        let s = secret(&[
            ("email", "robot@example.com"),
            ("password", "hunter2"),
            ("mfa_secret_key", "JBSWY3DPEHPK3PXP"),
        ]);
        let account = SsoAccount::try_from(&s).unwrap();
        let rendered = format!("{:?} {:?}", s, account);
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("JBSWY3DPEHPK3PXP"));
        assert!(rendered.contains("password"));
    }
}

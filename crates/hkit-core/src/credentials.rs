//! Harness credentials shared by the API-auth and browser-login flows.

use std::fmt;
use thiserror::Error;

/// Environment variable holding the account id.
pub const USER_ID_VAR: &str = "IBM_ID";
/// Environment variable holding the account password.
pub const PASSWORD_VAR: &str = "IBM_ID_PW";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialsError {
    #[error("{0} environment variable not defined")]
    Missing(&'static str),
}

/// Account id and password. `Debug` never prints the password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user_id: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("password", &"***")
            .finish()
    }
}

impl Credentials {
    pub fn new(user_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            password: password.into(),
        }
    }

    /// Reads both values from `IBM_ID` / `IBM_ID_PW`.
    pub fn from_env() -> Result<Self, CredentialsError> {
        Self::resolve(None, None)
    }

    /// Explicit values win; each missing one falls back to its environment
    /// variable independently.
    pub fn resolve(
        user_id: Option<String>,
        password: Option<String>,
    ) -> Result<Self, CredentialsError> {
        Self::resolve_with(user_id, password, |name| std::env::var(name).ok())
    }

    fn resolve_with<F>(
        user_id: Option<String>,
        password: Option<String>,
        lookup: F,
    ) -> Result<Self, CredentialsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |explicit: Option<String>, var: &'static str| {
            explicit
                .or_else(|| lookup(var))
                .filter(|v| !v.is_empty())
                .ok_or(CredentialsError::Missing(var))
        };
        Ok(Self {
            user_id: pick(user_id, USER_ID_VAR)?,
            password: pick(password, PASSWORD_VAR)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(user: Option<&str>, pw: Option<&str>) -> impl Fn(&str) -> Option<String> {
        let user = user.map(str::to_string);
        let pw = pw.map(str::to_string);
        move |name| match name {
            USER_ID_VAR => user.clone(),
            PASSWORD_VAR => pw.clone(),
            _ => None,
        }
    }

    #[test]
    fn reads_both_from_env() {
        let c = Credentials::resolve_with(None, None, env(Some("me@example.com"), Some("pw"))).unwrap();
        assert_eq!(c, Credentials::new("me@example.com", "pw"));
    }

    #[test]
    fn explicit_values_override_env() {
        let c = Credentials::resolve_with(
            Some("other@example.com".to_string()),
            None,
            env(Some("me@example.com"), Some("pw")),
        )
        .unwrap();
        assert_eq!(c.user_id, "other@example.com");
        assert_eq!(c.password, "pw");
    }

    #[test]
    fn missing_user_names_variable() {
        let err = Credentials::resolve_with(None, None, env(None, Some("pw"))).unwrap_err();
        assert_eq!(err, CredentialsError::Missing(USER_ID_VAR));
        assert_eq!(err.to_string(), "IBM_ID environment variable not defined");
    }

    #[test]
    fn empty_password_counts_as_missing() {
        let err = Credentials::resolve_with(None, None, env(Some("me"), Some(""))).unwrap_err();
        assert_eq!(err, CredentialsError::Missing(PASSWORD_VAR));
    }

    #[test]
    fn debug_hides_password() {
        let shown = format!("{:?}", Credentials::new("me", "hunter2"));
        assert!(shown.contains("me"));
        assert!(!shown.contains("hunter2"));
    }
}

use std::fmt;

use crate::configuration::FetcherSettings;

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("the session cookie is empty")]
    Empty,
    #[error("the session cookie contains whitespace or control characters")]
    Malformed,
}

/// Value of the `li_at` session cookie. Never printed.
#[derive(Clone, PartialEq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn parse(raw: &str) -> Result<Self, CredentialError> {
        let token = raw.trim();
        if token.is_empty() {
            return Err(CredentialError::Empty);
        }
        if token.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(CredentialError::Malformed);
        }

        Ok(SessionToken(token.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken([redacted])")
    }
}

#[derive(Debug, Clone)]
pub struct SessionCookie {
    pub name: String,
    pub value: SessionToken,
    pub domain: String,
    pub path: String,
}

impl SessionCookie {
    pub fn new(settings: &FetcherSettings, value: SessionToken) -> Self {
        SessionCookie {
            name: settings.cookie_name.clone(),
            value,
            domain: settings.cookie_domain.clone(),
            path: "/".to_string(),
        }
    }
}

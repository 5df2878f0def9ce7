use std::fmt;

use chrono::{DateTime, Utc};

/// A complete temporary credential triple returned by STS.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub key: String,
    pub secret: String,
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credentials {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }
}

impl From<aws_sdk_sts::types::Credentials> for Credentials {
    fn from(creds: aws_sdk_sts::types::Credentials) -> Self {
        let expires_at =
            DateTime::from_timestamp(creds.expiration.secs(), creds.expiration.subsec_nanos());
        Credentials {
            key: creds.access_key_id,
            secret: creds.secret_access_key,
            token: creds.session_token,
            expires_at,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("secret", &"** redacted **")
            .field("token", &"** redacted **")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Credentials issued on behalf of a profile, on their way to the store.
#[derive(Debug)]
pub struct ProfileCredentials {
    pub profile_name: String,
    pub credentials: Credentials,
}

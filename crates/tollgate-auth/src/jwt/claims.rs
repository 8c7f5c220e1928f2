//! JWT claims for the two token flavors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims of a session token, issued on login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the user ID.
    pub sub: Uuid,
    /// Tenant scope of the session, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<Uuid>,
    /// The session this token belongs to.
    pub session_id: Uuid,
    /// Audience: the target service.
    pub aud: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// Claims of an API-key token, minted for key-authenticated callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyClaims {
    /// Subject: the tenant ID.
    pub sub: Uuid,
    /// The API key this token was minted from.
    pub api_key_id: Uuid,
    /// Scopes granted to the key at mint time.
    pub scope: Vec<String>,
    /// Audience: the target service.
    pub aud: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// The token flavor, inferred from payload shape after signature
/// validation succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// A user session token.
    Session,
    /// An API-key token.
    ApiKey,
}

/// A verified token payload.
///
/// The wire format carries no discriminant; deserialization picks the
/// variant by which fields are present (`session_id` vs `api_key_id`),
/// which makes dispatch exhaustive at compile time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenClaims {
    /// Session token payload.
    Session(SessionClaims),
    /// API-key token payload.
    ApiKey(ApiKeyClaims),
}

impl TokenClaims {
    /// The token flavor.
    pub fn kind(&self) -> TokenKind {
        match self {
            Self::Session(_) => TokenKind::Session,
            Self::ApiKey(_) => TokenKind::ApiKey,
        }
    }

    /// The audience claim.
    pub fn aud(&self) -> &str {
        match self {
            Self::Session(c) => &c.aud,
            Self::ApiKey(c) => &c.aud,
        }
    }

    /// The expiration timestamp (seconds since epoch).
    pub fn exp(&self) -> i64 {
        match self {
            Self::Session(c) => c.exp,
            Self::ApiKey(c) => c.exp,
        }
    }

    /// The expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp(), 0).unwrap_or_else(Utc::now)
    }

    /// Whether this token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp()
    }
}

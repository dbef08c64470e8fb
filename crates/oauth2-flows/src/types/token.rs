//! Authorization code and access token records.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::OffsetDateTime;

use super::user::User;

// =============================================================================
// Authorization Code
// =============================================================================

/// An authorization code issued by the grant flow.
///
/// Created once per successful grant and handed to storage; never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationCode {
    /// The generated code value.
    pub code: String,

    /// Client the code was issued to.
    pub client_id: String,

    /// Expiry (Unix timestamp on the wire).
    #[serde(with = "time::serde::timestamp")]
    pub expires: OffsetDateTime,

    /// Resource owner who approved the request, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,

    /// Granted scopes, in request order.
    pub scopes: Vec<String>,
}

// =============================================================================
// Token Expiry
// =============================================================================

/// Expiry of a stored access token.
///
/// On the wire `null` means the token never expires, a number is a Unix
/// timestamp, and a missing field is [`TokenExpiry::Unset`], which is
/// treated as expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenExpiry {
    /// The token does not expire.
    Never,
    /// The token expires at the given instant.
    At(OffsetDateTime),
    /// No expiry was recorded.
    #[default]
    Unset,
}

impl TokenExpiry {
    /// Returns `true` if a token with this expiry is usable at `now`.
    ///
    /// The check is strict: a token expiring exactly at `now` is expired.
    #[must_use]
    pub fn is_valid_at(&self, now: OffsetDateTime) -> bool {
        match self {
            Self::Never => true,
            Self::At(expires) => *expires > now,
            Self::Unset => false,
        }
    }

    /// Returns `true` if no expiry was recorded.
    #[must_use]
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }
}

impl Serialize for TokenExpiry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::At(expires) => serializer.serialize_i64(expires.unix_timestamp()),
            Self::Never | Self::Unset => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for TokenExpiry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<i64>::deserialize(deserializer)? {
            None => Ok(Self::Never),
            Some(ts) => OffsetDateTime::from_unix_timestamp(ts)
                .map(Self::At)
                .map_err(serde::de::Error::custom),
        }
    }
}

// =============================================================================
// Access Token
// =============================================================================

/// A stored bearer access token.
///
/// Read-only from the flows' point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    /// The token value presented by callers.
    pub access_token: String,

    /// Full user record, when the backend stores one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,

    /// User identifier, used when no full user record is stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Granted scopes.
    #[serde(default)]
    pub scopes: Vec<String>,

    /// Expiry of the token.
    #[serde(default, skip_serializing_if = "TokenExpiry::is_unset")]
    pub expires: TokenExpiry,
}

impl AccessToken {
    /// Creates a token record with no user, no scopes and no recorded expiry.
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            user: None,
            user_id: None,
            scopes: Vec::new(),
            expires: TokenExpiry::Unset,
        }
    }

    /// Sets the expiry.
    #[must_use]
    pub fn expires(mut self, expires: TokenExpiry) -> Self {
        self.expires = expires;
        self
    }

    /// Sets the granted scopes.
    #[must_use]
    pub fn with_scopes<S: Into<String>>(mut self, scopes: impl IntoIterator<Item = S>) -> Self {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the full user record.
    #[must_use]
    pub fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }

    /// Sets the user identifier.
    #[must_use]
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Returns `true` if the token is usable at `now`.
    #[must_use]
    pub fn is_valid_at(&self, now: OffsetDateTime) -> bool {
        self.expires.is_valid_at(now)
    }

    /// Resolves the token's user: the stored record, or a minimal user
    /// carrying only the stored identifier.
    #[must_use]
    pub fn resolved_user(&self) -> Option<User> {
        self.user
            .clone()
            .or_else(|| self.user_id.as_deref().map(User::with_id))
    }
}

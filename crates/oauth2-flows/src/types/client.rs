//! OAuth 2.0 client registration types.

use serde::{Deserialize, Serialize};

// =============================================================================
// Redirect URIs
// =============================================================================

/// Registered redirect URI(s), either a single value or a set of values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RedirectUris {
    /// Exactly one permitted redirect URI.
    Single(String),
    /// Any of several permitted redirect URIs.
    Multiple(Vec<String>),
}

impl RedirectUris {
    /// Returns `true` if `uri` exactly matches a registered value.
    #[must_use]
    pub fn contains(&self, uri: &str) -> bool {
        match self {
            Self::Single(registered) => registered == uri,
            Self::Multiple(registered) => registered.iter().any(|r| r == uri),
        }
    }
}

impl From<&str> for RedirectUris {
    fn from(uri: &str) -> Self {
        Self::Single(uri.to_string())
    }
}

impl From<String> for RedirectUris {
    fn from(uri: String) -> Self {
        Self::Single(uri)
    }
}

impl From<Vec<String>> for RedirectUris {
    fn from(uris: Vec<String>) -> Self {
        Self::Multiple(uris)
    }
}

// =============================================================================
// Client
// =============================================================================

/// A registered OAuth 2.0 client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Client identifier used in OAuth flows.
    pub client_id: String,

    /// Registered redirect URI(s).
    pub redirect_uri: RedirectUris,

    /// Scopes this client may request.
    ///
    /// `None` places no restriction. `Some` restricts requests to the listed
    /// scopes, so an empty list permits nothing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<String>>,
}

impl Client {
    /// Creates a client with a single redirect URI and no scope restriction.
    #[must_use]
    pub fn new(client_id: impl Into<String>, redirect_uri: impl Into<RedirectUris>) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            scopes: None,
        }
    }

    /// Restricts the scopes this client may request.
    #[must_use]
    pub fn with_scopes<S: Into<String>>(mut self, scopes: impl IntoIterator<Item = S>) -> Self {
        self.scopes = Some(scopes.into_iter().map(Into::into).collect());
        self
    }

    /// Checks if the given redirect URI is registered for this client.
    #[must_use]
    pub fn is_redirect_uri_allowed(&self, uri: &str) -> bool {
        self.redirect_uri.contains(uri)
    }

    /// Returns the requested scopes this client is not permitted to request,
    /// in request order.
    #[must_use]
    pub fn invalid_scopes<'a>(&self, requested: &'a [String]) -> Vec<&'a str> {
        let Some(permitted) = &self.scopes else {
            return Vec::new();
        };

        requested
            .iter()
            .filter(|scope| !permitted.contains(*scope))
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scopes(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_redirect_uri_exact_match() {
        let client = Client::new("abc", "https://app/cb");
        assert!(client.is_redirect_uri_allowed("https://app/cb"));
        assert!(!client.is_redirect_uri_allowed("https://app/cb/"));
        assert!(!client.is_redirect_uri_allowed("https://app/cb?x=1"));
    }

    #[test]
    fn test_multiple_redirect_uris() {
        let client = Client::new(
            "abc",
            vec!["https://app/cb".to_string(), "https://app/alt".to_string()],
        );
        assert!(client.is_redirect_uri_allowed("https://app/alt"));
        assert!(!client.is_redirect_uri_allowed("https://evil/cb"));
    }

    #[test]
    fn test_invalid_scopes_without_restriction() {
        let client = Client::new("abc", "https://app/cb");
        assert!(client.invalid_scopes(&scopes(&["anything"])).is_empty());
    }

    #[test]
    fn test_invalid_scopes_preserve_request_order() {
        let client = Client::new("abc", "https://app/cb").with_scopes(["read"]);
        assert_eq!(
            client.invalid_scopes(&scopes(&["write", "read", "admin"])),
            vec!["write", "admin"]
        );
    }

    #[test]
    fn test_empty_scope_restriction_permits_nothing() {
        let client = Client::new("abc", "https://app/cb").with_scopes(Vec::<String>::new());
        assert_eq!(client.invalid_scopes(&scopes(&["read"])), vec!["read"]);
    }

    #[test]
    fn test_deserialize_redirect_uri_forms() {
        let single: Client =
            serde_json::from_str(r#"{"clientId":"a","redirectUri":"https://app/cb"}"#).unwrap();
        assert_eq!(single.redirect_uri, RedirectUris::Single("https://app/cb".into()));
        assert!(single.scopes.is_none());

        let multiple: Client = serde_json::from_str(
            r#"{"clientId":"a","redirectUri":["https://app/cb","https://app/alt"],"scopes":["read"]}"#,
        )
        .unwrap();
        assert!(multiple.is_redirect_uri_allowed("https://app/alt"));
        assert_eq!(multiple.scopes, Some(vec!["read".to_string()]));
    }
}

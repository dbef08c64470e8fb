//! Inbound request view consumed by the flows.
//!
//! The flows never talk to a transport directly. Adapters (such as the axum
//! extractor in [`crate::http`]) fill an [`OAuthRequest`] with the method,
//! headers, and the decoded query and body parameters.

use std::collections::HashMap;

use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, header};

/// Decoded request parameters (query string or body fields).
pub type Params = HashMap<String, String>;

/// Content type required for body-transmitted bearer tokens.
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// A transport-neutral view of an inbound HTTP request.
///
/// `query` is `None` when the request carried no query string and `body`
/// is `None` when it carried no decodable body, which lets the flows tell
/// an absent parameter source apart from an empty one.
#[derive(Debug, Clone, Default)]
pub struct OAuthRequest {
    method: Method,
    headers: HeaderMap,
    query: Option<Params>,
    body: Option<Params>,
}

impl OAuthRequest {
    /// Creates an empty request with the given method.
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Creates a request from already decoded parts.
    #[must_use]
    pub fn from_parts(
        method: Method,
        headers: HeaderMap,
        query: Option<Params>,
        body: Option<Params>,
    ) -> Self {
        Self {
            method,
            headers,
            query,
            body,
        }
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Adds query parameters, creating the query source if needed.
    #[must_use]
    pub fn with_query<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let query = self.query.get_or_insert_with(Params::new);
        query.extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Adds body parameters, creating the body source if needed.
    #[must_use]
    pub fn with_body<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let body = self.body.get_or_insert_with(Params::new);
        body.extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Replaces the body parameter source.
    #[must_use]
    pub fn with_body_params(mut self, body: Option<Params>) -> Self {
        self.body = body;
        self
    }

    /// Returns the request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value by name, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the decoded query string, if the request had one.
    #[must_use]
    pub fn query(&self) -> Option<&Params> {
        self.query.as_ref()
    }

    /// Returns the decoded body, if the request had one.
    #[must_use]
    pub fn body(&self) -> Option<&Params> {
        self.body.as_ref()
    }

    /// Returns a query parameter.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.as_ref()?.get(name).map(String::as_str)
    }

    /// Returns a body parameter.
    #[must_use]
    pub fn body_param(&self, name: &str) -> Option<&str> {
        self.body.as_ref()?.get(name).map(String::as_str)
    }

    /// Returns a parameter from the body, falling back to the query string.
    ///
    /// Empty values count as absent.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.body_param(name)
            .filter(|v| !v.is_empty())
            .or_else(|| self.query_param(name).filter(|v| !v.is_empty()))
    }

    /// Returns the media type of the request body without parameters.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header(&header::CONTENT_TYPE)
            .and_then(|ct| ct.split(';').next())
            .map(str::trim)
    }

    /// Returns `true` if the body media type equals `mime` (case-insensitive).
    #[must_use]
    pub fn is_content_type(&self, mime: &str) -> bool {
        self.content_type()
            .is_some_and(|ct| ct.eq_ignore_ascii_case(mime))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sources_absent_by_default() {
        let req = OAuthRequest::new(Method::GET);
        assert!(req.query().is_none());
        assert!(req.body().is_none());
        assert_eq!(req.query_param("state"), None);
    }

    #[test]
    fn test_builder_params() {
        let req = OAuthRequest::new(Method::POST)
            .with_query([("state", "xyz")])
            .with_body([("client_id", "abc"), ("scope", "read")]);

        assert_eq!(req.query_param("state"), Some("xyz"));
        assert_eq!(req.body_param("client_id"), Some("abc"));
        assert_eq!(req.body_param("state"), None);
        assert_eq!(req.method(), Method::POST);
    }

    #[test]
    fn test_param_prefers_body_and_skips_empty() {
        let req = OAuthRequest::new(Method::POST)
            .with_query([("client_id", "from-query"), ("scope", "read")])
            .with_body([("client_id", "from-body"), ("scope", "")]);

        assert_eq!(req.param("client_id"), Some("from-body"));
        assert_eq!(req.param("scope"), Some("read"));
        assert_eq!(req.param("redirect_uri"), None);
    }

    #[test]
    fn test_content_type_ignores_parameters() {
        let req = OAuthRequest::new(Method::POST).with_header(
            header::CONTENT_TYPE,
            HeaderValue::from_static("Application/X-WWW-Form-Urlencoded; charset=utf-8"),
        );

        assert_eq!(
            req.content_type(),
            Some("Application/X-WWW-Form-Urlencoded")
        );
        assert!(req.is_content_type(FORM_URLENCODED));
        assert!(!req.is_content_type("application/json"));
    }
}

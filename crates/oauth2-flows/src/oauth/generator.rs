//! Authorization code generation.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::OAuthResult;

use super::authorize::GrantContext;

/// Kind of value a [`TokenGenerator`] is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum TokenKind {
    /// An authorization code for the authorization code grant.
    AuthorizationCode,
}

impl TokenKind {
    /// Returns the OAuth 2.0 name of the value kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
        }
    }
}

/// Produces token strings for the grant flow.
#[async_trait]
pub trait TokenGenerator: Send + Sync {
    /// Generates a value of the given kind for the current grant.
    ///
    /// # Errors
    ///
    /// The returned error is reported by the grant flow unchanged.
    async fn generate(&self, kind: TokenKind, context: &GrantContext<'_>) -> OAuthResult<String>;
}

/// Generates 256-bit random values, base64url encoded without padding.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTokenGenerator;

impl RandomTokenGenerator {
    /// Generates a new random value.
    #[must_use]
    pub fn generate_value() -> String {
        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }
}

#[async_trait]
impl TokenGenerator for RandomTokenGenerator {
    async fn generate(&self, kind: TokenKind, context: &GrantContext<'_>) -> OAuthResult<String> {
        tracing::trace!(kind = kind.as_str(), client_id = %context.client_id(), "Generating value");
        Ok(Self::generate_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_value_length() {
        let code = RandomTokenGenerator::generate_value();
        // 32 bytes = 256 bits, base64url encoded = 43 characters (no padding)
        assert_eq!(code.len(), 43);
    }

    #[test]
    fn test_generate_value_is_base64url() {
        let code = RandomTokenGenerator::generate_value();
        assert!(
            code.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_generate_value_is_unique() {
        assert_ne!(
            RandomTokenGenerator::generate_value(),
            RandomTokenGenerator::generate_value()
        );
    }

    #[test]
    fn test_token_kind_name() {
        assert_eq!(TokenKind::AuthorizationCode.as_str(), "authorization_code");
    }
}

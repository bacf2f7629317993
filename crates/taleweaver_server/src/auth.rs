//! Bearer-token authentication.

use crate::ApiUser;
use axum::http::{HeaderMap, header::AUTHORIZATION};
use std::collections::HashMap;
use taleweaver_core::UserId;
use taleweaver_error::{AuthError, AuthErrorKind, TaleweaverResult};

/// Token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Maps bearer tokens to user ids.
#[derive(Debug, Clone, Default)]
pub struct TokenAuthenticator {
    tokens: HashMap<String, UserId>,
}

impl TokenAuthenticator {
    /// Build from configured callers.
    pub fn new(users: &[ApiUser]) -> Self {
        let tokens = users
            .iter()
            .map(|user| (user.token.clone(), UserId::from(user.id.as_str())))
            .collect();
        Self { tokens }
    }

    /// Register one more token.
    pub fn with_token(mut self, token: impl Into<String>, user: impl Into<UserId>) -> Self {
        self.tokens.insert(token.into(), user.into());
        self
    }

    /// Resolve the caller from the header, falling back to a body `token` field.
    pub fn authenticate(
        &self,
        headers: &HeaderMap,
        body_token: Option<&str>,
    ) -> TaleweaverResult<UserId> {
        let token = bearer_token(headers)
            .or(body_token.map(str::trim).filter(|t| !t.is_empty()))
            .ok_or_else(|| AuthError::new(AuthErrorKind::MissingCredential))?;

        match self.tokens.get(token) {
            Some(user) => Ok(user.clone()),
            None => {
                tracing::debug!("Rejected unknown bearer token");
                Err(AuthError::new(AuthErrorKind::InvalidCredential).into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use taleweaver_error::TaleweaverErrorKind;

    fn auth() -> TokenAuthenticator {
        TokenAuthenticator::default().with_token("s3cret", "ada")
    }

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_header_token_resolves_user() {
        let user = auth()
            .authenticate(&headers("Bearer s3cret"), None)
            .unwrap();
        assert_eq!(user, UserId::from("ada"));
    }

    #[test]
    fn test_body_token_is_a_fallback() {
        let user = auth()
            .authenticate(&HeaderMap::new(), Some(" s3cret "))
            .unwrap();
        assert_eq!(user, UserId::from("ada"));
    }

    #[test]
    fn test_missing_and_invalid_credentials() {
        let missing = auth().authenticate(&HeaderMap::new(), None).unwrap_err();
        assert!(matches!(
            missing.kind(),
            TaleweaverErrorKind::Auth(e) if e.kind == AuthErrorKind::MissingCredential
        ));

        let invalid = auth()
            .authenticate(&headers("Bearer nope"), None)
            .unwrap_err();
        assert!(matches!(
            invalid.kind(),
            TaleweaverErrorKind::Auth(e) if e.kind == AuthErrorKind::InvalidCredential
        ));
    }

    #[test]
    fn test_non_bearer_scheme_is_ignored() {
        assert!(bearer_token(&headers("Basic s3cret")).is_none());
        assert_eq!(bearer_token(&headers("bearer  s3cret")), Some("s3cret"));
    }
}

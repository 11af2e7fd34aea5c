//! Account identity of the calling client
//!
//! The web session layer in front of this service resolves the user and
//! passes their daemon account on in the `X-Lbrynet-Account-Id` header.

use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::types::AccountId;

/// Header carrying the daemon account id
pub const ACCOUNT_HEADER: &str = "x-lbrynet-account-id";

/// Account from the request headers, if any.
///
/// A missing, empty or non-UTF-8 header yields `None`; whether that is an
/// error depends on the method being proxied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAccount(pub Option<AccountId>);

#[async_trait]
impl<S> FromRequestParts<S> for ClientAccount
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let account = parts
            .headers
            .get(ACCOUNT_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(AccountId::new);
        Ok(Self(account))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> ClientAccount {
        let (mut parts, _) = request.into_parts();
        ClientAccount::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn reads_account_header() {
        let request = Request::builder()
            .header("X-Lbrynet-Account-Id", "abc123")
            .body(())
            .unwrap();
        assert_eq!(extract(request).await, ClientAccount(Some(AccountId::new("abc123"))));
    }

    #[tokio::test]
    async fn missing_or_blank_header_is_anonymous() {
        assert_eq!(extract(Request::new(())).await, ClientAccount(None));

        let blank = Request::builder()
            .header(ACCOUNT_HEADER, "  ")
            .body(())
            .unwrap();
        assert_eq!(extract(blank).await, ClientAccount(None));
    }
}

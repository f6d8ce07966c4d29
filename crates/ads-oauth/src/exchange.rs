use serde_json::{Map, Value};
use tracing::debug;

use crate::{ClientCredentials, Error, Result};

/// Decoded token endpoint response
#[derive(Clone, Default)]
pub struct TokenResponse(Map<String, Value>);

impl TokenResponse {
    /// Parse a token endpoint body; anything but a JSON object is rejected
    pub fn parse(body: &str) -> Option<Self> {
        match serde_json::from_str(body) {
            Ok(Value::Object(map)) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.0
            .get("refresh_token")
            .and_then(|v| v.as_str())
            .filter(|v| !v.is_empty())
    }

    pub fn scope(&self) -> Option<&str> {
        self.0.get("scope").and_then(|v| v.as_str())
    }
}

/// Exchanges an authorization code at the token endpoint
pub struct TokenExchanger {
    client: reqwest::Client,
    token_endpoint: String,
}

impl TokenExchanger {
    pub fn new(token_endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token_endpoint: token_endpoint.into(),
        }
    }

    /// Exchange authorization code for a refresh token
    pub async fn exchange(
        &self,
        credentials: &ClientCredentials,
        code: &str,
        redirect_uri: &str,
    ) -> Result<String> {
        let params = [
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri),
        ];

        let response = self
            .client
            .post(&self.token_endpoint)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(%status, "token endpoint responded");

        if !status.is_success() {
            return Err(Error::TokenExchange { status, body });
        }

        let tokens = TokenResponse::parse(&body);
        let refresh_token = tokens.as_ref().and_then(|t| t.refresh_token());

        match refresh_token {
            Some(token) => {
                if let Some(scope) = tokens.as_ref().and_then(|t| t.scope()) {
                    debug!(scope, "granted scopes");
                }
                Ok(token.to_string())
            }
            None => Err(Error::MissingRefreshToken { body }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn credentials() -> ClientCredentials {
        ClientCredentials::new("client-1", "secret-1")
    }

    #[tokio::test]
    async fn returns_refresh_token_on_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("client_id".into(), "client-1".into()),
                Matcher::UrlEncoded("client_secret".into(), "secret-1".into()),
                Matcher::UrlEncoded("code".into(), "ABC123".into()),
                Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
                Matcher::UrlEncoded("redirect_uri".into(), "http://localhost:8080".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "access_token": "ya29.access",
                    "expires_in": 3599,
                    "refresh_token": "rtk_1",
                    "scope": "https://www.googleapis.com/auth/adwords",
                    "token_type": "Bearer"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let exchanger = TokenExchanger::new(format!("{}/token", server.url()));
        let token = exchanger
            .exchange(&credentials(), "ABC123", "http://localhost:8080")
            .await
            .unwrap();

        assert_eq!(token, "rtk_1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn http_error_surfaces_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/token")
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant"}"#)
            .create_async()
            .await;

        let exchanger = TokenExchanger::new(format!("{}/token", server.url()));
        let err = exchanger
            .exchange(&credentials(), "stale", "http://localhost:8080")
            .await
            .unwrap_err();

        match &err {
            Error::TokenExchange { status, body } => {
                assert_eq!(status.as_u16(), 400);
                assert_eq!(body, r#"{"error":"invalid_grant"}"#);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains(r#"{"error":"invalid_grant"}"#));
    }

    #[tokio::test]
    async fn missing_refresh_token_includes_raw_body() {
        let mut server = mockito::Server::new_async().await;
        let body = r#"{"access_token":"ya29.access","expires_in":3599,"token_type":"Bearer"}"#;
        let _mock = server
            .mock("POST", "/token")
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let exchanger = TokenExchanger::new(format!("{}/token", server.url()));
        let err = exchanger
            .exchange(&credentials(), "ABC123", "http://localhost:8080")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::MissingRefreshToken { .. }));
        assert!(err.to_string().contains(body));
    }

    #[tokio::test]
    async fn non_json_success_is_a_protocol_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/token")
            .with_status(200)
            .with_body("<html>proxy login</html>")
            .create_async()
            .await;

        let exchanger = TokenExchanger::new(format!("{}/token", server.url()));
        let err = exchanger
            .exchange(&credentials(), "ABC123", "http://localhost:8080")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("<html>proxy login</html>"));
    }

    #[test]
    fn empty_refresh_token_counts_as_missing() {
        let tokens = TokenResponse::parse(r#"{"refresh_token":""}"#).unwrap();
        assert_eq!(tokens.refresh_token(), None);
        assert!(TokenResponse::parse("[1,2]").is_none());
    }
}

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::{SHEETS_SCOPE, SheetsConfig, TOKEN_URI};

const ASSERTION_LIFETIME_SECS: i64 = 3600;
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Claims of the self-signed assertion exchanged for an access token.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize, Default)]
struct TokenErrorResponse {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Service-account authentication via the OAuth 2.0 JWT bearer flow.
///
/// A fresh token is requested per call; nothing is cached between submissions.
pub struct ServiceAccountAuth {
    client_email: String,
    private_key: String,
    token_uri: String,
    scope: String,
}

impl ServiceAccountAuth {
    pub fn new(config: &SheetsConfig) -> Self {
        Self {
            client_email: config.client_email.clone(),
            private_key: config.private_key.clone(),
            token_uri: TOKEN_URI.to_string(),
            scope: SHEETS_SCOPE.to_string(),
        }
    }

    /// Exchange assertions at `token_uri` instead of Google's OAuth endpoint. The
    /// assertion audience follows it.
    pub fn with_token_uri(mut self, token_uri: impl Into<String>) -> Self {
        self.token_uri = token_uri.into();
        self
    }

    pub fn claims(&self, now: i64) -> AssertionClaims {
        AssertionClaims {
            iss: self.client_email.clone(),
            scope: self.scope.clone(),
            aud: self.token_uri.clone(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        }
    }

    pub fn signed_assertion(&self, now: i64) -> anyhow::Result<String> {
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .map_err(|e| anyhow::anyhow!("Invalid service account private key: {e}"))?;
        let token = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &self.claims(now), &key)?;
        Ok(token)
    }

    pub async fn access_token(&self, client: &Client) -> anyhow::Result<String> {
        let assertion = self.signed_assertion(chrono::Utc::now().timestamp())?;

        let resp = client
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            anyhow::bail!("{}", token_error_message(&body, status.as_u16()));
        }

        let token: TokenResponse = serde_json::from_str(&body)?;
        tracing::debug!(
            "Obtained access token for {} (expires in {:?}s)",
            self.client_email,
            token.expires_in
        );
        Ok(token.access_token)
    }
}

fn token_error_message(body: &str, status: u16) -> String {
    let parsed: TokenErrorResponse = serde_json::from_str(body).unwrap_or_default();
    match (parsed.error.is_empty(), parsed.error_description) {
        (false, Some(desc)) => format!("{}: {}", parsed.error, desc),
        (false, None) => parsed.error,
        (true, _) => format!("Token request failed: HTTP {status}"),
    }
}

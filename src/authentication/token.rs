use crate::api_client::ApiClient;
use crate::telemetry::error_chain_fmt;
use reqwest::header::CONTENT_TYPE;
use secrecy::{ExposeSecret, Secret};

pub const TOKEN_PATH: &str = "/api/v1/token";

#[derive(thiserror::Error)]
pub enum AuthError {
    #[error("Auth failed {status} : {body}")]
    Rejected { status: u16, body: String },
    #[error("The token endpoint did not return an access token.")]
    MissingToken,
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[derive(Clone, Debug)]
pub struct Credentials {
    pub username: String,
    pub password: Secret<String>,
}

/// Bearer token handed out by the token endpoint. Held in memory only.
#[derive(Clone, Debug)]
pub struct AccessToken(Secret<String>);

impl AccessToken {
    pub fn new(token: Secret<String>) -> Self {
        Self(token)
    }

    pub fn as_secret(&self) -> &Secret<String> {
        &self.0
    }
}

#[derive(serde::Serialize)]
struct TokenRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(serde::Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

#[tracing::instrument(
    name = "Exchange credentials for an access token",
    skip(api_client, credentials),
    fields(username = %credentials.username)
)]
pub async fn get_token(
    api_client: &ApiClient,
    credentials: &Credentials,
) -> Result<AccessToken, AuthError> {
    let url = api_client.url(TOKEN_PATH);
    let response = api_client
        .http_client()
        .post(&url)
        .header(CONTENT_TYPE, "application/json")
        .json(&TokenRequest {
            username: &credentials.username,
            password: credentials.password.expose_secret(),
        })
        .send()
        .await
        .map_err(|e| anyhow::anyhow!(e).context("Failed to reach the token endpoint."))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .map_err(|e| anyhow::anyhow!(e).context("Failed to read the token error body."))?;
        tracing::error!(status = status.as_u16(), body = %body, "Token request was rejected");
        return Err(AuthError::Rejected {
            status: status.as_u16(),
            body,
        });
    }

    let TokenResponse { access_token } = response
        .json()
        .await
        .map_err(|e| anyhow::anyhow!(e).context("Failed to parse the token response."))?;
    let access_token = access_token
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)?;

    tracing::info!("Obtained an access token");
    Ok(AccessToken::new(Secret::new(access_token)))
}

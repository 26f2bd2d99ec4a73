use crate::authentication::AccessToken;
use crate::domain::TenantId;
use crate::telemetry::error_chain_fmt;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::{Span, field::display};

pub const TENANT_HEADER: &str = "x-active-business-id";

#[derive(Clone, Debug)]
pub struct ApiClient {
    base_url: String,
    http_client: Client,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    // GET and DELETE never carry a payload
    fn carries_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Patch | HttpMethod::Put)
    }

    fn as_reqwest(&self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PATCH" => Ok(HttpMethod::Patch),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(RequestError::UnsupportedMethod(s.to_string())),
        }
    }
}

#[derive(thiserror::Error)]
pub enum RequestError {
    #[error("Invalid HTTP method: {0}")]
    UnsupportedMethod(String),
    #[error("{method} {url} failed {status}: {body}")]
    Failed {
        method: HttpMethod,
        url: String,
        status: u16,
        body: String,
    },
    #[error("{method} {url} could not be completed")]
    Transport {
        method: HttpMethod,
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} {url} returned a body that is not valid JSON")]
    InvalidBody {
        method: HttpMethod,
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl std::fmt::Debug for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl RequestError {
    /// True when the backend reported a missing card.
    ///
    /// Only the response body is inspected: both the `NO_CARD_FOUND` error code
    /// and any "not found" wording qualify.
    pub fn is_not_found(&self) -> bool {
        match self {
            RequestError::Failed { body, .. } => {
                body.contains("NO_CARD_FOUND") || body.to_lowercase().contains("not found")
            }
            _ => false,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Failed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl ApiClient {
    pub fn new(base_url: String, timeout: std::time::Duration) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn http_client(&self) -> &Client {
        &self.http_client
    }

    /// Issue a request whose method is given by name.
    ///
    /// Unknown method names fail before anything is sent.
    pub async fn request<Body>(
        &self,
        method: &str,
        path: &str,
        token: Option<&AccessToken>,
        tenant_id: Option<&TenantId>,
        body: Option<&Body>,
    ) -> Result<Value, RequestError>
    where
        Body: serde::Serialize + ?Sized,
    {
        let method: HttpMethod = method.parse()?;
        self.send(method, path, token, tenant_id, body).await
    }

    #[tracing::instrument(
        name = "Calling the Litecard API",
        skip(self, token, tenant_id, body),
        fields(
            http.method = %method,
            http.url = %self.url(path),
            http.status = tracing::field::Empty,
            authenticated = token.is_some(),
            tenant_id = ?tenant_id,
        )
    )]
    pub async fn send<Body>(
        &self,
        method: HttpMethod,
        path: &str,
        token: Option<&AccessToken>,
        tenant_id: Option<&TenantId>,
        body: Option<&Body>,
    ) -> Result<Value, RequestError>
    where
        Body: serde::Serialize + ?Sized,
    {
        let url = self.url(path);
        let mut builder = self
            .http_client
            .request(method.as_reqwest(), &url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.bearer_auth(token.as_secret().expose_secret());
        }
        if let Some(tenant_id) = tenant_id {
            builder = builder.header(TENANT_HEADER, tenant_id.as_ref());
        }
        if let Some(body) = body.filter(|_| method.carries_body()) {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|source| RequestError::Transport {
                method,
                url: url.clone(),
                source,
            })?;
        let status = response.status();
        Span::current().record("http.status", display(status.as_u16()));

        let text = response
            .text()
            .await
            .map_err(|source| RequestError::Transport {
                method,
                url: url.clone(),
                source,
            })?;

        if !status.is_success() {
            let e = RequestError::Failed {
                method,
                url,
                status: status.as_u16(),
                body: text,
            };
            tracing::error!(error.message = %e, "Request to the Litecard API failed");
            return Err(e);
        }

        let json = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)
                .map_err(|source| RequestError::InvalidBody { method, url, source })?
        };
        tracing::info!(response = %json, "Received a response from the Litecard API");
        Ok(json)
    }

    pub async fn get(
        &self,
        path: &str,
        token: Option<&AccessToken>,
        tenant_id: Option<&TenantId>,
    ) -> Result<Value, RequestError> {
        self.send::<Value>(HttpMethod::Get, path, token, tenant_id, None)
            .await
    }

    pub async fn post<Body>(
        &self,
        path: &str,
        token: Option<&AccessToken>,
        tenant_id: Option<&TenantId>,
        body: &Body,
    ) -> Result<Value, RequestError>
    where
        Body: serde::Serialize + ?Sized,
    {
        self.send(HttpMethod::Post, path, token, tenant_id, Some(body))
            .await
    }

    pub async fn patch<Body>(
        &self,
        path: &str,
        token: Option<&AccessToken>,
        tenant_id: Option<&TenantId>,
        body: &Body,
    ) -> Result<Value, RequestError>
    where
        Body: serde::Serialize + ?Sized,
    {
        self.send(HttpMethod::Patch, path, token, tenant_id, Some(body))
            .await
    }
}

/// Truthiness of a JSON response as a JavaScript caller would judge it.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

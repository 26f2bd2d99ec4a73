// A wiremock stand-in for the Litecard API.
// Shared by the integration tests and the `spawn_stub_backend` binary.
use serde_json::{Value, json};
use wiremock::matchers::{header_exists, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const STUB_TOKEN: &str = "stub-access-token";

pub struct StubBackend {
    pub server: MockServer,
}

impl StubBackend {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub async fn mount_token(&self) {
        Mock::given(method("POST"))
            .and(path("/api/v1/token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "access_token": STUB_TOKEN })),
            )
            .named("token")
            .mount(&self.server)
            .await;
    }

    pub async fn mount_create_template(&self, response: ResponseTemplate) {
        self.mount_authenticated("POST", "/api/v1/template", response)
            .await;
    }

    pub async fn mount_create_pass(&self, response: ResponseTemplate) {
        self.mount_authenticated("POST", "/api/v1/card", response)
            .await;
    }

    pub async fn mount_update_pass(&self, response: ResponseTemplate) {
        self.mount_authenticated("PATCH", "/api/v1/card", response)
            .await;
    }

    pub async fn mount_status_change(&self, response: ResponseTemplate) {
        self.mount_authenticated("POST", "/api/v1/card/status", response)
            .await;
    }

    pub async fn mount_get_card(&self, card_id: &str, response: ResponseTemplate) {
        self.mount_authenticated("GET", &format!("/api/v1/card/{}", card_id), response)
            .await;
    }

    /// Every endpoint answers successfully; any card can be fetched.
    pub async fn mount_happy_path(&self, created_card_id: &str) {
        self.mount_token().await;
        self.mount_create_template(ok(json!({ "templateId": "stub-template" })))
            .await;
        self.mount_create_pass(ok(json!({ "cardId": created_card_id })))
            .await;
        self.mount_update_pass(ok(json!({ "success": true }))).await;
        self.mount_status_change(ok(json!({ "success": true }))).await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/api/v1/card/[^/]+$"))
            .and(header_exists("authorization"))
            .respond_with(ok(json!({ "cardId": created_card_id, "status": "ACTIVE" })))
            .named("GET any card")
            .mount(&self.server)
            .await;
    }

    async fn mount_authenticated(&self, http_method: &str, endpoint: &str, response: ResponseTemplate) {
        Mock::given(method(http_method))
            .and(path(endpoint))
            .and(header_exists("authorization"))
            .respond_with(response)
            .named(format!("{} {}", http_method, endpoint))
            .mount(&self.server)
            .await;
    }

    /// JSON bodies of the requests received for `http_method endpoint`, in order.
    pub async fn received_bodies(&self, http_method: &str, endpoint: &str) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.method.as_str() == http_method && r.url.path() == endpoint)
            .map(|r| serde_json::from_slice(&r.body).unwrap_or(Value::Null))
            .collect()
    }

    /// `METHOD /path` of every request received, in order.
    pub async fn received_calls(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .map(|r| format!("{} {}", r.method, r.url.path()))
            .collect()
    }
}

pub fn ok(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}
